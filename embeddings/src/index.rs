//! Vector index backends.

use tracing::debug;

use crate::error::{EmbeddingError, Result};
use crate::similarity::{DistanceMetric, Neighbor, rank_nearest};
use crate::{Embedding, EntryId};

/// Append-only vector storage that answers k-nearest-neighbour queries.
///
/// Ids are handed out in insertion order starting at 0. Implementations must
/// return hits ascending by distance with ties going to the lower id; an
/// approximate backend may return fewer hits but not reorder them.
pub trait VectorIndex {
    /// Length every stored vector must have.
    fn dimension(&self) -> usize;

    /// The distance metric used by this index.
    fn metric(&self) -> DistanceMetric;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    /// Whether the index is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a vector and return its id.
    fn add(&mut self, vector: Embedding) -> Result<EntryId>;

    /// Search for the `k` nearest neighbours of `query`.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}

/// Brute-force index that scans every stored vector on each search.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    vectors: Vec<Embedding>,
    dimension: usize,
    metric: DistanceMetric,
}

impl FlatIndex {
    /// Create an index using squared euclidean distance.
    pub fn new(dimension: usize) -> Result<Self> {
        Self::with_metric(dimension, DistanceMetric::default())
    }

    /// Create an index using the given metric.
    pub fn with_metric(dimension: usize, metric: DistanceMetric) -> Result<Self> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidDimension(dimension));
        }
        Ok(Self {
            vectors: Vec::new(),
            dimension,
            metric,
        })
    }

    /// Get a stored vector by id.
    pub fn get(&self, id: EntryId) -> Option<&[f32]> {
        self.vectors.get(id).map(Vec::as_slice)
    }

    fn check_dimension(&self, len: usize) -> Result<()> {
        if len != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: len,
            });
        }
        Ok(())
    }
}

impl VectorIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn metric(&self) -> DistanceMetric {
        self.metric
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn add(&mut self, vector: Embedding) -> Result<EntryId> {
        self.check_dimension(vector.len())?;

        let id = self.vectors.len();
        self.vectors.push(vector);
        Ok(id)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dimension(query.len())?;

        if k == 0 || self.vectors.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, vector)| {
                self.metric
                    .distance(query, vector)
                    .map(|distance| Neighbor::new(id, distance))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Scanned {} vectors with {:?} for k={k}",
            candidates.len(),
            self.metric
        );
        Ok(rank_nearest(candidates, k))
    }
}
