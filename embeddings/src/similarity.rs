//! Distance computation for embeddings.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::EntryId;
use crate::error::{EmbeddingError, Result};

fn check_dimensions(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}

/// Compute the squared euclidean distance between two embeddings.
pub fn squared_euclidean_distance(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dimensions(a, b)?;
    Ok(a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum())
}

/// Compute the euclidean distance between two embeddings.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f32> {
    Ok(squared_euclidean_distance(a, b)?.sqrt())
}

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical vectors
/// - 0.0 means orthogonal vectors
/// - -1.0 means opposite vectors
///
/// A zero vector has similarity 0.0 with everything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    let dot = dot_product(a, b)?;
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (magnitude_a * magnitude_b))
}

/// Compute the dot product between two embeddings.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dimensions(a, b)?;
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

/// How the distance between two vectors is measured.
///
/// Every metric is expressed so that smaller means nearer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Sum of squared component differences.
    #[default]
    SquaredEuclidean,
    /// Square root of [`DistanceMetric::SquaredEuclidean`].
    Euclidean,
    /// `1 - cosine_similarity`.
    Cosine,
    /// Negated dot product.
    InnerProduct,
}

impl DistanceMetric {
    /// Distance from `a` to `b` under this metric.
    pub fn distance(self, a: &[f32], b: &[f32]) -> Result<f32> {
        match self {
            Self::SquaredEuclidean => squared_euclidean_distance(a, b),
            Self::Euclidean => euclidean_distance(a, b),
            Self::Cosine => Ok(1.0 - cosine_similarity(a, b)?),
            Self::InnerProduct => Ok(-dot_product(a, b)?),
        }
    }
}

/// A candidate returned by a vector search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Insertion id of the matched entry.
    pub id: EntryId,

    /// Distance from the query; smaller is nearer.
    pub distance: f32,
}

impl Neighbor {
    pub fn new(id: EntryId, distance: f32) -> Self {
        Self { id, distance }
    }

    fn rank(&self, other: &Self) -> Ordering {
        OrderedFloat(self.distance)
            .cmp(&OrderedFloat(other.distance))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Keep the `k` nearest candidates, ascending by distance.
///
/// Equal distances are ordered by the lower id, so earlier entries win ties.
/// NaN distances rank after every number.
pub fn rank_nearest(mut candidates: Vec<Neighbor>, k: usize) -> Vec<Neighbor> {
    candidates.sort_by(Neighbor::rank);
    candidates.truncate(k);
    candidates
}
