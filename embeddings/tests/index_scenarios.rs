//! End-to-end behaviour of the embedding index with the BPE encoder.

use pretty_assertions::assert_eq;
use writingway_embeddings::{
    DistanceMetric, EmbeddingIndex, FlatIndex, TextEncoder, TokenEncoder,
};

const CHUNKS: [&str; 3] = [
    "This is the first conversation chunk.",
    "Another important scene with key details.",
    "A random off-topic discussion.",
];

#[test]
fn test_query_returns_every_chunk_ordered_by_distance() {
    let mut index = EmbeddingIndex::new(128).unwrap();
    for chunk in CHUNKS {
        index.add_text(chunk).unwrap();
    }

    let results = index.query("key details", 3).unwrap();
    assert_eq!(results.len(), 3);
    for chunk in CHUNKS {
        assert!(results.iter().any(|r| r == chunk), "missing {chunk}");
    }

    let matches = index.query_matches("key details", 3).unwrap();
    assert!(
        matches
            .windows(2)
            .all(|pair| pair[0].distance <= pair[1].distance),
        "{matches:?}"
    );
}

#[test]
fn test_fresh_index_returns_nothing() {
    let index = EmbeddingIndex::new(128).unwrap();
    assert!(index.query("anything", 5).unwrap().is_empty());
    assert!(index.query("anything", 0).unwrap().is_empty());
}

#[test]
fn test_single_entry_is_not_padded() {
    let mut index = EmbeddingIndex::new(128).unwrap();
    index.add_text("Alpha").unwrap();
    assert_eq!(index.query("Alpha", 10).unwrap(), vec!["Alpha"]);
}

#[test]
fn test_exact_text_is_nearest() {
    let mut index = EmbeddingIndex::new(128).unwrap();
    for chunk in CHUNKS {
        index.add_text(chunk).unwrap();
    }

    for chunk in CHUNKS {
        let matches = index.query_matches(chunk, 1).unwrap();
        assert_eq!(matches[0].text, chunk);
        assert_eq!(matches[0].distance, 0.0);
    }
}

#[test]
fn test_duplicate_texts_tie_by_insertion_order() {
    let mut index = EmbeddingIndex::new(128).unwrap();
    index.add_text("The lighthouse keeper").unwrap();
    index.add_text("Something else entirely").unwrap();
    index.add_text("The lighthouse keeper").unwrap();

    let ids: Vec<usize> = index
        .query_matches("The lighthouse keeper", 2)
        .unwrap()
        .iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec![0, 2]);
    assert_eq!(index.len(), 3);
}

#[test]
fn test_reserved_token_does_not_create_entry() {
    let mut index = EmbeddingIndex::new(128).unwrap();
    index.add_text("Alpha").unwrap();

    assert!(index.add_text("bye<|endoftext|>").is_err());
    assert_eq!(index.texts(), ["Alpha"]);
}

#[test]
fn test_long_text_shares_prefix_vector() {
    let encoder = TokenEncoder::for_model("gpt-3.5-turbo", 8).unwrap();
    let prefix = "one two three four five six seven eight nine ten";
    let longer = format!("{prefix} eleven twelve thirteen");

    let a = encoder.encode(prefix).unwrap();
    let b = encoder.encode(&longer).unwrap();
    assert_eq!(a.len(), 8);
    assert_eq!(a, b);
}

#[test]
fn test_custom_metric_backend() {
    let encoder = TokenEncoder::for_model("gpt-3.5-turbo", 32).unwrap();
    let backend = FlatIndex::with_metric(32, DistanceMetric::Cosine).unwrap();
    let mut index = EmbeddingIndex::with_backend(encoder, backend).unwrap();

    index.add_text(CHUNKS[0]).unwrap();
    index.add_text(CHUNKS[1]).unwrap();

    let matches = index.query_matches(CHUNKS[1], 2).unwrap();
    assert_eq!(matches[0].id, 1);
    assert!(matches[0].distance.abs() < 1e-5);
}
