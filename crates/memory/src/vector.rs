//! Vector similarity utilities.
//!
//! Pure-Rust cosine similarity and top-k ranking shared by every store
//! backend, so all of them rank neighbors identically.

use reqlens_core::store::{FieldMap, Neighbor};

/// A stored embedding with its payload.
#[derive(Debug, Clone)]
pub struct StoredVector {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: FieldMap,
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank stored vectors by cosine similarity to a query.
///
/// Returns at most `limit` neighbors with similarity >= `min_similarity`,
/// best first. Ties keep insertion order.
pub fn rank_neighbors<'a>(
    entries: impl IntoIterator<Item = &'a StoredVector>,
    query: &[f32],
    limit: usize,
    min_similarity: f32,
) -> Vec<Neighbor> {
    let mut scored: Vec<Neighbor> = entries
        .into_iter()
        .filter_map(|entry| {
            let similarity = cosine_similarity(&entry.vector, query);
            (similarity >= min_similarity).then(|| Neighbor {
                payload: entry.payload.clone(),
                similarity,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(limit);
    scored
}

/// Little-endian f32 encoding for blob columns.
pub fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|x| x.to_le_bytes()).collect()
}

/// Inverse of [`encode_vector`]; `None` if the length is not a multiple of 4.
pub fn decode_vector(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}
