//! Cosine similarity over dense vectors (embeddings and tf-idf alike)

/// Raw cosine similarity in [-1, 1]. Zero vectors and dimension mismatches
/// score 0.0 rather than erroring; a mismatch indicates inconsistent
/// vectorization upstream and is logged.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        log::warn!(
            "vector dimension mismatch ({} vs {}); returning zero similarity",
            a.len(),
            b.len()
        );
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Cosine similarity clamped to [0, 1]; negative cosine is treated as no
/// similarity.
pub fn clamped_cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    cosine_similarity(a, b).clamp(0.0, 1.0)
}
