use crate::error::MatchError;

/// Cosine similarity of two equal-length vectors.
///
/// Returns 0.0 when either vector has zero norm, so scores stay finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Inclusion similarity minus exclusion similarity for one study.
pub fn adjusted_score(query: &[f32], inclusion: &[f32], exclusion: &[f32]) -> f32 {
    cosine_similarity(query, inclusion) - cosine_similarity(query, exclusion)
}

/// Index of the study with the highest adjusted score.
/// Ties go to the lowest index.
pub fn match_study(query: &[f32], inclusion: &[Vec<f32>], exclusion: &[Vec<f32>]) -> Result<usize, MatchError> {
    debug_assert_eq!(inclusion.len(), exclusion.len());

    let expected = match inclusion.first() {
        Some(row) => row.len(),
        None => return Err(MatchError::NoCatalog),
    };
    if query.len() != expected {
        return Err(MatchError::DimensionMismatch { expected, actual: query.len() });
    }

    let mut best_idx = 0;
    let mut best_score = f32::NEG_INFINITY;
    for (idx, (inc, exc)) in inclusion.iter().zip(exclusion).enumerate() {
        let score = adjusted_score(query, inc, exc);
        if score > best_score {
            best_idx = idx;
            best_score = score;
        }
    }

    Ok(best_idx)
}
