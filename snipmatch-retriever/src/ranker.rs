//! Similarity ranking and star ratings.
//!
//! Every corpus entry is scored by cosine similarity against the query vector. Scores
//! are bucketed into a 1-5 star rating with `clamp(ceil(similarity * 5), 1, 5)`, which
//! is what callers filter on, while ordering uses the raw similarity so that entries in
//! the same bucket keep their relative order.

use crate::corpus::{Corpus, CorpusEntry};
use half::f16;
use serde::Serialize;
use tracing::{debug, info};

/// Lowest star rating.
pub const MIN_STARS: u8 = 1;
/// Highest star rating.
pub const MAX_STARS: u8 = 5;

/// One ranked snippet as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub title: String,
    pub summary: String,
    pub code: String,
    pub tags: Vec<String>,
    /// Star rating in `1..=5`
    pub score: u8,
    /// Raw cosine similarity the rating was derived from
    pub similarity: f32,
}

impl MatchResult {
    fn from_entry(entry: &CorpusEntry, similarity: f32, score: u8) -> Self {
        Self {
            title: entry.snippet.title.clone(),
            summary: entry.snippet.summary.clone(),
            code: entry.snippet.body.clone(),
            tags: entry.snippet.tags.clone(),
            score,
            similarity,
        }
    }
}

/// Cosine similarity between two f16 vectors, accumulated in f32.
///
/// Vectors of different length, or with zero norm, have similarity 0.0.
pub fn cosine_similarity(a: &[f16], b: &[f16]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot_product = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (x.to_f32(), y.to_f32());
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot_product / (norm_a.sqrt() * norm_b.sqrt())
}

/// Map a similarity to a star rating in `MIN_STARS..=MAX_STARS`.
///
/// Non-decreasing in `similarity`; zero, negative and NaN similarities rate 1 star.
pub fn star_rating(similarity: f32) -> u8 {
    if similarity.is_nan() {
        return MIN_STARS;
    }
    (similarity * MAX_STARS as f32)
        .ceil()
        .clamp(MIN_STARS as f32, MAX_STARS as f32) as u8
}

/// Rank `corpus` against `query`, keeping at most `top_k` entries rated at least
/// `min_stars`.
///
/// Results are ordered by descending raw similarity; ties keep corpus load order.
/// `top_k <= 0` and an empty corpus give an empty list. `min_stars` outside `1..=5`
/// is clamped into that range, so values below 1 filter nothing and values above 5
/// keep only 5-star matches.
pub fn rank(query: &[f16], corpus: &Corpus, top_k: i64, min_stars: i64) -> Vec<MatchResult> {
    if top_k <= 0 || corpus.is_empty() {
        return Vec::new();
    }
    let limit = usize::try_from(top_k).unwrap_or(usize::MAX);
    let min_stars = min_stars.clamp(i64::from(MIN_STARS), i64::from(MAX_STARS));

    let mut scored: Vec<(&CorpusEntry, f32)> = corpus
        .iter()
        .map(|entry| {
            let similarity = cosine_similarity(query, &entry.embedding);
            let similarity = if similarity.is_nan() {
                f32::NEG_INFINITY
            } else {
                similarity
            };
            (entry, similarity)
        })
        .collect();

    // Stable: equal similarities keep load order
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let results: Vec<MatchResult> = scored
        .into_iter()
        .map(|(entry, similarity)| (entry, similarity, star_rating(similarity)))
        .filter(|(_, _, stars)| i64::from(*stars) >= min_stars)
        .take(limit)
        .map(|(entry, similarity, stars)| MatchResult::from_entry(entry, similarity, stars))
        .collect();

    info!(
        "Top-{} matches (min {}+ stars): {} of {} snippets",
        top_k,
        min_stars,
        results.len(),
        corpus.len()
    );
    for (i, result) in results.iter().enumerate() {
        debug!(
            "#{}: '{}' - stars: {} (similarity {:.3})",
            i + 1,
            result.title,
            result.score,
            result.similarity
        );
    }

    results
}
