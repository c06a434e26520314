//! Similarity ranking over extracted records and their embeddings.
//!
//! Pure functions over an immutable candidate snapshot: filter first
//! (cheap predicates over Record fields, never the vectors), then score
//! survivors by cosine similarity, clamp, floor, stable-sort descending,
//! and truncate. Ties keep candidate order, which makes ranking
//! reproducible under permutation of equally-scored inputs.

use serde::{Deserialize, Serialize};

use crate::models::record::{EducationLevel, Record};

/// Structured predicate applied before any similarity computation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateFilter {
    /// Satisfied iff this is a subset of the candidate's skills,
    /// case-insensitive.
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// Inclusive bounds on experience years.
    pub min_experience: Option<f32>,
    pub max_experience: Option<f32>,
    /// Satisfied iff the candidate's level ranks at or above this one.
    pub education_level: Option<EducationLevel>,
}

impl CandidateFilter {
    pub fn matches(&self, record: &Record) -> bool {
        if !self.required_skills.is_empty() {
            let candidate_skills: Vec<String> =
                record.skills.iter().map(|s| s.to_lowercase()).collect();
            let all_present = self
                .required_skills
                .iter()
                .all(|req| candidate_skills.contains(&req.to_lowercase()));
            if !all_present {
                return false;
            }
        }
        if let Some(min) = self.min_experience {
            if record.experience_years < min {
                return false;
            }
        }
        if let Some(max) = self.max_experience {
            if record.experience_years > max {
                return false;
            }
        }
        if let Some(level) = self.education_level {
            if record.education_level.rank() < level.rank() {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct RankerConfig {
    pub top_n: usize,
    pub similarity_floor: f32,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            similarity_floor: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    /// Position in the candidate snapshot, so callers can rejoin storage
    /// metadata after sorting.
    pub index: usize,
    pub record: Record,
    pub score: f32,
}

/// Cosine similarity clamped into [0, 1]. Zero norms and dimension
/// mismatches score 0 rather than erroring; noisy fallback embeddings can
/// overshoot 1.0 in floating point, hence the clamp.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

/// Ranks candidates against a query embedding. The candidate slice is an
/// immutable snapshot; insertion order is the tie-break.
pub fn rank(
    query: &[f32],
    candidates: &[(Record, Vec<f32>)],
    filter: Option<&CandidateFilter>,
    config: &RankerConfig,
) -> Vec<RankedCandidate> {
    let mut results: Vec<RankedCandidate> = candidates
        .iter()
        .enumerate()
        .filter(|(_, (record, _))| filter.map_or(true, |f| f.matches(record)))
        .map(|(index, (record, embedding))| RankedCandidate {
            index,
            record: record.clone(),
            score: cosine_similarity(query, embedding),
        })
        .filter(|r| r.score >= config.similarity_floor)
        .collect();

    // sort_by is stable: equal scores keep candidate order
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(config.top_n);
    results
}
