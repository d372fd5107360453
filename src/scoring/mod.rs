mod engine;

pub use engine::{
    dedup_by_id, filter_qualified, high_scores, score, score_one, sort_by_score, CandidateScore,
    ScoreBreakdown, HIGH_SCORE_THRESHOLD, MIN_REVIEW_COUNT,
};
