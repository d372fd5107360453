//! Deterministic composite scoring of candidate places.
//!
//! Pure functions only: no I/O, no clock, no randomness. The composite score
//! is a weighted sum of independently normalized sub-scores, each 0-100.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{CandidatePlace, Persona};

/// Candidates with fewer reviews than this are excluded upstream and never
/// reach the scoring engine.
pub const MIN_REVIEW_COUNT: u32 = 10;

/// Partition point for "high score only" filtering downstream.
pub const HIGH_SCORE_THRESHOLD: f64 = 70.0;

/// Multiplier applied to the persona sub-score on a category match.
const PERSONA_BOOST: f64 = 1.3;

/// Review count at which the volume component of the quality score saturates.
const REVIEW_SATURATION: f64 = 1000.0;

/// Points removed from the diversity sub-score per earlier candidate sharing
/// the same primary category.
const DIVERSITY_PENALTY: f64 = 25.0;

const WEIGHT_QUALITY: f64 = 0.40;
const WEIGHT_PERSONA: f64 = 0.25;
const WEIGHT_DIVERSITY: f64 = 0.15;
const WEIGHT_CONFIDENCE: f64 = 0.20;

/// Per-factor sub-scores, each 0-100. Optional factors are absent rather
/// than zero when they do not apply, and the composite weights renormalize
/// over the factors actually present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub quality_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diversity_score: Option<f64>,
    pub confidence_score: f64,
}

/// A scored candidate. The score is derived, never persisted as ground
/// truth; it is recomputed whenever its inputs change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub place: CandidatePlace,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Score a batch of candidates. Diversity accounting runs across the batch
/// in input order, so an output dominated by one category is penalized.
///
/// Ordering of the result matches the input; ties are left to the caller
/// (typically broken by stable original order).
pub fn score(candidates: &[CandidatePlace], active_personas: &[Persona]) -> Vec<CandidateScore> {
    let mut seen_categories: HashMap<String, usize> = HashMap::new();

    candidates
        .iter()
        .map(|place| {
            let diversity = diversity_score(place, &mut seen_categories);
            score_candidate(place, active_personas, Some(diversity))
        })
        .collect()
}

/// Score a single candidate outside any batch; the diversity factor does
/// not apply.
pub fn score_one(place: &CandidatePlace, active_personas: &[Persona]) -> CandidateScore {
    score_candidate(place, active_personas, None)
}

/// Drop candidates whose review count is below [`MIN_REVIEW_COUNT`].
pub fn filter_qualified(candidates: Vec<CandidatePlace>) -> Vec<CandidatePlace> {
    candidates
        .into_iter()
        .filter(|place| place.review_count >= MIN_REVIEW_COUNT)
        .collect()
}

/// Deduplicate by place ID, last occurrence winning, with the position of
/// the first occurrence preserved.
pub fn dedup_by_id(candidates: Vec<CandidatePlace>) -> Vec<CandidatePlace> {
    let mut order: Vec<String> = Vec::new();
    let mut by_id: HashMap<String, CandidatePlace> = HashMap::new();

    for place in candidates {
        if !by_id.contains_key(&place.id) {
            order.push(place.id.clone());
        }
        by_id.insert(place.id.clone(), place);
    }

    order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}

/// Keep only the scores at or above [`HIGH_SCORE_THRESHOLD`].
pub fn high_scores(scores: Vec<CandidateScore>) -> Vec<CandidateScore> {
    scores
        .into_iter()
        .filter(|scored| scored.score >= HIGH_SCORE_THRESHOLD)
        .collect()
}

/// Stable descending sort by composite score.
pub fn sort_by_score(scores: &mut [CandidateScore]) {
    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn score_candidate(
    place: &CandidatePlace,
    active_personas: &[Persona],
    diversity: Option<f64>,
) -> CandidateScore {
    let quality = quality_score(place);
    let persona = if active_personas.is_empty() {
        None
    } else {
        Some(persona_score(place, active_personas, quality))
    };
    let confidence = confidence_score(place);

    let mut weighted = quality * WEIGHT_QUALITY + confidence * WEIGHT_CONFIDENCE;
    let mut weight = WEIGHT_QUALITY + WEIGHT_CONFIDENCE;
    if let Some(persona) = persona {
        weighted += persona * WEIGHT_PERSONA;
        weight += WEIGHT_PERSONA;
    }
    if let Some(diversity) = diversity {
        weighted += diversity * WEIGHT_DIVERSITY;
        weight += WEIGHT_DIVERSITY;
    }

    CandidateScore {
        place: place.clone(),
        score: (weighted / weight).clamp(0.0, 100.0),
        breakdown: ScoreBreakdown {
            quality_score: quality,
            persona_score: persona,
            diversity_score: diversity,
            confidence_score: confidence,
        },
    }
}

/// Rating confidence, not just the rating: the review-count component
/// saturates logarithmically so very high counts stop dominating.
fn quality_score(place: &CandidatePlace) -> f64 {
    let rating_part = (place.rating.clamp(0.0, 5.0) / 5.0) * 100.0;
    let volume_part = ((1.0 + f64::from(place.review_count)).ln()
        / (1.0 + REVIEW_SATURATION).ln())
    .min(1.0)
        * 100.0;
    (rating_part * 0.6 + volume_part * 0.4).clamp(0.0, 100.0)
}

/// Quality boosted by [`PERSONA_BOOST`] when the candidate's categories
/// intersect an active persona's interests; no penalty otherwise.
fn persona_score(place: &CandidatePlace, personas: &[Persona], quality: f64) -> f64 {
    if personas.iter().any(|persona| persona.matches(place)) {
        (quality * PERSONA_BOOST).min(100.0)
    } else {
        quality
    }
}

fn diversity_score(place: &CandidatePlace, seen: &mut HashMap<String, usize>) -> f64 {
    let Some(category) = place.primary_category() else {
        return 100.0;
    };
    let count = seen.entry(category.to_string()).or_insert(0);
    let penalty = DIVERSITY_PENALTY * (*count as f64);
    *count += 1;
    (100.0 - penalty).max(0.0)
}

/// Data completeness: has a rating, enough reviews, price and opening-hours
/// information where relevant.
fn confidence_score(place: &CandidatePlace) -> f64 {
    let mut points = 0.0;
    if place.rating > 0.0 {
        points += 40.0;
    }
    if place.review_count >= MIN_REVIEW_COUNT {
        points += 30.0;
    }
    if place.price_level.is_some() {
        points += 15.0;
    }
    if place.open_now.is_some() {
        points += 15.0;
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;

    fn place(id: &str, category: &str, rating: f64, reviews: u32) -> CandidatePlace {
        CandidatePlace {
            id: id.to_string(),
            name: id.to_string(),
            rating,
            review_count: reviews,
            categories: vec![category.to_string()],
            price_level: Some(2),
            open_now: Some(true),
            location: Location::new(48.85, 2.35),
            photos: vec![],
        }
    }

    #[test]
    fn scores_and_sub_scores_stay_in_bounds() {
        let candidates = vec![
            place("a", "museum", 5.0, 1_000_000),
            place("b", "museum", 0.0, 10),
            place("c", "park", 4.9, 15),
            place("d", "park", 2.3, 87_000),
        ];
        let personas = vec![Persona::new("culture", vec!["museum".to_string()])];

        for scored in score(&candidates, &personas) {
            assert!((0.0..=100.0).contains(&scored.score), "{:?}", scored);
            let b = &scored.breakdown;
            assert!((0.0..=100.0).contains(&b.quality_score));
            assert!((0.0..=100.0).contains(&b.confidence_score));
            if let Some(p) = b.persona_score {
                assert!((0.0..=100.0).contains(&p));
            }
            if let Some(d) = b.diversity_score {
                assert!((0.0..=100.0).contains(&d));
            }
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(score(&[], &[]).is_empty());
    }

    #[test]
    fn persona_match_boosts_and_absence_is_not_a_penalty() {
        let park = place("park", "park", 4.0, 200);
        let nature = vec![Persona::new("nature lover", vec!["park".to_string()])];
        let foodie = vec![Persona::new("foodie", vec!["restaurant".to_string()])];

        let boosted = score_one(&park, &nature);
        let unmatched = score_one(&park, &foodie);
        let no_personas = score_one(&park, &[]);

        assert!(boosted.score > unmatched.score);
        // Non-matching personas score exactly like the quality baseline
        assert_eq!(
            unmatched.breakdown.persona_score,
            Some(unmatched.breakdown.quality_score)
        );
        // With no personas the factor is absent entirely
        assert_eq!(no_personas.breakdown.persona_score, None);
    }

    #[test]
    fn diversity_penalizes_repeated_categories() {
        let batch = vec![
            place("p1", "park", 4.5, 500),
            place("p2", "park", 4.5, 500),
            place("p3", "park", 4.5, 500),
            place("m1", "museum", 4.5, 500),
        ];
        let scored = score(&batch, &[]);

        assert_eq!(scored[0].breakdown.diversity_score, Some(100.0));
        assert_eq!(scored[1].breakdown.diversity_score, Some(75.0));
        assert_eq!(scored[2].breakdown.diversity_score, Some(50.0));
        assert_eq!(scored[3].breakdown.diversity_score, Some(100.0));
        assert!(scored[2].score < scored[0].score);
    }

    #[test]
    fn single_candidate_scoring_has_no_diversity_factor() {
        let scored = score_one(&place("a", "museum", 4.0, 100), &[]);
        assert_eq!(scored.breakdown.diversity_score, None);
    }

    #[test]
    fn filter_qualified_drops_thin_review_counts() {
        let candidates = vec![
            place("ok", "park", 4.0, MIN_REVIEW_COUNT),
            place("thin", "park", 5.0, MIN_REVIEW_COUNT - 1),
        ];
        let kept = filter_qualified(candidates);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "ok");
    }

    #[test]
    fn dedup_keeps_last_seen_at_first_position() {
        let mut updated = place("x", "park", 3.0, 50);
        updated.rating = 4.8;
        let candidates = vec![place("x", "park", 3.0, 50), place("y", "museum", 4.0, 60), updated];

        let deduped = dedup_by_id(candidates);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].id, "x");
        assert_eq!(deduped[0].rating, 4.8);
        assert_eq!(deduped[1].id, "y");
    }

    #[test]
    fn scoring_does_not_crash_on_duplicate_ids() {
        let batch = vec![place("dup", "park", 4.0, 100), place("dup", "park", 4.0, 100)];
        assert_eq!(score(&batch, &[]).len(), 2);
    }

    #[test]
    fn high_score_threshold_partitions() {
        let strong = score_one(&place("strong", "museum", 5.0, 900), &[]);
        let weak = score_one(&place("weak", "museum", 1.0, 12), &[]);
        let kept = high_scores(vec![strong.clone(), weak]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].place.id, "strong");
        assert!(strong.score >= HIGH_SCORE_THRESHOLD);
    }

    #[test]
    fn sort_is_descending_and_stable_for_ties() {
        let a = score_one(&place("a", "park", 4.0, 100), &[]);
        let b = score_one(&place("b", "park", 4.0, 100), &[]);
        let c = score_one(&place("c", "museum", 5.0, 900), &[]);
        let mut scores = vec![a, b, c];
        sort_by_score(&mut scores);
        assert_eq!(scores[0].place.id, "c");
        assert_eq!(scores[1].place.id, "a");
        assert_eq!(scores[2].place.id, "b");
    }
}
