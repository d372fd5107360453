use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::place::CandidatePlace;

/// How strongly the model recommends a place.
///
/// The tag strings are part of the external contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Priority {
    #[serde(rename = "must-see")]
    MustSee,
    #[serde(rename = "highly recommended")]
    HighlyRecommended,
    #[serde(rename = "hidden gem")]
    HiddenGem,
}

/// Body shared by the attraction and restaurant suggestion variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSuggestion {
    /// Place name as proposed by the model; resolved against the places
    /// provider during enrichment
    pub attraction_name: String,
    /// Model's explanation of why this place fits the request
    pub reasoning: String,
    pub priority: Priority,
    /// Authoritative place data attached during enrichment. A suggestion
    /// that cannot be enriched is dropped before reaching the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attraction_data: Option<CandidatePlace>,
}

/// A model-proposed recommendation intended for end-user display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Suggestion {
    AddAttraction(PlaceSuggestion),
    AddRestaurant(PlaceSuggestion),
    GeneralTip { reasoning: String },
}

impl Suggestion {
    pub fn is_tip(&self) -> bool {
        matches!(self, Suggestion::GeneralTip { .. })
    }

    /// The proposed place name, for the non-tip variants.
    pub fn place_name(&self) -> Option<&str> {
        match self {
            Suggestion::AddAttraction(s) | Suggestion::AddRestaurant(s) => {
                Some(s.attraction_name.as_str())
            }
            Suggestion::GeneralTip { .. } => None,
        }
    }
}

/// Final structured answer produced by one orchestration run.
///
/// Created once from the model's final message, immutable after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AgentResponse {
    /// The model's step-by-step reasoning trace
    pub thinking: Vec<String>,
    pub suggestions: Vec<Suggestion>,
    /// Natural-language advice shown alongside the suggestions
    pub summary: String,
}
