//! Dispatch of model-issued tool calls over a closed capability set.
//!
//! The set is a compile-time enum: adding a capability without handling it
//! everywhere is a compile error, not a runtime surprise.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::cache::{CacheKey, CandidateCache};
use crate::core::{RequestContext, ToolCall};
use crate::error::{AgentError, Result};
use crate::providers::PlacesProvider;
use crate::schemas::deserialize_params;
use crate::scoring;

const DEFAULT_RADIUS_M: u32 = 2000;
const MIN_RADIUS_M: u32 = 100;
const MAX_RADIUS_M: u32 = 50_000;
const DEFAULT_ATTRACTION_LIMIT: usize = 15;
const DEFAULT_RESTAURANT_LIMIT: usize = 10;
const MIN_LIMIT: usize = 1;
const MAX_LIMIT: usize = 50;

/// The closed set of capabilities exposed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    SearchAttractions,
    SearchRestaurants,
    GetPlaceDetails,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [
        ToolKind::SearchAttractions,
        ToolKind::SearchRestaurants,
        ToolKind::GetPlaceDetails,
    ];

    /// Wire name as announced to the model.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::SearchAttractions => "searchAttractions",
            ToolKind::SearchRestaurants => "searchRestaurants",
            ToolKind::GetPlaceDetails => "getPlaceDetails",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    fn default_categories(&self) -> Vec<String> {
        match self {
            ToolKind::SearchAttractions => vec!["tourist_attraction".to_string()],
            ToolKind::SearchRestaurants => vec!["restaurant".to_string()],
            ToolKind::GetPlaceDetails => Vec::new(),
        }
    }

    fn default_limit(&self) -> usize {
        match self {
            ToolKind::SearchAttractions => DEFAULT_ATTRACTION_LIMIT,
            ToolKind::SearchRestaurants => DEFAULT_RESTAURANT_LIMIT,
            ToolKind::GetPlaceDetails => 1,
        }
    }

    /// OpenAI function definition for this tool.
    pub fn definition(&self) -> Value {
        match self {
            ToolKind::SearchAttractions | ToolKind::SearchRestaurants => {
                let what = if *self == ToolKind::SearchAttractions {
                    "attractions"
                } else {
                    "restaurants"
                };
                json!({
                    "type": "function",
                    "function": {
                        "name": self.name(),
                        "description": format!(
                            "Search for {} near the user's map area. Returns candidates ranked by a composite score.",
                            what
                        ),
                        "parameters": {
                            "type": "object",
                            "properties": {
                                "lat": {"type": "number", "description": "Search center latitude"},
                                "lng": {"type": "number", "description": "Search center longitude"},
                                "radius": {
                                    "type": "integer",
                                    "description": "Search radius in meters (100-50000, default 2000)"
                                },
                                "limit": {
                                    "type": "integer",
                                    "description": "Maximum number of results (1-50)"
                                },
                                "categories": {
                                    "type": "array",
                                    "items": {"type": "string"},
                                    "description": "Optional category filters"
                                }
                            },
                            "required": []
                        }
                    }
                })
            }
            ToolKind::GetPlaceDetails => json!({
                "type": "function",
                "function": {
                    "name": self.name(),
                    "description": "Get full details for a place previously returned by a search tool.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "place_id": {"type": "string", "description": "The place's stable identifier"}
                        },
                        "required": ["place_id"]
                    }
                }
            }),
        }
    }

    /// Definitions for the whole capability set, attached to every model
    /// request.
    pub fn definitions() -> Vec<Value> {
        Self::ALL.iter().map(ToolKind::definition).collect()
    }
}

/// Model-proposed search parameters. `lat`/`lng` are accepted for schema
/// compatibility but never trusted; the caller's authoritative center wins.
#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    #[allow(dead_code)]
    lat: Option<f64>,
    #[serde(default)]
    #[allow(dead_code)]
    lng: Option<f64>,
    #[serde(default)]
    radius: Option<u32>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    categories: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct DetailsParams {
    #[serde(alias = "placeId")]
    place_id: String,
}

/// Executes one model-issued tool call against the places provider, through
/// the session cache and the scoring engine.
pub struct ToolExecutor {
    places: Arc<dyn PlacesProvider>,
    cache: Arc<CandidateCache>,
}

impl ToolExecutor {
    pub fn new(places: Arc<dyn PlacesProvider>, cache: Arc<CandidateCache>) -> Self {
        Self { places, cache }
    }

    pub fn cache(&self) -> &Arc<CandidateCache> {
        &self.cache
    }

    pub fn places(&self) -> &Arc<dyn PlacesProvider> {
        &self.places
    }

    /// Execute a tool call and serialize the result to text suitable for a
    /// tool-result turn.
    pub async fn execute(&self, call: &ToolCall, ctx: &RequestContext) -> Result<String> {
        let kind = ToolKind::parse(&call.name)
            .ok_or_else(|| AgentError::invalid_tool_call(&call.name, "unknown tool"))?;

        if let Some(cause) = &call.argument_error {
            return Err(AgentError::invalid_tool_call(&call.name, cause.clone()));
        }

        tracing::debug!(target: "trip_agent::tools", tool = kind.name(), id = %call.id, "executing tool call");

        match kind {
            ToolKind::SearchAttractions | ToolKind::SearchRestaurants => {
                self.execute_search(kind, call, ctx).await
            }
            ToolKind::GetPlaceDetails => self.execute_details(call).await,
        }
    }

    async fn execute_search(
        &self,
        kind: ToolKind,
        call: &ToolCall,
        ctx: &RequestContext,
    ) -> Result<String> {
        let params: SearchParams = deserialize_params(kind.name(), call.arguments.clone())?;

        let radius = params
            .radius
            .unwrap_or(DEFAULT_RADIUS_M)
            .clamp(MIN_RADIUS_M, MAX_RADIUS_M);
        let limit = params
            .limit
            .unwrap_or_else(|| kind.default_limit())
            .clamp(MIN_LIMIT, MAX_LIMIT);
        let categories = params
            .categories
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| kind.default_categories());

        // The model may propose its own coordinates; the map-context center
        // is authoritative so searches cannot drift away from the user's
        // actual area of interest.
        let center = ctx.center;

        let key = CacheKey::nearby(center.lat, center.lng, radius, &categories);
        let places = Arc::clone(&self.places);
        let fetch_categories = categories.clone();
        let candidates = self
            .cache
            .nearby_search(key, move || async move {
                places
                    .nearby_search(center.lat, center.lng, radius, &fetch_categories)
                    .await
            })
            .await?;

        let planned_ids: Vec<&str> = ctx.planned.iter().map(|p| p.id.as_str()).collect();
        let fresh: Vec<_> = candidates
            .into_iter()
            .filter(|place| !planned_ids.contains(&place.id.as_str()))
            .collect();

        let qualified = scoring::filter_qualified(scoring::dedup_by_id(fresh));
        let mut scored = scoring::score(&qualified, &ctx.personas);
        scoring::sort_by_score(&mut scored);
        scored.truncate(limit);

        serde_json::to_string(&scored).map_err(AgentError::from)
    }

    async fn execute_details(&self, call: &ToolCall) -> Result<String> {
        let params: DetailsParams =
            deserialize_params(ToolKind::GetPlaceDetails.name(), call.arguments.clone())?;

        let key = CacheKey::details(&params.place_id);
        let places = Arc::clone(&self.places);
        let place_id = params.place_id.clone();
        let place = self
            .cache
            .resolve(key, move || async move { places.place_details(&place_id).await })
            .await?;

        serde_json::to_string(&place).map_err(AgentError::from)
    }
}
