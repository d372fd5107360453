//! Attaching authoritative place data to the model's suggestions.
//!
//! Policy: favor returning a smaller, trustworthy set over surfacing
//! partial failures inline. A suggestion that cannot be resolved against
//! the places provider is dropped silently; tips pass through untouched.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::cache::{CacheKey, CandidateCache};
use crate::core::orchestrator::FANOUT_CONCURRENCY;
use crate::providers::PlacesProvider;
use crate::types::{AgentResponse, PlaceSuggestion, Suggestion};

/// Re-resolve each suggested place against the provider and attach the
/// resulting structured data. Survivors keep the model's original order.
pub async fn enrich_response(
    response: AgentResponse,
    places: &Arc<dyn PlacesProvider>,
    cache: &Arc<CandidateCache>,
) -> AgentResponse {
    let proposed = response.suggestions.len();

    let suggestions: Vec<Suggestion> = stream::iter(response.suggestions.into_iter())
        .map(|suggestion| enrich_suggestion(suggestion, places, cache))
        .buffered(FANOUT_CONCURRENCY)
        .filter_map(|enriched| async move { enriched })
        .collect()
        .await;

    if suggestions.len() < proposed {
        debug!(
            target: "trip_agent::enrich",
            proposed,
            kept = suggestions.len(),
            "dropped unresolvable suggestions"
        );
    }

    AgentResponse {
        suggestions,
        ..response
    }
}

async fn enrich_suggestion(
    suggestion: Suggestion,
    places: &Arc<dyn PlacesProvider>,
    cache: &Arc<CandidateCache>,
) -> Option<Suggestion> {
    match suggestion {
        Suggestion::GeneralTip { .. } => Some(suggestion),
        Suggestion::AddAttraction(body) => {
            resolve_body(body, places, cache).await.map(Suggestion::AddAttraction)
        }
        Suggestion::AddRestaurant(body) => {
            resolve_body(body, places, cache).await.map(Suggestion::AddRestaurant)
        }
    }
}

async fn resolve_body(
    mut body: PlaceSuggestion,
    places: &Arc<dyn PlacesProvider>,
    cache: &Arc<CandidateCache>,
) -> Option<PlaceSuggestion> {
    let name = body.attraction_name.trim();
    if name.is_empty() {
        warn!(target: "trip_agent::enrich", "dropping suggestion with empty place name");
        return None;
    }

    let key = CacheKey::text(name);
    let provider = Arc::clone(places);
    let query = name.to_string();
    match cache
        .resolve(key, move || async move { provider.text_search(&query).await })
        .await
    {
        Ok(place) => {
            body.attraction_data = Some(place);
            Some(body)
        }
        Err(err) => {
            warn!(
                target: "trip_agent::enrich",
                name,
                error = %err,
                "dropping suggestion that failed to resolve"
            );
            None
        }
    }
}
