use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AgentError, Result};
use crate::types::{CandidatePlace, Location};

use super::PlacesProvider;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
const MAX_RETRIES: usize = 2;

/// Google-Places-style REST client.
///
/// `ZERO_RESULTS` maps to the not-found lookup kind; any other non-OK
/// status maps to the provider-error kind, so callers can tell the two
/// apart.
#[derive(Clone, Debug)]
pub struct GooglePlacesClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GooglePlacesClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)], context: &str) -> Result<Value> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);

        let mut attempt = 0;
        let mut backoff = Duration::from_millis(250);

        loop {
            let response = client.get(&url).query(query).send().await?;
            let status = response.status();
            let body = response.text().await?;

            if status.is_server_error() && attempt < MAX_RETRIES {
                tokio::time::sleep(backoff).await;
                attempt += 1;
                backoff *= 2;
                continue;
            }

            if !status.is_success() {
                return Err(AgentError::Lookup {
                    query: context.to_string(),
                    kind: crate::error::LookupErrorKind::Provider,
                });
            }

            let json: Value = serde_json::from_str(&body)
                .map_err(|_| AgentError::lookup_provider(context))?;

            return match json.get("status").and_then(Value::as_str) {
                Some("OK") => Ok(json),
                Some("ZERO_RESULTS") => Err(AgentError::lookup_not_found(context)),
                Some(other) => {
                    tracing::warn!(target: "trip_agent::places", status = other, context, "places provider rejected request");
                    Err(AgentError::lookup_provider(context))
                }
                None => Err(AgentError::lookup_provider(context)),
            };
        }
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    async fn nearby_search(
        &self,
        lat: f64,
        lng: f64,
        radius_m: u32,
        categories: &[String],
    ) -> Result<Vec<CandidatePlace>> {
        let context = format!("nearby {:.5},{:.5} r={}", lat, lng, radius_m);
        let mut query = vec![
            ("location", format!("{},{}", lat, lng)),
            ("radius", radius_m.to_string()),
            ("key", self.api_key.clone()),
        ];
        if let Some(category) = categories.first() {
            query.push(("type", category.clone()));
        }

        let json = self.get_json("nearbysearch/json", &query, &context).await?;
        let results = json
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| AgentError::lookup_provider(&context))?;

        Ok(results.iter().filter_map(parse_place_value).collect())
    }

    async fn text_search(&self, query_text: &str) -> Result<CandidatePlace> {
        let query = vec![
            ("query", query_text.to_string()),
            ("key", self.api_key.clone()),
        ];

        let json = self.get_json("textsearch/json", &query, query_text).await?;
        json.get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(parse_place_value)
            .ok_or_else(|| AgentError::lookup_not_found(query_text))
    }

    async fn place_details(&self, place_id: &str) -> Result<CandidatePlace> {
        let query = vec![
            ("place_id", place_id.to_string()),
            ("key", self.api_key.clone()),
        ];

        let json = self.get_json("details/json", &query, place_id).await?;
        json.get("result")
            .and_then(parse_place_value)
            .ok_or_else(|| AgentError::lookup_not_found(place_id))
    }
}

/// Map one provider result object into the candidate shape. Results with no
/// id, name, or coordinates are unusable and skipped.
fn parse_place_value(value: &Value) -> Option<CandidatePlace> {
    let id = value.get("place_id")?.as_str()?.to_string();
    let name = value.get("name")?.as_str()?.to_string();
    let location = value.get("geometry").and_then(|g| g.get("location"))?;

    let photos = value
        .get("photos")
        .and_then(Value::as_array)
        .map(|photos| {
            photos
                .iter()
                .filter_map(|p| p.get("photo_reference").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(CandidatePlace {
        id,
        name,
        rating: value.get("rating").and_then(Value::as_f64).unwrap_or(0.0),
        review_count: value
            .get("user_ratings_total")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32,
        categories: value
            .get("types")
            .and_then(Value::as_array)
            .map(|types| {
                types
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        price_level: value
            .get("price_level")
            .and_then(Value::as_u64)
            .map(|level| level as u8),
        open_now: value
            .get("opening_hours")
            .and_then(|hours| hours.get("open_now"))
            .and_then(Value::as_bool),
        location: Location::new(
            location.get("lat").and_then(Value::as_f64)?,
            location.get("lng").and_then(Value::as_f64)?,
        ),
        photos,
    })
}
