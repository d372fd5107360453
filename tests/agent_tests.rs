//! End-to-end orchestration tests against scripted model and places
//! providers. No network involved.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use trip_agent_rs::{
    Agent, AgentError, CandidatePlace, ChatModel, ChatRequest, ChatResponse, Location, Persona,
    PlacesProvider, RequestContext, Role, Suggestion, ToolCall,
};

/// Model that replays a fixed script of responses, then repeats the last
/// one forever.
struct ScriptedModel {
    script: Mutex<VecDeque<ChatResponse>>,
    last: Mutex<Option<ChatResponse>>,
    completions: AtomicUsize,
}

impl ScriptedModel {
    fn new(script: Vec<ChatResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            completions: AtomicUsize::new(0),
        }
    }

    fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, _request: ChatRequest) -> trip_agent_rs::Result<ChatResponse> {
        self.completions.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(response) => {
                *self.last.lock().unwrap() = Some(response.clone());
                Ok(response)
            }
            None => {
                let last = self.last.lock().unwrap().clone();
                last.ok_or_else(|| AgentError::ModelResponse("script exhausted".to_string()))
            }
        }
    }
}

/// Places provider backed by a fixed candidate list. Nearby searches sleep
/// for a radius-dependent duration so tests can force out-of-order
/// completion; text searches resolve by exact name.
struct FixedPlaces {
    candidates: Vec<CandidatePlace>,
    nearby_calls: AtomicUsize,
}

impl FixedPlaces {
    fn new(candidates: Vec<CandidatePlace>) -> Self {
        Self {
            candidates,
            nearby_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PlacesProvider for FixedPlaces {
    async fn nearby_search(
        &self,
        _lat: f64,
        _lng: f64,
        radius_m: u32,
        _categories: &[String],
    ) -> trip_agent_rs::Result<Vec<CandidatePlace>> {
        self.nearby_calls.fetch_add(1, Ordering::SeqCst);
        // Larger radius finishes later
        tokio::time::sleep(Duration::from_millis(u64::from(radius_m) / 100)).await;
        Ok(self.candidates.clone())
    }

    async fn text_search(&self, query: &str) -> trip_agent_rs::Result<CandidatePlace> {
        self.candidates
            .iter()
            .find(|p| p.name == query)
            .cloned()
            .ok_or_else(|| AgentError::lookup_not_found(query))
    }

    async fn place_details(&self, place_id: &str) -> trip_agent_rs::Result<CandidatePlace> {
        self.candidates
            .iter()
            .find(|p| p.id == place_id)
            .cloned()
            .ok_or_else(|| AgentError::lookup_not_found(place_id))
    }
}

fn place(name: &str, category: &str, rating: f64, reviews: u32) -> CandidatePlace {
    CandidatePlace {
        id: name.to_lowercase().replace(' ', "-"),
        name: name.to_string(),
        rating,
        review_count: reviews,
        categories: vec![category.to_string()],
        price_level: Some(2),
        open_now: Some(true),
        location: Location::new(48.8584, 2.2945),
        photos: vec![],
    }
}

fn tool_response(calls: Vec<ToolCall>) -> ChatResponse {
    ChatResponse {
        content: None,
        tool_calls: calls,
    }
}

fn text_response(content: &str) -> ChatResponse {
    ChatResponse {
        content: Some(content.to_string()),
        tool_calls: Vec::new(),
    }
}

fn tip_only_answer() -> String {
    json!({
        "thinking": ["done"],
        "suggestions": [{"type": "general_tip", "reasoning": "walk everywhere"}],
        "summary": "enjoy"
    })
    .to_string()
}

fn paris_ctx() -> RequestContext {
    RequestContext::new(Location::new(48.8584, 2.2945))
}

#[tokio::test]
async fn tool_results_append_in_call_issue_order() {
    // Radii chosen so completion order is C, A, B while issue order is
    // A, B, C. Distinct radii also mean distinct cache keys.
    let calls = vec![
        ToolCall::new("call_a", "searchAttractions", json!({"radius": 4000})),
        ToolCall::new("call_b", "searchAttractions", json!({"radius": 6000})),
        ToolCall::new("call_c", "searchAttractions", json!({"radius": 200})),
    ];
    let model = Arc::new(ScriptedModel::new(vec![
        tool_response(calls),
        text_response(&tip_only_answer()),
    ]));
    let places = Arc::new(FixedPlaces::new(vec![place(
        "Eiffel Tower",
        "tourist_attraction",
        4.7,
        250_000,
    )]));

    let agent = Agent::new(model, places);
    let report = agent
        .run_with_report("what's nearby?", &paris_ctx())
        .await
        .unwrap();

    let tool_turn_ids: Vec<&str> = report
        .transcript
        .iter()
        .filter(|turn| turn.role == Role::Tool)
        .filter_map(|turn| turn.tool_call_id.as_deref())
        .collect();
    assert_eq!(tool_turn_ids, vec!["call_a", "call_b", "call_c"]);
    assert_eq!(report.tool_rounds, 1);
}

#[tokio::test]
async fn iteration_cap_fails_when_no_content_was_ever_produced() {
    // A model that always requests a tool call
    let always_tools = tool_response(vec![ToolCall::new(
        "call_1",
        "searchAttractions",
        json!({}),
    )]);
    let model = Arc::new(ScriptedModel::new(vec![always_tools]));
    let places = Arc::new(FixedPlaces::new(vec![place(
        "Louvre",
        "museum",
        4.7,
        200_000,
    )]));

    let agent = Agent::new(Arc::clone(&model) as Arc<dyn ChatModel>, places);
    let err = agent.run("loop forever", &paris_ctx()).await.unwrap_err();

    assert_eq!(err.error_code(), "MODEL_RESPONSE_ERROR");
    // 5 executed tool rounds plus the capped sixth response
    assert_eq!(model.completions(), 6);
}

#[tokio::test]
async fn iteration_cap_uses_last_content_when_present() {
    // The capped response still requests tools but carries usable content.
    let mut final_with_tools = tool_response(vec![ToolCall::new(
        "call_x",
        "searchAttractions",
        json!({}),
    )]);
    final_with_tools.content = Some(tip_only_answer());

    let looping = tool_response(vec![ToolCall::new(
        "call_1",
        "searchAttractions",
        json!({}),
    )]);
    let model = Arc::new(ScriptedModel::new(vec![
        looping.clone(),
        looping.clone(),
        looping.clone(),
        looping.clone(),
        looping,
        final_with_tools,
    ]));
    let places = Arc::new(FixedPlaces::new(vec![place(
        "Louvre",
        "museum",
        4.7,
        200_000,
    )]));

    let agent = Agent::new(model, places);
    let response = agent.run("loop with content", &paris_ctx()).await.unwrap();
    assert_eq!(response.suggestions.len(), 1);
    assert!(response.suggestions[0].is_tip());
}

#[tokio::test]
async fn empty_model_response_is_terminal() {
    let model = Arc::new(ScriptedModel::new(vec![text_response("   ")]));
    let places = Arc::new(FixedPlaces::new(vec![]));

    let agent = Agent::new(model, places);
    let err = agent.run("anything", &paris_ctx()).await.unwrap_err();
    assert_eq!(err.error_code(), "MODEL_RESPONSE_ERROR");
}

#[tokio::test]
async fn unparseable_final_answer_is_a_validation_error() {
    let model = Arc::new(ScriptedModel::new(vec![text_response(
        "Here are my favorite spots!",
    )]));
    let places = Arc::new(FixedPlaces::new(vec![]));

    let agent = Agent::new(model, places);
    let err = agent.run("anything", &paris_ctx()).await.unwrap_err();
    match err {
        AgentError::Validation { raw, .. } => {
            assert!(raw.contains("favorite spots"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_tool_calls_feed_error_payloads_back_without_aborting() {
    let calls = vec![
        ToolCall::new("call_ok", "searchAttractions", json!({})),
        ToolCall::new("call_bad", "bookFlight", json!({})),
    ];
    let model = Arc::new(ScriptedModel::new(vec![
        tool_response(calls),
        text_response(&tip_only_answer()),
    ]));
    let places = Arc::new(FixedPlaces::new(vec![place(
        "Louvre",
        "museum",
        4.7,
        200_000,
    )]));

    let agent = Agent::new(model, places);
    let report = agent
        .run_with_report("mixed round", &paris_ctx())
        .await
        .unwrap();

    let bad_turn = report
        .transcript
        .iter()
        .find(|turn| turn.tool_call_id.as_deref() == Some("call_bad"))
        .unwrap();
    assert!(bad_turn.content.contains("INVALID_TOOL_CALL"));
    assert!(bad_turn.content.contains("bookFlight"));
    assert_eq!(report.tool_rounds, 1);
}

#[tokio::test]
async fn eiffel_tower_scenario_end_to_end() {
    // 12 candidates: 8 above the review-count threshold, 4 below.
    let mut candidates = vec![
        place("Eiffel Tower", "tourist_attraction", 4.7, 250_000),
        place("Musée d'Orsay", "museum", 4.7, 60_000),
        place("Champ de Mars", "park", 4.6, 40_000),
        place("Rue Cler Market", "market", 4.4, 2_500),
        place("Musée du Quai Branly", "museum", 4.5, 20_000),
        place("Pont Alexandre III", "tourist_attraction", 4.8, 15_000),
        place("Les Invalides", "museum", 4.6, 30_000),
        place("Palais de Tokyo", "art_gallery", 4.2, 8_000),
    ];
    for i in 0..4 {
        candidates.push(place(&format!("Pop-up Stand {i}"), "store", 5.0, 3));
    }
    // Restaurants resolvable during enrichment
    candidates.push(place("Le Champ de Mars Café", "restaurant", 4.3, 1_200));
    candidates.push(place("La Fontaine de Mars", "restaurant", 4.4, 4_000));

    let qualifying: Vec<String> = candidates
        .iter()
        .filter(|c| c.review_count >= trip_agent_rs::MIN_REVIEW_COUNT)
        .map(|c| c.name.clone())
        .collect();

    let final_answer = json!({
        "thinking": ["searched for attractions near the Eiffel Tower"],
        "suggestions": [
            {"type": "add_attraction", "attractionName": "Eiffel Tower",
             "reasoning": "the landmark itself", "priority": "must-see"},
            {"type": "add_attraction", "attractionName": "Musée d'Orsay",
             "reasoning": "world-class impressionist art", "priority": "highly recommended"},
            {"type": "add_attraction", "attractionName": "Champ de Mars",
             "reasoning": "picnic with a tower view", "priority": "highly recommended"},
            {"type": "add_attraction", "attractionName": "Pont Alexandre III",
             "reasoning": "the most ornate bridge in Paris", "priority": "highly recommended"},
            {"type": "add_attraction", "attractionName": "Rue Cler Market",
             "reasoning": "local market street most visitors miss", "priority": "hidden gem"},
            {"type": "add_restaurant", "attractionName": "La Fontaine de Mars",
             "reasoning": "classic south-west French cooking", "priority": "highly recommended"},
            {"type": "add_restaurant", "attractionName": "Le Champ de Mars Café",
             "reasoning": "good-value lunch near the park", "priority": "hidden gem"},
            {"type": "general_tip", "reasoning": "book Eiffel Tower tickets well in advance"}
        ],
        "summary": "A day around the tower with art, a market street, and two solid meals."
    })
    .to_string();

    let model = Arc::new(ScriptedModel::new(vec![
        tool_response(vec![ToolCall::new(
            "call_1",
            "searchAttractions",
            json!({"lat": 10.0, "lng": 10.0}),
        )]),
        text_response(&final_answer),
    ]));
    let places = Arc::new(FixedPlaces::new(candidates));

    let ctx = paris_ctx().with_personas(vec![Persona::new(
        "culture",
        vec!["museum".to_string(), "art_gallery".to_string()],
    )]);
    let agent = Agent::new(model, Arc::clone(&places) as Arc<dyn PlacesProvider>);
    let response = agent
        .run("suggest attractions near the Eiffel Tower", &ctx)
        .await
        .unwrap();

    let attractions: Vec<&Suggestion> = response
        .suggestions
        .iter()
        .filter(|s| matches!(s, Suggestion::AddAttraction(_)))
        .collect();
    let restaurants: Vec<&Suggestion> = response
        .suggestions
        .iter()
        .filter(|s| matches!(s, Suggestion::AddRestaurant(_)))
        .collect();

    assert!(attractions.len() <= 5);
    assert!(restaurants.len() <= 2);
    assert!(attractions
        .iter()
        .all(|s| qualifying.contains(&s.place_name().unwrap().to_string())));

    let hidden_gems = response
        .suggestions
        .iter()
        .filter_map(|s| match s {
            Suggestion::AddAttraction(b) | Suggestion::AddRestaurant(b) => Some(b),
            Suggestion::GeneralTip { .. } => None,
        })
        .filter(|b| b.priority == trip_agent_rs::Priority::HiddenGem)
        .count();
    assert!(hidden_gems >= 1);

    // Every surviving non-tip suggestion carries enriched place data
    for suggestion in &response.suggestions {
        if let Suggestion::AddAttraction(body) | Suggestion::AddRestaurant(body) = suggestion {
            assert!(body.attraction_data.is_some());
        }
    }
}
