use crate::types::{CandidatePlace, Location, Persona};

use super::conversation::ConversationTurn;

/// Caller-supplied context for one orchestration run.
///
/// `center` is authoritative: search tools always use it as the geographic
/// center, regardless of any coordinates the model proposes.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Authoritative map-context center for all searches
    pub center: Location,
    /// Active travel-interest profiles used to bias scoring
    pub personas: Vec<Persona>,
    /// Places the user already added to the itinerary; never re-suggested
    pub planned: Vec<CandidatePlace>,
    /// Prior conversation turns (user/assistant only), replayed before the
    /// new user turn
    pub history: Vec<ConversationTurn>,
}

impl RequestContext {
    pub fn new(center: Location) -> Self {
        Self {
            center,
            ..Default::default()
        }
    }

    pub fn with_personas(mut self, personas: Vec<Persona>) -> Self {
        self.personas = personas;
        self
    }

    pub fn with_planned(mut self, planned: Vec<CandidatePlace>) -> Self {
        self.planned = planned;
        self
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }
}
