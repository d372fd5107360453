pub mod place;
pub mod response;

pub use place::{CandidatePlace, Location, Persona};
pub use response::{AgentResponse, PlaceSuggestion, Priority, Suggestion};
