mod validation;

pub use validation::{agent_response_schema, deserialize_params, validate_agent_response};
