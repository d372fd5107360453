mod executor;

pub use executor::{ToolExecutor, ToolKind};
