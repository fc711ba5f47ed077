//! Prospector Generate: prompt construction, strict parsing of model output
//! and the deterministic template-rotation fallback.

pub mod generator;
pub mod parse;
pub mod prompt;
pub mod resources;
pub mod rotation;

pub use generator::{Generation, GenerationSource, QueryGenerator};
pub use parse::{parse_query_list, ParseError};
pub use prompt::PromptTemplate;
pub use rotation::{FallbackResources, FallbackSequence, QueryTemplate, RoundRobin};
