// Chat assistant pipeline
//
// A chat turn flows context -> prompt -> model relay (or the keyword
// fallback) -> SSE events, with the finished exchange appended to its
// conversation.

mod context;
pub mod fallback;
mod links;
mod prompt;
mod relay;

pub use context::build_project_context;
pub use links::FileReferences;
pub use prompt::compose_system_prompt;
pub use relay::{run_fallback_relay, run_model_relay, ChatEvent, Exchange};
