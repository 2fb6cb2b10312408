//! Lambda event handling for Cairn.
//!
//! One function serves two event shapes: a multimodal request naming an
//! S3 object, and a direct tool invocation routed through the registry.

mod event;
mod handler;

pub use event::HandlerEvent;
pub use handler::{EventHandler, MULTIMODAL_SYSTEM_PROMPT, caller_defaults};
