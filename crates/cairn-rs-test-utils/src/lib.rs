//! Test helpers shared across Cairn crates.

pub mod backends;
pub mod context;
pub mod media;
pub mod model;
pub mod vector;

pub use backends::StubBackends;
pub use context::base_tool_context;
pub use media::{StubConverse, StubObjects};
pub use model::{StubModelInvoker, letter_embedding};
pub use vector::InMemoryVectorStore;
