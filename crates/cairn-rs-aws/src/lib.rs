//! AWS implementations of the Cairn backend seams.
//!
//! Bedrock Runtime backs model invocation and multimodal conversation, S3
//! Vectors backs the vector store and S3 backs object fetches. Clients are
//! built per region from one shared SDK config.

mod backends;
mod bedrock;
mod document;
mod error;
mod s3;
mod s3vectors;

pub use backends::AwsBackends;
pub use bedrock::{BedrockConverse, BedrockInvoker};
pub use s3::S3ObjectFetcher;
pub use s3vectors::S3VectorStore;
