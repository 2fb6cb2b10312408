//! Media analysis through a hosted multimodal model.
//!
//! Images and documents are attached inline. Videos in object storage are
//! passed by reference; local videos are attached inline up to a size limit.

pub mod analyzer;
pub mod converse;
pub mod error;
pub mod format;
pub mod location;
pub mod settings;

pub use analyzer::{AnalysisReport, AnalysisRequest, MediaAnalyzer};
pub use converse::{Attachment, ConverseBackend, ConverseRequest, MediaSource, ObjectFetcher};
pub use error::MediaError;
pub use format::{MediaFormat, MediaKind};
pub use location::MediaLocation;
pub use settings::{AnalysisOverrides, AnalysisSettings, CallerDefaults};
