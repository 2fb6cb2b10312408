//! Where a media reference points.

use crate::error::MediaError;
use std::path::PathBuf;

/// The only URI scheme accepted for remote media.
pub const OBJECT_SCHEME: &str = "s3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLocation {
    /// `s3://bucket/key`
    Object { bucket: String, key: String },
    Local(PathBuf),
}

impl MediaLocation {
    /// Parse `scheme://bucket/key` or a local path.
    pub fn parse(reference: &str) -> Result<Self, MediaError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(MediaError::Validation("video_path is required".to_string()));
        }
        let Some((scheme, rest)) = reference.split_once("://") else {
            return Ok(MediaLocation::Local(PathBuf::from(reference)));
        };
        if !scheme.eq_ignore_ascii_case(OBJECT_SCHEME) {
            return Err(MediaError::UnsupportedInput(format!(
                "Unsupported URI scheme '{scheme}'; only {OBJECT_SCHEME}:// references are supported"
            )));
        }
        match rest.split_once('/') {
            Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
                Ok(MediaLocation::Object {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
            _ => Err(MediaError::Validation(format!(
                "object reference must look like {OBJECT_SCHEME}://bucket/key: {reference}"
            ))),
        }
    }

    /// Canonical `s3://bucket/key` URI for object references.
    pub fn object_uri(&self) -> Option<String> {
        match self {
            MediaLocation::Object { bucket, key } => Some(format!("{OBJECT_SCHEME}://{bucket}/{key}")),
            MediaLocation::Local(_) => None,
        }
    }

    /// Last path segment.
    pub fn file_name(&self) -> String {
        match self {
            MediaLocation::Object { key, .. } => {
                key.rsplit('/').next().unwrap_or(key.as_str()).to_string()
            }
            MediaLocation::Local(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MediaLocation;
    use crate::error::MediaError;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn parses_object_reference() {
        let location = MediaLocation::parse("s3://media-bucket/uploads/2024/clip.mp4").expect("parse");
        assert_eq!(
            location,
            MediaLocation::Object {
                bucket: "media-bucket".to_string(),
                key: "uploads/2024/clip.mp4".to_string(),
            }
        );
        assert_eq!(location.file_name(), "clip.mp4");
        assert_eq!(
            location.object_uri().as_deref(),
            Some("s3://media-bucket/uploads/2024/clip.mp4")
        );
    }

    #[test]
    fn plain_paths_are_local() {
        let location = MediaLocation::parse("/tmp/clip.mov").expect("parse");
        assert_eq!(location, MediaLocation::Local(PathBuf::from("/tmp/clip.mov")));
        assert_eq!(location.file_name(), "clip.mov");
    }

    #[test]
    fn other_schemes_are_unsupported() {
        let err = MediaLocation::parse("https://example.com/clip.mp4").unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedInput(_)));
    }

    #[test]
    fn object_reference_needs_bucket_and_key() {
        assert!(matches!(
            MediaLocation::parse("s3://bucket-only").unwrap_err(),
            MediaError::Validation(_)
        ));
        assert!(matches!(
            MediaLocation::parse("   ").unwrap_err(),
            MediaError::Validation(_)
        ));
    }
}
