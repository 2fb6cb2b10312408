//! Media analysis: format dispatch, attachment, inference and report.

use crate::converse::{Attachment, ConverseBackend, ConverseRequest, MediaSource, ObjectFetcher};
use crate::error::MediaError;
use crate::format::{MediaFormat, MediaKind};
use crate::location::MediaLocation;
use crate::settings::AnalysisSettings;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Phrases asking the model to name people.
const PEOPLE_IDENTIFICATION_PHRASES: [&str; 2] = ["identify", "who is"];

/// What to analyze and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Local path or `s3://bucket/key`.
    pub media_path: String,
    pub prompt: String,
    /// Reject media of any other kind.
    pub only: Option<MediaKind>,
}

/// Analysis text plus the details shown in the rendered report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub text: String,
    pub kind: MediaKind,
    pub format: MediaFormat,
    pub model_id: String,
    pub region: String,
    pub media_path: String,
    /// Size of inline payloads; `None` for references.
    pub inline_bytes: Option<u64>,
}

impl AnalysisReport {
    pub fn render(&self) -> String {
        let mut report = format!(
            "{} {} Analysis Results:\n\n**Analysis:** {}\n\n---\n**Technical Details:**\n- Model Used: {}\n- Region: {}\n- {} Path: {}\n",
            self.kind.heading_icon(),
            self.kind.label(),
            self.text,
            self.model_id,
            self.region,
            self.kind.label(),
            self.media_path
        );
        if let Some(bytes) = self.inline_bytes {
            report.push_str(&format!("- File Size: {:.2}MB\n", megabytes(bytes)));
        }
        report
    }
}

/// Runs analyses against one inference backend and one object store.
#[derive(Clone)]
pub struct MediaAnalyzer {
    converse: Arc<dyn ConverseBackend>,
    objects: Arc<dyn ObjectFetcher>,
}

impl MediaAnalyzer {
    pub fn new(converse: Arc<dyn ConverseBackend>, objects: Arc<dyn ObjectFetcher>) -> Self {
        Self { converse, objects }
    }

    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        settings: &AnalysisSettings,
    ) -> Result<AnalysisReport, MediaError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(MediaError::Validation("text_prompt is required".to_string()));
        }
        check_people_identification(&settings.model_id, prompt)?;

        let location = MediaLocation::parse(&request.media_path)?;
        let format = MediaFormat::detect(&request.media_path)?;
        let kind = format.kind();
        if let Some(only) = request.only
            && only != kind
        {
            return Err(MediaError::UnsupportedInput(format!(
                "Unsupported {} format: {}. Supported: {}",
                only.label().to_lowercase(),
                format,
                only.supported()
            )));
        }

        let source = match (&location, kind) {
            (MediaLocation::Object { .. }, MediaKind::Video) => {
                MediaSource::ObjectUri(location.object_uri().unwrap_or_default())
            }
            (MediaLocation::Object { bucket, key }, _) => {
                let size = self.objects.size(bucket, key).await?;
                check_inline_size(size, settings.max_inline_bytes)?;
                let bytes = self.objects.fetch(bucket, key).await?;
                check_inline_size(bytes.len() as u64, settings.max_inline_bytes)?;
                MediaSource::Bytes(bytes)
            }
            (MediaLocation::Local(path), _) => {
                MediaSource::Bytes(read_local(path, settings.max_inline_bytes).await?)
            }
        };
        let inline_bytes = match &source {
            MediaSource::Bytes(bytes) => Some(bytes.len() as u64),
            MediaSource::ObjectUri(_) => None,
        };
        debug!(
            "prepared media attachment (format={}, inline_bytes={:?}, model={}, region={})",
            format, inline_bytes, settings.model_id, settings.region
        );

        let text = self
            .converse
            .converse(ConverseRequest {
                model_id: settings.model_id.clone(),
                system_prompt: settings.system_prompt.clone(),
                prompt: prompt.to_string(),
                attachment: Attachment {
                    format,
                    name: document_name(&location.file_name()),
                    source,
                },
            })
            .await?;
        info!(
            "media analyzed (kind={:?}, format={}, model={}, reply_chars={})",
            kind,
            format,
            settings.model_id,
            text.chars().count()
        );
        Ok(AnalysisReport {
            text,
            kind,
            format,
            model_id: settings.model_id.clone(),
            region: settings.region.clone(),
            media_path: request.media_path.clone(),
            inline_bytes,
        })
    }
}

/// Nova models refuse to name people; fail fast instead of spending a call.
fn check_people_identification(model_id: &str, prompt: &str) -> Result<(), MediaError> {
    if !model_id.to_ascii_lowercase().contains("nova") {
        return Ok(());
    }
    let prompt = prompt.to_lowercase();
    if PEOPLE_IDENTIFICATION_PHRASES
        .iter()
        .any(|phrase| prompt.contains(phrase))
    {
        return Err(MediaError::UnsupportedInput(
            "Nova models cannot identify or name people in media".to_string(),
        ));
    }
    Ok(())
}

fn check_inline_size(size: u64, limit: u64) -> Result<(), MediaError> {
    if size > limit {
        return Err(MediaError::UnsupportedInput(format!(
            "File too large: {:.2}MB (max {:.2}MB inline)",
            megabytes(size),
            megabytes(limit)
        )));
    }
    Ok(())
}

async fn read_local(path: &Path, limit: u64) -> Result<Vec<u8>, MediaError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|_| MediaError::Validation(format!("File not found: {}", path.display())))?;
    if !metadata.is_file() {
        return Err(MediaError::Validation(format!(
            "Not a file: {}",
            path.display()
        )));
    }
    check_inline_size(metadata.len(), limit)?;
    tokio::fs::read(path).await.map_err(|err| {
        MediaError::Validation(format!("failed to read {}: {err}", path.display()))
    })
}

/// Document name accepted by the inference service: letters, digits,
/// single spaces, hyphens, parentheses and square brackets.
fn document_name(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem);
    let Ok(invalid) = Regex::new(r"[^A-Za-z0-9\s\-\(\)\[\]]+") else {
        return "document".to_string();
    };
    let cleaned = invalid.replace_all(stem, " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::{AnalysisReport, AnalysisRequest, MediaAnalyzer, document_name};
    use crate::converse::{ConverseBackend, ConverseRequest, MediaSource, ObjectFetcher};
    use crate::error::MediaError;
    use crate::format::{MediaFormat, MediaKind};
    use crate::settings::AnalysisSettings;
    use async_trait::async_trait;
    use cairn_rs_protocol::RemoteError;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingConverse {
        requests: Mutex<Vec<ConverseRequest>>,
    }

    #[async_trait]
    impl ConverseBackend for RecordingConverse {
        async fn converse(&self, request: ConverseRequest) -> Result<String, RemoteError> {
            self.requests.lock().expect("lock").push(request);
            Ok("A cat on a sofa.".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingObjects {
        fetched: Mutex<Vec<(String, String)>>,
        reported_size: Option<u64>,
    }

    #[async_trait]
    impl ObjectFetcher for RecordingObjects {
        async fn size(&self, _bucket: &str, _key: &str) -> Result<u64, RemoteError> {
            Ok(self.reported_size.unwrap_or(8))
        }

        async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RemoteError> {
            self.fetched
                .lock()
                .expect("lock")
                .push((bucket.to_string(), key.to_string()));
            Ok(b"%PDF-1.7".to_vec())
        }
    }

    fn settings(limit: u64) -> AnalysisSettings {
        AnalysisSettings {
            model_id: "us.amazon.nova-pro-v1:0".to_string(),
            region: "us-east-1".to_string(),
            system_prompt: "Always answer in the same language you are asked.".to_string(),
            max_inline_bytes: limit,
        }
    }

    fn request(path: &str, prompt: &str) -> AnalysisRequest {
        AnalysisRequest {
            media_path: path.to_string(),
            prompt: prompt.to_string(),
            only: None,
        }
    }

    fn analyzer() -> (MediaAnalyzer, Arc<RecordingConverse>, Arc<RecordingObjects>) {
        let converse = Arc::new(RecordingConverse::default());
        let objects = Arc::new(RecordingObjects::default());
        (
            MediaAnalyzer::new(converse.clone(), objects.clone()),
            converse,
            objects,
        )
    }

    #[tokio::test]
    async fn object_video_is_passed_by_reference() {
        let (analyzer, converse, objects) = analyzer();
        let report = analyzer
            .analyze(&request("s3://b/k/video.MP4", "Describe the scene"), &settings(1024))
            .await
            .expect("analyze");

        assert_eq!(report.format, MediaFormat::Mp4);
        assert_eq!(report.inline_bytes, None);
        assert!(objects.fetched.lock().expect("lock").is_empty());
        let requests = converse.requests.lock().expect("lock");
        assert_eq!(
            requests[0].attachment.source,
            MediaSource::ObjectUri("s3://b/k/video.MP4".to_string())
        );
    }

    #[tokio::test]
    async fn object_document_is_fetched_inline() {
        let (analyzer, converse, objects) = analyzer();
        let report = analyzer
            .analyze(&request("s3://b/k/annual report.docx", "Summarize"), &settings(1024))
            .await
            .expect("analyze");

        assert_eq!(report.kind, MediaKind::Document);
        assert_eq!(
            objects.fetched.lock().expect("lock")[0],
            ("b".to_string(), "k/annual report.docx".to_string())
        );
        let requests = converse.requests.lock().expect("lock");
        assert_eq!(requests[0].attachment.name, "annual report");
        assert_eq!(
            requests[0].attachment.source,
            MediaSource::Bytes(b"%PDF-1.7".to_vec())
        );
    }

    #[tokio::test]
    async fn oversized_object_is_rejected_before_download() {
        let converse = Arc::new(RecordingConverse::default());
        let objects = Arc::new(RecordingObjects {
            reported_size: Some(3 * 1024 * 1024 * 1024),
            ..RecordingObjects::default()
        });
        let analyzer = MediaAnalyzer::new(converse.clone(), objects.clone());

        let err = analyzer
            .analyze(&request("s3://b/k/big.pdf", "Summarize"), &settings(1024))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::UnsupportedInput(_)));
        assert!(format!("{err}").contains("File too large: 3072.00MB"));
        assert!(objects.fetched.lock().expect("lock").is_empty());
        assert!(converse.requests.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn oversized_local_video_is_rejected() {
        let temp = TempDir::new().expect("tmp");
        let path = temp.path().join("clip.mp4");
        std::fs::write(&path, vec![0u8; 2048]).expect("write");
        let (analyzer, converse, _) = analyzer();

        let err = analyzer
            .analyze(&request(&path.to_string_lossy(), "Describe"), &settings(1024))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::UnsupportedInput(_)));
        assert!(converse.requests.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn local_video_within_limit_is_inline() {
        let temp = TempDir::new().expect("tmp");
        let path = temp.path().join("clip.webm");
        std::fs::write(&path, vec![7u8; 512]).expect("write");
        let (analyzer, _, _) = analyzer();

        let report = analyzer
            .analyze(&request(&path.to_string_lossy(), "Describe"), &settings(1024))
            .await
            .expect("analyze");
        assert_eq!(report.inline_bytes, Some(512));
        assert!(report.render().contains("- File Size: 0.00MB"));
    }

    #[tokio::test]
    async fn missing_local_file_is_validation_error() {
        let (analyzer, _, _) = analyzer();
        let err = analyzer
            .analyze(&request("/nonexistent/clip.mp4", "Describe"), &settings(1024))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Validation(_)));
    }

    #[tokio::test]
    async fn nova_refuses_people_identification() {
        let (analyzer, converse, _) = analyzer();
        let err = analyzer
            .analyze(&request("s3://b/k/clip.mp4", "Who is the speaker?"), &settings(1024))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedInput(_)));
        assert!(converse.requests.lock().expect("lock").is_empty());

        let mut claude = settings(1024);
        claude.model_id = "anthropic.claude-3-5-sonnet".to_string();
        analyzer
            .analyze(&request("s3://b/k/clip.mp4", "Who is the speaker?"), &claude)
            .await
            .expect("non-nova models are not guarded");
    }

    #[tokio::test]
    async fn video_only_requests_reject_images() {
        let (analyzer, _, _) = analyzer();
        let mut video_only = request("s3://b/k/photo.png", "Describe");
        video_only.only = Some(MediaKind::Video);
        let err = analyzer.analyze(&video_only, &settings(1024)).await.unwrap_err();
        assert!(format!("{err}").contains("mp4, mov, avi, mkv, webm"));
    }

    #[test]
    fn report_renders_technical_details() {
        let report = AnalysisReport {
            text: "A cat.".to_string(),
            kind: MediaKind::Video,
            format: MediaFormat::Mp4,
            model_id: "us.amazon.nova-pro-v1:0".to_string(),
            region: "us-east-1".to_string(),
            media_path: "s3://b/k/video.mp4".to_string(),
            inline_bytes: None,
        };
        assert_eq!(
            report.render(),
            "🎥 Video Analysis Results:\n\n**Analysis:** A cat.\n\n---\n**Technical Details:**\n- Model Used: us.amazon.nova-pro-v1:0\n- Region: us-east-1\n- Video Path: s3://b/k/video.mp4\n"
        );
    }

    #[test]
    fn document_names_are_sanitized() {
        assert_eq!(document_name("Q3_report (final).pdf"), "Q3 report (final)");
        assert_eq!(document_name("***.csv"), "document");
    }
}
