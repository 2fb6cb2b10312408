//! Media format detection by file extension.

use crate::error::MediaError;
use serde::{Deserialize, Serialize};

/// Broad category deciding how media is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Document,
    Video,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "Image",
            MediaKind::Document => "Document",
            MediaKind::Video => "Video",
        }
    }

    pub fn heading_icon(self) -> &'static str {
        match self {
            MediaKind::Image => "🖼️",
            MediaKind::Document => "📄",
            MediaKind::Video => "🎥",
        }
    }

    /// Supported extensions, as listed in error messages.
    pub fn supported(self) -> &'static str {
        match self {
            MediaKind::Image => "png, jpeg, jpg, gif, webp",
            MediaKind::Document => "pdf, csv, doc, docx, xls, xlsx, html, txt, md",
            MediaKind::Video => "mp4, mov, avi, mkv, webm",
        }
    }
}

/// Concrete format sent to the inference service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Pdf,
    Csv,
    Doc,
    Docx,
    Xls,
    Xlsx,
    Html,
    Txt,
    Md,
    Mp4,
    Mov,
    Avi,
    Mkv,
    Webm,
}

impl MediaFormat {
    /// Map a file extension, case-insensitively. `jpg` maps to jpeg.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let format = match extension.to_ascii_lowercase().as_str() {
            "png" => MediaFormat::Png,
            "jpeg" | "jpg" => MediaFormat::Jpeg,
            "gif" => MediaFormat::Gif,
            "webp" => MediaFormat::Webp,
            "pdf" => MediaFormat::Pdf,
            "csv" => MediaFormat::Csv,
            "doc" => MediaFormat::Doc,
            "docx" => MediaFormat::Docx,
            "xls" => MediaFormat::Xls,
            "xlsx" => MediaFormat::Xlsx,
            "html" => MediaFormat::Html,
            "txt" => MediaFormat::Txt,
            "md" => MediaFormat::Md,
            "mp4" => MediaFormat::Mp4,
            "mov" => MediaFormat::Mov,
            "avi" => MediaFormat::Avi,
            "mkv" => MediaFormat::Mkv,
            "webm" => MediaFormat::Webm,
            _ => return None,
        };
        Some(format)
    }

    /// Detect the format of a URI or local path from its last segment.
    pub fn detect(reference: &str) -> Result<Self, MediaError> {
        let name = reference
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(reference);
        name.rsplit_once('.')
            .and_then(|(_, extension)| Self::from_extension(extension))
            .ok_or_else(|| {
                MediaError::UnsupportedInput(format!(
                    "Unsupported media format for {reference}. Supported images: {}; documents: {}; videos: {}",
                    MediaKind::Image.supported(),
                    MediaKind::Document.supported(),
                    MediaKind::Video.supported()
                ))
            })
    }

    pub fn kind(self) -> MediaKind {
        match self {
            MediaFormat::Png | MediaFormat::Jpeg | MediaFormat::Gif | MediaFormat::Webp => {
                MediaKind::Image
            }
            MediaFormat::Mp4
            | MediaFormat::Mov
            | MediaFormat::Avi
            | MediaFormat::Mkv
            | MediaFormat::Webm => MediaKind::Video,
            _ => MediaKind::Document,
        }
    }

    /// Wire name of the format.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaFormat::Png => "png",
            MediaFormat::Jpeg => "jpeg",
            MediaFormat::Gif => "gif",
            MediaFormat::Webp => "webp",
            MediaFormat::Pdf => "pdf",
            MediaFormat::Csv => "csv",
            MediaFormat::Doc => "doc",
            MediaFormat::Docx => "docx",
            MediaFormat::Xls => "xls",
            MediaFormat::Xlsx => "xlsx",
            MediaFormat::Html => "html",
            MediaFormat::Txt => "txt",
            MediaFormat::Md => "md",
            MediaFormat::Mp4 => "mp4",
            MediaFormat::Mov => "mov",
            MediaFormat::Avi => "avi",
            MediaFormat::Mkv => "mkv",
            MediaFormat::Webm => "webm",
        }
    }
}

impl std::fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{MediaFormat, MediaKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn video_extension_is_case_insensitive() {
        let format = MediaFormat::detect("s3://b/k/video.MP4").expect("format");
        assert_eq!(format, MediaFormat::Mp4);
        assert_eq!(format.kind(), MediaKind::Video);
    }

    #[test]
    fn docx_is_routed_to_documents() {
        let format = MediaFormat::detect("s3://b/k/file.docx").expect("format");
        assert_eq!(format.kind(), MediaKind::Document);
    }

    #[test]
    fn jpg_maps_to_jpeg() {
        assert_eq!(
            MediaFormat::detect("/tmp/photos/cat.JPG").expect("format"),
            MediaFormat::Jpeg
        );
    }

    #[test]
    fn extension_comes_from_last_segment() {
        assert!(MediaFormat::detect("s3://bucket.mp4/notes").is_err());
        assert!(MediaFormat::detect("clip.mkv.zip").is_err());
        assert!(MediaFormat::detect("README").is_err());
    }
}
