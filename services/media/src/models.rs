use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the user is contributing; selects the capture path and the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Audio,
    Video,
    Image,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Audio => "audio",
            ContentKind::Video => "video",
            ContentKind::Image => "image",
        }
    }

    /// Whether the kind carries a binary payload instead of a text body
    pub fn is_binary(&self) -> bool {
        !matches!(self, ContentKind::Text)
    }

    /// MIME type of a finished recording
    pub fn recording_mime_type(&self) -> Option<&'static str> {
        match self {
            ContentKind::Audio => Some("audio/webm"),
            ContentKind::Video => Some("video/webm"),
            _ => None,
        }
    }

    /// Whether a file of the given MIME type can be submitted as this kind
    pub fn accepts_mime(&self, mime: &str) -> bool {
        match self {
            ContentKind::Text => false,
            ContentKind::Audio => mime.starts_with("audio/"),
            ContentKind::Video => mime.starts_with("video/"),
            ContentKind::Image => mime.starts_with("image/"),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ContentKind::Text),
            "audio" => Ok(ContentKind::Audio),
            "video" => Ok(ContentKind::Video),
            "image" => Ok(ContentKind::Image),
            other => Err(format!("Unknown content kind: {}", other)),
        }
    }
}

/// Opaque binary payload produced by recording, snapshot or file selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl MediaBlob {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Recording time as `mm:ss`
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Word and character counts shown under the text input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub words: usize,
    pub characters: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            characters: text.chars().count(),
        }
    }
}
