use std::path::PathBuf;

use serde::Serialize;

use crate::error::ScrapeError;

/// The first `<img>` of a document, reduced to the attribute we act on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageTag {
    pub src: Option<String>,
}

impl ImageTag {
    pub fn with_src(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
        }
    }
}

/// An `<img src>` value, classified once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// `data:image/...` reference; carries the full URI.
    DataUri(String),
    /// Absolute or relative network reference, unresolved.
    Remote(String),
}

pub const DATA_URI_PREFIX: &str = "data:image";

impl ImageRef {
    pub fn classify(src: &str) -> Result<Self, ScrapeError> {
        let src = src.trim();
        if src.is_empty() {
            return Err(ScrapeError::MissingSource);
        }
        if src.starts_with(DATA_URI_PREFIX) {
            Ok(ImageRef::DataUri(src.to_string()))
        } else {
            Ok(ImageRef::Remote(src.to_string()))
        }
    }

    /// Loggable label; data URIs are never printed in full.
    pub fn label(&self) -> &str {
        match self {
            ImageRef::DataUri(_) => "base64",
            ImageRef::Remote(src) => src,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub filename: String,
    pub path: PathBuf,
    pub len: usize,
}

// ── Captioning wire format ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CaptionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl CaptionRequest {
    pub fn new(model: &str, prompt: &str, image_b64: &str, max_tokens: u32) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{}", image_b64),
                        },
                    },
                ],
            }],
            max_tokens,
        }
    }
}
