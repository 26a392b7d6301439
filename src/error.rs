use std::fmt;
use std::path::PathBuf;

// ── Error type ───────────────────────────────────────────────────────────────

/// Which downstream call a [`ScrapeError::Notify`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyStage {
    Caption,
    Submit,
}

impl fmt::Display for NotifyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyStage::Caption => f.write_str("caption"),
            NotifyStage::Submit => f.write_str("submit"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("no <img> element found in document")]
    NoImageFound,
    #[error("image element has no usable src attribute")]
    MissingSource,
    #[error("data URI does not match data:image/<type>;base64,<payload>")]
    MalformedDataUri,
    #[error("base64 payload failed to decode: {0}")]
    CorruptPayload(String),
    #[error("unsupported URL scheme `{scheme}` in {url}")]
    UnsupportedScheme { scheme: String, url: String },
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} request failed: {detail}")]
    Notify { stage: NotifyStage, detail: String },
    #[error("API key `{0}` not found in env file or environment")]
    MissingCredential(String),
}

/// Fieldless mirror of [`ScrapeError`] for matching on failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FetchFailure,
    NoImageFound,
    MissingSource,
    MalformedDataUri,
    CorruptPayload,
    UnsupportedScheme,
    InvalidUrl,
    WriteFailure,
    NotifyFailure,
    MissingCredential,
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::Fetch(_) => ErrorKind::FetchFailure,
            ScrapeError::NoImageFound => ErrorKind::NoImageFound,
            ScrapeError::MissingSource => ErrorKind::MissingSource,
            ScrapeError::MalformedDataUri => ErrorKind::MalformedDataUri,
            ScrapeError::CorruptPayload(_) => ErrorKind::CorruptPayload,
            ScrapeError::UnsupportedScheme { .. } => ErrorKind::UnsupportedScheme,
            ScrapeError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            ScrapeError::Write { .. } => ErrorKind::WriteFailure,
            ScrapeError::Notify { .. } => ErrorKind::NotifyFailure,
            ScrapeError::MissingCredential(_) => ErrorKind::MissingCredential,
        }
    }

    pub(crate) fn notify(stage: NotifyStage, detail: impl Into<String>) -> Self {
        ScrapeError::Notify {
            stage,
            detail: detail.into(),
        }
    }
}

/// Map a reqwest transport error the same way for every outbound call.
pub(crate) fn describe_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("TimeoutError: {}", e)
    } else if e.is_connect() {
        format!("ConnectError: {}", e)
    } else {
        format!("RequestError: {}", e)
    }
}
