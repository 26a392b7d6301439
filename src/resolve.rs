use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::ScrapeError;
use crate::fetch;
use crate::models::{ImageRef, ImageTag, SavedImage};
use crate::store;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DATA_URI_FILENAME: &str = "image_from_base64.jpg";
pub const FALLBACK_FILENAME: &str = "downloaded_image.jpg";
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

static DATA_URI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\Adata:image/([^;]+);base64,(.*)\z").unwrap());

// ── Public API ───────────────────────────────────────────────────────────────

/// Resolve `tag` into a saved image. A tag with no `src` fails before any
/// decode or network call.
pub async fn resolve(
    client: &reqwest::Client,
    tag: &ImageTag,
    base_url: &str,
    dest_dir: &Path,
) -> Result<SavedImage, ScrapeError> {
    let src = tag.src.as_deref().ok_or(ScrapeError::MissingSource)?;
    let reference = ImageRef::classify(src)?;
    tracing::debug!(source = reference.label(), "processing image source");

    match reference {
        ImageRef::DataUri(uri) => {
            tracing::info!("processing base64 encoded image");
            save_data_uri(&uri, dest_dir)
        }
        ImageRef::Remote(src) => {
            tracing::info!("processing standard image URL");
            save_remote_image(client, &src, base_url, dest_dir).await
        }
    }
}

// ── Data URI decoder ─────────────────────────────────────────────────────────

/// Decode the base64 payload of a `data:image/<type>;base64,` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ScrapeError> {
    let caps = DATA_URI_RE.captures(uri).ok_or_else(|| {
        tracing::error!("invalid base64 image format: missing data:image/<type>;base64, prefix");
        ScrapeError::MalformedDataUri
    })?;
    let subtype = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let payload: String = caps
        .get(2)
        .map(|m| m.as_str())
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    tracing::debug!(subtype, payload_len = payload.len(), "data URI format validated");

    general_purpose::STANDARD.decode(payload.as_bytes()).map_err(|e| {
        tracing::error!(error = %e, "failed to decode base64 image");
        ScrapeError::CorruptPayload(e.to_string())
    })
}

/// Decode `uri` and save it as [`DATA_URI_FILENAME`]. Nothing is written
/// unless decoding succeeds.
pub fn save_data_uri(uri: &str, dest_dir: &Path) -> Result<SavedImage, ScrapeError> {
    let bytes = decode_data_uri(uri)?;
    store::save_bytes(dest_dir, DATA_URI_FILENAME, &bytes)
}

// ── Remote fetcher ───────────────────────────────────────────────────────────

/// Join `src` against `base_url`, rejecting anything that is not absolute
/// http(s) once resolved.
pub fn resolve_remote_url(src: &str, base_url: &str) -> Result<Url, ScrapeError> {
    let base = Url::parse(base_url)
        .map_err(|e| ScrapeError::InvalidUrl(format!("base URL `{}`: {}", base_url, e)))?;
    let resolved = base
        .join(src.trim())
        .map_err(|e| ScrapeError::InvalidUrl(format!("image URL `{}`: {}", src, e)))?;

    if !ALLOWED_SCHEMES.contains(&resolved.scheme()) {
        tracing::error!(url = %resolved, "invalid URL scheme");
        return Err(ScrapeError::UnsupportedScheme {
            scheme: resolved.scheme().to_string(),
            url: resolved.to_string(),
        });
    }
    Ok(resolved)
}

/// Last path segment of `url`, or [`FALLBACK_FILENAME`] when it is empty.
pub fn filename_for(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
        .unwrap_or(FALLBACK_FILENAME)
        .to_string()
}

pub async fn save_remote_image(
    client: &reqwest::Client,
    src: &str,
    base_url: &str,
    dest_dir: &Path,
) -> Result<SavedImage, ScrapeError> {
    let url = resolve_remote_url(src, base_url)?;
    tracing::debug!(%url, "resolved absolute URL");

    let bytes = fetch::fetch_bytes(client, url.as_str()).await.map_err(|e| {
        tracing::error!(error = %e, "failed to download image");
        e
    })?;

    store::save_bytes(dest_dir, &filename_for(&url), &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    const PNG_1X1: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPj/HwADBwIAMCbHYQAAAABJRU5ErkJggg==";

    #[test]
    fn png_data_uri_round_trips_to_fixed_name() {
        let tmp = TempDir::new().unwrap();
        let saved = save_data_uri(PNG_1X1, tmp.path()).unwrap();
        assert_eq!(saved.filename, DATA_URI_FILENAME);

        let written = std::fs::read(tmp.path().join(DATA_URI_FILENAME)).unwrap();
        assert_eq!(&written[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(written, decode_data_uri(PNG_1X1).unwrap());
    }

    #[test]
    fn every_subtype_lands_in_the_same_file() {
        let tmp = TempDir::new().unwrap();
        save_data_uri("data:image/gif;base64,R0lG", tmp.path()).unwrap();
        save_data_uri("data:image/webp;base64,UklG", tmp.path()).unwrap();
        let written = std::fs::read(tmp.path().join(DATA_URI_FILENAME)).unwrap();
        assert_eq!(written, b"RIF");
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn wrapped_payload_is_accepted() {
        let bytes = decode_data_uri("data:image/png;base64,aGVs\n  bG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn malformed_data_uri_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        for uri in [
            "invalid_base64",
            "data:image/png,iVBORw0KGgo=",
            "data:image/;base64,AAAA",
            "data:image;base64,AAAA",
            " data:image/png;base64,AAAA",
        ] {
            let err = save_data_uri(uri, tmp.path()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedDataUri, "{uri}");
        }
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn corrupt_payload_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        for uri in [
            "data:image/png;base64,invalid!!",
            "data:image/png;base64,INVALID_DATA",
            "data:image/png;base64,abc",
        ] {
            let err = save_data_uri(uri, tmp.path()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::CorruptPayload, "{uri}");
        }
        assert!(!tmp.path().join(DATA_URI_FILENAME).exists());
    }

    #[test]
    fn relative_reference_joins_against_base() {
        let url = resolve_remote_url("/image.jpg", "http://example.com").unwrap();
        assert_eq!(url.as_str(), "http://example.com/image.jpg");

        let url = resolve_remote_url("img/a.png", "https://example.com/news/page").unwrap();
        assert_eq!(url.as_str(), "https://example.com/news/img/a.png");

        let url = resolve_remote_url("//cdn.example.com/a.webp", "https://example.com/").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/a.webp");
    }

    #[test]
    fn non_http_schemes_are_refused() {
        for src in ["ftp://example.com/image.jpg", "javascript:alert(1)", "file:///etc/passwd"] {
            let err = resolve_remote_url(src, "http://example.com").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedScheme, "{src}");
        }
    }

    #[test]
    fn unparseable_base_is_invalid_url() {
        let err = resolve_remote_url("/a.png", "not a url").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);
    }

    #[test]
    fn filename_is_last_segment_or_fallback() {
        let name = |u: &str| filename_for(&Url::parse(u).unwrap());
        assert_eq!(name("http://example.com/image.jpg"), "image.jpg");
        assert_eq!(name("http://example.com/a/b/photo.png?w=200#x"), "photo.png");
        assert_eq!(name("http://example.com/gallery/"), FALLBACK_FILENAME);
        assert_eq!(name("http://example.com"), FALLBACK_FILENAME);
    }

    #[tokio::test]
    async fn tag_without_src_fails_before_any_work() {
        let tmp = TempDir::new().unwrap();
        let client = reqwest::Client::new();
        for tag in [ImageTag::default(), ImageTag::with_src("")] {
            let err = resolve(&client, &tag, "http://127.0.0.1:9", tmp.path())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingSource);
        }
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn ftp_reference_never_reaches_the_network() {
        let tmp = TempDir::new().unwrap();
        let client = reqwest::Client::new();
        let tag = ImageTag::with_src("ftp://example.com/image.jpg");
        let err = resolve(&client, &tag, "http://example.com", tmp.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedScheme);
    }
}
