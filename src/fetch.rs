use std::time::Duration;

use crate::config::Settings;
use crate::error::{describe_request_error, ScrapeError};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

// ── HTTP client ──────────────────────────────────────────────────────────────

/// Build the single client shared by every stage of a run.
pub fn build_client(settings: &Settings) -> Result<reqwest::Client, ScrapeError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/*;q=0.8,*/*;q=0.5",
        ),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        reqwest::header::HeaderValue::from_static("en-US,en;q=0.9"),
    );

    let mut builder = reqwest::ClientBuilder::new()
        .connect_timeout(Duration::from_secs(5).min(settings.request_timeout))
        .timeout(settings.request_timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .user_agent(USER_AGENT)
        .default_headers(headers);

    if settings.insecure_ssl {
        tracing::warn!("TLS certificate validation disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .map_err(|e| ScrapeError::Fetch(format!("client init failed: {}", e)))
}

// ── Content fetcher ──────────────────────────────────────────────────────────

/// GET `url` and return the body as text. Any transport error or non-2xx
/// status is a [`ScrapeError::Fetch`].
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, ScrapeError> {
    tracing::info!(url, "fetching HTML content");
    let response = get_ok(client, url).await?;
    let body = response
        .text()
        .await
        .map_err(|e| ScrapeError::Fetch(describe_request_error(&e)))?;
    tracing::info!(bytes = body.len(), "HTML content fetched");
    Ok(body)
}

/// GET `url` and return the raw body bytes.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, ScrapeError> {
    let response = get_ok(client, url).await?;
    let body = response
        .bytes()
        .await
        .map_err(|e| ScrapeError::Fetch(describe_request_error(&e)))?;
    Ok(body.to_vec())
}

async fn get_ok(client: &reqwest::Client, url: &str) -> Result<reqwest::Response, ScrapeError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ScrapeError::Fetch(describe_request_error(&e)))?;

    let status = response.status();
    tracing::debug!(%status, url, "response received");
    if !status.is_success() {
        return Err(ScrapeError::Fetch(format!("upstream returned {} for {}", status, url)));
    }
    Ok(response)
}
