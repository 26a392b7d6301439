use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use serde_json::Value;

use crate::config::NotifySettings;
use crate::credentials;
use crate::error::{describe_request_error, NotifyStage, ScrapeError};
use crate::models::CaptionRequest;

const BODY_SNIPPET_MAX: usize = 512;

/// Send the image at `image_path` for captioning and return the JSON reply.
pub async fn caption_image(
    client: &reqwest::Client,
    settings: &NotifySettings,
    image_path: &Path,
) -> Result<Value, ScrapeError> {
    let stage = NotifyStage::Caption;
    tracing::info!(endpoint = %settings.caption.endpoint, "requesting image caption");

    let bytes = std::fs::read(image_path).map_err(|e| {
        ScrapeError::notify(
            stage,
            format!("cannot read {}: {}", image_path.display(), e),
        )
    })?;
    let encoded = general_purpose::STANDARD.encode(&bytes);
    let payload = CaptionRequest::new(
        &settings.caption.model,
        &settings.caption.prompt,
        &encoded,
        settings.caption.max_tokens,
    );

    let response = post_json(client, settings, stage, &settings.caption.endpoint, &payload).await?;
    let caption = response
        .json::<Value>()
        .await
        .map_err(|e| ScrapeError::notify(stage, format!("response is not JSON: {}", e)))?;

    tracing::info!("caption request successful");
    tracing::debug!(response = %caption, "caption response");
    Ok(caption)
}

/// Forward the caption response verbatim to the submission endpoint.
pub async fn submit_caption(
    client: &reqwest::Client,
    settings: &NotifySettings,
    caption: &Value,
) -> Result<(), ScrapeError> {
    tracing::info!(endpoint = %settings.submit_endpoint, "submitting caption");
    let response = post_json(
        client,
        settings,
        NotifyStage::Submit,
        &settings.submit_endpoint,
        caption,
    )
    .await?;

    let body = response.text().await.unwrap_or_default();
    tracing::info!("submission accepted");
    tracing::debug!(response = %snippet(&body), "submission response");
    Ok(())
}

async fn post_json<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    settings: &NotifySettings,
    stage: NotifyStage,
    endpoint: &str,
    body: &T,
) -> Result<reqwest::Response, ScrapeError> {
    let api_key = credentials::load_api_key(settings.env_file.as_deref(), &settings.api_key_var)?;
    tracing::debug!(%stage, auth = "bearer", "credentials loaded");

    let response = client
        .post(endpoint)
        .bearer_auth(api_key)
        .json(body)
        .send()
        .await
        .map_err(|e| ScrapeError::notify(stage, describe_request_error(&e)))?;

    let status = response.status();
    tracing::debug!(%stage, %status, "response status");
    if status != reqwest::StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%stage, %status, body = %snippet(&body), "request failed");
        return Err(ScrapeError::notify(stage, format!("HTTP {}", status)));
    }
    Ok(response)
}

fn snippet(body: &str) -> &str {
    if body.len() <= BODY_SNIPPET_MAX {
        return body;
    }
    let mut end = BODY_SNIPPET_MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
