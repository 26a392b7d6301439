use std::path::Path;

use serde_json::Value;

use crate::config::Settings;
use crate::error::ScrapeError;
use crate::models::{ImageTag, SavedImage};
use crate::{extract, fetch, notify, resolve};

#[derive(Debug)]
pub struct RunReport {
    pub saved: SavedImage,
    /// `None` when notification is disabled.
    pub caption: Option<Value>,
    pub submitted: bool,
}

pub struct Pipeline {
    settings: Settings,
    client: reqwest::Client,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Result<Self, ScrapeError> {
        let client = fetch::build_client(&settings)?;
        Ok(Self { settings, client })
    }

    /// fetch → locate → resolve → caption → submit, stopping at the first
    /// failure.
    pub async fn run(&self) -> Result<RunReport, ScrapeError> {
        let url = self.settings.source_url.as_str();
        tracing::info!(url, "starting image download process");
        tracing::debug!(save_path = %self.settings.assets_dir.display());

        let html = fetch::fetch_html(&self.client, url).await.map_err(|e| {
            tracing::error!(error = %e, "aborting: HTML fetch failed");
            e
        })?;

        tracing::info!("parsing HTML content");
        let tag = extract::locate_first_image(&html);
        if tag.is_none() {
            tracing::warn!("no image tag found in HTML content");
        }

        let saved = process_image(&self.client, tag.as_ref(), url, &self.settings.assets_dir)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "image download process failed");
                e
            })?;
        tracing::info!(file = %saved.filename, "image download process completed");

        if !self.settings.notify.enabled {
            tracing::info!("notification disabled; stopping after save");
            return Ok(RunReport {
                saved,
                caption: None,
                submitted: false,
            });
        }

        let caption = notify::caption_image(&self.client, &self.settings.notify, &saved.path)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "caption step failed");
                e
            })?;
        notify::submit_caption(&self.client, &self.settings.notify, &caption)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "submission step failed");
                e
            })?;

        Ok(RunReport {
            saved,
            caption: Some(caption),
            submitted: true,
        })
    }
}

/// Resolve an optional image tag. `None` is [`ScrapeError::NoImageFound`];
/// either way nothing is decoded or fetched unless a `src` is present.
pub async fn process_image(
    client: &reqwest::Client,
    tag: Option<&ImageTag>,
    base_url: &str,
    dest_dir: &Path,
) -> Result<SavedImage, ScrapeError> {
    let tag = tag.ok_or(ScrapeError::NoImageFound)?;
    resolve::resolve(client, tag, base_url, dest_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_tag_is_no_image_found() {
        let tmp = TempDir::new().unwrap();
        let client = reqwest::Client::new();
        let err = process_image(&client, None, "http://example.com", tmp.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoImageFound);
    }

    #[tokio::test]
    async fn bare_img_element_is_missing_source() {
        let tmp = TempDir::new().unwrap();
        let client = reqwest::Client::new();
        let tag = extract::locate_first_image("<img>");
        assert!(tag.is_some());
        let err = process_image(&client, tag.as_ref(), "http://example.com", tmp.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSource);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
