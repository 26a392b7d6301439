#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Once;

use scrape_image_relay::Settings;
use wiremock::MockServer;

static INIT: Once = Once::new();

pub const API_KEY: &str = "test-key";

pub const PNG_1X1: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPj/HwADBwIAMCbHYQAAAABJRU5ErkJggg==";

pub fn init_test_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Write an env file holding the test API key and return its path.
pub fn write_env_file(dir: &Path) -> PathBuf {
    let path = dir.join(".env");
    std::fs::write(&path, format!("OPENAI_API_KEY={}\n", API_KEY)).expect("write env file");
    path
}

/// Settings pointing every endpoint at `server`.
pub fn settings_for(server: &MockServer, dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.source_url = format!("{}/scrape/page", server.uri());
    settings.assets_dir = dir.join("assets");
    settings.log_dir = dir.join("log");
    settings.notify.caption.endpoint = format!("{}/v1/chat/completions", server.uri());
    settings.notify.submit_endpoint = format!("{}/api/submit-response", server.uri());
    settings.notify.env_file = Some(write_env_file(dir));
    settings
}
