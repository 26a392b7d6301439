use std::path::PathBuf;
use std::time::Duration;

use ::config::{Config, Environment, Map};
use serde::Deserialize;

pub const DEFAULT_SOURCE_URL: &str =
    "https://intern.aiaxuropenings.com/scrape/7dbfdfa6-b88b-4339-9d91-dc6dd9ed2448";
pub const DEFAULT_CAPTION_URL: &str = "https://intern.aiaxuropenings.com/v1/chat/completions";
pub const DEFAULT_SUBMIT_URL: &str = "https://intern.aiaxuropenings.com/api/submit-response";
pub const DEFAULT_MODEL: &str = "microsoft-florence-2-large";
pub const DEFAULT_PROMPT: &str = "<DETAILED_CAPTION>";
pub const DEFAULT_MAX_TOKENS: u32 = 300;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const LOG_RETENTION_FILES: usize = 7;

const ENV_PREFIX: &str = "SCRAPE_RELAY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid SCRAPE_RELAY_* setting: {0}")]
    Load(#[from] ::config::ConfigError),
}

#[derive(Debug, Clone)]
pub struct CaptionSettings {
    pub endpoint: String,
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct NotifySettings {
    pub enabled: bool,
    pub caption: CaptionSettings,
    pub submit_endpoint: String,
    /// Explicit env file; `None` searches for `.env` upwards from the cwd.
    pub env_file: Option<PathBuf>,
    pub api_key_var: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub source_url: String,
    pub assets_dir: PathBuf,
    pub log_dir: PathBuf,
    pub request_timeout: Duration,
    pub insecure_ssl: bool,
    pub notify: NotifySettings,
}

impl Default for Settings {
    fn default() -> Self {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            assets_dir: root.join("assets"),
            log_dir: root.join("log"),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            insecure_ssl: false,
            notify: NotifySettings {
                enabled: true,
                caption: CaptionSettings {
                    endpoint: DEFAULT_CAPTION_URL.to_string(),
                    model: DEFAULT_MODEL.to_string(),
                    prompt: DEFAULT_PROMPT.to_string(),
                    max_tokens: DEFAULT_MAX_TOKENS,
                },
                submit_endpoint: DEFAULT_SUBMIT_URL.to_string(),
                env_file: None,
                api_key_var: DEFAULT_API_KEY_VAR.to_string(),
            },
        }
    }
}

/// `SCRAPE_RELAY_*` overrides, one field per variable. Unset and empty
/// variables stay `None` and keep the compiled-in default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvOverrides {
    source_url: Option<String>,
    assets_dir: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    timeout_secs: Option<u64>,
    insecure_ssl: Option<bool>,
    notify: Option<bool>,
    caption_url: Option<String>,
    model: Option<String>,
    prompt: Option<String>,
    max_tokens: Option<u32>,
    submit_url: Option<String>,
    env_file: Option<PathBuf>,
    api_key_var: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Same as [`Settings::from_env`] but reads variables from `vars`
    /// instead of the process environment. Keys are full variable names,
    /// e.g. `SCRAPE_RELAY_SOURCE_URL`.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load(Some(map))
    }

    fn load(source: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let overrides: EnvOverrides = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .ignore_empty(true)
                    .source(source),
            )
            .build()?
            .try_deserialize()?;

        let mut s = Settings::default();
        let notify = &mut s.notify;

        if let Some(v) = overrides.source_url {
            s.source_url = v;
        }
        if let Some(v) = overrides.assets_dir {
            s.assets_dir = v;
        }
        if let Some(v) = overrides.log_dir {
            s.log_dir = v;
        }
        if let Some(secs) = overrides.timeout_secs {
            s.request_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = overrides.insecure_ssl {
            s.insecure_ssl = v;
        }
        if let Some(v) = overrides.notify {
            notify.enabled = v;
        }
        if let Some(v) = overrides.caption_url {
            notify.caption.endpoint = v;
        }
        if let Some(v) = overrides.model {
            notify.caption.model = v;
        }
        if let Some(v) = overrides.prompt {
            notify.caption.prompt = v;
        }
        if let Some(v) = overrides.max_tokens {
            notify.caption.max_tokens = v;
        }
        if let Some(v) = overrides.submit_url {
            notify.submit_endpoint = v;
        }
        if overrides.env_file.is_some() {
            notify.env_file = overrides.env_file;
        }
        if let Some(v) = overrides.api_key_var {
            notify.api_key_var = v;
        }

        Ok(s)
    }
}
