use std::env;
use log::debug;
use url::Url;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:9999";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
const DEFAULT_PLACES_LANGUAGE: &str = "zh-TW";
const DEFAULT_REPLY_LANGUAGE: &str = "Traditional Chinese";
const DEFAULT_GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_LOG_DIR: &str = "logs";

/// Process configuration, read once at start-up and shared read-only
/// with every request handler.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub google_maps_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,
    pub bind_address: String,
    pub gemini_model: String,
    pub places_language: String,
    pub reply_language: String,
    pub google_maps_base_url: String,
    pub gemini_base_url: String,
    pub log_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            google_maps_api_key: None,
            gemini_api_key: None,
            admin_user: None,
            admin_password: None,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            places_language: DEFAULT_PLACES_LANGUAGE.to_string(),
            reply_language: DEFAULT_REPLY_LANGUAGE.to_string(),
            google_maps_base_url: DEFAULT_GOOGLE_MAPS_BASE_URL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Empty
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let google_maps_api_key = get("GOOGLE_MAPS_API_KEY").or_else(|| get("Maps_API_KEY"));

        let config = Self {
            google_maps_api_key,
            gemini_api_key: get("GEMINI_API_KEY"),
            admin_user: get("ADMIN_USER"),
            admin_password: get("ADMIN_PASSWORD"),
            bind_address: get("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            places_language: get("PLACES_LANGUAGE").unwrap_or(defaults.places_language),
            reply_language: get("REPLY_LANGUAGE").unwrap_or(defaults.reply_language),
            google_maps_base_url: base_url(get("GOOGLE_MAPS_BASE_URL"), defaults.google_maps_base_url)?,
            gemini_base_url: base_url(get("GEMINI_BASE_URL"), defaults.gemini_base_url)?,
            log_dir: get("LOG_DIR").unwrap_or(defaults.log_dir),
        };

        debug!("Loaded configuration, bind address {}", config.bind_address);
        Ok(config)
    }
}

fn base_url(value: Option<String>, default: String) -> Result<String, String> {
    let raw = value.unwrap_or(default);
    Url::parse(&raw).map_err(|e| format!("Invalid base URL {}: {}", raw, e))?;
    Ok(raw.trim_end_matches('/').to_string())
}
