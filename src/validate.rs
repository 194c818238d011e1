use reqwest::Client;
use serde::{Deserialize, Serialize};
use log::{info, warn};
use crate::config::AppConfig;
use crate::credentials::{CredentialKind, CredentialResolver};
use crate::gemini::GeminiApi;
use crate::google_places::PlacesApi;

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub key: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Validation {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Validation {
    fn ok() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()) }
    }
}

/// Checks a key by making the cheapest possible call with it. Failures are
/// reported in the body, never as an HTTP error.
pub async fn validate_key(
    client: &Client,
    config: &AppConfig,
    resolver: &CredentialResolver,
    request: ValidateRequest,
) -> Validation {
    if request.key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        return Validation::failed("No key provided");
    }

    let kind = match request.kind.as_str() {
        "google" => CredentialKind::Places,
        "gemini" => CredentialKind::Language,
        other => {
            warn!("Unknown key type: {}", other);
            return Validation::failed("Unknown key type");
        }
    };

    let key = match resolver.resolve(kind, request.key.as_deref()) {
        Some(key) => key,
        None => return Validation::failed("No server-side key is configured"),
    };

    let validation = match kind {
        CredentialKind::Places => match PlacesApi::new(client, config, &key).find_place_check().await {
            Ok(found) if found.status.is_success() => Validation::ok(),
            Ok(found) => Validation::failed(
                found.error_message.unwrap_or_else(|| found.status.to_string()),
            ),
            Err(e) => Validation::failed(e.to_string()),
        },
        CredentialKind::Language => match GeminiApi::new(client, config, &key).generate_content("Hi").await {
            Ok(_) => Validation::ok(),
            Err(e) => Validation::failed(e.to_string()),
        },
    };

    info!("Validated {} key: success={}", kind.as_str(), validation.success);
    validation
}
