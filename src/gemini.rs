use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use log::{debug, error, info};
use crate::config::AppConfig;
use crate::error::ClientError;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

pub struct GeminiApi<'a> {
    client: &'a Client,
    base_url: &'a str,
    model: &'a str,
    api_key: &'a str,
}

impl<'a> GeminiApi<'a> {
    pub fn new(client: &'a Client, config: &'a AppConfig, api_key: &'a str) -> Self {
        Self {
            client,
            base_url: &config.gemini_base_url,
            model: &config.gemini_model,
            api_key,
        }
    }

    /// Sends a single prompt and returns the text of the first candidate.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, ClientError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        info!("Calling Gemini model {}", self.model);
        debug!("Gemini prompt: {}", prompt);

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key)])
            .json(&body)
            .send()
            .await?
            .json::<GenerateResponse>()
            .await?;

        if let Some(api_error) = response.error {
            error!("Gemini API error: {}", api_error.message);
            return Err(ClientError::Gemini(api_error.message));
        }

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            error!("Gemini returned an empty completion");
            return Err(ClientError::EmptyCompletion);
        }

        debug!("Gemini response: {}", text);
        Ok(text)
    }
}
