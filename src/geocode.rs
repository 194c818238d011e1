use reqwest::Client;
use serde::{Deserialize, Serialize};
use log::{debug, warn};
use crate::config::AppConfig;
use crate::credentials::{CredentialKind, CredentialResolver};
use crate::error::AppError;
use crate::google_places::{PlacesApi, PlacesStatus};
use crate::place_name;

pub const LOCATION_FOUND: &str = "Location found";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeRequest {
    pub lat: f64,
    pub lng: f64,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeAnswer {
    pub location_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_address: Option<String>,
}

pub async fn locate(
    client: &Client,
    config: &AppConfig,
    resolver: &CredentialResolver,
    request: GeocodeRequest,
) -> Result<GeocodeAnswer, AppError> {
    let api_key = resolver
        .resolve(CredentialKind::Places, request.api_key.as_deref())
        .ok_or(AppError::MissingApiKey)?;

    let response = PlacesApi::new(client, config, &api_key)
        .reverse_geocode(request.lat, request.lng)
        .await?;

    let first = match response.results.into_iter().next() {
        Some(result) if response.status == PlacesStatus::Ok => result,
        _ => {
            warn!("Geocoding returned {} without usable results", response.status);
            return Ok(GeocodeAnswer {
                location_name: LOCATION_FOUND.to_string(),
                full_address: None,
            });
        }
    };

    let resolved = place_name::resolve(&first.address_components, &first.formatted_address);
    debug!("Resolved place name: {:?}", resolved);

    Ok(GeocodeAnswer {
        location_name: resolved.final_name,
        full_address: Some(first.formatted_address),
    })
}
