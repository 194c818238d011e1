use std::fmt;
use reqwest::Client;
use serde::Deserialize;
use log::{debug, error, info};
use crate::config::AppConfig;
use crate::error::ClientError;

/// Status values documented for the Places and Geocoding web services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacesStatus {
    Ok,
    ZeroResults,
    NotFound,
    InvalidRequest,
    OverQueryLimit,
    OverDailyLimit,
    RequestDenied,
    UnknownError,
    #[serde(other)]
    Unrecognized,
}

impl PlacesStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacesStatus::Ok => "OK",
            PlacesStatus::ZeroResults => "ZERO_RESULTS",
            PlacesStatus::NotFound => "NOT_FOUND",
            PlacesStatus::InvalidRequest => "INVALID_REQUEST",
            PlacesStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            PlacesStatus::OverDailyLimit => "OVER_DAILY_LIMIT",
            PlacesStatus::RequestDenied => "REQUEST_DENIED",
            PlacesStatus::UnknownError => "UNKNOWN_ERROR",
            PlacesStatus::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// `OK` and `ZERO_RESULTS` are the two statuses that mean the call
    /// itself went through.
    pub fn is_success(&self) -> bool {
        matches!(self, PlacesStatus::Ok | PlacesStatus::ZeroResults)
    }
}

impl fmt::Display for PlacesStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
}

/// One place as returned by nearby search or text search.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub price_level: Option<u8>,
    pub vicinity: Option<String>,
    pub formatted_address: Option<String>,
    pub opening_hours: Option<OpeningHours>,
}

impl PlaceResult {
    pub fn open_now(&self) -> Option<bool> {
        self.opening_hours.as_ref().and_then(|hours| hours.open_now)
    }

    pub fn display_address(&self) -> Option<&str> {
        self.formatted_address.as_deref().or(self.vicinity.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub status: PlacesStatus,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaceDetails {
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsResponse {
    pub status: PlacesStatus,
    pub result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
pub struct FindPlaceResponse {
    pub status: PlacesStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    pub fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: PlacesStatus,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius: u32,
    pub keyword: String,
    pub min_price: u8,
    pub max_price: u8,
    pub open_now: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextQuery {
    pub query: String,
    pub lat: f64,
    pub lng: f64,
    pub radius: u32,
    pub min_price: u8,
    pub max_price: u8,
    pub open_now: bool,
}

/// Thin client over the Places and Geocoding JSON endpoints for a single
/// resolved key.
pub struct PlacesApi<'a> {
    client: &'a Client,
    base_url: &'a str,
    language: &'a str,
    api_key: &'a str,
}

impl<'a> PlacesApi<'a> {
    pub fn new(client: &'a Client, config: &'a AppConfig, api_key: &'a str) -> Self {
        Self {
            client,
            base_url: &config.google_maps_base_url,
            language: &config.places_language,
            api_key,
        }
    }

    pub async fn nearby_search(&self, query: &NearbyQuery) -> Result<SearchResponse, ClientError> {
        info!("Nearby search for '{}' within {}m", query.keyword, query.radius);
        let mut params = vec![
            ("location", format!("{},{}", query.lat, query.lng)),
            ("radius", query.radius.to_string()),
            ("keyword", query.keyword.clone()),
            ("minprice", query.min_price.to_string()),
            ("maxprice", query.max_price.to_string()),
        ];
        if query.open_now {
            params.push(("opennow", "true".to_string()));
        }
        let response: SearchResponse = self.get("place/nearbysearch/json", params).await?;
        log_status("Nearby search", response.status, &response.error_message);
        debug!("Nearby search returned {} results", response.results.len());
        Ok(response)
    }

    pub async fn text_search(&self, query: &TextQuery) -> Result<SearchResponse, ClientError> {
        info!("Text search for '{}' within {}m", query.query, query.radius);
        let mut params = vec![
            ("query", query.query.clone()),
            ("location", format!("{},{}", query.lat, query.lng)),
            ("radius", query.radius.to_string()),
            ("minprice", query.min_price.to_string()),
            ("maxprice", query.max_price.to_string()),
        ];
        if query.open_now {
            params.push(("opennow", "true".to_string()));
        }
        let response: SearchResponse = self.get("place/textsearch/json", params).await?;
        log_status("Text search", response.status, &response.error_message);
        debug!("Text search returned {} results", response.results.len());
        Ok(response)
    }

    pub async fn place_details(&self, place_id: &str) -> Result<DetailsResponse, ClientError> {
        info!("Getting place details for: {}", place_id);
        let params = vec![
            ("place_id", place_id.to_string()),
            ("fields", "reviews,formatted_address".to_string()),
        ];
        let response: DetailsResponse = self.get("place/details/json", params).await?;
        log_status("Place details", response.status, &None);
        Ok(response)
    }

    /// Minimal call used only to check that a key is accepted.
    pub async fn find_place_check(&self) -> Result<FindPlaceResponse, ClientError> {
        let params = vec![
            ("input", "Test".to_string()),
            ("inputtype", "textquery".to_string()),
            ("fields", "name".to_string()),
        ];
        self.get("place/findplacefromtext/json", params).await
    }

    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<GeocodeResponse, ClientError> {
        info!("Reverse geocoding {},{}", lat, lng);
        let params = vec![("latlng", format!("{},{}", lat, lng))];
        let response: GeocodeResponse = self.get("geocode/json", params).await?;
        log_status("Geocoding", response.status, &response.error_message);
        Ok(response)
    }

    async fn get<T>(&self, path: &str, mut params: Vec<(&str, String)>) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        params.push(("language", self.language.to_string()));
        debug!("Requesting {} with params: {:?}", url, params);
        params.push(("key", self.api_key.to_string()));

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await?
            .json::<T>()
            .await?;
        Ok(response)
    }
}

fn log_status(call: &str, status: PlacesStatus, error_message: &Option<String>) {
    if status.is_success() {
        debug!("{} status: {}", call, status);
    } else {
        error!(
            "{} failed with status {}: {}",
            call,
            status,
            error_message.as_deref().unwrap_or("no error message")
        );
    }
}
