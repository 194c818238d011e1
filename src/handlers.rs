use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use crate::config::AppConfig;
use crate::credentials::CredentialResolver;
use crate::error::AppError;
use crate::geocode::{self, GeocodeRequest};
use crate::recommend::{self, RecommendRequest};
use crate::utils;
use crate::validate::{self, ValidateRequest, Validation};
use crate::wish_pool::{self, WishRequest};

const RECOMMEND_BUSY: &str = "System busy, please try again later";
const WISH_BUSY: &str = "The wish pool was interrupted, please try again";

/// Shared, read-only state handed to every request.
pub struct AppState {
    pub client: Client,
    pub config: AppConfig,
    pub resolver: CredentialResolver,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            client: Client::new(),
            resolver: CredentialResolver::new(&config),
            config,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_format: Option<serde_json::Value>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/geocode", web::post().to(locate_user))
        .route("/recommend", web::post().to(recommend_restaurant))
        .route("/smart-search", web::post().to(grant_wish))
        .route("/validate-keys", web::post().to(validate_keys));
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "message": "Server is running"
    }))
}

async fn locate_user(body: web::Bytes, state: web::Data<AppState>) -> HttpResponse {
    let request_id = utils::request_id();
    info!("Request {}: Geocode request received", request_id);

    let req = match parse_body::<GeocodeRequest>(&request_id, &body, geocode_format) {
        Ok(req) => req,
        Err(response) => return response,
    };

    match geocode::locate(&state.client, &state.config, &state.resolver, req).await {
        Ok(answer) => {
            info!("Request {}: Resolved location '{}'", request_id, answer.location_name);
            HttpResponse::Ok().json(answer)
        }
        Err(e) => {
            let message = e.to_string();
            error_response(&request_id, e, &message)
        }
    }
}

async fn recommend_restaurant(body: web::Bytes, state: web::Data<AppState>) -> HttpResponse {
    let request_id = utils::request_id();
    info!("Request {}: Recommendation request received", request_id);

    let req = match parse_body::<RecommendRequest>(&request_id, &body, recommend_format) {
        Ok(req) => req,
        Err(response) => return response,
    };

    match recommend::recommend(&state.client, &state.config, &state.resolver, req).await {
        Ok(recommendation) => {
            info!("Request {}: Recommended {}", request_id, recommendation.name);
            HttpResponse::Ok().json(recommendation)
        }
        Err(e) => error_response(&request_id, e, RECOMMEND_BUSY),
    }
}

async fn grant_wish(body: web::Bytes, state: web::Data<AppState>) -> HttpResponse {
    let request_id = utils::request_id();
    info!("Request {}: Wish pool request received", request_id);

    let req = match parse_body::<WishRequest>(&request_id, &body, wish_format) {
        Ok(req) => req,
        Err(response) => return response,
    };

    match wish_pool::smart_search(&state.client, &state.config, &state.resolver, req).await {
        Ok(result) => {
            info!("Request {}: Wish granted with {}", request_id, result.name);
            HttpResponse::Ok().json(result)
        }
        Err(e) => error_response(&request_id, e, WISH_BUSY),
    }
}

async fn validate_keys(body: web::Bytes, state: web::Data<AppState>) -> HttpResponse {
    let request_id = utils::request_id();
    info!("Request {}: Key validation request received", request_id);

    let req = match serde_json::from_slice::<ValidateRequest>(&body) {
        Ok(req) => req,
        Err(e) => {
            error!("Request {}: Invalid request format: {}", request_id, e);
            return HttpResponse::BadRequest()
                .json(Validation::failed(format!("Invalid request format: {}", e)));
        }
    };

    let validation = validate::validate_key(&state.client, &state.config, &state.resolver, req).await;
    HttpResponse::Ok().json(validation)
}

fn parse_body<T: DeserializeOwned>(
    request_id: &str,
    body: &[u8],
    expected_format: fn() -> serde_json::Value,
) -> Result<T, HttpResponse> {
    debug!("Request {}: Raw request body: {}", request_id, String::from_utf8_lossy(body));

    serde_json::from_slice::<T>(body).map_err(|e| {
        let error_msg = format!("Invalid request format: {}", e);
        error!("Request {}: {}", request_id, error_msg);
        HttpResponse::BadRequest().json(ErrorResponse {
            error: error_msg,
            expected_format: Some(expected_format()),
        })
    })
}

/// The one place a handler turns a failure into its JSON error body.
fn error_response(request_id: &str, err: AppError, busy: &str) -> HttpResponse {
    let status = err.status_code();
    if status.is_server_error() {
        error!("Request {}: {:?}", request_id, err);
    } else {
        warn!("Request {}: {}", request_id, err);
    }

    HttpResponse::build(status).json(ErrorResponse {
        error: err.user_message(busy),
        expected_format: None,
    })
}

fn geocode_format() -> serde_json::Value {
    serde_json::json!({ "lat": 24.1631, "lng": 120.6401, "apiKey": "your-google-maps-key" })
}

fn recommend_format() -> serde_json::Value {
    serde_json::json!({
        "lat": 24.1631,
        "lng": 120.6401,
        "radius": 1000,
        "cuisine": "anything",
        "budget": 2,
        "time": "now",
        "googleApiKey": "your-google-maps-key",
        "geminiApiKey": "your-gemini-key"
    })
}

fn wish_format() -> serde_json::Value {
    serde_json::json!({
        "query": "somewhere quiet with good dumplings",
        "lat": 24.1631,
        "lng": 120.6401,
        "googleApiKey": "your-google-maps-key",
        "geminiApiKey": "your-gemini-key"
    })
}
