use reqwest::Client;
use serde::{Deserialize, Serialize};
use log::{debug, info, warn};
use crate::config::AppConfig;
use crate::credentials::{CredentialKind, CredentialResolver};
use crate::error::AppError;
use crate::gemini::GeminiApi;
use crate::google_places::{NearbyQuery, PlacesApi};
use crate::selection::{pick_random, quality_pool, NEARBY_RATING_THRESHOLD};
use crate::utils;

pub const DEFAULT_RADIUS_METERS: u32 = 1000;
pub const MAX_BUDGET: u8 = 4;
pub const ANY_CUISINE: &str = "anything";
const GENERIC_KEYWORD: &str = "food";
const REVIEW_TEXT_LIMIT: usize = 2000;
const REVIEW_SEPARATOR: &str = "\n---\n";
const NO_CANDIDATES: &str = "No restaurants nearby match your filters. Try a larger search radius?";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, deserialize_with = "utils::lenient_number")]
    pub radius: Option<f64>,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default, deserialize_with = "utils::lenient_number")]
    pub budget: Option<f64>,
    #[serde(default)]
    pub time: String,
    pub google_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub price_level: Option<u8>,
    pub address: Option<String>,
    pub open_now: Option<bool>,
    pub place_id: String,
    pub google_maps_url: String,
    pub ai_summary: String,
}

/// Price bounds for a budget level: `max = budget`, `min = budget - 1`
/// floored at zero. Levels outside 0..=4 are clamped first.
pub fn price_bounds(budget: u8) -> (u8, u8) {
    let max = budget.min(MAX_BUDGET);
    (max.saturating_sub(1), max)
}

pub fn search_keyword(cuisine: &str) -> String {
    let cuisine = cuisine.trim();
    if cuisine.is_empty() || cuisine == ANY_CUISINE {
        GENERIC_KEYWORD.to_string()
    } else {
        format!("{} restaurant", cuisine)
    }
}

/// Price bounds for the request. Without a usable budget the whole 0..=4
/// range is searched.
fn budget_bounds(budget: Option<f64>) -> (u8, u8) {
    match budget {
        Some(b) if b.is_finite() => price_bounds(b.round().clamp(0.0, f64::from(MAX_BUDGET)) as u8),
        _ => (0, MAX_BUDGET),
    }
}

fn search_radius(radius: Option<f64>) -> u32 {
    match radius {
        Some(r) if r.is_finite() && r >= 1.0 => r.round().min(f64::from(u32::MAX)) as u32,
        _ => DEFAULT_RADIUS_METERS,
    }
}

pub fn nearby_query(request: &RecommendRequest) -> NearbyQuery {
    let (min_price, max_price) = budget_bounds(request.budget);
    NearbyQuery {
        lat: request.lat,
        lng: request.lng,
        radius: search_radius(request.radius),
        keyword: search_keyword(&request.cuisine),
        min_price,
        max_price,
        open_now: request.time == "now",
    }
}

pub fn summary_prompt(name: &str, rating: Option<f64>, reviews: &str, reply_language: &str) -> String {
    let rating = rating.map_or_else(|| "unrated".to_string(), |r| r.to_string());
    let reviews = if reviews.trim().is_empty() {
        "(No detailed reviews are available for this place.)"
    } else {
        reviews
    };

    format!(
        "Role: you are an honest friend who loves good food.\n\
         Task: using only the real reviews below, judge whether this restaurant is worth a visit.\n\
         \n\
         Restaurant: {name} (rating {rating})\n\
         Reviews:\n\
         {reviews}\n\
         \n\
         List, in order:\n\
         1. Highlights: what do people consistently recommend?\n\
         2. Caveats: what do people complain about (service, waiting time, noise)? \
         If there is nothing notable, say the reviews are generally positive.\n\
         \n\
         Finish with a one-line verdict. Do not invent anything the reviews do not say.\n\
         Keep the whole answer under 100 characters. Reply in {reply_language}."
    )
}

pub async fn recommend(
    client: &Client,
    config: &AppConfig,
    resolver: &CredentialResolver,
    request: RecommendRequest,
) -> Result<Recommendation, AppError> {
    let google_key = resolver.resolve(CredentialKind::Places, request.google_api_key.as_deref());
    let gemini_key = resolver.resolve(CredentialKind::Language, request.gemini_api_key.as_deref());
    let (google_key, gemini_key) = match (google_key, gemini_key) {
        (Some(g), Some(m)) => (g, m),
        _ => return Err(AppError::MissingCredentials),
    };

    let places = PlacesApi::new(client, config, &google_key);
    let query = nearby_query(&request);
    debug!("Nearby query: {:?}", query);

    let search = places.nearby_search(&query).await?;
    if !search.status.is_success() {
        return Err(AppError::Upstream(search.status));
    }
    if search.results.is_empty() {
        info!("No candidates for '{}' within {}m", query.keyword, query.radius);
        return Err(AppError::NotFound(NO_CANDIDATES));
    }

    let pool = quality_pool(&search.results, NEARBY_RATING_THRESHOLD);
    let selected = pick_random(&pool).ok_or(AppError::NotFound(NO_CANDIDATES))?;
    info!(
        "Selected {} ({}) from a pool of {}",
        selected.name,
        selected.place_id,
        pool.len()
    );

    let details = places.place_details(&selected.place_id).await?;
    let details = details.result;
    if details.is_none() {
        warn!("No details returned for {}", selected.place_id);
    }

    let reviews = details
        .as_ref()
        .map(|d| {
            d.reviews
                .iter()
                .map(|r| r.text.as_str())
                .collect::<Vec<_>>()
                .join(REVIEW_SEPARATOR)
        })
        .unwrap_or_default();
    let reviews = utils::truncate_chars(&reviews, REVIEW_TEXT_LIMIT);

    let address = details
        .as_ref()
        .and_then(|d| d.formatted_address.clone())
        .or_else(|| selected.vicinity.clone());

    let prompt = summary_prompt(&selected.name, selected.rating, reviews, &config.reply_language);
    let ai_summary = GeminiApi::new(client, config, &gemini_key)
        .generate_content(&prompt)
        .await?;

    Ok(Recommendation {
        name: selected.name.clone(),
        rating: selected.rating,
        user_ratings_total: selected.user_ratings_total,
        price_level: selected.price_level,
        address,
        open_now: selected.open_now(),
        place_id: selected.place_id.clone(),
        google_maps_url: utils::maps_url(&selected.name, &selected.place_id),
        ai_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> RecommendRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn budget_maps_to_price_bounds() {
        assert_eq!(price_bounds(0), (0, 0));
        assert_eq!(price_bounds(1), (0, 1));
        assert_eq!(price_bounds(2), (1, 2));
        assert_eq!(price_bounds(3), (2, 3));
        assert_eq!(price_bounds(4), (3, 4));
        assert_eq!(price_bounds(9), (3, 4));
    }

    #[test]
    fn cuisine_maps_to_keyword() {
        assert_eq!(search_keyword("anything"), "food");
        assert_eq!(search_keyword(""), "food");
        assert_eq!(search_keyword("ramen"), "ramen restaurant");
        assert_eq!(search_keyword(" 火鍋 "), "火鍋 restaurant");
    }

    #[test]
    fn query_uses_defaults_for_missing_fields() {
        let query = nearby_query(&request(serde_json::json!({ "lat": 24.16, "lng": 120.64 })));
        assert_eq!(query.radius, DEFAULT_RADIUS_METERS);
        assert_eq!(query.keyword, "food");
        assert_eq!((query.min_price, query.max_price), (0, 4));
        assert!(!query.open_now);
    }

    #[test]
    fn blank_budget_searches_every_price_level() {
        let query = nearby_query(&request(serde_json::json!({ "lat": 0.0, "lng": 0.0, "budget": "" })));
        assert_eq!((query.min_price, query.max_price), (0, 4));

        let query = nearby_query(&request(serde_json::json!({ "lat": 0.0, "lng": 0.0, "budget": 0 })));
        assert_eq!((query.min_price, query.max_price), (0, 0));
    }

    #[test]
    fn query_reads_client_filters() {
        let query = nearby_query(&request(serde_json::json!({
            "lat": 24.16,
            "lng": 120.64,
            "radius": "2500",
            "cuisine": "sushi",
            "budget": "2",
            "time": "now"
        })));
        assert_eq!(query.radius, 2500);
        assert_eq!(query.keyword, "sushi restaurant");
        assert_eq!((query.min_price, query.max_price), (1, 2));
        assert!(query.open_now);
    }

    #[test]
    fn zero_radius_falls_back_to_default() {
        let query = nearby_query(&request(serde_json::json!({ "lat": 0.0, "lng": 0.0, "radius": 0 })));
        assert_eq!(query.radius, DEFAULT_RADIUS_METERS);
    }

    #[test]
    fn only_now_restricts_to_open_places() {
        let query = nearby_query(&request(serde_json::json!({ "lat": 0.0, "lng": 0.0, "time": "later" })));
        assert!(!query.open_now);
    }

    #[test]
    fn prompt_embeds_reviews_or_says_none_exist() {
        let prompt = summary_prompt("Noodle Bar", Some(4.5), "Broth is rich", "English");
        assert!(prompt.contains("Noodle Bar (rating 4.5)"));
        assert!(prompt.contains("Broth is rich"));
        assert!(prompt.contains("Reply in English"));

        let prompt = summary_prompt("Noodle Bar", None, "  ", "English");
        assert!(prompt.contains("No detailed reviews are available"));
        assert!(prompt.contains("rating unrated"));
    }
}
