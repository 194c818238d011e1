//! Free-text "wish" search: the model turns the wish into search
//! parameters, a text search finds candidates, and the model explains the
//! pick back to the user.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use log::{debug, info, warn};
use crate::config::AppConfig;
use crate::credentials::{CredentialKind, CredentialResolver};
use crate::error::AppError;
use crate::gemini::GeminiApi;
use crate::google_places::{PlacesApi, TextQuery};
use crate::recommend::MAX_BUDGET;
use crate::selection::{pick_random, quality_pool, WISH_RATING_THRESHOLD};
use crate::utils;

pub const WISH_RADIUS_METERS: u32 = 2000;
const NO_MATCH: &str = "Couldn't find a place that matches your wish...";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishRequest {
    #[serde(default)]
    pub query: String,
    pub lat: f64,
    pub lng: f64,
    pub google_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WishResult {
    pub name: String,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub address: Option<String>,
    pub google_maps_url: String,
    pub ai_reason: String,
}

/// Structured search parameters extracted from a wish.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchIntent {
    pub keyword: String,
    pub min_price: u8,
    pub max_price: u8,
}

impl Default for SearchIntent {
    fn default() -> Self {
        Self {
            keyword: "food".to_string(),
            min_price: 0,
            max_price: MAX_BUDGET,
        }
    }
}

/// The model's reply as written. Prices may arrive as floats, strings or
/// not at all.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIntent {
    #[serde(default)]
    keyword: String,
    #[serde(default, deserialize_with = "utils::lenient_number")]
    min_price: Option<f64>,
    #[serde(default, deserialize_with = "utils::lenient_number")]
    max_price: Option<f64>,
}

fn price_level(value: f64) -> Option<u8> {
    let level = value.round();
    (level.is_finite() && (0.0..=f64::from(MAX_BUDGET)).contains(&level)).then(|| level as u8)
}

/// Missing bounds widen to the full range; a bound out of range or an
/// inverted pair drops both back to 0..=4.
fn price_range(min: Option<f64>, max: Option<f64>) -> Option<(u8, u8)> {
    let min = match min {
        Some(v) => price_level(v)?,
        None => 0,
    };
    let max = match max {
        Some(v) => price_level(v)?,
        None => MAX_BUDGET,
    };
    (min <= max).then_some((min, max))
}

/// Result of parsing model output: either the parsed value or the default
/// that replaced it.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    Fallback(T),
}

impl<T> ParseOutcome<T> {
    pub fn into_inner(self) -> T {
        match self {
            ParseOutcome::Parsed(value) | ParseOutcome::Fallback(value) => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseOutcome::Fallback(_))
    }
}

pub fn parse_search_intent(raw: &str) -> ParseOutcome<SearchIntent> {
    let cleaned = utils::strip_code_fences(raw);
    match serde_json::from_str::<RawIntent>(&cleaned) {
        Ok(raw) if raw.keyword.trim().is_empty() => {
            warn!("Model returned no search keyword, using defaults. Raw: {}", cleaned);
            ParseOutcome::Fallback(SearchIntent::default())
        }
        Ok(raw) => {
            let (min_price, max_price) = price_range(raw.min_price, raw.max_price).unwrap_or_else(|| {
                warn!(
                    "Model returned unusable prices {:?}..{:?}, searching every price level",
                    raw.min_price, raw.max_price
                );
                (0, MAX_BUDGET)
            });
            ParseOutcome::Parsed(SearchIntent {
                keyword: raw.keyword.trim().to_string(),
                min_price,
                max_price,
            })
        }
        Err(e) => {
            warn!("Could not parse search parameters ({}), using defaults. Raw: {}", e, cleaned);
            ParseOutcome::Fallback(SearchIntent::default())
        }
    }
}

pub fn intent_prompt(wish: &str) -> String {
    format!(
        "The user is looking for a restaurant.\n\
         Their wish: {wish}\n\
         \n\
         Reply with JSON only, in exactly this shape:\n\
         {{\n  \"keyword\": \"search keyword\",\n  \"minPrice\": 0,\n  \"maxPrice\": 4\n}}\n\
         Prices range from 0 (cheapest) to 4 (most expensive). No markdown."
    )
}

pub fn reason_prompt(wish: &str, name: &str, rating: Option<f64>, reply_language: &str) -> String {
    let rating = rating.map_or_else(|| "unrated".to_string(), |r| r.to_string());
    format!(
        "The user's wish: {wish}\n\
         Recommended restaurant: {name} (rating {rating})\n\
         \n\
         Talk to the user like a friend, in {reply_language}:\n\
         1. Why does this place match their wish?\n\
         2. Mention one possible drawback, if there is one.\n\
         Be honest and warm, and keep it under 150 characters."
    )
}

pub async fn smart_search(
    client: &Client,
    config: &AppConfig,
    resolver: &CredentialResolver,
    request: WishRequest,
) -> Result<WishResult, AppError> {
    let google_key = resolver.resolve(CredentialKind::Places, request.google_api_key.as_deref());
    let gemini_key = resolver.resolve(CredentialKind::Language, request.gemini_api_key.as_deref());
    let (google_key, gemini_key) = match (google_key, gemini_key) {
        (Some(g), Some(m)) => (g, m),
        _ => return Err(AppError::MissingCredentials),
    };

    let gemini = GeminiApi::new(client, config, &gemini_key);
    let places = PlacesApi::new(client, config, &google_key);

    let raw_intent = gemini.generate_content(&intent_prompt(&request.query)).await?;
    let intent = parse_search_intent(&raw_intent);
    if intent.is_fallback() {
        info!("Wish '{}' fell back to the default search", request.query);
    }
    let intent = intent.into_inner();
    debug!("Search intent: {:?}", intent);

    let query = TextQuery {
        query: intent.keyword,
        lat: request.lat,
        lng: request.lng,
        radius: WISH_RADIUS_METERS,
        min_price: intent.min_price,
        max_price: intent.max_price,
        open_now: true,
    };
    let search = places.text_search(&query).await?;
    if !search.status.is_success() {
        return Err(AppError::Upstream(search.status));
    }
    if search.results.is_empty() {
        info!("No wish matches for '{}'", query.query);
        return Err(AppError::NotFound(NO_MATCH));
    }

    let pool = quality_pool(&search.results, WISH_RATING_THRESHOLD);
    let selected = pick_random(&pool).ok_or(AppError::NotFound(NO_MATCH))?;
    info!("Wish pick: {} ({}) from a pool of {}", selected.name, selected.place_id, pool.len());

    let prompt = reason_prompt(&request.query, &selected.name, selected.rating, &config.reply_language);
    let ai_reason = gemini.generate_content(&prompt).await?;

    Ok(WishResult {
        name: selected.name.clone(),
        rating: selected.rating,
        user_ratings_total: selected.user_ratings_total,
        address: selected.display_address().map(str::to_string),
        google_maps_url: utils::maps_url(&selected.name, &selected.place_id),
        ai_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_model_output() {
        let raw = "```json\n{\"keyword\": \"spicy hotpot\", \"minPrice\": 1, \"maxPrice\": 3}\n```";
        assert_eq!(
            parse_search_intent(raw),
            ParseOutcome::Parsed(SearchIntent {
                keyword: "spicy hotpot".to_string(),
                min_price: 1,
                max_price: 3,
            })
        );
    }

    #[test]
    fn malformed_output_falls_back_to_default() {
        let outcome = parse_search_intent("Sure! You might like ramen.");
        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_inner(), SearchIntent::default());
    }

    fn intent(keyword: &str, min_price: u8, max_price: u8) -> SearchIntent {
        SearchIntent { keyword: keyword.to_string(), min_price, max_price }
    }

    #[test]
    fn prices_are_read_leniently() {
        assert_eq!(
            parse_search_intent(r#"{"keyword":"ramen","minPrice":1.0,"maxPrice":2}"#),
            ParseOutcome::Parsed(intent("ramen", 1, 2))
        );
        assert_eq!(
            parse_search_intent(r#"{"keyword":"ramen","minPrice":"0","maxPrice":"3"}"#),
            ParseOutcome::Parsed(intent("ramen", 0, 3))
        );
    }

    #[test]
    fn missing_prices_widen_to_full_range() {
        assert_eq!(
            parse_search_intent(r#"{"keyword":"ramen","maxPrice":2}"#),
            ParseOutcome::Parsed(intent("ramen", 0, 2))
        );
        assert_eq!(
            parse_search_intent(r#"{"keyword":"ramen"}"#),
            ParseOutcome::Parsed(intent("ramen", 0, 4))
        );
    }

    #[test]
    fn unusable_prices_keep_the_keyword() {
        for raw in [
            r#"{"keyword":"steak","minPrice":3,"maxPrice":1}"#,
            r#"{"keyword":"steak","minPrice":0,"maxPrice":7}"#,
            r#"{"keyword":"steak","minPrice":-1,"maxPrice":2}"#,
        ] {
            assert_eq!(parse_search_intent(raw), ParseOutcome::Parsed(intent("steak", 0, 4)));
        }
    }

    #[test]
    fn blank_keyword_falls_back() {
        assert!(parse_search_intent(r#"{"keyword":" ","minPrice":0,"maxPrice":2}"#).is_fallback());
        assert!(parse_search_intent(r#"{"minPrice":0,"maxPrice":2}"#).is_fallback());
    }

    #[test]
    fn default_intent_searches_for_food_at_any_price() {
        let intent = SearchIntent::default();
        assert_eq!(intent.keyword, "food");
        assert_eq!((intent.min_price, intent.max_price), (0, 4));
    }

    #[test]
    fn prompts_carry_the_wish() {
        let prompt = intent_prompt("somewhere quiet for dumplings");
        assert!(prompt.contains("somewhere quiet for dumplings"));
        assert!(prompt.contains("\"minPrice\": 0"));

        let prompt = reason_prompt("dumplings", "Din Tai Fung", Some(4.6), "English");
        assert!(prompt.contains("Din Tai Fung (rating 4.6)"));
        assert!(prompt.contains("drawback"));
    }
}
