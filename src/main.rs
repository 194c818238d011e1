use actix_web::{web, App, HttpServer, middleware::Logger};
use dotenv::dotenv;
use std::env;
use log::{info, warn};

mod config;
mod credentials;
mod error;
mod gemini;
mod geocode;
mod google_places;
mod handlers;
mod logging;
mod place_name;
mod recommend;
mod selection;
mod utils;
mod validate;
mod wish_pool;

use config::AppConfig;
use handlers::AppState;

fn is_secret(name: &str) -> bool {
    let upper = name.to_uppercase();
    upper.contains("KEY") || upper.contains("PASSWORD") || upper.contains("ADMIN")
}

fn log_environment_variables() {
    let mut env_vars = std::collections::BTreeMap::new();
    for (key, value) in env::vars() {
        let shown = if key.to_uppercase().ends_with("API_KEY") {
            utils::mask_api_key(&value)
        } else if is_secret(&key) {
            "*".repeat(8)
        } else {
            value
        };
        env_vars.insert(key, shown);
    }
    match serde_json::to_string_pretty(&env_vars) {
        Ok(vars) => info!("Environment variables: {}", vars),
        Err(e) => info!("Could not render environment variables: {}", e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return Ok(());
        }
    };

    if let Err(e) = logging::setup_logging(&config.log_dir) {
        eprintln!("Failed to set up logging: {}", e);
        return Ok(());
    }

    log_environment_variables();

    if config.google_maps_api_key.is_none() || config.gemini_api_key.is_none() {
        warn!("Server-side API keys are incomplete; admin passphrases will not resolve");
    }

    let bind_address = config.bind_address.clone();
    let state = web::Data::new(AppState::new(config));

    info!("Starting dinepick server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
