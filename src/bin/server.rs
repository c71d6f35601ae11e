use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::{self, Filter};

use resto_auth::auth::AuthService;
use resto_auth::config::AuthConfig;
use resto_auth::handlers::{auth_routes, handle_rejection, health_route, AuthApi};
use resto_auth::storage::{create_memory_storage, StorageProvider};

#[tokio::main]
async fn main() {
    // Initialize env
    match dotenvy::dotenv() {
        Ok(_) => info!("Environment variables loaded from .env file"),
        Err(e) => warn!("Failed to load .env file: {}", e),
    };

    // Initialize logging
    env_logger::init();

    // Load config from environment
    let config = match AuthConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration: host={}, port={}, access_ttl={}s, refresh_ttl={}s",
        config.host,
        config.port,
        config.access_token_ttl.num_seconds(),
        config.refresh_token_ttl.num_seconds()
    );

    let storage: Arc<dyn StorageProvider> = create_memory_storage();
    let service = match AuthService::new(&config, storage.clone()) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            error!("Failed to initialize auth service: {}", e);
            std::process::exit(1);
        }
    };

    // Combine routes
    let routes = auth_routes(AuthApi::new(service, &config))
        .or(health_route(storage))
        .recover(handle_rejection)
        .with(warp::log("resto_auth"));

    // Build the server address
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting Resto Auth server on {}", addr);
    warp::serve(routes).run(addr).await;
}
