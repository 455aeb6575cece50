use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use station_server::domain::StationCandidate;
use station_server::prices::{
    CachedPriceClient, MockPriceClient, PriceCacheConfig, PriceClient, PriceClientConfig,
    StationFeed,
};
use station_server::ranker::Policy;
use station_server::routing::{RoutingClient, RoutingConfig};
use station_server::session::LiveSearchSession;
use station_server::settings::SettingsStore;
use station_server::web::{AppState, create_router};

/// Default path for the persisted policy.
const DEFAULT_SETTINGS_PATH: &str = "settings.json";

/// Demo records served when no price API key is configured.
fn demo_stations() -> Vec<StationCandidate> {
    let stations = [
        ("Q8", "Viale Certosa 133, Milano", 1.789, 45.4906, 9.1390),
        ("Eni", "Via Novara 311, Milano", 1.812, 45.4801, 9.0920),
        ("IP", "Via Gallarate 98, Milano", 1.774, 45.4969, 9.1211),
        ("Esso", "Viale Fulvio Testi 220, Milano", 1.825, 45.5181, 9.2072),
        ("Tamoil", "Via Ripamonti 340, Milano", 1.758, 45.4173, 9.2087),
    ];

    stations
        .into_iter()
        .enumerate()
        .map(|(i, (name, address, price, lat, lon))| StationCandidate {
            operator: Some(name.to_string()),
            address: Some(address.to_string()),
            price: Some(price),
            latitude: Some(lat),
            longitude: Some(lon),
            last_update: None,
            rank: Some(i as i32),
        })
        .collect()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Price feed: real client when a key is configured, demo data otherwise
    let station_feed = match std::env::var("STATION_API_KEY") {
        Ok(api_key) if !api_key.is_empty() => {
            let mut config = PriceClientConfig::new(&api_key);
            if let Ok(url) = std::env::var("STATION_API_URL") {
                config = config.with_base_url(url);
            }
            let client = PriceClient::new(config).expect("Failed to create price client");
            StationFeed::Cached(CachedPriceClient::new(client, &PriceCacheConfig::default()))
        }
        _ => {
            warn!("STATION_API_KEY not set; serving demo station data");
            StationFeed::Mock(MockPriceClient::new(demo_stations()))
        }
    };

    // Routing client (route distances stay disabled until the policy asks
    // for them, so a missing key only matters in prefer-route mode)
    let routing_key = std::env::var("ROUTING_API_KEY").unwrap_or_else(|_| {
        warn!("ROUTING_API_KEY not set; route-distance requests will fail");
        String::new()
    });
    let mut routing_config = RoutingConfig::new(&routing_key);
    if let Ok(url) = std::env::var("ROUTING_API_URL") {
        routing_config = routing_config.with_base_url(url);
    }
    let routing_client = RoutingClient::new(routing_config).expect("Failed to create routing client");

    // Policy: last saved settings, or defaults
    let settings_path =
        std::env::var("SETTINGS_PATH").unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());
    let settings = SettingsStore::new(&settings_path);
    let policy = settings.load().unwrap_or_else(|| {
        info!("no saved settings at {settings_path}; using defaults");
        Policy::default()
    });

    let session = LiveSearchSession::new(station_feed, routing_client, policy);
    let state = AppState::new(session, settings);
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("LISTEN_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));

    info!("Fuel station finder listening on http://{addr}");
    info!("API endpoints:");
    info!("  GET  /health          - Health check");
    info!("  POST /session/start   - Start the live search");
    info!("  POST /session/stop    - Stop the live search");
    info!("  GET  /session/policy  - Read the search policy");
    info!("  PUT  /session/policy  - Replace the search policy");
    info!("  POST /location        - Deliver a location fix");
    info!("  GET  /stations        - Ranked station snapshot");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
