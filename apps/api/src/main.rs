//! Mailtrail API composition root.

#![forbid(unsafe_code)]

mod dto;
mod error;
mod handlers;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use mailtrail_application::{AnalysisCache, AnalysisService, IngestService, TimelineService};
use mailtrail_core::AppError;
use mailtrail_infrastructure::{
    CsvLogParser, InMemoryAnalysisCache, InMemorySessionRepository, RedisAnalysisCache,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::state::AppState;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 500 * 1024 * 1024;
const ANALYSIS_CACHE_KEY_PREFIX: &str = "exchange_analysis";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    Url::parse(&frontend_url)
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(5000);
    let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

    let analysis_cache = build_analysis_cache();
    let sessions = Arc::new(InMemorySessionRepository::new());
    let analysis_service = AnalysisService::new(sessions.clone(), analysis_cache);
    let ingest_service = IngestService::new(
        Arc::new(CsvLogParser::new()),
        sessions,
        analysis_service.clone(),
    );
    let timeline_service = TimelineService::new(analysis_service.clone());

    let app_state = AppState {
        ingest_service,
        analysis_service,
        timeline_service,
    };

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/upload",
            post(handlers::upload::upload_handler).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/api/analysis/{session_id}/{analysis_type}",
            post(handlers::analysis::analysis_handler),
        )
        .route(
            "/api/analysis/{session_id}/exchange/timeline",
            post(handlers::timeline::timeline_handler),
        )
        .route(
            "/api/analysis/{session_id}/exchange/timeline/{record_index}/detail",
            post(handlers::timeline::detail_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "mailtrail-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

/// Builds the analysis cache: Redis when `REDIS_URL` is configured and the
/// client can be created, the in-memory fallback otherwise.
fn build_analysis_cache() -> Arc<dyn AnalysisCache> {
    let Ok(redis_url) = env::var("REDIS_URL") else {
        info!("REDIS_URL not set, using in-memory analysis cache");
        return Arc::new(InMemoryAnalysisCache::new());
    };

    match redis::Client::open(redis_url.as_str()) {
        Ok(client) => {
            info!("redis analysis cache enabled");
            Arc::new(RedisAnalysisCache::new(client, ANALYSIS_CACHE_KEY_PREFIX))
        }
        Err(error) => {
            warn!(%error, "invalid REDIS_URL, using in-memory analysis cache");
            Arc::new(InMemoryAnalysisCache::new())
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
