mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use crate::config::{LogFormat, LoggingSettings, Settings, StorageBackend};
use crate::core::Matcher;
use crate::routes::matches::AppState;
use crate::services::{MemoryStore, PairingService, PairingStore, PostgresStore};
use std::sync::Arc;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path extraction errors
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pair_algo={},actix_web=info", logging.level)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.log_format() {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Compact => subscriber.init(),
    }
}

async fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn PairingStore>> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            let store = match &settings.storage.seed_file {
                Some(path) => MemoryStore::from_seed_file(path).map_err(|e| {
                    error!("Failed to seed memory store: {}", e);
                    std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
                })?,
                None => MemoryStore::new(),
            };
            info!("Using in-memory store");
            Ok(Arc::new(store))
        }
        StorageBackend::Postgres => {
            let database = settings.database.as_ref().ok_or_else(|| {
                error!("storage.backend = \"postgres\" requires a [database] section");
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "missing database settings")
            })?;

            let store = PostgresStore::from_settings(
                &database.url,
                database.max_connections,
                database.min_connections,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
            })?;

            info!(
                "PostgreSQL store initialized (max: {} connections)",
                database.max_connections.unwrap_or(10)
            );
            Ok(Arc::new(store))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("Configuration error: {}", e))
    })?;

    init_logging(&settings.logging);

    info!("Starting pairing service...");

    let store = build_store(&settings).await?;

    let partition = settings.matching.partition.to_partition().map_err(|e| {
        error!("Invalid partition settings: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let matcher = Matcher::new(partition);
    let default_strategy = settings.matching.default_strategy;

    info!(
        "Matcher initialized (default strategy: {}, partition: {:?})",
        default_strategy,
        matcher.partition()
    );

    let app_state = AppState {
        service: Arc::new(PairingService::new(store, matcher, default_strategy)),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
