use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use taste_match::config::{LoggingSettings, Settings, SourceKind, SourceSettings};
use taste_match::core::matcher::{Matcher, DEFAULT_LIMIT, DEFAULT_PARALLEL_THRESHOLD};
use taste_match::routes::{self, handle_query_payload_error, matches::AppState};
use taste_match::services::{
    InMemoryTasteSource, MatchService, TasteApiClient, TasteSource, DEFAULT_MAX_CONCURRENT_LOADS,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize logging; `RUST_LOG` overrides the configured level
fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn build_source(settings: &SourceSettings) -> io::Result<Arc<dyn TasteSource>> {
    let to_io = |e: taste_match::services::TasteSourceError| io::Error::new(io::ErrorKind::Other, e.to_string());

    match settings.kind {
        SourceKind::Memory => {
            let source = match &settings.seed_path {
                Some(path) => InMemoryTasteSource::from_path(path).map_err(to_io)?,
                None => {
                    info!("No seed_path configured, starting with an empty in-memory source");
                    InMemoryTasteSource::default()
                }
            };
            Ok(Arc::new(source))
        }
        SourceKind::Http => {
            let endpoint = settings.endpoint.clone().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "source.endpoint is required for the http source")
            })?;
            let timeout = Duration::from_secs(settings.timeout_secs.unwrap_or(30));
            let client = TasteApiClient::new(endpoint, settings.api_key.clone().unwrap_or_default(), timeout)
                .map_err(to_io)?;
            Ok(Arc::new(client))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidData, e.to_string())
    })?;

    init_tracing(&settings.logging);

    info!("Starting taste-match service...");

    let source = build_source(&settings.source).map_err(|e| {
        error!("Failed to initialize taste source: {}", e);
        e
    })?;

    info!("Taste source initialized ({})", source.name());

    let matcher = Matcher::new(
        settings
            .matching
            .parallel_threshold
            .unwrap_or(DEFAULT_PARALLEL_THRESHOLD),
    );

    let max_concurrent_loads = settings
        .matching
        .max_concurrent_loads
        .unwrap_or(DEFAULT_MAX_CONCURRENT_LOADS);

    let service = MatchService::new(source, matcher).with_max_concurrent_loads(max_concurrent_loads);

    let app_state = AppState {
        service: Arc::new(service),
        default_limit: settings.matching.default_limit.unwrap_or(DEFAULT_LIMIT),
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
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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
