#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for emergency-room congestion.
//!
//! Every data request reads a snapshot from a shared [`SnapshotCache`]
//! and builds its view from it; nothing about one request outlives it.
//! Upstream fetch failures surface as `502 Bad Gateway` and never as a
//! partial dataset.

mod handlers;

use std::num::NonZeroU32;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use er_congestion_source::cache::SnapshotCache;
use er_congestion_source::settings::SourceSettings;

/// Shared application state.
pub struct AppState {
    /// Cached refresh pipeline.
    pub cache: Arc<SnapshotCache>,
    /// Row limit used when a request does not name one, and the most a
    /// request may ask for.
    pub default_rows: NonZeroU32,
}

impl AppState {
    #[must_use]
    pub const fn new(cache: Arc<SnapshotCache>, default_rows: NonZeroU32) -> Self {
        Self {
            cache,
            default_rows,
        }
    }
}

/// Initializes `pretty_env_logger` from `RUST_LOG`.
///
/// `reqwest` is capped at `info` unless `RUST_LOG` names it explicitly:
/// its debug output prints request URLs, and the EGEN URL carries the
/// service key.
pub fn init_logger() {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_module("reqwest", log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if let Err(e) = builder.try_init() {
        log::warn!("Logger already initialized: {e}");
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/labels", web::get().to(handlers::labels))
            .route("/regions", web::get().to(handlers::regions))
            .route("/hospitals", web::get().to(handlers::hospitals))
            .route("/markers", web::get().to(handlers::markers)),
    );
}

/// Starts the API server.
///
/// Binds to `BIND_ADDR` (default `127.0.0.1`) and `PORT` (default
/// `8080`). The caller provides the async runtime and initializes
/// logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP client cannot be built,
/// or the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(settings: &SourceSettings) -> std::io::Result<()> {
    let cache = SnapshotCache::from_settings(settings).map_err(std::io::Error::other)?;
    log::info!(
        "Snapshot cache TTL is {}s, default row limit {}",
        cache.ttl().as_secs(),
        settings.row_limit()
    );

    let state = web::Data::new(AppState::new(Arc::new(cache), settings.row_limit()));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
