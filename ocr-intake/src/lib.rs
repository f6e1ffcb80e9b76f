//! # ocr-intake: Upload Front Door for OCR Processing
//!
//! `ocr-intake` is the HTTP intake service for an OCR pipeline. It accepts document
//! uploads, enforces size and file-type policy, and persists accepted files under
//! stable UUID-based names so downstream OCR workers can pick them up without ever
//! trusting client-supplied filenames.
//!
//! ## Overview
//!
//! Anything a client uploads is untrusted: the filename may collide with another
//! upload, the extension may lie, and the body may be arbitrarily large. This crate
//! sits at the boundary and normalizes all of that before a file is allowed to land
//! on disk. Each accepted upload is assigned a fresh UUID, stored as
//! `<upload_folder>/<uuid>.<extension>`, and acknowledged with a JSON receipt that
//! ties the generated id back to the original filename.
//!
//! ### What It Does
//!
//! A client POSTs a multipart form to `/ocr/upload` with a single `file` field. The
//! service streams the body in, rejecting it as soon as the configured size limit is
//! exceeded, then checks the filename's extension against the configured allow-list.
//! Accepted content is written to the upload folder under a UUID-based name and the
//! client receives the id for later status queries. Every rejection is reported as a
//! JSON body of the form `{"detail": "..."}` so clients have one error shape to parse.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP
//! layer. There is no database: accepted uploads land on the filesystem and the
//! upload folder is the handoff point to the rest of the pipeline.
//!
//! The **API layer** ([`api`]) exposes the upload endpoint at `/ocr/upload`, plus a
//! `/healthz` liveness probe and interactive API documentation at `/docs`.
//!
//! The **storage layer** ([`storage`]) abstracts where accepted uploads go behind
//! the [`storage::FileStore`] trait. The default implementation writes to the local
//! filesystem, creating the upload folder on first use.
//!
//! The **configuration layer** ([`config`]) loads settings from a YAML file with
//! `OCR_INTAKE_`-prefixed environment variable overrides, and validates them before
//! the server starts.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use ocr_intake::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = ocr_intake::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     // Initialize telemetry (structured logging)
//!     ocr_intake::telemetry::init_telemetry()?;
//!
//!     // Create and start the application
//!     let app = Application::new(config)?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod errors;
pub mod openapi;
pub mod storage;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::config::CorsOrigin;
use crate::openapi::ApiDoc;
use crate::storage::{FileStore, LocalFileStore};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    http,
    routing::{get, post},
    Json, Router,
};
use bon::Builder;
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, instrument, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Extra request-body headroom on top of the configured upload limit.
///
/// Multipart framing (boundaries and part headers) consumes bytes beyond the file
/// content itself. The router caps request bodies at `max_file_size` plus this
/// slack: uploads over the limit but under the cap are rejected by the handler's
/// incremental size check, and bodies the cap cuts off mid-read are mapped to the
/// same oversize error when the handler classifies the failed read.
const UPLOAD_BODY_SLACK: u64 = 64 * 1024;

/// Shared state available to all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    /// Service configuration
    pub config: Config,
    /// Destination for accepted uploads
    pub storage: Arc<dyn FileStore>,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([http::Method::GET, http::Method::POST])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_credentials(config.cors.allow_credentials);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - The upload endpoint (`POST /ocr/upload`)
/// - A liveness probe (`GET /healthz`)
/// - Interactive API documentation at `/docs`
/// - CORS configuration
/// - Tracing middleware
///
/// The request body limit on the upload route is the configured `max_file_size`
/// plus a small allowance for multipart framing, so file-size enforcement happens
/// in the handler where it can produce the proper error body.
///
/// # Errors
///
/// Returns an error if the CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let body_limit = usize::try_from(state.config.ocr.max_file_size.saturating_add(UPLOAD_BODY_SLACK))
        .map_err(|_| anyhow::anyhow!("Upload body limit does not fit this platform's usize"))?;
    let cors = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route(
            "/ocr/upload",
            post(api::handlers::uploads::upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// The main application with all its resources.
///
/// `Application` ties together configuration, storage, and the HTTP router. Create
/// one with [`Application::new`] and run it with [`Application::serve`]:
///
/// 1. **Initialization**: builds the file store and the router from configuration
/// 2. **Serving**: binds the configured address and serves requests
/// 3. **Shutdown**: stops accepting connections when the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting OCR intake with configuration: {:#?}", config);

        let storage: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(config.ocr.upload_folder.clone()));

        let state = AppState::builder().config(config.clone()).storage(storage).build();
        let router = build_router(state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "OCR intake listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
