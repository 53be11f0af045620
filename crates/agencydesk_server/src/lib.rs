//! HTTP server wiring for AgencyDesk (API, handlers, and shared state).

/// HTTP error mapping for API handlers.
pub mod error;
/// HTTP handlers for every entity and the public booking widget.
pub mod handlers;
/// Calendar and email relay webhooks.
pub mod integrations;
/// Caller identity from proxy-set request headers.
pub mod session;

pub use agencydesk_core::{config, models, AppError, Config, Database, Services, DEFAULT_PORT};
pub use integrations::Integrations;
pub use session::HeaderSession;

use agencydesk_core::constants::{EMAIL_HEADER, USER_HEADER};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'; base-uri 'self'; form-action 'self'";

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub config: Arc<Config>,
    pub integrations: Arc<Integrations>,
}

impl AppState {
    /// Construct shared application state.
    ///
    /// # Arguments
    /// - `config`: Loaded configuration.
    /// - `services`: Datastore and object storage for the actions.
    ///
    /// # Returns
    /// A new [`AppState`] with webhooks taken from `config`.
    pub fn new(config: Config, services: Services) -> Self {
        let integrations = Integrations::from_config(&config);
        Self::with_integrations(config, services, integrations)
    }

    /// Construct shared application state with explicit webhook clients.
    pub fn with_integrations(
        config: Config,
        services: Services,
        integrations: Integrations,
    ) -> Self {
        Self {
            services,
            config: Arc::new(config),
            integrations: Arc::new(integrations),
        }
    }
}

/// Create the application router with all routes and middleware.
///
/// # Arguments
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
///
/// # Returns
/// Configured `axum::Router`.
pub fn create_app(state: AppState, allow_public_access: bool) -> Router {
    let cors_port = state.config.port;
    create_app_with_cors_port(state, allow_public_access, cors_port)
}

/// Resolve the listener address from env var overrides and security policy.
///
/// # Arguments
/// - `config`: Server configuration containing the configured `port`.
/// - `allow_public_access`: Whether non-loopback bind targets are permitted.
///
/// # Returns
/// A validated socket address that enforces loopback when public access is disabled.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = match std::env::var("BIND") {
        Ok(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        Err(_) => default_bind,
    };

    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }

    tracing::warn!(
        "Non-loopback bind {} requested without ALLOW_PUBLIC_ACCESS; forcing 127.0.0.1",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

fn cors_layer(allow_public_access: bool, cors_port: u16) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    if allow_public_access {
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any);
    }

    let origins: Vec<HeaderValue> = [
        format!("http://localhost:{}", cors_port),
        format!("http://127.0.0.1:{}", cors_port),
    ]
    .into_iter()
    .filter_map(|origin| origin.parse().ok())
    .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(USER_HEADER),
            HeaderName::from_static(EMAIL_HEADER),
        ])
}

fn create_app_with_cors_port(state: AppState, allow_public_access: bool, cors_port: u16) -> Router {
    let body_limit = state.config.max_upload_size;

    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/folders",
            get(handlers::folder::list_folders).post(handlers::folder::create_folder),
        )
        .route(
            "/api/folders/:id",
            put(handlers::folder::rename_folder).delete(handlers::folder::delete_folder),
        )
        .route(
            "/api/folders/:id/files",
            get(handlers::file::list_files).post(handlers::file::upload_file),
        )
        .route(
            "/api/files/:id",
            put(handlers::file::update_file).delete(handlers::file::delete_file),
        )
        .route(
            "/api/tasks",
            get(handlers::task::list_tasks).post(handlers::task::create_task),
        )
        .route(
            "/api/tasks/:id",
            put(handlers::task::update_task).delete(handlers::task::delete_task),
        )
        .route(
            "/api/quotes",
            get(handlers::quote::list_quotes).post(handlers::quote::create_quote),
        )
        .route(
            "/api/quotes/:id",
            put(handlers::quote::update_quote).delete(handlers::quote::delete_quote),
        )
        .route(
            "/api/quotes/:id/invoice",
            post(handlers::quote::convert_to_invoice),
        )
        .route(
            "/api/booking/availability",
            get(handlers::booking::availability),
        )
        .route("/api/booking/promo", post(handlers::booking::validate_promo))
        .route("/api/booking", post(handlers::booking::submit_booking))
        .route("/api/contact", post(handlers::booking::submit_contact))
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors_layer(allow_public_access, cors_port))
                .layer(SetResponseHeaderLayer::overriding(
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static(CONTENT_SECURITY_POLICY),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                )),
        )
}

fn listener_cors_port(listener: &tokio::net::TcpListener, fallback_port: u16) -> u16 {
    listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(fallback_port)
}

/// Run the Axum server with graceful shutdown support.
///
/// # Arguments
/// - `listener`: Bound TCP listener for the server.
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
/// - `shutdown_signal`: Future that resolves when shutdown should start.
///
/// # Returns
/// `Ok(())` when the server exits cleanly.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    allow_public_access: bool,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let cors_port = listener_cors_port(&listener, state.config.port);
    let app = create_app_with_cors_port(state, allow_public_access, cors_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
