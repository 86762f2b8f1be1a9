use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Routing split by audience (public operations, authenticated resources).
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use auth::{AccessPolicy, CredentialVerifier, SaltedHashVerifier};
pub use config::AppConfig;
pub use error::{ApiError, RepositoryError};
pub use repository::{PostgresRepository, Repositories};

/// Common prefix of every resource route.
pub const API_PREFIX: &str = "/api";

/// ApiDoc
///
/// OpenAPI document for every handler annotated with `#[utoipa::path]`, served at
/// `/api-docs/openapi.json` and browsable through Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_projects, handlers::get_project, handlers::create_project,
        handlers::update_project, handlers::delete_project, handlers::list_spring_boot_projects,
        handlers::list_blog_posts, handlers::get_blog_post, handlers::create_blog_post,
        handlers::update_blog_post, handlers::delete_blog_post,
        handlers::list_contact_info, handlers::get_contact_info, handlers::create_contact_info,
        handlers::update_contact_info, handlers::delete_contact_info,
        handlers::health, handlers::db_console
    ),
    components(
        schemas(
            models::Project, models::BlogPost, models::ContactInfo,
            models::StoreStatus, models::TableStatus,
        )
    ),
    modifiers(&BasicAuthScheme),
    tags(
        (name = "projects", description = "Portfolio projects"),
        (name = "blogposts", description = "Blog posts"),
        (name = "contact", description = "Contact information"),
        (name = "operations", description = "Health and store status")
    )
)]
struct ApiDoc;

/// Registers the `basic_auth` scheme referenced by the protected paths.
struct BasicAuthScheme;

impl Modify for BasicAuthScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

/// AppState
///
/// The single, cloneable container shared by every request: the repositories, the
/// access policy built from configuration, and the configuration itself.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer, one repository per entity.
    pub repos: Repositories,
    /// Request authorization rules, evaluated by `auth::access_policy_middleware`.
    pub policy: AccessPolicy,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Wires the access policy from `config`, using a salted-hash verifier for the
    /// configured principal.
    pub fn new(repos: Repositories, config: AppConfig) -> Self {
        let verifier = std::sync::Arc::new(SaltedHashVerifier::new(config.admin.clone()));
        let policy = AccessPolicy::new(config.public_paths.clone(), verifier);
        Self {
            repos,
            policy,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Handlers pull only the component they need out of AppState.

impl FromRef<AppState> for Repositories {
    fn from_ref(app_state: &AppState) -> Repositories {
        app_state.repos.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies the access policy and the observability
/// layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Swagger UI plus the raw OpenAPI JSON.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .nest(API_PREFIX, authenticated::authenticated_routes())
        .with_state(state.clone());

    // 3. Access Policy: wraps every route, including docs and unknown paths, so the
    // allow-list alone decides what is reachable anonymously.
    let guarded = base_router.layer(middleware::from_fn_with_state(
        state.policy,
        auth::access_policy_middleware,
    ));

    // 4. Observability and Correlation Layers (outermost, so rejected requests are traced too)
    guarded
        .layer(
            ServiceBuilder::new()
                // 4a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 4b. Request Tracing: one span per request, tagged with the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 4c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 5. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span with the HTTP method, URI and `x-request-id`, so every
/// log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
