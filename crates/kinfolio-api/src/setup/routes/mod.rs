//! Route configuration and setup.
//!
//! Health checks live in [health](health); everything else is behind the
//! bearer-token middleware.

mod health;

use crate::auth::middleware::{auth_middleware, AuthState};
use crate::constants::{API_PREFIX, OPENAPI_JSON_PATH};
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use kinfolio_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// JSON bodies only; posts carry media as URLs.
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = AuthState {
        jwt: state.jwt.clone(),
        profiles: state.db.profiles.clone(),
    };

    let public_routes = public_routes();
    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        Arc::new(auth_state),
        auth_middleware,
    ));

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let app = public_routes
        .merge(protected_routes)
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_JSON_PATH).path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route(
            OPENAPI_JSON_PATH,
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Profiles
        .route(
            &format!("{}/profiles/me", API_PREFIX),
            get(handlers::profiles::get_my_profile).put(handlers::profiles::update_my_profile),
        )
        .route(
            &format!("{}/profiles/{{id}}", API_PREFIX),
            get(handlers::profiles::get_profile),
        )
        // Families
        .route(
            &format!("{}/families", API_PREFIX),
            post(handlers::families::create_family),
        )
        .route(
            &format!("{}/families/me", API_PREFIX),
            get(handlers::families::get_my_family),
        )
        .route(
            &format!("{}/families/join", API_PREFIX),
            post(handlers::families::join_family),
        )
        .route(
            &format!("{}/families/leave", API_PREFIX),
            post(handlers::families::leave_family),
        )
        .route(
            &format!("{}/families/me/invite-code", API_PREFIX),
            post(handlers::families::regenerate_invite_code),
        )
        // Subjects
        .route(
            &format!("{}/subjects", API_PREFIX),
            get(handlers::subjects::list_subjects).post(handlers::subjects::create_subject),
        )
        // Posts
        .route(
            &format!("{}/posts", API_PREFIX),
            post(handlers::posts::create_post),
        )
        .route(
            &format!("{}/posts/{{id}}", API_PREFIX),
            get(handlers::posts::get_post)
                .put(handlers::posts::update_post)
                .delete(handlers::posts::delete_post),
        )
        .route(
            &format!("{}/posts/{{id}}/comments", API_PREFIX),
            post(handlers::comments::create_comment),
        )
        .route(
            &format!("{}/posts/{{id}}/review-requests", API_PREFIX),
            post(handlers::peer_reviews::request_reviews),
        )
        .route(
            &format!("{}/review-requests/pending", API_PREFIX),
            get(handlers::peer_reviews::list_pending_reviews),
        )
        .route(
            &format!("{}/authors/{{id}}/posts", API_PREFIX),
            get(handlers::posts::list_author_posts),
        )
        .route(
            &format!("{}/authors/{{id}}/heatmap", API_PREFIX),
            get(handlers::posts::get_author_heatmap),
        )
        .route(
            &format!("{}/timeline", API_PREFIX),
            get(handlers::timeline::get_timeline),
        )
        // Presentations
        .route(
            &format!("{}/presentations", API_PREFIX),
            post(handlers::presentations::create_presentation),
        )
        .route(
            &format!("{}/presentations/{{id}}", API_PREFIX),
            get(handlers::presentations::get_presentation)
                .put(handlers::presentations::update_presentation)
                .delete(handlers::presentations::delete_presentation),
        )
        // Announcements
        .route(
            &format!("{}/announcements", API_PREFIX),
            get(handlers::announcements::list_announcements)
                .post(handlers::announcements::create_announcement),
        )
        // Dashboard
        .route(
            &format!("{}/dashboard", API_PREFIX),
            get(handlers::dashboard::get_dashboard),
        )
}
