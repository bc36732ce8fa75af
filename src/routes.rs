// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{rankings, results, students},
    state::AppState,
    utils::jwt::{require_staff, require_token},
};

/// Assembles the main application router.
///
/// * Public read routes (rankings, results, students).
/// * Staff routes under `/api/admin`, behind token and role checks.
/// * Global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let ranking_routes = Router::new()
        .route("/subject", get(rankings::subject_leaderboard))
        .route("/overall", get(rankings::overall_leaderboard));

    let result_routes = Router::new()
        .route("/", get(results::list_results))
        .route("/{id}", get(results::get_result));

    let student_routes = Router::new()
        .route("/", get(students::list_students))
        .route("/{id}", get(students::get_student));

    let admin_routes = Router::new()
        .route("/rankings/compute", post(rankings::compute_ranks))
        .route("/results", post(results::create_result))
        .route(
            "/results/{id}",
            put(results::update_result).delete(results::delete_result),
        )
        .route("/students", post(students::create_student))
        .route("/students/{id}", delete(students::delete_student))
        // Double middleware protection: Auth first, then role check
        .layer(middleware::from_fn(require_staff))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            require_token,
        ));

    Router::new()
        .nest("/api/rankings", ranking_routes)
        .nest("/api/results", result_routes)
        .nest("/api/students", student_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from top to bottom)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
