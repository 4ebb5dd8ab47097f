use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::state::AppState;
use crate::utils::Config;

pub fn create_router(state: AppState) -> Router {
    let cors_layer = create_cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_check))
        // Auth
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        // Profile
        .route("/profile", get(handlers::view_profile))
        .route("/profile/edit", patch(handlers::edit_profile))
        .route("/profile/password", patch(handlers::change_password))
        // Connection requests
        .route("/request/send", post(handlers::send_request))
        .route("/request/review/{request_id}", post(handlers::review_request))
        // Caller's view of the graph
        .route("/user/requests", get(handlers::requests_received))
        .route("/user/connections", get(handlers::connections))
        .route("/feed", get(handlers::feed))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn create_cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods([
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::OPTIONS,
    ]);

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        // Default to permissive for development
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        // Cookies only travel to explicitly listed origins
        cors.allow_origin(origins)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
    }
}

async fn health_check() -> &'static str {
    "OK"
}
