use std::sync::Arc;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handler::*, middleware::mw_require_auth, AppState};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Configure CORS settings for the application
    let cors = CorsLayer::new()
        .allow_origin(app_state.config.cors_origin.clone())
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    Router::new()
        .route("/api/me", get(me))
        .route("/api/todos", get(get_todos).post(create_todo))
        .route_layer(from_fn_with_state(app_state.clone(), mw_require_auth))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/verify-token", post(verify_token))
        .route("/health", get(health_checker_handler))
        .route("/", get(root_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
