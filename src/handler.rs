use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::{
    error::AppError,
    model::{CurrentUser, UserProfile},
    schema::{AuthResponse, CreateTodoSchema, CredentialsSchema, TodoListResponse, VerifyTokenSchema},
    AppState,
};

// Handler for the health checker route
pub async fn health_checker_handler(State(data): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": data.config.worker_name,
    }))
}

// Handler for the root route, describing the API
pub async fn root_handler(State(data): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "service": data.config.worker_name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "register": "POST /api/register",
            "login": "POST /api/login",
            "me": "GET /api/me",
            "create_todo": "POST /api/todos",
            "list_todos": "GET /api/todos",
            "verify_token": "POST /api/verify-token",
            "health": "GET /health"
        }
    }))
}

// Handler for registering a new user; responds with the user and a token
pub async fn register(
    State(data): State<Arc<AppState>>,
    body: Option<Json<CredentialsSchema>>,
) -> Result<impl IntoResponse, AppError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();

    let (user, token) = data
        .auth
        .register(
            body.username.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

// Handler for logging in an existing user
pub async fn login(
    State(data): State<Arc<AppState>>,
    body: Option<Json<CredentialsSchema>>,
) -> Result<impl IntoResponse, AppError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();

    let (user, token) = data
        .auth
        .login(
            body.username.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::OK, Json(AuthResponse { user, token })))
}

// Handler for the authenticated user's own profile
pub async fn me(
    State(data): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = data
        .auth
        .find_user(current_user.user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(json!({ "user": UserProfile::from(&user) })))
}

// Handler for checking a token without touching a protected route
pub async fn verify_token(
    State(data): State<Arc<AppState>>,
    body: Option<Json<VerifyTokenSchema>>,
) -> impl IntoResponse {
    let token = body
        .and_then(|Json(body)| body.token)
        .filter(|token| !token.is_empty());

    let token = match token {
        Some(token) => token,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "valid": false, "error": "Token is required" })),
            )
        }
    };

    match data.auth.verify(&token) {
        Some(user) => (StatusCode::OK, Json(json!({ "valid": true, "user": user }))),
        None => (
            StatusCode::OK,
            Json(json!({ "valid": false, "error": AppError::InvalidToken.to_string() })),
        ),
    }
}

// Handler for creating a new Todo owned by the caller
pub async fn create_todo(
    State(data): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    body: Option<Json<CreateTodoSchema>>,
) -> Result<impl IntoResponse, AppError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();

    let todo = data
        .todos
        .create(current_user.user_id, body.content.as_deref().unwrap_or_default())
        .await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

// Handler for getting the caller's Todo items, newest first
pub async fn get_todos(
    State(data): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let todos = data.todos.list(current_user.user_id).await?;

    Ok(Json(TodoListResponse {
        results: todos.len(),
        todos,
    }))
}
