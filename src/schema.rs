// Request bodies. Every field is optional so that a missing field reaches the
// services and produces the categorical error message instead of a rejection.

use crate::model::{Todo, UserProfile};

// Struct representing the request body for registering or logging in
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct CredentialsSchema {
    pub username: Option<String>,
    pub password: Option<String>,
}

// Struct representing the request body for creating a new Todo
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct CreateTodoSchema {
    pub content: Option<String>,
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct VerifyTokenSchema {
    pub token: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct TodoListResponse {
    pub todos: Vec<Todo>,
    pub results: usize,
}
