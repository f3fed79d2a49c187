//! A small HTTP worker for user accounts and personal todo lists, backed by
//! flat JSON files and stateless signed session tokens.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod route;
pub mod schema;
pub mod store;
pub mod todo;

use std::sync::Arc;

pub use config::Config;
pub use error::{AppError, Result};
pub use route::create_router;

use auth::{AuthService, PasswordHasher, TokenManager};
use store::{TodoStore, UserStore};
use todo::TodoService;

// Struct representing the application state
pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub todos: TodoService,
}

impl AppState {
    /// Opens both stores, creating their files if needed, and wires the services.
    pub async fn build(config: Config) -> Result<Arc<Self>> {
        let users = UserStore::open(&config.users_file).await?;
        let todos = TodoStore::open(&config.todos_file).await?;

        let auth = AuthService::new(
            users,
            PasswordHasher::new(config.bcrypt_cost),
            TokenManager::new(&config.jwt_secret, config.jwt_expiration_hours),
        );

        Ok(Arc::new(Self {
            config,
            auth,
            todos: TodoService::new(todos),
        }))
    }
}
