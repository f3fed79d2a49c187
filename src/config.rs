use std::{env, net::SocketAddr, path::PathBuf};

use axum::http::HeaderValue;

use crate::error::{AppError, Result};

const DEV_JWT_SECRET: &str = "todo_worker_dev_secret_key";

#[derive(Clone, Debug)]
pub struct Config {
    pub worker_name: String,
    pub bind_addr: SocketAddr,
    pub users_file: PathBuf,
    pub todos_file: PathBuf,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub cors_origin: HeaderValue,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let worker_name = env::var("WORKER_NAME").unwrap_or_else(|_| "todo-worker".to_string());

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
        let bind_addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|_| AppError::Config(format!("invalid bind address {}:{}", host, port)))?;

        let users_file: PathBuf = env::var("USERS_FILE")
            .unwrap_or_else(|_| "data/users.json".to_string())
            .into();
        let todos_file: PathBuf = env::var("TODOS_FILE")
            .unwrap_or_else(|_| "data/todos.json".to_string())
            .into();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, falling back to the development secret");
            DEV_JWT_SECRET.to_string()
        });

        let jwt_expiration_hours: i64 = env::var("JWT_EXPIRATION_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .map_err(|_| AppError::Config("JWT_EXPIRATION_HOURS must be a valid number".into()))?;

        let bcrypt_cost: u32 = env::var("BCRYPT_COST")
            .map(|cost| cost.parse())
            .unwrap_or(Ok(bcrypt::DEFAULT_COST))
            .map_err(|_| AppError::Config("BCRYPT_COST must be a valid number".into()))?;

        let cors_origin = env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .parse::<HeaderValue>()
            .map_err(|_| AppError::Config("CORS_ORIGIN is not a valid header value".into()))?;

        Ok(Self {
            worker_name,
            bind_addr,
            users_file,
            todos_file,
            jwt_secret,
            jwt_expiration_hours,
            bcrypt_cost,
            cors_origin,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.is_empty() {
            return Err(AppError::Config("JWT_SECRET must not be empty".into()));
        }

        if self.jwt_expiration_hours < 1 || self.jwt_expiration_hours > 720 {
            return Err(AppError::Config(
                "JWT_EXPIRATION_HOURS must be between 1 and 720 (30 days)".into(),
            ));
        }

        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(AppError::Config("BCRYPT_COST must be between 4 and 31".into()));
        }

        Ok(())
    }
}
