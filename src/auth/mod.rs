//! Authentication: bcrypt password hashing, stateless HS256 session tokens,
//! and the service that ties both to the user store.

pub mod password;
pub mod service;
pub mod token;

pub use password::PasswordHasher;
pub use service::AuthService;
pub use token::TokenManager;
