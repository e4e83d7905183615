// [rust] Library root - the binary in main.rs and the tests in tests/ build on these modules
pub mod auth; // Bearer token guard and login
pub mod config; // Configuration management and environment variable handling
pub mod db; // Models, storage trait, Postgres and in-memory stores
pub mod error; // Caller-facing error taxonomy
pub mod health; // Health endpoint and periodic database check
pub mod security; // Password hashing and access token signing
pub mod web; // Application state and HTTP routing
pub mod workers; // Worker self-service operations

pub use config::Config;
pub use error::AppError;
pub use web::{create_app_router, AppState};
