// [rust] Module declarations - organize database-related functionality
pub mod memory; // In-process store used by tests and local runs
pub mod models; // Data structures representing database entities and API payloads
pub mod queries; // Postgres implementation of the store
pub mod update; // Allow-listed partial updates and their SQL builder

pub use memory::MemoryWorkerStore;
pub use models::*;
pub use queries::PgWorkerStore;
pub use update::{build_update_query, WorkerField, WorkerUpdate};

// [library] SQLx - Rust SQL toolkit with async support
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppError;

// [rust] Arc enables sharing the connection pool across async tasks
pub type Database = Arc<Pool<Postgres>>;

// [business] Database connection factory - establishes pool and runs migrations
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<Database, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    // [business] Tables are created only when missing, existing data is untouched
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(Arc::new(pool))
}

/// Storage operations the service needs. Every implementation must bind
/// values as parameters; no caller-provided text is ever spliced into SQL.
#[async_trait]
pub trait WorkerStore: Send + Sync {
    async fn find_active_worker_by_login(&self, login: &str) -> Result<Option<Worker>, AppError>;

    async fn find_active_worker_by_personal_id(
        &self,
        cpf: &str,
    ) -> Result<Option<Worker>, AppError>;

    async fn find_worker_by_id(&self, id: i32) -> Result<Option<Worker>, AppError>;

    /// Applies a non-empty update in one statement and returns the new record.
    async fn update_worker_fields(&self, id: i32, update: &WorkerUpdate)
        -> Result<Worker, AppError>;

    async fn update_worker_password(&self, cpf: &str, password_hash: &str)
        -> Result<(), AppError>;

    async fn find_scale(
        &self,
        subsidiarie_id: i32,
        worker_id: i32,
    ) -> Result<Option<ScaleRecord>, AppError>;

    async fn list_worker_courses(&self, worker_id: i32) -> Result<Vec<WorkerCourse>, AppError>;

    async fn find_course_file(&self, course_id: i32) -> Result<Option<Vec<u8>>, AppError>;

    async fn insert_worker_course(&self, course: NewWorkerCourse) -> Result<(), AppError>;

    /// Cheap round trip used by the liveness check.
    async fn ping(&self) -> Result<(), AppError>;
}
