use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::{info, warn};

use crate::{
    auth::AuthenticatedWorker,
    db::{MessageResponse, PasswordChangeRequest, WorkerStore},
    error::AppError,
    security::CredentialHasher,
};

pub const PASSWORD_UPDATED: &str = "Password updated successfully";

// [security] Replace the password of the active worker identified by `cpf`
// The current password must verify; every verification problem reads as "incorrect"
pub async fn change_password(
    store: &dyn WorkerStore,
    hasher: &CredentialHasher,
    cpf: &str,
    current_password: &str,
    new_password: &str,
) -> Result<MessageResponse, AppError> {
    let worker = store
        .find_active_worker_by_personal_id(cpf)
        .await?
        .ok_or_else(|| AppError::not_found("Worker not found"))?;

    if !hasher.matches(current_password, &worker.app_password) {
        warn!("Password change rejected for worker {}", worker.id);
        return Err(AppError::current_password_incorrect());
    }

    let new_hash = hasher
        .hash_password(new_password)
        .map_err(|e| AppError::Internal(e.into()))?;

    store.update_worker_password(cpf, &new_hash).await?;
    info!("Password changed for worker {}", worker.id);

    Ok(MessageResponse::new(PASSWORD_UPDATED))
}

/// PATCH /eusou/workers/:cpf/change-password
pub async fn change_password_handler(
    auth: AuthenticatedWorker,
    State(store): State<Arc<dyn WorkerStore>>,
    State(hasher): State<CredentialHasher>,
    Path(cpf): Path<String>,
    Json(payload): Json<PasswordChangeRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    // [security] The CPF in the path must belong to the token's worker
    let owner = store.find_worker_by_id(auth.worker_id()?).await?;
    if owner.map(|w| w.cpf) != Some(cpf.clone()) {
        warn!("Worker {} attempted to change another worker's password", auth.subject);
        return Err(AppError::Forbidden);
    }

    let response = change_password(
        store.as_ref(),
        &hasher,
        &cpf,
        &payload.current_password,
        &payload.new_password,
    )
    .await?;

    Ok(Json(response))
}
