use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::{info, warn};

use crate::{
    db::{AuthData, LoginResponse, WorkerStore},
    error::AppError,
    security::{CredentialHasher, JwtSigner, TOKEN_TYPE},
};

/// Verifies a login/password pair and issues an access token for the worker.
///
/// Unknown login, inactive worker, wrong password and unreadable stored hash
/// all fail with the same [`AppError::invalid_credentials`].
pub async fn authenticate(
    store: &dyn WorkerStore,
    hasher: &CredentialHasher,
    signer: &JwtSigner,
    login: &str,
    password: &str,
) -> Result<LoginResponse, AppError> {
    let worker = match store.find_active_worker_by_login(login).await? {
        Some(worker) => worker,
        None => {
            // [security] Same hashing cost as a wrong password
            hasher.reject_without_account(password);
            warn!("Login attempt for unknown or inactive login");
            return Err(AppError::invalid_credentials());
        }
    };

    // [security] Malformed hashes count as a mismatch
    if !hasher.matches(password, &worker.app_password) {
        warn!("Invalid password for worker {}", worker.id);
        return Err(AppError::invalid_credentials());
    }

    let access_token = signer
        .create_access_token(&worker.id.to_string())
        .map_err(|e| AppError::Internal(e.into()))?;

    // [security] Account still on its system-assigned password (derived from the CPF)
    let need_change_password = hasher.matches(&worker.cpf, &worker.app_password);

    info!("Worker {} authenticated", worker.id);

    Ok(LoginResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
        worker_data: worker,
        need_change_password,
    })
}

/// POST /eusou/workers/:cpf - worker app login
///
/// The path segment is kept for client compatibility; only the body is used.
pub async fn login_handler(
    State(store): State<Arc<dyn WorkerStore>>,
    State(hasher): State<CredentialHasher>,
    State(signer): State<JwtSigner>,
    Path(_cpf): Path<String>,
    Json(auth): Json<AuthData>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = authenticate(
        store.as_ref(),
        &hasher,
        &signer,
        &auth.app_login,
        &auth.app_password,
    )
    .await?;

    Ok(Json(response))
}
