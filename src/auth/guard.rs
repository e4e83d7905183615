use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use crate::{error::AppError, security::JwtSigner};

/// Worker identity proven by a valid bearer token.
///
/// Adding this extractor to a handler is what makes the route protected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedWorker {
    pub subject: String,
}

impl AuthenticatedWorker {
    /// Token subject as a worker id. Our own tokens always carry a numeric id,
    /// so anything else is treated as an invalid token.
    pub fn worker_id(&self) -> Result<i32, AppError> {
        self.subject.parse().map_err(|_| AppError::InvalidToken)
    }

    // [security] Workers may only act on their own records
    pub fn ensure_owner(&self, worker_id: i32) -> Result<(), AppError> {
        if self.worker_id()? == worker_id {
            Ok(())
        } else {
            warn!(
                "Worker {} attempted to access resources of worker {}",
                self.subject, worker_id
            );
            Err(AppError::Forbidden)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedWorker
where
    JwtSigner: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let signer = JwtSigner::from_ref(state);

        let subject = signer.verify_access_token(token).map_err(|e| {
            warn!("Rejected access token: {}", e);
            AppError::InvalidToken
        })?;

        Ok(AuthenticatedWorker { subject })
    }
}

// [security] Extract Bearer token from Authorization header
// Auth schemes are case-insensitive, so "bearer <token>" (our own token_type) is accepted
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers.get(AUTHORIZATION).ok_or(AppError::InvalidToken)?;
    let auth_str = auth_header.to_str().map_err(|_| AppError::InvalidToken)?;

    let (scheme, token) = auth_str
        .trim_start()
        .split_once(' ')
        .ok_or(AppError::InvalidToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::InvalidToken);
    }

    Some(token.trim())
        .filter(|token| !token.is_empty())
        .ok_or(AppError::InvalidToken)
}
