// [library] Axum web framework routing components
use axum::{
    extract::{DefaultBodyLimit, FromRef}, // [library] State extraction and body size limit
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, patch, post}, // [library] HTTP method routing builders
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

// [business] Import application modules for dependency injection and routing
use crate::{
    auth::login_handler,
    config::Config,
    db::WorkerStore,
    health::health_check,
    security::{CredentialHasher, JwtSigner},
    workers::{
        change_password_handler, course_file_handler, list_courses_handler, scales_handler,
        update_worker_handler, upload_course_handler, MAX_COURSE_UPLOAD_BYTES,
    },
};

// [business] Application state - storage plus the security components built from Config
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WorkerStore>,
    pub config: Config,
    pub signer: JwtSigner,
    pub hasher: CredentialHasher,
}

impl AppState {
    pub fn new(store: Arc<dyn WorkerStore>, config: Config) -> Self {
        let signer = config.jwt_signer();
        let hasher = config.credential_hasher();
        Self {
            store,
            config,
            signer,
            hasher,
        }
    }
}

// [library] FromRef impls let handlers extract only the piece of state they use
impl FromRef<AppState> for Arc<dyn WorkerStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for JwtSigner {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.signer.clone()
    }
}

impl FromRef<AppState> for CredentialHasher {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.hasher
    }
}

// [business] Create the HTTP router for the worker app
// Handlers taking AuthenticatedWorker are protected; login, file fetch and health are open
pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        // [business] Public endpoints
        .route("/eusou/workers/:cpf", post(login_handler))
        .route("/workers-courses/file/:file_id", get(course_file_handler))
        .route("/health", get(health_check))
        // [security] Token-protected endpoints
        .route(
            "/eusou/workers/update-data/:worker_id",
            patch(update_worker_handler),
        )
        .route(
            "/eusou/workers/:cpf/change-password",
            patch(change_password_handler),
        )
        .route(
            "/eusou/subsidiaries/:subsidiarie_id/workers/:worker_id/scales",
            post(scales_handler),
        )
        .route("/workers-courses/:worker_id", get(list_courses_handler))
        .route(
            "/workers-courses",
            post(upload_course_handler).layer(DefaultBodyLimit::max(MAX_COURSE_UPLOAD_BYTES)),
        )
        .with_state(state)
}

// [security] CORS for the worker frontend origins from FRONT_URL
// Invalid origins are skipped; allow_credentials cannot be combined with a wildcard origin
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}
