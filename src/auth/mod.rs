// [rust] Authentication module organization
pub mod guard; // [security] Bearer token extractor protecting worker routes
pub mod login; // [business] Credential verification and token issuance

pub use guard::{extract_bearer_token, AuthenticatedWorker};
pub use login::{authenticate, login_handler};
