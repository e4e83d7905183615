// [rust] Security module organization - cryptographic and security utilities
pub mod jwt; // [security] Access token signing, verification and claims
pub mod password; // [security] PBKDF2 password hashing and multi-format verification

pub use jwt::{AccessClaims, JwtAlgorithm, JwtSigner, TokenError, TOKEN_TYPE};
pub use password::{CredentialHasher, PasswordError};
