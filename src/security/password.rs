// [library] RustCrypto password-hash framework - PHC string parsing and verifier traits
// PBKDF2-HMAC-SHA256 is the scheme for new hashes, Argon2 hashes are still accepted
use argon2::Argon2;
use pbkdf2::{
    password_hash::{Output, PasswordHash, PasswordHasher, SaltString},
    Params, Pbkdf2,
};

// [library] OS entropy source for salts (rand_core 0.6, shared with password-hash)
use rand::rngs::OsRng;

// [library] Base64 for the passlib "ab64" alphabet used by legacy hashes
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use sha2::Sha256;

// [library] Structured error types with automatic Display and Error trait derivation
use thiserror::Error;

/// Iteration count used by passlib's `pbkdf2_sha256` and by new hashes unless configured.
pub const DEFAULT_ROUNDS: u32 = 29_000;

// [security] Derived key length in bytes (SHA-256 output size)
const OUTPUT_LENGTH: usize = 32;

// [business] Identifier shared by PHC and passlib PBKDF2-SHA256 strings
const PBKDF2_SHA256_IDENT: &str = "pbkdf2-sha256";

// Fixed salt for the work done when there is no stored hash to check against
const DUMMY_SALT: &[u8] = b"eusou-no-such-worker";

// [rust] Custom error type for password operations with structured error handling
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashError(#[from] pbkdf2::password_hash::Error),

    #[error("Malformed password hash: {0}")]
    Malformed(&'static str),
}

/// Hashes and verifies worker passwords.
///
/// New hashes are PBKDF2-HMAC-SHA256 in PHC format. Verification also accepts
/// passlib `$pbkdf2-sha256$<rounds>$<salt>$<checksum>` strings and Argon2 PHC
/// strings so existing accounts keep working.
#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    rounds: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ROUNDS)
    }
}

impl CredentialHasher {
    pub fn new(rounds: u32) -> Self {
        // [security] Zero iterations would make PBKDF2 meaningless
        Self {
            rounds: rounds.max(1),
        }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    // [security] Hash password with a fresh random salt - salt and parameters live in the PHC string
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng); // [security] Each password gets unique salt

        let params = Params {
            rounds: self.rounds,
            output_length: OUTPUT_LENGTH,
        };

        let password_hash = Pbkdf2
            .hash_password_customized(password.as_bytes(), None, None, params, &salt)?
            .to_string(); // [library] Convert to PHC string format

        Ok(password_hash)
    }

    // [security] Verify password against a stored hash
    // Ok(false) means mismatch, Err means the stored hash could not be understood
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        if let Some(legacy) = LegacyPbkdf2::parse(hash)? {
            return legacy.verify(password);
        }

        let parsed_hash = PasswordHash::new(hash)?; // [library] Parse stored PHC string
        let argon2 = Argon2::default();

        match parsed_hash.verify_password(&[&Pbkdf2, &argon2], password.as_bytes()) {
            Ok(()) => Ok(true),
            Err(pbkdf2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::HashError(e)),
        }
    }

    /// Verification for authentication paths: any failure, including a hash
    /// that cannot be parsed, counts as "wrong password".
    pub fn matches(&self, password: &str, hash: &str) -> bool {
        match self.verify_password(password, hash) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!("Password verification error treated as mismatch: {}", e);
                false
            }
        }
    }

    /// Spends the same PBKDF2 work as a real check when there is no account
    /// to check against, so an unknown login costs as much as a wrong password.
    /// Never matches.
    pub fn reject_without_account(&self, password: &str) -> bool {
        let dummy = LegacyPbkdf2 {
            rounds: self.rounds,
            salt: DUMMY_SALT.to_vec(),
            checksum: vec![0u8; OUTPUT_LENGTH],
        };
        let _ = dummy.verify(password);
        false
    }
}

// passlib pbkdf2_sha256: $pbkdf2-sha256$<rounds>$<ab64 salt>$<ab64 checksum>
struct LegacyPbkdf2 {
    rounds: u32,
    salt: Vec<u8>,
    checksum: Vec<u8>,
}

impl LegacyPbkdf2 {
    // Ok(None) when the string is not in passlib layout (PHC parsing takes over)
    fn parse(hash: &str) -> Result<Option<Self>, PasswordError> {
        let parts: Vec<&str> = hash.split('$').collect();
        let [empty, ident, rounds, salt, checksum] = parts.as_slice() else {
            return Ok(None);
        };

        if !empty.is_empty()
            || *ident != PBKDF2_SHA256_IDENT
            || rounds.is_empty()
            || !rounds.bytes().all(|b| b.is_ascii_digit())
        {
            return Ok(None);
        }

        let rounds: u32 = rounds
            .parse()
            .map_err(|_| PasswordError::Malformed("rounds out of range"))?;
        if rounds == 0 {
            return Err(PasswordError::Malformed("rounds must be positive"));
        }

        Ok(Some(Self {
            rounds,
            salt: decode_ab64(salt)?,
            checksum: decode_ab64(checksum)?,
        }))
    }

    fn verify(&self, password: &str) -> Result<bool, PasswordError> {
        let mut derived = vec![0u8; self.checksum.len()];
        pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), &self.salt, self.rounds, &mut derived);

        // [security] Output equality is constant-time
        let expected = Output::new(&self.checksum)?;
        let actual = Output::new(&derived)?;
        Ok(expected == actual)
    }
}

// passlib "adapted base64": standard alphabet with '.' instead of '+', no padding
fn decode_ab64(value: &str) -> Result<Vec<u8>, PasswordError> {
    STANDARD_NO_PAD
        .decode(value.replace('.', "+"))
        .map_err(|_| PasswordError::Malformed("invalid ab64 encoding"))
}
