//! Argon2id password hashing and an in-memory account registry.
//!
//! Hashes are stored as PHC strings, so algorithm parameters and salt travel
//! with the hash. Plaintext passwords are never stored or logged.

use super::{AuthError, CredentialVerifier, Role};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::collections::BTreeMap;

/// Shortest password accepted by [`PasswordRegistry::register`].
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Hashes `password` with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hash(err.to_string()))
}

/// Returns `Ok(false)` on mismatch; errors only for malformed hashes.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|err| AuthError::Hash(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(AuthError::Hash(err.to_string())),
    }
}

#[derive(Debug, Clone)]
struct Account {
    password_hash: String,
    role: Role,
}

/// Username -> (Argon2id hash, role) credential verifier.
#[derive(Debug, Clone, Default)]
pub struct PasswordRegistry {
    accounts: BTreeMap<String, Account>,
}

impl PasswordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account. Usernames are trimmed and must be unused.
    pub fn register(&mut self, username: &str, password: &str, role: Role) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::WeakPassword {
                min_chars: MIN_PASSWORD_CHARS,
            });
        }
        if self.accounts.contains_key(username) {
            return Err(AuthError::DuplicateUsername(username.to_string()));
        }

        let password_hash = hash_password(password)?;
        self.accounts.insert(
            username.to_string(),
            Account {
                password_hash,
                role,
            },
        );
        Ok(())
    }

    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username.trim())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl CredentialVerifier for PasswordRegistry {
    fn authenticate(&self, username: &str, secret: &str) -> Result<Role, AuthError> {
        let account = self
            .accounts
            .get(username.trim())
            .ok_or(AuthError::InvalidCredentials)?;
        if verify_password(secret, &account.password_hash)? {
            Ok(account.role)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}
