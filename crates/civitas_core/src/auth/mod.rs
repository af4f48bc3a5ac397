//! Identity gate in front of the project store.
//!
//! # Responsibility
//! - Verify credentials through a pluggable `CredentialVerifier`.
//! - Track the single interactive session of this process.
//!
//! # Invariants
//! - No credential pair is built in; accounts come from the verifier.
//! - A failed login leaves the gate unauthenticated.
//! - Secrets never appear in log events.

mod password;

pub use password::{hash_password, verify_password, PasswordRegistry, MIN_PASSWORD_CHARS};

use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Access level granted by a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// May run every store mutation.
    Manager,
    /// Read-only dashboard access.
    Viewer,
}

impl Role {
    pub fn can_mutate(self) -> bool {
        matches!(self, Self::Manager)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    EmptyUsername,
    WeakPassword { min_chars: usize },
    DuplicateUsername(String),
    /// Hashing backend failure or a corrupt stored hash.
    Hash(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::WeakPassword { min_chars } => {
                write!(f, "password must be at least {min_chars} characters long")
            }
            Self::DuplicateUsername(name) => write!(f, "username `{name}` is already registered"),
            Self::Hash(message) => write!(f, "password hash failure: {message}"),
        }
    }
}

impl Error for AuthError {}

/// Capability that checks a username/secret pair.
pub trait CredentialVerifier {
    fn authenticate(&self, username: &str, secret: &str) -> Result<Role, AuthError>;
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub started_at: DateTime<Utc>,
}

pub struct IdentityGate<V: CredentialVerifier> {
    verifier: V,
    session: Option<Session>,
}

impl<V: CredentialVerifier> IdentityGate<V> {
    pub fn new(verifier: V) -> Self {
        Self {
            verifier,
            session: None,
        }
    }

    /// Verifies credentials and opens a new session on success.
    pub fn login(&mut self, username: &str, password: &str) -> Result<Role, AuthError> {
        self.session = None;
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }

        match self.verifier.authenticate(username, password) {
            Ok(role) => {
                let session = Session {
                    id: Uuid::new_v4(),
                    username: username.to_string(),
                    role,
                    started_at: Utc::now(),
                };
                info!(
                    "event=login module=auth status=ok session_id={} role={:?}",
                    session.id, role
                );
                self.session = Some(session);
                Ok(role)
            }
            Err(err) => {
                warn!("event=login module=auth status=rejected error={err}");
                Err(err)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!(
                "event=logout module=auth status=ok session_id={}",
                session.id
            );
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Mutable access for account registration through the verifier.
    pub fn verifier_mut(&mut self) -> &mut V {
        &mut self.verifier
    }
}
