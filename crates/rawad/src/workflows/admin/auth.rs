use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Consecutive failed logins before the account locks.
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

/// Lifetime of an issued session token.
pub const SESSION_TTL_HOURS: i64 = 24;

/// The singleton credential document backing the admin login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub password_hash: String,
    pub login_attempts: u32,
    pub locked: bool,
    pub last_changed: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for the single admin credential document.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<AdminCredentials>, CredentialStoreError>;
    fn save(&self, credentials: AdminCredentials) -> Result<(), CredentialStoreError>;
}

/// Error raised by login and password operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("account locked after too many failed attempts")]
    AccountLocked,
    #[error("invalid password")]
    InvalidPassword,
    #[error(transparent)]
    Store(#[from] CredentialStoreError),
}

/// Issued session: an opaque bearer token and its expiry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates opaque bearer tokens with a fixed 24-hour lifetime.
/// Validation prunes expired entries as a side effect.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl SessionRegistry {
    pub fn issue(&self) -> Session {
        self.issue_at(Utc::now())
    }

    pub fn issue_at(&self, now: DateTime<Utc>) -> Session {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex_encode(&bytes);
        let expires_at = now + Duration::hours(SESSION_TTL_HOURS);

        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .insert(token.clone(), expires_at);

        Session { token, expires_at }
    }

    pub fn validate(&self, token: &str) -> bool {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.retain(|_, expires_at| *expires_at > now);
        guard.contains_key(token)
    }

    pub fn revoke(&self, token: &str) {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .remove(token);
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut encoded, byte| {
            let _ = write!(encoded, "{byte:02x}");
            encoded
        },
    )
}

/// Verifies the admin password against the stored credential document,
/// tracking consecutive failures and locking the account at the threshold.
///
/// The first use bootstraps the document from the configured initial
/// password.
pub struct AdminAuthenticator<C> {
    store: Arc<C>,
    salt: String,
    initial_password: String,
    sessions: SessionRegistry,
}

impl<C> AdminAuthenticator<C>
where
    C: CredentialStore,
{
    pub fn new(store: Arc<C>, salt: impl Into<String>, initial_password: impl Into<String>) -> Self {
        Self {
            store,
            salt: salt.into(),
            initial_password: initial_password.into(),
            sessions: SessionRegistry::default(),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    fn hash_password(&self, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hasher.update(self.salt.as_bytes());
        hex_encode(&hasher.finalize())
    }

    fn load_or_bootstrap(&self) -> Result<AdminCredentials, CredentialStoreError> {
        if let Some(credentials) = self.store.load()? {
            return Ok(credentials);
        }

        let fresh = AdminCredentials {
            password_hash: self.hash_password(&self.initial_password),
            login_attempts: 0,
            locked: false,
            last_changed: Utc::now(),
            last_login: None,
            last_attempt: None,
        };
        self.store.save(fresh.clone())?;
        Ok(fresh)
    }

    /// Check a password attempt. A locked account fails before the hash is
    /// even compared; a correct password resets the failure counter; an
    /// incorrect one increments it and locks at [`MAX_LOGIN_ATTEMPTS`].
    pub fn verify_password(&self, password: &str) -> Result<(), AuthError> {
        let mut credentials = self.load_or_bootstrap()?;

        if credentials.locked {
            return Err(AuthError::AccountLocked);
        }

        if self.hash_password(password) == credentials.password_hash {
            credentials.login_attempts = 0;
            credentials.last_login = Some(Utc::now());
            self.store.save(credentials)?;
            Ok(())
        } else {
            credentials.login_attempts += 1;
            credentials.last_attempt = Some(Utc::now());
            credentials.locked = credentials.login_attempts >= MAX_LOGIN_ATTEMPTS;
            self.store.save(credentials)?;
            Err(AuthError::InvalidPassword)
        }
    }

    pub fn login(&self, password: &str) -> Result<Session, AuthError> {
        self.verify_password(password)?;
        Ok(self.sessions.issue())
    }

    pub fn logout(&self, token: &str) {
        self.sessions.revoke(token);
    }

    pub fn change_password(&self, current: &str, new_password: &str) -> Result<(), AuthError> {
        self.verify_password(current)?;

        let mut credentials = self.load_or_bootstrap()?;
        credentials.password_hash = self.hash_password(new_password);
        credentials.last_changed = Utc::now();
        credentials.login_attempts = 0;
        self.store.save(credentials)?;
        Ok(())
    }

    /// Clear the lock and the failure counter.
    pub fn unlock(&self) -> Result<(), AuthError> {
        let mut credentials = self.load_or_bootstrap()?;
        credentials.locked = false;
        credentials.login_attempts = 0;
        self.store.save(credentials)?;
        Ok(())
    }
}
