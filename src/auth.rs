// Accounts and session state. Credential storage and password policy belong
// to the hosted identity provider; `IdentityProvider` is that seam, with a
// store-backed implementation for development and tests. Session state is an
// explicit watch channel, not ambient global state: consumers subscribe at
// startup and observe login/logout transitions.

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{AuthUser, UserProfile};
use crate::store::{DocumentStore, USERS};

/// Collection backing the local provider's accounts. Distinct from the `users`
/// profile collection, which the application owns.
const AUTH_ACCOUNTS: &str = "authAccounts";

const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> AppResult<AuthUser>;

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthUser>;
}

/// Store-backed identity provider: accounts as documents, salted SHA-256
/// password digests.
pub struct LocalIdentityProvider {
    store: Arc<DocumentStore>,
}

impl LocalIdentityProvider {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        LocalIdentityProvider { store }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> AppResult<AuthUser> {
        let existing = self.store.find_eq(AUTH_ACCOUNTS, "email", email).await?;
        if !existing.is_empty() {
            return Err(AppError::Validation("Email is already in use".to_string()));
        }

        let uid = Uuid::new_v4().to_string();
        let salt = Uuid::new_v4().to_string();
        let account = json!({
            "uid": uid,
            "email": email,
            "displayName": display_name,
            "salt": salt,
            "passwordHash": digest(&salt, password),
        });
        self.store.put(AUTH_ACCOUNTS, &uid, &account).await?;

        Ok(AuthUser {
            uid,
            email: email.to_string(),
            display_name: display_name.to_string(),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        let mut accounts = self.store.find_eq(AUTH_ACCOUNTS, "email", email).await?;
        let account = accounts
            .pop()
            .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

        let salt = account.data["salt"].as_str().unwrap_or_default();
        let stored = account.data["passwordHash"].as_str().unwrap_or_default();
        if digest(salt, password) != stored {
            return Err(AppError::Unauthorized("Invalid email or password".to_string()));
        }

        Ok(AuthUser {
            uid: account.id,
            email: email.to_string(),
            display_name: account.data["displayName"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
        })
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<DocumentStore>,
    session: watch::Sender<Option<AuthUser>>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<DocumentStore>) -> Self {
        let (session, _) = watch::channel(None);
        AuthService {
            provider,
            store,
            session,
        }
    }

    /// Register a new account. All validation runs locally before the provider
    /// is contacted; a rejected form never leaves the process.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm: &str,
        display_name: &str,
    ) -> AppResult<AuthUser> {
        if !EMAIL_RE.is_match(email) {
            return Err(AppError::Validation("Enter a valid email address".to_string()));
        }
        if password != confirm {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let user = self.provider.create_user(email, password, display_name).await?;
        self.ensure_profile(&user).await;
        info!("Registered user {}", user.uid);

        self.session.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Sign in through the provider and touch the profile's last-login stamp.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        let user = self.provider.sign_in(email, password).await?;
        self.ensure_profile(&user).await;
        info!("User {} logged in", user.uid);

        self.session.send_replace(Some(user.clone()));
        Ok(user)
    }

    pub fn logout(&self) {
        self.session.send_replace(None);
    }

    /// Subscribe to session transitions. The receiver's current value is the
    /// signed-in user, if any.
    pub fn session(&self) -> watch::Receiver<Option<AuthUser>> {
        self.session.subscribe()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.session.borrow().clone()
    }

    /// Create the profile document on first sight of a user, or touch the
    /// last-login stamp on an existing one. Best-effort either way: a profile
    /// write failure never blocks authentication.
    async fn ensure_profile(&self, user: &AuthUser) {
        let result = self.write_profile(user).await;
        if let Err(err) = result {
            warn!("Could not write profile for {}: {}", user.uid, err);
        }
    }

    async fn write_profile(&self, user: &AuthUser) -> AppResult<()> {
        let now = Utc::now();
        if self.store.get(USERS, &user.uid).await?.is_some() {
            self.store
                .merge(USERS, &user.uid, &json!({ "lastLoginAt": now }))
                .await?;
            return Ok(());
        }

        let profile = UserProfile {
            uid: user.uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            created_at: Some(now),
            last_login_at: Some(now),
            last_activity_at: None,
            review_count: Some(0),
            role: "user".to_string(),
        };
        self.store
            .put(USERS, &user.uid, &serde_json::to_value(&profile)?)
            .await?;
        Ok(())
    }
}
