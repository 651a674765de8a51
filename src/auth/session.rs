//! Accounts and bearer-token sessions.
//!
//! Passwords are stored as salted SHA-256 digests. Sessions are opaque
//! UUID tokens with a fixed time-to-live; expired sessions are pruned
//! whenever a new session opens, and on lookup.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::validation::{validate_login, validate_signup, ValidationErrors};
use crate::types::{
    LoginRequest, Role, SessionInfo, SignupRequest, User, DEMO_ADMIN_ID, DEMO_ANALYST_ID,
    DEMO_VIEWER_ID,
};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("session is missing, invalid or expired")]
    Unauthenticated,
    #[error("operation requires the {0:?} role")]
    Forbidden(Role),
    #[error("user '{0}' not found")]
    UnknownUser(String),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("session store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    salt: String,
    password_digest: String,
}

#[derive(Debug, Clone)]
struct Session {
    user_id: String,
    expires_at: DateTime<Utc>,
    /// Admin "view as" target; requests act as this user when set.
    view_as: Option<String>,
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// In-memory account and session registry.
pub struct SessionManager {
    accounts: RwLock<HashMap<String, Account>>,
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
    min_password_len: usize,
}

impl SessionManager {
    pub fn new(ttl_hours: i64, min_password_len: usize) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::hours(ttl_hours),
            min_password_len,
        }
    }

    /// Manager pre-loaded with the demo accounts used by the mock backend.
    pub fn with_demo_accounts(ttl_hours: i64, min_password_len: usize) -> Self {
        let mgr = Self::new(ttl_hours, min_password_len);
        for (id, email, name, role) in [
            (DEMO_ADMIN_ID, "admin@sentinel.io", "Sentinel Admin", Role::Admin),
            (DEMO_ANALYST_ID, "analyst@sentinel.io", "Risk Analyst", Role::Analyst),
            (DEMO_VIEWER_ID, "viewer@sentinel.io", "Read Only", Role::Viewer),
        ] {
            // Demo accounts share one password; the mock backend is not a
            // real identity provider.
            let _ = mgr.insert_account(id.to_string(), email, name, "sentinel123", role);
        }
        mgr
    }

    fn insert_account(
        &self,
        id: String,
        email: &str,
        name: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let key = email.trim().to_lowercase();
        let mut accounts = self.accounts.write().map_err(|_| AuthError::Poisoned)?;
        if accounts.contains_key(&key) {
            return Err(AuthError::EmailTaken);
        }
        let salt = uuid::Uuid::new_v4().to_string();
        let user = User {
            id,
            email: key.clone(),
            name: name.trim().to_string(),
            role,
        };
        accounts.insert(
            key,
            Account {
                user: user.clone(),
                password_digest: digest(&salt, password),
                salt,
            },
        );
        Ok(user)
    }

    fn open_session(&self, user: User) -> Result<SessionInfo, AuthError> {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let mut sessions = self.sessions.write().map_err(|_| AuthError::Poisoned)?;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(pruned, "Expired sessions removed");
        }
        sessions.insert(
            token.clone(),
            Session {
                user_id: user.id.clone(),
                expires_at,
                view_as: None,
            },
        );
        drop(sessions);
        Ok(SessionInfo { token, user, expires_at })
    }

    pub fn signup(&self, req: &SignupRequest) -> Result<SessionInfo, AuthError> {
        validate_signup(req, self.min_password_len)?;
        let id = uuid::Uuid::new_v4().to_string();
        let user = self.insert_account(id, &req.email, &req.name, &req.password, Role::Analyst)?;
        info!(user_id = %user.id, "Account created");
        self.open_session(user)
    }

    pub fn login(&self, req: &LoginRequest) -> Result<SessionInfo, AuthError> {
        validate_login(req, self.min_password_len)?;
        let key = req.email.trim().to_lowercase();
        let user = {
            let accounts = self.accounts.read().map_err(|_| AuthError::Poisoned)?;
            let account = accounts.get(&key).ok_or(AuthError::InvalidCredentials)?;
            if digest(&account.salt, &req.password) != account.password_digest {
                return Err(AuthError::InvalidCredentials);
            }
            account.user.clone()
        };
        debug!(user_id = %user.id, "Login succeeded");
        self.open_session(user)
    }

    pub fn logout(&self, token: &str) -> Result<bool, AuthError> {
        Ok(self
            .sessions
            .write()
            .map_err(|_| AuthError::Poisoned)?
            .remove(token)
            .is_some())
    }

    fn user_by_id(&self, id: &str) -> Result<User, AuthError> {
        self.accounts
            .read()
            .map_err(|_| AuthError::Poisoned)?
            .values()
            .find(|a| a.user.id == id)
            .map(|a| a.user.clone())
            .ok_or_else(|| AuthError::UnknownUser(id.to_string()))
    }

    /// User a token acts as: the "view as" target when set, else the owner.
    pub fn resolve(&self, token: &str) -> Result<User, AuthError> {
        let session = {
            let mut sessions = self.sessions.write().map_err(|_| AuthError::Poisoned)?;
            match sessions.get(token) {
                Some(s) if s.expires_at > Utc::now() => s.clone(),
                Some(_) => {
                    sessions.remove(token);
                    return Err(AuthError::Unauthenticated);
                }
                None => return Err(AuthError::Unauthenticated),
            }
        };
        let id = session.view_as.as_deref().unwrap_or(&session.user_id);
        self.user_by_id(id)
    }

    /// Let an admin session act as another user; `None` clears it.
    pub fn set_view_as(&self, token: &str, target_user_id: Option<&str>) -> Result<User, AuthError> {
        let owner = {
            let sessions = self.sessions.read().map_err(|_| AuthError::Poisoned)?;
            let s = sessions.get(token).ok_or(AuthError::Unauthenticated)?;
            self.user_by_id(&s.user_id)?
        };
        if owner.role != Role::Admin {
            return Err(AuthError::Forbidden(Role::Admin));
        }
        if let Some(target) = target_user_id {
            self.user_by_id(target)?;
        }

        let mut sessions = self.sessions.write().map_err(|_| AuthError::Poisoned)?;
        if let Some(s) = sessions.get_mut(token) {
            s.view_as = target_user_id.map(str::to_string);
        }
        drop(sessions);
        self.resolve(token)
    }

    /// Number of live entries in the session table.
    pub fn session_count(&self) -> Result<usize, AuthError> {
        Ok(self.sessions.read().map_err(|_| AuthError::Poisoned)?.len())
    }

    pub fn users(&self) -> Result<Vec<User>, AuthError> {
        let mut users: Vec<User> = self
            .accounts
            .read()
            .map_err(|_| AuthError::Poisoned)?
            .values()
            .map(|a| a.user.clone())
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }
}
