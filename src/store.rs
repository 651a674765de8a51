//! Application state container
//!
//! Holds companies, partners, the admin "view as" selection, the session
//! and the cached company list. Readers take a snapshot or subscribe to a
//! `tokio::sync::watch` channel; every write publishes a new state. The
//! view-as user, session and cached list are also written through to a
//! [`KvStore`] so they survive restarts.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::storage::kv::{get_json, put_json};
use crate::storage::{KvStore, StorageError};
use crate::types::{Company, SessionInfo, User};

const KEY_VIEW_AS: &str = "store.viewAs";
const KEY_SESSION: &str = "store.session";
const KEY_CACHED_COMPANIES: &str = "store.cachedCompanies";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub companies: Vec<Company>,
    /// Companies the user follows.
    pub partners: Vec<Company>,
    pub view_as: Option<User>,
    pub session: Option<SessionInfo>,
    /// Last company list fetched successfully.
    pub cached_companies: Vec<Company>,
}

impl AppState {
    /// User the UI should act as: the view-as selection, else the session user.
    pub fn effective_user(&self) -> Option<&User> {
        self.view_as.as_ref().or(self.session.as_ref().map(|s| &s.user))
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }
}

#[derive(Clone)]
pub struct AppStore {
    tx: Arc<watch::Sender<AppState>>,
    kv: Arc<dyn KvStore>,
}

impl AppStore {
    /// Build a store, restoring persisted fields from `kv`.
    ///
    /// Unreadable entries are logged and skipped.
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        let state = AppState {
            view_as: restore(kv.as_ref(), KEY_VIEW_AS),
            session: restore(kv.as_ref(), KEY_SESSION),
            cached_companies: restore(kv.as_ref(), KEY_CACHED_COMPANIES).unwrap_or_default(),
            ..AppState::default()
        };
        let (tx, _rx) = watch::channel(state);
        Self { tx: Arc::new(tx), kv }
    }

    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }

    pub fn set_companies(&self, companies: Vec<Company>) {
        self.tx.send_modify(|s| s.companies = companies);
    }

    /// Add a partner; returns false if it was already present.
    pub fn add_partner(&self, company: Company) -> bool {
        self.tx.send_if_modified(|s| {
            if s.partners.iter().any(|p| p.id == company.id) {
                return false;
            }
            s.partners.push(company);
            true
        })
    }

    pub fn remove_partner(&self, company_id: &str) -> bool {
        self.tx.send_if_modified(|s| {
            let before = s.partners.len();
            s.partners.retain(|p| p.id != company_id);
            s.partners.len() != before
        })
    }

    pub fn set_view_as(&self, user: Option<User>) -> Result<(), StorageError> {
        match &user {
            Some(u) => put_json(self.kv.as_ref(), KEY_VIEW_AS, u)?,
            None => self.kv.remove(KEY_VIEW_AS)?,
        }
        debug!(view_as = ?user.as_ref().map(|u| &u.id), "View-as changed");
        self.tx.send_modify(|s| s.view_as = user);
        Ok(())
    }

    pub fn set_session(&self, session: Option<SessionInfo>) -> Result<(), StorageError> {
        match &session {
            Some(info) => put_json(self.kv.as_ref(), KEY_SESSION, info)?,
            None => self.kv.remove(KEY_SESSION)?,
        }
        self.tx.send_modify(|s| s.session = session);
        Ok(())
    }

    /// Store a fresh company list and remember it as the cached copy.
    pub fn cache_companies(&self, companies: Vec<Company>) -> Result<(), StorageError> {
        put_json(self.kv.as_ref(), KEY_CACHED_COMPANIES, &companies)?;
        self.tx.send_modify(|s| {
            s.companies = companies.clone();
            s.cached_companies = companies;
        });
        Ok(())
    }

    /// Drop session and view-as (logout). Partners and caches stay.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.kv.remove(KEY_SESSION)?;
        self.kv.remove(KEY_VIEW_AS)?;
        self.tx.send_modify(|s| {
            s.session = None;
            s.view_as = None;
        });
        Ok(())
    }
}

fn restore<T: serde::de::DeserializeOwned>(kv: &dyn KvStore, key: &str) -> Option<T> {
    match get_json(kv, key) {
        Ok(v) => v,
        Err(e) => {
            warn!(key, error = %e, "Discarding unreadable persisted state");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryKv;
    use crate::types::{RiskLevel, Role};
    use chrono::Utc;

    fn company(id: &str) -> Company {
        Company {
            id: id.to_string(),
            name: format!("Company {id}"),
            business_number: "000-00-00000".to_string(),
            industry: "Manufacturing".to_string(),
            region: "Seoul".to_string(),
            risk_level: RiskLevel::Min,
            risk_score: 10.0,
            updated_at: Utc::now(),
            tags: vec![],
        }
    }

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            email: format!("{id}@sentinel.io"),
            name: id.to_string(),
            role,
        }
    }

    #[test]
    fn test_partners_dedupe() {
        let store = AppStore::new(Arc::new(InMemoryKv::default()));
        assert!(store.add_partner(company("a")));
        assert!(!store.add_partner(company("a")));
        assert_eq!(store.snapshot().partners.len(), 1);
        assert!(store.remove_partner("a"));
        assert!(!store.remove_partner("a"));
    }

    #[test]
    fn test_persisted_fields_restored() {
        let kv: Arc<dyn KvStore> = Arc::new(InMemoryKv::default());
        {
            let store = AppStore::new(kv.clone());
            store.set_view_as(Some(user("u2", Role::Viewer))).unwrap();
            store.cache_companies(vec![company("a"), company("b")]).unwrap();
            store.set_companies(vec![company("live")]);
        }
        let restored = AppStore::new(kv).snapshot();
        assert_eq!(restored.view_as.as_ref().map(|u| u.id.as_str()), Some("u2"));
        assert_eq!(restored.cached_companies.len(), 2);
        // Live lists are not persisted
        assert!(restored.companies.is_empty());
    }

    #[test]
    fn test_effective_user_prefers_view_as() {
        let store = AppStore::new(Arc::new(InMemoryKv::default()));
        store
            .set_session(Some(SessionInfo {
                token: "t".to_string(),
                user: user("admin", Role::Admin),
                expires_at: Utc::now(),
            }))
            .unwrap();
        assert_eq!(store.snapshot().effective_user().map(|u| u.id.as_str()), Some("admin"));
        store.set_view_as(Some(user("u2", Role::Viewer))).unwrap();
        assert_eq!(store.snapshot().effective_user().map(|u| u.id.as_str()), Some("u2"));
        store.clear_session().unwrap();
        let s = store.snapshot();
        assert!(s.token().is_none());
        assert!(s.effective_user().is_none());
    }

    #[test]
    fn test_corrupt_entry_skipped() {
        let kv = Arc::new(InMemoryKv::default());
        kv.put(KEY_SESSION, b"not json").unwrap();
        let store = AppStore::new(kv);
        assert!(store.snapshot().session.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_writes() {
        let store = AppStore::new(Arc::new(InMemoryKv::default()));
        let mut rx = store.subscribe();
        store.set_companies(vec![company("a")]);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().companies.len(), 1);

        // No-op partner removal does not notify
        assert!(!store.remove_partner("zzz"));
        assert!(!rx.has_changed().unwrap());
    }
}
