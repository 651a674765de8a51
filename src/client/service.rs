//! Data service: API calls with fallback, stale-response guards and store
//! updates, as the dashboard views consume them.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{ApiClient, FallbackStrategy, LoadState, RequestError, RequestGeneration};
use crate::analytics::{normalize_as, NormalizedTrend};
use crate::mock::MockDataset;
use crate::store::AppStore;
use crate::types::{
    Company, CompanyOverview, CompanySearchRequest, DashboardSummary, LoginRequest, Post,
    PostCategory, SessionInfo, TimeRange, TrendUnit, User,
};

/// Result of a read that may have been answered by the fallback or
/// overtaken by a newer request for the same resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Live(T),
    Fallback(T),
    /// A newer request for the same resource was started; drop this one.
    Superseded,
}

impl<T> Fetched<T> {
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Live(v) | Self::Fallback(v) => Some(v),
            Self::Superseded => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

pub struct DataService {
    api: ApiClient,
    fallback: Arc<dyn FallbackStrategy>,
    store: AppStore,
    generations: RequestGeneration,
    loading: LoadState,
}

impl DataService {
    /// Restores any persisted session token into the client.
    pub fn new(api: ApiClient, fallback: Arc<dyn FallbackStrategy>, store: AppStore) -> Self {
        if let Some(token) = store.snapshot().token() {
            api.set_token(Some(token.to_string()));
        }
        Self {
            api,
            fallback,
            store,
            generations: RequestGeneration::default(),
            loading: LoadState::default(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn loading(&self) -> &LoadState {
        &self.loading
    }

    pub fn fallback_name(&self) -> &'static str {
        self.fallback.name()
    }

    async fn fetch<T, F, M>(&self, key: &str, call: F, from_mock: M) -> Result<Fetched<T>, RequestError>
    where
        F: Future<Output = Result<T, RequestError>>,
        M: FnOnce(&MockDataset) -> Option<T>,
    {
        let ticket = self.generations.begin(key);
        let _loading = self.loading.start();
        let result = call.await;

        if !self.generations.is_current(&ticket) {
            debug!(key, generation = ticket.generation(), "Discarding superseded response");
            return Ok(Fetched::Superseded);
        }

        match result {
            Ok(v) => Ok(Fetched::Live(v)),
            Err(e) => match self.fallback.substitute(key, &e).and_then(from_mock) {
                Some(v) => Ok(Fetched::Fallback(v)),
                None => Err(e),
            },
        }
    }

    // ------------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------------

    pub async fn login(&self, req: &LoginRequest) -> Result<SessionInfo, RequestError> {
        let session = self.api.login(req).await?;
        if let Err(e) = self.store.set_session(Some(session.clone())) {
            warn!(error = %e, "Failed to persist session");
        }
        Ok(session)
    }

    pub async fn logout(&self) -> Result<(), RequestError> {
        let result = self.api.logout().await;
        if let Err(e) = self.store.clear_session() {
            warn!(error = %e, "Failed to clear persisted session");
        }
        result
    }

    /// Admin "view as" selection; `None` returns to the session user.
    pub fn view_as(&self, user: Option<User>) {
        if let Err(e) = self.store.set_view_as(user) {
            warn!(error = %e, "Failed to persist view-as selection");
        }
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Search companies and publish the result to the store.
    pub async fn search_companies(&self, req: &CompanySearchRequest) -> Result<Fetched<Vec<Company>>, RequestError> {
        let fetched = self
            .fetch("companies", self.api.search_companies(req), |d| Some(d.search(req)))
            .await?;
        match &fetched {
            Fetched::Live(list) => {
                if let Err(e) = self.store.cache_companies(list.clone()) {
                    warn!(error = %e, "Failed to cache company list");
                }
            }
            Fetched::Fallback(list) => self.store.set_companies(list.clone()),
            Fetched::Superseded => {}
        }
        Ok(fetched)
    }

    pub async fn company(&self, id: &str) -> Result<Fetched<Company>, RequestError> {
        self.fetch(&format!("company:{id}"), self.api.company(id), |d| d.company(id).cloned())
            .await
    }

    pub async fn company_overview(&self, id: &str) -> Result<Fetched<CompanyOverview>, RequestError> {
        self.fetch(&format!("overview:{id}"), self.api.company_overview(id), |d| d.overview(id))
            .await
    }

    pub async fn dashboard_summary(&self, range: TimeRange) -> Result<Fetched<DashboardSummary>, RequestError> {
        self.fetch("dashboard", self.api.dashboard_summary(range), |d| {
            Some(d.dashboard_summary(range))
        })
        .await
    }

    /// Normalized risk status trend; the fallback normalizes the bundled
    /// payload locally.
    pub async fn risk_trend(&self, unit: TrendUnit) -> Result<Fetched<NormalizedTrend>, RequestError> {
        self.fetch("riskTrend", self.api.risk_trend(unit), |d| {
            Some(normalize_as(&d.risk_trend_payload(), unit))
        })
        .await
    }

    pub async fn list_posts(&self, category: PostCategory) -> Result<Fetched<Vec<Post>>, RequestError> {
        self.fetch(&format!("posts:{}", category.as_str()), self.api.list_posts(category), |d| {
            Some(d.seed_posts().into_iter().filter(|p| p.category == category).collect())
        })
        .await
    }
}
