//! reqwest client for the SENTINEL HTTP API.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use tracing::debug;

use super::RequestError;
use crate::analytics::NormalizedTrend;
use crate::auth::{validate_login, validate_post, validate_signup};
use crate::config::{AuthConfig, ClientConfig};
use crate::types::{
    Attachment, Company, CompanyOverview, CompanySearchRequest, DashboardSummary, HealthStatus,
    LoginRequest, ModelJob, ModelRunRequest, NewPost, Post, PostCategory, PostPatch, SessionInfo,
    SignupRequest, TimeRange, TrendUnit, User,
};

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    field_errors: BTreeMap<String, Vec<String>>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
    min_password_len: usize,
    max_title_len: usize,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RequestError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let auth = AuthConfig::default();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
            min_password_len: auth.min_password_len,
            max_title_len: auth.max_post_title_len,
        })
    }

    pub fn from_config(client: &ClientConfig, auth: &AuthConfig) -> Result<Self, RequestError> {
        let mut api = Self::new(&client.base_url, Duration::from_secs(client.timeout_secs))?;
        api.min_password_len = auth.min_password_len;
        api.max_title_len = auth.max_post_title_len;
        Ok(api)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, RequestError> {
        let resp = req.send().await?;
        let status = resp.status();
        let url = resp.url().path().to_string();
        let body = resp.bytes().await?;
        debug!(%status, path = %url, bytes = body.len(), "API response");

        if status.is_success() {
            let envelope: Envelope<T> = serde_json::from_slice(&body)?;
            return Ok(envelope.data);
        }
        Err(error_from_body(status, &body))
    }

    // ------------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------------

    /// Validate locally, then log in and keep the token for later calls.
    pub async fn login(&self, req: &LoginRequest) -> Result<SessionInfo, RequestError> {
        validate_login(req, self.min_password_len)?;
        let session: SessionInfo = self.execute(self.request(Method::POST, "/api/auth/login").json(req)).await?;
        self.set_token(Some(session.token.clone()));
        Ok(session)
    }

    pub async fn signup(&self, req: &SignupRequest) -> Result<SessionInfo, RequestError> {
        validate_signup(req, self.min_password_len)?;
        let session: SessionInfo = self.execute(self.request(Method::POST, "/api/auth/signup").json(req)).await?;
        self.set_token(Some(session.token.clone()));
        Ok(session)
    }

    /// Drops the local token even if the server call fails.
    pub async fn logout(&self) -> Result<(), RequestError> {
        let result = self
            .execute::<IgnoredAny>(self.request(Method::POST, "/api/auth/logout"))
            .await;
        self.set_token(None);
        result.map(|_| ())
    }

    pub async fn me(&self) -> Result<User, RequestError> {
        self.execute(self.request(Method::GET, "/api/auth/me")).await
    }

    // ------------------------------------------------------------------------
    // Companies & dashboard
    // ------------------------------------------------------------------------

    pub async fn search_companies(&self, req: &CompanySearchRequest) -> Result<Vec<Company>, RequestError> {
        self.execute(self.request(Method::POST, "/api/companies/search").json(req)).await
    }

    pub async fn company(&self, id: &str) -> Result<Company, RequestError> {
        self.execute(self.request(Method::GET, &format!("/api/companies/{id}"))).await
    }

    pub async fn company_overview(&self, id: &str) -> Result<CompanyOverview, RequestError> {
        self.execute(self.request(Method::GET, &format!("/api/companies/{id}/overview")))
            .await
    }

    pub async fn dashboard_summary(&self, range: TimeRange) -> Result<DashboardSummary, RequestError> {
        self.execute(
            self.request(Method::GET, "/api/dashboard/summary")
                .query(&[("range", range.as_str())]),
        )
        .await
    }

    pub async fn risk_trend(&self, unit: TrendUnit) -> Result<NormalizedTrend, RequestError> {
        let unit = match unit {
            TrendUnit::Count => "count",
            TrendUnit::Percent => "percent",
        };
        self.execute(
            self.request(Method::GET, "/api/dashboard/risk-trend")
                .query(&[("unit", unit)]),
        )
        .await
    }

    // ------------------------------------------------------------------------
    // Model jobs
    // ------------------------------------------------------------------------

    pub async fn run_model(&self, req: &ModelRunRequest) -> Result<ModelJob, RequestError> {
        self.execute(self.request(Method::POST, "/api/model/run").json(req)).await
    }

    pub async fn model_job(&self, job_id: &str) -> Result<ModelJob, RequestError> {
        self.execute(self.request(Method::GET, &format!("/api/model/jobs/{job_id}")))
            .await
    }

    // ------------------------------------------------------------------------
    // Decision Room
    // ------------------------------------------------------------------------

    pub async fn list_posts(&self, category: PostCategory) -> Result<Vec<Post>, RequestError> {
        self.execute(self.request(Method::GET, &format!("/api/posts/{}", category.as_str())))
            .await
    }

    pub async fn get_post(&self, category: PostCategory, id: &str) -> Result<Post, RequestError> {
        self.execute(self.request(Method::GET, &format!("/api/posts/{}/{id}", category.as_str())))
            .await
    }

    pub async fn create_post(&self, category: PostCategory, post: &NewPost) -> Result<Post, RequestError> {
        validate_post(post, self.max_title_len)?;
        self.execute(
            self.request(Method::POST, &format!("/api/posts/{}", category.as_str()))
                .json(post),
        )
        .await
    }

    pub async fn update_post(&self, category: PostCategory, id: &str, patch: &PostPatch) -> Result<Post, RequestError> {
        self.execute(
            self.request(Method::PATCH, &format!("/api/posts/{}/{id}", category.as_str()))
                .json(patch),
        )
        .await
    }

    pub async fn delete_post(&self, category: PostCategory, id: &str) -> Result<(), RequestError> {
        self.execute::<IgnoredAny>(self.request(Method::DELETE, &format!("/api/posts/{}/{id}", category.as_str())))
            .await
            .map(|_| ())
    }

    /// Upload one attachment as `multipart/form-data` field `file`.
    pub async fn upload_file(
        &self,
        post_id: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Attachment, RequestError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);
        self.execute(
            self.request(Method::POST, &format!("/api/posts/{post_id}/files"))
                .multipart(form),
        )
        .await
    }

    pub async fn health(&self) -> Result<HealthStatus, RequestError> {
        self.execute(self.request(Method::GET, "/health")).await
    }
}

/// Typed error from a non-success response; falls back to the status
/// reason when the body is not an error envelope.
fn error_from_body(status: StatusCode, body: &[u8]) -> RequestError {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => RequestError::Status {
            status,
            code: envelope.error.code,
            message: envelope.error.message,
            field_errors: envelope.error.field_errors,
        },
        Err(_) => RequestError::Status {
            status,
            code: status.as_str().to_string(),
            message: status.canonical_reason().unwrap_or("request failed").to_string(),
            field_errors: BTreeMap::new(),
        },
    }
}
