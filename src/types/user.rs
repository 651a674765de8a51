//! Users and session payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Analyst,
    Viewer,
}

impl Role {
    /// Viewers can read but not write posts.
    pub const fn can_write(self) -> bool {
        matches!(self, Self::Admin | Self::Analyst)
    }
}

/// Stable ids of the demo accounts, referenced by seeded posts.
pub const DEMO_ADMIN_ID: &str = "demo-admin";
pub const DEMO_ANALYST_ID: &str = "demo-analyst";
pub const DEMO_VIEWER_ID: &str = "demo-viewer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub password_confirm: String,
}

/// Issued on login/signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}
