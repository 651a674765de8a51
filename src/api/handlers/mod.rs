//! API route handlers
//!
//! - auth: login, signup, logout, current user, admin "view as"
//! - companies: search, detail, overview
//! - dashboard: KPI summary and the normalized risk status trend
//! - model: scoring job submission and status
//! - posts: Decision Room CRUD and attachments
//! - health: liveness

mod auth;
mod companies;
mod dashboard;
mod health;
mod model;
mod posts;

pub use auth::*;
pub use companies::*;
pub use dashboard::*;
pub use health::*;
pub use model::*;
pub use posts::*;
