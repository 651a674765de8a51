//! Shared data structures for SENTINEL risk monitoring
//!
//! - Quarter: explicit `(year, index)` fiscal quarter
//! - Risk: per-entity quarterly observations, status buckets, trend payloads
//! - Company: monitored companies, forecasts and signals
//! - Dashboard: KPI tiles, alert trends, tier distribution
//! - Post: Decision Room bulletins and Q&A
//! - User: accounts and sessions
//! - Model: scoring jobs

mod quarter;
mod risk;
mod company;
mod dashboard;
mod post;
mod user;
mod model;

pub use quarter::*;
pub use risk::*;
pub use company::*;
pub use dashboard::*;
pub use post::*;
pub use user::*;
pub use model::*;
