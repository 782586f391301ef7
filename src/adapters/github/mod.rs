//! GitHub issue search adapter.

pub mod client;
pub mod models;

pub use client::{GitHubClient, SearchQuota};
pub use models::{GitHubSearchItem, GitHubSearchResponse};
