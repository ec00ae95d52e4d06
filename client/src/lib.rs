//! HTTP client layer for the beauty store admin dashboard.
//!
//! [`api::ApiClient`] sends every request relative to the configured API
//! base, attaches the bearer credential, busts caches on `GET`, and turns any
//! failure into a single [`api::ApiError`] shape. The services module wraps it
//! per admin resource.

pub mod api;
pub mod config;
pub mod notify;
pub mod services;
pub mod session;
pub mod utils;

pub use api::{build_query_string, ApiClient, ApiError, Listing, Page, QueryParams, RequestOptions};
pub use config::ClientConfig;
