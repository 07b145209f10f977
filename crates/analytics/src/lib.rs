//! Mixpanel data export client.
//!
//! - **Queries** (`query`) - endpoint, parameters and people selectors
//! - **Signing** (`signature`) - legacy MD5 request signature
//! - **Client** (`client`) - signed GET requests and JSON decoding
//!
//! `AnalyticsBackend` is the seam the Slack dispatcher depends on; `AnalyticsClient` is the
//! HTTP implementation.

pub mod client;
pub mod query;
pub mod signature;

pub use client::{results_count, AnalyticsBackend, AnalyticsClient, AnalyticsError};
pub use query::{selector, AnalyticsQuery, ParamValue};
