//! Cube.js reporting API adapter
//!
//! Token acquisition, the catalog and load endpoints, and the retry policy
//! for queries the server is still preparing.

pub mod api;
pub mod client;
pub mod models;
pub mod retry;
pub mod token;

pub use api::ReportingApi;
pub use client::CubeApiClient;
pub use models::CONTINUE_WAIT;
pub use retry::{Attempt, RetryPolicy};
pub use token::{Credentials, HttpTokenProvider, Token, TokenProvider};
