#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Emergency-room occupancy acquisition and normalization.
//!
//! The refresh cycle runs strictly in one direction:
//!
//! 1. [`egen::EgenClient`] fetches the raw item list ([`HospitalFeed`]).
//! 2. [`normalize::normalize`] coerces each item into a
//!    [`NormalizedHospital`](er_congestion_hospital_models::NormalizedHospital).
//! 3. [`metrics`] scores every record and drops the ones without
//!    coordinates.
//!
//! [`pipeline::Pipeline`] chains the stages and [`cache::SnapshotCache`]
//! optionally reuses a finished snapshot for a short time.

pub mod cache;
pub mod egen;
pub mod metrics;
pub mod normalize;
pub mod parsing;
pub mod pipeline;
pub mod retry;
pub mod settings;

use std::num::NonZeroU32;

use async_trait::async_trait;

/// An untyped item as returned by the external API. Fields may be absent
/// and their types vary between calls.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Maximum number of response-body characters kept in error values.
pub const BODY_EXCERPT_LEN: usize = 300;

/// Errors that abort a refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// DNS, connection, TLS or other transport failure.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("API call failed (HTTP {status}): {body_excerpt}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body. Not escaped.
        body_excerpt: String,
    },

    /// The response body was not valid JSON.
    #[error("API response is not JSON: {body_excerpt}")]
    InvalidPayload {
        /// Leading part of the response body. Not escaped.
        body_excerpt: String,
    },

    /// The response parsed but carried no items.
    #[error("API call succeeded but the item list is empty")]
    EmptyResult,
}

impl FetchError {
    /// Returns `true` if a retry could plausibly succeed (timeouts,
    /// transport failures, HTTP 429 and 5xx).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidPayload { .. } | Self::EmptyResult => false,
        }
    }
}

/// Anything that can produce a raw item list for a given row limit.
///
/// [`egen::EgenClient`] is the production implementation; tests and the
/// retry wrapper provide others.
#[async_trait]
pub trait HospitalFeed: Send + Sync {
    /// Fetches the first page of up to `row_limit` raw items.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails or the payload carries
    /// no items.
    async fn fetch(&self, row_limit: NonZeroU32) -> Result<Vec<RawRecord>, FetchError>;
}

/// Returns at most the first [`BODY_EXCERPT_LEN`] characters of `body`.
#[must_use]
pub fn body_excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LEN).collect()
}
