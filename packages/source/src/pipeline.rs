//! One refresh cycle: fetch → normalize → score → keep located rows.
//!
//! Each call produces a fresh, immutable [`Snapshot`]. A fetch failure
//! aborts the cycle; no partial snapshot is ever returned.

use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use er_congestion_hospital_models::HospitalRow;

use crate::egen::EgenClient;
use crate::metrics::score_and_locate;
use crate::normalize::normalize;
use crate::retry::{RetryPolicy, RetryingFeed};
use crate::settings::SourceSettings;
use crate::{FetchError, HospitalFeed};

/// The complete dataset produced by one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Located, scored rows in source order.
    pub rows: Vec<HospitalRow>,
    /// When the fetch completed.
    pub fetched_at: DateTime<Utc>,
    /// Row limit the snapshot was fetched with.
    pub row_limit: u32,
    /// Number of raw items received.
    pub raw_count: usize,
    /// Number of items dropped for missing coordinates.
    pub dropped: usize,
}

/// Runs refresh cycles against a feed.
#[derive(Clone)]
pub struct Pipeline {
    feed: Arc<dyn HospitalFeed>,
    debug_echo: bool,
}

impl Pipeline {
    #[must_use]
    pub fn new(feed: Arc<dyn HospitalFeed>, debug_echo: bool) -> Self {
        Self { feed, debug_echo }
    }

    /// Builds the production pipeline: an [`EgenClient`], wrapped in a
    /// [`RetryingFeed`] when `max_retries > 0`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be
    /// constructed.
    pub fn from_settings(settings: &SourceSettings) -> Result<Self, FetchError> {
        let client = EgenClient::from_settings(settings)?;
        let feed: Arc<dyn HospitalFeed> = if settings.max_retries > 0 {
            Arc::new(RetryingFeed::new(
                client,
                RetryPolicy {
                    max_retries: settings.max_retries,
                    base_delay: settings.retry_base_delay(),
                },
            ))
        } else {
            Arc::new(client)
        };
        Ok(Self::new(feed, settings.debug_echo))
    }

    /// Runs one full refresh cycle.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] of the fetch stage; later stages never
    /// fail.
    pub async fn refresh(&self, row_limit: NonZeroU32) -> Result<Snapshot, FetchError> {
        let result = self.feed.fetch(row_limit).await;

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                if self.debug_echo {
                    log::info!("Refresh summary: {{rows: 0, error: {e:?}}}");
                }
                return Err(e);
            }
        };

        let raw_count = raw.len();
        let (rows, dropped) = score_and_locate(normalize(&raw));

        if dropped > 0 {
            log::info!("Dropped {dropped} of {raw_count} hospitals without coordinates");
        }
        if self.debug_echo {
            log::info!("Refresh summary: {{rows: {}, error: None}}", rows.len());
        }

        Ok(Snapshot {
            rows,
            fetched_at: Utc::now(),
            row_limit: row_limit.get(),
            raw_count,
            dropped,
        })
    }
}
