//! Client for the emergency-room real-time bed API.
//!
//! Issues one `GET` per refresh (page 1, `numOfRows = row_limit`) and
//! extracts `response.body.items.item`. No retries happen here; wrap the
//! client in [`crate::retry::RetryingFeed`] for that.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::settings::SourceSettings;
use crate::{FetchError, HospitalFeed, RawRecord, body_excerpt};

/// JSON pointer to the item list inside a response.
const ITEMS_POINTER: &str = "/response/body/items/item";

/// Fetcher bound to one endpoint and credential.
pub struct EgenClient {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    debug_echo: bool,
}

impl EgenClient {
    /// Creates a client with the given endpoint, credential and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be
    /// constructed (e.g. TLS backend initialization failure).
    pub fn new(
        base_url: &str,
        service_key: &str,
        timeout: Duration,
        debug_echo: bool,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('?').to_string(),
            service_key: service_key.to_string(),
            debug_echo,
        })
    }

    /// Creates a client from validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be
    /// constructed.
    pub fn from_settings(settings: &SourceSettings) -> Result<Self, FetchError> {
        let key = settings
            .service_key
            .as_ref()
            .map(|k| k.expose().to_string())
            .unwrap_or_default();
        Self::new(
            &settings.base_url,
            &key,
            settings.timeout(),
            settings.debug_echo,
        )
    }

    fn request(&self, row_limit: NonZeroU32) -> reqwest::RequestBuilder {
        // The portal issues keys that are often already percent-encoded, so
        // the key goes into the URL verbatim instead of through `query()`.
        let url = format!("{}?serviceKey={}", self.base_url, self.service_key);
        self.client.get(url).query(&[
            ("_type", "json".to_string()),
            ("pageNo", "1".to_string()),
            ("numOfRows", row_limit.to_string()),
        ])
    }
}

#[async_trait]
impl HospitalFeed for EgenClient {
    async fn fetch(&self, row_limit: NonZeroU32) -> Result<Vec<RawRecord>, FetchError> {
        log::info!(
            "Fetching emergency-room data from {} (pageNo=1, numOfRows={row_limit})",
            self.base_url
        );

        let response = self.request(row_limit).send().await.map_err(map_transport)?;
        let status = response.status();

        if !status.is_success() {
            // An unreadable error body must not mask the status.
            let text = response.text().await.unwrap_or_default();
            if self.debug_echo {
                log::info!("Raw response (HTTP {status}): {}", body_excerpt(&text));
            }
            log::error!("API call failed with HTTP {status}");
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                body_excerpt: body_excerpt(&text),
            });
        }

        let text = response.text().await.map_err(map_transport)?;
        if self.debug_echo {
            log::info!("Raw response (HTTP {status}): {}", body_excerpt(&text));
        }

        let items = parse_items(&text)?;
        log::info!("Received {} raw items", items.len());
        Ok(items)
    }
}

/// Parses a response body and extracts its item list.
///
/// # Errors
///
/// Returns [`FetchError::InvalidPayload`] if the body is not JSON and
/// [`FetchError::EmptyResult`] if the item list is absent or empty.
pub fn parse_items(body: &str) -> Result<Vec<RawRecord>, FetchError> {
    let json: Value = serde_json::from_str(body).map_err(|e| {
        log::warn!("Response body is not JSON: {e}");
        FetchError::InvalidPayload {
            body_excerpt: body_excerpt(body),
        }
    })?;
    extract_items(&json)
}

/// Extracts `response.body.items.item` from a parsed response.
///
/// A single object in place of the array (the API does this when exactly
/// one record matches) is treated as a one-element list. Non-object
/// entries are skipped.
///
/// # Errors
///
/// Returns [`FetchError::EmptyResult`] if the list is absent or empty.
pub fn extract_items(json: &Value) -> Result<Vec<RawRecord>, FetchError> {
    let items: Vec<RawRecord> = match json.pointer(ITEMS_POINTER) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let record = item.as_object().cloned();
                if record.is_none() {
                    log::warn!("Skipping non-object item: {item}");
                }
                record
            })
            .collect(),
        Some(Value::Object(item)) => vec![item.clone()],
        _ => Vec::new(),
    };

    if items.is_empty() {
        return Err(FetchError::EmptyResult);
    }
    Ok(items)
}

fn map_transport(e: reqwest::Error) -> FetchError {
    // The request URL carries the service key.
    let e = e.without_url();
    if e.is_timeout() {
        log::error!("API request timed out");
        FetchError::Timeout
    } else {
        log::error!("API request failed: {e}");
        FetchError::Transport(e.to_string())
    }
}
