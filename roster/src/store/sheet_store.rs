//! SheetStore
//! ----------
//! HTTP-backed [`ResultStore`] talking to a spreadsheet web-app endpoint.
//!
//! The endpoint multiplexes on an `action` query parameter:
//!
//!   - `GET  ?action=getParticipants` → `[Participant]`
//!   - `GET  ?action=getResults`      → `[DrawResult]`
//!   - `POST ?action=saveResult`      ← `DrawResult` (JSON sent as `text/plain`)
//!   - `POST ?action=resetResults`
//!
//! Bodies are posted as `text/plain` because script hosts commonly reject
//! the preflight a JSON content type would trigger.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};

use super::ResultStore;
use crate::error::StoreError;
use crate::model::{DrawResult, Participant};

/// Value shipped in freshly generated config files.
pub const PLACEHOLDER_URL: &str = "YOUR_APPS_SCRIPT_URL_HERE";

#[derive(Clone)]
pub struct SheetStore {
    http: Client,
    url: String,
}

impl SheetStore {
    pub fn new(url: impl Into<String>) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: url.into().trim().to_string(),
        })
    }

    /// False for an empty url, the placeholder, or anything that is not http(s).
    pub fn is_configured(&self) -> bool {
        let url = self.url.as_str();
        !url.is_empty()
            && url != PLACEHOLDER_URL
            && (url.starts_with("https://") || url.starts_with("http://"))
    }

    fn action_url(&self, action: &str) -> String {
        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}action={}", self.url, sep, action)
    }

    async fn get_json<T: DeserializeOwned>(&self, action: &str) -> Result<T, StoreError> {
        if !self.is_configured() {
            return Err(StoreError::Unconfigured);
        }

        let resp = self
            .http
            .get(self.action_url(action))
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post(&self, action: &str, body: String) -> Result<(), StoreError> {
        if !self.is_configured() {
            return Err(StoreError::Unconfigured);
        }

        let resp = self
            .http
            .post(self.action_url(action))
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }

        Ok(())
    }
}

#[async_trait]
impl ResultStore for SheetStore {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_participants(&self) -> Result<Vec<Participant>, StoreError> {
        let participants: Vec<Participant> = self
            .get_json("getParticipants")
            .await
            .inspect_err(|e| error!(error = %e, "fetch participants failed"))?;

        debug!(count = participants.len(), "participants fetched");
        Ok(participants)
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_results(&self) -> Vec<DrawResult> {
        if !self.is_configured() {
            return Vec::new();
        }

        match self.get_json::<Vec<DrawResult>>("getResults").await {
            Ok(results) => {
                debug!(count = results.len(), "results fetched");
                results
            }
            Err(e) => {
                warn!(error = %e, "fetch results failed; continuing with none");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self, result), fields(participant_id = %result.participant_id))]
    async fn append_result(&self, result: &DrawResult) -> bool {
        if !self.is_configured() {
            return false;
        }

        let body = match serde_json::to_string(result) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "could not encode result");
                return false;
            }
        };

        match self.post("saveResult", body).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "save result failed");
                false
            }
        }
    }

    #[instrument(skip(self))]
    async fn reset_results(&self) -> bool {
        if !self.is_configured() {
            return false;
        }

        match self.post("resetResults", String::new()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "reset results failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_and_non_http_urls_are_unconfigured() {
        for url in ["", PLACEHOLDER_URL, "ftp://example.com", "script.google.com/x"] {
            let store = SheetStore::new(url).unwrap();
            assert!(!store.is_configured(), "{url:?} should be unconfigured");
        }

        let store = SheetStore::new("https://script.google.com/macros/s/abc/exec").unwrap();
        assert!(store.is_configured());
    }

    #[test]
    fn action_is_appended_as_query_parameter() {
        let store = SheetStore::new("https://example.com/exec").unwrap();
        assert_eq!(
            store.action_url("getResults"),
            "https://example.com/exec?action=getResults"
        );

        let store = SheetStore::new("https://example.com/exec?key=1").unwrap();
        assert_eq!(
            store.action_url("saveResult"),
            "https://example.com/exec?key=1&action=saveResult"
        );
    }
}
