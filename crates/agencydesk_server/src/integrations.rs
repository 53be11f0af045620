//! Calendar and email relay webhooks used by the public booking endpoints.

use agencydesk_core::booking::BusySlot;
use agencydesk_core::Config;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("calendar unavailable: {0}")]
    Calendar(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct BusyQuery {
    date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct BusyResponse {
    #[serde(default)]
    busy: Vec<BusySlot>,
}

/// Outbound webhook clients. Unset URLs disable the integration.
#[derive(Debug, Clone)]
pub struct Integrations {
    http: reqwest::Client,
    calendar_url: Option<String>,
    email_url: Option<String>,
}

impl Integrations {
    pub fn new(calendar_url: Option<String>, email_url: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!("Falling back to default HTTP client: {}", err);
                reqwest::Client::new()
            });
        Self {
            http,
            calendar_url,
            email_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.calendar_webhook_url.clone(),
            config.email_webhook_url.clone(),
        )
    }

    /// Neither webhook configured.
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    /// Busy intervals on `date` as reported by the calendar webhook.
    ///
    /// # Returns
    /// An empty list when no calendar is configured.
    ///
    /// # Errors
    /// Returns an error when the webhook cannot be reached, answers with a
    /// non-success status, or sends an unreadable body.
    pub async fn busy_slots(&self, date: NaiveDate) -> Result<Vec<BusySlot>, IntegrationError> {
        let Some(url) = self.calendar_url.as_deref() else {
            return Ok(Vec::new());
        };
        let response = self
            .http
            .post(url)
            .json(&BusyQuery { date })
            .send()
            .await?
            .error_for_status()?;
        let body: BusyResponse = response.json().await?;
        Ok(body.busy)
    }

    /// Post `payload` to the email relay without waiting for the outcome.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn notify<T: Serialize>(&self, kind: &'static str, payload: &T) {
        let Some(url) = self.email_url.clone() else {
            return;
        };
        let body = match serde_json::to_value(payload) {
            Ok(value) => serde_json::json!({ "kind": kind, "payload": value }),
            Err(err) => {
                tracing::warn!("Failed to encode {} notification: {}", kind, err);
                return;
            }
        };
        let http = self.http.clone();
        tokio::spawn(async move {
            let result = http
                .post(&url)
                .json(&body)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status);
            if let Err(err) = result {
                tracing::warn!("Email relay rejected {} notification: {}", kind, err);
            }
        });
    }
}
