//! HTTP client for the machine-facing session API.
//!
//! Two calls: `POST {base}/api/machine/kiosk` opens a transaction and
//! returns its identity; `PUT` to the same path reports the final counts.
//! Field names follow the server's camelCase contract.

use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{SessionApi, StartReceipt};
use crate::error::CloudError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartRequest<'a> {
    bin_id: &'a str,
    secret: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartResponse {
    transaction_id: String,
    claim_secret: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StopRequest<'a> {
    transaction_id: &'a str,
    secret: &'a str,
    plastic: u32,
    cans: u32,
}

pub struct HttpSessionApi {
    client: reqwest::blocking::Client,
    api_url: String,
    secret: String,
}

impl HttpSessionApi {
    /// `base_url` is the server root, e.g. `https://kiosk.example.com`.
    pub fn new(base_url: &str, secret: String) -> Result<Self, CloudError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|_| CloudError::ClientInit)?;
        Ok(Self {
            client,
            api_url: format!("{}/api/machine/kiosk", base_url.trim_end_matches('/')),
            secret,
        })
    }
}

impl SessionApi for HttpSessionApi {
    fn notify_start(&mut self, bin_id: &str) -> Result<StartReceipt, CloudError> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&StartRequest {
                bin_id,
                secret: &self.secret,
            })
            .send()
            .map_err(|e| {
                warn!("Session start request failed: {e}");
                CloudError::Unreachable
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CloudError::BadStatus(status.as_u16()));
        }

        let body: StartResponse = response.json().map_err(|_| CloudError::BadResponse)?;
        info!("Cloud opened transaction {}", body.transaction_id);
        Ok(StartReceipt {
            transaction_id: body.transaction_id,
            claim_secret: body.claim_secret,
        })
    }

    fn notify_stop(
        &mut self,
        transaction_id: &str,
        plastic: u32,
        cans: u32,
    ) -> Result<(), CloudError> {
        let response = self
            .client
            .put(&self.api_url)
            .timeout(Duration::from_secs(3))
            .json(&StopRequest {
                transaction_id,
                secret: &self.secret,
                plastic,
                cans,
            })
            .send()
            .map_err(|_| CloudError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CloudError::BadStatus(status.as_u16()));
        }
        Ok(())
    }
}

/// Stand-in for deployments without a cloud endpoint. Every call reports
/// the endpoint as unreachable, which the service handles through its
/// offline fallback path.
pub struct NullSessionApi;

impl SessionApi for NullSessionApi {
    fn notify_start(&mut self, _bin_id: &str) -> Result<StartReceipt, CloudError> {
        Err(CloudError::Unreachable)
    }

    fn notify_stop(
        &mut self,
        _transaction_id: &str,
        _plastic: u32,
        _cans: u32,
    ) -> Result<(), CloudError> {
        Err(CloudError::Unreachable)
    }
}
