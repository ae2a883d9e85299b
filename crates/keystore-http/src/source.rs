//! HTTP implementation of the public key listing.
//!
//! [`HttpPublicKeySource`] issues one signed request per call:
//!
//! ```text
//! GET {base_url}/v2/public-key?limit={n}
//! Access-Id / Access-Time / Access-Signature
//! User-Agent / Accept-Language
//!
//! 200 → { "publicKeys": [ { "id", "content", "created" }, ... ], "cursor": ... }
//! ```
//!
//! Only the first page is read; the `cursor` is ignored. Retries are left to
//! the caller.

use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use ledger_webhook_keystore::{Credentials, KeySourceResult, PublicKeyRecord, PublicKeySource};
use reqwest::{Client, Request, header};
use serde::Deserialize;

use crate::{
    config::HttpKeySourceConfig,
    error::{HttpKeySourceError, Result},
    signer::{ACCESS_ID_HEADER, ACCESS_SIGNATURE_HEADER, ACCESS_TIME_HEADER, sign_request},
};

/// First page of the public key listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PublicKeyListing {
    pub(crate) public_keys: Vec<PublicKeyRecord>,
}

/// [`PublicKeySource`] backed by the remote service's REST API.
///
/// # Thread Safety
///
/// `HttpPublicKeySource` is `Send + Sync`. The underlying [`Client`] pools
/// connections internally, so one instance should be shared.
///
/// # Error Handling
///
/// Failures are converted to [`KeySourceError`](ledger_webhook_keystore::KeySourceError):
/// - Timeouts → `Timeout`
/// - Connection and TLS failures → `Connection`
/// - Non-2xx responses → `Rejected { status }`
/// - Undecodable bodies → `Serialization`
#[derive(Clone)]
pub struct HttpPublicKeySource {
    client: Client,
    config: HttpKeySourceConfig,
}

impl HttpPublicKeySource {
    /// Creates a source from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpKeySourceError::Config`] if the configuration is invalid
    /// or [`HttpKeySourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: HttpKeySourceConfig) -> Result<Self> {
        config.validate()?;
        let client =
            Client::builder().timeout(config.timeout()).user_agent(config.user_agent()).build()?;
        Ok(Self { client, config })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &HttpKeySourceConfig {
        &self.config
    }

    /// Builds the signed listing request without sending it.
    pub(crate) fn build_request(&self, credentials: &Credentials, limit: u32) -> Result<Request> {
        let url = self.config.public_key_url(limit)?;
        let access = sign_request(credentials, Utc::now(), "")?;

        let request = self
            .client
            .get(url)
            .header(ACCESS_ID_HEADER, access.access_id)
            .header(ACCESS_TIME_HEADER, access.access_time)
            .header(ACCESS_SIGNATURE_HEADER, access.access_signature)
            .header(header::ACCEPT_LANGUAGE, self.config.language())
            .header(header::CONTENT_TYPE, "application/json")
            .build()?;

        Ok(request)
    }

    async fn fetch(&self, credentials: &Credentials, limit: u32) -> Result<Vec<PublicKeyRecord>> {
        let request = self.build_request(credentials, limit)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(HttpKeySourceError::Status { status: status.as_u16(), body });
        }

        let listing: PublicKeyListing = serde_json::from_str(&body)?;
        Ok(listing.public_keys)
    }
}

impl fmt::Debug for HttpPublicKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPublicKeySource").field("config", &self.config).finish_non_exhaustive()
    }
}

#[async_trait]
impl PublicKeySource for HttpPublicKeySource {
    #[tracing::instrument(skip(self, credentials), fields(access_id = %credentials.access_id()))]
    async fn list_public_keys(
        &self,
        credentials: &Credentials,
        limit: u32,
    ) -> KeySourceResult<Vec<PublicKeyRecord>> {
        match self.fetch(credentials, limit).await {
            Ok(records) => {
                tracing::debug!(count = records.len(), "public keys listed");
                Ok(records)
            },
            Err(err) => {
                tracing::warn!(error = %err, "public key listing failed");
                Err(err.into())
            },
        }
    }
}
