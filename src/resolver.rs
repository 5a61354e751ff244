//! Outbound address discovery
//!
//! Asks an external service which IPv4 address our requests arrive from. The
//! resolver does not retry; the next scheduled cycle is the retry.

use crate::defaults::DEFAULT_RESOLVE_TIMEOUT_SECS;
use crate::rule::Address;
use crate::truncate_for_log;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Address lookup failures
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No response from the discovery service
    #[error("Failed to fetch public IP from {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The discovery service answered with an error status
    #[error("Public IP service {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body was not an IPv4 address
    #[error("Invalid IP address received from {url}: {body:?}")]
    Malformed { url: String, body: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Trait for address discovery that can be mocked in tests.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait AddressResolver: Send + Sync {
    /// Current public IPv4 address of this host
    async fn resolve(&self) -> Result<Address, ResolveError>;
}

/// Resolver for services that reply with the caller's IP as a plain-text body
#[derive(Debug, Clone)]
pub struct HttpAddressResolver {
    client: reqwest::Client,
    url: String,
}

impl HttpAddressResolver {
    pub fn new(url: &str) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_RESOLVE_TIMEOUT_SECS))
            .build()
            .map_err(ResolveError::Client)?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AddressResolver for HttpAddressResolver {
    async fn resolve(&self) -> Result<Address, ResolveError> {
        let transport = |source| ResolveError::Transport {
            url: self.url.clone(),
            source,
        };

        let response = self.client.get(&self.url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        let address: Address = body.parse().map_err(|_| ResolveError::Malformed {
            url: self.url.clone(),
            body: truncate_for_log(body.trim(), 64),
        })?;

        debug!(public_ip = %address, url = %self.url, "Detected public IP");
        Ok(address)
    }
}
