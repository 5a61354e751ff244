//! Alibaba Cloud ECS client
//!
//! A small RPC client for the three security group actions the agent uses.
//! Requests are `POST /` with parameters in the query string, signed with
//! ACS3-HMAC-SHA256.

pub mod context;
pub mod error;
mod security_group;
pub mod signer;
pub mod types;

pub use context::EcsContext;
pub use error::{EcsError, EcsErrorKind, classify_ecs_code};

use crate::defaults::{DEFAULT_ECS_TIMEOUT_SECS, ECS_API_VERSION};
use crate::truncate_for_log;
use serde::de::DeserializeOwned;
use signer::{SigningRequest, canonical_query, hash_payload};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use types::ErrorResponse;

/// ECS client for managing security group rules
pub struct EcsClient {
    http: reqwest::Client,
    ctx: EcsContext,
    url: reqwest::Url,
    host: String,
}

impl EcsClient {
    /// Create an ECS client from a context
    pub fn from_context(ctx: &EcsContext) -> Result<Self, EcsError> {
        let url = reqwest::Url::parse(ctx.endpoint()).map_err(|e| {
            EcsError::InvalidRequest(format!("bad endpoint '{}': {}", ctx.endpoint(), e))
        })?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(EcsError::InvalidRequest(format!(
                    "endpoint '{}' has no host",
                    ctx.endpoint()
                )));
            }
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_ECS_TIMEOUT_SECS))
            .build()
            .map_err(|e| EcsError::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            ctx: ctx.clone(),
            url,
            host,
        })
    }

    /// Host (and port, if explicit) that requests are signed for
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn region(&self) -> &str {
        self.ctx.region()
    }

    /// Send one signed RPC call and decode the JSON response.
    ///
    /// `RegionId` is added to `params` automatically.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        action: &'static str,
        mut params: BTreeMap<String, String>,
    ) -> Result<T, EcsError> {
        params.insert("RegionId".to_string(), self.ctx.region().to_string());
        let query = canonical_query(&params);
        let payload_hash = hash_payload(b"");

        let headers = BTreeMap::from([
            ("host".to_string(), self.host.clone()),
            ("x-acs-action".to_string(), action.to_string()),
            ("x-acs-content-sha256".to_string(), payload_hash.clone()),
            (
                "x-acs-date".to_string(),
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            ),
            (
                "x-acs-signature-nonce".to_string(),
                uuid::Uuid::new_v4().to_string(),
            ),
            ("x-acs-version".to_string(), ECS_API_VERSION.to_string()),
        ]);

        let credentials = self.ctx.credentials();
        let authorization = SigningRequest {
            method: "POST",
            canonical_query: &query,
            headers: &headers,
            payload_hash: &payload_hash,
        }
        .authorization(&credentials.key, &credentials.secret)?;

        let mut url = self.url.clone();
        url.set_path("/");
        url.set_query(Some(&query));

        // reqwest derives Host from the URL, which matches the signed value
        let mut request = self
            .http
            .post(url)
            .header("authorization", authorization)
            .header("accept", "application/json");
        for (name, value) in headers.iter().filter(|(name, _)| name.as_str() != "host") {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!(action, region = %self.ctx.region(), "Calling ECS");

        let response = request
            .send()
            .await
            .map_err(|source| EcsError::Transport { action, source })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| EcsError::Transport { action, source })?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => EcsError::Api {
                    action,
                    status: status.as_u16(),
                    code: err.code,
                    message: err.message,
                    request_id: err.request_id,
                },
                Err(_) => EcsError::Api {
                    action,
                    status: status.as_u16(),
                    code: "Unknown".to_string(),
                    message: truncate_for_log(&body, 256),
                    request_id: None,
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| EcsError::Decode {
            action,
            reason: e.to_string(),
        })
    }
}

impl std::fmt::Debug for EcsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcsClient")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}
