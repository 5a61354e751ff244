//! Shared ECS configuration context
//!
//! Holds the region, endpoint and credentials that every ECS request needs,
//! so clients can be created without going back to the config file.

use super::EcsClient;
use super::error::EcsError;
use crate::config::{Access, Config};
use std::sync::Arc;

/// Region, endpoint and credentials for creating ECS clients.
///
/// # Example
/// ```ignore
/// let ctx = EcsContext::from_config(&config);
/// let ecs = EcsClient::from_context(&ctx)?;
/// ```
#[derive(Clone)]
pub struct EcsContext {
    credentials: Arc<Access>,
    region: String,
    endpoint: String,
}

impl EcsContext {
    pub fn new(region: &str, endpoint: &str, credentials: Access) -> Self {
        Self {
            credentials: Arc::new(credentials),
            region: region.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Build a context from loaded configuration.
    ///
    /// Uses the regional endpoint unless the config overrides it.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.region_id, &config.endpoint(), config.access.clone())
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn credentials(&self) -> &Access {
        &self.credentials
    }

    /// Create an ECS client from this context.
    pub fn ecs_client(&self) -> Result<EcsClient, EcsError> {
        EcsClient::from_context(self)
    }
}

impl std::fmt::Debug for EcsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcsContext")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_config;

    #[test]
    fn test_context_from_config() {
        let ctx = EcsContext::from_config(&test_config());
        assert_eq!(ctx.region(), "cn-hangzhou");
        assert_eq!(ctx.endpoint(), "https://ecs.cn-hangzhou.aliyuncs.com");
        assert_eq!(ctx.credentials().key, "LTAI5tTestKey");
    }

    #[test]
    fn test_context_debug_hides_credentials() {
        let ctx = EcsContext::from_config(&test_config());
        let debug = format!("{:?}", ctx);
        assert!(debug.contains("cn-hangzhou"));
        assert!(!debug.contains("test-secret"));
        assert!(!debug.contains("LTAI5tTestKey"));
    }

    #[test]
    fn test_context_creates_client() {
        let ctx = EcsContext::from_config(&test_config());
        let client = ctx.ecs_client().unwrap();
        assert_eq!(client.host(), "ecs.cn-hangzhou.aliyuncs.com");
    }
}
