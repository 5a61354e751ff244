//! Rule repository trait for testing
//!
//! The provider offers no "update source" primitive, so the trait exposes
//! revoke and authorize as separate calls and the reconciler sequences them.

use crate::aliyun::{EcsClient, EcsError};
use crate::rule::{NicType, Rule};

/// Trait for security group rule operations that can be mocked in tests.
///
/// This trait abstracts the provider API to enable unit testing of the
/// reconciliation logic without calling the cloud.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait RuleRepository: Send + Sync {
    /// Fetch a fresh snapshot of the group's ingress rules
    async fn list(&self, group_id: &str) -> Result<Vec<Rule>, EcsError>;

    /// Remove `rule`, matched on all fields including its current source
    async fn revoke(&self, group_id: &str, rule: &Rule) -> Result<(), EcsError>;

    /// Add `rule` as given
    async fn authorize(&self, group_id: &str, rule: &Rule) -> Result<(), EcsError>;
}

/// [`RuleRepository`] backed by the ECS API
#[derive(Debug)]
pub struct EcsRuleRepository {
    client: EcsClient,
    nic_type: Option<NicType>,
}

impl EcsRuleRepository {
    /// `nic_type` narrows listing to one NIC type; `None` uses the provider default
    pub fn new(client: EcsClient, nic_type: Option<NicType>) -> Self {
        Self { client, nic_type }
    }
}

impl RuleRepository for EcsRuleRepository {
    async fn list(&self, group_id: &str) -> Result<Vec<Rule>, EcsError> {
        self.client
            .describe_security_group_rules(group_id, self.nic_type)
            .await
    }

    async fn revoke(&self, group_id: &str, rule: &Rule) -> Result<(), EcsError> {
        self.client.revoke_security_group(group_id, rule).await
    }

    async fn authorize(&self, group_id: &str, rule: &Rule) -> Result<(), EcsError> {
        self.client.authorize_security_group(group_id, rule).await
    }
}
