//! Security group rule management

use super::EcsClient;
use super::error::EcsError;
use super::types::{DescribeSecurityGroupAttributeResponse, MutationResponse};
use crate::rule::{NicType, Rule};
use std::collections::BTreeMap;
use tracing::debug;

const DESCRIBE_ACTION: &str = "DescribeSecurityGroupAttribute";
const REVOKE_ACTION: &str = "RevokeSecurityGroup";
const AUTHORIZE_ACTION: &str = "AuthorizeSecurityGroup";

/// Request parameters naming a rule by its full field tuple
fn rule_params(security_group_id: &str, rule: &Rule) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("SecurityGroupId".to_string(), security_group_id.to_string()),
        ("Policy".to_string(), rule.policy.as_str().to_string()),
        ("Description".to_string(), rule.description.clone()),
        ("Priority".to_string(), rule.priority.to_string()),
        ("NicType".to_string(), rule.nic_type.as_str().to_string()),
        ("PortRange".to_string(), rule.port_range.clone()),
        ("SourceCidrIp".to_string(), rule.source_address.clone()),
        ("IpProtocol".to_string(), rule.protocol.clone()),
    ])
}

impl EcsClient {
    /// List the ingress rules of a security group
    ///
    /// Entries without an IPv4 CIDR source are skipped.
    pub async fn describe_security_group_rules(
        &self,
        security_group_id: &str,
        nic_type: Option<NicType>,
    ) -> Result<Vec<Rule>, EcsError> {
        let mut params = BTreeMap::from([
            ("SecurityGroupId".to_string(), security_group_id.to_string()),
            ("Direction".to_string(), "ingress".to_string()),
        ]);
        if let Some(nic_type) = nic_type {
            params.insert("NicType".to_string(), nic_type.as_str().to_string());
        }

        let response: DescribeSecurityGroupAttributeResponse =
            self.call(DESCRIBE_ACTION, params).await?;

        let total = response.permissions.permission.len();
        let mut rules = Vec::with_capacity(total);
        for permission in response.permissions.permission {
            let rule = permission
                .into_rule()
                .map_err(|e| EcsError::Decode {
                    action: DESCRIBE_ACTION,
                    reason: e.to_string(),
                })?;
            if let Some(rule) = rule {
                rules.push(rule);
            }
        }

        debug!(
            security_group_id = %security_group_id,
            request_id = ?response.request_id,
            total,
            cidr_rules = rules.len(),
            "Described security group"
        );

        Ok(rules)
    }

    /// Remove an ingress rule; every field including the source must match
    pub async fn revoke_security_group(
        &self,
        security_group_id: &str,
        rule: &Rule,
    ) -> Result<(), EcsError> {
        let response: MutationResponse = self
            .call(REVOKE_ACTION, rule_params(security_group_id, rule))
            .await?;

        debug!(
            security_group_id = %security_group_id,
            source = %rule.source_address,
            request_id = ?response.request_id,
            "Revoked ingress rule"
        );
        Ok(())
    }

    /// Add an ingress rule
    pub async fn authorize_security_group(
        &self,
        security_group_id: &str,
        rule: &Rule,
    ) -> Result<(), EcsError> {
        let response: MutationResponse = self
            .call(AUTHORIZE_ACTION, rule_params(security_group_id, rule))
            .await?;

        debug!(
            security_group_id = %security_group_id,
            source = %rule.source_address,
            request_id = ?response.request_id,
            "Authorized ingress rule"
        );
        Ok(())
    }
}
