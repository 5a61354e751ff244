//! ECS wire types for the security group actions

use crate::rule::{Rule, UnknownValue};
use serde::{Deserialize, Deserializer};

/// Error body returned with any non-2xx status
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Body of a successful RevokeSecurityGroup or AuthorizeSecurityGroup call
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MutationResponse {
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSecurityGroupAttributeResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub permissions: Permissions,
}

#[derive(Debug, Default, Deserialize)]
pub struct Permissions {
    #[serde(rename = "Permission", default)]
    pub permission: Vec<Permission>,
}

/// One permission entry as the provider reports it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Permission {
    #[serde(default)]
    pub policy: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "de_priority")]
    pub priority: u32,
    #[serde(default)]
    pub nic_type: String,
    #[serde(default)]
    pub port_range: String,
    #[serde(default)]
    pub source_cidr_ip: String,
    #[serde(default)]
    pub ip_protocol: String,
    #[serde(default)]
    pub direction: String,
}

/// Priority arrives as `"1"` from some API versions and `1` from others
fn de_priority<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Priority {
        Number(u32),
        Text(String),
    }

    match Priority::deserialize(deserializer)? {
        Priority::Number(n) => Ok(n),
        Priority::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl Permission {
    /// Convert to a [`Rule`].
    ///
    /// Returns `Ok(None)` for entries without an IPv4 CIDR source (rules that
    /// reference another group or only an IPv6 range).
    pub fn into_rule(self) -> Result<Option<Rule>, UnknownValue> {
        if self.source_cidr_ip.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Rule {
            policy: self.policy.parse()?,
            description: self.description,
            priority: self.priority,
            nic_type: self.nic_type.parse()?,
            port_range: self.port_range,
            source_address: self.source_cidr_ip,
            protocol: self.ip_protocol,
        }))
    }
}
