//! Configuration loading from YAML
//!
//! Keys are camelCase (`regionId`, `securityGroupId`, `sleepTime`). The
//! all-lowercase spellings written by case-folding loaders are accepted as
//! aliases.

use crate::defaults::{DEFAULT_IP_SERVICE_URL, ecs_endpoint};
use crate::error::ConfigError;
use crate::rule::NicType;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// API credentials. `Debug` never prints the secret.
#[derive(Clone, Deserialize)]
pub struct Access {
    pub key: String,
    pub secret: String,
}

impl Access {
    /// Access key with everything past the first four characters hidden
    pub fn masked_key(&self) -> String {
        let visible: String = self.key.chars().take(4).collect();
        format!("{}****", visible)
    }
}

impl fmt::Debug for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Access")
            .field("key", &self.masked_key())
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Agent configuration, immutable for the life of the process
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub access: Access,

    /// Region hosting the security group (e.g. "cn-hangzhou")
    #[serde(alias = "regionid")]
    pub region_id: String,

    /// Security group whose rules are reconciled
    #[serde(alias = "securitygroupid")]
    pub security_group_id: String,

    /// Correlation tag selecting the managed rules
    pub description: String,

    /// Minutes between cycles; absent means run once
    #[serde(default, alias = "sleeptime")]
    pub sleep_time: Option<u64>,

    /// ECS endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Address discovery URL override
    #[serde(default, alias = "ipservice")]
    pub ip_service: Option<String>,

    /// NIC type whose rules are listed
    #[serde(default, alias = "nictype", deserialize_with = "de_nic_type")]
    pub nic_type: Option<NicType>,
}

fn de_nic_type<'de, D>(deserializer: D) -> Result<Option<NicType>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| s.parse().map_err(serde::de::Error::custom))
        .transpose()
}

impl Config {
    /// Load and validate configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::io(path.display().to_string(), e))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::parse(path.display().to_string(), e))?;

        config.validate()?;
        Ok(config)
    }

    /// Check field values that deserialization alone cannot enforce
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("access.key", &self.access.key),
            ("access.secret", &self.access.secret),
            ("regionId", &self.region_id),
            ("securityGroupId", &self.security_group_id),
            ("description", &self.description),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField(field));
            }
        }

        if self.sleep_time == Some(0) {
            return Err(ConfigError::InvalidSleepTime);
        }

        check_url("endpoint", self.endpoint.as_deref())?;
        check_url("ipService", self.ip_service.as_deref())?;

        Ok(())
    }

    /// Interval between cycles, or `None` for a single run
    pub fn sleep_interval(&self) -> Option<Duration> {
        self.sleep_time.map(|minutes| Duration::from_secs(minutes * 60))
    }

    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| ecs_endpoint(&self.region_id))
    }

    pub fn ip_service(&self) -> &str {
        self.ip_service.as_deref().unwrap_or(DEFAULT_IP_SERVICE_URL)
    }
}

fn check_url(field: &'static str, value: Option<&str>) -> Result<(), ConfigError> {
    let Some(value) = value else {
        return Ok(());
    };
    match reqwest::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}
