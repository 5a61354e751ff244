//! Centralized test fixtures and helpers for ipsync tests.
//!
//! This module provides shared test utilities to avoid duplication across test modules.

/// Rule fixtures
pub mod rule_fixtures {
    use crate::rule::{NicType, Policy, Rule};

    /// Create an SSH rule with the given tag and source
    pub fn rule(description: &str, source: &str) -> Rule {
        Rule {
            policy: Policy::Accept,
            description: description.to_string(),
            priority: 1,
            nic_type: NicType::Intranet,
            port_range: "22/22".to_string(),
            source_address: source.to_string(),
            protocol: "tcp".to_string(),
        }
    }

    /// Create a rule on a specific port range
    pub fn rule_on_port(description: &str, source: &str, port_range: &str) -> Rule {
        Rule {
            port_range: port_range.to_string(),
            ..rule(description, source)
        }
    }
}

/// Configuration fixtures
pub mod config_fixtures {
    use crate::config::{Access, Config};

    /// Create a minimal valid Config in single-shot mode
    pub fn test_config() -> Config {
        Config {
            access: Access {
                key: "LTAI5tTestKey".to_string(),
                secret: "test-secret".to_string(),
            },
            region_id: "cn-hangzhou".to_string(),
            security_group_id: "sg-bp1test".to_string(),
            description: "agent".to_string(),
            sleep_time: None,
            endpoint: None,
            ip_service: None,
            nic_type: None,
        }
    }
}

/// Error fixtures
pub mod error_fixtures {
    use crate::aliyun::EcsError;
    use crate::resolver::ResolveError;

    /// An ECS API rejection with the given code
    pub fn api_error(code: &str) -> EcsError {
        EcsError::Api {
            action: "TestAction",
            status: 400,
            code: code.to_string(),
            message: format!("{code} from test"),
            request_id: Some("TEST-REQUEST-ID".to_string()),
        }
    }

    /// A resolver failure
    pub fn resolve_error() -> ResolveError {
        ResolveError::Malformed {
            url: "http://resolver.test/".to_string(),
            body: "<html>".to_string(),
        }
    }
}

pub use config_fixtures::test_config;
pub use error_fixtures::{api_error, resolve_error};
pub use rule_fixtures::{rule, rule_on_port};
