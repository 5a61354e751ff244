//! ipsync - keep a security group rule pointed at this host's public IP
//!
//! Each cycle resolves the host's outbound IPv4 address, lists the ingress
//! rules of one Alibaba Cloud security group, selects the rules whose
//! description equals the configured tag and replaces the source of every
//! stale one (revoke, then authorize).
//!
//! ## Modules
//!
//! - [`aliyun`]: signed ECS API client
//! - [`config`]: YAML configuration
//! - [`filter`]: correlation tag selection
//! - [`reconcile`]: the reconciliation cycle
//! - [`repository`]: rule repository trait over the ECS client
//! - [`resolver`]: outbound address discovery
//! - [`rule`]: rule and address types
//! - [`scheduler`]: fixed-interval cycle loop

pub mod aliyun;
pub mod config;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod reconcile;
pub mod repository;
pub mod resolver;
pub mod rule;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::ConfigError;
pub use reconcile::{CycleError, CycleReport, Reconciler, Target};
pub use rule::{Address, NicType, Policy, Rule};

/// Shorten `s` to at most `max` characters for log and error output
pub(crate) fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
