//! One reconciliation cycle
//!
//! Resolve the public IP, list the group's rules, select the tagged ones and
//! point every stale rule at the current IP by revoking it and authorizing a
//! copy with the new source.
//!
//! Per rule the states are `MATCHED -> REVOKED -> AUTHORIZED`. The provider has
//! no atomic update, so a failure between revoke and authorize leaves the rule
//! missing. That case is reported as [`CycleError::PartialReplacement`] and is
//! not repaired automatically: once revoked, the rule no longer shows up in
//! the next cycle's listing.

use crate::aliyun::EcsError;
use crate::config::Config;
use crate::filter::select_by_description;
use crate::repository::RuleRepository;
use crate::resolver::{AddressResolver, ResolveError};
use crate::rule::{Address, Rule};
use thiserror::Error;
use tracing::{debug, error, info};

/// Security group and correlation tag a reconciler manages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub security_group_id: String,
    pub description: String,
}

impl From<&Config> for Target {
    fn from(config: &Config) -> Self {
        Self {
            security_group_id: config.security_group_id.clone(),
            description: config.description.clone(),
        }
    }
}

/// Outcome of a completed cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Public IP the cycle reconciled towards
    pub address: Address,
    /// Tagged rules found
    pub candidates: usize,
    /// Tagged rules that already allowed `address`
    pub unchanged: usize,
    /// Rules revoked and re-authorized with `address`
    pub replaced: usize,
    /// Rules that would have been replaced in dry-run mode
    pub planned: usize,
}

/// First failure of a cycle. Work after the failure is not attempted.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Failed to resolve public IP: {0}")]
    Resolve(#[source] ResolveError),

    #[error("Failed to list rules of security group {group_id}: {source}")]
    List {
        group_id: String,
        #[source]
        source: EcsError,
    },

    /// Revoke was rejected; the rule is untouched
    #[error("Failed to revoke rule '{description}' ({port_range}) from {source_address}: {source}")]
    Revoke {
        description: String,
        port_range: String,
        source_address: String,
        replaced: usize,
        #[source]
        source: EcsError,
    },

    /// Revoke succeeded but authorize failed; the rule is gone
    #[error(
        "Revoked rule '{}' ({}) from {} but failed to authorize {new_source}: {source}",
        .rule.description,
        .rule.port_range,
        .rule.source_address
    )]
    PartialReplacement {
        /// The rule as it was before the revoke
        rule: Box<Rule>,
        new_source: Address,
        replaced: usize,
        #[source]
        source: EcsError,
    },
}

impl CycleError {
    /// Rules fully replaced before the failure
    pub fn replaced(&self) -> usize {
        match self {
            CycleError::Resolve(_) | CycleError::List { .. } => 0,
            CycleError::Revoke { replaced, .. } | CycleError::PartialReplacement { replaced, .. } => {
                *replaced
            }
        }
    }

    /// The provider error behind this failure, if any
    pub fn api_error(&self) -> Option<&EcsError> {
        match self {
            CycleError::Resolve(_) => None,
            CycleError::List { source, .. }
            | CycleError::Revoke { source, .. }
            | CycleError::PartialReplacement { source, .. } => Some(source),
        }
    }
}

/// Runs reconciliation cycles against one security group
pub struct Reconciler<R, A> {
    repository: R,
    resolver: A,
    target: Target,
    dry_run: bool,
}

impl<R: RuleRepository, A: AddressResolver> Reconciler<R, A> {
    pub fn new(repository: R, resolver: A, target: Target) -> Self {
        Self {
            repository,
            resolver,
            target,
            dry_run: false,
        }
    }

    /// Log planned replacements instead of performing them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run one cycle to completion or to its first failure
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        let address = self
            .resolver
            .resolve()
            .await
            .map_err(CycleError::Resolve)?;
        info!(public_ip = %address, "Resolved public IP");

        let group_id = &self.target.security_group_id;
        let rules =
            self.repository
                .list(group_id)
                .await
                .map_err(|source| CycleError::List {
                    group_id: group_id.clone(),
                    source,
                })?;

        let candidates = select_by_description(&rules, &self.target.description);
        info!(
            security_group_id = %group_id,
            description = %self.target.description,
            total = rules.len(),
            candidates = candidates.len(),
            "Rules may need to update"
        );

        let mut report = CycleReport {
            address,
            candidates: candidates.len(),
            unchanged: 0,
            replaced: 0,
            planned: 0,
        };

        for rule in candidates {
            if rule.source_matches(&address) {
                info!(
                    description = %rule.description,
                    port_range = %rule.port_range,
                    source = %rule.source_address,
                    "Rule does not need to change"
                );
                report.unchanged += 1;
                continue;
            }

            if self.dry_run {
                info!(
                    description = %rule.description,
                    port_range = %rule.port_range,
                    old_source = %rule.source_address,
                    new_source = %address,
                    "Dry run: would replace rule source"
                );
                report.planned += 1;
                continue;
            }

            self.replace(rule, &address, report.replaced).await?;
            report.replaced += 1;
        }

        Ok(report)
    }

    /// Revoke `stale`, then authorize it again with `address` as its source
    async fn replace(
        &self,
        stale: &Rule,
        address: &Address,
        replaced: usize,
    ) -> Result<(), CycleError> {
        let group_id = &self.target.security_group_id;

        info!(
            description = %stale.description,
            port_range = %stale.port_range,
            source = %stale.source_address,
            "Revoking stale rule"
        );
        self.repository
            .revoke(group_id, stale)
            .await
            .map_err(|source| CycleError::Revoke {
                description: stale.description.clone(),
                port_range: stale.port_range.clone(),
                source_address: stale.source_address.clone(),
                replaced,
                source,
            })?;

        let fresh = stale.with_source(address);
        debug_assert_eq!(fresh.identity(), stale.identity());
        debug!(rule = %fresh, "Authorizing replacement rule");

        if let Err(source) = self.repository.authorize(group_id, &fresh).await {
            error!(
                security_group_id = %group_id,
                rule = %stale,
                "Rule was revoked but not re-authorized; it must be recreated manually"
            );
            return Err(CycleError::PartialReplacement {
                rule: Box::new(stale.clone()),
                new_source: *address,
                replaced,
                source,
            });
        }

        info!(
            description = %stale.description,
            port_range = %stale.port_range,
            old_source = %stale.source_address,
            new_source = %address,
            "Rule has been changed"
        );
        Ok(())
    }
}
