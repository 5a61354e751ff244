//! Security group rule model
//!
//! A [`Rule`] is one ingress permission entry as the provider reports it. The
//! agent never creates rules from scratch; it only rewrites the source address
//! of rules that already exist.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// The host's externally visible IPv4 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(Ipv4Addr);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Address {
    type Err = std::net::AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A field value the provider returned that this model cannot represent
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {field} value '{value}'")]
pub struct UnknownValue {
    pub field: &'static str,
    pub value: String,
}

/// Whether matching traffic is accepted or dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    Accept,
    Drop,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Accept => "accept",
            Policy::Drop => "drop",
        }
    }
}

impl FromStr for Policy {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "accept" => Ok(Policy::Accept),
            "drop" => Ok(Policy::Drop),
            _ => Err(UnknownValue {
                field: "policy",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network interface type the rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NicType {
    Internet,
    Intranet,
}

impl NicType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NicType::Internet => "internet",
            NicType::Intranet => "intranet",
        }
    }
}

impl FromStr for NicType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "internet" => Ok(NicType::Internet),
            "intranet" => Ok(NicType::Intranet),
            _ => Err(UnknownValue {
                field: "nic_type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for NicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingress permission entry in a security group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub policy: Policy,
    /// Correlation tag used to pick the rules this agent manages
    pub description: String,
    pub priority: u32,
    pub nic_type: NicType,
    /// Port range in provider form, e.g. "22/22"
    pub port_range: String,
    /// Source address or CIDR block
    pub source_address: String,
    pub protocol: String,
}

/// Everything that identifies a rule except its source address.
///
/// Two rules with equal identities and different sources are the same logical
/// rule with a stale source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleIdentity<'a> {
    pub policy: Policy,
    pub description: &'a str,
    pub priority: u32,
    pub nic_type: NicType,
    pub port_range: &'a str,
    pub protocol: &'a str,
}

impl Rule {
    pub fn identity(&self) -> RuleIdentity<'_> {
        RuleIdentity {
            policy: self.policy,
            description: &self.description,
            priority: self.priority,
            nic_type: self.nic_type,
            port_range: &self.port_range,
            protocol: &self.protocol,
        }
    }

    /// Whether the rule's source is exactly `address`.
    ///
    /// Any CIDR form, `/32` included, is a different source.
    pub fn source_matches(&self, address: &Address) -> bool {
        self.source_address.trim() == address.to_string()
    }

    /// Copy of this rule with the source replaced by `address`
    pub fn with_source(&self, address: &Address) -> Rule {
        Rule {
            source_address: address.to_string(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} from {} (priority {}, {}, '{}')",
            self.policy,
            self.protocol,
            self.port_range,
            self.source_address,
            self.priority,
            self.nic_type,
            self.description
        )
    }
}
