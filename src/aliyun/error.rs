//! ECS error classification and handling
//!
//! Provides typed errors for ECS API calls, classified by the `Code` field of
//! the error body instead of string matching on messages.

use thiserror::Error;

/// Failure of a single ECS API call
#[derive(Debug, Error)]
pub enum EcsError {
    /// The request never produced a response
    #[error("{action} request failed: {source}")]
    Transport {
        action: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider rejected the request
    #[error("{action} rejected with {code} (HTTP {status}): {message}")]
    Api {
        action: &'static str,
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },

    /// The response body could not be decoded
    #[error("Failed to decode {action} response: {reason}")]
    Decode { action: &'static str, reason: String },

    /// The request could not be built (bad endpoint, client setup)
    #[error("Invalid ECS request: {0}")]
    InvalidRequest(String),
}

/// ECS error categories for logging and operator hints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsErrorKind {
    /// Group or rule does not exist
    NotFound,
    /// Rule already present with the same fields
    AlreadyExists,
    /// Rate limit exceeded
    Throttled,
    /// Credential or signature problem
    Auth,
    /// Network failure before any response
    Transport,
    Other,
}

/// Known ECS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "InvalidSecurityGroupId.NotFound",
    "InvalidSecurityGroupId.Malformed",
    "InvalidRegionId.NotFound",
    "InvalidSecurityGroupRule.RuleNotExist",
];

/// Known ECS error codes for "already exists" conditions
const ALREADY_EXISTS_CODES: &[&str] = &[
    "InvalidPermission.Duplicate",
    "InvalidSecurityGroupRule.Duplicate",
];

/// Known ECS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "Throttling.User",
    "Throttling.Api",
    "ServiceUnavailable",
];

/// Known ECS error codes for credential and signing failures
const AUTH_CODES: &[&str] = &[
    "InvalidAccessKeyId.NotFound",
    "InvalidAccessKeyId.Inactive",
    "SignatureDoesNotMatch",
    "IncompleteSignature",
    "Forbidden.RAM",
    "Forbidden.AccessKeyDisabled",
    "InvalidTimeStamp.Expired",
];

/// Classify an ECS error code.
pub fn classify_ecs_code(code: &str) -> EcsErrorKind {
    if NOT_FOUND_CODES.contains(&code) {
        EcsErrorKind::NotFound
    } else if ALREADY_EXISTS_CODES.contains(&code) {
        EcsErrorKind::AlreadyExists
    } else if THROTTLING_CODES.contains(&code) {
        EcsErrorKind::Throttled
    } else if AUTH_CODES.contains(&code) || code.starts_with("Forbidden") {
        EcsErrorKind::Auth
    } else {
        EcsErrorKind::Other
    }
}

impl EcsError {
    pub fn kind(&self) -> EcsErrorKind {
        match self {
            EcsError::Api { code, .. } => classify_ecs_code(code),
            EcsError::Transport { .. } => EcsErrorKind::Transport,
            _ => EcsErrorKind::Other,
        }
    }

    /// Provider error code, when the provider answered
    pub fn code(&self) -> Option<&str> {
        match self {
            EcsError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self.kind() {
            EcsErrorKind::Transport => {
                Some("Check network access to the ECS endpoint; the next cycle will retry.")
            }
            _ => self.code().and_then(suggestion_for_code),
        }
    }
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "InvalidSecurityGroupId.NotFound",
        "Check securityGroupId and regionId in the config file.",
    ),
    (
        "InvalidRegionId.NotFound",
        "Check regionId in the config file.",
    ),
    (
        "InvalidAccessKeyId.NotFound",
        "The access key does not exist. Check access.key in the config file.",
    ),
    (
        "InvalidAccessKeyId.Inactive",
        "The access key is disabled. Enable it or configure another key.",
    ),
    (
        "SignatureDoesNotMatch",
        "The access secret does not match the key. Check access.secret.",
    ),
    (
        "Forbidden.RAM",
        "The RAM user lacks ecs:DescribeSecurityGroupAttribute, ecs:RevokeSecurityGroup or ecs:AuthorizeSecurityGroup.",
    ),
    (
        "InvalidTimeStamp.Expired",
        "The local clock is skewed. Sync the system time.",
    ),
    (
        "InvalidPermission.Duplicate",
        "A rule with the new source already exists. Remove the duplicate by hand.",
    ),
    (
        "Throttling.User",
        "ECS API rate limit hit. The next cycle will retry; consider a longer sleepTime.",
    ),
    (
        "Throttling",
        "ECS API rate limit hit. The next cycle will retry; consider a longer sleepTime.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<&'static str> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| *s)
}
