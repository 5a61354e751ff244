//! Default configuration values
//!
//! These constants keep the CLI, config loader and clients in agreement.

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

/// Outbound address discovery service (plain-text body with the caller's IP)
pub const DEFAULT_IP_SERVICE_URL: &str = "https://checkip.amazonaws.com";

/// ECS RPC API version for the security group actions
pub const ECS_API_VERSION: &str = "2014-05-26";

/// Timeout for the address discovery request
pub const DEFAULT_RESOLVE_TIMEOUT_SECS: u64 = 10;

/// Timeout for each ECS API request
pub const DEFAULT_ECS_TIMEOUT_SECS: u64 = 30;

/// Regional ECS endpoint for `region_id`
pub fn ecs_endpoint(region_id: &str) -> String {
    format!("https://ecs.{}.aliyuncs.com", region_id)
}
