//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::application::DeployContext;
use crate::infrastructure::config::deploy::DeployConfig;

/// Deploy settings with zero delays and small caps.
pub fn deploy() -> DeployConfig {
    DeployConfig {
        build_max_polls: 5,
        ..DeployConfig::immediate()
    }
}

/// Deploy settings with zero delays and the given retry budget.
pub fn deploy_with_retries(retry_max_attempts: u32) -> DeployConfig {
    DeployConfig {
        retry_max_attempts,
        ..deploy()
    }
}

/// Context for a platform rooted at `apps.test`.
pub fn context() -> DeployContext {
    DeployContext {
        root_domain: "apps.test".to_string(),
        namespace: "captain".to_string(),
        base_url: "http://captain.test".to_string(),
    }
}
