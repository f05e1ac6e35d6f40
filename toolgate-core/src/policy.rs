//! Provider allow-list
//!
//! Deny-by-default exposure control. An operation is visible only when its
//! provider namespace starts with the configured prefix, unless the policy was
//! built with `include_all`. Discovery and invocation both consult the same
//! policy so a hidden operation cannot be called by guessing its name.

use crate::config::AccessConfig;
use crate::operation::OperationDefinition;
use serde::{Deserialize, Serialize};

/// Default provider prefix
pub const DEFAULT_PROVIDER_PREFIX: &str = "toolgate";

/// Which operations of the registry are exposed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowList {
    include_all: bool,
    provider_prefix: String,
}

impl Default for AllowList {
    fn default() -> Self {
        Self::prefix(DEFAULT_PROVIDER_PREFIX)
    }
}

impl AllowList {
    /// Expose operations whose provider starts with `prefix`
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            include_all: false,
            provider_prefix: prefix.into(),
        }
    }

    /// Expose every registered operation
    pub fn allow_all() -> Self {
        Self {
            include_all: true,
            provider_prefix: String::new(),
        }
    }

    /// Build from the access section of the configuration
    pub fn from_config(config: &AccessConfig) -> Self {
        Self {
            include_all: config.include_all_tools,
            provider_prefix: config.allowed_provider_prefix.clone(),
        }
    }

    /// Check a definition against the policy
    pub fn permits(&self, definition: &OperationDefinition) -> bool {
        self.permits_provider(&definition.provider)
    }

    /// Check a provider namespace against the policy
    pub fn permits_provider(&self, provider: &str) -> bool {
        self.include_all || provider.starts_with(&self.provider_prefix)
    }

    pub fn includes_all(&self) -> bool {
        self.include_all
    }

    pub fn provider_prefix(&self) -> &str {
        &self.provider_prefix
    }
}
