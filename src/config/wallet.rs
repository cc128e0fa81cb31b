//! Wallet policy configuration

use serde::Deserialize;

use crate::domain::wallet::WalletPolicy;

use super::error::ValidationError;

/// Wallet policy configuration
///
/// The per-resource ceiling is an anti-abuse measure, deliberately a config
/// value rather than a domain invariant.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Soft upper bound per resource balance
    #[serde(default = "default_max_units")]
    pub max_units_per_resource: i64,

    /// Internal retries for race-lost wallet operations
    #[serde(default = "default_retry_limit")]
    pub conflict_retry_limit: u32,
}

impl WalletConfig {
    /// Convert to the domain policy value
    pub fn to_policy(&self) -> WalletPolicy {
        WalletPolicy {
            max_units_per_resource: self.max_units_per_resource,
            conflict_retry_limit: self.conflict_retry_limit,
        }
    }

    /// Validate wallet configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_units_per_resource <= 0 {
            return Err(ValidationError::InvalidResourceCeiling);
        }
        Ok(())
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            max_units_per_resource: default_max_units(),
            conflict_retry_limit: default_retry_limit(),
        }
    }
}

fn default_max_units() -> i64 {
    1000
}

fn default_retry_limit() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_product_policy() {
        let config = WalletConfig::default();
        assert_eq!(config.max_units_per_resource, 1000);
        assert_eq!(config.conflict_retry_limit, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn to_policy_carries_values() {
        let config = WalletConfig {
            max_units_per_resource: 50,
            conflict_retry_limit: 5,
        };
        let policy = config.to_policy();
        assert_eq!(policy.max_units_per_resource, 50);
        assert_eq!(policy.conflict_retry_limit, 5);
    }

    #[test]
    fn validation_rejects_non_positive_ceiling() {
        let config = WalletConfig {
            max_units_per_resource: 0,
            conflict_retry_limit: 3,
        };
        assert!(config.validate().is_err());
    }
}
