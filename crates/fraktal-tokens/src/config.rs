use serde::{Deserialize, Serialize};

use crate::call::CachePolicy;
use crate::chain::MAINNET;
use crate::error::Error;

/// Resolver settings. Every field has a default, so a partial JSON document
/// (or `{}`) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Symbol used when neither the string nor the bytes32 call yields one.
    pub unknown_symbol: String,

    /// Name used when neither the string nor the bytes32 call yields one.
    pub unknown_name: String,

    /// Chain whose native currency is shown while disconnected.
    pub default_chain_id: u64,

    /// Reload policy for token metadata calls.
    pub call_policy: CachePolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            unknown_symbol: "UNKNOWN".to_string(),
            unknown_name: "Unknown Token".to_string(),
            default_chain_id: MAINNET,
            call_policy: CachePolicy::NeverReload,
        }
    }
}

impl ResolverConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }
}
