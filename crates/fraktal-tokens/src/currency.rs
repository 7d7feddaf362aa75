use serde::{Deserialize, Serialize};

use crate::chain::wrapped_native;
use crate::config::ResolverConfig;
use crate::resolver::{Query, Resolution};
use crate::token::TokenDescriptor;

/// Native currency of a chain (ether on every chain the frontend supports).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
}

impl NativeCurrency {
    pub fn on_chain(chain_id: u64) -> Self {
        Self {
            chain_id,
            decimals: 18,
            symbol: "ETH".to_string(),
            name: "Ether".to_string(),
        }
    }

    /// The wrapped form of this currency, if the chain has one.
    pub fn wrapped(&self) -> Option<&'static TokenDescriptor> {
        wrapped_native(self.chain_id)
    }
}

/// Anything that can be selected in a swap panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Currency {
    Native(NativeCurrency),
    Token(TokenDescriptor),
}

impl Currency {
    pub fn chain_id(&self) -> u64 {
        match self {
            Currency::Native(n) => n.chain_id,
            Currency::Token(t) => t.chain_id,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Currency::Native(n) => &n.symbol,
            Currency::Token(t) => &t.symbol,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Currency::Native(n) => &n.name,
            Currency::Token(t) => &t.name,
        }
    }

    pub fn decimals(&self) -> u8 {
        match self {
            Currency::Native(n) => n.decimals,
            Currency::Token(t) => t.decimals,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Currency::Native(_))
    }

    pub fn as_token(&self) -> Option<&TokenDescriptor> {
        match self {
            Currency::Token(t) => Some(t),
            Currency::Native(_) => None,
        }
    }
}

const NATIVE_SYMBOL: &str = "ETH";

/// Resolve a currency id: the native symbol, the wrapped-native address, or
/// any token address handed to `resolve_token`.
///
/// `Absent` and `Empty` pass through as `Unresolvable` and `Empty`. The
/// wrapped-native address is answered from the chain table without calling
/// `resolve_token`.
pub fn resolve_currency(
    query: Query<'_>,
    chain_id: Option<u64>,
    config: &ResolverConfig,
    resolve_token: impl FnOnce(Query<'_>) -> Resolution<TokenDescriptor>,
) -> Resolution<Currency> {
    let id = match query {
        Query::Absent => return Resolution::Unresolvable,
        Query::Empty => return Resolution::Empty,
        Query::Id(id) => id.trim(),
    };

    if id.eq_ignore_ascii_case(NATIVE_SYMBOL) {
        let chain = chain_id.unwrap_or(config.default_chain_id);
        return Resolution::Resolved(Currency::Native(NativeCurrency::on_chain(chain)));
    }

    if let Some(weth) = chain_id.and_then(wrapped_native) {
        if weth.address.matches_str(id) {
            return Resolution::Resolved(Currency::Token(weth.clone()));
        }
    }

    resolve_token(Query::Id(id)).map(Currency::Token)
}
