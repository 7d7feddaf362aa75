use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Display metadata carried only by fractionalized-NFT tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraktalMeta {
    #[serde(default)]
    pub artist: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub image: String,
}

/// Canonical resolved token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    #[serde(rename = "chainId")]
    pub chain_id: u64,

    pub address: Address,

    pub decimals: u8,

    pub symbol: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraktal: Option<FraktalMeta>,
}

impl TokenDescriptor {
    pub fn new(
        chain_id: u64,
        address: Address,
        decimals: u8,
        symbol: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            chain_id,
            address,
            decimals,
            symbol: symbol.into(),
            name: name.into(),
            fraktal: None,
        }
    }

    pub fn with_fraktal(mut self, meta: FraktalMeta) -> Self {
        self.fraktal = Some(meta);
        self
    }

    pub fn is_fraktal(&self) -> bool {
        self.fraktal.is_some()
    }

    /// Token identity: same chain and same address.
    pub fn same_token(&self, other: &TokenDescriptor) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

/// Resolved tokens of one chain, keyed by address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap {
    tokens: HashMap<Address, TokenDescriptor>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a token, replacing any entry at the same address.
    pub fn insert(&mut self, token: TokenDescriptor) {
        self.tokens.insert(token.address, token);
    }

    pub fn get(&self, address: &Address) -> Option<&TokenDescriptor> {
        self.tokens.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.tokens.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenDescriptor> {
        self.tokens.values()
    }
}

impl FromIterator<TokenDescriptor> for TokenMap {
    fn from_iter<I: IntoIterator<Item = TokenDescriptor>>(iter: I) -> Self {
        let mut map = TokenMap::new();
        for token in iter {
            map.insert(token);
        }
        map
    }
}
