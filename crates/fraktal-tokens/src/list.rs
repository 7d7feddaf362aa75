use std::collections::hash_map::Entry;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::address::Address;
use crate::error::{AddressError, ListError};
use crate::token::{FraktalMeta, TokenDescriptor};

/// A token-list document (Uniswap token-list schema, plus the Fraktal fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenList {
    pub name: String,

    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,

    #[serde(rename = "logoURI")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub tokens: Vec<ListEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// Raw entry of a token list. Optional fields degrade to empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    #[serde(rename = "chainId")]
    pub chain_id: u64,

    pub address: String,

    #[serde(default)]
    pub symbol: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub decimals: Option<u8>,

    #[serde(rename = "logoURI")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,

    #[serde(default)]
    pub artist: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub image: String,
}

impl ListEntry {
    /// Standard token described by this entry.
    pub fn to_token(&self) -> Result<TokenDescriptor, AddressError> {
        let address = Address::parse(&self.address)?;
        Ok(TokenDescriptor::new(
            self.chain_id,
            address,
            self.decimals.unwrap_or(0),
            self.symbol.clone(),
            self.name.clone(),
        ))
    }

    /// Fraktal token described by this entry. Fraktal shares have no decimals.
    pub fn to_fraktal_token(&self) -> Result<TokenDescriptor, AddressError> {
        let mut token = self.to_token()?;
        token.decimals = 0;
        Ok(token.with_fraktal(FraktalMeta {
            artist: self.artist.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
        }))
    }
}

impl TokenList {
    pub fn from_json(json: &str) -> Result<Self, ListError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether `self` is an older snapshot than `other`.
    ///
    /// Versions are compared first; timestamps only when either side has no version.
    pub fn is_older_than(&self, other: &TokenList) -> bool {
        match (self.version, other.version) {
            (Some(a), Some(b)) => a < b,
            _ => match (self.timestamp, other.timestamp) {
                (Some(a), Some(b)) => a < b,
                _ => false,
            },
        }
    }

    /// First token of the list on the given chain.
    pub fn first_token(&self, chain_id: u64) -> Option<&ListEntry> {
        self.tokens.iter().find(|t| t.chain_id == chain_id)
    }
}

/// Name and logo of the list a token came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSummary {
    pub name: String,
    pub logo_uri: Option<String>,
}

/// A token together with the list it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListToken {
    pub token: TokenDescriptor,
    pub list: ListSummary,
}

/// chain id → address → list token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenAddressMap {
    chains: HashMap<u64, HashMap<Address, ListToken>>,
}

impl TokenAddressMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map of a standard token list.
    pub fn from_list(list: &TokenList) -> Self {
        Self::build(list, ListEntry::to_token)
    }

    /// Build the map of a Fraktal token list.
    pub fn from_fraktal_list(list: &TokenList) -> Self {
        Self::build(list, ListEntry::to_fraktal_token)
    }

    fn build(
        list: &TokenList,
        convert: fn(&ListEntry) -> Result<TokenDescriptor, AddressError>,
    ) -> Self {
        let summary = ListSummary {
            name: list.name.clone(),
            logo_uri: list.logo_uri.clone(),
        };
        let mut map = Self::new();
        for entry in &list.tokens {
            let token = match convert(entry) {
                Ok(token) => token,
                Err(e) => {
                    tracing::warn!(list = %list.name, address = %entry.address, error = %e, "skipping list entry");
                    continue;
                }
            };
            let chain = map.chains.entry(token.chain_id).or_default();
            match chain.entry(token.address) {
                Entry::Occupied(_) => {
                    tracing::warn!(list = %list.name, address = %token.address, "duplicate list entry");
                }
                Entry::Vacant(slot) => {
                    slot.insert(ListToken {
                        token,
                        list: summary.clone(),
                    });
                }
            }
        }
        map
    }

    /// Combine maps in priority order; earlier maps win on collisions.
    pub fn combine<'a>(maps: impl IntoIterator<Item = &'a TokenAddressMap>) -> Self {
        let mut combined = Self::new();
        for map in maps {
            for (chain_id, tokens) in &map.chains {
                let chain = combined.chains.entry(*chain_id).or_default();
                for (address, token) in tokens {
                    chain.entry(*address).or_insert_with(|| token.clone());
                }
            }
        }
        combined
    }

    pub fn chain(&self, chain_id: u64) -> Option<&HashMap<Address, ListToken>> {
        self.chains.get(&chain_id)
    }

    pub fn get(&self, chain_id: u64, address: &Address) -> Option<&ListToken> {
        self.chains.get(&chain_id).and_then(|c| c.get(address))
    }

    pub fn is_empty(&self) -> bool {
        self.chains.values().all(HashMap::is_empty)
    }
}

const BUNDLED_FRAKTAL_LIST: &str = include_str!("../data/fraktal.tokenlist.json");

static FRAKTAL_LIST: Lazy<TokenList> = Lazy::new(|| {
    TokenList::from_json(BUNDLED_FRAKTAL_LIST).unwrap_or_else(|e| {
        tracing::error!(error = %e, "bundled Fraktal list is malformed");
        TokenList {
            name: "Fraktal".to_string(),
            timestamp: None,
            version: None,
            logo_uri: None,
            keywords: Vec::new(),
            tokens: Vec::new(),
        }
    })
});

/// The Fraktal list shipped with the crate, parsed once.
pub fn bundled_fraktal_list() -> &'static TokenList {
    &FRAKTAL_LIST
}
