use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::ListError;
use crate::memo::next_revision;
use crate::token::TokenDescriptor;

/// Tokens the user imported by hand, in insertion order.
///
/// Every mutation draws a new process-unique `revision`, which memoized views
/// use as the identity of the snapshot they were computed from.
#[derive(Debug, Clone)]
pub struct UserTokenStore {
    tokens: Vec<TokenDescriptor>,
    revision: u64,
}

#[derive(Serialize, Deserialize)]
struct Persisted {
    tokens: Vec<TokenDescriptor>,
}

impl Default for UserTokenStore {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            revision: next_revision(),
        }
    }
}

impl UserTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Add a token, replacing an earlier import of the same token.
    pub fn add(&mut self, token: TokenDescriptor) {
        match self.tokens.iter_mut().find(|t| t.same_token(&token)) {
            Some(existing) => *existing = token,
            None => self.tokens.push(token),
        }
        self.revision = next_revision();
    }

    /// Remove a token by chain and address. Returns whether anything was removed.
    pub fn remove(&mut self, chain_id: u64, address: &Address) -> bool {
        let before = self.tokens.len();
        self.tokens
            .retain(|t| !(t.chain_id == chain_id && t.address == *address));
        let removed = self.tokens.len() != before;
        if removed {
            self.revision = next_revision();
        }
        removed
    }

    pub fn contains(&self, token: &TokenDescriptor) -> bool {
        self.tokens.iter().any(|t| t.same_token(token))
    }

    pub fn tokens(&self) -> &[TokenDescriptor] {
        &self.tokens
    }

    pub fn for_chain(&self, chain_id: u64) -> impl Iterator<Item = &TokenDescriptor> {
        self.tokens.iter().filter(move |t| t.chain_id == chain_id)
    }

    pub fn to_json(&self) -> Result<String, ListError> {
        Ok(serde_json::to_string(&Persisted {
            tokens: self.tokens.clone(),
        })?)
    }

    pub fn from_json(json: &str) -> Result<Self, ListError> {
        let persisted: Persisted = serde_json::from_str(json)?;
        Ok(Self {
            tokens: persisted.tokens,
            revision: next_revision(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::FraktalMeta;

    fn dai() -> TokenDescriptor {
        TokenDescriptor::new(
            1,
            Address::parse("0x6b175474e89094c44da98b954eedeac495271d0f").unwrap(),
            18,
            "DAI",
            "Dai Stablecoin",
        )
    }

    #[test]
    fn test_add_replaces_same_token() {
        let mut store = UserTokenStore::new();
        store.add(dai());
        let first = store.revision();
        let mut renamed = dai();
        renamed.symbol = "DAI2".to_string();
        store.add(renamed);
        assert_eq!(store.tokens().len(), 1);
        assert_eq!(store.tokens()[0].symbol, "DAI2");
        assert_ne!(store.revision(), first);
    }

    #[test]
    fn test_remove_bumps_revision_only_on_change() {
        let mut store = UserTokenStore::new();
        store.add(dai());
        let added = store.revision();
        assert!(!store.remove(4, &dai().address));
        assert_eq!(store.revision(), added);
        assert!(store.remove(1, &dai().address));
        assert_ne!(store.revision(), added);
        assert!(!store.contains(&dai()));
    }

    #[test]
    fn test_for_chain_filters() {
        let mut store = UserTokenStore::new();
        store.add(dai());
        let mut rinkeby = dai();
        rinkeby.chain_id = 4;
        store.add(rinkeby);
        assert_eq!(store.for_chain(4).count(), 1);
        assert_eq!(store.tokens().len(), 2);
    }

    #[test]
    fn test_json_persistence() {
        let mut store = UserTokenStore::new();
        store.add(dai().with_fraktal(FraktalMeta {
            artist: "anon".to_string(),
            ..FraktalMeta::default()
        }));
        let json = store.to_json().unwrap();
        let restored = UserTokenStore::from_json(&json).unwrap();
        assert_eq!(restored.tokens(), store.tokens());
        assert_ne!(restored.revision(), UserTokenStore::new().revision());
    }
}
