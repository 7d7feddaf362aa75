use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::address::Address;
use crate::token::TokenDescriptor;

pub const MAINNET: u64 = 1;
pub const ROPSTEN: u64 = 3;
pub const RINKEBY: u64 = 4;
pub const GOERLI: u64 = 5;
pub const KOVAN: u64 = 42;
pub const OPTIMISM: u64 = 10;
pub const OPTIMISTIC_KOVAN: u64 = 69;
pub const ARBITRUM_ONE: u64 = 42161;
pub const ARBITRUM_RINKEBY: u64 = 421611;

/// Connected network; absent while disconnected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainContext {
    pub chain_id: Option<u64>,
}

impl ChainContext {
    pub fn connected(chain_id: u64) -> Self {
        Self {
            chain_id: Some(chain_id),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }
}

const WRAPPED_NATIVE: &[(u64, &str)] = &[
    (MAINNET, "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
    (ROPSTEN, "0xc778417e063141139fce010982780140aa0cd5ab"),
    (RINKEBY, "0xc778417e063141139fce010982780140aa0cd5ab"),
    (GOERLI, "0xb4fbf271143f4fbf7b91a5ded31805e42b2208d6"),
    (KOVAN, "0xd0a1e359811322d97991e03f863a0c30c2cf029c"),
    (OPTIMISM, "0x4200000000000000000000000000000000000006"),
    (OPTIMISTIC_KOVAN, "0x4200000000000000000000000000000000000006"),
    (ARBITRUM_ONE, "0x82af49447d8a07e3bd95bd0d56f35241523fbab1"),
    (ARBITRUM_RINKEBY, "0xb47e6a5f8b33b3f17603c83a0535a9dcd7e32681"),
];

static WRAPPED_NATIVE_TOKENS: Lazy<HashMap<u64, TokenDescriptor>> = Lazy::new(|| {
    WRAPPED_NATIVE
        .iter()
        .filter_map(|(chain_id, address)| match Address::parse(address) {
            Ok(address) => Some((
                *chain_id,
                TokenDescriptor::new(*chain_id, address, 18, "WETH", "Wrapped Ether"),
            )),
            Err(e) => {
                tracing::error!(chain_id, error = %e, "bad wrapped native address");
                None
            }
        })
        .collect()
});

/// The WETH9 token of a chain, if the chain has one.
pub fn wrapped_native(chain_id: u64) -> Option<&'static TokenDescriptor> {
    WRAPPED_NATIVE_TOKENS.get(&chain_id)
}
