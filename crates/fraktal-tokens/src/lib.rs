pub mod address;
pub mod call;
pub mod chain;
pub mod config;
pub mod currency;
pub mod decoder;
pub mod error;
pub mod filter;
pub mod list;
pub mod memo;
pub mod merge;
pub mod resolver;
#[cfg(feature = "rpc")]
pub mod rpc;
pub mod store;
pub mod token;
pub mod user;

// Re-exports for convenience
pub use address::Address;
pub use call::{CachePolicy, CallGateway, CallState, CallWorker, ContractReader, TokenCalls};
pub use chain::ChainContext;
pub use config::ResolverConfig;
pub use currency::{resolve_currency, Currency, NativeCurrency};
pub use error::Error;
pub use list::{bundled_fraktal_list, ListEntry, TokenAddressMap, TokenList};
pub use merge::{merge_fraktal_list, merge_list};
pub use resolver::{resolve_token, Query, Resolution, Sources, TokenResolver};
pub use store::ListStore;
pub use token::{FraktalMeta, TokenDescriptor, TokenMap};
pub use user::UserTokenStore;

/// Create a resolver together with the worker that fetches its contract calls.
///
/// The worker must be driven (`CallWorker::run`) on a tokio runtime for
/// on-chain metadata to settle.
pub fn resolver(config: ResolverConfig) -> (TokenResolver, CallWorker) {
    let (gateway, worker) = CallGateway::new();
    (TokenResolver::new(config, gateway), worker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::tests::MockReader;
    use crate::call::CallKey;
    use crate::decoder::tests::{encode_string, encode_uint};
    use crate::decoder::TokenMethod;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    const DEFAULT_LIST_URL: &str = "https://tokens.example/default.json";
    const INACTIVE_LIST_URL: &str = "https://tokens.example/extended.json";

    fn default_list() -> TokenList {
        TokenList::from_json(
            r#"{
                "name": "Default",
                "timestamp": "2021-08-01T00:00:00Z",
                "version": { "major": 1, "minor": 0, "patch": 0 },
                "tokens": [
                    { "chainId": 4, "address": "0xc7ad46e0b8a400bb3c915120d284aafba8fc4735", "symbol": "DAI", "name": "Dai Stablecoin", "decimals": 18 },
                    { "chainId": 4, "address": "0xebba858df055018f28793cec9295e39abf2fd9d2", "symbol": "SHADOW", "name": "Shadowed by Fraktal", "decimals": 18 }
                ]
            }"#,
        )
        .unwrap()
    }

    fn extended_list() -> TokenList {
        TokenList::from_json(
            r#"{
                "name": "Extended",
                "tokens": [
                    { "chainId": 4, "address": "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984", "symbol": "UNI", "name": "Uniswap", "decimals": 18 },
                    { "chainId": 4, "address": "0xc7ad46e0b8a400bb3c915120d284aafba8fc4735", "symbol": "DAI", "name": "Dai Stablecoin", "decimals": 18 }
                ]
            }"#,
        )
        .unwrap()
    }

    fn lists() -> ListStore {
        let mut lists = ListStore::with_bundled_fraktal();
        lists.upsert_list(DEFAULT_LIST_URL, default_list());
        lists.upsert_list(INACTIVE_LIST_URL, extended_list());
        lists.activate(DEFAULT_LIST_URL).unwrap();
        lists
    }

    #[tokio::test]
    async fn test_full_resolution_pipeline() {
        init_tracing();
        let (mut resolver, mut worker) = resolver(ResolverConfig::default());
        let lists = lists();
        let users = UserTokenStore::new();
        let sources = Sources {
            lists: &lists,
            user_tokens: &users,
            chain: ChainContext::connected(chain::RINKEBY),
        };

        // Fraktal listing shadows the standard one.
        let frak = resolver
            .currency(&sources, Query::Id("0xEbba858Df055018f28793Cec9295e39AbF2fD9D2"))
            .into_resolved()
            .unwrap();
        assert_eq!(frak.symbol(), "FRAK");
        assert_eq!(frak.decimals(), 0);
        assert_eq!(
            frak.as_token().and_then(|t| t.fraktal.as_ref()).map(|m| m.artist.as_str()),
            Some("Fraktal")
        );

        // Unknown token goes on-chain.
        let unknown = "0x01be23585060835e02b77ef475b0cc51aa1e0709";
        let address = Address::parse(unknown).unwrap();
        let reader = MockReader::default();
        reader.respond(CallKey::method(chain::RINKEBY, address, TokenMethod::Name), Ok(encode_string("ChainLink Token")));
        reader.respond(CallKey::method(chain::RINKEBY, address, TokenMethod::Symbol), Ok(encode_string("LINK")));
        reader.respond(CallKey::method(chain::RINKEBY, address, TokenMethod::Decimals), Ok(encode_uint(18)));

        assert_eq!(resolver.currency(&sources, Query::Id(unknown)), Resolution::Pending);
        let mut revisions = resolver.gateway().subscribe();
        worker.run_until_idle(&reader).await;
        assert!(revisions.has_changed().unwrap());

        let link = resolver.currency(&sources, Query::Id(unknown)).into_resolved().unwrap();
        assert_eq!(link.symbol(), "LINK");
        assert_eq!(link.name(), "ChainLink Token");
    }

    #[tokio::test]
    async fn test_search_inactive_lists_excludes_active_tokens() {
        let (mut resolver, _worker) = resolver(ResolverConfig::default());
        let lists = lists();
        let users = UserTokenStore::new();
        let sources = Sources {
            lists: &lists,
            user_tokens: &users,
            chain: ChainContext::connected(chain::RINKEBY),
        };

        let found = resolver.search_inactive_lists(&sources, "uni", 10);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].token.symbol, "UNI");
        assert_eq!(found[0].list.name, "Extended");

        assert!(resolver.search_inactive_lists(&sources, "dai", 10).is_empty());
    }

    #[tokio::test]
    async fn test_disconnected_state() {
        let (mut resolver, _worker) = resolver(ResolverConfig::default());
        let lists = lists();
        let users = UserTokenStore::new();
        let sources = Sources {
            lists: &lists,
            user_tokens: &users,
            chain: ChainContext::disconnected(),
        };

        let eth = resolver.currency(&sources, Query::Id("ETH")).into_resolved().unwrap();
        assert_eq!(eth, Currency::Native(NativeCurrency::on_chain(chain::MAINNET)));

        assert_eq!(
            resolver.token(&sources, Query::Id("0xebba858df055018f28793cec9295e39abf2fd9d2")),
            Resolution::Unresolvable
        );
        assert_eq!(resolver.token(&sources, Query::Empty), Resolution::Empty);
        assert_eq!(resolver.token(&sources, Query::from_option(None)), Resolution::Unresolvable);
        assert!(resolver.all_tokens(&sources).is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_tokens_ignore_user_imports() {
        let (mut resolver, _worker) = resolver(ResolverConfig::default());
        let mut lists = lists();
        lists.set_unsupported_list(
            TokenList::from_json(
                r#"{
                    "name": "Unsupported",
                    "tokens": [
                        { "chainId": 4, "address": "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984", "symbol": "UNI", "name": "Uniswap", "decimals": 18 }
                    ]
                }"#,
            )
            .unwrap(),
        );
        let mut users = UserTokenStore::new();
        users.add(TokenDescriptor::new(
            4,
            Address::parse("0x01be23585060835e02b77ef475b0cc51aa1e0709").unwrap(),
            18,
            "LINK",
            "ChainLink Token",
        ));
        let sources = Sources {
            lists: &lists,
            user_tokens: &users,
            chain: ChainContext::connected(chain::RINKEBY),
        };

        let unsupported = resolver.unsupported_tokens(&sources);
        assert_eq!(unsupported.len(), 1);
        assert_eq!(unsupported.iter().next().unwrap().symbol, "UNI");
    }
}
