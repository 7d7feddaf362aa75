use std::collections::HashMap;
use std::sync::Arc;

use crate::address::Address;
use crate::call::{CallGateway, TokenCalls};
use crate::chain::ChainContext;
use crate::config::ResolverConfig;
use crate::currency::{resolve_currency, Currency};
use crate::decoder::{bytes32_hex, decode_string, decode_uint8, parse_string_or_bytes32};
use crate::filter::search_inactive_lists;
use crate::list::ListToken;
use crate::memo::Memo;
use crate::merge::{merge_fraktal_list, merge_list};
use crate::store::ListStore;
use crate::token::{TokenDescriptor, TokenMap};
use crate::user::UserTokenStore;

/// What the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query<'a> {
    /// No token requested.
    Absent,
    /// The caller explicitly cleared the selection.
    Empty,
    /// A currency id or token address.
    Id(&'a str),
}

impl<'a> Query<'a> {
    pub fn from_option(id: Option<&'a str>) -> Self {
        id.map_or(Query::Absent, Query::Id)
    }
}

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Malformed address; nothing was looked up.
    Invalid,
    /// Missing chain, missing address, or every lookup path failed.
    Unresolvable,
    /// A metadata call has not settled yet.
    Pending,
    /// The caller passed the empty sentinel.
    Empty,
    Resolved(T),
}

impl<T> Resolution<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Resolution::Invalid => Resolution::Invalid,
            Resolution::Unresolvable => Resolution::Unresolvable,
            Resolution::Pending => Resolution::Pending,
            Resolution::Empty => Resolution::Empty,
            Resolution::Resolved(v) => Resolution::Resolved(f(v)),
        }
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Resolution::Resolved(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_resolved(self) -> Option<T> {
        match self {
            Resolution::Resolved(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// Pending and Empty, the two states a UI typically renders the same way.
    pub fn is_null_like(&self) -> bool {
        matches!(self, Resolution::Pending | Resolution::Empty)
    }
}

/// Resolve a token from the merged lists and the metadata call states.
///
/// Precedence: Fraktal list, then active list, then on-chain metadata.
/// A Fraktal-listed address never reaches the on-chain path and always has
/// zero decimals.
pub fn resolve_token(
    query: Query<'_>,
    chain_id: Option<u64>,
    active: &TokenMap,
    fraktal: &TokenMap,
    calls: &TokenCalls,
    config: &ResolverConfig,
) -> Resolution<TokenDescriptor> {
    let address = match query {
        Query::Id(id) => match Address::parse(id) {
            Ok(address) => Some(address),
            Err(_) => return Resolution::Invalid,
        },
        Query::Absent | Query::Empty => None,
    };

    if let Some(address) = &address {
        if let Some(entry) = fraktal.get(address) {
            return Resolution::Resolved(TokenDescriptor {
                decimals: 0,
                fraktal: Some(entry.fraktal.clone().unwrap_or_default()),
                ..entry.clone()
            });
        }
        if let Some(token) = active.get(address) {
            return Resolution::Resolved(token.clone());
        }
    }

    if query == Query::Empty {
        return Resolution::Empty;
    }

    let (Some(chain_id), Some(address)) = (chain_id, address) else {
        return Resolution::Unresolvable;
    };

    if calls.decimals.is_loading() || calls.symbol.is_loading() || calls.name.is_loading() {
        return Resolution::Pending;
    }

    let Some(raw_decimals) = calls.decimals.result() else {
        return Resolution::Unresolvable;
    };
    let decimals = match decode_uint8(raw_decimals) {
        Ok(decimals) => decimals,
        Err(e) => {
            tracing::warn!(%address, error = %e, "undecodable decimals");
            return Resolution::Unresolvable;
        }
    };

    let symbol = parse_string_or_bytes32(
        calls.symbol.result().and_then(|d| decode_string(d).ok()).as_deref(),
        calls.symbol_bytes32.result().and_then(bytes32_hex).as_deref(),
        &config.unknown_symbol,
    );
    let name = parse_string_or_bytes32(
        calls.name.result().and_then(|d| decode_string(d).ok()).as_deref(),
        calls.name_bytes32.result().and_then(bytes32_hex).as_deref(),
        &config.unknown_name,
    );

    Resolution::Resolved(TokenDescriptor::new(chain_id, address, decimals, symbol, name))
}

/// Read-only view of the collaborators a resolution depends on.
#[derive(Debug, Clone, Copy)]
pub struct Sources<'a> {
    pub lists: &'a ListStore,
    pub user_tokens: &'a UserTokenStore,
    pub chain: ChainContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MergeKey {
    list_revision: u64,
    user_revision: u64,
    chain_id: Option<u64>,
}

impl MergeKey {
    fn of(sources: &Sources<'_>) -> Self {
        Self {
            list_revision: sources.lists.revision(),
            user_revision: sources.user_tokens.revision(),
            chain_id: sources.chain.chain_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TokenInputs {
    merge: MergeKey,
    calls: TokenCalls,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum QueryKey {
    Absent,
    Empty,
    Id(String),
}

impl From<Query<'_>> for QueryKey {
    fn from(query: Query<'_>) -> Self {
        match query {
            Query::Absent => QueryKey::Absent,
            Query::Empty => QueryKey::Empty,
            Query::Id(id) => QueryKey::Id(id.to_string()),
        }
    }
}

/// Upper bound on the per-query resolutions kept between calls.
const MAX_CACHED_QUERIES: usize = 256;

/// Stateful front of the resolver.
///
/// Owns no token data: every view is derived from [`Sources`] and the call
/// gateway, and recomputed only when their revisions or call states change.
pub struct TokenResolver {
    config: ResolverConfig,
    gateway: CallGateway,
    active: Memo<MergeKey, Arc<TokenMap>>,
    fraktal: Memo<MergeKey, Arc<TokenMap>>,
    unsupported: Memo<MergeKey, Arc<TokenMap>>,
    // Per-query memos, valid for `tokens_key` only.
    tokens: HashMap<QueryKey, Memo<TokenInputs, Resolution<TokenDescriptor>>>,
    tokens_key: Option<MergeKey>,
}

impl TokenResolver {
    pub fn new(config: ResolverConfig, gateway: CallGateway) -> Self {
        Self {
            config,
            gateway,
            active: Memo::new(),
            fraktal: Memo::new(),
            unsupported: Memo::new(),
            tokens: HashMap::new(),
            tokens_key: None,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn gateway(&self) -> &CallGateway {
        &self.gateway
    }

    /// Active list tokens of the current chain, with the user's imports.
    pub fn all_tokens(&mut self, sources: &Sources<'_>) -> Arc<TokenMap> {
        self.active.get_or_compute(MergeKey::of(sources), || {
            Arc::new(merge_list(
                sources.lists.active_map(),
                sources.chain.chain_id,
                sources.user_tokens,
                true,
            ))
        })
    }

    /// Fraktal tokens of the current chain, with the user's Fraktal imports.
    pub fn fraktal_tokens(&mut self, sources: &Sources<'_>) -> Arc<TokenMap> {
        self.fraktal.get_or_compute(MergeKey::of(sources), || {
            Arc::new(merge_fraktal_list(
                sources.lists.fraktal_map(),
                sources.chain.chain_id,
                sources.user_tokens,
            ))
        })
    }

    /// Tokens the frontend refuses to trade on the current chain.
    pub fn unsupported_tokens(&mut self, sources: &Sources<'_>) -> Arc<TokenMap> {
        self.unsupported.get_or_compute(MergeKey::of(sources), || {
            Arc::new(merge_list(
                sources.lists.unsupported_map(),
                sources.chain.chain_id,
                sources.user_tokens,
                false,
            ))
        })
    }

    /// Resolve a token, issuing metadata calls only for valid addresses that
    /// no list knows.
    pub fn token(&mut self, sources: &Sources<'_>, query: Query<'_>) -> Resolution<TokenDescriptor> {
        let chain_id = sources.chain.chain_id;
        let active = self.all_tokens(sources);
        let fraktal = self.fraktal_tokens(sources);

        let lookup = match query {
            Query::Id(id) => Address::parse(id)
                .ok()
                .filter(|a| !fraktal.contains(a) && !active.contains(a)),
            Query::Absent | Query::Empty => None,
        };
        let calls = match (lookup, chain_id) {
            (Some(address), Some(chain_id)) => {
                self.gateway
                    .token_calls(chain_id, address, self.config.call_policy)
            }
            _ => TokenCalls::default(),
        };

        let merge = MergeKey::of(sources);
        if self.tokens_key.as_ref() != Some(&merge) {
            self.tokens.clear();
            self.tokens_key = Some(merge.clone());
        }
        let query_key = QueryKey::from(query);
        if self.tokens.len() >= MAX_CACHED_QUERIES && !self.tokens.contains_key(&query_key) {
            tracing::debug!(cached = self.tokens.len(), "dropping per-query resolutions");
            self.tokens.clear();
        }

        let inputs = TokenInputs { merge, calls };
        let config = &self.config;
        self.tokens
            .entry(query_key)
            .or_default()
            .get_or_compute(inputs.clone(), || {
                let resolution =
                    resolve_token(query, chain_id, &active, &fraktal, &inputs.calls, config);
                tracing::trace!(?query, ?resolution, "resolved token");
                resolution
            })
    }

    /// Resolve a currency id (native symbol, wrapped-native address, or token).
    pub fn currency(&mut self, sources: &Sources<'_>, query: Query<'_>) -> Resolution<Currency> {
        let config = self.config.clone();
        resolve_currency(query, sources.chain.chain_id, &config, |q| self.token(sources, q))
    }

    /// Resolve the first token of the Fraktal list on the current chain.
    pub fn easy_fraktal(&mut self, sources: &Sources<'_>) -> Resolution<TokenDescriptor> {
        let Some(chain_id) = sources.chain.chain_id else {
            return Resolution::Unresolvable;
        };
        match sources.lists.fraktal_list().first_token(chain_id) {
            Some(entry) => self.token(sources, Query::Id(&entry.address)),
            None => Resolution::Unresolvable,
        }
    }

    pub fn is_token_active(&mut self, sources: &Sources<'_>, token: &TokenDescriptor) -> bool {
        self.all_tokens(sources).contains(&token.address)
    }

    pub fn is_user_added_token(&self, sources: &Sources<'_>, currency: &Currency) -> bool {
        currency
            .as_token()
            .is_some_and(|t| sources.user_tokens.contains(t))
    }

    /// Tokens of inactive lists matching `search`, excluding active ones.
    pub fn search_inactive_lists(
        &mut self,
        sources: &Sources<'_>,
        search: &str,
        min_results: usize,
    ) -> Vec<ListToken> {
        let Some(chain_id) = sources.chain.chain_id else {
            return Vec::new();
        };
        let active = self.all_tokens(sources);
        search_inactive_lists(
            sources.lists.inactive_lists(),
            chain_id,
            &active,
            search,
            min_results,
        )
    }

    /// Drop every memoized value.
    pub fn clear_cache(&mut self) {
        self.active.clear();
        self.fraktal.clear();
        self.unsupported.clear();
        self.tokens.clear();
        self.tokens_key = None;
    }
}
