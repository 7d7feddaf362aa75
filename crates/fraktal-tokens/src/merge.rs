use crate::list::TokenAddressMap;
use crate::token::{TokenDescriptor, TokenMap};
use crate::user::UserTokenStore;

/// Reduce a list map to the plain tokens of one chain, optionally overlaying
/// the user's imported tokens. User tokens win over list entries.
pub fn merge_list(
    list_map: &TokenAddressMap,
    chain_id: Option<u64>,
    user_tokens: &UserTokenStore,
    include_user_added: bool,
) -> TokenMap {
    merge_filtered(list_map, chain_id, user_tokens, include_user_added, |_| true)
}

/// Like [`merge_list`] for the Fraktal list: only imported tokens that carry
/// Fraktal metadata are overlaid.
pub fn merge_fraktal_list(
    list_map: &TokenAddressMap,
    chain_id: Option<u64>,
    user_tokens: &UserTokenStore,
) -> TokenMap {
    merge_filtered(list_map, chain_id, user_tokens, true, |t| t.is_fraktal())
}

fn merge_filtered(
    list_map: &TokenAddressMap,
    chain_id: Option<u64>,
    user_tokens: &UserTokenStore,
    include_user_added: bool,
    keep_user_token: impl Fn(&TokenDescriptor) -> bool,
) -> TokenMap {
    let Some(chain_id) = chain_id else {
        return TokenMap::new();
    };

    let mut merged: TokenMap = list_map
        .chain(chain_id)
        .map(|tokens| tokens.values().map(|t| t.token.clone()).collect())
        .unwrap_or_default();

    if include_user_added {
        for token in user_tokens.for_chain(chain_id).filter(|t| keep_user_token(t)) {
            merged.insert(token.clone());
        }
    }

    merged
}
