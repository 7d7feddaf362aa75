use std::collections::HashSet;

use crate::address::Address;
use crate::list::{ListEntry, ListSummary, ListToken, TokenList};
use crate::token::TokenMap;

/// Build a predicate matching list entries against a search string.
///
/// An address search matches that address only. Otherwise every
/// whitespace-separated search term must be a prefix or suffix of some word
/// of the symbol or the name.
pub fn token_filter(search: &str) -> impl Fn(&ListEntry) -> bool {
    let address = Address::parse(search).ok();
    let terms: Vec<String> = search
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    move |entry: &ListEntry| {
        if let Some(address) = &address {
            return Address::parse(&entry.address).is_ok_and(|a| a == *address);
        }
        if terms.is_empty() {
            return true;
        }
        matches_terms(&terms, &entry.symbol) || matches_terms(&terms, &entry.name)
    }
}

fn matches_terms(terms: &[String], value: &str) -> bool {
    let value = value.to_lowercase();
    let words: Vec<&str> = value.split_whitespace().collect();
    terms
        .iter()
        .all(|term| words.iter().any(|w| w.starts_with(term.as_str()) || w.ends_with(term.as_str())))
}

/// Search inactive lists for tokens of `chain_id` that are not already active.
///
/// Results keep list order, are unique by address, and stop at `min_results`.
/// A blank search returns nothing.
pub fn search_inactive_lists<'a>(
    lists: impl IntoIterator<Item = &'a TokenList>,
    chain_id: u64,
    active: &TokenMap,
    search: &str,
    min_results: usize,
) -> Vec<ListToken> {
    if search.trim().is_empty() {
        return Vec::new();
    }
    let filter = token_filter(search);
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for list in lists {
        let summary = ListSummary {
            name: list.name.clone(),
            logo_uri: list.logo_uri.clone(),
        };
        for entry in list.tokens.iter().filter(|t| t.chain_id == chain_id) {
            if !filter(entry) {
                continue;
            }
            let Ok(token) = entry.to_token() else {
                continue;
            };
            if active.contains(&token.address) || !seen.insert(token.address) {
                continue;
            }
            results.push(ListToken {
                token,
                list: summary.clone(),
            });
            if results.len() >= min_results {
                return results;
            }
        }
    }
    results
}
