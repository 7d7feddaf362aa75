use crate::error::ListError;
use crate::list::{bundled_fraktal_list, TokenAddressMap, TokenList};
use crate::memo::next_revision;

/// Snapshot store for every known token list.
///
/// Lists are kept in insertion order, which is also their priority when the
/// active ones are combined. Derived address maps are rebuilt on mutation and
/// `revision` is replaced by a process-unique one, so memoized views can tell
/// snapshots apart even across different stores.
#[derive(Debug, Clone)]
pub struct ListStore {
    lists: Vec<(String, TokenList)>,
    active_urls: Vec<String>,
    unsupported: Option<TokenList>,
    fraktal: TokenList,
    active_map: TokenAddressMap,
    unsupported_map: TokenAddressMap,
    fraktal_map: TokenAddressMap,
    revision: u64,
}

impl ListStore {
    pub fn new(fraktal: TokenList) -> Self {
        let fraktal_map = TokenAddressMap::from_fraktal_list(&fraktal);
        Self {
            lists: Vec::new(),
            active_urls: Vec::new(),
            unsupported: None,
            fraktal,
            active_map: TokenAddressMap::new(),
            unsupported_map: TokenAddressMap::new(),
            fraktal_map,
            revision: next_revision(),
        }
    }

    /// Store seeded with the Fraktal list bundled in the crate.
    pub fn with_bundled_fraktal() -> Self {
        Self::new(bundled_fraktal_list().clone())
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Insert or refresh a list. A snapshot older than the stored one is
    /// ignored; returns whether the store changed.
    pub fn upsert_list(&mut self, url: &str, list: TokenList) -> bool {
        match self.lists.iter_mut().find(|(u, _)| u == url) {
            Some((_, current)) => {
                if list.is_older_than(current) {
                    tracing::debug!(%url, "ignoring stale token list snapshot");
                    return false;
                }
                *current = list;
            }
            None => self.lists.push((url.to_string(), list)),
        }
        self.rebuild_active();
        true
    }

    pub fn remove_list(&mut self, url: &str) -> bool {
        let before = self.lists.len();
        self.lists.retain(|(u, _)| u != url);
        self.active_urls.retain(|u| u != url);
        let removed = self.lists.len() != before;
        if removed {
            self.rebuild_active();
        }
        removed
    }

    pub fn activate(&mut self, url: &str) -> Result<(), ListError> {
        if !self.lists.iter().any(|(u, _)| u == url) {
            return Err(ListError::UnknownList(url.to_string()));
        }
        if !self.is_active(url) {
            self.active_urls.push(url.to_string());
            self.rebuild_active();
        }
        Ok(())
    }

    pub fn deactivate(&mut self, url: &str) {
        let before = self.active_urls.len();
        self.active_urls.retain(|u| u != url);
        if self.active_urls.len() != before {
            self.rebuild_active();
        }
    }

    pub fn is_active(&self, url: &str) -> bool {
        self.active_urls.iter().any(|u| u == url)
    }

    pub fn set_fraktal_list(&mut self, list: TokenList) {
        self.fraktal_map = TokenAddressMap::from_fraktal_list(&list);
        self.fraktal = list;
        self.revision = next_revision();
    }

    pub fn set_unsupported_list(&mut self, list: TokenList) {
        self.unsupported_map = TokenAddressMap::from_list(&list);
        self.unsupported = Some(list);
        self.revision = next_revision();
    }

    pub fn fraktal_list(&self) -> &TokenList {
        &self.fraktal
    }

    pub fn active_map(&self) -> &TokenAddressMap {
        &self.active_map
    }

    pub fn fraktal_map(&self) -> &TokenAddressMap {
        &self.fraktal_map
    }

    pub fn unsupported_map(&self) -> &TokenAddressMap {
        &self.unsupported_map
    }

    /// Lists that are stored but not active, in store order.
    pub fn inactive_lists(&self) -> impl Iterator<Item = &TokenList> {
        self.lists
            .iter()
            .filter(|(url, _)| !self.is_active(url))
            .map(|(_, list)| list)
    }

    fn rebuild_active(&mut self) {
        let maps: Vec<TokenAddressMap> = self
            .lists
            .iter()
            .filter(|(url, _)| self.is_active(url))
            .map(|(_, list)| TokenAddressMap::from_list(list))
            .collect();
        self.active_map = TokenAddressMap::combine(&maps);
        self.revision = next_revision();
    }
}

impl Default for ListStore {
    fn default() -> Self {
        Self::with_bundled_fraktal()
    }
}
