use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::client::{BrowseQuery, PlaylistQuery};

const CONTEXT_KEY: &str = "context";
const DESCRIPTION_KEY: &str = "description";
const TRACE_ID_KEY: &str = "traceId";
const LAST_BROWSE_KEY: &str = "lastBrowseQuery";
const LAST_PLAYLIST_KEY: &str = "lastPlaylistQuery";

/// String key/value storage scoped to the browser tab.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct MemoryStore(RefCell<HashMap<String, String>>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.0.borrow_mut().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.0.borrow_mut().remove(key);
    }

    fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Typed view over the tab's session storage.
///
/// Holds everything a page needs to remember between handlers: the context
/// and description chosen in the context modal, the trace id of the current
/// browse playlist and the last query issued, so a refresh repeats it.
pub struct PageSession<S> {
    store: S,
}

impl<S: SessionStore> PageSession<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn context(&self) -> Option<String> {
        self.non_empty(CONTEXT_KEY)
    }

    pub fn description(&self) -> Option<String> {
        self.non_empty(DESCRIPTION_KEY)
    }

    pub fn set_context(&self, context: &str, description: &str) {
        self.store.set(CONTEXT_KEY, context);
        self.store.set(DESCRIPTION_KEY, description);
    }

    pub fn trace_id(&self) -> Option<String> {
        self.non_empty(TRACE_ID_KEY)
    }

    pub fn set_trace_id(&self, trace_id: Option<&str>) {
        match trace_id {
            Some(trace_id) => self.store.set(TRACE_ID_KEY, trace_id),
            None => self.store.remove(TRACE_ID_KEY),
        }
    }

    pub fn last_browse_query(&self) -> Option<BrowseQuery> {
        self.load(LAST_BROWSE_KEY)
    }

    pub fn set_last_browse_query(&self, query: &BrowseQuery) {
        self.save(LAST_BROWSE_KEY, query);
    }

    pub fn last_playlist_query(&self) -> Option<PlaylistQuery> {
        self.load(LAST_PLAYLIST_KEY)
    }

    pub fn set_last_playlist_query(&self, query: &PlaylistQuery) {
        self.save(LAST_PLAYLIST_KEY, query);
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        self.store.get(key).filter(|value| !value.is_empty())
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.store.get(key)?;
        serde_json::from_str(&value)
            .map_err(|e| warn!("discarding unreadable session value {}: {}", key, e))
            .ok()
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(value) => self.store.set(key, &value),
            Err(e) => warn!("could not store session value {}: {}", key, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_reads_as_unset() {
        let session = PageSession::new(MemoryStore::new());
        assert_eq!(session.context(), None);
        session.set_context("", "");
        assert_eq!(session.context(), None);
        assert_eq!(session.description(), None);
        session.set_context("WORK", "focus");
        assert_eq!(session.context().as_deref(), Some("WORK"));
        assert_eq!(session.description().as_deref(), Some("focus"));
    }

    #[test]
    fn last_write_wins() {
        let session = PageSession::new(MemoryStore::new());
        let mut query = PlaylistQuery {
            emotion: "HPY".into(),
            ..PlaylistQuery::default()
        };
        session.set_last_playlist_query(&query);
        query.genre = Some("jazz".into());
        session.set_last_playlist_query(&query);
        assert_eq!(session.last_playlist_query(), Some(query));
    }

    #[test]
    fn unreadable_values_are_ignored() {
        let session = PageSession::new(MemoryStore::new());
        session.store().set(LAST_BROWSE_KEY, "{not json");
        assert_eq!(session.last_browse_query(), None);
    }

    #[test]
    fn clear_forgets_everything() {
        let session = PageSession::new(MemoryStore::new());
        session.set_context("PARTY", "");
        session.set_trace_id(Some("t-1"));
        session.clear();
        assert_eq!(session.context(), None);
        assert_eq!(session.trace_id(), None);
    }
}
