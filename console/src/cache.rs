use std::collections::HashMap;
use std::hash::Hash;

/// Keyed result cache with stale-response suppression.
///
/// Each fetched result set is cached under its exact key. A fetch started
/// through [`QueryCache::begin_fetch`] gets a ticket capturing the current
/// request generation; the result is applied only while the ticket's key is
/// still the one being displayed and no invalidation happened in between.
/// A late response for a superseded key is discarded, never applied.
pub struct QueryCache<K, V> {
    entries: HashMap<K, V>,
    current: Option<K>,
    generation: u64,
}

/// Handle for one in-flight fetch. Carries the key being fetched and the
/// generation it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket<K> {
    key: K,
    generation: u64,
}

impl<K> FetchTicket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Clone + Eq + Hash, V> QueryCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            current: None,
            generation: 0,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Marks `key` as the key being displayed and returns a ticket for the
    /// fetch about to be issued.
    pub fn begin_fetch(&mut self, key: K) -> FetchTicket<K> {
        self.current = Some(key.clone());
        FetchTicket {
            key,
            generation: self.generation,
        }
    }

    /// True while a response carrying this ticket may still update state.
    pub fn is_current(&self, ticket: &FetchTicket<K>) -> bool {
        ticket.generation == self.generation && self.current.as_ref() == Some(&ticket.key)
    }

    /// Stores the fetched value if the ticket is still current. Returns
    /// whether the value was applied.
    pub fn complete(&mut self, ticket: FetchTicket<K>, value: V) -> bool {
        if !self.is_current(&ticket) {
            return false;
        }
        self.entries.insert(ticket.key, value);
        true
    }

    /// Drops one cached key; the next read re-fetches. In-flight responses
    /// issued before the invalidation are discarded.
    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
        self.generation += 1;
    }

    /// Drops every cached key.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<K: Clone + Eq + Hash, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_fetch_is_served_from_cache() {
        let mut cache: QueryCache<&str, u32> = QueryCache::new();
        let ticket = cache.begin_fetch("a");
        assert!(cache.complete(ticket, 1));
        assert_eq!(cache.get(&"a"), Some(&1));
    }

    #[test]
    fn late_response_for_superseded_key_is_discarded() {
        let mut cache: QueryCache<&str, u32> = QueryCache::new();
        let stale = cache.begin_fetch("a");
        let fresh = cache.begin_fetch("b");

        assert!(!cache.complete(stale, 1));
        assert_eq!(cache.get(&"a"), None);

        assert!(cache.complete(fresh, 2));
        assert_eq!(cache.get(&"b"), Some(&2));
    }

    #[test]
    fn invalidation_discards_in_flight_responses() {
        let mut cache: QueryCache<&str, u32> = QueryCache::new();
        let ticket = cache.begin_fetch("a");
        cache.invalidate_all();
        assert!(!cache.complete(ticket, 1));
        assert_eq!(cache.get(&"a"), None);
    }

    #[test]
    fn invalidate_removes_only_that_key_but_bumps_generation_once() {
        let mut cache: QueryCache<&str, u32> = QueryCache::new();
        let a = cache.begin_fetch("a");
        cache.complete(a, 1);
        let b = cache.begin_fetch("b");
        cache.complete(b, 2);

        let before = cache.generation();
        cache.invalidate(&"a");
        assert_eq!(cache.generation(), before + 1);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(&2));
    }

    #[test]
    fn refetching_the_same_key_stays_applicable() {
        let mut cache: QueryCache<&str, u32> = QueryCache::new();
        let first = cache.begin_fetch("a");
        let second = cache.begin_fetch("a");
        // Both tickets target the current key under the same generation.
        assert!(cache.complete(first, 1));
        assert!(cache.complete(second, 2));
        assert_eq!(cache.get(&"a"), Some(&2));
    }
}
