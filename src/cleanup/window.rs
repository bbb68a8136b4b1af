//! Fixed-capacity FIFO of recently seen canonical keys.

use super::key::CanonicalKey;

/// Number of preceding fragments a duplicate is checked against.
pub const WINDOW_CAPACITY: usize = 6;

/// Normalized texts shorter than this are never treated as duplicates.
pub const DEDUPE_MIN_CHARS: usize = 12;

/// Ring buffer of the last `N` keys pushed, oldest evicted first.
///
/// Lookups do not refresh an entry's position (FIFO, not LRU).
#[derive(Debug, Clone)]
pub struct RecentKeys<const N: usize = WINDOW_CAPACITY> {
    slots: [Option<CanonicalKey>; N],
    /// Index of the oldest entry
    head: usize,
    len: usize,
}

impl<const N: usize> Default for RecentKeys<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RecentKeys<N> {
    /// Creates an empty window.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            head: 0,
            len: 0,
        }
    }

    /// Maximum number of keys held.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no key has been pushed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if `key` is among the held keys.
    pub fn contains(&self, key: &CanonicalKey) -> bool {
        self.iter().any(|k| k == key)
    }

    /// Appends a key, evicting and returning the oldest one when full.
    pub fn push(&mut self, key: CanonicalKey) -> Option<CanonicalKey> {
        if N == 0 {
            return Some(key);
        }
        if self.len < N {
            let tail = (self.head + self.len) % N;
            self.slots[tail] = Some(key);
            self.len += 1;
            None
        } else {
            let evicted = self.slots[self.head].replace(key);
            self.head = (self.head + 1) % N;
            evicted
        }
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalKey> {
        (0..self.len).filter_map(move |i| self.slots[(self.head + i) % N].as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FragmentKind;

    fn key(text: &str) -> CanonicalKey {
        CanonicalKey::new(FragmentKind::Paragraph, text)
    }

    #[test]
    fn test_push_until_full() {
        let mut window: RecentKeys = RecentKeys::new();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), WINDOW_CAPACITY);

        for i in 0..WINDOW_CAPACITY {
            assert!(window.push(key(&format!("k{i}"))).is_none());
        }
        assert_eq!(window.len(), WINDOW_CAPACITY);
        assert!(window.contains(&key("k0")));
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut window: RecentKeys<3> = RecentKeys::new();
        window.push(key("a"));
        window.push(key("b"));
        window.push(key("c"));

        let evicted = window.push(key("d"));
        assert_eq!(evicted, Some(key("a")));
        assert_eq!(window.len(), 3);
        assert!(!window.contains(&key("a")));

        let order: Vec<String> = window.iter().map(|k| k.text.clone()).collect();
        assert_eq!(order, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_lookup_does_not_refresh() {
        let mut window: RecentKeys<2> = RecentKeys::new();
        window.push(key("a"));
        window.push(key("b"));
        assert!(window.contains(&key("a")));
        // Still evicts "a" despite the lookup
        assert_eq!(window.push(key("c")), Some(key("a")));
    }

    #[test]
    fn test_kind_is_part_of_key() {
        let mut window: RecentKeys = RecentKeys::new();
        window.push(CanonicalKey::new(FragmentKind::Paragraph, "same text"));
        assert!(!window.contains(&CanonicalKey::new(FragmentKind::ListItem, "same text")));
    }

    #[test]
    fn test_wraps_many_times() {
        let mut window: RecentKeys<4> = RecentKeys::new();
        for i in 0..100 {
            window.push(key(&i.to_string()));
            assert!(window.len() <= 4);
        }
        let order: Vec<String> = window.iter().map(|k| k.text.clone()).collect();
        assert_eq!(order, vec!["96", "97", "98", "99"]);
    }
}
