//! Bounded record of recently discovered story titles
//!
//! Titles are kept in insertion order. Once the set is full, inserting a new
//! title evicts the oldest one, so a title that scrolls out of the window can be
//! discovered again later.

use std::collections::VecDeque;

/// Default number of titles remembered between discovery cycles
pub const DEFAULT_SEEN_CAPACITY: usize = 30;

/// FIFO-evicting set of story titles
#[derive(Debug, Clone)]
pub struct RecentlySeen {
    titles: VecDeque<String>,
    capacity: usize,
}

impl RecentlySeen {
    /// Creates an empty set holding at most `capacity` titles
    ///
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            titles: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns true if the title is inside the retention window
    pub fn contains(&self, title: &str) -> bool {
        self.titles.iter().any(|t| t == title)
    }

    /// Records a title, evicting the oldest entry if the set is full
    ///
    /// Returns the evicted title, if any. Inserting a title that is already
    /// present is a no-op.
    pub fn insert(&mut self, title: impl Into<String>) -> Option<String> {
        let title = title.into();
        if self.contains(&title) {
            return None;
        }

        let evicted = if self.titles.len() == self.capacity {
            self.titles.pop_front()
        } else {
            None
        };
        self.titles.push_back(title);
        evicted
    }

    /// Returns the titles from the given list that are not yet known
    ///
    /// Page order is preserved and duplicates within `current` are collapsed.
    pub fn unseen<'a, I>(&self, current: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut fresh: Vec<&str> = Vec::new();
        for title in current {
            if !self.contains(title) && !fresh.contains(&title) {
                fresh.push(title);
            }
        }
        fresh
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates titles from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().map(String::as_str)
    }
}

impl Default for RecentlySeen {
    fn default() -> Self {
        Self::new(DEFAULT_SEEN_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let mut seen = RecentlySeen::default();
        assert!(seen.is_empty());

        seen.insert("Foo");
        assert!(seen.contains("Foo"));
        assert!(!seen.contains("Bar"));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let mut seen = RecentlySeen::new(2);
        seen.insert("Foo");
        assert_eq!(seen.insert("Foo"), None);
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_thirty_first_title_evicts_oldest() {
        let mut seen = RecentlySeen::default();
        for i in 0..30 {
            assert_eq!(seen.insert(format!("story {}", i)), None);
        }
        assert_eq!(seen.len(), 30);

        let evicted = seen.insert("story 30");
        assert_eq!(evicted, Some("story 0".to_string()));
        assert_eq!(seen.len(), 30);
        assert!(!seen.contains("story 0"));
        assert!(seen.contains("story 1"));
        assert!(seen.contains("story 30"));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut seen = RecentlySeen::new(5);
        for i in 0..100 {
            seen.insert(format!("t{}", i));
            assert!(seen.len() <= 5);
        }
        let titles: Vec<&str> = seen.iter().collect();
        assert_eq!(titles, vec!["t95", "t96", "t97", "t98", "t99"]);
    }

    #[test]
    fn test_unseen_preserves_order_and_collapses_duplicates() {
        let mut seen = RecentlySeen::default();
        seen.insert("Bar");

        let fresh = seen.unseen(["Foo", "Bar", "Baz", "Foo"]);
        assert_eq!(fresh, vec!["Foo", "Baz"]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut seen = RecentlySeen::new(0);
        assert_eq!(seen.capacity(), 1);
        seen.insert("a");
        assert_eq!(seen.insert("b"), Some("a".to_string()));
    }
}
