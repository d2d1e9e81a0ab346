//! Bounded least-recently-used map.
//!
//! Entries live in an index-addressed arena and are chained into a recency
//! list through `prev`/`next` indices: `head` is the most recently used
//! entry and `tail` the next one to evict.

use std::collections::HashMap;

#[derive(Debug)]
struct Node<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// LruCache keeps at most `capacity` entries and evicts the least recently
/// used one when a new key arrives while full.
#[derive(Debug)]
pub struct LruCache<V> {
    map: HashMap<String, usize>,
    nodes: Vec<Node<V>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    /// Slots still available before an insert has to evict.
    remaining: usize,
}

impl<V> LruCache<V> {
    /// Create a cache that holds at most `capacity` entries.
    ///
    /// A zero capacity cache never stores anything.
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            remaining: capacity,
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Get the value of `key` and mark it as most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        Some(&self.nodes[idx].value)
    }

    /// Check whether `key` is stored without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Insert or replace `key`, marking it as most recently used.
    ///
    /// Returns false if the value could not be stored because the cache has
    /// no capacity at all.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        if let Some(&idx) = self.map.get(&key) {
            self.nodes[idx].value = value;
            self.move_to_front(idx);
            return true;
        }

        if self.remaining == 0 {
            self.prune();
        }
        if self.remaining == 0 {
            return false;
        }

        let node = Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.map.insert(key, idx);
        self.remaining -= 1;
        self.push_front(idx);
        true
    }

    /// Evict the least recently used entry, if any.
    fn prune(&mut self) {
        let Some(idx) = self.tail else {
            return;
        };
        self.unlink(idx);
        self.map.remove(&self.nodes[idx].key);
        self.free.push(idx);
        self.remaining += 1;
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;
        match self.head {
            Some(head) => self.nodes[head].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
    }
}
