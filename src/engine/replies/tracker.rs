// ── Emotebank: Reply Tracker ───────────────────────────────────────────────
//
// Bounded map from an inbound message id to the reply it produced. Nodes live
// in an arena (`Vec<Option<Node>>`) linked into a recency list by index, with
// a free list for reuse, so inserts and hits never move other entries.
//
// Two bounds apply: an entry count and a byte budget. Each record is charged
// a fixed per-node overhead plus the length of its rendered content, and
// entries are evicted from the least-recent end until both bounds hold.
// A record that alone exceeds the budget is not tracked at all.
//
// Every `get` promotes to most-recent. Eviction is silent; that message just
// stops being kept in sync.
//
// Thread-safety: NOT internally synchronized. It has a single writer (the
// event loop) by construction.

use crate::atoms::constants::APPROX_REPLY_RECORD_BYTES;
use crate::atoms::types::{MessageId, ReplyRecord};
use std::collections::HashMap;
use std::mem::size_of;

/// Arena slots are preallocated up to this many; beyond it the arena grows
/// on demand.
const INITIAL_SLOTS: usize = 1024;

/// Fixed cost of one entry: its arena slot plus its index entry.
pub const NODE_OVERHEAD_BYTES: usize = size_of::<Option<Node>>() + size_of::<(MessageId, usize)>();

#[derive(Debug)]
struct Node {
    key: MessageId,
    record: ReplyRecord,
    /// Towards the most-recent end.
    newer: Option<usize>,
    /// Towards the least-recent end.
    older: Option<usize>,
}

#[derive(Debug)]
pub struct ReplyTracker {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    index: HashMap<MessageId, usize>,
    newest: Option<usize>,
    oldest: Option<usize>,
    capacity: usize,
    budget: usize,
    bytes_used: usize,
}

fn cost_of(content: &str) -> usize {
    NODE_OVERHEAD_BYTES + content.len()
}

impl ReplyTracker {
    /// Hold at most `capacity` records (minimum 1), with no byte limit.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::bounded(capacity, usize::MAX)
    }

    /// Hold records while their charged size fits in `bytes`. The entry count
    /// is also capped at one per typical record size.
    pub fn with_byte_budget(bytes: usize) -> Self {
        Self::bounded(bytes / APPROX_REPLY_RECORD_BYTES, bytes)
    }

    fn bounded(capacity: usize, budget: usize) -> Self {
        let capacity = capacity.max(1);
        let prealloc = capacity.min(INITIAL_SLOTS);
        Self {
            nodes: Vec::with_capacity(prealloc),
            free: Vec::new(),
            index: HashMap::with_capacity(prealloc),
            newest: None,
            oldest: None,
            capacity,
            budget,
            bytes_used: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn byte_budget(&self) -> usize {
        self.budget
    }

    /// Charged size of everything currently held.
    pub fn bytes_used(&self) -> usize {
        self.bytes_used
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: MessageId) -> bool {
        self.index.contains_key(&key)
    }

    /// Insert or replace as most recent. Returns the keys evicted to make
    /// room. A record too large for the whole budget is dropped (and any
    /// previous entry for `key` with it).
    pub fn insert(&mut self, key: MessageId, record: ReplyRecord) -> Vec<MessageId> {
        let cost = cost_of(&record.content);
        if cost > self.budget {
            self.remove(key);
            return Vec::new();
        }

        if let Some(&slot) = self.index.get(&key) {
            let old = cost_of(&self.node(slot).record.content);
            self.node_mut(slot).record = record;
            self.bytes_used = self.bytes_used - old + cost;
            self.promote(slot);
            return self.shrink_to(0, 0);
        }

        let evicted = self.shrink_to(1, cost);

        let node = Node { key, record, newer: None, older: self.newest };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.attach_newest(slot);
        self.index.insert(key, slot);
        self.bytes_used += cost;
        evicted
    }

    /// Look up and mark as most recently used.
    pub fn get(&mut self, key: MessageId) -> Option<&ReplyRecord> {
        let slot = *self.index.get(&key)?;
        self.promote(slot);
        Some(&self.node(slot).record)
    }

    /// Look up without touching recency.
    pub fn peek(&self, key: MessageId) -> Option<&ReplyRecord> {
        self.index.get(&key).map(|&slot| &self.node(slot).record)
    }

    /// Replace the stored rendering of a tracked reply and mark it most
    /// recent, evicting older entries if it grew past the budget. Returns
    /// false when the key is not tracked afterwards.
    pub fn update_content(&mut self, key: MessageId, content: String) -> bool {
        let Some(&slot) = self.index.get(&key) else {
            return false;
        };
        let cost = cost_of(&content);
        if cost > self.budget {
            self.remove(key);
            return false;
        }

        let old = cost_of(&self.node(slot).record.content);
        self.node_mut(slot).record.content = content;
        self.bytes_used = self.bytes_used - old + cost;
        self.promote(slot);
        self.shrink_to(0, 0);
        true
    }

    pub fn remove(&mut self, key: MessageId) -> Option<ReplyRecord> {
        let slot = self.index.remove(&key)?;
        self.detach(slot);
        let node = self.nodes[slot].take()?;
        self.free.push(slot);
        self.bytes_used -= cost_of(&node.record.content);
        Some(node.record)
    }

    /// Keys from most to least recently used.
    #[cfg(test)]
    fn keys_by_recency(&self) -> Vec<MessageId> {
        let mut out = Vec::with_capacity(self.len());
        let mut cursor = self.newest;
        while let Some(slot) = cursor {
            let node = self.node(slot);
            out.push(node.key);
            cursor = node.older;
        }
        out
    }

    // ── List plumbing ──────────────────────────────────────────────────

    /// Evict least-recent entries until `extra_entries` more entries costing
    /// `extra_bytes` would fit both bounds.
    fn shrink_to(&mut self, extra_entries: usize, extra_bytes: usize) -> Vec<MessageId> {
        let mut evicted = Vec::new();
        while self.index.len() + extra_entries > self.capacity
            || self.bytes_used.saturating_add(extra_bytes) > self.budget
        {
            let Some(slot) = self.oldest else { break };
            let key = self.node(slot).key;
            self.remove(key);
            evicted.push(key);
        }
        evicted
    }

    fn promote(&mut self, slot: usize) {
        if self.newest == Some(slot) {
            return;
        }
        self.detach(slot);
        {
            let newest = self.newest;
            let node = self.node_mut(slot);
            node.newer = None;
            node.older = newest;
        }
        self.attach_newest(slot);
    }

    /// Link `slot` (whose `older` is already set to the current newest) at
    /// the head of the list.
    fn attach_newest(&mut self, slot: usize) {
        if let Some(prev) = self.newest {
            self.node_mut(prev).newer = Some(slot);
        }
        self.newest = Some(slot);
        if self.oldest.is_none() {
            self.oldest = Some(slot);
        }
    }

    fn detach(&mut self, slot: usize) {
        let (newer, older) = {
            let node = self.node(slot);
            (node.newer, node.older)
        };
        match newer {
            Some(n) => self.node_mut(n).older = older,
            None => self.newest = older,
        }
        match older {
            Some(o) => self.node_mut(o).newer = newer,
            None => self.oldest = newer,
        }
    }

    fn node(&self, slot: usize) -> &Node {
        self.nodes[slot].as_ref().expect("indexed slot is occupied")
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node {
        self.nodes[slot].as_mut().expect("indexed slot is occupied")
    }
}
