//! Bounded recency list protecting the most recently used cache entries.
//!
//! The C-style intrusive circular list becomes an index-linked list over a
//! slot vector: slot 0 is a sentinel that is never a real entry, and "in the
//! list" is the presence of a slot index on the entry rather than non-null
//! pointers. Promotion and eviction stay O(1).

use crate::cache::key::CacheKey;

/// Number of entries protected from sweeping. Entries beyond this are not
/// evicted immediately; they merely lose protection and age out.
pub(crate) const RECENCY_CAPACITY: usize = 20;

const HEAD: usize = 0;

#[derive(Debug)]
struct Slot {
    prev: usize,
    next: usize,
    /// Key of the protected entry; `None` only for the sentinel and free slots.
    key: Option<CacheKey>,
}

/// Outcome of a promotion.
pub(crate) enum Promotion {
    /// The entry was already the most recent; nothing moved.
    Kept,
    /// The entry was already protected and moved to the front.
    Moved,
    /// The entry newly entered the list, possibly displacing the least
    /// recent key, which loses protection but is not freed.
    Inserted {
        slot: usize,
        displaced: Option<CacheKey>,
    },
}

pub(crate) struct RecencyList {
    slots: Vec<Slot>,
    free: Vec<usize>,
    capacity: usize,
    len: usize,
}

impl RecencyList {
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0);
        Self {
            slots: vec![Slot {
                prev: HEAD,
                next: HEAD,
                key: None,
            }],
            free: Vec::new(),
            capacity,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Move the entry to the front of the list.
    ///
    /// `current` is the entry's slot if it is already protected. When a new
    /// entry enters a full list, the least recent slot is unlinked and its
    /// key returned so the owner can clear that entry's protection marker.
    pub(crate) fn promote(&mut self, current: Option<usize>, key: &CacheKey) -> Promotion {
        self.check();
        let outcome = match current {
            Some(slot) => {
                debug_assert_eq!(self.slots[slot].key.as_ref(), Some(key));
                if self.slots[HEAD].next == slot {
                    Promotion::Kept
                } else {
                    self.unlink(slot);
                    self.link_front(slot);
                    Promotion::Moved
                }
            }
            None => {
                let displaced = if self.len == self.capacity {
                    let tail = self.slots[HEAD].prev;
                    debug_assert_ne!(tail, HEAD);
                    self.unlink(tail);
                    self.len -= 1;
                    let displaced_key = self.slots[tail].key.take();
                    self.free.push(tail);
                    displaced_key
                } else {
                    None
                };
                let slot = self.alloc(Some(key.clone()));
                self.link_front(slot);
                self.len += 1;
                Promotion::Inserted { slot, displaced }
            }
        };
        self.check();
        outcome
    }

    /// Unlink a slot from wherever it sits.
    pub(crate) fn remove(&mut self, slot: usize) {
        self.check();
        debug_assert!(self.slots[slot].key.is_some());
        self.unlink(slot);
        self.slots[slot].key = None;
        self.free.push(slot);
        self.len -= 1;
        self.check();
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.slots.push(Slot {
            prev: HEAD,
            next: HEAD,
            key: None,
        });
        self.free.clear();
        self.len = 0;
    }

    fn alloc(&mut self, key: Option<CacheKey>) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot].key = key;
                slot
            }
            None => {
                self.slots.push(Slot {
                    prev: HEAD,
                    next: HEAD,
                    key,
                });
                self.slots.len() - 1
            }
        }
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.slots[slot].prev, self.slots[slot].next);
        self.slots[prev].next = next;
        self.slots[next].prev = prev;
    }

    fn link_front(&mut self, slot: usize) {
        let first = self.slots[HEAD].next;
        self.slots[slot].prev = HEAD;
        self.slots[slot].next = first;
        self.slots[first].prev = slot;
        self.slots[HEAD].next = slot;
    }

    /// Walk the list and assert it is consistent with the maintained count.
    /// An inconsistency is a logic defect, so this aborts in debug builds.
    fn check(&self) {
        #[cfg(debug_assertions)]
        {
            let mut count = 0;
            let mut node = HEAD;
            loop {
                let next = self.slots[node].next;
                debug_assert_eq!(self.slots[next].prev, node);
                if next == HEAD {
                    break;
                }
                count += 1;
                debug_assert!(count <= self.len, "recency list longer than its count");
                node = next;
            }
            debug_assert_eq!(count, self.len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> CacheKey {
        CacheKey::new(name, None, 48, false)
    }

    #[test]
    fn test_promote_new_entries_until_capacity() {
        let mut list = RecencyList::new(3);
        for name in ["a", "b", "c"] {
            match list.promote(None, &key(name)) {
                Promotion::Inserted { displaced, .. } => assert!(displaced.is_none()),
                _ => panic!("expected insertion"),
            }
        }
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_capacity_eviction_displaces_least_recent() {
        let mut list = RecencyList::new(2);
        list.promote(None, &key("a"));
        list.promote(None, &key("b"));
        match list.promote(None, &key("c")) {
            Promotion::Inserted { displaced, .. } => {
                assert_eq!(displaced, Some(key("a")));
            }
            _ => panic!("expected insertion"),
        }
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_promoting_front_entry_is_noop() {
        let mut list = RecencyList::new(2);
        let slot = match list.promote(None, &key("a")) {
            Promotion::Inserted { slot, .. } => slot,
            _ => panic!("expected insertion"),
        };
        assert!(matches!(list.promote(Some(slot), &key("a")), Promotion::Kept));
    }

    #[test]
    fn test_repromotion_protects_entry() {
        let mut list = RecencyList::new(2);
        let slot_a = match list.promote(None, &key("a")) {
            Promotion::Inserted { slot, .. } => slot,
            _ => panic!(),
        };
        list.promote(None, &key("b"));
        // Touch "a" again; "b" is now the tail and gets displaced next.
        assert!(matches!(
            list.promote(Some(slot_a), &key("a")),
            Promotion::Moved
        ));
        match list.promote(None, &key("c")) {
            Promotion::Inserted { displaced, .. } => {
                assert_eq!(displaced, Some(key("b")));
            }
            _ => panic!("expected insertion"),
        }
    }

    #[test]
    fn test_remove_frees_slot() {
        let mut list = RecencyList::new(2);
        let slot = match list.promote(None, &key("a")) {
            Promotion::Inserted { slot, .. } => slot,
            _ => panic!(),
        };
        list.remove(slot);
        assert_eq!(list.len(), 0);
        // The freed slot is reusable.
        list.promote(None, &key("b"));
        list.promote(None, &key("c"));
        assert_eq!(list.len(), 2);
    }
}
