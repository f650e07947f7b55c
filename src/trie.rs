//! A map from byte strings to arbitrary values, based on a compressed prefix tree.

use core::fmt;
use core::iter::FusedIterator;
use core::ops::Index;
use crate::node::{Arena, BreadthFirst, Node, NodeId};
use crate::trace::{debug_log, trace_log};


/// A map from byte strings to arbitrary values, based on a PATRICIA trie.
///
/// Chains of single-child nodes are merged, so each edge carries a
/// multi-byte segment. Keys are never removed: the tree only grows.
#[derive(Clone)]
pub struct PatriciaTrie<V> {
    arena: Arena<V>,
    len: usize,
}

/// The outcome of [`PatriciaTrie::insert`].
#[must_use]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Insertion<V> {
    /// The key was not stored before.
    Inserted,
    /// The key was already stored; this is the value it used to have.
    Updated(V),
    /// The key was empty, so nothing happened.
    Ignored,
}

impl<V> Insertion<V> {
    /// Returns `true` if the insertion increased the length of the map.
    pub const fn is_inserted(&self) -> bool {
        matches!(self, Insertion::Inserted)
    }

    /// The value that was replaced, if any.
    pub fn into_previous(self) -> Option<V> {
        match self {
            Insertion::Updated(previous) => Some(previous),
            Insertion::Inserted | Insertion::Ignored => None,
        }
    }
}

impl<V> Default for PatriciaTrie<V> {
    fn default() -> Self {
        PatriciaTrie::new()
    }
}

impl<V> PatriciaTrie<V> {
    /// Creates an empty map. The same as `Default`.
    pub fn new() -> Self {
        PatriciaTrie { arena: Arena::new(), len: 0 }
    }

    /// Returns the number of keys stored in the map.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if and only if this map contains no keys.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores `value` under `key`.
    ///
    /// Empty keys are not stored; they are reported as [`Insertion::Ignored`].
    pub fn insert<K>(&mut self, key: K, value: V) -> Insertion<V>
    where
        K: AsRef<[u8]>,
    {
        let key = key.as_ref();

        if key.is_empty() {
            return Insertion::Ignored;
        }

        let outcome = self.insert_at(NodeId::ROOT, key, value);

        if outcome.is_inserted() {
            self.len += 1;
        }

        outcome
    }

    fn insert_at(&mut self, mut id: NodeId, mut key: &[u8], value: V) -> Insertion<V> {
        loop {
            let node = &self.arena[id];
            let common = node.common_prefix_len(key);
            let segment_len = node.segment.len();

            if id == NodeId::ROOT || common == 0 || (common < key.len() && common >= segment_len) {
                // the key extends past this segment, so `rest` is never empty
                let rest = &key[common..];

                if let Some(child) = self.arena.find_child(id, rest[0]) {
                    id = child;
                    key = rest;
                    continue;
                }

                let leaf = self.arena.alloc(Node::new(rest.to_vec(), Some(value)));
                self.arena.add_child(id, leaf);
                trace_log!(segment = %rest.escape_ascii(), "attached leaf");

                return Insertion::Inserted;
            }

            if common == key.len() && common == segment_len {
                return match self.arena[id].value.replace(value) {
                    Some(previous) => Insertion::Updated(previous),
                    None => {
                        debug_log!(key = %key.escape_ascii(), "promoted branch node");
                        Insertion::Inserted
                    }
                };
            }

            // 0 < common < segment_len: every other combination was handled above
            self.split(id, key, common, value);

            return Insertion::Inserted;
        }
    }

    /// Replaces `id` in its parent by a new branch node holding the first
    /// `common` bytes of its segment, then hangs `id` (shrunk to the rest
    /// of its segment) and the new key beneath that branch.
    fn split(&mut self, id: NodeId, key: &[u8], common: usize, value: V) {
        debug_assert!(common > 0 && common < self.arena[id].segment.len());

        // detach
        let parent = self.arena[id].parent;
        if let Some(parent) = parent {
            self.arena.remove_child(parent, id);
        }

        // build
        let branch = if common == key.len() {
            self.arena.alloc(Node::new(key.to_vec(), Some(value)))
        } else {
            let branch = self.arena.alloc(Node::new(key[..common].to_vec(), None));
            let leaf = self.arena.alloc(Node::new(key[common..].to_vec(), Some(value)));
            self.arena.add_child(branch, leaf)
        };

        // attach
        if let Some(parent) = parent {
            self.arena.add_child(parent, branch);
        }
        self.arena[id].segment.drain(..common);
        self.arena.add_child(branch, id);

        debug_log!(
            prefix = %key[..common].escape_ascii(),
            real = common == key.len(),
            "split node"
        );
    }

    /// Finds the node whose full key is exactly `key`, real or not.
    fn find(&self, mut key: &[u8]) -> Option<NodeId> {
        if key.is_empty() {
            return None;
        }

        let mut id = NodeId::ROOT;

        loop {
            let node = &self.arena[id];
            let common = node.common_prefix_len(key);

            if common != node.segment.len() {
                return None;
            }
            if common == key.len() {
                return Some(id);
            }

            id = self.arena.find_child(id, key[common])?;
            key = &key[common..];
        }
    }

    /// Finds the topmost node whose full key starts with `prefix`.
    ///
    /// The prefix may end in the middle of that node's segment. The root
    /// is never a match, so the empty prefix matches nothing.
    fn locate_prefix(&self, mut prefix: &[u8]) -> Option<NodeId> {
        if prefix.is_empty() {
            return None;
        }

        let mut id = NodeId::ROOT;

        loop {
            let node = &self.arena[id];
            let common = node.common_prefix_len(prefix);

            if common == prefix.len() {
                return Some(id);
            }
            if common != node.segment.len() {
                return None;
            }

            id = self.arena.find_child(id, prefix[common])?;
            prefix = &prefix[common..];
        }
    }

    /// Returns a reference to the value, if found.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized + AsRef<[u8]>,
    {
        let id = self.find(key.as_ref())?;
        self.arena[id].value.as_ref()
    }

    /// Returns a mutable reference to the value, if found.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized + AsRef<[u8]>,
    {
        let id = self.find(key.as_ref())?;
        self.arena[id].value.as_mut()
    }

    /// Returns `true` if and only if the given key is found in the map.
    ///
    /// This tests for presence, so a key stored with a "null-like" value
    /// is still contained.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + AsRef<[u8]>,
    {
        self.get(key).is_some()
    }

    /// Returns `true` if and only if some stored key starts with `prefix`.
    ///
    /// Always `false` for the empty prefix.
    pub fn contains_prefix<Q>(&self, prefix: &Q) -> bool
    where
        Q: ?Sized + AsRef<[u8]>,
    {
        self.locate_prefix(prefix.as_ref()).is_some()
    }

    /// An iterator over the values of all keys starting with `prefix`.
    ///
    /// Values are yielded breadth-first, so a key always comes before the
    /// keys it is a prefix of; no other ordering is promised. The empty
    /// prefix yields nothing.
    pub fn search_prefix<Q>(&self, prefix: &Q) -> Values<'_, V>
    where
        Q: ?Sized + AsRef<[u8]>,
    {
        let walk = self.locate_prefix(prefix.as_ref()).map_or_else(
            || self.arena.nothing(),
            |id| self.arena.breadth_first(id),
        );

        Values { walk }
    }

    /// An iterator over all key-value pairs, with the keys rebuilt as owned
    /// byte strings.
    ///
    /// The iteration order is unspecified.
    pub fn entries(&self) -> Entries<'_, V> {
        Entries {
            arena: &self.arena,
            walk: self.arena.breadth_first(NodeId::ROOT),
            len: self.len,
        }
    }
}

impl<V, Q> Index<&Q> for PatriciaTrie<V>
where
    Q: ?Sized + AsRef<[u8]>,
{
    type Output = V;

    fn index(&self, key: &Q) -> &Self::Output {
        self.get(key).expect("key not found in PatriciaTrie")
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for PatriciaTrie<V>
where
    K: AsRef<[u8]>,
{
    fn from(items: [(K, V); N]) -> Self {
        items.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for PatriciaTrie<V>
where
    K: AsRef<[u8]>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut trie = PatriciaTrie::new();
        trie.extend(iter);
        trie
    }
}

impl<K, V> Extend<(K, V)> for PatriciaTrie<V>
where
    K: AsRef<[u8]>,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iter {
            let _ = self.insert(key, value);
        }
    }
}

impl<'a, V> IntoIterator for &'a PatriciaTrie<V> {
    type IntoIter = Entries<'a, V>;
    type Item = (Vec<u8>, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

/// Two maps are equal if they store the same keys with equal values,
/// no matter in which order the keys were inserted.
impl<V: PartialEq> PartialEq for PatriciaTrie<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self.entries().all(|(key, value)| other.get(&key) == Some(value))
    }
}

impl<V: Eq> Eq for PatriciaTrie<V> {}

impl<V: fmt::Debug> fmt::Debug for PatriciaTrie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries().map(|(key, value)| (ByteStr(key), value)))
            .finish()
    }
}

struct ByteStr(Vec<u8>);

impl fmt::Debug for ByteStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.escape_ascii())
    }
}

/// Iterator over the values stored at and beneath a prefix.
#[derive(Clone)]
pub struct Values<'a, V> {
    walk: BreadthFirst<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.find_map(|(_id, node)| node.value.as_ref())
    }
}

impl<V> FusedIterator for Values<'_, V> {}

/// Iterator over all key-value pairs of a map.
#[derive(Clone)]
pub struct Entries<'a, V> {
    arena: &'a Arena<V>,
    walk: BreadthFirst<'a, V>,
    len: usize,
}

impl<'a, V> Iterator for Entries<'a, V> {
    type Item = (Vec<u8>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, value) = self
            .walk
            .find_map(|(id, node)| node.value.as_ref().map(|value| (id, value)))?;

        self.len -= 1;
        Some((self.arena.key_of(id), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<V> FusedIterator for Entries<'_, V> {}

impl<V> ExactSizeIterator for Entries<'_, V> {
    fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod proptests;
