//! Nodes of the compressed tree and the arena that owns them.
//!
//! Every node lives in a single `Vec` owned by the tree. Children are
//! referred to by [`NodeId`], and so is the parent, which makes the
//! back-reference non-owning: it is only read while a node is being
//! re-attached during a split, and while rebuilding full keys.

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Index, IndexMut};
use std::collections::VecDeque;


/// Position of a node in its [`Arena`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct NodeId(usize);

impl NodeId {
    /// The root is allocated first and is never replaced.
    pub(crate) const ROOT: NodeId = NodeId(0);
}

#[derive(Clone)]
pub(crate) struct Node<V> {
    /// The part of the key owned by this node, relative to its parent.
    pub(crate) segment: Vec<u8>,
    /// `Some` iff this node represents a stored key.
    pub(crate) value: Option<V>,
    /// Sorted by the first byte of each child's segment.
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl<V> Node<V> {
    const fn root() -> Self {
        Node {
            segment: Vec::new(),
            value: None,
            children: Vec::new(),
            parent: None,
        }
    }

    pub(crate) fn new(segment: Vec<u8>, value: Option<V>) -> Self {
        Node {
            segment,
            value,
            children: Vec::new(),
            parent: None,
        }
    }

    /// `None` only for the root.
    pub(crate) fn first_byte(&self) -> Option<u8> {
        self.segment.first().copied()
    }

    pub(crate) fn common_prefix_len(&self, query: &[u8]) -> usize {
        common_prefix_len(&self.segment, query)
    }

    /// Byte-wise ordering of segments; a proper prefix sorts first.
    pub(crate) fn cmp_segment(&self, other: &Self) -> Ordering {
        self.segment.as_slice().cmp(other.segment.as_slice())
    }
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parent.is_none() && self.segment.is_empty() {
            return f.write_str("{root}");
        }

        write!(
            f,
            "{{key: \"{}\", value: {:?}, children: {}}}",
            self.segment.escape_ascii(),
            self.value,
            self.children.len(),
        )
    }
}

/// Length of the longest run of leading bytes shared by `left` and `right`.
pub(crate) fn common_prefix_len(left: &[u8], right: &[u8]) -> usize {
    left.iter()
        .zip(right)
        .take_while(|(l, r)| l == r)
        .count()
}

/// Owns every node of a tree. Nodes are never freed; the tree only grows.
#[derive(Clone, Debug)]
pub(crate) struct Arena<V> {
    nodes: Vec<Node<V>>,
}

impl<V> Arena<V> {
    pub(crate) fn new() -> Self {
        Arena { nodes: vec![Node::root()] }
    }

    pub(crate) fn alloc(&mut self, node: Node<V>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Attaches `child` under `parent`, keeping the children sorted by
    /// first byte. Returns the node the child was attached under.
    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) -> NodeId {
        let first = self[child].first_byte();
        debug_assert!(first.is_some(), "only the root may have an empty segment");

        let position = self[parent]
            .children
            .binary_search_by_key(&first, |&id| self[id].first_byte());
        debug_assert!(position.is_err(), "two children may not share a first byte");

        let (Ok(index) | Err(index)) = position;
        self[parent].children.insert(index, child);
        self[child].parent = Some(parent);
        parent
    }

    /// Detaches the child whose segment equals that of `child`.
    /// Returns the node it was detached from.
    pub(crate) fn remove_child(&mut self, parent: NodeId, child: NodeId) -> NodeId {
        let position = self[parent]
            .children
            .binary_search_by(|&id| self[id].cmp_segment(&self[child]));

        if let Ok(index) = position {
            let removed = self[parent].children.remove(index);
            self[removed].parent = None;
        }

        parent
    }

    pub(crate) fn find_child(&self, parent: NodeId, byte: u8) -> Option<NodeId> {
        let children = &self[parent].children;
        let index = children
            .binary_search_by_key(&Some(byte), |&id| self[id].first_byte())
            .ok()?;

        Some(children[index])
    }

    /// Rebuilds the full key of a node by walking up to the root.
    pub(crate) fn key_of(&self, id: NodeId) -> Vec<u8> {
        let mut segments = Vec::new();
        let mut current = Some(id);

        while let Some(id) = current {
            segments.push(self[id].segment.as_slice());
            current = self[id].parent;
        }

        segments.reverse();
        segments.concat()
    }

    /// Visits `start` and everything beneath it, level by level.
    pub(crate) fn breadth_first(&self, start: NodeId) -> BreadthFirst<'_, V> {
        BreadthFirst {
            arena: self,
            queue: VecDeque::from([start]),
        }
    }

    /// A traversal that yields nothing.
    pub(crate) fn nothing(&self) -> BreadthFirst<'_, V> {
        BreadthFirst {
            arena: self,
            queue: VecDeque::new(),
        }
    }
}

impl<V> Index<NodeId> for Arena<V> {
    type Output = Node<V>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

impl<V> IndexMut<NodeId> for Arena<V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.0]
    }
}

/// Breadth-first walk over a subtree.
pub(crate) struct BreadthFirst<'a, V> {
    arena: &'a Arena<V>,
    queue: VecDeque<NodeId>,
}

impl<V> Clone for BreadthFirst<'_, V> {
    fn clone(&self) -> Self {
        BreadthFirst {
            arena: self.arena,
            queue: self.queue.clone(),
        }
    }
}

impl<'a, V> Iterator for BreadthFirst<'a, V> {
    type Item = (NodeId, &'a Node<V>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.queue.pop_front()?;
        let node = &self.arena[id];
        self.queue.extend(node.children.iter().copied());
        Some((id, node))
    }
}
