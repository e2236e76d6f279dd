use std::collections::TryReserveError;
use std::ops::{Index, IndexMut};

/// Node color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    /// Red node.
    Red,
    /// Black node. The sentinel is always black.
    Black,
}

/// Which child slot of a node. Every mirrored step of the rebalancing
/// code is written once against a `Side` and its opposite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    /// Left child.
    Left,
    /// Right child.
    Right,
}

impl Side {
    pub(super) fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Handle to a node stored in an [`RbTree`](crate::RbTree).
///
/// A handle stays valid until the node it names is erased or the tree is
/// cleared. Erased slots are recycled by later inserts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(super) usize);

impl NodeId {
    /// The sentinel: stands for every absent child and the root's parent.
    pub const NIL: NodeId = NodeId(0);
}

pub(super) struct Node<K> {
    // None for the sentinel and for vacant slots.
    pub(super) key: Option<K>,
    pub(super) color: Color,
    pub(super) parent: NodeId,
    pub(super) left: NodeId,
    pub(super) right: NodeId,
}

impl<K> Node<K> {
    fn sentinel() -> Self {
        Node {
            key: None,
            color: Color::Black,
            parent: NodeId::NIL,
            left: NodeId::NIL,
            right: NodeId::NIL,
        }
    }

    /// A fresh red leaf hanging off `parent`.
    pub(super) fn leaf(key: K, parent: NodeId) -> Self {
        Node {
            key: Some(key),
            color: Color::Red,
            parent,
            left: NodeId::NIL,
            right: NodeId::NIL,
        }
    }

    pub(super) fn child(&self, side: Side) -> NodeId {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(super) fn child_mut(&mut self, side: Side) -> &mut NodeId {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Index-addressed node storage. Slot 0 is the sentinel and is never handed
/// out; released slots go on a free list and are reused before the vector grows.
pub(super) struct Arena<K> {
    slots: Vec<Node<K>>,
    free: Vec<NodeId>,
    live: usize,
}

impl<K> Arena<K> {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity + 1);
        slots.push(Node::sentinel());
        Arena {
            slots,
            free: Vec::new(),
            live: 0,
        }
    }

    pub(super) fn len(&self) -> usize {
        self.live
    }

    /// Makes sure the next `alloc` will not need to grow the slot vector.
    /// Nothing is mutated observably, so a failure leaves the tree as it was.
    pub(super) fn reserve_one(&mut self) -> Result<(), TryReserveError> {
        if self.free.is_empty() {
            self.slots.try_reserve(1)?;
        }
        Ok(())
    }

    pub(super) fn alloc(&mut self, node: Node<K>) -> NodeId {
        self.live += 1;
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = node;
                id
            }
            None => {
                self.slots.push(node);
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Vacates a slot that has already been unlinked from the tree.
    pub(super) fn release(&mut self, id: NodeId) -> Option<K> {
        let key = self.slots[id.0].key.take()?;
        let slot = &mut self.slots[id.0];
        slot.color = Color::Black;
        slot.parent = NodeId::NIL;
        slot.left = NodeId::NIL;
        slot.right = NodeId::NIL;
        self.free.push(id);
        self.live -= 1;
        Some(key)
    }

    /// True for handles that name a node currently stored in the arena.
    pub(super) fn is_live(&self, id: NodeId) -> bool {
        id != NodeId::NIL && self.slots.get(id.0).is_some_and(|n| n.key.is_some())
    }

    pub(super) fn key(&self, id: NodeId) -> Option<&K> {
        self.slots.get(id.0).and_then(|n| n.key.as_ref())
    }

    /// Key of a node reached by walking links. Links only ever lead to live
    /// nodes or the sentinel, and callers stop at the sentinel.
    pub(super) fn linked_key(&self, id: NodeId) -> &K {
        match &self.slots[id.0].key {
            Some(key) => key,
            None => unreachable!("link walk reached keyless slot {:?}", id),
        }
    }

    /// Drops every node and returns the arena to its freshly created state.
    pub(super) fn reset(&mut self) {
        self.slots.truncate(1);
        self.slots[0] = Node::sentinel();
        self.free.clear();
        self.live = 0;
    }
}

impl<K> Index<NodeId> for Arena<K> {
    type Output = Node<K>;

    fn index(&self, id: NodeId) -> &Node<K> {
        &self.slots[id.0]
    }
}

impl<K> IndexMut<NodeId> for Arena<K> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K> {
        &mut self.slots[id.0]
    }
}
