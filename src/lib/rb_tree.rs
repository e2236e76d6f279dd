//! A red-black tree ordered set.
//!
//! Nodes live in an index-addressed arena owned by the tree. Slot 0 of the
//! arena is a shared black sentinel that stands in for every absent child and
//! for the root's parent, so rotations and fixups never special-case a
//! missing node. Callers address nodes through copyable [`NodeId`] handles.
#![warn(missing_docs)]

use std::borrow::Borrow;
use std::cmp::Ordering;

use log::{debug, trace};

mod error;
mod rb_node;
mod rb_traverse;

pub use error::{Error, Result};
pub use rb_node::{Color, NodeId};

use rb_node::{Arena, Node, Side};
use rb_traverse::InOrder;

/// A red-black tree over a totally ordered key type.
///
/// Equal keys are admitted; a key equal to an existing one is placed in that
/// node's right subtree, so duplicates come out of an export in insertion order.
pub struct RbTree<K> {
    nodes: Arena<K>,
    root: NodeId,
}

impl<K> RbTree<K> {
    /// Creates a new empty tree.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty tree with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        RbTree {
            nodes: Arena::with_capacity(capacity),
            root: NodeId::NIL,
        }
    }

    /// Returns the number of keys in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.root == NodeId::NIL
    }

    /// Returns the key stored at `node`, or `None` if the handle names nothing.
    pub fn key(&self, node: NodeId) -> Option<&K> {
        self.nodes.key(node)
    }

    /// Returns the color of `node`, or `None` if the handle names nothing.
    pub fn color(&self, node: NodeId) -> Option<Color> {
        self.nodes.is_live(node).then(|| self.nodes[node].color)
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack = Vec::new();
        if self.root != NodeId::NIL {
            stack.push((self.root, 1));
        }
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = &self.nodes[id];
            for child in [node.left, node.right] {
                if child != NodeId::NIL {
                    stack.push((child, depth + 1));
                }
            }
        }
        deepest
    }

    /// Returns the node holding the smallest key.
    pub fn minimum(&self) -> Option<NodeId> {
        (self.root != NodeId::NIL).then(|| self.extreme(self.root, Side::Left))
    }

    /// Returns the node holding the largest key.
    pub fn maximum(&self) -> Option<NodeId> {
        (self.root != NodeId::NIL).then(|| self.extreme(self.root, Side::Right))
    }

    /// Removes every key. All outstanding handles become stale.
    pub fn clear(&mut self) {
        debug!("clearing red-black tree of {} nodes", self.len());
        self.nodes.reset();
        self.root = NodeId::NIL;
    }

    /// Removes the node named by `node` and returns its key.
    ///
    /// The handle must come from [`insert`](Self::insert), [`find`](Self::find),
    /// [`minimum`](Self::minimum) or [`maximum`](Self::maximum) on this tree.
    /// Erasing [`NodeId::NIL`], an out-of-range handle or an already erased
    /// node does nothing and returns `None`. A handle whose slot has since
    /// been reused by another insert names that newer node.
    pub fn erase(&mut self, node: NodeId) -> Option<K> {
        if !self.nodes.is_live(node) {
            return None;
        }

        let z = node;
        let mut removed_color = self.nodes[z].color;
        let x;
        if self.nodes[z].left == NodeId::NIL {
            x = self.nodes[z].right;
            self.transplant(z, x);
        } else if self.nodes[z].right == NodeId::NIL {
            x = self.nodes[z].left;
            self.transplant(z, x);
        } else {
            // Two children: the in-order successor takes z's place and color.
            let y = self.extreme(self.nodes[z].right, Side::Left);
            removed_color = self.nodes[y].color;
            x = self.nodes[y].right;
            if self.nodes[y].parent == z {
                // x may be the sentinel; erase_fixup needs its parent.
                self.nodes[x].parent = y;
            } else {
                self.transplant(y, x);
                let z_right = self.nodes[z].right;
                self.nodes[y].right = z_right;
                self.nodes[z_right].parent = y;
            }
            self.transplant(z, y);
            let z_left = self.nodes[z].left;
            self.nodes[y].left = z_left;
            self.nodes[z_left].parent = y;
            self.nodes[y].color = self.nodes[z].color;
        }

        if removed_color == Color::Black {
            self.erase_fixup(x);
        }
        self.nodes[NodeId::NIL].parent = NodeId::NIL;

        self.nodes.release(z)
    }

    /// Descends from `from` along one side as far as it goes.
    fn extreme(&self, from: NodeId, side: Side) -> NodeId {
        let mut id = from;
        loop {
            let next = self.nodes[id].child(side);
            if next == NodeId::NIL {
                return id;
            }
            id = next;
        }
    }

    fn side_of(&self, id: NodeId) -> Side {
        let parent = self.nodes[id].parent;
        if self.nodes[parent].left == id {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Rotates around `x`. `Side::Left` promotes x's right child into x's
    /// place and moves x down to the left; `Side::Right` mirrors it.
    /// Links change, colors and keys do not.
    fn rotate(&mut self, x: NodeId, side: Side) {
        let up = side.opposite();
        let y = self.nodes[x].child(up);
        debug_assert!(y != NodeId::NIL, "rotating {:?} without a child to promote", x);

        let inner = self.nodes[y].child(side);
        *self.nodes[x].child_mut(up) = inner;
        if inner != NodeId::NIL {
            self.nodes[inner].parent = x;
        }

        let x_parent = self.nodes[x].parent;
        self.nodes[y].parent = x_parent;
        if x_parent == NodeId::NIL {
            self.root = y;
        } else {
            let slot = self.side_of(x);
            *self.nodes[x_parent].child_mut(slot) = y;
        }

        *self.nodes[y].child_mut(side) = x;
        self.nodes[x].parent = y;
    }

    /// Puts subtree `v` where subtree `u` hangs. `v` may be the sentinel, in
    /// which case only its parent link is written.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let u_parent = self.nodes[u].parent;
        if u_parent == NodeId::NIL {
            self.root = v;
        } else {
            let slot = self.side_of(u);
            *self.nodes[u_parent].child_mut(slot) = v;
        }
        self.nodes[v].parent = u_parent;
    }

    fn color_of(&self, id: NodeId) -> Color {
        self.nodes[id].color
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.color_of(self.nodes[z].parent) == Color::Red {
            // A red parent is never the root, so the grandparent is a real node.
            let parent = self.nodes[z].parent;
            let grandparent = self.nodes[parent].parent;
            let side = self.side_of(parent);
            let uncle = self.nodes[grandparent].child(side.opposite());

            if self.color_of(uncle) == Color::Red {
                trace!("insert fixup: red uncle, recolor and climb");
                self.nodes[parent].color = Color::Black;
                self.nodes[uncle].color = Color::Black;
                self.nodes[grandparent].color = Color::Red;
                z = grandparent;
                continue;
            }

            if z == self.nodes[parent].child(side.opposite()) {
                trace!("insert fixup: inner grandchild, rotate at parent");
                z = parent;
                self.rotate(z, side);
            }

            trace!("insert fixup: outer grandchild, rotate at grandparent");
            let parent = self.nodes[z].parent;
            let grandparent = self.nodes[parent].parent;
            self.nodes[parent].color = Color::Black;
            self.nodes[grandparent].color = Color::Red;
            self.rotate(grandparent, side.opposite());
        }
        let root = self.root;
        self.nodes[root].color = Color::Black;
    }

    /// Resolves the extra black carried by `x` after a black node was removed.
    fn erase_fixup(&mut self, mut x: NodeId) {
        while x != self.root && self.color_of(x) == Color::Black {
            let parent = self.nodes[x].parent;
            // x may be the sentinel; its parent link was set by the caller.
            let side = if self.nodes[parent].left == x {
                Side::Left
            } else {
                Side::Right
            };
            let mut sibling = self.nodes[parent].child(side.opposite());

            if self.color_of(sibling) == Color::Red {
                trace!("erase fixup: red sibling, rotate toward x");
                self.nodes[sibling].color = Color::Black;
                self.nodes[parent].color = Color::Red;
                self.rotate(parent, side);
                sibling = self.nodes[parent].child(side.opposite());
            }

            let near = self.nodes[sibling].child(side);
            let far = self.nodes[sibling].child(side.opposite());
            if self.color_of(near) == Color::Black && self.color_of(far) == Color::Black {
                trace!("erase fixup: black nephews, push deficit up");
                self.nodes[sibling].color = Color::Red;
                x = parent;
                continue;
            }

            if self.color_of(far) == Color::Black {
                trace!("erase fixup: red near nephew, rotate at sibling");
                self.nodes[near].color = Color::Black;
                self.nodes[sibling].color = Color::Red;
                self.rotate(sibling, side.opposite());
                sibling = self.nodes[parent].child(side.opposite());
            }

            trace!("erase fixup: red far nephew, rotate at parent");
            let far = self.nodes[sibling].child(side.opposite());
            self.nodes[sibling].color = self.nodes[parent].color;
            self.nodes[parent].color = Color::Black;
            self.nodes[far].color = Color::Black;
            self.rotate(parent, side);
            x = self.root;
        }
        self.nodes[x].color = Color::Black;
    }
}

impl<K: Ord> RbTree<K> {
    /// Inserts `key` and returns the handle of its new node.
    ///
    /// Node storage is reserved before the tree is touched; if that fails
    /// the tree is left exactly as it was and [`Error::AllocationFailed`]
    /// is returned.
    pub fn insert(&mut self, key: K) -> Result<NodeId> {
        if let Err(e) = self.nodes.reserve_one() {
            debug!("node reservation failed at {} nodes: {}", self.len(), e);
            return Err(e.into());
        }

        let mut parent = NodeId::NIL;
        let mut side = Side::Left;
        let mut cur = self.root;
        while cur != NodeId::NIL {
            parent = cur;
            side = if key < *self.nodes.linked_key(cur) {
                Side::Left
            } else {
                Side::Right
            };
            cur = self.nodes[cur].child(side);
        }

        let z = self.nodes.alloc(Node::leaf(key, parent));
        if parent == NodeId::NIL {
            self.root = z;
        } else {
            *self.nodes[parent].child_mut(side) = z;
        }
        self.insert_fixup(z);
        Ok(z)
    }

    /// Returns a node whose key equals `key`.
    pub fn find<Q: ?Sized + Ord>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
    {
        let mut cur = self.root;
        while cur != NodeId::NIL {
            match key.cmp(self.nodes.linked_key(cur).borrow()) {
                Ordering::Less => cur = self.nodes[cur].left,
                Ordering::Greater => cur = self.nodes[cur].right,
                Ordering::Equal => return Some(cur),
            }
        }
        None
    }

    /// Returns true if some node holds a key equal to `key`.
    pub fn contains<Q: ?Sized + Ord>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
    {
        self.find(key).is_some()
    }

    /// Removes one node whose key equals `key`, returning the stored key.
    pub fn remove<Q: ?Sized + Ord>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
    {
        let node = self.find(key)?;
        self.erase(node)
    }
}

impl<K: Clone> RbTree<K> {
    /// Writes keys in ascending order into `out`, stopping when it is full.
    /// Returns how many keys were written.
    ///
    /// A destination shorter than [`len`](Self::len) silently receives only
    /// the smallest keys; size it from `len` to export everything.
    pub fn fill_sorted(&self, out: &mut [K]) -> Result<usize> {
        if out.is_empty() {
            return Err(Error::ZeroCapacity);
        }
        let mut written = 0;
        for (slot, key) in out.iter_mut().zip(InOrder::new(&self.nodes, self.root)) {
            slot.clone_from(key);
            written += 1;
        }
        Ok(written)
    }

    /// Returns at most `capacity` keys in ascending order.
    ///
    /// As with [`fill_sorted`](Self::fill_sorted), truncation is not
    /// reported; pass a capacity of at least [`len`](Self::len).
    pub fn to_array(&self, capacity: usize) -> Result<Vec<K>> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        let count = capacity.min(self.len());
        let mut out = Vec::new();
        out.try_reserve_exact(count)?;
        out.extend(InOrder::new(&self.nodes, self.root).take(count).cloned());
        Ok(out)
    }
}

impl<K> Default for RbTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: std::fmt::Debug> std::fmt::Debug for RbTree<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(InOrder::new(&self.nodes, self.root))
            .finish()
    }
}

#[cfg(test)]
impl<K: Clone> RbTree<K> {
    /// Collects keys and colors level by level for testing purposes.
    pub fn bfs(&self, result: &mut Vec<Vec<(K, Color)>>) {
        let mut layer = Vec::new();
        if self.root != NodeId::NIL {
            layer.push(self.root);
        }
        while !layer.is_empty() {
            let mut next = Vec::new();
            let mut row = Vec::with_capacity(layer.len());
            for id in layer {
                let node = &self.nodes[id];
                row.push((self.nodes.linked_key(id).clone(), node.color));
                next.extend([node.left, node.right].into_iter().filter(|c| *c != NodeId::NIL));
            }
            result.push(row);
            layer = next;
        }
    }
}
