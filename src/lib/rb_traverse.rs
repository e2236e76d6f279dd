use crate::rb_node::{Arena, NodeId};

/// In-order walk over the keys of a subtree.
///
/// Keeps its own stack of pending ancestors, so depth is bounded by the tree
/// height and no recursion is involved.
pub(super) struct InOrder<'a, K> {
    nodes: &'a Arena<K>,
    stack: Vec<NodeId>,
}

impl<'a, K> InOrder<'a, K> {
    pub(super) fn new(nodes: &'a Arena<K>, root: NodeId) -> Self {
        let mut walk = InOrder {
            nodes,
            stack: Vec::new(),
        };
        walk.push_leftmost(root);
        walk
    }

    fn push_leftmost(&mut self, mut id: NodeId) {
        while id != NodeId::NIL {
            self.stack.push(id);
            id = self.nodes[id].left;
        }
    }
}

impl<'a, K: 'a> Iterator for InOrder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.push_leftmost(self.nodes[id].right);
        Some(self.nodes.linked_key(id))
    }
}
