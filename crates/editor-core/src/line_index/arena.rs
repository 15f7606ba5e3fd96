use crate::line_index::node::{Node, NodeId};

/// Owns every [`Node`] in a [`super::bot::BalancedOffsetTree`].
///
/// Freed slots (from [`NodeArena::free`]) are kept on a free list and
/// reused by the next [`NodeArena::alloc`], so a long-lived tree that sees
/// many `insert_after`/`remove` pairs does not grow without bound. Nothing
/// outside the tree ever sees a `NodeId` for a freed slot, so `get`/
/// `get_mut` treat indexing a dead slot as a corrupted-invariant bug, not a
/// recoverable error — matching `spec.md` §7's "internal invariant
/// violations ... are unreachable in a correct implementation".
#[derive(Debug, Default)]
pub struct NodeArena {
    slots: Vec<Option<Node>>,
    free: Vec<NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            slots: Vec::with_capacity(cap),
            free: Vec::new(),
        }
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.0 as usize] = Some(node);
            id
        } else {
            let id = NodeId(self.slots.len() as u32);
            self.slots.push(Some(node));
            id
        }
    }

    pub fn free(&mut self, id: NodeId) {
        self.slots[id.0 as usize] = None;
        self.free.push(id);
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        self.slots[id.0 as usize]
            .as_ref()
            .expect("NodeArena: dereferenced a freed node — corrupted tree invariant")
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots[id.0 as usize]
            .as_mut()
            .expect("NodeArena: dereferenced a freed node — corrupted tree invariant")
    }
}
