//! In-order walk over a [`super::bot::BalancedOffsetTree`], adapted from
//! the teacher's `LineRangeIter` (a stack of in-progress B-tree child
//! indices) to a stack of arena nodes paired with the absolute offset/line
//! number accumulated on the way down to them.

use crate::line_index::arena::NodeArena;
use crate::line_index::node::NodeId;

/// Yields `(line number, byte offset)` pairs in ascending line order.
pub struct Lines<'a> {
    arena: &'a NodeArena,
    stack: Vec<(NodeId, i128, i64)>,
}

impl<'a> Lines<'a> {
    pub(super) fn new(arena: &'a NodeArena, root: Option<NodeId>) -> Self {
        let mut iter = Self {
            arena,
            stack: Vec::new(),
        };
        if let Some(root) = root {
            iter.push_left_spine(root, 0, 0);
        }
        iter
    }

    fn push_left_spine(&mut self, mut id: NodeId, mut off: i128, mut lnum: i64) {
        loop {
            let node = self.arena.get(id);
            off += node.r_off;
            lnum += node.r_lnum;
            self.stack.push((id, off, lnum));
            match node.left {
                Some(left) => id = left,
                None => return,
            }
        }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = (usize, u64);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, off, lnum) = self.stack.pop()?;
        if let Some(right) = self.arena.get(id).right {
            self.push_left_spine(right, off, lnum);
        }
        Some((lnum as usize, off as u64))
    }
}
