//! Pure tree-link rotations and the AVL rebalancing that rides on top of
//! them. Each rotation rewires parent/child links and repairs the
//! relative-offset/relative-line-number encoding in the same step, per
//! `spec.md` §4.8 — the two must happen atomically or every node below the
//! rotated subtree reports a stale absolute offset.

use crate::line_index::arena::NodeArena;
use crate::line_index::node::NodeId;

#[inline]
fn height(arena: &NodeArena, id: Option<NodeId>) -> i32 {
    id.map_or(0, |id| arena.get(id).height as i32)
}

fn update_height(arena: &mut NodeArena, id: NodeId) {
    let h = 1 + height(arena, arena.get(id).left).max(height(arena, arena.get(id).right));
    arena.get_mut(id).height = h as u8;
}

fn balance_factor(arena: &NodeArena, id: NodeId) -> i32 {
    height(arena, arena.get(id).left) - height(arena, arena.get(id).right)
}

/// Replaces `old_child`'s slot in `parent` (or the tree root, if `parent`
/// is `None`) with `new_child`.
fn relink_parent(
    arena: &mut NodeArena,
    root: &mut Option<NodeId>,
    parent: Option<NodeId>,
    old_child: NodeId,
    new_child: NodeId,
) {
    match parent {
        None => *root = Some(new_child),
        Some(p) => {
            if arena.get(p).left == Some(old_child) {
                arena.get_mut(p).left = Some(new_child);
            } else {
                arena.get_mut(p).right = Some(new_child);
            }
        }
    }
}

/// Right rotation of the subtree rooted at `x`. `x` must have a left child.
/// Returns the new subtree root (`x`'s old left child).
fn right_rotate(arena: &mut NodeArena, x: NodeId) -> NodeId {
    let y = arena.get(x).left.expect("right_rotate: x has no left child");
    let beta = arena.get(y).right;
    let x_parent = arena.get(x).parent;

    arena.get_mut(y).right = Some(x);
    arena.get_mut(x).left = beta;
    arena.get_mut(y).parent = x_parent;
    arena.get_mut(x).parent = Some(y);
    if let Some(b) = beta {
        arena.get_mut(b).parent = Some(x);
    }

    let y_off = arena.get(y).r_off;
    let y_lnum = arena.get(y).r_lnum;
    let x_off = arena.get(x).r_off;
    let x_lnum = arena.get(x).r_lnum;

    if let Some(b) = beta {
        arena.get_mut(b).r_off += y_off;
        arena.get_mut(b).r_lnum += y_lnum;
    }
    arena.get_mut(x).r_off = -y_off;
    arena.get_mut(x).r_lnum = -y_lnum;
    arena.get_mut(y).r_off = y_off + x_off;
    arena.get_mut(y).r_lnum = y_lnum + x_lnum;

    update_height(arena, x);
    update_height(arena, y);
    y
}

/// Left rotation of the subtree rooted at `x`. `x` must have a right child.
/// Returns the new subtree root (`x`'s old right child).
fn left_rotate(arena: &mut NodeArena, x: NodeId) -> NodeId {
    let y = arena.get(x).right.expect("left_rotate: x has no right child");
    let beta = arena.get(y).left;
    let x_parent = arena.get(x).parent;

    arena.get_mut(y).left = Some(x);
    arena.get_mut(x).right = beta;
    arena.get_mut(y).parent = x_parent;
    arena.get_mut(x).parent = Some(y);
    if let Some(b) = beta {
        arena.get_mut(b).parent = Some(x);
    }

    let y_off = arena.get(y).r_off;
    let y_lnum = arena.get(y).r_lnum;
    let x_off = arena.get(x).r_off;
    let x_lnum = arena.get(x).r_lnum;

    if let Some(b) = beta {
        arena.get_mut(b).r_off += y_off;
        arena.get_mut(b).r_lnum += y_lnum;
    }
    arena.get_mut(x).r_off = -y_off;
    arena.get_mut(x).r_lnum = -y_lnum;
    arena.get_mut(y).r_off = y_off + x_off;
    arena.get_mut(y).r_lnum = y_lnum + x_lnum;

    update_height(arena, x);
    update_height(arena, y);
    y
}

fn right_rotate_at(arena: &mut NodeArena, root: &mut Option<NodeId>, x: NodeId) -> NodeId {
    let parent = arena.get(x).parent;
    let y = right_rotate(arena, x);
    relink_parent(arena, root, parent, x, y);
    y
}

fn left_rotate_at(arena: &mut NodeArena, root: &mut Option<NodeId>, x: NodeId) -> NodeId {
    let parent = arena.get(x).parent;
    let y = left_rotate(arena, x);
    relink_parent(arena, root, parent, x, y);
    y
}

/// Restores the AVL property at `id`, performing the LL/RR/LR/RL rotation
/// its balance factor calls for (if any), and returns whichever node now
/// occupies `id`'s old structural position.
fn rebalance_at(arena: &mut NodeArena, root: &mut Option<NodeId>, id: NodeId) -> NodeId {
    update_height(arena, id);
    let bf = balance_factor(arena, id);

    if bf > 1 {
        let left = arena.get(id).left.expect("bf>1 implies a left child");
        if balance_factor(arena, left) < 0 {
            left_rotate_at(arena, root, left);
        }
        right_rotate_at(arena, root, id)
    } else if bf < -1 {
        let right = arena.get(id).right.expect("bf<-1 implies a right child");
        if balance_factor(arena, right) > 0 {
            right_rotate_at(arena, root, right);
        }
        left_rotate_at(arena, root, id)
    } else {
        id
    }
}

/// Walks from `start` up to the root, rebalancing and refreshing heights at
/// every node along the way. Used after both `insert_after` (where at most
/// one rotation is structurally possible) and `remove` (where a chain of
/// rotations up to the root can be required).
pub(super) fn rebalance_path(arena: &mut NodeArena, root: &mut Option<NodeId>, start: NodeId) {
    let mut cur = Some(start);
    while let Some(id) = cur {
        let parent = arena.get(id).parent;
        rebalance_at(arena, root, id);
        cur = parent;
    }
}
