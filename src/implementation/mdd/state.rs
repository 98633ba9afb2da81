// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module defines the leaf data types of a decision diagram: its nodes,
//! its arcs and the states the nodes are indexed on. Nodes and arcs never
//! reference one another directly; they use the `NodeId` and `ArcId` handles
//! which index the arenas owned by the diagram.

use std::hash::{Hash, Hasher};
use std::ops::Deref;

use fxhash::FxHasher64;

use crate::{NodeFlags, Player, Variable};

/// The value stored in the state entries of the rows that are not tracked
/// (rows only involving leader variables).
pub const UNTRACKED: isize = isize::MIN;

/// The identifier of a node: it indicates the position of the referenced node
/// in the 'nodes' vector of the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// The identifier of an arc: it indicates the position of the referenced arc
/// in the 'arcs' vector of the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArcId(pub usize);

/// The state of a node. It holds one entry per row of the follower
/// constraints: the accumulated left hand side of that row along any path
/// reaching the node (or `UNTRACKED`).
///
/// States are immutable once created, hence they can cheaply be shared
/// between a node and the per-layer index of its diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State(std::sync::Arc<[isize]>);

impl State {
    /// Creates the state of a root node: every tracked row is zero.
    pub fn root(tracked: impl Iterator<Item = bool>) -> Self {
        tracked.map(|t| if t { 0 } else { UNTRACKED }).collect()
    }
    /// Returns a fresh state where the given column has been added to every
    /// tracked entry.
    pub fn add_column(&self, column: impl Fn(usize) -> isize) -> Self {
        self.iter().enumerate()
            .map(|(row, v)| if *v == UNTRACKED { UNTRACKED } else { v + column(row) })
            .collect()
    }
    /// Returns a copy of this state which shares nothing with the original
    pub fn deep_copy(&self) -> Self {
        Self::from(self.0.to_vec())
    }
}
impl Deref for State {
    type Target = [isize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl From<Vec<isize>> for State {
    fn from(v: Vec<isize>) -> Self {
        State(v.into())
    }
}
impl FromIterator<isize> for State {
    fn from_iter<T: IntoIterator<Item = isize>>(iter: T) -> Self {
        State(iter.into_iter().collect())
    }
}

/// Represents an effective node from the decision diagram
#[derive(Debug, Clone)]
pub struct Node {
    /// The state associated to this node
    pub state: State,
    /// The number of decisions that have been made since the root
    pub layer: usize,
    /// The minimum leader objective over all the prefixes reaching this node
    pub leader_cost: isize,
    /// The minimum follower objective over all the prefixes reaching this node
    pub follower_cost: isize,
    /// A group of flags telling if the node is pinned, deleted or marked
    pub flags: NodeFlags,
    pub(crate) incoming: Vec<ArcId>,
    pub(crate) outgoing: Vec<ArcId>,
}

impl Node {
    pub(crate) fn new(state: State, layer: usize, leader_cost: isize, follower_cost: isize) -> Self {
        Node {
            state,
            layer,
            leader_cost,
            follower_cost,
            flags: NodeFlags::default(),
            incoming: vec![],
            outgoing: vec![],
        }
    }
    /// The arcs pointing at this node
    pub fn incoming_arcs(&self) -> &[ArcId] {
        &self.incoming
    }
    /// The arcs leaving this node
    pub fn outgoing_arcs(&self) -> &[ArcId] {
        &self.outgoing
    }
    /// A stable digest of `(state, layer)`. Equal states at the same layer
    /// always have the same key.
    pub fn hash_key(&self) -> u64 {
        let mut hasher = FxHasher64::default();
        self.state.hash(&mut hasher);
        self.layer.hash(&mut hasher);
        hasher.finish()
    }
    /// Lowers the costs of this node to the cheapest of its current costs and
    /// the given ones.
    pub(crate) fn relax_costs(&mut self, leader_cost: isize, follower_cost: isize) {
        self.leader_cost   = self.leader_cost.min(leader_cost);
        self.follower_cost = self.follower_cost.min(follower_cost);
    }
}

/// The slack annotation of a compressed terminal arc: one `(row, value)` pair
/// per row shared by both players, sorted by row.
pub type BlockValues = Vec<(usize, isize)>;

/// Materializes one arc from the decision diagram. It logically connects two
/// nodes and annotates the link with a decision and its costs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arc {
    /// The identifier of the node at the **source** of this arc.
    pub tail: NodeId,
    /// The identifier of the node at the **destination** of this arc.
    pub head: NodeId,
    /// The value assigned to `var` (0 or 1)
    pub value: u8,
    /// The player owning the transition
    pub player: Player,
    /// The variable this arc decides on. None for structural long arcs and
    /// for the compressed leader arcs.
    pub var: Option<Variable>,
    /// Contribution of this arc to the follower objective
    pub follower_cost: isize,
    /// Contribution of this arc to the leader objective
    pub leader_cost: isize,
    /// Only set on the arcs of a compressed terminal layer
    pub block_values: Option<BlockValues>,
}

impl Arc {
    /// Creates a structural long arc (owned by neither player)
    pub(crate) fn long(tail: NodeId, head: NodeId, follower_cost: isize) -> Self {
        Arc {
            tail,
            head,
            value: 0,
            player: Player::Neither,
            var: None,
            follower_cost,
            leader_cost: 0,
            block_values: None,
        }
    }
    /// Returns true iff this arc is a structural long arc
    pub fn is_long(&self) -> bool {
        self.player == Player::Neither
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
