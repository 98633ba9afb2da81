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

//! This module defines the `DecisionDiagram` container. A diagram owns all
//! its nodes and arcs in two arenas and keeps, per layer, the list of its live
//! nodes along with an index of these nodes by state.

use std::time::Duration;

use fxhash::FxHashMap;

use crate::{Arc, ArcId, Completion, Error, LeaderEncoding, Node, NodeId, OrderingHeuristic, Player, State, VariableOrdering};

/// The provenance of a compiled diagram
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// The width cap that was requested at compilation time
    pub max_width: Option<usize>,
    /// The heuristic that produced the variable ordering
    pub ordering_heuristic: OrderingHeuristic,
    /// The variable ordering itself
    pub ordering: VariableOrdering,
    /// How the leader decisions are encoded
    pub encoding: LeaderEncoding,
    /// Time spent computing the variable ordering
    pub ordering_runtime: Duration,
    /// Time spent in the layer compiler
    pub compilation_runtime: Duration,
    /// Time spent in the reducer
    pub reduce_algorithm_runtime: Duration,
    /// The width of the diagram before it got reduced
    pub initial_width: usize,
    /// How the compilation ended
    pub completion: Completion,
}

/// The decision diagram in itself. This structure essentially keeps track
/// of the nodes composing the diagram as well as the arcs connecting these
/// nodes in two vectors (enabling preallocation and good cache locality).
/// In addition to that, it keeps track of the nodes of each layer and of a
/// per-layer map from states to nodes (the `graph_map`) which is used to
/// merge equivalent nodes while compiling.
#[derive(Debug, Clone)]
pub struct DecisionDiagram {
    pub(crate) nodes: Vec<Node>,
    pub(crate) arcs: Vec<Arc>,
    pub(crate) layers: Vec<Vec<NodeId>>,
    pub(crate) graph_map: Vec<FxHashMap<State, NodeId>>,
    pub(crate) root: Option<NodeId>,
    pub(crate) sink: Option<NodeId>,
    pub(crate) max_nodes: usize,
    pub(crate) max_arcs: usize,
    pub(crate) metadata: Metadata,
}

/// These macro retrieve an element of the dd by its id
macro_rules! get {
    (    node $id:expr, $dd:expr) => {&    $dd.nodes[$id.0]};
    (mut node $id:expr, $dd:expr) => {&mut $dd.nodes[$id.0]};
    (    arc  $id:expr, $dd:expr) => {&    $dd.arcs [$id.0]};
    (mut arc  $id:expr, $dd:expr) => {&mut $dd.arcs [$id.0]};
}
pub(crate) use get;

impl DecisionDiagram {
    /// Creates an empty diagram spanning the given number of layers
    /// (root and sink layers included).
    pub fn new(nb_layers: usize, max_nodes: usize, max_arcs: usize) -> Self {
        Self {
            nodes: vec![],
            arcs: vec![],
            layers: vec![vec![]; nb_layers],
            graph_map: vec![FxHashMap::default(); nb_layers],
            root: None,
            sink: None,
            max_nodes,
            max_arcs,
            metadata: Metadata::default(),
        }
    }

    /// Creates an empty diagram with the same shape, limits and metadata as
    /// this one. This is used by the passes producing a fresh copy.
    pub(crate) fn empty_like(&self) -> Self {
        let mut dd = Self::new(self.layers.len(), self.max_nodes, self.max_arcs);
        dd.metadata = self.metadata.clone();
        dd
    }

    // --- QUERIES ------------------------------------------------------------
    /// The root node (if the diagram is not empty)
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }
    /// The sink node (if the diagram is not empty)
    pub fn sink(&self) -> Option<NodeId> {
        self.sink
    }
    pub fn node(&self, id: NodeId) -> &Node {
        get!(node id, self)
    }
    pub fn arc(&self, id: ArcId) -> &Arc {
        get!(arc id, self)
    }
    /// The ids of the arcs pointing at the given node
    pub fn incoming(&self, id: NodeId) -> &[ArcId] {
        &get!(node id, self).incoming
    }
    /// The ids of the arcs leaving the given node
    pub fn outgoing(&self, id: NodeId) -> &[ArcId] {
        &get!(node id, self).outgoing
    }
    /// The live nodes of the given layer
    pub fn nodes_at(&self, layer: usize) -> &[NodeId] {
        self.layers.get(layer).map(|l| l.as_slice()).unwrap_or(&[])
    }
    /// The number of layers of the diagram (root and sink included)
    pub fn nb_layers(&self) -> usize {
        self.layers.len()
    }
    /// Iterates over all the live nodes of the diagram
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate()
            .filter(|(_, n)| !n.flags.is_deleted())
            .map(|(i, n)| (NodeId(i), n))
    }
    /// Iterates over all the live arcs of the diagram
    pub fn arcs(&self) -> impl Iterator<Item = (ArcId, &Arc)> + '_ {
        self.arcs.iter().enumerate()
            .filter(|(_, a)| self.is_live(a))
            .map(|(i, a)| (ArcId(i), a))
    }
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }
    pub fn arc_count(&self) -> usize {
        self.arcs().count()
    }
    /// The number of nodes of the largest layer
    pub fn width(&self) -> usize {
        self.layers.iter().map(|l| l.len()).max().unwrap_or(0)
    }
    pub fn layer_width(&self, layer: usize) -> usize {
        self.nodes_at(layer).len()
    }
    /// The number of nodes having at least two incoming arcs
    pub fn num_merges(&self) -> usize {
        self.nodes()
            .filter(|(_, n)| n.incoming.iter().filter(|a| self.is_live(get!(arc a, self))).count() >= 2)
            .count()
    }
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
    pub fn is_partial(&self) -> bool {
        self.metadata.completion.is_partial
    }
    /// Follows the path encoding the given follower assignment (indexed by
    /// variable id) from the root down to the sink. Returns the arcs of that
    /// path, or None when the assignment is not represented in the diagram.
    ///
    /// Past the follower layers, the path is completed with the leader arcs
    /// (the compressed terminal arc, or the first surviving leader arc of
    /// every leader layer) and with the closing long arc when there is one.
    pub fn trace(&self, values: &[u8]) -> Option<Vec<ArcId>> {
        let order = &self.metadata.ordering.follower;
        if values.len() != order.len() {
            return None;
        }
        let sink = self.sink?;
        let mut current = self.root?;
        let mut path = Vec::with_capacity(self.layers.len());

        for var in order.iter() {
            let value = values[var.id()];
            let arc = get!(node current, self).outgoing.iter().copied().find(|a| {
                let arc = get!(arc a, self);
                arc.player == Player::Follower && arc.var == Some(*var) && arc.value == value
            })?;
            path.push(arc);
            current = get!(arc arc, self).head;
        }
        while current != sink {
            let outgoing = &get!(node current, self).outgoing;
            let arc = outgoing.iter().copied().find(|a| get!(arc a, self).player == Player::Leader)
                .or_else(|| outgoing.iter().copied().find(|a| get!(arc a, self).player == Player::Neither))?;
            path.push(arc);
            current = get!(arc arc, self).head;
        }
        Some(path)
    }

    // --- MUTATIONS ----------------------------------------------------------
    /// Returns true iff both endpoints of the arc are still part of the dd
    pub(crate) fn is_live(&self, arc: &Arc) -> bool {
        !get!(node arc.tail, self).flags.is_deleted() && !get!(node arc.head, self).flags.is_deleted()
    }
    /// Looks for a node having the given state at the given layer
    pub(crate) fn find(&self, layer: usize, state: &State) -> Option<NodeId> {
        self.graph_map[layer].get(state).copied()
    }
    /// Appends a node to the dd and indexes it in its layer
    pub(crate) fn add_node(&mut self, node: Node) -> Result<NodeId, Error> {
        if self.nodes.len() >= self.max_nodes {
            return Err(Error::DiagramTooLarge {
                nodes: self.nodes.len() + 1,
                arcs : self.arcs.len(),
                limit: self.max_nodes,
            });
        }
        let id = NodeId(self.nodes.len());
        self.layers[node.layer].push(id);
        self.graph_map[node.layer].insert(node.state.clone(), id);
        self.nodes.push(node);
        Ok(id)
    }
    /// Appends an arc to the dd and registers it with both its endpoints
    pub(crate) fn add_arc(&mut self, arc: Arc) -> Result<ArcId, Error> {
        if self.arcs.len() >= self.max_arcs {
            return Err(Error::DiagramTooLarge {
                nodes: self.nodes.len(),
                arcs : self.arcs.len() + 1,
                limit: self.max_arcs,
            });
        }
        let id = ArcId(self.arcs.len());
        get!(mut node arc.tail, self).outgoing.push(id);
        get!(mut node arc.head, self).incoming.push(id);
        self.arcs.push(arc);
        Ok(id)
    }
    /// Removes a node from its layer. Its incoming arcs are detached from
    /// their tails; the arena slots are left in place.
    pub(crate) fn drop_node(&mut self, id: NodeId) {
        let node = get!(mut node id, self);
        node.flags.set_deleted(true);
        let layer = node.layer;
        let state = node.state.clone();
        let incoming = std::mem::take(&mut node.incoming);

        for a in incoming {
            let tail = get!(arc a, self).tail;
            get!(mut node tail, self).outgoing.retain(|x| *x != a);
        }
        self.layers[layer].retain(|x| *x != id);
        if self.graph_map[layer].get(&state) == Some(&id) {
            self.graph_map[layer].remove(&state);
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
