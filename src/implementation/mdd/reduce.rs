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

//! This module provides the reducer. It canonicalizes a clean diagram by
//! merging, bottom-up, the nodes of a layer which have the very same
//! outgoing arcs (same values, same owner, same heads and same terminal
//! annotations). Once a layer is merged, the arcs of the layer above point
//! to the surviving nodes only, which is what makes its parents comparable.

use std::time::Instant;

use fxhash::FxHashSet;
use log::{debug, info};

use crate::{BlockValues, DecisionDiagram, Error, Node, NodeFlags, NodeId, Player};
use super::diagram::get;

/// What a node looks like from below: the sorted list of its outgoing arcs
type Signature = Vec<(u8, Player, NodeId, Option<BlockValues>)>;

/// Returns the signature of the given node
pub(crate) fn signature(dd: &DecisionDiagram, id: NodeId) -> Signature {
    let mut sig: Signature = get!(node id, dd).outgoing.iter()
        .map(|a| get!(arc a, dd))
        .filter(|a| dd.is_live(a))
        .map(|a| (a.value, a.player, a.head, a.block_values.clone()))
        .collect();
    sig.sort();
    sig.dedup();
    sig
}

/// Returns a reduced copy of the given diagram. The reduced diagram has no
/// two nodes at the same layer with identical signatures, its width is never
/// larger than that of the input, and reducing it again changes nothing.
///
/// When nodes get merged, the survivor keeps the cheapest costs of the group.
pub fn reduce(mut dd: DecisionDiagram) -> Result<DecisionDiagram, Error> {
    let start = Instant::now();
    let (root, sink) = match (dd.root, dd.sink) {
        (Some(root), Some(sink)) => (root, sink),
        _ => return Ok(dd.empty_like()),
    };
    let width_before = dd.width();

    let mut merged = 0;
    for layer in (0..get!(node sink, dd).layer).rev() {
        let mut keyed: Vec<(Signature, NodeId)> = dd.layers[layer].iter()
            .filter(|id| !get!(node id, dd).flags.is_deleted())
            .map(|id| (signature(&dd, *id), *id))
            .collect();
        keyed.sort();

        let mut survivor: Option<&(Signature, NodeId)> = None;
        for entry in keyed.iter() {
            match survivor {
                Some(s) if s.0 == entry.0 => {
                    merge_into(&mut dd, entry.1, s.1);
                    merged += 1;
                },
                _ => survivor = Some(entry),
            }
        }
        debug!("reduce layer {layer}: {} nodes, {merged} merged so far", keyed.len());
    }

    let out = compact(&dd, root, sink)?;
    info!("reduced: {merged} nodes merged, width {width_before} -> {}, {} nodes, {} arcs in {:?}",
        out.width(), out.node_count(), out.arc_count(), start.elapsed());
    Ok(out)
}

/// Redirects all incoming arcs of `from` to `into` and deletes `from`
fn merge_into(dd: &mut DecisionDiagram, from: NodeId, into: NodeId) {
    let node = get!(mut node from, dd);
    node.flags.set_deleted(true);
    let incoming = std::mem::take(&mut node.incoming);
    let (leader, follower, pinned) = (node.leader_cost, node.follower_cost, node.flags.is_pinned());

    for a in incoming.iter() {
        get!(mut arc a, dd).head = into;
    }
    let survivor = get!(mut node into, dd);
    survivor.incoming.extend(incoming);
    survivor.relax_costs(leader, follower);
    if pinned {
        survivor.flags.set_pinned(true);
    }
}

/// Copies the live part of the diagram, dropping the duplicate arcs
fn compact(dd: &DecisionDiagram, root: NodeId, sink: NodeId) -> Result<DecisionDiagram, Error> {
    let mut out = dd.empty_like();
    let mut mapping: Vec<Option<NodeId>> = vec![None; dd.nodes.len()];
    for layer in dd.layers.iter() {
        for id in layer.iter() {
            let node = get!(node id, dd);
            if node.flags.is_deleted() {
                continue;
            }
            let mut copy = Node::new(node.state.deep_copy(), node.layer, node.leader_cost, node.follower_cost);
            copy.flags = NodeFlags::new(node.flags.is_pinned());
            mapping[id.0] = Some(out.add_node(copy)?);
        }
    }

    let mut seen = FxHashSet::default();
    for arc in dd.arcs.iter() {
        if let (Some(tail), Some(head)) = (mapping[arc.tail.0], mapping[arc.head.0]) {
            let mut copy = arc.clone();
            copy.tail = tail;
            copy.head = head;
            if seen.insert(copy.clone()) {
                out.add_arc(copy)?;
            }
        }
    }
    out.root = mapping[root.0];
    out.sink = mapping[sink.0];
    Ok(out)
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
