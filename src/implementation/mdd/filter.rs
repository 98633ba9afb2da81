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

//! This module provides the reachability filter. Merging and width
//! restriction may leave nodes which are no longer connected to the sink (or
//! to the root). The filter produces a fresh copy of a diagram which only
//! retains the nodes lying on some root to sink path.

use std::collections::VecDeque;
use std::time::Instant;

use log::info;

use crate::{DecisionDiagram, Error, Node, NodeFlags, NodeId};
use super::diagram::get;

/// Returns a copy of the given diagram containing exactly the nodes and arcs
/// reachable by following incoming arcs backwards from the sink, and which
/// are themselves reachable from the root. The states of the copy share
/// nothing with the original.
pub fn filter(mut dd: DecisionDiagram) -> Result<DecisionDiagram, Error> {
    let start = Instant::now();
    let (root, sink) = match (dd.root, dd.sink) {
        (Some(root), Some(sink)) => (root, sink),
        _ => return Ok(dd.empty_like()),
    };

    // backwards, from the sink
    let mut queue = VecDeque::new();
    get!(mut node sink, dd).flags.set_marked(true);
    queue.push_back(sink);
    while let Some(id) = queue.pop_front() {
        for a in get!(node id, dd).incoming.clone() {
            let tail = get!(arc a, dd).tail;
            let node = get!(mut node tail, dd);
            if !node.flags.is_deleted() && !node.flags.is_marked() {
                node.flags.set_marked(true);
                queue.push_back(tail);
            }
        }
    }

    // forwards, from the root (layer by layer, among the marked nodes)
    let mut kept = vec![false; dd.nodes.len()];
    kept[root.0] = get!(node root, dd).flags.is_marked();
    for layer in dd.layers.iter() {
        for id in layer.iter() {
            if !kept[id.0] {
                continue;
            }
            for a in get!(node id, dd).outgoing.iter() {
                let head = get!(arc a, dd).head;
                kept[head.0] |= get!(node head, dd).flags.is_marked();
            }
        }
    }

    let mut out = dd.empty_like();
    let mut mapping: Vec<Option<NodeId>> = vec![None; dd.nodes.len()];
    for layer in dd.layers.iter() {
        for id in layer.iter().filter(|id| kept[id.0]) {
            let node = get!(node id, dd);
            let mut copy = Node::new(node.state.deep_copy(), node.layer, node.leader_cost, node.follower_cost);
            copy.flags = NodeFlags::new(node.flags.is_pinned());
            mapping[id.0] = Some(out.add_node(copy)?);
        }
    }
    for arc in dd.arcs.iter() {
        if let (Some(tail), Some(head)) = (mapping[arc.tail.0], mapping[arc.head.0]) {
            let mut copy = arc.clone();
            copy.tail = tail;
            copy.head = head;
            out.add_arc(copy)?;
        }
    }
    out.root = mapping[root.0];
    out.sink = mapping[sink.0];

    info!("filtered: {} nodes, {} arcs kept out of {} and {} in {:?}",
        out.node_count(), out.arc_count(), dd.node_count(), dd.arc_count(), start.elapsed());
    Ok(out)
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
