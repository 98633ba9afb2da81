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

//! This module provides the layer compiler: the construction loop which
//! unrolls the follower problem of a bilevel instance into a (possibly width
//! restricted) decision diagram.
//!
//! Layer `0` holds the root. Layers `1..=nF` each commit one follower variable.
//! Depending on the leader encoding, the leader decisions are then either
//! compressed into one annotated arc per terminal node, or unrolled in one
//! explicit layer per leader variable. The last layer holds the sink.

use std::time::Instant;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{Arc, BilevelInstance, CompilationConfig, Completion, Cutoff, DecisionDiagram, DiscardContext, Error, LeaderEncoding, Node, NodeId, Player, Reason, RowOwnership, State, Variable, VariableOrdering};
use super::diagram::get;

/// Compiles the follower problem of the given instance into a decision
/// diagram. The returned diagram is raw: it may contain nodes that cannot
/// reach the sink. See `filter` and `reduce` to clean it up.
///
/// The seed assignments are compiled first, as explicit root to terminal
/// paths whose nodes always survive the width restriction. A seed that
/// violates the completion bounds or a known value is skipped.
pub fn compile(
    instance: &BilevelInstance,
    config: &CompilationConfig,
    ordering: &VariableOrdering,
    seeds: &[Vec<u8>],
    cutoff: &dyn Cutoff,
) -> Result<DecisionDiagram, Error> {
    config.check()?;
    if ordering.follower.len() != instance.nb_follower_vars() || ordering.leader.len() != instance.nb_leader_vars() {
        return Err(Error::config(format!(
            "the ordering covers {} leader and {} follower variables, expected {} and {}",
            ordering.leader.len(), ordering.follower.len(),
            instance.nb_leader_vars(), instance.nb_follower_vars())));
    }

    let start = Instant::now();
    let mut compiler = Compiler::new(instance, config, ordering, cutoff);
    compiler.compile(seeds)?;
    let mut dd = compiler.dd;
    dd.metadata.compilation_runtime = start.elapsed();

    info!("compiled {} ({} encoding): {} nodes, {} arcs, width {}, partial {} in {:?}",
        instance.name(), config.encoding, dd.node_count(), dd.arc_count(), dd.width(),
        dd.is_partial(), dd.metadata.compilation_runtime);
    Ok(dd)
}

/// The state of an ongoing compilation
struct Compiler<'a> {
    instance: &'a BilevelInstance,
    config: &'a CompilationConfig,
    ordering: &'a VariableOrdering,
    cutoff: &'a dyn Cutoff,
    /// The diagram being built
    dd: DecisionDiagram,
    /// bounds[l][i] is the best case contribution to row `i` of the variables
    /// which are still undecided in layer `l`.
    bounds: Vec<Vec<isize>>,
    /// The layer of the sink
    sink_layer: usize,
    rng: ChaCha8Rng,
    restricted: bool,
}

impl<'a> Compiler<'a> {
    fn new(
        instance: &'a BilevelInstance,
        config: &'a CompilationConfig,
        ordering: &'a VariableOrdering,
        cutoff: &'a dyn Cutoff,
    ) -> Self {
        let leader_layers = match config.encoding {
            LeaderEncoding::Compressed => 0,
            LeaderEncoding::Full       => ordering.leader.len(),
        };
        let sink_layer = ordering.follower.len() + leader_layers + 1;

        let mut compiler = Self {
            instance,
            config,
            ordering,
            cutoff,
            dd: DecisionDiagram::new(sink_layer + 1, config.max_nodes, config.max_arcs),
            bounds: vec![],
            sink_layer,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            restricted: false,
        };
        compiler.bounds = compiler.completion_bounds();
        compiler
    }

    /// The player and variable committed in the given layer
    fn decision_at(&self, layer: usize) -> (Player, Variable) {
        let n_follower = self.ordering.follower.len();
        if layer <= n_follower {
            (Player::Follower, self.ordering.follower[layer - 1])
        } else {
            (Player::Leader, self.ordering.leader[layer - n_follower - 1])
        }
    }

    /// The coefficient of the given player's variable on some row
    fn coef(&self, player: Player, row: usize, var: Variable) -> isize {
        match player {
            Player::Follower => self.instance.d(row, var),
            _                => self.instance.c(row, var),
        }
    }

    /// Computes the completion bounds of every layer. The bound starts with
    /// the best case of all variables and, layer after layer, loses the best
    /// case of the variable which got committed.
    fn completion_bounds(&self) -> Vec<Vec<isize>> {
        let inst = self.instance;
        let tracked = |i: usize| inst.ownership(i).is_tracked();

        let mut current: Vec<isize> = (0..inst.nb_rows())
            .map(|i| {
                if !tracked(i) {
                    return 0;
                }
                let leader: isize = (0..inst.nb_leader_vars()).map(|j| inst.c(i, Variable(j)).min(0)).sum();
                let follower: isize = (0..inst.nb_follower_vars()).map(|j| inst.d(i, Variable(j)).min(0)).sum();
                leader + follower
            })
            .collect();

        let mut bounds = Vec::with_capacity(self.sink_layer + 1);
        bounds.push(current.clone());
        for layer in 1..self.sink_layer {
            let (player, var) = self.decision_at(layer);
            for (i, b) in current.iter_mut().enumerate() {
                if tracked(i) {
                    *b -= self.coef(player, i, var).min(0);
                }
            }
            bounds.push(current.clone());
        }
        bounds.push(current);
        bounds
    }

    /// Returns true iff the given state may still be completed into an
    /// assignment satisfying all the tracked rows.
    fn is_feasible(&self, state: &State, layer: usize) -> bool {
        let bounds = &self.bounds[layer];
        (0..state.len()).all(|i| {
            !self.instance.ownership(i).is_tracked()
                || state[i] + bounds[i] <= self.instance.rhs(i)
        })
    }

    /// Returns the state reached when assigning `value` to the variable
    /// committed in `layer`, or None when that child must be pruned.
    fn transition(&self, state: &State, layer: usize, value: u8) -> Option<State> {
        let (player, var) = self.decision_at(layer);
        if player == Player::Follower {
            if let Some(known) = self.instance.known_value(var) {
                if known != value {
                    return None;
                }
            }
        }
        let next = if value == 0 {
            state.clone()
        } else {
            state.add_column(|row| self.coef(player, row, var))
        };
        if self.is_feasible(&next, layer) {
            Some(next)
        } else {
            None
        }
    }

    /// The arc connecting a node of layer `layer - 1` to its child
    fn decision_arc(&self, tail: NodeId, head: NodeId, layer: usize, value: u8) -> Arc {
        let (player, var) = self.decision_at(layer);
        let (leader_cost, follower_cost) = match (player, value) {
            (_, 0)                => (0, 0),
            (Player::Follower, _) => (self.instance.leader_obj_of_follower(var), self.instance.follower_obj(var)),
            _                     => (self.instance.leader_obj(var), 0),
        };
        Arc {
            tail,
            head,
            value,
            player,
            var: Some(var),
            follower_cost,
            leader_cost,
            block_values: None,
        }
    }

    /// Creates (or reuses) the child of `from` for the given value and
    /// connects it. Returns the id of the child, or None if it was pruned.
    fn branch(&mut self, from: NodeId, layer: usize, value: u8, pin: bool) -> Result<Option<NodeId>, Error> {
        let parent = get!(node from, self.dd);
        let (p_leader, p_follower) = (parent.leader_cost, parent.follower_cost);
        let next = match self.transition(&parent.state, layer, value) {
            Some(state) => state,
            None => return Ok(None),
        };
        // the outgoing arc already exists when a seed went through this node
        let existing = parent.outgoing.iter()
            .map(|a| get!(arc a, self.dd))
            .find(|a| a.value == value && a.var.is_some())
            .map(|a| (a.head, a.leader_cost, a.follower_cost));
        if let Some((head, a_leader, a_follower)) = existing {
            // the parent may have become cheaper since the seed went through
            let child = get!(mut node head, self.dd);
            child.relax_costs(p_leader + a_leader, p_follower + a_follower);
            if pin {
                child.flags.set_pinned(true);
            }
            return Ok(Some(head));
        }

        let mut arc = self.decision_arc(from, NodeId(usize::MAX), layer, value);
        let leader_cost   = p_leader   + arc.leader_cost;
        let follower_cost = p_follower + arc.follower_cost;

        let head = match self.dd.find(layer, &next) {
            Some(id) => {
                get!(mut node id, self.dd).relax_costs(leader_cost, follower_cost);
                id
            },
            None => self.dd.add_node(Node::new(next, layer, leader_cost, follower_cost))?,
        };
        if pin {
            get!(mut node head, self.dd).flags.set_pinned(true);
        }
        arc.head = head;
        self.dd.add_arc(arc)?;
        Ok(Some(head))
    }

    fn compile(&mut self, seeds: &[Vec<u8>]) -> Result<(), Error> {
        let root_state = State::root(self.instance.interaction().iter().map(|o| o.is_tracked()));
        let root = self.dd.add_node(Node::new(root_state, 0, 0, 0))?;
        self.dd.root = Some(root);

        self.compile_seeds(root, seeds)?;

        let last = self.sink_layer - 1;
        let mut completion = Completion::default();
        for layer in 1..=last {
            if self.cutoff.must_stop() {
                info!("cutoff occurred before layer {layer} of {last}");
                completion.is_partial = true;
                completion.reason = Some(Reason::CutoffOccurred);
                self.close_partial(layer - 1)?;
                break;
            }
            let frontier = self.dd.layers[layer - 1].clone();
            for id in frontier {
                self.branch(id, layer, 0, false)?;
                self.branch(id, layer, 1, false)?;
            }
            self.restrict(layer);

            let (player, var) = self.decision_at(layer);
            debug!("layer {layer} ({player} {}): width {}, bounds {:?}",
                var.id(), self.dd.layers[layer].len(), self.bounds[layer]);
        }

        if !completion.is_partial {
            match self.config.encoding {
                LeaderEncoding::Compressed => self.close_compressed(last)?,
                LeaderEncoding::Full       => self.close_full(last)?,
            }
        }

        let big_m = self.config.big_m.unwrap_or_else(|| self.instance.follower_value_bound());
        let sink = self.sink()?;
        self.dd.add_arc(Arc::long(root, sink, big_m))?;
        self.settle_sink_costs(sink);

        completion.is_restricted = self.restricted;
        let meta = &mut self.dd.metadata;
        meta.max_width = self.config.max_width;
        meta.ordering_heuristic = self.config.ordering;
        meta.ordering = self.ordering.clone();
        meta.encoding = self.config.encoding;
        meta.completion = completion;
        Ok(())
    }

    /// Compiles every seed as an explicit path starting at the root
    fn compile_seeds(&mut self, root: NodeId, seeds: &[Vec<u8>]) -> Result<(), Error> {
        let n = self.ordering.follower.len();
        for (k, seed) in seeds.iter().enumerate() {
            if seed.len() != n {
                return Err(Error::config(format!("seed {k} has {} entries, expected {n}", seed.len())));
            }
            if let Some(v) = seed.iter().find(|v| **v > 1) {
                return Err(Error::config(format!("seed {k} holds the non binary value {v}")));
            }
            if !self.seed_is_feasible(seed) {
                warn!("seed {k} of {} is skipped: it cannot satisfy the follower rows", self.instance.name());
                continue;
            }
            let mut current = root;
            for layer in 1..=n {
                let (_, var) = self.decision_at(layer);
                match self.branch(current, layer, seed[var.id()], true)? {
                    Some(id) => current = id,
                    None     => break,
                }
            }
        }
        if !seeds.is_empty() {
            debug!("{} seeds compiled, {} nodes pinned", seeds.len(), self.dd.node_count() - 1);
        }
        Ok(())
    }

    fn seed_is_feasible(&self, seed: &[u8]) -> bool {
        let mut state = get!(node NodeId(0), self.dd).state.clone();
        for layer in 1..=self.ordering.follower.len() {
            let (_, var) = self.decision_at(layer);
            match self.transition(&state, layer, seed[var.id()]) {
                Some(next) => state = next,
                None => return false,
            }
        }
        true
    }

    /// Drops the nodes in excess of the maximum width from the given layer.
    /// Pinned nodes are always kept.
    fn restrict(&mut self, layer: usize) {
        let width = match self.config.max_width {
            Some(w) if self.dd.layers[layer].len() > w => w,
            _ => return,
        };
        let (pinned, free): (Vec<NodeId>, Vec<NodeId>) = self.dd.layers[layer].iter().copied()
            .partition(|id| get!(node id, self.dd).flags.is_pinned());

        let instance = self.instance;
        let ctx = DiscardContext { rhs: instance.rhs_vector(), rows: instance.interaction() };
        let room = width.saturating_sub(pinned.len());
        let (_, dropped) = self.config.discard.select(&self.dd, &ctx, free, room, &mut self.rng);

        debug!("layer {layer}: {} discards {} nodes ({} pinned)", self.config.discard, dropped.len(), pinned.len());
        for id in dropped {
            self.dd.drop_node(id);
        }
        self.restricted = true;
    }

    fn sink(&mut self) -> Result<NodeId, Error> {
        match self.dd.sink {
            Some(id) => Ok(id),
            None => {
                let id = self.dd.add_node(Node::new(State::from(vec![]), self.sink_layer, 0, 0))?;
                self.dd.sink = Some(id);
                Ok(id)
            }
        }
    }

    /// Raises an internal consistency error when a terminal node violates
    /// one of the given rows.
    fn sanity_check(&self, layer: usize, rows: impl Fn(RowOwnership) -> bool) -> Result<(), Error> {
        for id in self.dd.layers[layer].iter() {
            let state = &get!(node id, self.dd).state;
            for (row, value) in state.iter().enumerate() {
                let rhs = self.instance.rhs(row);
                if rows(self.instance.ownership(row)) && *value > rhs {
                    return Err(Error::InternalConsistency { layer, node: id.0, row, value: *value, rhs });
                }
            }
        }
        Ok(())
    }

    /// Connects every terminal node to the sink with one leader arc carrying
    /// the block values of the rows shared by both players.
    fn close_compressed(&mut self, last: usize) -> Result<(), Error> {
        self.sanity_check(last, |own| own == RowOwnership::Follower)?;
        let sink = self.sink()?;
        for id in self.dd.layers[last].clone() {
            let state = &get!(node id, self.dd).state;
            let block = (0..state.len())
                .filter(|row| self.instance.ownership(*row) == RowOwnership::Both)
                .map(|row| (row, self.instance.rhs(row) - state[row] + 1))
                .collect();
            self.dd.add_arc(Arc {
                tail: id,
                head: sink,
                value: 0,
                player: Player::Leader,
                var: None,
                follower_cost: 0,
                leader_cost: 0,
                block_values: Some(block),
            })?;
        }
        Ok(())
    }

    /// Connects every node of the last leader layer to the sink
    fn close_full(&mut self, last: usize) -> Result<(), Error> {
        self.sanity_check(last, |own| own.is_tracked())?;
        let sink = self.sink()?;
        for id in self.dd.layers[last].clone() {
            self.dd.add_arc(Arc::long(id, sink, 0))?;
        }
        Ok(())
    }

    /// Connects the frontier of an interrupted compilation to the sink. The
    /// long arcs carry the best case costs of the undecided variables.
    fn close_partial(&mut self, layer: usize) -> Result<(), Error> {
        let (mut leader, mut follower) = (0, 0);
        for l in layer + 1..self.sink_layer {
            match self.decision_at(l) {
                (Player::Follower, var) => {
                    leader   += self.instance.leader_obj_of_follower(var).min(0);
                    follower += self.instance.follower_obj(var).min(0);
                },
                (_, var) => {
                    leader   += self.instance.leader_obj(var).min(0);
                },
            }
        }
        let sink = self.sink()?;
        for id in self.dd.layers[layer].clone() {
            let mut arc = Arc::long(id, sink, follower);
            arc.leader_cost = leader;
            self.dd.add_arc(arc)?;
        }
        Ok(())
    }

    /// The costs of the sink are the cheapest over all its incoming arcs
    fn settle_sink_costs(&mut self, sink: NodeId) {
        let (leader, follower) = get!(node sink, self.dd).incoming.iter()
            .map(|a| {
                let arc  = get!(arc a, self.dd);
                let tail = get!(node arc.tail, self.dd);
                (tail.leader_cost + arc.leader_cost, tail.follower_cost + arc.follower_cost)
            })
            .fold((isize::MAX, isize::MAX), |(l, f), (x, y)| (l.min(x), f.min(y)));
        let node = get!(mut node sink, self.dd);
        node.leader_cost   = leader;
        node.follower_cost = follower;
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_compiler {
    use fxhash::FxHashMap;
    use test_log::test;

    use crate::*;

    /// y0 + y1 + y2 <= 1 (follower row only)
    fn at_most_one(known: &[(usize, u8)]) -> BilevelInstance {
        let data = InstanceData {
            c_matrix: vec![vec![]],
            d_matrix: vec![vec![1, 1, 1]],
            b_rhs: vec![1],
            c_follower: vec![1, 1, 1],
            d: vec![-1, -2, -3],
            known_values: known.iter().copied().collect::<FxHashMap<_, _>>(),
            ..Default::default()
        };
        BilevelInstance::new("at-most-one", data).unwrap()
    }
    /// x0 + y0 <= 1 (row shared by both players)
    fn shared() -> BilevelInstance {
        let data = InstanceData {
            c_matrix: vec![vec![1]],
            d_matrix: vec![vec![1]],
            b_rhs: vec![1],
            c_leader: vec![-1],
            c_follower: vec![0],
            d: vec![-1],
            ..Default::default()
        };
        BilevelInstance::new("shared", data).unwrap()
    }
    fn run(inst: &BilevelInstance, config: &CompilationConfig, seeds: &[Vec<u8>]) -> Result<DecisionDiagram, Error> {
        let ordering = VariableOrdering::new(inst, config.ordering);
        compile(inst, config, &ordering, seeds, &NoCutoff)
    }
    fn states_at(dd: &DecisionDiagram, layer: usize) -> Vec<Vec<isize>> {
        dd.nodes_at(layer).iter().map(|id| dd.node(*id).state.to_vec()).collect()
    }

    struct Always;
    impl Cutoff for Always {
        fn must_stop(&self) -> bool { true }
    }

    #[test]
    fn unbounded_compilation_unrolls_all_feasible_states() {
        let dd = run(&at_most_one(&[]), &CompilationConfig::default(), &[]).unwrap();
        assert_eq!(5, dd.nb_layers());
        assert_eq!(vec![vec![0], vec![1]], states_at(&dd, 1));
        assert_eq!(vec![vec![0], vec![1]], states_at(&dd, 2));
        assert_eq!(vec![vec![0], vec![1]], states_at(&dd, 3));
        assert_eq!(8,  dd.node_count());
        assert_eq!(11, dd.arc_count());
        assert_eq!(Some(NodeId(0)), dd.root());
        assert!(!dd.is_partial());
    }
    #[test]
    fn merged_nodes_keep_the_cheapest_costs() {
        let dd = run(&at_most_one(&[]), &CompilationConfig::default(), &[]).unwrap();
        let one = dd.find(3, &State::from(vec![1])).unwrap();
        assert_eq!(-3, dd.node(one).follower_cost);
        assert_eq!( 1, dd.node(one).leader_cost);
        assert_eq!( 2, dd.incoming(one).len());
        let sink = dd.sink().unwrap();
        assert_eq!(-3, dd.node(sink).follower_cost);
    }
    #[test]
    fn infeasible_children_are_pruned() {
        let dd = run(&at_most_one(&[]), &CompilationConfig::default(), &[]).unwrap();
        assert!(dd.nodes().all(|(_, n)| n.state.iter().all(|v| *v <= 1)));
    }
    #[test]
    fn known_values_forbid_the_other_branch() {
        let dd = run(&at_most_one(&[(2, 0)]), &CompilationConfig::default(), &[]).unwrap();
        assert!(dd.arcs().all(|(_, a)| !(a.var == Some(Variable(2)) && a.value == 1)));
        assert!(dd.arcs().any(|(_, a)| a.var == Some(Variable(2)) && a.value == 0));
    }
    #[test]
    fn a_dummy_arc_connects_the_root_to_the_sink() {
        let dd = run(&at_most_one(&[]), &CompilationConfig::default(), &[]).unwrap();
        let root = dd.root().unwrap();
        let sink = dd.sink().unwrap();
        let dummy: Vec<&Arc> = dd.outgoing(root).iter().map(|a| dd.arc(*a)).filter(|a| a.is_long()).collect();
        assert_eq!(1, dummy.len());
        assert_eq!(sink, dummy[0].head);
        assert_eq!(6, dummy[0].follower_cost);
    }
    #[test]
    fn big_m_can_be_configured() {
        let config = CompilationConfig { big_m: Some(1000), ..Default::default() };
        let dd = run(&at_most_one(&[]), &config, &[]).unwrap();
        assert!(dd.arcs().any(|(_, a)| a.is_long() && a.follower_cost == 1000));
    }
    #[test]
    fn width_restriction_caps_every_layer() {
        let config = CompilationConfig { max_width: Some(1), ..Default::default() };
        let dd = run(&at_most_one(&[]), &config, &[]).unwrap();
        for layer in 0..dd.nb_layers() {
            assert!(dd.layer_width(layer) <= 1);
        }
        // the cheapest child is the one taking y0
        assert_eq!(vec![vec![1]], states_at(&dd, 1));
        assert_eq!(5, dd.node_count());
        assert!(dd.metadata().completion.is_restricted);
    }
    #[test]
    fn compressed_terminal_arcs_carry_block_values() {
        let dd = run(&shared(), &CompilationConfig::default(), &[]).unwrap();
        let mut blocks: Vec<BlockValues> = dd.arcs()
            .filter(|(_, a)| a.player == Player::Leader)
            .filter_map(|(_, a)| a.block_values.clone())
            .collect();
        blocks.sort();
        assert_eq!(vec![vec![(0, 1)], vec![(0, 2)]], blocks);
    }
    #[test]
    fn full_encoding_unrolls_the_leader_variables() {
        let config = CompilationConfig { encoding: LeaderEncoding::Full, ..Default::default() };
        let dd = run(&shared(), &config, &[]).unwrap();
        assert_eq!(4, dd.nb_layers());
        assert_eq!(vec![vec![0], vec![1]], states_at(&dd, 2));
        let leader: Vec<&Arc> = dd.arcs().map(|(_, a)| a).filter(|a| a.player == Player::Leader).collect();
        assert_eq!(3, leader.len());
        assert!(leader.iter().all(|a| a.leader_cost == if a.value == 1 { -1 } else { 0 }));
        assert_eq!(3, dd.arcs().filter(|(_, a)| a.is_long()).count());
    }
    #[test]
    fn a_lying_interaction_is_an_internal_consistency_error() {
        let data = InstanceData {
            c_matrix: vec![vec![-2]],
            d_matrix: vec![vec![1]],
            b_rhs: vec![0],
            c_leader: vec![0],
            c_follower: vec![0],
            d: vec![0],
            interaction: Some(vec![RowOwnership::Follower]),
            ..Default::default()
        };
        let inst = BilevelInstance::new("liar", data).unwrap();
        let err = run(&inst, &CompilationConfig::default(), &[]).unwrap_err();
        assert_eq!(Error::InternalConsistency { layer: 1, node: 2, row: 0, value: 1, rhs: 0 }, err);
    }
    #[test]
    fn the_node_ceiling_aborts_the_compilation() {
        let config = CompilationConfig { max_nodes: 3, ..Default::default() };
        let err = run(&at_most_one(&[]), &config, &[]).unwrap_err();
        assert!(matches!(err, Error::DiagramTooLarge { limit: 3, .. }));
    }
    #[test]
    fn a_zero_width_is_a_configuration_error() {
        let config = CompilationConfig { max_width: Some(0), ..Default::default() };
        assert!(matches!(run(&at_most_one(&[]), &config, &[]), Err(Error::Configuration(_))));
    }
    #[test]
    fn a_mismatching_ordering_is_a_configuration_error() {
        let inst = at_most_one(&[]);
        let ordering = VariableOrdering { leader: vec![], follower: vec![Variable(0)] };
        let res = compile(&inst, &CompilationConfig::default(), &ordering, &[], &NoCutoff);
        assert!(matches!(res, Err(Error::Configuration(_))));
    }
    #[test]
    fn cutoff_yields_a_partial_but_connected_diagram() {
        let inst = at_most_one(&[]);
        let ordering = VariableOrdering::new(&inst, OrderingHeuristic::Lexicographic);
        let dd = compile(&inst, &CompilationConfig::default(), &ordering, &[], &Always).unwrap();
        assert!(dd.is_partial());
        assert_eq!(Some(Reason::CutoffOccurred), dd.metadata().completion.reason);
        assert_eq!(2, dd.node_count());
        assert_eq!(2, dd.arc_count());
        // the long arc closing the frontier carries the best case costs
        assert!(dd.arcs().any(|(_, a)| a.is_long() && a.follower_cost == -6));
    }
    #[test]
    fn seeds_survive_the_width_restriction() {
        let config = CompilationConfig { max_width: Some(1), ..Default::default() };
        let dd = run(&at_most_one(&[]), &config, &[vec![0, 0, 1]]).unwrap();
        assert!(dd.trace(&[0, 0, 1]).is_some());
        assert_eq!(vec![vec![1]], states_at(&dd, 3));
        for layer in 0..dd.nb_layers() {
            assert!(dd.layer_width(layer) <= 1);
        }
    }
    #[test]
    fn infeasible_seeds_are_skipped() {
        let with    = run(&at_most_one(&[]), &CompilationConfig::default(), &[vec![1, 1, 0]]).unwrap();
        let without = run(&at_most_one(&[]), &CompilationConfig::default(), &[]).unwrap();
        assert_eq!(without.node_count(), with.node_count());
        assert_eq!(without.arc_count(),  with.arc_count());
        assert!(with.trace(&[1, 1, 0]).is_none());
    }
    #[test]
    fn seed_children_follow_a_cheaper_parent() {
        // y0 + y1 + y2 <= 1 where y2 brings nothing to the follower
        let data = InstanceData {
            c_matrix: vec![vec![]],
            d_matrix: vec![vec![1, 1, 1]],
            b_rhs: vec![1],
            c_follower: vec![0, 0, 0],
            d: vec![-1, -2, 0],
            ..Default::default()
        };
        let inst = BilevelInstance::new("cheaper-parent", data).unwrap();
        let dd = run(&inst, &CompilationConfig::default(), &[vec![1, 0, 0]]).unwrap();

        // the seed reached [1] at layer 2 through y0 before y1 made it cheaper
        let two = dd.find(2, &State::from(vec![1])).unwrap();
        assert_eq!(-2, dd.node(two).follower_cost);
        let three = dd.find(3, &State::from(vec![1])).unwrap();
        assert_eq!(-2, dd.node(three).follower_cost);

        let root = dd.root().unwrap();
        for (id, node) in dd.nodes().filter(|(id, _)| *id != root) {
            let cheapest = dd.incoming(id).iter()
                .map(|a| dd.arc(*a))
                .map(|a| dd.node(a.tail).follower_cost + a.follower_cost)
                .min()
                .unwrap();
            assert_eq!(cheapest, node.follower_cost);
        }
    }
    #[test]
    fn malformed_seeds_are_a_configuration_error() {
        let inst = at_most_one(&[]);
        let config = CompilationConfig::default();
        assert!(matches!(run(&inst, &config, &[vec![0, 1]]),    Err(Error::Configuration(_))));
        assert!(matches!(run(&inst, &config, &[vec![0, 2, 0]]), Err(Error::Configuration(_))));
    }
}
