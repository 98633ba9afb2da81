#![cfg(test)]
extern crate bilevel_dd;

use std::time::Instant;

use bilevel_dd::*;
use test_log::test;

/// A toy bilevel instance with three follower rows and four follower
/// variables. Rows 0 and 1 are shared with the two leader variables, row 2
/// only involves the follower.
fn toy() -> BilevelInstance {
    let data = InstanceData {
        c_matrix: vec![
            vec![1, 0],
            vec![0, 1],
            vec![0, 0],
        ],
        d_matrix: vec![
            vec![2, 1, 1, 0],
            vec![0, 1, 0, 2],
            vec![1, 1, 1, 1],
        ],
        b_rhs: vec![3, 3, 3],
        c_leader: vec![-1, -1],
        c_follower: vec![1, 2, 1, 3],
        d: vec![-4, -3, -2, -5],
        ..Default::default()
    };
    BilevelInstance::new("toy", data).unwrap()
}

/// Every follower assignment of the toy instance
fn assignments() -> Vec<Vec<u8>> {
    (0..16u8).map(|k| (0..4).map(|j| (k >> j) & 1).collect()).collect()
}

/// True iff the assignment may satisfy the follower rows for some leader
/// decision. The leader coefficients are all nonnegative in the toy.
fn is_feasible(inst: &BilevelInstance, y: &[u8]) -> bool {
    (0..inst.nb_rows()).all(|i| {
        let lhs: isize = y.iter().enumerate().map(|(j, v)| *v as isize * inst.d(i, Variable(j))).sum();
        lhs <= inst.rhs(i)
    })
}

fn build(inst: &BilevelInstance, config: &CompilationConfig, seeds: &[Vec<u8>]) -> DecisionDiagram {
    let input = CompilationInput { instance: inst, config, seeds, cutoff: &NoCutoff, cache: None };
    build_diagram(&input).unwrap()
}

fn raw(inst: &BilevelInstance, config: &CompilationConfig) -> DecisionDiagram {
    let ordering = VariableOrdering::new(inst, config.ordering);
    compile(inst, config, &ordering, &[], &NoCutoff).unwrap()
}

fn follower_values(dd: &DecisionDiagram, path: &[ArcId]) -> Vec<(usize, u8)> {
    path.iter()
        .map(|a| dd.arc(*a))
        .filter(|a| a.player == Player::Follower)
        .map(|a| (a.var.map(|v| v.id()).unwrap_or(usize::MAX), a.value))
        .collect()
}

#[test]
fn width_two_cost_weighted_end_to_end() {
    let inst = toy();
    let config = CompilationConfigBuilder::default()
        .max_width(Some(2))
        .discard("cost-weighted".parse().unwrap())
        .build()
        .unwrap();

    let compiled = raw(&inst, &config);
    let root = compiled.root().unwrap();
    let decisions = compiled.outgoing(root).iter().filter(|a| !compiled.arc(**a).is_long()).count();
    assert!(decisions <= 2);
    assert!(compiled.layer_width(0) < compiled.layer_width(1));
    assert_eq!(2, compiled.layer_width(1));

    let dd = build(&inst, &config, &[]);
    assert!(dd.width() <= 2);
    assert_eq!(1, dd.layer_width(0));
    assert_eq!(1, dd.layer_width(dd.nb_layers() - 1));
    let root = dd.root().unwrap();
    let sink = dd.sink().unwrap();
    assert!(dd.incoming(root).is_empty());
    assert!(dd.outgoing(sink).is_empty());
}

#[test]
fn disjoint_seeds_yield_disjoint_paths() {
    let inst = toy();
    let config = CompilationConfig::default();
    let y1 = vec![1, 0, 1, 0];
    let y2 = vec![0, 1, 0, 1];
    let dd = build(&inst, &config, &[y1.clone(), y2.clone()]);

    let p1 = dd.trace(&y1).unwrap();
    let p2 = dd.trace(&y2).unwrap();
    assert_eq!(vec![(0, 1), (1, 0), (2, 1), (3, 0)], follower_values(&dd, &p1));
    assert_eq!(vec![(0, 0), (1, 1), (2, 0), (3, 1)], follower_values(&dd, &p2));

    // no premature merging: the paths only share the root and the sink
    let heads1: Vec<NodeId> = p1.iter().map(|a| dd.arc(*a).head).collect();
    let heads2: Vec<NodeId> = p2.iter().map(|a| dd.arc(*a).head).collect();
    let sink = dd.sink().unwrap();
    for h in heads1.iter().filter(|h| **h != sink) {
        assert!(!heads2.contains(h));
    }
}

#[test]
fn seeds_are_represented_even_under_the_tightest_width() {
    let inst = toy();
    let seeds = vec![vec![1, 0, 1, 0], vec![0, 1, 0, 1], vec![0, 0, 0, 1]];
    for policy in ["cost-weighted", "state-bound", "random", "diversity-aware"] {
        let config = CompilationConfig { max_width: Some(1), discard: policy.parse().unwrap(), ..Default::default() };
        let dd = build(&inst, &config, &seeds);
        for seed in seeds.iter() {
            assert!(dd.trace(seed).is_some(), "{policy} lost {seed:?}");
        }
    }
}

#[test]
fn unbounded_diagrams_encode_exactly_the_feasible_assignments() {
    let inst = toy();
    for encoding in [LeaderEncoding::Compressed, LeaderEncoding::Full] {
        let config = CompilationConfig { encoding, ..Default::default() };
        let dd = build(&inst, &config, &[]);
        for y in assignments() {
            assert_eq!(is_feasible(&inst, &y), dd.trace(&y).is_some(), "{encoding} {y:?}");
        }
    }
}

#[test]
fn restricted_diagrams_only_encode_feasible_assignments() {
    let inst = toy();
    let config = CompilationConfig { max_width: Some(2), ..Default::default() };
    let dd = build(&inst, &config, &[]);
    assert!(dd.metadata().completion.is_restricted);
    for y in assignments() {
        if dd.trace(&y).is_some() {
            assert!(is_feasible(&inst, &y), "{y:?}");
        }
    }
}

#[test]
fn merged_nodes_hold_the_cheapest_prefix_costs() {
    let inst = toy();
    let dd = raw(&inst, &CompilationConfig::default());
    let root = dd.root().unwrap();
    for (id, node) in dd.nodes().filter(|(id, _)| *id != root) {
        let (leader, follower) = dd.incoming(id).iter()
            .map(|a| dd.arc(*a))
            .map(|a| (dd.node(a.tail).leader_cost + a.leader_cost, dd.node(a.tail).follower_cost + a.follower_cost))
            .fold((isize::MAX, isize::MAX), |(l, f), (x, y)| (l.min(x), f.min(y)));
        assert_eq!(leader,   node.leader_cost);
        assert_eq!(follower, node.follower_cost);
    }
    assert!(dd.num_merges() > 0);
}

#[test]
fn seeded_nodes_hold_the_cheapest_prefix_costs() {
    let inst = toy();
    let ordering = VariableOrdering::new(&inst, OrderingHeuristic::Lexicographic);
    let seeds = vec![vec![1, 0, 0, 0], vec![0, 0, 1, 0]];
    let dd = compile(&inst, &CompilationConfig::default(), &ordering, &seeds, &NoCutoff).unwrap();
    let root = dd.root().unwrap();
    for (id, node) in dd.nodes().filter(|(id, _)| *id != root) {
        let (leader, follower) = dd.incoming(id).iter()
            .map(|a| dd.arc(*a))
            .map(|a| (dd.node(a.tail).leader_cost + a.leader_cost, dd.node(a.tail).follower_cost + a.follower_cost))
            .fold((isize::MAX, isize::MAX), |(l, f), (x, y)| (l.min(x), f.min(y)));
        assert_eq!(leader,   node.leader_cost);
        assert_eq!(follower, node.follower_cost);
    }
}

#[test]
fn an_unsatisfiable_row_leaves_only_the_dummy_arc() {
    let data = InstanceData {
        c_matrix: vec![vec![]],
        d_matrix: vec![vec![1, 1]],
        b_rhs: vec![-1],
        c_follower: vec![1, 1],
        d: vec![-1, -1],
        ..Default::default()
    };
    let inst = BilevelInstance::new("empty", data).unwrap();
    let dd = build(&inst, &CompilationConfig::default(), &[]);

    assert_eq!(2, dd.node_count());
    assert_eq!(1, dd.arc_count());
    let root = dd.root().unwrap();
    let sink = dd.sink().unwrap();
    assert_ne!(root, sink);
    let (_, arc) = dd.arcs().next().unwrap();
    assert_eq!(Player::Neither, arc.player);
    assert_eq!(root, arc.tail);
    assert_eq!(sink, arc.head);
    assert!(dd.trace(&[0, 0]).is_none());
}

#[test]
fn every_node_lies_on_a_root_to_sink_path() {
    let inst = toy();
    for width in [None, Some(1), Some(2), Some(3)] {
        let config = CompilationConfig { max_width: width, reduce: false, ..Default::default() };
        let dd = build(&inst, &config, &[]);
        let root = dd.root().unwrap();
        let sink = dd.sink().unwrap();
        for (id, node) in dd.nodes() {
            assert!(id == root || !node.incoming_arcs().is_empty());
            assert!(id == sink || !node.outgoing_arcs().is_empty());
        }
        for (_, arc) in dd.arcs() {
            assert!(arc.tail.0 < dd.node_count() && arc.head.0 < dd.node_count());
        }
    }
}

#[test]
fn width_bound_holds_for_every_policy() {
    let inst = toy();
    let policies = ["cost-weighted", "state-bound", "random", "diversity-aware", "diversity-aware/state-bound"];
    for policy in policies {
        for width in 1..=3 {
            for encoding in [LeaderEncoding::Compressed, LeaderEncoding::Full] {
                let config = CompilationConfig {
                    max_width: Some(width),
                    discard: policy.parse().unwrap(),
                    encoding,
                    seed: 7,
                    ..Default::default()
                };
                let dd = build(&inst, &config, &[]);
                for layer in 0..dd.nb_layers() {
                    assert!(dd.layer_width(layer) <= width, "{policy} {width} {encoding}");
                }
            }
        }
    }
}

#[test]
fn reduction_is_idempotent_and_never_widens() {
    let inst = toy();
    for ordering in ["lexicographic", "cost", "row-degree", "feasibility-risk", "max-connected-degree"] {
        let config = CompilationConfig { ordering: ordering.parse().unwrap(), reduce: false, ..Default::default() };
        let filtered = build(&inst, &config, &[]);
        let once  = reduce(filtered.clone()).unwrap();
        let twice = reduce(once.clone()).unwrap();

        assert!(once.width() <= filtered.width());
        assert_eq!(once.node_count(), twice.node_count());
        assert_eq!(once.arc_count(),  twice.arc_count());
        for layer in 0..once.nb_layers() {
            assert_eq!(once.nodes_at(layer), twice.nodes_at(layer));
        }
    }
}

#[test]
fn the_random_policy_is_reproducible() {
    let inst = toy();
    let config = CompilationConfig { max_width: Some(2), discard: "random".parse().unwrap(), seed: 42, ..Default::default() };
    let a = build(&inst, &config, &[]);
    let b = build(&inst, &config, &[]);
    assert_eq!(a.node_count(), b.node_count());
    for y in assignments() {
        assert_eq!(a.trace(&y).is_some(), b.trace(&y).is_some());
    }
}

#[test]
fn an_elapsed_deadline_yields_a_partial_result() {
    let inst = toy();
    let config = CompilationConfig::default();
    let cutoff = TimeBudget::until(Instant::now());
    let input = CompilationInput { instance: &inst, config: &config, seeds: &[], cutoff: &cutoff, cache: None };
    let dd = build_diagram(&input).unwrap();
    assert!(dd.is_partial());
    assert_eq!(Some(Reason::CutoffOccurred), dd.metadata().completion.reason);
    assert_eq!(Some(dd.sink().unwrap()), dd.outgoing(dd.root().unwrap()).first().map(|a| dd.arc(*a).head));
}

#[test]
fn the_safety_ceiling_is_fatal() {
    let inst = toy();
    let config = CompilationConfig { max_nodes: 5, ..Default::default() };
    let input = CompilationInput { instance: &inst, config: &config, seeds: &[], cutoff: &NoCutoff, cache: None };
    assert!(matches!(build_diagram(&input), Err(Error::DiagramTooLarge { .. })));

    let config = CompilationConfig { max_arcs: 5, ..Default::default() };
    let input = CompilationInput { instance: &inst, config: &config, seeds: &[], cutoff: &NoCutoff, cache: None };
    assert!(matches!(build_diagram(&input), Err(Error::DiagramTooLarge { .. })));
}

#[test]
fn configuration_errors_are_surfaced() {
    assert!(matches!("alphabetical".parse::<OrderingHeuristic>(), Err(Error::Configuration(_))));
    assert!(matches!("largest".parse::<DiscardPolicy>(), Err(Error::Configuration(_))));

    let inst = toy();
    let config = CompilationConfig::default();
    let input = CompilationInput { instance: &inst, config: &config, seeds: &[vec![1, 0]], cutoff: &NoCutoff, cache: None };
    assert!(matches!(build_diagram(&input), Err(Error::Configuration(_))));
}
