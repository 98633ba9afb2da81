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

//! Compiles the follower problem of a small knapsack interdiction instance
//! with every discard policy and prints a summary of the resulting diagrams.
//!
//! Run with `cargo run --example toy`.

use std::time::Duration;

use bilevel_dd::*;

fn instance() -> Result<BilevelInstance, Error> {
    // The leader interdicts items 0 and 2, the follower packs at most three
    // items in a knapsack of capacity 6.
    let data = InstanceData {
        c_matrix: vec![
            vec![6, 0],
            vec![0, 6],
            vec![0, 0],
        ],
        d_matrix: vec![
            vec![1, 0, 0, 0, 0],
            vec![0, 0, 1, 0, 0],
            vec![3, 2, 2, 1, 4],
        ],
        b_rhs: vec![6, 6, 6],
        c_leader: vec![1, 1],
        c_follower: vec![-5, -3, -4, -1, -6],
        d: vec![-5, -3, -4, -1, -6],
        ..Default::default()
    };
    BilevelInstance::new("interdiction", data)
}

fn main() -> Result<(), Error> {
    let _ = simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let instance = instance()?;
    let seeds = vec![vec![0, 1, 1, 1, 0]];
    let budget = TimeBudget::new(Duration::from_secs(10));

    for policy in ["cost-weighted", "state-bound", "random", "diversity-aware/state-bound"] {
        let config = CompilationConfigBuilder::default()
            .max_width(Some(3))
            .ordering(OrderingHeuristic::MaxConnectedDegree)
            .discard(policy.parse()?)
            .seed(7)
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        let input = CompilationInput {
            instance: &instance,
            config: &config,
            seeds: &seeds,
            cutoff: &budget,
            cache: None,
        };
        let dd = build_diagram(&input)?;
        let meta = dd.metadata();
        println!(
            "{policy:<28} nodes {:>3} arcs {:>3} width {} (initial {}) merges {} seed kept {} in {:?}",
            dd.node_count(),
            dd.arc_count(),
            dd.width(),
            meta.initial_width,
            dd.num_merges(),
            dd.trace(&seeds[0]).is_some(),
            meta.compilation_runtime + meta.reduce_algorithm_runtime,
        );
    }
    Ok(())
}
