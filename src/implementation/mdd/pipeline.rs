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

//! This module chains the passes producing a decision diagram out of a
//! bilevel instance: ordering, compilation, filtering and reduction.

use std::time::Instant;

use log::{debug, info};

use crate::{compile, filter, reduce, BilevelInstance, CompilationConfig, Cutoff, DecisionDiagram, Error, SampleCache, VariableOrdering};

/// The input of a diagram construction
#[derive(Clone, Copy)]
pub struct CompilationInput<'a> {
    /// The instance whose follower problem gets compiled
    pub instance: &'a BilevelInstance,
    /// The compilation parameters
    pub config: &'a CompilationConfig,
    /// Follower assignments (indexed by variable) that must be represented
    /// in the diagram
    pub seeds: &'a [Vec<u8>],
    /// Tells the compiler when to give up
    pub cutoff: &'a dyn Cutoff,
    /// When present, the seeds cached for the instance are compiled along
    /// with the explicit ones
    pub cache: Option<&'a SampleCache>,
}

/// Orders the variables, compiles the diagram, filters it and (unless told
/// otherwise by the configuration) reduces it. The time spent in each step
/// is recorded in the metadata of the returned diagram.
///
/// # Example
/// ```
/// # use bilevel_dd::*;
/// // y0 + y1 <= 1
/// let data = InstanceData {
///     c_matrix: vec![vec![]],
///     d_matrix: vec![vec![1, 1]],
///     b_rhs: vec![1],
///     c_follower: vec![0, 0],
///     d: vec![-1, -1],
///     ..Default::default()
/// };
/// let instance = BilevelInstance::new("doc", data).unwrap();
/// let config = CompilationConfigBuilder::default().max_width(Some(2)).build().unwrap();
///
/// let mut cache = SampleCache::new();
/// cache.seeds_for(&instance, |_| vec![vec![0, 1]]);
///
/// let input = CompilationInput { instance: &instance, config: &config, seeds: &[], cutoff: &NoCutoff, cache: Some(&cache) };
/// let dd = build_diagram(&input).unwrap();
///
/// assert!(dd.width() <= 2);
/// assert!(dd.trace(&[0, 1]).is_some());
/// assert!(dd.trace(&[1, 1]).is_none());
/// ```
pub fn build_diagram(input: &CompilationInput) -> Result<DecisionDiagram, Error> {
    input.config.check()?;

    let start = Instant::now();
    let ordering = VariableOrdering::new(input.instance, input.config.ordering);
    let ordering_runtime = start.elapsed();
    debug!("{} ordering: leader {:?}, follower {:?}", input.config.ordering, ordering.leader, ordering.follower);

    let cached = input.cache.and_then(|cache| cache.get(input.instance.name()));
    let seeds = match cached {
        Some(cached) => input.seeds.iter().chain(cached.iter()).cloned().collect(),
        None         => input.seeds.to_vec(),
    };
    debug!("{} seeds ({} cached)", seeds.len(), seeds.len() - input.seeds.len());

    let raw = compile(input.instance, input.config, &ordering, &seeds, input.cutoff)?;
    let mut dd = filter(raw)?;
    dd.metadata.ordering_runtime = ordering_runtime;
    dd.metadata.initial_width = dd.width();

    if input.config.reduce {
        let start = Instant::now();
        dd = reduce(dd)?;
        dd.metadata.reduce_algorithm_runtime = start.elapsed();
    }

    info!("built the diagram of {}: {} nodes, {} arcs, {} merges, width {} (initially {})",
        input.instance.name(), dd.node_count(), dd.arc_count(), dd.num_merges(),
        dd.width(), dd.metadata.initial_width);
    Ok(dd)
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_pipeline {
    use crate::*;

    /// y0 + y1 + y2 <= 1 (follower row only)
    fn at_most_one() -> BilevelInstance {
        let data = InstanceData {
            c_matrix: vec![vec![]],
            d_matrix: vec![vec![1, 1, 1]],
            b_rhs: vec![1],
            c_follower: vec![1, 1, 1],
            d: vec![-1, -2, -3],
            ..Default::default()
        };
        BilevelInstance::new("at-most-one", data).unwrap()
    }

    #[test]
    fn metadata_describes_the_construction() {
        let inst = at_most_one();
        let config = CompilationConfig { max_width: Some(2), ordering: OrderingHeuristic::Cost, ..Default::default() };
        let input = CompilationInput { instance: &inst, config: &config, seeds: &[], cutoff: &NoCutoff, cache: None };
        let dd = build_diagram(&input).unwrap();
        let meta = dd.metadata();
        assert_eq!(Some(2), meta.max_width);
        assert_eq!(OrderingHeuristic::Cost, meta.ordering_heuristic);
        assert_eq!(vec![Variable(2), Variable(1), Variable(0)], meta.ordering.follower);
        assert_eq!(LeaderEncoding::Compressed, meta.encoding);
        assert!(meta.initial_width >= dd.width());
        assert!(!meta.completion.is_partial);
    }
    #[test]
    fn reduction_can_be_skipped() {
        let inst = at_most_one();
        let config = CompilationConfig { reduce: false, ..Default::default() };
        let input = CompilationInput { instance: &inst, config: &config, seeds: &[], cutoff: &NoCutoff, cache: None };
        let dd = build_diagram(&input).unwrap();
        assert_eq!(8, dd.node_count());
        assert_eq!(std::time::Duration::ZERO, dd.metadata().reduce_algorithm_runtime);
    }
    #[test]
    fn reduction_runs_by_default() {
        let inst = at_most_one();
        let config = CompilationConfig::default();
        let input = CompilationInput { instance: &inst, config: &config, seeds: &[], cutoff: &NoCutoff, cache: None };
        let dd = build_diagram(&input).unwrap();
        assert_eq!(7, dd.node_count());
        assert_eq!(2, dd.metadata().initial_width);
    }
    #[test]
    fn cached_seeds_are_compiled_with_the_explicit_ones() {
        let inst = at_most_one();
        let config = CompilationConfig { max_width: Some(1), ..Default::default() };
        let mut cache = SampleCache::new();
        cache.insert("at-most-one", vec![vec![0, 0, 1]]);
        cache.insert("elsewhere",   vec![vec![0, 1, 0]]);

        let input = CompilationInput { instance: &inst, config: &config, seeds: &[vec![1, 0, 0]], cutoff: &NoCutoff, cache: Some(&cache) };
        let dd = build_diagram(&input).unwrap();
        assert!(dd.trace(&[1, 0, 0]).is_some());
        assert!(dd.trace(&[0, 0, 1]).is_some());

        let input = CompilationInput { cache: None, ..input };
        let dd = build_diagram(&input).unwrap();
        assert!(dd.trace(&[1, 0, 0]).is_some());
        assert!(dd.trace(&[0, 0, 1]).is_none());
    }
    #[test]
    fn configuration_errors_are_reported_before_anything_else() {
        let inst = at_most_one();
        let config = CompilationConfig { max_width: Some(0), ..Default::default() };
        let input = CompilationInput { instance: &inst, config: &config, seeds: &[], cutoff: &NoCutoff, cache: None };
        assert!(matches!(build_diagram(&input), Err(Error::Configuration(_))));
    }
}
