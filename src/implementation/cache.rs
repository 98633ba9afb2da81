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

//! This module provides the cache of seed assignments. Computing the sample
//! points of an instance requires solving auxiliary programs, which is why
//! these are computed once per instance and then reused across compilations.
//! The cache is an explicit object: its lifetime is entirely up to the caller.

use std::sync::Arc;

use fxhash::FxHashMap;

use crate::BilevelInstance;

/// A cache of seed assignments keyed by instance name
#[derive(Debug, Clone, Default)]
pub struct SampleCache {
    samples: FxHashMap<String, Arc<[Vec<u8>]>>,
}

impl SampleCache {
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns the seeds of the given instance, computing them with `make`
    /// if they are not cached yet.
    pub fn seeds_for<F>(&mut self, instance: &BilevelInstance, make: F) -> Arc<[Vec<u8>]>
    where
        F: FnOnce(&BilevelInstance) -> Vec<Vec<u8>>,
    {
        self.samples
            .entry(instance.name().to_string())
            .or_insert_with(|| make(instance).into())
            .clone()
    }
    pub fn get(&self, name: &str) -> Option<Arc<[Vec<u8>]>> {
        self.samples.get(name).cloned()
    }
    pub fn insert(&mut self, name: impl Into<String>, seeds: Vec<Vec<u8>>) {
        self.samples.insert(name.into(), seeds.into());
    }
    pub fn clear(&mut self) {
        self.samples.clear();
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_sample_cache {
    use std::cell::Cell;

    use crate::{BilevelInstance, InstanceData, SampleCache};

    fn instance(name: &str) -> BilevelInstance {
        let data = InstanceData {
            c_matrix: vec![vec![]],
            d_matrix: vec![vec![1, 1]],
            b_rhs: vec![1],
            c_follower: vec![0, 0],
            d: vec![1, 1],
            ..Default::default()
        };
        BilevelInstance::new(name, data).unwrap()
    }

    #[test]
    fn seeds_are_only_computed_once() {
        let calls = Cell::new(0);
        let mut cache = SampleCache::new();
        let inst = instance("toy");
        let make = |_: &BilevelInstance| { calls.set(calls.get() + 1); vec![vec![1, 0]] };

        let a = cache.seeds_for(&inst, make);
        let b = cache.seeds_for(&inst, make);
        assert_eq!(1, calls.get());
        assert_eq!(a, b);
        assert_eq!(&[vec![1, 0]], &*a);
    }
    #[test]
    fn instances_do_not_share_their_seeds() {
        let mut cache = SampleCache::new();
        cache.seeds_for(&instance("a"), |_| vec![vec![1, 0]]);
        cache.seeds_for(&instance("b"), |_| vec![vec![0, 1]]);
        assert_eq!(2, cache.len());
        assert_eq!(Some(vec![vec![0, 1]]), cache.get("b").map(|s| s.to_vec()));
    }
    #[test]
    fn clear_empties_the_cache() {
        let mut cache = SampleCache::new();
        cache.insert("a", vec![vec![1]]);
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(None, cache.get("a"));
    }
}
