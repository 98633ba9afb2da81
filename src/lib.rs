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


//! # Bilevel DD
//! This crate compiles the follower problem of a bilevel integer program into
//! a relaxed decision diagram. The diagram approximates the feasible region
//! and the value function of the follower; it is meant to be handed over to a
//! reformulation layer which turns it into a single level mathematical
//! program (flow conservation over the arcs, dual feasibility and blocking
//! constraints derived from the block values of the terminal arcs).
//!
//! The construction happens in four steps:
//! 1. the variables of both players are ordered (`VariableOrdering`),
//! 2. the layer compiler unrolls the follower decisions, pruning the children
//!    which cannot be completed into a feasible assignment, merging the ones
//!    having the same state and restricting the layers that grow larger than
//!    the maximum width (`compile`),
//! 3. the reachability filter drops whatever got disconnected (`filter`),
//! 4. the reducer merges the nodes that behave identically (`reduce`).
//!
//! `build_diagram` chains all of them.
//!
//! ## Quick Example
//! ```
//! # use bilevel_dd::*;
//! // The follower picks at most two items (y0 + y1 + y2 <= 2) while the
//! // leader may forbid y2 (x0 + y2 <= 1).
//! let data = InstanceData {
//!     c_matrix: vec![vec![0], vec![1]],
//!     d_matrix: vec![vec![1, 1, 1], vec![0, 0, 1]],
//!     b_rhs: vec![2, 1],
//!     c_leader: vec![2],
//!     c_follower: vec![1, 1, 1],
//!     d: vec![-3, -2, -4],
//!     ..Default::default()
//! };
//! let instance = BilevelInstance::new("quick", data).unwrap();
//!
//! let config = CompilationConfigBuilder::default()
//!     .max_width(Some(2))
//!     .ordering(OrderingHeuristic::Cost)
//!     .discard("state-bound".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let input = CompilationInput {
//!     instance: &instance,
//!     config: &config,
//!     seeds: &[vec![1, 1, 0]],
//!     cutoff: &NoCutoff,
//!     cache: None,
//! };
//! let dd = build_diagram(&input).unwrap();
//!
//! assert!(dd.width() <= 2);
//! assert!(dd.trace(&[1, 1, 0]).is_some());
//! ```

mod common;
mod abstraction;
mod implementation;

pub use common::*;
pub use abstraction::*;
pub use implementation::*;
