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

//! This module defines the parameters of a compilation.

use std::fmt;
use std::str::FromStr;

use derive_builder::Builder;

use crate::{DiscardPolicy, Error, OrderingHeuristic};

/// The default safety ceiling on the number of nodes of a diagram
pub const DEFAULT_MAX_NODES: usize = 1_000_000;
/// The default safety ceiling on the number of arcs of a diagram
pub const DEFAULT_MAX_ARCS: usize = 4_000_000;

/// How the leader decisions are represented below the follower layers
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum LeaderEncoding {
    /// One single arc per terminal node, annotated with the block values of
    /// the rows shared by both players.
    #[default]
    Compressed,
    /// One explicit layer per leader variable
    Full,
}
impl FromStr for LeaderEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compressed" => Ok(Self::Compressed),
            "full"       => Ok(Self::Full),
            _ => Err(Error::config(format!("unknown leader encoding '{s}'"))),
        }
    }
}
impl fmt::Display for LeaderEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compressed => write!(f, "compressed"),
            Self::Full       => write!(f, "full"),
        }
    }
}

/// This is how you configure the compilation of a diagram e.g.
///
/// ```
/// # use bilevel_dd::*;
/// let config = CompilationConfigBuilder::default()
///     .max_width(Some(16))
///     .ordering(OrderingHeuristic::MaxConnectedDegree)
///     .discard("diversity-aware/state-bound".parse().unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(Some(16), config.max_width);
/// assert!(config.reduce);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct CompilationConfig {
    /// The maximum number of nodes per layer (None means unbounded)
    #[builder(default)]
    pub max_width: Option<usize>,
    /// The heuristic used to order the variables
    #[builder(default)]
    pub ordering: OrderingHeuristic,
    /// The policy deciding which nodes survive a width restriction
    #[builder(default)]
    pub discard: DiscardPolicy,
    /// How the leader decisions are encoded
    #[builder(default)]
    pub encoding: LeaderEncoding,
    /// Safety ceiling on the total number of nodes
    #[builder(default = "DEFAULT_MAX_NODES")]
    pub max_nodes: usize,
    /// Safety ceiling on the total number of arcs
    #[builder(default = "DEFAULT_MAX_ARCS")]
    pub max_arcs: usize,
    /// Seed of the random discard policy
    #[builder(default)]
    pub seed: u64,
    /// Follower cost of the dummy root to sink arc. When absent, the spread
    /// of the follower objective is used.
    #[builder(default)]
    pub big_m: Option<isize>,
    /// Whether the pipeline reduces the filtered diagram
    #[builder(default = "true")]
    pub reduce: bool,
}

impl CompilationConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(Some(0)) = self.max_width {
            return Err("max width must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for CompilationConfig {
    fn default() -> Self {
        Self {
            max_width: None,
            ordering: OrderingHeuristic::default(),
            discard: DiscardPolicy::default(),
            encoding: LeaderEncoding::default(),
            max_nodes: DEFAULT_MAX_NODES,
            max_arcs: DEFAULT_MAX_ARCS,
            seed: 0,
            big_m: None,
            reduce: true,
        }
    }
}

impl CompilationConfig {
    /// Checks that the parameters make sense
    pub fn check(&self) -> Result<(), Error> {
        if self.max_width == Some(0) {
            return Err(Error::config("max width must be positive"));
        }
        if self.max_nodes < 2 {
            return Err(Error::config("a diagram needs room for at least a root and a sink"));
        }
        Ok(())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
