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

//! This module provides the discard policies which decide what nodes survive
//! when a layer grows larger than the maximum width.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use compare::Compare;
use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::{DecisionDiagram, Error, NodeId, RowOwnership, UNTRACKED};

/// The order in which the nodes of an overfull layer are considered for
/// survival (the first ones are kept).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Ranking {
    /// Ascending `follower * follower_cost + leader * leader_cost`
    CostWeighted { follower: f64, leader: f64 },
    /// Ascending (max row excess, sum of the state, follower cost). This
    /// favors the nodes that have the most slack left.
    StateBound,
    /// Descending sum of the state: the nodes which consumed the most of the
    /// rows come first
    StateSum,
    /// Uniform random permutation (seeded from the configuration)
    Random,
}
impl Default for Ranking {
    fn default() -> Self {
        Ranking::CostWeighted { follower: 0.9, leader: 0.1 }
    }
}
impl FromStr for Ranking {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cost-weighted" | "follower_cost" => Ok(Self::default()),
            "state-bound"   | "minmax_state"  => Ok(Self::StateBound),
            "state-sum"     | "minsum_state"  => Ok(Self::StateSum),
            "random"                          => Ok(Self::Random),
            _ => Err(Error::config(format!("unknown discard policy '{s}'"))),
        }
    }
}
impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CostWeighted { .. } => write!(f, "cost-weighted"),
            Self::StateBound          => write!(f, "state-bound"),
            Self::StateSum            => write!(f, "state-sum"),
            Self::Random              => write!(f, "random"),
        }
    }
}

/// A discard policy: a ranking, optionally followed by a diversity filter.
///
/// When the diversity filter is on, the nodes are visited in rank order and
/// a node is only accepted if its blocking distance to every node accepted
/// so far is positive. The rejected nodes are then used (in rank order) to
/// backfill the layer up to the maximum width.
///
/// # Example
/// ```
/// # use bilevel_dd::*;
/// let policy: DiscardPolicy = "diversity-aware/state-bound".parse().unwrap();
/// assert_eq!(Ranking::StateBound, policy.ranking);
/// assert!(policy.diversity);
///
/// let policy: DiscardPolicy = "diversity-aware".parse().unwrap();
/// assert_eq!(Ranking::default(), policy.ranking);
/// ```
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DiscardPolicy {
    pub ranking: Ranking,
    pub diversity: bool,
}
impl FromStr for DiscardPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const DIVERSE: &str = "diversity-aware";
        if s == DIVERSE {
            Ok(Self { ranking: Ranking::default(), diversity: true })
        } else if let Some(base) = s.strip_prefix(DIVERSE).and_then(|r| r.strip_prefix('/')) {
            Ok(Self { ranking: base.parse()?, diversity: true })
        } else {
            Ok(Self { ranking: s.parse()?, diversity: false })
        }
    }
}
impl fmt::Display for DiscardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diversity {
            write!(f, "diversity-aware/{}", self.ranking)
        } else {
            write!(f, "{}", self.ranking)
        }
    }
}

/// Everything a discard policy needs to know about the problem
pub struct DiscardContext<'a> {
    /// The right hand sides of the follower rows
    pub rhs: &'a [isize],
    /// The ownership of each follower row
    pub rows: &'a [RowOwnership],
}

impl DiscardPolicy {
    /// Splits the candidates into the nodes to keep (exactly `width` of them,
    /// or all candidates if there are not more than that) and the nodes to
    /// drop. The relative order of the kept nodes follows their rank.
    pub fn select(
        &self,
        dd: &DecisionDiagram,
        ctx: &DiscardContext,
        mut candidates: Vec<NodeId>,
        width: usize,
        rng: &mut ChaCha8Rng,
    ) -> (Vec<NodeId>, Vec<NodeId>) {
        if candidates.len() <= width {
            return (candidates, vec![]);
        }
        match self.ranking {
            Ranking::Random => candidates.shuffle(rng),
            ranking => {
                let cmp = NodeRanking { dd, ctx, ranking };
                candidates.sort_by(|a, b| cmp.compare(a, b));
            }
        }

        if self.diversity {
            let mut kept: Vec<NodeId> = Vec::with_capacity(width);
            let mut rejects = vec![];
            for id in candidates {
                let state = &dd.node(id).state;
                let diverse = kept.len() < width && kept.iter()
                    .all(|k| blocking_distance(state, &dd.node(*k).state, ctx.rows) > 0);
                if diverse {
                    kept.push(id);
                } else {
                    rejects.push(id);
                }
            }
            let missing = width - kept.len();
            let dropped = rejects.split_off(missing.min(rejects.len()));
            kept.extend(rejects);
            (kept, dropped)
        } else {
            let dropped = candidates.split_off(width);
            (candidates, dropped)
        }
    }
}

/// The number of rows shared by both players where `a` has strictly less
/// left hand side than `b`. A node at distance zero from another one does
/// not let the leader block anything the other one would not.
pub fn blocking_distance(a: &[isize], b: &[isize], rows: &[RowOwnership]) -> usize {
    a.iter().zip(b.iter()).zip(rows.iter())
        .filter(|((x, y), own)| **own == RowOwnership::Both && x < y)
        .count()
}

/// This is a thin adapter turning a `Ranking` into a `Compare` object over
/// the nodes of a diagram. Lesser means more likely to be kept.
struct NodeRanking<'a> {
    dd: &'a DecisionDiagram,
    ctx: &'a DiscardContext<'a>,
    ranking: Ranking,
}
impl NodeRanking<'_> {
    fn state_bound(&self, id: NodeId) -> (isize, isize, isize) {
        let node = self.dd.node(id);
        let mut excess = isize::MIN;
        let mut total  = 0;
        for (v, b) in node.state.iter().zip(self.ctx.rhs.iter()) {
            if *v != UNTRACKED {
                excess = excess.max(v - b);
                total += v;
            }
        }
        (excess, total, node.follower_cost)
    }
    fn state_sum(&self, id: NodeId) -> isize {
        self.dd.node(id).state.iter().filter(|v| **v != UNTRACKED).sum()
    }
    fn weighted_cost(&self, id: NodeId, follower: f64, leader: f64) -> OrderedFloat<f64> {
        let node = self.dd.node(id);
        OrderedFloat(follower * node.follower_cost as f64 + leader * node.leader_cost as f64)
    }
}
impl Compare<NodeId> for NodeRanking<'_> {
    fn compare(&self, l: &NodeId, r: &NodeId) -> Ordering {
        match self.ranking {
            Ranking::CostWeighted { follower, leader } =>
                self.weighted_cost(*l, follower, leader).cmp(&self.weighted_cost(*r, follower, leader)),
            Ranking::StateBound =>
                self.state_bound(*l).cmp(&self.state_bound(*r)),
            Ranking::StateSum =>
                self.state_sum(*r).cmp(&self.state_sum(*l)),
            Ranking::Random =>
                Ordering::Equal,
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
