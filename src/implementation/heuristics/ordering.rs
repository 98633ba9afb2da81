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

//! This module provides the variable ordering heuristics. A variable ordering
//! decides which decision variable is committed at each layer of the diagram.
//! It is computed once, before the compilation starts, as a pure function of
//! the problem description.

use std::fmt;
use std::str::FromStr;

use crate::{BilevelInstance, Error, RowOwnership, Variable};

/// The closed set of variable ordering policies.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum OrderingHeuristic {
    /// Identity order
    #[default]
    Lexicographic,
    /// Ascending own-objective coefficient
    Cost,
    /// Ascending leader-objective coefficient
    LeaderCost,
    /// Ascending total coefficient magnitude over the rows shared by both players
    RowDegree,
    /// Ascending (max row coefficient, sum of row coefficients)
    FeasibilityRisk,
    /// Greedy ordering placing next the variable that is the most connected
    /// (by shared nonzero rows) to the variables placed so far
    MaxConnectedDegree,
}

impl FromStr for OrderingHeuristic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lexicographic"                              => Ok(Self::Lexicographic),
            "cost"      | "follower_cost"                => Ok(Self::Cost),
            "leader-cost" | "leader_cost"                => Ok(Self::LeaderCost),
            "row-degree" | "lhs_coeffs"                  => Ok(Self::RowDegree),
            "feasibility-risk" | "leader_feasibility"    => Ok(Self::FeasibilityRisk),
            "max-connected-degree" | "max_connected_degree" => Ok(Self::MaxConnectedDegree),
            _ => Err(Error::config(format!("unknown ordering heuristic '{s}'"))),
        }
    }
}
impl fmt::Display for OrderingHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Lexicographic      => "lexicographic",
            Self::Cost               => "cost",
            Self::LeaderCost         => "leader-cost",
            Self::RowDegree          => "row-degree",
            Self::FeasibilityRisk    => "feasibility-risk",
            Self::MaxConnectedDegree => "max-connected-degree",
        };
        write!(f, "{tag}")
    }
}

/// The order in which the variables of each player are committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableOrdering {
    pub leader: Vec<Variable>,
    pub follower: Vec<Variable>,
}

impl VariableOrdering {
    /// Computes the ordering of both players' variables under the given
    /// heuristic. Each player is ordered on its own block of the follower
    /// constraints (`C` for the leader, `D` for the follower) and on its own
    /// objective.
    pub fn new(instance: &BilevelInstance, heuristic: OrderingHeuristic) -> Self {
        let rows = instance.interaction();

        let follower = Columns {
            coefs: (0..instance.nb_follower_vars())
                .map(|j| (0..instance.nb_rows()).map(|i| instance.d(i, Variable(j))).collect())
                .collect(),
            obj: (0..instance.nb_follower_vars()).map(|j| instance.follower_obj(Variable(j))).collect(),
            leader_obj: (0..instance.nb_follower_vars()).map(|j| instance.leader_obj_of_follower(Variable(j))).collect(),
            rows,
        };
        let leader = Columns {
            coefs: (0..instance.nb_leader_vars())
                .map(|j| (0..instance.nb_rows()).map(|i| instance.c(i, Variable(j))).collect())
                .collect(),
            obj: (0..instance.nb_leader_vars()).map(|j| instance.leader_obj(Variable(j))).collect(),
            leader_obj: (0..instance.nb_leader_vars()).map(|j| instance.leader_obj(Variable(j))).collect(),
            rows,
        };

        VariableOrdering {
            leader: leader.order(heuristic),
            follower: follower.order(heuristic),
        }
    }

    /// Same as `new` but the heuristic is given by its name.
    pub fn by_name(instance: &BilevelInstance, name: &str) -> Result<Self, Error> {
        Ok(Self::new(instance, name.parse()?))
    }
}

/// The coefficients of one player's block, stored column by column.
struct Columns<'a> {
    coefs: Vec<Vec<isize>>,
    obj: Vec<isize>,
    /// What each column costs to the leader
    leader_obj: Vec<isize>,
    rows: &'a [RowOwnership],
}

impl Columns<'_> {
    fn order(&self, heuristic: OrderingHeuristic) -> Vec<Variable> {
        let mut vars: Vec<usize> = (0..self.coefs.len()).collect();
        match heuristic {
            OrderingHeuristic::Lexicographic => {},
            OrderingHeuristic::Cost => {
                vars.sort_by_key(|j| self.obj[*j]);
            },
            OrderingHeuristic::LeaderCost => {
                vars.sort_by_key(|j| self.leader_obj[*j]);
            },
            OrderingHeuristic::RowDegree => {
                vars.sort_by_key(|j| self.shared_magnitude(*j));
            },
            OrderingHeuristic::FeasibilityRisk => {
                vars.sort_by_key(|j| self.risk(*j));
            },
            OrderingHeuristic::MaxConnectedDegree => {
                vars = self.max_connected_degree();
            },
        }
        vars.into_iter().map(Variable).collect()
    }

    fn shared_magnitude(&self, j: usize) -> isize {
        self.coefs[j].iter().zip(self.rows.iter())
            .filter(|(_, own)| **own == RowOwnership::Both)
            .map(|(c, _)| c.abs())
            .sum()
    }

    fn risk(&self, j: usize) -> (isize, isize) {
        let col = &self.coefs[j];
        let max = col.iter().copied().max().unwrap_or(isize::MIN);
        let sum = col.iter().sum();
        (max, sum)
    }

    fn touches(&self, j: usize, i: usize) -> bool {
        self.coefs[j][i] != 0 && self.rows[i].is_tracked()
    }

    fn degree(&self, j: usize) -> usize {
        (0..self.rows.len()).filter(|i| self.touches(j, *i)).count()
    }

    fn max_connected_degree(&self) -> Vec<usize> {
        let n = self.coefs.len();
        let degree: Vec<usize> = (0..n).map(|j| self.degree(j)).collect();
        let mut placed  = vec![false; n];
        let mut covered = vec![false; self.rows.len()];
        let mut order   = Vec::with_capacity(n);

        while order.len() < n {
            let mut best: Option<(usize, usize, usize)> = None; // (conn, degree, var)
            for j in (0..n).filter(|j| !placed[*j]) {
                let conn = (0..self.rows.len()).filter(|i| covered[*i] && self.touches(j, *i)).count();
                let better = match best {
                    None => true,
                    Some((bc, bd, _)) => (conn, degree[j]) > (bc, bd),
                };
                if better {
                    best = Some((conn, degree[j], j));
                }
            }
            if let Some((_, _, j)) = best {
                placed[j] = true;
                order.push(j);
                for (i, cov) in covered.iter_mut().enumerate() {
                    *cov |= self.touches(j, i);
                }
            }
        }
        order
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
