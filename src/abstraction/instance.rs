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

//! This module defines the problem description every compilation is carried
//! against. A bilevel instance reads
//!
//! ```plain
//!   min_x  c_leader x + c_follower y
//!   s.t.   A x + B y <= a
//!          y in argmin_y { d y : C x + D y <= b, y binary }
//!          x binary
//! ```
//!
//! The decision diagrams only ever look at the follower constraints
//! `C x + D y <= b` and at the objectives. The leader constraints are carried
//! along for the benefit of the reformulation layer.

use fxhash::FxHashMap;

use crate::{Error, RowOwnership, Variable};

/// The raw numeric data of a bilevel instance, as produced by some external
/// loader. All matrices are stored row-major.
#[derive(Debug, Clone, Default)]
pub struct InstanceData {
    /// Leader constraints: leader coefficients (`A`)
    pub a_matrix: Vec<Vec<isize>>,
    /// Leader constraints: follower coefficients (`B`)
    pub b_matrix: Vec<Vec<isize>>,
    /// Follower constraints: leader coefficients (`C`)
    pub c_matrix: Vec<Vec<isize>>,
    /// Follower constraints: follower coefficients (`D`)
    pub d_matrix: Vec<Vec<isize>>,
    /// Right hand side of the leader constraints (`a`)
    pub a_rhs: Vec<isize>,
    /// Right hand side of the follower constraints (`b`)
    pub b_rhs: Vec<isize>,
    /// Leader objective, leader variables
    pub c_leader: Vec<isize>,
    /// Leader objective, follower variables
    pub c_follower: Vec<isize>,
    /// Follower objective (`d`)
    pub d: Vec<isize>,
    /// Optional ownership of the follower rows. Derived from `C` and `D`
    /// when absent.
    pub interaction: Option<Vec<RowOwnership>>,
    /// Follower variables whose value is known to be fixed (0 or 1)
    pub known_values: FxHashMap<usize, u8>,
}

/// A validated bilevel instance.
#[derive(Debug, Clone)]
pub struct BilevelInstance {
    name: String,
    data: InstanceData,
    interaction: Vec<RowOwnership>,
}

impl BilevelInstance {
    /// Validates the dimensions of the given data and creates an instance.
    /// Fails with a configuration error whenever the matrices, right hand
    /// sides and objectives disagree on the number of rows or columns.
    pub fn new(name: impl Into<String>, data: InstanceData) -> Result<Self, Error> {
        let n_leader   = data.c_leader.len();
        let n_follower = data.d.len();
        let m_leader   = data.a_rhs.len();
        let m_follower = data.b_rhs.len();

        if data.c_follower.len() != n_follower {
            return Err(Error::config(format!(
                "leader objective has {} follower coefficients, expected {}",
                data.c_follower.len(), n_follower)));
        }
        check_matrix("A", &data.a_matrix, m_leader,   n_leader)?;
        check_matrix("B", &data.b_matrix, m_leader,   n_follower)?;
        check_matrix("C", &data.c_matrix, m_follower, n_leader)?;
        check_matrix("D", &data.d_matrix, m_follower, n_follower)?;

        for (var, val) in data.known_values.iter() {
            if *var >= n_follower {
                return Err(Error::config(format!("known value for unknown follower variable {var}")));
            }
            if *val > 1 {
                return Err(Error::config(format!("known value {val} of variable {var} is not binary")));
            }
        }

        let interaction = match data.interaction.as_ref() {
            Some(own) if own.len() != m_follower => {
                return Err(Error::config(format!(
                    "interaction describes {} rows, expected {}", own.len(), m_follower)));
            }
            Some(own) => own.clone(),
            None => data.c_matrix.iter().zip(data.d_matrix.iter())
                .map(|(c, d)| RowOwnership::classify(c, d))
                .collect(),
        };

        Ok(Self { name: name.into(), data, interaction })
    }

    /// The name under which this instance is known (used as cache key)
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Number of leader variables
    pub fn nb_leader_vars(&self) -> usize {
        self.data.c_leader.len()
    }
    /// Number of follower variables
    pub fn nb_follower_vars(&self) -> usize {
        self.data.d.len()
    }
    /// Number of follower constraints (rows of `C` and `D`)
    pub fn nb_rows(&self) -> usize {
        self.data.b_rhs.len()
    }
    /// Number of leader constraints (rows of `A` and `B`)
    pub fn nb_leader_rows(&self) -> usize {
        self.data.a_rhs.len()
    }
    /// Coefficient of the given leader variable in the given follower row
    #[inline]
    pub fn c(&self, row: usize, var: Variable) -> isize {
        self.data.c_matrix[row][var.id()]
    }
    /// Coefficient of the given follower variable in the given follower row
    #[inline]
    pub fn d(&self, row: usize, var: Variable) -> isize {
        self.data.d_matrix[row][var.id()]
    }
    /// Right hand side of the given follower row
    #[inline]
    pub fn rhs(&self, row: usize) -> isize {
        self.data.b_rhs[row]
    }
    /// All right hand sides of the follower rows
    pub fn rhs_vector(&self) -> &[isize] {
        &self.data.b_rhs
    }
    /// Follower objective coefficient of the given follower variable
    #[inline]
    pub fn follower_obj(&self, var: Variable) -> isize {
        self.data.d[var.id()]
    }
    /// Leader objective coefficient of the given follower variable
    #[inline]
    pub fn leader_obj_of_follower(&self, var: Variable) -> isize {
        self.data.c_follower[var.id()]
    }
    /// Leader objective coefficient of the given leader variable
    #[inline]
    pub fn leader_obj(&self, var: Variable) -> isize {
        self.data.c_leader[var.id()]
    }
    /// Ownership of the given follower row
    #[inline]
    pub fn ownership(&self, row: usize) -> RowOwnership {
        self.interaction[row]
    }
    /// Ownership of all follower rows
    pub fn interaction(&self) -> &[RowOwnership] {
        &self.interaction
    }
    /// The value to which a follower variable is known to be fixed, if any
    #[inline]
    pub fn known_value(&self, var: Variable) -> Option<u8> {
        self.data.known_values.get(&var.id()).copied()
    }
    /// The table of known follower values
    pub fn known_values(&self) -> &FxHashMap<usize, u8> {
        &self.data.known_values
    }
    /// Read access to the raw data
    pub fn data(&self) -> &InstanceData {
        &self.data
    }

    /// Fixes the follower variables whose value is dominated on one side:
    /// when setting a variable to one makes the follower objective strictly
    /// worse and can only consume slack in every tracked row, the follower
    /// never picks it (and symmetrically for zero). Returns the number of
    /// newly fixed variables.
    pub fn infer_known_values(&mut self) -> usize {
        let mut fixed = 0;
        for j in 0..self.nb_follower_vars() {
            if self.data.known_values.contains_key(&j) {
                continue;
            }
            let var   = Variable(j);
            let cost  = self.follower_obj(var);
            let rows  = (0..self.nb_rows()).filter(|i| self.ownership(*i).is_tracked());
            let (mut nonneg, mut nonpos) = (true, true);
            for i in rows {
                let coef = self.d(i, var);
                nonneg &= coef >= 0;
                nonpos &= coef <= 0;
            }
            let value = if cost > 0 && nonneg {
                Some(0)
            } else if cost < 0 && nonpos {
                Some(1)
            } else {
                None
            };
            if let Some(v) = value {
                self.data.known_values.insert(j, v);
                fixed += 1;
            }
        }
        fixed
    }

    /// A trivial bound on the spread of the follower objective over the unit
    /// cube. It is an admissible cost for the dummy arc when no tighter bound
    /// (e.g. from the high point relaxation) is available.
    pub fn follower_value_bound(&self) -> isize {
        let hi: isize = self.data.d.iter().map(|x| (*x).max(0)).sum();
        let lo: isize = self.data.d.iter().map(|x| (*x).min(0)).sum();
        hi - lo
    }
}

fn check_matrix(name: &str, m: &[Vec<isize>], rows: usize, cols: usize) -> Result<(), Error> {
    if m.len() != rows {
        return Err(Error::config(format!("matrix {name} has {} rows, expected {rows}", m.len())));
    }
    if let Some((i, r)) = m.iter().enumerate().find(|(_, r)| r.len() != cols) {
        return Err(Error::config(format!("row {i} of matrix {name} has {} columns, expected {cols}", r.len())));
    }
    Ok(())
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
