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

//! This module defines the most basic data types that are used throughout all
//! the code of our library (both at the abstraction and implementation levels).
//! These are also the types your client code is likely to work with.

use std::fmt;

// ----------------------------------------------------------------------------
// --- VARIABLE ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type denotes a decision variable of one of the two players. Leader and
/// follower variables are numbered independently: each of them is identified
/// with an integer ranging from 0 until the number of columns of that player.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Variable(pub usize);
impl Variable {
    #[inline]
    /// This function returns the id (numeric value) of the variable.
    ///
    /// # Examples:
    /// ```
    /// # use bilevel_dd::Variable;
    /// assert_eq!(0, Variable(0).id());
    /// assert_eq!(3, Variable(3).id());
    /// ```
    pub fn id(self) -> usize {
        self.0
    }
}

// ----------------------------------------------------------------------------
// --- PLAYER -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The player owning the transition materialized by an arc.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Player {
    /// The upper level decision maker
    Leader,
    /// The lower level decision maker
    Follower,
    /// Nobody: the arc is a structural long arc (the big-M dummy arc or the
    /// arcs closing a diagram onto its sink).
    Neither,
}
impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Leader   => write!(f, "leader"),
            Player::Follower => write!(f, "follower"),
            Player::Neither  => write!(f, "none"),
        }
    }
}

// ----------------------------------------------------------------------------
// --- ROW OWNERSHIP ----------------------------------------------------------
// ----------------------------------------------------------------------------
/// Tells which player's variables participate in a given row of the follower
/// constraints `C x + D y <= b`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RowOwnership {
    /// Only follower variables have a nonzero coefficient in the row
    Follower,
    /// Only leader variables have a nonzero coefficient in the row (or none
    /// at all). These rows are not tracked by the diagram states.
    Leader,
    /// Both players have nonzero coefficients in the row. These rows are the
    /// ones the leader can use to block follower responses.
    Both,
}
impl RowOwnership {
    /// Classifies a row given its leader (`c`) and follower (`d`) coefficients.
    ///
    /// # Examples:
    /// ```
    /// # use bilevel_dd::RowOwnership;
    /// assert_eq!(RowOwnership::Both,     RowOwnership::classify(&[1, 0], &[0, 2]));
    /// assert_eq!(RowOwnership::Follower, RowOwnership::classify(&[0, 0], &[0, 2]));
    /// assert_eq!(RowOwnership::Leader,   RowOwnership::classify(&[3, 0], &[0, 0]));
    /// ```
    pub fn classify(c: &[isize], d: &[isize]) -> Self {
        let leader   = c.iter().any(|x| *x != 0);
        let follower = d.iter().any(|x| *x != 0);
        match (leader, follower) {
            (true,  true)  => RowOwnership::Both,
            (false, true)  => RowOwnership::Follower,
            _              => RowOwnership::Leader,
        }
    }
    /// Returns true iff the diagram states keep track of rows with this ownership
    #[inline]
    pub fn is_tracked(self) -> bool {
        !matches!(self, RowOwnership::Leader)
    }
}

// ----------------------------------------------------------------------------
// --- Results ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A reason explaining why the compilation stopped before its end
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Reason {
    /// It stopped because the configured cutoff criterion was met
    CutoffOccurred
}

/// The outcome of a diagram compilation
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Completion {
    /// True iff the compilation was interrupted and the diagram only covers
    /// the layers that were compiled before the cutoff kicked in.
    pub is_partial: bool,
    /// True iff some layer had to be restricted to fit the maximum width
    pub is_restricted: bool,
    /// Why the compilation was interrupted (if it was)
    pub reason: Option<Reason>,
}

/// The errors that can be raised while compiling, filtering or reducing a
/// decision diagram. Pruning and merging are never reported: only the
/// conditions which prevent the production of a valid diagram are.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The problem description or the compilation parameters are invalid
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A completed node violates a row which completion bounds should have
    /// protected. This denotes a logic defect.
    #[error("internal consistency error: node {node} at layer {layer} has value {value} > {rhs} on row {row}")]
    InternalConsistency {
        layer: usize,
        node : usize,
        row  : usize,
        value: isize,
        rhs  : isize,
    },
    /// The diagram outgrew the configured safety ceiling
    #[error("diagram too large: {nodes} nodes and {arcs} arcs exceed the limit of {limit}")]
    DiagramTooLarge {
        nodes: usize,
        arcs : usize,
        limit: usize,
    },
}

impl Error {
    /// Convenience constructor for configuration errors
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}


// ############################################################################
// #### TESTS #################################################################
// ############################################################################



#[cfg(test)]
mod test_error {
    use crate::Error;

    #[test]
    fn errors_render_a_readable_message() {
        let err = Error::DiagramTooLarge { nodes: 12, arcs: 30, limit: 10 };
        assert_eq!("diagram too large: 12 nodes and 30 arcs exceed the limit of 10", err.to_string());
        assert_eq!("configuration error: oops", Error::config("oops").to_string());
    }
}
