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

//! This module provides the implementation of the cutoff heuristics that can
//! be used to bound the time spent compiling a decision diagram.

use std::time::{Duration, Instant};

use crate::Cutoff;

/// _This is the default cutoff heuristic._ It imposes that the compilation
/// runs until the last layer has been unrolled.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoCutoff;
impl Cutoff for NoCutoff {
    fn must_stop(&self) -> bool {false}
}

/// This cutoff allows one to specify a maximum time budget to compile the
/// diagram. Once the time budget is elapsed, the compiler stops at the end of
/// the current layer and returns the (partial) diagram it has built so far.
///
/// # Example
/// ```
/// # use bilevel_dd::*;
/// use std::time::Duration;
///
/// let budget = TimeBudget::new(Duration::from_secs(3600));
/// assert!(!budget.must_stop());
///
/// let elapsed = TimeBudget::new(Duration::from_secs(0));
/// assert!(elapsed.must_stop());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget {
    deadline: Instant,
}
impl TimeBudget {
    pub fn new(budget: Duration) -> Self {
        Self::until(Instant::now() + budget)
    }
    /// Creates a budget expiring at the given instant
    pub fn until(deadline: Instant) -> Self {
        TimeBudget { deadline }
    }
}
impl Cutoff for TimeBudget {
    fn must_stop(&self) -> bool {
        Instant::now() >= self.deadline
    }
}
