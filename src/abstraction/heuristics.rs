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

//! This module defines the traits used to encapsulate the compilation
//! heuristics which are supplied by the caller.
//!
//! So far, this boils down to the `Cutoff` heuristic which is used to impose
//! a stopping criterion (typically a deadline) on the layer compiler. The
//! ordering and discard heuristics are a closed set of policies and are
//! therefore modeled as plain enums (see `OrderingHeuristic` and
//! `DiscardPolicy`).

/// This trait encapsulates a criterion (external to the compiler) which
/// imposes to stop unrolling the decision diagram. Typically, this is done to
/// grant a given time budget to the compilation.
///
/// The criterion is only ever checked between two layers: a layer is never
/// left half-built.
pub trait Cutoff {
    /// Returns true iff the criterion is met and the compilation must stop.
    fn must_stop(&self) -> bool;
}

/// Any shared reference to a cutoff is a cutoff
impl <X: Cutoff + ?Sized> Cutoff for &X {
    fn must_stop(&self) -> bool {
        (**self).must_stop()
    }
}
