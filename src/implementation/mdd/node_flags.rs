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

//! This module provides the compact set of flags attached to every node of a
//! decision diagram.

/// This structure stores a compact set of flags relating to a given node.
/// So far, it maintains the following:
/// - Pinned   which is true iff the node lies on the path of a seed assignment.
///            Pinned nodes always survive the width restriction.
/// - Marked   which is used by the graph traversals (reachability filter) to
///            remember the nodes that have already been visited.
/// - Deleted  which is true iff the node has been dropped from its layer
///            (either by the width restriction or because it was merged into
///            an equivalent node by the reducer).
///
/// # Default
/// By default, no flag is turned on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct NodeFlags(u8);
impl NodeFlags {
    /// The position of the pinned flag
    pub const F_PINNED: u8 = 1;
    /// The position of the marked flag.
    pub const F_MARKED: u8 = 2;
    /// The position of the deleted flag.
    pub const F_DELETED: u8 = 4;

    /// Creates a new set of flags, either initialized with pinned on or not.
    #[inline]
    pub fn new(pinned: bool) -> Self {
        let mut flags = NodeFlags(0);
        flags.set_pinned(pinned);
        flags
    }
    /// Returns true iff the pinned flag is turned on
    #[inline]
    pub fn is_pinned(self) -> bool {
        self.test(NodeFlags::F_PINNED)
    }
    /// Returns true iff the marked flag is turned on
    #[inline]
    pub fn is_marked(self) -> bool {
        self.test(NodeFlags::F_MARKED)
    }
    /// Returns true iff the deleted flag is turned on
    #[inline]
    pub fn is_deleted(self) -> bool {
        self.test(NodeFlags::F_DELETED)
    }
    /// Sets the pinned flag to the given value
    #[inline]
    pub fn set_pinned(&mut self, pinned: bool) {
        self.set(NodeFlags::F_PINNED, pinned)
    }
    /// Sets the marked flag to the given value
    #[inline]
    pub fn set_marked(&mut self, marked: bool) {
        self.set(NodeFlags::F_MARKED, marked)
    }
    /// Sets the deleted flag to the given value
    #[inline]
    pub fn set_deleted(&mut self, deleted: bool) {
        self.set(NodeFlags::F_DELETED, deleted)
    }
    /// Checks whether all the flags encoded in the given mask are turned on.
    /// Otherwise, it returns false
    #[inline]
    pub fn test(self, mask: u8) -> bool {
        self.0 & mask == mask
    }
    /// Sets the value of a given flag to the selected polarity
    #[inline]
    pub fn set(&mut self, flag: u8, value: bool) {
        if value {
            self.add(flag)
        } else {
            self.remove(flag)
        }
    }
    /// Turns the given flag(s) on.
    #[inline]
    pub fn add(&mut self, flags: u8) {
        self.0 |= flags;
    }
    /// Turns the given flag(s) off.
    #[inline]
    pub fn remove(&mut self, flags: u8) {
        self.0 &= !flags;
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
