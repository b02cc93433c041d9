// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! An owned, graph-independent closed tour.

use crate::index::NodeIndex;

/// A complete tour: the visiting order, starting and ending at node 0, and its
/// total length.
///
/// Unlike `PathState`, a `Tour` does not borrow the graph, so it can outlive
/// the search and be handed to reporting code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tour {
    nodes: Vec<NodeIndex>,
    length: u64,
}

impl Tour {
    /// Creates a tour from its node sequence and length.
    #[inline]
    pub fn new(nodes: Vec<NodeIndex>, length: u64) -> Self {
        Self { nodes, length }
    }

    /// Returns the visiting order, including the closing return to the start.
    #[inline]
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    /// Returns the total length.
    #[inline]
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Returns the number of entries in the visiting order.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tour has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl std::fmt::Display for Tour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}", self.length)?;
        for (i, node) in self.nodes.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{}{}", sep, node.get())?;
        }
        write!(f, "]")
    }
}
