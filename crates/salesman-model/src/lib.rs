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

//! # Salesman Model
//!
//! **The problem model for the parallel exact TSP solver.**
//!
//! * **`index`**: `NodeIndex`, a strongly typed node number.
//! * **`graph`**: `Graph`, the immutable symmetric distance matrix, built from a
//!   matrix or from coordinates and a `Metric` (`EUC_2D` or `GEO`).
//! * **`tsplib`**: `TspFileLoader`, which reads the TSPLIB subset used by the
//!   solver (`DIMENSION`, `EDGE_WEIGHT_TYPE`, `NODE_COORD_SECTION`).
//! * **`path`**: `PathState`, a partial tour with running distance and a
//!   visited bitset; the unit of work passed between search workers.
//! * **`tour`**: `Tour`, an owned, graph-independent copy of a closed tour.
//!
//! The graph is validated eagerly, so the search never sees an asymmetric
//! matrix or a non-zero diagonal.

pub mod graph;
pub mod index;
pub mod path;
pub mod tour;
pub mod tsplib;
