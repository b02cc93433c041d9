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

//! # Distance Graph
//!
//! `Graph` is the immutable, symmetric distance matrix every search worker
//! reads from. It is validated at construction (square, symmetric, zero
//! diagonal) and then only ever shared by `&Graph`, so no synchronisation is
//! needed around it.
//!
//! Graphs come from three places:
//!
//! - `Graph::from_matrix` / `Graph::from_edges` for explicit distances,
//! - `Graph::from_coordinates` with a `Metric`, as used by the TSPLIB loader,
//! - `Graph::random_euclidean` for benchmarks and randomized tests.
//!
//! Every distance is bounded by `max_edge_distance(size)`, so the length of
//! any closed tour (at most `size` edges) stays below `u64::MAX` and path
//! arithmetic never overflows.
//!
//! `Display` prints the full distance matrix with five-character columns.

use crate::index::NodeIndex;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Mean earth radius used by the TSPLIB `GEO` metric, in kilometres.
const EARTH_RADIUS_KM: f64 = 6378.388;

/// Returns the largest edge distance a graph of `size` nodes accepts.
///
/// A closed tour has `size` edges, so `size * max_edge_distance(size)` is at
/// most `u64::MAX - 1`. `u64::MAX` itself stays free to mean "no tour".
#[inline]
pub const fn max_edge_distance(size: usize) -> u64 {
    if size <= 1 {
        0
    } else {
        (u64::MAX - 1) / size as u64
    }
}

/// How distances are derived from node coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Euclidean distance rounded to the nearest integer (`EUC_2D`).
    Euclidean2d,
    /// Great-circle distance in kilometres on the TSPLIB sphere (`GEO`).
    /// The first coordinate is the longitude, the second the latitude, both
    /// in degrees.
    Geographic,
}

impl Metric {
    /// Returns the TSPLIB keyword of this metric.
    #[inline]
    pub const fn keyword(self) -> &'static str {
        match self {
            Metric::Euclidean2d => "EUC_2D",
            Metric::Geographic => "GEO",
        }
    }

    /// Computes the integer distance between two coordinates.
    pub fn distance(self, a: (f64, f64), b: (f64, f64)) -> u64 {
        match self {
            Metric::Euclidean2d => {
                let dx = a.0 - b.0;
                let dy = a.1 - b.1;
                (0.5 + (dx * dx + dy * dy).sqrt()) as u64
            }
            Metric::Geographic => {
                let (lon0, lat0) = (a.0.to_radians(), a.1.to_radians());
                let (lon1, lat1) = (b.0.to_radians(), b.1.to_radians());
                let q1 = (lon0 - lon1).cos();
                let q2 = (lat0 - lat1).cos();
                let q3 = (lat0 + lat1).cos();
                // Rounding can push the cosine just outside [-1, 1].
                let cosine = (((q1 + 1.0) * q2 - (q1 - 1.0) * q3) / 2.0).clamp(-1.0, 1.0);
                (EARTH_RADIUS_KM * cosine.acos() + 0.5) as u64
            }
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "EUC_2D" => Ok(Metric::Euclidean2d),
            "GEO" => Ok(Metric::Geographic),
            other => Err(other.to_owned()),
        }
    }
}

/// Reasons a distance matrix is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("a graph needs at least one node")]
    Empty,
    #[error("distance matrix for {nodes} nodes needs {expected} entries, got {actual}")]
    MatrixShape {
        nodes: usize,
        expected: usize,
        actual: usize,
    },
    #[error("distance from node {node} to itself is {distance}, expected 0")]
    NonZeroDiagonal { node: usize, distance: u64 },
    #[error("distance {from}->{to} is {forward} but {to}->{from} is {backward}")]
    Asymmetric {
        from: usize,
        to: usize,
        forward: u64,
        backward: u64,
    },
    #[error("edge {from}-{to} references a node outside 0..{nodes}")]
    NodeOutOfRange { from: usize, to: usize, nodes: usize },
    #[error("no distance given between nodes {from} and {to}")]
    MissingEdge { from: usize, to: usize },
    #[error("distance {from}-{to} is {distance}, the limit for this graph is {max}")]
    DistanceTooLarge {
        from: usize,
        to: usize,
        distance: u64,
        max: u64,
    },
    #[error("node {node} has a non-finite coordinate")]
    NonFiniteCoordinate { node: usize },
}

/// An immutable, symmetric distance matrix with optional node coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    size: usize,
    distances: Vec<u64>,
    coordinates: Vec<(f64, f64)>,
    metric: Option<Metric>,
}

impl Graph {
    /// Builds a graph from a row-major `size × size` matrix.
    pub fn from_matrix(size: usize, distances: Vec<u64>) -> Result<Self, GraphError> {
        if size == 0 {
            return Err(GraphError::Empty);
        }
        let expected = size * size;
        if distances.len() != expected {
            return Err(GraphError::MatrixShape {
                nodes: size,
                expected,
                actual: distances.len(),
            });
        }

        let max = max_edge_distance(size);
        for i in 0..size {
            let diagonal = distances[i * size + i];
            if diagonal != 0 {
                return Err(GraphError::NonZeroDiagonal {
                    node: i,
                    distance: diagonal,
                });
            }
            for j in 0..i {
                let forward = distances[i * size + j];
                let backward = distances[j * size + i];
                if forward != backward {
                    return Err(GraphError::Asymmetric {
                        from: i,
                        to: j,
                        forward,
                        backward,
                    });
                }
                if forward > max {
                    return Err(GraphError::DistanceTooLarge {
                        from: j,
                        to: i,
                        distance: forward,
                        max,
                    });
                }
            }
        }

        Ok(Self {
            size,
            distances,
            coordinates: Vec::new(),
            metric: None,
        })
    }

    /// Builds a graph from an undirected edge list `(from, to, distance)` that
    /// must name every pair of distinct nodes.
    pub fn from_edges(size: usize, edges: &[(usize, usize, u64)]) -> Result<Self, GraphError> {
        if size == 0 {
            return Err(GraphError::Empty);
        }

        let mut cells: Vec<Option<u64>> = vec![None; size * size];
        for i in 0..size {
            cells[i * size + i] = Some(0);
        }
        for &(from, to, distance) in edges {
            if from >= size || to >= size {
                return Err(GraphError::NodeOutOfRange {
                    from,
                    to,
                    nodes: size,
                });
            }
            if from == to && distance != 0 {
                return Err(GraphError::NonZeroDiagonal {
                    node: from,
                    distance,
                });
            }
            cells[from * size + to] = Some(distance);
            cells[to * size + from] = Some(distance);
        }

        let distances = cells
            .into_iter()
            .enumerate()
            .map(|(k, cell)| {
                cell.ok_or(GraphError::MissingEdge {
                    from: k / size,
                    to: k % size,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_matrix(size, distances)
    }

    /// Builds a graph from node coordinates, deriving every distance with `metric`.
    pub fn from_coordinates(
        coordinates: Vec<(f64, f64)>,
        metric: Metric,
    ) -> Result<Self, GraphError> {
        let size = coordinates.len();
        if size == 0 {
            return Err(GraphError::Empty);
        }

        if let Some(node) = coordinates
            .iter()
            .position(|&(x, y)| !(x.is_finite() && y.is_finite()))
        {
            return Err(GraphError::NonFiniteCoordinate { node });
        }

        let max = max_edge_distance(size);
        let mut distances = vec![0u64; size * size];
        for i in 0..size {
            for j in 0..i {
                let d = metric.distance(coordinates[i], coordinates[j]);
                if d > max {
                    return Err(GraphError::DistanceTooLarge {
                        from: j,
                        to: i,
                        distance: d,
                        max,
                    });
                }
                distances[i * size + j] = d;
                distances[j * size + i] = d;
            }
        }

        Ok(Self {
            size,
            distances,
            coordinates,
            metric: Some(metric),
        })
    }

    /// Builds a reproducible `EUC_2D` instance with `size` nodes placed
    /// uniformly in `[0, 1000)²`.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn random_euclidean(size: usize, seed: u64) -> Self {
        assert!(
            size > 0,
            "called `Graph::random_euclidean` with zero nodes"
        );
        let mut rng = StdRng::seed_from_u64(seed);
        let coordinates = (0..size)
            .map(|_| (rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0)))
            .collect();

        Self::from_coordinates(coordinates, Metric::Euclidean2d)
            .unwrap_or_else(|_| unreachable!("a non-empty coordinate list always forms a graph"))
    }

    /// Returns the number of nodes.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the distance between `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds `0..size`.
    #[inline(always)]
    pub fn distance(&self, i: NodeIndex, j: NodeIndex) -> u64 {
        debug_assert!(
            i.get() < self.size && j.get() < self.size,
            "called `Graph::distance` with node out of bounds: the size is {} but the nodes are {} and {}",
            self.size,
            i.get(),
            j.get()
        );
        self.distances[i.get() * self.size + j.get()]
    }

    /// Returns the coordinates of `node`, if the graph was built from coordinates.
    #[inline]
    pub fn coordinates(&self, node: NodeIndex) -> Option<(f64, f64)> {
        self.coordinates.get(node.get()).copied()
    }

    /// Returns the metric the distances were derived from, if any.
    #[inline]
    pub fn metric(&self) -> Option<Metric> {
        self.metric
    }

    /// Iterates over all node indices.
    #[inline]
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> {
        (0..self.size).map(NodeIndex::new)
    }
}

impl std::fmt::Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "     ")?;
        for j in 0..self.size {
            write!(f, "{:>5}", j)?;
        }
        writeln!(f)?;
        for i in 0..self.size {
            write!(f, "{:>5}", i)?;
            for j in 0..self.size {
                write!(f, "{:>5}", self.distances[i * self.size + j])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn four_nodes() -> Graph {
        Graph::from_edges(
            4,
            &[
                (0, 1, 10),
                (0, 2, 15),
                (0, 3, 20),
                (1, 2, 35),
                (1, 3, 25),
                (2, 3, 30),
            ],
        )
        .expect("complete edge list")
    }

    #[test]
    fn test_from_edges_is_symmetric_with_zero_diagonal() {
        let g = four_nodes();
        assert_eq!(g.size(), 4);
        for i in 0..4 {
            assert_eq!(g.distance(n(i), n(i)), 0);
            for j in 0..4 {
                assert_eq!(g.distance(n(i), n(j)), g.distance(n(j), n(i)));
            }
        }
        assert_eq!(g.distance(n(1), n(3)), 25);
        assert_eq!(g.metric(), None);
        assert_eq!(g.coordinates(n(0)), None);
    }

    #[test]
    fn test_from_edges_reports_missing_pair() {
        let err = Graph::from_edges(3, &[(0, 1, 1), (1, 2, 1)]).unwrap_err();
        assert_eq!(err, GraphError::MissingEdge { from: 0, to: 2 });
    }

    #[test]
    fn test_from_edges_rejects_out_of_range_node() {
        let err = Graph::from_edges(2, &[(0, 2, 1)]).unwrap_err();
        assert!(matches!(err, GraphError::NodeOutOfRange { to: 2, .. }));
    }

    #[test]
    fn test_from_matrix_validation() {
        assert_eq!(Graph::from_matrix(0, vec![]), Err(GraphError::Empty));
        assert!(matches!(
            Graph::from_matrix(2, vec![0, 1, 1]),
            Err(GraphError::MatrixShape { expected: 4, actual: 3, .. })
        ));
        assert_eq!(
            Graph::from_matrix(2, vec![0, 1, 1, 5]),
            Err(GraphError::NonZeroDiagonal { node: 1, distance: 5 })
        );
        assert!(matches!(
            Graph::from_matrix(2, vec![0, 1, 2, 0]),
            Err(GraphError::Asymmetric { .. })
        ));
        assert!(Graph::from_matrix(1, vec![0]).is_ok());
    }

    #[test]
    fn test_from_matrix_rejects_distances_that_could_overflow_a_tour() {
        let half = u64::MAX / 2;
        let err = Graph::from_matrix(3, vec![0, half, half, half, 0, half, half, half, 0])
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::DistanceTooLarge { from: 0, to: 1, max, .. } if max == max_edge_distance(3)
        ));

        let max = max_edge_distance(3);
        let g = Graph::from_matrix(3, vec![0, max, max, max, 0, max, max, max, 0]).unwrap();
        assert_eq!(g.distance(n(0), n(2)), max);
        assert!(max.checked_mul(3).is_some_and(|tour| tour < u64::MAX));
    }

    #[test]
    fn test_max_edge_distance_keeps_tours_below_sentinel() {
        assert_eq!(max_edge_distance(1), 0);
        for size in [2usize, 3, 5, 17, 100] {
            let tour = (max_edge_distance(size) as u128) * size as u128;
            assert!(tour < u64::MAX as u128, "size = {}", size);
        }
    }

    #[test]
    fn test_from_coordinates_rejects_non_finite_and_huge_coordinates() {
        assert_eq!(
            Graph::from_coordinates(vec![(0.0, 0.0), (f64::NAN, 1.0)], Metric::Euclidean2d),
            Err(GraphError::NonFiniteCoordinate { node: 1 })
        );
        assert_eq!(
            Graph::from_coordinates(vec![(f64::INFINITY, 0.0)], Metric::Geographic),
            Err(GraphError::NonFiniteCoordinate { node: 0 })
        );
        assert!(matches!(
            Graph::from_coordinates(vec![(0.0, 0.0), (1e300, 0.0)], Metric::Euclidean2d),
            Err(GraphError::DistanceTooLarge { from: 0, to: 1, .. })
        ));
    }

    #[test]
    fn test_euclidean_rounding() {
        let m = Metric::Euclidean2d;
        assert_eq!(m.distance((0.0, 0.0), (3.0, 4.0)), 5);
        assert_eq!(m.distance((0.0, 0.0), (1.0, 1.0)), 1); // 1.414 -> 1
        assert_eq!(m.distance((0.0, 0.0), (1.5, 0.0)), 2); // 1.5 -> 2
        assert_eq!(m.distance((2.0, 2.0), (2.0, 2.0)), 0);
    }

    #[test]
    fn test_geographic_distance() {
        let m = Metric::Geographic;
        assert_eq!(m.distance((10.0, 45.0), (10.0, 45.0)), 0);
        // One degree of latitude on the TSPLIB sphere is about 111.3 km.
        assert_eq!(m.distance((0.0, 0.0), (0.0, 1.0)), 111);
        let a = (6.1, 46.2);
        let b = (7.4, 46.9);
        assert_eq!(m.distance(a, b), m.distance(b, a));
    }

    #[test]
    fn test_from_coordinates_fills_matrix() {
        let g = Graph::from_coordinates(
            vec![(0.0, 0.0), (3.0, 4.0), (6.0, 8.0)],
            Metric::Euclidean2d,
        )
        .unwrap();
        assert_eq!(g.distance(n(0), n(1)), 5);
        assert_eq!(g.distance(n(0), n(2)), 10);
        assert_eq!(g.distance(n(2), n(1)), 5);
        assert_eq!(g.coordinates(n(1)), Some((3.0, 4.0)));
        assert_eq!(g.metric(), Some(Metric::Euclidean2d));
    }

    #[test]
    fn test_metric_keywords_round_trip() {
        for m in [Metric::Euclidean2d, Metric::Geographic] {
            assert_eq!(m.keyword().parse::<Metric>(), Ok(m));
            assert_eq!(m.to_string(), m.keyword());
        }
        assert_eq!("ATT".parse::<Metric>(), Err("ATT".to_string()));
    }

    #[test]
    fn test_random_euclidean_is_reproducible() {
        let a = Graph::random_euclidean(12, 7);
        let b = Graph::random_euclidean(12, 7);
        let c = Graph::random_euclidean(12, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.size(), 12);
    }

    #[test]
    fn test_display_prints_matrix() {
        let g = four_nodes();
        let rendered = g.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "         0    1    2    3");
        assert_eq!(lines[2], "    1   10    0   35   25");
    }
}
