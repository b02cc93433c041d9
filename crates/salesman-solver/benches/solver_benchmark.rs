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

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use salesman_model::graph::Graph;
use salesman_solver::solver::SolverBuilder;
use std::hint::black_box;

fn bench_random_euclidean(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_euclidean");
    group.sample_size(10);

    for size in [8usize, 10, 12] {
        let graph = Graph::random_euclidean(size, 0x5eed);
        for workers in [1usize, 4] {
            let solver = SolverBuilder::new().with_workers(workers).build();
            group.bench_with_input(
                BenchmarkId::new(format!("n{}", size), workers),
                &graph,
                |b, graph| {
                    b.iter(|| {
                        let outcome = solver.solve(black_box(graph));
                        black_box(outcome.tour().map(|t| t.length()))
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_depth_threshold(c: &mut Criterion) {
    let mut group = c.benchmark_group("depth_threshold");
    group.sample_size(10);

    let graph = Graph::random_euclidean(11, 7);
    for depth in [1usize, 3, 6, 11] {
        let solver = SolverBuilder::new()
            .with_workers(4)
            .with_depth_threshold(depth)
            .build();
        group.bench_with_input(BenchmarkId::from_parameter(depth), &graph, |b, graph| {
            b.iter(|| black_box(solver.solve(black_box(graph))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_random_euclidean, bench_depth_threshold);
criterion_main!(benches);
