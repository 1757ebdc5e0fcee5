// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Pairwise containment similarity between items.
//!
//! The sweep visits every unordered pair `(i, j)` with `i < j` whose user sets
//! are both non-empty and share at least one user. Each pair yields two
//! directed scores: `i → j` is the overlap normalized by `|users(j)|`, and
//! `j → i` the overlap normalized by `|users(i)|`. What happens to the scores
//! is up to the [`PartialResult`] accumulating them.

use log::*;
use rayon::prelude::*;

use crate::{data::AdjacencyIndex, progress::ProgressHandle, sparse::WeightedCoordinate};

mod edges;
mod sampling;

pub use edges::EdgeCollector;
pub use sampling::WeightSampler;

/// A directed similarity score between two items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScore {
    pub source: u32,
    pub destination: u32,
    pub value: f32,
}

impl From<SimilarityScore> for WeightedCoordinate {
    fn from(score: SimilarityScore) -> Self {
        WeightedCoordinate::new(score.source, score.destination, score.value)
    }
}

/// The overlap between two items with a non-empty intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairOverlap {
    /// Outer (lower) item index.
    pub i: usize,
    /// Inner (higher) item index.
    pub j: usize,
    pub intersection: usize,
    pub size_i: usize,
    pub size_j: usize,
}

impl PairOverlap {
    /// Score for `i → j`: the fraction of `j`'s users that `i` shares.
    pub fn forward(&self) -> SimilarityScore {
        SimilarityScore {
            source: self.i as u32,
            destination: self.j as u32,
            value: self.intersection as f32 / self.size_j as f32,
        }
    }

    /// Score for `j → i`: the fraction of `i`'s users that `j` shares.
    pub fn backward(&self) -> SimilarityScore {
        SimilarityScore {
            source: self.j as u32,
            destination: self.i as u32,
            value: self.intersection as f32 / self.size_i as f32,
        }
    }

    /// The larger of the two directed scores.
    pub fn unified(&self) -> f32 {
        self.intersection as f32 / self.size_i.min(self.size_j) as f32
    }
}

/// Per-worker accumulator for sweep results.
///
/// Each instance is owned by exactly one worker task during the sweep;
/// instances are only combined afterwards, on a single thread.
pub trait PartialResult: Send + Sized {
    type Output;

    /// Record the overlap of one pair.
    fn record(&mut self, pair: &PairOverlap);

    /// Merge the per-worker results of a sweep over `n_items` items.
    fn merge(parts: Vec<Self>, n_items: usize) -> Self::Output;
}

/// Sweep all item pairs, accumulating into per-task partial results.
///
/// The outer index range is cut into chunks of `chunk_size` indices, each
/// scheduled as its own task so idle workers pick up the next chunk; later
/// outer indices have shorter inner loops, so static partitioning would leave
/// workers idle. Must be called inside the pool that should run the sweep.
pub fn sweep<P, F>(
    index: &AdjacencyIndex,
    chunk_size: usize,
    pb: &ProgressHandle,
    init: F,
) -> Vec<P>
where
    P: PartialResult,
    F: Fn() -> P + Sync + Send,
{
    let n = index.len();
    let chunk_size = chunk_size.max(1);
    let n_chunks = n.div_ceil(chunk_size);
    debug!(
        "sweeping {} items in {} chunks of {} on {} threads",
        n,
        n_chunks,
        chunk_size,
        rayon::current_num_threads()
    );

    let parts: Vec<P> = (0..n_chunks)
        .into_par_iter()
        .with_max_len(1)
        .fold(&init, |mut acc, chunk| {
            let start = chunk * chunk_size;
            let end = (start + chunk_size).min(n);
            for i in start..end {
                sweep_row(index, i, &mut acc);
            }
            pb.advance(end - start);
            acc
        })
        .collect();

    pb.finish();
    debug!("sweep produced {} partial results", parts.len());
    parts
}

/// Visit all pairs `(i, j)` with `j > i`.
fn sweep_row<P: PartialResult>(index: &AdjacencyIndex, i: usize, acc: &mut P) {
    let size_i = index.degree(i);
    if size_i == 0 {
        return;
    }

    for j in (i + 1)..index.len() {
        let size_j = index.degree(j);
        if size_j == 0 {
            continue;
        }

        let intersection = index.overlap(i, j);
        if intersection == 0 {
            continue;
        }

        acc.record(&PairOverlap {
            i,
            j,
            intersection,
            size_i,
            size_j,
        });
    }
}

#[cfg(test)]
pub(crate) fn index_from_sets(sets: &[&[u32]]) -> AdjacencyIndex {
    let coords: Vec<_> = sets
        .iter()
        .enumerate()
        .flat_map(|(c, users)| {
            users
                .iter()
                .map(move |u| WeightedCoordinate::new(*u, c as u32, 1.0))
        })
        .collect();
    AdjacencyIndex::build(&coords, sets.len()).expect("index build failed")
}

#[cfg(test)]
#[derive(Default)]
struct PairLog {
    pairs: Vec<PairOverlap>,
}

#[cfg(test)]
impl PartialResult for PairLog {
    type Output = Vec<PairOverlap>;

    fn record(&mut self, pair: &PairOverlap) {
        self.pairs.push(*pair);
    }

    fn merge(parts: Vec<Self>, _n_items: usize) -> Vec<PairOverlap> {
        let mut pairs: Vec<_> = parts.into_iter().flat_map(|p| p.pairs).collect();
        pairs.sort_by_key(|p| (p.i, p.j));
        pairs
    }
}

#[test]
fn test_containment_scores() {
    let pair = PairOverlap {
        i: 0,
        j: 1,
        intersection: 2,
        size_i: 3,
        size_j: 4,
    };
    let fwd = pair.forward();
    assert_eq!((fwd.source, fwd.destination), (0, 1));
    assert_eq!(fwd.value, 0.5);
    let bwd = pair.backward();
    assert_eq!((bwd.source, bwd.destination), (1, 0));
    assert_eq!(bwd.value, 2.0 / 3.0);
    assert_eq!(pair.unified(), 2.0 / 3.0);
}

#[test]
fn test_sweep_visits_overlapping_pairs() {
    // 0: {1,2,3}, 1: {2,3,4,5}, 2: {}, 3: {9}, 4: {10}, 5: {3}
    let index = index_from_sets(&[&[1, 2, 3], &[2, 3, 4, 5], &[], &[9], &[10], &[3]]);
    let pb = ProgressHandle::new(index.len());
    let parts = sweep(&index, 2, &pb, PairLog::default);
    let pairs = PairLog::merge(parts, index.len());

    let keys: Vec<_> = pairs.iter().map(|p| (p.i, p.j, p.intersection)).collect();
    assert_eq!(keys, vec![(0, 1, 2), (0, 5, 1), (1, 5, 1)]);
    assert_eq!(pb.count(), index.len());
}

#[test]
fn test_sweep_in_pool() {
    let index = index_from_sets(&[&[0, 1], &[1, 2], &[2, 3], &[3, 0]]);
    let pool = crate::parallel::sweep_pool(Some(4)).expect("pool failed");
    let pb = ProgressHandle::new(index.len());
    let parts = pool.install(|| sweep(&index, 1, &pb, PairLog::default));
    let pairs = PairLog::merge(parts, index.len());
    let keys: Vec<_> = pairs.iter().map(|p| (p.i, p.j)).collect();
    assert_eq!(keys, vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
}

#[test]
fn test_sweep_empty() {
    let index = index_from_sets(&[]);
    let pb = ProgressHandle::new(0);
    let parts = sweep(&index, 30, &pb, PairLog::default);
    assert!(PairLog::merge(parts, 0).is_empty());
}
