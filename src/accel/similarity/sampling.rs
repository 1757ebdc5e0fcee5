// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use crate::aggregate::{merge_samples, WeightSample};

use super::{PairOverlap, PartialResult};

/// Count directed edges and keep a strided sample of pair weights.
///
/// Every overlapping pair counts as two directed edges, with no threshold.
/// The sample holds the larger directed score of pairs whose outer index
/// falls on the stride.
pub struct WeightSampler {
    stride: usize,
    offset: usize,
    edge_count: u64,
    weights: Vec<f32>,
}

impl WeightSampler {
    pub fn new(stride: usize, offset: usize) -> Self {
        WeightSampler {
            stride: stride.max(1),
            offset,
            edge_count: 0,
            weights: Vec::new(),
        }
    }

    pub fn edge_count(&self) -> u64 {
        self.edge_count
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

impl PartialResult for WeightSampler {
    type Output = WeightSample;

    fn record(&mut self, pair: &PairOverlap) {
        if pair.i % self.stride == self.offset {
            self.weights.push(pair.unified());
        }
        self.edge_count += 2;
    }

    fn merge(parts: Vec<Self>, n_items: usize) -> WeightSample {
        merge_samples(
            parts
                .into_iter()
                .map(|p| (p.edge_count, p.weights))
                .collect(),
            n_items,
        )
    }
}

#[cfg(test)]
fn pair_at(i: usize) -> PairOverlap {
    PairOverlap {
        i,
        j: i + 1,
        intersection: 2,
        size_i: 3,
        size_j: 4,
    }
}

#[test]
fn test_counts_every_pair() {
    let mut acc = WeightSampler::new(500, 250);
    acc.record(&pair_at(0));
    acc.record(&pair_at(1));
    acc.record(&pair_at(499));
    assert_eq!(acc.edge_count(), 6);
    assert!(acc.weights().is_empty());
}

#[test]
fn test_samples_on_stride() {
    let mut acc = WeightSampler::new(500, 250);
    for i in [249, 250, 251, 750, 1250, 500] {
        acc.record(&pair_at(i));
    }
    assert_eq!(acc.edge_count(), 12);
    // 250, 750, and 1250 are on the stride
    assert_eq!(acc.weights(), &[2.0 / 3.0; 3]);
}

#[test]
fn test_unified_is_max_direction() {
    let mut acc = WeightSampler::new(1, 0);
    acc.record(&PairOverlap {
        i: 4,
        j: 9,
        intersection: 3,
        size_i: 12,
        size_j: 4,
    });
    assert_eq!(acc.weights(), &[0.75]);
}
