// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use crate::{
    aggregate::{merge_edges, InfluenceGraph},
    sparse::WeightedCoordinate,
};

use super::{PairOverlap, PartialResult};

/// Collect directed edges whose score exceeds a threshold.
///
/// Each direction of a pair is tested on its own, so a pair can contribute
/// zero, one, or two edges.
pub struct EdgeCollector {
    threshold: f32,
    edges: Vec<WeightedCoordinate>,
}

impl EdgeCollector {
    pub fn new(threshold: f32) -> Self {
        EdgeCollector {
            threshold,
            edges: Vec::new(),
        }
    }

    pub fn edges(&self) -> &[WeightedCoordinate] {
        &self.edges
    }
}

impl PartialResult for EdgeCollector {
    type Output = InfluenceGraph;

    fn record(&mut self, pair: &PairOverlap) {
        let fwd = pair.forward();
        if fwd.value > self.threshold {
            self.edges.push(fwd.into());
        }

        let bwd = pair.backward();
        if bwd.value > self.threshold {
            self.edges.push(bwd.into());
        }
    }

    fn merge(parts: Vec<Self>, n_items: usize) -> InfluenceGraph {
        merge_edges(parts.into_iter().map(|p| p.edges).collect(), n_items)
    }
}

#[cfg(test)]
fn containment_pair() -> PairOverlap {
    // A = {1, 2, 3}, B = {2, 3, 4, 5}
    PairOverlap {
        i: 0,
        j: 1,
        intersection: 2,
        size_i: 3,
        size_j: 4,
    }
}

#[test]
fn test_both_directions_kept() {
    let mut acc = EdgeCollector::new(0.25);
    acc.record(&containment_pair());
    assert_eq!(
        acc.edges(),
        &[
            WeightedCoordinate::new(0, 1, 0.5),
            WeightedCoordinate::new(1, 0, 2.0 / 3.0)
        ]
    );
}

#[test]
fn test_one_direction_kept() {
    let mut acc = EdgeCollector::new(0.6);
    acc.record(&containment_pair());
    assert_eq!(acc.edges(), &[WeightedCoordinate::new(1, 0, 2.0 / 3.0)]);
}

#[test]
fn test_threshold_exclusive() {
    let mut acc = EdgeCollector::new(0.5);
    acc.record(&containment_pair());
    // 0.5 is not above 0.5
    assert_eq!(acc.edges().len(), 1);
    assert_eq!(acc.edges()[0].row, 1);
}

#[test]
fn test_nothing_kept() {
    let mut acc = EdgeCollector::new(0.9);
    acc.record(&containment_pair());
    assert!(acc.edges().is_empty());
}
