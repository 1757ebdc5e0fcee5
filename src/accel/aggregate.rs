// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Merging per-worker sweep results and summarizing them.

use std::sync::Arc;

use arrow::{
    array::{ArrayRef, Float32Array, RecordBatch},
    error::ArrowError,
};
use log::*;
use ordered_float::NotNan;
use serde::Serialize;

use crate::{
    config::Mode,
    sparse::{COOMatrix, RelationDimensions, WeightedCoordinate},
};

/// Fraction of possible directed edges among `n_items` items that exist.
///
/// Defined as 0 when there are fewer than two items.
pub fn density(edge_count: u64, n_items: usize) -> f64 {
    if n_items < 2 {
        return 0.0;
    }
    let n = n_items as f64;
    edge_count as f64 / (n * (n - 1.0))
}

/// The retained edges of a graph-build sweep.
#[derive(Debug, Clone)]
pub struct InfluenceGraph {
    pub n_items: usize,
    pub edges: Vec<WeightedCoordinate>,
    /// Directed edge count used for density: twice the retained edges.
    pub edge_count: u64,
    pub density: f64,
}

/// The edge tally and weight sample of a sampling sweep.
#[derive(Debug, Clone)]
pub struct WeightSample {
    pub n_items: usize,
    pub weights: Vec<f32>,
    pub edge_count: u64,
    pub density: f64,
}

/// Concatenate per-worker edge lists.
pub fn merge_edges(parts: Vec<Vec<WeightedCoordinate>>, n_items: usize) -> InfluenceGraph {
    let total: usize = parts.iter().map(Vec::len).sum();
    debug!("merging {} edges from {} parts", total, parts.len());
    let mut edges = Vec::with_capacity(total);
    for part in parts {
        edges.extend(part);
    }

    // downstream consumers add each edge's reverse, so the density counts both
    let edge_count = 2 * edges.len() as u64;
    let density = density(edge_count, n_items);
    info!("edge count: {}", edge_count);
    info!("density: {}", density);

    InfluenceGraph {
        n_items,
        edges,
        edge_count,
        density,
    }
}

/// Sum per-worker edge counts and concatenate weight samples.
pub fn merge_samples(parts: Vec<(u64, Vec<f32>)>, n_items: usize) -> WeightSample {
    let total: usize = parts.iter().map(|(_, w)| w.len()).sum();
    let mut weights = Vec::with_capacity(total);
    let mut edge_count = 0;
    for (count, part) in parts {
        edge_count += count;
        weights.extend(part);
    }

    let density = density(edge_count, n_items);
    info!("sampled weight count: {}", weights.len());
    info!("edge count: {}", edge_count);
    info!("density: {}", density);

    WeightSample {
        n_items,
        weights,
        edge_count,
        density,
    }
}

impl InfluenceGraph {
    /// Convert the edges to a record batch of `source`, `destination`, `weight`.
    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        COOMatrix::from_coords(&self.edges).into_record_batch("source", "destination", "weight")
    }

    /// Count items with no outgoing edges.
    pub fn zero_out_degree(&self) -> usize {
        let mut has_edge = vec![false; self.n_items];
        for e in &self.edges {
            has_edge[e.row as usize] = true;
        }
        has_edge.iter().filter(|b| !**b).count()
    }

    /// Count items with no incoming edges.
    pub fn zero_in_degree(&self) -> usize {
        let mut has_edge = vec![false; self.n_items];
        for e in &self.edges {
            has_edge[e.col as usize] = true;
        }
        has_edge.iter().filter(|b| !**b).count()
    }
}

impl WeightSample {
    /// Convert the sample to a single-column record batch.
    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        let array = Float32Array::from(self.weights.clone());
        RecordBatch::try_from_iter(vec![("weight", Arc::new(array) as ArrayRef)])
    }

    /// Summarize the distribution of sampled weights.
    pub fn stats(&self) -> Option<WeightStats> {
        let mut sorted: Vec<NotNan<f32>> = self
            .weights
            .iter()
            .filter_map(|w| NotNan::new(*w).ok())
            .collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_unstable();

        let n = sorted.len();
        let sum: f64 = sorted.iter().map(|w| w.into_inner() as f64).sum();
        let median = if n % 2 == 1 {
            sorted[n / 2].into_inner()
        } else {
            (sorted[n / 2 - 1].into_inner() + sorted[n / 2].into_inner()) / 2.0
        };

        Some(WeightStats {
            count: n,
            min: sorted[0].into_inner(),
            max: sorted[n - 1].into_inner(),
            mean: sum / n as f64,
            median,
        })
    }
}

/// Distribution summary of a weight sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightStats {
    pub count: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f64,
    pub median: f32,
}

/// Summary of one run, for diagnostics and the optional summary file.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub mode: Mode,
    pub n_rows: usize,
    pub n_items: usize,
    pub n_entries: usize,
    pub n_threads: usize,
    pub edge_count: u64,
    pub density: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_edges: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero_out_degree: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero_in_degree: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampled_weights: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_stats: Option<WeightStats>,
}

impl GraphSummary {
    /// Summarize a graph-build run.
    pub fn for_graph(dims: &RelationDimensions, graph: &InfluenceGraph, n_threads: usize) -> Self {
        GraphSummary {
            mode: Mode::GraphBuild,
            n_rows: dims.row_count,
            n_items: dims.col_count,
            n_entries: dims.nnz_count,
            n_threads,
            edge_count: graph.edge_count,
            density: graph.density,
            n_edges: Some(graph.edges.len()),
            zero_out_degree: Some(graph.zero_out_degree()),
            zero_in_degree: Some(graph.zero_in_degree()),
            sampled_weights: None,
            weight_stats: None,
        }
    }

    /// Summarize a sampling run.
    pub fn for_sample(dims: &RelationDimensions, sample: &WeightSample, n_threads: usize) -> Self {
        GraphSummary {
            mode: Mode::Sampling,
            n_rows: dims.row_count,
            n_items: dims.col_count,
            n_entries: dims.nnz_count,
            n_threads,
            edge_count: sample.edge_count,
            density: sample.density,
            n_edges: None,
            zero_out_degree: None,
            zero_in_degree: None,
            sampled_weights: Some(sample.weights.len()),
            weight_stats: sample.stats(),
        }
    }
}

#[test]
fn test_density_formula() {
    assert_eq!(density(6, 4), 0.5);
}

#[test]
fn test_density_degenerate() {
    assert_eq!(density(0, 0), 0.0);
    assert_eq!(density(0, 1), 0.0);
}

#[test]
fn test_merge_edges_doubles_count() {
    let graph = merge_edges(
        vec![
            vec![WeightedCoordinate::new(0, 1, 0.5)],
            vec![],
            vec![
                WeightedCoordinate::new(1, 0, 0.75),
                WeightedCoordinate::new(2, 3, 1.0),
            ],
        ],
        4,
    );
    assert_eq!(graph.edges.len(), 3);
    assert_eq!(graph.edge_count, 6);
    assert_eq!(graph.density, 0.5);
}

#[test]
fn test_merge_samples() {
    let sample = merge_samples(vec![(4, vec![0.5]), (2, vec![]), (6, vec![1.0, 0.25])], 4);
    assert_eq!(sample.edge_count, 12);
    assert_eq!(sample.density, 1.0);
    let mut weights = sample.weights.clone();
    weights.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(weights, vec![0.25, 0.5, 1.0]);
}

#[test]
fn test_degree_counts() {
    let graph = merge_edges(
        vec![vec![
            WeightedCoordinate::new(0, 1, 0.5),
            WeightedCoordinate::new(1, 0, 0.5),
            WeightedCoordinate::new(2, 1, 0.5),
        ]],
        4,
    );
    // sources 0, 1, 2; destinations 0, 1
    assert_eq!(graph.zero_out_degree(), 1);
    assert_eq!(graph.zero_in_degree(), 2);
}

#[test]
fn test_weight_stats() {
    let sample = merge_samples(vec![(8, vec![1.0, 0.25, 0.5, 0.75])], 3);
    let stats = sample.stats().expect("no stats");
    assert_eq!(stats.count, 4);
    assert_eq!(stats.min, 0.25);
    assert_eq!(stats.max, 1.0);
    assert_eq!(stats.median, 0.625);
    assert!((stats.mean - 0.625).abs() < 1e-9);
}

#[test]
fn test_empty_stats() {
    let sample = merge_samples(vec![], 3);
    assert!(sample.stats().is_none());
    assert_eq!(sample.edge_count, 0);
}

#[test]
fn test_edge_batch() {
    let graph = merge_edges(vec![vec![WeightedCoordinate::new(2, 5, 0.5)]], 6);
    let batch = graph.to_record_batch().expect("batch failed");
    assert_eq!(batch.num_rows(), 1);
    assert_eq!(batch.schema().field(1).name(), "destination");
}

#[test]
fn test_summary_json_skips_absent() {
    let summary = GraphSummary {
        mode: Mode::Sampling,
        n_rows: 10,
        n_items: 4,
        n_entries: 12,
        n_threads: 2,
        edge_count: 6,
        density: 0.5,
        n_edges: None,
        zero_out_degree: None,
        zero_in_degree: None,
        sampled_weights: Some(3),
        weight_stats: None,
    };
    let json = serde_json::to_value(&summary).expect("serialize failed");
    assert_eq!(json["mode"], "sampling");
    assert_eq!(json["sampled_weights"], 3);
    assert!(json.get("n_edges").is_none());
}
