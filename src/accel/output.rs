// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Writing sweep results to disk.
//!
//! The edge list is written as CSV with a `source,destination,weight`
//! header; the weight sample as bare values, one per line.

use std::{fs::File, io::Write, path::Path};

use arrow::csv::WriterBuilder;
use log::*;

use crate::{
    aggregate::{GraphSummary, InfluenceGraph, WeightSample},
    errors::{GraphError, Result},
};

/// Conventional name of the edge list file.
pub const EDGE_FILE: &str = "edges.csv";
/// Conventional location of the weight sample, one level above the working directory.
pub const WEIGHT_LIST_FILE: &str = "../weight_list.txt";

/// Write the graph's edges as CSV.
pub fn write_edges<W: Write>(out: W, graph: &InfluenceGraph) -> Result<()> {
    let batch = graph.to_record_batch()?;
    let mut writer = WriterBuilder::new().with_header(true).build(out);
    writer.write(&batch)?;
    Ok(())
}

/// Write the weight sample, one weight per line.
pub fn write_weights<W: Write>(out: W, sample: &WeightSample) -> Result<()> {
    let batch = sample.to_record_batch()?;
    let mut writer = WriterBuilder::new().with_header(false).build(out);
    writer.write(&batch)?;
    Ok(())
}

pub fn write_edges_file<P: AsRef<Path>>(path: P, graph: &InfluenceGraph) -> Result<()> {
    let path = path.as_ref();
    debug!("writing {} edges to {}", graph.edges.len(), path.display());
    let file = File::create(path).map_err(|e| GraphError::io(path, e))?;
    write_edges(file, graph)
}

pub fn write_weights_file<P: AsRef<Path>>(path: P, sample: &WeightSample) -> Result<()> {
    let path = path.as_ref();
    debug!(
        "writing {} sampled weights to {}",
        sample.weights.len(),
        path.display()
    );
    let file = File::create(path).map_err(|e| GraphError::io(path, e))?;
    write_weights(file, sample)
}

/// Write a run summary as JSON.
pub fn write_summary<P: AsRef<Path>>(path: P, summary: &GraphSummary) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| GraphError::io(path, e))?;
    serde_json::to_writer_pretty(file, summary).map_err(|e| GraphError::io(path, e.into()))
}

#[cfg(test)]
use crate::{
    aggregate::{merge_edges, merge_samples},
    sparse::WeightedCoordinate,
};

#[cfg(test)]
fn parse_edge_lines(text: &str) -> Vec<(u32, u32, f32)> {
    text.lines()
        .skip(1)
        .map(|l| {
            let f: Vec<&str> = l.split(',').collect();
            assert_eq!(f.len(), 3, "bad line {:?}", l);
            (
                f[0].parse().unwrap(),
                f[1].parse().unwrap(),
                f[2].parse().unwrap(),
            )
        })
        .collect()
}

#[test]
fn test_edge_csv() {
    let graph = merge_edges(
        vec![vec![
            WeightedCoordinate::new(0, 1, 0.5),
            WeightedCoordinate::new(1, 0, 2.0 / 3.0),
        ]],
        2,
    );
    let mut buf = Vec::new();
    write_edges(&mut buf, &graph).expect("write failed");
    let text = String::from_utf8(buf).expect("invalid utf8");

    assert_eq!(text.lines().next(), Some("source,destination,weight"));
    assert_eq!(
        parse_edge_lines(&text),
        vec![(0, 1, 0.5), (1, 0, 2.0 / 3.0)]
    );
}

#[test]
fn test_empty_edge_csv_has_header() {
    let graph = merge_edges(vec![], 3);
    let mut buf = Vec::new();
    write_edges(&mut buf, &graph).expect("write failed");
    let text = String::from_utf8(buf).expect("invalid utf8");
    assert_eq!(text.trim_end(), "source,destination,weight");
}

#[test]
fn test_weight_list() {
    let sample = merge_samples(vec![(4, vec![0.25, 1.0])], 3);
    let mut buf = Vec::new();
    write_weights(&mut buf, &sample).expect("write failed");
    let text = String::from_utf8(buf).expect("invalid utf8");
    let weights: Vec<f32> = text.lines().map(|l| l.parse().unwrap()).collect();
    assert_eq!(weights, vec![0.25, 1.0]);
}

#[test]
fn test_unwritable_destination() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let graph = merge_edges(vec![], 2);
    let res = write_edges_file(dir.path().join("missing").join(EDGE_FILE), &graph);
    assert!(matches!(res, Err(GraphError::Io { .. })));
}

#[test]
fn test_summary_file() {
    use crate::config::Mode;

    let dir = tempfile::tempdir().expect("tempdir failed");
    let path = dir.path().join("summary.json");
    let summary = GraphSummary {
        mode: Mode::GraphBuild,
        n_rows: 3,
        n_items: 2,
        n_entries: 4,
        n_threads: 1,
        edge_count: 4,
        density: 2.0,
        n_edges: Some(2),
        zero_out_degree: Some(0),
        zero_in_degree: Some(0),
        sampled_weights: None,
        weight_stats: None,
    };
    write_summary(&path, &summary).expect("write failed");
    let text = std::fs::read_to_string(&path).expect("read failed");
    let json: serde_json::Value = serde_json::from_str(&text).expect("invalid json");
    assert_eq!(json["mode"], "graph-build");
    assert_eq!(json["n_edges"], 2);
}
