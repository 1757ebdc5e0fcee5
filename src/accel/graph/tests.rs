// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use std::{collections::HashSet, fs, io::Write, path::Path};

use proptest::prelude::*;

use crate::{
    config::{Mode, RunConfig},
    data::AdjacencyIndex,
    errors::GraphError,
    output::{EDGE_FILE, WEIGHT_LIST_FILE},
    progress::ProgressHandle,
    similarity::index_from_sets,
    sparse::WeightedCoordinate,
};

use super::*;

fn config_with(threshold: f32, n_threads: usize) -> RunConfig {
    RunConfig {
        threshold,
        n_threads: Some(n_threads),
        ..RunConfig::default()
    }
}

fn edge_set(edges: &[WeightedCoordinate]) -> HashSet<(u32, u32, u32)> {
    edges
        .iter()
        .map(|e| (e.row, e.col, e.weight.to_bits()))
        .collect()
}

fn graph_of(index: &AdjacencyIndex, config: &RunConfig) -> InfluenceGraph {
    let pb = ProgressHandle::new(index.len());
    let (graph, _) = compute_influence_graph(index, config, &pb).expect("sweep failed");
    graph
}

fn sample_of(index: &AdjacencyIndex, config: &RunConfig) -> WeightSample {
    let pb = ProgressHandle::new(index.len());
    let (sample, _) = compute_weight_sample(index, config, &pb).expect("sweep failed");
    sample
}

fn write_mtx(path: &Path, n_rows: usize, n_cols: usize, entries: &[(u32, u32, f32)]) {
    let mut file = fs::File::create(path).expect("create failed");
    writeln!(file, "% test relation").unwrap();
    writeln!(file, "{} {} {}", n_rows, n_cols, entries.len()).unwrap();
    for (r, c, w) in entries {
        writeln!(file, "{} {} {}", r, c, w).unwrap();
    }
}

#[test]
fn test_containment_edges() {
    // A = {1, 2, 3}, B = {2, 3, 4, 5}
    let index = index_from_sets(&[&[1, 2, 3], &[2, 3, 4, 5]]);

    let graph = graph_of(&index, &config_with(0.25, 2));
    let expected = edge_set(&[
        WeightedCoordinate::new(0, 1, 0.5),
        WeightedCoordinate::new(1, 0, 2.0 / 3.0),
    ]);
    assert_eq!(edge_set(&graph.edges), expected);
    assert_eq!(graph.edge_count, 4);
    assert_eq!(graph.density, 2.0);

    let graph = graph_of(&index, &config_with(0.6, 2));
    assert_eq!(
        edge_set(&graph.edges),
        edge_set(&[WeightedCoordinate::new(1, 0, 2.0 / 3.0)])
    );
}

#[test]
fn test_disjoint_items_contribute_nothing() {
    // C = {9}, D = {10}, plus an empty item
    let index = index_from_sets(&[&[9], &[10], &[]]);

    let graph = graph_of(&index, &config_with(0.0, 2));
    assert!(graph.edges.is_empty());
    assert_eq!(graph.edge_count, 0);
    assert_eq!(graph.density, 0.0);

    let sample = sample_of(
        &index,
        &RunConfig {
            sample_stride: 1,
            sample_offset: 0,
            ..RunConfig::for_mode(Mode::Sampling)
        },
    );
    assert_eq!(sample.edge_count, 0);
    assert!(sample.weights.is_empty());
}

#[test]
fn test_disjoint_pair_leaves_counts_unchanged() {
    let with_pair = index_from_sets(&[&[1, 2, 3], &[2, 3, 4, 5], &[9], &[10]]);
    let without = index_from_sets(&[&[1, 2, 3], &[2, 3, 4, 5], &[], &[]]);
    let cfg = RunConfig::for_mode(Mode::Sampling);
    assert_eq!(
        sample_of(&with_pair, &cfg).edge_count,
        sample_of(&without, &cfg).edge_count
    );
    assert_eq!(
        graph_of(&with_pair, &cfg).edges.len(),
        graph_of(&without, &cfg).edges.len()
    );
}

#[test]
fn test_sampling_counts_two_per_pair() {
    // pairs (0,1), (0,2), (1,2) overlap; (0,3), (1,3), (2,3) do not
    let index = index_from_sets(&[&[1, 2], &[2, 3], &[1, 3, 4, 5], &[7]]);
    let sample = sample_of(
        &index,
        &RunConfig {
            sample_stride: 1,
            sample_offset: 0,
            threshold: 0.99,
            ..RunConfig::for_mode(Mode::Sampling)
        },
    );
    assert_eq!(sample.edge_count, 6);
    assert_eq!(sample.density, 0.5);

    let mut weights = sample.weights.clone();
    weights.sort_by(|a, b| a.total_cmp(b));
    // (0,1): 1/2, (0,2): 1/2, (1,2): 1/2
    assert_eq!(weights, vec![0.5, 0.5, 0.5]);
}

#[test]
fn test_sampling_stride_rows() {
    // every item shares user 0, so every pair overlaps
    let mut coords: Vec<_> = (0..1000u32)
        .map(|c| WeightedCoordinate::new(0, c, 1.0))
        .collect();
    // item 250 and item 750 also have a private user, to tell their weights apart
    coords.push(WeightedCoordinate::new(1, 250, 1.0));
    coords.push(WeightedCoordinate::new(2, 750, 1.0));
    let index = AdjacencyIndex::build(&coords, 1000).expect("index failed");

    for n_threads in [1, 3, 8] {
        let cfg = RunConfig {
            n_threads: Some(n_threads),
            chunk_size: 7,
            ..RunConfig::for_mode(Mode::Sampling)
        };
        let sample = sample_of(&index, &cfg);
        assert_eq!(sample.edge_count, 1000 * 999);
        // 749 pairs with outer index 250, 249 with outer index 750
        assert_eq!(sample.weights.len(), 749 + 249);
        // the pair (250, 750) shares one of two users; all others share their only user
        assert_eq!(sample.weights.iter().filter(|w| **w == 0.5).count(), 1);
        assert_eq!(sample.weights.iter().filter(|w| **w == 1.0).count(), 997);
    }
}

#[test]
fn test_repeat_runs_same_edge_set() {
    let index = index_from_sets(&[
        &[1, 2, 3],
        &[2, 3, 4, 5],
        &[1, 5],
        &[],
        &[3, 4, 6, 7, 8],
        &[8],
        &[1, 2, 3, 4, 5, 6, 7, 8],
    ]);
    let cfg = RunConfig {
        chunk_size: 1,
        ..config_with(0.25, 4)
    };
    let first = graph_of(&index, &cfg);
    let second = graph_of(&index, &cfg);
    assert_eq!(edge_set(&first.edges), edge_set(&second.edges));
    assert_eq!(first.edges.len(), edge_set(&first.edges).len());
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let input = dir.path().join("ratings.mtx");
    let output = dir.path().join(EDGE_FILE);
    // item 0: {1, 2, 3}; item 1: {2, 3, 4, 5}; item 2: {9}; item 3: {10}
    write_mtx(
        &input,
        11,
        4,
        &[
            (1, 0, 4.0),
            (2, 0, 3.5),
            (3, 0, 5.0),
            (2, 1, 1.0),
            (3, 1, 2.0),
            (4, 1, 3.0),
            (5, 1, 4.0),
            (9, 2, 2.5),
            (10, 3, 3.0),
        ],
    );

    let summary = build_influence_graph(&input, &output, &config_with(0.25, 2))
        .expect("graph build failed");
    assert_eq!(summary.mode, Mode::GraphBuild);
    assert_eq!(summary.n_items, 4);
    assert_eq!(summary.n_entries, 9);
    assert_eq!(summary.n_edges, Some(2));
    assert_eq!(summary.edge_count, 4);
    assert_eq!(summary.density, 4.0 / 12.0);
    assert_eq!(summary.zero_out_degree, Some(2));
    assert_eq!(summary.n_threads, 2);

    let text = fs::read_to_string(&output).expect("read failed");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("source,destination,weight"));
    let edges: HashSet<(u32, u32, u32)> = lines
        .map(|l| {
            let f: Vec<&str> = l.split(',').collect();
            let w: f32 = f[2].parse().unwrap();
            (f[0].parse().unwrap(), f[1].parse().unwrap(), w.to_bits())
        })
        .collect();
    assert_eq!(
        edges,
        edge_set(&[
            WeightedCoordinate::new(0, 1, 0.5),
            WeightedCoordinate::new(1, 0, 2.0 / 3.0),
        ])
    );
}

#[test]
fn test_sample_file() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let input = dir.path().join("ratings.mtx");
    // the weight list lands beside the run directory
    let run_dir = dir.path().join("run");
    fs::create_dir(&run_dir).expect("mkdir failed");
    let output = run_dir.join(WEIGHT_LIST_FILE);
    write_mtx(
        &input,
        6,
        3,
        &[(1, 0, 1.0), (2, 0, 1.0), (2, 1, 1.0), (3, 1, 1.0), (1, 2, 1.0)],
    );

    let cfg = RunConfig {
        sample_stride: 2,
        sample_offset: 0,
        n_threads: Some(2),
        ..RunConfig::for_mode(Mode::Sampling)
    };
    let summary = sample_edge_weights(&input, &output, &cfg).expect("sampling failed");
    // pairs (0,1) and (0,2) overlap, (1,2) does not
    assert_eq!(summary.edge_count, 4);
    assert_eq!(summary.sampled_weights, Some(2));
    let stats = summary.weight_stats.expect("missing stats");
    assert_eq!(stats.min, 0.5);
    assert_eq!(stats.max, 1.0);

    let text = fs::read_to_string(dir.path().join("weight_list.txt")).expect("read failed");
    let mut weights: Vec<f32> = text.lines().map(|l| l.parse().unwrap()).collect();
    weights.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(weights, vec![0.5, 1.0]);
}

#[test]
fn test_malformed_input_fails_before_output() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let input = dir.path().join("bad.mtx");
    let output = dir.path().join(EDGE_FILE);
    fs::write(&input, "3 3 2\n0 0 1\n").expect("write failed");

    let res = build_influence_graph(&input, &output, &RunConfig::default());
    assert!(matches!(res, Err(GraphError::Format { .. })));
    assert!(!output.exists());
}

#[test]
fn test_column_outside_declared_range() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let input = dir.path().join("bad.mtx");
    write_mtx(&input, 2, 2, &[(0, 0, 1.0), (1, 2, 1.0)]);
    let res = load_relation(&input);
    assert!(matches!(res, Err(GraphError::Format { .. })));
}

#[test]
fn test_invalid_config_rejected() {
    let index = index_from_sets(&[&[1], &[1]]);
    let pb = ProgressHandle::new(index.len());
    let cfg = RunConfig {
        chunk_size: 0,
        ..RunConfig::default()
    };
    let res = compute_influence_graph(&index, &cfg, &pb);
    assert!(matches!(res, Err(GraphError::Config(_))));
}

fn brute_force_edges(sets: &[Vec<u32>], threshold: f32) -> HashSet<(u32, u32, u32)> {
    let mut edges = HashSet::new();
    for i in 0..sets.len() {
        for j in 0..sets.len() {
            if i == j || sets[i].is_empty() || sets[j].is_empty() {
                continue;
            }
            let si: HashSet<_> = sets[i].iter().collect();
            let sj: HashSet<_> = sets[j].iter().collect();
            let inter = si.intersection(&sj).count();
            if inter == 0 {
                continue;
            }
            let w = inter as f32 / sj.len() as f32;
            if w > threshold {
                edges.insert((i as u32, j as u32, w.to_bits()));
            }
        }
    }
    edges
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_matches_brute_force(
        sets in prop::collection::vec(prop::collection::vec(0u32..12, 0..6), 0..15),
        threshold in 0.0f32..1.0,
        n_threads in 1usize..5,
        chunk_size in 1usize..4,
    ) {
        let slices: Vec<&[u32]> = sets.iter().map(|s| s.as_slice()).collect();
        let index = index_from_sets(&slices);
        let cfg = RunConfig {
            chunk_size,
            ..config_with(threshold, n_threads)
        };
        let graph = graph_of(&index, &cfg);
        prop_assert_eq!(edge_set(&graph.edges), brute_force_edges(&sets, threshold));
        prop_assert_eq!(graph.edges.len(), edge_set(&graph.edges).len());
    }

    #[test]
    fn test_thread_count_does_not_change_results(
        sets in prop::collection::vec(prop::collection::vec(0u32..20, 0..8), 0..25),
        n_threads in 2usize..6,
    ) {
        let slices: Vec<&[u32]> = sets.iter().map(|s| s.as_slice()).collect();
        let index = index_from_sets(&slices);
        let serial = graph_of(&index, &config_with(0.25, 1));
        let parallel = graph_of(&index, &config_with(0.25, n_threads));
        prop_assert_eq!(edge_set(&serial.edges), edge_set(&parallel.edges));

        let cfg = RunConfig { sample_stride: 3, sample_offset: 1, ..RunConfig::for_mode(Mode::Sampling) };
        let s1 = sample_of(&index, &RunConfig { n_threads: Some(1), ..cfg.clone() });
        let s2 = sample_of(&index, &RunConfig { n_threads: Some(n_threads), ..cfg });
        prop_assert_eq!(s1.edge_count, s2.edge_count);
        let mut w1 = s1.weights.clone();
        let mut w2 = s2.weights.clone();
        w1.sort_by(|a, b| a.total_cmp(b));
        w2.sort_by(|a, b| a.total_cmp(b));
        prop_assert_eq!(w1, w2);
    }
}
