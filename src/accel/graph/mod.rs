// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Item influence graph pipeline.
//!
//! A run reads the relation, indexes users by item, sweeps all item pairs on
//! a dedicated worker pool, merges the workers' results, and writes them.

use std::path::Path;

use log::*;

use crate::{
    aggregate::{GraphSummary, InfluenceGraph, WeightSample},
    config::RunConfig,
    data::AdjacencyIndex,
    errors::Result,
    output::{write_edges_file, write_weights_file},
    parallel::sweep_pool,
    progress::ProgressHandle,
    similarity::{sweep, EdgeCollector, PartialResult, WeightSampler},
    sparse::{read_mtx, RelationDimensions},
};

#[cfg(feature = "python")]
mod bindings;

#[cfg(feature = "python")]
pub use bindings::register_graph;

/// A relation loaded and indexed for sweeping.
pub struct LoadedRelation {
    pub dims: RelationDimensions,
    pub index: AdjacencyIndex,
}

/// Read and index a relation file.
pub fn load_relation<P: AsRef<Path>>(path: P) -> Result<LoadedRelation> {
    let (coords, dims) = read_mtx(path)?;
    let index = AdjacencyIndex::build(&coords, dims.col_count)?;
    info!(
        "indexed {} items ({} with users)",
        index.len(),
        index.n_active()
    );
    Ok(LoadedRelation { dims, index })
}

/// Run a sweep on its own worker pool and merge the results.
fn run_sweep<P, F>(
    index: &AdjacencyIndex,
    config: &RunConfig,
    pb: &ProgressHandle,
    init: F,
) -> Result<(P::Output, usize)>
where
    P: PartialResult,
    F: Fn() -> P + Sync + Send,
{
    config.validate()?;
    let pool = sweep_pool(config.n_threads)?;
    let n_threads = pool.current_num_threads();
    info!("running on {} threads", n_threads);

    let parts = pool.install(|| sweep(index, config.chunk_size, pb, init));
    drop(pool);

    Ok((P::merge(parts, index.len()), n_threads))
}

/// Compute the thresholded directed graph over an indexed relation.
pub fn compute_influence_graph(
    index: &AdjacencyIndex,
    config: &RunConfig,
    pb: &ProgressHandle,
) -> Result<(InfluenceGraph, usize)> {
    info!("threshold: {}", config.threshold);
    let threshold = config.threshold;
    run_sweep(index, config, pb, || EdgeCollector::new(threshold))
}

/// Compute the edge tally and weight sample over an indexed relation.
pub fn compute_weight_sample(
    index: &AdjacencyIndex,
    config: &RunConfig,
    pb: &ProgressHandle,
) -> Result<(WeightSample, usize)> {
    debug!(
        "sampling rows where i % {} == {}",
        config.sample_stride, config.sample_offset
    );
    let (stride, offset) = (config.sample_stride, config.sample_offset);
    run_sweep(index, config, pb, || WeightSampler::new(stride, offset))
}

/// Build the influence graph for a relation file and write its edge list.
pub fn build_influence_graph<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &RunConfig,
) -> Result<GraphSummary> {
    config.validate()?;
    let rel = load_relation(input)?;
    let pb = ProgressHandle::new(rel.index.len());
    let (graph, n_threads) = compute_influence_graph(&rel.index, config, &pb)?;
    write_edges_file(output, &graph)?;
    Ok(GraphSummary::for_graph(&rel.dims, &graph, n_threads))
}

/// Sample edge weights for a relation file and write the sample.
pub fn sample_edge_weights<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &RunConfig,
) -> Result<GraphSummary> {
    config.validate()?;
    let rel = load_relation(input)?;
    let pb = ProgressHandle::new(rel.index.len());
    let (sample, n_threads) = compute_weight_sample(&rel.index, config, &pb)?;
    write_weights_file(output, &sample)?;
    Ok(GraphSummary::for_sample(&rel.dims, &sample, n_threads))
}

#[cfg(test)]
mod tests;
