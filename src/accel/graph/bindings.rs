// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Python entry points for the influence graph.

use std::path::PathBuf;

use arrow::{array::RecordBatch, pyarrow::PyArrowType};
use log::*;
use numpy::PyArray1;
use pyo3::{exceptions::PyRuntimeError, prelude::*};

use crate::{
    aggregate::GraphSummary,
    config::{Mode, RunConfig},
    errors::GraphError,
    output::{write_edges_file, write_weights_file, EDGE_FILE, WEIGHT_LIST_FILE},
    progress::ProgressHandle,
};

use super::{compute_influence_graph, compute_weight_sample, load_relation};

/// Register the lenskit._accel.graph module
pub fn register_graph(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let graph = PyModule::new(parent.py(), "graph")?;
    parent.add_submodule(&graph)?;
    graph.add_function(wrap_pyfunction!(influence_edges, &graph)?)?;
    graph.add_function(wrap_pyfunction!(sample_weights, &graph)?)?;
    graph.add_function(wrap_pyfunction!(write_influence_graph, &graph)?)?;
    graph.add_function(wrap_pyfunction!(write_weight_sample, &graph)?)?;
    Ok(())
}

fn graph_config(threshold: f32, chunk_size: usize, n_threads: Option<usize>) -> PyResult<RunConfig> {
    let config = RunConfig {
        threshold,
        chunk_size,
        n_threads,
        ..RunConfig::for_mode(Mode::GraphBuild)
    };
    config.validate()?;
    Ok(config)
}

fn sample_config(
    stride: usize,
    offset: usize,
    chunk_size: usize,
    n_threads: Option<usize>,
) -> PyResult<RunConfig> {
    let config = RunConfig {
        sample_stride: stride,
        sample_offset: offset,
        chunk_size,
        n_threads,
        ..RunConfig::for_mode(Mode::Sampling)
    };
    config.validate()?;
    Ok(config)
}

fn summary_json(summary: &GraphSummary) -> PyResult<String> {
    serde_json::to_string(summary)
        .map_err(|e| PyRuntimeError::new_err(format!("cannot encode summary: {}", e)))
}

/// Compute the thresholded influence edges of a relation file.
///
/// Returns the edges as a record batch, with the directed edge count and density.
#[pyfunction]
#[pyo3(signature=(path, *, threshold=0.25, chunk_size=30, n_threads=None, progress=None))]
pub fn influence_edges<'py>(
    py: Python<'py>,
    path: PathBuf,
    threshold: f32,
    chunk_size: usize,
    n_threads: Option<usize>,
    progress: Option<Bound<'py, PyAny>>,
) -> PyResult<(PyArrowType<RecordBatch>, u64, f64)> {
    let config = graph_config(threshold, chunk_size, n_threads)?;
    let rel = py.detach(|| load_relation(&path))?;
    let pb = ProgressHandle::from_input(rel.index.len(), progress);

    let (graph, _n_threads) = py.detach(|| compute_influence_graph(&rel.index, &config, &pb))?;
    let batch = graph.to_record_batch().map_err(GraphError::from)?;
    Ok((batch.into(), graph.edge_count, graph.density))
}

/// Sample pair weights of a relation file.
///
/// Returns the weight sample, with the directed edge count and density.
#[pyfunction]
#[pyo3(signature=(path, *, stride=500, offset=250, chunk_size=100, n_threads=None, progress=None))]
pub fn sample_weights<'py>(
    py: Python<'py>,
    path: PathBuf,
    stride: usize,
    offset: usize,
    chunk_size: usize,
    n_threads: Option<usize>,
    progress: Option<Bound<'py, PyAny>>,
) -> PyResult<(Bound<'py, PyArray1<f32>>, u64, f64)> {
    let config = sample_config(stride, offset, chunk_size, n_threads)?;
    let rel = py.detach(|| load_relation(&path))?;
    let pb = ProgressHandle::from_input(rel.index.len(), progress);

    let (sample, _n_threads) = py.detach(|| compute_weight_sample(&rel.index, &config, &pb))?;
    let (edge_count, density) = (sample.edge_count, sample.density);
    Ok((PyArray1::from_vec(py, sample.weights), edge_count, density))
}

/// Build the influence graph of a relation file and write it as CSV.
///
/// The output defaults to `edges.csv` in the working directory. Returns the
/// run summary as JSON.
#[pyfunction]
#[pyo3(signature=(path, output=None, *, threshold=0.25, chunk_size=30, n_threads=None, progress=None))]
pub fn write_influence_graph<'py>(
    py: Python<'py>,
    path: PathBuf,
    output: Option<PathBuf>,
    threshold: f32,
    chunk_size: usize,
    n_threads: Option<usize>,
    progress: Option<Bound<'py, PyAny>>,
) -> PyResult<String> {
    let config = graph_config(threshold, chunk_size, n_threads)?;
    let output = output.unwrap_or_else(|| PathBuf::from(EDGE_FILE));
    let rel = py.detach(|| load_relation(&path))?;
    let pb = ProgressHandle::from_input(rel.index.len(), progress);

    let summary = py.detach(|| {
        let (graph, n_threads) = compute_influence_graph(&rel.index, &config, &pb)?;
        write_edges_file(&output, &graph)?;
        Ok::<_, GraphError>(GraphSummary::for_graph(&rel.dims, &graph, n_threads))
    })?;
    debug!("wrote influence graph to {}", output.display());
    summary_json(&summary)
}

/// Sample pair weights of a relation file and write the sample.
///
/// The output defaults to `../weight_list.txt`. Returns the run summary as JSON.
#[pyfunction]
#[pyo3(signature=(path, output=None, *, stride=500, offset=250, chunk_size=100, n_threads=None, progress=None))]
pub fn write_weight_sample<'py>(
    py: Python<'py>,
    path: PathBuf,
    output: Option<PathBuf>,
    stride: usize,
    offset: usize,
    chunk_size: usize,
    n_threads: Option<usize>,
    progress: Option<Bound<'py, PyAny>>,
) -> PyResult<String> {
    let config = sample_config(stride, offset, chunk_size, n_threads)?;
    let output = output.unwrap_or_else(|| PathBuf::from(WEIGHT_LIST_FILE));
    let rel = py.detach(|| load_relation(&path))?;
    let pb = ProgressHandle::from_input(rel.index.len(), progress);

    let summary = py.detach(|| {
        let (sample, n_threads) = compute_weight_sample(&rel.index, &config, &pb)?;
        write_weights_file(&output, &sample)?;
        Ok::<_, GraphError>(GraphSummary::for_sample(&rel.dims, &sample, n_threads))
    })?;
    debug!("wrote weight sample to {}", output.display());
    summary_json(&summary)
}
