// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Accelerated item influence graph construction.
//!
//! Items are linked by how much of one item's audience another item shares:
//! the directed weight `i → j` is the number of users the two items have in
//! common divided by the number of users of `j`.

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod aggregate;
pub mod config;
pub mod data;
pub mod errors;
pub mod graph;
pub mod output;
pub mod parallel;
pub mod progress;
pub mod similarity;
pub mod sparse;

pub use aggregate::{density, GraphSummary, InfluenceGraph, WeightSample, WeightStats};
pub use config::{Mode, RunConfig};
pub use data::AdjacencyIndex;
pub use errors::{GraphError, Result};
pub use graph::{
    build_influence_graph, compute_influence_graph, compute_weight_sample, load_relation,
    sample_edge_weights, LoadedRelation,
};
pub use sparse::{parse_mtx, read_mtx, RelationDimensions, WeightedCoordinate};

/// Entry point for the accelerator module.
#[cfg(feature = "python")]
#[pymodule]
fn _accel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();
    graph::register_graph(m)?;

    m.add_function(wrap_pyfunction!(parallel::init_accel_pool, m)?)?;
    m.add_function(wrap_pyfunction!(parallel::thread_count, m)?)?;

    Ok(())
}
