// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use log::*;
#[cfg(feature = "python")]
use pyo3::{exceptions::PyRuntimeError, prelude::*};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::errors::{GraphError, Result};

#[cfg(feature = "python")]
#[pyfunction]
pub fn init_accel_pool(n_threads: usize) -> PyResult<()> {
    debug!(
        "initializing accelerator thread pool with {} threads",
        n_threads
    );
    ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
        .map_err(|_| PyErr::new::<PyRuntimeError, _>("Rayon initialization error"))
}

#[cfg(feature = "python")]
#[pyfunction]
pub fn thread_count() -> PyResult<usize> {
    Ok(rayon::current_num_threads())
}

/// Build the worker pool for one sweep.
///
/// With no explicit count, the pool is sized to the available hardware
/// parallelism. Work submitted with `install` has finished when `install`
/// returns; dropping the pool only signals its threads to exit.
pub fn sweep_pool(n_threads: Option<usize>) -> Result<ThreadPool> {
    let n = match n_threads {
        Some(n) => n,
        None => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
    };
    debug!("starting sweep pool with {} threads", n);
    ThreadPoolBuilder::new()
        .num_threads(n)
        .thread_name(|i| format!("influence-sweep-{}", i))
        .build()
        .map_err(|e| GraphError::ThreadPool(e.to_string()))
}

#[test]
fn test_explicit_pool() {
    let pool = sweep_pool(Some(3)).expect("pool failed");
    assert_eq!(pool.current_num_threads(), 3);
}

#[test]
fn test_default_pool() {
    let pool = sweep_pool(None).expect("pool failed");
    assert!(pool.current_num_threads() >= 1);
}
