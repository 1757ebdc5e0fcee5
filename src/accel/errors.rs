// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Error types for the influence graph pipeline.

use std::{io, path::PathBuf};

use arrow::error::ArrowError;
use thiserror::Error;

/// Errors that can be raised while building an influence graph.
#[derive(Error, Debug)]
pub enum GraphError {
    /// An input or output file could not be opened, read, created, or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The input relation is malformed.
    ///
    /// Line numbers are 1-based; line 0 denotes a whole-file condition.
    #[error("format error at line {line}: {message}")]
    Format { line: usize, message: String },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("error writing output table: {0}")]
    Output(#[from] ArrowError),
    #[error("could not start worker pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;

impl GraphError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GraphError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        GraphError::Format {
            line,
            message: message.into(),
        }
    }
}

#[cfg(feature = "python")]
impl From<GraphError> for pyo3::PyErr {
    fn from(value: GraphError) -> Self {
        use pyo3::exceptions::{PyOSError, PyRuntimeError, PyValueError};

        match value {
            GraphError::Io { .. } => PyOSError::new_err(format!("{}", value)),
            GraphError::Format { .. } | GraphError::Config(_) => {
                PyValueError::new_err(format!("{}", value))
            }
            _ => PyRuntimeError::new_err(format!("{}", value)),
        }
    }
}

#[test]
fn test_format_message() {
    let err = GraphError::format(3, "expected 3 fields, found 2");
    assert_eq!(
        err.to_string(),
        "format error at line 3: expected 3 fields, found 2"
    );
}

#[test]
fn test_io_message_names_path() {
    let err = GraphError::io(
        "missing.mtx",
        io::Error::new(io::ErrorKind::NotFound, "not found"),
    );
    assert!(err.to_string().contains("missing.mtx"));
}
