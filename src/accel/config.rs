// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Run configuration for the similarity sweep.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::errors::{GraphError, Result};

/// What the sweep does with each similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Keep every directed edge above the threshold.
    GraphBuild,
    /// Count edges and keep a strided sample of weights.
    Sampling,
}

/// Parameters for one similarity sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Retention cutoff for graph-build mode (exclusive).
    pub threshold: f32,
    /// Sampling keeps weights for outer indices where `i % sample_stride == sample_offset`.
    pub sample_stride: usize,
    pub sample_offset: usize,
    /// Number of outer indices per scheduled task.
    pub chunk_size: usize,
    /// Worker count; `None` uses the available hardware parallelism.
    pub n_threads: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            threshold: 0.25,
            sample_stride: 500,
            sample_offset: 250,
            chunk_size: 30,
            n_threads: None,
        }
    }
}

impl RunConfig {
    /// Default configuration tuned for a mode.
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::GraphBuild => RunConfig::default(),
            Mode::Sampling => RunConfig {
                chunk_size: 100,
                ..RunConfig::default()
            },
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(json)
            .map_err(|e| GraphError::Config(format!("cannot parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| GraphError::io(path, e))?;
        Self::from_json_str(&text)
    }

    /// Check that the configuration describes a runnable sweep.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(GraphError::Config(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if self.sample_stride == 0 {
            return Err(GraphError::Config("sample stride must be positive".into()));
        }
        if self.sample_offset >= self.sample_stride {
            return Err(GraphError::Config(format!(
                "sample offset {} is not below stride {}",
                self.sample_offset, self.sample_stride
            )));
        }
        if self.chunk_size == 0 {
            return Err(GraphError::Config("chunk size must be positive".into()));
        }
        if self.n_threads == Some(0) {
            return Err(GraphError::Config("thread count must be positive".into()));
        }
        Ok(())
    }
}

#[test]
fn test_defaults_validate() {
    RunConfig::default().validate().expect("default config invalid");
    RunConfig::for_mode(Mode::Sampling)
        .validate()
        .expect("sampling config invalid");
}

#[test]
fn test_sampling_chunk() {
    assert_eq!(RunConfig::for_mode(Mode::Sampling).chunk_size, 100);
    assert_eq!(RunConfig::for_mode(Mode::GraphBuild).chunk_size, 30);
}

#[test]
fn test_json_partial() {
    let cfg = RunConfig::from_json_str(r#"{"threshold": 0.6, "n_threads": 2}"#)
        .expect("parse failed");
    assert_eq!(cfg.threshold, 0.6);
    assert_eq!(cfg.n_threads, Some(2));
    assert_eq!(cfg.sample_stride, 500);
    assert_eq!(cfg.chunk_size, 30);
}

#[test]
fn test_json_bad_offset() {
    let res = RunConfig::from_json_str(r#"{"sample_stride": 10, "sample_offset": 10}"#);
    assert!(matches!(res, Err(GraphError::Config(_))));
}

#[test]
fn test_zero_chunk() {
    let cfg = RunConfig {
        chunk_size: 0,
        ..RunConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_nan_threshold() {
    let cfg = RunConfig {
        threshold: f32::NAN,
        ..RunConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_mode_serde() {
    let json = serde_json::to_string(&Mode::GraphBuild).expect("serialize failed");
    assert_eq!(json, "\"graph-build\"");
    let mode: Mode = serde_json::from_str("\"sampling\"").expect("parse failed");
    assert_eq!(mode, Mode::Sampling);
}

#[test]
fn test_json_file() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let path = dir.path().join("run.json");
    fs::write(&path, r#"{"sample_stride": 20, "sample_offset": 5, "chunk_size": 8}"#)
        .expect("write failed");
    let cfg = RunConfig::from_json_file(&path).expect("load failed");
    assert_eq!(cfg.sample_stride, 20);
    assert_eq!(cfg.sample_offset, 5);
    assert_eq!(cfg.chunk_size, 8);
    assert_eq!(cfg.threshold, 0.25);
}

#[test]
fn test_json_file_missing() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let path = dir.path().join("absent.json");
    match RunConfig::from_json_file(&path) {
        Err(GraphError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("unexpected result {:?}", other),
    }
}
