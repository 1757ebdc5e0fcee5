// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Reader for coordinate-format sparse relation files.
//!
//! The format is a (possibly empty) block of `%` comment lines, a header with
//! the row count, column count, and entry count, and then one
//! `<row> <col> <weight>` line per entry. Indices are kept exactly as the
//! file states them.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use log::*;

use crate::errors::{GraphError, Result};

use super::{RelationDimensions, WeightedCoordinate};

/// Largest up-front reservation we make from an (unverified) header.
const MAX_RESERVE: usize = 1 << 24;
/// Items are identified by `u32` column ids.
pub(crate) const MAX_ITEMS: usize = u32::MAX as usize + 1;

/// Read a coordinate-format file in full.
pub fn read_mtx<P: AsRef<Path>>(path: P) -> Result<(Vec<WeightedCoordinate>, RelationDimensions)> {
    let path = path.as_ref();
    debug!("reading sparse relation from {}", path.display());
    let file = File::open(path).map_err(|e| GraphError::io(path, e))?;
    let (coords, dims) = parse_lines(BufReader::new(file), path)?;
    info!(
        "read {} x {} relation with {} entries",
        dims.row_count, dims.col_count, dims.nnz_count
    );
    Ok((coords, dims))
}

/// Parse coordinate-format data from a reader.
pub fn parse_mtx<R: BufRead>(reader: R) -> Result<(Vec<WeightedCoordinate>, RelationDimensions)> {
    parse_lines(reader, Path::new("<stream>"))
}

fn parse_lines<R: BufRead>(
    reader: R,
    path: &Path,
) -> Result<(Vec<WeightedCoordinate>, RelationDimensions)> {
    let mut lines = reader.lines().enumerate();

    let mut dims = None;
    for (n, line) in &mut lines {
        let line = line.map_err(|e| GraphError::io(path, e))?;
        if line.starts_with('%') || line.trim().is_empty() {
            continue;
        }
        dims = Some(parse_header(n + 1, &line)?);
        break;
    }
    let dims = dims.ok_or_else(|| GraphError::format(0, "missing dimension header"))?;
    debug!(
        "header declares {} rows, {} columns, {} entries",
        dims.row_count, dims.col_count, dims.nnz_count
    );

    let mut coords = Vec::with_capacity(dims.nnz_count.min(MAX_RESERVE));
    for (n, line) in lines {
        let line = line.map_err(|e| GraphError::io(path, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if coords.len() == dims.nnz_count {
            return Err(GraphError::format(
                n + 1,
                format!("more entries than the {} declared", dims.nnz_count),
            ));
        }
        coords.push(parse_entry(n + 1, line)?);
    }

    if coords.len() < dims.nnz_count {
        return Err(GraphError::format(
            0,
            format!(
                "expected {} entries, found {}",
                dims.nnz_count,
                coords.len()
            ),
        ));
    }

    Ok((coords, dims))
}

fn parse_header(lno: usize, line: &str) -> Result<RelationDimensions> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(GraphError::format(
            lno,
            format!("header has {} fields, expected 3", fields.len()),
        ));
    }

    let dims = RelationDimensions {
        row_count: parse_field(lno, "row count", fields[0])?,
        col_count: parse_field(lno, "column count", fields[1])?,
        nnz_count: parse_field(lno, "entry count", fields[2])?,
    };
    if dims.col_count > MAX_ITEMS {
        return Err(GraphError::format(
            lno,
            format!(
                "column count {} exceeds the {} addressable items",
                dims.col_count, MAX_ITEMS
            ),
        ));
    }
    Ok(dims)
}

fn parse_entry(lno: usize, line: &str) -> Result<WeightedCoordinate> {
    let mut fields = line.split_whitespace();
    let (row, col, weight) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(r), Some(c), Some(w), None) => (r, c, w),
        _ => {
            return Err(GraphError::format(
                lno,
                format!(
                    "entry has {} fields, expected 3",
                    line.split_whitespace().count()
                ),
            ))
        }
    };

    Ok(WeightedCoordinate {
        row: parse_field(lno, "row", row)?,
        col: parse_field(lno, "column", col)?,
        weight: parse_field(lno, "weight", weight)?,
    })
}

fn parse_field<T: FromStr>(lno: usize, name: &str, text: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    text.parse()
        .map_err(|e| GraphError::format(lno, format!("invalid {} {:?}: {}", name, text, e)))
}

#[cfg(test)]
fn parse_str(text: &str) -> Result<(Vec<WeightedCoordinate>, RelationDimensions)> {
    parse_mtx(text.as_bytes())
}

#[test]
fn test_read_entries_exact() {
    let (coords, dims) =
        parse_str("% ratings\n%% more\n3 4 3\n0 1 4.5\n2 3 0.1\n1 0 3\n").expect("parse failed");
    assert_eq!(
        dims,
        RelationDimensions {
            row_count: 3,
            col_count: 4,
            nnz_count: 3
        }
    );
    assert_eq!(coords.len(), 3);
    assert_eq!(coords[0], WeightedCoordinate::new(0, 1, 4.5));
    assert_eq!(coords[1].row, 2);
    assert_eq!(coords[1].col, 3);
    assert_eq!(coords[1].weight.to_bits(), 0.1f32.to_bits());
    assert_eq!(coords[2], WeightedCoordinate::new(1, 0, 3.0));
}

#[test]
fn test_no_comments() {
    let (coords, dims) = parse_str("1 1 1\n0 0 1.0\n").expect("parse failed");
    assert_eq!(dims.nnz_count, 1);
    assert_eq!(coords, vec![WeightedCoordinate::new(0, 0, 1.0)]);
}

#[test]
fn test_empty_relation() {
    let (coords, dims) = parse_str("5 7 0\n").expect("parse failed");
    assert!(coords.is_empty());
    assert_eq!(dims.col_count, 7);
}

#[test]
fn test_missing_header() {
    let res = parse_str("% only a comment\n");
    assert!(matches!(res, Err(GraphError::Format { line: 0, .. })));
}

#[test]
fn test_short_header() {
    let res = parse_str("% c\n3 4\n0 0 1\n");
    assert!(matches!(res, Err(GraphError::Format { line: 2, .. })));
}

#[test]
fn test_non_numeric_header() {
    let res = parse_str("3 four 1\n0 0 1\n");
    assert!(matches!(res, Err(GraphError::Format { line: 1, .. })));
}

#[test]
fn test_oversized_column_count() {
    let res = parse_str("1 18446744073709551615 1\n0 0 1\n");
    assert!(matches!(res, Err(GraphError::Format { line: 1, .. })));
    let res = parse_str("% c\n1 4294967297 1\n0 0 1\n");
    assert!(matches!(res, Err(GraphError::Format { line: 2, .. })));
}

#[test]
fn test_short_body() {
    let res = parse_str("3 3 3\n0 0 1\n1 1 1\n");
    match res {
        Err(GraphError::Format { line, message }) => {
            assert_eq!(line, 0);
            assert!(message.contains("expected 3 entries, found 2"));
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_long_body() {
    let res = parse_str("3 3 1\n0 0 1\n1 1 1\n");
    assert!(matches!(res, Err(GraphError::Format { line: 3, .. })));
}

#[test]
fn test_bad_weight() {
    let res = parse_str("3 3 2\n0 0 1\n1 1 lots\n");
    assert!(matches!(res, Err(GraphError::Format { line: 3, .. })));
}

#[test]
fn test_negative_index() {
    let res = parse_str("3 3 1\n-1 0 1\n");
    assert!(matches!(res, Err(GraphError::Format { line: 2, .. })));
}

#[test]
fn test_field_count() {
    let res = parse_str("3 3 1\n0 0\n");
    assert!(matches!(res, Err(GraphError::Format { line: 2, .. })));
    let res = parse_str("3 3 1\n0 0 1 1\n");
    assert!(matches!(res, Err(GraphError::Format { line: 2, .. })));
}

#[test]
fn test_read_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().expect("tempfile failed");
    writeln!(file, "%%MatrixMarket matrix coordinate real general").unwrap();
    writeln!(file, "2 2 2").unwrap();
    writeln!(file, "0 1 5").unwrap();
    writeln!(file, "1 0 2.5").unwrap();
    file.flush().unwrap();

    let (coords, dims) = read_mtx(file.path()).expect("read failed");
    assert_eq!(dims.nnz_count, 2);
    assert_eq!(coords[1], WeightedCoordinate::new(1, 0, 2.5));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let res = read_mtx(dir.path().join("absent.mtx"));
    assert!(matches!(res, Err(GraphError::Io { .. })));
}
