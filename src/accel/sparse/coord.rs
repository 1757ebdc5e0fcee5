// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Coordinates and dimensions of a sparse relation.

/// One nonzero entry of a sparse relation, or one directed edge.
///
/// For edges, `row` is the source item and `col` the destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedCoordinate {
    pub row: u32,
    pub col: u32,
    pub weight: f32,
}

impl WeightedCoordinate {
    pub fn new(row: u32, col: u32, weight: f32) -> Self {
        WeightedCoordinate { row, col, weight }
    }
}

/// Shape of a sparse relation, as declared by its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDimensions {
    pub row_count: usize,
    pub col_count: usize,
    pub nnz_count: usize,
}
