// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Sparse relation support.

mod coo;
mod coord;
mod mtx;

pub use coo::{COOMatrix, COOMatrixBuilder};
pub use coord::{RelationDimensions, WeightedCoordinate};
pub use mtx::{parse_mtx, read_mtx};
pub(crate) use mtx::MAX_ITEMS;
