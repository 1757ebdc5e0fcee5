// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Sparse coordinate arrays.

use std::sync::Arc;

use arrow::{
    array::{ArrowPrimitiveType, PrimitiveArray, PrimitiveBuilder, RecordBatch},
    datatypes::{Float32Type, UInt32Type},
    error::ArrowError,
};
use arrow_schema::{Field, SchemaBuilder};

use super::WeightedCoordinate;

/// Column-oriented coordinate list, ready to hand to Arrow consumers.
pub struct COOMatrix<V = Float32Type, Ix = UInt32Type>
where
    V: ArrowPrimitiveType,
    Ix: ArrowPrimitiveType,
{
    pub row: PrimitiveArray<Ix>,
    pub col: PrimitiveArray<Ix>,
    pub val: PrimitiveArray<V>,
}

pub struct COOMatrixBuilder<V = Float32Type, Ix = UInt32Type>
where
    V: ArrowPrimitiveType,
    Ix: ArrowPrimitiveType,
{
    pub row: PrimitiveBuilder<Ix>,
    pub col: PrimitiveBuilder<Ix>,
    pub val: PrimitiveBuilder<V>,
}

impl<V, Ix> COOMatrixBuilder<V, Ix>
where
    V: ArrowPrimitiveType,
    Ix: ArrowPrimitiveType,
{
    /// Initialize a builder with a specified capacity.
    pub fn with_capacity(cap: usize) -> Self {
        COOMatrixBuilder {
            row: PrimitiveBuilder::with_capacity(cap),
            col: PrimitiveBuilder::with_capacity(cap),
            val: PrimitiveBuilder::with_capacity(cap),
        }
    }

    pub fn add_entry(&mut self, row: Ix::Native, col: Ix::Native, val: V::Native) {
        self.row.append_value(row);
        self.col.append_value(col);
        self.val.append_value(val);
    }

    /// Build the final COO matrix from this builder.
    pub fn finish(mut self) -> COOMatrix<V, Ix> {
        COOMatrix {
            row: self.row.finish(),
            col: self.col.finish(),
            val: self.val.finish(),
        }
    }
}

impl COOMatrix {
    /// Collect weighted coordinates into columnar form.
    pub fn from_coords(coords: &[WeightedCoordinate]) -> Self {
        let mut bld = COOMatrixBuilder::with_capacity(coords.len());
        for c in coords {
            bld.add_entry(c.row, c.col, c.weight);
        }
        bld.finish()
    }
}

impl<V, Ix> COOMatrix<V, Ix>
where
    V: ArrowPrimitiveType,
    Ix: ArrowPrimitiveType,
{
    pub fn len(&self) -> usize {
        self.val.len()
    }

    pub fn is_empty(&self) -> bool {
        self.val.is_empty()
    }

    /// Convert to a record batch with the given column names.
    pub fn into_record_batch(
        self,
        row_name: &str,
        col_name: &str,
        val_name: &str,
    ) -> Result<RecordBatch, ArrowError> {
        let mut schema = SchemaBuilder::new();
        schema.push(Field::new(row_name, Ix::DATA_TYPE, false));
        schema.push(Field::new(col_name, Ix::DATA_TYPE, false));
        schema.push(Field::new(val_name, V::DATA_TYPE, false));
        let schema = schema.finish();
        RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(self.row), Arc::new(self.col), Arc::new(self.val)],
        )
    }
}

#[test]
fn test_from_coords() {
    let coo = COOMatrix::from_coords(&[
        WeightedCoordinate::new(0, 1, 0.5),
        WeightedCoordinate::new(1, 0, 0.75),
    ]);
    assert_eq!(coo.len(), 2);
    assert_eq!(&coo.row.values()[..], &[0, 1]);
    assert_eq!(&coo.col.values()[..], &[1, 0]);
    assert_eq!(&coo.val.values()[..], &[0.5, 0.75]);
}

#[test]
fn test_record_batch_schema() {
    use arrow::datatypes::DataType;

    let coo = COOMatrix::from_coords(&[WeightedCoordinate::new(3, 4, 1.0)]);
    let batch = coo
        .into_record_batch("source", "destination", "weight")
        .expect("batch failed");
    assert_eq!(batch.num_rows(), 1);
    let schema = batch.schema();
    assert_eq!(schema.field(0).name(), "source");
    assert_eq!(schema.field(1).data_type(), &DataType::UInt32);
    assert_eq!(schema.field(2).data_type(), &DataType::Float32);
}
