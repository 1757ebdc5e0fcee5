// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Item-to-user adjacency sets.

use log::*;
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::{
    errors::{GraphError, Result},
    sparse::{WeightedCoordinate, MAX_ITEMS},
};

/// For each item (column), the set of users (rows) with an entry for it.
///
/// The index is immutable once built, so it can be shared freely across the
/// sweep's worker threads.
#[derive(Debug, Clone)]
pub struct AdjacencyIndex {
    sets: Vec<FxHashSet<u32>>,
}

impl AdjacencyIndex {
    /// Build the index from relation entries.
    ///
    /// Repeated `(row, col)` entries collapse to a single membership.
    pub fn build(coords: &[WeightedCoordinate], n_items: usize) -> Result<AdjacencyIndex> {
        debug!(
            "indexing {} entries over {} items",
            coords.len(),
            n_items
        );
        if n_items > MAX_ITEMS {
            return Err(GraphError::format(
                0,
                format!("{} items exceed the addressable item range", n_items),
            ));
        }
        let mut sets = vec![FxHashSet::with_hasher(FxBuildHasher); n_items];
        for (i, c) in coords.iter().enumerate() {
            let set = sets.get_mut(c.col as usize).ok_or_else(|| {
                GraphError::format(
                    0,
                    format!(
                        "entry {} has column {} but the relation has {} columns",
                        i, c.col, n_items
                    ),
                )
            })?;
            set.insert(c.row);
        }

        let index = AdjacencyIndex { sets };
        debug!(
            "index has {} non-empty items and {} memberships",
            index.n_active(),
            index.n_memberships()
        );
        Ok(index)
    }

    /// Get the number of items in the index.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Get the users associated with an item.
    pub fn users(&self, item: usize) -> &FxHashSet<u32> {
        &self.sets[item]
    }

    /// Get the number of users associated with an item.
    #[inline]
    pub fn degree(&self, item: usize) -> usize {
        self.sets[item].len()
    }

    /// Count items with at least one user.
    pub fn n_active(&self) -> usize {
        self.sets.iter().filter(|s| !s.is_empty()).count()
    }

    /// Count distinct (user, item) memberships.
    pub fn n_memberships(&self) -> usize {
        self.sets.iter().map(|s| s.len()).sum()
    }

    /// Count the users two items share.
    ///
    /// Probes the smaller set against the larger one.
    #[inline]
    pub fn overlap(&self, i: usize, j: usize) -> usize {
        let (small, large) = if self.sets[i].len() <= self.sets[j].len() {
            (&self.sets[i], &self.sets[j])
        } else {
            (&self.sets[j], &self.sets[i])
        };
        small.iter().filter(|u| large.contains(*u)).count()
    }
}

#[cfg(test)]
fn entries(pairs: &[(u32, u32)]) -> Vec<WeightedCoordinate> {
    pairs
        .iter()
        .map(|(r, c)| WeightedCoordinate::new(*r, *c, 1.0))
        .collect()
}

#[test]
fn test_shared_user() {
    let index = AdjacencyIndex::build(&entries(&[(5, 2), (5, 7)]), 8).expect("build failed");
    assert_eq!(index.len(), 8);
    assert!(index.users(2).contains(&5));
    assert!(index.users(7).contains(&5));
    assert_eq!(index.n_active(), 2);
}

#[test]
fn test_duplicate_entry() {
    let index = AdjacencyIndex::build(&entries(&[(5, 2), (5, 2)]), 3).expect("build failed");
    assert_eq!(index.degree(2), 1);
    assert_eq!(index.users(2).iter().filter(|u| **u == 5).count(), 1);
    assert_eq!(index.n_memberships(), 1);
}

#[test]
fn test_empty_items() {
    let index = AdjacencyIndex::build(&[], 4).expect("build failed");
    assert_eq!(index.len(), 4);
    assert_eq!(index.n_active(), 0);
    assert!(index.users(3).is_empty());
}

#[test]
fn test_column_out_of_range() {
    let res = AdjacencyIndex::build(&entries(&[(0, 0), (1, 3)]), 3);
    assert!(matches!(res, Err(GraphError::Format { .. })));
}

#[test]
fn test_overlap() {
    // item 0: {1, 2, 3}, item 1: {2, 3, 4, 5}, item 2: {9}
    let index = AdjacencyIndex::build(
        &entries(&[(1, 0), (2, 0), (3, 0), (2, 1), (3, 1), (4, 1), (5, 1), (9, 2)]),
        3,
    )
    .expect("build failed");
    assert_eq!(index.overlap(0, 1), 2);
    assert_eq!(index.overlap(1, 0), 2);
    assert_eq!(index.overlap(0, 2), 0);
}

#[test]
fn test_too_many_items() {
    let res = AdjacencyIndex::build(&[], MAX_ITEMS + 1);
    assert!(matches!(res, Err(GraphError::Format { line: 0, .. })));
}

#[cfg(test)]
mod props {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn test_insertion_idempotent(pairs in prop::collection::vec((0u32..50, 0u32..10), 0..200)) {
            let once = AdjacencyIndex::build(&entries(&pairs), 10).unwrap();
            let mut doubled = pairs.clone();
            doubled.extend_from_slice(&pairs);
            let twice = AdjacencyIndex::build(&entries(&doubled), 10).unwrap();
            for i in 0..10 {
                prop_assert_eq!(once.users(i), twice.users(i));
            }
        }

        #[test]
        fn test_overlap_symmetric(pairs in prop::collection::vec((0u32..30, 0u32..6), 0..100)) {
            let index = AdjacencyIndex::build(&entries(&pairs), 6).unwrap();
            for i in 0..6 {
                for j in 0..6 {
                    prop_assert_eq!(index.overlap(i, j), index.overlap(j, i));
                    prop_assert_eq!(
                        index.overlap(i, j),
                        index.users(i).intersection(index.users(j)).count()
                    );
                }
            }
        }
    }
}
