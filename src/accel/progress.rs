// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2026 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use std::sync::RwLock;
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};

use log::*;
#[cfg(feature = "python")]
use pyo3::{intern, prelude::*, types::PyDict};

/// Minimum seconds between log lines.
const LOG_SECS: f64 = 10.0;
/// Minimum seconds between progress bar updates.
#[cfg(feature = "python")]
const BAR_SECS: f64 = 0.2;

#[derive(Clone, Copy)]
struct UpdateState {
    count: usize,
    time: f64,
    rate: f64,
}

/// Throttled progress reporting for the similarity sweep.
///
/// Progress is counted in outer items completed. Updates are written to the
/// log and, when one is attached, to a Python progress bar, at most once per
/// update interval.
pub struct ProgressHandle {
    total: usize,
    interval: f64,
    #[cfg(feature = "python")]
    pb: Option<Py<PyAny>>,
    start: Instant,
    count: AtomicUsize,
    last_update: RwLock<Option<UpdateState>>,
}

impl ProgressHandle {
    /// Create a handle that reports to the log.
    pub fn new(total: usize) -> Self {
        ProgressHandle {
            total,
            interval: LOG_SECS,
            #[cfg(feature = "python")]
            pb: None,
            start: Instant::now(),
            count: AtomicUsize::new(0),
            last_update: RwLock::new(None),
        }
    }

    /// Create a handle that also drives a Python progress bar.
    #[cfg(feature = "python")]
    pub fn from_input<'py>(total: usize, maybe_pb: Option<Bound<'py, PyAny>>) -> Self {
        let pb = maybe_pb.filter(|pb| !pb.is_none()).map(Bound::unbind);
        let interval = if pb.is_some() { BAR_SECS } else { LOG_SECS };
        ProgressHandle {
            interval,
            pb,
            ..Self::new(total)
        }
    }

    /// Get the number of items completed so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn tick(&self) {
        self.advance(1);
    }

    pub fn advance(&self, n: usize) {
        let count = self.count.fetch_add(n, Ordering::Relaxed) + n;

        let last_update = {
            let lock = self.last_update.read().expect("poisoned lock");
            *lock
        };

        let thresh = if let Some(lu) = last_update {
            // bail early if the rate estimate says we don't need to update
            let n = count.saturating_sub(lu.count) as f64;
            if lu.rate > 0.0 && n / lu.rate < self.interval * 0.95 {
                return;
            }

            lu.time
        } else {
            0.0
        };

        let time = self.start.elapsed().as_secs_f64();
        if time < thresh + self.interval {
            return;
        }

        // if someone else is writing, they are reporting for us
        if let Ok(mut lock) = self.last_update.try_write() {
            *lock = Some(UpdateState {
                count,
                time,
                rate: count as f64 / time,
            });
            self.refresh(count);
        }
    }

    /// Report the final count, regardless of throttling.
    pub fn finish(&self) {
        let count = self.count();
        debug!(
            "completed {} of {} items in {:.2}s",
            count,
            self.total,
            self.start.elapsed().as_secs_f64()
        );
        self.refresh(count);
    }

    fn refresh(&self, count: usize) {
        if self.total > 0 {
            info!(
                "processed {} / {} items ({:.1}%)",
                count,
                self.total,
                count as f64 * 100.0 / self.total as f64
            );
        }

        #[cfg(feature = "python")]
        if let Some(pb) = &self.pb {
            let res = Python::attach(|py| {
                py.check_signals()?;
                let kwargs = PyDict::new(py);
                kwargs.set_item(intern!(py, "completed"), count)?;
                pb.call_method(py, intern!(py, "update"), (), Some(&kwargs))?;
                Ok::<(), PyErr>(())
            });
            if let Err(e) = res {
                warn!("progress update failed: {}", e);
            }
        }
    }
}

#[test]
fn test_counts_advance() {
    let pb = ProgressHandle::new(100);
    pb.tick();
    pb.advance(9);
    assert_eq!(pb.count(), 10);
    pb.finish();
    assert_eq!(pb.count(), 10);
}

#[test]
fn test_concurrent_advance() {
    use rayon::prelude::*;

    let pb = ProgressHandle::new(1000);
    (0..1000).into_par_iter().for_each(|_| pb.tick());
    assert_eq!(pb.count(), 1000);
}

#[test]
fn test_advance_behind_published_count() {
    let pb = ProgressHandle::new(1000);
    *pb.last_update.write().expect("poisoned lock") = Some(UpdateState {
        count: 500,
        time: 0.0,
        rate: 100.0,
    });
    pb.advance(1);
    assert_eq!(pb.count(), 1);
}
