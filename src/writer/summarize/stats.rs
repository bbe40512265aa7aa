// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Aggregated statistics of a single run.

use std::time::{Duration, SystemTime};

/// Counters and timing of a run.
///
/// Created when the run begins and frozen when it finishes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    /// Time the run began at.
    pub start: Option<SystemTime>,

    /// Time the run finished at.
    pub end: Option<SystemTime>,

    /// Time the run took.
    pub duration: Duration,

    /// Number of non-root suites begun.
    pub suites: usize,

    /// Number of tests that finished.
    pub tests: usize,

    /// Number of passed tests.
    pub passes: usize,

    /// Number of pending tests.
    pub pending: usize,

    /// Number of failure events.
    pub failures: usize,

    /// Number of tests the runner declared to execute.
    pub total: usize,
}

impl RunStats {
    /// Creates new [`RunStats`] of a run begun at the given time, declaring
    /// `total` tests.
    #[must_use]
    pub fn started(at: SystemTime, total: usize) -> Self {
        Self {
            start: Some(at),
            total,
            ..Self::default()
        }
    }

    /// Freezes these [`RunStats`] at the given time.
    pub fn finish(&mut self, at: SystemTime) {
        self.end = Some(at);
        self.duration = self
            .start
            .and_then(|start| at.duration_since(start).ok())
            .unwrap_or_default();
    }

    /// Indicates whether anything failed.
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.failures > 0
    }
}
