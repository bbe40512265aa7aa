// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Collection of run statistics out of lifecycle events.

use std::time::{Duration, SystemTime};

use crate::{
    error::{ReportError, Result},
    event::{self, Run},
    test, Event, Failure, Speed, TestResult,
};

use super::{RunStats, State};

/// Consumer of [`Run`] events, accumulating [`RunStats`] and ordered lists of
/// tests.
///
/// Every passed test gets its [`Speed`] assigned here, before anything reads
/// it. Failed tests are listed in the order their failures arrived, once per
/// test: further failures of the test in flight are stacked into its
/// [`Failure`]. Distinct tests sharing a title are listed separately.
#[derive(Clone, Debug)]
pub struct Tracker {
    /// Default "slow" threshold of tests.
    slow: Duration,

    /// Current [`State`] of the run.
    state: State,

    /// Accumulated [`RunStats`].
    stats: RunStats,

    /// Test being executed at the moment, with its outcome applied.
    current: Option<TestResult>,

    /// Index in the `failures` of the test in flight, if it has failed.
    failing: Option<usize>,

    /// All finished tests.
    tests: Vec<TestResult>,

    /// Passed tests.
    passes: Vec<TestResult>,

    /// Pending tests.
    pending: Vec<TestResult>,

    /// Failed tests.
    failures: Vec<TestResult>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(75))
    }
}

impl Tracker {
    /// Creates a new [`Tracker`] classifying test speeds against the given
    /// default `slow` threshold.
    #[must_use]
    pub const fn new(slow: Duration) -> Self {
        Self {
            slow,
            state: State::Idle,
            stats: RunStats {
                start: None,
                end: None,
                duration: Duration::ZERO,
                suites: 0,
                tests: 0,
                passes: 0,
                pending: 0,
                failures: 0,
                total: 0,
            },
            current: None,
            failing: None,
            tests: Vec::new(),
            passes: Vec::new(),
            pending: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Applies the given [`Run`] event.
    ///
    /// # Errors
    ///
    /// With [`ReportError::UnexpectedEvent`] if the event isn't valid in the
    /// current [`State`]. Nothing is changed in such case.
    pub fn handle(&mut self, ev: Event<Run>) -> Result<()> {
        let (ev, at) = ev.split();
        if !self.state.accepts(&ev) {
            return Err(ReportError::UnexpectedEvent {
                event: ev.name(),
                state: self.state,
            });
        }

        let next = self.state.next(&ev);
        if next != self.state {
            tracing::debug!(
                from = self.state.as_str(),
                to = next.as_str(),
                "run state changed",
            );
        }
        self.state = next;

        match ev {
            Run::Started { total } => self.stats = RunStats::started(at, total),
            Run::Suite(suite, event::Suite::Started) => {
                if !suite.root {
                    self.stats.suites += 1;
                }
            }
            Run::Suite(_, event::Suite::Finished) => {}
            Run::Test(test, ev) => self.handle_test(test, ev),
            Run::Finished => self.finish(at),
        }
        Ok(())
    }

    fn handle_test(&mut self, mut test: TestResult, ev: event::Test) {
        match ev {
            event::Test::Started => {
                self.current = Some(test);
                self.failing = None;
            }
            event::Test::Passed => {
                let slow = test.slow.unwrap_or(self.slow);
                test.speed = Some(Speed::classify(test.duration, slow));
                test.state = Some(test::State::Passed);
                self.stats.passes += 1;
                self.passes.push(test.clone());
                self.current = Some(test);
            }
            event::Test::Failed(failure) => {
                test.state = Some(test::State::Failed);
                self.stats.failures += 1;
                let failed = self.fail(test, failure);
                self.current = Some(failed);
            }
            event::Test::Pending => {
                test.state = Some(test::State::Pending);
                self.stats.pending += 1;
                self.pending.push(test.clone());
                self.current = Some(test);
            }
            event::Test::Finished => {
                self.failing = None;
                let finished = self
                    .current
                    .take()
                    .filter(|current| current.is_same(&test))
                    .unwrap_or(test);
                self.stats.tests += 1;
                self.tests.push(finished);
            }
        }
    }

    /// Records the given [`Failure`] of the `test`, returning the test as
    /// listed in the failures.
    ///
    /// Only the test in flight is stacked onto. A failure of any other test,
    /// even one with the same title, opens a new entry.
    fn fail(&mut self, test: TestResult, failure: Failure) -> TestResult {
        let at = self
            .failing
            .filter(|&at| self.failures[at].is_same(&test))
            .unwrap_or_else(|| {
                self.failures.push(test);
                self.failures.len() - 1
            });
        self.failing = Some(at);
        let listed = &mut self.failures[at];

        match &mut listed.err {
            Some(err) if failure.is_error() => err.multiple.push(failure),
            err => *err = Some(failure),
        }
        listed.clone()
    }

    fn finish(&mut self, at: SystemTime) {
        self.stats.finish(at);
        self.failing = None;
        if let Some(current) = self.current.take() {
            tracing::warn!(
                test = current.full_title(),
                "run finished before the test did",
            );
        }
    }

    /// Marks the report of this run as emitted.
    ///
    /// Returns `false` if the run hasn't finished yet or the report was
    /// marked already.
    pub fn mark_reported(&mut self) -> bool {
        if self.state == State::Reporting {
            tracing::debug!(from = "reporting", to = "done", "run state changed");
            self.state = State::Done;
            true
        } else {
            false
        }
    }

    /// Returns the current [`State`] of the run.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Returns the accumulated [`RunStats`].
    #[must_use]
    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Returns all finished tests, in the order they finished.
    #[must_use]
    pub fn tests(&self) -> &[TestResult] {
        &self.tests
    }

    /// Returns passed tests, in the order they passed.
    #[must_use]
    pub fn passes(&self) -> &[TestResult] {
        &self.passes
    }

    /// Returns pending tests.
    #[must_use]
    pub fn pending(&self) -> &[TestResult] {
        &self.pending
    }

    /// Returns failed tests, in the order their first failures arrived.
    #[must_use]
    pub fn failures(&self) -> &[TestResult] {
        &self.failures
    }
}
