// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key occurrences in the lifecycle of a test run.
//!
//! The top-level enum here is [`Run`]. An external runner emits these in a
//! strict temporal order:
//! `Started → {Suite, Test(Started), Test(outcome), Test(Finished)}* → Finished`.

use std::{sync::Arc, time::SystemTime};

use derive_more::with_trait::{Deref, DerefMut};

use crate::{test, Failure, TestResult};

/// Arbitrary event, optionally paired with additional metadata.
#[derive(Clone, Copy, Debug, Deref, DerefMut)]
#[non_exhaustive]
pub struct Event<T> {
    /// [`SystemTime`] when this [`Event`] has happened.
    pub at: SystemTime,

    /// Actual value of this [`Event`].
    #[deref]
    #[deref_mut]
    pub value: T,
}

impl<T> Event<T> {
    /// Creates a new [`Event`] out of the given `value`, happening right now.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::at(value, SystemTime::now())
    }

    /// Creates a new [`Event`] out of the given `value`, happened at the
    /// given [`SystemTime`].
    #[must_use]
    pub const fn at(value: T, at: SystemTime) -> Self {
        Self { at, value }
    }

    /// Unwraps the inner [`Event::value`] loosing all the attached metadata.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Splits this [`Event`] to the inner [`Event::value`] and its timestamp.
    #[must_use]
    pub fn split(self) -> (T, SystemTime) {
        (self.value, self.at)
    }
}

/// Top-level run event.
#[derive(Clone, Debug)]
pub enum Run {
    /// The run has begun.
    Started {
        /// Number of tests the runner declared to execute.
        total: usize,
    },

    /// [`Suite`] event.
    ///
    /// [`Suite`]: test::Suite
    Suite(Arc<test::Suite>, Suite),

    /// Event of a single test.
    Test(TestResult, Test),

    /// The run has ended.
    Finished,
}

impl Run {
    /// Constructs an event of a test having started.
    #[must_use]
    pub const fn test_started(test: TestResult) -> Self {
        Self::Test(test, Test::Started)
    }

    /// Constructs an event of a test having passed.
    #[must_use]
    pub const fn test_passed(test: TestResult) -> Self {
        Self::Test(test, Test::Passed)
    }

    /// Constructs an event of a test having failed with the given
    /// [`Failure`].
    #[must_use]
    pub const fn test_failed(test: TestResult, failure: Failure) -> Self {
        Self::Test(test, Test::Failed(failure))
    }

    /// Constructs an event of a test being pending.
    #[must_use]
    pub const fn test_pending(test: TestResult) -> Self {
        Self::Test(test, Test::Pending)
    }

    /// Constructs an event of a test having finished.
    #[must_use]
    pub const fn test_finished(test: TestResult) -> Self {
        Self::Test(test, Test::Finished)
    }

    /// Returns the name of this event, as used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "run-begin",
            Self::Finished => "run-end",
            Self::Suite(_, Suite::Started) => "suite-begin",
            Self::Suite(_, Suite::Finished) => "suite-end",
            Self::Test(_, ev) => ev.name(),
        }
    }
}

/// Event specific to a particular [`Suite`].
///
/// [`Suite`]: test::Suite
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Suite {
    /// [`Suite`] execution started.
    ///
    /// [`Suite`]: test::Suite
    Started,

    /// [`Suite`] execution finished.
    ///
    /// [`Suite`]: test::Suite
    Finished,
}

/// Event specific to a particular test.
#[derive(Clone, Debug)]
pub enum Test {
    /// Test execution started.
    Started,

    /// Test passed.
    Passed,

    /// Test failed with the given [`Failure`].
    ///
    /// May be emitted more than once for the same test (e.g. a failing hook
    /// after a failing assertion).
    Failed(Failure),

    /// Test is pending and wasn't executed.
    Pending,

    /// Test execution finished, regardless of its outcome.
    Finished,
}

impl Test {
    /// Returns the name of this event, as used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started => "test-begin",
            Self::Passed => "test-pass",
            Self::Failed(_) => "test-fail",
            Self::Pending => "test-pending",
            Self::Finished => "test-end",
        }
    }
}
