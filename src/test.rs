// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tests and suites as observed by reporters.
//!
//! [`TestResult`]s are produced by an external runner. Reporters treat them as
//! read-only, except for the [`Speed`] assigned by the [`Tracker`].
//!
//! [`Tracker`]: crate::writer::summarize::Tracker

use std::{fmt, path::PathBuf, time::Duration};

use itertools::Itertools as _;
use serde::Serialize;

use crate::Failure;

/// Outcome of a test.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// Test passed.
    Passed,

    /// Test failed.
    Failed,

    /// Test wasn't executed.
    Pending,
}

/// Speed classification of a passed test, relative to its "slow" threshold.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    /// Took no longer than a half of the threshold.
    Fast,

    /// Took longer than a half of the threshold, but no longer than the
    /// threshold itself.
    Medium,

    /// Took longer than the threshold.
    Slow,
}

impl Speed {
    /// Classifies the given `duration` against the `slow` threshold.
    #[must_use]
    pub fn classify(duration: Duration, slow: Duration) -> Self {
        if duration > slow {
            Self::Slow
        } else if duration > slow / 2 {
            Self::Medium
        } else {
            Self::Fast
        }
    }

    /// Returns a string representation of this [`Speed`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group of tests (and nested suites).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Suite {
    /// Title of this [`Suite`].
    pub title: String,

    /// Titles of the ancestor [`Suite`]s, outermost first.
    pub parents: Vec<String>,

    /// File this [`Suite`] is declared in.
    pub file: Option<PathBuf>,

    /// Indicator whether this is the implicit root [`Suite`] of a run.
    pub root: bool,
}

impl Suite {
    /// Creates a new non-root [`Suite`] with the given `title`.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Creates the implicit root [`Suite`] of a run.
    #[must_use]
    pub fn root() -> Self {
        Self {
            root: true,
            ..Self::default()
        }
    }

    /// Returns the full title of this [`Suite`], including its ancestors.
    #[must_use]
    pub fn full_title(&self) -> String {
        self.parents.iter().chain([&self.title]).join(" ")
    }
}

/// Single test, as reported by a runner.
#[derive(Clone, Debug, Default)]
pub struct TestResult {
    /// Title of the test itself.
    pub title: String,

    /// Titles of the ancestor suites, outermost first, root suite excluded.
    pub parents: Vec<String>,

    /// File the test is declared in.
    pub file: Option<PathBuf>,

    /// Time the test took to execute.
    pub duration: Duration,

    /// Outcome of the test, if known yet.
    pub state: Option<State>,

    /// [`Speed`] of a passed test, assigned by a [`Tracker`].
    ///
    /// [`Tracker`]: crate::writer::summarize::Tracker
    pub speed: Option<Speed>,

    /// "Slow" threshold of this test, overriding the configured one.
    pub slow: Option<Duration>,

    /// Number of the current retry attempt.
    pub current_retry: usize,

    /// [`Failure`] of a failed test.
    pub err: Option<Failure>,
}

impl TestResult {
    /// Creates a new [`TestResult`] with the given `title`.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets titles of the ancestor suites, outermost first.
    #[must_use]
    pub fn within<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the file this test is declared in.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the time this test took.
    #[must_use]
    pub fn took(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the outcome of this test.
    #[must_use]
    pub fn with_state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }

    /// Overrides the "slow" threshold of this test.
    #[must_use]
    pub fn slow(mut self, threshold: Duration) -> Self {
        self.slow = Some(threshold);
        self
    }

    /// Returns the path of titles from the outermost suite down to this test.
    pub fn title_path(&self) -> impl Iterator<Item = &str> {
        self.parents
            .iter()
            .map(String::as_str)
            .chain([self.title.as_str()])
    }

    /// Returns the full title of this test, including its suites.
    #[must_use]
    pub fn full_title(&self) -> String {
        self.title_path().join(" ")
    }

    /// Returns the full title of the suite this test belongs to.
    #[must_use]
    pub fn parent_title(&self) -> String {
        self.parents.join(" ")
    }

    /// Indicates whether `other` describes the same test as this one.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        self.file == other.file
            && self.title == other.title
            && self.parents == other.parents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_classification() {
        let slow = Duration::from_millis(75);

        assert_eq!(Speed::classify(Duration::from_millis(100), slow), Speed::Slow);
        assert_eq!(Speed::classify(Duration::from_millis(40), slow), Speed::Medium);
        assert_eq!(Speed::classify(Duration::from_millis(10), slow), Speed::Fast);
    }

    #[test]
    fn speed_boundaries_are_exclusive() {
        let slow = Duration::from_millis(75);

        assert_eq!(Speed::classify(slow, slow), Speed::Medium);
        assert_eq!(Speed::classify(slow / 2, slow), Speed::Fast);
    }

    #[test]
    fn titles() {
        let test = TestResult::new("adds")
            .within(["Math", "Addition"])
            .in_file("tests/math.rs");

        assert_eq!(test.full_title(), "Math Addition adds");
        assert_eq!(test.parent_title(), "Math Addition");
        assert_eq!(
            test.title_path().collect::<Vec<_>>(),
            ["Math", "Addition", "adds"],
        );
    }

    #[test]
    fn sameness_ignores_outcome() {
        let a = TestResult::new("adds").within(["Math"]);
        let b = a.clone().took(Duration::from_millis(3)).with_state(State::Failed);
        let c = TestResult::new("adds").within(["Other"]);

        assert!(a.is_same(&b));
        assert!(!a.is_same(&c));
    }

    #[test]
    fn suite_titles() {
        let mut suite = Suite::new("Addition");
        suite.parents = vec!["Math".into()];

        assert_eq!(suite.full_title(), "Math Addition");
        assert!(Suite::root().root);
        assert!(!suite.root);
    }
}
