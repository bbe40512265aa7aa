// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! JSON report [`Writer`] implementation.

use std::{collections::HashSet, io, time::SystemTime};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    error::Result,
    event::Run,
    failure::Identity,
    writer::{
        self,
        destination::Destination,
        summarize::{RunStats, Tracker},
    },
    Config, Event, Failure, Speed, TestResult, Writer,
};

/// Marker replacing an already serialized [`Failure`].
pub const CIRCULAR: &str = "[Circular]";

/// JSON report [`Writer`] implementation outputting to a [`Destination`],
/// falling back to an [`io::Write`] implementor.
///
/// The whole report is written at once, when the run finishes.
#[derive(Debug)]
pub struct Json<Out: io::Write = io::Stdout> {
    /// [`io::Write`] implementor to output the report into, unless a file
    /// [`Destination`] is configured.
    output: Out,

    /// [`Destination`] of the report.
    destination: Destination,

    /// [`Tracker`] of the run.
    tracker: Tracker,
}

impl<Out: io::Write> Json<Out> {
    /// Creates a new [`Json`] [`Writer`], writing the report to the configured
    /// [`Config::output`] file or into the given `output`.
    ///
    /// # Errors
    ///
    /// If the configured file output is unsupported.
    pub fn new(output: Out, config: &Config) -> Result<Self> {
        Ok(Self {
            output,
            destination: Destination::new(config.output.clone())?,
            tracker: Tracker::new(config.slow),
        })
    }

    /// Returns the [`Tracker`] of this [`Writer`].
    #[must_use]
    pub const fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Unwraps this [`Writer`] into its output.
    #[must_use]
    pub fn into_output(self) -> Out {
        self.output
    }

    fn emit(&mut self) -> Result<()> {
        let text = serde_json::to_string_pretty(&report(&self.tracker))?;
        self.destination.emit(&format!("{text}\n"), &mut self.output)
    }
}

impl<Out: io::Write> Writer for Json<Out> {
    async fn handle_event(&mut self, event: Event<Run>) {
        if writer::track(&mut self.tracker, event) {
            if let Err(e) = self.emit() {
                tracing::error!(error = %e, "failed to write JSON report");
            }
            _ = self.tracker.mark_reported();
        }
    }
}

impl<Out: io::Write> writer::Stats for Json<Out> {
    fn passed(&self) -> usize {
        self.tracker.stats().passes
    }

    fn failed(&self) -> usize {
        self.tracker.stats().failures
    }

    fn pending(&self) -> usize {
        self.tracker.stats().pending
    }
}

/// JSON report of a whole run.
#[derive(Debug, Serialize)]
pub struct Report {
    /// [`Stats`] of the run.
    pub stats: Stats,

    /// All finished tests.
    pub tests: Vec<Test>,

    /// Pending tests.
    pub pending: Vec<Test>,

    /// Failed tests.
    pub failures: Vec<Test>,

    /// Passed tests.
    pub passes: Vec<Test>,
}

/// Statistics section of a [`Report`].
#[derive(Clone, Debug, Serialize)]
pub struct Stats {
    /// Number of non-root suites.
    pub suites: usize,

    /// Number of finished tests.
    pub tests: usize,

    /// Number of passed tests.
    pub passes: usize,

    /// Number of pending tests.
    pub pending: usize,

    /// Number of failures.
    pub failures: usize,

    /// RFC 3339 time the run began at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// RFC 3339 time the run finished at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    /// Duration of the run, in milliseconds.
    pub duration: u64,
}

impl From<&RunStats> for Stats {
    fn from(stats: &RunStats) -> Self {
        let rfc3339 = |at: SystemTime| {
            humantime::format_rfc3339_millis(at).to_string()
        };
        Self {
            suites: stats.suites,
            tests: stats.tests,
            passes: stats.passes,
            pending: stats.pending,
            failures: stats.failures,
            start: stats.start.map(rfc3339),
            end: stats.end.map(rfc3339),
            duration: millis(stats.duration),
        }
    }
}

/// Test entry of a [`Report`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    /// Title of the test itself.
    pub title: String,

    /// Title of the test, including its suites.
    pub full_title: String,

    /// File the test is declared in.
    pub file: Option<String>,

    /// Duration of the test, in milliseconds.
    pub duration: u64,

    /// Number of the retry attempt.
    pub current_retry: usize,

    /// [`Speed`] of a passed test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<Speed>,

    /// [`Failure`] of the test cleaned by [`clean_cycles()`], or an empty
    /// object.
    pub err: Value,
}

impl From<&TestResult> for Test {
    fn from(test: &TestResult) -> Self {
        Self {
            title: test.title.clone(),
            full_title: test.full_title(),
            file: test.file.as_ref().map(|f| f.display().to_string()),
            duration: millis(test.duration),
            current_retry: test.current_retry,
            speed: test.speed,
            err: test
                .err
                .as_ref()
                .map_or_else(|| Value::Object(Map::new()), clean_cycles),
        }
    }
}

/// Builds the [`Report`] out of the run collected by the given [`Tracker`].
#[must_use]
pub fn report(tracker: &Tracker) -> Report {
    let entries = |tests: &[TestResult]| -> Vec<Test> {
        tests.iter().map(Test::from).collect()
    };
    Report {
        stats: tracker.stats().into(),
        tests: entries(tracker.tests()),
        pending: entries(tracker.pending()),
        failures: entries(tracker.failures()),
        passes: entries(tracker.passes()),
    }
}

/// Converts the given [`Failure`] into a JSON value, replacing every
/// [`Failure`] met for the second time with the [`CIRCULAR`] marker.
#[must_use]
pub fn clean_cycles(failure: &Failure) -> Value {
    to_value(failure, &mut HashSet::new())
}

fn to_value(failure: &Failure, seen: &mut HashSet<Identity>) -> Value {
    if !seen.insert(failure.identity()) {
        return Value::String(CIRCULAR.to_owned());
    }

    let mut obj = Map::new();
    _ = obj.insert("message".into(), failure.message.clone().into());
    if let Some(stack) = &failure.stack {
        _ = obj.insert("stack".into(), stack.clone().into());
    }
    if let Some(inspect) = &failure.inspect {
        _ = obj.insert("inspect".into(), inspect.clone().into());
    }
    if let Some(actual) = &failure.actual {
        _ = obj.insert("actual".into(), actual.clone());
    }
    if let Some(expected) = &failure.expected {
        _ = obj.insert("expected".into(), expected.clone());
    }
    if failure.actual.is_some() || !failure.show_diff {
        _ = obj.insert("showDiff".into(), failure.show_diff.into());
    }
    if failure.uncaught {
        _ = obj.insert("uncaught".into(), true.into());
    }
    if let Some(cause) = failure.cause() {
        _ = obj.insert("cause".into(), to_value(cause, seen));
    }
    if !failure.multiple.is_empty() {
        let multiple = failure.multiple.iter().map(|f| to_value(f, seen));
        _ = obj.insert("multiple".into(), multiple.collect());
    }
    Value::Object(obj)
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::failure::Cause;

    #[test]
    fn self_reference_becomes_marker() {
        let slot = Cause::pending();
        let failure = Failure::new("loop").linked_to(slot.clone());
        slot.resolve(failure.clone()).unwrap();

        let value = clean_cycles(&failure);

        assert_eq!(value, json!({"message": "loop", "cause": "[Circular]"}));
        assert!(serde_json::to_string(&value).is_ok());
    }

    #[test]
    fn keeps_assertion_values() {
        let failure = Failure::new("mismatch")
            .with_stack("mismatch\n    at a.rs:1")
            .with_values(json!([1]), json!([2]));

        assert_eq!(
            clean_cycles(&failure),
            json!({
                "message": "mismatch",
                "stack": "mismatch\n    at a.rs:1",
                "actual": [1],
                "expected": [2],
                "showDiff": true,
            }),
        );
    }

    #[test]
    fn test_entry_shape() {
        let test = TestResult::new("adds")
            .within(["math"])
            .in_file("tests/math.rs")
            .took(std::time::Duration::from_millis(12));
        let value = serde_json::to_value(Test::from(&test)).unwrap();

        assert_eq!(
            value,
            json!({
                "title": "adds",
                "fullTitle": "math adds",
                "file": "tests/math.rs",
                "duration": 12,
                "currentRetry": 0,
                "err": {},
            }),
        );
    }

    #[test]
    fn stacked_errors_are_listed() {
        let mut failure = Failure::new("first");
        failure.multiple.push(Failure::new("second"));

        assert_eq!(
            clean_cycles(&failure)["multiple"],
            json!([{"message": "second"}]),
        );
    }
}
