// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [xUnit XML report][1] [`Writer`] implementation.
//!
//! [1]: https://llg.cubic.org/docs/junit

use std::{borrow::Cow, fmt::Write as _, io, time::SystemTime};

use crate::{
    error::Result,
    event::Run,
    test::State,
    writer::{
        self,
        destination::Destination,
        diff,
        out::Styles,
        summarize::{RunStats, Tracker},
    },
    Config, Event, TestResult, Writer,
};

/// [xUnit XML report][1] [`Writer`] implementation outputting to a
/// [`Destination`], falling back to an [`io::Write`] implementor.
///
/// The whole `<testsuite>` is written at once, when the run finishes.
///
/// [1]: https://llg.cubic.org/docs/junit
#[derive(Debug)]
pub struct Xunit<Out: io::Write = io::Stdout> {
    /// [`io::Write`] implementor to output XML report into, unless a file
    /// [`Destination`] is configured.
    output: Out,

    /// [`Destination`] of the report.
    destination: Destination,

    /// [`Tracker`] of the run.
    tracker: Tracker,

    /// Name of the `<testsuite>`.
    suite_name: String,

    /// Indicates whether diffs are never rendered.
    hide_diff: bool,

    /// [`diff::Engine`] rendering uncolored diffs.
    diff: diff::Engine,
}

impl<Out: io::Write> Xunit<Out> {
    /// Creates a new [`Xunit`] [`Writer`], writing the report to the
    /// configured [`Config::output`] file or into the given `output`.
    ///
    /// # Errors
    ///
    /// If the configured file output is unsupported.
    pub fn new(output: Out, config: &Config) -> Result<Self> {
        Ok(Self {
            output,
            destination: Destination::new(config.output.clone())?,
            tracker: Tracker::new(config.slow),
            suite_name: config.suite_name.clone(),
            hide_diff: config.hide_diff,
            diff: diff::Engine::new(config.diff_options(), Styles::plain()),
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

    /// Renders the XML report of the run, timestamped with the given time.
    #[must_use]
    pub fn render(&self, now: SystemTime) -> String {
        let stats = self.tracker.stats();
        let mut xml = String::new();
        _ = writeln!(xml, "{}", self.suite_tag(stats, now));
        for test in self.tracker.tests() {
            _ = writeln!(xml, "{}", self.test_case(test));
        }
        xml.push_str("</testsuite>\n");
        xml
    }

    fn suite_tag(&self, stats: &RunStats, now: SystemTime) -> String {
        let skipped = stats
            .tests
            .saturating_sub(stats.failures)
            .saturating_sub(stats.passes);
        tag(
            "testsuite",
            &[
                ("name", self.suite_name.clone()),
                ("tests", stats.tests.to_string()),
                ("failures", "0".to_owned()),
                ("errors", stats.failures.to_string()),
                ("skipped", skipped.to_string()),
                ("timestamp", humantime::format_rfc3339_seconds(now).to_string()),
                ("time", stats.duration.as_secs_f64().to_string()),
            ],
            Content::Open,
        )
    }

    fn test_case(&self, test: &TestResult) -> String {
        let attrs = [
            ("classname", test.parent_title()),
            ("name", test.title.clone()),
            (
                "file",
                test.file
                    .as_ref()
                    .map(|f| f.display().to_string())
                    .unwrap_or_default(),
            ),
            ("time", test.duration.as_secs_f64().to_string()),
        ];
        match (test.state, &test.err) {
            (Some(State::Failed), Some(err)) => {
                let diff = match (&err.actual, &err.expected) {
                    (Some(actual), Some(expected))
                        if !self.hide_diff && diff::applies(err) =>
                    {
                        format!("\n{}", self.diff.diff(actual, expected))
                    }
                    _ => String::new(),
                };
                let failure = tag(
                    "failure",
                    &[],
                    Content::Text(&format!(
                        "{}{}\n{}",
                        escape(&err.message),
                        escape(&diff),
                        escape(err.raw_stack()),
                    )),
                );
                tag("testcase", &attrs, Content::Text(&failure))
            }
            (Some(State::Pending), _) => tag(
                "testcase",
                &attrs,
                Content::Text(&tag("skipped", &[], Content::Empty)),
            ),
            _ => tag("testcase", &attrs, Content::Empty),
        }
    }
}

impl<Out: io::Write> Writer for Xunit<Out> {
    async fn handle_event(&mut self, event: Event<Run>) {
        if writer::track(&mut self.tracker, event) {
            let xml = self.render(SystemTime::now());
            if let Err(e) = self.destination.emit(&xml, &mut self.output) {
                tracing::error!(error = %e, "failed to write xUnit report");
            }
            _ = self.tracker.mark_reported();
        }
    }
}

impl<Out: io::Write> writer::Stats for Xunit<Out> {
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

/// Content of an XML element.
#[derive(Clone, Copy, Debug)]
enum Content<'a> {
    /// Self-closing element.
    Empty,

    /// Opening tag only.
    Open,

    /// Already escaped inner text or markup.
    Text(&'a str),
}

/// Renders an XML element with the given escaped `attrs`.
fn tag(name: &str, attrs: &[(&str, String)], content: Content<'_>) -> String {
    let mut out = format!("<{name}");
    for (key, value) in attrs {
        _ = write!(out, " {key}=\"{}\"", escape(value));
    }
    match content {
        Content::Empty => out.push_str("/>"),
        Content::Open => out.push('>'),
        Content::Text(text) => {
            _ = write!(out, ">{text}</{name}>");
        }
    }
    out
}

/// Escapes XML special characters.
#[must_use]
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
