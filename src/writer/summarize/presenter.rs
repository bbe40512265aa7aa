// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Textual summary of a finished run.

use std::{iter, time::Duration};

use itertools::Itertools as _;
use lazy_regex::regex_captures;

use crate::{
    writer::{
        diff,
        flatten::flatten,
        out::{Color, Styles},
    },
    Config, Failure, TestResult,
};

use super::RunStats;

/// Renderer of the epilogue of a run and of its failure listing.
#[derive(Clone, Copy, Debug)]
pub struct Presenter {
    /// [`Styles`] to render with.
    styles: Styles,

    /// Indicates whether diffs are never rendered.
    hide_diff: bool,

    /// [`diff::Engine`] rendering diffs of failed assertions.
    diff: diff::Engine,
}

impl Presenter {
    /// Creates a new [`Presenter`] out of the given [`Config`].
    #[must_use]
    pub const fn new(config: &Config) -> Self {
        Self {
            styles: config.styles(),
            hide_diff: config.hide_diff,
            diff: diff::Engine::new(config.diff_options(), config.styles()),
        }
    }

    /// Renders the final summary of a run: counts, total duration and the
    /// numbered listing of failed tests.
    ///
    /// Pure: rendering the same [`RunStats`] twice yields the same text.
    #[must_use]
    pub fn epilogue(&self, stats: &RunStats, failures: &[TestResult]) -> String {
        let s = &self.styles;
        let mut out = String::from("\n");

        out.push_str(&format!(
            "{}{}{}\n",
            s.paint(Color::BrightPass, " "),
            s.paint(Color::Green, format!(" {} passing", stats.passes)),
            s.paint(Color::Light, format!(" ({})", humanize(stats.duration))),
        ));
        if stats.pending > 0 {
            out.push_str(&format!(
                "{}{}\n",
                s.paint(Color::Pending, " "),
                s.paint(Color::Pending, format!(" {} pending", stats.pending)),
            ));
        }
        if stats.failures > 0 {
            out.push_str(&format!(
                "{}\n",
                s.paint(Color::Fail, format!("  {} failing", stats.failures)),
            ));
            out.push_str(&self.list(failures));
            out.push('\n');
        }
        out.push('\n');
        out
    }

    /// Renders numbered blocks of the given failed tests.
    #[must_use]
    pub fn list(&self, failures: &[TestResult]) -> String {
        iter::once("\n".to_owned())
            .chain(
                failures
                    .iter()
                    .enumerate()
                    .map(|(i, test)| self.failure_block(i + 1, test)),
            )
            .collect()
    }

    /// Renders a block of the failed `test` under the given `index`.
    ///
    /// The primary error and every error stacked on it are rendered under the
    /// same index.
    #[must_use]
    pub fn failure_block(&self, index: usize, test: &TestResult) -> String {
        let mut out = self
            .styles
            .paint(
                Color::ErrorTitle,
                format!("  {index}) {}:\n", title_path(test)),
            )
            .into_owned();
        if let Some(err) = &test.err {
            for failure in iter::once(err).chain(&err.multiple) {
                out.push_str(&self.error(failure));
                out.push('\n');
            }
        }
        out
    }

    /// Renders message, diff and stack of a single [`Failure`].
    fn error(&self, failure: &Failure) -> String {
        let s = &self.styles;
        let flat = flatten(failure);
        let msg = if failure.uncaught {
            format!("Uncaught {}", flat.msg)
        } else {
            flat.msg
        };
        let stack = flat.stack.split('\n').map(|l| format!("  {l}")).join("\n");
        let stack = s.paint(Color::ErrorStack, format!("\n{stack}\n"));

        let values = failure.actual.as_ref().zip(failure.expected.as_ref());
        match values.filter(|_| !self.hide_diff && diff::applies(failure)) {
            Some((actual, expected)) => {
                let head = regex_captures!(r"^([^:]+): expected", &flat.message)
                    .map_or(msg.as_str(), |(_, head)| head);
                format!(
                    "\n      {}{}{stack}",
                    s.paint(Color::ErrorMessage, head),
                    self.diff.diff(actual, expected),
                )
            }
            None => format!(
                "{}{stack}",
                s.paint(Color::ErrorMessage, format!("     {msg}")),
            ),
        }
    }
}

/// Joins the title path of the `test`, indenting each level two spaces more
/// than its parent.
fn title_path(test: &TestResult) -> String {
    test.title_path()
        .enumerate()
        .map(|(level, title)| {
            if level == 0 {
                title.to_owned()
            } else {
                format!("\n     {}{title}", "  ".repeat(level))
            }
        })
        .collect()
}

/// Humanizes the given [`Duration`] at millisecond precision.
fn humanize(duration: Duration) -> String {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    humantime::format_duration(Duration::from_millis(millis)).to_string()
}
