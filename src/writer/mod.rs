// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for outputting [`Run`] events.
//!
//! Every concrete [`Writer`] owns a [`summarize::Tracker`] and reads its
//! results when the run finishes. The [`Reporter`] picks one of them by a
//! [`Format`] tag.

pub mod basic;
pub mod destination;
pub mod diff;
pub mod flatten;
pub mod json;
pub mod out;
pub mod summarize;
pub mod xunit;

use std::{future::Future, io, str::FromStr};

use crate::{error::Result, event::Run, Config, Event};

use self::summarize::{State, Tracker};

#[doc(inline)]
pub use self::{
    basic::Basic,
    destination::Destination,
    json::Json,
    out::{Styles, Symbols},
    xunit::Xunit,
};

/// Writer of [`Run`] events to some output.
///
/// Events are expected in the order a runner emits them; out-of-order events
/// are logged and dropped.
pub trait Writer {
    /// Handles the given [`Run`] event.
    fn handle_event(&mut self, event: Event<Run>) -> impl Future<Output = ()>;
}

/// [`Writer`] tracking a number of passed, failed and pending tests.
pub trait Stats: Writer {
    /// Returns number of passed tests.
    #[must_use]
    fn passed(&self) -> usize;

    /// Returns number of failures.
    #[must_use]
    fn failed(&self) -> usize;

    /// Returns number of pending tests.
    #[must_use]
    fn pending(&self) -> usize;

    /// Indicates whether there were failures during execution.
    #[must_use]
    fn execution_has_failed(&self) -> bool {
        self.failed() > 0
    }
}

/// Format of a report.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Format {
    /// Console summary, see [`Basic`].
    #[default]
    Summary,

    /// JSON report, see [`Json`].
    Json,

    /// xUnit XML report, see [`Xunit`].
    Xunit,
}

impl FromStr for Format {
    type Err = &'static str;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "json" => Ok(Self::Json),
            "xunit" => Ok(Self::Xunit),
            _ => Err("possible options: summary, json, xunit"),
        }
    }
}

/// [`Writer`] of a [`Format`] chosen at runtime.
#[derive(Debug)]
pub enum Reporter<Out: io::Write = io::Stdout> {
    /// [`Basic`] console summary.
    Summary(Basic<Out>),

    /// [`Json`] report.
    Json(Json<Out>),

    /// [`Xunit`] report.
    Xunit(Xunit<Out>),
}

impl Reporter {
    /// Creates a new [`Reporter`] of the configured [`Format`], outputting to
    /// [`io::Stdout`].
    ///
    /// # Errors
    ///
    /// If the configured output is unsupported.
    pub fn stdout(config: &Config) -> Result<Self> {
        Self::new(io::stdout(), config)
    }
}

impl<Out: io::Write> Reporter<Out> {
    /// Creates a new [`Reporter`] of the configured [`Format`], outputting to
    /// the given `output`.
    ///
    /// # Errors
    ///
    /// If the configured output is unsupported. Checked here, before any run
    /// begins.
    pub fn new(output: Out, config: &Config) -> Result<Self> {
        Ok(match config.format {
            Format::Summary => Self::Summary(Basic::new(output, config)),
            Format::Json => Self::Json(Json::new(output, config)?),
            Format::Xunit => Self::Xunit(Xunit::new(output, config)?),
        })
    }

    /// Returns the [`Tracker`] of the underlying [`Writer`].
    #[must_use]
    pub const fn tracker(&self) -> &Tracker {
        match self {
            Self::Summary(w) => w.tracker(),
            Self::Json(w) => w.tracker(),
            Self::Xunit(w) => w.tracker(),
        }
    }

    /// Unwraps this [`Reporter`] into its output.
    #[must_use]
    pub fn into_output(self) -> Out {
        match self {
            Self::Summary(w) => w.into_output(),
            Self::Json(w) => w.into_output(),
            Self::Xunit(w) => w.into_output(),
        }
    }
}

impl<Out: io::Write> Writer for Reporter<Out> {
    async fn handle_event(&mut self, event: Event<Run>) {
        match self {
            Self::Summary(w) => w.handle_event(event).await,
            Self::Json(w) => w.handle_event(event).await,
            Self::Xunit(w) => w.handle_event(event).await,
        }
    }
}

impl<Out: io::Write> Stats for Reporter<Out> {
    fn passed(&self) -> usize {
        self.tracker().stats().passes
    }

    fn failed(&self) -> usize {
        self.tracker().stats().failures
    }

    fn pending(&self) -> usize {
        self.tracker().stats().pending
    }
}

/// Applies the `event` to the `tracker`, logging and dropping it if it's
/// rejected.
///
/// Returns `true` once the run has finished and its report is due.
pub(crate) fn track(tracker: &mut Tracker, event: Event<Run>) -> bool {
    if let Err(e) = tracker.handle(event) {
        tracing::warn!(error = %e, "dropping lifecycle event");
        return false;
    }
    tracker.state() == State::Reporting
}
