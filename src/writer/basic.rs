// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Console [`Writer`] printing the epilogue of a run.

use std::io;

use console::Term;
use derive_more::with_trait::{Deref, DerefMut};

use crate::{
    event::Run,
    term::CursorGuard,
    writer::{
        self,
        out::WriteStrExt as _,
        summarize::{Presenter, State, Tracker},
    },
    Config, Event, Writer,
};

/// Default [`Writer`] implementation outputting to an [`io::Write`] implementor
/// ([`io::Stdout`] by default).
///
/// Prints the summary of a run once it finishes. Colors are applied as
/// resolved in the [`Config`].
#[derive(Debug, Deref, DerefMut)]
pub struct Basic<Out: io::Write = io::Stdout> {
    /// [`io::Write`] implementor to write the output into.
    #[deref]
    #[deref_mut]
    output: Out,

    /// [`Tracker`] of the run.
    tracker: Tracker,

    /// [`Presenter`] of the summary.
    presenter: Presenter,

    /// Indicates whether the cursor is hidden while the run is in progress.
    hide_cursor: bool,

    /// [`CursorGuard`] of the run in progress.
    cursor: Option<CursorGuard>,
}

impl Basic {
    /// Creates a new [`Basic`] [`Writer`] outputting to [`io::Stdout`].
    #[must_use]
    pub fn stdout(config: &Config) -> Self {
        Self::new(io::stdout(), config)
    }
}

impl<Out: io::Write> Basic<Out> {
    /// Creates a new [`Basic`] [`Writer`] outputting to the given `output`.
    #[must_use]
    pub fn new(output: Out, config: &Config) -> Self {
        Self {
            output,
            tracker: Tracker::new(config.slow),
            presenter: Presenter::new(config),
            hide_cursor: config.terminal.interactive,
            cursor: None,
        }
    }

    /// Indicates whether the cursor is being managed by this [`Writer`] at the
    /// moment.
    #[must_use]
    pub const fn holds_cursor(&self) -> bool {
        self.cursor.is_some()
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

    /// Renders and writes the epilogue.
    fn report(&mut self) -> io::Result<()> {
        let text = self
            .presenter
            .epilogue(self.tracker.stats(), self.tracker.failures());
        self.output.write_str(text)?;
        self.output.flush()
    }
}

impl<Out: io::Write> Writer for Basic<Out> {
    async fn handle_event(&mut self, event: Event<Run>) {
        if !writer::track(&mut self.tracker, event) {
            let running = self.tracker.state() == State::Running;
            if running && self.hide_cursor && self.cursor.is_none() {
                self.cursor = CursorGuard::hide(Term::stdout())
                    .map(CursorGuard::watch_interrupts)
                    .map_err(|e| {
                        tracing::warn!(error = %e, "failed to hide cursor");
                    })
                    .ok();
            }
            return;
        }

        drop(self.cursor.take());
        if let Err(e) = self.report() {
            tracing::error!(error = %e, "failed to write summary");
        }
        _ = self.tracker.mark_reported();
    }
}

impl<Out: io::Write> writer::Stats for Basic<Out> {
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
