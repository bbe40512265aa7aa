// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Lifecycle state of a run, as seen by a [`Tracker`].
//!
//! [`Tracker`]: super::Tracker

use crate::event::Run;

/// Possible states of a [`Tracker`].
///
/// Moves strictly forward: `Idle → Running → Reporting → Done`.
///
/// [`Tracker`]: super::Tracker
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum State {
    /// [`Run::Started`] event hasn't been encountered yet.
    #[default]
    Idle,

    /// [`Run::Started`] event was encountered, but [`Run::Finished`] wasn't.
    ///
    /// The only state suite and test events are valid in.
    Running,

    /// [`Run::Finished`] event was encountered, but the report wasn't emitted
    /// yet.
    Reporting,

    /// Report was emitted.
    Done,
}

impl State {
    /// Indicates whether the given [`Run`] event is valid in this [`State`].
    #[must_use]
    pub const fn accepts(self, ev: &Run) -> bool {
        match ev {
            Run::Started { .. } => matches!(self, Self::Idle),
            Run::Suite(..) | Run::Test(..) | Run::Finished => {
                matches!(self, Self::Running)
            }
        }
    }

    /// Returns the [`State`] the given [`Run`] event leads to.
    #[must_use]
    pub const fn next(self, ev: &Run) -> Self {
        match ev {
            Run::Started { .. } => Self::Running,
            Run::Finished => Self::Reporting,
            Run::Suite(..) | Run::Test(..) => self,
        }
    }

    /// Indicates whether the run has finished (regardless of the report being
    /// emitted).
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Reporting | Self::Done)
    }

    /// Returns a string representation of this [`State`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Reporting => "reporting",
            Self::Done => "done",
        }
    }
}
