// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of report generation.
//!
//! Only setup problems and I/O failures of the console output surface here.
//! Diff generation failures and cyclic cause chains are neutralized where they
//! happen and never become a [`ReportError`].

use std::io;

use derive_more::with_trait::{Display, Error};

use crate::writer::summarize::State;

/// Errors happening while turning a run's events into reports.
#[derive(Debug, Display, Error)]
pub enum ReportError {
    /// I/O error during output operations.
    #[display("I/O error: {_0}")]
    Io(io::Error),

    /// Failed to serialize a report.
    #[display("Serialization failed: {_0}")]
    Serialization(serde_json::Error),

    /// Requested output is not supported in the current environment.
    ///
    /// Raised eagerly at setup, before any run begins.
    #[display("Unsupported output: {reason}")]
    Unsupported {
        /// Reason why the output cannot be used.
        #[error(not(source))]
        reason: String,
    },

    /// Lifecycle event arrived in a [`State`] it's not valid in.
    #[display("Unexpected `{event}` event in `{}` state", state.as_str())]
    UnexpectedEvent {
        /// Name of the rejected event.
        #[error(not(source))]
        event: &'static str,

        /// [`State`] the event was observed in.
        #[error(not(source))]
        state: State,
    },
}

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    /// Creates a new [`ReportError::Unsupported`].
    #[must_use]
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is an I/O error.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Returns `true` if this error was raised for an out-of-order event.
    #[must_use]
    pub const fn is_unexpected_event(&self) -> bool {
        matches!(self, Self::UnexpectedEvent { .. })
    }
}

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}
