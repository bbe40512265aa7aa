// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Rendering core of test run reports.
//!
//! An external runner emits [`Run`] events into a [`Writer`]. Every writer
//! tracks the run with a [`Tracker`] and, once the run finishes, renders:
//! - a console summary ([`writer::Basic`]), with flattened cause chains and
//!   size-bounded diffs of failed assertions;
//! - a JSON report ([`writer::Json`]);
//! - an xUnit XML report ([`writer::Xunit`]).
//!
//! ```rust
//! # use std::time::Duration;
//! use tally::{event::Run, writer::Basic, Config, Event, Failure, TestResult, Writer as _};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut writer = Basic::new(Vec::new(), &Config::default());
//! let test = TestResult::new("adds").took(Duration::from_millis(3));
//!
//! for ev in [
//!     Run::Started { total: 1 },
//!     Run::test_started(test.clone()),
//!     Run::test_failed(test.clone(), Failure::new("1 != 2").with_values(1, 2)),
//!     Run::test_finished(test),
//!     Run::Finished,
//! ] {
//!     writer.handle_event(Event::new(ev)).await;
//! }
//!
//! let out = String::from_utf8(writer.into_output()).unwrap();
//! assert!(out.contains("1 failing"));
//! # }
//! ```
//!
//! [`Run`]: event::Run
//! [`Tracker`]: writer::summarize::Tracker

pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod failure;
pub mod term;
pub mod test;
pub mod writer;

#[doc(inline)]
pub use self::{
    config::Config,
    error::ReportError,
    event::Event,
    failure::Failure,
    test::{Speed, TestResult},
    writer::{Stats as WriterStats, Writer},
};
