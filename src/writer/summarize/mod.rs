// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Shared rendering core of every [`Writer`]: run statistics and their
//! textual summary.
//!
//! Concrete [`Writer`]s hold a [`Tracker`] (and a [`Presenter`], if they
//! render text) rather than extending some base [`Writer`].
//!
//! [`Writer`]: crate::Writer

mod presenter;
mod state;
mod stats;
mod tracker;

#[doc(inline)]
pub use self::{
    presenter::Presenter, state::State, stats::RunStats, tracker::Tracker,
};
