// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reduction of a [`Failure`] and its cause chain into printable text.

use std::collections::HashSet;

use crate::failure::{Failure, Identity};

/// Marker rendered in place of an already visited [`Failure`].
pub const CIRCULAR: &str = "<circular>";

/// Prefix of a flattened cause, appended to the stack of its wrapper.
const CAUSED_BY: &str = "\n   Caused by: ";

/// [`Failure`] reduced to text.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Flattened {
    /// Message of the [`Failure`] itself.
    pub message: String,

    /// Leading portion of the stack text, up to and including the message.
    pub msg: String,

    /// Remainder of the stack text, with flattened causes appended.
    pub stack: String,
}

impl Flattened {
    fn circular() -> Self {
        Self {
            message: CIRCULAR.to_owned(),
            msg: CIRCULAR.to_owned(),
            stack: String::new(),
        }
    }
}

/// Flattens the given [`Failure`] along with its whole cause chain.
///
/// Terminates on cyclic chains: a cause visited already is rendered as
/// [`CIRCULAR`] instead of being followed.
#[must_use]
pub fn flatten(failure: &Failure) -> Flattened {
    flatten_seen(failure, &mut HashSet::new())
}

/// Flattens the given [`Failure`], treating the `seen` [`Identity`]s as
/// visited already.
#[must_use]
pub fn flatten_seen(failure: &Failure, seen: &mut HashSet<Identity>) -> Flattened {
    let message = failure.display_message().to_owned();
    let raw = failure.stack.as_deref().unwrap_or(&message);

    let located = if message.is_empty() {
        None
    } else {
        raw.find(&message)
    };
    let (msg, mut stack) = match located {
        None => (message.clone(), raw.to_owned()),
        Some(at) => {
            let (head, rest) = raw.split_at(at + message.len());
            let mut rest = rest.chars();
            _ = rest.next();
            (head.to_owned(), rest.as_str().to_owned())
        }
    };

    if let Some(cause) = failure.cause() {
        _ = seen.insert(failure.identity());
        let cause = if seen.contains(&cause.identity()) {
            Flattened::circular()
        } else {
            flatten_seen(cause, seen)
        };

        stack.push_str(CAUSED_BY);
        stack.push_str(&cause.msg);
        if !cause.stack.is_empty() {
            stack.push('\n');
            stack.push_str(&cause.stack);
        }
    }

    Flattened {
        message,
        msg,
        stack,
    }
}
