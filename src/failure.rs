// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Failures of tests and their cause chains.
//!
//! A [`Failure`] is what reporters know about an error raised by a test. It's
//! populated once, at the boundary where a native error value is first
//! observed (see [`Failure::from_error()`] and [`Failure::from_panic()`]), so
//! rendering code never has to guess the shape of an error.

use std::{
    any::Any,
    error::Error as StdError,
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use once_cell::sync::OnceCell;
use serde_json::Value;

/// Message used for panic payloads which are neither [`String`] nor [`str`].
const UNRESOLVED_PAYLOAD: &str = "(Could not resolve panic payload)";

/// Depth at which a [`source`] chain stops being followed.
///
/// [`source`]: StdError::source
const MAX_SOURCE_DEPTH: usize = 128;

/// Source of unique [`Identity`]s.
static NEXT_IDENTITY: AtomicUsize = AtomicUsize::new(0);

/// Identity of a [`Failure`], preserved across its clones.
///
/// Used to detect cycles in cause chains.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Identity(usize);

impl Identity {
    fn next() -> Self {
        Self(NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed))
    }
}

/// Kind of a value a test failed with.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Kind {
    /// Genuine error (an [`std::error::Error`] or an assertion panic).
    #[default]
    Error,

    /// Arbitrary thrown value, carrying no error semantics.
    Value,
}

/// Link from a [`Failure`] to the [`Failure`] it wraps.
///
/// The link is a set-once shared slot, so it may be created before its target
/// exists. This allows expressing self- and mutually-referential chains.
///
/// Links are strong, so a cyclic chain keeps itself alive: its [`Failure`]s
/// are never freed. Cycles are expected to be rare and short-lived (one per
/// failed test of a run), so this is tolerated.
#[derive(Clone, Default)]
pub struct Cause(Arc<OnceCell<Failure>>);

impl Cause {
    /// Creates a [`Cause`] pointing to the given [`Failure`].
    #[must_use]
    pub fn new(failure: Failure) -> Self {
        Self(Arc::new(OnceCell::with_value(failure)))
    }

    /// Creates a [`Cause`] whose target is to be [`resolve`]d later.
    ///
    /// [`resolve`]: Cause::resolve
    #[must_use]
    pub fn pending() -> Self {
        Self::default()
    }

    /// Points this [`Cause`] to the given [`Failure`].
    ///
    /// # Errors
    ///
    /// Gives the `failure` back if this [`Cause`] is resolved already.
    pub fn resolve(&self, failure: Failure) -> Result<(), Failure> {
        self.0.set(failure)
    }

    /// Returns the [`Failure`] this [`Cause`] points to, if resolved.
    #[must_use]
    pub fn get(&self) -> Option<&Failure> {
        self.0.get()
    }
}

// Printing the target could recurse endlessly on a cyclic chain.
impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cause")
            .field(&self.get().map(Failure::identity))
            .finish()
    }
}

/// Information about a single error a test failed with.
#[derive(Clone, Debug)]
pub struct Failure {
    /// [`Identity`] of this [`Failure`].
    id: Identity,

    /// Plain message of the error.
    pub message: String,

    /// Custom string representation of the error, preferred over the
    /// [`Failure::message`] when present.
    pub inspect: Option<String>,

    /// Raw stack text of the error, usually starting with its message.
    pub stack: Option<String>,

    /// Error this one wraps.
    pub cause: Option<Cause>,

    /// Actual value of a failed assertion.
    pub actual: Option<Value>,

    /// Expected value of a failed assertion.
    pub expected: Option<Value>,

    /// Indicator whether a diff between [`Failure::actual`] and
    /// [`Failure::expected`] may be shown.
    pub show_diff: bool,

    /// Indicator whether the error escaped the test (e.g. raised
    /// asynchronously).
    pub uncaught: bool,

    /// [`Kind`] of the value the test failed with.
    pub kind: Kind,

    /// Additional errors raised by the same test, in the order they were
    /// raised.
    pub multiple: Vec<Failure>,
}

impl Failure {
    /// Creates a new [`Failure`] with the given `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: Identity::next(),
            message: message.into(),
            inspect: None,
            stack: None,
            cause: None,
            actual: None,
            expected: None,
            show_diff: true,
            uncaught: false,
            kind: Kind::Error,
            multiple: Vec::new(),
        }
    }

    /// Creates a new [`Failure`] out of an arbitrary thrown value, described
    /// by the given `message`.
    #[must_use]
    pub fn thrown(message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Value,
            ..Self::new(message)
        }
    }

    /// Converts the given [`std::error::Error`] and its [`source`] chain into
    /// a [`Failure`].
    ///
    /// A [`source`] chain coming back to an already visited error is kept as
    /// a cycle rather than being followed endlessly. Errors are told apart by
    /// their address together with their type, so a newtype wrapper sharing
    /// its address with the error it wraps is not mistaken for a cycle. A
    /// chain deeper than `128` errors is cut.
    ///
    /// Note, that a cyclic chain is never freed (see [`Cause`]).
    ///
    /// [`source`]: StdError::source
    #[must_use]
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        Self::convert_error(err, &mut Vec::new())
    }

    fn convert_error(
        err: &(dyn StdError + 'static),
        visited: &mut Vec<(*const (dyn StdError + 'static), Cause)>,
    ) -> Self {
        let slot = Cause::pending();
        visited.push((std::ptr::from_ref(err), slot.clone()));

        let mut failure = Self::new(err.to_string());
        if let Some(source) = err.source() {
            // Wide pointers: both the address and the vtable must match.
            let known = visited.iter().find_map(|(seen, cause)| {
                std::ptr::eq(*seen, source).then(|| cause.clone())
            });
            failure.cause = match known {
                Some(cause) => Some(cause),
                None if visited.len() < MAX_SOURCE_DEPTH => {
                    Some(Cause::new(Self::convert_error(source, visited)))
                }
                None => {
                    tracing::debug!(
                        depth = MAX_SOURCE_DEPTH,
                        "error source chain is cut",
                    );
                    None
                }
            };
        }

        // Fresh slot, so resolving cannot fail.
        _ = slot.resolve(failure.clone());
        failure
    }

    /// Converts the given panic payload into a [`Failure`].
    ///
    /// [`String`] and [`str`] payloads (assertion messages) become
    /// [`Kind::Error`], anything else is a [`Kind::Value`].
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        payload
            .downcast_ref::<String>()
            .map(|s| Self::new(s.clone()))
            .or_else(|| payload.downcast_ref::<&str>().map(|s| Self::new(*s)))
            .unwrap_or_else(|| Self::thrown(UNRESOLVED_PAYLOAD))
    }

    /// Sets the raw stack text.
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Sets the custom string representation.
    #[must_use]
    pub fn with_inspect(mut self, inspect: impl Into<String>) -> Self {
        self.inspect = Some(inspect.into());
        self
    }

    /// Makes this [`Failure`] wrap the given one.
    #[must_use]
    pub fn caused_by(self, cause: Self) -> Self {
        self.linked_to(Cause::new(cause))
    }

    /// Makes this [`Failure`] wrap whatever the given [`Cause`] points to.
    #[must_use]
    pub fn linked_to(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Attaches `actual` and `expected` values of a failed assertion.
    #[must_use]
    pub fn with_values(
        mut self,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
    ) -> Self {
        self.actual = Some(actual.into());
        self.expected = Some(expected.into());
        self
    }

    /// Forbids showing a diff for this [`Failure`].
    #[must_use]
    pub fn without_diff(mut self) -> Self {
        self.show_diff = false;
        self
    }

    /// Marks this [`Failure`] as an uncaught one.
    #[must_use]
    pub fn uncaught(mut self) -> Self {
        self.uncaught = true;
        self
    }

    /// Returns the [`Identity`] of this [`Failure`].
    #[must_use]
    pub const fn identity(&self) -> Identity {
        self.id
    }

    /// Indicates whether this [`Failure`] is a genuine error rather than an
    /// arbitrary thrown value.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == Kind::Error
    }

    /// Returns the [`Failure`] this one wraps, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Self> {
        self.cause.as_ref().and_then(Cause::get)
    }

    /// Returns the message to display: the custom representation if any, or
    /// the plain message otherwise.
    #[must_use]
    pub fn display_message(&self) -> &str {
        self.inspect.as_deref().unwrap_or(&self.message)
    }

    /// Returns the raw stack text, falling back to the
    /// [`display_message`](Failure::display_message).
    #[must_use]
    pub fn raw_stack(&self) -> &str {
        self.stack.as_deref().unwrap_or_else(|| self.display_message())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_message())
    }
}
