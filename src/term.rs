// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Terminal capabilities and terminal state cleanup.

use std::{io, sync::LazyLock};

use console::Term;
use tokio::{runtime, task::JoinHandle};

/// Width used when the terminal is not interactive or its size is unknown.
pub const FALLBACK_WIDTH: usize = 75;

/// Exit code of a process terminated by `SIGINT`.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Capabilities of the terminal reports are written to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Capabilities {
    /// Both the output and the diagnostic streams are attached to a terminal.
    pub interactive: bool,

    /// Usable width in columns.
    pub width: usize,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::non_interactive()
    }
}

impl Capabilities {
    /// Returns the [`Capabilities`] detected once per process.
    #[must_use]
    pub fn get() -> Self {
        /// Detected at first use.
        static DETECTED: LazyLock<Capabilities> =
            LazyLock::new(Capabilities::detect);

        *DETECTED
    }

    /// Detects [`Capabilities`] of the current process' standard streams.
    #[must_use]
    pub fn detect() -> Self {
        let stdout = Term::stdout();
        let interactive = stdout.is_term() && Term::stderr().is_term();
        let columns = interactive
            .then(|| stdout.size_checked())
            .flatten()
            .map(|(_rows, cols)| cols);
        Self::from_columns(interactive, columns)
    }

    /// Builds [`Capabilities`] out of a detected column count: 3/4 of it,
    /// floored, is usable.
    #[must_use]
    pub fn from_columns(interactive: bool, columns: Option<u16>) -> Self {
        let width = match columns {
            Some(cols) if interactive => usize::from(cols) * 3 / 4,
            _ => FALLBACK_WIDTH,
        };
        Self { interactive, width }
    }

    /// [`Capabilities`] of a non-interactive output.
    #[must_use]
    pub const fn non_interactive() -> Self {
        Self {
            interactive: false,
            width: FALLBACK_WIDTH,
        }
    }
}

/// Guard hiding the terminal cursor while alive.
///
/// The cursor is shown back on drop, and on an interrupt once
/// [`CursorGuard::watch_interrupts()`] is called.
#[derive(Debug)]
pub struct CursorGuard {
    /// [`Term`] the cursor is hidden in.
    term: Term,

    /// Whether the cursor was actually hidden.
    hidden: bool,

    /// Task running [`restore_cursor_on_interrupt()`], if spawned.
    watcher: Option<JoinHandle<()>>,
}

impl CursorGuard {
    /// Hides the cursor of the given [`Term`], if it's a terminal at all.
    ///
    /// # Errors
    ///
    /// If the hiding sequence cannot be written.
    pub fn hide(term: Term) -> io::Result<Self> {
        let hidden = term.is_term();
        if hidden {
            term.hide_cursor()?;
        }
        Ok(Self {
            term,
            hidden,
            watcher: None,
        })
    }

    /// Spawns [`restore_cursor_on_interrupt()`] for the hidden cursor, so an
    /// interrupt doesn't leave the terminal without one. The task is aborted
    /// once this guard is dropped.
    ///
    /// Does nothing if the cursor isn't hidden, or outside a [`tokio`]
    /// runtime.
    #[must_use]
    pub fn watch_interrupts(mut self) -> Self {
        if !self.hidden || self.watcher.is_some() {
            return self;
        }
        let Ok(rt) = runtime::Handle::try_current() else {
            tracing::debug!("no runtime to watch interrupts on");
            return self;
        };
        let term = self.term.clone();
        self.watcher = Some(rt.spawn(async move {
            if let Err(e) = restore_cursor_on_interrupt(term).await {
                tracing::warn!(error = %e, "failed to watch interrupts");
            }
        }));
        self
    }

    /// Indicates whether this guard has hidden the cursor.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Indicates whether interrupts are watched for this guard.
    #[must_use]
    pub const fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        if self.hidden {
            if let Err(e) = self.term.show_cursor() {
                tracing::warn!(error = %e, "failed to restore terminal cursor");
            }
        }
    }
}

/// Waits for an interrupt (`Ctrl+C`), restores the cursor of the given
/// [`Term`] and terminates the process with the conventional `130` code.
///
/// Installing the handler replaces the default `SIGINT` disposition, so the
/// process is terminated here once the terminal is back in its default state.
///
/// # Errors
///
/// If listening for the interrupt fails.
pub async fn restore_cursor_on_interrupt(term: Term) -> io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::debug!("interrupted, restoring terminal cursor");
    if let Err(e) = term.show_cursor() {
        tracing::warn!(error = %e, "failed to restore terminal cursor");
    }
    std::process::exit(INTERRUPTED_EXIT_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_is_three_quarters_floored() {
        let caps = Capabilities::from_columns(true, Some(101));

        assert!(caps.interactive);
        assert_eq!(caps.width, 75);
        assert_eq!(Capabilities::from_columns(true, Some(80)).width, 60);
    }

    #[test]
    fn width_falls_back_when_not_interactive() {
        assert_eq!(
            Capabilities::from_columns(false, Some(200)).width,
            FALLBACK_WIDTH,
        );
        assert_eq!(Capabilities::from_columns(true, None).width, FALLBACK_WIDTH);
        assert_eq!(Capabilities::default(), Capabilities::non_interactive());
    }

    #[test]
    fn detection_is_stable() {
        assert_eq!(Capabilities::get(), Capabilities::get());
    }

    #[test]
    fn cursor_guard_is_noop_without_terminal() {
        let guard = CursorGuard::hide(Term::buffered_stdout())
            .expect("nothing is written");

        if !Term::stdout().is_term() {
            assert!(!guard.is_hidden());
        }
    }

    #[tokio::test]
    async fn watches_interrupts_only_for_hidden_cursor() {
        let guard = CursorGuard::hide(Term::buffered_stdout())
            .expect("nothing is written")
            .watch_interrupts();

        assert_eq!(guard.is_watching(), guard.is_hidden());
        drop(guard);
    }
}
