// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for writing output: colour and symbol themes, and string sinks.

use std::{borrow::Cow, io, str};

use console::Style;
use derive_more::with_trait::{Deref, DerefMut, Display, From, Into};
use itertools::Itertools as _;

/// Semantic tags of coloured output.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Color {
    /// Passed test title.
    Pass,

    /// Failed test title.
    Fail,

    /// Emphasized passing marker.
    BrightPass,

    /// Emphasized failing marker.
    BrightFail,

    /// Emphasized warning.
    BrightYellow,

    /// Pending test.
    Pending,

    /// Suite title.
    Suite,

    /// Title of a failure block.
    ErrorTitle,

    /// Message of a failure.
    ErrorMessage,

    /// Stack of a failure.
    ErrorStack,

    /// Check mark of a passed test.
    Checkmark,

    /// [`Speed::Fast`] duration.
    ///
    /// [`Speed::Fast`]: crate::Speed::Fast
    Fast,

    /// [`Speed::Medium`] duration.
    ///
    /// [`Speed::Medium`]: crate::Speed::Medium
    Medium,

    /// [`Speed::Slow`] duration.
    ///
    /// [`Speed::Slow`]: crate::Speed::Slow
    Slow,

    /// Plain green.
    Green,

    /// Dimmed text.
    Light,

    /// Line numbers of an inline diff.
    DiffGutter,

    /// Added (expected) lines of a unified diff.
    DiffAdded,

    /// Removed (actual) lines of a unified diff.
    DiffRemoved,

    /// Added (expected) words of an inline diff.
    DiffAddedInline,

    /// Removed (actual) words of an inline diff.
    DiffRemovedInline,
}

impl Color {
    /// Returns the [`Style`] this [`Color`] is rendered with.
    #[must_use]
    pub fn style(self) -> Style {
        let dim = || Style::new().black().bright();
        match self {
            Self::Suite | Self::ErrorTitle => Style::new(),
            Self::Pass | Self::ErrorStack | Self::Fast | Self::Light => dim(),
            Self::DiffGutter => dim(),
            Self::Fail | Self::ErrorMessage | Self::Slow => Style::new().red(),
            Self::DiffRemoved => Style::new().red(),
            Self::BrightPass => Style::new().green().bright(),
            Self::BrightFail => Style::new().red().bright(),
            Self::BrightYellow => Style::new().yellow().bright(),
            Self::Pending => Style::new().cyan(),
            Self::Medium => Style::new().yellow(),
            Self::Checkmark | Self::Green | Self::DiffAdded => {
                Style::new().green()
            }
            Self::DiffAddedInline => Style::new().black().on_green(),
            Self::DiffRemovedInline => Style::new().black().on_red(),
        }
    }
}

/// Colour theme of terminal output.
///
/// When colouring is off, every method here is the identity function.
#[derive(Clone, Copy, Debug, Default)]
pub struct Styles {
    /// Indicates whether colours are applied.
    pub is_present: bool,
}

impl Styles {
    /// Creates new [`Styles`], applying colours only if `enabled`.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self {
            is_present: enabled,
        }
    }

    /// Creates [`Styles`] never applying any colours.
    #[must_use]
    pub const fn plain() -> Self {
        Self::new(false)
    }

    /// If colours are on, colors `input` with the given [`Color`], or leaves
    /// it "as is" otherwise.
    #[must_use]
    pub fn paint<'a>(
        &self,
        color: Color,
        input: impl Into<Cow<'a, str>>,
    ) -> Cow<'a, str> {
        let input = input.into();
        if self.is_present {
            color
                .style()
                .force_styling(true)
                .apply_to(input)
                .to_string()
                .into()
        } else {
            input
        }
    }

    /// Colors each line of `input` separately, so that escape sequences never
    /// span line breaks.
    #[must_use]
    pub fn paint_lines(&self, color: Color, input: &str) -> String {
        input.split('\n').map(|line| self.paint(color, line)).join("\n")
    }

    /// Shortcut for [`Color::BrightPass`].
    #[must_use]
    pub fn ok<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(Color::BrightPass, input)
    }

    /// Shortcut for [`Color::Fail`].
    #[must_use]
    pub fn err<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(Color::Fail, input)
    }
}

/// Glyph tags of terminal output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Symbol {
    /// Passed test.
    Ok,

    /// Failed test.
    Err,

    /// Progress dot.
    Dot,

    /// Separator.
    Comma,

    /// Warning.
    Bang,
}

/// Symbol theme of terminal output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Symbols {
    /// Indicates whether only fallback glyphs are used.
    pub ascii: bool,
}

impl Default for Symbols {
    fn default() -> Self {
        Self::detect()
    }
}

impl Symbols {
    /// Picks glyphs appropriate for the current platform: Windows consoles get
    /// the fallback set.
    #[must_use]
    pub const fn detect() -> Self {
        Self {
            ascii: cfg!(windows),
        }
    }

    /// Returns the glyph for the given [`Symbol`].
    #[must_use]
    pub const fn get(&self, symbol: Symbol) -> &'static str {
        match (symbol, self.ascii) {
            (Symbol::Ok, false) => "✔",
            (Symbol::Ok, true) => "√",
            (Symbol::Err, false) => "✖",
            (Symbol::Err, true) => "×",
            (Symbol::Dot, false) => "․",
            (Symbol::Dot, true) => ".",
            (Symbol::Comma, _) => ",",
            (Symbol::Bang, _) => "!",
        }
    }
}

/// [`io::Write`] extension for easier manipulation with strings.
pub trait WriteStrExt: io::Write {
    /// Writes the given `string` into this writer.
    ///
    /// # Errors
    ///
    /// If this writer fails to write the given `string`.
    fn write_str(&mut self, string: impl AsRef<str>) -> io::Result<()> {
        self.write_all(string.as_ref().as_bytes())
    }

    /// Writes the given `string` into this writer followed by a newline.
    ///
    /// # Errors
    ///
    /// If this writer fails to write the given `string`.
    fn write_line(&mut self, string: impl AsRef<str>) -> io::Result<()> {
        self.write_str(string.as_ref())
            .and_then(|()| self.write_str("\n"))
    }
}

impl<T: io::Write + ?Sized> WriteStrExt for T {}

/// [`String`] wrapper implementing [`io::Write`].
#[derive(
    Clone,
    Debug,
    Default,
    Deref,
    DerefMut,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
pub struct WritableString(pub String);

impl io::Write for WritableString {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.push_str(
            str::from_utf8(buf)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
        );
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_styles_are_identity() {
        let styles = Styles::plain();

        for color in [Color::Pass, Color::DiffAdded, Color::DiffRemovedInline] {
            assert_eq!(styles.paint(color, "text"), "text");
        }
        assert_eq!(styles.paint_lines(Color::Fail, "a\nb"), "a\nb");
    }

    #[test]
    fn enabled_styles_emit_ansi_codes() {
        let styles = Styles::new(true);

        let added = styles.paint(Color::DiffAdded, "+bar");
        assert!(added.starts_with("\x1b[32m"), "{added:?}");
        assert!(added.contains("+bar"));

        let removed = styles.paint(Color::DiffRemoved, "-foo");
        assert!(removed.starts_with("\x1b[31m"), "{removed:?}");
    }

    #[test]
    fn paint_lines_colors_each_line() {
        let styles = Styles::new(true);

        let painted = styles.paint_lines(Color::Green, "a\nb");
        let lines = painted.split('\n').collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.starts_with("\x1b[32m")));
    }

    #[test]
    fn symbols_have_fallbacks() {
        let unicode = Symbols { ascii: false };
        let ascii = Symbols { ascii: true };

        assert_eq!(unicode.get(Symbol::Ok), "✔");
        assert_eq!(ascii.get(Symbol::Ok), "√");
        assert_eq!(unicode.get(Symbol::Err), "✖");
        assert_eq!(ascii.get(Symbol::Err), "×");
        assert_eq!(ascii.get(Symbol::Dot), ".");
        assert_eq!(ascii.get(Symbol::Comma), unicode.get(Symbol::Comma));
        assert_eq!(ascii.get(Symbol::Bang), "!");
    }

    #[test]
    fn writable_string_collects_output() {
        let mut out = WritableString::default();

        out.write_line("2 passing").expect("infallible");
        out.write_str("done").expect("infallible");

        assert_eq!(out.0, "2 passing\ndone");
    }
}
