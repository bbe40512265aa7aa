// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Size-bounded diffs between `actual` and `expected` values of a failed
//! assertion.
//!
//! Two modes are supported: a unified line diff (the default) and an inline
//! word diff. Both are rendered through [`Styles`], so they're plain text
//! whenever colours are off.

use std::{
    cell::Cell,
    mem,
    panic::{self, AssertUnwindSafe},
    sync::Once,
    thread,
};

use itertools::Itertools as _;
use serde_json::Value;
use similar::{ChangeTag, TextDiff};

use crate::{
    writer::out::{Color, Styles},
    Failure,
};

/// Indentation of every rendered diff line.
const INDENT: &str = "      ";

/// Lines of context around each change of a unified diff.
const CONTEXT_RADIUS: usize = 4;

/// Number of lines an inline diff may span before getting a line-number
/// gutter.
const GUTTER_THRESHOLD: usize = 4;

/// Options of diff rendering.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Options {
    /// Maximum number of characters of each side to compare (`0` is
    /// unbounded).
    pub max_size: usize,

    /// Indicates whether an inline word diff is rendered instead of a unified
    /// one.
    pub inline: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_size: crate::cli::DEFAULT_MAX_DIFF_SIZE,
            inline: false,
        }
    }
}

/// Rendered diff.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Rendered {
    /// Indicates whether any of the sides was truncated before comparison.
    pub truncated: bool,

    /// Number of characters dropped from the longest side.
    pub skipped: usize,

    /// Diff text, without a truncation notice.
    pub text: String,
}

/// Indicates whether a diff may be shown for the given [`Failure`].
///
/// It may, unless it's forbidden explicitly, as long as both values are
/// present and of the same kind.
#[must_use]
pub fn applies(failure: &Failure) -> bool {
    match (&failure.actual, &failure.expected) {
        (Some(actual), Some(expected)) => {
            failure.show_diff
                && mem::discriminant(actual) == mem::discriminant(expected)
        }
        _ => false,
    }
}

/// Converts the given value into comparable text.
///
/// Strings are taken "as is", anything else is pretty-printed with object
/// keys in a stable (sorted) order.
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other)
            .unwrap_or_else(|_| other.to_string()),
    }
}

thread_local! {
    /// Indicator whether panics of the current thread are caught silently.
    static SILENCED: Cell<bool> = const { Cell::new(false) };
}

/// Runs the given closure catching any panic of it, without the panic hook
/// reporting it.
///
/// Panics of other threads, and outside such closures, are reported by the
/// previously installed hook as usual.
fn catch_silently<R>(f: impl FnOnce() -> R) -> thread::Result<R> {
    static HOOK: Once = Once::new();

    HOOK.call_once(|| {
        let reported = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !SILENCED.with(Cell::get) {
                reported(info);
            }
        }));
    });

    let was = SILENCED.with(|s| s.replace(true));
    let res = panic::catch_unwind(AssertUnwindSafe(f));
    SILENCED.with(|s| s.set(was));
    res
}

/// Renderer of diffs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Engine {
    /// [`Options`] of rendering.
    pub options: Options,

    /// [`Styles`] to colour the diff with.
    pub styles: Styles,
}

impl Engine {
    /// Creates a new [`Engine`].
    #[must_use]
    pub const fn new(options: Options, styles: Styles) -> Self {
        Self { options, styles }
    }

    /// Renders the diff between `actual` and `expected` values, followed by a
    /// truncation notice if they were truncated.
    ///
    /// Never fails: any problem while computing the diff is reported with a
    /// one-line notice instead.
    #[must_use]
    pub fn diff(&self, actual: &Value, expected: &Value) -> String {
        let (actual, expected) = (stringify(actual), stringify(expected));
        let rendered = catch_silently(|| self.render(&actual, &expected));
        match rendered {
            Ok(rendered) => self.with_notice(rendered),
            Err(_) => {
                tracing::debug!("diff generation panicked");
                self.fallback()
            }
        }
    }

    /// Renders the diff between `actual` and `expected` texts.
    #[must_use]
    pub fn render(&self, actual: &str, expected: &str) -> Rendered {
        let max = self.options.max_size;
        let (skipped, actual, expected) = if max > 0 {
            let skipped = actual
                .chars()
                .count()
                .saturating_sub(max)
                .max(expected.chars().count().saturating_sub(max));
            (skipped, truncate(actual, max), truncate(expected, max))
        } else {
            (0, actual, expected)
        };

        let text = if self.options.inline {
            self.inline(actual, expected)
        } else {
            self.unified(actual, expected)
        };
        Rendered {
            truncated: skipped > 0,
            skipped,
            text,
        }
    }

    /// Appends a truncation notice to the [`Rendered`] text, if required.
    fn with_notice(&self, rendered: Rendered) -> String {
        let Rendered {
            truncated,
            mut text,
            ..
        } = rendered;
        if truncated {
            text.push_str(&format!(
                "\n{INDENT}[tally] output truncated to {} characters, \
                 see \"--max-diff-size\" option\n",
                self.options.max_size,
            ));
        }
        text
    }

    /// Notice rendered when a diff couldn't be generated.
    fn fallback(&self) -> String {
        format!(
            "\n{INDENT}{} {}\n",
            self.styles.paint(Color::DiffAdded, "+ expected"),
            self.styles
                .paint(Color::DiffRemoved, "- actual:  failed to generate diff"),
        )
    }

    fn unified(&self, actual: &str, expected: &str) -> String {
        let diff = TextDiff::from_lines(actual, expected);
        let mut lines = Vec::new();
        for (i, hunk) in diff
            .unified_diff()
            .context_radius(CONTEXT_RADIUS)
            .iter_hunks()
            .enumerate()
        {
            if i > 0 {
                lines.push("--".to_owned());
            }
            for change in hunk.iter_changes() {
                let value = change.value();
                let value = value.strip_suffix('\n').unwrap_or(value);
                lines.push(match change.tag() {
                    ChangeTag::Insert => format!(
                        "{INDENT}{}",
                        self.styles
                            .paint_lines(Color::DiffAdded, &format!("+{value}")),
                    ),
                    ChangeTag::Delete => format!(
                        "{INDENT}{}",
                        self.styles.paint_lines(
                            Color::DiffRemoved,
                            &format!("-{value}"),
                        ),
                    ),
                    ChangeTag::Equal => format!("{INDENT} {value}"),
                });
            }
        }

        format!(
            "\n{INDENT}{} {}\n\n{}",
            self.styles.paint(Color::DiffAdded, "+ expected"),
            self.styles.paint(Color::DiffRemoved, "- actual"),
            lines.join("\n"),
        )
    }

    fn inline(&self, actual: &str, expected: &str) -> String {
        let diff = TextDiff::from_words(actual, expected);
        let mut msg = diff
            .iter_all_changes()
            .map(|change| match change.tag() {
                ChangeTag::Insert => self
                    .styles
                    .paint_lines(Color::DiffAddedInline, change.value()),
                ChangeTag::Delete => self
                    .styles
                    .paint_lines(Color::DiffRemovedInline, change.value()),
                ChangeTag::Equal => change.value().to_owned(),
            })
            .collect::<String>();

        let count = msg.split('\n').count();
        if count > GUTTER_THRESHOLD {
            let width = count.to_string().len();
            msg = msg
                .split('\n')
                .enumerate()
                .map(|(i, line)| {
                    let gutter = format!("{:>width$} |", i + 1);
                    format!(
                        "{} {line}",
                        self.styles.paint(Color::DiffGutter, gutter),
                    )
                })
                .join("\n");
        }

        let msg = format!(
            "\n{} {}\n\n{msg}\n",
            self.styles.paint(Color::DiffRemovedInline, "actual"),
            self.styles.paint(Color::DiffAddedInline, "expected"),
        );
        msg.split('\n').map(|line| format!("{INDENT}{line}")).join("\n")
    }
}

/// Cuts the given `text` to at most `max` characters.
fn truncate(text: &str, max: usize) -> &str {
    text.char_indices().nth(max).map_or(text, |(at, _)| &text[..at])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn plain(max_size: usize, inline: bool) -> Engine {
        Engine::new(Options { max_size, inline }, Styles::plain())
    }

    #[test]
    fn applies_only_to_same_kinds() {
        let base = Failure::new("assertion failed");

        assert!(applies(&base.clone().with_values("foo", "bar")));
        assert!(applies(&base.clone().with_values(json!({"a": 1}), json!({}))));
        assert!(!applies(&base.clone().with_values("1", 1)));
        assert!(!applies(&base.clone().with_values("foo", "bar").without_diff()));
        assert!(!applies(&base));
    }

    #[test]
    fn stringifies_with_sorted_keys() {
        let value = json!({"b": 1, "a": [true]});

        assert_eq!(stringify(&json!("raw")), "raw");
        assert_eq!(
            stringify(&value),
            "{\n  \"a\": [\n    true\n  ],\n  \"b\": 1\n}",
        );
    }

    #[test]
    fn unified_diff_has_legend_and_changes() {
        let out = plain(0, false).diff(&json!("foo"), &json!("bar"));

        assert_eq!(
            out,
            "\n      + expected - actual\n\n      -foo\n      +bar",
        );
    }

    #[test]
    fn unified_diff_separates_hunks() {
        let actual = (1..=20).map(|i| format!("line {i}\n")).collect::<String>();
        let expected = actual
            .replace("line 2\n", "line two\n")
            .replace("line 19\n", "line nineteen\n");
        let out = plain(0, false).render(&actual, &expected).text;

        assert!(out.contains("\n--\n"), "{out}");
        assert!(out.contains("      -line 2\n      +line two"), "{out}");
        assert!(out.contains("      -line 19\n      +line nineteen"), "{out}");
        assert!(!out.contains("@@"), "{out}");
    }

    #[test]
    fn truncates_both_sides() {
        let rendered = plain(4, false).render("abcdefgh", "abcdxy");

        assert!(rendered.truncated);
        assert_eq!(rendered.skipped, 4);
        assert!(!rendered.text.contains("efgh"));
        assert!(!rendered.text.contains("xy"));
    }

    #[test]
    fn truncation_notice_names_bound() {
        let out = plain(3, false).diff(&json!("aaaaaa"), &json!("bbbbbb"));

        assert!(out.ends_with(
            "\n      [tally] output truncated to 3 characters, \
             see \"--max-diff-size\" option\n",
        ));
    }

    #[test]
    fn unbounded_never_truncates() {
        let long = "x".repeat(100_000);
        let rendered = plain(0, false).render(&long, "y");

        assert!(!rendered.truncated);
        assert_eq!(rendered.skipped, 0);
        assert!(rendered.text.contains(&long));
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate("привет", 3), "при");
        assert_eq!(truncate("ab", 3), "ab");
    }

    #[test]
    fn inline_diff_keeps_words() {
        let out = plain(0, true).diff(&json!("one two"), &json!("one three"));

        assert_eq!(
            out,
            "      \n      actual expected\n      \n      one twothree\n      ",
        );
    }

    #[test]
    fn inline_diff_numbers_long_output() {
        let actual = "a\nb\nc\nd\ne";
        let expected = "a\nb\nc\nd\nf";
        let out = plain(0, true).render(actual, expected).text;

        assert!(out.contains("      1 | a"), "{out}");
        assert!(out.contains("      5 | ef"), "{out}");
    }

    #[test]
    fn colors_changes_when_enabled() {
        let engine = Engine::new(Options::default(), Styles::new(true));
        let out = engine.diff(&json!("foo"), &json!("bar"));

        assert!(out.contains("\u{1b}[32m+bar"), "{out:?}");
        assert!(out.contains("\u{1b}[31m-foo"), "{out:?}");
    }

    #[test]
    fn fallback_is_one_line() {
        let out = plain(0, false).fallback();

        assert_eq!(
            out,
            "\n      + expected - actual:  failed to generate diff\n",
        );
    }

    #[test]
    fn panics_are_caught_silently() {
        let caught = catch_silently(|| -> usize { panic!("diff exploded") });

        assert!(caught.is_err());
        assert!(!SILENCED.with(Cell::get));
        assert_eq!(catch_silently(|| 7).ok(), Some(7));
    }
}
