// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CLI options of reporters.
//!
//! Parsing a command line is up to the embedding application: [`Cli`] is a
//! [`clap::Args`] group to be flattened into its own parser. The parsed
//! options are resolved into an immutable [`Config`] once per run.
//!
//! [`Config`]: crate::Config

use std::{path::PathBuf, str::FromStr, time::Duration};

use smart_default::SmartDefault;

use crate::writer::Format;

pub use clap::{Args, Parser};

/// Default bound of a diffed value, in characters.
pub const DEFAULT_MAX_DIFF_SIZE: usize = 8192;

/// Default name of an xUnit test suite.
pub const DEFAULT_SUITE_NAME: &str = "Tally Tests";

/// CLI options of reporters.
#[derive(Clone, Debug, SmartDefault, clap::Args)]
#[group(skip)]
pub struct Cli {
    /// Coloring policy for a console output.
    #[arg(
        long,
        value_name = "auto|always|never",
        default_value = "auto",
        global = true
    )]
    #[default(Coloring::Auto)]
    pub color: Coloring,

    /// Format of the report.
    #[arg(
        long = "reporter",
        value_name = "summary|json|xunit",
        default_value = "summary",
        global = true
    )]
    #[default(Format::Summary)]
    pub format: Format,

    /// Render diffs word-by-word inside the text instead of as unified
    /// line hunks.
    #[arg(long, global = true)]
    pub inline_diffs: bool,

    /// Never render diffs of failed assertions.
    #[arg(long, global = true)]
    pub hide_diff: bool,

    /// Maximum number of characters of each diffed value (`0` is unbounded).
    #[arg(
        long,
        value_name = "chars",
        default_value_t = DEFAULT_MAX_DIFF_SIZE,
        global = true
    )]
    #[default(DEFAULT_MAX_DIFF_SIZE)]
    pub max_diff_size: usize,

    /// Duration after which a passed test is considered slow.
    #[arg(
        long,
        value_name = "duration",
        value_parser = humantime::parse_duration,
        default_value = "75ms",
        global = true
    )]
    #[default(Duration::from_millis(75))]
    pub slow: Duration,

    /// File to write a machine-readable report into, instead of the console.
    #[arg(long, value_name = "path", global = true)]
    pub report_output: Option<PathBuf>,

    /// Name of the test suite in an xUnit report.
    #[arg(
        long,
        value_name = "name",
        default_value = DEFAULT_SUITE_NAME,
        global = true
    )]
    #[default(DEFAULT_SUITE_NAME.to_owned())]
    pub suite_name: String,
}

/// Indication whether CLI options request a colored output.
pub trait Colored {
    /// Returns [`Coloring`] requested by these CLI options.
    ///
    /// Defaults to [`Coloring::Never`].
    #[must_use]
    fn coloring(&self) -> Coloring {
        Coloring::Never
    }
}

impl Colored for Cli {
    fn coloring(&self) -> Coloring {
        self.color
    }
}

/// Possible policies of a console output coloring.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Coloring {
    /// Coloring when writing to an interactive terminal, or when forced by the
    /// environment.
    #[default]
    Auto,

    /// Forcing of a colored output.
    Always,

    /// Forcing of a non-colored output.
    Never,
}

impl Coloring {
    /// Resolves this policy into a final decision.
    ///
    /// `interactive` tells whether output goes to a terminal accepting colors,
    /// while `forced` tells whether the environment explicitly asks for
    /// colors.
    #[must_use]
    pub const fn resolve(self, interactive: bool, forced: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => interactive || forced,
        }
    }
}

impl FromStr for Coloring {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err("possible options: auto, always, never"),
        }
    }
}
