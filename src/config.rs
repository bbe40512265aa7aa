// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Immutable configuration of a single run's reporting.

use std::{env, path::PathBuf, time::Duration};

use smart_default::SmartDefault;

use crate::{
    cli::{self, Colored as _},
    term::Capabilities,
    writer::{
        diff,
        out::{Styles, Symbols},
        Format,
    },
};

/// Environment variable explicitly enabling colors under [`Coloring::Auto`].
///
/// [`Coloring::Auto`]: cli::Coloring::Auto
pub const COLORS_ENV: &str = "TALLY_COLORS";

/// Configuration of reporting, constructed once per run and threaded through
/// every rendering call.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// [`Format`] of the report.
    pub format: Format,

    /// Indicates whether colors are applied.
    pub use_colors: bool,

    /// Indicates whether diffs are rendered inline rather than unified.
    pub inline_diffs: bool,

    /// Indicates whether diffs are never rendered.
    pub hide_diff: bool,

    /// Maximum number of characters of each diffed value (`0` is unbounded).
    #[default(cli::DEFAULT_MAX_DIFF_SIZE)]
    pub max_diff_size: usize,

    /// Default "slow" threshold of a test.
    #[default(Duration::from_millis(75))]
    pub slow: Duration,

    /// File to write a machine-readable report into.
    pub output: Option<PathBuf>,

    /// Name of the test suite in an xUnit report.
    #[default(cli::DEFAULT_SUITE_NAME.to_owned())]
    pub suite_name: String,

    /// Detected [`Capabilities`] of the terminal.
    pub terminal: Capabilities,

    /// [`Symbols`] to render with.
    pub symbols: Symbols,
}

impl Config {
    /// Resolves the given [`cli::Cli`] options against the current process'
    /// terminal and environment.
    #[must_use]
    pub fn from_cli(cli: &cli::Cli) -> Self {
        let terminal = Capabilities::get();
        let forced = env::var_os(COLORS_ENV).is_some();
        Self::resolve(cli, terminal, forced)
    }

    /// Resolves the given [`cli::Cli`] options against the given terminal
    /// [`Capabilities`].
    ///
    /// `forced_colors` tells whether the environment explicitly asks for
    /// colors.
    #[must_use]
    pub fn resolve(
        cli: &cli::Cli,
        terminal: Capabilities,
        forced_colors: bool,
    ) -> Self {
        let interactive = terminal.interactive && console::colors_enabled();
        Self {
            format: cli.format,
            use_colors: cli.coloring().resolve(interactive, forced_colors),
            inline_diffs: cli.inline_diffs,
            hide_diff: cli.hide_diff,
            max_diff_size: cli.max_diff_size,
            slow: cli.slow,
            output: cli.report_output.clone(),
            suite_name: cli.suite_name.clone(),
            terminal,
            symbols: Symbols::detect(),
        }
    }

    /// Returns [`Styles`] matching this [`Config`].
    #[must_use]
    pub const fn styles(&self) -> Styles {
        Styles::new(self.use_colors)
    }

    /// Returns [`diff::Options`] matching this [`Config`].
    #[must_use]
    pub const fn diff_options(&self) -> diff::Options {
        diff::Options {
            max_size: self.max_diff_size,
            inline: self.inline_diffs,
        }
    }

    /// Returns a copy of this [`Config`] with colors turned off.
    #[must_use]
    pub fn without_colors(&self) -> Self {
        Self {
            use_colors: false,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Coloring;

    #[test]
    fn default_matches_cli_default() {
        let config = Config::default();
        let resolved =
            Config::resolve(&cli::Cli::default(), Capabilities::default(), false);

        assert!(!config.use_colors);
        assert!(!resolved.use_colors);
        assert_eq!(config.max_diff_size, resolved.max_diff_size);
        assert_eq!(config.slow, resolved.slow);
        assert_eq!(config.suite_name, resolved.suite_name);
    }

    #[test]
    fn forced_colors_enable_auto() {
        let config =
            Config::resolve(&cli::Cli::default(), Capabilities::default(), true);

        assert!(config.use_colors);
        assert!(config.styles().is_present);
    }

    #[test]
    fn never_wins_over_environment() {
        let cli = cli::Cli {
            color: Coloring::Never,
            ..cli::Cli::default()
        };
        let config = Config::resolve(&cli, Capabilities::default(), true);

        assert!(!config.use_colors);
    }

    #[test]
    fn diff_options_follow_config() {
        let cli = cli::Cli {
            inline_diffs: true,
            max_diff_size: 16,
            ..cli::Cli::default()
        };
        let opts = Config::resolve(&cli, Capabilities::default(), false)
            .diff_options();

        assert!(opts.inline);
        assert_eq!(opts.max_size, 16);
    }

    #[test]
    fn without_colors_keeps_the_rest() {
        let config = Config {
            use_colors: true,
            max_diff_size: 3,
            ..Config::default()
        };
        let plain = config.without_colors();

        assert!(!plain.use_colors);
        assert_eq!(plain.max_diff_size, 3);
    }
}
