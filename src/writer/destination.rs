// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Where a finished report goes.

use std::{
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use crate::{
    error::{ReportError, Result},
    writer::out::WriteStrExt as _,
};

/// Destination of a report.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Destination {
    /// Console output of a [`Writer`].
    ///
    /// [`Writer`]: crate::Writer
    #[default]
    Console,

    /// File at the given path.
    File(PathBuf),
}

impl Destination {
    /// Checks whether the given `path` may be written to, resolving it into a
    /// [`Destination`].
    ///
    /// [`Destination::Console`] is used if no `path` is given.
    ///
    /// # Errors
    ///
    /// With [`ReportError::Unsupported`] if there is no filesystem access in
    /// this environment, or the `path` points to a directory.
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Console);
        };
        if cfg!(target_family = "wasm") {
            return Err(ReportError::unsupported(
                "file output requires filesystem access",
            ));
        }
        if path.is_dir() {
            return Err(ReportError::unsupported(format!(
                "`{}` is a directory",
                path.display(),
            )));
        }
        Ok(Self::File(path))
    }

    /// Writes the given report `text` to this [`Destination`].
    ///
    /// If writing to a file fails, the failure is logged and the `text` is
    /// written to the `console` instead, so the report is never lost.
    ///
    /// # Errors
    ///
    /// If writing to the `console` fails.
    pub fn emit<W>(&self, text: &str, console: &mut W) -> Result<()>
    where
        W: io::Write + ?Sized,
    {
        if let Self::File(path) = self {
            match write_file(path, text) {
                Ok(()) => return Ok(()),
                Err(e) => tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "failed to write report, falling back to console",
                ),
            }
        }
        console.write_str(text)?;
        console.flush()?;
        Ok(())
    }
}

/// Writes the `text` to the file at the given `path`, creating missing parent
/// directories first.
fn write_file(path: &Path, text: &str) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()
}
