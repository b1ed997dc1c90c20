//! Fill engines turning rendered values into a filled PDF

use crate::{fdf, RenderedValues, Result, TemplateError};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Something that fills the form at `source` with `values`
pub trait FormFiller {
    /// Return the bytes of the filled document
    fn fill(&self, source: &Path, values: &RenderedValues) -> Result<Vec<u8>>;
}

/// The `pdftk` command line tool
///
/// Runs `pdftk <source> fill_form - output - dont_ask [flatten]` with an FDF
/// document on stdin, fed from a separate thread while stdout and stderr
/// are collected. Anything written to stderr fails the fill, and takes
/// precedence over a failed stdin write.
#[derive(Debug, Clone)]
pub struct Pdftk {
    pub program: PathBuf,
    pub flatten: bool,
}

impl Pdftk {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            flatten: true,
        }
    }
}

impl Default for Pdftk {
    fn default() -> Self {
        Self::new("pdftk")
    }
}

impl FormFiller for Pdftk {
    fn fill(&self, source: &Path, values: &RenderedValues) -> Result<Vec<u8>> {
        let mut command = Command::new(&self.program);
        command
            .arg(source)
            .args(["fill_form", "-", "output", "-", "dont_ask"]);
        if self.flatten {
            command.arg("flatten");
        }

        debug!(program = %self.program.display(), fields = values.len(), "running fill engine");
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                TemplateError::FillError(format!("cannot run {}: {e}", self.program.display()))
            })?;

        let fdf = fdf::forge(values);
        let writer = child
            .stdin
            .take()
            .map(|mut stdin| thread::spawn(move || stdin.write_all(&fdf)));
        let output = child.wait_with_output()?;
        let written = match writer.map(|handle| handle.join()) {
            Some(Ok(result)) => result,
            Some(Err(_)) => Err(io::Error::other("fill engine input writer panicked")),
            None => Ok(()),
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            return Err(TemplateError::FillError(stderr.trim().to_string()));
        }
        if !output.status.success() {
            return Err(TemplateError::FillError(format!(
                "{} exited with {}",
                self.program.display(),
                output.status
            )));
        }
        written?;

        Ok(output.stdout)
    }
}
