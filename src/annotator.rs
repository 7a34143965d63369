//! Enrichment of the frequency table with gene and disease annotations
//!
//! The annotation itself is done by an external tool. [`Annotator`] is the seam
//! between the pipeline and that tool, so that it can be replaced in tests or
//! by other implementations.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, error, info};

use crate::{CnvError, CnvResult};

/// Adds annotation columns to a TSV table
pub trait Annotator {
    /// Reads the table at `input` and writes the annotated table to `output`
    ///
    /// The annotated table must keep all columns of `input` and may add any
    /// number of new columns.
    ///
    /// # Errors
    ///
    /// [`CnvError::AnnotationFailed`] if the annotation cannot be performed
    fn annotate(&self, input: &Path, output: &Path) -> CnvResult<()>;
}

/// Runs the OpenPedCan long-format table annotator through `Rscript`
///
/// ```text
/// Rscript --vanilla <script> -r -c <columns> -i <input> -o <output> -v
/// ```
///
/// The standard output of the annotator is written to a log file.
#[derive(Debug, Clone)]
pub struct RscriptAnnotator {
    script: PathBuf,
    columns: Vec<String>,
    log: PathBuf,
}

impl RscriptAnnotator {
    /// Constructs a new [`RscriptAnnotator`]
    pub fn new<P: Into<PathBuf>>(script: P, columns: &[String], log: P) -> Self {
        Self {
            script: script.into(),
            columns: columns.to_vec(),
            log: log.into(),
        }
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new("Rscript");
        cmd.arg("--vanilla")
            .arg(&self.script)
            .arg("-r")
            .arg("-c")
            .arg(self.columns.join(","))
            .arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output)
            .arg("-v");
        cmd
    }
}

impl Annotator for RscriptAnnotator {
    fn annotate(&self, input: &Path, output: &Path) -> CnvResult<()> {
        let log = File::create(&self.log).map_err(|err| {
            CnvError::AnnotationFailed(format!(
                "unable to create log file {}: {}",
                self.log.display(),
                err
            ))
        })?;

        let mut cmd = self.command(input, output);
        cmd.stdout(Stdio::from(log)).stderr(Stdio::inherit());

        debug!("Running: {cmd:?}");
        let status = cmd.status().map_err(|err| {
            CnvError::AnnotationFailed(format!("unable to launch Rscript: {err}"))
        })?;

        if status.success() {
            info!("Annotated table written to {}", output.display());
            Ok(())
        } else {
            error!(
                "Annotator exited with {}, see {}",
                status,
                self.log.display()
            );
            Err(CnvError::AnnotationFailed(format!(
                "annotator exited with {status}"
            )))
        }
    }
}
