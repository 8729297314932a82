use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use super::{FileOutcome, GroupXmlEngine};
use crate::groupxml::error::ParseError;
use crate::groupxml::summary::ProcessingSummary;
use crate::groupxml::tokens::XmlTokenSource;
use crate::sink::{RowSink, SinkError};

/// Errors that abort a multi-file run
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// None of the input files could be opened
    #[error("none of the {0} input files could be opened")]
    NoInputOpened(usize),

    /// The row sink failed
    #[error("Sink error: {0}")]
    SinkError(#[from] SinkError),
}

/// How one input file ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileStatus {
    /// Fully processed
    Completed,
    /// Stopped early by the cancellation token
    Cancelled,
    /// Aborted by a malformed document; rows emitted before the error are kept
    Failed {
        /// Error message
        reason: String,
    },
    /// The file could not be opened
    Unopened {
        /// Error message
        reason: String,
    },
}

/// Report for one input file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    /// Input path
    pub path: PathBuf,
    /// Final status
    #[serde(flatten)]
    pub status: FileStatus,
    /// Counters, present when the file was opened
    pub summary: Option<ProcessingSummary>,
}

/// Reports of a multi-file run, in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// One report per file that was attempted
    pub files: Vec<FileReport>,
    /// Whether the run stopped on a cancellation request
    pub cancelled: bool,
}

impl RunSummary {
    /// Files processed to the end
    pub fn completed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Completed))
    }

    /// Files aborted by a malformed document
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed { .. }))
    }

    /// Files that could not be opened
    pub fn unopened(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Unopened { .. }))
    }

    /// Files that were opened, whatever happened next
    pub fn opened(&self) -> usize {
        self.files.len() - self.unopened()
    }

    /// Rows appended across all files
    pub fn total_rows(&self) -> usize {
        self.files
            .iter()
            .filter_map(|f| f.summary.as_ref())
            .map(|s| s.rows.total())
            .sum()
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.status)).count()
    }
}

impl GroupXmlEngine {
    /// Process files one after another into the same sink
    ///
    /// A malformed file is reported as failed and the run moves on to the
    /// next one. A sink error aborts the run, as does a cancellation (the
    /// cancelled file is the last report). The run fails when no file could
    /// be opened at all.
    pub fn process_files<P, S>(&mut self, paths: &[P], sink: &mut S) -> Result<RunSummary, IngestError>
    where
        P: AsRef<Path>,
        S: RowSink + ?Sized,
    {
        let mut run = RunSummary::default();

        for path in paths {
            let path = path.as_ref();
            let tokens = match XmlTokenSource::open(path) {
                Ok(tokens) => tokens,
                Err(e) => {
                    warn!("Cannot open {}: {}", path.display(), e);
                    run.files.push(FileReport {
                        path: path.to_path_buf(),
                        status: FileStatus::Unopened {
                            reason: e.to_string(),
                        },
                        summary: None,
                    });
                    continue;
                }
            };

            info!("Processing {}", path.display());
            let (status, summary) = match self.process(tokens, sink) {
                Ok(FileOutcome::Completed(summary)) => {
                    summary.log(&path.display().to_string());
                    (FileStatus::Completed, summary)
                }
                Ok(FileOutcome::Cancelled(summary)) => {
                    warn!("Processing of {} cancelled", path.display());
                    run.cancelled = true;
                    (FileStatus::Cancelled, summary)
                }
                Err(ParseError::SinkError(e)) => return Err(e.into()),
                Err(e) => {
                    warn!("Skipping rest of {}: {}", path.display(), e);
                    (
                        FileStatus::Failed {
                            reason: e.to_string(),
                        },
                        self.summary(),
                    )
                }
            };
            run.files.push(FileReport {
                path: path.to_path_buf(),
                status,
                summary: Some(summary),
            });
            if run.cancelled {
                break;
            }
        }

        if run.opened() == 0 && !run.cancelled {
            return Err(IngestError::NoInputOpened(paths.len()));
        }
        info!(
            "{} of {} files completed, {} failed, {} not opened",
            run.completed(),
            paths.len(),
            run.failed(),
            run.unopened()
        );
        Ok(run)
    }
}
