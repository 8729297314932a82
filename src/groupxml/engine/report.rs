use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

use super::batch::{FileStatus, RunSummary};

impl RunSummary {
    /// Render the run report, with colors when the `colorized_output` feature is enabled
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static STOP: Emoji<'_, '_> = Emoji("■", "[STOP]");
            static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

            let mut output = String::new();
            output.push_str(&format!("{}\n", style("Group-XML Ingest Report").bold().cyan()));
            output.push_str(&format!("{}\n", style("=======================").cyan()));

            for file in &self.files {
                let path = file.path.display().to_string();
                match &file.status {
                    FileStatus::Completed => {
                        output.push_str(&format!("[{}] {}", OK, style(&path).green()));
                    }
                    FileStatus::Cancelled => {
                        output.push_str(&format!("[{}] {}", STOP, style(&path).yellow()));
                    }
                    FileStatus::Failed { reason } | FileStatus::Unopened { reason } => {
                        output.push_str(&format!(
                            "[{}] {} - {}: {}",
                            FAIL,
                            style(&path).red(),
                            style(status_label(&file.status)).red().bold(),
                            reason
                        ));
                    }
                }
                match &file.summary {
                    Some(summary) => output.push_str(&format!(" ({})\n", summary)),
                    None => output.push('\n'),
                }
            }

            output.push('\n');
            output.push_str(&format!(
                "{}: {} completed, {} failed, {} not opened, {} rows\n",
                style("Summary").bold(),
                style(self.completed()).green(),
                style(self.failed()).red(),
                style(self.unopened()).red(),
                self.total_rows()
            ));
            if self.cancelled {
                output.push_str(&format!("{}\n", style("Run cancelled").yellow().bold()));
            }
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

fn status_label(status: &FileStatus) -> &'static str {
    match status {
        FileStatus::Completed => "COMPLETED",
        FileStatus::Cancelled => "CANCELLED",
        FileStatus::Failed { .. } => "FAILED",
        FileStatus::Unopened { .. } => "NOT OPENED",
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Group-XML Ingest Report")?;
        writeln!(f, "=======================")?;

        for file in &self.files {
            write!(f, "{}: {}", status_label(&file.status), file.path.display())?;
            if let FileStatus::Failed { reason } | FileStatus::Unopened { reason } = &file.status {
                write!(f, " - {}", reason)?;
            }
            match &file.summary {
                Some(summary) => writeln!(f, " ({})", summary)?,
                None => writeln!(f)?,
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} completed, {} failed, {} not opened, {} rows",
            self.completed(),
            self.failed(),
            self.unopened(),
            self.total_rows()
        )?;
        if self.cancelled {
            writeln!(f, "Run cancelled")?;
        }
        Ok(())
    }
}
