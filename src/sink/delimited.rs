use std::fs::File;
use std::path::{Path, PathBuf};

use log::debug;

use super::{Row, RowId, RowSink, SinkError, Table};

/// Configuration for [`DelimitedSink`]
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Field delimiter (tab by default)
    pub delimiter: u8,
    /// Text written for missing cells
    pub missing_marker: String,
    /// File extension of the table files
    pub extension: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            missing_marker: "?".to_string(),
            extension: "tsv".to_string(),
        }
    }
}

/// Writes each table to its own delimited file inside an output directory
///
/// Every file starts with a header row; the first column is the row id.
pub struct DelimitedSink {
    config: SinkConfig,
    writers: [csv::Writer<File>; 3],
    paths: [PathBuf; 3],
    next_id: u64,
}

impl DelimitedSink {
    /// Create the output directory (if needed) and the three table files
    pub fn create<P: AsRef<Path>>(dir: P, config: SinkConfig) -> Result<Self, SinkError> {
        if config.missing_marker.is_empty() {
            return Err(SinkError::EmptyMissingMarker);
        }
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let paths = Table::ALL.map(|t| dir.join(format!("{}.{}", t.name(), config.extension)));
        let [peptides, proteins, quant] = &paths;
        let writers = [
            Self::open_table(peptides, Table::Peptides, &config)?,
            Self::open_table(proteins, Table::Proteins, &config)?,
            Self::open_table(quant, Table::Quantitation, &config)?,
        ];

        debug!("Writing tables to {}", dir.display());
        Ok(Self {
            config,
            writers,
            paths,
            next_id: 0,
        })
    }

    fn open_table(
        path: &Path,
        table: Table,
        config: &SinkConfig,
    ) -> Result<csv::Writer<File>, SinkError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(config.delimiter)
            .has_headers(false)
            .from_path(path)?;
        writer.write_record(std::iter::once("row_id").chain(table.columns().iter().copied()))?;
        Ok(writer)
    }

    /// Path of the file backing `table`
    pub fn path(&self, table: Table) -> &Path {
        &self.paths[table.index()]
    }
}

impl RowSink for DelimitedSink {
    fn append(&mut self, table: Table, row: Row) -> Result<RowId, SinkError> {
        row.check_width(table)?;
        let id = RowId::new(self.next_id);

        let missing = self.config.missing_marker.as_str();
        let record = std::iter::once(id.to_string())
            .chain(row.cells().iter().map(|c| c.render(missing)));
        self.writers[table.index()].write_record(record)?;

        self.next_id += 1;
        Ok(id)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        for writer in &mut self.writers {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Cell;

    #[test]
    fn test_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DelimitedSink::create(dir.path(), SinkConfig::default()).unwrap();

        let row = Row::new(vec![
            Cell::Text("s1".to_string()),
            Cell::Missing,
            Cell::float(113.1, "113.1"),
            Cell::float(1200.0, "1200"),
        ]);
        let id = sink.append(Table::Quantitation, row).unwrap();
        sink.flush().unwrap();

        let content = std::fs::read_to_string(sink.path(Table::Quantitation)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "row_id\tspectrum_id\tpeptide_rows\treporter_mz\treporter_intensity"
        );
        assert_eq!(lines[1], format!("{}\ts1\t?\t113.1\t1200", id));

        let peptides = std::fs::read_to_string(sink.path(Table::Peptides)).unwrap();
        assert_eq!(peptides.lines().count(), 1);
    }

    #[test]
    fn test_rejects_empty_missing_marker() {
        let dir = tempfile::tempdir().unwrap();
        let config = SinkConfig {
            missing_marker: String::new(),
            ..Default::default()
        };
        let result = DelimitedSink::create(dir.path().join("out"), config);
        assert!(matches!(result, Err(SinkError::EmptyMissingMarker)));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_custom_missing_marker() {
        let dir = tempfile::tempdir().unwrap();
        let config = SinkConfig {
            delimiter: b',',
            missing_marker: "NA".to_string(),
            extension: "csv".to_string(),
        };
        let mut sink = DelimitedSink::create(dir.path(), config).unwrap();
        sink.append(Table::Quantitation, Row::new(vec![Cell::Missing; 4]))
            .unwrap();
        sink.flush().unwrap();

        let path = dir.path().join("quantitation.csv");
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().nth(1), Some("Row0,NA,NA,NA,NA"));
    }
}
