use super::{Row, RowId, RowSink, SinkError, Table};

/// A row together with the id it was assigned
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    /// Id returned by [`RowSink::append`]
    pub id: RowId,
    /// Row content
    pub row: Row,
}

impl StoredRow {
    /// Cell under the named column of `table`
    pub fn column(&self, table: Table, name: &str) -> Option<&super::Cell> {
        table.column_index(name).and_then(|i| self.row.get(i))
    }
}

/// In-memory sink keeping every table in append order
#[derive(Debug, Default)]
pub struct MemorySink {
    next_id: u64,
    tables: [Vec<StoredRow>; 3],
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of `table` in append order
    pub fn rows(&self, table: Table) -> &[StoredRow] {
        &self.tables[table.index()]
    }

    /// Look up a row of `table` by id
    pub fn find(&self, table: Table, id: RowId) -> Option<&StoredRow> {
        let rows = self.rows(table);
        rows.binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|i| &rows[i])
    }

    /// Total number of rows across all tables
    pub fn len(&self) -> usize {
        self.tables.iter().map(Vec::len).sum()
    }

    /// Whether no row has been appended
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RowSink for MemorySink {
    fn append(&mut self, table: Table, row: Row) -> Result<RowId, SinkError> {
        row.check_width(table)?;
        let id = RowId::new(self.next_id);
        self.next_id += 1;
        self.tables[table.index()].push(StoredRow { id, row });
        Ok(id)
    }
}
