use std::str::FromStr;

use log::debug;

use super::attributes::{coerce_value, Attributes};
use super::error::FieldCoercionError;
use super::index::CrossReferences;
use super::summary::DocumentCounters;
use crate::sink::{Cell, Row, RowId, RowSink, SinkError, Table};

/// State shared by all matchers while one document is processed
#[derive(Debug, Default)]
pub struct DocumentContext {
    /// Cross-reference maps of the document
    pub indexes: CrossReferences,
    /// Counters reported in the document summary
    pub counters: DocumentCounters,
}

impl DocumentContext {
    /// Prepare for a new document
    ///
    /// Counters always start from zero; the cross-reference maps are kept only
    /// when `keep_indexes` is set.
    pub fn reset(&mut self, keep_indexes: bool) {
        self.counters = DocumentCounters::default();
        if !keep_indexes {
            self.indexes.clear();
        }
    }

    /// Append a row and count it
    pub fn append<S: RowSink + ?Sized>(
        &mut self,
        sink: &mut S,
        table: Table,
        row: Row,
    ) -> Result<RowId, SinkError> {
        let id = sink.append(table, row)?;
        self.counters.rows.add(table);
        Ok(id)
    }

    /// Parse an attribute, turning a coercion failure into an absent value
    pub fn parse<T: FromStr>(&mut self, attributes: &Attributes, field: &'static str) -> Option<T> {
        self.recover(attributes.parse(field))
    }

    /// Parse a raw value, turning a coercion failure into an absent value
    pub fn parse_value<T: FromStr>(&mut self, field: &'static str, raw: &str) -> Option<T> {
        self.recover(coerce_value(field, raw).map(Some))
    }

    /// Integer cell from an attribute
    pub fn int(&mut self, attributes: &Attributes, field: &'static str) -> Cell {
        match attributes.get(field) {
            Some(raw) => self.int_value(field, raw),
            None => Cell::Missing,
        }
    }

    /// Float cell from an attribute
    pub fn float(&mut self, attributes: &Attributes, field: &'static str) -> Cell {
        match attributes.get(field) {
            Some(raw) => self.float_value(field, raw),
            None => Cell::Missing,
        }
    }

    /// Integer cell from a raw value, rendered as `raw`
    pub fn int_value(&mut self, field: &'static str, raw: &str) -> Cell {
        self.parse_value::<i64>(field, raw)
            .map_or(Cell::Missing, |value| Cell::int(value, raw))
    }

    /// Float cell from a raw value, rendered as `raw`
    pub fn float_value(&mut self, field: &'static str, raw: &str) -> Cell {
        self.parse_value::<f64>(field, raw)
            .map_or(Cell::Missing, |value| Cell::float(value, raw))
    }

    fn recover<T>(&mut self, value: Result<Option<T>, FieldCoercionError>) -> Option<T> {
        value.unwrap_or_else(|e| {
            debug!("{}; storing missing value", e);
            self.counters.coercion_failures += 1;
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercion_failure_becomes_missing() {
        let mut ctx = DocumentContext::default();
        let attrs = Attributes::from_iter([("charge", "abc"), ("mz", "501.0")]);

        assert_eq!(ctx.int(&attrs, "charge"), Cell::Missing);
        assert_eq!(ctx.float(&attrs, "mz"), Cell::float(501.0, "501.0"));
        assert_eq!(ctx.float(&attrs, "absent"), Cell::Missing);
        assert_eq!(ctx.parse_value::<f64>("reporter_mz", "x"), None);
        assert_eq!(ctx.counters.coercion_failures, 2);
    }

    #[test]
    fn test_numeric_cells_keep_source_text() {
        let mut ctx = DocumentContext::default();
        let attrs = Attributes::from_iter([("charge", "+2"), ("mz", "1e3")]);

        assert_eq!(ctx.int(&attrs, "charge"), Cell::int(2, "+2"));
        assert_eq!(ctx.float(&attrs, "mz"), Cell::float(1000.0, "1e3"));
        assert_eq!(ctx.float_value("reporter_mz", "114.1100").render("?"), "114.1100");
        assert_eq!(ctx.counters.coercion_failures, 0);
    }

    #[test]
    fn test_reset() {
        let mut ctx = DocumentContext::default();
        ctx.indexes
            .proteins
            .insert("P1".to_string(), "MKV".to_string());
        ctx.counters.coercion_failures = 3;

        ctx.reset(true);
        assert_eq!(ctx.counters.coercion_failures, 0);
        assert_eq!(ctx.indexes.proteins.get("P1"), Some("MKV"));

        ctx.reset(false);
        assert!(ctx.indexes.proteins.is_empty());
    }
}
