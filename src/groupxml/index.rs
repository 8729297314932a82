//! Cross-reference maps populated at element closure.
//!
//! Each map lets a later-closing element resolve an id seen earlier in the
//! same document. None of them is ever written to the output directly.

use std::collections::HashMap;

use crate::sink::RowId;

/// Prefix carried by peptide ids in Group-XML
pub const PEPTIDE_ID_PREFIX: &str = "PEPTIDE:";

/// Match id to the row id of the emitted peptide row
///
/// Write-once: a second insert for the same id is refused.
#[derive(Debug, Default)]
pub struct SpectrumMatchIndex {
    rows: HashMap<String, RowId>,
}

impl SpectrumMatchIndex {
    /// Record the row emitted for `id`
    ///
    /// Returns the row already recorded when `id` is a duplicate; the existing
    /// entry is kept.
    pub fn insert(&mut self, id: &str, row: RowId) -> Result<(), RowId> {
        match self.rows.get(id) {
            Some(existing) => Err(*existing),
            None => {
                self.rows.insert(id.to_string(), row);
                Ok(())
            }
        }
    }

    /// Row emitted for `id`
    pub fn get(&self, id: &str) -> Option<RowId> {
        self.rows.get(id).copied()
    }

    /// Number of recorded matches
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Peptide id (without the `PEPTIDE:` prefix) to a CSV of peptide row ids
#[derive(Debug, Default)]
pub struct PeptideIndex {
    rows: HashMap<String, String>,
}

impl PeptideIndex {
    /// Record the row id list of a peptide, replacing any earlier entry
    pub fn insert(&mut self, id: String, rows: String) {
        self.rows.insert(id, rows);
    }

    /// Row id list of a peptide
    pub fn get(&self, id: &str) -> Option<&str> {
        self.rows.get(id).map(String::as_str)
    }

    /// Number of recorded peptides
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Strip the `PEPTIDE:` prefix, refusing ids without it or with nothing after it
pub fn strip_peptide_prefix(id: &str) -> Option<&str> {
    id.strip_prefix(PEPTIDE_ID_PREFIX).filter(|rest| !rest.is_empty())
}

/// Protein id to its sequence
#[derive(Debug, Default)]
pub struct ProteinIndex {
    sequences: HashMap<String, String>,
}

impl ProteinIndex {
    /// Record the sequence of a protein, replacing any earlier entry
    pub fn insert(&mut self, id: String, sequence: String) {
        self.sequences.insert(id, sequence);
    }

    /// Sequence of a protein
    pub fn get(&self, id: &str) -> Option<&str> {
        self.sequences.get(id).map(String::as_str)
    }

    /// Number of recorded proteins
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// The three maps of one document
#[derive(Debug, Default)]
pub struct CrossReferences {
    /// Match id to peptide row
    pub spectrum_matches: SpectrumMatchIndex,
    /// Peptide id to peptide row list
    pub peptides: PeptideIndex,
    /// Protein id to sequence
    pub proteins: ProteinIndex,
}

impl CrossReferences {
    /// Drop every entry
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrum_match_index_is_write_once() {
        let mut index = SpectrumMatchIndex::default();
        assert_eq!(index.insert("m1", RowId::new(3)), Ok(()));
        assert_eq!(index.insert("m1", RowId::new(9)), Err(RowId::new(3)));
        assert_eq!(index.get("m1"), Some(RowId::new(3)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_strip_peptide_prefix() {
        assert_eq!(strip_peptide_prefix("PEPTIDE:7"), Some("7"));
        assert_eq!(strip_peptide_prefix("PEPTIDE:"), None);
        assert_eq!(strip_peptide_prefix("peptide:7"), None);
        assert_eq!(strip_peptide_prefix("7"), None);
    }

    #[test]
    fn test_clear() {
        let mut refs = CrossReferences::default();
        refs.proteins.insert("P1".to_string(), "MKV".to_string());
        refs.peptides.insert("7".to_string(), "Row0".to_string());
        refs.clear();
        assert!(refs.proteins.is_empty());
        assert!(refs.peptides.is_empty());
        assert!(refs.spectrum_matches.is_empty());
    }
}
