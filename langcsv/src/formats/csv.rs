//! The flat CSV table exchanged with translators.
//!
//! The header is always `Path,Key,Original,New`. Reading is lenient: the first
//! record is skipped whatever it holds, records may have any length, records
//! with fewer than three fields are dropped and a missing `New` column reads as
//! empty.
use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::Error, traits::Parser};

/// Column names of the exchanged table, in order.
pub const HEADER: [&str; 4] = ["Path", "Key", "Original", "New"];

/// One translation entry of the table.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct CsvRow {
    /// Locale-rooted, extension-less file path, e.g. `en/auth`.
    pub path: String,
    /// Dotted key inside the file, e.g. `nested.key`.
    pub key: String,
    /// Value found on export.
    pub original: String,
    /// Replacement filled in by a translator; empty when untouched.
    pub new: String,
}

impl CsvRow {
    pub fn new(
        path: impl Into<String>,
        key: impl Into<String>,
        original: impl Into<String>,
        new: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            original: original.into(),
            new: new.into(),
        }
    }

    /// The value an import writes: `new` unless it is empty, else `original`.
    pub fn effective_value(&self) -> &str {
        if self.new.is_empty() {
            &self.original
        } else {
            &self.new
        }
    }
}

impl Parser for Vec<CsvRow> {
    /// Reads rows, decoding UTF-16 or BOM-prefixed UTF-8 transparently.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .build(reader);
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(decoder);

        let mut rows = Vec::new();
        for (index, result) in rdr.records().enumerate() {
            let record = result?;
            if index == 0 {
                continue;
            }
            if record.len() < 3 {
                debug!(
                    "Skipping CSV record {} with {} field(s)",
                    index + 1,
                    record.len()
                );
                continue;
            }
            let field = |i: usize| record.get(i).unwrap_or_default();
            rows.push(CsvRow::new(field(0), field(1), field(2), field(3)));
        }
        Ok(rows)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        write_rows(writer, self)
    }
}

/// Writes the header followed by one record per row.
pub fn write_rows<W: Write>(writer: W, rows: &[CsvRow]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(content: &str) -> Vec<CsvRow> {
        Vec::<CsvRow>::from_reader(Cursor::new(content)).unwrap()
    }

    #[test]
    fn test_effective_value() {
        assert_eq!(CsvRow::new("en/a", "k", "Old", "").effective_value(), "Old");
        assert_eq!(CsvRow::new("en/a", "k", "Old", "New").effective_value(), "New");
        assert_eq!(CsvRow::new("en/a", "k", "", "").effective_value(), "");
    }

    #[test]
    fn test_write_header_and_rows() {
        let rows = vec![
            CsvRow::new("en/auth", "failed", "Failed", ""),
            CsvRow::new("en/auth", "quote", "Say \"hi\", please", ""),
        ];
        let mut out = Vec::new();
        rows.to_writer(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Path,Key,Original,New\nen/auth,failed,Failed,\nen/auth,quote,\"Say \"\"hi\"\", please\",\n"
        );
    }

    #[test]
    fn test_write_empty_table_has_header_only() {
        let mut out = Vec::new();
        Vec::<CsvRow>::new().to_writer(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Path,Key,Original,New\n");
    }

    #[test]
    fn test_read_skips_first_record_whatever_it_is() {
        let rows = read("en/auth,failed,Failed,\nen/auth,next,Next,Suivant\n");
        assert_eq!(rows, vec![CsvRow::new("en/auth", "next", "Next", "Suivant")]);
    }

    #[test]
    fn test_read_pads_and_drops_short_records() {
        let rows = read("Path,Key,Original,New\nen/a,k1,One\nen/a,k2\nen/a\n\nen/a,k3,Three,Trois,extra\n");
        assert_eq!(
            rows,
            vec![
                CsvRow::new("en/a", "k1", "One", ""),
                CsvRow::new("en/a", "k3", "Three", "Trois"),
            ]
        );
    }

    #[test]
    fn test_read_quoted_newlines() {
        let rows = read("Path,Key,Original,New\nen/a,multi,\"line one\nline two\",\n");
        assert_eq!(rows[0].original, "line one\nline two");
    }

    #[test]
    fn test_read_strips_utf8_bom() {
        let rows = read("\u{feff}Path,Key,Original,New\nen/a,k,Value,\n");
        assert_eq!(rows, vec![CsvRow::new("en/a", "k", "Value", "")]);
    }

    #[test]
    fn test_read_utf16_with_bom() {
        let text = "Path,Key,Original,New\nde/a,k,Wert,\n";
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let rows = Vec::<CsvRow>::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(rows, vec![CsvRow::new("de/a", "k", "Wert", "")]);
    }

    #[test]
    fn test_write_then_read_preserves_rows() {
        let rows = vec![
            CsvRow::new("en/auth", "failed", "Failed, really", ""),
            CsvRow::new("vendor/pkg/fr/test", "a.b", "Ligne\nsuivante", "Neu"),
        ];
        let mut out = Vec::new();
        rows.to_writer(&mut out).unwrap();
        assert_eq!(read(&String::from_utf8(out).unwrap()), rows);
    }
}
