use log::{info, warn};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::{DoseError, DoseResult};
use crate::range::CrclRange;

const DRUG_COLUMN: &str = "Drug";
const RANGE_COLUMN: &str = "Range";
const DOSE_COLUMN: &str = "Recommended Dose";

/// Glyph variants that show up in legacy exports of the reference table.
/// Every text field is rewritten with these before any parsing happens, so
/// downstream code only ever sees ASCII dashes and comparison operators.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("\u{2013}", "-"),  // en dash
    ("\u{2014}", "-"),  // em dash
    ("\u{2212}", "-"),  // minus sign
    ("\u{0096}", "-"),  // cp1252 en dash surviving a latin-1 read
    ("\u{2265}", ">="),
    ("\u{2264}", "<="),
    ("?", ">="),        // mojibake form of the >= glyph
    ("\u{FFFD}", ""),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoseTableRow {
    pub drug: String,
    pub range: String,
    pub recommended_dose: String,
    /// Columns beyond the three required ones, normalized the same way.
    pub extra: HashMap<String, String>,
}

/// The dose reference table, immutable once loaded.
#[derive(Debug, Clone)]
pub struct DoseTable {
    rows: Vec<DoseTableRow>,
}

impl DoseTable {
    pub fn load<P: AsRef<Path>>(path: P) -> DoseResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> DoseResult<Self> {
        let text = decode_table_text(bytes);
        let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(normalize_text)
            .collect();

        let drug_idx = column_index(&headers, DRUG_COLUMN)?;
        let range_idx = column_index(&headers, RANGE_COLUMN)?;
        let dose_idx = column_index(&headers, DOSE_COLUMN)?;

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let fields: Vec<String> = record.iter().map(normalize_text).collect();

            let drug = fields.get(drug_idx).cloned().unwrap_or_default();
            let range = fields.get(range_idx).cloned().unwrap_or_default();
            let recommended_dose = fields.get(dose_idx).cloned().unwrap_or_default();

            if drug.is_empty() || range.is_empty() {
                warn!("Dropping table row {} with empty drug or range column", line + 2);
                continue;
            }

            if CrclRange::parse(&range).is_none() {
                warn!(
                    "Range '{}' for drug '{}' does not parse and will never match",
                    range, drug
                );
            }

            let extra: HashMap<String, String> = headers
                .iter()
                .zip(fields.iter())
                .enumerate()
                .filter(|(i, _)| ![drug_idx, range_idx, dose_idx].contains(i))
                .map(|(_, (name, value))| (name.clone(), value.clone()))
                .collect();

            rows.push(DoseTableRow {
                drug,
                range,
                recommended_dose,
                extra,
            });
        }

        let table = Self { rows };
        info!(
            "Loaded dose table: {} rows covering {} drugs",
            table.rows.len(),
            table.drug_names().len()
        );
        Ok(table)
    }

    pub fn rows(&self) -> &[DoseTableRow] {
        &self.rows
    }

    /// Distinct drug names in sorted order, for populating a selection list.
    pub fn drug_names(&self) -> Vec<String> {
        let names: BTreeSet<String> = self.rows.iter().map(|row| row.drug.clone()).collect();
        names.into_iter().collect()
    }

    /// All rows for a drug, case-insensitively, in table order.
    pub fn rows_for_drug(&self, drug: &str) -> Vec<&DoseTableRow> {
        self.rows
            .iter()
            .filter(|row| row.drug.eq_ignore_ascii_case(drug))
            .collect()
    }
}

pub fn normalize_text(raw: &str) -> String {
    let mut text = raw.to_string();
    for (bad, good) in REPLACEMENTS {
        text = text.replace(bad, good);
    }
    text.trim().to_string()
}

fn column_index(headers: &[String], name: &str) -> DoseResult<usize> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| DoseError::Table(format!("missing required column '{}'", name)))
}

// Legacy exports are single-byte encoded; in ISO-8859-1 every byte maps
// directly to the code point of the same value.
fn decode_table_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
