use super::normalizer::{CellValue, NormalizedRow};
use indexmap::IndexSet;
use std::collections::{BTreeMap, BTreeSet};

/// Per-column label codes for every originally non-numeric column. Returned
/// to the caller alongside the encoded table so downstream consumers can
/// decode categorical features.
pub type ColumnMapping = BTreeMap<String, BTreeMap<String, u32>>;

/// Fully numeric table: column order is first appearance across the input
/// rows, cells are `None` where a row never had the column.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl EncodedTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_columns(self) -> Vec<String> {
        self.columns
    }
}

/// Encodes every string-valued column to integer codes.
///
/// Two explicit passes: the first learns the distinct labels of each column
/// across the whole table and freezes a sorted code assignment, the second
/// rewrites the rows against the frozen mapping. Codes start at 0 in
/// lexicographic label order, so identical input always yields an identical
/// mapping.
pub fn encode_rows(rows: &[NormalizedRow]) -> (EncodedTable, ColumnMapping) {
    let mut ordered: IndexSet<String> = IndexSet::new();
    for row in rows {
        for column in row.keys() {
            if !ordered.contains(column) {
                ordered.insert(column.clone());
            }
        }
    }
    let columns: Vec<String> = ordered.into_iter().collect();

    let mut mappings = ColumnMapping::new();
    for column in &columns {
        let mut labels: BTreeSet<&str> = BTreeSet::new();
        for row in rows {
            if let Some(CellValue::Text(text)) = row.get(column) {
                labels.insert(text.as_str());
            }
        }
        if !labels.is_empty() {
            let codes = labels
                .into_iter()
                .enumerate()
                .map(|(code, label)| (label.to_string(), code as u32))
                .collect();
            mappings.insert(column.clone(), codes);
        }
    }

    let encoded = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| encode_cell(row.get(column), mappings.get(column)))
                .collect()
        })
        .collect();

    (
        EncodedTable {
            columns,
            rows: encoded,
        },
        mappings,
    )
}

fn encode_cell(cell: Option<&CellValue>, codes: Option<&BTreeMap<String, u32>>) -> Option<f64> {
    match (cell, codes) {
        (None, _) => None,
        (Some(CellValue::Number(value)), None) => Some(*value),
        // a stray number inside a categorical column has no label code
        (Some(CellValue::Number(_)), Some(_)) => None,
        (Some(CellValue::Text(text)), Some(codes)) => {
            codes.get(text).map(|code| f64::from(*code))
        }
        (Some(CellValue::Text(_)), None) => None,
    }
}
