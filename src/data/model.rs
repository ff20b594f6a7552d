use indexmap::IndexMap;
use serde_json::{json, Value as JsonValue};

use super::literal::Literal;

// ---------------------------------------------------------------------------
// Table – one decoded CSV file
// ---------------------------------------------------------------------------

/// A read-only snapshot of a CSV file with decoded cells.
///
/// `rows[i][j]` is the cell of row `i` in column `columns[j]`. When the file was
/// read with an index column, its header is `index_name` and its values are in
/// `index`; otherwise `index` holds the 0-based row positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub index_name: Option<String>,
    pub index: Vec<Literal>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Literal>>,
}

impl Table {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Literal>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Literal> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Rename columns found in `mapping`; other columns keep their names.
    ///
    /// Used with [`crate::study::load_channel_name_mapping`] to turn raw
    /// force-plate channel names into force/moment axis names.
    pub fn rename_columns(&mut self, mapping: &IndexMap<&str, &str>) {
        for col in &mut self.columns {
            if let Some(new_name) = mapping.get(col.as_str()) {
                *col = (*new_name).to_string();
            }
        }
    }

    /// Shape, column names and the first `head` rows as JSON.
    pub fn summary_json(&self, head: usize) -> JsonValue {
        let rows: Vec<JsonValue> = self
            .rows
            .iter()
            .zip(&self.index)
            .take(head)
            .map(|(row, label)| {
                let cells: serde_json::Map<String, JsonValue> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(Literal::to_json))
                    .collect();
                json!({ "index": label.to_json(), "cells": cells })
            })
            .collect();

        json!({
            "index_name": self.index_name,
            "n_rows": self.len(),
            "columns": self.columns,
            "head": rows,
        })
    }
}
