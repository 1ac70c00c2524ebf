use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, ZtError};

// ---------------------------------------------------------------------------
// Table – a column-labelled table of floating-point values
// ---------------------------------------------------------------------------

/// A small in-memory table: ordered column names, one `Vec<f64>` per column.
///
/// All columns always have the same length. Column order is preserved so
/// that tables written back to disk keep the layout they were read with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Ordered list of column names.
    column_names: Vec<String>,
    /// Column data, parallel to `column_names`.
    columns: Vec<Vec<f64>>,
}

impl Table {
    /// An empty table with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    ///
    /// Fails if two columns share a name or the columns differ in length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self> {
        let mut table = Table::new();
        for (name, values) in columns {
            let name = name.into();
            if table.has_column(&name) {
                return Err(ZtError::Schema(format!("duplicate column '{name}'")));
            }
            table.insert_column(name, values)?;
        }
        Ok(table)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    /// Borrow a column by name.
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.position(name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| ZtError::MissingColumn(name.to_string()))
    }

    /// Replace the column called `name`, or append it if absent.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if !self.column_names.is_empty() && values.len() != self.len() {
            return Err(ZtError::DataShape(format!(
                "column '{name}' has {} values but the table has {} rows",
                values.len(),
                self.len()
            )));
        }
        match self.position(&name) {
            Some(i) => self.columns[i] = values,
            None => {
                self.column_names.push(name);
                self.columns.push(values);
            }
        }
        Ok(())
    }

    /// Rename columns according to `map` (old name → new name).
    ///
    /// Columns not present in the map keep their names.
    pub fn rename_columns(&mut self, map: &HashMap<&str, &str>) -> Result<()> {
        let renamed: Vec<String> = self
            .column_names
            .iter()
            .map(|c| map.get(c.as_str()).map_or_else(|| c.clone(), |n| n.to_string()))
            .collect();

        for (i, name) in renamed.iter().enumerate() {
            if renamed[..i].contains(name) {
                return Err(ZtError::Schema(format!(
                    "renaming produces duplicate column '{name}'"
                )));
            }
        }
        self.column_names = renamed;
        Ok(())
    }

    /// Remove the named columns; names that are not present are ignored.
    pub fn drop_columns(&mut self, names: &[&str]) {
        let mut i = 0;
        while i < self.column_names.len() {
            if names.contains(&self.column_names[i].as_str()) {
                self.column_names.remove(i);
                self.columns.remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Sorted unique values of a column (exact float equality).
    pub fn unique_sorted(&self, name: &str) -> Result<Vec<f64>> {
        let mut values = self.column(name)?.to_vec();
        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(values)
    }

    /// A copy of the table with rows stably sorted by the given columns.
    pub fn sorted_by(&self, keys: &[&str]) -> Result<Table> {
        let key_columns = keys
            .iter()
            .map(|k| self.column(k))
            .collect::<Result<Vec<_>>>()?;

        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| {
            key_columns
                .iter()
                .map(|col| col[a].total_cmp(&col[b]))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        Ok(self.select_rows(&order))
    }

    /// A new table containing the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        Table {
            column_names: self.column_names.clone(),
            columns: self
                .columns
                .iter()
                .map(|col| rows.iter().map(|&r| col[r]).collect())
                .collect(),
        }
    }

    /// One row as a column name → value map.
    pub fn row(&self, index: usize) -> Option<BTreeMap<String, f64>> {
        if index >= self.len() {
            return None;
        }
        Some(
            self.column_names
                .iter()
                .zip(&self.columns)
                .map(|(name, col)| (name.clone(), col[index]))
                .collect(),
        )
    }
}
