use std::collections::BTreeMap;

use ndarray::Array2;

use crate::data::model::Table;
use crate::error::{Result, ZtError};

// ---------------------------------------------------------------------------
// Grid2d – a table with (n, t) coordinates cast onto a rectangular grid
// ---------------------------------------------------------------------------

/// Unique sorted carrier concentrations and temperatures plus one
/// `(n.len(), t.len())` array per remaining column, indexed `[[i_n, i_t]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2d {
    pub n: Vec<f64>,
    pub t: Vec<f64>,
    /// Data column names, in source table order.
    pub column_names: Vec<String>,
    pub data: BTreeMap<String, Array2<f64>>,
}

impl Grid2d {
    pub fn shape(&self) -> (usize, usize) {
        (self.n.len(), self.t.len())
    }

    /// Borrow one column's 2D array.
    pub fn get(&self, column: &str) -> Result<&Array2<f64>> {
        self.data
            .get(column)
            .ok_or_else(|| ZtError::MissingColumn(column.to_string()))
    }

    /// Flatten back to a table with `n` and `t` columns, rows in
    /// (n, then t) order.
    pub fn to_table(&self) -> Result<Table> {
        let (size_n, size_t) = self.shape();
        let mut columns: Vec<(String, Vec<f64>)> = Vec::with_capacity(self.column_names.len() + 2);
        columns.push((
            "n".to_string(),
            self.n.iter().flat_map(|&n| std::iter::repeat(n).take(size_t)).collect(),
        ));
        columns.push((
            "t".to_string(),
            (0..size_n).flat_map(|_| self.t.iter().copied()).collect(),
        ));
        for name in &self.column_names {
            // Standard layout iterates row-major, i.e. t fastest.
            columns.push((name.clone(), self.get(name)?.iter().copied().collect()));
        }
        Table::from_columns(columns)
    }
}

/// Convert a table with `n` (carrier concentration) and `t` (temperature)
/// columns into a [`Grid2d`].
///
/// The rows must cover every (n, t) pair of the unique values exactly once;
/// anything else is a [`ZtError::DataShape`].
pub fn dataset_to_2d(table: &Table) -> Result<Grid2d> {
    let sorted = table.sorted_by(&["n", "t"])?;

    let n_vals = sorted.unique_sorted("n")?;
    let t_vals = sorted.unique_sorted("t")?;
    let shape = (n_vals.len(), t_vals.len());

    check_rectangular(&sorted, &n_vals, &t_vals)?;

    let mut column_names = Vec::new();
    let mut data = BTreeMap::new();

    for name in sorted.column_names() {
        if name == "n" || name == "t" {
            continue;
        }
        let arr = Array2::from_shape_vec(shape, sorted.column(name)?.to_vec())
            .map_err(|e| ZtError::DataShape(format!("column '{name}': {e}")))?;
        column_names.push(name.clone());
        data.insert(name.clone(), arr);
    }

    Ok(Grid2d {
        n: n_vals,
        t: t_vals,
        column_names,
        data,
    })
}

/// Rows sorted by (n, t) must walk the n x t product in order.
fn check_rectangular(sorted: &Table, n_vals: &[f64], t_vals: &[f64]) -> Result<()> {
    let expected = n_vals.len() * t_vals.len();
    if sorted.len() != expected {
        return Err(ZtError::DataShape(format!(
            "{} rows do not form a complete {} x {} grid of (n, t)",
            sorted.len(),
            n_vals.len(),
            t_vals.len()
        )));
    }

    let n_col = sorted.column("n")?;
    let t_col = sorted.column("t")?;
    for (k, (&n, &t)) in n_col.iter().zip(t_col).enumerate() {
        let (i, j) = (k / t_vals.len(), k % t_vals.len());
        if n != n_vals[i] || t != t_vals[j] {
            return Err(ZtError::DataShape(format!(
                "missing or duplicated temperature for n = {:.3e}",
                n_vals[i]
            )));
        }
    }
    Ok(())
}
