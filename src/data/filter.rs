use crate::error::Result;

use super::model::Table;

// ---------------------------------------------------------------------------
// Row bounds on carrier concentration and temperature
// ---------------------------------------------------------------------------

/// Optional inclusive bounds on the `n` and `t` columns.
/// An unset bound means "no constraint" on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RowBounds {
    pub n_min: Option<f64>,
    pub n_max: Option<f64>,
    pub t_min: Option<f64>,
    pub t_max: Option<f64>,
}

impl RowBounds {
    fn accepts(&self, n: f64, t: f64) -> bool {
        self.n_min.map_or(true, |lo| n >= lo)
            && self.n_max.map_or(true, |hi| n <= hi)
            && self.t_min.map_or(true, |lo| t >= lo)
            && self.t_max.map_or(true, |hi| t <= hi)
    }

    fn is_unbounded(&self) -> bool {
        *self == RowBounds::default()
    }
}

/// Return indices of rows that pass all active bounds.
///
/// Without any bound set, every row passes and the table does not need
/// `n` / `t` columns at all.
pub fn filtered_indices(table: &Table, bounds: &RowBounds) -> Result<Vec<usize>> {
    if bounds.is_unbounded() {
        return Ok((0..table.len()).collect());
    }
    let n = table.column("n")?;
    let t = table.column("t")?;

    Ok(n.iter()
        .zip(t)
        .enumerate()
        .filter(|(_, (&n, &t))| bounds.accepts(n, t))
        .map(|(i, _)| i)
        .collect())
}
