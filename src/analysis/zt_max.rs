use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::filter::{filtered_indices, RowBounds};
use crate::data::model::Table;
use crate::error::{Result, ZtError};

/// The table row holding the largest ZT.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZtMaxRecord {
    /// Row index in the source table.
    pub index: usize,
    pub values: BTreeMap<String, f64>,
}

impl ZtMaxRecord {
    pub fn get(&self, column: &str) -> Result<f64> {
        self.values
            .get(column)
            .copied()
            .ok_or_else(|| ZtError::MissingColumn(column.to_string()))
    }
}

/// Locate the maximum `zt_ave` in a ZT dataset, with optional bounds on n
/// and T, and return that row.
pub fn get_zt_max(data: &Table, bounds: &RowBounds) -> Result<ZtMaxRecord> {
    let zt = data.column("zt_ave")?;

    let index = filtered_indices(data, bounds)?
        .into_iter()
        .filter(|&i| !zt[i].is_nan())
        .fold(None, |best: Option<usize>, i| match best {
            Some(b) if zt[b] >= zt[i] => Some(b),
            _ => Some(i),
        })
        .ok_or_else(|| {
            ZtError::InvalidArgument(format!("no ZT values within bounds {bounds:?}"))
        })?;

    let values = data
        .row(index)
        .ok_or_else(|| ZtError::DataShape(format!("row {index} out of range")))?;
    Ok(ZtMaxRecord { index, values })
}
