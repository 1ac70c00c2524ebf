use std::path::Path;

use log::{info, warn};

use crate::error::{Result, ZtError};

use super::loader::read_validate;
use super::model::Table;
use super::schema::{AMSET, PHONO3PY_CRTA, PHONO3PY_KAPPA};

/// Tensor components carried by every transport quantity.
pub const COMPONENTS: [&str; 4] = ["xx", "yy", "zz", "ave"];

// ---------------------------------------------------------------------------
// AMSET
// ---------------------------------------------------------------------------

/// Checks and unit conversions applied after reading an AMSET table.
///
/// The defaults put the data in the units the rest of the crate expects:
/// sigma in S/cm and PF in mW/m.K^2. Turning a step off logs a warning.
#[derive(Debug, Clone, Copy)]
pub struct AmsetOptions {
    pub check_uniform: bool,
    pub convert_sigma_s_cm: bool,
    pub calculate_pf_mw_m_k2: bool,
}

impl Default for AmsetOptions {
    fn default() -> Self {
        Self {
            check_uniform: true,
            convert_sigma_s_cm: true,
            calculate_pf_mw_m_k2: true,
        }
    }
}

impl AmsetOptions {
    pub fn check_uniform(mut self, on: bool) -> Self {
        self.check_uniform = on;
        self
    }

    pub fn convert_sigma_s_cm(mut self, on: bool) -> Self {
        self.convert_sigma_s_cm = on;
        self
    }

    pub fn calculate_pf_mw_m_k2(mut self, on: bool) -> Self {
        self.calculate_pf_mw_m_k2 = on;
        self
    }
}

/// Read an AMSET transport CSV and apply [`AmsetOptions`].
pub fn read_amset(path: &Path, options: AmsetOptions) -> Result<Table> {
    let table = read_validate(path, &AMSET)?;
    info!("Read AMSET table with {} rows from {}", table.len(), path.display());
    prepare_amset(table, options)
}

/// Sort an AMSET table by (n, t), check it spans a complete grid and fix up
/// units.
pub fn prepare_amset(table: Table, options: AmsetOptions) -> Result<Table> {
    let mut table = table.sorted_by(&["n", "t"])?;

    if options.check_uniform {
        check_uniform_temperatures(&table)?;
    } else {
        warn!("check_uniform is off - other functions may not work as expected on non-uniform data");
    }

    let has_pf = COMPONENTS
        .iter()
        .all(|c| table.has_column(&format!("pf_{c}")));

    // PF is computed from sigma in S/m, so this has to happen before the
    // conductivity conversion below.
    if options.calculate_pf_mw_m_k2 || !has_pf {
        for c in COMPONENTS {
            let s = table.column(&format!("s_{c}"))?;
            let sigma = table.column(&format!("sigma_{c}"))?;
            let pf: Vec<f64> = s
                .iter()
                .zip(sigma)
                .map(|(&s, &sigma)| 1.0e3 * (1.0e-6 * s).powi(2) * sigma)
                .collect();
            table.insert_column(format!("pf_{c}"), pf)?;
        }
    } else {
        warn!("calculate_pf_mw_m_k2 is off - other functions may not work as expected if PF is in different units");
    }

    if options.convert_sigma_s_cm {
        for c in COMPONENTS {
            let name = format!("sigma_{c}");
            let converted: Vec<f64> = table.column(&name)?.iter().map(|v| v / 100.0).collect();
            table.insert_column(name, converted)?;
        }
    } else {
        warn!("convert_sigma_s_cm is off - other functions may not work as expected if sigma is in different units");
    }

    Ok(table)
}

/// Every concentration must carry the same set of temperatures.
fn check_uniform_temperatures(table: &Table) -> Result<()> {
    let n_col = table.column("n")?;
    let t_col = table.column("t")?;
    let t_vals = table.unique_sorted("t")?;

    for n in table.unique_sorted("n")? {
        let mut t_check: Vec<f64> = n_col
            .iter()
            .zip(t_col)
            .filter(|(&ni, _)| ni == n)
            .map(|(_, &t)| t)
            .collect();
        t_check.sort_by(f64::total_cmp);
        t_check.dedup();

        if t_check.len() != t_vals.len() {
            return Err(ZtError::Schema(format!(
                "Incomplete set of temperatures for n = {n:.3e}"
            )));
        }
        let close = t_vals
            .iter()
            .zip(&t_check)
            .all(|(&a, &b)| (a - b).abs() <= 1e-8 + 1e-5 * b.abs());
        if !close {
            return Err(ZtError::Schema(format!(
                "Inconsistent set of temperatures for n = {n:.3e}"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Phono3py
// ---------------------------------------------------------------------------

/// Read a CSV written by the `phono3py-get-kappa` script.
pub fn read_phono3py_kappa(path: &Path) -> Result<Table> {
    read_validate(path, &PHONO3PY_KAPPA)
}

/// Read a CSV written by the CRTA analysis script.
pub fn read_phono3py_crta(path: &Path) -> Result<Table> {
    read_validate(path, &PHONO3PY_CRTA)
}
