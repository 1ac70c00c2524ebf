use std::path::Path;

use log::info;

use crate::data::model::Table;
use crate::data::sources::{read_amset, read_phono3py_kappa, AmsetOptions, COMPONENTS};
use crate::error::{Result, ZtError};

/// Power factors are in mW/m.K^2, conductivities in W/m.K.
const PF_TO_W: f64 = 1.0e-3;

/// Combine an electronic transport table with a lattice thermal
/// conductivity table.
///
/// The result is a copy of `elec` with `kappa_latt_*`, `kappa_tot_*` and
/// `zt_*` columns appended for each tensor component. Lattice values are
/// looked up by exact temperature; every temperature in `elec` must be
/// present in `kappa_latt`.
pub fn zt_dataset_from_data(elec: &Table, kappa_latt: &Table) -> Result<Table> {
    let elec_t = elec.column("t")?;
    let latt_t = kappa_latt.column("t")?;

    let latt_rows = lattice_rows(elec_t, latt_t)?;

    let mut k_latt_cols = Vec::with_capacity(COMPONENTS.len());
    let mut k_tot_cols = Vec::with_capacity(COMPONENTS.len());
    let mut zt_cols = Vec::with_capacity(COMPONENTS.len());

    for c in COMPONENTS {
        let latt_col = kappa_latt.column(&format!("kappa_{c}"))?;
        let k_latt: Vec<f64> = latt_rows.iter().map(|&r| latt_col[r]).collect();

        let k_tot: Vec<f64> = elec
            .column(&format!("kappa_el_{c}"))?
            .iter()
            .zip(&k_latt)
            .map(|(el, latt)| el + latt)
            .collect();

        let zt: Vec<f64> = elec
            .column(&format!("pf_{c}"))?
            .iter()
            .zip(&k_tot)
            .zip(elec_t)
            .map(|((pf, k), t)| ((PF_TO_W * pf) / k) * t)
            .collect();

        k_latt_cols.push((format!("kappa_latt_{c}"), k_latt));
        k_tot_cols.push((format!("kappa_tot_{c}"), k_tot));
        zt_cols.push((format!("zt_{c}"), zt));
    }

    let mut zt_data = elec.clone();
    for (name, values) in k_latt_cols.into_iter().chain(k_tot_cols).chain(zt_cols) {
        zt_data.insert_column(name, values)?;
    }
    Ok(zt_data)
}

/// Row in the lattice table for each row of the transport table.
fn lattice_rows(elec_t: &[f64], latt_t: &[f64]) -> Result<Vec<usize>> {
    elec_t
        .iter()
        .map(|t| {
            latt_t.iter().position(|lt| lt == t).ok_or_else(|| {
                ZtError::Schema(format!(
                    "lattice thermal conductivity must cover the temperature range of the \
                     electronic transport data (T = {t} K missing)"
                ))
            })
        })
        .collect()
}

/// Read an AMSET CSV and a Phono3py kappa CSV and combine them with
/// [`zt_dataset_from_data`].
pub fn zt_dataset_from_files(amset_file: &Path, kappa_file: &Path) -> Result<Table> {
    let elec = read_amset(amset_file, AmsetOptions::default())?;
    let kappa_latt = read_phono3py_kappa(kappa_file)?;
    let zt_data = zt_dataset_from_data(&elec, &kappa_latt)?;
    info!(
        "Built ZT dataset: {} rows, {} columns",
        zt_data.len(),
        zt_data.column_names().len()
    );
    Ok(zt_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn elec(t: Vec<f64>) -> Table {
        let rows = t.len();
        let mut columns = vec![
            ("n".to_string(), vec![1e19; rows]),
            ("t".to_string(), t),
        ];
        for (i, c) in COMPONENTS.iter().enumerate() {
            columns.push((format!("kappa_el_{c}"), vec![0.1 * (i + 1) as f64; rows]));
            columns.push((format!("pf_{c}"), vec![(i + 1) as f64; rows]));
        }
        Table::from_columns(columns).unwrap()
    }

    fn kappa_latt(t: Vec<f64>, scale: f64) -> Table {
        let rows = t.len();
        let mut columns = vec![("t".to_string(), t.clone())];
        for (i, c) in COMPONENTS.iter().enumerate() {
            let values = t.iter().map(|t| scale * (i + 1) as f64 * 300.0 / t).collect();
            columns.push((format!("kappa_{c}"), values));
        }
        columns.push(("kappa_xy".to_string(), vec![0.0; rows]));
        Table::from_columns(columns).unwrap()
    }

    #[test]
    fn single_temperature_totals_and_zt() {
        let out = zt_dataset_from_data(&elec(vec![300.0]), &kappa_latt(vec![300.0], 1.0)).unwrap();

        for (i, c) in COMPONENTS.iter().enumerate() {
            let k_el = 0.1 * (i + 1) as f64;
            let k_latt = (i + 1) as f64;
            let pf = (i + 1) as f64;
            let k_tot = out.column(&format!("kappa_tot_{c}")).unwrap()[0];
            assert_eq!(out.column(&format!("kappa_latt_{c}")).unwrap()[0], k_latt);
            assert_eq!(k_tot, k_el + k_latt);
            assert_relative_eq!(
                out.column(&format!("zt_{c}")).unwrap()[0],
                1e-3 * pf * 300.0 / k_tot,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn lattice_values_follow_row_temperature() {
        let out = zt_dataset_from_data(
            &elec(vec![600.0, 300.0, 600.0]),
            &kappa_latt(vec![300.0, 450.0, 600.0], 2.0),
        )
        .unwrap();
        assert_eq!(out.column("kappa_latt_xx").unwrap(), &[1.0, 2.0, 1.0]);
    }

    #[test]
    fn uncovered_temperature_is_a_schema_error() {
        let err = zt_dataset_from_data(&elec(vec![300.0, 700.0]), &kappa_latt(vec![300.0, 600.0], 1.0))
            .unwrap_err();
        assert!(matches!(err, ZtError::Schema(msg) if msg.contains("700")));
    }

    #[test]
    fn lattice_lookup_never_falls_back_to_first_row() {
        assert_eq!(lattice_rows(&[600.0, 300.0], &[300.0, 600.0]).unwrap(), vec![1, 0]);
        let err = lattice_rows(&[300.0, 450.0], &[300.0, 600.0]).unwrap_err();
        assert!(matches!(err, ZtError::Schema(msg) if msg.contains("450")));
    }

    #[test]
    fn inputs_are_untouched_and_columns_grouped() {
        let e = elec(vec![300.0]);
        let before = e.clone();
        let out = zt_dataset_from_data(&e, &kappa_latt(vec![300.0], 1.0)).unwrap();
        assert_eq!(e, before);

        let names = out.column_names();
        let tail: Vec<&str> = names[names.len() - 12..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            [
                "kappa_latt_xx", "kappa_latt_yy", "kappa_latt_zz", "kappa_latt_ave",
                "kappa_tot_xx", "kappa_tot_yy", "kappa_tot_zz", "kappa_tot_ave",
                "zt_xx", "zt_yy", "zt_zz", "zt_ave",
            ]
        );
    }

    #[test]
    fn missing_lattice_component_is_reported() {
        let mut latt = kappa_latt(vec![300.0], 1.0);
        latt.drop_columns(&["kappa_zz"]);
        let err = zt_dataset_from_data(&elec(vec![300.0]), &latt).unwrap_err();
        assert!(matches!(err, ZtError::MissingColumn(name) if name == "kappa_zz"));
    }
}
