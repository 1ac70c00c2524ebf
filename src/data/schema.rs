use std::collections::HashMap;

use crate::error::{Result, ZtError};

use super::model::Table;

// ---------------------------------------------------------------------------
// TableSchema – header translation and column allow-list for one source tool
// ---------------------------------------------------------------------------

/// Column conventions of one external tool's tabular output.
///
/// `header_map` translates the tool's header names to internal names.
/// `known` lists the internal names accepted after renaming; `None` turns
/// the allow-list check off. When `required` is set, every known column
/// must be present.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub header_map: &'static [(&'static str, &'static str)],
    pub known: Option<&'static [&'static str]>,
    pub required: bool,
}

impl TableSchema {
    /// Same header translation, without any column validation.
    pub fn relaxed(self) -> Self {
        Self {
            known: None,
            required: false,
            ..self
        }
    }

    /// Rename the table's columns and validate them against the allow-list.
    pub fn apply(&self, table: &mut Table) -> Result<()> {
        let map: HashMap<&str, &str> = self.header_map.iter().copied().collect();
        table.rename_columns(&map)?;

        let Some(known) = self.known else {
            return Ok(());
        };

        if let Some(unknown) = table
            .column_names()
            .iter()
            .find(|c| !known.contains(&c.as_str()))
        {
            return Err(ZtError::Schema(format!(
                "{}: unknown column header '{unknown}'",
                self.name
            )));
        }

        if self.required {
            if let Some(missing) = known.iter().find(|k| !table.has_column(k)) {
                return Err(ZtError::Schema(format!(
                    "{}: required column '{missing}' missing",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AMSET
// ---------------------------------------------------------------------------

const AMSET_HEADER_MAP: &[(&str, &str)] = &[
    ("Carrier Concentration", "n"),
    ("Temperature", "t"),
    ("Conducitivty x", "sigma_xx"),
    ("Conducitivty y", "sigma_yy"),
    ("Conducitivty z", "sigma_zz"),
    ("Conducitivty ave", "sigma_ave"),
    ("Seebeck x", "s_xx"),
    ("Seebeck y", "s_yy"),
    ("Seebeck z", "s_zz"),
    ("Seebeck ave", "s_ave"),
    ("Kele x", "kappa_el_xx"),
    ("Kele y", "kappa_el_yy"),
    ("Kele z", "kappa_el_zz"),
    ("Kele ave", "kappa_el_ave"),
    ("Mobility x", "mu_xx"),
    ("Mobility y", "mu_yy"),
    ("Mobility z", "mu_zz"),
    ("Mobility ave", "mu_ave"),
    ("PF x", "pf_xx"),
    ("PF y", "pf_yy"),
    ("PF z", "pf_zz"),
    ("PF ave", "pf_ave"),
    ("ADP", "mu_adp_xx"),
    ("ADP.1", "mu_adp_yy"),
    ("ADP.2", "mu_adp_zz"),
    ("ADP.3", "mu_adp_ave"),
    ("IMP", "mu_imp_xx"),
    ("IMP.1", "mu_imp_yy"),
    ("IMP.2", "mu_imp_zz"),
    ("IMP.3", "mu_imp_ave"),
    ("PIE", "mu_pie_xx"),
    ("PIE.1", "mu_pie_yy"),
    ("PIE.2", "mu_pie_zz"),
    ("PIE.3", "mu_pie_ave"),
    ("POP", "mu_pop_xx"),
    ("POP.1", "mu_pop_yy"),
    ("POP.2", "mu_pop_zz"),
    ("POP.3", "mu_pop_ave"),
];

const AMSET_KNOWN: &[&str] = &[
    "n", "t",
    "sigma_xx", "sigma_yy", "sigma_zz", "sigma_ave",
    "s_xx", "s_yy", "s_zz", "s_ave",
    "kappa_el_xx", "kappa_el_yy", "kappa_el_zz", "kappa_el_ave",
    "mu_xx", "mu_yy", "mu_zz", "mu_ave",
    "pf_xx", "pf_yy", "pf_zz", "pf_ave",
    "mu_adp_xx", "mu_adp_yy", "mu_adp_zz", "mu_adp_ave",
    "mu_imp_xx", "mu_imp_yy", "mu_imp_zz", "mu_imp_ave",
    "mu_pie_xx", "mu_pie_yy", "mu_pie_zz", "mu_pie_ave",
    "mu_pop_xx", "mu_pop_yy", "mu_pop_zz", "mu_pop_ave",
];

/// Electronic transport output of AMSET. Columns are optional.
pub const AMSET: TableSchema = TableSchema {
    name: "AMSET",
    header_map: AMSET_HEADER_MAP,
    known: Some(AMSET_KNOWN),
    required: false,
};

// ---------------------------------------------------------------------------
// Phono3py
// ---------------------------------------------------------------------------

const PHONO3PY_KAPPA_HEADER_MAP: &[(&str, &str)] = &[
    ("T [K]", "t"),
    ("k_xx [W/m.K]", "kappa_xx"),
    ("k_yy [W/m.K]", "kappa_yy"),
    ("k_zz [W/m.K]", "kappa_zz"),
    ("k_yz [W/m.K]", "kappa_yz"),
    ("k_xz [W/m.K]", "kappa_xz"),
    ("k_xy [W/m.K]", "kappa_xy"),
    ("k_iso [W/m.K]", "kappa_ave"),
];

const PHONO3PY_KAPPA_KNOWN: &[&str] = &[
    "t", "kappa_xx", "kappa_yy", "kappa_zz", "kappa_yz", "kappa_xz", "kappa_xy", "kappa_ave",
];

/// `phono3py-get-kappa` output.
pub const PHONO3PY_KAPPA: TableSchema = TableSchema {
    name: "Phono3py kappa",
    header_map: PHONO3PY_KAPPA_HEADER_MAP,
    known: Some(PHONO3PY_KAPPA_KNOWN),
    required: true,
};

const PHONO3PY_CRTA_HEADER_MAP: &[(&str, &str)] = &[
    ("T [K]", "t"),
    ("k_xx [W/m.K]", "kappa_xx"),
    ("k_yy [W/m.K]", "kappa_yy"),
    ("k_zz [W/m.K]", "kappa_zz"),
    ("k_yz [W/m.K]", "kappa_yz"),
    ("k_xz [W/m.K]", "kappa_xz"),
    ("k_xy [W/m.K]", "kappa_xy"),
    ("k_iso [W/m.K]", "kappa_ave"),
    ("(k/t)_xx [W/m.K.ps]", "kappa_tau_crta_xx"),
    ("(k/t)_yy [W/m.K.ps]", "kappa_tau_crta_yy"),
    ("(k/t)_zz [W/m.K.ps]", "kappa_tau_crta_zz"),
    ("(k/t)_yz [W/m.K.ps]", "kappa_tau_crta_yz"),
    ("(k/t)_xz [W/m.K.ps]", "kappa_tau_crta_xz"),
    ("(k/t)_xy [W/m.K.ps]", "kappa_tau_crta_xy"),
    ("(k/t)_iso [W/m.K.ps]", "kappa_tau_crta_ave"),
    ("(t^CRTA)_xx [ps]", "tau_crta_xx"),
    ("(t^CRTA)_yy [ps]", "tau_crta_yy"),
    ("(t^CRTA)_zz [ps]", "tau_crta_zz"),
    ("(t^CRTA)_yz [ps]", "tau_crta_yz"),
    ("(t^CRTA)_xz [ps]", "tau_crta_xz"),
    ("(t^CRTA)_xy [ps]", "tau_crta_xy"),
    ("(t^CRTA)_iso [ps]", "tau_crta_ave"),
];

const PHONO3PY_CRTA_KNOWN: &[&str] = &[
    "t",
    "kappa_xx", "kappa_yy", "kappa_zz", "kappa_yz", "kappa_xz", "kappa_xy", "kappa_ave",
    "kappa_tau_crta_xx", "kappa_tau_crta_yy", "kappa_tau_crta_zz",
    "kappa_tau_crta_yz", "kappa_tau_crta_xz", "kappa_tau_crta_xy", "kappa_tau_crta_ave",
    "tau_crta_xx", "tau_crta_yy", "tau_crta_zz",
    "tau_crta_yz", "tau_crta_xz", "tau_crta_xy", "tau_crta_ave",
];

/// CRTA analysis output: kappa plus weighted lifetimes.
pub const PHONO3PY_CRTA: TableSchema = TableSchema {
    name: "Phono3py CRTA",
    header_map: PHONO3PY_CRTA_HEADER_MAP,
    known: Some(PHONO3PY_CRTA_KNOWN),
    required: true,
};
