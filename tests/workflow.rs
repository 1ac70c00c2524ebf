use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use ndarray::Array2;
use tempfile::TempDir;

use zt_workflow::data::sources::{read_phono3py_crta, COMPONENTS};
use zt_workflow::{
    dataset_to_2d, get_zt_max, match_data, zt_dataset_from_files, MatchMode, MatchTarget,
    RowBounds, ZtError,
};

const N: [f64; 3] = [1e18, 1e19, 1e20];
const T: [f64; 3] = [300.0, 600.0, 900.0];
const MECHANISMS: [&str; 4] = ["ADP", "IMP", "PIE", "POP"];

fn breakdown_mobility(mechanism: usize, component: usize) -> f64 {
    10.0 * (mechanism + 1) as f64 + component as f64
}

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// AMSET-style CSV: sigma = 1e5 * log10(n) S/m, S = 100 uV/K, Kele = 0.5 W/m.K.
fn amset_csv(temperatures: &[f64]) -> String {
    let mut out = String::from("Carrier Concentration,Temperature");
    for quantity in ["Conducitivty", "Seebeck", "Kele"] {
        for axis in ["x", "y", "z", "ave"] {
            out.push_str(&format!(",{quantity} {axis}"));
        }
    }
    // AMSET repeats the bare mechanism name once per component.
    for mechanism in MECHANISMS {
        out.push_str(&format!(",{mechanism}").repeat(4));
    }
    out.push('\n');
    // Rows deliberately listed temperature-major.
    for &t in temperatures {
        for &n in &N {
            let sigma = 1e5 * n.log10();
            out.push_str(&format!("{n:e},{t}"));
            for _ in 0..4 {
                out.push_str(&format!(",{sigma}"));
            }
            out.push_str(",100,100,100,100,0.5,0.5,0.5,0.5");
            for m in 0..MECHANISMS.len() {
                for c in 0..4 {
                    out.push_str(&format!(",{}", breakdown_mobility(m, c)));
                }
            }
            out.push('\n');
        }
    }
    out
}

fn kappa_csv(temperatures: &[f64]) -> String {
    let mut out = String::from(
        "T [K],k_xx [W/m.K],k_yy [W/m.K],k_zz [W/m.K],k_yz [W/m.K],k_xz [W/m.K],k_xy [W/m.K],k_iso [W/m.K]\n",
    );
    for &t in temperatures {
        let k = 300.0 / t;
        out.push_str(&format!("{t},{k},{k},{k},0,0,0,{k}\n"));
    }
    out
}

fn zt_files(dir: &TempDir, amset_t: &[f64], kappa_t: &[f64]) -> (std::path::PathBuf, std::path::PathBuf) {
    (
        write(dir, "amset.csv", &amset_csv(amset_t)),
        write(dir, "kappa.csv", &kappa_csv(kappa_t)),
    )
}

#[test]
fn zt_dataset_from_csv_files() {
    let dir = TempDir::new().unwrap();
    let (amset, kappa) = zt_files(&dir, &T, &[100.0, 300.0, 600.0, 900.0]);
    let zt = zt_dataset_from_files(&amset, &kappa).unwrap();

    assert_eq!(zt.len(), 9);
    // Sorted by (n, t) on load.
    assert_eq!(&zt.column("t").unwrap()[..3], &T);
    assert_eq!(zt.column("n").unwrap()[0], 1e18);

    for c in COMPONENTS {
        let t = zt.column("t").unwrap();
        let n = zt.column("n").unwrap();
        let k_tot = zt.column(&format!("kappa_tot_{c}")).unwrap();
        let zt_c = zt.column(&format!("zt_{c}")).unwrap();
        for row in 0..zt.len() {
            let sigma_s_m = 1e5 * n[row].log10();
            let pf_mw = 1e3 * (100e-6f64).powi(2) * sigma_s_m;
            assert_relative_eq!(k_tot[row], 0.5 + 300.0 / t[row], max_relative = 1e-12);
            assert_relative_eq!(zt_c[row], 1e-3 * pf_mw * t[row] / k_tot[row], max_relative = 1e-12);
        }
    }
    // sigma converted to S/cm.
    assert_relative_eq!(zt.column("sigma_ave").unwrap()[0], 1e3 * 18.0, max_relative = 1e-12);
}

#[test]
fn mobility_breakdown_reaches_combined_table() {
    let dir = TempDir::new().unwrap();
    let (amset, kappa) = zt_files(&dir, &T, &T);
    let zt = zt_dataset_from_files(&amset, &kappa).unwrap();

    for (m, mechanism) in MECHANISMS.iter().enumerate() {
        for (c, component) in COMPONENTS.iter().enumerate() {
            let name = format!("mu_{}_{component}", mechanism.to_lowercase());
            let column = zt.column(&name).unwrap();
            assert_eq!(column.len(), 9);
            assert!(column.iter().all(|&v| v == breakdown_mobility(m, c)), "{name}");
        }
    }
}

#[test]
fn uncovered_temperature_fails_from_files() {
    let dir = TempDir::new().unwrap();
    let (amset, kappa) = zt_files(&dir, &T, &[300.0, 600.0]);
    assert!(matches!(zt_dataset_from_files(&amset, &kappa), Err(ZtError::Schema(_))));
}

#[test]
fn unknown_amset_column_fails() {
    let dir = TempDir::new().unwrap();
    let amset = write(&dir, "amset.csv", "Carrier Concentration,Temperature,Colour\n1e18,300,1\n");
    let kappa = write(&dir, "kappa.csv", &kappa_csv(&[300.0]));
    match zt_dataset_from_files(&amset, &kappa) {
        Err(ZtError::Schema(msg)) => assert!(msg.contains("Colour"), "{msg}"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn zt_max_over_combined_table() {
    let dir = TempDir::new().unwrap();
    let (amset, kappa) = zt_files(&dir, &T, &T);
    let zt = zt_dataset_from_files(&amset, &kappa).unwrap();

    let rec = get_zt_max(&zt, &RowBounds::default()).unwrap();
    // ZT grows with both n and T in this model.
    assert_eq!(rec.get("n").unwrap(), 1e20);
    assert_eq!(rec.get("t").unwrap(), 900.0);

    let bounds = RowBounds {
        t_max: Some(600.0),
        n_max: Some(1e19),
        ..Default::default()
    };
    let rec = get_zt_max(&zt, &bounds).unwrap();
    assert_eq!((rec.get("n").unwrap(), rec.get("t").unwrap()), (1e19, 600.0));
}

#[test]
fn reshape_then_flatten_reproduces_values() {
    let dir = TempDir::new().unwrap();
    let (amset, kappa) = zt_files(&dir, &T, &T);
    let zt = zt_dataset_from_files(&amset, &kappa).unwrap();

    let grid = dataset_to_2d(&zt).unwrap();
    assert_eq!(grid.shape(), (3, 3));
    for name in &grid.column_names {
        assert_eq!(grid.get(name).unwrap().dim(), (3, 3));
    }
    assert_eq!(grid.to_table().unwrap(), zt.sorted_by(&["n", "t"]).unwrap());
}

#[test]
fn end_to_end_same_t_resolves_concentration() {
    let values = Array2::from_shape_fn((3, 3), |(i, j)| N[i].log10() * (1.0 + T[j] / 1000.0));
    let target = MatchTarget::new(None, Some(600.0), values[[1, 1]]);

    let res = match_data(&N, &T, values.view(), &[target], MatchMode::SameT, 5).unwrap();
    assert_eq!(res.len(), 1);
    assert_relative_eq!(res[0].n, 1e19, max_relative = 1e-2);
    assert_eq!(res[0].t, 600.0);
}

#[test]
fn matching_against_reshaped_amset_column() {
    let dir = TempDir::new().unwrap();
    let (amset, kappa) = zt_files(&dir, &T, &T);
    let zt = zt_dataset_from_files(&amset, &kappa).unwrap();
    let grid = dataset_to_2d(&zt).unwrap();
    let sigma = grid.get("sigma_ave").unwrap();

    // sigma(S/cm) = 1e3 * log10(n): 18.5e3 sits at n = 10^18.5 for any T.
    let targets: Vec<MatchTarget> = [300.0, 450.0, 900.0]
        .iter()
        .map(|&t| MatchTarget::new(Some(1e18), Some(t), 18.5e3))
        .collect();
    let res = match_data(&grid.n, &grid.t, sigma.view(), &targets, MatchMode::SameT, 3).unwrap();
    for (r, target) in res.iter().zip(&targets) {
        assert_eq!(Some(r.t), target.t);
        assert_relative_eq!(r.n.log10(), 18.5, max_relative = 1e-6);
    }

    let err = match_data(&grid.n, &grid.t, sigma.view(), &targets, MatchMode::SameT, 0);
    assert!(matches!(err, Err(ZtError::InvalidArgument(_))));
}

#[test]
fn crta_schema_requires_lifetime_columns() {
    let dir = TempDir::new().unwrap();
    let kappa = write(&dir, "crta.csv", &kappa_csv(&T));
    assert!(matches!(read_phono3py_crta(Path::new(&kappa)), Err(ZtError::Schema(_))));
}
