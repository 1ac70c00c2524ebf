use anyhow::{Context, Result};

const E_CHARGE: f64 = 1.602_176_634e-19;
const K_B_OVER_E_UV: f64 = 86.173_332;
const LORENZ: f64 = 2.44e-8;

/// Relative magnitude of the xx / yy / zz tensor components.
const ANISOTROPY: [f64; 3] = [1.0, 0.8, 0.5];

/// Scattering mechanisms and their mobility relative to the total.
/// The inverse weights sum to one (Matthiessen's rule).
const MECHANISMS: [(&str, f64); 4] = [("ADP", 2.5), ("IMP", 4.0), ("PIE", 10.0), ("POP", 4.0)];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Toy single-band transport model
// ---------------------------------------------------------------------------

/// Mobility in cm^2/V.s with acoustic-phonon-like temperature scaling.
fn mobility(n: f64, t: f64) -> f64 {
    150.0 * (300.0 / t).powf(1.5) / (1.0 + (n / 1e20).sqrt())
}

/// Conductivity in S/m for n in cm^-3.
fn conductivity(n: f64, t: f64) -> f64 {
    n * 1e6 * E_CHARGE * mobility(n, t) * 1e-4
}

/// Seebeck coefficient in uV/K (non-degenerate Pisarenko form).
fn seebeck(n: f64, t: f64) -> f64 {
    let n_eff = 2.5e19 * (t / 300.0).powf(1.5);
    K_B_OVER_E_UV * ((n_eff / n).ln() + 2.0)
}

fn ave(values: &[f64; 3]) -> f64 {
    values.iter().sum::<f64>() / 3.0
}

fn with_ave(base: f64) -> [f64; 4] {
    let c = ANISOTROPY.map(|a| a * base);
    [c[0], c[1], c[2], ave(&c)]
}

fn fmt_row(values: &[f64]) -> Vec<String> {
    values.iter().map(|v| format!("{v:e}")).collect()
}

fn write_amset(path: &str, concentrations: &[f64], temperatures: &[f64]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    let mut header = vec!["Carrier Concentration".to_string(), "Temperature".to_string()];
    for quantity in ["Conducitivty", "Seebeck", "Kele", "Mobility", "PF"] {
        for axis in ["x", "y", "z", "ave"] {
            header.push(format!("{quantity} {axis}"));
        }
    }
    // The per-mechanism breakdown repeats the bare name for each component.
    for (mechanism, _) in MECHANISMS {
        header.extend(std::iter::repeat(mechanism.to_string()).take(4));
    }
    writer.write_record(&header)?;

    let mut rows = 0;
    for &n in concentrations {
        for &t in temperatures {
            let sigma = with_ave(conductivity(n, t));
            let s = [seebeck(n, t); 4];
            let kele = sigma.map(|sg| LORENZ * sg * t);
            let mu = with_ave(mobility(n, t));
            // uW/cm.K^2, as written by AMSET; recomputed on load.
            let pf: Vec<f64> = sigma.iter().map(|sg| (s[0] * 1e-6).powi(2) * sg * 1e4).collect();

            let mut row = vec![n, t];
            row.extend(sigma);
            row.extend(s);
            row.extend(kele);
            row.extend(mu);
            row.extend(pf);
            for (_, weight) in MECHANISMS {
                row.extend(mu.map(|m| weight * m));
            }
            writer.write_record(fmt_row(&row))?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

fn write_kappa(path: &str, temperatures: &[f64]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record([
        "T [K]",
        "k_xx [W/m.K]",
        "k_yy [W/m.K]",
        "k_zz [W/m.K]",
        "k_yz [W/m.K]",
        "k_xz [W/m.K]",
        "k_xy [W/m.K]",
        "k_iso [W/m.K]",
    ])?;
    for &t in temperatures {
        let k = with_ave(1.2 * 300.0 / t);
        writer.write_record(fmt_row(&[t, k[0], k[1], k[2], 0.0, 0.0, 0.0, k[3]]))?;
    }
    writer.flush()?;
    Ok(temperatures.len())
}

/// Noisy "measured" conductivity (S/cm) of one sample, header-less (T, sigma).
fn write_expt(path: &str, n: f64, rng: &mut SimpleRng) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {path}"))?;
    let temperatures: Vec<f64> = (0..11).map(|i| 325.0 + 50.0 * i as f64).collect();
    for &t in &temperatures {
        let sigma_s_cm = ave(&ANISOTROPY.map(|a| a * conductivity(n, t))) / 100.0;
        let measured = sigma_s_cm * (1.0 + rng.gauss(0.0, 0.02));
        writer.write_record(fmt_row(&[t, measured]))?;
    }
    writer.flush()?;
    Ok(temperatures.len())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // Concentrations: 1e17 -> 1e21 cm^-3, 5 points per decade.
    let concentrations: Vec<f64> = (0..=20).map(|i| 10f64.powf(17.0 + i as f64 / 5.0)).collect();
    let temperatures: Vec<f64> = (3..=9).map(|i| 100.0 * i as f64).collect();
    let kappa_temperatures: Vec<f64> = (1..=20).map(|i| 50.0 * i as f64).collect();

    let rows = write_amset("sample-amset.csv", &concentrations, &temperatures)?;
    println!("Wrote {rows} rows to sample-amset.csv");

    let rows = write_kappa("sample-kappa.csv", &kappa_temperatures)?;
    println!("Wrote {rows} rows to sample-kappa.csv");

    let rows = write_expt("sample-expt.csv", 2.0e19, &mut rng)?;
    println!("Wrote {rows} points (n = 2.0e19 cm^-3) to sample-expt.csv");

    Ok(())
}
