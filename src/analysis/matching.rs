use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use ndarray::ArrayView2;
use serde::Serialize;

use crate::error::{Result, ZtError};

use super::interp::GridInterpolator;
use super::optimize::{minimize_bounded, Minimum, OptimizerConfig};

// ---------------------------------------------------------------------------
// Matching policies, targets and results
// ---------------------------------------------------------------------------

/// How a calculated (n, t) surface is reconciled with one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Evaluate the surface at the observation's own (n, t).
    Same,
    /// Keep t, search log10(n) for the best match.
    SameT,
    /// Keep n, search t for the best match.
    SameN,
    /// Search log10(n) and t together.
    BestMatch,
}

impl MatchMode {
    pub const ALL: [MatchMode; 4] = [
        MatchMode::Same,
        MatchMode::SameT,
        MatchMode::SameN,
        MatchMode::BestMatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Same => "same",
            MatchMode::SameT => "same_t",
            MatchMode::SameN => "same_n",
            MatchMode::BestMatch => "best_match",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = ZtError;

    fn from_str(s: &str) -> Result<Self> {
        MatchMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ZtError::InvalidArgument(format!("unknown match mode '{s}'")))
    }
}

/// One experimental observation: `value` measured at (`n`, `t`), where
/// either coordinate may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchTarget {
    pub n: Option<f64>,
    pub t: Option<f64>,
    pub value: f64,
}

impl MatchTarget {
    pub fn new(n: Option<f64>, t: Option<f64>, value: f64) -> Self {
        Self { n, t, value }
    }
}

/// Resolved coordinates and the calculated value there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    pub n: f64,
    pub t: f64,
    pub value: f64,
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// Matches observations against an interpolated calculation.
#[derive(Debug, Clone)]
pub struct Matcher {
    interp: GridInterpolator,
    config: OptimizerConfig,
}

impl Matcher {
    /// `calc_values[[i, j]]` is the calculated value at `(calc_n[i], calc_t[j])`.
    pub fn new(calc_n: &[f64], calc_t: &[f64], calc_values: ArrayView2<'_, f64>) -> Result<Self> {
        Ok(Self {
            interp: GridInterpolator::new(calc_n, calc_t, calc_values)?,
            config: OptimizerConfig::default(),
        })
    }

    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn interpolator(&self) -> &GridInterpolator {
        &self.interp
    }

    /// Match every target with the same policy; results are in target order.
    pub fn match_all(
        &self,
        targets: &[MatchTarget],
        mode: MatchMode,
        num_seeds: usize,
    ) -> Result<Vec<MatchResult>> {
        if mode == MatchMode::BestMatch && num_seeds > 1 {
            warn!(
                "num_seeds = {num_seeds} with mode = 'best_match' runs {} minimisations per \
                 point and may take a long time and/or yield dubious results",
                num_seeds * num_seeds
            );
        }
        targets
            .iter()
            .map(|target| self.match_one(target, mode, num_seeds))
            .collect()
    }

    /// Match a single target.
    pub fn match_one(
        &self,
        target: &MatchTarget,
        mode: MatchMode,
        num_seeds: usize,
    ) -> Result<MatchResult> {
        if num_seeds == 0 {
            return Err(ZtError::InvalidArgument(
                "num_seeds must be at least 1".to_string(),
            ));
        }
        let val = target.value;
        let log_n_bounds = axis_bounds(self.interp.log_n());
        let t_bounds = axis_bounds(self.interp.t());

        match mode {
            MatchMode::Same => {
                let (Some(n), Some(t)) = (target.n, target.t) else {
                    return Err(ZtError::InvalidArgument(
                        "mode = 'same' needs both n and T".to_string(),
                    ));
                };
                Ok(MatchResult {
                    n,
                    t,
                    value: self.interp.eval(n, t),
                })
            }

            MatchMode::SameT => {
                let t = target.t.ok_or_else(|| {
                    ZtError::InvalidArgument("mode = 'same_t' needs T".to_string())
                })?;
                let (idx_n, _) = self.nearest_node(val);
                let seeds = seeds_1d(self.interp.log_n(), idx_n, num_seeds);

                let best = self.best_of(
                    &seeds,
                    &[log_n_bounds],
                    |x| (self.interp.eval_log(x[0], t) - val).abs(),
                );
                let log_n = best.x[0];
                Ok(MatchResult {
                    n: 10f64.powf(log_n),
                    t,
                    value: self.interp.eval_log(log_n, t),
                })
            }

            MatchMode::SameN => {
                let n = target.n.ok_or_else(|| {
                    ZtError::InvalidArgument("mode = 'same_n' needs n".to_string())
                })?;
                let log_n = n.log10();
                let (_, idx_t) = self.nearest_node(val);
                let seeds = seeds_1d(self.interp.t(), idx_t, num_seeds);

                let best = self.best_of(
                    &seeds,
                    &[t_bounds],
                    |x| (self.interp.eval_log(log_n, x[0]) - val).abs(),
                );
                let t = best.x[0];
                Ok(MatchResult {
                    n,
                    t,
                    value: self.interp.eval_log(log_n, t),
                })
            }

            MatchMode::BestMatch => {
                let (idx_n, idx_t) = self.nearest_node(val);
                let log_n_axis = self.interp.log_n();
                let t_axis = self.interp.t();

                let mut seeds = vec![vec![log_n_axis[idx_n], t_axis[idx_t]]];
                if num_seeds > 1 {
                    let guess_t = linspace(t_bounds.0, t_bounds.1, num_seeds);
                    for log_n in linspace(log_n_bounds.0, log_n_bounds.1, num_seeds) {
                        seeds.extend(guess_t.iter().map(|&t| vec![log_n, t]));
                    }
                }

                let best = self.best_of(
                    &seeds,
                    &[log_n_bounds, t_bounds],
                    |x| (self.interp.eval_log(x[0], x[1]) - val).abs(),
                );
                Ok(MatchResult {
                    n: 10f64.powf(best.x[0]),
                    t: best.x[1],
                    value: self.interp.eval_log(best.x[0], best.x[1]),
                })
            }
        }
    }

    /// Grid node whose calculated value is closest to `val`.
    fn nearest_node(&self, val: f64) -> (usize, usize) {
        self.interp
            .values()
            .indexed_iter()
            .filter(|(_, v)| !v.is_nan())
            .min_by(|(_, a), (_, b)| (*a - val).abs().total_cmp(&(*b - val).abs()))
            .map_or((0, 0), |(idx, _)| idx)
    }

    /// Run the minimiser from every seed and keep the lowest objective.
    /// Ties go to the earliest seed.
    fn best_of<F>(&self, seeds: &[Vec<f64>], bounds: &[(f64, f64)], objective: F) -> Minimum
    where
        F: Fn(&[f64]) -> f64,
    {
        let mut best: Option<Minimum> = None;
        for seed in seeds {
            let res = minimize_bounded(&objective, seed, bounds, &self.config);
            debug!("seed {seed:?} -> x = {:?}, objective = {:e}", res.x, res.fun);
            if best.as_ref().map_or(true, |b| res.fun < b.fun) {
                best = Some(res);
            }
        }
        // `seeds` always holds at least the nearest-node guess.
        best.unwrap_or_else(|| Minimum {
            x: bounds.iter().map(|b| b.0).collect(),
            fun: f64::INFINITY,
            iterations: 0,
            converged: false,
        })
    }
}

/// Construct an interpolation of `calc_data_2d` and match each entry of
/// `to_match` according to `mode`.
///
/// With `num_seeds == 1` the search starts from the grid node whose value
/// is closest to the observation. With more seeds, evenly spaced starting
/// points across the searched axes are tried as well and the best result
/// is kept.
pub fn match_data(
    calc_n: &[f64],
    calc_t: &[f64],
    calc_data_2d: ArrayView2<'_, f64>,
    to_match: &[MatchTarget],
    mode: MatchMode,
    num_seeds: usize,
) -> Result<Vec<MatchResult>> {
    Matcher::new(calc_n, calc_t, calc_data_2d)?.match_all(to_match, mode, num_seeds)
}

fn axis_bounds(axis: &[f64]) -> (f64, f64) {
    (axis[0], axis[axis.len() - 1])
}

/// The nearest-node guess followed, for several seeds, by an even sampling
/// of the axis.
fn seeds_1d(axis: &[f64], nearest: usize, num_seeds: usize) -> Vec<Vec<f64>> {
    let mut seeds = vec![vec![axis[nearest]]];
    if num_seeds > 1 {
        let (lo, hi) = axis_bounds(axis);
        seeds.extend(linspace(lo, hi, num_seeds).into_iter().map(|x| vec![x]));
    }
    seeds
}

fn linspace(lo: f64, hi: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![lo],
        _ => (0..num)
            .map(|i| lo + (hi - lo) * i as f64 / (num - 1) as f64)
            .collect(),
    }
}
