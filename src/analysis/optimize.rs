use std::cmp::Ordering;

use log::debug;

// ---------------------------------------------------------------------------
// Bounded Nelder-Mead
// ---------------------------------------------------------------------------

/// Stopping criteria for [`minimize_bounded`].
#[derive(Debug, Clone, Copy)]
pub struct OptimizerConfig {
    /// Iteration cap per free parameter.
    pub max_iter_per_dim: usize,
    /// Simplex size, relative to each bound's width, below which to stop.
    pub xtol: f64,
    /// Spread of objective values across the simplex below which to stop.
    pub ftol: f64,
    /// Initial simplex edge, relative to each bound's width.
    pub initial_step: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iter_per_dim: 400,
            xtol: 1e-10,
            ftol: 1e-14,
            initial_step: 0.05,
        }
    }
}

/// Outcome of a local minimisation.
///
/// Non-convergence is not an error: the best point found is returned with
/// `converged == false`.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub fun: f64,
    pub iterations: usize,
    pub converged: bool,
}

const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// Minimise `f` from `x0` inside the box `bounds` (`(lo, hi)` per parameter).
///
/// Derivative-free, so it copes with the kinked objectives used for data
/// matching. Every trial point is projected onto the box, hence the result
/// always lies within `bounds`.
pub fn minimize_bounded<F>(f: F, x0: &[f64], bounds: &[(f64, f64)], config: &OptimizerConfig) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    debug_assert_eq!(x0.len(), bounds.len());
    let dim = x0.len();
    let project = |x: &mut Vec<f64>| {
        for (xi, &(lo, hi)) in x.iter_mut().zip(bounds) {
            *xi = xi.max(lo).min(hi);
        }
    };
    let eval = |x: &[f64]| {
        let v = f(x);
        if v.is_nan() { f64::INFINITY } else { v }
    };

    let mut start = x0.to_vec();
    project(&mut start);

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
    simplex.push((start.clone(), eval(&start)));
    for (k, &(lo, hi)) in bounds.iter().enumerate() {
        let step = config.initial_step * (hi - lo);
        let mut vertex = start.clone();
        vertex[k] = if start[k] + step <= hi { start[k] + step } else { start[k] - step };
        project(&mut vertex);
        let fv = eval(&vertex);
        simplex.push((vertex, fv));
    }

    let max_iter = config.max_iter_per_dim * dim.max(1);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iter {
        simplex.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        if has_converged(&simplex, bounds, config) {
            converged = true;
            break;
        }
        iterations += 1;

        let (best_f, second_worst_f, worst_f) =
            (simplex[0].1, simplex[dim.saturating_sub(1)].1, simplex[dim].1);

        let centroid: Vec<f64> = (0..dim)
            .map(|k| simplex[..dim].iter().map(|(x, _)| x[k]).sum::<f64>() / dim as f64)
            .collect();
        let worst = simplex[dim].0.clone();
        let towards = |from: &[f64], coef: f64| {
            let mut p: Vec<f64> = centroid
                .iter()
                .zip(from)
                .map(|(c, x)| c + coef * (x - c))
                .collect();
            project(&mut p);
            p
        };

        let reflected = towards(&worst, -ALPHA);
        let fr = eval(&reflected);

        if fr < best_f {
            let expanded = towards(&reflected, GAMMA);
            let fe = eval(&expanded);
            simplex[dim] = if fe < fr { (expanded, fe) } else { (reflected, fr) };
            continue;
        }
        if fr < second_worst_f {
            simplex[dim] = (reflected, fr);
            continue;
        }

        let (contracted, fc) = if fr < worst_f {
            let p = towards(&reflected, RHO);
            let fp = eval(&p);
            (p, fp)
        } else {
            let p = towards(&worst, RHO);
            let fp = eval(&p);
            (p, fp)
        };
        if fc < fr.min(worst_f) {
            simplex[dim] = (contracted, fc);
            continue;
        }

        // Shrink towards the best vertex.
        let best = simplex[0].0.clone();
        for vertex in simplex.iter_mut().skip(1) {
            let mut p: Vec<f64> = best
                .iter()
                .zip(&vertex.0)
                .map(|(b, x)| b + SIGMA * (x - b))
                .collect();
            project(&mut p);
            let fp = eval(&p);
            *vertex = (p, fp);
        }
    }

    simplex.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    if !converged {
        debug!("Nelder-Mead stopped after {iterations} iterations without converging");
    }
    let (x, fun) = simplex.swap_remove(0);
    Minimum {
        x,
        fun,
        iterations,
        converged,
    }
}

fn has_converged(simplex: &[(Vec<f64>, f64)], bounds: &[(f64, f64)], config: &OptimizerConfig) -> bool {
    let (best_x, best_f) = &simplex[0];
    let f_spread = simplex.iter().map(|(_, fv)| (fv - best_f).abs()).fold(0.0, f64::max);
    if f_spread > config.ftol {
        return false;
    }
    simplex.iter().all(|(x, _)| {
        x.iter()
            .zip(best_x)
            .zip(bounds)
            .all(|((xi, bi), (lo, hi))| (xi - bi).abs() <= config.xtol * (hi - lo).max(1.0))
    }) || f_spread == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn finds_kink_of_absolute_value() {
        let res = minimize_bounded(
            |x| (2.0 * x[0] - 3.0).abs(),
            &[0.0],
            &[(-10.0, 10.0)],
            &OptimizerConfig::default(),
        );
        assert!(res.converged);
        assert_abs_diff_eq!(res.x[0], 1.5, epsilon = 1e-6);
        assert!(res.fun < 1e-6);
    }

    #[test]
    fn two_dimensional_quadratic() {
        let res = minimize_bounded(
            |x| (x[0] - 1.0).powi(2) + 10.0 * (x[1] + 2.0).powi(2),
            &[4.0, 4.0],
            &[(-5.0, 5.0), (-5.0, 5.0)],
            &OptimizerConfig::default(),
        );
        assert_abs_diff_eq!(res.x[0], 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(res.x[1], -2.0, epsilon = 1e-4);
    }

    #[test]
    fn minimum_outside_box_lands_on_bound() {
        let res = minimize_bounded(
            |x| (x[0] - 20.0).abs(),
            &[0.5],
            &[(0.0, 1.0)],
            &OptimizerConfig::default(),
        );
        assert_abs_diff_eq!(res.x[0], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(res.fun, 19.0, epsilon = 1e-9);
    }

    #[test]
    fn start_outside_box_is_projected() {
        let res = minimize_bounded(|x| x[0], &[-3.0], &[(0.0, 1.0)], &OptimizerConfig::default());
        assert!(res.x[0] >= 0.0 && res.x[0] <= 1.0);
        assert_abs_diff_eq!(res.x[0], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let config = OptimizerConfig {
            max_iter_per_dim: 2,
            ..Default::default()
        };
        let res = minimize_bounded(|x| (x[0] - 0.123).abs(), &[0.9], &[(0.0, 1.0)], &config);
        assert!(!res.converged);
        assert_eq!(res.iterations, 2);
    }
}
