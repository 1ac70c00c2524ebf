use ndarray::{Array2, ArrayView2};

use crate::error::{Result, ZtError};

// ---------------------------------------------------------------------------
// Bilinear interpolation over (log10 n, t)
// ---------------------------------------------------------------------------

/// Piecewise-bilinear interpolant of a calculated (n, t) surface.
///
/// Carrier concentrations are interpolated in log10 space, temperatures
/// linearly. Queries outside the grid are extrapolated from the nearest
/// edge cell rather than rejected.
#[derive(Debug, Clone)]
pub struct GridInterpolator {
    log_n: Vec<f64>,
    t: Vec<f64>,
    values: Array2<f64>,
}

impl GridInterpolator {
    /// `values[[i, j]]` is the value at `(n[i], t[j])`.
    ///
    /// Both axes must be strictly increasing and non-empty, and every
    /// concentration must be positive.
    pub fn new(n: &[f64], t: &[f64], values: ArrayView2<'_, f64>) -> Result<Self> {
        if values.dim() != (n.len(), t.len()) {
            return Err(ZtError::DataShape(format!(
                "values have shape {:?} but the axes give ({}, {})",
                values.dim(),
                n.len(),
                t.len()
            )));
        }
        if n.iter().any(|&v| !(v > 0.0)) {
            return Err(ZtError::InvalidArgument(
                "carrier concentrations must be positive".to_string(),
            ));
        }
        let log_n: Vec<f64> = n.iter().map(|v| v.log10()).collect();
        check_axis("log10(n)", &log_n)?;
        check_axis("t", t)?;

        Ok(Self {
            log_n,
            t: t.to_vec(),
            values: values.to_owned(),
        })
    }

    pub fn log_n(&self) -> &[f64] {
        &self.log_n
    }

    pub fn t(&self) -> &[f64] {
        &self.t
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Evaluate at a concentration given as log10(n).
    pub fn eval_log(&self, log_n: f64, t: f64) -> f64 {
        let (i0, i1, wx) = bracket(&self.log_n, log_n);
        let (j0, j1, wy) = bracket(&self.t, t);

        let v = &self.values;
        (1.0 - wx) * (1.0 - wy) * v[[i0, j0]]
            + wx * (1.0 - wy) * v[[i1, j0]]
            + (1.0 - wx) * wy * v[[i0, j1]]
            + wx * wy * v[[i1, j1]]
    }

    /// Evaluate at a concentration in linear units.
    pub fn eval(&self, n: f64, t: f64) -> f64 {
        self.eval_log(n.log10(), t)
    }
}

fn check_axis(name: &str, axis: &[f64]) -> Result<()> {
    if axis.is_empty() {
        return Err(ZtError::DataShape(format!("axis '{name}' is empty")));
    }
    if axis.iter().any(|v| !v.is_finite()) || axis.windows(2).any(|w| w[1] <= w[0]) {
        return Err(ZtError::DataShape(format!(
            "axis '{name}' must be finite and strictly increasing"
        )));
    }
    Ok(())
}

/// Cell indices and fractional position of `x` along `axis`.
///
/// The weight falls outside [0, 1] when `x` lies beyond the axis ends, which
/// gives linear extrapolation from the edge cell. A single-point axis is
/// treated as constant.
fn bracket(axis: &[f64], x: f64) -> (usize, usize, f64) {
    if axis.len() == 1 {
        return (0, 0, 0.0);
    }
    let i = axis
        .partition_point(|&v| v <= x)
        .saturating_sub(1)
        .min(axis.len() - 2);
    let w = (x - axis[i]) / (axis[i + 1] - axis[i]);
    (i, i + 1, w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn interpolator() -> GridInterpolator {
        let values = array![[1.0, 2.0, 4.0], [3.0, 5.0, 9.0]];
        GridInterpolator::new(&[1e18, 1e20], &[300.0, 600.0, 900.0], values.view()).unwrap()
    }

    #[test]
    fn exact_at_every_node() {
        let interp = interpolator();
        for (i, &n) in [1e18, 1e20].iter().enumerate() {
            for (j, &t) in [300.0, 600.0, 900.0].iter().enumerate() {
                assert_eq!(interp.eval(n, t), interp.values()[[i, j]]);
            }
        }
    }

    #[test]
    fn midpoint_in_log_concentration() {
        let interp = interpolator();
        // log10(1e19) sits half-way between 18 and 20.
        assert_relative_eq!(interp.eval(1e19, 300.0), 2.0, max_relative = 1e-12);
        assert_relative_eq!(interp.eval(1e19, 450.0), 2.75, max_relative = 1e-12);
    }

    #[test]
    fn extrapolates_beyond_the_grid() {
        let interp = interpolator();
        assert_relative_eq!(interp.eval_log(18.0, 1200.0), 6.0, max_relative = 1e-12);
        assert_relative_eq!(interp.eval_log(16.0, 300.0), -1.0, max_relative = 1e-12);
    }

    #[test]
    fn single_temperature_is_constant_along_t() {
        let values = array![[1.0], [3.0]];
        let interp = GridInterpolator::new(&[1e18, 1e20], &[300.0], values.view()).unwrap();
        assert_relative_eq!(interp.eval(1e19, 1000.0), 2.0, max_relative = 1e-12);
    }

    #[test]
    fn rejects_bad_axes() {
        let values = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(GridInterpolator::new(&[1e18, 1e18], &[300.0, 600.0], values.view()).is_err());
        assert!(GridInterpolator::new(&[0.0, 1e18], &[300.0, 600.0], values.view()).is_err());
        assert!(GridInterpolator::new(&[1e18], &[300.0, 600.0], values.view()).is_err());
    }
}
