use palette::{Hsv, IntoColor, Srgb};

use crate::error::{Result, ZtError};

// ---------------------------------------------------------------------------
// Colour scales for plotting series of n or T
// ---------------------------------------------------------------------------

/// Generates `n` colours with hues evenly spaced from `h1` to `h2` (degrees)
/// at full saturation and value. Hues wrap around modulo 360.
pub fn cscale(n: usize, h1: f64, h2: f64) -> Result<Vec<Srgb<f64>>> {
    let hues: Vec<f64> = match n {
        0 => {
            return Err(ZtError::InvalidArgument(
                "a colour scale needs at least one colour".to_string(),
            ))
        }
        1 => vec![h1],
        _ => (0..n)
            .map(|i| h1 + (h2 - h1) * i as f64 / (n - 1) as f64)
            .collect(),
    };

    Ok(hues
        .into_iter()
        .map(|h| {
            let hsv = Hsv::new(h.rem_euclid(360.0), 1.0, 1.0);
            let rgb: Srgb<f64> = hsv.into_color();
            rgb
        })
        .collect())
}

/// Blue through magenta and red to orange.
pub fn cscale_fire(n: usize) -> Result<Vec<Srgb<f64>>> {
    cscale(n, 240.0, 390.0)
}

/// Blue to cyan.
pub fn cscale_ice(n: usize) -> Result<Vec<Srgb<f64>>> {
    cscale(n, 240.0, 180.0)
}

/// `#rrggbb` string for plotting tools.
pub fn to_hex(color: Srgb<f64>) -> String {
    let c: Srgb<u8> = color.into_format();
    format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_runs_from_blue_through_red() {
        let colours: Vec<String> = cscale_fire(6).unwrap().into_iter().map(to_hex).collect();
        assert_eq!(colours.len(), 6);
        assert_eq!(colours[0], "#0000ff");
        // 360 degrees wraps to pure red.
        assert_eq!(colours[4], "#ff0000");
    }

    #[test]
    fn ice_ends_on_cyan() {
        let colours = cscale_ice(3).unwrap();
        assert_eq!(to_hex(colours[2]), "#00ffff");
    }

    #[test]
    fn single_colour_uses_first_hue() {
        let colours = cscale(1, 0.0, 120.0).unwrap();
        assert_eq!(to_hex(colours[0]), "#ff0000");
    }

    #[test]
    fn zero_colours_is_an_error() {
        assert!(cscale(0, 0.0, 360.0).is_err());
    }
}
