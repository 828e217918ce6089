/*!
Host reference for `shader.wgsl#fragment_main`.

Frames are never rendered with this module. It restates the per-fragment
escape-time and colouring rules in plain `f64` so their behaviour can be
pinned down by tests without a GPU. Keep the two in step.
*/

use crate::{complex::Complex, palette::Palette};

/// Used whenever the configured colour period is not a positive number.
pub const DEFAULT_COLOUR_PERIOD: f32 = 100.0;

/// `|z|^2` above which an orbit has escaped.
pub const BAILOUT_SQUARED: f64 = 4.0;

/// Opaque black, the colour of points inside the set.
pub const INSIDE_COLOUR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Escape {
    /// The orbit stayed bounded for every iteration allowed.
    Inside { iterations: u32 },
    /// The orbit left the bailout radius, or no iterations were allowed at all.
    Escaped { iterations: u32, z: Complex },
}

/// Whole number of iterations allowed by a fractional bound.
pub fn iteration_limit(max_iterations: f32) -> u32 {
    max_iterations.max(0.0).floor() as u32
}

/// Iterates `z <- z^2 + c` from zero until it escapes or the bound is reached.
pub fn escape_time(c: Complex, max_iterations: f32) -> Escape {
    let limit = iteration_limit(max_iterations);
    let mut z = Complex::ZERO;
    let mut iterations = 0;
    while iterations < limit && z.norm_squared() <= BAILOUT_SQUARED {
        z = z * z + c;
        iterations += 1;
    }

    if limit >= 1 && z.norm_squared() <= BAILOUT_SQUARED {
        Escape::Inside { iterations }
    } else {
        Escape::Escaped { iterations, z }
    }
}

/// Iteration count to colour by: the raw count, or with `smooth` the
/// continuous `n + 1 - log2(log2 |z|)`, which removes banding.
pub fn colour_value(iterations: u32, z: Complex, smooth: bool) -> f32 {
    let norm_squared = z.norm_squared();
    if smooth && norm_squared > BAILOUT_SQUARED {
        let log_modulus = 0.5 * norm_squared.log2();
        (iterations as f64 + 1.0 - log_modulus.log2()) as f32
    } else {
        iterations as f32
    }
}

/// Position in `[0, 1)` of `value` within its colour period.
pub fn lookup_coordinate(value: f32, colour_period: f32) -> f32 {
    let period = if colour_period > 0.0 && colour_period.is_finite() {
        colour_period
    } else {
        DEFAULT_COLOUR_PERIOD
    };
    (value / period).rem_euclid(1.0)
}

/// Per-frame inputs of the fragment shader besides the coordinate.
pub struct Evaluator<'a> {
    pub palette: &'a Palette,
    pub max_iterations: f32,
    pub colour_period: f32,
    pub smooth: bool,
}

impl<'a> Evaluator<'a> {
    pub fn colour(&self, c: Complex) -> [f32; 4] {
        match escape_time(c, self.max_iterations) {
            Escape::Inside { .. } => INSIDE_COLOUR,
            Escape::Escaped { iterations, z } => {
                self.colour_of_value(colour_value(iterations, z, self.smooth))
            }
        }
    }

    pub fn colour_of_value(&self, value: f32) -> [f32; 4] {
        let [red, green, blue] = self
            .palette
            .sample(lookup_coordinate(value, self.colour_period));
        [red, green, blue, 1.0]
    }
}
