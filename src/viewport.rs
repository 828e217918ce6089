/*!
Host-side zoom state.

Once per displayed frame the [`ViewportController`] pulls the visible
[`ViewRectangle`] toward a fixed target point, grows the iteration bound, and
builds the model-view-projection transform for the canvas quad. Everything here
stays in `f64` until it is packed into uniforms.
*/

use std::str::FromStr;

use glam::{Mat4, Vec3};
use log::{trace, warn};

use crate::{complex::Complex, evaluator::DEFAULT_COLOUR_PERIOD};

/// Vertical field of view of the static camera, in degrees.
pub const FIELD_OF_VIEW_DEGREES: f32 = 90.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// Axis-aligned, non-degenerate rectangle on the complex plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewRectangle {
    lower_left: Complex,
    upper_right: Complex,
}

impl ViewRectangle {
    /// Returns `None` unless `lower_left` is strictly below and left of `upper_right`.
    pub fn new(lower_left: Complex, upper_right: Complex) -> Option<Self> {
        let valid = lower_left.is_finite()
            && upper_right.is_finite()
            && lower_left.real < upper_right.real
            && lower_left.imaginary < upper_right.imaginary;
        if valid {
            Some(Self {
                lower_left,
                upper_right,
            })
        } else {
            None
        }
    }

    pub fn lower_left(&self) -> Complex {
        self.lower_left
    }

    pub fn upper_right(&self) -> Complex {
        self.upper_right
    }

    pub fn width(&self) -> f64 {
        self.upper_right.real - self.lower_left.real
    }

    pub fn height(&self) -> f64 {
        self.upper_right.imaginary - self.lower_left.imaginary
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// `(lower_left.re, lower_left.im, upper_right.re, upper_right.im)`, the
    /// order the fragment shader expects.
    pub fn lbrt(&self) -> [f64; 4] {
        [
            self.lower_left.real,
            self.lower_left.imaginary,
            self.upper_right.real,
            self.upper_right.imaginary,
        ]
    }

    /// Moves both corners toward `target`, dividing their offsets by `factor`.
    ///
    /// Returns `None` once `f64` runs out of resolution around the target:
    /// either the result would no longer be a valid rectangle, or a corner
    /// coordinate that is off the target rounds back to where it was.
    pub fn contract_towards(&self, target: Complex, factor: f64) -> Option<Self> {
        if factor == 1.0 {
            return Some(*self);
        }
        let lower_left = target + (self.lower_left - target) / factor;
        let upper_right = target + (self.upper_right - target) / factor;

        let targets = [target.real, target.imaginary, target.real, target.imaginary];
        let before = self.lbrt();
        let after = [
            lower_left.real,
            lower_left.imaginary,
            upper_right.real,
            upper_right.imaginary,
        ];
        let stuck =
            (0..4).any(|axis| before[axis] != targets[axis] && after[axis] == before[axis]);
        if stuck {
            return None;
        }

        ViewRectangle::new(lower_left, upper_right)
    }
}

/// How a zoom rate per second becomes a per-frame contraction factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomStep {
    /// `(rate - 1) * elapsed + 1`.
    Linear,
    /// `rate ^ elapsed`; consecutive frames compound to exactly `rate` per second.
    Exponential,
}

impl ZoomStep {
    pub fn factor(self, zoom_rate: f64, elapsed_seconds: f64) -> f64 {
        match self {
            ZoomStep::Linear => (zoom_rate - 1.0) * elapsed_seconds + 1.0,
            ZoomStep::Exponential => zoom_rate.powf(elapsed_seconds),
        }
    }
}

impl FromStr for ZoomStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(ZoomStep::Linear),
            "exponential" => Ok(ZoomStep::Exponential),
            other => Err(format!("unknown zoom step `{}`", other)),
        }
    }
}

/// Everything the GPU needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame {
    pub lbrt: [f64; 4],
    pub mvp: Mat4,
    pub max_iterations: f32,
    pub colour_period: f32,
}

pub struct ViewportController {
    rectangle: ViewRectangle,
    target: Complex,
    zoom_rate: f64,
    zoom_step: ZoomStep,
    total_zoom: f64,
    max_iterations: f32,
    iteration_growth: f32,
    colour_period: f32,
    saturated: bool,
}

impl ViewportController {
    pub fn new(
        rectangle: ViewRectangle,
        target: Complex,
        zoom_rate: f64,
        zoom_step: ZoomStep,
    ) -> Self {
        Self {
            rectangle,
            target,
            zoom_rate,
            zoom_step,
            total_zoom: 1.0,
            max_iterations: 1.0,
            iteration_growth: 0.0,
            colour_period: DEFAULT_COLOUR_PERIOD,
            saturated: false,
        }
    }

    pub fn with_iterations(mut self, initial: f32, growth_per_second: f32) -> Self {
        self.max_iterations = initial;
        self.iteration_growth = growth_per_second;
        self
    }

    pub fn with_colour_period(mut self, colour_period: f32) -> Self {
        self.colour_period = colour_period;
        self
    }

    pub fn rectangle(&self) -> ViewRectangle {
        self.rectangle
    }

    pub fn total_zoom(&self) -> f64 {
        self.total_zoom
    }

    pub fn max_iterations(&self) -> f32 {
        self.max_iterations
    }

    /// Whether the view has stopped zooming at the limit of `f64`.
    pub fn saturated(&self) -> bool {
        self.saturated
    }

    /// Advances the zoom by `elapsed_seconds` and returns the frame to draw.
    ///
    /// Returns `None`, leaving all state untouched, when the elapsed time or
    /// aspect ratio is not a positive finite number, or when the zoom rate
    /// would turn the contraction factor non-positive. The caller skips the
    /// draw in that case.
    pub fn advance_frame(&mut self, elapsed_seconds: f64, aspect_ratio: f64) -> Option<Frame> {
        if !(elapsed_seconds > 0.0 && elapsed_seconds.is_finite()) {
            trace!("skipping frame: elapsed time {}", elapsed_seconds);
            return None;
        }
        if !(aspect_ratio > 0.0 && aspect_ratio.is_finite()) {
            trace!("skipping frame: aspect ratio {}", aspect_ratio);
            return None;
        }

        let factor = self.zoom_step.factor(self.zoom_rate, elapsed_seconds);
        if !(factor > 0.0 && factor.is_finite()) {
            warn!("skipping frame: contraction factor {}", factor);
            return None;
        }

        if !self.saturated {
            match self.rectangle.contract_towards(self.target, factor) {
                Some(rectangle) => {
                    self.rectangle = rectangle;
                    self.total_zoom *= factor;
                }
                None => {
                    warn!(
                        "zoom reached double precision limit at {:.3e}x, holding view",
                        self.total_zoom
                    );
                    self.saturated = true;
                }
            }
        }
        self.max_iterations += self.iteration_growth * elapsed_seconds as f32;

        Some(Frame {
            lbrt: self.rectangle.lbrt(),
            mvp: model_view_projection(aspect_ratio as f32),
            max_iterations: self.max_iterations,
            colour_period: self.colour_period,
        })
    }
}

/// Projection of the canvas quad at `z = 0` seen by a camera at `z = 1`.
pub fn model_view_projection(aspect_ratio: f32) -> Mat4 {
    let projection = Mat4::perspective_rh(
        FIELD_OF_VIEW_DEGREES.to_radians(),
        aspect_ratio,
        NEAR_PLANE,
        FAR_PLANE,
    );
    let view = Mat4::look_at_rh(Vec3::Z, Vec3::ZERO, Vec3::Y);
    let model = Mat4::IDENTITY;
    projection * view * model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TARGET;
    use glam::Vec4;

    const TARGET: Complex = Complex::new(0.3602, -0.6413);

    fn start() -> ViewRectangle {
        ViewRectangle::new(Complex::new(-2.0, -2.0), Complex::new(2.0, 2.0)).unwrap()
    }

    fn controller(zoom_rate: f64, zoom_step: ZoomStep) -> ViewportController {
        ViewportController::new(start(), TARGET, zoom_rate, zoom_step)
    }

    #[test]
    fn rejects_degenerate_rectangles() {
        let point = Complex::new(1.0, 1.0);
        assert!(ViewRectangle::new(point, point).is_none());
        assert!(ViewRectangle::new(Complex::new(2.0, -2.0), Complex::new(-2.0, 2.0)).is_none());
        assert!(ViewRectangle::new(Complex::new(-2.0, 2.0), Complex::new(2.0, -2.0)).is_none());
        assert!(ViewRectangle::new(Complex::new(f64::NAN, 0.0), point).is_none());
    }

    #[test]
    fn lbrt_packs_lower_left_then_upper_right() {
        let rectangle =
            ViewRectangle::new(Complex::new(-1.0, -0.5), Complex::new(1.5, 0.25)).unwrap();
        assert_eq!(rectangle.lbrt(), [-1.0, -0.5, 1.5, 0.25]);
    }

    #[test]
    fn unit_zoom_rate_leaves_rectangle_unchanged() {
        for zoom_step in [ZoomStep::Linear, ZoomStep::Exponential] {
            let mut controller = controller(1.0, zoom_step);
            for elapsed in [1e-6, 1.0 / 144.0, 0.5, 3.0] {
                controller.advance_frame(elapsed, 1.0).unwrap();
                assert_eq!(controller.rectangle(), start());
            }
            assert_eq!(controller.total_zoom(), 1.0);
        }
    }

    #[test]
    fn zooming_in_shrinks_the_area_every_frame() {
        let mut controller = controller(1.25, ZoomStep::Linear);
        let mut previous = controller.rectangle().area();
        for elapsed in [1.0 / 144.0, 1.0 / 30.0, 0.2, 1e-3] {
            controller.advance_frame(elapsed, 1.5).unwrap();
            let area = controller.rectangle().area();
            assert!(area < previous, "{} !< {}", area, previous);
            previous = area;
        }
    }

    #[test]
    fn contraction_keeps_the_target_fixed() {
        let mut controller = controller(1.25, ZoomStep::Linear);
        for _ in 0..1000 {
            controller.advance_frame(1.0 / 144.0, 1.0).unwrap();
        }
        let rectangle = controller.rectangle();
        let lower = rectangle.lower_left();
        let upper = rectangle.upper_right();
        assert!(lower.real < TARGET.real && TARGET.real < upper.real);
        assert!(lower.imaginary < TARGET.imaginary && TARGET.imaginary < upper.imaginary);
    }

    #[test]
    fn non_positive_elapsed_time_is_skipped_without_mutation() {
        let mut controller = controller(1.25, ZoomStep::Linear).with_iterations(1.0, 20.0);
        for elapsed in [0.0, -0.25, f64::NAN, f64::INFINITY] {
            assert!(controller.advance_frame(elapsed, 1.0).is_none());
            assert_eq!(controller.rectangle(), start());
            assert_eq!(controller.total_zoom(), 1.0);
            assert_eq!(controller.max_iterations(), 1.0);
        }
    }

    #[test]
    fn non_positive_aspect_ratio_is_skipped() {
        let mut controller = controller(1.25, ZoomStep::Linear);
        assert!(controller.advance_frame(0.1, 0.0).is_none());
        assert_eq!(controller.rectangle(), start());
    }

    #[test]
    fn non_positive_factor_is_skipped() {
        // A zoom rate below one with a long step would flip the rectangle.
        let mut controller = controller(0.5, ZoomStep::Linear);
        assert!(controller.advance_frame(3.0, 1.0).is_none());
        assert_eq!(controller.rectangle(), start());
    }

    #[test]
    fn iteration_bound_grows_with_elapsed_time() {
        let mut controller = controller(1.25, ZoomStep::Linear).with_iterations(1.0, 20.0);
        let frame = controller.advance_frame(0.5, 1.0).unwrap();
        assert!((frame.max_iterations - 11.0).abs() < 1e-5);
        let frame = controller.advance_frame(0.25, 1.0).unwrap();
        assert!((frame.max_iterations - 16.0).abs() < 1e-5);
    }

    #[test]
    fn one_second_of_exponential_steps_zooms_by_the_rate() {
        let mut controller = controller(1.25, ZoomStep::Exponential);
        for _ in 0..144 {
            controller.advance_frame(1.0 / 144.0, 1.0).unwrap();
        }
        let rectangle = controller.rectangle();
        assert!((rectangle.width() - 4.0 / 1.25).abs() < 1e-9);
        assert!((rectangle.height() - 4.0 / 1.25).abs() < 1e-9);
        assert!((controller.total_zoom() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn one_second_of_linear_steps_compounds_the_per_frame_factor() {
        let mut controller = controller(1.25, ZoomStep::Linear);
        for _ in 0..144 {
            controller.advance_frame(1.0 / 144.0, 1.0).unwrap();
        }
        let compounded = (1.0 + 0.25 / 144.0_f64).powi(144);
        let rectangle = controller.rectangle();
        assert!((rectangle.width() - 4.0 / compounded).abs() < 1e-9);
        assert!((controller.total_zoom() - compounded).abs() < 1e-9);
    }

    #[test]
    fn zoom_holds_once_double_precision_runs_out() {
        let mut controller = controller(1e6, ZoomStep::Linear);
        let mut last = None;
        for _ in 0..200 {
            let frame = controller.advance_frame(1.0, 1.0).unwrap();
            last = Some(frame.lbrt);
        }
        let rectangle = controller.rectangle();
        assert!(rectangle.width() > 0.0 && rectangle.height() > 0.0);
        assert_eq!(last.unwrap(), rectangle.lbrt());
        let held = controller.total_zoom();
        controller.advance_frame(1.0, 1.0).unwrap();
        assert_eq!(controller.total_zoom(), held);
    }

    #[test]
    fn default_zoom_freezes_when_corners_stop_moving() {
        let mut controller =
            ViewportController::new(start(), DEFAULT_TARGET, 1.25, ZoomStep::Linear);
        let mut frames = 0;
        while !controller.saturated() {
            controller.advance_frame(1.0 / 144.0, 1.0).unwrap();
            frames += 1;
            assert!(frames < 30_000, "still zooming after {} frames", frames);
        }

        let rectangle = controller.rectangle();
        let held = controller.total_zoom();
        assert!(held.is_finite() && held > 1e12);
        assert!(rectangle.width() > 0.0 && rectangle.height() > 0.0);

        for _ in 0..1000 {
            let frame = controller.advance_frame(1.0 / 144.0, 1.0).unwrap();
            assert_eq!(frame.lbrt, rectangle.lbrt());
            assert_eq!(controller.total_zoom(), held);
        }
    }

    #[test]
    fn corner_on_the_target_axis_does_not_count_as_stuck() {
        let rectangle = start().contract_towards(Complex::new(2.0, 0.0), 2.0).unwrap();
        assert_eq!(rectangle.upper_right().real, 2.0);
        assert_eq!(rectangle.width(), 2.0);
        assert_eq!(rectangle.height(), 2.0);
    }

    #[test]
    fn contraction_that_rounds_back_is_rejected() {
        let ulp = f64::EPSILON;
        let rectangle = ViewRectangle::new(
            Complex::new(1.0 - 8.0 * ulp, 1.0 - 8.0 * ulp),
            Complex::new(1.0 + 16.0 * ulp, 1.0 + 16.0 * ulp),
        )
        .unwrap();
        assert!(rectangle
            .contract_towards(Complex::new(1.0, 1.0), 1.001)
            .is_none());
    }

    #[test]
    fn projection_fills_the_height_and_scales_by_aspect() {
        let corner = Vec4::new(1.0, 1.0, 0.0, 1.0);

        let clip = model_view_projection(1.0) * corner;
        assert!((clip.x / clip.w - 1.0).abs() < 1e-5);
        assert!((clip.y / clip.w - 1.0).abs() < 1e-5);

        let clip = model_view_projection(2.0) * corner;
        assert!((clip.x / clip.w - 0.5).abs() < 1e-5);
        assert!((clip.y / clip.w - 1.0).abs() < 1e-5);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn parses_zoom_steps() {
        assert_eq!("linear".parse::<ZoomStep>(), Ok(ZoomStep::Linear));
        assert_eq!("exponential".parse::<ZoomStep>(), Ok(ZoomStep::Exponential));
        assert!("cubic".parse::<ZoomStep>().is_err());
    }
}
