//! Command line configuration.

use std::str::FromStr;

use clap::{App, Arg, ArgMatches};
use log::warn;

use crate::{
    clock::Timing,
    complex::Complex,
    error::Error,
    evaluator::DEFAULT_COLOUR_PERIOD,
    uniforms::RectanglePrecision,
    viewport::{ViewRectangle, ZoomStep},
};

/// A point on the boundary of the set with plenty of structure around it.
pub const DEFAULT_TARGET: Complex =
    Complex::new(0.360_240_443_437_614_36, -0.641_313_061_064_803_2);

const SIZE: &str = "size";
const LOWERLEFT: &str = "lowerleft";
const UPPERRIGHT: &str = "upperright";
const TARGET: &str = "target";
const ZOOM_RATE: &str = "zoom-rate";
const ZOOM_STEP: &str = "zoom-step";
const TIMING: &str = "timing";
const FPS: &str = "fps";
const ITERATIONS: &str = "iterations";
const ITERATION_GROWTH: &str = "iteration-growth";
const COLOUR_PERIOD: &str = "colour-period";
const PRECISION: &str = "precision";
const BANDED: &str = "banded";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub lower_left: Complex,
    pub upper_right: Complex,
    pub target: Complex,
    /// Magnification per simulated second.
    pub zoom_rate: f64,
    pub zoom_step: ZoomStep,
    pub timing: Timing,
    pub frame_rate_cap: f64,
    pub initial_iterations: f32,
    /// Added to the iteration bound per simulated second. Zero keeps it fixed.
    pub iteration_growth: f32,
    pub colour_period: f32,
    pub precision: RectanglePrecision,
    pub smooth_colouring: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Mandelbrot set".to_string(),
            width: 800,
            height: 800,
            lower_left: Complex::new(-2.0, -2.0),
            upper_right: Complex::new(2.0, 2.0),
            target: DEFAULT_TARGET,
            zoom_rate: 1.25,
            zoom_step: ZoomStep::Linear,
            timing: Timing::Fixed,
            frame_rate_cap: 144.0,
            initial_iterations: 1.0,
            iteration_growth: 20.0,
            colour_period: DEFAULT_COLOUR_PERIOD,
            precision: RectanglePrecision::Split,
            smooth_colouring: true,
        }
    }
}

impl Config {
    pub fn from_args() -> Result<Self, Error> {
        Self::from_matches(&app().get_matches())
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self, Error> {
        let mut config = Config::default();

        if let Some(size) = matches.value_of(SIZE) {
            let (width, height) = parse_pair::<u32>(size, 'x')
                .ok_or_else(|| Error::Config(format!("could not parse size `{}`", size)))?;
            config.width = width;
            config.height = height;
        }
        if let Some(point) = parse_complex_arg(matches, LOWERLEFT)? {
            config.lower_left = point;
        }
        if let Some(point) = parse_complex_arg(matches, UPPERRIGHT)? {
            config.upper_right = point;
        }
        if let Some(point) = parse_complex_arg(matches, TARGET)? {
            config.target = point;
        }
        if let Some(zoom_rate) = parse_arg(matches, ZOOM_RATE)? {
            config.zoom_rate = zoom_rate;
        }
        if let Some(zoom_step) = parse_arg(matches, ZOOM_STEP)? {
            config.zoom_step = zoom_step;
        }
        if let Some(timing) = parse_arg(matches, TIMING)? {
            config.timing = timing;
        }
        if let Some(frame_rate_cap) = parse_arg(matches, FPS)? {
            config.frame_rate_cap = frame_rate_cap;
        }
        if let Some(iterations) = parse_arg(matches, ITERATIONS)? {
            config.initial_iterations = iterations;
        }
        if let Some(growth) = parse_arg(matches, ITERATION_GROWTH)? {
            config.iteration_growth = growth;
        }
        if let Some(colour_period) = parse_arg(matches, COLOUR_PERIOD)? {
            config.colour_period = colour_period;
        }
        if let Some(precision) = parse_arg(matches, PRECISION)? {
            config.precision = precision;
        }
        if matches.is_present(BANDED) {
            config.smooth_colouring = false;
        }

        config.validate()
    }

    /// Rejects settings the viewer cannot run with. A colour period that is
    /// not positive is replaced by the default instead.
    pub fn validate(mut self) -> Result<Self, Error> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!(
                "window size {}x{} is empty",
                self.width, self.height
            )));
        }
        self.view_rectangle()?;
        if !self.target.is_finite() {
            return Err(Error::Config("zoom target is not finite".to_string()));
        }
        if !(self.zoom_rate > 0.0 && self.zoom_rate.is_finite()) {
            return Err(Error::Config(format!(
                "zoom rate {} must be positive",
                self.zoom_rate
            )));
        }
        if !(self.frame_rate_cap > 0.0 && self.frame_rate_cap.is_finite()) {
            return Err(Error::Config(format!(
                "frame rate cap {} must be positive",
                self.frame_rate_cap
            )));
        }
        if !self.initial_iterations.is_finite() || !self.iteration_growth.is_finite() {
            return Err(Error::Config("iteration settings must be finite".to_string()));
        }
        if !(self.colour_period > 0.0 && self.colour_period.is_finite()) {
            warn!(
                "colour period {} is not positive, using {}",
                self.colour_period, DEFAULT_COLOUR_PERIOD
            );
            self.colour_period = DEFAULT_COLOUR_PERIOD;
        }
        Ok(self)
    }

    pub fn view_rectangle(&self) -> Result<ViewRectangle, Error> {
        ViewRectangle::new(self.lower_left, self.upper_right).ok_or_else(|| {
            Error::Config(format!(
                "lower left {:?} must be below and left of upper right {:?}",
                self.lower_left, self.upper_right
            ))
        })
    }
}

fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let index = s.find(separator)?;
    match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
        (Ok(l), Ok(r)) => Some((l, r)),
        _ => None,
    }
}

fn parse_complex(s: &str) -> Option<Complex> {
    parse_pair(s, ',').map(|(real, imaginary)| Complex::new(real, imaginary))
}

fn parse_complex_arg(matches: &ArgMatches, name: &str) -> Result<Option<Complex>, Error> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(value) => parse_complex(value)
            .map(Some)
            .ok_or_else(|| Error::Config(format!("could not parse {} `{}`", name, value))),
    }
}

fn parse_arg<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match matches.value_of(name) {
        None => Ok(None),
        Some(value) => T::from_str(value)
            .map(Some)
            .map_err(|error| Error::Config(format!("{} `{}`: {}", name, value, error))),
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

pub fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("wgpu-mandelzoom")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Continuously zooming Mandelbrot set, rendered on the GPU")
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .validator(|s| validate_pair::<u32>(&s, 'x', "Could not parse window size"))
                .help("Initial window size, e.g. 800x800"),
        )
        .arg(
            Arg::with_name(LOWERLEFT)
                .long(LOWERLEFT)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse lower left corner"))
                .help("Lower left corner of the starting view, e.g. -2,-2"),
        )
        .arg(
            Arg::with_name(UPPERRIGHT)
                .long(UPPERRIGHT)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse upper right corner"))
                .help("Upper right corner of the starting view, e.g. 2,2"),
        )
        .arg(
            Arg::with_name(TARGET)
                .long(TARGET)
                .short("t")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse zoom target"))
                .help("Point to zoom towards"),
        )
        .arg(
            Arg::with_name(ZOOM_RATE)
                .long(ZOOM_RATE)
                .short("z")
                .takes_value(true)
                .allow_hyphen_values(true)
                .help("Magnification per second [default: 1.25]"),
        )
        .arg(
            Arg::with_name(ZOOM_STEP)
                .long(ZOOM_STEP)
                .takes_value(true)
                .possible_values(&["linear", "exponential"])
                .help("How the zoom rate is applied per frame [default: linear]"),
        )
        .arg(
            Arg::with_name(TIMING)
                .long(TIMING)
                .takes_value(true)
                .possible_values(&["fixed", "measured"])
                .help("Step the zoom by the nominal or the measured frame time [default: fixed]"),
        )
        .arg(
            Arg::with_name(FPS)
                .long(FPS)
                .takes_value(true)
                .allow_hyphen_values(true)
                .help("Frame rate cap [default: 144]"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .allow_hyphen_values(true)
                .help("Initial iteration bound [default: 1]"),
        )
        .arg(
            Arg::with_name(ITERATION_GROWTH)
                .long(ITERATION_GROWTH)
                .short("g")
                .takes_value(true)
                .allow_hyphen_values(true)
                .help("Iterations added per second, 0 for a fixed bound [default: 20]"),
        )
        .arg(
            Arg::with_name(COLOUR_PERIOD)
                .long(COLOUR_PERIOD)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .help("Iterations per palette cycle [default: 100]"),
        )
        .arg(
            Arg::with_name(PRECISION)
                .long(PRECISION)
                .takes_value(true)
                .possible_values(&["split", "single"])
                .help("How the view rectangle is sent to the GPU [default: split]"),
        )
        .arg(
            Arg::with_name(BANDED)
                .long(BANDED)
                .help("Colour by raw iteration counts instead of smoothed ones"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Result<Config, Error> {
        let mut argv = vec!["wgpu-mandelzoom"];
        argv.extend_from_slice(args);
        Config::from_matches(&app().get_matches_from_safe(argv).unwrap())
    }

    #[test]
    fn no_arguments_gives_the_defaults() {
        assert_eq!(config(&[]).unwrap(), Config::default());
    }

    #[test]
    fn parses_every_option() {
        let config = config(&[
            "--size",
            "1024x768",
            "--lowerleft",
            "-1.5,-1",
            "--upperright",
            "0.5,1",
            "--target",
            "-0.75,0.1",
            "--zoom-rate",
            "2",
            "--zoom-step",
            "exponential",
            "--timing",
            "measured",
            "--fps",
            "60",
            "--iterations",
            "50",
            "--iteration-growth",
            "0",
            "--colour-period",
            "32",
            "--precision",
            "single",
            "--banded",
        ])
        .unwrap();

        assert_eq!((config.width, config.height), (1024, 768));
        assert_eq!(config.lower_left, Complex::new(-1.5, -1.0));
        assert_eq!(config.upper_right, Complex::new(0.5, 1.0));
        assert_eq!(config.target, Complex::new(-0.75, 0.1));
        assert_eq!(config.zoom_rate, 2.0);
        assert_eq!(config.zoom_step, ZoomStep::Exponential);
        assert_eq!(config.timing, Timing::Measured);
        assert_eq!(config.frame_rate_cap, 60.0);
        assert_eq!(config.initial_iterations, 50.0);
        assert_eq!(config.iteration_growth, 0.0);
        assert_eq!(config.colour_period, 32.0);
        assert_eq!(config.precision, RectanglePrecision::Single);
        assert!(!config.smooth_colouring);
    }

    #[test]
    fn zero_colour_period_is_replaced() {
        assert_eq!(
            config(&["--colour-period", "0"]).unwrap().colour_period,
            DEFAULT_COLOUR_PERIOD
        );
    }

    #[test]
    fn rejects_flipped_corners() {
        assert!(config(&["--lowerleft", "2,2", "--upperright", "-2,-2"]).is_err());
    }

    #[test]
    fn rejects_non_positive_rates() {
        assert!(config(&["--zoom-rate", "0"]).is_err());
        assert!(config(&["--fps", "-1"]).is_err());
        assert!(config(&["--zoom-rate", "fast"]).is_err());
    }

    #[test]
    fn rejects_empty_windows() {
        assert!(config(&["--size", "0x600"]).is_err());
    }
}
