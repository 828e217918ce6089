/*!
Frame pacing.

The event loop asks the clock on every pass whether a frame is due. When the
time since the last frame would put the instantaneous rate above the cap, the
pass is skipped and the loop waits for [`FrameClock::until_next_frame`] before
asking again. Skipped passes do not move the reference point, so the latency
reported for the next frame covers the whole gap. A due frame only counts
once the caller reports it drawn with [`FrameClock::frame_drawn`].
*/

use std::{
    str::FromStr,
    time::{Duration, Instant},
};

/// Which elapsed time drives the zoom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timing {
    /// Always step by `1 / cap`, so jittery frame times never reach the zoom.
    Fixed,
    /// Step by the measured latency of each frame.
    Measured,
}

impl FromStr for Timing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(Timing::Fixed),
            "measured" => Ok(Timing::Measured),
            other => Err(format!("unknown timing `{}`", other)),
        }
    }
}

/// Measurements for a frame that is due.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTiming {
    /// Seconds since the previous frame.
    pub latency: f64,
    /// `1 / latency`.
    pub rate: f64,
    /// Frames drawn so far, counting this one if it gets drawn.
    pub frame_count: u64,
}

pub struct FrameClock {
    last_frame: Instant,
    frame_rate_cap: f64,
    frame_count: u64,
}

impl FrameClock {
    pub fn new(frame_rate_cap: f64, now: Instant) -> Self {
        Self {
            last_frame: now,
            frame_rate_cap,
            frame_count: 0,
        }
    }

    /// Returns `None` when drawing at `now` would exceed the frame rate cap.
    pub fn tick(&mut self, now: Instant) -> Option<FrameTiming> {
        let latency = now.saturating_duration_since(self.last_frame).as_secs_f64();
        if latency <= 0.0 {
            return None;
        }
        let rate = 1.0 / latency;
        if rate > self.frame_rate_cap {
            return None;
        }

        self.last_frame = now;
        Some(FrameTiming {
            latency,
            rate,
            frame_count: self.frame_count + 1,
        })
    }

    pub fn frame_drawn(&mut self) {
        self.frame_count += 1;
    }

    /// Nominal frame time at the cap, in seconds.
    pub fn nominal_step(&self) -> f64 {
        1.0 / self.frame_rate_cap
    }

    /// Seconds to feed the zoom for a frame measured as `timing`.
    pub fn step(&self, timing: Timing, frame: &FrameTiming) -> f64 {
        match timing {
            Timing::Fixed => self.nominal_step(),
            Timing::Measured => frame.latency,
        }
    }

    /// Time left until the next frame is allowed.
    pub fn until_next_frame(&self, now: Instant) -> Duration {
        let earliest = self.last_frame + Duration::from_secs_f64(self.nominal_step());
        earliest.saturating_duration_since(now)
    }
}
