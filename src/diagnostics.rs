use crate::clock::FrameTiming;

/// Window title with the frame statistics appended.
pub fn title(base: &str, timing: &FrameTiming, total_zoom: f64, max_iterations: f32) -> String {
    format!(
        "{} -- FPS: {:3.0} -- Latency: {:1.5} -- Frame count: {} -- Current zoom: {:.2e} -- Max iterations: {}",
        base,
        timing.rate,
        timing.latency,
        timing.frame_count,
        total_zoom,
        max_iterations as i64
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_every_statistic() {
        let timing = FrameTiming {
            latency: 0.0069444,
            rate: 144.0,
            frame_count: 1200,
        };
        assert_eq!(
            title("Mandelbrot set", &timing, 1234.5, 167.9),
            "Mandelbrot set -- FPS: 144 -- Latency: 0.00694 -- Frame count: 1200 -- Current zoom: 1.23e3 -- Max iterations: 167"
        );
    }
}
