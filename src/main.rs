use std::{process, time::Instant};

use anyhow::Context;
use log::{debug, error, info};
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use wgpu_mandelzoom::{
    clock::FrameClock, config::Config, diagnostics, error::Error, palette::Palette,
    renderer::Renderer, uniforms::Uniforms, viewport::ViewportController,
};

fn main() {
    env_logger::init();

    if let Err(error) = run() {
        error!("{:#}", error);
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::from_args().context("invalid arguments")?;
    info!("starting with {:?}", config);

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .build(&event_loop)
        .map_err(Error::from)
        .context("could not open a window")?;

    let mut renderer =
        Renderer::new(&window, &Palette::default()).context("could not set up the GPU")?;

    let mut viewport = ViewportController::new(
        config.view_rectangle()?,
        config.target,
        config.zoom_rate,
        config.zoom_step,
    )
    .with_iterations(config.initial_iterations, config.iteration_growth)
    .with_colour_period(config.colour_period);

    let mut clock = FrameClock::new(config.frame_rate_cap, Instant::now());
    let mut uniforms = None;

    event_loop.run(move |event, _, control_flow| match event {
        Event::MainEventsCleared => {
            let now = Instant::now();
            let timing = match clock.tick(now) {
                Some(timing) => timing,
                None => {
                    control_flow.set_wait_until(now + clock.until_next_frame(now));
                    return;
                }
            };
            control_flow.set_poll();

            let size = window.inner_size();
            if size.width == 0 || size.height == 0 {
                return;
            }
            let aspect_ratio = f64::from(size.width) / f64::from(size.height);

            let step = clock.step(config.timing, &timing);
            if let Some(frame) = viewport.advance_frame(step, aspect_ratio) {
                clock.frame_drawn();
                uniforms = Some(Uniforms::new(
                    &frame,
                    config.precision,
                    config.smooth_colouring,
                ));
                window.set_title(&diagnostics::title(
                    &config.title,
                    &timing,
                    viewport.total_zoom(),
                    viewport.max_iterations(),
                ));
                window.request_redraw();
            }
        }
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => {
                *control_flow = ControlFlow::Exit;
            }
            WindowEvent::Resized(size) => {
                renderer.resize(size);
                window.request_redraw();
            }
            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                renderer.resize(*new_inner_size);
                window.request_redraw();
            }
            _ => {}
        },
        Event::RedrawRequested(window_id) if window_id == window.id() => {
            if let Some(uniforms) = &uniforms {
                if let Err(error) = renderer.render(uniforms) {
                    error!("{}", error);
                    *control_flow = ControlFlow::ExitWithCode(1);
                }
            }
        }
        Event::LoopDestroyed => {
            renderer.finish();
            debug!("released GPU resources");
        }
        _ => {}
    });
}
