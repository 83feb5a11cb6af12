//! Window, event loop and frame pacing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::HoloConfig;
use crate::error::AppError;
use crate::glow::GlowRenderer;
use crate::gpu::{Camera, GpuState};
use crate::input::Input;
use crate::scene::{Command, HoloScene};
use crate::time::{frame_interval, FrameClock};

const STATUS_INTERVAL: Duration = Duration::from_secs(1);

/// Open a window and run the display until the user quits.
pub fn run(config: HoloConfig, scene: HoloScene) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, scene);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

pub struct App {
    config: HoloConfig,
    scene: HoloScene,
    renderer: GlowRenderer,
    input: Input,
    clock: FrameClock,
    frame_interval: Duration,
    next_frame: Instant,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    show_status: bool,
    last_status: Instant,
    /// Set when the loop had to stop on an error.
    error: Option<AppError>,
}

impl App {
    pub fn new(config: HoloConfig, scene: HoloScene) -> Self {
        let now = Instant::now();
        Self {
            renderer: GlowRenderer::new(&config),
            input: Input::new(config.display.width, config.display.height),
            clock: FrameClock::new(config.cycle.max_frame_delta),
            frame_interval: frame_interval(config.display.frame_rate),
            next_frame: now,
            window: None,
            gpu_state: None,
            show_status: true,
            last_status: now,
            error: None,
            scene,
            config,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title("HoloForge")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.display.width,
                self.config.display.height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);

        let gpu_state = pollster::block_on(GpuState::new(
            window.clone(),
            Camera::new(&self.config.camera),
            self.config.background(),
        ))?;

        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        // Window creation time is not animation time
        self.clock.skip_stall();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        log::error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }

    /// Apply this frame's input and advance the scene.
    fn update(&mut self, event_loop: &ActiveEventLoop) {
        for command in self.input.commands() {
            match command {
                Command::Quit => event_loop.exit(),
                Command::ToggleStatus => {
                    self.show_status = !self.show_status;
                    log::info!("Status line {}", if self.show_status { "on" } else { "off" });
                }
                Command::TriggerNextShape | Command::SkipToShape(_) => {
                    if !self.scene.apply(command) && self.scene.transition().is_transitioning() {
                        log::debug!("Ignored {command:?} during a transition");
                    }
                }
                Command::ToggleFreeze => {
                    self.scene.apply(command);
                }
            }
        }

        let force = self.input.hand_force(&self.config.hand_force);
        self.input.begin_frame();

        let dt = self.clock.tick();
        let status = self.scene.tick(dt, force.as_ref());

        if self.show_status && self.last_status.elapsed() >= STATUS_INTERVAL {
            self.last_status = Instant::now();
            log::info!(
                "{} | {:.0} fps | {}",
                status,
                self.clock.fps(),
                if self.scene.is_frozen() { "frozen" } else { "rotating" }
            );
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.update(event_loop);

        let frame = self.renderer.render(&self.scene);
        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };
        match gpu_state.render(&frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu_state.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {e:?}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init_graphics(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = &self.window else {
            return;
        };

        let now = Instant::now();
        if now >= self.next_frame {
            window.request_redraw();
            // Don't try to catch up on missed frames
            self.next_frame = (self.next_frame + self.frame_interval).max(now);
        }

        if self.frame_interval.is_zero() {
            event_loop.set_control_flow(ControlFlow::Poll);
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
        }
    }
}
