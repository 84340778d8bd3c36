//! barscope - audio-reactive frequency bar equalizer
//!
//! One bar per frequency bin, pinned to the bottom of the window and
//! scaled every frame by the live spectrum of the playing track.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use barscope::audio::{load_audio, AudioData, AudioSystem};
use barscope::cli::Args;
use barscope::params::{AnalyserConfig, BarLayout, RenderConfig};
use barscope::render_loop::RenderLoop;
use barscope::rendering::RenderSystem;
use barscope::scene::{SceneContext, Viewport};
use barscope::time_display::TimeDisplay;

/// Systems that exist once the window is up
struct Running {
    window: Arc<Window>,
    render_system: RenderSystem,
    scene: SceneContext,
    audio: AudioSystem,
}

/// Main application state
struct App {
    render_config: RenderConfig,
    layout: BarLayout,
    /// Decoded track, handed to the audio system on startup
    track: Option<AudioData>,
    running: Option<Running>,
    render_loop: RenderLoop,
    time_display: TimeDisplay,
    /// First fatal error, returned from `main`
    error: Option<anyhow::Error>,
}

impl App {
    fn new(render_config: RenderConfig, track: AudioData) -> Self {
        Self {
            render_config,
            layout: BarLayout::default(),
            track: Some(track),
            running: None,
            render_loop: RenderLoop::new(),
            time_display: TimeDisplay::new(),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<Running> {
        let window_attributes = Window::default_attributes()
            .with_title(self.render_config.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );

        let viewport = logical_viewport(&window, window.inner_size());
        let scene = SceneContext::new(viewport, self.layout.clone(), &self.render_config);
        log::info!(
            "Viewport {}x{}, {} bars",
            viewport.width,
            viewport.height,
            scene.bin_count()
        );

        let track = self.track.take().context("Audio track already consumed")?;
        let audio = AudioSystem::new(track, AnalyserConfig::with_bins(scene.bin_count()))
            .context("Failed to open audio output")?;

        let render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &scene,
            &self.render_config,
        ))
        .context("Failed to initialize renderer")?;

        Ok(Running {
            window,
            render_system,
            scene,
            audio,
        })
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.render_loop.stop();
        event_loop.exit();
    }

    fn toggle_playback(&mut self) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        if let Err(e) = running.audio.toggle_playback() {
            log::error!("Playback toggle failed: {}", e);
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        let viewport = logical_viewport(&running.window, size);
        if running.scene.resize(viewport) {
            running.render_system.resize(size.width, size.height);
            log::debug!("Resized to {}x{}", viewport.width, viewport.height);
        }
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        if !self.render_loop.tick(&mut running.scene, &mut running.audio) {
            return;
        }

        running.render_system.update(&running.scene);
        match running.render_system.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = running.render_system.size();
                running.render_system.resize(width, height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, stopping");
                self.shutdown(event_loop);
                return;
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        let (elapsed, duration) = running.audio.times();
        if let Some(text) = self.time_display.update(elapsed, duration) {
            running
                .window
                .set_title(&format!("{} | {}", self.render_config.title, text));
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.render_loop.is_running() {
            return;
        }
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() || self.error.is_some() {
            return; // Already initialized
        }

        match self.start(event_loop) {
            Ok(running) => {
                self.running = Some(running);
                self.render_loop.start();
                log::info!("Press SPACE (or click) to play/pause, ESC to quit");
            }
            Err(e) => {
                log::error!("{:#}", e);
                self.error = Some(e);
                self.shutdown(event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Space),
                        repeat: false,
                        ..
                    },
                ..
            }
            | WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.toggle_playback(),
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

/// Viewport in logical pixels for a physical window size
fn logical_viewport(window: &Window, size: PhysicalSize<u32>) -> Viewport {
    let logical = size.to_logical::<u32>(window.scale_factor());
    Viewport::new(logical.width, logical.height)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let track = load_audio(&args.audio)
        .with_context(|| format!("Failed to load {}", args.audio.display()))?;

    let mut app = App::new(args.render_config(), track);
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
