//! Per-frame driver with explicit start/stop control.

use std::time::{Duration, Instant};

use crate::audio::SpectrumSource;
use crate::scene::SceneContext;

/// Lifecycle of the render loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Created, not yet started
    Idle,
    Running,
    /// Stopped for good; no further frames
    Stopped,
}

/// Frame driver: pulls audio, updates the bar field, and counts frames
pub struct RenderLoop {
    state: LoopState,
    frames: u64,
    fps: FpsTracker,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            frames: 0,
            fps: FpsTracker::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Total frames driven so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Start the loop; a stopped loop cannot be restarted
    pub fn start(&mut self) -> bool {
        if self.state == LoopState::Idle {
            self.state = LoopState::Running;
            self.fps = FpsTracker::new();
            log::debug!("Render loop started");
        }
        self.is_running()
    }

    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            log::debug!("Render loop stopped after {} frames", self.frames);
        }
        self.state = LoopState::Stopped;
    }

    /// Run one frame update.
    ///
    /// Returns `true` when the scene changed and should be rendered; a loop
    /// that is not running leaves the scene untouched.
    pub fn tick(&mut self, scene: &mut SceneContext, source: &mut dyn SpectrumSource) -> bool {
        if !self.is_running() {
            return false;
        }
        scene.update_frame(source);
        self.frames += 1;
        self.fps.record_frame();
        true
    }
}

/// Rolling frame-rate log, printed at debug level once per second
struct FpsTracker {
    window_start: Instant,
    window_frames: u32,
}

impl FpsTracker {
    const REPORT_INTERVAL: Duration = Duration::from_secs(1);

    fn new() -> Self {
        Self {
            window_start: Instant::now(),
            window_frames: 0,
        }
    }

    fn record_frame(&mut self) {
        self.window_frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= Self::REPORT_INTERVAL {
            log::debug!(
                "FPS: {:.1}",
                self.window_frames as f32 / elapsed.as_secs_f32()
            );
            self.window_start = Instant::now();
            self.window_frames = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{BarLayout, RenderConfig};
    use crate::scene::Viewport;

    struct Counting {
        reads: usize,
    }

    impl SpectrumSource for Counting {
        fn bin_count(&self) -> usize {
            16
        }

        fn read_byte_frequency_data(&mut self, out: &mut [u8]) {
            self.reads += 1;
            out.iter_mut().for_each(|b| *b = 128);
        }
    }

    fn scene() -> SceneContext {
        SceneContext::new(
            Viewport::new(400, 400),
            BarLayout::default(),
            &RenderConfig::default(),
        )
    }

    #[test]
    fn test_idle_loop_does_not_tick() {
        let mut render_loop = RenderLoop::new();
        let mut scene = scene();
        let mut source = Counting { reads: 0 };

        assert_eq!(render_loop.state(), LoopState::Idle);
        assert!(!render_loop.tick(&mut scene, &mut source));
        assert_eq!(source.reads, 0);
    }

    #[test]
    fn test_running_loop_updates_scene() {
        let mut render_loop = RenderLoop::new();
        let mut scene = scene();
        let mut source = Counting { reads: 0 };

        assert!(render_loop.start());
        for _ in 0..3 {
            assert!(render_loop.tick(&mut scene, &mut source));
        }
        assert_eq!(source.reads, 3);
        assert_eq!(render_loop.frames(), 3);
        assert!(scene.bars().bars().iter().all(|b| b.scale.y > 0.0));
    }

    #[test]
    fn test_stopped_loop_stays_stopped() {
        let mut render_loop = RenderLoop::new();
        let mut scene = scene();
        let mut source = Counting { reads: 0 };

        render_loop.start();
        render_loop.tick(&mut scene, &mut source);
        render_loop.stop();

        assert!(!render_loop.tick(&mut scene, &mut source));
        assert!(!render_loop.start());
        assert_eq!(render_loop.state(), LoopState::Stopped);
        assert_eq!(source.reads, 1);
        assert_eq!(render_loop.frames(), 1);
    }
}
