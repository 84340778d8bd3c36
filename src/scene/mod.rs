//! Scene state passed explicitly to every handler.
//!
//! The context owns the viewport, the camera, the bar field, and the
//! per-frame sample buffer. Frame updates and resizes both mutate it on
//! the event-loop thread.

mod bars;
mod camera;
mod viewport;

pub use bars::{normalize_magnitude, Bar, BarField};
pub use camera::OrthographicCamera;
pub use viewport::Viewport;

use crate::audio::SpectrumSource;
use crate::params::{BarLayout, RenderConfig};

/// Scene context: everything a frame or resize handler touches
pub struct SceneContext {
    viewport: Viewport,
    camera: OrthographicCamera,
    bars: BarField,
    /// One magnitude byte per bar, overwritten every frame
    samples: Vec<u8>,
}

impl SceneContext {
    /// Build the scene for the initial viewport.
    ///
    /// The bin count is chosen here from the initial width and never changes.
    pub fn new(viewport: Viewport, layout: BarLayout, config: &RenderConfig) -> Self {
        let bin_count = layout.bins_for_width(viewport.width as u32);
        Self::with_bins(bin_count, viewport, layout, config)
    }

    /// Build the scene with an explicit bin count
    pub fn with_bins(
        bin_count: usize,
        viewport: Viewport,
        layout: BarLayout,
        config: &RenderConfig,
    ) -> Self {
        Self {
            camera: OrthographicCamera::new(viewport, config),
            bars: BarField::new(bin_count, viewport, layout),
            samples: vec![0; bin_count],
            viewport,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.samples.len()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &OrthographicCamera {
        &self.camera
    }

    pub fn bars(&self) -> &BarField {
        &self.bars
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Pull this frame's magnitudes and update bar heights
    pub fn update_frame(&mut self, source: &mut dyn SpectrumSource) {
        debug_assert_eq!(source.bin_count(), self.samples.len());
        source.read_byte_frequency_data(&mut self.samples);
        self.bars.apply_samples(&self.samples, self.viewport);
    }

    /// Apply a new viewport to camera and bar layout.
    ///
    /// Returns `false` (and changes nothing) for zero-area viewports.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if viewport.is_empty() {
            return false;
        }
        self.viewport = viewport;
        self.camera.set_viewport(viewport);
        self.bars.relayout(viewport);
        true
    }
}
