//! Equalizer bars and their outlines.
//!
//! Bars are unit quads placed by `position` (centre) and sized by
//! `scale`. Each bar's bottom edge stays pinned to the bottom of the
//! viewport; only its height follows the audio.

use glam::{Vec2, Vec3};

use super::viewport::Viewport;
use crate::params::BarLayout;

/// Normalize a magnitude byte to 0..=1
pub fn normalize_magnitude(magnitude: u8) -> f32 {
    magnitude as f32 / 255.0
}

/// One rectangle of the field (bar or outline)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Centre in world units (pixels, origin at viewport centre)
    pub position: Vec3,
    /// Width and height in world units
    pub scale: Vec2,
    /// Shading parameter, 0..=1
    pub amplitude: f32,
}

impl Bar {
    fn height(&self) -> f32 {
        self.scale.y
    }
}

/// Fixed set of bars plus matching outlines, one per bin
#[derive(Debug, Clone)]
pub struct BarField {
    bars: Vec<Bar>,
    borders: Vec<Bar>,
    layout: BarLayout,
}

impl BarField {
    /// Lay out `bin_count` zero-height bars across `viewport`
    pub fn new(bin_count: usize, viewport: Viewport, layout: BarLayout) -> Self {
        let rest = |depth: f32| Bar {
            position: Vec3::new(0.0, viewport.bottom(), depth),
            scale: Vec2::new(0.0, 0.0),
            amplitude: 0.0,
        };
        let mut field = Self {
            bars: vec![rest(layout.bar_depth); bin_count],
            borders: vec![rest(layout.border_depth); bin_count],
            layout,
        };
        field.relayout(viewport);
        field
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn borders(&self) -> &[Bar] {
        &self.borders
    }

    pub fn layout(&self) -> &BarLayout {
        &self.layout
    }

    /// Width of one bar for `viewport`
    pub fn bar_width(&self, viewport: Viewport) -> f32 {
        if self.bars.is_empty() {
            return 0.0;
        }
        viewport.width / self.bars.len() as f32
    }

    /// Set heights from this frame's magnitudes.
    ///
    /// `height = magnitude / 255 * max_height_fraction * viewport.height`;
    /// bars without a matching sample are left untouched.
    pub fn apply_samples(&mut self, samples: &[u8], viewport: Viewport) {
        let max_height = viewport.height * self.layout.max_height_fraction;
        let bottom = viewport.bottom();

        for ((bar, border), &magnitude) in self
            .bars
            .iter_mut()
            .zip(self.borders.iter_mut())
            .zip(samples)
        {
            let amplitude = normalize_magnitude(magnitude);
            let height = amplitude * max_height;
            let y = bottom + height / 2.0;

            bar.scale.y = height;
            bar.position.y = y;
            bar.amplitude = amplitude;

            border.scale.y = height;
            border.position.y = y;
        }
    }

    /// Recompute x placement and width for a new viewport.
    ///
    /// Heights are kept; `y` is re-derived from each bar's current height
    /// so bottoms stay pinned to the new viewport edge.
    pub fn relayout(&mut self, viewport: Viewport) {
        let bar_width = self.bar_width(viewport);
        let left = -viewport.width / 2.0;
        let bottom = viewport.bottom();

        for (i, (bar, border)) in self.bars.iter_mut().zip(self.borders.iter_mut()).enumerate() {
            let x = i as f32 * bar_width + left + bar_width / 2.0;
            let y = bottom + bar.height() / 2.0;

            bar.position.x = x;
            bar.position.y = y;
            bar.scale.x = bar_width;

            border.position.x = x;
            border.position.y = y;
            border.scale.x = bar_width;
        }
    }
}
