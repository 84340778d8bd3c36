//! Window size in pixels.

/// Viewport dimensions, updated on resize
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    /// Zero-area viewports (minimised windows) carry no layout
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Y coordinate of the bottom edge in centred world space
    pub fn bottom(&self) -> f32 {
        -self.height / 2.0
    }
}
