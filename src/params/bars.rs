//! Bar field layout constants.

/// Layout rules for the equalizer bars
#[derive(Debug, Clone)]
pub struct BarLayout {
    /// Fraction of viewport height reached by a full-scale bin
    pub max_height_fraction: f32,

    /// Viewports wider than this (pixels) use `wide_bins`
    pub width_breakpoint_px: u32,

    /// Bin count for wide viewports
    pub wide_bins: usize,

    /// Bin count for narrow viewports
    pub narrow_bins: usize,

    /// Depth of the bar quads (world units)
    pub bar_depth: f32,

    /// Depth of the bar outlines, in front of the bars
    pub border_depth: f32,

    /// Outline colour (linear RGBA)
    pub border_color: [f32; 4],
}

impl Default for BarLayout {
    fn default() -> Self {
        Self {
            max_height_fraction: 0.7,
            width_breakpoint_px: 600,
            wide_bins: 32,
            narrow_bins: 16,
            bar_depth: 0.0,
            border_depth: 1.0,
            border_color: [75.0 / 255.0, 75.0 / 255.0, 75.0 / 255.0, 1.0],
        }
    }
}

impl BarLayout {
    /// Pick the bin count for a viewport width (decided once at startup)
    pub fn bins_for_width(&self, width_px: u32) -> usize {
        if width_px > self.width_breakpoint_px {
            self.wide_bins
        } else {
            self.narrow_bins
        }
    }
}
