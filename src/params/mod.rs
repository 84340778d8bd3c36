//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Units (pixels, seconds, dB, etc.)
//! - Documented ranges and meanings
//! - Defaults matching the visualizer's reference look

mod audio;
mod bars;
mod render;

// Re-export all types
pub use audio::AnalyserConfig;
pub use bars::BarLayout;
pub use render::RenderConfig;
