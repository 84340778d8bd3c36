//! Audio decoding, playback, and spectrum analysis.
//!
//! A track is decoded up front, played through a `cpal` output stream
//! with a looping transport, and its output is tapped for a
//! browser-style byte frequency analysis once per frame.

mod analyser;
mod loader;
mod system;
mod transport;

// Re-export public types
pub use analyser::{AnalyserError, FrequencyAnalyser};
pub use loader::{load_audio, AudioData, AudioError};
pub use system::{AudioSystem, OutputError};
pub use transport::{PlaybackState, Transport};

/// Source of per-frame byte magnitudes for the bar field
pub trait SpectrumSource {
    /// Number of bins written by `read_byte_frequency_data`
    fn bin_count(&self) -> usize;

    /// Overwrite `out` with the current magnitudes (0..=255)
    fn read_byte_frequency_data(&mut self, out: &mut [u8]);
}
