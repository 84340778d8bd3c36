//! Byte frequency analysis in the style of a browser `AnalyserNode`.
//!
//! Each call windows the most recent `fft_size` samples, runs a forward
//! FFT, smooths magnitudes over time, and maps them from decibels onto
//! `0..=255`.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::params::AnalyserConfig;

/// Blackman window alpha used for analysis
const BLACKMAN_ALPHA: f32 = 0.16;

/// Error type for analyser construction.
#[derive(Debug, thiserror::Error)]
pub enum AnalyserError {
    #[error("Bin count must be a non-zero power of 2, got {0}")]
    InvalidBinCount(usize),
    #[error("Decibel range is empty: min {min} >= max {max}")]
    InvalidDecibelRange { min: f32, max: f32 },
}

/// Frequency analyser producing one byte per bin
pub struct FrequencyAnalyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    smoothed: Vec<f32>,
    buffer: Vec<Complex<f32>>,
}

impl FrequencyAnalyser {
    /// Create an analyser; the bin count fixes the FFT size for its lifetime
    pub fn new(config: AnalyserConfig) -> Result<Self, AnalyserError> {
        if config.bin_count == 0 || !config.bin_count.is_power_of_two() {
            return Err(AnalyserError::InvalidBinCount(config.bin_count));
        }
        if config.min_decibels >= config.max_decibels {
            return Err(AnalyserError::InvalidDecibelRange {
                min: config.min_decibels,
                max: config.max_decibels,
            });
        }

        let fft_size = config.fft_size();
        let fft = FftPlanner::new().plan_fft_forward(fft_size);
        let window = (0..fft_size).map(|i| blackman_window(i, fft_size)).collect();

        Ok(Self {
            smoothed: vec![0.0; config.bin_count],
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            config,
            fft,
            window,
        })
    }

    pub fn bin_count(&self) -> usize {
        self.config.bin_count
    }

    pub fn fft_size(&self) -> usize {
        self.config.fft_size()
    }

    /// Analyse the tail of `time_domain` and write one byte per bin into `out`.
    ///
    /// Fewer than `fft_size` samples are zero-padded at the front. Only the
    /// first `min(out.len(), bin_count)` bytes of `out` are written.
    pub fn byte_frequency_data(&mut self, time_domain: &[f32], out: &mut [u8]) {
        let fft_size = self.fft_size();
        let available = time_domain.len().min(fft_size);
        let pad = fft_size - available;
        let tail = &time_domain[time_domain.len() - available..];

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { tail[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let tau = self.config.smoothing_time_constant.clamp(0.0, 1.0);
        let scale = 1.0 / fft_size as f32;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(&self.buffer) {
            let magnitude = bin.norm() * scale;
            let next = tau * *smoothed + (1.0 - tau) * magnitude;
            *smoothed = if next.is_finite() { next } else { 0.0 };
        }

        let min_db = self.config.min_decibels;
        let range = self.config.max_decibels - min_db;
        for (byte, &magnitude) in out.iter_mut().zip(&self.smoothed) {
            *byte = magnitude_to_byte(magnitude, min_db, range);
        }
    }

    /// Forget smoothing history
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }
}

/// Blackman window coefficient for sample `index` of `size`
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let a0 = (1.0 - BLACKMAN_ALPHA) / 2.0;
    let a1 = 0.5;
    let a2 = BLACKMAN_ALPHA / 2.0;
    let x = index as f32 / size as f32;
    a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
}

fn magnitude_to_byte(magnitude: f32, min_db: f32, range_db: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 * (db - min_db) / range_db;
    scaled.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44100.0;

    fn tone(bin: usize, fft_size: usize, amplitude: f32, len: usize) -> Vec<f32> {
        let freq = bin as f32 * SAMPLE_RATE / fft_size as f32;
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq * i as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    fn unsmoothed(bins: usize) -> FrequencyAnalyser {
        let config = AnalyserConfig {
            smoothing_time_constant: 0.0,
            ..AnalyserConfig::with_bins(bins)
        };
        FrequencyAnalyser::new(config).unwrap()
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let err = FrequencyAnalyser::new(AnalyserConfig::with_bins(24)).err();
        assert!(matches!(err, Some(AnalyserError::InvalidBinCount(24))));
        assert!(FrequencyAnalyser::new(AnalyserConfig::with_bins(0)).is_err());
    }

    #[test]
    fn test_rejects_empty_decibel_range() {
        let config = AnalyserConfig {
            min_decibels: -30.0,
            max_decibels: -30.0,
            ..AnalyserConfig::default()
        };
        assert!(matches!(
            FrequencyAnalyser::new(config),
            Err(AnalyserError::InvalidDecibelRange { .. })
        ));
    }

    #[test]
    fn test_silence_is_all_zero() {
        let mut analyser = FrequencyAnalyser::new(AnalyserConfig::with_bins(32)).unwrap();
        let mut out = [7u8; 32];
        analyser.byte_frequency_data(&[], &mut out);
        assert!(out.iter().all(|&b| b == 0));

        analyser.byte_frequency_data(&[0.0; 128], &mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tone_peaks_at_its_bin() {
        let mut analyser = unsmoothed(32);
        let samples = tone(8, analyser.fft_size(), 0.001, 256);
        let mut out = [0u8; 32];
        analyser.byte_frequency_data(&samples, &mut out);

        let peak = out
            .iter()
            .enumerate()
            .max_by_key(|&(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 8, "bytes: {:?}", out);
        assert!(out[8] > 0);
        assert_eq!(out[20], 0);
    }

    #[test]
    fn test_loud_tone_saturates() {
        let mut analyser = unsmoothed(16);
        let samples = tone(4, analyser.fft_size(), 1.0, 32);
        let mut out = [0u8; 16];
        analyser.byte_frequency_data(&samples, &mut out);
        assert_eq!(out[4], 255);
    }

    #[test]
    fn test_smoothing_decays_after_signal_stops() {
        let mut analyser = FrequencyAnalyser::new(AnalyserConfig::with_bins(32)).unwrap();
        let loud = tone(8, analyser.fft_size(), 1.0, 64);
        let mut out = [0u8; 32];

        for _ in 0..20 {
            analyser.byte_frequency_data(&loud, &mut out);
        }
        let sustained = out[8];
        assert!(sustained > 0);

        analyser.byte_frequency_data(&[0.0; 64], &mut out);
        let after_one = out[8];
        assert!(after_one > 0, "smoothing should hold energy for a frame");
        assert!(after_one <= sustained);

        analyser.reset();
        analyser.byte_frequency_data(&[0.0; 64], &mut out);
        assert_eq!(out[8], 0);
    }

    #[test]
    fn test_blackman_window_shape() {
        let size = 64;
        assert!(blackman_window(0, size).abs() < 1e-6);
        assert!((blackman_window(size / 2, size) - 1.0).abs() < 1e-6);
    }
}
