//! Frequency analyser configuration.

/// Analyser configuration, modelled on a browser `AnalyserNode`
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// Number of output bins (`fft_size / 2`, must be a power of 2)
    pub bin_count: usize,

    /// Temporal smoothing constant (0 = none, values near 1 = heavy)
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte 0 (dB)
    pub min_decibels: f32,

    /// Magnitude mapped to byte 255 (dB)
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            bin_count: 32,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Analyser configuration for a given bin count, other fields default
    pub fn with_bins(bin_count: usize) -> Self {
        Self {
            bin_count,
            ..Self::default()
        }
    }

    /// FFT window size (two time-domain samples per output bin)
    pub fn fft_size(&self) -> usize {
        self.bin_count * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fft_size_is_twice_bins() {
        assert_eq!(AnalyserConfig::with_bins(16).fft_size(), 32);
        assert_eq!(AnalyserConfig::with_bins(32).fft_size(), 64);
    }

    #[test]
    fn test_decibel_range_is_ordered() {
        let config = AnalyserConfig::default();
        assert!(config.min_decibels < config.max_decibels);
    }
}
