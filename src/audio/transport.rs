//! Looping playback transport shared with the audio callback.

use std::collections::VecDeque;

use super::loader::AudioData;

/// Two-state playback machine, initially paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
}

impl PlaybackState {
    /// The other state
    pub fn toggled(self) -> Self {
        match self {
            Self::Paused => Self::Playing,
            Self::Playing => Self::Paused,
        }
    }

    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// Playback cursor over a decoded track plus a tap of recent output
pub struct Transport {
    track: AudioData,
    state: PlaybackState,
    /// Position in track frames (fractional for rate conversion)
    cursor: f64,
    /// Most recent mono output samples, oldest first
    tap: VecDeque<f32>,
    tap_capacity: usize,
}

impl Transport {
    /// Create a paused transport; `tap_capacity` is the analysis window length
    pub fn new(track: AudioData, tap_capacity: usize) -> Self {
        Self {
            track,
            state: PlaybackState::Paused,
            cursor: 0.0,
            tap: VecDeque::with_capacity(tap_capacity),
            tap_capacity,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Flip between playing and paused, returning the new state
    pub fn toggle(&mut self) -> PlaybackState {
        self.state = self.state.toggled();
        self.state
    }

    /// Elapsed position in seconds
    pub fn current_time(&self) -> f64 {
        if self.track.sample_rate == 0 {
            return 0.0;
        }
        self.cursor / self.track.sample_rate as f64
    }

    /// Track length in seconds
    pub fn duration(&self) -> f64 {
        self.track.duration()
    }

    /// Fill an interleaved output buffer and feed the analysis tap.
    ///
    /// While paused, or for an empty track, the output is silence.
    pub fn render(&mut self, out: &mut [f32], out_channels: usize, out_rate: u32) {
        if out_channels == 0 {
            return;
        }

        let frames = self.track.num_frames();
        if !self.state.is_playing() || frames == 0 || out_rate == 0 {
            out.iter_mut().for_each(|s| *s = 0.0);
            for _ in 0..out.len() / out_channels {
                self.push_tap(0.0);
            }
            return;
        }

        let step = self.track.sample_rate as f64 / out_rate as f64;
        let track_channels = self.track.channels;

        for frame in out.chunks_mut(out_channels) {
            let index = self.cursor.floor() as usize;
            let next = if index + 1 < frames { index + 1 } else { 0 };
            let frac = (self.cursor - index as f64) as f32;

            let mut mono = 0.0;
            for channel in 0..track_channels {
                let a = self.track.sample(index, channel);
                let b = self.track.sample(next, channel);
                mono += a + (b - a) * frac;
            }
            mono /= track_channels as f32;

            for (c, slot) in frame.iter_mut().enumerate() {
                let channel = c % track_channels;
                let a = self.track.sample(index, channel);
                let b = self.track.sample(next, channel);
                *slot = a + (b - a) * frac;
            }

            self.push_tap(mono);

            self.cursor += step;
            if self.cursor >= frames as f64 {
                self.cursor -= frames as f64;
            }
        }
    }

    /// Copy the tap contents, oldest first, into `dst`
    pub fn recent_samples(&self, dst: &mut Vec<f32>) {
        dst.clear();
        dst.extend(self.tap.iter().copied());
    }

    fn push_tap(&mut self, sample: f32) {
        if self.tap_capacity == 0 {
            return;
        }
        if self.tap.len() == self.tap_capacity {
            self.tap.pop_front();
        }
        self.tap.push_back(sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize, channels: usize, sample_rate: u32) -> AudioData {
        AudioData {
            samples: (0..frames * channels)
                .map(|i| (i / channels) as f32 / frames as f32)
                .collect(),
            sample_rate,
            channels,
        }
    }

    #[test]
    fn test_initial_state_is_paused() {
        let transport = Transport::new(ramp(4, 1, 4), 8);
        assert_eq!(transport.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_double_toggle_restores_state() {
        let mut transport = Transport::new(ramp(4, 1, 4), 8);
        let original = transport.state();
        assert_eq!(transport.toggle(), PlaybackState::Playing);
        assert_eq!(transport.toggle(), original);

        assert_eq!(PlaybackState::Playing.toggled().toggled(), PlaybackState::Playing);
    }

    #[test]
    fn test_paused_renders_silence_and_holds_cursor() {
        let mut transport = Transport::new(ramp(8, 1, 8), 8);
        let mut out = [1.0f32; 8];
        transport.render(&mut out, 2, 8);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(transport.current_time(), 0.0);

        let mut tap = Vec::new();
        transport.recent_samples(&mut tap);
        assert_eq!(tap, vec![0.0; 4]);
    }

    #[test]
    fn test_mono_track_duplicates_to_stereo() {
        let mut transport = Transport::new(ramp(4, 1, 4), 8);
        transport.toggle();
        let mut out = [0.0f32; 8];
        transport.render(&mut out, 2, 4);
        assert_eq!(out, [0.0, 0.0, 0.25, 0.25, 0.5, 0.5, 0.75, 0.75]);
    }

    #[test]
    fn test_playback_loops_to_start() {
        let mut transport = Transport::new(ramp(4, 1, 4), 16);
        transport.toggle();
        let mut out = [0.0f32; 6];
        transport.render(&mut out, 1, 4);
        assert_eq!(out, [0.0, 0.25, 0.5, 0.75, 0.0, 0.25]);
        assert!((transport.current_time() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rate_conversion_interpolates() {
        // Track at half the device rate advances half a frame per output frame
        let mut transport = Transport::new(ramp(4, 1, 2), 16);
        transport.toggle();
        let mut out = [0.0f32; 3];
        transport.render(&mut out, 1, 4);
        assert_eq!(out, [0.0, 0.125, 0.25]);
    }

    #[test]
    fn test_tap_keeps_most_recent_window() {
        let mut transport = Transport::new(ramp(8, 2, 8), 3);
        transport.toggle();
        let mut out = [0.0f32; 10];
        transport.render(&mut out, 2, 8);

        let mut tap = Vec::new();
        transport.recent_samples(&mut tap);
        assert_eq!(tap, vec![0.25, 0.375, 0.5]);
    }

    #[test]
    fn test_empty_track_is_silent() {
        let empty = AudioData {
            samples: Vec::new(),
            sample_rate: 44100,
            channels: 2,
        };
        let mut transport = Transport::new(empty, 4);
        transport.toggle();
        let mut out = [1.0f32; 4];
        transport.render(&mut out, 2, 44100);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(transport.duration(), 0.0);
    }
}
