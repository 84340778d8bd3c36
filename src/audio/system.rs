//! Audio system managing the output stream, transport, and analysis.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use std::sync::Arc;

use super::analyser::{AnalyserError, FrequencyAnalyser};
use super::loader::AudioData;
use super::transport::{PlaybackState, Transport};
use super::SpectrumSource;
use crate::params::AnalyserConfig;

/// Errors raised while opening or driving the output stream.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("No audio output device found")]
    NoDevice,
    #[error("Failed to get audio config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("Failed to build audio stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("Failed to start audio stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
    #[error("Failed to suspend audio stream: {0}")]
    Pause(#[from] cpal::PauseStreamError),
    #[error(transparent)]
    Analyser(#[from] AnalyserError),
}

/// Output stream state, mirroring a browser audio context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextState {
    Suspended,
    Running,
}

/// Audio system: looping playback of one track plus per-frame analysis
pub struct AudioSystem {
    /// Playback cursor shared with the output callback
    transport: Arc<Mutex<Transport>>,

    analyser: FrequencyAnalyser,

    /// Scratch copy of the transport tap
    window: Vec<f32>,

    context: ContextState,

    /// Audio output stream (kept alive)
    stream: cpal::Stream,
}

impl AudioSystem {
    /// Open the default output device for `track`.
    ///
    /// The stream starts suspended; the first `toggle_playback` resumes it.
    pub fn new(track: AudioData, analyser_config: AnalyserConfig) -> Result<Self, OutputError> {
        let analyser = FrequencyAnalyser::new(analyser_config)?;
        let transport = Arc::new(Mutex::new(Transport::new(track, analyser.fft_size())));
        let transport_callback = Arc::clone(&transport);

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(OutputError::NoDevice)?;
        let config = device.default_output_config()?;

        let channels = config.channels() as usize;
        let sample_rate = config.sample_rate().0;
        log::info!(
            "Audio: {} @ {}Hz, {} channel(s)",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels
        );

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                transport_callback.lock().render(data, channels, sample_rate);
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )?;

        // Some hosts start streams on creation
        stream.pause()?;

        Ok(Self {
            transport,
            window: Vec::with_capacity(analyser.fft_size()),
            analyser,
            context: ContextState::Suspended,
            stream,
        })
    }

    /// Play/pause toggle; resumes the suspended output on first use
    pub fn toggle_playback(&mut self) -> Result<PlaybackState, OutputError> {
        if self.context == ContextState::Suspended {
            self.stream.play()?;
            self.context = ContextState::Running;
            log::debug!("Audio output resumed");
        }

        let state = self.transport.lock().toggle();
        log::info!("Playback {:?}", state);
        Ok(state)
    }

    pub fn state(&self) -> PlaybackState {
        self.transport.lock().state()
    }

    /// (elapsed, duration) in seconds
    pub fn times(&self) -> (f64, f64) {
        let transport = self.transport.lock();
        (transport.current_time(), transport.duration())
    }
}

impl SpectrumSource for AudioSystem {
    fn bin_count(&self) -> usize {
        self.analyser.bin_count()
    }

    fn read_byte_frequency_data(&mut self, out: &mut [u8]) {
        self.transport.lock().recent_samples(&mut self.window);
        self.analyser.byte_frequency_data(&self.window, out);
    }
}
