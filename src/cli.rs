//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::params::RenderConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "barscope")]
#[command(about = "Audio-reactive frequency bar equalizer", long_about = None)]
pub struct Args {
    /// Audio file to play (WAV, MP3, FLAC, AAC)
    #[arg(value_name = "AUDIO", default_value = "audio/shiva.mp3")]
    pub audio: PathBuf,

    /// Initial window width; also picks the bar count (>600 px → 32 bars)
    #[arg(long, value_name = "PX", default_value_t = 1280)]
    pub width: u32,

    /// Initial window height
    #[arg(long, value_name = "PX", default_value_t = 720)]
    pub height: u32,

    /// Window title prefix
    #[arg(long, value_name = "TEXT", default_value = "barscope")]
    pub title: String,
}

impl Args {
    /// Rendering configuration with CLI overrides applied
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width.max(1),
            window_height: self.height.max(1),
            title: self.title.clone(),
            ..RenderConfig::default()
        }
    }
}
