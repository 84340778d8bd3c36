//! barscope library - audio-reactive frequency bar equalizer

pub mod audio;
pub mod cli;
pub mod params;
pub mod render_loop;
pub mod rendering;
pub mod scene;
pub mod time_display;
