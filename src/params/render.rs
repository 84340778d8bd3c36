//! Window and camera configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Initial window width (pixels)
    pub window_width: u32,

    /// Initial window height (pixels)
    pub window_height: u32,

    /// Window title prefix, followed by the time display
    pub title: String,

    /// Camera distance from the bar plane along +Z
    pub camera_z: f32,

    /// Near clipping plane
    pub near_plane: f32,

    /// Far clipping plane
    pub far_plane: f32,

    /// Clear colour behind the bars
    pub clear_color: wgpu::Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            title: "barscope".to_string(),
            camera_z: 5.0,
            near_plane: 1.0,
            far_plane: 1000.0,
            clear_color: wgpu::Color::BLACK,
        }
    }
}
