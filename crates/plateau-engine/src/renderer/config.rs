use std::time::Duration;

/// Renderer configuration.
///
/// Keep this structure stable and minimal.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Number of frame slots the CPU may record ahead of the GPU.
    pub frames_in_flight: usize,

    /// Upper bound on live scene objects (renderables and anchors).
    pub max_objects: u32,

    /// Size of the shared mesh buffer in bytes.
    pub mesh_arena_capacity: u64,

    /// Longest wait on a frame slot's fence before giving up.
    pub fence_timeout: Duration,

    /// Background color of the on-screen pass.
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: 2,
            max_objects: 100,
            mesh_arena_capacity: 256 * 1024 * 1024,
            fence_timeout: Duration::from_secs(5),
            clear_color: wgpu::Color {
                r: 0.02,
                g: 0.02,
                b: 0.03,
                a: 1.0,
            },
        }
    }
}
