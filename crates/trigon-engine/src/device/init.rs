/// Adapter, device and surface settings for [`Gpu::new`](super::Gpu::new).
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Graphics APIs an adapter may come from.
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,

    /// Features and limits the device must provide. The default limits are
    /// the downlevel set, which GL 3.3-class hardware satisfies.
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Pick an sRGB surface format when one exists. Off by default, so shader
    /// colors reach the framebuffer unconverted.
    pub prefer_srgb: bool,

    /// Swap behavior. `Fifo` waits for vertical blank (vsync) and paces the
    /// frame loop; unsupported requests fall back to it.
    pub present_mode: wgpu::PresentMode,

    /// Surface alpha mode; the first supported one when unset or unsupported.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Hint only.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::default(),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            desired_maximum_frame_latency: 2,
        }
    }
}
