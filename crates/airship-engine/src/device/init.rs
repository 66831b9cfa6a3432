/// Adapter, device and surface preferences for the main window.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends the instance may pick from.
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,

    /// Pick an sRGB swapchain format when the surface offers one.
    pub prefer_srgb: bool,
    /// FIFO is the only mode guaranteed on every backend.
    pub present_mode: wgpu::PresentMode,
    /// Falls back to the first supported mode when unsupported.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,
    /// Hint only.
    pub max_frame_latency: u32,

    pub features: wgpu::Features,
    pub limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            max_frame_latency: 2,
            features: wgpu::Features::empty(),
            limits: wgpu::Limits::default(),
        }
    }
}

impl GpuInit {
    /// Present without waiting for vblank where the surface allows it.
    pub fn without_vsync(mut self) -> Self {
        self.present_mode = wgpu::PresentMode::AutoNoVsync;
        self
    }

    /// Prefer the integrated GPU, e.g. on battery.
    pub fn low_power(mut self) -> Self {
        self.power_preference = wgpu::PowerPreference::LowPower;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_only_touch_their_field() {
        let init = GpuInit::default().without_vsync().low_power();
        assert_eq!(init.present_mode, wgpu::PresentMode::AutoNoVsync);
        assert_eq!(init.power_preference, wgpu::PowerPreference::LowPower);
        assert!(init.prefer_srgb);
        assert_eq!(init.max_frame_latency, 2);
    }
}
