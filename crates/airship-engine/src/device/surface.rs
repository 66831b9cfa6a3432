use winit::dpi::PhysicalSize;

/// What the runtime should do after frame acquisition failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Lost or outdated surface was configured again; the next frame can proceed.
    Reconfigured,
    /// Acquisition timed out; drop this frame.
    SkipFrame,
    /// Out of memory. The runtime stops.
    Fatal,
}

const SRGB_FORMATS: [wgpu::TextureFormat; 2] = [
    wgpu::TextureFormat::Bgra8UnormSrgb,
    wgpu::TextureFormat::Rgba8UnormSrgb,
];

/// First sRGB format the surface offers when preferred, else its first format.
pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let srgb = prefer_srgb
        .then(|| SRGB_FORMATS.into_iter().find(|f| caps.formats.contains(f)))
        .flatten();
    srgb.or_else(|| caps.formats.first().copied())
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;
    if new_size.width == 0 || new_size.height == 0 {
        log::debug!("surface resize to zero deferred");
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
}

pub(crate) fn classify_surface_error(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    use wgpu::SurfaceError as E;
    match err {
        E::Lost | E::Outdated => SurfaceErrorAction::Reconfigured,
        E::Timeout | E::Other => SurfaceErrorAction::SkipFrame,
        E::OutOfMemory => SurfaceErrorAction::Fatal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: &[wgpu::TextureFormat], alpha: &[wgpu::CompositeAlphaMode]) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats: formats.to_vec(),
            alpha_modes: alpha.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn surface_errors_map_to_actions() {
        use wgpu::SurfaceError as E;
        assert_eq!(classify_surface_error(&E::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(classify_surface_error(&E::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(classify_surface_error(&E::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(classify_surface_error(&E::Other), SurfaceErrorAction::SkipFrame);
        assert_eq!(classify_surface_error(&E::OutOfMemory), SurfaceErrorAction::Fatal);
    }

    #[test]
    fn srgb_format_preferred_when_offered() {
        use wgpu::TextureFormat as F;
        let c = caps(&[F::Bgra8Unorm, F::Rgba8UnormSrgb], &[]);
        assert_eq!(choose_surface_format(&c, true), Some(F::Rgba8UnormSrgb));
        assert_eq!(choose_surface_format(&c, false), Some(F::Bgra8Unorm));
        assert_eq!(choose_surface_format(&caps(&[], &[]), true), None);
    }

    #[test]
    fn unsupported_alpha_mode_falls_back() {
        use wgpu::CompositeAlphaMode as A;
        let c = caps(&[], &[A::Opaque, A::PreMultiplied]);
        assert_eq!(choose_alpha_mode(&c, Some(A::PreMultiplied)), A::PreMultiplied);
        assert_eq!(choose_alpha_mode(&c, Some(A::PostMultiplied)), A::Opaque);
        assert_eq!(choose_alpha_mode(&caps(&[], &[]), None), A::Auto);
    }
}
