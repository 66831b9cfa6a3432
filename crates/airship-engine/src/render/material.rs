use std::rc::Rc;

use super::buffer::record_copy;
use super::ctx::RenderCtx;
use super::error::RenderError;
use super::pipeline::Pipeline;
use super::uniform::Uniform;

struct MaterialGpu {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// A pipeline plus values for its uniforms.
///
/// Uniform writes go to a CPU copy of the block; it is uploaded at most once
/// per draw, and only after a change. The upload is recorded into the frame's
/// encoder ahead of the draw's render pass, so changing a uniform between two
/// draws of one frame affects only the later draw.
pub struct Material {
    pipeline: Rc<Pipeline>,
    staging: Vec<u8>,
    dirty: bool,
    gpu: Option<MaterialGpu>,
}

impl Material {
    /// Material with every uniform zeroed.
    pub fn new(pipeline: Rc<Pipeline>) -> Self {
        let size = pipeline.uniform_size() as usize;
        Self {
            pipeline,
            staging: vec![0; size],
            dirty: size > 0,
            gpu: None,
        }
    }

    pub fn pipeline(&self) -> &Rc<Pipeline> {
        &self.pipeline
    }

    /// Sets uniform `name`. The value's format must match the declaration.
    pub fn set_uniform(&mut self, name: &str, value: impl Uniform) -> Result<(), RenderError> {
        self.pipeline
            .uniform_layout()
            .write(&mut self.staging, name, value.to_uniform())?;
        self.dirty = true;
        Ok(())
    }

    /// CPU copy of the uniform block.
    pub fn uniform_bytes(&self) -> &[u8] {
        &self.staging
    }

    /// True when the CPU copy changed since the last upload.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Creates GPU resources on first use and records an upload of the block
    /// into `encoder` if it changed.
    pub(crate) fn prepare(&mut self, ctx: &RenderCtx<'_>, encoder: &mut wgpu::CommandEncoder) {
        let Some(bgl) = self.pipeline.bind_group_layout() else {
            return;
        };

        if self.gpu.is_none() {
            let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("airship material ubo"),
                size: self.staging.len() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("airship material bind group"),
                layout: bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });

            self.gpu = Some(MaterialGpu { buffer, bind_group });
            self.dirty = true;
        }

        if !self.dirty {
            return;
        }
        if let Some(gpu) = &self.gpu {
            record_copy(ctx.device, encoder, &gpu.buffer, &self.staging);
            self.dirty = false;
        }
    }

    pub(crate) fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|g| &g.bind_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;
    use crate::render::test_gpu::TestGpu;
    use crate::render::{DrawStats, Renderer};

    #[test]
    fn starts_dirty_and_zeroed() {
        let gpu = TestGpu::new();
        let material = Material::new(gpu.tint_pipeline());
        assert!(material.is_dirty());
        assert_eq!(material.uniform_bytes(), &[0u8; 16]);
        assert!(material.bind_group().is_none());
    }

    #[test]
    fn uploads_once_then_stays_clean() {
        let gpu = TestGpu::new();
        let renderer = Renderer::new();
        let mesh = gpu.triangle();
        let mut material = Material::new(gpu.tint_pipeline());
        material.set_uniform("tint", Color::RED).unwrap();

        let stats = gpu.frame(&renderer, |frame| frame.draw(&mesh, &mut material, true));
        assert_eq!(stats, DrawStats { meshes_drawn: 1, meshes_skipped: 0 });
        assert!(!material.is_dirty());
        assert!(material.bind_group().is_some());

        gpu.frame(&renderer, |frame| frame.draw(&mesh, &mut material, false));
        assert!(!material.is_dirty());
        assert_eq!(&material.uniform_bytes()[..4], bytemuck::bytes_of(&1.0f32));
    }

    #[test]
    fn changes_between_draws_of_one_frame_are_uploaded() {
        let gpu = TestGpu::new();
        let renderer = Renderer::new();
        let mesh = gpu.triangle();
        let mut material = Material::new(gpu.tint_pipeline());

        gpu.frame(&renderer, |frame| {
            material.set_uniform("tint", Color::RED).unwrap();
            frame.draw(&mesh, &mut material, true);
            assert!(!material.is_dirty());

            material.set_uniform("tint", Color::BLUE).unwrap();
            assert!(material.is_dirty());
            frame.draw(&mesh, &mut material, false);
            assert!(!material.is_dirty());
        });
    }

    #[test]
    fn rejected_writes_leave_it_clean() {
        let gpu = TestGpu::new();
        let renderer = Renderer::new();
        let mesh = gpu.triangle();
        let mut material = Material::new(gpu.tint_pipeline());
        gpu.frame(&renderer, |frame| frame.draw(&mesh, &mut material, true));

        let err = material.set_uniform("glow", 1.0f32).unwrap_err();
        assert!(matches!(err, RenderError::UnknownUniform(n) if n == "glow"));
        let err = material.set_uniform("tint", 1.0f32).unwrap_err();
        assert!(matches!(err, RenderError::UniformTypeMismatch { .. }));
        assert!(!material.is_dirty());
    }
}
