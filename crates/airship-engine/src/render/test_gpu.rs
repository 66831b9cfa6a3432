//! Device fixture for render tests, backed by wgpu's noop backend.
//!
//! wgpu-core still validates every call; nothing is executed, so tests can
//! only observe CPU-side state.

use std::rc::Rc;

use super::buffer::Buffer;
use super::ctx::{RenderCtx, RenderTarget};
use super::format::VertexFormat;
use super::frame::Frame;
use super::mesh::{Mesh, VertexAttributeStream};
use super::pipeline::{Pipeline, VertexAttributeDesc};
use super::renderer::Renderer;
use super::shader::{Shader, ShaderStage};
use super::uniform::UniformDesc;

pub(crate) const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub(crate) const TARGET_SIZE: (u32, u32) = (64, 64);

const TINT_VS: &str = r#"
struct Params { tint: vec4<f32> };
@group(0) @binding(0) var<uniform> params: Params;

@vertex
fn main(@location(0) pos: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos, 0.0, 1.0);
}
"#;

const TINT_FS: &str = r#"
struct Params { tint: vec4<f32> };
@group(0) @binding(0) var<uniform> params: Params;

@fragment
fn main() -> @location(0) vec4<f32> {
    return params.tint;
}
"#;

pub(crate) struct TestGpu {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub view: wgpu::TextureView,
}

impl TestGpu {
    pub fn new() -> Self {
        let (device, queue) = wgpu::Device::noop(&wgpu::DeviceDescriptor::default());
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test target"),
            size: wgpu::Extent3d {
                width: TARGET_SIZE.0,
                height: TARGET_SIZE.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { device, queue, view }
    }

    pub fn ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, TARGET_FORMAT)
    }

    pub fn encoder(&self) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("test encoder") })
    }

    /// Opens a frame on the test target, records into it with `f`, then
    /// submits.
    pub fn frame<R>(&self, renderer: &Renderer, f: impl FnOnce(&mut Frame<'_>) -> R) -> R {
        let mut encoder = self.encoder();
        let out = {
            let target = RenderTarget::new(&mut encoder, &self.view, TARGET_SIZE);
            let mut frame = Frame::new(self.ctx(), target, renderer);
            f(&mut frame)
        };
        self.queue.submit(Some(encoder.finish()));
        out
    }

    /// Pipeline reading `pos` (Float2) with one `tint` (Float4) uniform.
    pub fn tint_pipeline(&self) -> Rc<Pipeline> {
        let ctx = self.ctx();
        let vs = Shader::new(&ctx, ShaderStage::Vertex, TINT_VS);
        let fs = Shader::new(&ctx, ShaderStage::Fragment, TINT_FS);
        let pipeline = Pipeline::with_uniforms(
            &ctx,
            &vs,
            &fs,
            vec![VertexAttributeDesc::new("pos", 0, VertexFormat::Float2)],
            vec![UniformDesc::new("tint", VertexFormat::Float4)],
        );
        Rc::new(pipeline.unwrap())
    }

    /// Three-vertex mesh with an uploaded `pos` stream.
    pub fn triangle(&self) -> Mesh {
        let buffer = Buffer::new();
        buffer.update_slice(&self.ctx(), &[[0.0f32, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        let mut mesh = Mesh::new();
        mesh.set_attribute_stream("pos", VertexAttributeStream::packed(buffer, VertexFormat::Float2));
        mesh.set_vertex_count(3);
        mesh
    }
}
