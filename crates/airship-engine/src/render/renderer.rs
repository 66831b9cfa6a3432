use std::rc::Rc;

use super::binding::VertexBinding;
use super::frame::Frame;
use super::material::Material;
use super::mesh::Mesh;
use super::pipeline::VariantKey;
use super::viewport::Viewport;
use crate::paint::Color;

/// Outcome of a draw call.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DrawStats {
    pub meshes_drawn: usize,
    pub meshes_skipped: usize,
}

impl std::ops::AddAssign for DrawStats {
    fn add_assign(&mut self, rhs: DrawStats) {
        self.meshes_drawn += rhs.meshes_drawn;
        self.meshes_skipped += rhs.meshes_skipped;
    }
}

struct PreparedDraw {
    pipeline: Rc<wgpu::RenderPipeline>,
    buffers: Vec<(Rc<wgpu::Buffer>, u64)>,
    vertex_count: u32,
}

/// Draws meshes with materials into a frame.
///
/// Each `draw` records one render pass. With `clear` set the pass starts by
/// clearing to the clear color, otherwise it loads what is already there.
#[derive(Debug)]
pub struct Renderer {
    clear_color: Color,
    viewport: Viewport,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            clear_color: Color::MAGENTA,
            viewport: Viewport::default(),
        }
    }

    /// Sets the drawable area in physical pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        log::debug!("renderer viewport {width}x{height}");
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Clears the frame to the clear color.
    pub fn clear(&self, frame: &mut Frame<'_>) {
        self.record(frame, std::iter::empty(), None, true);
    }

    /// Draws one mesh.
    ///
    /// Material and `Buffer::upload` writes are recorded into the frame's
    /// encoder, so each draw sees the values set before it was recorded.
    pub fn draw(&self, frame: &mut Frame<'_>, mesh: &Mesh, material: &mut Material, clear: bool) -> DrawStats {
        self.record(frame, std::iter::once(mesh), Some(material), clear)
    }

    /// Draws every mesh with the same material in one render pass.
    ///
    /// Meshes without vertices are skipped silently; meshes that do not fit
    /// the pipeline are skipped with a warning.
    pub fn draw_all<'m, I>(
        &self,
        frame: &mut Frame<'_>,
        meshes: I,
        material: &mut Material,
        clear: bool,
    ) -> DrawStats
    where
        I: IntoIterator<Item = &'m Mesh>,
    {
        self.record(frame, meshes, Some(material), clear)
    }

    fn record<'m, I>(
        &self,
        frame: &mut Frame<'_>,
        meshes: I,
        mut material: Option<&mut Material>,
        clear: bool,
    ) -> DrawStats
    where
        I: IntoIterator<Item = &'m Mesh>,
    {
        let ctx = frame.ctx;
        let mut stats = DrawStats::default();
        let mut draws: Vec<PreparedDraw> = Vec::new();

        if let Some(material) = material.as_deref_mut() {
            material.prepare(&ctx, frame.target.encoder);
            let pipeline = Rc::clone(material.pipeline());

            for mesh in meshes {
                let vertex_count = mesh.vertex_count();
                if vertex_count == 0 {
                    stats.meshes_skipped += 1;
                    continue;
                }

                let binding = match VertexBinding::resolve(pipeline.attributes(), mesh)
                    .and_then(|b| b.check_sizes(vertex_count).map(|_| b))
                {
                    Ok(b) => b,
                    Err(e) => {
                        log::warn!("skipping mesh: {e}");
                        stats.meshes_skipped += 1;
                        continue;
                    }
                };

                let buffers: Option<Vec<_>> = binding
                    .slots()
                    .iter()
                    .map(|s| s.buffer.raw().map(|raw| (raw, s.base_offset)))
                    .collect();
                let Some(buffers) = buffers else {
                    log::warn!("skipping mesh: vertex buffer was never uploaded");
                    stats.meshes_skipped += 1;
                    continue;
                };

                let key = VariantKey {
                    slots: binding.layouts(),
                    target: ctx.surface_format,
                };

                draws.push(PreparedDraw {
                    pipeline: pipeline.variant(ctx.device, &key),
                    buffers,
                    vertex_count,
                });
            }
        }

        let load = if clear {
            wgpu::LoadOp::Clear(self.clear_color.into())
        } else {
            wgpu::LoadOp::Load
        };

        let target = &mut frame.target;
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("airship draw pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if draws.is_empty() {
            return stats;
        }

        if let Some(vp) = self.viewport.fit(target.size) {
            rpass.set_viewport(0.0, 0.0, vp.width as f32, vp.height as f32, 0.0, 1.0);
        }

        let bind_group = material.as_deref().and_then(|m| m.bind_group());

        for draw in &draws {
            rpass.set_pipeline(&draw.pipeline);
            if let Some(bg) = bind_group {
                rpass.set_bind_group(0, bg, &[]);
            }
            for (slot, (buffer, base)) in draw.buffers.iter().enumerate() {
                rpass.set_vertex_buffer(slot as u32, buffer.slice(*base..));
            }
            rpass.draw(0..draw.vertex_count, 0..1);
            stats.meshes_drawn += 1;
        }

        stats
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
