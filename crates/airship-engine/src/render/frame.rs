use super::ctx::{RenderCtx, RenderTarget};
use super::material::Material;
use super::mesh::Mesh;
use super::renderer::{DrawStats, Renderer};

/// One acquired surface texture being recorded into.
///
/// Convenience methods forward to the renderer the frame was opened with.
pub struct Frame<'a> {
    pub(crate) ctx: RenderCtx<'a>,
    pub(crate) target: RenderTarget<'a>,
    renderer: &'a Renderer,
}

impl<'a> Frame<'a> {
    pub fn new(ctx: RenderCtx<'a>, target: RenderTarget<'a>, renderer: &'a Renderer) -> Self {
        Self {
            ctx,
            target,
            renderer,
        }
    }

    /// Device access for uploading data mid-frame.
    pub fn ctx(&self) -> &RenderCtx<'a> {
        &self.ctx
    }

    pub fn renderer(&self) -> &'a Renderer {
        self.renderer
    }

    /// Target size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        self.target.size
    }

    pub fn clear(&mut self) {
        let renderer = self.renderer;
        renderer.clear(self);
    }

    pub fn draw(&mut self, mesh: &Mesh, material: &mut Material, clear: bool) -> DrawStats {
        let renderer = self.renderer;
        renderer.draw(self, mesh, material, clear)
    }

    pub fn draw_all<'m, I>(&mut self, meshes: I, material: &mut Material, clear: bool) -> DrawStats
    where
        I: IntoIterator<Item = &'m Mesh>,
    {
        let renderer = self.renderer;
        renderer.draw_all(self, meshes, material, clear)
    }
}
