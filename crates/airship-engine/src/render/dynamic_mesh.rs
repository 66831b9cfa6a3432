use std::any::Any;
use std::collections::BTreeMap;
use std::mem;

use bytemuck::Pod;

use super::buffer::Buffer;
use super::ctx::RenderCtx;
use super::format::VertexFormat;
use super::frame::Frame;
use super::material::Material;
use super::mesh::{Mesh, VertexAttributeStream};
use super::renderer::{DrawStats, Renderer};

/// CPU-side vertex data that owns its GPU buffer.
///
/// Mutable access marks the data dirty; `sync` uploads it only then.
pub struct OwningStream<T: Pod> {
    data: Vec<T>,
    buffer: Buffer,
    format: VertexFormat,
    dirty: bool,
}

impl<T: Pod> OwningStream<T> {
    pub fn new(format: VertexFormat) -> Self {
        Self::with_data(format, Vec::new())
    }

    pub fn with_data(format: VertexFormat, data: Vec<T>) -> Self {
        debug_assert!(
            format.size() as usize <= mem::size_of::<T>(),
            "{format} does not fit in one element"
        );
        Self {
            data,
            buffer: Buffer::new(),
            format,
            dirty: true,
        }
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable access to the data; marks the stream dirty.
    pub fn data_mut(&mut self) -> &mut Vec<T> {
        self.dirty = true;
        &mut self.data
    }

    pub fn set_data(&mut self, data: Vec<T>) {
        self.data = data;
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Forces the next `sync` to upload.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Uploads the data through the queue if it changed since the last sync.
    pub fn sync(&mut self, ctx: &RenderCtx<'_>) {
        if !self.dirty {
            return;
        }
        self.buffer.update_slice(ctx, &self.data);
        self.dirty = false;
    }

    /// Like `sync`, recording the upload into the frame so draws already
    /// recorded keep the previous data.
    pub fn sync_frame(&mut self, frame: &mut Frame<'_>) {
        if !self.dirty {
            return;
        }
        self.buffer.upload_slice(frame, &self.data);
        self.dirty = false;
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn format(&self) -> VertexFormat {
        self.format
    }

    /// Stream descriptor reading one `T` per vertex.
    pub fn stream(&self) -> VertexAttributeStream {
        VertexAttributeStream::new(
            self.buffer.clone(),
            mem::size_of::<T>() as u32,
            0,
            self.format,
        )
    }
}

trait ErasedStream {
    fn sync(&mut self, ctx: &RenderCtx<'_>);
    fn sync_frame(&mut self, frame: &mut Frame<'_>);
    fn is_dirty(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Pod> ErasedStream for OwningStream<T> {
    fn sync(&mut self, ctx: &RenderCtx<'_>) {
        OwningStream::sync(self, ctx);
    }

    fn sync_frame(&mut self, frame: &mut Frame<'_>) {
        OwningStream::sync_frame(self, frame);
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A mesh whose streams own their CPU data.
///
/// Edit the data between frames; `draw` uploads whatever changed and draws
/// on top of the frame without clearing.
#[derive(Default)]
pub struct DynamicMesh {
    streams: BTreeMap<String, Box<dyn ErasedStream>>,
    mesh: Mesh,
}

impl DynamicMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stream of `T` feeding attribute `name`, replacing any stream of
    /// that name.
    pub fn add_stream<T: Pod>(&mut self, name: &str, format: VertexFormat) -> &mut OwningStream<T> {
        self.insert_stream(name, OwningStream::<T>::new(format))
    }

    /// Like `add_stream`, with initial data.
    pub fn add_stream_with<T: Pod>(
        &mut self,
        name: &str,
        format: VertexFormat,
        data: Vec<T>,
    ) -> &mut OwningStream<T> {
        self.insert_stream(name, OwningStream::with_data(format, data))
    }

    fn insert_stream<T: Pod>(&mut self, name: &str, stream: OwningStream<T>) -> &mut OwningStream<T> {
        self.mesh.set_attribute_stream(name, stream.stream());
        self.streams.insert(name.to_owned(), Box::new(stream));
        match self.stream_mut::<T>(name) {
            Some(s) => s,
            None => unreachable!("stream `{name}` was just inserted with this type"),
        }
    }

    /// Stream `name` as `T`; `None` when missing or of another type.
    pub fn stream<T: Pod>(&self, name: &str) -> Option<&OwningStream<T>> {
        self.streams.get(name)?.as_any().downcast_ref()
    }

    pub fn stream_mut<T: Pod>(&mut self, name: &str) -> Option<&mut OwningStream<T>> {
        self.streams.get_mut(name)?.as_any_mut().downcast_mut()
    }

    pub fn data<T: Pod>(&self, name: &str) -> Option<&[T]> {
        self.stream::<T>(name).map(|s| s.data())
    }

    /// Mutable data of stream `name`; marks it dirty.
    pub fn data_mut<T: Pod>(&mut self, name: &str) -> Option<&mut Vec<T>> {
        self.stream_mut::<T>(name).map(|s| s.data_mut())
    }

    pub fn has_dirty_streams(&self) -> bool {
        self.streams.values().any(|s| s.is_dirty())
    }

    pub fn set_vertex_count(&mut self, count: u32) {
        self.mesh.set_vertex_count(count);
    }

    pub fn vertex_count(&self) -> u32 {
        self.mesh.vertex_count()
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Uploads every dirty stream.
    pub fn sync(&mut self, ctx: &RenderCtx<'_>) {
        for stream in self.streams.values_mut() {
            stream.sync(ctx);
        }
    }

    /// Records uploads of every dirty stream into `frame`.
    pub fn sync_frame(&mut self, frame: &mut Frame<'_>) {
        for stream in self.streams.values_mut() {
            stream.sync_frame(frame);
        }
    }

    /// Syncs into the frame, then draws without clearing it.
    pub fn draw(&mut self, renderer: &Renderer, frame: &mut Frame<'_>, material: &mut Material) -> DrawStats {
        self.sync_frame(frame);
        renderer.draw(frame, &self.mesh, material, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_gpu::TestGpu;
    use airship_core::coords::{Vec2, Vec3};

    #[test]
    fn new_streams_start_dirty_and_register_on_mesh() {
        let mut dm = DynamicMesh::new();
        dm.add_stream_with("pos", VertexFormat::Float3, vec![Vec3::zero(); 3]);
        dm.set_vertex_count(3);

        assert!(dm.stream::<Vec3>("pos").unwrap().is_dirty());
        assert!(dm.has_dirty_streams());

        let s = dm.mesh().find_stream("pos").unwrap();
        assert_eq!(s.stride, 12);
        assert_eq!(s.offset, 0);
        assert_eq!(s.format, VertexFormat::Float3);
        assert_eq!(dm.vertex_count(), 3);
    }

    #[test]
    fn typed_access_checks_the_element_type() {
        let mut dm = DynamicMesh::new();
        dm.add_stream::<Vec2>("uv", VertexFormat::Float2);

        assert!(dm.stream::<Vec2>("uv").is_some());
        assert!(dm.stream::<Vec3>("uv").is_none());
        assert!(dm.data::<Vec2>("missing").is_none());

        dm.data_mut::<Vec2>("uv").unwrap().push(Vec2::new(1.0, 0.5));
        assert_eq!(dm.data::<Vec2>("uv").unwrap(), &[Vec2::new(1.0, 0.5)]);
    }

    #[test]
    fn mutation_marks_dirty() {
        let mut s = OwningStream::<[f32; 4]>::new(VertexFormat::Float4);
        s.dirty = false;
        assert!(!s.is_dirty());

        let _ = s.data();
        assert!(!s.is_dirty());

        s.data_mut().push([1.0; 4]);
        assert!(s.is_dirty());

        s.dirty = false;
        s.invalidate();
        assert!(s.is_dirty());
    }

    #[test]
    fn replacing_a_stream_rebinds_the_mesh() {
        let mut dm = DynamicMesh::new();
        let first = dm.add_stream::<Vec3>("pos", VertexFormat::Float3).buffer().id();
        let second = dm.add_stream::<Vec2>("pos", VertexFormat::Float2).buffer().id();

        assert_ne!(first, second);
        let s = dm.mesh().find_stream("pos").unwrap();
        assert_eq!(s.buffer.id(), second);
        assert_eq!(s.format, VertexFormat::Float2);
        assert!(dm.stream::<Vec3>("pos").is_none());
    }

    #[test]
    fn stream_uses_element_stride() {
        #[repr(C)]
        #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
        struct Vertex {
            pos: [f32; 3],
            color: [f32; 4],
        }

        let s = OwningStream::<Vertex>::new(VertexFormat::Float3);
        assert_eq!(s.stream().stride, 28);
    }

    #[test]
    fn sync_clears_dirty_and_skips_clean_streams() {
        let gpu = TestGpu::new();
        let ctx = gpu.ctx();
        let mut s = OwningStream::with_data(VertexFormat::Float2, vec![Vec2::new(0.0, 0.0); 3]);

        s.sync(&ctx);
        assert!(!s.is_dirty());
        assert_eq!(s.buffer().len(), 24);

        // Shrink the shared buffer behind the stream's back; a clean sync
        // must leave it alone.
        s.buffer().update(&ctx, &[0u8; 4]);
        s.sync(&ctx);
        assert_eq!(s.buffer().len(), 4);

        s.invalidate();
        s.sync(&ctx);
        assert_eq!(s.buffer().len(), 24);
        assert!(!s.is_dirty());
    }

    #[test]
    fn draw_uploads_dirty_streams_first() {
        let gpu = TestGpu::new();
        let renderer = Renderer::new();
        let mut material = Material::new(gpu.tint_pipeline());

        let mut dm = DynamicMesh::new();
        dm.add_stream_with(
            "pos",
            VertexFormat::Float2,
            vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
        );
        dm.set_vertex_count(3);

        let stats = gpu.frame(&renderer, |frame| dm.draw(&renderer, frame, &mut material));
        assert_eq!(stats, DrawStats { meshes_drawn: 1, meshes_skipped: 0 });
        assert!(!dm.has_dirty_streams());
        assert_eq!(dm.stream::<Vec2>("pos").unwrap().buffer().len(), 24);

        dm.data_mut::<Vec2>("pos").unwrap().push(Vec2::new(1.0, 1.0));
        dm.set_vertex_count(4);
        let stats = gpu.frame(&renderer, |frame| dm.draw(&renderer, frame, &mut material));
        assert_eq!(stats.meshes_drawn, 1);
        assert_eq!(dm.stream::<Vec2>("pos").unwrap().buffer().len(), 32);
    }
}
