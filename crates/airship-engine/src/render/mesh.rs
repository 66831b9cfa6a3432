use std::collections::BTreeMap;

use super::buffer::Buffer;
use super::format::VertexFormat;

/// Where one named attribute lives inside a buffer.
///
/// `stride` is the distance between consecutive vertices in bytes; 0 means
/// tightly packed (`format.size()`). `offset` is the byte offset of the first
/// element.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttributeStream {
    pub buffer: Buffer,
    pub stride: u32,
    pub offset: u32,
    pub format: VertexFormat,
}

impl VertexAttributeStream {
    pub fn new(buffer: Buffer, stride: u32, offset: u32, format: VertexFormat) -> Self {
        Self {
            buffer,
            stride,
            offset,
            format,
        }
    }

    /// Tightly packed stream starting at the beginning of `buffer`.
    pub fn packed(buffer: Buffer, format: VertexFormat) -> Self {
        Self::new(buffer, 0, 0, format)
    }

    /// Distance between vertices, resolving the packed (0) case.
    pub fn effective_stride(&self) -> u32 {
        if self.stride == 0 {
            self.format.size()
        } else {
            self.stride
        }
    }
}

/// Named attribute streams plus the number of vertices to draw.
///
/// Several streams may share one buffer (interleaved data) and one mesh may
/// read from several buffers.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    streams: BTreeMap<String, VertexAttributeStream>,
    vertex_count: u32,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or replaces) the stream feeding attribute `name`.
    pub fn set_attribute_stream(&mut self, name: impl Into<String>, stream: VertexAttributeStream) {
        self.streams.insert(name.into(), stream);
    }

    pub fn remove_attribute_stream(&mut self, name: &str) -> Option<VertexAttributeStream> {
        self.streams.remove(name)
    }

    /// Stream for `name`; logs a warning when there is none.
    pub fn stream(&self, name: &str) -> Option<&VertexAttributeStream> {
        let stream = self.streams.get(name);
        if stream.is_none() {
            log::warn!("vertex stream '{name}' not found");
        }
        stream
    }

    /// Lookup without the missing-stream warning.
    pub(crate) fn find_stream(&self, name: &str) -> Option<&VertexAttributeStream> {
        self.streams.get(name)
    }

    pub fn has_stream(&self, name: &str) -> bool {
        self.streams.contains_key(name)
    }

    pub fn streams(&self) -> impl Iterator<Item = (&str, &VertexAttributeStream)> {
        self.streams.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn set_vertex_count(&mut self, count: u32) {
        self.vertex_count = count;
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}
