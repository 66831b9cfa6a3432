use super::buffer::{Buffer, BufferId};
use super::error::BindingError;
use super::format::VertexFormat;
use super::mesh::Mesh;
use super::pipeline::VertexAttributeDesc;

/// Most vertex buffers a single draw may bind.
pub const MAX_VERTEX_BUFFERS: usize = 8;

/// One attribute as read from a vertex buffer slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotAttribute {
    pub location: u32,
    pub format: VertexFormat,
    pub offset: u32,
}

/// Layout of one vertex buffer slot. Part of a pipeline variant key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotLayout {
    pub stride: u32,
    pub attributes: Vec<SlotAttribute>,
}

impl SlotLayout {
    /// Bytes one vertex reads past its start.
    fn extent(&self) -> u64 {
        self.attributes
            .iter()
            .map(|a| a.offset as u64 + a.format.size() as u64)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BoundSlot {
    pub buffer: Buffer,
    /// Start of the slot's data inside `buffer`.
    pub base_offset: u64,
    pub layout: SlotLayout,
    packed: bool,
}

/// How a mesh's streams feed a pipeline's vertex attributes.
///
/// Streams sharing a buffer and stride are read through one slot, so
/// interleaved data costs one binding. Packed streams (stride 0) each get a
/// slot whose data starts at the stream offset.
#[derive(Debug, Clone)]
pub struct VertexBinding {
    slots: Vec<BoundSlot>,
}

impl VertexBinding {
    /// Resolves `attributes` (sorted by location) against `mesh`.
    ///
    /// Streams no attribute asks for are ignored.
    pub fn resolve(attributes: &[VertexAttributeDesc], mesh: &Mesh) -> Result<Self, BindingError> {
        let mut slots: Vec<BoundSlot> = Vec::new();

        for attr in attributes {
            let stream = mesh
                .find_stream(&attr.name)
                .ok_or_else(|| BindingError::MissingStream {
                    attribute: attr.name.clone(),
                })?;

            if stream.format != attr.format {
                return Err(BindingError::FormatMismatch {
                    attribute: attr.name.clone(),
                    expected: attr.format,
                    found: stream.format,
                });
            }

            if stream.stride % 4 != 0 || stream.offset % 4 != 0 {
                return Err(BindingError::Misaligned {
                    attribute: attr.name.clone(),
                    stride: stream.stride,
                    offset: stream.offset,
                });
            }

            let size = stream.format.size();
            if stream.stride > 0 && stream.offset as u64 + size as u64 > stream.stride as u64 {
                return Err(BindingError::AttributeOutsideStride {
                    attribute: attr.name.clone(),
                    offset: stream.offset,
                    size,
                    stride: stream.stride,
                });
            }

            if stream.stride == 0 {
                slots.push(BoundSlot {
                    buffer: stream.buffer.clone(),
                    base_offset: stream.offset as u64,
                    layout: SlotLayout {
                        stride: size,
                        attributes: vec![SlotAttribute {
                            location: attr.location,
                            format: attr.format,
                            offset: 0,
                        }],
                    },
                    packed: true,
                });
                continue;
            }

            let slot_attr = SlotAttribute {
                location: attr.location,
                format: attr.format,
                offset: stream.offset,
            };

            match slots
                .iter_mut()
                .find(|s| !s.packed && s.buffer == stream.buffer && s.layout.stride == stream.stride)
            {
                Some(slot) => slot.layout.attributes.push(slot_attr),
                None => slots.push(BoundSlot {
                    buffer: stream.buffer.clone(),
                    base_offset: 0,
                    layout: SlotLayout {
                        stride: stream.stride,
                        attributes: vec![slot_attr],
                    },
                    packed: false,
                }),
            }
        }

        if slots.len() > MAX_VERTEX_BUFFERS {
            return Err(BindingError::TooManyBuffers {
                count: slots.len(),
                max: MAX_VERTEX_BUFFERS,
            });
        }

        Ok(Self { slots })
    }

    /// Per-slot layouts, in slot order.
    pub fn layouts(&self) -> Vec<SlotLayout> {
        self.slots.iter().map(|s| s.layout.clone()).collect()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Bytes each slot's buffer must hold to draw `vertex_count` vertices.
    pub fn required_bytes(&self, vertex_count: u32) -> Vec<(BufferId, u64)> {
        self.slots
            .iter()
            .map(|s| {
                let bytes = match vertex_count {
                    0 => 0,
                    n => s.base_offset + s.layout.stride as u64 * (n as u64 - 1) + s.layout.extent(),
                };
                (s.buffer.id(), bytes)
            })
            .collect()
    }

    /// Fails when any slot's buffer holds less data than `vertex_count` needs.
    pub fn check_sizes(&self, vertex_count: u32) -> Result<(), BindingError> {
        for (slot, (buffer, required)) in self.slots.iter().zip(self.required_bytes(vertex_count)) {
            let available = slot.buffer.len();
            if available < required {
                return Err(BindingError::BufferTooSmall {
                    buffer,
                    required,
                    available,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn slots(&self) -> &[BoundSlot] {
        &self.slots
    }
}
