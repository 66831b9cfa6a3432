//! GPU rendering.
//!
//! Meshes are sets of named vertex attribute streams living in shared GPU
//! buffers. A `Pipeline` declares which named attributes its vertex shader
//! reads; at draw time the renderer matches the two, groups streams into
//! vertex buffer slots and picks (or builds) the matching pipeline variant.
//!
//! Data flow per frame:
//! - `DynamicMesh`/`OwningStream` upload only data touched since the last sync
//! - `Material` uploads its uniform block only when a uniform changed, recorded
//!   into the frame ahead of the draw that reads it
//! - `Renderer::draw` records one render pass per call

mod binding;
mod buffer;
mod ctx;
mod dynamic_mesh;
mod error;
mod format;
mod frame;
mod material;
mod mesh;
mod pipeline;
mod renderer;
mod shader;
#[cfg(test)]
mod test_gpu;
mod uniform;
mod viewport;

pub use binding::{SlotAttribute, SlotLayout, VertexBinding, MAX_VERTEX_BUFFERS};
pub use buffer::{grow_capacity, Buffer, BufferId, MIN_BUFFER_SIZE};
pub use ctx::{RenderCtx, RenderTarget};
pub use dynamic_mesh::{DynamicMesh, OwningStream};
pub use error::{BindingError, RenderError};
pub use format::VertexFormat;
pub use frame::Frame;
pub use material::Material;
pub use mesh::{Mesh, VertexAttributeStream};
pub use pipeline::{Pipeline, VertexAttributeDesc};
pub use renderer::{DrawStats, Renderer};
pub use shader::{Shader, ShaderStage, DEFAULT_ENTRY_POINT};
pub use uniform::{Uniform, UniformDesc, UniformValue};
pub use viewport::Viewport;
