use std::path::PathBuf;

use super::buffer::BufferId;
use super::format::VertexFormat;
use super::shader::ShaderStage;

/// Errors raised while building render resources.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to read shader `{}`", path.display())]
    ShaderIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("expected a {expected} shader, got a {found} shader")]
    StageMismatch {
        expected: ShaderStage,
        found: ShaderStage,
    },

    #[error("vertex attribute `{0}` declared twice")]
    DuplicateAttributeName(String),

    #[error("vertex attribute location {0} used twice")]
    DuplicateAttributeLocation(u32),

    #[error("uniform `{0}` declared twice")]
    DuplicateUniform(String),

    #[error("pipeline has no uniform `{0}`")]
    UnknownUniform(String),

    #[error("uniform `{name}` is {expected}, got {found}")]
    UniformTypeMismatch {
        name: String,
        expected: VertexFormat,
        found: VertexFormat,
    },
}

/// Why a mesh cannot be drawn with a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("mesh has no stream for attribute `{attribute}`")]
    MissingStream { attribute: String },

    #[error("stream `{attribute}` is {found}, pipeline expects {expected}")]
    FormatMismatch {
        attribute: String,
        expected: VertexFormat,
        found: VertexFormat,
    },

    #[error("stream `{attribute}` has stride {stride} / offset {offset}; both must be multiples of 4")]
    Misaligned {
        attribute: String,
        stride: u32,
        offset: u32,
    },

    #[error("stream `{attribute}` reads {size} bytes at offset {offset}, past its stride {stride}")]
    AttributeOutsideStride {
        attribute: String,
        offset: u32,
        size: u32,
        stride: u32,
    },

    #[error("mesh needs {count} vertex buffers, at most {max} are supported")]
    TooManyBuffers { count: usize, max: usize },

    #[error("{buffer} holds {available} bytes, {required} needed")]
    BufferTooSmall {
        buffer: BufferId,
        required: u64,
        available: u64,
    },
}
