use std::fmt;

/// Scalar layout of a vertex attribute or uniform.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexFormat {
    Float,
    Float2,
    Float3,
    Float4,
}

impl VertexFormat {
    pub const fn components(self) -> u32 {
        match self {
            VertexFormat::Float => 1,
            VertexFormat::Float2 => 2,
            VertexFormat::Float3 => 3,
            VertexFormat::Float4 => 4,
        }
    }

    /// Size in bytes.
    pub const fn size(self) -> u32 {
        self.components() * 4
    }

    /// Alignment inside a WGSL uniform block.
    pub const fn uniform_align(self) -> u32 {
        match self {
            VertexFormat::Float => 4,
            VertexFormat::Float2 => 8,
            VertexFormat::Float3 | VertexFormat::Float4 => 16,
        }
    }

    pub const fn to_wgpu(self) -> wgpu::VertexFormat {
        match self {
            VertexFormat::Float => wgpu::VertexFormat::Float32,
            VertexFormat::Float2 => wgpu::VertexFormat::Float32x2,
            VertexFormat::Float3 => wgpu::VertexFormat::Float32x3,
            VertexFormat::Float4 => wgpu::VertexFormat::Float32x4,
        }
    }

    /// WGSL spelling, used in diagnostics.
    pub const fn wgsl_name(self) -> &'static str {
        match self {
            VertexFormat::Float => "f32",
            VertexFormat::Float2 => "vec2<f32>",
            VertexFormat::Float3 => "vec3<f32>",
            VertexFormat::Float4 => "vec4<f32>",
        }
    }
}

impl fmt::Display for VertexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wgsl_name())
    }
}
