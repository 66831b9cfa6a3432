use airship_core::coords::{Vec2, Vec3};

use super::error::RenderError;
use super::format::VertexFormat;
use crate::paint::Color;

/// A named uniform declared by a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDesc {
    pub name: String,
    pub format: VertexFormat,
}

impl UniformDesc {
    pub fn new(name: impl Into<String>, format: VertexFormat) -> Self {
        Self {
            name: name.into(),
            format,
        }
    }
}

/// A uniform value ready to be written into a uniform block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
}

impl UniformValue {
    pub fn format(&self) -> VertexFormat {
        match self {
            UniformValue::Float(_) => VertexFormat::Float,
            UniformValue::Float2(_) => VertexFormat::Float2,
            UniformValue::Float3(_) => VertexFormat::Float3,
            UniformValue::Float4(_) => VertexFormat::Float4,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            UniformValue::Float(v) => bytemuck::bytes_of(v),
            UniformValue::Float2(v) => bytemuck::cast_slice(v),
            UniformValue::Float3(v) => bytemuck::cast_slice(v),
            UniformValue::Float4(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Types that can be assigned to a material uniform.
///
/// Implement it for your own types to pass them to `Material::set_uniform`.
pub trait Uniform {
    fn to_uniform(&self) -> UniformValue;
}

impl Uniform for UniformValue {
    fn to_uniform(&self) -> UniformValue {
        *self
    }
}

impl Uniform for f32 {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Float(*self)
    }
}

impl Uniform for [f32; 2] {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Float2(*self)
    }
}

impl Uniform for [f32; 3] {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Float3(*self)
    }
}

impl Uniform for [f32; 4] {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Float4(*self)
    }
}

impl Uniform for Vec2 {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Float2([self.x, self.y])
    }
}

impl Uniform for Vec3 {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Float3([self.x, self.y, self.z])
    }
}

impl Uniform for Color {
    fn to_uniform(&self) -> UniformValue {
        UniformValue::Float4(self.to_array())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UniformField {
    pub name: String,
    pub format: VertexFormat,
    pub offset: u32,
}

/// Byte layout of a pipeline's uniform block (group 0, binding 0).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct UniformLayout {
    fields: Vec<UniformField>,
    size: u32,
}

#[inline]
fn align_up(n: u32, align: u32) -> u32 {
    n.div_ceil(align) * align
}

impl UniformLayout {
    /// Packs `uniforms` in declaration order with WGSL uniform alignment.
    pub fn new(uniforms: &[UniformDesc]) -> Result<Self, RenderError> {
        let mut fields: Vec<UniformField> = Vec::with_capacity(uniforms.len());
        let mut cursor = 0;

        for u in uniforms {
            if fields.iter().any(|f| f.name == u.name) {
                return Err(RenderError::DuplicateUniform(u.name.clone()));
            }
            let offset = align_up(cursor, u.format.uniform_align());
            cursor = offset + u.format.size();
            fields.push(UniformField {
                name: u.name.clone(),
                format: u.format,
                offset,
            });
        }

        Ok(Self {
            fields,
            size: align_up(cursor, 16),
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Writes `value` into `block` at the slot of `name`.
    pub fn write(&self, block: &mut [u8], name: &str, value: UniformValue) -> Result<(), RenderError> {
        let field = self
            .field(name)
            .ok_or_else(|| RenderError::UnknownUniform(name.to_owned()))?;

        if field.format != value.format() {
            return Err(RenderError::UniformTypeMismatch {
                name: name.to_owned(),
                expected: field.format,
                found: value.format(),
            });
        }

        let start = field.offset as usize;
        let bytes = value.as_bytes();
        block[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(fields: &[(&str, VertexFormat)]) -> UniformLayout {
        let descs: Vec<_> = fields.iter().map(|(n, f)| UniformDesc::new(*n, *f)).collect();
        UniformLayout::new(&descs).unwrap()
    }

    #[test]
    fn packs_with_wgsl_alignment() {
        let l = layout(&[
            ("time", VertexFormat::Float),
            ("offset", VertexFormat::Float3),
            ("scale", VertexFormat::Float2),
            ("tint", VertexFormat::Float4),
        ]);
        let offsets: Vec<_> = ["time", "offset", "scale", "tint"]
            .iter()
            .map(|n| l.field(n).unwrap().offset)
            .collect();
        assert_eq!(offsets, vec![0, 16, 32, 48]);
        assert_eq!(l.size(), 64);
    }

    #[test]
    fn scalar_fills_vec3_tail() {
        let l = layout(&[("dir", VertexFormat::Float3), ("power", VertexFormat::Float)]);
        assert_eq!(l.field("power").unwrap().offset, 12);
        assert_eq!(l.size(), 16);
    }

    #[test]
    fn empty_block_has_zero_size() {
        let l = layout(&[]);
        assert!(l.is_empty());
        assert_eq!(l.size(), 0);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let descs = [
            UniformDesc::new("tint", VertexFormat::Float4),
            UniformDesc::new("tint", VertexFormat::Float),
        ];
        assert!(matches!(
            UniformLayout::new(&descs),
            Err(RenderError::DuplicateUniform(n)) if n == "tint"
        ));
    }

    #[test]
    fn write_checks_name_and_type() {
        let l = layout(&[("time", VertexFormat::Float), ("tint", VertexFormat::Float4)]);
        let mut block = vec![0u8; l.size() as usize];

        l.write(&mut block, "tint", Color::ORANGE.to_uniform()).unwrap();
        let want: &[u8] = bytemuck::cast_slice(&[1.0f32, 0.5, 0.0, 1.0]);
        assert_eq!(&block[16..32], want);

        assert!(matches!(
            l.write(&mut block, "time", [1.0f32, 2.0].to_uniform()),
            Err(RenderError::UniformTypeMismatch { expected: VertexFormat::Float, found: VertexFormat::Float2, .. })
        ));
        assert!(matches!(
            l.write(&mut block, "nope", 1.0f32.to_uniform()),
            Err(RenderError::UnknownUniform(_))
        ));
    }
}
