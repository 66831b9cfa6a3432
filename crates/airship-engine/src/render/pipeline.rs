use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::binding::SlotLayout;
use super::ctx::RenderCtx;
use super::error::RenderError;
use super::format::VertexFormat;
use super::shader::{Shader, ShaderStage};
use super::uniform::{UniformDesc, UniformLayout};

/// A per-vertex shader input: WGSL `@location(location)` fed by the mesh
/// stream called `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttributeDesc {
    pub name: String,
    pub location: u32,
    pub format: VertexFormat,
}

impl VertexAttributeDesc {
    pub fn new(name: impl Into<String>, location: u32, format: VertexFormat) -> Self {
        Self {
            name: name.into(),
            location,
            format,
        }
    }
}

/// Identifies one concrete `wgpu::RenderPipeline` built from a `Pipeline`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct VariantKey {
    pub slots: Vec<SlotLayout>,
    pub target: wgpu::TextureFormat,
}

/// Checks attribute declarations and returns them sorted by location.
pub(crate) fn validate_attributes(
    mut attributes: Vec<VertexAttributeDesc>,
) -> Result<Vec<VertexAttributeDesc>, RenderError> {
    for (i, a) in attributes.iter().enumerate() {
        for b in &attributes[..i] {
            if a.name == b.name {
                return Err(RenderError::DuplicateAttributeName(a.name.clone()));
            }
            if a.location == b.location {
                return Err(RenderError::DuplicateAttributeLocation(a.location));
            }
        }
    }
    attributes.sort_by_key(|a| a.location);
    Ok(attributes)
}

fn expect_stage(shader: &Shader, expected: ShaderStage) -> Result<(), RenderError> {
    if shader.stage() != expected {
        return Err(RenderError::StageMismatch {
            expected,
            found: shader.stage(),
        });
    }
    Ok(())
}

/// Vertex + fragment program with its declared inputs.
///
/// wgpu bakes vertex buffer layouts into the pipeline object, so the concrete
/// `wgpu::RenderPipeline` depends on how a mesh lays out its streams. One is
/// built lazily per (vertex layout, target format) and cached.
pub struct Pipeline {
    vertex: Shader,
    fragment: Shader,
    attributes: Vec<VertexAttributeDesc>,
    uniforms: UniformLayout,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    layout: wgpu::PipelineLayout,
    variants: RefCell<HashMap<VariantKey, Rc<wgpu::RenderPipeline>>>,
}

impl Pipeline {
    /// Pipeline without uniforms.
    pub fn new(
        ctx: &RenderCtx<'_>,
        vertex: &Shader,
        fragment: &Shader,
        attributes: Vec<VertexAttributeDesc>,
    ) -> Result<Self, RenderError> {
        Self::with_uniforms(ctx, vertex, fragment, attributes, Vec::new())
    }

    /// Pipeline whose uniforms live in one block at `@group(0) @binding(0)`,
    /// declared in the same order as `uniforms`.
    pub fn with_uniforms(
        ctx: &RenderCtx<'_>,
        vertex: &Shader,
        fragment: &Shader,
        attributes: Vec<VertexAttributeDesc>,
        uniforms: Vec<UniformDesc>,
    ) -> Result<Self, RenderError> {
        expect_stage(vertex, ShaderStage::Vertex)?;
        expect_stage(fragment, ShaderStage::Fragment)?;
        let attributes = validate_attributes(attributes)?;
        let uniforms = UniformLayout::new(&uniforms)?;

        let bind_group_layout = (!uniforms.is_empty()).then(|| {
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("airship material bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(uniforms.size() as u64),
                        },
                        count: None,
                    }],
                })
        });

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layout.iter().collect();
        let layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("airship pipeline layout"),
                bind_group_layouts: &bind_group_layouts,
                immediate_size: 0,
            });

        log::debug!(
            "pipeline created: {} attributes, {} uniform bytes",
            attributes.len(),
            uniforms.size()
        );

        Ok(Self {
            vertex: vertex.clone(),
            fragment: fragment.clone(),
            attributes,
            uniforms,
            bind_group_layout,
            layout,
            variants: RefCell::new(HashMap::new()),
        })
    }

    /// Declared attributes, sorted by location.
    pub fn attributes(&self) -> &[VertexAttributeDesc] {
        &self.attributes
    }

    /// Size of the uniform block in bytes (0 without uniforms).
    pub fn uniform_size(&self) -> u32 {
        self.uniforms.size()
    }

    /// Number of concrete pipelines built so far.
    pub fn variant_count(&self) -> usize {
        self.variants.borrow().len()
    }

    pub(crate) fn uniform_layout(&self) -> &UniformLayout {
        &self.uniforms
    }

    pub(crate) fn bind_group_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.bind_group_layout.as_ref()
    }

    /// Concrete pipeline for `key`, building it on first use.
    pub(crate) fn variant(&self, device: &wgpu::Device, key: &VariantKey) -> Rc<wgpu::RenderPipeline> {
        if let Some(p) = self.variants.borrow().get(key) {
            return Rc::clone(p);
        }

        let pipeline = Rc::new(self.build_variant(device, key));
        self.variants
            .borrow_mut()
            .insert(key.clone(), Rc::clone(&pipeline));
        pipeline
    }

    fn build_variant(&self, device: &wgpu::Device, key: &VariantKey) -> wgpu::RenderPipeline {
        let attribute_lists: Vec<Vec<wgpu::VertexAttribute>> = key
            .slots
            .iter()
            .map(|slot| {
                slot.attributes
                    .iter()
                    .map(|a| wgpu::VertexAttribute {
                        format: a.format.to_wgpu(),
                        offset: a.offset as u64,
                        shader_location: a.location,
                    })
                    .collect()
            })
            .collect();

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = key
            .slots
            .iter()
            .zip(&attribute_lists)
            .map(|(slot, attributes)| wgpu::VertexBufferLayout {
                array_stride: slot.stride as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attributes.as_slice(),
            })
            .collect();

        log::debug!("building pipeline variant: {} vertex buffers, {:?}", buffers.len(), key.target);

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("airship pipeline"),
            layout: Some(&self.layout),

            vertex: wgpu::VertexState {
                module: self.vertex.module(),
                entry_point: Some(self.vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: self.fragment.module(),
                entry_point: Some(self.fragment.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.target,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("attributes", &self.attributes)
            .field("uniform_size", &self.uniforms.size())
            .field("variants", &self.variant_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_are_sorted_by_location() {
        let attrs = validate_attributes(vec![
            VertexAttributeDesc::new("color", 1, VertexFormat::Float4),
            VertexAttributeDesc::new("pos", 0, VertexFormat::Float3),
        ])
        .unwrap();
        let names: Vec<_> = attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["pos", "color"]);
    }

    #[test]
    fn duplicate_attributes_are_rejected() {
        let err = validate_attributes(vec![
            VertexAttributeDesc::new("pos", 0, VertexFormat::Float3),
            VertexAttributeDesc::new("pos", 1, VertexFormat::Float3),
        ])
        .unwrap_err();
        assert!(matches!(err, RenderError::DuplicateAttributeName(n) if n == "pos"));

        let err = validate_attributes(vec![
            VertexAttributeDesc::new("pos", 0, VertexFormat::Float3),
            VertexAttributeDesc::new("color", 0, VertexFormat::Float4),
        ])
        .unwrap_err();
        assert!(matches!(err, RenderError::DuplicateAttributeLocation(0)));
    }
}
