use std::fmt;
use std::path::Path;
use std::rc::Rc;

use super::ctx::RenderCtx;
use super::error::RenderError;

/// Entry point used when none is given.
pub const DEFAULT_ENTRY_POINT: &str = "main";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A compiled WGSL module for one pipeline stage.
///
/// Compilation errors are validation errors of the device and abort through
/// wgpu's uncaptured-error handler.
#[derive(Debug, Clone)]
pub struct Shader {
    stage: ShaderStage,
    entry_point: String,
    module: Rc<wgpu::ShaderModule>,
}

impl Shader {
    /// Compiles `source` with entry point `main`.
    pub fn new(ctx: &RenderCtx<'_>, stage: ShaderStage, source: &str) -> Self {
        Self::with_entry_point(ctx, stage, source, DEFAULT_ENTRY_POINT)
    }

    pub fn with_entry_point(
        ctx: &RenderCtx<'_>,
        stage: ShaderStage,
        source: &str,
        entry_point: &str,
    ) -> Self {
        let label = format!("airship {stage} shader ({entry_point})");
        let module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        log::debug!("compiled {label}");

        Self {
            stage,
            entry_point: entry_point.to_owned(),
            module: Rc::new(module),
        }
    }

    /// Reads WGSL source from `path` and compiles it with entry point `main`.
    pub fn from_file(
        ctx: &RenderCtx<'_>,
        stage: ShaderStage,
        path: impl AsRef<Path>,
    ) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::ShaderIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(ctx, stage, &source))
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub(crate) fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }
}
