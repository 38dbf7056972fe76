//! Shader objects: a stage, a library name and, once compiled, a shader instance

use crate::error::{RenderError, RenderResult, Resource};
use crate::shader::{CompiledShader, ShaderLibrary};

use super::Pooled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

#[derive(Debug, Clone)]
pub struct ShaderObject {
    stage: ShaderStage,
    source: Option<String>,
    compiled: Option<CompiledShader>,
}

impl Pooled for ShaderObject {
    const KIND: Resource = Resource::Shader;
}

impl ShaderObject {
    pub fn new(stage: ShaderStage) -> ShaderObject {
        ShaderObject { stage, source: None, compiled: None }
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage { self.stage }

    /// Library name set by `shader_source`
    #[inline]
    pub fn source(&self) -> Option<&str> { self.source.as_ref().map(String::as_str) }

    #[inline]
    pub fn compiled(&self) -> Option<&CompiledShader> { self.compiled.as_ref() }

    /// Setting a new source discards any earlier compilation result
    pub fn set_source(&mut self, name: &str) {
        self.source = Some(name.to_owned());
        self.compiled = None;
    }

    /// Resolve the source name in `library`
    pub fn compile(&mut self, library: &ShaderLibrary) -> RenderResult<()> {
        let name = self.source.as_ref().ok_or(RenderError::InvalidOperation("shader has no source"))?;

        let shader = library.instantiate(name).map_err(|_| RenderError::ShaderCompile {
            name: name.clone(),
            reason: "no shader with this name is registered".to_owned(),
        })?;

        if shader.stage() != self.stage {
            return Err(RenderError::ShaderCompile {
                name: name.clone(),
                reason: format!("registered as a {:?} shader, not {:?}", shader.stage(), self.stage),
            });
        }

        self.compiled = Some(shader);

        Ok(())
    }
}
