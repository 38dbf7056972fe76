//! Shader programs pairing a vertex and a fragment shader

use std::fmt::{self, Debug};
use std::sync::Arc;

use log::debug;

use crate::error::{BindingKind, RenderError, RenderResult, Resource};
use crate::shader::{CompiledShader, FragmentShader, UniformStorage, VaryingLayout, VertexShader};

use super::{Handle, Pooled, Registry, ShaderObject, ShaderStage};

#[derive(Debug, Default)]
pub struct Program {
    vertex: Option<Handle<ShaderObject>>,
    fragment: Option<Handle<ShaderObject>>,
    linked: Option<LinkedProgram>,
}

impl Pooled for Program {
    const KIND: Resource = Resource::Program;
}

impl Program {
    #[inline]
    pub fn attached(&self, stage: ShaderStage) -> Option<Handle<ShaderObject>> {
        match stage {
            ShaderStage::Vertex => self.vertex,
            ShaderStage::Fragment => self.fragment,
        }
    }

    /// Attach `shader` to the slot of its stage, which must be empty or already hold it
    pub fn attach(&mut self, stage: ShaderStage, shader: Handle<ShaderObject>) -> RenderResult<()> {
        let slot = match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Fragment => &mut self.fragment,
        };

        match *slot {
            Some(existing) if existing != shader => Err(RenderError::InvalidOperation("a shader of this stage is already attached")),
            _ => {
                *slot = Some(shader);
                Ok(())
            }
        }
    }

    /// Returns `true` if `shader` was attached
    pub fn detach(&mut self, shader: Handle<ShaderObject>) -> bool {
        for slot in &mut [&mut self.vertex, &mut self.fragment] {
            if **slot == Some(shader) {
                **slot = None;
                return true;
            }
        }

        false
    }

    /// Link the attached, compiled shaders.
    ///
    /// A failed link leaves the program unlinked.
    pub fn link(&mut self, shaders: &Registry<ShaderObject>) -> RenderResult<()> {
        self.linked = None;

        let vertex = match self.compiled(shaders, ShaderStage::Vertex)? {
            CompiledShader::Vertex(shader) => shader,
            CompiledShader::Fragment(_) => return Err(RenderError::InvalidOperation("fragment shader attached as vertex shader")),
        };

        let fragment = match self.compiled(shaders, ShaderStage::Fragment)? {
            CompiledShader::Fragment(shader) => shader,
            CompiledShader::Vertex(_) => return Err(RenderError::InvalidOperation("vertex shader attached as fragment shader")),
        };

        self.linked = Some(LinkedProgram::link(vertex, fragment)?);

        Ok(())
    }

    fn compiled(&self, shaders: &Registry<ShaderObject>, stage: ShaderStage) -> RenderResult<CompiledShader> {
        let handle = self.attached(stage).ok_or(RenderError::InvalidOperation("program is missing a shader stage"))?;

        shaders.get(handle)?
               .compiled()
               .cloned()
               .ok_or(RenderError::InvalidOperation("attached shader has not been compiled"))
    }

    #[inline]
    pub fn is_linked(&self) -> bool { self.linked.is_some() }

    pub fn linked(&self) -> RenderResult<&LinkedProgram> {
        self.linked.as_ref().ok_or(RenderError::InvalidOperation("program is not linked"))
    }

    pub fn linked_mut(&mut self) -> RenderResult<&mut LinkedProgram> {
        self.linked.as_mut().ok_or(RenderError::InvalidOperation("program is not linked"))
    }
}

/// Result of a successful link: both shaders, the varying layout and uniform storage.
pub struct LinkedProgram {
    vertex: Arc<dyn VertexShader>,
    fragment: Arc<dyn FragmentShader>,
    varyings: VaryingLayout,
    uniforms: UniformStorage,
}

impl LinkedProgram {
    pub fn link(vertex: Arc<dyn VertexShader>, fragment: Arc<dyn FragmentShader>) -> RenderResult<LinkedProgram> {
        let vertex_interface = vertex.interface();
        let fragment_interface = fragment.interface();

        let varyings = VaryingLayout::from_decls(&vertex_interface.varyings)?;

        // Every fragment input must be produced by the vertex stage
        for input in &fragment_interface.varyings {
            let slot = varyings.slot(&input.name)?;

            if slot.components != input.components {
                return Err(RenderError::missing(BindingKind::Varying, input.name.clone()));
            }
        }

        let mut uniforms = UniformStorage::default();

        for decl in vertex_interface.uniforms.iter().chain(&fragment_interface.uniforms) {
            uniforms.declare(decl)?;
        }

        debug!("Linked program with {} varying floats per vertex and {} uniforms", varyings.stride(), uniforms.len());

        Ok(LinkedProgram { vertex, fragment, varyings, uniforms })
    }

    #[inline]
    pub fn vertex_shader(&self) -> &dyn VertexShader { &*self.vertex }

    #[inline]
    pub fn fragment_shader(&self) -> &dyn FragmentShader { &*self.fragment }

    #[inline]
    pub fn varyings(&self) -> &VaryingLayout { &self.varyings }

    #[inline]
    pub fn uniforms(&self) -> &UniformStorage { &self.uniforms }

    #[inline]
    pub fn uniforms_mut(&mut self) -> &mut UniformStorage { &mut self.uniforms }
}

impl Debug for LinkedProgram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LinkedProgram")
         .field("varyings", &self.varyings)
         .field("uniforms", &self.uniforms)
         .finish()
    }
}
