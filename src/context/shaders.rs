//! Shader object, program and uniform entry points

use log::{debug, warn};

use crate::error::{RenderError, RenderResult, Resource};
use crate::resource::{Handle, Program, ShaderObject, ShaderStage};
use crate::shader::{UniformLocation, UniformValue};

use super::RenderingContext;

impl RenderingContext {
    pub fn create_shader(&mut self, stage: ShaderStage) -> RenderResult<Handle<ShaderObject>> {
        let shader = self.shaders.create(ShaderObject::new(stage))?;

        debug!("Created {:?} {:?}", stage, shader);

        Ok(shader)
    }

    /// Set the library name the shader compiles from
    pub fn shader_source(&mut self, shader: Handle<ShaderObject>, name: &str) -> RenderResult<()> {
        self.shaders.get_mut(shader)?.set_source(name);

        Ok(())
    }

    /// Resolve the shader's source name in the shader library
    pub fn compile_shader(&mut self, shader: Handle<ShaderObject>) -> RenderResult<()> {
        self.shaders.get_mut(shader)?.compile(&self.library)
    }

    /// Delete a shader object, detaching it from every program. Linked programs keep working.
    pub fn delete_shader(&mut self, shader: Handle<ShaderObject>) {
        if self.shaders.destroy(shader).is_none() {
            return;
        }

        let detached = self.programs.iter_mut()
                           .map(|(_, program)| program.detach(shader))
                           .filter(|&detached| detached)
                           .count();

        debug!("Deleted {:?}, detached from {} program(s)", shader, detached);
    }

    #[inline]
    pub fn is_shader(&self, shader: Handle<ShaderObject>) -> bool {
        self.shaders.contains(shader)
    }

    pub fn create_program(&mut self) -> RenderResult<Handle<Program>> {
        let program = self.programs.create(Program::default())?;

        debug!("Created {:?}", program);

        Ok(program)
    }

    pub fn attach_shader(&mut self, program: Handle<Program>, shader: Handle<ShaderObject>) -> RenderResult<()> {
        let stage = self.shaders.get(shader)?.stage();

        self.programs.get_mut(program)?.attach(stage, shader)
    }

    pub fn detach_shader(&mut self, program: Handle<Program>, shader: Handle<ShaderObject>) -> RenderResult<()> {
        if self.programs.get_mut(program)?.detach(shader) {
            Ok(())
        } else {
            Err(RenderError::InvalidOperation("shader is not attached to the program"))
        }
    }

    /// Link the attached shaders. Relinking discards every uniform value.
    pub fn link_program(&mut self, program: Handle<Program>) -> RenderResult<()> {
        let result = self.programs.get_mut(program)?.link(&self.shaders);

        if let Err(ref err) = result {
            warn!("Failed to link {:?}: {}", program, err);
        }

        result
    }

    /// Make a linked program current, or clear the current program with `None`
    pub fn use_program(&mut self, program: Option<Handle<Program>>) -> RenderResult<()> {
        if let Some(program) = program {
            self.programs.get(program)?.linked()?;
        }

        self.current_program = program;

        Ok(())
    }

    #[inline]
    pub fn current_program(&self) -> Option<Handle<Program>> { self.current_program }

    pub fn delete_program(&mut self, program: Handle<Program>) {
        if self.programs.destroy(program).is_none() {
            return;
        }

        if self.current_program == Some(program) {
            self.current_program = None;
        }

        debug!("Deleted {:?}", program);
    }

    #[inline]
    pub fn is_program(&self, program: Handle<Program>) -> bool {
        self.programs.contains(program)
    }

    pub fn get_uniform_location(&self, program: Handle<Program>, name: &str) -> RenderResult<UniformLocation> {
        self.programs.get(program)?.linked()?.uniforms().location(name)
    }

    /// Assign a uniform of the current program
    pub fn uniform<V: Into<UniformValue>>(&mut self, location: UniformLocation, value: V) -> RenderResult<()> {
        let program = self.current_program.ok_or(RenderError::UnboundResource(Resource::Program))?;

        self.programs.get_mut(program)?.linked_mut()?.uniforms_mut().set(location, value.into())
    }

    /// Assign a uniform of any linked program by name
    pub fn program_uniform<V: Into<UniformValue>>(&mut self, program: Handle<Program>, name: &str, value: V) -> RenderResult<()> {
        self.programs.get_mut(program)?.linked_mut()?.uniforms_mut().set_by_name(name, value.into())
    }
}

#[cfg(test)]
mod test {
    use nalgebra::{Matrix4, Vector4};

    use crate::config::ContextConfig;
    use crate::error::BindingKind;
    use crate::shader::{FragmentFn, ShaderInterface, ShaderLibrary, UniformType, VertexFn};

    use super::*;

    fn library() -> ShaderLibrary {
        let mut library = ShaderLibrary::new();

        library.register_vertex("transform", || VertexFn::new(
            ShaderInterface::new().uniform("mvp", UniformType::Mat4).varying("uv", 2),
            |input| {
                let mvp: Matrix4<f32> = input.uniform("mvp")?;
                Ok(mvp * input.attribute(0)?)
            })).unwrap();

        library.register_fragment("textured", || FragmentFn::new(
            ShaderInterface::new().uniform("albedo", UniformType::Sampler).varying("uv", 2),
            |_| Ok(Vector4::new(1.0, 1.0, 1.0, 1.0)))).unwrap();

        library.register_fragment("needs_normal", || FragmentFn::new(
            ShaderInterface::new().varying("normal", 3),
            |_| Ok(Vector4::new(1.0, 1.0, 1.0, 1.0)))).unwrap();

        library
    }

    fn compiled(context: &mut RenderingContext, stage: ShaderStage, name: &str) -> Handle<ShaderObject> {
        let shader = context.create_shader(stage).unwrap();

        context.shader_source(shader, name).unwrap();
        context.compile_shader(shader).unwrap();
        shader
    }

    #[test]
    fn test_compile_errors() {
        let mut context = RenderingContext::new(ContextConfig::default(), library());
        let shader = context.create_shader(ShaderStage::Fragment).unwrap();

        context.shader_source(shader, "transform").unwrap();

        match context.compile_shader(shader) {
            Err(RenderError::ShaderCompile { ref name, .. }) => assert_eq!(name, "transform"),
            other => panic!("unexpected {:?}", other),
        }

        context.shader_source(shader, "missing").unwrap();
        assert!(context.compile_shader(shader).is_err());
    }

    #[test]
    fn test_link_and_set_uniforms() {
        let mut context = RenderingContext::new(ContextConfig::default(), library());

        let vs = compiled(&mut context, ShaderStage::Vertex, "transform");
        let fs = compiled(&mut context, ShaderStage::Fragment, "textured");
        let program = context.create_program().unwrap();

        context.attach_shader(program, vs).unwrap();
        context.attach_shader(program, fs).unwrap();

        assert!(context.use_program(Some(program)).is_err());

        context.link_program(program).unwrap();
        context.use_program(Some(program)).unwrap();

        let mvp = context.get_uniform_location(program, "mvp").unwrap();

        context.uniform(mvp, Matrix4::<f32>::identity()).unwrap();
        context.program_uniform(program, "albedo", 0).unwrap();

        match context.program_uniform(program, "tint", 1.0f32) {
            Err(RenderError::MissingBinding { kind: BindingKind::Uniform, .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_link_fails_on_unmatched_varying() {
        let mut context = RenderingContext::new(ContextConfig::default(), library());

        let vs = compiled(&mut context, ShaderStage::Vertex, "transform");
        let fs = compiled(&mut context, ShaderStage::Fragment, "needs_normal");
        let program = context.create_program().unwrap();

        context.attach_shader(program, vs).unwrap();
        context.attach_shader(program, fs).unwrap();

        match context.link_program(program) {
            Err(RenderError::MissingBinding { kind: BindingKind::Varying, ref name }) => assert_eq!(name, "normal"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_delete_cascades() {
        let mut context = RenderingContext::new(ContextConfig::default(), library());

        let vs = compiled(&mut context, ShaderStage::Vertex, "transform");
        let fs = compiled(&mut context, ShaderStage::Fragment, "textured");
        let program = context.create_program().unwrap();

        context.attach_shader(program, vs).unwrap();
        context.attach_shader(program, fs).unwrap();
        context.link_program(program).unwrap();
        context.use_program(Some(program)).unwrap();

        context.delete_shader(vs);

        assert!(!context.is_shader(vs));
        assert_eq!(context.programs.get(program).unwrap().attached(ShaderStage::Vertex), None);
        assert_eq!(context.detach_shader(program, vs), Err(RenderError::InvalidOperation("shader is not attached to the program")));

        context.delete_program(program);
        context.delete_program(program);

        assert_eq!(context.current_program(), None);
        assert!(!context.is_program(program));
    }
}
