//! Shader capability traits and the register-file style accessors they use.
//!
//! A shader is any type implementing [`VertexShader`] or [`FragmentShader`]. Instead of
//! compiling source text, shaders are registered by name in a [`ShaderLibrary`] and looked up
//! when a shader object is compiled.
//!
//! Each shader declares a [`ShaderInterface`] listing the uniforms it reads and the varyings it
//! writes (vertex) or reads (fragment). Linking a program checks both interfaces against each
//! other and assigns every varying a fixed offset in the per-vertex record.
//!
//! ```ignore
//! let mut library = ShaderLibrary::new();
//!
//! library.register_vertex("flat_vs", || VertexFn::new(
//!     ShaderInterface::new().uniform("mvp", UniformType::Mat4).varying("colour", 4),
//!     |input| {
//!         let mvp: Matrix4<f32> = input.uniform("mvp")?;
//!         input.set_varying("colour", input.attribute(1)?)?;
//!         Ok(mvp * input.attribute(0)?)
//!     }))?;
//! ```

use nalgebra::{Vector2, Vector4};

use crate::colour::Colour;
use crate::error::RenderResult;
use crate::resource::texture::TextureSampler;
use crate::resource::vertex_array::AttributeSources;

pub mod name;
pub mod attribute;
pub mod uniform;
pub mod varying;
pub mod library;

pub use self::name::NameHash;
pub use self::attribute::{AttributeFormat, ComponentType};
pub use self::uniform::{UniformDecl, UniformLocation, UniformRead, UniformStorage, UniformType, UniformValue};
pub use self::varying::{VaryingDecl, VaryingLayout, VaryingRecord, VaryingSlot, VaryingValue};
pub use self::library::{CompiledShader, ShaderLibrary};

/// Uniforms and varyings a shader uses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderInterface {
    pub uniforms: Vec<UniformDecl>,
    pub varyings: Vec<VaryingDecl>,
}

impl ShaderInterface {
    pub fn new() -> ShaderInterface { ShaderInterface::default() }

    pub fn uniform<S: Into<String>>(mut self, name: S, ty: UniformType) -> ShaderInterface {
        self.uniforms.push(UniformDecl { name: name.into(), ty });
        self
    }

    pub fn varying<S: Into<String>>(mut self, name: S, components: usize) -> ShaderInterface {
        self.varyings.push(VaryingDecl { name: name.into(), components });
        self
    }
}

/// Transforms one vertex into clip-space.
pub trait VertexShader: Send + Sync {
    fn interface(&self) -> ShaderInterface;

    /// Returns the clip-space position, writing any varyings through `input`.
    fn run(&self, input: &mut VertexInput) -> RenderResult<Vector4<f32>>;
}

/// Computes the colour of one covered pixel.
pub trait FragmentShader: Send + Sync {
    fn interface(&self) -> ShaderInterface;

    fn run(&self, input: &FragmentInput) -> RenderResult<Colour>;
}

/// Everything a vertex shader can read or write for the current vertex
pub struct VertexInput<'a> {
    pub(crate) index: u32,
    pub(crate) attributes: &'a AttributeSources<'a>,
    pub(crate) uniforms: &'a UniformStorage,
    pub(crate) layout: &'a VaryingLayout,
    pub(crate) out: &'a mut [f32],
}

impl<'a> VertexInput<'a> {
    /// Index of the vertex being processed, as read from the index buffer if there is one
    #[inline]
    pub fn vertex_index(&self) -> u32 { self.index }

    /// Decoded attribute at `location` for the current vertex
    #[inline]
    pub fn attribute(&self, location: usize) -> RenderResult<Vector4<f32>> {
        self.attributes.fetch(location, self.index)
    }

    #[inline]
    pub fn uniform<T: UniformRead>(&self, name: &str) -> RenderResult<T> {
        self.uniforms.get(name)
    }

    /// Write a varying output for the current vertex
    pub fn set_varying<T: VaryingValue>(&mut self, name: &str, value: T) -> RenderResult<()> {
        let slot = self.layout.typed_slot(name, T::COMPONENTS)?;

        value.write(&mut self.out[slot.offset..slot.offset + slot.components]);

        Ok(())
    }
}

/// Everything a fragment shader can read for the current pixel
pub struct FragmentInput<'a> {
    pub(crate) coord: Vector4<f32>,
    pub(crate) varyings: &'a [f32],
    pub(crate) layout: &'a VaryingLayout,
    pub(crate) uniforms: &'a UniformStorage,
    pub(crate) textures: &'a TextureSampler<'a>,
}

impl<'a> FragmentInput<'a> {
    /// Window-space position: pixel centre `x` and `y`, depth `z`, and clip-space `w`.
    ///
    /// Similar to `gl_FragCoord`.
    #[inline]
    pub fn frag_coord(&self) -> Vector4<f32> { self.coord }

    /// Interpolated varying value
    pub fn varying<T: VaryingValue>(&self, name: &str) -> RenderResult<T> {
        let slot = self.layout.typed_slot(name, T::COMPONENTS)?;

        Ok(T::read(&self.varyings[slot.offset..slot.offset + slot.components]))
    }

    #[inline]
    pub fn uniform<T: UniformRead>(&self, name: &str) -> RenderResult<T> {
        self.uniforms.get(name)
    }

    /// Sample the texture bound to the unit referenced by the sampler uniform `sampler`
    pub fn sample(&self, sampler: &str, uv: Vector2<f32>) -> RenderResult<Colour> {
        let unit = self.uniforms.sampler(sampler)?;

        Ok(self.textures.texture(unit)?.sample(uv))
    }

    /// Depth comparison sample, for textures with a compare mode set
    pub fn sample_compare(&self, sampler: &str, uv: Vector2<f32>, reference: f32) -> RenderResult<f32> {
        let unit = self.uniforms.sampler(sampler)?;

        Ok(self.textures.texture(unit)?.sample_compare(uv, reference))
    }
}

/// Vertex shader built from a closure
pub struct VertexFn<F> {
    interface: ShaderInterface,
    shader: F,
}

impl<F> VertexFn<F> where F: Fn(&mut VertexInput<'_>) -> RenderResult<Vector4<f32>> + Send + Sync {
    pub fn new(interface: ShaderInterface, shader: F) -> VertexFn<F> {
        VertexFn { interface, shader }
    }
}

impl<F> VertexShader for VertexFn<F> where F: Fn(&mut VertexInput<'_>) -> RenderResult<Vector4<f32>> + Send + Sync {
    fn interface(&self) -> ShaderInterface { self.interface.clone() }

    #[inline]
    fn run(&self, input: &mut VertexInput) -> RenderResult<Vector4<f32>> { (self.shader)(input) }
}

/// Fragment shader built from a closure
pub struct FragmentFn<F> {
    interface: ShaderInterface,
    shader: F,
}

impl<F> FragmentFn<F> where F: Fn(&FragmentInput<'_>) -> RenderResult<Colour> + Send + Sync {
    pub fn new(interface: ShaderInterface, shader: F) -> FragmentFn<F> {
        FragmentFn { interface, shader }
    }
}

impl<F> FragmentShader for FragmentFn<F> where F: Fn(&FragmentInput<'_>) -> RenderResult<Colour> + Send + Sync {
    fn interface(&self) -> ShaderInterface { self.interface.clone() }

    #[inline]
    fn run(&self, input: &FragmentInput) -> RenderResult<Colour> { (self.shader)(input) }
}
