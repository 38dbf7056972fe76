//! The rendering context: every registry, binding and toggle a draw call reads.
//!
//! Entry points mirror the immediate-mode GL surface in name and argument order, with
//! `gl` prefixes dropped and every failure returned as a `RenderError` instead of being
//! latched into an error flag.

use std::fmt::{self, Debug};
use std::sync::Arc;

use log::debug;
use nalgebra::Vector4;

use crate::colour::{Blend, BlendFactor, BlendFunc, Colour};
use crate::config::ContextConfig;
use crate::error::RenderResult;
use crate::framebuffer::{DepthFunc, Framebuffer};
use crate::geometry::{Dimensions, HasDimensions};
use crate::pipeline::{Capability, ClearMask, CullFace, DrawStorage, FrontFace, PipelineKey, RenderState};
use crate::present::CellGrid;
use crate::resource::{Buffer, BufferBindings, Handle, Pooled, Program, Registry, ShaderObject, Texture, TextureUnits, VertexArray, MAX_VERTEX_ATTRIBS};
use crate::shader::ShaderLibrary;

mod buffers;
mod shaders;
mod textures;
mod draw;

/// Owns all rendering state. Nothing here is shared between threads.
pub struct RenderingContext {
    library: ShaderLibrary,

    buffers: Registry<Buffer>,
    vertex_arrays: Registry<VertexArray>,
    textures: Registry<Texture>,
    shaders: Registry<ShaderObject>,
    programs: Registry<Program>,

    buffer_bindings: BufferBindings,
    bound_vertex_array: Option<Handle<VertexArray>>,
    current_program: Option<Handle<Program>>,
    texture_units: TextureUnits,
    generic_attributes: [Option<Vector4<f32>>; MAX_VERTEX_ATTRIBS],

    state: RenderState,
    custom_blend: Option<Arc<dyn Blend>>,

    framebuffer: Framebuffer,
    storage: DrawStorage,
}

/// Create `count` default resources, releasing all of them again if the registry fills up
fn generate<T: Pooled + Default>(registry: &mut Registry<T>, count: usize) -> RenderResult<Vec<Handle<T>>> {
    let mut handles = Vec::with_capacity(count);

    for _ in 0..count {
        match registry.create(T::default()) {
            Ok(handle) => handles.push(handle),
            Err(err) => {
                for handle in handles {
                    registry.destroy(handle);
                }

                return Err(err);
            }
        }
    }

    debug!("Generated {} {} handle(s), {} of {} in use", count, T::KIND, registry.len(), registry.capacity());

    Ok(handles)
}

impl RenderingContext {
    pub fn new(config: ContextConfig, library: ShaderLibrary) -> RenderingContext {
        debug!("Creating {}x{} rendering context with {} registered shaders", config.width, config.height, library.len());

        RenderingContext {
            library,
            buffers: Registry::with_capacity(config.buffer_capacity),
            vertex_arrays: Registry::with_capacity(config.vertex_array_capacity),
            textures: Registry::with_capacity(config.texture_capacity),
            shaders: Registry::with_capacity(config.shader_capacity),
            programs: Registry::with_capacity(config.program_capacity),
            buffer_bindings: BufferBindings::default(),
            bound_vertex_array: None,
            current_program: None,
            texture_units: TextureUnits::new(config.texture_units),
            generic_attributes: [None; MAX_VERTEX_ATTRIBS],
            state: RenderState::default(),
            custom_blend: None,
            framebuffer: Framebuffer::new(config.dimensions()),
            storage: DrawStorage::default(),
        }
    }

    #[inline]
    pub fn shader_library(&self) -> &ShaderLibrary { &self.library }

    /// Shaders registered here become visible to the next `compile_shader`
    #[inline]
    pub fn shader_library_mut(&mut self) -> &mut ShaderLibrary { &mut self.library }

    #[inline]
    pub fn render_state(&self) -> &RenderState { &self.state }

    #[inline]
    pub fn pipeline_key(&self) -> PipelineKey { self.state.key() }

    #[inline]
    pub fn framebuffer(&self) -> &Framebuffer { &self.framebuffer }

    pub fn enable(&mut self, capability: Capability) {
        self.state.set_enabled(capability, true);
    }

    pub fn disable(&mut self, capability: Capability) {
        self.state.set_enabled(capability, false);
    }

    #[inline]
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.state.is_enabled(capability)
    }

    pub fn cull_face(&mut self, face: CullFace) {
        self.state.set_cull_face(face);
    }

    pub fn front_face(&mut self, face: FrontFace) {
        self.state.set_front_face(face);
    }

    pub fn depth_func(&mut self, func: DepthFunc) {
        self.state.depth_func = func;
    }

    /// Whether passing fragments write their depth
    pub fn depth_mask(&mut self, write: bool) {
        self.state.depth_mask = write;
    }

    /// Also discards any blend set with `set_blend`
    pub fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.state.blend_func = BlendFunc::new(src, dst);
        self.custom_blend = None;
    }

    /// Blend with an arbitrary function instead of the factor pair. `None` restores `blend_func`.
    pub fn set_blend(&mut self, blend: Option<Arc<dyn Blend>>) {
        self.custom_blend = blend;
    }

    pub fn clear_colour(&mut self, colour: Colour) {
        self.state.clear_colour = colour;
    }

    pub fn clear_depth(&mut self, depth: f32) {
        self.state.clear_depth = depth;
    }

    /// Reset the selected attachments to the clear values
    pub fn clear(&mut self, mask: ClearMask) {
        let (colour, depth) = self.framebuffer.attachments_mut();

        if mask.contains(ClearMask::COLOUR) {
            colour.clear(self.state.clear_colour);
        }

        if mask.contains(ClearMask::DEPTH) {
            depth.clear(self.state.clear_depth);
        }
    }

    pub fn read_pixel(&self, x: u32, y: u32) -> RenderResult<Colour> {
        self.framebuffer.read_pixel(x, y)
    }

    pub fn depth_at(&self, x: u32, y: u32) -> RenderResult<f32> {
        self.framebuffer.depth_at(x, y)
    }

    /// Quantise the colour buffer into console cells, ready for a `Presenter`
    pub fn cells(&self) -> CellGrid {
        CellGrid::from_colour_buffer(self.framebuffer.colour())
    }
}

impl HasDimensions for RenderingContext {
    fn dimensions(&self) -> Dimensions { self.framebuffer.dimensions() }
}

impl Debug for RenderingContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RenderingContext")
         .field("dimensions", &self.dimensions())
         .field("buffers", &self.buffers.len())
         .field("vertex_arrays", &self.vertex_arrays.len())
         .field("textures", &self.textures.len())
         .field("shaders", &self.shaders.len())
         .field("programs", &self.programs.len())
         .field("key", &self.state.key())
         .finish()
    }
}
