//! Immediate-mode software rasterizer with a GL-shaped API, presented on a text console.
//!
//! ### Features:
//!
//! * A `RenderingContext` owning fixed-capacity registries of buffers, vertex arrays,
//! textures, shader objects and programs, all addressed by checked handles.
//! * Vertex and fragment shaders as plain Rust types or closures, registered by name in a
//! `ShaderLibrary` and "compiled" by looking the name up.
//! * Vertex attribute decoding from raw buffer bytes for every GL component type, with
//! fixed-point normalization.
//! * Clipping of every triangle against all six planes in homogeneous clip-space.
//! * Scanline rasterization with early depth testing and perspective-correct varyings.
//! * Face culling, depth functions, blending and 2D textures with wrap, filter, compare and swizzle parameters.
//! * Console presentation through a 16-colour shaded cell grid, written out on a separate thread.
//! * Compatibility with the `image` crate, using the `image_compat` cargo feature.
//!
//! ### Example:
//!
//! ```ignore
//! let mut library = ShaderLibrary::new();
//!
//! library.register_vertex("passthrough", || VertexFn::new(ShaderInterface::new(), |input| input.attribute(0)))?;
//! library.register_fragment("red", || FragmentFn::new(ShaderInterface::new(), |_| Ok(rgb(1.0, 0.0, 0.0))))?;
//!
//! let mut context = RenderingContext::new(ContextConfig::default(), library);
//!
//! // buffers, vertex arrays and a linked program are set up as with GL...
//!
//! context.clear(ClearMask::COLOUR | ClearMask::DEPTH);
//! context.draw_arrays(DrawMode::Triangles, 0, 3)?;
//!
//! presenter.submit(context.cells())?;
//! ```

pub mod error;
pub mod utils;
pub mod interpolate;
pub mod geometry;
pub mod colour;
pub mod framebuffer;
pub mod resource;
pub mod shader;
pub mod primitive;
pub mod pipeline;
pub mod config;
pub mod context;
pub mod present;

#[cfg(feature = "image_compat")]
pub mod image_compat;

pub use crate::error::{BindingKind, PresentError, RenderError, RenderResult, Resource};
pub use crate::interpolate::Interpolate;
pub use crate::geometry::{ClipVertex, Dimensions, FaceWinding, HasDimensions, ScreenVertex};
pub use crate::colour::{rgb, rgba, Blend, BlendFactor, BlendFunc, Colour, GenericBlend};
pub use crate::framebuffer::{DepthFunc, Framebuffer};
pub use crate::resource::{Buffer, BufferTarget, BufferUsage, Filter, Handle, PixelFormat, PixelType, Program,
                          ShaderObject, ShaderStage, Swizzle, Texture, TextureParameter, TextureTarget,
                          VertexArray, Wrap, CompareMode};
pub use crate::shader::{ComponentType, FragmentFn, FragmentInput, FragmentShader, ShaderInterface, ShaderLibrary,
                        UniformLocation, UniformType, UniformValue, VertexFn, VertexInput, VertexShader};
pub use crate::primitive::{DrawMode, IndexType};
pub use crate::pipeline::{Capability, ClearMask, CullFace, DrawStats, FrontFace, Pipeline, PipelineKey, StateFlags};
pub use crate::config::ContextConfig;
pub use crate::context::RenderingContext;
pub use crate::present::{AnsiSink, Cell, CellGrid, ConsoleColour, ConsoleSink, Presenter};
