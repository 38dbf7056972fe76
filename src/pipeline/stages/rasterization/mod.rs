pub mod triangle;

use crate::colour::Blend;
use crate::framebuffer::DepthFunc;
use crate::pipeline::Pipeline;
use crate::resource::{LinkedProgram, TextureSampler};

/// Everything the rasterizer needs besides the framebuffer and the triangle itself
#[derive(Clone, Copy)]
pub struct Rasterizer<'a> {
    pub pipeline: Pipeline,
    pub program: &'a LinkedProgram,
    pub textures: &'a TextureSampler<'a>,
    pub depth_func: DepthFunc,
    pub depth_mask: bool,
    pub blend: &'a dyn Blend,
}

pub use self::triangle::rasterize_triangle;
