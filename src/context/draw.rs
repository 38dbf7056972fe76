//! Draw call entry points

use log::{trace, warn};

use crate::colour::Blend;
use crate::error::{RenderError, RenderResult, Resource};
use crate::pipeline::{self, DrawStats, DrawVertices, Pipeline, Rasterizer};
use crate::primitive::{DrawMode, IndexType};
use crate::resource::{AttributeSources, BufferTarget, TextureSampler};

use super::RenderingContext;

impl RenderingContext {
    /// Draw `count` consecutive vertices starting at `first`
    pub fn draw_arrays(&mut self, mode: DrawMode, first: u32, count: usize) -> RenderResult<DrawStats> {
        let result = self.draw(mode, &DrawVertices::Range { first, count });

        if let Err(ref err) = result {
            warn!("Skipped draw_arrays({:?}, {}, {}): {}", mode, first, count, err);
        }

        result
    }

    /// Draw `count` vertices whose indices are read from the element array buffer, starting `offset` bytes in
    pub fn draw_elements(&mut self, mode: DrawMode, count: usize, ty: IndexType, offset: usize) -> RenderResult<DrawStats> {
        let result = self.element_indices(count, ty, offset)
                         .and_then(|indices| self.draw(mode, &DrawVertices::Indexed(indices)));

        if let Err(ref err) = result {
            warn!("Skipped draw_elements({:?}, {}, {:?}, {}): {}", mode, count, ty, offset, err);
        }

        result
    }

    fn element_indices(&self, count: usize, ty: IndexType, offset: usize) -> RenderResult<Vec<u32>> {
        let handle = self.buffer_bindings.get(BufferTarget::ElementArray)
                         .ok_or(RenderError::UnboundResource(Resource::Buffer))?;

        let data = self.buffers.get(handle)?.data();

        let bytes = data.get(offset..).ok_or_else(|| {
            RenderError::InvalidValue(format!("index offset {} exceeds buffer size {}", offset, data.len()))
        })?;

        ty.decode(bytes, count)
    }

    fn draw(&mut self, mode: DrawMode, vertices: &DrawVertices) -> RenderResult<DrawStats> {
        let program = self.current_program.ok_or(RenderError::UnboundResource(Resource::Program))?;
        let vertex_array = self.bound_vertex_array.ok_or(RenderError::UnboundResource(Resource::VertexArray))?;

        let program = self.programs.get(program)?.linked()?;

        let attributes = AttributeSources::resolve(self.vertex_arrays.get(vertex_array)?, &self.generic_attributes, &self.buffers)?;

        let textures = TextureSampler::new(&self.texture_units, &self.textures);

        let blend: &dyn Blend = match self.custom_blend {
            Some(ref blend) => &**blend,
            None => &self.state.blend_func,
        };

        let raster = Rasterizer {
            pipeline: Pipeline::from(self.state.key()),
            program,
            textures: &textures,
            depth_func: self.state.depth_func,
            depth_mask: self.state.depth_mask,
            blend,
        };

        trace!("Drawing {:?} with {:?}", mode, raster.pipeline);

        pipeline::draw(&raster, &attributes, &mut self.storage, &mut self.framebuffer, mode, vertices)
    }
}
