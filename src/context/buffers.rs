//! Buffer and vertex array entry points

use log::debug;
use nalgebra::Vector4;

use crate::error::{RenderError, RenderResult, Resource};
use crate::resource::{Buffer, BufferTarget, BufferUsage, Handle, VertexArray, MAX_VERTEX_ATTRIBS};
use crate::shader::{AttributeFormat, ComponentType};

use super::{generate, RenderingContext};

impl RenderingContext {
    pub fn gen_buffers(&mut self, count: usize) -> RenderResult<Vec<Handle<Buffer>>> {
        generate(&mut self.buffers, count)
    }

    /// Bind `buffer` to `target`, or clear the target with `None`
    pub fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<Handle<Buffer>>) -> RenderResult<()> {
        if let Some(buffer) = buffer {
            self.buffers.validate(buffer)?;
        }

        self.buffer_bindings.bind(target, buffer);

        Ok(())
    }

    #[inline]
    pub fn bound_buffer(&self, target: BufferTarget) -> Option<Handle<Buffer>> {
        self.buffer_bindings.get(target)
    }

    /// Replace the data store of the buffer bound to `target`
    pub fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> RenderResult<()> {
        let handle = self.buffer_bindings.require(target)?;

        self.buffers.get_mut(handle)?.set_data(data, usage);

        Ok(())
    }

    pub fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) -> RenderResult<()> {
        let handle = self.buffer_bindings.require(target)?;

        self.buffers.get_mut(handle)?.set_sub_data(offset, data)
    }

    /// Copy `size` bytes between the buffers bound to two targets, usually
    /// `BufferTarget::CopyRead` and `BufferTarget::CopyWrite`.
    pub fn copy_buffer_sub_data(&mut self,
                                read_target: BufferTarget,
                                write_target: BufferTarget,
                                read_offset: usize,
                                write_offset: usize,
                                size: usize) -> RenderResult<()> {
        let read = self.buffer_bindings.require(read_target)?;
        let write = self.buffer_bindings.require(write_target)?;

        let data = self.buffers.get(read)?.slice(read_offset, size)?.to_vec();

        self.buffers.get_mut(write)?.set_sub_data(write_offset, &data)
    }

    /// Delete buffers, clearing them from every target and every vertex array attribute.
    ///
    /// Invalid handles are ignored.
    pub fn delete_buffers(&mut self, buffers: &[Handle<Buffer>]) {
        for &buffer in buffers {
            if self.buffers.destroy(buffer).is_none() {
                continue;
            }

            let unbound = self.buffer_bindings.unbind_all(buffer);

            let detached: usize = self.vertex_arrays.iter_mut()
                                      .map(|(_, vertex_array)| vertex_array.forget_buffer(buffer))
                                      .sum();

            debug!("Deleted {:?}, cleared from {} target(s) and {} attribute(s)", buffer, unbound, detached);
        }
    }

    #[inline]
    pub fn is_buffer(&self, buffer: Handle<Buffer>) -> bool {
        self.buffers.contains(buffer)
    }

    pub fn gen_vertex_arrays(&mut self, count: usize) -> RenderResult<Vec<Handle<VertexArray>>> {
        generate(&mut self.vertex_arrays, count)
    }

    pub fn bind_vertex_array(&mut self, vertex_array: Option<Handle<VertexArray>>) -> RenderResult<()> {
        if let Some(vertex_array) = vertex_array {
            self.vertex_arrays.validate(vertex_array)?;
        }

        self.bound_vertex_array = vertex_array;

        Ok(())
    }

    pub fn delete_vertex_arrays(&mut self, vertex_arrays: &[Handle<VertexArray>]) {
        for &vertex_array in vertex_arrays {
            if self.vertex_arrays.destroy(vertex_array).is_none() {
                continue;
            }

            if self.bound_vertex_array == Some(vertex_array) {
                self.bound_vertex_array = None;
            }

            debug!("Deleted {:?}", vertex_array);
        }
    }

    #[inline]
    pub fn is_vertex_array(&self, vertex_array: Handle<VertexArray>) -> bool {
        self.vertex_arrays.contains(vertex_array)
    }

    fn bound_vertex_array_mut(&mut self) -> RenderResult<&mut VertexArray> {
        let handle = self.bound_vertex_array.ok_or(RenderError::UnboundResource(Resource::VertexArray))?;

        self.vertex_arrays.get_mut(handle)
    }

    /// Describe attribute `location` of the bound vertex array, sourcing it from the buffer
    /// currently bound to `BufferTarget::Array`.
    pub fn vertex_attrib_pointer(&mut self,
                                 location: usize,
                                 count: u8,
                                 ty: ComponentType,
                                 normalized: bool,
                                 stride: usize,
                                 offset: usize) -> RenderResult<()> {
        let buffer = self.buffer_bindings.get(BufferTarget::Array)
                         .ok_or(RenderError::InvalidOperation("vertex attribute pointers require a bound array buffer"))?;

        let format = AttributeFormat::new(ty, count, normalized)?;

        self.bound_vertex_array_mut()?.set_pointer(location, buffer, format, stride, offset)
    }

    pub fn enable_vertex_attrib_array(&mut self, location: usize) -> RenderResult<()> {
        self.bound_vertex_array_mut()?.set_enabled(location, true)
    }

    pub fn disable_vertex_attrib_array(&mut self, location: usize) -> RenderResult<()> {
        self.bound_vertex_array_mut()?.set_enabled(location, false)
    }

    /// Constant value read by `location` whenever its array is disabled
    pub fn vertex_attrib_4f(&mut self, location: usize, x: f32, y: f32, z: f32, w: f32) -> RenderResult<()> {
        let slot = self.generic_attributes.get_mut(location).ok_or_else(|| {
            RenderError::InvalidValue(format!("attribute location {} exceeds the maximum of {}", location, MAX_VERTEX_ATTRIBS - 1))
        })?;

        *slot = Some(Vector4::new(x, y, z, w));

        Ok(())
    }
}
