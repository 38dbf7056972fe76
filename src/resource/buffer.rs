//! Raw byte buffers and the process-wide buffer target bindings

use crate::error::{RenderError, RenderResult, Resource};

use super::{Handle, Pooled};

/// Binding points a buffer can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BufferTarget {
    /// Equivalent to `GL_ARRAY_BUFFER`
    Array,
    /// Equivalent to `GL_ELEMENT_ARRAY_BUFFER`
    ElementArray,
    /// Equivalent to `GL_COPY_READ_BUFFER`
    CopyRead,
    /// Equivalent to `GL_COPY_WRITE_BUFFER`
    CopyWrite,
    /// Equivalent to `GL_UNIFORM_BUFFER`
    Uniform,
}

impl BufferTarget {
    pub const ALL: [BufferTarget; 5] = [
        BufferTarget::Array,
        BufferTarget::ElementArray,
        BufferTarget::CopyRead,
        BufferTarget::CopyWrite,
        BufferTarget::Uniform,
    ];

    #[inline]
    fn slot(self) -> usize {
        match self {
            BufferTarget::Array => 0,
            BufferTarget::ElementArray => 1,
            BufferTarget::CopyRead => 2,
            BufferTarget::CopyWrite => 3,
            BufferTarget::Uniform => 4,
        }
    }
}

/// Usage hint recorded with the buffer data. It has no effect on a software renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
    StreamDraw,
}

impl Default for BufferUsage {
    fn default() -> BufferUsage { BufferUsage::StaticDraw }
}

/// Raw byte storage addressed by handle
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    data: Vec<u8>,
    usage: BufferUsage,
}

impl Pooled for Buffer {
    const KIND: Resource = Resource::Buffer;
}

impl Buffer {
    #[inline]
    pub fn data(&self) -> &[u8] { &self.data }

    #[inline]
    pub fn len(&self) -> usize { self.data.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    #[inline]
    pub fn usage(&self) -> BufferUsage { self.usage }

    /// Replace the whole data store
    pub fn set_data(&mut self, data: &[u8], usage: BufferUsage) {
        self.data.clear();
        self.data.extend_from_slice(data);
        self.usage = usage;
    }

    /// Overwrite part of the data store, which must already be large enough.
    pub fn set_sub_data(&mut self, offset: usize, data: &[u8]) -> RenderResult<()> {
        let end = offset.checked_add(data.len())
                        .filter(|&end| end <= self.data.len())
                        .ok_or_else(|| RenderError::InvalidValue(
                            format!("range {}..{} exceeds buffer size {}", offset, offset.saturating_add(data.len()), self.data.len())))?;

        self.data[offset..end].copy_from_slice(data);

        Ok(())
    }

    /// Borrow `len` bytes starting at `offset`
    pub fn slice(&self, offset: usize, len: usize) -> RenderResult<&[u8]> {
        offset.checked_add(len)
              .and_then(|end| self.data.get(offset..end))
              .ok_or_else(|| RenderError::InvalidValue(
                  format!("range {}+{} exceeds buffer size {}", offset, len, self.data.len())))
    }
}

/// Which buffer currently occupies each target.
///
/// Bindings are context state, not part of the buffer itself.
#[derive(Debug, Clone, Default)]
pub struct BufferBindings {
    slots: [Option<Handle<Buffer>>; 5],
}

impl BufferBindings {
    #[inline]
    pub fn get(&self, target: BufferTarget) -> Option<Handle<Buffer>> {
        self.slots[target.slot()]
    }

    #[inline]
    pub fn bind(&mut self, target: BufferTarget, buffer: Option<Handle<Buffer>>) {
        self.slots[target.slot()] = buffer;
    }

    /// Like `get`, but fails if nothing is bound
    pub fn require(&self, target: BufferTarget) -> RenderResult<Handle<Buffer>> {
        self.get(target).ok_or(RenderError::UnboundResource(Resource::Buffer))
    }

    /// Clear `buffer` from every target it occupies, returning how many were cleared.
    pub fn unbind_all(&mut self, buffer: Handle<Buffer>) -> usize {
        let mut cleared = 0;

        for slot in self.slots.iter_mut() {
            if *slot == Some(buffer) {
                *slot = None;
                cleared += 1;
            }
        }

        cleared
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sub_data_bounds() {
        let mut buffer = Buffer::default();

        buffer.set_data(&[0; 8], BufferUsage::DynamicDraw);

        assert!(buffer.set_sub_data(4, &[1, 2, 3, 4]).is_ok());
        assert_eq!(buffer.data(), &[0, 0, 0, 0, 1, 2, 3, 4]);
        assert!(buffer.set_sub_data(6, &[1, 2, 3]).is_err());
        assert!(buffer.set_sub_data(usize::MAX, &[1]).is_err());
    }

    #[test]
    fn test_unbind_all_targets() {
        let mut bindings = BufferBindings::default();
        let buffer = Handle::from_raw(3);

        bindings.bind(BufferTarget::Array, Some(buffer));
        bindings.bind(BufferTarget::CopyRead, Some(buffer));
        bindings.bind(BufferTarget::ElementArray, Some(Handle::from_raw(1)));

        assert_eq!(bindings.unbind_all(buffer), 2);
        assert_eq!(bindings.get(BufferTarget::Array), None);
        assert_eq!(bindings.get(BufferTarget::CopyRead), None);
        assert_eq!(bindings.get(BufferTarget::ElementArray), Some(Handle::from_raw(1)));
    }
}
