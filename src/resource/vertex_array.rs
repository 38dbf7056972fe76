//! Vertex array objects and per-draw attribute resolution

use nalgebra::Vector4;

use crate::error::{BindingKind, RenderError, RenderResult, Resource};
use crate::shader::{AttributeFormat, ComponentType};

use super::{Buffer, Handle, Pooled, Registry};

/// Number of attribute locations on every vertex array
pub const MAX_VERTEX_ATTRIBS: usize = 8;

/// Attribute descriptor captured by `vertex_attrib_pointer`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexAttribute {
    pub enabled: bool,
    /// Buffer bound to `BufferTarget::Array` when the pointer was set
    pub buffer: Option<Handle<Buffer>>,
    pub offset: usize,
    /// Zero means tightly packed
    pub stride: usize,
    pub format: AttributeFormat,
}

impl Default for VertexAttribute {
    fn default() -> VertexAttribute {
        VertexAttribute {
            enabled: false,
            buffer: None,
            offset: 0,
            stride: 0,
            format: AttributeFormat::from_bits(ComponentType::Float as u8 | (3 << 3)),
        }
    }
}

impl VertexAttribute {
    /// Distance in bytes between consecutive vertices
    #[inline]
    pub fn effective_stride(&self) -> usize {
        if self.stride == 0 { self.format.size() } else { self.stride }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VertexArray {
    attributes: [VertexAttribute; MAX_VERTEX_ATTRIBS],
}

impl Pooled for VertexArray {
    const KIND: Resource = Resource::VertexArray;
}

fn check_location(location: usize) -> RenderResult<()> {
    if location < MAX_VERTEX_ATTRIBS {
        Ok(())
    } else {
        Err(RenderError::InvalidValue(format!("attribute location {} exceeds the maximum of {}", location, MAX_VERTEX_ATTRIBS - 1)))
    }
}

impl VertexArray {
    #[inline]
    pub fn attributes(&self) -> &[VertexAttribute; MAX_VERTEX_ATTRIBS] { &self.attributes }

    pub fn attribute(&self, location: usize) -> RenderResult<&VertexAttribute> {
        check_location(location)?;

        Ok(&self.attributes[location])
    }

    /// Point `location` at `buffer`. The enabled flag is left unchanged.
    pub fn set_pointer(&mut self, location: usize, buffer: Handle<Buffer>, format: AttributeFormat, stride: usize, offset: usize) -> RenderResult<()> {
        check_location(location)?;

        let attribute = &mut self.attributes[location];

        attribute.buffer = Some(buffer);
        attribute.format = format;
        attribute.stride = stride;
        attribute.offset = offset;

        Ok(())
    }

    pub fn set_enabled(&mut self, location: usize, enabled: bool) -> RenderResult<()> {
        check_location(location)?;

        self.attributes[location].enabled = enabled;

        Ok(())
    }

    /// Disable and detach every attribute sourcing `buffer`, returning how many were affected
    pub fn forget_buffer(&mut self, buffer: Handle<Buffer>) -> usize {
        let mut count = 0;

        for attribute in self.attributes.iter_mut().filter(|attribute| attribute.buffer == Some(buffer)) {
            attribute.enabled = false;
            attribute.buffer = None;
            count += 1;
        }

        count
    }
}

#[derive(Debug, Clone, Copy)]
enum Source<'a> {
    Array {
        bytes: &'a [u8],
        offset: usize,
        stride: usize,
        format: AttributeFormat,
    },
    Constant(Vector4<f32>),
    Missing,
}

/// Attribute inputs of one draw call, resolved against the buffer registry once up front.
#[derive(Debug, Clone)]
pub struct AttributeSources<'a> {
    sources: [Source<'a>; MAX_VERTEX_ATTRIBS],
}

impl<'a> AttributeSources<'a> {
    /// Enabled arrays take precedence over the generic constant of the same location.
    pub fn resolve(vertex_array: &VertexArray,
                   constants: &[Option<Vector4<f32>>; MAX_VERTEX_ATTRIBS],
                   buffers: &'a Registry<Buffer>) -> RenderResult<AttributeSources<'a>> {
        let mut sources = [Source::Missing; MAX_VERTEX_ATTRIBS];

        for (location, attribute) in vertex_array.attributes.iter().enumerate() {
            sources[location] = match (attribute.enabled, attribute.buffer, constants[location]) {
                (true, Some(buffer), _) => Source::Array {
                    bytes: buffers.get(buffer)?.data(),
                    offset: attribute.offset,
                    stride: attribute.effective_stride(),
                    format: attribute.format,
                },
                (true, None, _) => return Err(RenderError::UnboundResource(Resource::Buffer)),
                (false, _, Some(value)) => Source::Constant(value),
                (false, _, None) => Source::Missing,
            };
        }

        Ok(AttributeSources { sources })
    }

    /// Fails unless every enabled array holds a complete element for each vertex in `first..first + count`
    pub fn check_range(&self, first: u32, count: usize) -> RenderResult<()> {
        if count == 0 {
            return Ok(());
        }

        let last = (count - 1).checked_add(first as usize);

        for (location, source) in self.sources.iter().enumerate() {
            if let Source::Array { bytes, offset, stride, format } = *source {
                let end = last.and_then(|last| last.checked_mul(stride))
                              .and_then(|start| start.checked_add(offset))
                              .and_then(|start| start.checked_add(format.size()));

                if end.map_or(true, |end| end > bytes.len()) {
                    return Err(RenderError::InvalidValue(format!("vertices {} + {} of attribute {} lie outside of its buffer", first, count, location)));
                }
            }
        }

        Ok(())
    }

    /// Decode the attribute at `location` for vertex `index`
    pub fn fetch(&self, location: usize, index: u32) -> RenderResult<Vector4<f32>> {
        let source = self.sources.get(location).copied().unwrap_or(Source::Missing);

        match source {
            Source::Array { bytes, offset, stride, format } => {
                let start = (index as usize).checked_mul(stride)
                                            .and_then(|start| start.checked_add(offset))
                                            .filter(|&start| start <= bytes.len())
                                            .ok_or_else(|| RenderError::InvalidValue(
                                                format!("vertex {} of attribute {} lies outside of its buffer", index, location)))?;

                format.decode(&bytes[start..])
            }
            Source::Constant(value) => Ok(value),
            Source::Missing => Err(RenderError::missing(BindingKind::Attribute, format!("location {}", location))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn float_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|value| value.to_le_bytes().to_vec()).collect()
    }

    fn setup() -> (Registry<Buffer>, Handle<Buffer>) {
        let mut buffers = Registry::with_capacity(4);
        let mut buffer = Buffer::default();

        buffer.set_data(&float_bytes(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]), Default::default());

        let handle = buffers.create(buffer).unwrap();

        (buffers, handle)
    }

    #[test]
    fn test_fetch_interleaved() {
        let (buffers, handle) = setup();
        let mut vao = VertexArray::default();

        let format = AttributeFormat::new(ComponentType::Float, 2, false).unwrap();

        vao.set_pointer(0, handle, format, 12, 0).unwrap();
        vao.set_pointer(1, handle, AttributeFormat::new(ComponentType::Float, 1, false).unwrap(), 12, 8).unwrap();
        vao.set_enabled(0, true).unwrap();
        vao.set_enabled(1, true).unwrap();

        let sources = AttributeSources::resolve(&vao, &Default::default(), &buffers).unwrap();

        assert_eq!(sources.fetch(0, 1).unwrap(), Vector4::new(3.0, 4.0, 0.0, 1.0));
        assert_eq!(sources.fetch(1, 0).unwrap(), Vector4::new(2.0, 0.0, 0.0, 1.0));
        assert!(sources.fetch(0, 2).is_err());

        assert_eq!(sources.check_range(0, 2), Ok(()));
        assert_eq!(sources.check_range(1, 1), Ok(()));
        assert!(matches!(sources.check_range(0, 3), Err(RenderError::InvalidValue(_))));
        assert!(matches!(sources.check_range(u32::MAX, usize::MAX), Err(RenderError::InvalidValue(_))));
    }

    #[test]
    fn test_tightly_packed_stride() {
        let (buffers, handle) = setup();
        let mut vao = VertexArray::default();

        vao.set_pointer(0, handle, AttributeFormat::new(ComponentType::Float, 3, false).unwrap(), 0, 0).unwrap();
        vao.set_enabled(0, true).unwrap();

        let sources = AttributeSources::resolve(&vao, &Default::default(), &buffers).unwrap();

        assert_eq!(sources.fetch(0, 1).unwrap(), Vector4::new(3.0, 4.0, 5.0, 1.0));
    }

    #[test]
    fn test_constant_and_missing_locations() {
        let (buffers, _) = setup();
        let vao = VertexArray::default();

        let mut constants = [None; MAX_VERTEX_ATTRIBS];
        constants[2] = Some(Vector4::new(0.5, 0.5, 0.5, 1.0));

        let sources = AttributeSources::resolve(&vao, &constants, &buffers).unwrap();

        assert_eq!(sources.fetch(2, 100).unwrap(), Vector4::new(0.5, 0.5, 0.5, 1.0));

        match sources.fetch(0, 0) {
            Err(RenderError::MissingBinding { kind: BindingKind::Attribute, .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_forget_buffer_disables_attributes() {
        let (_, handle) = setup();
        let mut vao = VertexArray::default();

        vao.set_pointer(3, handle, AttributeFormat::new(ComponentType::Float, 4, false).unwrap(), 0, 0).unwrap();
        vao.set_enabled(3, true).unwrap();

        assert_eq!(vao.forget_buffer(handle), 1);
        assert!(!vao.attribute(3).unwrap().enabled);
        assert!(vao.set_enabled(8, true).is_err());
    }
}
