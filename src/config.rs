//! Construction parameters of a `RenderingContext`

use crate::geometry::Dimensions;
use crate::resource::DEFAULT_CAPACITY;

/// Default number of texture units
pub const DEFAULT_TEXTURE_UNITS: usize = 16;

/// Framebuffer size and the capacity of every resource registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContextConfig {
    pub width: u32,
    pub height: u32,
    pub buffer_capacity: usize,
    pub vertex_array_capacity: usize,
    pub texture_capacity: usize,
    pub shader_capacity: usize,
    pub program_capacity: usize,
    pub texture_units: usize,
}

impl Default for ContextConfig {
    /// An 80x25 console with 32 slots in every registry
    fn default() -> ContextConfig {
        ContextConfig {
            width: 80,
            height: 25,
            buffer_capacity: DEFAULT_CAPACITY,
            vertex_array_capacity: DEFAULT_CAPACITY,
            texture_capacity: DEFAULT_CAPACITY,
            shader_capacity: DEFAULT_CAPACITY,
            program_capacity: DEFAULT_CAPACITY,
            texture_units: DEFAULT_TEXTURE_UNITS,
        }
    }
}

impl ContextConfig {
    pub fn with_dimensions(mut self, width: u32, height: u32) -> ContextConfig {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the capacity of every resource registry at once
    pub fn with_capacity(mut self, capacity: usize) -> ContextConfig {
        self.buffer_capacity = capacity;
        self.vertex_array_capacity = capacity;
        self.texture_capacity = capacity;
        self.shader_capacity = capacity;
        self.program_capacity = capacity;
        self
    }

    pub fn with_texture_units(mut self, units: usize) -> ContextConfig {
        self.texture_units = units;
        self
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builders() {
        let config = ContextConfig::default().with_dimensions(4, 3).with_capacity(2);

        assert_eq!(config.dimensions(), Dimensions::new(4, 3));
        assert_eq!(config.program_capacity, 2);
        assert_eq!(config.texture_units, DEFAULT_TEXTURE_UNITS);
    }
}
