//! Depth buffer and depth comparison functions

use crate::geometry::{Coordinate, Dimensions, HasDimensions};

/// Defines tests which can be performed on depth values
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DepthFunc {
    /// Always pass
    Always,
    /// Never pass
    Never,
    /// Pass if the new value is less than the stored one
    Less,
    /// Pass if the new value is greater than the stored one
    Greater,
    /// Pass if the new value is less than or equal to the stored one
    LessEqual,
    /// Pass if the new value is greater than or equal to the stored one
    GreaterEqual,
    /// Pass only if the new value is equal to the stored one
    Equal,
    /// Pass only if the new value is NOT equal to the stored one
    NotEqual,
}

impl Default for DepthFunc {
    fn default() -> DepthFunc { DepthFunc::Less }
}

impl DepthFunc {
    /// Compare an incoming `value` against the `stored` one
    #[inline]
    pub fn test(self, value: f32, stored: f32) -> bool {
        match self {
            DepthFunc::Always => true,
            DepthFunc::Never => false,
            DepthFunc::Less => value < stored,
            DepthFunc::LessEqual => value <= stored,
            DepthFunc::Greater => value > stored,
            DepthFunc::GreaterEqual => value >= stored,
            DepthFunc::Equal => value == stored,
            DepthFunc::NotEqual => value != stored,
        }
    }
}

/// One `f32` depth value per framebuffer pixel
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    dimensions: Dimensions,
    values: Vec<f32>,
}

impl HasDimensions for DepthBuffer {
    fn dimensions(&self) -> Dimensions { self.dimensions }
}

impl DepthBuffer {
    pub fn new(dimensions: Dimensions, value: f32) -> DepthBuffer {
        DepthBuffer { dimensions, values: vec![value; dimensions.area()] }
    }

    #[inline]
    pub fn clear(&mut self, value: f32) {
        for stored in &mut self.values {
            *stored = value;
        }
    }

    #[inline]
    pub fn get(&self, coord: Coordinate) -> Option<f32> {
        self.dimensions.index_of(coord).map(|index| self.values[index])
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] { &self.values }

    /// Test `value` against the pixel at `index` and, if it passes and `write` is set, store it.
    ///
    /// Returns whether the test passed.
    #[inline]
    pub fn test_and_commit(&mut self, index: usize, value: f32, func: DepthFunc, write: bool) -> bool {
        let stored = &mut self.values[index];

        if func.test(value, *stored) {
            if write {
                *stored = value;
            }

            true
        } else {
            false
        }
    }
}
