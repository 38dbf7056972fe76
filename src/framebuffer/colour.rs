//! Colour buffer attachment

use crate::colour::Colour;
use crate::geometry::{Coordinate, Dimensions, HasDimensions};

#[derive(Debug, Clone)]
pub struct ColourBuffer {
    dimensions: Dimensions,
    pixels: Vec<Colour>,
}

impl HasDimensions for ColourBuffer {
    fn dimensions(&self) -> Dimensions { self.dimensions }
}

impl ColourBuffer {
    pub fn new(dimensions: Dimensions, colour: Colour) -> ColourBuffer {
        ColourBuffer { dimensions, pixels: vec![colour; dimensions.area()] }
    }

    #[inline]
    pub fn clear(&mut self, colour: Colour) {
        for pixel in &mut self.pixels {
            *pixel = colour;
        }
    }

    #[inline]
    pub fn get(&self, coord: Coordinate) -> Option<Colour> {
        self.dimensions.index_of(coord).map(|index| self.pixels[index])
    }

    /// Pixel at a row-major index
    #[inline]
    pub fn pixel(&self, index: usize) -> Colour { self.pixels[index] }

    #[inline]
    pub fn pixel_mut(&mut self, index: usize) -> &mut Colour { &mut self.pixels[index] }

    #[inline]
    pub fn as_slice(&self) -> &[Colour] { &self.pixels }
}
