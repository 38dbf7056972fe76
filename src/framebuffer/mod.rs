//! Framebuffer holding the colour and depth attachments a draw call renders into

use crate::colour::Colour;
use crate::error::{RenderError, RenderResult};
use crate::geometry::{Coordinate, Dimensions, HasDimensions};

pub mod colour;
pub mod depth;

pub use self::colour::ColourBuffer;
pub use self::depth::{DepthBuffer, DepthFunc};

#[derive(Debug, Clone)]
pub struct Framebuffer {
    dimensions: Dimensions,
    colour: ColourBuffer,
    depth: DepthBuffer,
}

impl HasDimensions for Framebuffer {
    fn dimensions(&self) -> Dimensions { self.dimensions }
}

impl Framebuffer {
    /// Creates a framebuffer cleared to transparent black and the farthest depth
    pub fn new(dimensions: Dimensions) -> Framebuffer {
        Framebuffer {
            dimensions,
            colour: ColourBuffer::new(dimensions, Colour::zeros()),
            depth: DepthBuffer::new(dimensions, 1.0),
        }
    }

    #[inline]
    pub fn colour(&self) -> &ColourBuffer { &self.colour }

    #[inline]
    pub fn depth(&self) -> &DepthBuffer { &self.depth }

    /// Both attachments, borrowed mutably at once
    #[inline]
    pub fn attachments_mut(&mut self) -> (&mut ColourBuffer, &mut DepthBuffer) {
        (&mut self.colour, &mut self.depth)
    }

    pub fn read_pixel(&self, x: u32, y: u32) -> RenderResult<Colour> {
        self.colour.get(Coordinate::new(x, y)).ok_or(RenderError::InvalidPixelCoordinate)
    }

    pub fn depth_at(&self, x: u32, y: u32) -> RenderResult<f32> {
        self.depth.get(Coordinate::new(x, y)).ok_or(RenderError::InvalidPixelCoordinate)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_out_of_range_reads() {
        let framebuffer = Framebuffer::new(Dimensions::new(4, 4));

        assert_eq!(framebuffer.read_pixel(3, 3).unwrap(), Colour::zeros());
        assert_eq!(framebuffer.depth_at(0, 0).unwrap(), 1.0);
        assert_eq!(framebuffer.read_pixel(4, 0), Err(RenderError::InvalidPixelCoordinate));
        assert_eq!(framebuffer.depth_at(0, 4), Err(RenderError::InvalidPixelCoordinate));
    }
}
