//! Colour type used by the colour buffer, textures and fragment shaders

use nalgebra::Vector4;

use crate::utils::clamp;

pub mod blend;

pub use self::blend::{Blend, BlendFactor, BlendFunc, GenericBlend};

/// RGBA 32-bit floating point colour, each channel nominally within `[0, 1]`
pub type Colour = Vector4<f32>;

#[inline]
pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Colour { Vector4::new(r, g, b, a) }

#[inline]
pub fn rgb(r: f32, g: f32, b: f32) -> Colour { Vector4::new(r, g, b, 1.0) }

/// Clamp every channel to `[0, 1]`, as a fixed-point colour buffer would
#[inline]
pub fn saturate(colour: Colour) -> Colour {
    colour.map(|channel| clamp(channel, 0.0, 1.0))
}

/// Rec. 709 relative luminance of the RGB channels
#[inline]
pub fn luminance(colour: &Colour) -> f32 {
    0.2126 * colour.x + 0.7152 * colour.y + 0.0722 * colour.z
}
