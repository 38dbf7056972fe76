//! Conversions between the `image` crate and colour buffers or textures

use image::{Rgba, RgbaImage};

use crate::colour::Colour;
use crate::error::{RenderError, RenderResult};
use crate::framebuffer::ColourBuffer;
use crate::geometry::HasDimensions;
use crate::resource::Texture;

#[inline]
fn to_unorm8(channel: f32) -> u8 {
    (channel.max(0.0).min(1.0) * 255.0).round() as u8
}

pub trait ImageColourBuffer {
    fn copy_to_image(&self) -> RenderResult<RgbaImage>;
}

impl ImageColourBuffer for ColourBuffer {
    fn copy_to_image(&self) -> RenderResult<RgbaImage> {
        let dimensions = self.dimensions();

        let mut raw = Vec::with_capacity(dimensions.area() * 4);

        for colour in self.as_slice() {
            raw.extend(colour.iter().map(|&channel| to_unorm8(channel)));
        }

        RgbaImage::from_raw(dimensions.width, dimensions.height, raw)
            .ok_or_else(|| RenderError::InvalidValue(format!("cannot build a {}x{} image", dimensions.width, dimensions.height)))
    }
}

/// Replace the texture's image with the contents of `image`. Row zero of the image becomes `t = 0`.
pub fn upload_image(texture: &mut Texture, image: &RgbaImage) -> RenderResult<()> {
    let texels = image.pixels().map(|&Rgba([r, g, b, a])| {
        Colour::new(r as f32, g as f32, b as f32, a as f32) / 255.0
    }).collect();

    texture.set_texels(image.width(), image.height(), texels)
}

#[cfg(test)]
mod test {
    use nalgebra::Vector2;

    use crate::geometry::Dimensions;
    use crate::resource::{Filter, TextureParameter};

    use super::*;

    #[test]
    fn test_colour_buffer_to_image() {
        let mut buffer = ColourBuffer::new(Dimensions::new(2, 1), Colour::new(0.0, 0.0, 0.0, 1.0));

        *buffer.pixel_mut(1) = Colour::new(1.0, 0.5, 2.0, 1.0);

        let image = buffer.copy_to_image().unwrap();

        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(1, 0), &Rgba([255, 128, 255, 255]));
    }

    #[test]
    fn test_upload_image() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(1, 0, Rgba([255, 0, 0, 255]));

        let mut texture = Texture::default();
        upload_image(&mut texture, &image).unwrap();
        texture.set_parameter(TextureParameter::MagFilter(Filter::Nearest));

        assert_eq!(texture.sample(Vector2::new(0.75, 0.5)), Colour::new(1.0, 0.0, 0.0, 1.0));
    }
}
