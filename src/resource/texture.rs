//! 2D textures, their sampling parameters and the texture unit bindings

use nalgebra::Vector2;

use crate::colour::Colour;
use crate::error::{RenderError, RenderResult, Resource};
use crate::framebuffer::DepthFunc;
use crate::geometry::Dimensions;

use super::{Handle, Pooled, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextureTarget {
    Texture2D,
}

/// Texture coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Wrap {
    /// Equivalent to `GL_REPEAT`
    Repeat,
    /// Equivalent to `GL_MIRRORED_REPEAT`
    MirroredRepeat,
    /// Equivalent to `GL_CLAMP_TO_EDGE`
    ClampToEdge,
    /// Equivalent to `GL_CLAMP_TO_BORDER`
    ClampToBorder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Filter {
    Nearest,
    /// Bilinear
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareMode {
    None,
    CompareRefToTexture,
}

/// Source of one output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Swizzle {
    Red,
    Green,
    Blue,
    Alpha,
    Zero,
    One,
}

/// Channels of uploaded pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelFormat {
    Red,
    Rg,
    Rgb,
    Rgba,
}

impl PixelFormat {
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Red => 1,
            PixelFormat::Rg => 2,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Component type of uploaded pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelType {
    UnsignedByte,
    Float,
}

impl PixelType {
    #[inline]
    pub fn size(self) -> usize {
        match self {
            PixelType::UnsignedByte => 1,
            PixelType::Float => 4,
        }
    }
}

/// Arguments of `tex_parameter`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextureParameter {
    WrapS(Wrap),
    WrapT(Wrap),
    MinFilter(Filter),
    MagFilter(Filter),
    BorderColour(Colour),
    CompareMode(CompareMode),
    CompareFunc(DepthFunc),
    Swizzle([Swizzle; 4]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplerParams {
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub border: Colour,
    pub compare_mode: CompareMode,
    pub compare_func: DepthFunc,
    pub swizzle: [Swizzle; 4],
}

impl Default for SamplerParams {
    fn default() -> SamplerParams {
        SamplerParams {
            wrap_s: Wrap::Repeat,
            wrap_t: Wrap::Repeat,
            min_filter: Filter::Nearest,
            mag_filter: Filter::Linear,
            border: Colour::zeros(),
            compare_mode: CompareMode::None,
            compare_func: DepthFunc::LessEqual,
            swizzle: [Swizzle::Red, Swizzle::Green, Swizzle::Blue, Swizzle::Alpha],
        }
    }
}

impl SamplerParams {
    pub fn apply(&mut self, param: TextureParameter) {
        match param {
            TextureParameter::WrapS(wrap) => self.wrap_s = wrap,
            TextureParameter::WrapT(wrap) => self.wrap_t = wrap,
            TextureParameter::MinFilter(filter) => self.min_filter = filter,
            TextureParameter::MagFilter(filter) => self.mag_filter = filter,
            TextureParameter::BorderColour(colour) => self.border = colour,
            TextureParameter::CompareMode(mode) => self.compare_mode = mode,
            TextureParameter::CompareFunc(func) => self.compare_func = func,
            TextureParameter::Swizzle(swizzle) => self.swizzle = swizzle,
        }
    }
}

/// Wrap an integer texel coordinate into `0..size`, or `None` for border texels
#[inline]
fn wrap_coord(wrap: Wrap, coord: i64, size: i64) -> Option<i64> {
    match wrap {
        Wrap::Repeat => Some(coord.rem_euclid(size)),
        Wrap::MirroredRepeat => {
            let m = coord.rem_euclid(2 * size);

            Some(if m < size { m } else { 2 * size - 1 - m })
        }
        Wrap::ClampToEdge => Some(coord.max(0).min(size - 1)),
        Wrap::ClampToBorder => if coord >= 0 && coord < size { Some(coord) } else { None },
    }
}

/// A 2D array of colours. Row zero is at `t = 0`.
#[derive(Debug, Clone, Default)]
pub struct Texture {
    dimensions: Option<Dimensions>,
    texels: Vec<Colour>,
    params: SamplerParams,
}

impl Pooled for Texture {
    const KIND: Resource = Resource::Texture;
}

impl Texture {
    /// `None` until image data has been specified
    #[inline]
    pub fn dimensions(&self) -> Option<Dimensions> { self.dimensions }

    #[inline]
    pub fn params(&self) -> &SamplerParams { &self.params }

    #[inline]
    pub fn set_parameter(&mut self, param: TextureParameter) { self.params.apply(param) }

    /// Replace the image with already decoded texels
    pub fn set_texels(&mut self, width: u32, height: u32, texels: Vec<Colour>) -> RenderResult<()> {
        let dimensions = Dimensions::new(width, height);

        if texels.len() != dimensions.area() {
            return Err(RenderError::InvalidValue(format!("{}x{} texture given {} texels", width, height, texels.len())));
        }

        self.dimensions = if dimensions.area() == 0 { None } else { Some(dimensions) };
        self.texels = texels;

        Ok(())
    }

    /// Decode raw pixel data, tightly packed and little-endian for `PixelType::Float`.
    ///
    /// Channels not present in `format` default to `(0, 0, 0, 1)`.
    pub fn set_image(&mut self, width: u32, height: u32, format: PixelFormat, ty: PixelType, data: &[u8]) -> RenderResult<()> {
        let channels = format.channels();
        let texel_size = channels * ty.size();
        let expected = Dimensions::new(width, height).area() * texel_size;

        if data.len() != expected {
            return Err(RenderError::InvalidValue(format!("{}x{} {:?} image needs {} bytes, got {}", width, height, format, expected, data.len())));
        }

        let texels = data.chunks_exact(texel_size).map(|texel| {
            let mut colour = Colour::new(0.0, 0.0, 0.0, 1.0);

            for (channel, bytes) in texel.chunks_exact(ty.size()).enumerate() {
                colour[channel] = match ty {
                    PixelType::UnsignedByte => bytes[0] as f32 / 255.0,
                    PixelType::Float => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
                };
            }

            colour
        }).collect();

        self.set_texels(width, height, texels)
    }

    /// Texel at integer coordinates, after wrapping. Border texels use the border colour.
    fn fetch(&self, dimensions: Dimensions, x: i64, y: i64) -> Colour {
        let (w, h) = (dimensions.width as i64, dimensions.height as i64);

        match (wrap_coord(self.params.wrap_s, x, w), wrap_coord(self.params.wrap_t, y, h)) {
            (Some(x), Some(y)) => self.texels[(y * w + x) as usize],
            _ => self.params.border,
        }
    }

    /// Filter the texels around `uv`, mapping each through `texel` first
    fn filter<F>(&self, uv: Vector2<f32>, texel: F) -> Colour where F: Fn(Colour) -> Colour {
        let dimensions = match self.dimensions {
            Some(dimensions) => dimensions,
            None => return Colour::new(0.0, 0.0, 0.0, 1.0),
        };

        let u = uv.x * dimensions.width as f32;
        let v = uv.y * dimensions.height as f32;

        // No screen-space derivatives are available, so magnification filtering is always used
        match self.params.mag_filter {
            Filter::Nearest => texel(self.fetch(dimensions, u.floor() as i64, v.floor() as i64)),
            Filter::Linear => {
                let (u, v) = (u - 0.5, v - 0.5);
                let (x0, y0) = (u.floor(), v.floor());
                let (fx, fy) = (u - x0, v - y0);
                let (x0, y0) = (x0 as i64, y0 as i64);

                let top = texel(self.fetch(dimensions, x0, y0)) * (1.0 - fx) + texel(self.fetch(dimensions, x0 + 1, y0)) * fx;
                let bottom = texel(self.fetch(dimensions, x0, y0 + 1)) * (1.0 - fx) + texel(self.fetch(dimensions, x0 + 1, y0 + 1)) * fx;

                top * (1.0 - fy) + bottom * fy
            }
        }
    }

    fn swizzle(&self, colour: Colour) -> Colour {
        Colour::from_fn(|i, _| match self.params.swizzle[i] {
            Swizzle::Red => colour.x,
            Swizzle::Green => colour.y,
            Swizzle::Blue => colour.z,
            Swizzle::Alpha => colour.w,
            Swizzle::Zero => 0.0,
            Swizzle::One => 1.0,
        })
    }

    /// Filtered and swizzled colour at normalized texture coordinates.
    ///
    /// A texture without image data samples as opaque black.
    pub fn sample(&self, uv: Vector2<f32>) -> Colour {
        self.swizzle(self.filter(uv, |colour| colour))
    }

    /// Depth comparison of `reference` against the red channel, filtered like `sample`.
    ///
    /// Returns the red channel unchanged when the compare mode is `None`.
    pub fn sample_compare(&self, uv: Vector2<f32>, reference: f32) -> f32 {
        match self.params.compare_mode {
            CompareMode::None => self.filter(uv, |colour| colour).x,
            CompareMode::CompareRefToTexture => {
                let func = self.params.compare_func;

                self.filter(uv, |colour| {
                    Colour::repeat(if func.test(reference, colour.x) { 1.0 } else { 0.0 })
                }).x
            }
        }
    }
}

/// Which texture is bound to each unit, and the active unit
#[derive(Debug, Clone)]
pub struct TextureUnits {
    units: Vec<Option<Handle<Texture>>>,
    active: usize,
}

impl TextureUnits {
    pub fn new(count: usize) -> TextureUnits {
        TextureUnits { units: vec![None; count], active: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize { self.units.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.units.is_empty() }

    #[inline]
    pub fn active(&self) -> usize { self.active }

    pub fn set_active(&mut self, unit: usize) -> RenderResult<()> {
        if unit >= self.units.len() {
            return Err(RenderError::InvalidValue(format!("texture unit {} exceeds the {} available", unit, self.units.len())));
        }

        self.active = unit;

        Ok(())
    }

    /// Bind to the active unit
    #[inline]
    pub fn bind(&mut self, texture: Option<Handle<Texture>>) {
        self.units[self.active] = texture;
    }

    #[inline]
    pub fn get(&self, unit: usize) -> Option<Handle<Texture>> {
        self.units.get(unit).copied().flatten()
    }

    /// Clear `texture` from every unit, returning how many were cleared
    pub fn unbind_all(&mut self, texture: Handle<Texture>) -> usize {
        let mut cleared = 0;

        for unit in self.units.iter_mut().filter(|unit| **unit == Some(texture)) {
            *unit = None;
            cleared += 1;
        }

        cleared
    }
}

/// Texture lookup by unit for fragment shaders
pub struct TextureSampler<'a> {
    units: &'a TextureUnits,
    textures: &'a Registry<Texture>,
}

impl<'a> TextureSampler<'a> {
    pub fn new(units: &'a TextureUnits, textures: &'a Registry<Texture>) -> TextureSampler<'a> {
        TextureSampler { units, textures }
    }

    pub fn texture(&self, unit: u32) -> RenderResult<&'a Texture> {
        if unit as usize >= self.units.len() {
            return Err(RenderError::InvalidValue(format!("sampler references texture unit {}", unit)));
        }

        let handle = self.units.get(unit as usize).ok_or(RenderError::UnboundResource(Resource::Texture))?;

        self.textures.get(handle)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn checker() -> Texture {
        let mut texture = Texture::default();

        texture.set_image(2, 2, PixelFormat::Red, PixelType::UnsignedByte, &[0, 255, 255, 0]).unwrap();
        texture.set_parameter(TextureParameter::MagFilter(Filter::Nearest));
        texture
    }

    #[test]
    fn test_image_decode_defaults() {
        let texture = checker();

        assert_eq!(texture.dimensions(), Some(Dimensions::new(2, 2)));
        assert_eq!(texture.sample(Vector2::new(0.75, 0.25)), Colour::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(texture.sample(Vector2::new(0.25, 0.25)), Colour::new(0.0, 0.0, 0.0, 1.0));

        let mut wrong = Texture::default();

        assert!(wrong.set_image(2, 2, PixelFormat::Rgba, PixelType::Float, &[0; 16]).is_err());
    }

    #[test]
    fn test_wrap_modes() {
        assert_eq!(wrap_coord(Wrap::Repeat, -1, 4), Some(3));
        assert_eq!(wrap_coord(Wrap::Repeat, 5, 4), Some(1));
        assert_eq!(wrap_coord(Wrap::MirroredRepeat, 4, 4), Some(3));
        assert_eq!(wrap_coord(Wrap::MirroredRepeat, -1, 4), Some(0));
        assert_eq!(wrap_coord(Wrap::ClampToEdge, 9, 4), Some(3));
        assert_eq!(wrap_coord(Wrap::ClampToBorder, 4, 4), None);

        let mut texture = checker();

        texture.set_parameter(TextureParameter::WrapS(Wrap::ClampToBorder));
        texture.set_parameter(TextureParameter::BorderColour(Colour::new(0.0, 1.0, 0.0, 1.0)));

        assert_eq!(texture.sample(Vector2::new(1.5, 0.25)), Colour::new(0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn test_linear_filter_centre() {
        let mut texture = checker();

        texture.set_parameter(TextureParameter::MagFilter(Filter::Linear));
        texture.set_parameter(TextureParameter::WrapS(Wrap::ClampToEdge));
        texture.set_parameter(TextureParameter::WrapT(Wrap::ClampToEdge));

        let centre = texture.sample(Vector2::new(0.5, 0.5));

        assert!((centre.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_swizzle_and_compare() {
        let mut texture = checker();

        texture.set_parameter(TextureParameter::Swizzle([Swizzle::Red, Swizzle::Red, Swizzle::Red, Swizzle::One]));

        assert_eq!(texture.sample(Vector2::new(0.75, 0.25)), Colour::new(1.0, 1.0, 1.0, 1.0));

        texture.set_parameter(TextureParameter::CompareMode(CompareMode::CompareRefToTexture));

        assert_eq!(texture.sample_compare(Vector2::new(0.75, 0.25), 0.5), 1.0);
        assert_eq!(texture.sample_compare(Vector2::new(0.25, 0.25), 0.5), 0.0);
    }

    #[test]
    fn test_unit_bindings() {
        let mut units = TextureUnits::new(4);
        let mut textures = Registry::with_capacity(2);
        let handle = textures.create(checker()).unwrap();

        units.set_active(2).unwrap();
        units.bind(Some(handle));

        assert!(units.set_active(4).is_err());

        let sampler = TextureSampler::new(&units, &textures);

        assert!(sampler.texture(2).is_ok());
        assert_eq!(sampler.texture(0).unwrap_err(), RenderError::UnboundResource(Resource::Texture));

        assert_eq!(units.unbind_all(handle), 1);
        assert_eq!(units.get(2), None);
    }
}
