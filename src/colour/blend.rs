//! Defines colour blending trait and standard blend function handling

use super::{saturate, Colour};

/// Defines some kind of colour blending function
pub trait Blend: Send + Sync {
    /// The first parameter passed to the blend function is the output of the fragment shader, the source colour.
    ///
    /// The second parameter passed to the blend function is the existing value in the colour buffer to blend over.
    fn blend(&self, src: Colour, dst: Colour) -> Colour;
}

impl<'a, B> Blend for &'a B where B: Blend {
    fn blend(&self, src: Colour, dst: Colour) -> Colour {
        (**self).blend(src, dst)
    }
}

/// Replaces the destination
impl Blend for () {
    #[inline(always)]
    fn blend(&self, src: Colour, _: Colour) -> Colour { src }
}

/// Equivalent to the `GL_*` blend factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendFactor {
    Zero,
    One,
    SrcColour,
    OneMinusSrcColour,
    DstColour,
    OneMinusDstColour,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

impl BlendFactor {
    #[inline]
    fn weight(self, src: &Colour, dst: &Colour) -> Colour {
        let one = Colour::repeat(1.0);

        match self {
            BlendFactor::Zero => Colour::zeros(),
            BlendFactor::One => one,
            BlendFactor::SrcColour => *src,
            BlendFactor::OneMinusSrcColour => one - src,
            BlendFactor::DstColour => *dst,
            BlendFactor::OneMinusDstColour => one - dst,
            BlendFactor::SrcAlpha => Colour::repeat(src.w),
            BlendFactor::OneMinusSrcAlpha => Colour::repeat(1.0 - src.w),
            BlendFactor::DstAlpha => Colour::repeat(dst.w),
            BlendFactor::OneMinusDstAlpha => Colour::repeat(1.0 - dst.w),
        }
    }
}

/// `src * src_factor + dst * dst_factor`, like `glBlendFunc` with `GL_FUNC_ADD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    pub fn new(src: BlendFactor, dst: BlendFactor) -> BlendFunc {
        BlendFunc { src, dst }
    }
}

/// Standard alpha-over
impl Default for BlendFunc {
    fn default() -> BlendFunc {
        BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
    }
}

impl Blend for BlendFunc {
    fn blend(&self, src: Colour, dst: Colour) -> Colour {
        let s = self.src.weight(&src, &dst);
        let d = self.dst.weight(&src, &dst);

        saturate(src.component_mul(&s) + dst.component_mul(&d))
    }
}

/// Generic blend structure that can accept a user-defined blend function
pub struct GenericBlend<F> {
    blend_func: F,
}

impl<F> GenericBlend<F> where F: Fn(Colour, Colour) -> Colour + Send + Sync {
    pub fn new(blend_func: F) -> GenericBlend<F> {
        GenericBlend { blend_func }
    }
}

impl<F> Blend for GenericBlend<F> where F: Fn(Colour, Colour) -> Colour + Send + Sync {
    fn blend(&self, src: Colour, dst: Colour) -> Colour {
        (self.blend_func)(src, dst)
    }
}
