//! Vertex attribute formats and decoding of raw buffer bytes

use nalgebra::Vector4;

use crate::error::{RenderError, RenderResult};

/// Scalar type of each component of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Float,
    Double,
}

impl ComponentType {
    /// Size of one component in bytes
    #[inline]
    pub fn size(self) -> usize {
        match self {
            ComponentType::Byte | ComponentType::UnsignedByte => 1,
            ComponentType::Short | ComponentType::UnsignedShort => 2,
            ComponentType::Int | ComponentType::UnsignedInt | ComponentType::Float => 4,
            ComponentType::Double => 8,
        }
    }

    #[inline]
    fn bits(self) -> u8 {
        match self {
            ComponentType::Byte => 0,
            ComponentType::UnsignedByte => 1,
            ComponentType::Short => 2,
            ComponentType::UnsignedShort => 3,
            ComponentType::Int => 4,
            ComponentType::UnsignedInt => 5,
            ComponentType::Float => 6,
            ComponentType::Double => 7,
        }
    }

    #[inline]
    fn from_bits(bits: u8) -> ComponentType {
        match bits & 0b111 {
            0 => ComponentType::Byte,
            1 => ComponentType::UnsignedByte,
            2 => ComponentType::Short,
            3 => ComponentType::UnsignedShort,
            4 => ComponentType::Int,
            5 => ComponentType::UnsignedInt,
            6 => ComponentType::Float,
            _ => ComponentType::Double,
        }
    }

    /// Decode one little-endian component. `bytes` must hold at least `self.size()` bytes.
    fn read(self, bytes: &[u8], normalize: bool) -> f32 {
        macro_rules! read_int {
            ($t:ty, $n:expr) => {{
                let mut raw = [0u8; $n];
                raw.copy_from_slice(&bytes[..$n]);
                let value = <$t>::from_le_bytes(raw);

                if normalize { normalize_int(value as f64, <$t>::MIN as f64, <$t>::MAX as f64) } else { value as f32 }
            }}
        }

        match self {
            ComponentType::Byte => read_int!(i8, 1),
            ComponentType::UnsignedByte => read_int!(u8, 1),
            ComponentType::Short => read_int!(i16, 2),
            ComponentType::UnsignedShort => read_int!(u16, 2),
            ComponentType::Int => read_int!(i32, 4),
            ComponentType::UnsignedInt => read_int!(u32, 4),
            ComponentType::Float => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&bytes[..4]);
                f32::from_le_bytes(raw)
            }
            ComponentType::Double => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&bytes[..8]);
                f64::from_le_bytes(raw) as f32
            }
        }
    }
}

/// Fixed-point normalization: signed integers map to `[-1, 1]`, unsigned to `[0, 1]`.
#[inline]
fn normalize_int(value: f64, min: f64, max: f64) -> f32 {
    if min < 0.0 {
        (value / max).max(-1.0) as f32
    } else {
        (value / max) as f32
    }
}

/// Packed attribute format: component type in bits 0-2, `count - 1` in bits 3-6
/// and the normalize flag in bit 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeFormat(u8);

impl AttributeFormat {
    pub fn new(ty: ComponentType, count: u8, normalize: bool) -> RenderResult<AttributeFormat> {
        if count < 1 || count > 4 {
            return Err(RenderError::InvalidValue(format!("attribute component count {} is not within 1..=4", count)));
        }

        Ok(AttributeFormat(ty.bits() | ((count - 1) << 3) | ((normalize as u8) << 7)))
    }

    #[inline]
    pub fn from_bits(bits: u8) -> AttributeFormat { AttributeFormat(bits) }

    #[inline]
    pub fn bits(self) -> u8 { self.0 }

    #[inline]
    pub fn component_type(self) -> ComponentType { ComponentType::from_bits(self.0) }

    /// Number of components, clamped to four for packed values outside the valid range
    #[inline]
    pub fn count(self) -> usize { (((self.0 >> 3) & 0b1111) as usize + 1).min(4) }

    #[inline]
    pub fn normalized(self) -> bool { self.0 & 0x80 != 0 }

    /// Size in bytes of one tightly packed attribute value
    #[inline]
    pub fn size(self) -> usize { self.count() * self.component_type().size() }

    /// Decode one attribute value from the start of `bytes`.
    ///
    /// Components the format does not provide default to `(0, 0, 0, 1)`.
    pub fn decode(self, bytes: &[u8]) -> RenderResult<Vector4<f32>> {
        let ty = self.component_type();
        let size = ty.size();
        let normalize = self.normalized();

        if bytes.len() < self.size() {
            return Err(RenderError::InvalidValue(
                format!("attribute needs {} bytes, only {} remain in the buffer", self.size(), bytes.len())));
        }

        let mut value = Vector4::new(0.0, 0.0, 0.0, 1.0);

        for i in 0..self.count() {
            value[i] = ty.read(&bytes[i * size..], normalize);
        }

        Ok(value)
    }
}
