//! Primitive modes and index decoding for draw calls

use crate::error::{RenderError, RenderResult};

/// Defines how a sequence of vertices is assembled into triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrawMode {
    /// Every three vertices form an independent triangle. Leftover vertices are ignored.
    Triangles,
    /// Each vertex after the second forms a triangle with the two before it.
    ///
    /// Every other triangle is flipped so the whole strip keeps the winding of the first.
    TriangleStrip,
    /// Each vertex after the second forms a triangle with the previous vertex and the first.
    TriangleFan,
}

impl DrawMode {
    /// Number of triangles assembled from `count` vertices
    pub fn triangle_count(self, count: usize) -> usize {
        match self {
            DrawMode::Triangles => count / 3,
            DrawMode::TriangleStrip | DrawMode::TriangleFan => count.saturating_sub(2),
        }
    }

    /// Positions within the vertex sequence of the `i`th triangle
    #[inline]
    pub fn triangle(self, i: usize) -> [usize; 3] {
        match self {
            DrawMode::Triangles => [i * 3, i * 3 + 1, i * 3 + 2],
            DrawMode::TriangleStrip if i % 2 == 0 => [i, i + 1, i + 2],
            DrawMode::TriangleStrip => [i + 1, i, i + 2],
            DrawMode::TriangleFan => [0, i + 1, i + 2],
        }
    }

    /// Iterate over every triangle assembled from `count` vertices
    pub fn triangles(self, count: usize) -> impl Iterator<Item=[usize; 3]> {
        (0..self.triangle_count(count)).map(move |i| self.triangle(i))
    }
}

/// Type of the values stored in an element array buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexType {
    UnsignedByte,
    UnsignedShort,
    UnsignedInt,
}

impl IndexType {
    #[inline]
    pub fn size(self) -> usize {
        match self {
            IndexType::UnsignedByte => 1,
            IndexType::UnsignedShort => 2,
            IndexType::UnsignedInt => 4,
        }
    }

    /// Decode `count` little-endian indices from the start of `bytes`
    pub fn decode(self, bytes: &[u8], count: usize) -> RenderResult<Vec<u32>> {
        let size = self.size();

        let needed = count.checked_mul(size).filter(|&needed| needed <= bytes.len()).ok_or_else(|| {
            RenderError::InvalidValue(format!("{} indices of {} bytes exceed the {} bytes available", count, size, bytes.len()))
        })?;

        Ok(bytes[..needed].chunks_exact(size).map(|index| match self {
            IndexType::UnsignedByte => index[0] as u32,
            IndexType::UnsignedShort => u16::from_le_bytes([index[0], index[1]]) as u32,
            IndexType::UnsignedInt => u32::from_le_bytes([index[0], index[1], index[2], index[3]]),
        }).collect())
    }
}
