//! Transient per-draw vertex storage

use std::convert::TryFrom;

use nalgebra::Vector4;

use crate::error::{RenderError, RenderResult};
use crate::geometry::ClipVertex;

/// Index of the last vertex in `first..first + count`, if the range is non-empty and fits in `u32`
#[inline]
pub fn last_index(first: u32, count: usize) -> Option<u32> {
    count.checked_sub(1)
         .and_then(|last| u32::try_from(last).ok())
         .and_then(|last| first.checked_add(last))
}

/// Clip-space positions and packed varyings of every vertex in the current draw's index range.
///
/// Reused between draw calls, so only grows.
#[derive(Debug, Clone, Default)]
pub struct DrawStorage {
    base: u32,
    stride: usize,
    positions: Vec<Vector4<f32>>,
    varyings: Vec<f32>,
}

impl DrawStorage {
    /// Clear and size the storage for `count` vertices starting at index `base`.
    ///
    /// Sizes that overflow or cannot be allocated are an `InvalidValue`, leaving the storage empty.
    pub fn reset(&mut self, base: u32, count: usize, stride: usize) -> RenderResult<()> {
        self.base = base;
        self.stride = stride;

        self.positions.clear();
        self.varyings.clear();

        if count > 0 && last_index(base, count).is_none() {
            return Err(RenderError::InvalidValue(format!("vertex range {} + {} exceeds the u32 index space", base, count)));
        }

        let too_large = || RenderError::InvalidValue(format!("cannot allocate storage for {} vertices of {} varyings", count, stride));

        let floats = count.checked_mul(stride).ok_or_else(too_large)?;

        self.positions.try_reserve_exact(count).map_err(|_| too_large())?;
        self.varyings.try_reserve_exact(floats).map_err(|_| too_large())?;

        self.positions.resize(count, Vector4::zeros());
        self.varyings.resize(floats, 0.0);

        Ok(())
    }

    #[inline]
    pub fn base(&self) -> u32 { self.base }

    #[inline]
    pub fn len(&self) -> usize { self.positions.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.positions.is_empty() }

    #[inline]
    pub fn stride(&self) -> usize { self.stride }

    /// Position and varying outputs of the vertex at `slot`, for the vertex stage to fill in
    #[inline]
    pub fn slot_mut(&mut self, slot: usize) -> (&mut Vector4<f32>, &mut [f32]) {
        let stride = self.stride;

        (&mut self.positions[slot], &mut self.varyings[slot * stride..(slot + 1) * stride])
    }

    /// Copy out the vertex with the given draw index
    #[inline]
    pub fn clip_vertex(&self, index: u32) -> ClipVertex {
        let slot = (index - self.base) as usize;
        let stride = self.stride;

        ClipVertex::new(self.positions[slot], self.varyings[slot * stride..(slot + 1) * stride].iter().copied().collect())
    }
}
