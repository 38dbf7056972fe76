use nalgebra::Vector4;

use crate::interpolate::Interpolate;
use crate::shader::VaryingRecord;

use super::{Dimensions, ScreenVertex};

/// Below this magnitude `w` is treated as zero
pub const W_EPSILON: f32 = 1e-6;

/// The `w` perspective-corrected varyings are stored divided by. Values within `W_EPSILON`
/// of zero cannot be divided by, so those varyings are stored as written.
#[inline]
pub fn perspective_weight(w: f32) -> f32 {
    if w.abs() > W_EPSILON { w } else { 1.0 }
}

/// Defines a vertex and its varyings in clip-space, which is produced by the vertex shader stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipVertex {
    /// Clip-space vertex position. This isn't very useful to the user unless normalized.
    pub position: Vector4<f32>,
    /// Packed varyings, already divided by `position.w` when perspective correction is enabled
    pub varyings: VaryingRecord,
}

impl ClipVertex {
    /// Creates a new `ClipVertex` from the given clip-space position and varyings
    #[inline(always)]
    pub fn new(position: Vector4<f32>, varyings: VaryingRecord) -> ClipVertex {
        ClipVertex { position, varyings }
    }

    /// Interpolate between two clip-space vertices.
    ///
    /// With `perspective` set the varyings are stored divided by `w`, which is not linear in
    /// clip-space, so they are multiplied back before interpolating and divided by the new `w` after.
    /// Every `w` goes through `perspective_weight` first, the same as in the vertex stage.
    pub fn lerp(t: f32, a: &ClipVertex, b: &ClipVertex, perspective: bool) -> ClipVertex {
        let position: Vector4<f32> = Interpolate::linear_interpolate(t, &a.position, &b.position);

        let varyings = if perspective {
            let (wa, wb, w) = (perspective_weight(a.position.w), perspective_weight(b.position.w), perspective_weight(position.w));

            a.varyings.iter().zip(b.varyings.iter())
             .map(|(&va, &vb)| ((1.0 - t) * va * wa + t * vb * wb) / w)
             .collect()
        } else {
            Interpolate::linear_interpolate(t, &a.varyings, &b.varyings)
        };

        ClipVertex { position, varyings }
    }

    /// Normalizes the clip-space vertex coordinates to screen-space using the given viewport.
    ///
    /// This assumes a viewport in the shape of:
    ///
    /// ```text
    /// 0,0-----------------x
    ///  |                  |
    ///  |                  |
    ///  |                  |
    ///  |                  |
    ///  |                  |
    ///  y-----------------x,y
    /// ```
    ///
    /// where the y-axis is flipped. The resulting `z` is `z / w` and `w` holds `1 / w`.
    pub fn normalize(self, viewport: Dimensions) -> ScreenVertex {
        ScreenVertex {
            position: self.screen_position(viewport),
            varyings: self.varyings,
        }
    }

    /// The screen-space position `normalize` would produce, leaving the vertex in place
    pub fn screen_position(&self, viewport: Dimensions) -> Vector4<f32> {
        let (width, height) = (viewport.width as f32, viewport.height as f32);

        let (x, y, z, w) = (self.position.x, self.position.y, self.position.z, self.position.w);

        Vector4::new(
            (1.0 + x / w) * width / 2.0,
            (1.0 - y / w) * height / 2.0,
            z / w,
            1.0 / w,
        )
    }
}
