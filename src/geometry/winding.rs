//! Screen-space triangle winding

use nalgebra::Vector4;

/// Twice the signed area of a screen-space triangle, with `y` pointing down.
///
/// Positive for clockwise triangles as seen on screen.
#[inline]
pub fn signed_area(a: &Vector4<f32>, b: &Vector4<f32>, c: &Vector4<f32>) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

/// Order in which a triangle's vertices appear on the final image.
///
/// Triangles seen from behind show the opposite order of those seen from the front,
/// which is what face culling relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FaceWinding {
    /// Vertices turn clockwise on screen: top, bottom-right, bottom-left
    Clockwise,
    /// Vertices turn counter-clockwise on screen: top, bottom-left, bottom-right
    CounterClockwise,
}

impl FaceWinding {
    /// Winding of a screen-space triangle, or `None` if it has no area
    pub fn of(a: &Vector4<f32>, b: &Vector4<f32>, c: &Vector4<f32>) -> Option<FaceWinding> {
        let area = signed_area(a, b, c);

        if area > 0.0 {
            Some(FaceWinding::Clockwise)
        } else if area < 0.0 {
            Some(FaceWinding::CounterClockwise)
        } else {
            None
        }
    }
}
