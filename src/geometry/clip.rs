//! Clipping planes

use nalgebra::Vector4;

use crate::geometry::ClipVertex;

/// The six planes bounding the canonical view volume `-w <= x, y <= w`, `0 <= z <= w`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClippingPlane {
    Left,
    Right,
    Top,
    Bottom,
    Near,
    Far,
}

/// All clipping planes in a constant array. Useful for iterating over all of them.
pub const ALL_CLIPPING_PLANES: [ClippingPlane; 6] = [
    ClippingPlane::Left,
    ClippingPlane::Right,
    ClippingPlane::Top,
    ClippingPlane::Bottom,
    ClippingPlane::Near,
    ClippingPlane::Far,
];

impl ClippingPlane {
    /// Signed distance of a clip-space position from the plane, non-negative when inside
    #[inline]
    pub fn distance(self, position: &Vector4<f32>) -> f32 {
        let (x, y, z, w) = (position.x, position.y, position.z, position.w);

        match self {
            ClippingPlane::Left => w + x,
            ClippingPlane::Right => w - x,
            ClippingPlane::Top => w - y,
            ClippingPlane::Bottom => w + y,
            ClippingPlane::Near => z,
            ClippingPlane::Far => w - z,
        }
    }

    /// Check if the clipping plane has the given clip-space point inside of it
    #[inline]
    pub fn has_inside(self, v: &ClipVertex) -> bool {
        self.distance(&v.position) >= 0.0
    }

    /// Find the intersection of the edge `v1 -> v2` and the clipping plane.
    ///
    /// The endpoints must lie on opposite sides of the plane.
    #[inline]
    pub fn intersect(self, v1: &ClipVertex, v2: &ClipVertex, perspective: bool) -> ClipVertex {
        let a = self.distance(&v1.position);
        let b = self.distance(&v2.position);

        let t = a / (a - b);

        ClipVertex::lerp(t, v1, v2, perspective)
    }
}

#[cfg(test)]
mod test {
    use smallvec::smallvec;

    use super::*;

    #[test]
    fn test_intersection_lies_on_plane() {
        let inside = ClipVertex::new(Vector4::new(0.0, 0.0, 0.5, 1.0), smallvec![0.0]);
        let outside = ClipVertex::new(Vector4::new(3.0, 0.0, 0.5, 1.0), smallvec![1.0]);

        assert!(ClippingPlane::Right.has_inside(&inside));
        assert!(!ClippingPlane::Right.has_inside(&outside));

        let hit = ClippingPlane::Right.intersect(&inside, &outside, false);

        assert!(ClippingPlane::Right.distance(&hit.position).abs() < 1e-6);
        assert!((hit.varyings[0] - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_depth_range_planes() {
        let v = ClipVertex::new(Vector4::new(0.0, 0.0, -0.1, 1.0), smallvec![]);

        assert!(!ClippingPlane::Near.has_inside(&v));
        assert!(ClippingPlane::Far.has_inside(&v));
    }
}
