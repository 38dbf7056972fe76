//! Homogeneous clip-space triangle clipping

use smallvec::SmallVec;

use crate::geometry::{ClipVertex, ClippingPlane, ALL_CLIPPING_PLANES};

/// Output of clipping one triangle. Most triangles pass unchanged or split into a few.
pub type ClippedTriangles = SmallVec<[[ClipVertex; 3]; 4]>;

/// Clip a triangle against all six planes of the view volume, appending the surviving
/// triangles to `out` with the winding of the input preserved.
pub fn clip_triangle(triangle: [ClipVertex; 3], perspective: bool, out: &mut ClippedTriangles) {
    let trivially_inside = ALL_CLIPPING_PLANES.iter().all(|plane| {
        triangle.iter().all(|vertex| plane.has_inside(vertex))
    });

    if trivially_inside {
        out.push(triangle);
    } else {
        clip_against(&ALL_CLIPPING_PLANES, triangle, perspective, out);
    }
}

fn clip_against(planes: &[ClippingPlane], triangle: [ClipVertex; 3], perspective: bool, out: &mut ClippedTriangles) {
    let (plane, rest) = match planes.split_first() {
        Some((plane, rest)) => (*plane, rest),
        None => return out.push(triangle),
    };

    let inside = [
        plane.has_inside(&triangle[0]),
        plane.has_inside(&triangle[1]),
        plane.has_inside(&triangle[2]),
    ];

    match inside.iter().filter(|&&inside| inside).count() {
        0 => {}
        3 => clip_against(rest, triangle, perspective, out),
        1 => {
            // Rotate so the inside vertex comes first, keeping the winding
            let k = inside.iter().position(|&inside| inside).unwrap_or(0);

            let [a, b, c] = rotate(triangle, k);

            let ab = plane.intersect(&a, &b, perspective);
            let ac = plane.intersect(&a, &c, perspective);

            clip_against(rest, [a, ab, ac], perspective, out);
        }
        _ => {
            // Rotate so the outside vertex comes last
            let k = inside.iter().position(|&inside| !inside).unwrap_or(0);

            let [a, b, c] = rotate(triangle, (k + 1) % 3);

            let bc = plane.intersect(&b, &c, perspective);
            let ac = plane.intersect(&a, &c, perspective);

            clip_against(rest, [a.clone(), b, bc.clone()], perspective, out);
            clip_against(rest, [a, bc, ac], perspective, out);
        }
    }
}

#[inline]
fn rotate(triangle: [ClipVertex; 3], k: usize) -> [ClipVertex; 3] {
    let [a, b, c] = triangle;

    match k {
        0 => [a, b, c],
        1 => [b, c, a],
        _ => [c, a, b],
    }
}
