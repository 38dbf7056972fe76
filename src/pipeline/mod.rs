//! The draw pipeline: vertex processing, face culling, clipping and rasterization.
//!
//! A `Pipeline` is the variant selected by the current `PipelineKey`. It is decoded once per
//! draw call and drives every triangle of that draw through the same fixed sequence of stages:
//!
//! ```text
//! vertex stage -> cull -> clip -> screen projection -> rasterize + early-Z -> fragment stage -> blend
//! ```
//!
//! When every vertex of a triangle has a positive `w`, culling happens before clipping on the
//! projected triangle. Otherwise each triangle produced by clipping is culled on its own.

use log::trace;

use crate::error::{RenderError, RenderResult};
use crate::geometry::clipvertex::W_EPSILON;
use crate::geometry::{ClipVertex, Dimensions, FaceWinding, HasDimensions};
use crate::framebuffer::Framebuffer;
use crate::primitive::DrawMode;
use crate::resource::AttributeSources;

pub mod state;
pub mod storage;
pub mod stages;

pub use self::state::{Capability, ClearMask, CullFace, FrontFace, PipelineKey, RenderState, StateFlags};
pub use self::storage::DrawStorage;
pub use self::stages::{Rasterizer, ClippedTriangles};

use self::stages::{clip_triangle, rasterize_triangle, run_vertex_stage};

/// Counters collected over one draw call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Vertices run through the vertex shader
    pub vertices: usize,
    /// Triangles assembled from the vertex sequence
    pub triangles: usize,
    pub culled: usize,
    /// Zero-area triangles, and triangles with `w <= 0` when clipping is disabled
    pub degenerate: usize,
    /// Triangles entirely outside the view volume
    pub clipped_away: usize,
    /// Triangles handed from clipping to rasterization
    pub clip_emitted: usize,
    pub fragments_shaded: usize,
    pub depth_rejected: usize,
    pub pixels_written: usize,
}

/// One pipeline variant, decoded from a `PipelineKey`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pipeline {
    pub depth_test: bool,
    pub cull_front: bool,
    pub cull_back: bool,
    pub clip: bool,
    pub perspective: bool,
    pub blend: bool,
    pub front_cw: bool,
}

impl From<PipelineKey> for Pipeline {
    fn from(key: PipelineKey) -> Pipeline {
        let flags = key.flags();

        Pipeline {
            depth_test: flags.contains(StateFlags::DEPTH_TEST),
            cull_front: flags.contains(StateFlags::CULL_FRONT),
            cull_back: flags.contains(StateFlags::CULL_BACK),
            clip: flags.contains(StateFlags::CLIP),
            perspective: flags.contains(StateFlags::PERSPECTIVE),
            blend: flags.contains(StateFlags::BLEND),
            front_cw: flags.contains(StateFlags::FRONT_CW),
        }
    }
}

/// Outcome of the face culling test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Facing {
    Visible,
    Culled,
    Degenerate,
}

impl Pipeline {
    #[inline]
    pub fn front_winding(&self) -> FaceWinding {
        if self.front_cw { FaceWinding::Clockwise } else { FaceWinding::CounterClockwise }
    }

    /// Whether a triangle of the given screen-space winding is culled
    #[inline]
    pub fn culls(&self, winding: FaceWinding) -> bool {
        if winding == self.front_winding() { self.cull_front } else { self.cull_back }
    }

    #[inline]
    fn culling(&self) -> bool { self.cull_front || self.cull_back }

    fn facing(&self, triangle: &[ClipVertex; 3], viewport: Dimensions) -> Facing {
        if !self.culling() {
            return Facing::Visible;
        }

        let [a, b, c] = triangle;

        match FaceWinding::of(&a.screen_position(viewport), &b.screen_position(viewport), &c.screen_position(viewport)) {
            None => Facing::Degenerate,
            Some(winding) if self.culls(winding) => Facing::Culled,
            Some(_) => Facing::Visible,
        }
    }
}

/// Vertices of one draw call, in submission order
#[derive(Debug, Clone)]
pub enum DrawVertices {
    /// `first..first + count`
    Range { first: u32, count: usize },
    /// Decoded from an element array buffer
    Indexed(Vec<u32>),
}

impl DrawVertices {
    #[inline]
    fn len(&self) -> usize {
        match *self {
            DrawVertices::Range { count, .. } => count,
            DrawVertices::Indexed(ref indices) => indices.len(),
        }
    }

    #[inline]
    fn get(&self, position: usize) -> u32 {
        match *self {
            DrawVertices::Range { first, .. } => first + position as u32,
            DrawVertices::Indexed(ref indices) => indices[position],
        }
    }

    /// Smallest index and the number of vertices up to and including the largest.
    ///
    /// A range reaching past the largest `u32` index is an `InvalidValue`.
    fn span(&self) -> RenderResult<Option<(u32, usize)>> {
        match *self {
            DrawVertices::Range { count: 0, .. } => Ok(None),
            DrawVertices::Range { first, count } => {
                storage::last_index(first, count)
                    .map(|_| Some((first, count)))
                    .ok_or_else(|| RenderError::InvalidValue(format!("vertex range {} + {} exceeds the u32 index space", first, count)))
            }
            DrawVertices::Indexed(ref indices) => {
                let (min, max) = match (indices.iter().min(), indices.iter().max()) {
                    (Some(&min), Some(&max)) => (min, max),
                    _ => return Ok(None),
                };

                Ok(Some((min, (max - min) as usize + 1)))
            }
        }
    }
}

/// Run a complete draw call.
///
/// Errors raised by a shader abort the draw. Pixels written before the error are kept.
pub fn draw(raster: &Rasterizer,
            attributes: &AttributeSources,
            storage: &mut DrawStorage,
            framebuffer: &mut Framebuffer,
            mode: DrawMode,
            vertices: &DrawVertices) -> RenderResult<DrawStats> {
    let pipeline = raster.pipeline;
    let viewport = framebuffer.dimensions();

    let mut stats = DrawStats::default();

    let (first, count) = match vertices.span()? {
        Some(span) => span,
        None => return Ok(stats),
    };

    run_vertex_stage(storage, raster.program, attributes, first, count, pipeline.perspective)?;

    stats.vertices = count;

    let mut clipped = ClippedTriangles::new();

    for [i0, i1, i2] in mode.triangles(vertices.len()) {
        stats.triangles += 1;

        let triangle = [
            storage.clip_vertex(vertices.get(i0)),
            storage.clip_vertex(vertices.get(i1)),
            storage.clip_vertex(vertices.get(i2)),
        ];

        let in_front = triangle.iter().all(|v| v.position.w > W_EPSILON);

        if !pipeline.clip && !in_front {
            trace!("Dropping triangle with w <= 0 while clipping is disabled");
            stats.degenerate += 1;
            continue;
        }

        // Projection is only meaningful when every vertex is in front of the eye
        if in_front {
            match pipeline.facing(&triangle, viewport) {
                Facing::Visible => {}
                Facing::Culled => {
                    stats.culled += 1;
                    continue;
                }
                Facing::Degenerate => {
                    stats.degenerate += 1;
                    continue;
                }
            }
        }

        clipped.clear();

        if pipeline.clip {
            clip_triangle(triangle, pipeline.perspective, &mut clipped);

            if clipped.is_empty() {
                trace!("Triangle {} clipped away", stats.triangles - 1);
                stats.clipped_away += 1;
                continue;
            }
        } else {
            clipped.push(triangle);
        }

        for sub in clipped.drain(..) {
            if !in_front {
                match pipeline.facing(&sub, viewport) {
                    Facing::Visible => {}
                    Facing::Culled => {
                        stats.culled += 1;
                        continue;
                    }
                    Facing::Degenerate => {
                        stats.degenerate += 1;
                        continue;
                    }
                }
            }

            stats.clip_emitted += 1;

            let [a, b, c] = sub;

            let (a, b, c) = (a.normalize(viewport), b.normalize(viewport), c.normalize(viewport));

            rasterize_triangle(raster, framebuffer, &mut stats, &a, &b, &c)?;
        }
    }

    trace!("{:?}", stats);

    Ok(stats)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pipeline_from_key() {
        let pipeline = Pipeline::from(PipelineKey::new(StateFlags::CLIP | StateFlags::CULL_BACK));

        assert!(pipeline.clip);
        assert!(pipeline.cull_back);
        assert!(!pipeline.depth_test);
        assert_eq!(pipeline.front_winding(), FaceWinding::CounterClockwise);
        assert!(pipeline.culls(FaceWinding::Clockwise));
        assert!(!pipeline.culls(FaceWinding::CounterClockwise));
    }

    #[test]
    fn test_front_and_back_culls_everything() {
        let pipeline = Pipeline::from(PipelineKey::new(StateFlags::CULL_FRONT | StateFlags::CULL_BACK | StateFlags::FRONT_CW));

        assert!(pipeline.culls(FaceWinding::Clockwise));
        assert!(pipeline.culls(FaceWinding::CounterClockwise));
    }

    #[test]
    fn test_indexed_span() {
        assert_eq!(DrawVertices::Indexed(vec![5, 2, 9]).span(), Ok(Some((2, 8))));
        assert_eq!(DrawVertices::Indexed(vec![]).span(), Ok(None));
        assert_eq!(DrawVertices::Range { first: 3, count: 0 }.span(), Ok(None));
        assert_eq!(DrawVertices::Range { first: 3, count: 6 }.span(), Ok(Some((3, 6))));
        assert_eq!(DrawVertices::Range { first: u32::MAX, count: 1 }.span(), Ok(Some((u32::MAX, 1))));
    }

    #[test]
    fn test_range_past_the_index_space() {
        assert!(matches!(DrawVertices::Range { first: u32::MAX - 1, count: 3 }.span(), Err(RenderError::InvalidValue(_))));
        assert!(matches!(DrawVertices::Range { first: 0, count: usize::MAX / 8 }.span(), Err(RenderError::InvalidValue(_))));
    }
}
