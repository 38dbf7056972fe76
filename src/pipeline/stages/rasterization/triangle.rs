//! Scanline triangle rasterization with early depth testing

use std::cmp::Ordering;
use std::ops::Range;

use log::trace;
use nalgebra::Vector4;
use smallvec::SmallVec;

use crate::colour::saturate;
use crate::error::RenderResult;
use crate::framebuffer::Framebuffer;
use crate::geometry::{signed_area, HasDimensions, ScreenVertex};
use crate::pipeline::DrawStats;
use crate::shader::{FragmentInput, VaryingRecord};

use super::Rasterizer;

/// Fragments with an alpha at or below this are not written
pub const ALPHA_EPSILON: f32 = 1.0 / 512.0;

/// Triangles with a smaller doubled screen-space area cover nothing
const AREA_EPSILON: f32 = 1e-8;

/// Per-vertex values interpolated across the triangle: `z`, `1 / w`, then the varyings
type Attributes = SmallVec<[f32; 20]>;

/// Screen-space plane equations `f(x, y) = base + ddx * (x - x0) + ddy * (y - y0)` of every attribute
#[derive(Debug, Clone)]
struct AttributePlanes {
    x0: f32,
    y0: f32,
    base: Attributes,
    ddx: Attributes,
    ddy: Attributes,
}

fn attributes(vertex: &ScreenVertex) -> Attributes {
    let mut attributes = Attributes::with_capacity(vertex.varyings.len() + 2);

    attributes.push(vertex.position.z);
    attributes.push(vertex.position.w);
    attributes.extend_from_slice(&vertex.varyings);
    attributes
}

impl AttributePlanes {
    /// `det` is the signed area of the triangle as given by `signed_area`
    fn new(a: &ScreenVertex, b: &ScreenVertex, c: &ScreenVertex, det: f32) -> AttributePlanes {
        let (fa, fb, fc) = (attributes(a), attributes(b), attributes(c));

        let (dx1, dy1) = (b.position.x - a.position.x, b.position.y - a.position.y);
        let (dx2, dy2) = (c.position.x - a.position.x, c.position.y - a.position.y);

        let mut ddx = Attributes::with_capacity(fa.len());
        let mut ddy = Attributes::with_capacity(fa.len());

        for ((&f0, &f1), &f2) in fa.iter().zip(fb.iter()).zip(fc.iter()) {
            let (df1, df2) = (f1 - f0, f2 - f0);

            ddx.push((df1 * dy2 - df2 * dy1) / det);
            ddy.push((df2 * dx1 - df1 * dx2) / det);
        }

        AttributePlanes { x0: a.position.x, y0: a.position.y, base: fa, ddx, ddy }
    }

    fn at(&self, x: f32, y: f32) -> Attributes {
        let (dx, dy) = (x - self.x0, y - self.y0);

        self.base.iter().zip(self.ddx.iter()).zip(self.ddy.iter())
            .map(|((&base, &ddx), &ddy)| base + ddx * dx + ddy * dy)
            .collect()
    }
}

/// A triangle edge, stepped one scanline at a time
#[derive(Debug, Clone, Copy)]
struct Edge {
    x0: f32,
    y0: f32,
    slope: f32,
}

impl Edge {
    fn new(from: &Vector4<f32>, to: &Vector4<f32>) -> Edge {
        let dy = to.y - from.y;

        Edge {
            x0: from.x,
            y0: from.y,
            slope: if dy != 0.0 { (to.x - from.x) / dy } else { 0.0 },
        }
    }

    #[inline]
    fn x_at(&self, y: f32) -> f32 {
        self.x0 + (y - self.y0) * self.slope
    }
}

/// First pixel whose centre is at or after `v`, the top-left fill rule
#[inline]
fn pixel_start(v: f32) -> i64 {
    (v - 0.5).ceil() as i64
}

/// Rasterize one screen-space triangle, running the fragment shader for every covered pixel
/// that passes the depth test.
///
/// A zero-area triangle is counted as degenerate and produces no fragments.
pub fn rasterize_triangle(raster: &Rasterizer,
                          framebuffer: &mut Framebuffer,
                          stats: &mut DrawStats,
                          a: &ScreenVertex,
                          b: &ScreenVertex,
                          c: &ScreenVertex) -> RenderResult<()> {
    let det = signed_area(&a.position, &b.position, &c.position);

    // Also rejects NaN
    if !(det.abs() > AREA_EPSILON) {
        trace!("Skipping degenerate triangle with area {}", det);
        stats.degenerate += 1;
        return Ok(());
    }

    let planes = AttributePlanes::new(a, b, c, det);

    let mut sorted = [a, b, c];
    sorted.sort_by(|p, q| p.position.y.partial_cmp(&q.position.y).unwrap_or(Ordering::Equal));

    let (top, mid, bottom) = (&sorted[0].position, &sorted[1].position, &sorted[2].position);

    let dimensions = framebuffer.dimensions();
    let (width, height) = (dimensions.width as i64, dimensions.height as i64);

    let long = Edge::new(top, bottom);

    // Split at the middle vertex. The long edge is on the left if the split point is.
    let long_is_left = long.x_at(mid.y) < mid.x;

    let clamp_row = |y: f32| pixel_start(y).max(0).min(height);

    let halves = [
        (clamp_row(top.y)..clamp_row(mid.y), Edge::new(top, mid)),
        (clamp_row(mid.y)..clamp_row(bottom.y), Edge::new(mid, bottom)),
    ];

    let mut scanner = Scanner {
        raster,
        framebuffer,
        stats,
        planes: &planes,
        width,
        varyings: VaryingRecord::from_elem(0.0, planes.base.len() - 2),
    };

    for (rows, short) in halves.iter().cloned() {
        let (left, right) = if long_is_left { (long, short) } else { (short, long) };

        scanner.scan(rows, left, right)?;
    }

    Ok(())
}

struct Scanner<'r, 'a> {
    raster: &'r Rasterizer<'a>,
    framebuffer: &'r mut Framebuffer,
    stats: &'r mut DrawStats,
    planes: &'r AttributePlanes,
    width: i64,
    varyings: VaryingRecord,
}

impl<'r, 'a> Scanner<'r, 'a> {
    /// Fill the rows of one half-triangle between two edges.
    ///
    /// Edge positions and the attributes along the left edge advance incrementally per row,
    /// attributes along a row advance incrementally per pixel.
    fn scan(&mut self, rows: Range<i64>, left: Edge, right: Edge) -> RenderResult<()> {
        if rows.start >= rows.end {
            return Ok(());
        }

        let planes = self.planes;

        let yc = rows.start as f32 + 0.5;

        let mut xl = left.x_at(yc);
        let mut xr = right.x_at(yc);

        // Attributes at the left edge and how they change from one row to the next
        let mut edge_attributes = planes.at(xl, yc);
        let edge_step: Attributes = planes.ddy.iter().zip(planes.ddx.iter())
                                          .map(|(&ddy, &ddx)| ddy + left.slope * ddx)
                                          .collect();

        let mut attributes = Attributes::from_elem(0.0, edge_attributes.len());

        for y in rows {
            let xs = pixel_start(xl).max(0);
            let xe = pixel_start(xr).min(self.width);

            if xs < xe {
                let offset = xs as f32 + 0.5 - xl;

                for ((value, &edge), &ddx) in attributes.iter_mut().zip(edge_attributes.iter()).zip(planes.ddx.iter()) {
                    *value = edge + offset * ddx;
                }

                for x in xs..xe {
                    self.shade(x, y, &attributes)?;

                    for (value, &ddx) in attributes.iter_mut().zip(planes.ddx.iter()) {
                        *value += ddx;
                    }
                }
            }

            xl += left.slope;
            xr += right.slope;

            for (value, &step) in edge_attributes.iter_mut().zip(edge_step.iter()) {
                *value += step;
            }
        }

        Ok(())
    }

    fn shade(&mut self, x: i64, y: i64, attributes: &[f32]) -> RenderResult<()> {
        let raster = self.raster;
        let pipeline = raster.pipeline;

        let index = (y * self.width + x) as usize;
        let (z, inv_w) = (attributes[0], attributes[1]);

        let (colour_buffer, depth_buffer) = self.framebuffer.attachments_mut();

        // Early-Z: the depth is committed before the fragment shader runs
        if pipeline.depth_test && !depth_buffer.test_and_commit(index, z, raster.depth_func, raster.depth_mask) {
            self.stats.depth_rejected += 1;
            return Ok(());
        }

        let w = 1.0 / inv_w;

        if pipeline.perspective {
            for (out, &value) in self.varyings.iter_mut().zip(attributes[2..].iter()) {
                *out = value * w;
            }
        } else {
            self.varyings.copy_from_slice(&attributes[2..]);
        }

        let input = FragmentInput {
            coord: Vector4::new(x as f32 + 0.5, y as f32 + 0.5, z, w),
            varyings: &self.varyings,
            layout: raster.program.varyings(),
            uniforms: raster.program.uniforms(),
            textures: raster.textures,
        };

        let colour = raster.program.fragment_shader().run(&input)?;

        self.stats.fragments_shaded += 1;

        if colour.w > ALPHA_EPSILON {
            let pixel = colour_buffer.pixel_mut(index);

            *pixel = saturate(if pipeline.blend { raster.blend.blend(colour, *pixel) } else { colour });

            self.stats.pixels_written += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use smallvec::smallvec;

    use crate::colour::{rgba, Colour};
    use crate::framebuffer::DepthFunc;
    use crate::geometry::{ClipVertex, Dimensions};
    use crate::pipeline::Pipeline;
    use crate::resource::{LinkedProgram, Registry, TextureSampler, TextureUnits};
    use crate::shader::{FragmentFn, ShaderInterface, VertexFn};

    use super::*;

    fn screen(x: f32, y: f32) -> ScreenVertex {
        ScreenVertex { position: Vector4::new(x, y, 0.5, 1.0), varyings: smallvec![] }
    }

    fn flat_program(colour: Colour) -> LinkedProgram {
        LinkedProgram::link(
            Arc::new(VertexFn::new(ShaderInterface::new(), |input| input.attribute(0))),
            Arc::new(FragmentFn::new(ShaderInterface::new(), move |_| Ok(colour))),
        ).unwrap()
    }

    fn draw(triangles: &[[ScreenVertex; 3]]) -> (Framebuffer, DrawStats) {
        let program = flat_program(rgba(1.0, 0.0, 0.0, 1.0));
        let units = TextureUnits::new(1);
        let textures = Registry::with_capacity(1);
        let sampler = TextureSampler::new(&units, &textures);

        let raster = Rasterizer {
            pipeline: Pipeline::default(),
            program: &program,
            textures: &sampler,
            depth_func: DepthFunc::Less,
            depth_mask: true,
            blend: &(),
        };

        let mut framebuffer = Framebuffer::new(Dimensions::new(4, 4));
        let mut stats = DrawStats::default();

        for [a, b, c] in triangles {
            rasterize_triangle(&raster, &mut framebuffer, &mut stats, a, b, c).unwrap();
        }

        (framebuffer, stats)
    }

    #[test]
    fn test_pixel_centre_coverage() {
        let (framebuffer, stats) = draw(&[[screen(0.0, 4.0), screen(4.0, 4.0), screen(2.0, 0.0)]]);

        assert_eq!(stats.pixels_written, 8);

        for x in 0..4 {
            assert_eq!(framebuffer.read_pixel(x, 3).unwrap(), rgba(1.0, 0.0, 0.0, 1.0));
        }

        assert_eq!(framebuffer.read_pixel(0, 0).unwrap(), Colour::zeros());
        assert_eq!(framebuffer.read_pixel(3, 0).unwrap(), Colour::zeros());
    }

    #[test]
    fn test_shared_edge_is_filled_once() {
        let (_, stats) = draw(&[
            [screen(0.0, 0.0), screen(4.0, 0.0), screen(4.0, 4.0)],
            [screen(0.0, 0.0), screen(4.0, 4.0), screen(0.0, 4.0)],
        ]);

        assert_eq!(stats.fragments_shaded, 16);
    }

    #[test]
    fn test_degenerate_triangle() {
        let (_, stats) = draw(&[[screen(0.0, 0.0), screen(2.0, 2.0), screen(4.0, 4.0)]]);

        assert_eq!(stats.degenerate, 1);
        assert_eq!(stats.fragments_shaded, 0);
    }

    #[test]
    fn test_perspective_correct_values_at_vertices() {
        let viewport = Dimensions::new(8, 8);

        // Varyings are stored divided by w, as the vertex stage leaves them
        let clip = |x: f32, y: f32, w: f32, value: f32| {
            ClipVertex::new(Vector4::new(x, y, 0.5, w), smallvec![value / w]).normalize(viewport)
        };

        let vertices = [clip(-1.0, -1.0, 1.0, 3.0), clip(4.0, -4.0, 4.0, 7.0), clip(0.0, 2.0, 2.0, -5.0)];
        let expected = [3.0, 7.0, -5.0];

        let det = signed_area(&vertices[0].position, &vertices[1].position, &vertices[2].position);
        let planes = AttributePlanes::new(&vertices[0], &vertices[1], &vertices[2], det);

        for (vertex, &expected) in vertices.iter().zip(expected.iter()) {
            let values = planes.at(vertex.position.x, vertex.position.y);
            let recovered = values[2] / values[1];

            assert!((recovered - expected).abs() < 1e-4, "{} != {}", recovered, expected);
        }
    }
}
