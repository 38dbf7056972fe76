use nalgebra::Vector4;

use crate::shader::VaryingRecord;

/// Defines a vertex and its varyings in screen-space, which is what the rasterizer consumes.
///
/// Clip-space vertices are transformed to screen-space after clipping but before rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenVertex {
    /// Screen-space pixel position in `x` and `y`, normalized depth in `z` and `1 / w` in `w`.
    ///
    /// Similar to `gl_FragCoord`
    pub position: Vector4<f32>,
    pub varyings: VaryingRecord,
}
