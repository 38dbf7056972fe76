pub mod vertex;
pub mod clipping;
pub mod rasterization;

pub use self::vertex::run_vertex_stage;
pub use self::clipping::{clip_triangle, ClippedTriangles};
pub use self::rasterization::{rasterize_triangle, Rasterizer};
