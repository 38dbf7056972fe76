//! Vertex shader stage.
//!
//! The vertex shader is responsible for transforming every vertex of the draw range into clip-space,
//! writing any varyings to be interpolated and passed into the fragment shader along the way.

use crate::error::RenderResult;
use crate::geometry::clipvertex::perspective_weight;
use crate::pipeline::storage::DrawStorage;
use crate::resource::{AttributeSources, LinkedProgram};
use crate::shader::VertexInput;

/// Run the vertex shader for every index in `first..first + count`.
///
/// With `perspective` set each vertex's varyings are divided by its clip-space `w`,
/// which the rasterizer undoes per fragment. Vertices with `w` within `W_EPSILON` of zero keep
/// their varyings as written, matching `perspective_weight`.
pub fn run_vertex_stage(storage: &mut DrawStorage,
                        program: &LinkedProgram,
                        attributes: &AttributeSources,
                        first: u32,
                        count: usize,
                        perspective: bool) -> RenderResult<()> {
    attributes.check_range(first, count)?;
    storage.reset(first, count, program.varyings().stride())?;

    let shader = program.vertex_shader();

    for slot in 0..count {
        let (position, out) = storage.slot_mut(slot);

        let clip_position = {
            let mut input = VertexInput {
                index: first + slot as u32,
                attributes,
                uniforms: program.uniforms(),
                layout: program.varyings(),
                out: &mut *out,
            };

            shader.run(&mut input)?
        };

        if perspective {
            let inv_w = 1.0 / perspective_weight(clip_position.w);

            for value in out.iter_mut() {
                *value *= inv_w;
            }
        }

        *position = clip_position;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use nalgebra::Vector4;

    use crate::resource::{Registry, VertexArray, MAX_VERTEX_ATTRIBS};
    use crate::shader::{FragmentFn, ShaderInterface, VertexFn};

    use super::*;

    fn program() -> LinkedProgram {
        LinkedProgram::link(
            Arc::new(VertexFn::new(ShaderInterface::new().varying("depth", 1), |input| {
                input.set_varying("depth", 4.0f32)?;
                input.attribute(0)
            })),
            Arc::new(FragmentFn::new(ShaderInterface::new(), |_| Ok(Vector4::zeros()))),
        ).unwrap()
    }

    fn run(perspective: bool) -> DrawStorage {
        let program = program();

        let mut constants = [None; MAX_VERTEX_ATTRIBS];
        constants[0] = Some(Vector4::new(0.0, 0.0, 0.5, 2.0));

        let buffers = Registry::with_capacity(1);
        let attributes = AttributeSources::resolve(&VertexArray::default(), &constants, &buffers).unwrap();

        let mut storage = DrawStorage::default();

        run_vertex_stage(&mut storage, &program, &attributes, 3, 2, perspective).unwrap();

        storage
    }

    #[test]
    fn test_varyings_are_divided_by_w() {
        let storage = run(true);

        assert_eq!(storage.len(), 2);
        assert_eq!(storage.stride(), 1);

        let vertex = storage.clip_vertex(4);

        assert_eq!(vertex.position, Vector4::new(0.0, 0.0, 0.5, 2.0));
        assert_eq!(vertex.varyings[0], 2.0);
    }

    #[test]
    fn test_zero_w_keeps_varyings() {
        let program = program();

        let mut constants = [None; MAX_VERTEX_ATTRIBS];
        constants[0] = Some(Vector4::new(0.0, 0.0, 0.0, 0.0));

        let buffers = Registry::with_capacity(1);
        let attributes = AttributeSources::resolve(&VertexArray::default(), &constants, &buffers).unwrap();

        let mut storage = DrawStorage::default();

        run_vertex_stage(&mut storage, &program, &attributes, 0, 1, true).unwrap();

        assert_eq!(storage.clip_vertex(0).varyings[0], 4.0);
    }

    #[test]
    fn test_affine_varyings_are_stored_as_written() {
        assert_eq!(run(false).clip_vertex(3).varyings[0], 4.0);
    }
}
