#![allow(dead_code)]

use consolegl::*;
use nalgebra::{Vector2, Vector4};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn float_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_le_bytes().to_vec()).collect()
}

pub fn red() -> Colour { rgb(1.0, 0.0, 0.0) }

pub fn blue() -> Colour { rgb(0.0, 0.0, 1.0) }

/// Shaders shared by the integration tests
pub fn library() -> ShaderLibrary {
    let mut library = ShaderLibrary::new();

    // Attribute 0 is already a clip-space position
    library.register_vertex("passthrough", || {
        VertexFn::new(ShaderInterface::new(), |input| input.attribute(0))
    }).unwrap();

    library.register_vertex("coloured", || {
        VertexFn::new(ShaderInterface::new().varying("colour", 4), |input| {
            let colour = input.attribute(1)?;
            input.set_varying("colour", colour)?;
            input.attribute(0)
        })
    }).unwrap();

    library.register_fragment("flat", || {
        FragmentFn::new(ShaderInterface::new().uniform("colour", UniformType::Vec4), |input| {
            input.uniform::<Vector4<f32>>("colour")
        })
    }).unwrap();

    library.register_fragment("interpolated", || {
        FragmentFn::new(ShaderInterface::new().varying("colour", 4), |input| input.varying::<Vector4<f32>>("colour"))
    }).unwrap();

    library.register_fragment("textured", || {
        FragmentFn::new(ShaderInterface::new().uniform("albedo", UniformType::Sampler), |input| {
            input.sample("albedo", Vector2::new(0.5, 0.5))
        })
    }).unwrap();

    library
}

/// A context with a bound vertex array and a linked, current program built from two library shaders
pub fn context(width: u32, height: u32, vertex: &str, fragment: &str) -> (RenderingContext, Handle<Program>) {
    init_logging();

    let mut context = RenderingContext::new(ContextConfig::default().with_dimensions(width, height), library());

    let vs = context.create_shader(ShaderStage::Vertex).unwrap();
    context.shader_source(vs, vertex).unwrap();
    context.compile_shader(vs).unwrap();

    let fs = context.create_shader(ShaderStage::Fragment).unwrap();
    context.shader_source(fs, fragment).unwrap();
    context.compile_shader(fs).unwrap();

    let program = context.create_program().unwrap();
    context.attach_shader(program, vs).unwrap();
    context.attach_shader(program, fs).unwrap();
    context.link_program(program).unwrap();
    context.use_program(Some(program)).unwrap();

    let vao = context.gen_vertex_arrays(1).unwrap()[0];
    context.bind_vertex_array(Some(vao)).unwrap();

    (context, program)
}

/// Upload `data` into a new buffer and point attribute `location` at it
pub fn attribute(context: &mut RenderingContext, location: usize, components: u8, data: &[f32]) -> Handle<Buffer> {
    let buffer = context.gen_buffers(1).unwrap()[0];

    context.bind_buffer(BufferTarget::Array, Some(buffer)).unwrap();
    context.buffer_data(BufferTarget::Array, &float_bytes(data), BufferUsage::StaticDraw).unwrap();
    context.vertex_attrib_pointer(location, components, ComponentType::Float, false, 0, 0).unwrap();
    context.enable_vertex_attrib_array(location).unwrap();

    buffer
}

/// Counter-clockwise on screen, covering the lower half of the viewport
pub fn triangle_at(z: f32) -> Vec<f32> {
    vec![
        -1.0, -1.0, z, 1.0,
        1.0, -1.0, z, 1.0,
        0.0, 1.0, z, 1.0,
    ]
}

pub fn set_colour(context: &mut RenderingContext, program: Handle<Program>, colour: Colour) {
    context.program_uniform(program, "colour", colour).unwrap();
}

pub fn assert_close(actual: Colour, expected: Colour) {
    assert!((actual - expected).norm() < 1e-4, "{:?} != {:?}", actual, expected);
}
