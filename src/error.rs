//! Error types shared by every part of the rendering context

use std::fmt;
use std::io;

use thiserror::Error;

/// Kinds of pooled resources owned by a `RenderingContext`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Buffer,
    VertexArray,
    Texture,
    Shader,
    Program,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Resource::Buffer => "buffer",
            Resource::VertexArray => "vertex array",
            Resource::Texture => "texture",
            Resource::Shader => "shader",
            Resource::Program => "shader program",
        })
    }
}

/// The namespace a missing name was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Attribute,
    Uniform,
    Varying,
    Shader,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            BindingKind::Attribute => "attribute",
            BindingKind::Uniform => "uniform",
            BindingKind::Varying => "varying",
            BindingKind::Shader => "shader",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("{kind} pool exhausted, all {capacity} slots are in use")]
    ResourceExhausted { kind: Resource, capacity: usize },
    #[error("invalid {kind} handle {handle}")]
    InvalidHandle { kind: Resource, handle: u32 },
    #[error("no {0} bound")]
    UnboundResource(Resource),
    #[error("{kind} `{name}` has no binding in the active program")]
    MissingBinding { kind: BindingKind, name: String },
    #[error("shader `{name}` failed to compile: {reason}")]
    ShaderCompile { name: String, reason: String },
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("pixel coordinate is outside of the framebuffer")]
    InvalidPixelCoordinate,
}

impl RenderError {
    #[inline]
    pub fn missing<S: Into<String>>(kind: BindingKind, name: S) -> RenderError {
        RenderError::MissingBinding { kind, name: name.into() }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Errors reported by the presentation thread
#[derive(Debug, Error)]
pub enum PresentError {
    #[error("console sink failed: {0}")]
    Sink(#[from] io::Error),
    #[error("presenter has shut down")]
    Closed,
}
