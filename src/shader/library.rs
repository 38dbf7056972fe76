//! Explicit name to shader factory table, populated at startup

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use log::debug;

use crate::error::{BindingKind, RenderError, RenderResult};
use crate::resource::ShaderStage;

use super::{FragmentShader, NameHash, VertexShader};

/// A shader instance produced by "compiling" a shader object
#[derive(Clone)]
pub enum CompiledShader {
    Vertex(Arc<dyn VertexShader>),
    Fragment(Arc<dyn FragmentShader>),
}

impl CompiledShader {
    #[inline]
    pub fn stage(&self) -> ShaderStage {
        match *self {
            CompiledShader::Vertex(_) => ShaderStage::Vertex,
            CompiledShader::Fragment(_) => ShaderStage::Fragment,
        }
    }
}

impl Debug for CompiledShader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CompiledShader({:?})", self.stage())
    }
}

type Factory = Box<dyn Fn() -> CompiledShader + Send + Sync>;

struct Entry {
    name: String,
    factory: Factory,
}

/// Table of every shader a context can compile, keyed by `NameHash`.
#[derive(Default)]
pub struct ShaderLibrary {
    entries: HashMap<NameHash, Entry>,
}

impl ShaderLibrary {
    pub fn new() -> ShaderLibrary { ShaderLibrary::default() }

    #[inline]
    pub fn len(&self) -> usize { self.entries.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn register_vertex<S, F>(&mut self, name: &str, factory: F) -> RenderResult<()>
        where S: VertexShader + 'static,
              F: Fn() -> S + Send + Sync + 'static {
        self.insert(name, Box::new(move || CompiledShader::Vertex(Arc::new(factory()))))
    }

    pub fn register_fragment<S, F>(&mut self, name: &str, factory: F) -> RenderResult<()>
        where S: FragmentShader + 'static,
              F: Fn() -> S + Send + Sync + 'static {
        self.insert(name, Box::new(move || CompiledShader::Fragment(Arc::new(factory()))))
    }

    fn insert(&mut self, name: &str, factory: Factory) -> RenderResult<()> {
        let hash = NameHash::new(name);

        if let Some(existing) = self.entries.get(&hash) {
            if existing.name != name {
                return Err(RenderError::InvalidValue(format!("shader names `{}` and `{}` share hash {}", existing.name, name, hash)));
            }

            debug!("Replacing shader library entry `{}`", name);
        }

        self.entries.insert(hash, Entry { name: name.to_owned(), factory });

        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.get(&NameHash::new(name)).map_or(false, |entry| entry.name == name)
    }

    /// Create a fresh instance of the shader registered as `name`
    pub fn instantiate(&self, name: &str) -> RenderResult<CompiledShader> {
        match self.entries.get(&NameHash::new(name)) {
            Some(entry) if entry.name == name => Ok((entry.factory)()),
            _ => Err(RenderError::missing(BindingKind::Shader, name)),
        }
    }
}

impl Debug for ShaderLibrary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.entries.values().map(|entry| &entry.name)).finish()
    }
}

#[cfg(test)]
mod test {
    use nalgebra::Vector4;

    use crate::shader::{FragmentFn, ShaderInterface, VertexFn};

    use super::*;

    fn library() -> ShaderLibrary {
        let mut library = ShaderLibrary::new();

        library.register_vertex("passthrough", || {
            VertexFn::new(ShaderInterface::new(), |input| input.attribute(0))
        }).unwrap();

        library.register_fragment("white", || {
            FragmentFn::new(ShaderInterface::new(), |_| Ok(Vector4::new(1.0, 1.0, 1.0, 1.0)))
        }).unwrap();

        library
    }

    #[test]
    fn test_instantiate_by_name() {
        let library = library();

        assert_eq!(library.len(), 2);
        assert_eq!(library.instantiate("passthrough").unwrap().stage(), ShaderStage::Vertex);
        assert_eq!(library.instantiate("white").unwrap().stage(), ShaderStage::Fragment);
    }

    #[test]
    fn test_unknown_name() {
        let library = library();

        assert!(!library.contains("black"));

        match library.instantiate("black") {
            Err(RenderError::MissingBinding { kind: BindingKind::Shader, .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }
}
