//! Per-draw constant values owned by a linked program

use std::collections::HashMap;

use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

use crate::error::{BindingKind, RenderError, RenderResult};

use super::NameHash;

/// Declared type of a uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UniformType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Int,
    Mat3,
    Mat4,
    /// Texture unit index
    Sampler,
}

/// A uniform value. Shaders of different programs use different uniform types,
/// so values are stored as this tagged union.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vector2<f32>),
    Vec3(Vector3<f32>),
    Vec4(Vector4<f32>),
    Int(i32),
    Mat3(Matrix3<f32>),
    Mat4(Matrix4<f32>),
    Sampler(u32),
}

impl UniformValue {
    pub fn ty(&self) -> UniformType {
        match *self {
            UniformValue::Float(_) => UniformType::Float,
            UniformValue::Vec2(_) => UniformType::Vec2,
            UniformValue::Vec3(_) => UniformType::Vec3,
            UniformValue::Vec4(_) => UniformType::Vec4,
            UniformValue::Int(_) => UniformType::Int,
            UniformValue::Mat3(_) => UniformType::Mat3,
            UniformValue::Mat4(_) => UniformType::Mat4,
            UniformValue::Sampler(_) => UniformType::Sampler,
        }
    }
}

/// Rust types that can be read out of a `UniformValue`
pub trait UniformRead: Sized {
    fn from_uniform(value: &UniformValue) -> Option<Self>;
}

macro_rules! impl_uniform_conversions {
    ($($t:ty => $variant:ident,)+) => {
        $(
            impl From<$t> for UniformValue {
                #[inline]
                fn from(value: $t) -> UniformValue { UniformValue::$variant(value) }
            }

            impl UniformRead for $t {
                #[inline]
                fn from_uniform(value: &UniformValue) -> Option<$t> {
                    match *value {
                        UniformValue::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )+
    }
}

impl_uniform_conversions! {
    f32 => Float,
    Vector2<f32> => Vec2,
    Vector3<f32> => Vec3,
    Vector4<f32> => Vec4,
    i32 => Int,
    Matrix3<f32> => Mat3,
    Matrix4<f32> => Mat4,
}

/// Declaration of a uniform in a shader interface
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDecl {
    pub name: String,
    pub ty: UniformType,
}

/// Opaque index of a uniform slot within one program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub(crate) u32);

#[derive(Debug, Clone)]
struct UniformSlot {
    name: String,
    ty: UniformType,
    value: Option<UniformValue>,
}

/// Named uniform storage of a linked program.
///
/// Only declared names have slots, and a slot has no value until one is assigned.
#[derive(Debug, Clone, Default)]
pub struct UniformStorage {
    slots: Vec<UniformSlot>,
    index: HashMap<NameHash, usize>,
}

impl UniformStorage {
    /// Register a declaration. Declaring the same name twice with the same type is allowed.
    pub fn declare(&mut self, decl: &UniformDecl) -> RenderResult<()> {
        let hash = NameHash::new(&decl.name);

        if let Some(&slot) = self.index.get(&hash) {
            let existing = &self.slots[slot];

            return if existing.name != decl.name {
                Err(RenderError::InvalidValue(format!("uniform names `{}` and `{}` share hash {}", existing.name, decl.name, hash)))
            } else if existing.ty != decl.ty {
                Err(RenderError::InvalidValue(format!("uniform `{}` declared as both {:?} and {:?}", decl.name, existing.ty, decl.ty)))
            } else {
                Ok(())
            };
        }

        self.index.insert(hash, self.slots.len());
        self.slots.push(UniformSlot { name: decl.name.clone(), ty: decl.ty, value: None });

        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize { self.slots.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    pub fn location(&self, name: &str) -> RenderResult<UniformLocation> {
        self.index.get(&NameHash::new(name))
            .filter(|&&slot| self.slots[slot].name == name)
            .map(|&slot| UniformLocation(slot as u32))
            .ok_or_else(|| RenderError::missing(BindingKind::Uniform, name))
    }

    /// Assign the value at `location`, which must match the declared type
    pub fn set(&mut self, location: UniformLocation, value: UniformValue) -> RenderResult<()> {
        let slot = self.slots.get_mut(location.0 as usize)
                       .ok_or_else(|| RenderError::InvalidValue(format!("uniform location {} does not exist", location.0)))?;

        // Integers may be assigned to samplers
        let value = match (slot.ty, value) {
            (UniformType::Sampler, UniformValue::Int(unit)) if unit >= 0 => UniformValue::Sampler(unit as u32),
            (_, value) => value,
        };

        if value.ty() != slot.ty {
            return Err(RenderError::InvalidOperation("uniform value type does not match its declaration"));
        }

        slot.value = Some(value);

        Ok(())
    }

    pub fn set_by_name(&mut self, name: &str, value: UniformValue) -> RenderResult<()> {
        let location = self.location(name)?;

        self.set(location, value)
    }

    /// Read the current value of `name`. Unset values are reported as missing bindings.
    pub fn value(&self, name: &str) -> RenderResult<&UniformValue> {
        let location = self.location(name)?;

        self.slots[location.0 as usize].value.as_ref()
            .ok_or_else(|| RenderError::missing(BindingKind::Uniform, name))
    }

    pub fn get<T: UniformRead>(&self, name: &str) -> RenderResult<T> {
        T::from_uniform(self.value(name)?)
            .ok_or(RenderError::InvalidOperation("uniform read with a type other than its declaration"))
    }

    /// Texture unit referenced by a sampler uniform
    pub fn sampler(&self, name: &str) -> RenderResult<u32> {
        match *self.value(name)? {
            UniformValue::Sampler(unit) => Ok(unit),
            _ => Err(RenderError::InvalidOperation("uniform is not a sampler")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn storage() -> UniformStorage {
        let mut storage = UniformStorage::default();

        storage.declare(&UniformDecl { name: "tint".into(), ty: UniformType::Vec4 }).unwrap();
        storage.declare(&UniformDecl { name: "albedo".into(), ty: UniformType::Sampler }).unwrap();
        storage
    }

    #[test]
    fn test_unset_uniform_is_missing() {
        let storage = storage();

        match storage.get::<Vector4<f32>>("tint") {
            Err(RenderError::MissingBinding { kind: BindingKind::Uniform, ref name }) => assert_eq!(name, "tint"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_undeclared_uniform_is_missing() {
        let mut storage = storage();

        assert!(storage.set_by_name("nope", UniformValue::Float(1.0)).is_err());
        assert!(storage.location("nope").is_err());
    }

    #[test]
    fn test_type_checked_assignment() {
        let mut storage = storage();
        let tint = Vector4::new(1.0f32, 0.5, 0.25, 1.0);

        assert!(storage.set_by_name("tint", UniformValue::Float(1.0)).is_err());
        storage.set_by_name("tint", tint.into()).unwrap();
        storage.set_by_name("albedo", UniformValue::Int(3)).unwrap();

        assert_eq!(storage.get::<Vector4<f32>>("tint").unwrap(), tint);
        assert!(storage.get::<f32>("tint").is_err());
        assert_eq!(storage.sampler("albedo").unwrap(), 3);
    }

    #[test]
    fn test_conflicting_declarations() {
        let mut storage = storage();

        assert!(storage.declare(&UniformDecl { name: "tint".into(), ty: UniformType::Vec4 }).is_ok());
        assert!(storage.declare(&UniformDecl { name: "tint".into(), ty: UniformType::Vec3 }).is_err());
        assert_eq!(storage.len(), 2);
    }
}
