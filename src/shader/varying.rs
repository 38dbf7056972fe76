//! Per-vertex shader outputs and their packed layout

use std::collections::HashMap;

use nalgebra::{Vector2, Vector3, Vector4};
use smallvec::SmallVec;

use crate::error::{BindingKind, RenderError, RenderResult};

use super::NameHash;

/// Packed varying floats of a single vertex
pub type VaryingRecord = SmallVec<[f32; 16]>;

/// Declaration of a varying in a shader interface
#[derive(Debug, Clone, PartialEq)]
pub struct VaryingDecl {
    pub name: String,
    /// Number of floats, 1 to 4
    pub components: usize,
}

/// Values that can be written to or read from a varying slot
pub trait VaryingValue: Sized {
    const COMPONENTS: usize;

    fn write(&self, out: &mut [f32]);

    fn read(src: &[f32]) -> Self;
}

impl VaryingValue for f32 {
    const COMPONENTS: usize = 1;

    #[inline]
    fn write(&self, out: &mut [f32]) { out[0] = *self; }

    #[inline]
    fn read(src: &[f32]) -> f32 { src[0] }
}

macro_rules! impl_vector_varying {
    ($($name:ident: $n:expr,)+) => {
        $(
            impl VaryingValue for $name<f32> {
                const COMPONENTS: usize = $n;

                #[inline]
                fn write(&self, out: &mut [f32]) {
                    out[..$n].copy_from_slice(self.as_slice());
                }

                #[inline]
                fn read(src: &[f32]) -> $name<f32> {
                    $name::from_column_slice(&src[..$n])
                }
            }
        )+
    }
}

impl_vector_varying! {
    Vector2: 2,
    Vector3: 3,
    Vector4: 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaryingSlot {
    pub offset: usize,
    pub components: usize,
}

/// Float-offset table for the varyings of one vertex shader.
///
/// Every unique name is assigned a fixed offset once, in declaration order.
/// The total number of floats is the per-vertex stride.
#[derive(Debug, Clone, Default)]
pub struct VaryingLayout {
    slots: HashMap<NameHash, (String, VaryingSlot)>,
    stride: usize,
}

impl VaryingLayout {
    pub fn from_decls(decls: &[VaryingDecl]) -> RenderResult<VaryingLayout> {
        let mut layout = VaryingLayout::default();

        for decl in decls {
            if decl.components < 1 || decl.components > 4 {
                return Err(RenderError::InvalidValue(format!("varying `{}` has {} components", decl.name, decl.components)));
            }

            let hash = NameHash::new(&decl.name);

            if let Some(&(ref existing, _)) = layout.slots.get(&hash) {
                return Err(RenderError::InvalidValue(if *existing == decl.name {
                    format!("varying `{}` declared twice", decl.name)
                } else {
                    format!("varying names `{}` and `{}` share hash {}", existing, decl.name, hash)
                }));
            }

            layout.slots.insert(hash, (decl.name.clone(), VaryingSlot { offset: layout.stride, components: decl.components }));
            layout.stride += decl.components;
        }

        Ok(layout)
    }

    /// Number of floats per vertex
    #[inline]
    pub fn stride(&self) -> usize { self.stride }

    pub fn slot(&self, name: &str) -> RenderResult<VaryingSlot> {
        match self.slots.get(&NameHash::new(name)) {
            Some(&(ref slot_name, slot)) if slot_name == name => Ok(slot),
            _ => Err(RenderError::missing(BindingKind::Varying, name)),
        }
    }

    /// Look up a slot and check it holds exactly `components` floats
    pub fn typed_slot(&self, name: &str, components: usize) -> RenderResult<VaryingSlot> {
        let slot = self.slot(name)?;

        if slot.components != components {
            return Err(RenderError::InvalidOperation("varying accessed with a different component count than declared"));
        }

        Ok(slot)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn decl(name: &str, components: usize) -> VaryingDecl {
        VaryingDecl { name: name.into(), components }
    }

    #[test]
    fn test_offsets_and_stride() {
        let layout = VaryingLayout::from_decls(&[decl("colour", 4), decl("uv", 2), decl("fog", 1)]).unwrap();

        assert_eq!(layout.stride(), 7);
        assert_eq!(layout.slot("colour").unwrap(), VaryingSlot { offset: 0, components: 4 });
        assert_eq!(layout.slot("uv").unwrap(), VaryingSlot { offset: 4, components: 2 });
        assert_eq!(layout.slot("fog").unwrap(), VaryingSlot { offset: 6, components: 1 });
        assert!(layout.slot("normal").is_err());
        assert!(layout.typed_slot("uv", 3).is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        assert!(VaryingLayout::from_decls(&[decl("uv", 2), decl("uv", 2)]).is_err());
        assert!(VaryingLayout::from_decls(&[decl("uv", 5)]).is_err());
    }

    #[test]
    fn test_vector_round_trip_through_slice() {
        let mut packed = [0.0f32; 4];

        Vector3::new(1.0f32, 2.0, 3.0).write(&mut packed);

        assert_eq!(packed, [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(Vector2::<f32>::read(&packed[1..]), Vector2::new(2.0, 3.0));
    }
}
