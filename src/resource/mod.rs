//! Fixed-capacity handle registries and the resources stored in them

use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::error::{RenderError, RenderResult, Resource};
use crate::utils::first_clear_bit;

pub mod buffer;
pub mod vertex_array;
pub mod texture;
pub mod shader;
pub mod program;

pub use self::buffer::{Buffer, BufferBindings, BufferTarget, BufferUsage};
pub use self::vertex_array::{AttributeSources, VertexArray, VertexAttribute, MAX_VERTEX_ATTRIBS};
pub use self::texture::{CompareMode, Filter, PixelFormat, PixelType, SamplerParams, Swizzle, Texture, TextureParameter, TextureSampler, TextureTarget, TextureUnits, Wrap};
pub use self::shader::{ShaderObject, ShaderStage};
pub use self::program::{Program, LinkedProgram};

/// Default number of slots in every registry
pub const DEFAULT_CAPACITY: usize = 32;

/// Marks a type that can be stored in a `Registry`
pub trait Pooled {
    const KIND: Resource;
}

/// Opaque reference to a slot in a `Registry<T>`.
///
/// The raw value `0` is never valid, any other value is the slot index plus one.
/// Slots are reused immediately after destruction, so a handle held across a
/// destroy/create pair may refer to a different resource.
pub struct Handle<T> {
    raw: u32,
    kind: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    #[inline]
    fn from_index(index: usize) -> Handle<T> {
        Handle { raw: index as u32 + 1, kind: PhantomData }
    }

    /// Reinterpret a raw integer as a handle. Validity is checked when it is used.
    #[inline]
    pub fn from_raw(raw: u32) -> Handle<T> {
        Handle { raw, kind: PhantomData }
    }

    #[inline]
    pub fn raw(self) -> u32 { self.raw }

    #[inline]
    fn index(self) -> Option<usize> {
        (self.raw as usize).checked_sub(1)
    }
}

impl<T> Clone for Handle<T> {
    #[inline]
    fn clone(&self) -> Handle<T> { *self }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    #[inline]
    fn eq(&self, other: &Handle<T>) -> bool { self.raw == other.raw }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) { self.raw.hash(state) }
}

impl<T: Pooled> Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Handle<{}>({})", T::KIND, self.raw)
    }
}

/// Fixed-capacity pool mapping handles to slots.
///
/// A handle is valid if and only if its availability bit is set.
pub struct Registry<T> {
    slots: Vec<Option<T>>,
    occupied: Vec<u64>,
    live: usize,
}

impl<T: Pooled> Registry<T> {
    pub fn with_capacity(capacity: usize) -> Registry<T> {
        Registry {
            slots: (0..capacity).map(|_| None).collect(),
            occupied: vec![0; (capacity + 63) / 64],
            live: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize { self.slots.len() }

    /// Number of live slots
    #[inline]
    pub fn len(&self) -> usize { self.live }

    #[inline]
    pub fn is_empty(&self) -> bool { self.live == 0 }

    #[inline]
    fn is_set(&self, index: usize) -> bool {
        self.occupied.get(index / 64).map_or(false, |word| *word & (1u64 << (index % 64)) != 0)
    }

    /// Store `value` in the first free slot.
    pub fn create(&mut self, value: T) -> RenderResult<Handle<T>> {
        match first_clear_bit(&self.occupied, self.capacity()) {
            Some(index) => {
                self.occupied[index / 64] |= 1u64 << (index % 64);
                self.slots[index] = Some(value);
                self.live += 1;

                Ok(Handle::from_index(index))
            }
            None => Err(RenderError::ResourceExhausted { kind: T::KIND, capacity: self.capacity() }),
        }
    }

    /// Release the slot referenced by `handle`, returning its value.
    ///
    /// Destroying an invalid or already destroyed handle does nothing.
    pub fn destroy(&mut self, handle: Handle<T>) -> Option<T> {
        let index = handle.index().filter(|&index| self.is_set(index))?;

        self.occupied[index / 64] &= !(1u64 << (index % 64));
        self.live -= 1;
        self.slots[index].take()
    }

    #[inline]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        handle.index().map_or(false, |index| self.is_set(index))
    }

    /// Fails with `InvalidHandle` unless `handle` refers to a live slot.
    #[inline]
    pub fn validate(&self, handle: Handle<T>) -> RenderResult<()> {
        if self.contains(handle) { Ok(()) } else { Err(Self::invalid(handle)) }
    }

    pub fn get(&self, handle: Handle<T>) -> RenderResult<&T> {
        handle.index()
              .and_then(|index| self.slots.get(index))
              .and_then(Option::as_ref)
              .ok_or_else(|| Self::invalid(handle))
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> RenderResult<&mut T> {
        handle.index()
              .and_then(move |index| self.slots.get_mut(index))
              .and_then(Option::as_mut)
              .ok_or_else(|| Self::invalid(handle))
    }

    /// Iterate over every live handle and its value
    pub fn iter(&self) -> impl Iterator<Item=(Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref().map(|value| (Handle::from_index(index), value))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item=(Handle<T>, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            slot.as_mut().map(|value| (Handle::from_index(index), value))
        })
    }

    #[inline]
    fn invalid(handle: Handle<T>) -> RenderError {
        RenderError::InvalidHandle { kind: T::KIND, handle: handle.raw }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug)]
    struct Dummy(u32);

    impl Pooled for Dummy {
        const KIND: Resource = Resource::Buffer;
    }

    #[test]
    fn test_handles_start_at_one() {
        let mut registry = Registry::with_capacity(4);

        let a = registry.create(Dummy(1)).unwrap();
        let b = registry.create(Dummy(2)).unwrap();

        assert_eq!(a.raw(), 1);
        assert_eq!(b.raw(), 2);
        assert_eq!(registry.get(b).unwrap().0, 2);
        assert!(registry.get(Handle::from_raw(0)).is_err());
    }

    #[test]
    fn test_exhaustion() {
        let mut registry = Registry::with_capacity(2);

        registry.create(Dummy(0)).unwrap();
        registry.create(Dummy(1)).unwrap();

        assert_eq!(registry.create(Dummy(2)).unwrap_err(),
                   RenderError::ResourceExhausted { kind: Resource::Buffer, capacity: 2 });
    }

    #[test]
    fn test_destroy_is_idempotent_and_slot_is_reused() {
        let mut registry = Registry::with_capacity(2);

        let a = registry.create(Dummy(0)).unwrap();
        let _b = registry.create(Dummy(1)).unwrap();

        assert!(registry.destroy(a).is_some());
        assert!(registry.destroy(a).is_none());
        assert_eq!(registry.get(a).unwrap_err(), RenderError::InvalidHandle { kind: Resource::Buffer, handle: 1 });
        assert_eq!(registry.len(), 1);

        let c = registry.create(Dummy(7)).unwrap();

        assert_eq!(c, a);
        assert_eq!(registry.get(c).unwrap().0, 7);
    }

    #[test]
    fn test_out_of_range_handle() {
        let registry: Registry<Dummy> = Registry::with_capacity(2);

        assert!(!registry.contains(Handle::from_raw(40)));
        assert!(registry.validate(Handle::from_raw(40)).is_err());
    }
}
