//! Name hashing used to key shaders, uniforms and varyings

use std::fmt;

/// 32-bit FNV-1a hash of an identifier.
///
/// Shader library entries, uniform slots and varying slots are all keyed by this
/// hash, so content tools that pre-compute keys must use the same function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameHash(u32);

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

impl NameHash {
    pub const fn new(name: &str) -> NameHash {
        let bytes = name.as_bytes();
        let mut hash = FNV_OFFSET_BASIS;
        let mut i = 0;

        while i < bytes.len() {
            hash ^= bytes[i] as u32;
            hash = hash.wrapping_mul(FNV_PRIME);
            i += 1;
        }

        NameHash(hash)
    }

    #[inline]
    pub const fn raw(self) -> u32 { self.0 }
}

impl<'a> From<&'a str> for NameHash {
    #[inline]
    fn from(name: &'a str) -> NameHash { NameHash::new(name) }
}

impl fmt::Display for NameHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const POSITION: NameHash = NameHash::new("position");

    #[test]
    fn test_known_vectors() {
        assert_eq!(NameHash::new("").raw(), 0x811c_9dc5);
        assert_eq!(NameHash::new("a").raw(), 0xe40c_292c);
        assert_eq!(NameHash::new("foobar").raw(), 0xbf9c_f968);
    }

    #[test]
    fn test_const_matches_runtime() {
        let name = String::from("position");

        assert_eq!(POSITION, NameHash::from(name.as_str()));
        assert_ne!(POSITION, NameHash::new("normal"));
    }
}
