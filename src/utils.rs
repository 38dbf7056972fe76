//! Utilities

/// Clamp a value to the given range
pub fn clamp<T>(value: T, min: T, max: T) -> T where T: PartialOrd {
    if value < min { min } else if value > max { max } else { value }
}

/// Index of the first clear bit in a word-packed bitset, searching at most `limit` bits.
pub fn first_clear_bit(words: &[u64], limit: usize) -> Option<usize> {
    for (i, word) in words.iter().enumerate() {
        if *word != u64::MAX {
            let bit = i * 64 + (!*word).trailing_zeros() as usize;

            return if bit < limit { Some(bit) } else { None };
        }
    }

    None
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_first_clear_bit() {
        assert_eq!(first_clear_bit(&[0], 32), Some(0));
        assert_eq!(first_clear_bit(&[0b1011], 32), Some(2));
        assert_eq!(first_clear_bit(&[u64::MAX, 1], 128), Some(65));
        assert_eq!(first_clear_bit(&[0xFFFF_FFFF], 32), None);
    }
}
