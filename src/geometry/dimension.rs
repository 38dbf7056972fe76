use super::Coordinate;

/// Anything backed by a fixed-size pixel grid
pub trait HasDimensions {
    fn dimensions(&self) -> Dimensions;

    #[inline]
    fn in_bounds(&self, coord: Coordinate) -> bool {
        self.dimensions().in_bounds(coord)
    }
}

/// Width and height of a viewport, framebuffer or texture, in pixels
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[inline(always)]
    pub fn new(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    /// Number of pixels covered
    #[inline]
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn in_bounds(&self, coord: Coordinate) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Row-major index of `coord`, if it is in bounds
    #[inline]
    pub fn index_of(&self, coord: Coordinate) -> Option<usize> {
        if self.in_bounds(coord) { Some(coord.into_index(self.width)) } else { None }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_row_major_index() {
        let dimensions = Dimensions::new(4, 3);

        assert_eq!(dimensions.area(), 12);
        assert_eq!(dimensions.index_of(Coordinate::new(0, 0)), Some(0));
        assert_eq!(dimensions.index_of(Coordinate::new(3, 0)), Some(3));
        assert_eq!(dimensions.index_of(Coordinate::new(1, 2)), Some(9));
        assert_eq!(dimensions.index_of(Coordinate::new(4, 0)), None);
        assert_eq!(dimensions.index_of(Coordinate::new(0, 3)), None);
    }
}
