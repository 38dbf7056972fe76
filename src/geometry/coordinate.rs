/// Pixel coordinate, with the origin at the top-left corner
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd)]
pub struct Coordinate {
    pub x: u32,
    pub y: u32,
}

impl Coordinate {
    #[inline]
    pub fn new(x: u32, y: u32) -> Coordinate {
        Coordinate { x, y }
    }

    /// Row-major index into a buffer `width` pixels wide
    #[inline]
    pub fn into_index(self, width: u32) -> usize {
        let Coordinate { x, y } = self;
        y as usize * width as usize + x as usize
    }
}
