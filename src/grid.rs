use crate::Coords;

/// The logical play field: `width` x `height` cells, each `block_size` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    pub block_size: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32, block_size: i32) -> Self {
        Grid { width, height, block_size }
    }

    pub fn center(&self) -> Coords {
        (self.width / 2, self.height / 2)
    }

    pub fn contains(&self, pos: Coords) -> bool {
        pos.0 >= 0 && pos.0 < self.width && pos.1 >= 0 && pos.1 < self.height
    }

    /// Pixel position of the top-left corner of a cell.
    pub fn to_pixels(&self, pos: Coords) -> Coords {
        (pos.0 * self.block_size, pos.1 * self.block_size)
    }

    /// Width of the whole field in pixels.
    pub fn pixel_width(&self) -> i32 {
        self.width * self.block_size
    }
}

/// Axis-aligned pixel rectangle, used for the pause icon hit box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect { x, y, width, height }
    }

    /// Strict containment: points on the edge are outside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x > self.x && x < self.x + self.width && y > self.y && y < self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_contains() {
        let grid = Grid::new(10, 8, 50);
        assert!(grid.contains((0, 0)));
        assert!(grid.contains((9, 7)));
        assert!(!grid.contains((10, 0)));
        assert!(!grid.contains((0, 8)));
        assert!(!grid.contains((-1, 3)));
        assert!(!grid.contains((-10, -10)));
    }

    #[test]
    fn test_grid_pixels() {
        let grid = Grid::new(40, 20, 27);
        assert_eq!(grid.center(), (20, 10));
        assert_eq!(grid.to_pixels((3, 2)), (81, 54));
        assert_eq!(grid.pixel_width(), 1080);
    }

    #[test]
    fn test_rect_edges_are_outside() {
        let rect = Rect::new(100, 100, 60, 60);
        assert!(rect.contains(130, 130));
        assert!(!rect.contains(100, 130));
        assert!(!rect.contains(160, 130));
        assert!(!rect.contains(130, 160));
        assert!(!rect.contains(10, 10));
    }
}
