use crate::entity::{Collidable, Locatable};
use crate::grid::Grid;
use crate::Coords;
use Heading::*;

/// Half of the head sprite's extent in pixels, independent of the cell size.
const HALF_HEAD_SIZE: i32 = 40;
const HALF_APPLE_SIZE: i32 = 40;

/// Where a freshly grown segment waits until the next move pulls it in.
pub const GROWTH_PLACEHOLDER: Coords = (-10, -10);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl Heading {
    pub fn clockwise(self) -> Heading {
        match self {
            Up => Right,
            Right => Down,
            Down => Left,
            Left => Up,
        }
    }

    pub fn counter_clockwise(self) -> Heading {
        match self {
            Up => Left,
            Left => Down,
            Down => Right,
            Right => Up,
        }
    }

    pub fn delta(self) -> Coords {
        match self {
            Up => (0, -1),
            Right => (1, 0),
            Down => (0, 1),
            Left => (-1, 0),
        }
    }
}

/// The snake: cell positions with the head at index 0.
#[derive(Debug, Clone)]
pub struct Snake {
    body: Vec<Coords>,
    heading: Heading,
    grid: Grid,
}

impl Snake {
    /// A snake already reset to the center of `grid`, so the body is never empty.
    pub fn new(grid: Grid) -> Self {
        let mut snake = Snake { body: Vec::with_capacity(16), heading: Right, grid };
        snake.reset(grid.width, grid.height);
        snake
    }

    pub fn reset(&mut self, width: i32, height: i32) {
        self.grid.width = width;
        self.grid.height = height;
        self.heading = Right;
        self.body.clear();
        self.body.push(self.grid.center());
    }

    pub fn body(&self) -> &[Coords] {
        &self.body
    }

    pub fn head(&self) -> Option<Coords> {
        self.body.first().copied()
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Shift every segment into the slot of the one ahead of it, then step the
    /// head one cell along the heading. Leaving the grid is not prevented here.
    pub fn move_step(&mut self) {
        let old_head = match self.head() {
            Some(head) => head,
            None => return,
        };

        let (dx, dy) = self.heading.delta();
        // The old tail wraps to the front and is overwritten by the new head
        self.body.rotate_right(1);
        self.body[0] = (old_head.0 + dx, old_head.1 + dy);
    }

    /// Recomputed from the current positions on every call.
    pub fn detect_death(&self) -> bool {
        let head = match self.head() {
            Some(head) => head,
            None => return false,
        };

        !self.grid.contains(head) || self.body[1..].contains(&head)
    }

    /// Rotate by a quarter turn: clockwise for taps on the right half of the
    /// screen, counter-clockwise for the left half. Reversing is allowed.
    pub fn switch_heading(&mut self, tap_x: i32, halfway_x: i32) {
        self.heading = if tap_x >= halfway_x {
            self.heading.clockwise()
        } else {
            self.heading.counter_clockwise()
        };
    }

    #[cfg(test)]
    pub(crate) fn with_body(grid: Grid, body: Vec<Coords>, heading: Heading) -> Self {
        Snake { body, heading, grid }
    }
}

impl Locatable for Snake {
    fn location(&self) -> Coords {
        self.head().unwrap_or(GROWTH_PLACEHOLDER)
    }
}

impl Collidable for Snake {
    /// Box test between the head and the target in pixel space. On a hit the
    /// snake grows by one placeholder segment at the tail.
    fn check_collision(&mut self, target: Coords) -> bool {
        let head = match self.head() {
            Some(head) => head,
            None => return false,
        };

        let (head_x, head_y) = self.grid.to_pixels(head);
        let (target_x, target_y) = self.grid.to_pixels(target);
        let distance_x = ((head_x + HALF_HEAD_SIZE) - (target_x + HALF_APPLE_SIZE)).abs();
        let distance_y = ((head_y + HALF_HEAD_SIZE) - (target_y + HALF_APPLE_SIZE)).abs();
        let reach = HALF_HEAD_SIZE + HALF_APPLE_SIZE;

        if distance_x < reach && distance_y < reach {
            self.body.push(GROWTH_PLACEHOLDER);
            return true;
        }

        false
    }
}
