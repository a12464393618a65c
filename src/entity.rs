use crate::Coords;

/// Something that occupies a cell the session can ask about.
pub trait Locatable {
    fn location(&self) -> Coords;
}

/// Something that can run into a target cell.
///
/// A hit may change the collider (the snake grows), hence `&mut self`.
pub trait Collidable {
    fn check_collision(&mut self, target: Coords) -> bool;
}
