//! Simulation core of a tap-controlled grid snake game.
//!
//! The core owns the snake, the apple, the score and the play/pause state, and
//! runs them from a fixed-rate tick loop. Drawing and sound are collaborators
//! behind the `Renderer` and `SoundSink` traits.

pub mod apple;
pub mod config;
pub mod entity;
pub mod grid;
pub mod scheduler;
pub mod session;
pub mod snake;

/// A cell position in grid units, or a pixel position where noted.
pub type Coords = (i32, i32);

pub use apple::Apple;
pub use config::{ConfigError, GameConfig};
pub use entity::{Collidable, Locatable};
pub use grid::{Grid, Rect};
pub use scheduler::{Effect, GameLoop, Renderer, SoundSink};
pub use session::{Frame, GameSession, SessionState, TapAction, TouchEvent, TouchPhase, Viewport};
pub use snake::{Heading, Snake};
