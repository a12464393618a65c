//! The game session state machine.
//!
//! A session owns the snake, the apple and the score. It moves between
//! `NotStarted`, `Playing`, `Paused` and `GameOver`, driven by `update` from
//! the tick loop and by taps delivered through `handle_touch`.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::apple::Apple;
use crate::config::{ConfigError, GameConfig};
use crate::entity::{Collidable, Locatable};
use crate::grid::{Grid, Rect};
use crate::snake::{Heading, Snake};
use crate::Coords;

/// Pause icon placement in pixels, measured from the top-right corner.
const PAUSE_ICON_MARGIN: i32 = 100;
const PAUSE_ICON_SIZE: i32 = 60;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the first tap of a fresh game
    NotStarted,
    Playing,
    /// Paused by the player through the pause icon
    Paused,
    /// The snake crashed; the next tap starts over
    GameOver,
}

impl SessionState {
    /// True in every state where `update` must not run.
    pub fn is_halted(self) -> bool {
        self != SessionState::Playing
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TouchPhase {
    Down,
    Up,
}

/// One touch sample in screen pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TouchEvent {
    pub x: i32,
    pub y: i32,
    pub phase: TouchPhase,
}

impl TouchEvent {
    pub fn new(x: i32, y: i32, phase: TouchPhase) -> Self {
        TouchEvent { x, y, phase }
    }
}

/// What a completed tap does to the session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TapAction {
    TogglePause,
    Restart,
    Steer,
}

/// Screen-side layout the session needs to interpret taps.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Viewport {
    /// Taps at or right of this x turn clockwise
    pub halfway_x: i32,
    pub pause_icon: Rect,
}

impl Viewport {
    pub fn new(halfway_x: i32, pause_icon: Rect) -> Self {
        Viewport { halfway_x, pause_icon }
    }

    /// Layout for a screen exactly as wide as the play field.
    pub fn for_grid(grid: &Grid) -> Self {
        let width = grid.pixel_width();
        let icon = Rect::new(
            width - PAUSE_ICON_SIZE - PAUSE_ICON_MARGIN,
            PAUSE_ICON_MARGIN,
            PAUSE_ICON_SIZE,
            PAUSE_ICON_SIZE,
        );
        Viewport::new(width / 2, icon)
    }
}

/// Outcome of a single logic update.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Tick {
    pub ate_apple: bool,
    pub crashed: bool,
}

/// Everything a renderer needs for one redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<'a> {
    pub segments: &'a [Coords],
    pub heading: Heading,
    pub apple: Coords,
    pub score: u32,
    pub state: SessionState,
    pub show_pause_icon: bool,
}

/// Decide what a released tap means.
///
/// Only a tap that both starts and ends on the pause icon toggles pause. Any
/// other tap restarts a halted game, unless it started on the icon, and
/// steers otherwise.
pub fn classify_tap(
    state: SessionState,
    pressed_on_icon: bool,
    released_on_icon: bool,
) -> TapAction {
    if pressed_on_icon && released_on_icon {
        TapAction::TogglePause
    } else if state.is_halted() && !pressed_on_icon {
        TapAction::Restart
    } else {
        TapAction::Steer
    }
}

pub struct GameSession {
    grid: Grid,
    viewport: Viewport,
    snake: Snake,
    apple: Apple,
    score: u32,
    state: SessionState,
    tick_interval: Duration,
    next_tick: Instant,
    pressed_on_icon: bool,
}

impl GameSession {
    pub fn new(config: &GameConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = config.grid;

        Ok(GameSession {
            grid,
            viewport,
            snake: Snake::new(grid),
            apple: Apple::new((grid.width, grid.height)),
            score: 0,
            state: SessionState::NotStarted,
            tick_interval: config.tick_interval,
            next_tick: Instant::now(),
            pressed_on_icon: false,
        })
    }

    pub fn new_game(&mut self) {
        self.snake.reset(self.grid.width, self.grid.height);
        self.apple.spawn();
        self.score = 0;
        self.next_tick = Instant::now();
        self.state = SessionState::Playing;
        info!("New game on a {}x{} grid", self.grid.width, self.grid.height);
    }

    /// Check whether the next tick is due at `now`, and if so arm the one after
    /// it. The next deadline counts from `now`, so late ticks drift.
    pub fn update_required(&mut self, now: Instant) -> bool {
        if self.next_tick <= now {
            self.next_tick = now + self.tick_interval;
            return true;
        }

        false
    }

    pub fn update(&mut self) -> Tick {
        let mut tick = Tick::default();

        self.snake.move_step();

        if self.snake.check_collision(self.apple.location()) {
            self.apple.spawn();
            self.score += 1;
            tick.ate_apple = true;
            debug!("Apple eaten, score {}, next apple at {:?}", self.score, self.apple.location());
        }

        if self.snake.detect_death() {
            self.state = SessionState::GameOver;
            tick.crashed = true;
            info!("Snake crashed at {:?} with score {}", self.snake.location(), self.score);
        }

        tick
    }

    /// Feed one touch sample. Returns the action taken when a tap completes.
    pub fn handle_touch(&mut self, touch: TouchEvent) -> Option<TapAction> {
        let on_icon = self.viewport.pause_icon.contains(touch.x, touch.y);

        match touch.phase {
            TouchPhase::Down => {
                self.pressed_on_icon = on_icon;
                None
            }
            TouchPhase::Up => {
                let action = classify_tap(self.state, self.pressed_on_icon, on_icon);
                self.pressed_on_icon = false;

                match action {
                    TapAction::TogglePause => self.toggle_pause(),
                    TapAction::Restart => self.new_game(),
                    TapAction::Steer => self.snake.switch_heading(touch.x, self.viewport.halfway_x),
                }

                Some(action)
            }
        }
    }

    /// The app is going to the background. Progress is abandoned unless the
    /// player paused on purpose.
    pub fn on_background(&mut self) {
        self.pressed_on_icon = false;

        if self.state == SessionState::Paused {
            return;
        }

        self.new_game();
        self.state = SessionState::NotStarted;
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            segments: self.snake.body(),
            heading: self.snake.heading(),
            apple: self.apple.location(),
            score: self.score,
            state: self.state,
            show_pause_icon: !self.pressed_on_icon,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        !self.state.is_halted()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn apple(&self) -> &Apple {
        &self.apple
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    fn toggle_pause(&mut self) {
        self.state = match self.state {
            SessionState::Playing => {
                info!("Paused by player");
                SessionState::Paused
            }
            SessionState::Paused => {
                info!("Resumed by player");
                SessionState::Playing
            }
            other => other,
        };
    }

    #[cfg(test)]
    fn place_snake(&mut self, body: Vec<Coords>, heading: Heading) {
        self.snake = Snake::with_body(self.grid, body, heading);
    }

    #[cfg(test)]
    pub(crate) fn place_apple(&mut self, pos: Coords) {
        self.apple.place(pos);
    }
}
