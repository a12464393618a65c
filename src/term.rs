use std::io::{stdout, Stdout, Write};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style, terminal};
use log::{info, warn};

use tap_snake::{
    Coords, Effect, Frame, Grid, Heading, Rect, Renderer, SessionState, SoundSink, Viewport,
};

pub type TermInt = u16;

const SNAKE_BODY_CHAR: char = '█';
const APPLE_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';
const PAUSE_ICON: &str = "[||]";

/// Top-left terminal cell of grid cell (0, 0): one status row, then the border.
const FIELD_ORIGIN: (i32, i32) = (1, 2);

pub fn enter(stdout: &mut Stdout) -> crossterm::Result<()> {
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    terminal::enable_raw_mode()?;
    execute!(stdout, cursor::Hide, cursor::DisableBlinking, terminal::Clear(ClearType::All))
}

pub fn leave(stdout: &mut Stdout) -> crossterm::Result<()> {
    terminal::disable_raw_mode()?;
    execute!(
        stdout,
        cursor::Show,
        cursor::EnableBlinking,
        DisableMouseCapture,
        LeaveAlternateScreen
    )
}

/// How the terminal maps onto the play field and onto touch pixels.
///
/// Every terminal cell stands for a `block_size` square of pixels, so a click
/// on a cell becomes a touch at that square's center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub cols: TermInt,
    pub rows: TermInt,
    pub block_size: i32,
    pub grid_width: i32,
    pub grid_height: i32,
}

impl Layout {
    /// Fit the field inside the border, shrinking any requested size that
    /// does not fit.
    pub fn new(
        cols: TermInt,
        rows: TermInt,
        block_size: i32,
        width: Option<i32>,
        height: Option<i32>,
    ) -> Self {
        let max_width = cols as i32 - FIELD_ORIGIN.0 - 1;
        let max_height = rows as i32 - FIELD_ORIGIN.1 - 1;

        Layout {
            cols,
            rows,
            block_size,
            grid_width: width.map_or(max_width, |w| w.min(max_width)),
            grid_height: height.map_or(max_height, |h| h.min(max_height)),
        }
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_width, self.grid_height, self.block_size)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.cols as i32 * self.block_size / 2, self.icon_rect())
    }

    pub fn touch_point(&self, col: TermInt, row: TermInt) -> Coords {
        let half = self.block_size / 2;
        (col as i32 * self.block_size + half, row as i32 * self.block_size + half)
    }

    pub fn icon_touch(&self) -> Coords {
        self.touch_point(self.icon_col() as TermInt + 1, 0)
    }

    pub fn left_touch(&self) -> Coords {
        self.touch_point(self.cols / 4, self.rows / 2)
    }

    pub fn right_touch(&self) -> Coords {
        self.touch_point(self.cols - self.cols / 4, self.rows / 2)
    }

    fn icon_col(&self) -> i32 {
        (self.cols as i32 - PAUSE_ICON.len() as i32 - 2).max(0)
    }

    fn icon_rect(&self) -> Rect {
        Rect::new(
            self.icon_col() * self.block_size,
            0,
            PAUSE_ICON.chars().count() as i32 * self.block_size,
            self.block_size,
        )
    }

    fn field_cell(&self, pos: Coords) -> Option<Coords> {
        if self.grid().contains(pos) {
            Some((pos.0 + FIELD_ORIGIN.0, pos.1 + FIELD_ORIGIN.1))
        } else {
            None
        }
    }
}

/// The characters of one whole screen.
struct Canvas {
    width: TermInt,
    height: TermInt,
    cells: Vec<char>,
}

impl Canvas {
    fn new(width: TermInt, height: TermInt) -> Self {
        Canvas { width, height, cells: vec![' '; width as usize * height as usize] }
    }

    fn set(&mut self, pos: Coords, ch: char) {
        if pos.0 < 0 || pos.1 < 0 || pos.0 >= self.width as i32 || pos.1 >= self.height as i32 {
            return;
        }
        self.cells[self.width as usize * pos.1 as usize + pos.0 as usize] = ch;
    }

    fn text(&mut self, pos: Coords, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            self.set((pos.0 + i as i32, pos.1), ch);
        }
    }
}

/// Draws frames to the terminal, only re-emitting cells that changed.
pub struct TermManager {
    layout: Layout,
    stdout: Stdout,
    screen: Vec<char>,
}

impl TermManager {
    pub fn new(layout: Layout) -> Self {
        let screen = vec![' '; layout.cols as usize * layout.rows as usize];
        TermManager { layout, stdout: stdout(), screen }
    }

    pub fn render(&mut self, frame: &Frame<'_>) -> crossterm::Result<()> {
        let mut canvas = Canvas::new(self.layout.cols, self.layout.rows);

        self.draw_status(&mut canvas, frame);
        self.draw_borders(&mut canvas);
        self.draw_field(&mut canvas, frame);

        if let Some(lines) = message_for(frame) {
            let lines: Vec<&str> = lines.iter().map(|line| line.as_str()).collect();
            self.draw_message(&mut canvas, &lines);
        }

        self.present(&canvas)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_status(&self, canvas: &mut Canvas, frame: &Frame<'_>) {
        canvas.text((1, 0), &format!("Score: {}", frame.score));

        if frame.show_pause_icon {
            canvas.text((self.layout.icon_col(), 0), PAUSE_ICON);
        }
    }

    fn draw_borders(&self, canvas: &mut Canvas) {
        let (left, top) = (FIELD_ORIGIN.0 - 1, FIELD_ORIGIN.1 - 1);
        let right = FIELD_ORIGIN.0 + self.layout.grid_width;
        let bottom = FIELD_ORIGIN.1 + self.layout.grid_height;

        for x in left..=right {
            let ch = if x == left || x == right {'+'} else {'-'};
            canvas.set((x, top), ch);
            canvas.set((x, bottom), ch);
        }

        for y in top + 1..bottom {
            canvas.set((left, y), '|');
            canvas.set((right, y), '|');
        }
    }

    fn draw_field(&self, canvas: &mut Canvas, frame: &Frame<'_>) {
        if let Some(cell) = self.layout.field_cell(frame.apple) {
            canvas.set(cell, APPLE_CHAR);
        }

        let dead = frame.state == SessionState::GameOver;
        let body_char = if dead {DEAD_SNAKE_CHAR} else {SNAKE_BODY_CHAR};

        // Tail first so the head ends up on top
        for (i, pos) in frame.segments.iter().enumerate().rev() {
            let ch = if i == 0 && !dead {head_char(frame.heading)} else {body_char};
            if let Some(cell) = self.layout.field_cell(*pos) {
                canvas.set(cell, ch);
            }
        }
    }

    fn draw_message(&self, canvas: &mut Canvas, lines: &[&str]) {
        let msg_height = lines.len() as i32 + 2;
        let msg_width = lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) as i32 + 2;
        let center = (
            FIELD_ORIGIN.0 + self.layout.grid_width / 2,
            FIELD_ORIGIN.1 + self.layout.grid_height / 2,
        );
        let top_left = (center.0 - msg_width / 2, center.1 - msg_height / 2);

        // The top and bottom empty lines
        let blank = " ".repeat(msg_width as usize);
        canvas.text(top_left, &blank);
        canvas.text((top_left.0, top_left.1 + msg_height - 1), &blank);

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            canvas.text((top_left.0, top_left.1 + i as i32 + 1), &padded_line);
        }
    }

    fn present(&mut self, canvas: &Canvas) -> crossterm::Result<()> {
        let width = self.layout.cols as usize;

        for (i, (&wanted, shown)) in canvas.cells.iter().zip(self.screen.iter_mut()).enumerate() {
            if wanted == *shown {
                continue;
            }
            let (x, y) = ((i % width) as TermInt, (i / width) as TermInt);
            queue!(self.stdout, cursor::MoveTo(x, y), style::Print(wanted))?;
            *shown = wanted;
        }

        self.stdout.flush()?;
        Ok(())
    }
}

impl Renderer for TermManager {
    fn draw(&mut self, frame: &Frame<'_>) {
        if let Err(err) = self.render(frame) {
            warn!("Skipped a frame: {}", err);
        }
    }
}

/// Rings the terminal bell for every sound effect.
pub struct Bell {
    stdout: Stdout,
}

impl Bell {
    pub fn new() -> Self {
        Bell { stdout: stdout() }
    }
}

impl SoundSink for Bell {
    fn play_effect(&mut self, effect: Effect) {
        info!("Sound effect: {:?}", effect);

        let res = self.stdout.write_all(b"\x07").and_then(|_| self.stdout.flush());
        if let Err(err) = res {
            warn!("Could not ring the bell: {}", err);
        }
    }
}

pub fn head_char(heading: Heading) -> char {
    match heading {
        Heading::Up => '^',
        Heading::Down => 'v',
        Heading::Left => '<',
        Heading::Right => '>',
    }
}

fn message_for(frame: &Frame<'_>) -> Option<Vec<String>> {
    let lines = match frame.state {
        SessionState::NotStarted => vec![
            "Tap to play".to_string(),
            String::new(),
            "Click left/right half, arrows or A/D to turn".to_string(),
            "Esc or P to pause, B to background".to_string(),
            "CTRL+C to quit".to_string(),
        ],
        SessionState::GameOver => vec![
            "Tap to Restart".to_string(),
            format!("Score: {}", frame.score),
        ],
        SessionState::Paused => vec!["Paused".to_string()],
        SessionState::Playing => return None,
    };

    Some(lines)
}
