mod term;

use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    poll, read, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal;
use log::{info, LevelFilter};
use simplelog::{Config, WriteLogger};

use tap_snake::config::{DEFAULT_BLOCK_SIZE, DEFAULT_FRAME_MS, DEFAULT_TICK_MS};
use tap_snake::{Coords, GameConfig, GameLoop, GameSession, Renderer, SoundSink, TouchPhase};
use term::{Bell, Layout, TermManager};

/// How long the input thread waits for an event before polling again
const INPUT_POLL_MS: u64 = 50;

#[derive(Parser)]
#[command(name = "tap_snake")]
#[command(version, about = "Snake steered by taps on the left or right half of the screen")]
struct Cli {
    /// Grid width in cells (defaults to the terminal width)
    #[arg(long)]
    width: Option<i32>,

    /// Grid height in cells (defaults to the terminal height)
    #[arg(long)]
    height: Option<i32>,

    /// Pixel size of one cell, used for apple reach and tap positions
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: i32,

    /// Milliseconds between logic updates
    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u64,

    /// Milliseconds to sleep between redraws
    #[arg(long, default_value_t = DEFAULT_FRAME_MS)]
    frame_ms: u64,

    /// Where to write the log; the terminal belongs to the game
    #[arg(long, default_value = "tap_snake.log")]
    log_file: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging before anything else
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?;
    WriteLogger::init(cli.log_level, Config::default(), log_file)
        .context("Failed to initialize logger")?;

    info!("Starting tap_snake");

    let (cols, rows) = terminal::size().context("Failed to read terminal size")?;
    let layout = Layout::new(cols, rows, cli.block_size, cli.width, cli.height);
    let config = GameConfig::new(layout.grid_width, layout.grid_height)
        .with_block_size(cli.block_size)
        .with_tick_interval(Duration::from_millis(cli.tick_ms))
        .with_frame_interval(Duration::from_millis(cli.frame_ms));
    // The layout's pixel maths is only safe once the block size is known to be sane
    config.validate().context("Invalid game configuration")?;
    let session = GameSession::new(&config, layout.viewport())?;

    let mut out = stdout();
    term::enter(&mut out).context("Failed to set up the terminal")?;

    let renderer = TermManager::new(layout);
    let mut game_loop = GameLoop::new(session, renderer, Bell::new(), config.frame_interval);
    let result = run(&mut game_loop, &layout);

    // Stop drawing before handing the terminal back
    game_loop.pause();
    term::leave(&mut out).context("Failed to restore the terminal")?;

    info!("Bye");
    result
}

/// The lifecycle owner: forwards input to the loop until CTRL+C.
fn run<R, S>(game_loop: &mut GameLoop<R, S>, layout: &Layout) -> Result<()>
where
    R: Renderer + 'static,
    S: SoundSink + 'static,
{
    game_loop.resume();

    loop {
        if !poll(Duration::from_millis(INPUT_POLL_MS))? {
            continue;
        }

        match read()? {
            Event::Key(ev) if is_ctrl_c(&ev) => break,
            Event::Key(KeyEvent { code, modifiers: _ }) => match code {
                KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => {
                    tap(game_loop, layout.left_touch())
                }
                KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                    tap(game_loop, layout.right_touch())
                }
                KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Esc => {
                    tap(game_loop, layout.icon_touch())
                }
                KeyCode::Char('b') | KeyCode::Char('B') => toggle_background(game_loop),
                _ => {}
            },
            Event::Mouse(MouseEvent { kind, column, row, .. }) => {
                let (x, y) = layout.touch_point(column, row);
                match kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        game_loop.on_touch(x, y, TouchPhase::Down)
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        game_loop.on_touch(x, y, TouchPhase::Up)
                    }
                    _ => {}
                }
            }
            Event::Resize(cols, rows) => {
                info!("Terminal resized to {}x{}, keeping the current layout", cols, rows)
            }
        }
    }

    Ok(())
}

fn tap<R, S>(game_loop: &GameLoop<R, S>, (x, y): Coords)
where
    R: Renderer + 'static,
    S: SoundSink + 'static,
{
    game_loop.on_touch(x, y, TouchPhase::Down);
    game_loop.on_touch(x, y, TouchPhase::Up);
}

/// Stand-in for the app going to the background and coming back.
fn toggle_background<R, S>(game_loop: &mut GameLoop<R, S>)
where
    R: Renderer + 'static,
    S: SoundSink + 'static,
{
    if game_loop.is_running() {
        game_loop.pause();
    } else {
        game_loop.resume();
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
