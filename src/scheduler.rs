//! The tick loop: a dedicated thread that runs logic at a fixed rate and
//! redraws on every iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, sleep, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::session::{Frame, GameSession, TouchEvent, TouchPhase};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Effect {
    Eat,
    Crash,
}

/// Redraw sink, called once per loop iteration from the loop thread.
pub trait Renderer: Send {
    fn draw(&mut self, frame: &Frame<'_>);
}

/// Sound sink. Must not block the tick.
pub trait SoundSink: Send {
    fn play_effect(&mut self, effect: Effect);
}

/// Everything the loop thread owns while it runs.
struct LoopState<R, S> {
    session: GameSession,
    renderer: R,
    sound: S,
    touches: Receiver<TouchEvent>,
}

/// Starts and stops the loop thread on behalf of a lifecycle owner.
///
/// Touches are queued and drained by the loop thread once per iteration, so
/// the session is only ever mutated from one thread at a time.
pub struct GameLoop<R, S> {
    playing: Arc<AtomicBool>,
    frame_interval: Duration,
    touch_tx: Sender<TouchEvent>,
    idle: Option<LoopState<R, S>>,
    thread: Option<JoinHandle<LoopState<R, S>>>,
}

impl<R, S> GameLoop<R, S>
where
    R: Renderer + 'static,
    S: SoundSink + 'static,
{
    pub fn new(session: GameSession, renderer: R, sound: S, frame_interval: Duration) -> Self {
        let (touch_tx, touches) = channel();

        GameLoop {
            playing: Arc::new(AtomicBool::new(false)),
            frame_interval,
            touch_tx,
            idle: Some(LoopState { session, renderer, sound, touches }),
            thread: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// The session, while the loop is stopped.
    pub fn session(&self) -> Option<&GameSession> {
        self.idle.as_ref().map(|state| &state.session)
    }

    /// Start the loop thread. Does nothing if it is already running.
    ///
    /// Touches delivered while the loop was stopped are dropped.
    pub fn resume(&mut self) {
        let state = match self.idle.take() {
            Some(state) => state,
            None => {
                if self.thread.is_none() {
                    warn!("Nothing to resume, the session was lost with the loop thread");
                }
                return;
            }
        };

        let dropped = state.touches.try_iter().count();
        if dropped > 0 {
            debug!("Dropped {} touches received while stopped", dropped);
        }

        self.playing.store(true, Ordering::SeqCst);
        let playing = Arc::clone(&self.playing);
        let frame_interval = self.frame_interval;

        self.thread = Some(thread::spawn(move || run_loop(state, &playing, frame_interval)));
        info!("Game loop resumed");
    }

    /// Stop the loop thread and wait for it to finish its current iteration.
    /// Unless the player paused on purpose, the session starts over.
    pub fn pause(&mut self) {
        self.playing.store(false, Ordering::SeqCst);

        let handle = match self.thread.take() {
            Some(handle) => handle,
            None => return,
        };

        match handle.join() {
            Ok(mut state) => {
                state.session.on_background();
                self.idle = Some(state);
                info!("Game loop paused");
            }
            Err(_) => error!("Game loop thread panicked, session lost"),
        }
    }

    /// Deliver one touch sample; it is applied on the next loop iteration.
    pub fn on_touch(&self, x: i32, y: i32, phase: TouchPhase) {
        // The receiver lives as long as the loop state does
        let _ = self.touch_tx.send(TouchEvent::new(x, y, phase));
    }
}

impl<R, S> Drop for GameLoop<R, S> {
    fn drop(&mut self) {
        self.playing.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn run_loop<R: Renderer, S: SoundSink>(
    mut state: LoopState<R, S>,
    playing: &AtomicBool,
    frame_interval: Duration,
) -> LoopState<R, S> {
    while playing.load(Ordering::SeqCst) {
        for touch in state.touches.try_iter() {
            state.session.handle_touch(touch);
        }

        if state.session.is_running() && state.session.update_required(Instant::now()) {
            let tick = state.session.update();
            if tick.ate_apple {
                state.sound.play_effect(Effect::Eat);
            }
            if tick.crashed {
                state.sound.play_effect(Effect::Crash);
            }
        }

        state.renderer.draw(&state.session.frame());

        if !frame_interval.is_zero() {
            sleep(frame_interval);
        }
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::session::{SessionState, Viewport};
    use crate::Coords;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct RecordingRenderer {
        frames: Arc<Mutex<Vec<(Coords, SessionState)>>>,
    }

    impl Renderer for RecordingRenderer {
        fn draw(&mut self, frame: &Frame<'_>) {
            self.frames.lock().unwrap().push((frame.segments[0], frame.state));
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSound {
        effects: Arc<Mutex<Vec<Effect>>>,
    }

    impl SoundSink for RecordingSound {
        fn play_effect(&mut self, effect: Effect) {
            self.effects.lock().unwrap().push(effect);
        }
    }

    type RecordingLoop = GameLoop<RecordingRenderer, RecordingSound>;

    struct PanickingRenderer;

    impl Renderer for PanickingRenderer {
        fn draw(&mut self, _frame: &Frame<'_>) {
            panic!("renderer failed");
        }
    }

    fn new_session(config: &GameConfig) -> GameSession {
        GameSession::new(config, Viewport::for_grid(&config.grid)).unwrap()
    }

    fn loop_for(
        session: GameSession,
        frame_interval: Duration,
    ) -> (RecordingLoop, RecordingRenderer, RecordingSound) {
        let renderer = RecordingRenderer::default();
        let sound = RecordingSound::default();
        let game_loop = GameLoop::new(session, renderer.clone(), sound.clone(), frame_interval);
        (game_loop, renderer, sound)
    }

    fn recording_loop(config: GameConfig) -> (RecordingLoop, RecordingRenderer, RecordingSound) {
        loop_for(new_session(&config), config.frame_interval)
    }

    fn start_game<R: Renderer + 'static, S: SoundSink + 'static>(game_loop: &GameLoop<R, S>) {
        game_loop.on_touch(10, 10, TouchPhase::Down);
        game_loop.on_touch(10, 10, TouchPhase::Up);
    }

    #[test]
    fn test_draws_without_ticking_until_started() {
        let (mut game_loop, renderer, sound) = recording_loop(GameConfig::new(20, 20));
        game_loop.resume();
        assert!(game_loop.is_running());
        sleep(Duration::from_millis(50));
        game_loop.pause();

        let frames = renderer.frames.lock().unwrap();
        assert!(!frames.is_empty());
        assert!(frames
            .iter()
            .all(|&(head, state)| head == (10, 10) && state == SessionState::NotStarted));
        assert!(sound.effects.lock().unwrap().is_empty());
    }

    #[test]
    fn test_ticks_throttled_while_drawing_every_iteration() {
        let config = GameConfig::new(40, 20)
            .with_tick_interval(Duration::from_millis(25))
            .with_frame_interval(Duration::from_millis(1));
        let (mut game_loop, renderer, _sound) = recording_loop(config);
        game_loop.resume();
        start_game(&game_loop);
        sleep(Duration::from_millis(120));
        game_loop.pause();

        let frames = renderer.frames.lock().unwrap();
        let playing: Vec<Coords> = frames
            .iter()
            .filter(|(_, state)| *state == SessionState::Playing)
            .map(|(head, _)| *head)
            .collect();
        let mut heads = playing.clone();
        heads.dedup();

        // Several frames per tick, and each tick moves the head one cell right
        assert!(heads.len() >= 2);
        assert!(playing.len() > heads.len());
        assert!(heads.len() <= 8);
        for pair in heads.windows(2) {
            assert_eq!(pair[1], (pair[0].0 + 1, pair[0].1));
        }
    }

    #[test]
    fn test_pause_blocks_until_stopped_and_abandons_game() {
        let config = GameConfig::new(40, 20).with_tick_interval(Duration::from_millis(10));
        let (mut game_loop, renderer, _sound) = recording_loop(config);
        game_loop.resume();
        start_game(&game_loop);
        sleep(Duration::from_millis(60));
        game_loop.pause();
        assert!(!game_loop.is_running());

        let drawn = renderer.frames.lock().unwrap().len();
        sleep(Duration::from_millis(30));
        assert_eq!(renderer.frames.lock().unwrap().len(), drawn);

        let session = game_loop.session().unwrap();
        assert_eq!(session.state(), SessionState::NotStarted);
        assert_eq!(session.snake().body(), &[(20, 10)]);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_crash_triggers_sound_once() {
        let config = GameConfig::new(5, 5).with_tick_interval(Duration::from_millis(5));
        let (mut game_loop, renderer, sound) = recording_loop(config);
        game_loop.resume();
        start_game(&game_loop);
        sleep(Duration::from_millis(150));
        game_loop.pause();

        let effects = sound.effects.lock().unwrap();
        assert_eq!(effects.iter().filter(|e| **e == Effect::Crash).count(), 1);
        assert_eq!(effects.last(), Some(&Effect::Crash));
        assert!(renderer
            .frames
            .lock()
            .unwrap()
            .iter()
            .any(|(_, state)| *state == SessionState::GameOver));
    }

    #[test]
    fn test_resume_twice_is_harmless() {
        let (mut game_loop, _renderer, _sound) = recording_loop(GameConfig::new(10, 10));
        game_loop.resume();
        game_loop.resume();
        assert!(game_loop.is_running());
        game_loop.pause();
        game_loop.pause();
        assert!(game_loop.session().is_some());
    }

    #[test]
    fn test_eating_plays_eat_before_crash() {
        // 100px blocks: the apple is only reached from its own cell
        let config = GameConfig::new(3, 3)
            .with_block_size(100)
            .with_tick_interval(Duration::from_millis(5));
        let mut session = new_session(&config);
        session.new_game();
        session.place_apple((2, 1));

        let (mut game_loop, _renderer, sound) = loop_for(session, config.frame_interval);
        game_loop.resume();
        sleep(Duration::from_millis(100));
        game_loop.pause();

        // Eats at (2, 1), then leaves the grid at x = 3 where no apple can spawn
        assert_eq!(*sound.effects.lock().unwrap(), vec![Effect::Eat, Effect::Crash]);
    }

    #[test]
    fn test_touches_while_stopped_are_dropped() {
        let (mut game_loop, renderer, _sound) = recording_loop(GameConfig::new(20, 20));
        game_loop.resume();
        game_loop.pause();

        start_game(&game_loop);
        renderer.frames.lock().unwrap().clear();

        game_loop.resume();
        sleep(Duration::from_millis(50));
        game_loop.pause();

        let frames = renderer.frames.lock().unwrap();
        assert!(!frames.is_empty());
        assert!(frames.iter().all(|(_, state)| *state == SessionState::NotStarted));
    }

    #[test]
    fn test_panicked_loop_cannot_resume() {
        let config = GameConfig::new(10, 10);
        let sound = RecordingSound::default();
        let mut game_loop =
            GameLoop::new(new_session(&config), PanickingRenderer, sound, config.frame_interval);

        game_loop.resume();
        game_loop.pause();
        assert!(!game_loop.is_running());
        assert!(game_loop.session().is_none());

        game_loop.resume();
        assert!(!game_loop.is_running());
    }
}
