//! Control loop
//!
//! `Game` owns the grid, the paused/running flag and the viewport size. It
//! is the only thing that mutates them; the input thread just feeds it
//! events over a channel.
//!
//! ```text
//! InputReader ──InputEvent──▶ Game::run ──▶ Grid::step (running + tick)
//!                                │       ──▶ Grid::set  (paused + click)
//!                                ▼
//!                            Renderer ──▶ Surface::show (once per iteration)
//! ```

use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use crossterm::event::MouseButton;
use tracing::{debug, info};

use crate::core::{Cell, Grid, Ticker};
use crate::ui::{Command, InputEvent, KeyMapper, Renderer, Surface};

/// Whether generations advance on ticks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimState {
    #[default]
    Paused,
    Running,
}

impl SimState {
    pub fn toggled(self) -> Self {
        match self {
            SimState::Paused => SimState::Running,
            SimState::Running => SimState::Paused,
        }
    }

    pub fn is_running(self) -> bool {
        self == SimState::Running
    }
}

/// Whether the loop keeps going after an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Game {
    grid: Grid,
    state: SimState,
    /// (cols, rows); always equal to the grid dimensions
    viewport: (u16, u16),
    generation: u64,
    keys: KeyMapper,
    renderer: Renderer,
}

impl Game {
    /// Start paused with an all-dead grid filling the viewport
    pub fn new(viewport: (u16, u16), keys: KeyMapper, renderer: Renderer) -> Self {
        Self {
            grid: Grid::new(viewport.0 as usize, viewport.1 as usize),
            state: SimState::Paused,
            viewport,
            generation: 0,
            keys,
            renderer,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn viewport(&self) -> (u16, u16) {
        self.viewport
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// React to one input event
    pub fn handle_event<S: Surface + ?Sized>(
        &mut self,
        event: InputEvent,
        surface: &mut S,
    ) -> io::Result<Flow> {
        match event {
            InputEvent::Key(key) => match self.keys.map(&key) {
                Some(Command::Quit) => {
                    info!("quit requested");
                    return Ok(Flow::Exit);
                }
                Some(Command::TogglePause) => {
                    self.state = self.state.toggled();
                    info!("simulation {:?} at generation {}", self.state, self.generation);
                }
                None => {}
            },
            InputEvent::Resize => self.resize(surface)?,
            InputEvent::Click { col, row, button } => {
                if button == MouseButton::Left && !self.state.is_running() {
                    self.place(col, row, surface);
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Advance one generation if running
    pub fn on_tick<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if !self.state.is_running() {
            return;
        }
        self.grid = self.grid.step();
        self.generation += 1;
        self.renderer.draw_grid(surface, &self.grid);
        debug!("generation {} population {}", self.generation, self.grid.population());
    }

    fn resize<S: Surface + ?Sized>(&mut self, surface: &mut S) -> io::Result<()> {
        surface.sync()?;
        let (cols, rows) = surface.size();
        info!("resize {}x{} -> {}x{}", self.viewport.0, self.viewport.1, cols, rows);
        self.grid = self.grid.resized(cols as usize, rows as usize);
        self.viewport = (cols, rows);
        Ok(())
    }

    fn place<S: Surface + ?Sized>(&mut self, col: u16, row: u16, surface: &mut S) {
        if self.grid.set(col as usize, row as usize, Cell::Alive) {
            self.renderer.draw_marker(surface, col, row);
            debug!("cell placed at ({}, {})", col, row);
        }
    }

    /// Run until the quit key.
    ///
    /// Each iteration stages the status text, flushes, then handles either
    /// one due tick or one input event. When both are ready, the source
    /// checked first alternates between iterations so neither can starve the
    /// other. Waiting for input never outlasts `idle` or the next tick
    /// deadline.
    pub fn run<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        events: &Receiver<InputEvent>,
        tick: Duration,
        idle: Duration,
    ) -> anyhow::Result<()> {
        let mut ticker = Ticker::new(tick, Instant::now());
        let mut input_first = false;
        info!("entering main loop, tick {:?}", tick);

        loop {
            self.renderer.draw_status(surface, self.state.is_running());
            surface.show().context("failed to draw to terminal")?;

            input_first = !input_first;
            let ready = if input_first {
                match poll_input(events)? {
                    Some(event) => Some(Wake::Input(event)),
                    None => ticker.fire(Instant::now()).then_some(Wake::Tick),
                }
            } else if ticker.fire(Instant::now()) {
                Some(Wake::Tick)
            } else {
                poll_input(events)?.map(Wake::Input)
            };

            let wake = match ready {
                Some(wake) => wake,
                None => {
                    let wait = ticker.remaining(Instant::now()).min(idle);
                    match events.recv_timeout(wait) {
                        Ok(event) => Wake::Input(event),
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => bail!("terminal input stream closed"),
                    }
                }
            };

            match wake {
                Wake::Tick => self.on_tick(surface),
                Wake::Input(event) => {
                    let flow = self
                        .handle_event(event, surface)
                        .context("failed to resync terminal")?;
                    if flow == Flow::Exit {
                        info!("leaving main loop after {} generations", self.generation);
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// What woke one loop iteration
enum Wake {
    Input(InputEvent),
    Tick,
}

/// Take a queued event without waiting
fn poll_input(events: &Receiver<InputEvent>) -> anyhow::Result<Option<InputEvent>> {
    match events.try_recv() {
        Ok(event) => Ok(Some(event)),
        Err(TryRecvError::Empty) => Ok(None),
        Err(TryRecvError::Disconnected) => bail!("terminal input stream closed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::renderer::{CLICK_MARKER, PAUSED_TEXT, RUNNING_TEXT};
    use crate::ui::surface::MemorySurface;
    use crate::ui::CellStyle;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::mpsc;
    use std::thread;

    const FOREVER: Duration = Duration::from_secs(3600);
    const IDLE: Duration = Duration::from_millis(1);

    fn game(cols: u16, rows: u16) -> Game {
        Game::new((cols, rows), KeyMapper::default(), Renderer::new(CellStyle::default()))
    }

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(col: u16, row: u16) -> InputEvent {
        InputEvent::Click {
            col,
            row,
            button: MouseButton::Left,
        }
    }

    fn send(game: &mut Game, surface: &mut MemorySurface, event: InputEvent) -> Flow {
        game.handle_event(event, surface).unwrap()
    }

    #[test]
    fn test_starts_paused_and_empty() {
        let g = game(8, 6);
        assert_eq!(g.state(), SimState::Paused);
        assert_eq!(g.viewport(), (8, 6));
        assert_eq!(g.grid().dimensions(), (8, 6));
        assert_eq!(g.grid().population(), 0);
    }

    #[test]
    fn test_quit_key_exits() {
        let mut g = game(5, 5);
        let mut surface = MemorySurface::new(5, 5);
        assert_eq!(send(&mut g, &mut surface, key(KeyCode::Esc)), Flow::Exit);

        g.state = SimState::Running;
        assert_eq!(send(&mut g, &mut surface, key(KeyCode::Esc)), Flow::Exit);
    }

    #[test]
    fn test_double_toggle_keeps_grid() {
        let mut g = game(5, 5);
        let mut surface = MemorySurface::new(5, 5);
        send(&mut g, &mut surface, click(1, 1));
        let before = g.grid().clone();

        send(&mut g, &mut surface, key(KeyCode::Enter));
        assert_eq!(g.state(), SimState::Running);
        send(&mut g, &mut surface, key(KeyCode::Enter));
        assert_eq!(g.state(), SimState::Paused);
        assert_eq!(g.grid(), &before);
    }

    #[test]
    fn test_click_while_paused_places_cell() {
        let mut g = game(5, 5);
        let mut surface = MemorySurface::new(5, 5);
        send(&mut g, &mut surface, click(3, 4));
        assert!(g.grid().is_alive(3, 4));
        assert_eq!(surface.char_at(3, 4), Some(CLICK_MARKER));
    }

    #[test]
    fn test_click_outside_grid_is_ignored() {
        let mut g = game(5, 5);
        let mut surface = MemorySurface::new(8, 8);
        send(&mut g, &mut surface, click(5, 0));
        send(&mut g, &mut surface, click(0, 7));
        assert_eq!(g.grid().population(), 0);
        assert_eq!(surface.char_at(5, 0), Some(' '));
    }

    #[test]
    fn test_non_primary_click_is_ignored() {
        let mut g = game(5, 5);
        let mut surface = MemorySurface::new(5, 5);
        let right = InputEvent::Click {
            col: 1,
            row: 1,
            button: MouseButton::Right,
        };
        send(&mut g, &mut surface, right);
        assert_eq!(g.grid().population(), 0);
    }

    #[test]
    fn test_click_while_running_is_ignored() {
        let mut g = game(5, 5);
        let mut surface = MemorySurface::new(5, 5);
        send(&mut g, &mut surface, key(KeyCode::Enter));
        send(&mut g, &mut surface, click(2, 2));
        assert_eq!(g.grid().population(), 0);
        assert_eq!(surface.char_at(2, 2), Some(' '));
    }

    #[test]
    fn test_tick_while_paused_does_nothing() {
        let mut g = game(5, 5);
        let mut surface = MemorySurface::new(5, 5);
        send(&mut g, &mut surface, click(0, 0));
        g.on_tick(&mut surface);
        assert_eq!(g.generation(), 0);
        assert!(g.grid().is_alive(0, 0));
    }

    #[test]
    fn test_blinker_scenario() {
        let mut g = game(5, 5);
        let mut surface = MemorySurface::new(5, 5);
        for row in 2..=4 {
            send(&mut g, &mut surface, click(2, row));
        }
        assert_eq!(g.grid().alive_cells(), vec![(2, 2), (2, 3), (2, 4)]);

        send(&mut g, &mut surface, key(KeyCode::Enter));
        assert_eq!(g.state(), SimState::Running);

        g.on_tick(&mut surface);
        assert_eq!(g.generation(), 1);
        assert_eq!(g.grid().alive_cells(), vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(surface.row_text(3), " 000 ");
        assert_eq!(surface.row_text(2), "     ");

        g.on_tick(&mut surface);
        assert_eq!(g.grid().alive_cells(), vec![(2, 2), (2, 3), (2, 4)]);
    }

    #[test]
    fn test_resize_grow_keeps_cells() {
        let mut g = game(10, 10);
        let mut surface = MemorySurface::new(10, 10);
        let placed = [(0, 0), (9, 4), (4, 2), (7, 9)];
        for (col, row) in placed {
            send(&mut g, &mut surface, click(col, row));
        }

        surface.resize_window(20, 5);
        send(&mut g, &mut surface, InputEvent::Resize);

        assert_eq!(surface.syncs, 1);
        assert_eq!(g.viewport(), (20, 5));
        assert_eq!(g.grid().dimensions(), (20, 5));
        assert_eq!(g.grid().alive_cells(), vec![(0, 0), (4, 2), (9, 4)]);
        for row in 0..5 {
            for col in 10..20 {
                assert!(!g.grid().is_alive(col, row));
            }
        }
    }

    #[test]
    fn test_resize_shrink() {
        let mut g = game(10, 10);
        let mut surface = MemorySurface::new(10, 10);
        for (col, row) in [(1, 1), (4, 4), (5, 5), (9, 0)] {
            send(&mut g, &mut surface, click(col, row));
        }

        surface.resize_window(5, 5);
        send(&mut g, &mut surface, InputEvent::Resize);
        assert_eq!(g.grid().dimensions(), (5, 5));
        assert_eq!(g.grid().alive_cells(), vec![(1, 1), (4, 4)]);
    }

    #[test]
    fn test_resize_keeps_state() {
        let mut g = game(6, 6);
        let mut surface = MemorySurface::new(6, 6);
        send(&mut g, &mut surface, key(KeyCode::Enter));
        surface.resize_window(3, 3);
        send(&mut g, &mut surface, InputEvent::Resize);
        assert_eq!(g.state(), SimState::Running);
    }

    #[test]
    fn test_run_until_quit() {
        let mut g = game(12, 6);
        let mut surface = MemorySurface::new(12, 6);
        let (tx, rx) = mpsc::channel();
        tx.send(click(1, 3)).unwrap();
        tx.send(key(KeyCode::Enter)).unwrap();
        tx.send(key(KeyCode::Enter)).unwrap();
        tx.send(key(KeyCode::Esc)).unwrap();

        g.run(&mut surface, &rx, FOREVER, IDLE).unwrap();

        assert_eq!(g.state(), SimState::Paused);
        assert_eq!(g.generation(), 0);
        assert!(g.grid().is_alive(1, 3));

        // One flush per handled event
        assert_eq!(surface.frames.len(), 4);
        assert_eq!(surface.frames[0][1], format!("  {}   ", PAUSED_TEXT));
        assert_eq!(surface.frames[2][1], format!("  {}   ", RUNNING_TEXT));
        assert_eq!(surface.frames[3][1], format!("  {}   ", PAUSED_TEXT));
        assert_eq!(surface.frames[1][3], format!(" {}          ", CLICK_MARKER));
    }

    #[test]
    fn test_run_advances_on_ticks() {
        let mut g = game(6, 6);
        let mut surface = MemorySurface::new(6, 6);
        let (tx, rx) = mpsc::channel();

        let feeder = thread::spawn(move || {
            tx.send(key(KeyCode::Enter)).unwrap();
            thread::sleep(Duration::from_millis(100));
            tx.send(key(KeyCode::Esc)).unwrap();
        });

        g.run(&mut surface, &rx, Duration::from_millis(1), IDLE).unwrap();
        feeder.join().unwrap();

        assert_eq!(g.state(), SimState::Running);
        assert!(g.generation() > 0);
        assert_eq!(g.grid().population(), 0);
    }

    /// Surface whose flush takes longer than a tick
    struct SlowSurface {
        inner: MemorySurface,
        delay: Duration,
    }

    impl Surface for SlowSurface {
        fn size(&self) -> (u16, u16) {
            self.inner.size()
        }

        fn set_cell(&mut self, col: u16, row: u16, ch: char, style: CellStyle) {
            self.inner.set_cell(col, row, ch, style);
        }

        fn show(&mut self) -> io::Result<()> {
            thread::sleep(self.delay);
            self.inner.show()
        }

        fn sync(&mut self) -> io::Result<()> {
            self.inner.sync()
        }
    }

    #[test]
    fn test_slow_flush_does_not_starve_input() {
        let (tx, rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            let mut g = game(8, 8);
            let mut surface = SlowSurface {
                inner: MemorySurface::new(8, 8),
                delay: Duration::from_millis(3),
            };
            // Every flush outlasts the tick period, so a tick is always due
            g.state = SimState::Running;
            tx.send(key(KeyCode::Esc)).unwrap();

            let result = g.run(&mut surface, &rx, Duration::from_millis(1), IDLE);
            let _ = done_tx.send((result.is_ok(), g.generation()));
        });

        let (ok, _generations) = done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("queued Esc was never handled");
        assert!(ok);
        worker.join().unwrap();
    }

    #[test]
    fn test_ticks_keep_flowing_under_input() {
        let mut g = game(6, 6);
        let mut surface = SlowSurface {
            inner: MemorySurface::new(6, 6),
            delay: Duration::from_millis(2),
        };
        let (tx, rx) = mpsc::channel();
        tx.send(key(KeyCode::Enter)).unwrap();
        for _ in 0..20 {
            tx.send(click(0, 0)).unwrap();
        }
        tx.send(key(KeyCode::Esc)).unwrap();

        g.run(&mut surface, &rx, Duration::from_millis(1), IDLE).unwrap();
        assert!(g.generation() > 0);
    }

    #[test]
    fn test_run_fails_when_input_closes() {
        let mut g = game(4, 4);
        let mut surface = MemorySurface::new(4, 4);
        let (tx, rx) = mpsc::channel::<InputEvent>();
        drop(tx);

        let err = g.run(&mut surface, &rx, FOREVER, IDLE).unwrap_err();
        assert!(err.to_string().contains("input stream closed"));
    }
}
