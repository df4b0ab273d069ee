//! Input multiplexer
//!
//! Reading the next terminal event blocks, so it happens on a dedicated
//! thread. That thread only translates events and sends them down a channel;
//! it never touches game state. The control loop receives from the channel
//! with a timeout and races it against its tick deadline.

#[cfg(test)]
use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseButton, MouseEventKind};
use tracing::{debug, error};

/// What the control loop reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// A key was pressed (releases and repeats are not reported)
    Key(KeyEvent),
    /// The terminal changed size; the new size is read from the surface
    Resize,
    /// A mouse button went down, or moved while held, at (col, row)
    Click { col: u16, row: u16, button: MouseButton },
}

impl InputEvent {
    /// Translate a raw backend event. Events the loop has no use for map
    /// to `None`.
    pub fn from_crossterm(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(InputEvent::Key(key)),
            Event::Resize(..) => Some(InputEvent::Resize),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(button) | MouseEventKind::Drag(button) => Some(InputEvent::Click {
                    col: mouse.column,
                    row: mouse.row,
                    button,
                }),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Blocking source of raw terminal events
pub trait EventSource: Send + 'static {
    fn read_event(&mut self) -> io::Result<Event>;
}

/// The real terminal
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn read_event(&mut self) -> io::Result<Event> {
        event::read()
    }
}

/// Replays a fixed list of events, then reports end of input
#[cfg(test)]
pub struct ScriptedEvents {
    events: VecDeque<Event>,
}

#[cfg(test)]
impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

#[cfg(test)]
impl EventSource for ScriptedEvents {
    fn read_event(&mut self) -> io::Result<Event> {
        self.events
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "event script exhausted"))
    }
}

/// Handle to the reader thread.
///
/// The thread cannot be interrupted while blocked in a read; it ends when
/// the receiver is dropped and the next event arrives, when the source
/// fails, or when the process exits.
pub struct InputReader {
    #[allow(dead_code)]
    handle: JoinHandle<()>,
}

impl InputReader {
    /// Spawn the reader thread. Returns the handle and the receiving end of
    /// the event channel.
    pub fn spawn<S: EventSource>(source: S) -> io::Result<(Self, Receiver<InputEvent>)> {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("termlife-input".to_string())
            .spawn(move || Self::read_loop(source, tx))?;
        Ok((Self { handle }, rx))
    }

    fn read_loop<S: EventSource>(mut source: S, tx: Sender<InputEvent>) {
        loop {
            match source.read_event() {
                Ok(raw) => {
                    let Some(event) = InputEvent::from_crossterm(raw) else {
                        continue;
                    };
                    if tx.send(event).is_err() {
                        debug!("input channel closed, reader exiting");
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!("failed to read terminal event: {}", e);
                    break;
                }
            }
        }
    }
}
