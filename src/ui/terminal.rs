//! Terminal surface using crossterm
//!
//! Owns the terminal for as long as it lives: raw mode, the alternate
//! screen and mouse capture are switched on by [`TerminalSurface::init`] and
//! restored when the surface is dropped, including when `init` itself fails
//! half-way through.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use thiserror::Error;
use tracing::{debug, warn};

use super::surface::{CellBuffer, CellStyle, StyledChar, Surface};

#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("Failed to query terminal size: {0}")]
    Size(#[source] io::Error),

    #[error("Failed to initialize terminal: {0}")]
    Init(#[source] io::Error),
}

pub struct TerminalSurface {
    buffer: CellBuffer,
    style: CellStyle,
    /// Whether raw mode etc. still need restoring
    initialized: bool,
    mouse: bool,
}

impl TerminalSurface {
    /// Take over the terminal
    pub fn init(style: CellStyle) -> Result<Self, SurfaceError> {
        let (cols, rows) = terminal::size().map_err(SurfaceError::Size)?;
        terminal::enable_raw_mode().map_err(SurfaceError::Init)?;

        // From here on, dropping `surface` puts the terminal back
        let mut surface = Self {
            buffer: CellBuffer::new(cols, rows, StyledChar::blank(style)),
            style,
            initialized: true,
            mouse: false,
        };

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, DisableLineWrap, Hide).map_err(SurfaceError::Init)?;
        surface.set_default_style(style).map_err(SurfaceError::Init)?;

        debug!("terminal initialized at {}x{}", cols, rows);
        Ok(surface)
    }

    /// Start reporting mouse clicks and drags as input events
    pub fn enable_mouse(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, EnableMouseCapture)?;
        self.mouse = true;
        Ok(())
    }

    /// Style used to fill blank cells and clear the screen
    pub fn set_default_style(&mut self, style: CellStyle) -> io::Result<()> {
        self.style = style;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(style.fg),
            SetBackgroundColor(style.bg),
            Clear(ClearType::All)
        )?;
        self.buffer.mark_all_dirty();
        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;

        let mut stdout = io::stdout();

        if self.mouse {
            let _ = execute!(stdout, DisableMouseCapture);
            self.mouse = false;
        }

        let _ = execute!(stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = execute!(stdout, Show, EnableLineWrap);
        let _ = execute!(stdout, LeaveAlternateScreen);
        let _ = stdout.flush();

        terminal::disable_raw_mode()
    }

    fn write_cell<W: Write>(
        out: &mut W,
        col: u16,
        row: u16,
        cell: StyledChar,
        last_style: &mut Option<CellStyle>,
    ) -> io::Result<()> {
        queue!(out, MoveTo(col, row))?;
        if *last_style != Some(cell.style) {
            queue!(out, SetForegroundColor(cell.style.fg), SetBackgroundColor(cell.style.bg))?;
            *last_style = Some(cell.style);
        }
        queue!(out, Print(cell.ch))
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> (u16, u16) {
        self.buffer.size()
    }

    fn set_cell(&mut self, col: u16, row: u16, ch: char, style: CellStyle) {
        self.buffer.set(col, row, StyledChar { ch, style });
    }

    fn show(&mut self) -> io::Result<()> {
        let dirty = self.buffer.take_dirty();
        if dirty.is_empty() {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut out = io::BufWriter::with_capacity(65536, stdout.lock());

        // Begin synchronized update (reduces flicker)
        write!(out, "\x1b[?2026h")?;
        let mut last_style = None;
        for (col, row, cell) in dirty {
            Self::write_cell(&mut out, col, row, cell, &mut last_style)?;
        }
        write!(out, "\x1b[?2026l")?;
        out.flush()
    }

    fn sync(&mut self) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        if (cols, rows) != self.buffer.size() {
            self.buffer.resize(cols, rows);
        } else {
            self.buffer.mark_all_dirty();
        }

        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(self.style.fg),
            SetBackgroundColor(self.style.bg),
            Clear(ClearType::All)
        )
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            warn!("failed to restore terminal: {}", e);
        }
    }
}
