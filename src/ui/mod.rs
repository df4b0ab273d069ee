//! Terminal-facing side of the simulator.
//!
//! - **surface**: the character-cell display contract and staging buffer
//! - **terminal**: crossterm implementation of the surface
//! - **renderer**: stages the status text and the grid onto a surface
//! - **input**: blocking event reader thread feeding the control loop
//! - **keymapper**: key presses to game commands

pub mod input;
pub mod keymapper;
pub mod renderer;
pub mod surface;
pub mod terminal;

pub use input::{CrosstermEvents, InputEvent, InputReader};
pub use keymapper::{Command, KeyMapper};
pub use renderer::Renderer;
pub use surface::{CellStyle, Surface};
pub use terminal::TerminalSurface;
