//! Simulation core.
//!
//! Nothing in here touches the terminal:
//!
//! - **cell**: cell state and the B3/S23 rule
//! - **grid**: toroidal grid, generation step and resize
//! - **ticker**: periodic tick deadline for the control loop
//!
//! # Data flow
//!
//! ```text
//! Grid ──step()──▶ Grid      (new allocation every generation)
//! Grid ──resized()──▶ Grid   (overlap copied, rest dead)
//! ```

pub mod cell;
pub mod grid;
pub mod ticker;

pub use cell::Cell;
pub use grid::Grid;
pub use ticker::Ticker;
