//! Terrace: a terminal UI runtime.
//!
//! Terrace provides the pieces an interactive command-line shell needs to draw
//! and take input without a full widget tree:
//!
//! - [`eventloop`] - a priority-ordered, multi-subscriber message bus with
//!   pluggable processors for ticks and background tasks
//! - [`screen`] - a layered character grid and its [`screen::Writer`]
//! - [`event`] - bit-packed key and mouse events with composable handlers
//! - [`binder`] and [`reader`] - resolution of raw terminal input into bindings
//! - [`component`] - the render/read loop that drives interactive components
//! - [`widgets`] - ready-made components such as the item selector

#![warn(missing_docs)]

// Internal core module - re-export specific items below
mod core;

pub mod widgets;

pub use core::{
    backend, binder, component, error, event, eventloop, keymap, reader, screen, style,
};
#[cfg(any(test, feature = "testing"))]
pub use core::testing;

pub use component::{Component, RunloopOptions};
pub use error::{Error, Result};
pub use eventloop::{EventLoop, Message};
pub use geom;
