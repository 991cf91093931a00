//! Core runtime types for the terrace terminal UI library.

/// Terminal providers.
pub mod backend;
/// Key map construction from terminal capabilities.
pub mod binder;
/// The component render loop.
pub mod component;
/// Core error types.
pub mod error;
/// Input event types.
pub mod event;
/// The message bus.
pub mod eventloop;
/// Sequence to binding tables.
pub mod keymap;
/// Raw input resolution.
pub mod reader;
/// The layered screen compositor.
pub mod screen;
/// Colors and text attributes.
pub mod style;
/// Testing utilities.
#[cfg(any(test, feature = "testing"))]
pub mod testing;
