//! Example components used by terrace demos.

/// Log file setup shared by the demos.
pub mod logging;
/// Selector gym example components.
pub mod selectgym;
/// Event loop ticker example.
pub mod ticker;
