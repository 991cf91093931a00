//! Geometry primitives used across terrace.
//!
//! Coordinates are signed so that drawing operations can address cells that
//! fall partially or entirely off-grid. Clipping is the responsibility of the
//! consumer.

/// Alignment helpers.
mod align;
/// Error types for geometry operations.
mod error;
/// Rows/columns size type.
mod expanse;
/// Point helpers.
mod point;
/// Rectangle operations.
mod rect;

pub use align::{HorizontalAlign, VerticalAlign};
pub use error::{Error, Result};
pub use expanse::Expanse;
pub use point::Point;
pub use rect::Rect;
