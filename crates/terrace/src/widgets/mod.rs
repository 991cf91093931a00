//! Ready-made interactive components.

/// Filterable single and multi item selection.
pub mod selector;
/// A paging cursor over an arbitrary list.
pub mod selector_list;

pub use selector::{ItemState, Operation, Selector, SelectorComponent, SelectorItem};
pub use selector_list::{Projection, SelectorList};
