//! Storage traits.

mod grid;

pub use grid::GridBackend;
