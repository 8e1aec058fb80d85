//! Waypath Graph Storage
//!
//! This crate provides an in-memory graph store:
//! - Vertex and edge storage
//! - Adjacency index: Find edges from/to a vertex
//! - Label index: Find edges by label
//! - Undo log backing the store's implicit transaction
//! - Clone index: Copy elements between graphs idempotently

mod buffer;
mod graph;
mod index;
mod store;

pub use buffer::{Change, UndoLog};
pub use graph::{CloneOptions, Graph};
pub use store::Store;
