//! Waypath Core Types
//!
//! This crate provides the foundational types used throughout waypath:
//! - Identity types (VertexId, EdgeId, GraphId)
//! - Value types (the Value enum and property maps)
//! - Graph elements (Vertex, Edge, Element) and their type tags
//! - Paths produced by traversals
//! - Common error types

mod element;
mod error;
mod id;
mod path;
mod value;

pub use element::*;
pub use error::*;
pub use id::*;
pub use path::*;
pub use value::*;
