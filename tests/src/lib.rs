//! Shared fixtures for waypath integration tests.

pub mod fixture;

pub mod prelude {
    pub use crate::fixture::GraphFixture;
    pub use waypath_core::*;
    pub use waypath_graph::{CloneOptions, Graph};
    pub use waypath_route::*;
    pub use waypath_transaction::*;
}
