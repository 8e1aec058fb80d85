//! Waypath Routes
//!
//! Lazy, pull-based pipelines over graph elements and paths:
//! - Routes built by stacking pipes (map, select, sections, sort)
//! - Section-scoped sorting
//! - Path operations: transpose, subgraph, payloads, projections, trees
//! - Bulk jobs wrapped in the target graph's transactions

mod bulk;
mod error;
mod path_route;
mod pipe;
mod route;
mod section;
mod sort_section;

pub use bulk::{bulk_job, DEFAULT_BULK_JOB_SIZE};
pub use error::{RouteError, RouteResult};
pub use path_route::{LengthMatcher, SubgraphOptions};
pub use pipe::{IterPipe, MapPipe, Pipe, SelectPipe};
pub use route::{BoxPipe, Route};
pub use section::{SectionCallback, SectionEvents, SectionSource, Sections};
pub use sort_section::SortSection;
