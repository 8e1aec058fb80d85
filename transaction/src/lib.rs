//! Waypath Transaction
//!
//! Scoped, nestable transactions over a backing resource that may or may
//! not support commit/abort natively.
//!
//! Responsibilities:
//! - Track transaction depth per (thread, resource)
//! - Select a finalizer strategy (real, nested, mock, nested mock)
//! - Resolve the resource's implicit transaction before real transactions
//! - Guarantee rollback-then-propagate on body failure and exactly one
//!   depth decrement per `transaction` call

mod config;
mod context;
mod error;
mod finalizer;
mod manager;
mod resource;

pub use config::{ImplicitTransaction, TransactionConfig, TransactionOptions};
pub use context::{ContextKey, ContextRegistry, ScopeId, Token, TransactionContext};
pub use error::{TransactionError, TransactionResult};
pub use finalizer::{Strategy, Transaction};
pub use manager::TransactionManager;
pub use resource::TransactionalResource;
