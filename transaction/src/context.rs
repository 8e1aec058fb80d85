//! Per-(thread, resource) transaction state.
//!
//! Entries live in an explicit registry keyed by the calling thread and the
//! identity of the backing resource. An entry is created on the first
//! `enter` and evicted as soon as its depth returns to zero, so the registry
//! only holds state for threads that are inside a transaction.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::Strategy;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);
static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

/// Correlation token minted for every base-level transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(u64);

impl Token {
    pub(crate) fn mint() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx{}", self.0)
    }
}

/// Identity of one `transaction` scope, distinct even between sibling
/// scopes at the same depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
    pub(crate) fn mint() -> Self {
        Self(NEXT_SCOPE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Registry key: calling thread plus backing resource identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextKey {
    thread: ThreadId,
    resource: usize,
}

impl ContextKey {
    /// Key for the current thread and the given resource address.
    pub fn current(resource: usize) -> Self {
        Self {
            thread: thread::current().id(),
            resource,
        }
    }
}

/// Transaction state of one (thread, resource) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionContext {
    /// Number of open `transaction` scopes.
    pub depth: usize,
    /// Token of the active base-level transaction.
    pub token: Option<Token>,
    /// Strategies bound by the open scopes, innermost last.
    pub strategies: Vec<Strategy>,
    /// Ids of the open scopes, parallel to `strategies`.
    pub scopes: Vec<ScopeId>,
}

impl TransactionContext {
    /// The strategy of the innermost open scope.
    pub fn strategy(&self) -> Option<Strategy> {
        self.strategies.last().copied()
    }

    /// Whether `scope` is still open at `depth`.
    pub fn is_open(&self, scope: ScopeId, depth: usize) -> bool {
        depth > 0 && self.scopes.get(depth - 1) == Some(&scope)
    }
}

/// Shared map of transaction contexts.
#[derive(Debug, Default)]
pub struct ContextRegistry {
    contexts: Mutex<HashMap<ContextKey, TransactionContext>>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the depth for `key`, returning the depth before entry.
    pub fn enter(&self, key: ContextKey) -> usize {
        let mut contexts = self.contexts.lock();
        let context = contexts.entry(key).or_default();
        let previous = context.depth;
        context.depth += 1;
        previous
    }

    /// Decrement the depth for `key`, evicting the entry at zero.
    pub fn exit(&self, key: ContextKey) {
        let mut contexts = self.contexts.lock();
        let Some(context) = contexts.get_mut(&key) else {
            return;
        };
        context.depth = context.depth.saturating_sub(1);
        if context.depth == 0 {
            contexts.remove(&key);
        } else {
            let depth = context.depth;
            context.strategies.truncate(depth);
            context.scopes.truncate(depth);
        }
    }

    /// Record the token, strategy and id of a scope that was just entered.
    pub fn bind(&self, key: ContextKey, token: Token, strategy: Strategy, scope: ScopeId) {
        let mut contexts = self.contexts.lock();
        let context = contexts.entry(key).or_default();
        context.token = Some(token);
        context.strategies.push(strategy);
        context.scopes.push(scope);
    }

    /// Current depth for `key` (zero when absent).
    pub fn depth(&self, key: ContextKey) -> usize {
        self.contexts.lock().get(&key).map_or(0, |c| c.depth)
    }

    /// Token of the active base-level transaction for `key`.
    pub fn token(&self, key: ContextKey) -> Option<Token> {
        self.contexts.lock().get(&key).and_then(|c| c.token)
    }

    /// A copy of the context for `key`, if one exists.
    pub fn snapshot(&self, key: ContextKey) -> Option<TransactionContext> {
        self.contexts.lock().get(&key).cloned()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.contexts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decrements the depth for its key when dropped.
///
/// Created immediately after `enter`, so every exit path (normal return,
/// error, or panic unwinding through the body) performs exactly one
/// decrement.
pub(crate) struct DepthGuard {
    registry: Arc<ContextRegistry>,
    key: ContextKey,
}

impl DepthGuard {
    pub(crate) fn enter(registry: Arc<ContextRegistry>, key: ContextKey) -> (Self, usize) {
        let previous = registry.enter(key);
        (Self { registry, key }, previous)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        self.registry.exit(self.key);
    }
}
