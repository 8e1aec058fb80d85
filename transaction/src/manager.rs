//! Transaction manager for scoped, nestable transactions.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::context::{ContextKey, ContextRegistry, DepthGuard, ScopeId, Token};
use crate::{
    ImplicitTransaction, Strategy, Transaction, TransactionConfig, TransactionError,
    TransactionOptions, TransactionResult, TransactionalResource,
};

/// Runs transaction bodies against one backing resource.
///
/// Depth is tracked per calling thread, so one manager can be shared by
/// many threads. Concurrent base-level transactions from different threads
/// are not serialized here; they rely on the resource's own concurrency
/// control.
pub struct TransactionManager {
    resource: Arc<dyn TransactionalResource>,
    registry: Arc<ContextRegistry>,
    config: RwLock<TransactionConfig>,
}

impl TransactionManager {
    /// Create a manager with default configuration and its own registry.
    pub fn new(resource: Arc<dyn TransactionalResource>) -> Self {
        Self::with_config(resource, TransactionConfig::default())
    }

    /// Create a manager with the given configuration.
    pub fn with_config(resource: Arc<dyn TransactionalResource>, config: TransactionConfig) -> Self {
        Self::with_registry(resource, config, Arc::new(ContextRegistry::new()))
    }

    /// Create a manager that shares a context registry with other managers.
    ///
    /// Managers over the same resource must share a registry to see each
    /// other's depth.
    pub fn with_registry(
        resource: Arc<dyn TransactionalResource>,
        config: TransactionConfig,
        registry: Arc<ContextRegistry>,
    ) -> Self {
        Self {
            resource,
            registry,
            config: RwLock::new(config),
        }
    }

    pub fn registry(&self) -> &Arc<ContextRegistry> {
        &self.registry
    }

    pub fn config(&self) -> TransactionConfig {
        self.config.read().clone()
    }

    pub fn disable_transactions(&self) -> bool {
        self.config.read().disable_transactions
    }

    pub fn set_disable_transactions(&self, disabled: bool) {
        self.config.write().disable_transactions = disabled;
    }

    pub fn implicit_transaction(&self) -> ImplicitTransaction {
        self.config.read().implicit_transaction
    }

    pub fn set_implicit_transaction(&self, policy: ImplicitTransaction) {
        self.config.write().implicit_transaction = policy;
    }

    /// Whether the current thread is inside a transaction on this resource.
    pub fn in_transaction(&self) -> bool {
        self.depth() > 0
    }

    /// Transaction depth of the current thread on this resource.
    pub fn depth(&self) -> usize {
        self.registry.depth(self.key())
    }

    /// Run `body` inside a transaction scope.
    ///
    /// The body receives the scope's [`Transaction`]. If it returns `Ok`,
    /// the scope is committed. If it returns `Err`, the scope is rolled
    /// back with the error's message and the same error is returned. A
    /// panicking body is rolled back before the panic resumes. The depth
    /// taken on entry is released on every exit path.
    ///
    /// ```ignore
    /// manager.transaction(TransactionOptions::default(), |tx| {
    ///     write_chunk()?;
    ///     tx.commit()?;          // commits may split work into chunks
    ///     write_more()?;
    ///     Ok(())                 // committed automatically
    /// })?;
    /// ```
    pub fn transaction<T, E, F>(&self, options: TransactionOptions, body: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction) -> Result<T, E>,
        E: From<TransactionError> + fmt::Display,
    {
        let key = self.key();
        let (_guard, previous) = DepthGuard::enter(Arc::clone(&self.registry), key);
        let tx = self.start(key, previous, options)?;

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| body(&tx))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                Self::unwind(&tx, "panicked");
                panic::resume_unwind(payload);
            }
        };

        match outcome {
            Ok(value) => {
                if let Err(err) = tx.commit() {
                    Self::unwind(&tx, &err.to_string());
                    return Err(err.into());
                }
                Ok(value)
            }
            Err(err) => {
                Self::unwind(&tx, &err.to_string());
                Err(err)
            }
        }
    }

    /// Resolve the resource's implicit transaction per the configured policy.
    pub fn close_implicit_transaction(&self) -> TransactionResult<()> {
        match self.implicit_transaction() {
            ImplicitTransaction::Commit => self.commit_implicit_transaction(),
            ImplicitTransaction::Rollback => self.rollback_implicit_transaction(),
            ImplicitTransaction::Ignore => Ok(()),
        }
    }

    pub fn commit_implicit_transaction(&self) -> TransactionResult<()> {
        self.resource.commit_all()
    }

    pub fn rollback_implicit_transaction(&self) -> TransactionResult<()> {
        self.resource.abort_all()
    }

    fn start(
        &self,
        key: ContextKey,
        previous: usize,
        options: TransactionOptions,
    ) -> TransactionResult<Transaction> {
        let native = !self.disable_transactions() && self.resource.supports_transactions();
        let strategy = Strategy::select(native, previous, options.nesting)?;

        let token = self
            .registry
            .token(key)
            .filter(|_| previous > 0)
            .unwrap_or_else(Token::mint);

        if strategy.is_real() {
            self.close_implicit_transaction()?;
        }

        let scope = ScopeId::mint();
        self.registry.bind(key, token, strategy, scope);
        tracing::trace!(token = %token, depth = previous + 1, ?strategy, "transaction started");

        Ok(Transaction::new(
            strategy,
            token,
            scope,
            previous + 1,
            key,
            Arc::clone(&self.registry),
            Arc::clone(&self.resource),
        ))
    }

    fn unwind(tx: &Transaction, message: &str) {
        if let Err(err) = tx.finish_rollback(Some(message), true) {
            tracing::warn!(token = %tx.token(), error = %err, "rollback failed while unwinding");
        }
    }

    fn key(&self) -> ContextKey {
        ContextKey::current(Arc::as_ptr(&self.resource) as *const () as usize)
    }
}

impl fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionManager")
            .field("native", &self.resource.supports_transactions())
            .field("config", &*self.config.read())
            .finish()
    }
}
