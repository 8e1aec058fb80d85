//! Strategy selection and the finalizer pair handed to transaction bodies.

use std::fmt;
use std::sync::Arc;

use crate::context::{ContextKey, ContextRegistry, ScopeId, Token};
use crate::{TransactionError, TransactionResult, TransactionalResource};

const NESTED_ROLLBACK: &str = "Can not rollback a nested transaction";
const MOCK_ROLLBACK: &str = "Can not rollback a mock transaction";
const NESTED_MOCK_ROLLBACK: &str = "Can not rollback a mock or nested transaction";

/// How a transaction scope finalizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Outermost scope over a native resource: real commit and abort.
    Base,
    /// Nested scope over a native resource: commit is a no-op, rollback
    /// signals the enclosing scope.
    Nested,
    /// Outermost scope over a non-native or disabled resource.
    MockBase,
    /// Nested scope over a non-native or disabled resource.
    MockNested,
}

impl Strategy {
    /// Choose a strategy from the resource capability, the depth before
    /// entry, and whether the caller opted into nesting.
    pub fn select(native: bool, depth: usize, nesting: bool) -> TransactionResult<Self> {
        match (native, depth) {
            (true, 0) => Ok(Strategy::Base),
            (true, _) if nesting => Ok(Strategy::Nested),
            (true, _) => Err(TransactionError::NestedTransaction),
            (false, 0) => Ok(Strategy::MockBase),
            (false, _) => Ok(Strategy::MockNested),
        }
    }

    /// Whether this strategy touches the backing resource.
    pub fn is_real(&self) -> bool {
        matches!(self, Strategy::Base)
    }
}

/// The commit/rollback pair of one transaction scope.
///
/// Handles are cheap to clone. A handle stays bound to the scope that
/// created it: once that scope has exited, both operations fail with
/// [`TransactionError::Internal`].
#[derive(Clone)]
pub struct Transaction {
    strategy: Strategy,
    token: Token,
    scope: ScopeId,
    depth: usize,
    key: ContextKey,
    registry: Arc<ContextRegistry>,
    resource: Arc<dyn TransactionalResource>,
}

impl Transaction {
    pub(crate) fn new(
        strategy: Strategy,
        token: Token,
        scope: ScopeId,
        depth: usize,
        key: ContextKey,
        registry: Arc<ContextRegistry>,
        resource: Arc<dyn TransactionalResource>,
    ) -> Self {
        Self {
            strategy,
            token,
            scope,
            depth,
            key,
            registry,
            resource,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Correlation token of the base-level transaction this scope belongs to.
    pub fn token(&self) -> Token {
        self.token
    }

    /// Depth of this scope (1 for the outermost).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Commit the work done so far.
    ///
    /// May be called several times to split a long transaction into chunks.
    /// Only the base strategy reaches the resource.
    pub fn commit(&self) -> TransactionResult<()> {
        self.ensure_live("commit")?;
        match self.strategy {
            Strategy::Base => {
                self.resource.commit_all()?;
                tracing::debug!(token = %self.token, "transaction committed");
            }
            Strategy::MockBase => {
                tracing::debug!(token = %self.token, "mock transaction committed");
            }
            Strategy::Nested | Strategy::MockNested => {
                tracing::debug!(
                    token = %self.token,
                    depth = self.depth,
                    "nested transaction committed (noop)"
                );
            }
        }
        Ok(())
    }

    /// Roll back the work done since the last commit.
    ///
    /// Only the base strategy can actually roll back; the others return a
    /// rollback request that the body should propagate.
    pub fn rollback(&self, message: Option<&str>) -> TransactionResult<()> {
        self.finish_rollback(message, false)
    }

    /// Rollback with an explicit unwinding flag. While unwinding from a
    /// failure, non-base strategies stay silent so the original failure is
    /// the one that propagates.
    pub(crate) fn finish_rollback(
        &self,
        message: Option<&str>,
        unwinding: bool,
    ) -> TransactionResult<()> {
        self.ensure_live("rollback")?;
        let signal = match self.strategy {
            Strategy::Base => {
                tracing::debug!(token = %self.token, reason = message, "transaction rolled back");
                return self.resource.abort_all();
            }
            Strategy::Nested => {
                TransactionError::nested_rollback(message.unwrap_or(NESTED_ROLLBACK))
            }
            Strategy::MockBase => TransactionError::mock_rollback(message.unwrap_or(MOCK_ROLLBACK)),
            Strategy::MockNested => {
                TransactionError::nested_mock_rollback(message.unwrap_or(NESTED_MOCK_ROLLBACK))
            }
        };
        tracing::debug!(
            token = %self.token,
            strategy = ?self.strategy,
            reason = message,
            "transaction rolled back"
        );
        if unwinding {
            Ok(())
        } else {
            Err(signal)
        }
    }

    fn ensure_live(&self, action: &str) -> TransactionResult<()> {
        match self.registry.snapshot(self.key) {
            Some(context)
                if context.token == Some(self.token) && context.is_open(self.scope, self.depth) =>
            {
                Ok(())
            }
            _ => Err(TransactionError::internal(format!(
                "Can not {} transaction outside its original block",
                action
            ))),
        }
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("strategy", &self.strategy)
            .field("token", &self.token)
            .field("depth", &self.depth)
            .finish()
    }
}
