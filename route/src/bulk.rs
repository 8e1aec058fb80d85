//! Bulk jobs: batched writes inside the target graph's transaction.

use waypath_graph::Graph;
use waypath_transaction::TransactionOptions;

use crate::route::Route;
use crate::RouteResult;

/// Default number of elements processed between commits.
pub const DEFAULT_BULK_JOB_SIZE: usize = 5000;

/// Run `job` for every element of `route` inside a transaction on `target`,
/// committing after every `size` elements.
///
/// The transaction allows nesting, so a bulk job can run inside a caller's
/// transaction. Returns the number of elements processed.
pub fn bulk_job<'a, T, F>(
    route: Route<'a, T>,
    target: &Graph,
    size: usize,
    mut job: F,
) -> RouteResult<usize>
where
    T: 'a,
    F: FnMut(T) -> RouteResult<()>,
{
    let size = size.max(1);
    let name = route.name().map(str::to_owned);
    target.transaction(TransactionOptions::nested(), |tx| {
        let mut count = 0;
        for element in route {
            job(element?)?;
            count += 1;
            if count % size == 0 {
                tx.commit()?;
                tracing::trace!(route = ?name, count, "bulk job chunk committed");
            }
        }
        tracing::debug!(route = ?name, count, graph = %target.id(), "bulk job finished");
        Ok(count)
    })
}
