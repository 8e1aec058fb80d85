//! Transactions against graphs.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Barrier};
use std::thread;

use pretty_assertions::assert_eq;
use waypath_tests::prelude::*;

fn graph_with_config(json: &str) -> Graph {
    let config: TransactionConfig = serde_json::from_str(json).unwrap();
    Graph::with_config(true, config)
}

#[test]
fn test_config_loaded_from_json() {
    let graph = graph_with_config(
        r#"{ "disable_transactions": true, "implicit_transaction": "rollback" }"#,
    );

    assert_eq!(
        graph.transactions().config(),
        TransactionConfig {
            disable_transactions: true,
            implicit_transaction: ImplicitTransaction::Rollback,
        }
    );

    // Disabled transactions are mocked even on a native graph.
    let strategy = graph
        .transaction(TransactionOptions::default(), |tx| {
            Ok::<_, TransactionError>(tx.strategy())
        })
        .unwrap();
    assert_eq!(strategy, Strategy::MockBase);
}

#[test]
fn test_implicit_transaction_policies() {
    // GIVEN an uncommitted implicit write before each explicit transaction
    let cases = [
        (r#"{ "implicit_transaction": "commit" }"#, 1),
        (r#"{ "implicit_transaction": "rollback" }"#, 0),
        (r#"{ "implicit_transaction": "ignore" }"#, 0),
    ];

    for (json, survivors) in cases {
        let graph = graph_with_config(json);
        graph.add_vertex(props! { "name" => "implicit" });

        // WHEN an explicit transaction starts and then fails
        let _ = graph.transaction(TransactionOptions::default(), |_| {
            Err::<(), _>(TransactionError::internal("fail"))
        });

        // THEN commit kept the write, rollback dropped it before the
        // transaction, and ignore folded it into the failed transaction
        assert_eq!(graph.vertex_count(), survivors, "policy {}", json);
    }
}

#[test]
fn test_nested_rollback_reaches_outer_transaction() {
    // GIVEN a committed vertex
    let fixture = GraphFixture::new().vertex("kept").committed();
    let graph = fixture.graph();

    // WHEN a nested scope writes and asks for rollback
    let result = graph.transaction(TransactionOptions::default(), |_| {
        graph.add_vertex(props! { "name" => "outer" });
        graph.transaction(TransactionOptions::nested(), |inner| {
            graph.add_vertex(props! { "name" => "inner" });
            inner.rollback(Some("undo inner"))
        })
    });

    // THEN the outer scope rolled everything back
    assert_eq!(
        result,
        Err(TransactionError::nested_rollback("undo inner"))
    );
    assert_eq!(graph.vertex_count(), 1);
    assert_eq!(graph.transactions().depth(), 0);
}

#[test]
fn test_nested_without_opt_in_never_runs_body() {
    let graph = Graph::new();
    let mut ran = false;

    let result = graph.transaction(TransactionOptions::default(), |_| {
        graph.transaction(TransactionOptions::default(), |_| {
            ran = true;
            Ok::<_, TransactionError>(())
        })
    });

    assert_eq!(result, Err(TransactionError::NestedTransaction));
    assert!(!ran);
    assert!(!graph.transactions().in_transaction());
}

#[test]
fn test_stale_handle_cannot_finalize_next_transaction() {
    // GIVEN a handle captured from a finished transaction
    let graph = Graph::new();
    let stale = graph
        .transaction(TransactionOptions::default(), |tx| {
            Ok::<_, TransactionError>(tx.clone())
        })
        .unwrap();

    // WHEN used inside the next transaction
    let outcome = graph.transaction(TransactionOptions::default(), |fresh| {
        assert_ne!(fresh.token(), stale.token());
        Ok::<_, TransactionError>(stale.commit())
    });

    // THEN it is rejected as internal misuse
    assert!(matches!(
        outcome,
        Ok(Err(TransactionError::Internal { .. }))
    ));
}

#[test]
fn test_depth_restored_after_panic() {
    let graph = Graph::new();
    let caught = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = graph.transaction(TransactionOptions::default(), |_| -> TransactionResult<()> {
            panic!("body panicked")
        });
    }));

    assert!(caught.is_err());
    assert_eq!(graph.transactions().depth(), 0);
    assert!(graph.transactions().registry().is_empty());
}

#[test]
fn test_panicking_body_leaves_no_writes_behind() {
    // GIVEN a body that writes and then panics
    let graph = Graph::new();
    let caught = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = graph.transaction(TransactionOptions::default(), |_| -> TransactionResult<()> {
            graph.add_vertex(props! { "name" => "half written" });
            panic!("body panicked")
        });
    }));
    assert!(caught.is_err());
    assert!(!graph.has_pending_changes());

    // WHEN an unrelated transaction commits the implicit transaction
    graph
        .transaction(TransactionOptions::default(), |_| Ok::<_, TransactionError>(()))
        .unwrap();

    // THEN the half-written vertex never became visible
    assert_eq!(graph.vertex_count(), 0);
}

#[test]
fn test_stale_nested_handle_rejected_in_sibling_scope() {
    // GIVEN a handle captured from a nested scope that has exited
    let graph = Graph::new();
    let outcome = graph.transaction(TransactionOptions::default(), |_| {
        let stale = graph.transaction(TransactionOptions::nested(), |tx| {
            Ok::<_, TransactionError>(tx.clone())
        })?;

        // WHEN a sibling nested scope uses it
        graph.transaction(TransactionOptions::nested(), |_| {
            Ok::<_, TransactionError>(stale.rollback(None))
        })
    });

    // THEN it is rejected as internal misuse
    assert!(matches!(
        outcome,
        Ok(Err(TransactionError::Internal { .. }))
    ));
}

#[test]
fn test_threads_track_depth_independently() {
    // GIVEN one thread parked inside a transaction
    let graph = Graph::new();
    let inside = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));

    let worker = {
        let graph = graph.clone();
        let inside = Arc::clone(&inside);
        let release = Arc::clone(&release);
        thread::spawn(move || {
            graph.transaction(TransactionOptions::default(), |tx| {
                inside.wait();
                release.wait();
                Ok::<_, TransactionError>(tx.depth())
            })
        })
    };

    inside.wait();

    // WHEN this thread opens its own base transaction
    let here = graph
        .transaction(TransactionOptions::default(), |tx| {
            Ok::<_, TransactionError>((tx.depth(), tx.strategy()))
        })
        .unwrap();
    release.wait();

    // THEN both ran at depth one as base transactions
    assert_eq!(here, (1, Strategy::Base));
    assert_eq!(worker.join().unwrap(), Ok(1));
    assert_eq!(graph.transactions().registry().len(), 0);
}
