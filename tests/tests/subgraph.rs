//! Subgraph replication across graphs.

use pretty_assertions::assert_eq;
use waypath_tests::prelude::*;

/// alice -knows-> bob -knows-> carol, alice -likes-> carol
fn social() -> GraphFixture {
    GraphFixture::new()
        .vertex("alice")
        .vertex("bob")
        .vertex("carol")
        .edge("ab", "knows", "alice", "bob")
        .edge("bc", "knows", "bob", "carol")
        .edge("ac", "likes", "alice", "carol")
        .committed()
}

fn names(graph: &Graph) -> Vec<String> {
    let mut names: Vec<String> = graph
        .vertices()
        .iter()
        .filter_map(|v| v.property("name").and_then(Value::as_str).map(str::to_owned))
        .collect();
    names.sort();
    names
}

fn edge_summary(graph: &Graph) -> Vec<String> {
    let mut edges: Vec<String> = graph
        .edges()
        .iter()
        .map(|e| {
            let name = |id| {
                graph
                    .vertex(id)
                    .and_then(|v| v.property("name").cloned())
                    .map(|n| n.to_string())
                    .unwrap_or_default()
            };
            format!("{} -{}-> {}", name(e.out_vertex), e.label, name(e.in_vertex))
        })
        .collect();
    edges.sort();
    edges
}

#[test]
fn test_subgraph_of_overlapping_paths() {
    // GIVEN two paths sharing bob
    let fixture = social();
    let paths = vec![
        fixture.path(&["alice", "ab", "bob"]),
        fixture.path(&["bob", "bc", "carol"]),
    ];

    // WHEN replicated
    let target = Route::paths(fixture.graph(), paths)
        .subgraph(None, SubgraphOptions::default())
        .unwrap();

    // THEN each vertex and edge appears once
    assert_eq!(names(&target), vec!["alice", "bob", "carol"]);
    assert_eq!(
        edge_summary(&target),
        vec!["\"alice\" -knows-> \"bob\"", "\"bob\" -knows-> \"carol\""]
    );
    assert_eq!(fixture.graph().edge_count(), 3);
}

#[test]
fn test_subgraph_into_existing_target_is_idempotent() {
    // GIVEN a target that already received a path
    let fixture = social();
    let target = Graph::new();
    let path = fixture.path(&["alice", "ac", "carol"]);
    Route::paths(fixture.graph(), vec![path.clone()])
        .subgraph(Some(target.clone()), SubgraphOptions::default())
        .unwrap();

    // WHEN the same path is replicated again
    let again = Route::paths(fixture.graph(), vec![path])
        .subgraph(Some(target.clone()), SubgraphOptions::default())
        .unwrap();

    // THEN nothing is duplicated
    assert_eq!(again, target);
    assert_eq!((target.vertex_count(), target.edge_count()), (2, 1));
}

#[test]
fn test_out_of_order_edges_are_created_on_retry() {
    // GIVEN edges routed before any path mentions their in vertex
    let fixture = social();
    let paths = vec![
        fixture.path(&["alice", "ab"]),
        fixture.path(&["bob", "bc"]),
    ];

    // WHEN replicated with endpoint creation
    let options = SubgraphOptions {
        create_vertices: true,
        bulk_job_size: 1,
        ..SubgraphOptions::default()
    };
    let target = Route::paths(fixture.graph(), paths)
        .subgraph(None, options)
        .unwrap();

    // THEN the retry pass pulled carol in from the source
    assert_eq!(names(&target), vec!["alice", "bob", "carol"]);
    assert_eq!(target.edge_count(), 2);
    assert_eq!(
        target.cloned_vertex(fixture.graph(), fixture.vertex_id("carol")).is_some(),
        true
    );
}

#[test]
fn test_failed_subgraph_inside_transaction_rolls_back_target() {
    // GIVEN a target with committed content
    let fixture = social();
    let target = GraphFixture::new().vertex("dave").committed();

    // WHEN a replication fails on its retry pass inside a caller transaction
    let partial = fixture.path(&["alice", "ab"]);
    let result: RouteResult<Graph> =
        target
            .graph()
            .transaction(TransactionOptions::default(), |_| {
                Route::paths(fixture.graph(), vec![partial])
                    .subgraph(Some(target.graph().clone()), SubgraphOptions::default())
            });

    // THEN the error surfaces AND the target holds only its committed content
    assert!(matches!(
        result,
        Err(RouteError::Graph(GraphError::MissingEndpoints { .. }))
    ));
    assert_eq!(names(target.graph()), vec!["dave"]);
    assert_eq!(target.graph().transactions().depth(), 0);
}

#[test]
fn test_subgraph_into_non_transactional_target() {
    let fixture = social();
    let target = Graph::non_transactional();

    let copied = Route::paths(fixture.graph(), vec![fixture.path(&["alice", "ab", "bob"])])
        .subgraph(Some(target), SubgraphOptions::default())
        .unwrap();

    assert_eq!(names(&copied), vec!["alice", "bob"]);
    assert!(!copied.has_pending_changes());
}
