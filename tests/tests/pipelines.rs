//! Route pipelines over graph data.

use pretty_assertions::assert_eq;
use waypath_tests::prelude::*;

fn name_of(graph: &Graph, id: VertexId) -> String {
    graph
        .vertex(id)
        .and_then(|v| v.property("name").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_default()
}

/// hub -> {zed, amy, kim}, spoke -> {bob, al}
fn fan_out() -> GraphFixture {
    GraphFixture::new()
        .vertex("hub")
        .vertex("spoke")
        .vertex("zed")
        .vertex("amy")
        .vertex("kim")
        .vertex("bob")
        .vertex("al")
        .edge("h1", "links", "hub", "zed")
        .edge("h2", "links", "hub", "amy")
        .edge("h3", "links", "hub", "kim")
        .edge("s1", "links", "spoke", "bob")
        .edge("s2", "links", "spoke", "al")
        .committed()
}

#[test]
fn test_neighbours_sorted_per_section() {
    // GIVEN the out-neighbours of each source vertex as one section each
    let fixture = fan_out();
    let graph = fixture.graph().clone();
    let sources = vec![fixture.vertex_id("hub"), fixture.vertex_id("spoke")];
    let lookup = graph.clone();
    let (neighbours, events) = Route::from_iter(sources, ElementType::Vertex)
        .with_graph(graph.clone())
        .sections(ElementType::Vertex, move |id: &VertexId| {
            Ok(lookup
                .edges_out(*id)
                .into_iter()
                .map(|e| name_of(&lookup, e.in_vertex))
                .collect())
        });

    // WHEN each section is sorted by name
    let sorted = neighbours.sort_section(&events).collect_all().unwrap();

    // THEN hub's neighbours come first, each section in name order
    assert_eq!(sorted, vec!["amy", "kim", "zed", "al", "bob"]);
}

#[test]
fn test_section_key_uses_marker() {
    // GIVEN the out-neighbours of hub as a single section
    let fixture = fan_out();
    let graph = fixture.graph().clone();
    let sources = vec![fixture.vertex_id("hub")];
    let lookup = graph.clone();
    let (neighbours, events) = Route::from_iter(sources, ElementType::Vertex).sections(
        ElementType::Vertex,
        move |id: &VertexId| {
            Ok(lookup
                .edges_out(*id)
                .into_iter()
                .map(|e| e.in_vertex)
                .collect())
        },
    );

    // WHEN sorted by descending name through the key selector
    let sorted = neighbours
        .sort_section_by(&events, |id: &VertexId, marker: Option<&VertexId>, index| {
            assert_eq!(index, 0);
            assert!(marker.is_some());
            std::cmp::Reverse(name_of(&graph, *id))
        })
        .map(ElementType::Scalar, |id| Ok(name_of(fixture.graph(), id)))
        .collect_all()
        .unwrap();

    // THEN
    assert_eq!(sorted, vec!["zed", "kim", "amy"]);
}

#[test]
fn test_path_projections_over_graph_paths() {
    let fixture = fan_out();
    let path = fixture.path(&["hub", "h1", "zed"]);
    let paths = || Route::paths(fixture.graph(), vec![path.clone()]);

    let head = paths().heads(ElementType::Vertex).collect_all().unwrap();
    let tail = paths().tails(ElementType::Vertex).collect_all().unwrap();
    let pair = paths().pairs(0, -1).collect_all().unwrap();

    assert_eq!(head, vec![Some(fixture.element("hub"))]);
    assert_eq!(tail, vec![Some(fixture.element("zed"))]);
    assert_eq!(
        pair,
        vec![Path::from(vec![fixture.element("hub"), fixture.element("zed")])]
    );
    assert_eq!(paths().len(3usize).collect_all().unwrap().len(), 1);
    assert_eq!(paths().len(..3usize).collect_all().unwrap().len(), 0);
}

#[test]
fn test_hashify_graph_path() {
    // GIVEN hub -links-> zed
    let fixture = fan_out();
    let path = fixture.path(&["hub", "h1", "zed"]);

    // WHEN folded into a tree
    let trees = Route::paths(fixture.graph(), vec![path])
        .hashify()
        .collect_all()
        .unwrap();

    // THEN zed sits under the edge label AND hub merges at the top
    assert_eq!(
        trees,
        vec![Value::Map(props! {
            "links" => vec![Value::Map(props! { "name" => "zed" })],
            "name" => "hub"
        })]
    );
}

#[test]
fn test_transpose_columns_of_paths() {
    let fixture = fan_out();
    let paths = vec![
        fixture.path(&["hub", "h1", "zed"]),
        fixture.path(&["spoke", "s1", "bob"]),
    ];

    let columns = Route::paths(fixture.graph(), paths).transpose().unwrap();

    assert_eq!(columns.len(), 3);
    assert_eq!(
        columns[0],
        Path::from(vec![fixture.element("hub"), fixture.element("spoke")])
    );
    assert_eq!(
        columns[2],
        Path::from(vec![fixture.element("zed"), fixture.element("bob")])
    );
}

#[test]
fn test_payloads_then_compact() {
    // GIVEN a path whose head carries a payload
    let fixture = fan_out();
    let hub = fixture
        .graph()
        .vertex(fixture.vertex_id("hub"))
        .unwrap()
        .with_payload(7i64);
    let path = Path::from(vec![Element::from(hub), fixture.element("h1"), fixture.element("zed")]);

    // WHEN payloads are extracted and compacted
    let compacted = Route::paths(fixture.graph(), vec![path])
        .payloads()
        .compact_paths()
        .collect_all()
        .unwrap();

    // THEN only the payload remains
    assert_eq!(compacted, vec![Path::from(vec![Element::Scalar(Value::Int(7))])]);
}
