use jugglegraph_state::{BuilderAction, BuilderState, GraphDocument, GraphEdge, JugglingState};

const G: JugglingState = JugglingState::from_bits(0b00111);
const A: JugglingState = JugglingState::from_bits(0b01011);

fn choose(throw_height: u32, destination: JugglingState) -> BuilderAction {
    BuilderAction::ChooseThrow {
        throw_height,
        destination,
    }
}

#[test]
fn repeated_transition_yields_one_edge() {
    let state = BuilderState::new(G)
        .apply(choose(4, A))
        .apply(choose(2, G))
        .apply(choose(4, A))
        .apply(choose(2, G));
    let doc = GraphDocument::from_builder(&state, 5, 3);

    assert_eq!(doc.nodes, vec![G, A]);
    assert_eq!(
        doc.edges,
        vec![
            GraphEdge {
                from: G,
                to: A,
                throw_height: 4,
            },
            GraphEdge {
                from: A,
                to: G,
                throw_height: 2,
            },
        ]
    );
    assert_eq!(doc.num_nodes, 2);
    assert_eq!(doc.num_edges, 2);
    assert_eq!(doc.ground_state, G);
    assert_eq!((doc.max_height, doc.num_props), (5, 3));
}

#[test]
fn same_endpoints_with_different_heights_stay_distinct() {
    let state = BuilderState::new(G).apply(choose(3, G)).apply(choose(5, G));
    let doc = GraphDocument::from_builder(&state, 5, 3);
    assert_eq!(doc.nodes, vec![G]);
    assert_eq!(doc.edges.len(), 2);
}

#[test]
fn fresh_builder_yields_single_ground_node() {
    let doc = GraphDocument::from_builder(&BuilderState::new(G), 5, 3);
    assert_eq!(doc.nodes, vec![G]);
    assert!(doc.edges.is_empty());
    assert!(!doc.is_empty());
}

#[test]
fn parses_compact_engine_payload() {
    let json = r#"{
        "nodes": [7, 11],
        "edges": [{"from": 7, "to": 11, "throw_height": 4}],
        "ground_state": 7,
        "num_nodes": 2,
        "num_edges": 1,
        "max_height": 5,
        "num_props": 3
    }"#;
    let doc: GraphDocument = serde_json::from_str(json).expect("parse failed");
    assert_eq!(doc.nodes, vec![G, A]);
    assert_eq!(doc.edges[0].throw_height, 4);
    assert_eq!(doc.ground_state, G);
}
