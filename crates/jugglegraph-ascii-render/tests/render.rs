use jugglegraph_ascii_render::{AsciiRenderOptions, render_ascii};
use jugglegraph_layout::{LayoutInput, LayoutResult, LayoutStyle, SugiyamaLayout, compute_layout};
use jugglegraph_state::{BuilderAction, BuilderState, GraphDocument, JugglingState, LabelFlags};

const G: JugglingState = JugglingState::from_bits(0b00111);
const A: JugglingState = JugglingState::from_bits(0b01011);
const B: JugglingState = JugglingState::from_bits(0b01101);

fn choose(throw_height: u32, destination: JugglingState) -> BuilderAction {
    BuilderAction::ChooseThrow {
        throw_height,
        destination,
    }
}

fn layout(input: &LayoutInput) -> LayoutResult {
    let style = LayoutStyle::default();
    compute_layout(1, input, &SugiyamaLayout::new(style.clone()), &style)
}

fn loop_input() -> LayoutInput {
    let state = BuilderState::new(G)
        .apply(choose(4, A))
        .apply(choose(4, B))
        .apply(choose(1, G));
    LayoutInput::new(GraphDocument::from_builder(&state, 5, 3), LabelFlags::PLAIN)
}

#[test]
fn renders_state_boxes() {
    let output = render_ascii(&layout(&loop_input()), &AsciiRenderOptions::default());
    assert!(output.contains("|00111|"), "{output}");
    assert!(output.contains("|01011|"), "{output}");
    assert!(output.contains("|01101|"), "{output}");
    assert!(output.contains('4'), "{output}");
}

#[test]
fn base_state_has_double_border() {
    let output = render_ascii(&layout(&loop_input()), &AsciiRenderOptions::default());
    assert!(output.contains("+=====+"), "{output}");
    assert_eq!(output.matches("+=====+").count(), 2, "{output}");
}

#[test]
fn current_state_is_marked() {
    let output = render_ascii(&layout(&loop_input()), &AsciiRenderOptions::default());
    assert!(!output.contains('>'), "{output}");

    let input = loop_input().with_current(A);
    let output = render_ascii(&layout(&input), &AsciiRenderOptions::default());
    assert!(output.contains(">|01011|"), "{output}");
}

#[test]
fn stays_within_requested_size() {
    let options = AsciiRenderOptions {
        max_width: 60,
        max_height: 30,
        ..AsciiRenderOptions::default()
    };
    let output = render_ascii(&layout(&loop_input()), &options);
    assert!(output.lines().count() <= 30 + 4, "{output}");
    assert!(
        output.lines().all(|line| line.chars().count() <= 60 + 4),
        "{output}"
    );
}

#[test]
fn empty_layout_renders_nothing() {
    let document = GraphDocument {
        nodes: Vec::new(),
        edges: Vec::new(),
        ground_state: G,
        num_nodes: 0,
        num_edges: 0,
        max_height: 5,
        num_props: 3,
    };
    let output = render_ascii(
        &layout(&LayoutInput::new(document, LabelFlags::PLAIN)),
        &AsciiRenderOptions::default(),
    );
    assert!(output.is_empty());
}
