use std::fmt::Write as _;

use jugglegraph_engine::{TableResponse, ThrowsResponse};
use jugglegraph_state::{GraphDocument, LabelFlags};

/// Transition table as text: one row per origin state, one column per
/// destination, `.` where no throw connects them.
pub fn format_table(table: &TableResponse, flags: LabelFlags) -> String {
    let labels: Vec<String> = table
        .states
        .iter()
        .map(|&state| flags.label(state, table.max_height))
        .collect();
    let width = labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0)
        .max(2);

    let mut out = String::new();
    let _ = write!(out, "{:width$}", "");
    for label in &labels {
        let _ = write!(out, " {label:>width$}");
    }
    out.push('\n');

    for (label, row) in labels.iter().zip(&table.cells) {
        let _ = write!(out, "{label:>width$}");
        for cell in row {
            match cell {
                Some(height) => {
                    let _ = write!(out, " {height:>width$}");
                }
                None => {
                    let _ = write!(out, " {:>width$}", ".");
                }
            }
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "{} states, {} props, max height {}",
        table.num_states, table.num_props, table.max_height
    );
    out
}

pub fn format_throws(throws: &ThrowsResponse, flags: LabelFlags) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} (max height {}): {} throws",
        flags.label(throws.state, throws.max_height),
        throws.max_height,
        throws.num_throws
    );
    for option in &throws.throws {
        let _ = writeln!(
            out,
            "  {:>2} -> {}",
            option.height,
            flags.label(option.destination, throws.max_height)
        );
    }
    out
}

/// State and transition counts of a graph, printed under its drawing.
pub fn format_graph_summary(document: &GraphDocument) -> String {
    format!(
        "States: {}  Transitions: {}",
        document.num_nodes, document.num_edges
    )
}
