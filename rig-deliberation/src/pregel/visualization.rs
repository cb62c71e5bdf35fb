//! Mermaid diagram generation for workflow graphs
//!
//! # Node Shapes
//!
//! | Role         | Shape             | Mermaid Syntax |
//! |--------------|-------------------|----------------|
//! | Step         | Rectangle         | `id[label]`    |
//! | Fan-in join  | Reverse Para.     | `id[\label/]`  |
//! | Conditional  | Diamond           | `id{label}`    |
//! | START/END    | Stadium           | `id([label])`  |

use std::fmt::Write;

use super::edge::Target;
use super::state::WorkflowState;
use super::vertex::VertexId;
use crate::workflow::{BuiltWorkflowGraph, END, START};

/// How a vertex participates in routing, used to pick its shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Step,
    Join,
    Conditional,
    Terminal,
}

/// Sanitize a vertex ID for use as a Mermaid node identifier.
///
/// Mermaid node IDs must be alphanumeric (plus underscores).
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Render a node declaration like `id[label]` or `id{label}`.
pub fn render_node(id: &str, shape: NodeShape) -> String {
    let safe_id = sanitize_id(id);
    match shape {
        NodeShape::Step => format!("    {}[{}]", safe_id, id),
        NodeShape::Join => format!("    {}[\\{}/]", safe_id, id),
        NodeShape::Conditional => format!("    {}{{{}}}", safe_id, id),
        NodeShape::Terminal => format!("    {}([{}])", safe_id, id),
    }
}

/// Render an edge between two nodes.
///
/// - Unconditional edges: solid arrow `-->`
/// - Conditional edges: dotted arrow with label `-. "label" .->`
pub fn render_edge(from: &str, to: &str, condition: Option<&str>) -> String {
    let from_safe = sanitize_id(from);
    let to_safe = sanitize_id(to);

    match condition {
        Some(label) => format!("    {} -. \"{}\" .-> {}", from_safe, label, to_safe),
        None => format!("    {} --> {}", from_safe, to_safe),
    }
}

fn target_name(target: &Target) -> &str {
    match target {
        Target::Vertex(id) => id.as_str(),
        Target::End => END,
    }
}

/// Render a built graph as a Mermaid flowchart
pub fn render_graph<S, C>(graph: &BuiltWorkflowGraph<S, C>) -> String
where
    S: WorkflowState,
    C: Send + Sync + 'static,
{
    let mut lines = vec!["graph TD".to_string(), render_node(START, NodeShape::Terminal)];

    for id in graph.vertex_ids() {
        let shape = if graph.conditional(id).is_some() {
            NodeShape::Conditional
        } else if graph.join_sources(id).is_some() {
            NodeShape::Join
        } else {
            NodeShape::Step
        };
        lines.push(render_node(id.as_str(), shape));
    }
    lines.push(render_node(END, NodeShape::Terminal));
    lines.push(String::new());

    for entry in graph.entry_points() {
        lines.push(render_edge(START, entry.as_str(), None));
    }
    for id in graph.vertex_ids() {
        match graph.conditional(id) {
            Some(edge) => {
                for branch in edge.branches() {
                    lines.push(render_edge(
                        id.as_str(),
                        target_name(&branch.target),
                        Some(&branch.label),
                    ));
                }
            }
            None => {
                for target in graph.direct_targets(id) {
                    lines.push(render_edge(id.as_str(), target_name(target), None));
                }
            }
        }
    }

    let mut output = String::new();
    for line in lines {
        let _ = writeln!(output, "{}", line);
    }
    output
}

/// Render the ids of each superstep as a compact one-line trace
pub fn render_trace(trace: &[Vec<VertexId>]) -> String {
    trace
        .iter()
        .map(|step| {
            step.iter()
                .map(VertexId::as_str)
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pregel::edge::Route;
    use crate::pregel::testing::{TestVertex, TraceState};
    use crate::workflow::WorkflowGraph;

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id("persona-a"), "persona_a");
        assert_eq!(sanitize_id("node.name"), "node_name");
        assert_eq!(sanitize_id("valid_name"), "valid_name");
    }

    #[test]
    fn test_render_shapes() {
        assert_eq!(render_node("decider", NodeShape::Conditional), "    decider{decider}");
        assert_eq!(render_node("join", NodeShape::Join), "    join[\\join/]");
        assert_eq!(render_node("END", NodeShape::Terminal), "    END([END])");
    }

    #[test]
    fn test_render_edges() {
        assert_eq!(render_edge("a", "b", None), "    a --> b");
        assert_eq!(
            render_edge("a", "b", Some("again")),
            "    a -. \"again\" .-> b"
        );
    }

    #[test]
    fn test_render_graph() {
        let graph = WorkflowGraph::<TraceState, ()>::new()
            .node(TestVertex::visit("root"))
            .node(TestVertex::writes_left("left", "l"))
            .node(TestVertex::writes_right("right", "r"))
            .node(TestVertex::count("join"))
            .entry("root")
            .fan_out("root", ["left", "right"])
            .fan_in(["left", "right"], "join")
            .conditional_edge(
                "join",
                |s: &TraceState| if s.counter < 2 { Route::Continue } else { Route::Complete },
                ("again", "root"),
                ("done", END),
            )
            .build()
            .unwrap();

        let mermaid = render_graph(&graph);

        assert!(mermaid.starts_with("graph TD"));
        assert!(mermaid.contains("    START --> root"));
        assert!(mermaid.contains("    root --> left"));
        assert!(mermaid.contains("    right --> join"));
        assert!(mermaid.contains("    join{join}"));
        assert!(mermaid.contains("    join -. \"done\" .-> END"));
    }

    #[test]
    fn test_render_trace() {
        let trace = vec![
            vec![VertexId::from("a")],
            vec![VertexId::from("b"), VertexId::from("c")],
        ];
        assert_eq!(render_trace(&trace), "a -> b | c");
    }
}
