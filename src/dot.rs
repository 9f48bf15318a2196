//! Graphviz `.dot` export, an optional debug utility.
//!
//! Not feature-gated — it only costs `std::fmt`/`std::fs`, which the rest
//! of the crate already uses — but it is a thin collaborator, not part of
//! the engine's hard core, so it stays in its own module with no
//! knowledge of the update loop.

use std::fmt::Write as _;

use crate::atom::Interner;
use crate::graph::{StateGraph, StateId, ROOT};

/// The environment variable that, if set, names a directory
/// [`write_dot`] helpers write into. Matches the external-interface
/// note; callers are free to ignore it and just pass an explicit path.
pub const DOT_DIR_ENV_VAR: &str = "STATE_MACHINE_DOT_DIR";

/// Renders `graph` as a Graphviz `digraph`, with one `subgraph
/// "cluster_<name>"` per compound state and real-leaf-resolved edges.
pub fn render(graph: &StateGraph, interner: &Interner) -> String {
    let mut out = String::new();
    out.push_str("digraph state_machine {\n");
    out.push_str("  compound=true;\n");

    render_children(graph, ROOT, &mut out);
    render_transitions(graph, interner, &mut out);

    out.push_str("}\n");
    out
}

fn render_children(graph: &StateGraph, parent: StateId, out: &mut String) {
    let Some(node) = graph.get(parent) else { return };
    for &child in &node.children {
        let Some(child_node) = graph.get(child) else { continue };
        if child_node.is_group() {
            let _ = writeln!(out, "  subgraph \"cluster_{}\" {{", child_node.name);
            let _ = writeln!(out, "    label=\"{}\";", child_node.name);
            render_children(graph, child, out);
            out.push_str("  }\n");
        } else {
            let is_leader = node.leader == Some(child);
            if is_leader {
                let _ = writeln!(
                    out,
                    "    \"{}\" [shape=ellipse, color=green];",
                    child_node.name
                );
            } else {
                let _ = writeln!(out, "    \"{}\" [shape=ellipse];", child_node.name);
            }
        }
    }
}

fn render_transitions(graph: &StateGraph, interner: &Interner, out: &mut String) {
    for node in graph.iter() {
        for transition in &node.transitions {
            let real_src = graph.resolve_real(node.id);
            let real_tgt = graph.resolve_real(transition.target);
            if real_src == real_tgt {
                continue;
            }
            let Some(src_name) = graph.name_of(real_src) else { continue };
            let Some(tgt_name) = graph.name_of(real_tgt) else { continue };

            let mut label_parts: Vec<String> = Vec::new();
            if let Some(event) = transition.event {
                label_parts.push(interner.resolve(event).to_string());
            }
            for &atom in &transition.conditions {
                label_parts.push(interner.resolve(atom).to_string());
            }
            let label = label_parts.join(" &\\n");
            let color = if transition.event.is_some() { "red" } else { "black" };

            let mut attrs = vec![format!("label=\"{label}\""), format!("color={color}")];
            if let Some(src_node) = graph.get(node.id) {
                if src_node.is_group() {
                    attrs.push(format!("ltail=\"cluster_{}\"", src_node.name));
                }
            }
            if let Some(tgt_node) = graph.get(transition.target) {
                if tgt_node.is_group() {
                    attrs.push(format!("lhead=\"cluster_{}\"", tgt_node.name));
                }
            }
            let _ = writeln!(
                out,
                "  \"{src_name}\" -> \"{tgt_name}\" [{}];",
                attrs.join(", ")
            );
        }
    }
}

/// Writes [`render`]'s output to `path`.
pub fn write_dot(graph: &StateGraph, interner: &Interner, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
    std::fs::write(path, render(graph, interner))
}
