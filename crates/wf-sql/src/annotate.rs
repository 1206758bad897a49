//! Rendered SQL on provenance records
//!
//! Nodes do not carry their SQL text. [`annotate`] renders every node of a
//! built tree once and writes the text into the matching graph record under
//! the `sql` attribute; table records also get `reads`, the relations their
//! statement reads from outside its own `WITH` clause.

use crate::error::SqlResult;
use crate::renderer::Renderer;
use crate::validator;
use std::collections::HashSet;
use wf_ir::{Node, NodeKey, ProvenanceGraph};

/// Annotate every record reachable from `root`; returns how many were written
pub fn annotate<'a>(
    renderer: &Renderer,
    root: impl Into<Node<'a>>,
    graph: &mut ProvenanceGraph,
) -> SqlResult<usize> {
    let mut visited: HashSet<NodeKey> = HashSet::new();
    let mut stack = vec![root.into()];
    let mut written = 0;

    while let Some(node) = stack.pop() {
        let key = node.key();
        if !visited.insert(key.clone()) {
            continue;
        }
        stack.extend(node.children().into_iter().rev());

        if let Node::Schema(_) = node {
            continue;
        }
        let sql = renderer.render(node)?;
        if let Node::Table(_) = node {
            let statement = validator::validate(renderer.dialect(), &sql)?;
            let declared: HashSet<String> =
                validator::declared_ctes(&statement).into_iter().collect();
            let reads: Vec<String> = validator::referenced_relations(&statement)
                .into_iter()
                .filter(|r| !declared.contains(r))
                .collect();
            graph.set_attribute(&key, "reads", reads.join(","));
        }
        if graph.set_attribute(&key, "sql", sql) {
            written += 1;
        }
    }

    log::debug!("Annotated {} provenance records with SQL", written);
    Ok(written)
}

#[cfg(test)]
#[path = "annotate_test.rs"]
mod tests;
