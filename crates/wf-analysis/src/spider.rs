//! Schema dependency inference over a merged provenance graph
//!
//! Two schemas that reach the same table are ordered by how directly they
//! reach it: the schema with the longer path is placed before the schema
//! with the shorter one. Proposed edges are then reduced so that no direct
//! edge duplicates a longer route, and what remains must be acyclic.
//!
//! Edges of the resulting [`SchemaDag`] read "`from` must be considered
//! before `to`".

use crate::error::{AnalysisError, AnalysisResult};
use petgraph::algo::{dijkstra, has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use wf_core::SchemaName;
use wf_ir::{NodeTag, ProvenanceGraph};

/// Schemas ordered by inferred dependency
#[derive(Debug, Clone)]
pub struct SchemaDag {
    graph: DiGraph<SchemaName, ()>,
    order: Vec<SchemaName>,
}

/// Tables a schema reaches, by shortest path length
struct Reach {
    name: SchemaName,
    tables: HashMap<NodeIndex, usize>,
}

/// Infer the schema DAG for every schema record in `provenance`.
///
/// Equidistant schemas propose no edge for that table. Fails with
/// [`AnalysisError::SchemaCycle`] when pruning leaves a cycle.
pub fn infer_schema_dag(provenance: &ProvenanceGraph) -> AnalysisResult<SchemaDag> {
    let reaches = schema_reach(provenance)?;

    let mut graph = DiGraph::new();
    let nodes: Vec<NodeIndex> = reaches
        .iter()
        .map(|r| graph.add_node(r.name.clone()))
        .collect();
    for (from, to) in orient(provenance, &reaches) {
        graph.add_edge(nodes[from], nodes[to], ());
    }
    prune_redundant(&mut graph);

    match toposort(&graph, None) {
        Ok(indices) => {
            let order = indices.into_iter().map(|idx| graph[idx].clone()).collect();
            Ok(SchemaDag { graph, order })
        }
        Err(cycle) => Err(AnalysisError::SchemaCycle {
            cycle: cycle_path(&graph, cycle.node_id()),
        }),
    }
}

fn schema_reach(provenance: &ProvenanceGraph) -> AnalysisResult<Vec<Reach>> {
    let digraph = provenance.as_digraph();
    let mut reaches = Vec::new();
    for record in provenance.records_with_tag(NodeTag::Schema) {
        let Some(start) = provenance.index_of(&record.key) else {
            continue;
        };
        let tables = dijkstra(digraph, start, None, |_| 1usize)
            .into_iter()
            .filter(|(idx, _)| digraph[*idx].tag == NodeTag::Table)
            .collect();
        reaches.push(Reach {
            name: SchemaName::try_new(record.label.as_str())?,
            tables,
        });
    }
    reaches.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(reaches)
}

/// Pairwise orientation; returns (from, to) positions into `reaches`
fn orient(provenance: &ProvenanceGraph, reaches: &[Reach]) -> BTreeSet<(usize, usize)> {
    let digraph = provenance.as_digraph();
    let mut proposed = BTreeSet::new();

    for (i, a) in reaches.iter().enumerate() {
        for (j, b) in reaches.iter().enumerate().skip(i + 1) {
            for (table, &dist_a) in &a.tables {
                let Some(&dist_b) = b.tables.get(table) else {
                    continue;
                };
                let label = &digraph[*table].label;
                match dist_a.cmp(&dist_b) {
                    Ordering::Less => {
                        proposed.insert((j, i));
                    }
                    Ordering::Greater => {
                        proposed.insert((i, j));
                    }
                    Ordering::Equal => {
                        log::debug!(
                            "Schemas '{}' and '{}' are equidistant ({}) from table '{}'; no edge",
                            a.name,
                            b.name,
                            dist_a,
                            label
                        );
                    }
                }
            }
        }
    }

    proposed
}

/// Drop every edge whose endpoints stay connected without it
fn prune_redundant(graph: &mut DiGraph<SchemaName, ()>) {
    let mut pairs: Vec<(NodeIndex, NodeIndex)> = graph
        .edge_references()
        .map(|e| (e.source(), e.target()))
        .collect();
    pairs.sort();

    for (from, to) in pairs {
        let Some(edge) = graph.find_edge(from, to) else {
            continue;
        };
        graph.remove_edge(edge);
        if has_path_connecting(&*graph, from, to, None) {
            log::debug!(
                "Pruned redundant schema edge '{}' -> '{}'",
                graph[from],
                graph[to]
            );
        } else {
            graph.add_edge(from, to, ());
        }
    }
}

fn cycle_path(graph: &DiGraph<SchemaName, ()>, start: NodeIndex) -> String {
    let mut path: Vec<String> = vec![graph[start].to_string()];
    let mut current = start;
    let mut visited = HashSet::new();
    visited.insert(current);

    while let Some(edge) = graph.edges(current).next() {
        let target = edge.target();
        path.push(graph[target].to_string());
        if target == start || visited.contains(&target) {
            break;
        }
        visited.insert(target);
        current = target;
    }

    path.join(" -> ")
}

impl SchemaDag {
    /// Schemas in dependency order: every schema follows the ones it depends on
    pub fn order(&self) -> &[SchemaName] {
        &self.order
    }

    /// Edges as (before, after) pairs, sorted by name
    pub fn edges(&self) -> Vec<(&SchemaName, &SchemaName)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()]))
            .collect();
        edges.sort();
        edges
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Schemas that must be considered directly before `name`
    pub fn upstream(&self, name: &str) -> Vec<&SchemaName> {
        let Some(idx) = self.index_of(name) else {
            return Vec::new();
        };
        let mut names: Vec<&SchemaName> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| &self.graph[n])
            .collect();
        names.sort();
        names
    }

    /// Schemas that must be considered directly after `name`
    pub fn downstream(&self, name: &str) -> Vec<&SchemaName> {
        let Some(idx) = self.index_of(name) else {
            return Vec::new();
        };
        let mut names: Vec<&SchemaName> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| &self.graph[n])
            .collect();
        names.sort();
        names
    }

    fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|&idx| self.graph[idx].as_str() == name)
    }

    /// Render as Graphviz DOT
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph schemas {\n  rankdir=LR;\n  node [shape=folder];\n\n");
        for name in &self.order {
            dot.push_str(&format!("  \"{name}\";\n"));
        }
        dot.push('\n');
        for (from, to) in self.edges() {
            dot.push_str(&format!("  \"{from}\" -> \"{to}\";\n"));
        }
        dot.push_str("}\n");
        dot
    }
}

#[cfg(test)]
#[path = "spider_test.rs"]
mod tests;
