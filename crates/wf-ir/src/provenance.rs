//! Provenance graph: content-addressed lineage of every IR node.
//!
//! Each node carries a [`Lineage`]: its own stable key plus the graph formed
//! by merging the graphs of everything it was built from and adding one edge
//! per direct dependency. Records are identified by [`NodeKey`], a SHA-256
//! over the node's kind, attributes and children's keys, so structurally
//! identical nodes built independently collapse into one record when graphs
//! are merged.
//!
//! Edges point from dependency to dependent (argument → function,
//! column → table, source table → table). The one exception is schema
//! membership, which points from the schema to each table it contains.

use crate::error::{IrError, IrResult};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use wf_core::StableHasher;

/// Content-derived identity of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn from_hasher(hasher: StableHasher) -> Self {
        Self(hasher.finish())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for labels and logs
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of IR node a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeTag {
    Operator,
    Value,
    Expression,
    Function,
    Column,
    CaseWhen,
    Condition,
    Table,
    Join,
    CompoundJoin,
    Records,
    Schema,
}

impl std::fmt::Display for NodeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeTag::Operator => "operator",
            NodeTag::Value => "value",
            NodeTag::Expression => "expression",
            NodeTag::Function => "function",
            NodeTag::Column => "column",
            NodeTag::CaseWhen => "case_when",
            NodeTag::Condition => "condition",
            NodeTag::Table => "table",
            NodeTag::Join => "join",
            NodeTag::CompoundJoin => "compound_join",
            NodeTag::Records => "records",
            NodeTag::Schema => "schema",
        };
        write!(f, "{s}")
    }
}

/// Structural role of a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Operator,
    LeftOperand,
    RightOperand,
    Argument,
    PartitionBy,
    OrderBy,
    Framing,
    Source,
    Column,
    Cte,
    Where,
    Having,
    Check,
    When,
    Then,
    Else,
    Element,
    JoinExpression,
    JoinCondition,
    Join,
    Member,
    Records,
    /// Schema → table membership
    Contains,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EdgeKind::Operator => "operator",
            EdgeKind::LeftOperand => "left",
            EdgeKind::RightOperand => "right",
            EdgeKind::Argument => "argument",
            EdgeKind::PartitionBy => "partition_by",
            EdgeKind::OrderBy => "order_by",
            EdgeKind::Framing => "framing",
            EdgeKind::Source => "source",
            EdgeKind::Column => "column",
            EdgeKind::Cte => "cte",
            EdgeKind::Where => "where",
            EdgeKind::Having => "having",
            EdgeKind::Check => "check",
            EdgeKind::When => "when",
            EdgeKind::Then => "then",
            EdgeKind::Else => "else",
            EdgeKind::Element => "element",
            EdgeKind::JoinExpression => "join_expression",
            EdgeKind::JoinCondition => "join_condition",
            EdgeKind::Join => "join",
            EdgeKind::Member => "member",
            EdgeKind::Records => "records",
            EdgeKind::Contains => "contains",
        };
        write!(f, "{s}")
    }
}

/// Edge weight: role plus position within the role's declared list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ProvenanceEdge {
    pub kind: EdgeKind,
    pub position: usize,
}

/// Everything the graph knows about one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub key: NodeKey,
    pub tag: NodeTag,
    /// Variant within the tag (`core`, `select`, `sum`, `integer`, ...)
    pub variant: String,
    /// Human-readable label (column name, table name, operator symbol)
    pub label: String,
    /// Optional cluster name for nodes generated by the same macro
    pub macro_group: Option<String>,
    /// Free-form attributes (data type, unit, rendered SQL)
    pub attributes: BTreeMap<String, String>,
}

impl NodeRecord {
    pub fn new(
        key: NodeKey,
        tag: NodeTag,
        variant: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            key,
            tag,
            variant: variant.into(),
            label: label.into(),
            macro_group: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl std::fmt::Display) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_macro_group(mut self, group: Option<&str>) -> Self {
        self.macro_group = group.map(str::to_string);
        self
    }
}

/// Directed provenance graph keyed by [`NodeKey`]
#[derive(Debug, Clone, Default)]
pub struct ProvenanceGraph {
    graph: DiGraph<NodeRecord, ProvenanceEdge>,
    node_map: HashMap<NodeKey, NodeIndex>,
}

#[derive(Serialize)]
struct GraphExport<'a> {
    nodes: Vec<&'a NodeRecord>,
    edges: Vec<EdgeExport<'a>>,
}

#[derive(Serialize)]
struct EdgeExport<'a> {
    from: &'a NodeKey,
    to: &'a NodeKey,
    kind: EdgeKind,
    position: usize,
}

impl ProvenanceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record unless one with the same key exists; the first record wins
    pub fn insert(&mut self, record: NodeRecord) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&record.key) {
            return idx;
        }
        let key = record.key.clone();
        let idx = self.graph.add_node(record);
        self.node_map.insert(key, idx);
        idx
    }

    /// Insert a record, replacing any existing record with the same key
    pub fn upsert(&mut self, record: NodeRecord) -> NodeIndex {
        match self.node_map.get(&record.key) {
            Some(&idx) => {
                self.graph[idx] = record;
                idx
            }
            None => self.insert(record),
        }
    }

    /// Add an edge between two known records.
    ///
    /// Returns false when either endpoint is missing or the identical edge is
    /// already present.
    pub fn connect(&mut self, from: &NodeKey, to: &NodeKey, edge: ProvenanceEdge) -> bool {
        let (Some(&a), Some(&b)) = (self.node_map.get(from), self.node_map.get(to)) else {
            return false;
        };
        if self.graph.edges_connecting(a, b).any(|e| *e.weight() == edge) {
            return false;
        }
        self.graph.add_edge(a, b, edge);
        true
    }

    /// Union another graph into this one, deduplicating records by key and
    /// edges by (endpoints, kind, position)
    pub fn merge(&mut self, other: &ProvenanceGraph) {
        for record in other.graph.node_weights() {
            self.insert(record.clone());
        }
        for edge in other.graph.edge_references() {
            let from = &other.graph[edge.source()].key;
            let to = &other.graph[edge.target()].key;
            self.connect(from, to, *edge.weight());
        }
    }

    pub fn get(&self, key: &NodeKey) -> Option<&NodeRecord> {
        self.node_map.get(key).map(|&idx| &self.graph[idx])
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.node_map.contains_key(key)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of direct dependencies of a node (0 for unknown keys)
    pub fn in_degree(&self, key: &NodeKey) -> usize {
        self.degree(key, Direction::Incoming)
    }

    /// Number of direct dependents of a node (0 for unknown keys)
    pub fn out_degree(&self, key: &NodeKey) -> usize {
        self.degree(key, Direction::Outgoing)
    }

    fn degree(&self, key: &NodeKey, direction: Direction) -> usize {
        self.node_map
            .get(key)
            .map(|&idx| self.graph.edges_directed(idx, direction).count())
            .unwrap_or(0)
    }

    /// Direct dependencies in declared order (by role, then position)
    pub fn inputs(&self, key: &NodeKey) -> Vec<(&NodeRecord, ProvenanceEdge)> {
        self.neighbours(key, Direction::Incoming)
    }

    /// Direct dependents, ordered by role then position
    pub fn outputs(&self, key: &NodeKey) -> Vec<(&NodeRecord, ProvenanceEdge)> {
        self.neighbours(key, Direction::Outgoing)
    }

    fn neighbours(&self, key: &NodeKey, direction: Direction) -> Vec<(&NodeRecord, ProvenanceEdge)> {
        let Some(&idx) = self.node_map.get(key) else {
            return Vec::new();
        };
        let mut found: Vec<(&NodeRecord, ProvenanceEdge)> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Incoming => e.source(),
                    Direction::Outgoing => e.target(),
                };
                (&self.graph[other], *e.weight())
            })
            .collect();
        found.sort_by(|(ra, ea), (rb, eb)| {
            (ea.kind, ea.position, &ra.key).cmp(&(eb.kind, eb.position, &rb.key))
        });
        found
    }

    /// Every record reachable by following edges backwards
    pub fn ancestors(&self, key: &NodeKey) -> Vec<&NodeRecord> {
        self.reachable(key, Direction::Incoming)
    }

    /// Every record reachable by following edges forwards
    pub fn descendants(&self, key: &NodeKey) -> Vec<&NodeRecord> {
        self.reachable(key, Direction::Outgoing)
    }

    fn reachable(&self, key: &NodeKey, direction: Direction) -> Vec<&NodeRecord> {
        let Some(&start) = self.node_map.get(key) else {
            return Vec::new();
        };
        let mut visited = HashSet::from([start]);
        let mut stack = vec![start];
        let mut result = Vec::new();
        while let Some(idx) = stack.pop() {
            for next in self.graph.neighbors_directed(idx, direction) {
                if visited.insert(next) {
                    result.push(&self.graph[next]);
                    stack.push(next);
                }
            }
        }
        result
    }

    pub fn records(&self) -> impl Iterator<Item = &NodeRecord> {
        self.graph.node_weights()
    }

    pub fn records_with_tag(&self, tag: NodeTag) -> Vec<&NodeRecord> {
        self.records().filter(|r| r.tag == tag).collect()
    }

    /// All edges as (from, to, weight)
    pub fn edges(&self) -> Vec<(&NodeRecord, &NodeRecord, ProvenanceEdge)> {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()], *e.weight()))
            .collect()
    }

    /// Set a free-form attribute on a record; false for unknown keys
    pub fn set_attribute(&mut self, key: &NodeKey, name: &str, value: impl Into<String>) -> bool {
        match self.node_map.get(key) {
            Some(&idx) => {
                self.graph[idx]
                    .attributes
                    .insert(name.to_string(), value.into());
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_macro_group(&mut self, key: &NodeKey, group: &str) {
        if let Some(&idx) = self.node_map.get(key) {
            self.graph[idx].macro_group = Some(group.to_string());
        }
    }

    /// Borrow the underlying petgraph graph for algorithms
    pub fn as_digraph(&self) -> &DiGraph<NodeRecord, ProvenanceEdge> {
        &self.graph
    }

    pub fn index_of(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.node_map.get(key).copied()
    }

    /// Render as Graphviz DOT, clustering records that share a macro group
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph provenance {\n  rankdir=LR;\n  node [shape=box];\n\n");

        let mut groups: BTreeMap<&str, Vec<&NodeRecord>> = BTreeMap::new();
        let mut ungrouped: Vec<&NodeRecord> = Vec::new();
        for record in self.records() {
            match record.macro_group.as_deref() {
                Some(group) => groups.entry(group).or_default().push(record),
                None => ungrouped.push(record),
            }
        }

        let node_line = |r: &NodeRecord| {
            format!(
                "\"{}\" [label=\"{}\\n{}\"];\n",
                r.key.short(),
                r.tag,
                r.label.replace('"', "\\\"")
            )
        };

        for record in ungrouped {
            dot.push_str("  ");
            dot.push_str(&node_line(record));
        }
        for (i, (group, records)) in groups.iter().enumerate() {
            dot.push_str(&format!(
                "  subgraph cluster_{i} {{\n    label=\"{group}\";\n"
            ));
            for record in records {
                dot.push_str("    ");
                dot.push_str(&node_line(record));
            }
            dot.push_str("  }\n");
        }

        dot.push('\n');
        for (from, to, edge) in self.edges() {
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                from.key.short(),
                to.key.short(),
                edge.kind
            ));
        }

        dot.push_str("}\n");
        dot
    }

    /// Serialize records and edges as pretty JSON
    pub fn to_json(&self) -> IrResult<String> {
        let export = GraphExport {
            nodes: self.records().collect(),
            edges: self
                .graph
                .edge_references()
                .map(|e| EdgeExport {
                    from: &self.graph[e.source()].key,
                    to: &self.graph[e.target()].key,
                    kind: e.weight().kind,
                    position: e.weight().position,
                })
                .collect(),
        };
        serde_json::to_string_pretty(&export).map_err(|e| IrError::Core(e.into()))
    }
}

/// A node's own key together with its merged provenance graph
#[derive(Debug, Clone)]
pub struct Lineage {
    key: NodeKey,
    graph: ProvenanceGraph,
}

impl Lineage {
    /// Placeholder for a node whose lineage is computed right after construction
    pub(crate) fn pending() -> Self {
        Self {
            key: NodeKey(String::new()),
            graph: ProvenanceGraph::new(),
        }
    }

    pub(crate) fn leaf(record: NodeRecord) -> Self {
        let key = record.key.clone();
        let mut graph = ProvenanceGraph::new();
        graph.insert(record);
        Self { key, graph }
    }

    /// Merge each dependency's graph and link it to the new record
    pub(crate) fn build(record: NodeRecord, deps: &Dependencies<'_>) -> Self {
        let mut lineage = Self::leaf(record);
        lineage.attach(deps);
        lineage
    }

    /// Replace this node's record in place and add new dependencies.
    ///
    /// Earlier records and edges are kept, so a mutated node still shows
    /// everything it was ever built from.
    pub(crate) fn reattach(&mut self, record: NodeRecord, deps: &Dependencies<'_>) {
        self.key = record.key.clone();
        self.graph.upsert(record);
        self.attach(deps);
    }

    fn attach(&mut self, deps: &Dependencies<'_>) {
        for dep in &deps.items {
            self.graph.merge(&dep.lineage.graph);
            let (from, to) = if dep.outbound {
                (&self.key, &dep.lineage.key)
            } else {
                (&dep.lineage.key, &self.key)
            };
            self.graph.connect(from, to, dep.edge);
        }
    }

    pub(crate) fn set_macro_group(&mut self, group: &str) {
        self.graph.set_macro_group(&self.key, group);
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn graph(&self) -> &ProvenanceGraph {
        &self.graph
    }

    /// This node's own record
    pub fn record(&self) -> Option<&NodeRecord> {
        self.graph.get(&self.key)
    }
}

struct Dependency<'a> {
    lineage: &'a Lineage,
    edge: ProvenanceEdge,
    outbound: bool,
}

/// Ordered direct dependencies of a node under construction
#[derive(Default)]
pub(crate) struct Dependencies<'a> {
    items: Vec<Dependency<'a>>,
}

impl<'a> Dependencies<'a> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn next_position(&self, kind: EdgeKind) -> usize {
        self.items.iter().filter(|d| d.edge.kind == kind).count()
    }

    /// Add a dependency whose position is its index among this kind
    pub(crate) fn push(&mut self, kind: EdgeKind, lineage: &'a Lineage) -> &mut Self {
        let position = self.next_position(kind);
        self.items.push(Dependency {
            lineage,
            edge: ProvenanceEdge { kind, position },
            outbound: false,
        });
        self
    }

    pub(crate) fn extend<I>(&mut self, kind: EdgeKind, lineages: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a Lineage>,
    {
        for lineage in lineages {
            self.push(kind, lineage);
        }
        self
    }

    /// Add a node this one contains; the edge points away from this node
    pub(crate) fn push_contained(&mut self, lineage: &'a Lineage) -> &mut Self {
        let position = self.next_position(EdgeKind::Contains);
        self.items.push(Dependency {
            lineage,
            edge: ProvenanceEdge {
                kind: EdgeKind::Contains,
                position,
            },
            outbound: true,
        });
        self
    }

    /// Digest of `own` and every dependency's role and key
    pub(crate) fn fingerprint(&self, own: &NodeKey) -> NodeKey {
        let hasher = self.items.iter().fold(
            StableHasher::new("definition").field("key", own),
            |hasher, dep| {
                hasher.field(
                    &format!("{}[{}]", dep.edge.kind, dep.edge.position),
                    &dep.lineage.key,
                )
            },
        );
        NodeKey::from_hasher(hasher)
    }
}

/// Anything that carries a [`Lineage`]
pub trait Provenance {
    fn lineage(&self) -> &Lineage;

    fn key(&self) -> &NodeKey {
        self.lineage().key()
    }

    fn graph(&self) -> &ProvenanceGraph {
        self.lineage().graph()
    }

    fn macro_group(&self) -> Option<&str> {
        self.lineage()
            .record()
            .and_then(|r| r.macro_group.as_deref())
    }
}

#[cfg(test)]
#[path = "provenance_test.rs"]
mod tests;
