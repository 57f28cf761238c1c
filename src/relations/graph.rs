//! Relationship graph analytics
//!
//! [`RelationshipGraph`] loads inferred edges into an undirected petgraph
//! keyed by note path, for connectivity questions over the whole vault.

use super::models::{NoteCluster, RelationshipEdge, RelationshipKind};
use crate::extract::Note;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Undirected graph of notes joined by relationship edges.
///
/// Several edges may join the same pair, one per relationship kind.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    pub graph: UnGraph<String, RelationshipEdge>,
    pub path_to_index: HashMap<String, NodeIndex>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from notes and the edges inferred between them.
    ///
    /// Every note becomes a node, related or not. Edges naming an unknown
    /// path add that path as a node.
    pub fn build(notes: &[Note], edges: &[RelationshipEdge]) -> Self {
        let mut graph = Self::new();
        for note in notes {
            graph.add_note(&note.path);
        }
        for edge in edges {
            graph.add_edge(edge.clone());
        }
        graph
    }

    /// Add a note node, returning the existing index if already present.
    pub fn add_note(&mut self, path: &str) -> NodeIndex {
        if let Some(&idx) = self.path_to_index.get(path) {
            return idx;
        }
        let idx = self.graph.add_node(path.to_string());
        self.path_to_index.insert(path.to_string(), idx);
        idx
    }

    pub fn add_edge(&mut self, edge: RelationshipEdge) {
        let from = self.add_note(&edge.source);
        let to = self.add_note(&edge.target);
        self.graph.add_edge(from, to, edge);
    }

    pub fn note_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of distinct notes related to `path`.
    pub fn degree(&self, path: &str) -> usize {
        let Some(&idx) = self.path_to_index.get(path) else {
            return 0;
        };
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        neighbors.sort();
        neighbors.dedup();
        neighbors.len()
    }

    /// Notes with the most distinct neighbours, ties by path.
    pub fn most_connected(&self, limit: usize) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self
            .graph
            .node_weights()
            .map(|path| (path.clone(), self.degree(path)))
            .filter(|(_, degree)| *degree > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }

    /// Notes with no relationship at all, sorted.
    pub fn isolated_notes(&self) -> Vec<String> {
        let mut isolated: Vec<String> = self
            .graph
            .node_indices()
            .filter(|&idx| self.graph.neighbors(idx).next().is_none())
            .map(|idx| self.graph[idx].clone())
            .collect();
        isolated.sort();
        isolated
    }

    pub fn edge_counts(&self) -> BTreeMap<RelationshipKind, usize> {
        let mut counts = BTreeMap::new();
        for edge in self.graph.edge_weights() {
            *counts.entry(edge.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Connected groups of notes, largest first (ties by first member).
    pub fn connected_components(&self) -> Vec<NoteCluster> {
        let g = &self.graph;
        let mut component_of: Vec<Option<u32>> = vec![None; g.node_count()];
        let mut members: Vec<Vec<String>> = Vec::new();

        for start in g.node_indices() {
            if component_of[start.index()].is_some() {
                continue;
            }
            let id = members.len() as u32;
            let mut group = Vec::new();
            let mut queue = VecDeque::from([start]);
            component_of[start.index()] = Some(id);

            while let Some(current) = queue.pop_front() {
                group.push(g[current].clone());
                for neighbor in g.neighbors(current) {
                    if component_of[neighbor.index()].is_none() {
                        component_of[neighbor.index()] = Some(id);
                        queue.push_back(neighbor);
                    }
                }
            }
            group.sort();
            members.push(group);
        }

        members.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        members
            .into_iter()
            .enumerate()
            .map(|(id, members)| NoteCluster {
                id: id as u32,
                members,
            })
            .collect()
    }
}
