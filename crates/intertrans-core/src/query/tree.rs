//! Attempt-tree reconstruction for rendering.
//!
//! Each request becomes a forest hanging off one synthetic root node that
//! carries the seed language. Node depth is derived from the parent chain:
//! the root is depth 0 and direct attempts are depth 1. The engine's own
//! `level` field is not consulted.

use std::collections::HashMap;

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use tracing::debug;

use crate::errors::{IntertransError, IntertransResult};
use crate::models::{DisplayCategory, EdgeRow, EdgeTable};
use crate::query::guards::{is_root_parent, ROOT_PARENT_SENTINEL, ROOT_STATUS_TAG};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TreeNode {
    /// Node key: the attempt's edge id, or the sentinel for the root.
    pub id: i64,
    pub label: String,
    pub status: String,
    pub category: DisplayCategory,
    pub depth: usize,
}

impl TreeNode {
    pub fn is_root(&self) -> bool {
        self.status == ROOT_STATUS_TAG
    }
}

/// Result of tree assembly. An empty row set is not an error; renderers
/// special-case [`TranslationTree::Empty`].
#[derive(Debug)]
pub enum TranslationTree {
    Empty,
    Forest(AttemptForest),
}

impl TranslationTree {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn forest(&self) -> Option<&AttemptForest> {
        match self {
            Self::Forest(forest) => Some(forest),
            Self::Empty => None,
        }
    }
}

#[derive(Debug)]
pub struct AttemptForest {
    graph: DiGraph<TreeNode, ()>,
    root: NodeIndex,
    by_edge_id: HashMap<i64, NodeIndex>,
    seed_language: String,
    target_language: String,
}

/// Serializable view handed to rendering collaborators.
#[derive(Clone, Debug, Serialize)]
pub struct TreeSnapshot {
    pub title: String,
    pub nodes: Vec<TreeNode>,
    pub edges: Vec<(i64, i64)>,
}

impl AttemptForest {
    fn new(seed_language: &str, target_language: &str) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(TreeNode {
            id: ROOT_PARENT_SENTINEL,
            label: seed_language.to_string(),
            status: ROOT_STATUS_TAG.to_string(),
            category: DisplayCategory::SkyBlue,
            depth: 0,
        });
        Self {
            graph,
            root,
            by_edge_id: HashMap::new(),
            seed_language: seed_language.to_string(),
            target_language: target_language.to_string(),
        }
    }

    fn insert(&mut self, row: &EdgeRow) -> IntertransResult<()> {
        let parent = if is_root_parent(row.parent_edge_id) {
            self.root
        } else {
            *self
                .by_edge_id
                .get(&row.parent_edge_id)
                .ok_or(IntertransError::DanglingParent {
                    edge_id: row.edge_id,
                    parent_edge_id: row.parent_edge_id,
                })?
        };
        let category = row.status.category()?;

        // Paths sharing a prefix list the same attempt more than once.
        if let Some(&existing) = self.by_edge_id.get(&row.edge_id) {
            let first_parent = self.parent_id(existing);
            if first_parent != row.parent_edge_id {
                return Err(IntertransError::ConflictingParent {
                    edge_id: row.edge_id,
                    first_parent,
                    second_parent: row.parent_edge_id,
                });
            }
            return Ok(());
        }

        let depth = self.graph[parent].depth + 1;
        let node = self.graph.add_node(TreeNode {
            id: row.edge_id,
            label: row.target_language.clone(),
            status: row.status.as_str().to_string(),
            category,
            depth,
        });
        self.graph.add_edge(parent, node, ());
        self.by_edge_id.insert(row.edge_id, node);
        Ok(())
    }

    fn parent_id(&self, node: NodeIndex) -> i64 {
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .next()
            .map(|p| self.graph[p].id)
            .unwrap_or(ROOT_PARENT_SENTINEL)
    }

    /// Number of nodes, including the synthetic root.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn root(&self) -> &TreeNode {
        &self.graph[self.root]
    }

    pub fn node(&self, edge_id: i64) -> Option<&TreeNode> {
        self.by_edge_id.get(&edge_id).map(|&idx| &self.graph[idx])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.graph.node_weights()
    }

    /// Child node ids of `id` (use the sentinel for the root), in insertion
    /// order.
    pub fn children(&self, id: i64) -> Vec<i64> {
        let idx = if is_root_parent(id) {
            Some(self.root)
        } else {
            self.by_edge_id.get(&id).copied()
        };
        let Some(idx) = idx else {
            return Vec::new();
        };
        let mut children: Vec<(usize, i64)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.target().index(), self.graph[e.target()].id))
            .collect();
        children.sort_unstable();
        children.into_iter().map(|(_, id)| id).collect()
    }

    /// Directed `(parent id, child id)` pairs in insertion order.
    pub fn edges(&self) -> Vec<(i64, i64)> {
        self.graph
            .edge_references()
            .map(|e| (self.graph[e.source()].id, self.graph[e.target()].id))
            .collect()
    }

    pub fn title(&self) -> String {
        format!("{} -> {}", self.seed_language, self.target_language)
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            title: self.title(),
            nodes: self.nodes().cloned().collect(),
            edges: self.edges(),
        }
    }

    /// Graphviz rendering with target-language labels and status colours.
    pub fn to_dot(&self) -> String {
        let dot = Dot::with_attr_getters(
            &self.graph,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &|_, _| String::new(),
            &|_, (_, node)| {
                format!(
                    "label = \"{}\" style = filled fillcolor = {}",
                    node.label.replace('\\', "\\\\").replace('"', "\\\""),
                    node.category.color_name()
                )
            },
        );
        format!("{dot:?}")
    }
}

/// Build the attempt forest for one request's rows.
pub fn assemble_tree(rows: &[EdgeRow]) -> IntertransResult<TranslationTree> {
    let Some(first) = rows.first() else {
        return Ok(TranslationTree::Empty);
    };
    let mut forest = AttemptForest::new(&first.seed_language, &first.request_target_language);
    for row in rows {
        forest.insert(row)?;
    }
    debug!(
        nodes = forest.node_count(),
        edges = forest.edge_count(),
        "assembled attempt tree"
    );
    Ok(TranslationTree::Forest(forest))
}

/// Filter a table to one request and assemble its tree.
pub fn assemble_request_tree(table: &EdgeTable, request_id: &str) -> IntertransResult<TranslationTree> {
    assemble_tree(&table.for_request(request_id))
}
