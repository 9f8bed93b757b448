//! Graph values materialized from server structures.
//!
//! These are projections of server-side state. They are produced by decoding
//! and are never sent back; their handlers refuse to encode.

use std::fmt;

use super::value::{Map, Value};

/// A graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node ID
    pub id: i64,
    /// Node labels
    pub labels: Vec<String>,
    /// Node properties
    pub properties: Map,
}

impl Node {
    /// Create a new node.
    pub fn new(id: i64, labels: Vec<String>, properties: Map) -> Self {
        Self {
            id,
            labels,
            properties,
        }
    }

    /// Whether the node carries the label.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Get a property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = if self.labels.is_empty() {
            String::new()
        } else {
            format!(":{}", self.labels.join(":"))
        };
        write!(f, "({}{})", self.id, labels)
    }
}

/// A graph relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Relationship ID
    pub id: i64,
    /// Start node ID
    pub start_node_id: i64,
    /// End node ID
    pub end_node_id: i64,
    /// Relationship type
    pub rel_type: String,
    /// Relationship properties
    pub properties: Map,
}

impl Relationship {
    /// Create a new relationship.
    pub fn new(
        id: i64,
        start_node_id: i64,
        end_node_id: i64,
        rel_type: impl Into<String>,
        properties: Map,
    ) -> Self {
        Self {
            id,
            start_node_id,
            end_node_id,
            rel_type: rel_type.into(),
            properties,
        }
    }

    /// Get a property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({})-[:{}]->({}) [id: {}]",
            self.start_node_id, self.rel_type, self.end_node_id, self.id
        )
    }
}

/// A relationship without endpoints, as carried inside a path.
#[derive(Debug, Clone, PartialEq)]
pub struct UnboundRelationship {
    /// Relationship ID
    pub id: i64,
    /// Relationship type
    pub rel_type: String,
    /// Relationship properties
    pub properties: Map,
}

impl UnboundRelationship {
    /// Create a new unbound relationship.
    pub fn new(id: i64, rel_type: impl Into<String>, properties: Map) -> Self {
        Self {
            id,
            rel_type: rel_type.into(),
            properties,
        }
    }

    /// Attach endpoints.
    pub fn bind(&self, start_node_id: i64, end_node_id: i64) -> Relationship {
        Relationship {
            id: self.id,
            start_node_id,
            end_node_id,
            rel_type: self.rel_type.clone(),
            properties: self.properties.clone(),
        }
    }
}

/// An alternating sequence of nodes and relationships.
///
/// `nodes` has one more entry than `relationships`. Relationship `i` joins
/// `nodes[i]` and `nodes[i + 1]` in either direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Nodes in traversal order
    pub nodes: Vec<Node>,
    /// Relationships in traversal order
    pub relationships: Vec<Relationship>,
}

impl Path {
    /// Create a new path.
    pub fn new(nodes: Vec<Node>, relationships: Vec<Relationship>) -> Self {
        Self {
            nodes,
            relationships,
        }
    }

    /// Path length (relationship count).
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    /// Whether the path has no relationships.
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    /// First node.
    pub fn start(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Last node.
    pub fn end(&self) -> Option<&Node> {
        self.nodes.last()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Path: {} nodes, {} rels>",
            self.nodes.len(),
            self.relationships.len()
        )
    }
}
