//! Graph structure handlers. Every one of them refuses to encode.

use crate::bolt::packstream::error::{DecodeError, PackStreamResult};
use crate::bolt::packstream::graph::{Node, Path, Relationship, UnboundRelationship};
use crate::bolt::packstream::handler::{ensure_arity, Direction, StructReader};
use crate::bolt::packstream::marker::{NODE_TAG, PATH_TAG, RELATIONSHIP_TAG, UNBOUND_RELATIONSHIP_TAG};
use crate::bolt::packstream::value::Value;

struct_handler! {
    /// Node: id, labels, properties.
    NodeHandler {
        tag: NODE_TAG,
        name: "Node",
        fields: 3,
        direction: Direction::DecodeOnly,
    }

    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        ensure_arity(self, field_count)?;
        let id = reader.read_int()?;
        let labels = string_list(reader.read_list()?)?;
        let properties = reader.read_map()?;
        Ok(Value::Node(Node::new(id, labels, properties)))
    }
}

struct_handler! {
    /// Relationship: id, start node id, end node id, type, properties.
    RelationshipHandler {
        tag: RELATIONSHIP_TAG,
        name: "Relationship",
        fields: 5,
        direction: Direction::DecodeOnly,
    }

    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        ensure_arity(self, field_count)?;
        let id = reader.read_int()?;
        let start_node_id = reader.read_int()?;
        let end_node_id = reader.read_int()?;
        let rel_type = reader.read_string()?;
        let properties = reader.read_map()?;
        Ok(Value::Relationship(Relationship::new(
            id,
            start_node_id,
            end_node_id,
            rel_type,
            properties,
        )))
    }
}

struct_handler! {
    /// Unbound relationship: id, type, properties.
    UnboundRelationshipHandler {
        tag: UNBOUND_RELATIONSHIP_TAG,
        name: "UnboundRelationship",
        fields: 3,
        direction: Direction::DecodeOnly,
    }

    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        ensure_arity(self, field_count)?;
        let id = reader.read_int()?;
        let rel_type = reader.read_string()?;
        let properties = reader.read_map()?;
        Ok(Value::UnboundRelationship(UnboundRelationship::new(
            id, rel_type, properties,
        )))
    }
}

struct_handler! {
    /// Path: distinct nodes, distinct unbound relationships, index sequence.
    PathHandler {
        tag: PATH_TAG,
        name: "Path",
        fields: 3,
        direction: Direction::DecodeOnly,
    }

    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        ensure_arity(self, field_count)?;
        let nodes = reader
            .read_list()?
            .into_iter()
            .map(|v| match v {
                Value::Node(n) => Ok(n),
                other => Err(unexpected("Node", &other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let rels = reader
            .read_list()?
            .into_iter()
            .map(|v| match v {
                Value::UnboundRelationship(r) => Ok(r),
                other => Err(unexpected("UnboundRelationship", &other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let indices = reader
            .read_list()?
            .into_iter()
            .map(|v| match v {
                Value::Integer(i) => Ok(i),
                other => Err(unexpected("Integer", &other)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Value::Path(hydrate_path(nodes, rels, &indices)?))
    }
}

fn unexpected(expected: &'static str, found: &Value) -> DecodeError {
    DecodeError::UnexpectedType {
        expected,
        found: found.type_name(),
    }
}

fn string_list(values: Vec<Value>) -> Result<Vec<String>, DecodeError> {
    values
        .into_iter()
        .map(|v| match v {
            Value::String(s) => Ok(s),
            other => Err(unexpected("String", &other)),
        })
        .collect()
}

fn invalid_path(field: &'static str, reason: String) -> DecodeError {
    DecodeError::InvalidField {
        tag: PATH_TAG,
        field,
        reason,
    }
}

/// Rebuild the traversal from the index sequence.
///
/// Each `(r, n)` pair steps along unbound relationship `|r| - 1` to node `n`.
/// A positive `r` walks the relationship forwards, a negative one backwards.
fn hydrate_path(
    nodes: Vec<Node>,
    rels: Vec<UnboundRelationship>,
    indices: &[i64],
) -> Result<Path, DecodeError> {
    if nodes.is_empty() {
        return Err(invalid_path("nodes", "path has no nodes".into()));
    }
    if indices.len() % 2 != 0 {
        return Err(invalid_path(
            "indices",
            format!("odd index count {}", indices.len()),
        ));
    }

    let steps = indices.len() / 2;
    let mut path_nodes = Vec::with_capacity(steps + 1);
    let mut path_rels = Vec::with_capacity(steps);
    path_nodes.push(nodes[0].clone());
    let mut prev = 0usize;

    for pair in indices.chunks_exact(2) {
        let (rel_index, node_index) = (pair[0], pair[1]);

        let rel = usize::try_from(rel_index.unsigned_abs())
            .ok()
            .filter(|&i| i >= 1 && i <= rels.len())
            .map(|i| &rels[i - 1])
            .ok_or_else(|| {
                invalid_path(
                    "indices",
                    format!("relationship index {} out of range", rel_index),
                )
            })?;
        let next = usize::try_from(node_index)
            .ok()
            .filter(|&i| i < nodes.len())
            .ok_or_else(|| {
                invalid_path("indices", format!("node index {} out of range", node_index))
            })?;

        let (start, end) = if rel_index > 0 {
            (nodes[prev].id, nodes[next].id)
        } else {
            (nodes[next].id, nodes[prev].id)
        };
        path_rels.push(rel.bind(start, end));
        path_nodes.push(nodes[next].clone());
        prev = next;
    }

    Ok(Path::new(path_nodes, path_rels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bolt::packstream::value::Map;

    fn node(id: i64) -> Node {
        Node::new(id, vec![], Map::new())
    }

    #[test]
    fn test_hydrate_forward_and_reverse() {
        let nodes = vec![node(10), node(20), node(30)];
        let rels = vec![
            UnboundRelationship::new(100, "KNOWS", Map::new()),
            UnboundRelationship::new(200, "LIKES", Map::new()),
        ];
        // 10 -[100]-> 20 <-[200]- 30
        let path = hydrate_path(nodes, rels, &[1, 1, -2, 2]).unwrap();

        assert_eq!(path.len(), 2);
        let ids: Vec<_> = path.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);

        assert_eq!(path.relationships[0].start_node_id, 10);
        assert_eq!(path.relationships[0].end_node_id, 20);
        assert_eq!(path.relationships[1].id, 200);
        assert_eq!(path.relationships[1].start_node_id, 30);
        assert_eq!(path.relationships[1].end_node_id, 20);
    }

    #[test]
    fn test_hydrate_single_node() {
        let path = hydrate_path(vec![node(1)], vec![], &[]).unwrap();
        assert!(path.is_empty());
        assert_eq!(path.start().map(|n| n.id), Some(1));
    }

    #[test]
    fn test_hydrate_bad_indices() {
        let rels = vec![UnboundRelationship::new(1, "R", Map::new())];

        let err = hydrate_path(vec![node(1), node(2)], rels.clone(), &[1]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "indices", .. }));

        let err = hydrate_path(vec![node(1), node(2)], rels.clone(), &[0, 1]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { tag: PATH_TAG, .. }));

        let err = hydrate_path(vec![node(1), node(2)], rels.clone(), &[2, 1]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { .. }));

        let err = hydrate_path(vec![node(1), node(2)], rels, &[1, 5]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { .. }));

        let err = hydrate_path(vec![], vec![], &[]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "nodes", .. }));
    }

    #[test]
    fn test_string_list_rejects_non_text() {
        let err = string_list(vec![Value::from("A"), Value::Integer(1)]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedType {
                expected: "String",
                found: "Integer"
            }
        );
    }
}
