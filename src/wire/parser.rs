//! JSON → WireNode

use std::collections::HashSet;
use std::fmt::Write as _;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as Json};

use super::{
    Limits, NodeId, NodeKind, WireNode, ARGS_KEY, DICT_KEY, ID_KEY, LIST_KEY, REF_KEY, TYPE_KEY,
    VAL_KEY,
};
use crate::error::DecodeError;

/// Keys that select a node kind; at most one may appear per object.
const KIND_KEYS: [&str; 5] = [TYPE_KEY, REF_KEY, VAL_KEY, LIST_KEY, DICT_KEY];

/// Parse a JSON payload into a wire tree with the default [`Limits`].
pub fn parse(json: &Json) -> Result<WireNode, DecodeError> {
    parse_with_limits(json, &Limits::default())
}

pub fn parse_with_limits(json: &Json, limits: &Limits) -> Result<WireNode, DecodeError> {
    let mut parser = Parser {
        limits,
        nodes: 0,
        ids: HashSet::new(),
        path: Vec::new(),
    };
    parser.node(json, 0)
}

enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

struct Parser<'a, 'j> {
    limits: &'a Limits,
    nodes: usize,
    ids: HashSet<NodeId>,
    path: Vec<Segment<'j>>,
}

impl<'a, 'j> Parser<'a, 'j> {
    fn node(&mut self, json: &'j Json, depth: usize) -> Result<WireNode, DecodeError> {
        self.enter(depth)?;
        match json {
            Json::Array(items) => Ok(WireNode::new(NodeKind::List(self.items(items, depth)?))),
            Json::Object(map) => self.object(map, depth),
            primitive => Ok(WireNode::new(NodeKind::Primitive(primitive.clone()))),
        }
    }

    fn object(&mut self, map: &'j JsonMap<String, Json>, depth: usize) -> Result<WireNode, DecodeError> {
        let marker = self.marker(map)?;
        let id = match map.get(ID_KEY) {
            Some(raw) => Some(self.node_id(ID_KEY, raw)?),
            None => None,
        };

        let kind = match marker {
            None => {
                if id.is_some() {
                    return Err(self.malformed("`_id` without a node kind"));
                }
                if map.contains_key(ARGS_KEY) {
                    return Err(self.malformed("`_args` without `_type`"));
                }
                NodeKind::Dict(self.entries(map, depth)?)
            }
            Some(REF_KEY) => {
                self.only(map, REF_KEY, &[REF_KEY])?;
                NodeKind::Reference(self.node_id(REF_KEY, &map[REF_KEY])?)
            }
            Some(TYPE_KEY) => {
                self.only(map, TYPE_KEY, &[TYPE_KEY, ARGS_KEY, ID_KEY])?;
                let tag = match &map[TYPE_KEY] {
                    Json::String(tag) => tag.clone(),
                    other => {
                        return Err(self.malformed(format!(
                            "`_type` must be a string, got {}",
                            json_kind(other)
                        )))
                    }
                };
                let args = match map.get(ARGS_KEY) {
                    Some(Json::Array(items)) => {
                        self.nested(Segment::Key(ARGS_KEY), |p| p.items(items, depth))?
                    }
                    Some(other) => {
                        return Err(self.malformed(format!(
                            "`_args` must be an array, got {}",
                            json_kind(other)
                        )))
                    }
                    None => return Err(self.malformed(format!("Missing `_args` for type '{tag}'"))),
                };
                NodeKind::Tagged { tag, args }
            }
            Some(VAL_KEY) => {
                self.only(map, VAL_KEY, &[VAL_KEY, ID_KEY])?;
                let raw = &map[VAL_KEY];
                self.nested(Segment::Key(VAL_KEY), |p| p.verbatim(raw, depth))?;
                NodeKind::Primitive(raw.clone())
            }
            Some(LIST_KEY) => {
                self.only(map, LIST_KEY, &[LIST_KEY, ID_KEY])?;
                match &map[LIST_KEY] {
                    Json::Array(items) => {
                        NodeKind::List(self.nested(Segment::Key(LIST_KEY), |p| p.items(items, depth))?)
                    }
                    other => {
                        return Err(self.malformed(format!(
                            "`_list` must be an array, got {}",
                            json_kind(other)
                        )))
                    }
                }
            }
            Some(_) => {
                self.only(map, DICT_KEY, &[DICT_KEY, ID_KEY])?;
                match &map[DICT_KEY] {
                    Json::Object(entries) => NodeKind::Dict(
                        self.nested(Segment::Key(DICT_KEY), |p| p.entries(entries, depth))?,
                    ),
                    other => {
                        return Err(self.malformed(format!(
                            "`_dict` must be an object, got {}",
                            json_kind(other)
                        )))
                    }
                }
            }
        };

        if let Some(id) = id {
            if !self.ids.insert(id) {
                return Err(self.malformed(format!("Duplicate node id {id}")));
            }
        }

        Ok(WireNode { id, kind })
    }

    /// Count one node at `depth` against the limits.
    fn enter(&mut self, depth: usize) -> Result<(), DecodeError> {
        if depth > self.limits.max_depth {
            return Err(self.malformed(format!(
                "Nesting exceeds the depth limit of {}",
                self.limits.max_depth
            )));
        }
        self.nodes += 1;
        if self.nodes > self.limits.max_nodes {
            return Err(self.malformed(format!(
                "Payload exceeds the limit of {} nodes",
                self.limits.max_nodes
            )));
        }
        Ok(())
    }

    /// Walk `_val` content without interpreting it; it still counts
    /// against the limits.
    fn verbatim(&mut self, json: &'j Json, depth: usize) -> Result<(), DecodeError> {
        match json {
            Json::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.nested(Segment::Index(i), |p| {
                        p.enter(depth + 1)?;
                        p.verbatim(item, depth + 1)
                    })?;
                }
            }
            Json::Object(entries) => {
                for (key, value) in entries {
                    self.nested(Segment::Key(key.as_str()), |p| {
                        p.enter(depth + 1)?;
                        p.verbatim(value, depth + 1)
                    })?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn items(&mut self, items: &'j [Json], depth: usize) -> Result<Vec<WireNode>, DecodeError> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.nested(Segment::Index(i), |p| p.node(item, depth + 1)))
            .collect()
    }

    fn entries(
        &mut self,
        map: &'j JsonMap<String, Json>,
        depth: usize,
    ) -> Result<IndexMap<String, WireNode>, DecodeError> {
        map.iter()
            .map(|(key, value)| {
                let node = self.nested(Segment::Key(key.as_str()), |p| p.node(value, depth + 1))?;
                Ok((key.clone(), node))
            })
            .collect()
    }

    /// The node-kind marker of an object, if any.
    fn marker(&self, map: &JsonMap<String, Json>) -> Result<Option<&'static str>, DecodeError> {
        let mut found = KIND_KEYS.iter().copied().filter(|key| map.contains_key(*key));
        let first = found.next();
        if let (Some(first), Some(second)) = (first, found.next()) {
            return Err(self.malformed(format!(
                "Conflicting markers `{first}` and `{second}`"
            )));
        }
        Ok(first)
    }

    fn only(&self, map: &JsonMap<String, Json>, marker: &str, allowed: &[&str]) -> Result<(), DecodeError> {
        match map.keys().find(|key| !allowed.contains(&key.as_str())) {
            Some(key) => Err(self.malformed(format!("Unexpected key `{key}` alongside `{marker}`"))),
            None => Ok(()),
        }
    }

    fn node_id(&self, key: &str, raw: &Json) -> Result<NodeId, DecodeError> {
        raw.as_u64()
            .and_then(|n| NodeId::try_from(n).ok())
            .ok_or_else(|| {
                self.malformed(format!("`{key}` must be a non-negative integer, got {raw}"))
            })
    }

    fn nested<T>(
        &mut self,
        segment: Segment<'j>,
        f: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    fn malformed(&self, reason: impl Into<String>) -> DecodeError {
        let mut path = String::from("$");
        for segment in &self.path {
            let _ = match segment {
                Segment::Key(key) => write!(path, ".{key}"),
                Segment::Index(i) => write!(path, "[{i}]"),
            };
        }
        DecodeError::malformed(path, reason)
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn malformed(json: Json) -> (String, String) {
        match parse(&json) {
            Err(DecodeError::Malformed { path, reason }) => (path, reason),
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn primitives_and_plain_containers() {
        let node = parse(&json!({"a": [1, "two", null], "b": true})).unwrap();
        let NodeKind::Dict(entries) = &node.kind else {
            panic!("expected dict");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries["a"],
            WireNode::new(NodeKind::List(vec![
                WireNode::new(NodeKind::Primitive(json!(1))),
                WireNode::new(NodeKind::Primitive(json!("two"))),
                WireNode::new(NodeKind::Primitive(Json::Null)),
            ]))
        );
        assert_eq!(node.node_count(), 6);
    }

    #[test]
    fn tagged_node_with_id() {
        let node = parse(&json!({"_type": "ObjectId", "_args": ["abc"], "_id": 4})).unwrap();
        assert_eq!(
            node,
            WireNode::new(NodeKind::Tagged {
                tag: "ObjectId".to_string(),
                args: vec![WireNode::new(NodeKind::Primitive(json!("abc")))],
            })
            .with_id(4)
        );
    }

    #[test]
    fn escaped_dict_keeps_marker_keys() {
        let node = parse(&json!({"_dict": {"_type": "not a tag", "_ref": 1}})).unwrap();
        let NodeKind::Dict(entries) = &node.kind else {
            panic!("expected dict");
        };
        assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["_type", "_ref"]);
    }

    #[test]
    fn val_is_taken_verbatim() {
        let node = parse(&json!({"_val": {"_type": "x"}, "_id": 0})).unwrap();
        assert_eq!(node.kind, NodeKind::Primitive(json!({"_type": "x"})));
        assert_eq!(node.id, Some(0));
    }

    #[test]
    fn missing_args() {
        let (path, reason) = malformed(json!({"_type": "ObjectId"}));
        assert_eq!(path, "$");
        assert_eq!(reason, "Missing `_args` for type 'ObjectId'");
    }

    #[test]
    fn args_must_be_an_array() {
        let (_, reason) = malformed(json!({"_type": "ObjectId", "_args": "abc"}));
        assert_eq!(reason, "`_args` must be an array, got string");
    }

    #[test]
    fn tag_must_be_a_string() {
        let (_, reason) = malformed(json!({"_type": 7, "_args": []}));
        assert_eq!(reason, "`_type` must be a string, got number");
    }

    #[test]
    fn reference_index_must_be_an_integer() {
        let (path, reason) = malformed(json!([{"_ref": 1.5}]));
        assert_eq!(path, "$[0]");
        assert!(reason.starts_with("`_ref` must be a non-negative integer"));
        malformed(json!({"_ref": -1}));
        malformed(json!({"_ref": "0"}));
        malformed(json!({"_ref": 4_294_967_296u64}));
    }

    #[test]
    fn reference_takes_no_companions() {
        let (_, reason) = malformed(json!({"_ref": 0, "_id": 1}));
        assert_eq!(reason, "Unexpected key `_id` alongside `_ref`");
    }

    #[test]
    fn conflicting_markers() {
        let (_, reason) = malformed(json!({"_type": "A", "_args": [], "_list": []}));
        assert_eq!(reason, "Conflicting markers `_type` and `_list`");
    }

    #[test]
    fn id_requires_a_node_kind() {
        let (_, reason) = malformed(json!({"_id": 1, "name": "x"}));
        assert_eq!(reason, "`_id` without a node kind");
        let (_, reason) = malformed(json!({"_args": []}));
        assert_eq!(reason, "`_args` without `_type`");
    }

    #[test]
    fn duplicate_ids() {
        let (path, reason) = malformed(json!([
            {"_type": "A", "_args": [], "_id": 0},
            {"_list": [], "_id": 0},
        ]));
        assert_eq!(path, "$[1]");
        assert_eq!(reason, "Duplicate node id 0");
    }

    #[test]
    fn error_path_points_into_args() {
        let (path, _) = malformed(json!({
            "items": [{"_type": "Outer", "_args": [1, {"_type": 3, "_args": []}]}]
        }));
        assert_eq!(path, "$.items[0]._args[1]");
    }

    #[test]
    fn depth_limit() {
        let limits = Limits {
            max_depth: 2,
            ..Limits::default()
        };
        assert!(parse_with_limits(&json!([[1]]), &limits).is_ok());
        let err = parse_with_limits(&json!([[[1]]]), &limits).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    #[test]
    fn node_limit() {
        let limits = Limits {
            max_nodes: 3,
            ..Limits::default()
        };
        assert!(parse_with_limits(&json!([1, 2]), &limits).is_ok());
        let err = parse_with_limits(&json!([1, 2, 3]), &limits).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed payload at $[2]: Payload exceeds the limit of 3 nodes"
        );
    }

    #[test]
    fn val_content_counts_against_node_limit() {
        let limits = Limits {
            max_nodes: 3,
            ..Limits::default()
        };
        assert!(parse_with_limits(&json!({"_val": [1, 2]}), &limits).is_ok());
        let err = parse_with_limits(&json!({"_val": [1, 2, 3, 4, 5, 6, 7, 8]}), &limits).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed payload at $._val[2]: Payload exceeds the limit of 3 nodes"
        );
    }

    #[test]
    fn val_content_counts_against_depth_limit() {
        let limits = Limits {
            max_depth: 2,
            ..Limits::default()
        };
        assert!(parse_with_limits(&json!({"_val": [[1]]}), &limits).is_ok());
        let (path, reason) = match parse_with_limits(&json!({"_val": [1, [[[1]]]]}), &limits) {
            Err(DecodeError::Malformed { path, reason }) => (path, reason),
            other => panic!("expected Malformed, got {:?}", other),
        };
        assert_eq!(path, "$._val[1][0][0]");
        assert_eq!(reason, "Nesting exceeds the depth limit of 2");
    }
}
