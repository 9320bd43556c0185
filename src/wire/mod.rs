//! Wire grammar
//!
//! A payload is plain JSON in which some objects are marker nodes:
//!
//! ```text
//! {"_type": "ObjectId", "_args": ["5f1b..."]}   tagged node, built by an adapter
//! {"_ref": 3}                                  back reference to node 3
//! {"_val": "text", "_id": 3}                   primitive carrying an id
//! {"_list": [...], "_id": 3}                   list carrying an id
//! {"_dict": {"_type": "literal key"}}          dict with keys taken literally
//! ```
//!
//! Tagged nodes, `_val`, `_list` and `_dict` may carry `_id`; once that node
//! is built, later `{"_ref": id}` nodes in the same payload resolve to the
//! same instance. Every other object is a plain dict, every array a list.

mod parser;

pub use parser::{parse, parse_with_limits};

use indexmap::IndexMap;

/// Index of a node that back references can target.
pub type NodeId = u32;

pub const TYPE_KEY: &str = "_type";
pub const ARGS_KEY: &str = "_args";
pub const ID_KEY: &str = "_id";
pub const REF_KEY: &str = "_ref";
pub const VAL_KEY: &str = "_val";
pub const LIST_KEY: &str = "_list";
pub const DICT_KEY: &str = "_dict";

/// Resource limits applied while parsing a payload.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Maximum nesting depth of wire nodes.
    pub max_depth: usize,
    /// Maximum number of wire nodes in one payload.
    pub max_nodes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_nodes: 1_000_000,
        }
    }
}

/// One parsed wire value.
#[derive(Debug, Clone, PartialEq)]
pub struct WireNode {
    /// Set when back references may target this node.
    pub id: Option<NodeId>,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Null, bool, number or string; or any JSON taken verbatim from `_val`.
    Primitive(serde_json::Value),
    List(Vec<WireNode>),
    Dict(IndexMap<String, WireNode>),
    Tagged { tag: String, args: Vec<WireNode> },
    Reference(NodeId),
}

impl WireNode {
    pub fn new(kind: NodeKind) -> Self {
        Self { id: None, kind }
    }

    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = Some(id);
        self
    }

    /// Number of nodes in this tree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + match &self.kind {
            NodeKind::Primitive(_) | NodeKind::Reference(_) => 0,
            NodeKind::List(items) | NodeKind::Tagged { args: items, .. } => {
                items.iter().map(WireNode::node_count).sum()
            }
            NodeKind::Dict(entries) => entries.values().map(WireNode::node_count).sum(),
        }
    }
}
