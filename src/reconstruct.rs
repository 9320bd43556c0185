//! Reconstructor
//!
//! Walks a [`WireNode`] tree depth-first, post-order. Children are always
//! built before their parent, so an adapter rule only ever sees finished
//! arguments. A node carrying an id is recorded in the call's [`Context`]
//! once built; a later reference to that id yields the same instance.

use std::collections::HashMap;

use telepath_value::{Map, Value};
use tracing::trace;

use crate::error::DecodeError;
use crate::registry::Registry;
use crate::wire::{NodeId, NodeKind, WireNode};

/// Per-call table of built nodes, keyed by wire id.
#[derive(Debug, Default)]
struct Context {
    built: HashMap<NodeId, Value>,
}

impl Context {
    fn resolve(&self, id: NodeId) -> Result<Value, DecodeError> {
        self.built
            .get(&id)
            .cloned()
            .ok_or(DecodeError::DanglingReference(id))
    }
}

/// Rebuilds live values from wire trees using one registry.
///
/// Holds no state between calls; each [`Reconstructor::reconstruct`] call
/// owns a fresh context.
#[derive(Debug, Clone, Copy)]
pub struct Reconstructor<'r> {
    registry: &'r Registry,
}

impl<'r> Reconstructor<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn reconstruct(&self, node: &WireNode) -> Result<Value, DecodeError> {
        let mut context = Context::default();
        self.build(node, &mut context)
    }

    fn build(&self, node: &WireNode, context: &mut Context) -> Result<Value, DecodeError> {
        let value = match &node.kind {
            NodeKind::Primitive(json) => Value::from(json.clone()),
            NodeKind::List(items) => Value::list(self.build_all(items, context)?),
            NodeKind::Dict(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, child) in entries {
                    map.insert(key.clone(), self.build(child, context)?);
                }
                Value::map(map)
            }
            NodeKind::Tagged { tag, args } => {
                let args = self.build_all(args, context)?;
                let rule = self.registry.lookup(tag)?;
                trace!(tag = %tag, args = args.len(), "invoking adapter");
                rule(args).map_err(|source| DecodeError::Adapter {
                    tag: tag.clone(),
                    source,
                })?
            }
            // References never carry an id of their own.
            NodeKind::Reference(id) => return context.resolve(*id),
        };

        if let Some(id) = node.id {
            context.built.insert(id, value.clone());
        }
        Ok(value)
    }

    fn build_all(&self, nodes: &[WireNode], context: &mut Context) -> Result<Vec<Value>, DecodeError> {
        nodes.iter().map(|node| self.build(node, context)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;
    use serde_json::json;

    fn prim(json: serde_json::Value) -> WireNode {
        WireNode::new(NodeKind::Primitive(json))
    }

    fn tagged(tag: &str, args: Vec<WireNode>) -> WireNode {
        WireNode::new(NodeKind::Tagged {
            tag: tag.to_string(),
            args,
        })
    }

    fn reference(id: NodeId) -> WireNode {
        WireNode::new(NodeKind::Reference(id))
    }

    fn pair_registry() -> Registry {
        RegistryBuilder::new()
            .register("Pair", |args| Ok(Value::list(args)))
            .unwrap()
            .freeze()
    }

    #[test]
    fn children_are_built_before_the_parent() {
        let registry = pair_registry();
        let tree = tagged(
            "Pair",
            vec![tagged("Pair", vec![prim(json!(1)), prim(json!(2))]), prim(json!(3))],
        );
        let value = Reconstructor::new(&registry).reconstruct(&tree).unwrap();
        assert_eq!(
            value,
            Value::list(vec![Value::from(vec![1, 2]), Value::from(3)])
        );
    }

    #[test]
    fn reference_to_an_ancestor_is_dangling() {
        let registry = pair_registry();
        let tree = tagged("Pair", vec![reference(0)]).with_id(0);
        let err = Reconstructor::new(&registry).reconstruct(&tree).unwrap_err();
        assert!(matches!(err, DecodeError::DanglingReference(0)));
    }

    #[test]
    fn containers_with_ids_are_shared() {
        let registry = pair_registry();
        let shared = WireNode::new(NodeKind::List(vec![prim(json!("x"))])).with_id(7);
        let tree = WireNode::new(NodeKind::List(vec![shared, reference(7)]));
        let value = Reconstructor::new(&registry).reconstruct(&tree).unwrap();
        let items = value.as_list().unwrap();
        assert!(items[0].same_instance(&items[1]));
    }

    #[test]
    fn contexts_are_not_shared_between_calls() {
        let registry = pair_registry();
        let reconstructor = Reconstructor::new(&registry);
        let defines = tagged("Pair", vec![]).with_id(1);
        reconstructor.reconstruct(&defines).unwrap();

        let err = reconstructor.reconstruct(&reference(1)).unwrap_err();
        assert!(matches!(err, DecodeError::DanglingReference(1)));
    }
}
