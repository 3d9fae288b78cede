//! One-time assembly of registered subcommands into a linked tree.
//!
//! The builder collects [`SubcommandSpec`]s in registration order and links
//! them in a single pass: every non-root node is attached to the node whose
//! path equals its own minus the last segment. Structural defects (a
//! missing parent, colliding sibling names, an optional parameter that is
//! not last) fail the build loudly; nothing is dropped silently. The one
//! repairable gap is a missing root, which is synthesized as a no-op default
//! with a warning, since a top-level command must always answer a bare
//! invocation.
//!
//! A built [`CommandTree`] is immutable. Re-registration after the build is
//! not an error path; the builder is consumed, so it cannot be expressed.

use crate::convert::ConverterSet;
use crate::error::StructuralError;
use crate::node::{NodeId, SubcommandNode, SubcommandSpec};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Collects subcommand registrations for one top-level command.
#[derive(Default)]
pub struct TreeBuilder {
    specs: Vec<SubcommandSpec>,
}

impl TreeBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one subcommand. Order is preserved through to the tree.
    pub fn subcommand(mut self, spec: SubcommandSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Link the registered nodes into a tree, validating structure against
    /// the converter chain. Consumes the builder.
    pub fn build(self, converters: &ConverterSet) -> Result<CommandTree, StructuralError> {
        let mut nodes: Vec<SubcommandNode> =
            self.specs.into_iter().map(SubcommandNode::from_spec).collect();

        let mut seen = HashSet::new();
        for node in &nodes {
            if !seen.insert(node.path.clone()) {
                return Err(StructuralError::DuplicateNode { path: node.path.clone() });
            }
        }

        let root = match nodes.iter().position(|n| n.path.is_empty()) {
            Some(idx) => idx,
            None => {
                warn!("no default subcommand registered at the root; synthesizing a no-op");
                nodes.push(SubcommandNode::synthetic_root());
                nodes.len() - 1
            }
        };

        for node in &nodes {
            validate_node(node, converters)?;
        }

        // Parent lookup by path string, then a second pass to attach child
        // indices in registration order.
        let index_by_path: HashMap<String, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n.path.clone(), i)).collect();

        let mut links: Vec<(usize, usize)> = Vec::new();
        for (child_idx, node) in nodes.iter().enumerate() {
            let Some(parent_path) = node.parent_path() else { continue };
            let Some(&parent_idx) = index_by_path.get(parent_path) else {
                return Err(StructuralError::MissingParent {
                    path: node.path.clone(),
                    parent: parent_path.to_string(),
                });
            };
            links.push((parent_idx, child_idx));
        }
        for (parent_idx, child_idx) in links {
            nodes[parent_idx].children.push(NodeId(child_idx as u32));
        }

        for node in &nodes {
            let mut names = HashSet::new();
            for &child_id in &node.children {
                let child = &nodes[child_id.0 as usize];
                for name in std::iter::once(&child.short_name).chain(child.aliases.iter()) {
                    if !names.insert(name.clone()) {
                        return Err(StructuralError::DuplicateSibling {
                            parent: node.path.clone(),
                            name: name.clone(),
                        });
                    }
                }
            }
        }

        Ok(CommandTree { nodes, root: NodeId(root as u32) })
    }
}

fn validate_node(node: &SubcommandNode, converters: &ConverterSet) -> Result<(), StructuralError> {
    use crate::param::ParamKind;

    if node.depth == 0 {
        if !node.aliases.is_empty() {
            return Err(StructuralError::RootAlias);
        }
        if !node.params.is_empty() {
            return Err(StructuralError::RootParams);
        }
        return Ok(());
    }

    let last = node.params.len().saturating_sub(1);
    for (i, param) in node.params.iter().enumerate() {
        if param.kind.tail_only() && i != last {
            return Err(StructuralError::MisplacedTail {
                path: node.path.clone(),
                parameter: param.name.clone(),
            });
        }
        let declared = match param.kind {
            ParamKind::Typed(ty) | ParamKind::Optional(ty) => Some(ty),
            ParamKind::Untyped | ParamKind::Greedy => None,
        };
        if let Some(ty) = declared
            && !converters.supports(ty)
        {
            return Err(StructuralError::NoConverter {
                path: node.path.clone(),
                parameter: param.name.clone(),
                expected: ty,
            });
        }
    }

    Ok(())
}

/// The fully linked, read-only subcommand tree for one top-level command.
pub struct CommandTree {
    pub(crate) nodes: Vec<SubcommandNode>,
    pub(crate) root: NodeId,
}

impl std::fmt::Debug for CommandTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTree")
            .field("root", &self.root)
            .field("node_count", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

impl CommandTree {
    /// Id of the root/default node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Borrow a node by id.
    pub fn node(&self, id: NodeId) -> &SubcommandNode {
        &self.nodes[id.0 as usize]
    }

    /// Look a node up by its full dotted path (case-folded).
    pub fn node_by_path(&self, path: &str) -> Option<NodeId> {
        let folded = path.to_ascii_lowercase();
        self.nodes
            .iter()
            .position(|n| n.path == folded)
            .map(|i| NodeId(i as u32))
    }

    /// Number of nodes, counting a synthesized root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes. Never true for a built tree, which
    /// always has at least a root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Handler, NoopHandler};
    use crate::param::{ArgType, ParamSpec};
    use std::sync::Arc;

    fn handler() -> Arc<dyn Handler> {
        Arc::new(NoopHandler)
    }

    fn spec(path: &str) -> SubcommandSpec {
        SubcommandSpec::new(path, handler())
    }

    #[test]
    fn test_build_links_children_in_registration_order() {
        let tree = TreeBuilder::new()
            .subcommand(spec(""))
            .subcommand(spec("a"))
            .subcommand(spec("a.b"))
            .subcommand(spec("a.c"))
            .build(&ConverterSet::builtin())
            .unwrap();

        let root = tree.node(tree.root());
        assert_eq!(root.children().len(), 1);

        let a = tree.node(tree.node_by_path("a").unwrap());
        let names: Vec<_> =
            a.children().iter().map(|&id| tree.node(id).short_name.clone()).collect();
        assert_eq!(names, ["b", "c"]);

        for &child in a.children() {
            assert_eq!(tree.node(child).depth, a.depth + 1);
        }
    }

    #[test]
    fn test_missing_root_is_synthesized() {
        let tree = TreeBuilder::new()
            .subcommand(spec("a"))
            .build(&ConverterSet::builtin())
            .unwrap();

        let root = tree.node(tree.root());
        assert!(root.is_synthetic());
        assert_eq!(root.depth, 0);
        assert!(root.params.is_empty());
        assert!(root.cooldown.is_none());
        assert_eq!(root.children().len(), 1);
    }

    #[test]
    fn test_missing_parent_is_fatal() {
        let err = TreeBuilder::new()
            .subcommand(spec(""))
            .subcommand(spec("a.b"))
            .build(&ConverterSet::builtin())
            .unwrap_err();
        assert_eq!(
            err,
            StructuralError::MissingParent { path: "a.b".into(), parent: "a".into() }
        );
    }

    #[test]
    fn test_alias_collision_with_sibling_name() {
        let err = TreeBuilder::new()
            .subcommand(spec(""))
            .subcommand(spec("foo"))
            .subcommand(spec("bar").alias("foo"))
            .build(&ConverterSet::builtin())
            .unwrap_err();
        assert_eq!(err, StructuralError::DuplicateSibling { parent: "".into(), name: "foo".into() });
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let err = TreeBuilder::new()
            .subcommand(spec("a"))
            .subcommand(spec("A"))
            .build(&ConverterSet::builtin())
            .unwrap_err();
        assert_eq!(err, StructuralError::DuplicateNode { path: "a".into() });
    }

    #[test]
    fn test_root_restrictions() {
        let err = TreeBuilder::new()
            .subcommand(spec("").alias("default"))
            .build(&ConverterSet::builtin())
            .unwrap_err();
        assert_eq!(err, StructuralError::RootAlias);

        let err = TreeBuilder::new()
            .subcommand(spec("").param(ParamSpec::untyped("x")))
            .build(&ConverterSet::builtin())
            .unwrap_err();
        assert_eq!(err, StructuralError::RootParams);
    }

    #[test]
    fn test_tail_only_parameter_placement() {
        let err = TreeBuilder::new()
            .subcommand(
                spec("ban")
                    .param(ParamSpec::greedy("reason"))
                    .param(ParamSpec::untyped("who")),
            )
            .build(&ConverterSet::builtin())
            .unwrap_err();
        assert_eq!(
            err,
            StructuralError::MisplacedTail { path: "ban".into(), parameter: "reason".into() }
        );
    }

    #[test]
    fn test_unsupported_type_rejected_at_build() {
        let chain = ConverterSet::with(vec![Box::new(crate::convert::StrConverter)]).unwrap();
        let err = TreeBuilder::new()
            .subcommand(spec("pay").param(ParamSpec::typed("amount", ArgType::Int)))
            .build(&chain)
            .unwrap_err();
        assert_eq!(
            err,
            StructuralError::NoConverter {
                path: "pay".into(),
                parameter: "amount".into(),
                expected: ArgType::Int,
            }
        );
    }
}
