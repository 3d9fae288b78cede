//! Runtime descent of a token stream down the subcommand tree.
//!
//! Resolution is a greedy walk with one token of lookahead: a matched child
//! is only descended *through* when the next token also names one of its
//! children, so the deepest reachable node always wins. A token that names
//! no child is the ambiguity case: it is the first argument of the node
//! matched so far and is pushed back onto the remainder.
//!
//! Resolution is pure: no state is read besides the immutable tree, and the
//! same token list always resolves identically.

use crate::error::ResolveError;
use crate::node::NodeId;
use crate::tree::CommandTree;
use tracing::debug;

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The deepest matching node.
    pub node: NodeId,
    /// Index of the first token left for the argument list. Tokens at
    /// `tokens[remaining_from..]` were not consumed by the descent.
    pub remaining_from: usize,
    /// The last node descended *through* to reach `node`, its parent in
    /// the descent chain. `None` when resolution ended at depth one or at
    /// the root. The cooldown gate checks this node, not `node` itself.
    pub chain_parent: Option<NodeId>,
}

impl CommandTree {
    /// Walk `tokens` to the deepest matching subcommand.
    ///
    /// An empty token list resolves to the root, which accepts zero
    /// arguments by construction. A first token that names no child of the
    /// root falls back to the root's own argument list when a real default
    /// handler was registered, and is a [`ResolveError::NoMatch`] when the
    /// root was synthesized.
    pub fn resolve(&self, tokens: &[&str]) -> Result<Resolution, ResolveError> {
        if tokens.is_empty() {
            return Ok(Resolution { node: self.root, remaining_from: 0, chain_parent: None });
        }

        let mut current = self.root;
        let mut chain: Option<NodeId> = None;
        let mut pos = 0usize;

        loop {
            let folded = tokens[pos].to_ascii_lowercase();
            let matched = self
                .node(current)
                .children()
                .iter()
                .copied()
                .find(|&id| self.node(id).answers_to(&folded));

            let Some(child) = matched else {
                if current == self.root && self.node(self.root).is_synthetic() {
                    return Err(ResolveError::NoMatch { token: tokens[pos].to_string() });
                }
                // The token belongs to the current node's argument list;
                // push it back onto the remainder.
                debug!(
                    path = %self.node(current).path,
                    token = tokens[pos],
                    "token is not a deeper subcommand, treating as argument"
                );
                return Ok(Resolution { node: current, remaining_from: pos, chain_parent: chain });
            };

            // Lookahead compares children's short names only; aliases do not
            // pull the walk a level deeper.
            let descend = match tokens.get(pos + 1) {
                Some(next) => {
                    let next_folded = next.to_ascii_lowercase();
                    self.node(child)
                        .children()
                        .iter()
                        .any(|&id| self.node(id).short_name == next_folded)
                }
                None => false,
            };

            if descend {
                chain = Some(child);
                current = child;
                pos += 1;
            } else {
                return Ok(Resolution {
                    node: child,
                    remaining_from: pos + 1,
                    chain_parent: chain,
                });
            }
        }
    }
}
