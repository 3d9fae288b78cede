//! Subcommand nodes and the handler seam.
//!
//! Nodes live in a single arena (`Vec<SubcommandNode>`) owned by the tree;
//! child links are arena indices, so the tree has plain ownership and no
//! reference cycles. Registration happens through [`SubcommandSpec`], an
//! explicit builder collected at startup; there is no runtime introspection.

use crate::context::Context;
use crate::error::HandlerResult;
use crate::param::{ParamSpec, Value};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Index of a node within its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

/// Trait implemented by subcommand handlers.
///
/// The handler body is owned by the registering component. It may suspend
/// (await network I/O, etc.); the resolver core itself never blocks.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Run the subcommand with its converted argument vector.
    async fn run(&self, ctx: &Context<'_>, args: Vec<Value>) -> HandlerResult;
}

/// Handler installed on a synthesized root node. Does nothing.
pub(crate) struct NoopHandler;

#[async_trait]
impl Handler for NoopHandler {
    async fn run(&self, _ctx: &Context<'_>, _args: Vec<Value>) -> HandlerResult {
        Ok(())
    }
}

/// Registration-time description of one subcommand.
///
/// The path is the dot-joined position in the tree (`"config.mail"`); the
/// empty path registers the root/default subcommand. Paths, like lookups,
/// are ASCII case-folded.
pub struct SubcommandSpec {
    pub(crate) path: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) params: Vec<ParamSpec>,
    pub(crate) cooldown: Option<Duration>,
    pub(crate) handler: Arc<dyn Handler>,
}

impl SubcommandSpec {
    /// Describe a subcommand at `path` backed by `handler`.
    pub fn new(path: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        Self {
            path: path.into().to_ascii_lowercase(),
            aliases: Vec::new(),
            params: Vec::new(),
            cooldown: None,
            handler,
        }
    }

    /// Add an alternate short name. Not legal on the root.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into().to_ascii_lowercase());
        self
    }

    /// Append a formal parameter.
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Set a per-user cooldown in seconds.
    pub fn cooldown(mut self, seconds: u64) -> Self {
        self.cooldown = Some(Duration::from_secs(seconds));
        self
    }
}

/// A linked subcommand node. Children are set once by the tree builder and
/// read-only afterwards.
pub struct SubcommandNode {
    /// Dotted path uniquely identifying the node ("" for the root).
    pub path: String,
    /// Last dot segment of the path ("" for the root).
    pub short_name: String,
    /// 0 for the root, otherwise the number of path segments.
    pub depth: u32,
    /// Alternate short names (case-folded).
    pub aliases: Vec<String>,
    /// Ordered formal parameter list.
    pub params: Vec<ParamSpec>,
    /// Per-user cooldown, if declared.
    pub cooldown: Option<Duration>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) handler: Arc<dyn Handler>,
    pub(crate) synthetic: bool,
}

impl SubcommandNode {
    pub(crate) fn from_spec(spec: SubcommandSpec) -> Self {
        let (short_name, depth) = if spec.path.is_empty() {
            (String::new(), 0)
        } else {
            let short = spec.path.rsplit('.').next().unwrap_or(&spec.path).to_string();
            (short, spec.path.split('.').count() as u32)
        };

        Self {
            path: spec.path,
            short_name,
            depth,
            aliases: spec.aliases,
            params: spec.params,
            cooldown: spec.cooldown,
            children: Vec::new(),
            handler: spec.handler,
            synthetic: false,
        }
    }

    pub(crate) fn synthetic_root() -> Self {
        Self {
            path: String::new(),
            short_name: String::new(),
            depth: 0,
            aliases: Vec::new(),
            params: Vec::new(),
            cooldown: None,
            children: Vec::new(),
            handler: Arc::new(NoopHandler),
            synthetic: true,
        }
    }

    /// The dotted path of this node's parent, or `None` for the root.
    pub fn parent_path(&self) -> Option<&str> {
        if self.path.is_empty() {
            return None;
        }
        Some(self.path.rsplit_once('.').map(|(parent, _)| parent).unwrap_or(""))
    }

    /// Whether a case-folded token addresses this node by name or alias.
    pub(crate) fn answers_to(&self, folded: &str) -> bool {
        self.short_name == folded || self.aliases.iter().any(|a| a == folded)
    }

    /// Child ids in registration order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this root was synthesized because no "" node was registered.
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}
