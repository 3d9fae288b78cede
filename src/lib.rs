//! # trellis
//!
//! A hierarchical chat command resolver with typed argument conversion.
//!
//! Subcommands are registered under dot-joined paths (`"config.mail.spam"`)
//! belonging to one top-level command. At startup the registrations are
//! linked into a prefix tree; at invocation time a token stream is walked
//! greedily down that tree to the deepest matching node, the leftover tokens
//! are converted into strongly typed arguments through an ordered converter
//! chain, a per-user cooldown is enforced, and the node's async handler runs.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use trellis::{
//!     ArgType, CommandDef, Context, Engine, EmptyDirectory, Handler, HandlerResult,
//!     ParamSpec, SubcommandSpec, TreeBuilder, UserId, Value,
//! };
//!
//! struct Echo;
//!
//! #[async_trait::async_trait]
//! impl Handler for Echo {
//!     async fn run(&self, _ctx: &Context<'_>, _args: Vec<Value>) -> HandlerResult {
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let engine = Engine::builder()
//!     .command(
//!         CommandDef::new("tag").alias("t"),
//!         TreeBuilder::new()
//!             .subcommand(SubcommandSpec::new("", Arc::new(Echo)))
//!             .subcommand(
//!                 SubcommandSpec::new("add", Arc::new(Echo))
//!                     .param(ParamSpec::typed("name", ArgType::Str))
//!                     .param(ParamSpec::greedy("body")),
//!             ),
//!     )
//!     .freeze()
//!     .expect("valid command definitions");
//!
//! let directory = EmptyDirectory;
//! let ctx = Context::new(UserId(1), "en", &directory);
//! engine
//!     .handle("tag", &["add", "greet", "hello", "world"], UserId(1), &ctx)
//!     .await
//!     .expect("dispatch succeeds");
//! # }
//! ```
//!
//! The build phase and the serving phase are distinct types: the builders
//! are consumed by `freeze()`, and the resulting [`Engine`] is immutable and
//! freely shareable across tasks. Permission checks, string translation and
//! the network event loop are the caller's business; this crate begins at a
//! token stream and ends at a handler invocation.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod convert;
pub mod cooldown;
pub mod engine;
pub mod error;
pub mod node;
pub mod param;
pub mod resolve;
pub mod tree;

pub use self::config::{ConfigError, EngineConfig};
pub use self::context::{Context, Directory, EmptyDirectory, Member, Role, RoleId, UserId};
pub use self::convert::{
    Converter, ConverterSet, FloatConverter, IntConverter, MemberConverter, RoleConverter,
    StrConverter,
};
pub use self::cooldown::{CooldownGate, CooldownKey};
pub use self::engine::{CommandDef, Engine, EngineBuilder};
pub use self::error::{
    ConvertError, CooldownError, DispatchError, HandlerError, HandlerResult, ResolveError,
    StructuralError,
};
pub use self::node::{Handler, NodeId, SubcommandNode, SubcommandSpec};
pub use self::param::{ArgType, ParamKind, ParamSpec, Value};
pub use self::resolve::Resolution;
pub use self::tree::{CommandTree, TreeBuilder};
