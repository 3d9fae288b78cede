//! The frozen dispatch engine: top-level command registry and the full
//! per-invocation pipeline.
//!
//! [`EngineBuilder`] collects command definitions at startup; `freeze()`
//! builds and validates every subcommand tree and returns the immutable
//! [`Engine`]. Because the builder is consumed, registration after freeze is
//! not representable. The engine is `&self` throughout and safe to share
//! behind an `Arc`; the only mutable state it touches is the cooldown ledger
//! and the per-command usage counters.
//!
//! Dispatch order per invocation: resolve the token stream to the deepest
//! node, gate on the chain parent's cooldown, convert arguments, run the
//! handler, then record the resolved node's cooldown. The command-level
//! cooldown is an atomic check-and-record up front.

use crate::config::EngineConfig;
use crate::context::{Context, UserId};
use crate::convert::ConverterSet;
use crate::cooldown::{CooldownGate, CooldownKey};
use crate::error::{DispatchError, StructuralError};
use crate::tree::{CommandTree, TreeBuilder};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Top-level definition of one command: its invoke name, aliases and an
/// optional command-wide cooldown.
pub struct CommandDef {
    invoke: String,
    aliases: Vec<String>,
    cooldown: Option<Duration>,
}

impl CommandDef {
    /// Define a command addressed by `invoke` (case-folded).
    pub fn new(invoke: impl Into<String>) -> Self {
        Self { invoke: invoke.into().to_ascii_lowercase(), aliases: Vec::new(), cooldown: None }
    }

    /// Add an alternate invoke name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into().to_ascii_lowercase());
        self
    }

    /// Set a per-user cooldown in seconds covering the whole command.
    pub fn cooldown(mut self, seconds: u64) -> Self {
        self.cooldown = Some(Duration::from_secs(seconds));
        self
    }
}

struct CommandEntry {
    def: CommandDef,
    tree: CommandTree,
    gate: CooldownGate,
    hits: AtomicU64,
}

/// Collects command registrations before the engine is frozen.
pub struct EngineBuilder {
    config: EngineConfig,
    converters: ConverterSet,
    commands: Vec<(CommandDef, TreeBuilder)>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    /// A builder with the default config and the built-in converter chain.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            converters: ConverterSet::builtin(),
            commands: Vec::new(),
        }
    }

    /// Replace the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the converter chain.
    pub fn with_converters(mut self, converters: ConverterSet) -> Self {
        self.converters = converters;
        self
    }

    /// Register one top-level command and its subcommand tree.
    pub fn command(mut self, def: CommandDef, tree: TreeBuilder) -> Self {
        self.commands.push((def, tree));
        self
    }

    /// Build and validate every tree, consuming the builder.
    ///
    /// Any [`StructuralError`] here means the command definitions are
    /// invalid; the caller must abort startup rather than continue with a
    /// partial registry.
    pub fn freeze(self) -> Result<Engine, StructuralError> {
        let mut commands: Vec<CommandEntry> = Vec::with_capacity(self.commands.len());
        let mut index = HashMap::new();

        for (def, builder) in self.commands {
            let tree = builder.build(&self.converters)?;

            for name in std::iter::once(&def.invoke).chain(def.aliases.iter()) {
                if index.insert(name.clone(), commands.len()).is_some() {
                    return Err(StructuralError::DuplicateInvoke { invoke: name.clone() });
                }
            }

            info!(invoke = %def.invoke, nodes = tree.len(), "registered command");
            commands.push(CommandEntry { def, tree, gate: CooldownGate::new(), hits: AtomicU64::new(0) });
        }

        Ok(Engine { config: self.config, converters: self.converters, commands, index })
    }
}

/// The immutable serving-phase dispatcher.
pub struct Engine {
    config: EngineConfig,
    converters: ConverterSet,
    commands: Vec<CommandEntry>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("command_count", &self.commands.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Start building an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Borrow the subcommand tree of a command by invoke or alias.
    pub fn tree(&self, invoke: &str) -> Option<&CommandTree> {
        let folded = invoke.to_ascii_lowercase();
        self.index.get(&folded).map(|&idx| &self.commands[idx].tree)
    }

    /// Handle one raw chat line: strip a configured prefix, split on
    /// whitespace, and dispatch. Returns `Ok(false)` when the line does not
    /// address the bot at all.
    pub async fn dispatch_line(
        &self,
        line: &str,
        user: UserId,
        ctx: &Context<'_>,
    ) -> Result<bool, DispatchError> {
        let Some(rest) = self.config.prefixes.iter().find_map(|p| line.strip_prefix(p.as_str()))
        else {
            return Ok(false);
        };
        let mut parts = rest.split_whitespace();
        let Some(invoke) = parts.next() else {
            return Ok(false);
        };
        let tokens: Vec<&str> = parts.collect();
        self.handle(invoke, &tokens, user, ctx).await.map(|()| true)
    }

    /// Resolve, convert and dispatch one invocation of `invoke`.
    pub async fn handle(
        &self,
        invoke: &str,
        tokens: &[&str],
        user: UserId,
        ctx: &Context<'_>,
    ) -> Result<(), DispatchError> {
        let folded = invoke.to_ascii_lowercase();
        let Some(&idx) = self.index.get(&folded) else {
            return Err(DispatchError::UnknownCommand { invoke: invoke.to_string() });
        };
        let entry = &self.commands[idx];
        entry.hits.fetch_add(1, Ordering::Relaxed);

        let result = self.dispatch(entry, tokens, user, ctx).await;
        if let Err(ref err) = result {
            debug!(invoke = %folded, code = err.error_code(), "dispatch failed");
        }
        result
    }

    async fn dispatch(
        &self,
        entry: &CommandEntry,
        tokens: &[&str],
        user: UserId,
        ctx: &Context<'_>,
    ) -> Result<(), DispatchError> {
        if let Some(window) = entry.def.cooldown {
            entry.gate.try_acquire(CooldownKey::Command, user, window)?;
        }

        let resolution = entry.tree.resolve(tokens)?;

        // The gate checks the previous node in the descent chain, not the
        // node about to run: a subtree you just invoked stays closed until
        // its cooldown expires, while the resolved node itself only records.
        if let Some(parent) = resolution.chain_parent
            && let Some(window) = entry.tree.node(parent).cooldown
        {
            entry.gate.check(CooldownKey::Node(parent), user, window)?;
        }

        let node = entry.tree.node(resolution.node);
        let args =
            self.converters.convert_args(&node.params, &tokens[resolution.remaining_from..], ctx)?;

        node.handler.run(ctx, args).await?;

        if node.cooldown.is_some() {
            entry.gate.record(CooldownKey::Node(resolution.node), user);
        }
        Ok(())
    }

    /// Per-invoke usage counters, most used first. Commands never invoked
    /// are omitted.
    pub fn command_stats(&self) -> Vec<(String, u64)> {
        let mut stats: Vec<_> = self
            .commands
            .iter()
            .map(|entry| (entry.def.invoke.clone(), entry.hits.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1));
        stats
    }
}
