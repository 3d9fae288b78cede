//! Unified error handling for the resolver core.
//!
//! Structural errors are fatal at freeze time and must abort startup.
//! Everything that can go wrong for a single invocation (no matching
//! subcommand, a token that fails conversion, an active cooldown, a handler
//! failure) is recoverable and surfaced as a discriminated variant of
//! [`DispatchError`]. No failure path ever continues with partial state.

use crate::param::ArgType;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Structural errors (fatal at freeze)
// ============================================================================

/// A defect in the registered command definitions, detected while the tree
/// is built. These abort startup; they are never surfaced to chat users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("subcommand '{path}' has no parent node '{parent}'")]
    MissingParent {
        /// Path of the orphaned node.
        path: String,
        /// The parent path that was looked up and not found.
        parent: String,
    },

    #[error("subcommand '{path}' is registered more than once")]
    DuplicateNode {
        /// The duplicated path.
        path: String,
    },

    #[error("children of '{parent}' share the name or alias '{name}'")]
    DuplicateSibling {
        /// Path of the parent whose children collide ("" for the root).
        parent: String,
        /// The colliding short name or alias.
        name: String,
    },

    #[error("the root subcommand cannot carry aliases")]
    RootAlias,

    #[error("the root subcommand must accept zero arguments")]
    RootParams,

    #[error("parameter '{parameter}' of '{path}' must be the last parameter")]
    MisplacedTail {
        /// Path of the offending node.
        path: String,
        /// Name of the optional/greedy parameter not in tail position.
        parameter: String,
    },

    #[error("parameter '{parameter}' of '{path}' has type {expected} but no registered converter")]
    NoConverter {
        /// Path of the offending node.
        path: String,
        /// Name of the parameter.
        parameter: String,
        /// The logical type no converter claims.
        expected: ArgType,
    },

    #[error("two converters claim the logical type {expected}")]
    DuplicateConverter {
        /// The logical type claimed twice.
        expected: ArgType,
    },

    #[error("'{invoke}' is already a command name or alias")]
    DuplicateInvoke {
        /// The duplicated top-level invoke or alias.
        invoke: String,
    },
}

// ============================================================================
// Per-invocation errors (recoverable)
// ============================================================================

/// Token stream resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No subcommand matched and the root was synthesized, so there is no
    /// default handler to fall back to.
    #[error("no subcommand matches '{token}'")]
    NoMatch {
        /// The first token, which matched nothing.
        token: String,
    },
}

/// Argument conversion failure, with enough detail for the caller to render
/// a usage hint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("token {token_index} is not a valid {expected} for parameter '{parameter}'")]
    TypeMismatch {
        /// Name of the parameter being filled.
        parameter: String,
        /// The logical type the parameter declares.
        expected: ArgType,
        /// Index of the offending token within the leftover token stream.
        token_index: usize,
    },

    #[error("missing argument for parameter '{parameter}'")]
    InsufficientArguments {
        /// Name of the first parameter that received no token.
        parameter: String,
    },
}

/// A cooldown is still active for this (node, user) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("on cooldown for another {}s", remaining.as_secs().max(1))]
pub struct CooldownError {
    /// Time left until the cooldown expires.
    pub remaining: Duration,
}

/// Failure inside a subcommand handler. The handler body is owned by the
/// registering component; its errors pass through opaquely.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler failed: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type returned by subcommand handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Dispatch error (the full per-invocation taxonomy)
// ============================================================================

/// Everything `handle` can report for one invocation.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown command '{invoke}'")]
    UnknownCommand {
        /// The top-level invoke that matched no command or alias.
        invoke: String,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Cooldown(#[from] CooldownError),

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl DispatchError {
    /// Static error code for metrics and log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCommand { .. } => "unknown_command",
            Self::Resolve(_) => "no_match",
            Self::Convert(ConvertError::TypeMismatch { .. }) => "type_mismatch",
            Self::Convert(ConvertError::InsufficientArguments { .. }) => "insufficient_arguments",
            Self::Cooldown(_) => "cooldown",
            Self::Handler(_) => "handler_error",
        }
    }
}
