//! Formal parameter declarations and the typed values produced from them.
//!
//! A subcommand declares an ordered list of [`ParamSpec`]s. At dispatch time
//! the converter pipeline turns leftover tokens into one [`Value`] per
//! parameter. Parameter kinds form a closed enum so the pipeline can match
//! them exhaustively instead of comparing open-ended type tags.

use crate::context::{Member, Role};
use std::fmt;

/// Logical type an atomic converter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
    /// A single whitespace-delimited token, verbatim.
    Str,
    /// A signed decimal integer.
    Int,
    /// A decimal float. The token must contain a `.` to qualify.
    Float,
    /// A chat member, written as a `<@!id>` mention.
    Member,
    /// A chat role, written as a `<@&id>` mention.
    Role,
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Str => "string",
            Self::Int => "integer",
            Self::Float => "float",
            Self::Member => "member",
            Self::Role => "role",
        };
        f.write_str(name)
    }
}

/// Shape of a single formal parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// No declared type: consumes exactly one token verbatim.
    Untyped,
    /// Atomic type, resolved through the converter chain.
    Typed(ArgType),
    /// `T` or absent. Only legal as the last parameter.
    Optional(ArgType),
    /// Consumes every remaining token, joined with single spaces.
    /// Only legal as the last parameter.
    Greedy,
}

impl ParamKind {
    /// Whether this kind may only appear at the end of a parameter list.
    pub fn tail_only(&self) -> bool {
        matches!(self, Self::Optional(_) | Self::Greedy)
    }
}

/// One formal parameter of a subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name, used in diagnostics and usage hints.
    pub name: String,
    /// Parameter shape.
    pub kind: ParamKind,
}

impl ParamSpec {
    /// An untyped parameter: one verbatim token.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: ParamKind::Untyped }
    }

    /// An atomic typed parameter.
    pub fn typed(name: impl Into<String>, ty: ArgType) -> Self {
        Self { name: name.into(), kind: ParamKind::Typed(ty) }
    }

    /// An optional typed parameter (tail position only).
    pub fn optional(name: impl Into<String>, ty: ArgType) -> Self {
        Self { name: name.into(), kind: ParamKind::Optional(ty) }
    }

    /// A greedy spaced-string parameter (tail position only).
    pub fn greedy(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: ParamKind::Greedy }
    }
}

/// A converted argument value handed to a subcommand handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string token, or a greedy join of the trailing tokens.
    Str(String),
    /// A converted integer.
    Int(i64),
    /// A converted float.
    Float(f64),
    /// A resolved chat member.
    Member(Member),
    /// A resolved chat role.
    Role(Role),
    /// An optional tail parameter that received no token.
    Absent,
}

impl Value {
    /// Borrow the inner string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The inner integer, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The inner float, if this is a float value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow the resolved member, if this is a member value.
    pub fn as_member(&self) -> Option<&Member> {
        match self {
            Self::Member(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow the resolved role, if this is a role value.
    pub fn as_role(&self) -> Option<&Role> {
        match self {
            Self::Role(r) => Some(r),
            _ => None,
        }
    }

    /// Whether this is the absent marker for an optional tail parameter.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_only_kinds() {
        assert!(ParamKind::Greedy.tail_only());
        assert!(ParamKind::Optional(ArgType::Int).tail_only());
        assert!(!ParamKind::Untyped.tail_only());
        assert!(!ParamKind::Typed(ArgType::Str).tail_only());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::Str("x".into()).as_str(), Some("x"));
        assert_eq!(Value::Int(7).as_str(), None);
        assert!(Value::Absent.is_absent());
        assert!(!Value::Int(0).is_absent());
    }

    #[test]
    fn test_arg_type_display() {
        assert_eq!(ArgType::Int.to_string(), "integer");
        assert_eq!(ArgType::Member.to_string(), "member");
    }
}
