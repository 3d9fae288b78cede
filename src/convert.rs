//! The converter chain and the argument conversion pipeline.
//!
//! Converters are atomic: each one claims a single [`ArgType`] and turns the
//! head of a token slice into a [`Value`], reporting how many tokens it
//! consumed. The set is a fixed ordered list scanned linearly for the first
//! type match; no two entries may claim the same type.
//!
//! The pipeline ([`ConverterSet::convert_args`]) maps a node's formal
//! parameter list against the leftover tokens strictly left to right,
//! handling the two tail-only shapes (optional, greedy) itself and
//! delegating atomic conversion to the chain.

use crate::context::{Context, RoleId, UserId};
use crate::error::ConvertError;
use crate::param::{ArgType, ParamKind, ParamSpec, Value};
use tracing::debug;

/// An atomic value converter.
///
/// `convert` receives the tokens from the current cursor onward and returns
/// the produced value plus the number of tokens consumed, or `None` when the
/// head token is not a valid rendering of the claimed type.
pub trait Converter: Send + Sync {
    /// The logical type this converter produces.
    fn arg_type(&self) -> ArgType;

    /// Attempt the conversion. `tokens` is never empty.
    fn convert(&self, tokens: &[&str], ctx: &Context<'_>) -> Option<(Value, usize)>;
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Passes a single token through verbatim.
pub struct StrConverter;

impl Converter for StrConverter {
    fn arg_type(&self) -> ArgType {
        ArgType::Str
    }

    fn convert(&self, tokens: &[&str], _ctx: &Context<'_>) -> Option<(Value, usize)> {
        Some((Value::Str(tokens[0].to_string()), 1))
    }
}

/// Parses a signed decimal integer.
pub struct IntConverter;

impl Converter for IntConverter {
    fn arg_type(&self) -> ArgType {
        ArgType::Int
    }

    fn convert(&self, tokens: &[&str], _ctx: &Context<'_>) -> Option<(Value, usize)> {
        let token = tokens[0];
        let body = token.strip_prefix('-').unwrap_or(token);
        if !is_decimal(body) {
            return None;
        }
        token.parse::<i64>().ok().map(|v| (Value::Int(v), 1))
    }
}

/// Parses a decimal float. The token must contain a `.` so that a plain
/// integer token never converts as a float by accident.
pub struct FloatConverter;

impl Converter for FloatConverter {
    fn arg_type(&self) -> ArgType {
        ArgType::Float
    }

    fn convert(&self, tokens: &[&str], _ctx: &Context<'_>) -> Option<(Value, usize)> {
        let token = tokens[0];
        if !token.contains('.') {
            return None;
        }
        let body = token.strip_prefix('-').unwrap_or(token);
        if !is_decimal(&body.replacen('.', "", 1)) {
            return None;
        }
        token.parse::<f64>().ok().map(|v| (Value::Float(v), 1))
    }
}

/// Resolves a `<@!id>` member mention through the context directory.
///
/// Only the nickname mention form is accepted; a bare `<@id>` is not a
/// member argument.
pub struct MemberConverter;

impl Converter for MemberConverter {
    fn arg_type(&self) -> ArgType {
        ArgType::Member
    }

    fn convert(&self, tokens: &[&str], ctx: &Context<'_>) -> Option<(Value, usize)> {
        let id = tokens[0].strip_prefix("<@!")?.strip_suffix('>')?;
        if !is_decimal(id) {
            return None;
        }
        let member = ctx.directory.member(UserId(id.parse().ok()?))?;
        Some((Value::Member(member), 1))
    }
}

/// Resolves a `<@&id>` role mention through the context directory.
pub struct RoleConverter;

impl Converter for RoleConverter {
    fn arg_type(&self) -> ArgType {
        ArgType::Role
    }

    fn convert(&self, tokens: &[&str], ctx: &Context<'_>) -> Option<(Value, usize)> {
        let id = tokens[0].strip_prefix("<@&")?.strip_suffix('>')?;
        if !is_decimal(id) {
            return None;
        }
        let role = ctx.directory.role(RoleId(id.parse().ok()?))?;
        Some((Value::Role(role), 1))
    }
}

/// The fixed, ordered converter chain.
pub struct ConverterSet {
    converters: Vec<Box<dyn Converter>>,
}

impl ConverterSet {
    /// The built-in chain: string, integer, float, member, role.
    pub fn builtin() -> Self {
        Self {
            converters: vec![
                Box::new(StrConverter),
                Box::new(IntConverter),
                Box::new(FloatConverter),
                Box::new(MemberConverter),
                Box::new(RoleConverter),
            ],
        }
    }

    /// Build a chain from an explicit converter list.
    ///
    /// Fails if two converters claim the same logical type, since the first
    /// match in the linear scan would silently shadow the second.
    pub fn with(
        converters: Vec<Box<dyn Converter>>,
    ) -> Result<Self, crate::error::StructuralError> {
        for (i, c) in converters.iter().enumerate() {
            if converters[..i].iter().any(|o| o.arg_type() == c.arg_type()) {
                return Err(crate::error::StructuralError::DuplicateConverter {
                    expected: c.arg_type(),
                });
            }
        }
        Ok(Self { converters })
    }

    /// Whether some converter in the chain claims `ty`.
    pub fn supports(&self, ty: ArgType) -> bool {
        self.find(ty).is_some()
    }

    fn find(&self, ty: ArgType) -> Option<&dyn Converter> {
        self.converters.iter().find(|c| c.arg_type() == ty).map(|c| c.as_ref())
    }

    /// Map a formal parameter list against leftover tokens, producing one
    /// typed value per parameter.
    ///
    /// Tokens left over after the last parameter are ignored, matching the
    /// behavior chat users rely on when they append commentary to a command.
    pub fn convert_args(
        &self,
        params: &[ParamSpec],
        tokens: &[&str],
        ctx: &Context<'_>,
    ) -> Result<Vec<Value>, ConvertError> {
        let mut out = Vec::with_capacity(params.len());
        let mut cursor = 0usize;

        for param in params {
            match param.kind {
                ParamKind::Untyped => {
                    let Some(token) = tokens.get(cursor) else {
                        return Err(ConvertError::InsufficientArguments {
                            parameter: param.name.clone(),
                        });
                    };
                    out.push(Value::Str((*token).to_string()));
                    cursor += 1;
                }
                ParamKind::Typed(ty) => {
                    if cursor >= tokens.len() {
                        return Err(ConvertError::InsufficientArguments {
                            parameter: param.name.clone(),
                        });
                    }
                    out.push(self.convert_one(param, ty, tokens, &mut cursor, ctx)?);
                }
                ParamKind::Optional(ty) => {
                    if cursor >= tokens.len() {
                        out.push(Value::Absent);
                    } else {
                        out.push(self.convert_one(param, ty, tokens, &mut cursor, ctx)?);
                    }
                }
                ParamKind::Greedy => {
                    // An empty remainder is a missing argument, not an empty
                    // string; optional-at-tail covers the may-be-absent case.
                    if cursor >= tokens.len() {
                        return Err(ConvertError::InsufficientArguments {
                            parameter: param.name.clone(),
                        });
                    }
                    out.push(Value::Str(tokens[cursor..].join(" ")));
                    cursor = tokens.len();
                }
            }
        }

        if cursor < tokens.len() {
            debug!(surplus = tokens.len() - cursor, "ignoring tokens past the last parameter");
        }

        Ok(out)
    }

    fn convert_one(
        &self,
        param: &ParamSpec,
        ty: ArgType,
        tokens: &[&str],
        cursor: &mut usize,
        ctx: &Context<'_>,
    ) -> Result<Value, ConvertError> {
        let token_index = *cursor;
        let mismatch = ConvertError::TypeMismatch {
            parameter: param.name.clone(),
            expected: ty,
            token_index,
        };

        // Tree building rejects parameter types without a converter, so the
        // scan only misses when a caller bypasses the builder.
        let Some(converter) = self.find(ty) else {
            return Err(mismatch);
        };
        match converter.convert(&tokens[token_index..], ctx) {
            Some((value, consumed)) => {
                *cursor += consumed;
                Ok(value)
            }
            None => Err(mismatch),
        }
    }
}
