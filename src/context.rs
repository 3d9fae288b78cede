//! Dispatch context and host-client collaborator interfaces.
//!
//! The resolver core never talks to a chat network itself. Everything it
//! needs from the host client (who invoked the command, and how to turn a
//! mention into a member or role object) arrives through [`Context`],
//! constructed once per invocation by the dispatch layer and threaded through
//! explicitly. There are no global singletons to look things up in.

use std::fmt;

/// Unique id of a chat user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique id of a chat role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleId(pub u64);

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A member of the channel/guild the command was invoked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// The member's user id.
    pub id: UserId,
    /// Display name as the host client knows it.
    pub display_name: String,
}

/// A role defined in the channel/guild the command was invoked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// The role id.
    pub id: RoleId,
    /// Role name as the host client knows it.
    pub name: String,
}

/// Identity lookups backed by the host chat client.
///
/// Mention converters resolve ids through this interface. An id the
/// directory does not know is a conversion failure, not a panic.
pub trait Directory: Send + Sync {
    /// Look up a member by user id in the current scope.
    fn member(&self, id: UserId) -> Option<Member>;

    /// Look up a role by id in the current scope.
    fn role(&self, id: RoleId) -> Option<Role>;
}

/// A directory that knows nobody. Useful when no mention-typed parameters
/// are registered, and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyDirectory;

impl Directory for EmptyDirectory {
    fn member(&self, _id: UserId) -> Option<Member> {
        None
    }

    fn role(&self, _id: RoleId) -> Option<Role> {
        None
    }
}

/// Per-invocation context handed to converters and handlers.
pub struct Context<'a> {
    /// The invoking user.
    pub user: UserId,
    /// Language tag resolved by the caller (string lookup is external).
    pub lang: &'a str,
    /// Host-client identity lookups.
    pub directory: &'a dyn Directory,
}

impl<'a> Context<'a> {
    /// Create a context for one invocation.
    pub fn new(user: UserId, lang: &'a str, directory: &'a dyn Directory) -> Self {
        Self { user, lang, directory }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_directory() {
        let dir = EmptyDirectory;
        assert!(dir.member(UserId(1)).is_none());
        assert!(dir.role(RoleId(1)).is_none());
    }

    #[test]
    fn test_ids_display() {
        assert_eq!(UserId(42).to_string(), "42");
        assert_eq!(RoleId(7).to_string(), "7");
    }
}
