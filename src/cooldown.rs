//! Per-user cooldown ledger.
//!
//! One entry per (cooldown key, user): the instant of the last recorded
//! invocation. Entries are created on first dispatch, overwritten on later
//! ones and never deleted; expiry is computed from the stored instant, not
//! stored itself. The map is sharded (`dashmap`), so users never contend
//! with each other, and the entry API serializes a same-key check-and-record
//! so two near-simultaneous invocations cannot both slip past the gate.
//!
//! Time is passed explicitly through the `*_at` variants so the arithmetic
//! is testable without sleeping; the plain methods use `Instant::now()`.

use crate::context::UserId;
use crate::error::CooldownError;
use crate::node::NodeId;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::{Duration, Instant};
use tracing::debug;

/// What a ledger entry gates: the whole command, or one subcommand node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownKey {
    /// The command-level cooldown of a top-level command.
    Command,
    /// A per-node cooldown.
    Node(NodeId),
}

/// The cooldown ledger for one top-level command.
#[derive(Debug, Default)]
pub struct CooldownGate {
    ledger: DashMap<(CooldownKey, UserId), Instant>,
}

impl CooldownGate {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `user` may pass `key` with cooldown `window`.
    ///
    /// Allowed when no entry exists or when more than `window` has elapsed
    /// since the recorded instant. Does not record.
    pub fn check(&self, key: CooldownKey, user: UserId, window: Duration) -> Result<(), CooldownError> {
        self.check_at(key, user, window, Instant::now())
    }

    pub(crate) fn check_at(
        &self,
        key: CooldownKey,
        user: UserId,
        window: Duration,
        now: Instant,
    ) -> Result<(), CooldownError> {
        match self.ledger.get(&(key, user)) {
            Some(entry) => {
                let elapsed = now.saturating_duration_since(*entry);
                if elapsed > window {
                    Ok(())
                } else {
                    let remaining = window - elapsed;
                    debug!(?key, %user, remaining_ms = remaining.as_millis() as u64, "cooldown active");
                    Err(CooldownError { remaining })
                }
            }
            None => Ok(()),
        }
    }

    /// Record an invocation for `(key, user)` at the current instant.
    pub fn record(&self, key: CooldownKey, user: UserId) {
        self.record_at(key, user, Instant::now());
    }

    pub(crate) fn record_at(&self, key: CooldownKey, user: UserId, now: Instant) {
        self.ledger.insert((key, user), now);
    }

    /// Atomic check-and-record: passes and records in one step, under the
    /// entry lock for `(key, user)`.
    pub fn try_acquire(
        &self,
        key: CooldownKey,
        user: UserId,
        window: Duration,
    ) -> Result<(), CooldownError> {
        self.try_acquire_at(key, user, window, Instant::now())
    }

    pub(crate) fn try_acquire_at(
        &self,
        key: CooldownKey,
        user: UserId,
        window: Duration,
        now: Instant,
    ) -> Result<(), CooldownError> {
        match self.ledger.entry((key, user)) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.saturating_duration_since(*entry.get());
                if elapsed > window {
                    entry.insert(now);
                    Ok(())
                } else {
                    let remaining = window - elapsed;
                    debug!(?key, %user, remaining_ms = remaining.as_millis() as u64, "cooldown active");
                    Err(CooldownError { remaining })
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                Ok(())
            }
        }
    }

    /// Number of ledger entries.
    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    /// Whether the ledger holds no entries.
    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: UserId = UserId(1);
    const KEY: CooldownKey = CooldownKey::Node(crate::node::NodeId(0));

    #[test]
    fn test_first_call_allowed_then_denied_then_expired() {
        let gate = CooldownGate::new();
        let window = Duration::from_secs(10);
        let t0 = Instant::now();

        assert!(gate.check_at(KEY, USER, window, t0).is_ok());
        gate.record_at(KEY, USER, t0);

        let denied = gate.check_at(KEY, USER, window, t0 + Duration::from_secs(5)).unwrap_err();
        assert_eq!(denied.remaining, Duration::from_secs(5));

        assert!(gate.check_at(KEY, USER, window, t0 + Duration::from_secs(11)).is_ok());
    }

    #[test]
    fn test_boundary_is_exclusive() {
        // allowed only when strictly more than the window has elapsed
        let gate = CooldownGate::new();
        let window = Duration::from_secs(10);
        let t0 = Instant::now();

        gate.record_at(KEY, USER, t0);
        let denied = gate.check_at(KEY, USER, window, t0 + window).unwrap_err();
        assert_eq!(denied.remaining, Duration::ZERO);
    }

    #[test]
    fn test_users_are_independent() {
        let gate = CooldownGate::new();
        let window = Duration::from_secs(10);
        let t0 = Instant::now();

        gate.record_at(KEY, UserId(1), t0);
        assert!(gate.check_at(KEY, UserId(2), window, t0).is_ok());
    }

    #[test]
    fn test_keys_are_independent() {
        let gate = CooldownGate::new();
        let window = Duration::from_secs(10);
        let t0 = Instant::now();

        gate.record_at(CooldownKey::Command, USER, t0);
        assert!(gate.check_at(KEY, USER, window, t0).is_ok());
    }

    #[test]
    fn test_try_acquire_records_on_success() {
        let gate = CooldownGate::new();
        let window = Duration::from_secs(10);
        let t0 = Instant::now();

        assert!(gate.try_acquire_at(KEY, USER, window, t0).is_ok());
        assert!(gate.try_acquire_at(KEY, USER, window, t0 + Duration::from_secs(1)).is_err());
        // A later success overwrites the recorded instant.
        assert!(gate.try_acquire_at(KEY, USER, window, t0 + Duration::from_secs(11)).is_ok());
        let denied =
            gate.try_acquire_at(KEY, USER, window, t0 + Duration::from_secs(12)).unwrap_err();
        assert_eq!(denied.remaining, Duration::from_secs(9));
    }

    #[test]
    fn test_record_overwrites() {
        let gate = CooldownGate::new();
        let t0 = Instant::now();
        gate.record_at(KEY, USER, t0);
        gate.record_at(KEY, USER, t0 + Duration::from_secs(5));
        assert_eq!(gate.len(), 1);
        let denied = gate
            .check_at(KEY, USER, Duration::from_secs(10), t0 + Duration::from_secs(6))
            .unwrap_err();
        assert_eq!(denied.remaining, Duration::from_secs(9));
    }
}
