//! Parser limits and policies.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default cap on simultaneously live stack versions.
pub const DEFAULT_MAX_VERSIONS: usize = 6;

/// Tie-breaker between stack versions with equal error cost and dynamic
/// precedence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Keep the derivation that took the earlier table action at the point
    /// where the versions diverged.
    #[default]
    FirstDeclared,
    /// Keep the derivation that took the later one.
    LastDeclared,
}

/// Shared flag a caller flips to stop a running parse.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for a [`Parser`](crate::Parser).
///
/// ```
/// use weft_runtime::ParseOptions;
///
/// let options = ParseOptions::new().exec_fuel(100_000).max_versions(4);
/// assert_eq!(options.get_exec_fuel(), Some(100_000));
/// ```
#[derive(Clone, Debug)]
pub struct ParseOptions {
    pub(crate) exec_fuel: Option<u64>,
    pub(crate) max_versions: usize,
    pub(crate) conflict_policy: ConflictPolicy,
    pub(crate) cancellation: Option<CancellationFlag>,
    pub(crate) reuse: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            exec_fuel: None,
            max_versions: DEFAULT_MAX_VERSIONS,
            conflict_policy: ConflictPolicy::default(),
            cancellation: None,
            reuse: true,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound on parser actions (shifts, reductions, lexed tokens and
    /// recovery steps). Unlimited by default.
    pub fn exec_fuel(mut self, fuel: u64) -> Self {
        self.exec_fuel = Some(fuel);
        self
    }

    pub fn max_versions(mut self, max: usize) -> Self {
        self.max_versions = max.max(1);
        self
    }

    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Whether [`Parser::reparse`](crate::Parser::reparse) reuses nodes of
    /// the previous tree. Without reuse it parses from scratch.
    pub fn reuse(mut self, enabled: bool) -> Self {
        self.reuse = enabled;
        self
    }

    pub fn get_exec_fuel(&self) -> Option<u64> {
        self.exec_fuel
    }

    pub fn get_max_versions(&self) -> usize {
        self.max_versions
    }

    pub fn get_conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy
    }
}
