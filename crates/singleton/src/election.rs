//! Election policies and outcomes

use std::sync::Arc;

use rand::Rng;

use soloist_membership::Member;

/// Pure election function: ordered candidates in, at most one winner out.
///
/// Policies must be deterministic for a given candidate list (except
/// [`RandomPolicy`], which is deliberately not) and side-effect free.
/// `None` is returned only for an empty candidate list.
pub trait ElectionPolicy
where
    Self: Send + Sync + 'static,
{
    /// Elect a member from `candidates`, which are ordered by membership age
    /// (oldest first).
    fn elect(&self, candidates: &[Member]) -> Option<Member>;
}

/// Result of one election run. Transient: broadcast to every member's
/// listeners, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionOutcome {
    /// The candidates of the election, in membership order.
    pub candidates: Vec<Member>,

    /// The elected member, or `None` when quorum was not met or no
    /// candidate existed.
    pub elected: Option<Member>,
}

/// Elects the longest-standing group member: the first candidate, since the
/// candidate list is membership-age ordered.
#[derive(Debug, Clone, Copy, Default)]
pub struct OldestMemberPolicy;

impl ElectionPolicy for OldestMemberPolicy {
    fn elect(&self, candidates: &[Member]) -> Option<Member> {
        candidates.first().cloned()
    }
}

/// Elects the candidate at a fixed position in membership order.
///
/// Negative positions count from the end of the list (`-1` is the youngest
/// member); out-of-range positions wrap.
#[derive(Debug, Clone, Copy)]
pub struct PositionPolicy {
    position: isize,
}

impl PositionPolicy {
    /// Create a policy electing the candidate at `position`.
    #[must_use]
    pub const fn new(position: isize) -> Self {
        Self { position }
    }
}

impl ElectionPolicy for PositionPolicy {
    fn elect(&self, candidates: &[Member]) -> Option<Member> {
        if candidates.is_empty() {
            return None;
        }
        let len = isize::try_from(candidates.len()).ok()?;
        let index = usize::try_from(self.position.rem_euclid(len)).ok()?;
        candidates.get(index).cloned()
    }
}

/// Elects a uniformly random candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl ElectionPolicy for RandomPolicy {
    fn elect(&self, candidates: &[Member]) -> Option<Member> {
        if candidates.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..candidates.len());
        candidates.get(index).cloned()
    }
}

/// Consults an ordered preference list first, delegating to an inner policy
/// when no preferred member is a candidate.
pub struct PreferredPolicy {
    preferred: Vec<Member>,
    fallback: Arc<dyn ElectionPolicy>,
}

impl PreferredPolicy {
    /// Create a policy preferring `preferred` (in order), falling back to
    /// `fallback` when none of them is a candidate.
    pub fn new(preferred: Vec<Member>, fallback: Arc<dyn ElectionPolicy>) -> Self {
        Self {
            preferred,
            fallback,
        }
    }
}

impl ElectionPolicy for PreferredPolicy {
    fn elect(&self, candidates: &[Member]) -> Option<Member> {
        self.preferred
            .iter()
            .find(|preferred| candidates.contains(preferred))
            .cloned()
            .or_else(|| self.fallback.elect(candidates))
    }
}
