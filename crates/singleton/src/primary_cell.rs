//! Single-slot cell holding the latest known primary

use arc_swap::ArcSwapOption;
use std::sync::Arc;

use soloist_membership::Member;

/// Thread-safe single-slot cell for the latest known primary member.
///
/// The cell starts empty, meaning "unknown / no election outcome delivered
/// yet", and is overwritten by each `ElectionNotify` delivery. Readers get
/// the last installed value without blocking writers.
#[derive(Debug, Default)]
pub struct PrimaryCell {
    slot: ArcSwapOption<Member>,
}

impl PrimaryCell {
    /// Create an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest known primary, or `None` when unknown or none elected.
    #[must_use]
    pub fn get(&self) -> Option<Member> {
        self.slot.load_full().map(|member| (*member).clone())
    }

    /// Install a new value, replacing the previous one.
    pub fn set(&self, primary: Option<Member>) {
        self.slot.store(primary.map(Arc::new));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(PrimaryCell::new().get(), None);
    }

    #[test]
    fn test_set_and_get() {
        let cell = PrimaryCell::new();
        cell.set(Some(Member::new("node-a")));
        assert_eq!(cell.get(), Some(Member::new("node-a")));

        cell.set(None);
        assert_eq!(cell.get(), None);
    }
}
