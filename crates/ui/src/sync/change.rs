use murmur_core::Entry;
use std::sync::Arc;

/// Ordered entries captured at one evaluation pass
///
/// Immutable once taken; cloning shares the underlying slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot(Arc<[Entry]>);

impl Snapshot {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self(entries.into())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Entry> {
        self.0.last()
    }
}

impl From<Vec<Entry>> for Snapshot {
    fn from(entries: Vec<Entry>) -> Self {
        Self::new(entries)
    }
}

/// Outcome of comparing two consecutive snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeReport {
    /// The current snapshot has more entries than the previous one
    pub grew: bool,
    /// Some paired index changed its id or title
    pub updated: bool,
    /// Lowest paired index that differs, if any
    pub first_changed: Option<usize>,
}

impl ChangeReport {
    pub fn should_scroll(&self) -> bool {
        self.grew || self.updated
    }
}

/// Compare two snapshots position by position
///
/// Index `i` of `previous` is paired with index `i` of `current`; a different
/// id or title at the same index counts as an update. Entries are never
/// matched by id across positions, so a reorder of identical content reads as
/// unchanged.
pub fn compare(previous: &[Entry], current: &[Entry]) -> ChangeReport {
    let first_changed = previous
        .iter()
        .zip(current)
        .position(|(before, after)| before.id != after.id || before.title != after.title);

    ChangeReport { grew: current.len() > previous.len(), updated: first_changed.is_some(), first_changed }
}

/// Remembers the previous pass's snapshot and reports what changed since
#[derive(Debug, Default)]
pub struct ChangeDetector {
    previous: Snapshot,
    passes: u64,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known snapshot instead of the empty list
    pub fn with_baseline(previous: Snapshot) -> Self {
        Self { previous, passes: 0 }
    }

    /// Compare `current` against the previous pass, then adopt it
    ///
    /// The replacement happens whether or not a change was found, so every
    /// pass is compared exactly once.
    pub fn observe(&mut self, current: Snapshot) -> ChangeReport {
        let report = compare(self.previous.entries(), current.entries());
        self.previous = current;
        self.passes += 1;

        if report.should_scroll() {
            tracing::trace!(
                pass = self.passes,
                grew = report.grew,
                first_changed = ?report.first_changed,
                "transcript changed"
            );
        }

        report
    }

    pub fn previous(&self) -> &Snapshot {
        &self.previous
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }
}
