/// Per-device diagnostic counters. All values saturate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchCounters {
    pub frames_completed: u32,
    /// Frames flushed because a contact reported twice before completion.
    pub wrap_flushes: u32,
    /// Frames flushed by the forced-flush timer.
    pub timeout_flushes: u32,
    pub stale_releases: u32,
    pub ignored_contact_ids: u32,
    pub unhandled_fields: u32,
    pub dropped_events: u32,
}

impl TouchCounters {
    pub(crate) fn bump(counter: &mut u32) {
        *counter = counter.saturating_add(1);
    }

    pub(crate) fn add(counter: &mut u32, amount: u32) {
        *counter = counter.saturating_add(amount);
    }
}
