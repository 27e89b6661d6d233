use super::store::ContactStore;
use super::types::FieldKind;

/// What the frame detector has to do after a field was routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DemuxStep {
    Unhandled,
    IgnoredContactId,
    /// A valid contact identifier arrived. Nothing is mutated yet; `wrapped`
    /// means the slot already reported in the pending frame.
    ContactSelected { slot: usize, wrapped: bool },
    Accumulated,
    /// The selected contact finished its coordinate pair.
    PairCompleted { slot: usize },
}

/// Routes field updates to the contact picked by the last contact identifier.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FieldDemux {
    current: usize,
}

impl FieldDemux {
    pub(crate) fn new() -> Self {
        Self { current: 0 }
    }

    pub(crate) fn current_slot(&self) -> usize {
        self.current
    }

    pub(crate) fn route(&self, store: &mut ContactStore, field: FieldKind, value: i32) -> DemuxStep {
        if let FieldKind::ContactIdentifier = field {
            let Ok(slot) = usize::try_from(value) else {
                return DemuxStep::IgnoredContactId;
            };
            return match store.get(slot) {
                Some(contact) => DemuxStep::ContactSelected {
                    slot,
                    wrapped: contact.updated,
                },
                None => DemuxStep::IgnoredContactId,
            };
        }

        let slot = self.current;
        let Some(contact) = store.get_mut(slot) else {
            return DemuxStep::Unhandled;
        };
        match field {
            FieldKind::Touch => {
                contact.touch_pending = value != 0;
                DemuxStep::Accumulated
            }
            FieldKind::CoordinateX => {
                contact.x = clamp_coordinate(value);
                DemuxStep::Accumulated
            }
            FieldKind::CoordinateY => {
                contact.y = clamp_coordinate(value);
                contact.updated = true;
                DemuxStep::PairCompleted { slot }
            }
            FieldKind::ContactIdentifier | FieldKind::Other(_) => DemuxStep::Unhandled,
        }
    }

    /// Points field routing at `slot` and marks it as reported in this frame.
    pub(crate) fn select(&mut self, store: &mut ContactStore, slot: usize) {
        if let Some(contact) = store.get_mut(slot) {
            contact.updated = true;
            self.current = slot;
        }
    }
}

fn clamp_coordinate(value: i32) -> u16 {
    value.clamp(0, u16::MAX as i32) as u16
}
