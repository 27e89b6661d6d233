use super::config::PENMOUNT_MAX_CONTACTS;

pub const NO_TRACKING_ID: i32 = -1;

/// Per-slot contact record. Fields are mutated in place for the lifetime of
/// the device; records are never created or dropped individually.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchContact {
    pub slot: u8,
    pub tracking_id: i32,
    /// Raw tip signal seen since the last coordinate pair.
    pub touch_pending: bool,
    /// Settled contact state used for emission.
    pub touching: bool,
    pub x: u16,
    pub y: u16,
    /// Last emitted position; `None` until reported for the current contact.
    pub last_x: Option<u16>,
    pub last_y: Option<u16>,
    pub last_state: bool,
    /// Set once the slot reports in the current frame.
    pub updated: bool,
}

impl TouchContact {
    pub const fn new(slot: u8) -> Self {
        Self {
            slot,
            tracking_id: NO_TRACKING_ID,
            touch_pending: false,
            touching: false,
            x: 0,
            y: 0,
            last_x: None,
            last_y: None,
            last_state: false,
            updated: false,
        }
    }

    pub fn has_tracking_id(&self) -> bool {
        self.tracking_id != NO_TRACKING_ID
    }

    /// True when the slot differs from what was last emitted for it.
    /// Coordinates of a released slot are not compared.
    pub fn differs_from_reported(&self) -> bool {
        if self.touching != self.last_state {
            return true;
        }
        self.touching && (self.last_x != Some(self.x) || self.last_y != Some(self.y))
    }
}

#[derive(Clone, Debug)]
pub struct ContactStore {
    contacts: [TouchContact; PENMOUNT_MAX_CONTACTS],
    len: u8,
}

impl ContactStore {
    /// `max_contacts` is clamped to the supported capacity.
    pub fn new(max_contacts: u8) -> Self {
        let mut contacts = [TouchContact::new(0); PENMOUNT_MAX_CONTACTS];
        for (slot, contact) in contacts.iter_mut().enumerate() {
            contact.slot = slot as u8;
        }
        Self {
            contacts,
            len: max_contacts.min(PENMOUNT_MAX_CONTACTS as u8),
        }
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[TouchContact] {
        &self.contacts[..self.len()]
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [TouchContact] {
        let len = self.len();
        &mut self.contacts[..len]
    }

    pub fn get(&self, slot: usize) -> Option<&TouchContact> {
        self.as_slice().get(slot)
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut TouchContact> {
        self.as_mut_slice().get_mut(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TouchContact> {
        self.as_slice().iter()
    }

    pub fn touching_count(&self) -> usize {
        self.iter().filter(|c| c.touching).count()
    }

    /// Some active contact has not reported yet in this frame.
    pub fn frame_incomplete(&self) -> bool {
        self.iter().any(|c| c.touching && !c.updated)
    }

    pub(crate) fn clear_updated(&mut self) {
        for contact in self.as_mut_slice() {
            contact.updated = false;
        }
    }

    /// Drops contacts that stayed touching without reporting this frame.
    /// Each one is handed to `settle` with its tip signal cleared, so the
    /// caller decides what the release emits. Returns how many were released.
    pub(crate) fn release_stale(&mut self, mut settle: impl FnMut(&mut TouchContact)) -> u8 {
        let mut released = 0u8;
        for contact in self.as_mut_slice() {
            if contact.touching && !contact.updated {
                contact.touch_pending = false;
                settle(contact);
                contact.touching = false;
                released = released.saturating_add(1);
            }
        }
        released
    }
}
