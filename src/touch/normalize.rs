use super::config::{PENMOUNT_TOUCH_MAJOR, PENMOUNT_TRACKING_ID_MASK};
use super::sink::EventSink;
use super::store::{ContactStore, TouchContact, NO_TRACKING_ID};
use super::types::{InputEvent, ProtocolMode};

/// Turns a completed frame of contact records into the multi-touch event
/// sequence of the configured protocol.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ProtocolNormalizer {
    protocol: ProtocolMode,
    tracking_id_counter: u32,
}

impl ProtocolNormalizer {
    pub(crate) fn new(protocol: ProtocolMode) -> Self {
        Self {
            protocol,
            tracking_id_counter: 0,
        }
    }

    pub(crate) fn normalize<S: EventSink + ?Sized>(
        &mut self,
        store: &mut ContactStore,
        sink: &mut S,
    ) {
        match self.protocol {
            ProtocolMode::AnonymousContact => report_anonymous(store, sink),
            ProtocolMode::PersistentSlot => {
                for contact in store.as_mut_slice() {
                    self.report_slot(contact, sink);
                }
            }
        }
    }

    fn next_tracking_id(&mut self) -> i32 {
        let id = (self.tracking_id_counter & PENMOUNT_TRACKING_ID_MASK) as i32;
        self.tracking_id_counter = self.tracking_id_counter.wrapping_add(1);
        id
    }

    fn report_slot<S: EventSink + ?Sized>(&mut self, contact: &mut TouchContact, sink: &mut S) {
        if !contact.differs_from_reported() {
            return;
        }

        let slot = contact.slot;
        sink.emit(InputEvent::SlotState {
            slot,
            touching: contact.touching,
        });

        if contact.touching {
            if !contact.has_tracking_id() {
                contact.tracking_id = self.next_tracking_id();
                sink.emit(InputEvent::TrackingId {
                    slot,
                    id: contact.tracking_id,
                });
            }
            if contact.last_x != Some(contact.x) {
                sink.emit(InputEvent::PosXSlot {
                    slot,
                    value: contact.x,
                });
                contact.last_x = Some(contact.x);
            }
            if contact.last_y != Some(contact.y) {
                sink.emit(InputEvent::PosYSlot {
                    slot,
                    value: contact.y,
                });
                contact.last_y = Some(contact.y);
            }
        } else {
            if contact.has_tracking_id() {
                contact.tracking_id = NO_TRACKING_ID;
                sink.emit(InputEvent::TrackingId {
                    slot,
                    id: NO_TRACKING_ID,
                });
            }
            // The next tracking id starts a new contact, which reports its
            // full position.
            contact.last_x = None;
            contact.last_y = None;
        }
        contact.last_state = contact.touching;
    }
}

fn report_anonymous<S: EventSink + ?Sized>(store: &ContactStore, sink: &mut S) {
    let mut reported = 0usize;
    for contact in store.iter().filter(|c| c.touching) {
        sink.emit(InputEvent::TouchMajor(PENMOUNT_TOUCH_MAJOR));
        sink.emit(InputEvent::PosXSlot {
            slot: contact.slot,
            value: contact.x,
        });
        sink.emit(InputEvent::PosYSlot {
            slot: contact.slot,
            value: contact.y,
        });
        sink.emit(InputEvent::ContactSync);
        reported += 1;
    }
    if reported == 0 {
        sink.emit(InputEvent::ContactSync);
    }
}
