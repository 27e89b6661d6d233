use super::config::DeviceConfig;
use super::sink::EventSink;
use super::store::{ContactStore, TouchContact};
use super::types::InputEvent;

/// Settles `touching` from the raw tip signal once a coordinate pair is
/// complete. Single-contact panels report slot 0 straight away as a legacy
/// pointer; multi-contact panels defer to the frame normalizer.
pub(crate) fn settle_contact<S: EventSink + ?Sized>(
    config: &DeviceConfig,
    contact: &mut TouchContact,
    sink: &mut S,
) {
    let legacy_pointer = !config.is_multi_touch() && contact.slot == 0;

    if contact.touch_pending != contact.touching {
        contact.touching = contact.touch_pending;
        if legacy_pointer {
            sink.emit(InputEvent::KeyTouch(contact.touching));
        }
    }

    if legacy_pointer {
        sink.emit(InputEvent::PosX(contact.x));
        sink.emit(InputEvent::PosY(contact.y));
        sink.emit(InputEvent::SyncFrame);
    }

    contact.touch_pending = false;
}

/// Single-pointer view of a multi-contact panel.
///
/// The primary contact is re-evaluated on every completed frame: it keeps the
/// role while it stays touching, otherwise the lowest touching slot takes over.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct PointerEmulator {
    primary: Option<usize>,
    touching: bool,
    last_x: Option<u16>,
    last_y: Option<u16>,
}

impl PointerEmulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn primary_slot(&self) -> Option<usize> {
        self.primary
    }

    pub(crate) fn report<S: EventSink + ?Sized>(&mut self, store: &ContactStore, sink: &mut S) {
        let keep = self
            .primary
            .and_then(|slot| store.get(slot))
            .is_some_and(|contact| contact.touching);
        if !keep {
            self.primary = store
                .iter()
                .position(|contact| contact.touching);
        }

        let primary = self.primary.and_then(|slot| store.get(slot));
        let touching = primary.is_some();
        if touching != self.touching {
            self.touching = touching;
            sink.emit(InputEvent::KeyTouch(touching));
        }

        match primary {
            Some(contact) => {
                if self.last_x != Some(contact.x) {
                    self.last_x = Some(contact.x);
                    sink.emit(InputEvent::PosX(contact.x));
                }
                if self.last_y != Some(contact.y) {
                    self.last_y = Some(contact.y);
                    sink.emit(InputEvent::PosY(contact.y));
                }
            }
            None => {
                self.last_x = None;
                self.last_y = None;
            }
        }
    }
}
