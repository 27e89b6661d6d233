use log::{debug, warn};
use statig::blocking::IntoStateMachineExt as _;

use super::config::{AttachError, DeviceConfig};
use super::counters::TouchCounters;
use super::frame::{DispatchContext, FrameEvent, FrameHsm};
use super::sink::EventSink;
use super::store::TouchContact;
use super::types::{FieldDisposition, FieldKind, FramePhase};
use super::usage;

/// Per-device PenMount contact tracker.
///
/// The host delivers fields one at a time, in report order; every call
/// forwards the events it produced to `sink` before returning, so consumers
/// never see a half-updated contact.
pub struct PenMountTouch {
    machine: statig::blocking::StateMachine<FrameHsm>,
    dropped_events: u32,
}

impl PenMountTouch {
    pub fn attach(config: DeviceConfig) -> Result<Self, AttachError> {
        config.validate()?;
        debug!(
            "touch: attach max_contacts={} protocol={:?} frame_timeout_ms={:?}",
            config.max_contacts, config.protocol, config.frame_timeout_ms
        );
        Ok(Self {
            machine: FrameHsm::new(config).state_machine(),
            dropped_events: 0,
        })
    }

    pub fn handle_field<S: EventSink + ?Sized>(
        &mut self,
        now_ms: u64,
        field: FieldKind,
        value: i32,
        sink: &mut S,
    ) -> FieldDisposition {
        self.dispatch(
            FrameEvent::Field {
                now_ms,
                field,
                value,
            },
            sink,
        )
    }

    /// Like [`Self::handle_field`], starting from a raw HID usage code.
    pub fn handle_usage<S: EventSink + ?Sized>(
        &mut self,
        now_ms: u64,
        usage: u32,
        value: i32,
        sink: &mut S,
    ) -> FieldDisposition {
        self.handle_field(now_ms, usage::field_kind(usage), value, sink)
    }

    /// Drives the forced-flush timer. Call periodically while attached.
    pub fn poll<S: EventSink + ?Sized>(&mut self, now_ms: u64, sink: &mut S) {
        let _ = self.dispatch(FrameEvent::Poll { now_ms }, sink);
    }

    pub fn config(&self) -> DeviceConfig {
        self.machine.inner().config
    }

    pub fn phase(&self) -> FramePhase {
        self.machine.inner().phase
    }

    pub fn contacts(&self) -> &[TouchContact] {
        self.machine.inner().store.as_slice()
    }

    pub fn current_slot(&self) -> u8 {
        self.machine.inner().demux.current_slot() as u8
    }

    pub fn primary_slot(&self) -> Option<u8> {
        self.machine
            .inner()
            .emulator
            .primary_slot()
            .map(|slot| slot as u8)
    }

    pub fn counters(&self) -> TouchCounters {
        let mut counters = self.machine.inner().counters;
        counters.dropped_events = self.dropped_events;
        counters
    }

    fn dispatch<S: EventSink + ?Sized>(
        &mut self,
        event: FrameEvent,
        sink: &mut S,
    ) -> FieldDisposition {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        let dropped = context.events.dropped();
        if dropped > 0 {
            warn!("touch: dispatch overflowed; dropped {} event(s)", dropped);
            self.dropped_events = self.dropped_events.saturating_add(dropped as u32);
        }
        context.events.drain_into(sink);
        context.disposition
    }
}
