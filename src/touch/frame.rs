use log::{debug, trace, warn};
use statig::prelude::*;

use super::config::DeviceConfig;
use super::counters::TouchCounters;
use super::demux::{DemuxStep, FieldDemux};
use super::emulate::{settle_contact, PointerEmulator};
use super::normalize::ProtocolNormalizer;
use super::sink::{EventBuffer, EventSink};
use super::store::ContactStore;
use super::types::{FieldDisposition, FieldKind, FramePhase, InputEvent};

#[derive(Clone, Copy, Debug)]
pub(crate) enum FrameEvent {
    Field {
        now_ms: u64,
        field: FieldKind,
        value: i32,
    },
    Poll {
        now_ms: u64,
    },
}

#[derive(Clone, Debug)]
pub(crate) struct DispatchContext {
    pub(crate) events: EventBuffer,
    pub(crate) disposition: FieldDisposition,
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self {
            events: EventBuffer::new(),
            disposition: FieldDisposition::Consumed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameProgress {
    Unchanged,
    Open,
    Completed,
}

/// Frame completion detector. Owns the whole per-device contact state and
/// drives the normalizer once every active contact has reported.
pub(crate) struct FrameHsm {
    pub(crate) config: DeviceConfig,
    pub(crate) store: ContactStore,
    pub(crate) demux: FieldDemux,
    pub(crate) emulator: PointerEmulator,
    pub(crate) counters: TouchCounters,
    pub(crate) phase: FramePhase,
    normalizer: ProtocolNormalizer,
    frame_started_ms: u64,
}

impl FrameHsm {
    pub(crate) fn new(config: DeviceConfig) -> Self {
        Self {
            config,
            store: ContactStore::new(config.max_contacts),
            demux: FieldDemux::new(),
            emulator: PointerEmulator::new(),
            counters: TouchCounters::default(),
            phase: FramePhase::Idle,
            normalizer: ProtocolNormalizer::new(config.protocol),
            frame_started_ms: 0,
        }
    }

    fn route_field(
        &mut self,
        context: &mut DispatchContext,
        now_ms: u64,
        field: FieldKind,
        value: i32,
    ) -> FrameProgress {
        match self.demux.route(&mut self.store, field, value) {
            DemuxStep::Unhandled => {
                TouchCounters::bump(&mut self.counters.unhandled_fields);
                context.disposition = FieldDisposition::Unhandled;
                FrameProgress::Unchanged
            }
            DemuxStep::IgnoredContactId => {
                TouchCounters::bump(&mut self.counters.ignored_contact_ids);
                trace!("touch: ignored contact id {}", value);
                FrameProgress::Unchanged
            }
            DemuxStep::ContactSelected { slot, wrapped } => {
                if wrapped {
                    // The slot reports again before the previous sweep
                    // completed: a new frame has started.
                    debug!("touch: slot {} wrapped; flushing pending frame", slot);
                    TouchCounters::bump(&mut self.counters.wrap_flushes);
                    if self.frame_timed_out(now_ms) {
                        self.release_stale(context, now_ms);
                    }
                    // A sweep still missing a contact keeps its start time,
                    // so the silent contact times out while others report.
                    if !self.store.frame_incomplete() {
                        self.frame_started_ms = now_ms;
                    }
                    self.emit_frame(context);
                }
                self.demux.select(&mut self.store, slot);
                FrameProgress::Open
            }
            DemuxStep::Accumulated => FrameProgress::Open,
            DemuxStep::PairCompleted { slot } => {
                if let Some(contact) = self.store.get_mut(slot) {
                    settle_contact(&self.config, contact, &mut context.events);
                }
                if self.store.frame_incomplete() {
                    FrameProgress::Open
                } else {
                    self.emit_frame(context);
                    FrameProgress::Completed
                }
            }
        }
    }

    fn emit_frame(&mut self, context: &mut DispatchContext) {
        if self.config.is_multi_touch() {
            self.normalizer.normalize(&mut self.store, &mut context.events);
            self.emulator.report(&self.store, &mut context.events);
            context.events.emit(InputEvent::SyncFrame);
        }
        self.store.clear_updated();
        TouchCounters::bump(&mut self.counters.frames_completed);
        trace!(
            "touch: frame {} touching={} primary={:?}",
            self.counters.frames_completed,
            self.store.touching_count(),
            self.emulator.primary_slot()
        );
    }

    fn frame_timed_out(&self, now_ms: u64) -> bool {
        self.config
            .frame_timeout_ms
            .is_some_and(|timeout| now_ms.saturating_sub(self.frame_started_ms) >= timeout)
    }

    /// Releases touching contacts missing from the open frame. Single-contact
    /// panels report the release on the legacy pointer straight away.
    fn release_stale(&mut self, context: &mut DispatchContext, now_ms: u64) {
        let config = self.config;
        let events = &mut context.events;
        let released = self
            .store
            .release_stale(|contact| settle_contact(&config, contact, &mut *events));
        if released > 0 {
            warn!(
                "touch: released {} stale contact(s) after {} ms",
                released,
                now_ms.saturating_sub(self.frame_started_ms)
            );
            TouchCounters::add(&mut self.counters.stale_releases, released as u32);
        }
    }

    fn force_flush(&mut self, context: &mut DispatchContext, now_ms: u64) {
        self.release_stale(context, now_ms);
        debug!("touch: frame timeout; forcing flush");
        TouchCounters::bump(&mut self.counters.timeout_flushes);
        self.emit_frame(context);
    }
}

#[state_machine(initial = "State::idle()")]
impl FrameHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &FrameEvent) -> Outcome<State> {
        match event {
            FrameEvent::Field {
                now_ms,
                field,
                value,
            } => match self.route_field(context, *now_ms, *field, *value) {
                FrameProgress::Open => {
                    self.frame_started_ms = *now_ms;
                    self.phase = FramePhase::AccumulatingFrame;
                    Transition(State::accumulating())
                }
                FrameProgress::Unchanged | FrameProgress::Completed => Handled,
            },
            FrameEvent::Poll { .. } => Handled,
        }
    }

    #[state]
    fn accumulating(
        &mut self,
        context: &mut DispatchContext,
        event: &FrameEvent,
    ) -> Outcome<State> {
        match event {
            FrameEvent::Field {
                now_ms,
                field,
                value,
            } => match self.route_field(context, *now_ms, *field, *value) {
                FrameProgress::Completed => {
                    self.phase = FramePhase::Idle;
                    Transition(State::idle())
                }
                FrameProgress::Unchanged | FrameProgress::Open => Handled,
            },
            FrameEvent::Poll { now_ms } => {
                if !self.frame_timed_out(*now_ms) {
                    return Handled;
                }
                self.force_flush(context, *now_ms);
                self.phase = FramePhase::Idle;
                Transition(State::idle())
            }
        }
    }
}
