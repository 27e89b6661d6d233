use hidtouch::touch::usage::{HID_DG_CONTACTID, HID_DG_TIPSWITCH, HID_GD_X, HID_GD_Y};
use hidtouch::{
    DeviceConfig, EventBuffer, EventSink, FieldKind, FramePhase, InputEvent, PenMountTouch,
    ProtocolMode,
};

#[derive(Default)]
struct Recorder {
    events: Vec<InputEvent>,
}

impl EventSink for Recorder {
    fn emit(&mut self, event: InputEvent) {
        self.events.push(event);
    }
}

impl Recorder {
    fn take(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }
}

fn contact_report(
    engine: &mut PenMountTouch,
    sink: &mut Recorder,
    now_ms: u64,
    id: i32,
    tip: bool,
    x: i32,
    y: i32,
) {
    engine.handle_usage(now_ms, HID_DG_CONTACTID, id, sink);
    engine.handle_usage(now_ms, HID_DG_TIPSWITCH, tip as i32, sink);
    engine.handle_usage(now_ms, HID_GD_X, x, sink);
    engine.handle_usage(now_ms, HID_GD_Y, y, sink);
}

fn persistent_slot_panel() -> PenMountTouch {
    PenMountTouch::attach(DeviceConfig::multi_touch(ProtocolMode::PersistentSlot))
        .expect("two-contact config is valid")
}

#[test]
fn single_contact_press() {
    let mut engine = PenMountTouch::attach(DeviceConfig::single_touch()).expect("valid config");
    let mut sink = Recorder::default();

    engine.handle_field(0, FieldKind::Touch, 1, &mut sink);
    engine.handle_field(0, FieldKind::CoordinateX, 100, &mut sink);
    engine.handle_field(0, FieldKind::CoordinateY, 200, &mut sink);

    assert_eq!(
        sink.take(),
        vec![
            InputEvent::KeyTouch(true),
            InputEvent::PosX(100),
            InputEvent::PosY(200),
            InputEvent::SyncFrame,
        ]
    );
}

#[test]
fn two_contacts_touch_down() {
    let mut engine = persistent_slot_panel();
    let mut sink = Recorder::default();

    contact_report(&mut engine, &mut sink, 0, 0, true, 10, 10);
    contact_report(&mut engine, &mut sink, 0, 1, true, 20, 20);
    contact_report(&mut engine, &mut sink, 8, 0, true, 10, 10);
    contact_report(&mut engine, &mut sink, 8, 1, true, 20, 20);
    let events = sink.take();

    let slot0 = [
        InputEvent::TrackingId { slot: 0, id: 0 },
        InputEvent::PosXSlot { slot: 0, value: 10 },
        InputEvent::PosYSlot { slot: 0, value: 10 },
    ];
    let slot1 = [
        InputEvent::TrackingId { slot: 1, id: 1 },
        InputEvent::PosXSlot { slot: 1, value: 20 },
        InputEvent::PosYSlot { slot: 1, value: 20 },
    ];
    for event in slot0.iter().chain(slot1.iter()) {
        assert!(events.contains(event), "missing {:?} in {:?}", event, events);
    }

    let last_slot1 = events
        .iter()
        .rposition(|event| event.slot() == Some(1))
        .expect("slot 1 reported");
    assert_eq!(events[last_slot1 + 1..].last(), Some(&InputEvent::SyncFrame));

    // Both contacts reported: the trailing sweep produced exactly one sync.
    assert_eq!(engine.phase(), FramePhase::AccumulatingFrame);
    contact_report(&mut engine, &mut sink, 16, 0, true, 10, 10);
    assert_eq!(sink.take(), vec![InputEvent::SyncFrame]);
}

#[test]
fn release_after_tracking_id_five() {
    let mut engine = persistent_slot_panel();
    let mut sink = Recorder::default();

    for tap in 0..5u64 {
        contact_report(&mut engine, &mut sink, tap * 20, 0, true, 10, 10);
        contact_report(&mut engine, &mut sink, tap * 20 + 10, 0, false, 10, 10);
    }
    sink.take();

    contact_report(&mut engine, &mut sink, 100, 0, true, 10, 10);
    assert!(sink
        .take()
        .contains(&InputEvent::TrackingId { slot: 0, id: 5 }));

    contact_report(&mut engine, &mut sink, 110, 0, false, 10, 10);
    assert!(sink
        .take()
        .contains(&InputEvent::TrackingId { slot: 0, id: -1 }));

    for (step, (x, y)) in [(10, 10), (11, 12), (500, 500)].into_iter().enumerate() {
        contact_report(&mut engine, &mut sink, 120 + step as u64 * 10, 0, false, x, y);
        let events = sink.take();
        assert!(
            events.iter().all(|event| event.slot() != Some(0)),
            "released slot reported {:?}",
            events
        );
    }

    contact_report(&mut engine, &mut sink, 200, 0, true, 30, 40);
    let retouch = sink.take();
    assert!(retouch.contains(&InputEvent::TrackingId { slot: 0, id: 6 }));
    assert!(retouch.contains(&InputEvent::PosXSlot { slot: 0, value: 30 }));
    assert!(retouch.contains(&InputEvent::PosYSlot { slot: 0, value: 40 }));
}

#[test]
fn positions_reflect_latest_coordinates_at_sync() {
    let mut engine = persistent_slot_panel();
    let mut sink = Recorder::default();

    engine.handle_field(0, FieldKind::ContactIdentifier, 0, &mut sink);
    engine.handle_field(0, FieldKind::Touch, 1, &mut sink);
    engine.handle_field(0, FieldKind::CoordinateX, 1, &mut sink);
    engine.handle_field(0, FieldKind::CoordinateX, 2, &mut sink);
    engine.handle_field(0, FieldKind::CoordinateX, 3, &mut sink);
    engine.handle_field(0, FieldKind::CoordinateY, 4, &mut sink);

    let events = sink.take();
    assert!(events.contains(&InputEvent::PosXSlot { slot: 0, value: 3 }));
    assert!(!events.contains(&InputEvent::PosXSlot { slot: 0, value: 1 }));
    assert!(events.contains(&InputEvent::PosX(3)));
}

#[test]
fn event_buffer_collects_a_frame() {
    let mut engine = persistent_slot_panel();
    let mut buffer: EventBuffer = EventBuffer::new();

    engine.handle_field(0, FieldKind::ContactIdentifier, 0, &mut buffer);
    engine.handle_field(0, FieldKind::Touch, 1, &mut buffer);
    engine.handle_field(0, FieldKind::CoordinateX, 7, &mut buffer);
    engine.handle_field(0, FieldKind::CoordinateY, 9, &mut buffer);

    assert_eq!(buffer.dropped(), 0);
    assert_eq!(buffer.as_slice().last(), Some(&InputEvent::SyncFrame));
    assert_eq!(engine.counters().frames_completed, 1);
}

#[test]
fn closure_sink_receives_events() {
    let mut engine = PenMountTouch::attach(DeviceConfig::single_touch()).expect("valid config");
    let mut syncs = 0;
    let mut sink = |event: InputEvent| {
        if event == InputEvent::SyncFrame {
            syncs += 1;
        }
    };

    for now_ms in 0..3u64 {
        engine.handle_field(now_ms, FieldKind::Touch, 1, &mut sink);
        engine.handle_field(now_ms, FieldKind::CoordinateX, 1, &mut sink);
        engine.handle_field(now_ms, FieldKind::CoordinateY, 1, &mut sink);
    }
    assert_eq!(syncs, 3);
}
