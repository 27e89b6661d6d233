#![cfg_attr(not(test), no_std)]

pub mod touch;

pub use touch::{
    AttachError, ContactStore, DeviceConfig, EventBuffer, EventSink, FieldDisposition, FieldKind,
    FramePhase, InputEvent, PenMountTouch, ProtocolMode, TouchContact, TouchCounters,
};
