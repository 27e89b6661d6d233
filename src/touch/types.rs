/// Kind of a single field update delivered by the report parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    ContactIdentifier,
    Touch,
    CoordinateX,
    CoordinateY,
    /// Any usage this driver does not route; carries the raw usage code.
    Other(u32),
}

/// Multi-touch reporting convention the consumer understands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProtocolMode {
    /// Protocol A: anonymous contacts separated by contact sync markers.
    AnonymousContact,
    /// Protocol B: persistent slots with tracking identifiers.
    #[default]
    PersistentSlot,
}

/// Whether a frame is open and waiting for active contacts to report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FramePhase {
    #[default]
    Idle,
    AccumulatingFrame,
}

/// Whether the engine consumed a field or the caller should fall back to
/// generic handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldDisposition {
    Consumed,
    Unhandled,
}

impl FieldDisposition {
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

/// Normalized event delivered to the input consumer, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    KeyTouch(bool),
    PosX(u16),
    PosY(u16),
    PosXSlot { slot: u8, value: u16 },
    PosYSlot { slot: u8, value: u16 },
    TrackingId { slot: u8, id: i32 },
    TouchMajor(i32),
    /// Selects `slot` and reports whether it holds an active contact.
    SlotState { slot: u8, touching: bool },
    /// Separates anonymous contacts inside one frame.
    ContactSync,
    SyncFrame,
}

impl InputEvent {
    pub fn slot(self) -> Option<u8> {
        match self {
            Self::PosXSlot { slot, .. }
            | Self::PosYSlot { slot, .. }
            | Self::TrackingId { slot, .. }
            | Self::SlotState { slot, .. } => Some(slot),
            _ => None,
        }
    }
}
