//! HID usage codes routed by the driver and the input capabilities each one
//! exposes to the host input layer.

use super::config::{DeviceConfig, PENMOUNT_TOUCH_MAJOR_MAX};
use super::types::{FieldKind, ProtocolMode};

pub const HID_USAGE_PAGE: u32 = 0xFFFF_0000;
pub const HID_UP_GENDESK: u32 = 0x0001_0000;
pub const HID_UP_BUTTON: u32 = 0x0009_0000;
pub const HID_UP_DIGITIZER: u32 = 0x000D_0000;

pub const HID_GD_X: u32 = 0x0001_0030;
pub const HID_GD_Y: u32 = 0x0001_0031;
pub const HID_DG_INRANGE: u32 = 0x000D_0032;
pub const HID_DG_TIPSWITCH: u32 = 0x000D_0042;
pub const HID_DG_CONFIDENCE: u32 = 0x000D_0047;
pub const HID_DG_CONTACTID: u32 = 0x000D_0051;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbsAxis {
    X,
    Y,
    MtPositionX,
    MtPositionY,
    MtTouchMajor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputCapability {
    TouchKey,
    Abs { axis: AbsAxis, min: i32, max: i32 },
    Slots { count: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UsageMapping {
    /// The usage drives `capability`; `legacy` is declared alongside it so
    /// single-pointer consumers see a matching axis.
    Mapped {
        capability: InputCapability,
        legacy: Option<InputCapability>,
    },
    /// Not exposed as an input, but `setup` must be declared.
    Ignored { setup: Option<InputCapability> },
    /// Left to generic HID handling.
    Generic,
}

pub fn field_kind(usage: u32) -> FieldKind {
    match usage {
        HID_DG_CONTACTID => FieldKind::ContactIdentifier,
        HID_DG_TIPSWITCH => FieldKind::Touch,
        HID_GD_X => FieldKind::CoordinateX,
        HID_GD_Y => FieldKind::CoordinateY,
        other => FieldKind::Other(other),
    }
}

/// Input-mapping hook: tells the host how to expose `usage` when the report
/// descriptor is parsed, before any field reaches the engine.
pub fn map_usage(
    config: &DeviceConfig,
    usage: u32,
    logical_min: i32,
    logical_max: i32,
) -> UsageMapping {
    match usage & HID_USAGE_PAGE {
        HID_UP_GENDESK => match usage {
            HID_GD_X => map_position(
                config,
                AbsAxis::X,
                AbsAxis::MtPositionX,
                logical_min,
                logical_max,
            ),
            HID_GD_Y => map_position(
                config,
                AbsAxis::Y,
                AbsAxis::MtPositionY,
                logical_min,
                logical_max,
            ),
            _ => UsageMapping::Generic,
        },
        HID_UP_BUTTON => UsageMapping::Mapped {
            capability: InputCapability::TouchKey,
            legacy: None,
        },
        HID_UP_DIGITIZER => match usage {
            HID_DG_TIPSWITCH => UsageMapping::Mapped {
                capability: InputCapability::TouchKey,
                legacy: None,
            },
            HID_DG_CONTACTID => UsageMapping::Ignored {
                setup: Some(contact_setup(config)),
            },
            HID_DG_INRANGE | HID_DG_CONFIDENCE => UsageMapping::Ignored { setup: None },
            _ => UsageMapping::Generic,
        },
        _ => UsageMapping::Generic,
    }
}

fn map_position(
    config: &DeviceConfig,
    legacy_axis: AbsAxis,
    mt_axis: AbsAxis,
    min: i32,
    max: i32,
) -> UsageMapping {
    let legacy = InputCapability::Abs {
        axis: legacy_axis,
        min,
        max,
    };
    if config.is_multi_touch() {
        UsageMapping::Mapped {
            capability: InputCapability::Abs {
                axis: mt_axis,
                min,
                max,
            },
            legacy: Some(legacy),
        }
    } else {
        UsageMapping::Mapped {
            capability: legacy,
            legacy: None,
        }
    }
}

fn contact_setup(config: &DeviceConfig) -> InputCapability {
    match config.protocol {
        ProtocolMode::AnonymousContact => InputCapability::Abs {
            axis: AbsAxis::MtTouchMajor,
            min: 0,
            max: PENMOUNT_TOUCH_MAJOR_MAX,
        },
        ProtocolMode::PersistentSlot => InputCapability::Slots {
            count: config.max_contacts,
        },
    }
}
