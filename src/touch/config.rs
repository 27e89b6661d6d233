use core::fmt;

use super::types::ProtocolMode;

/// Upper bound on contacts any supported panel reports.
pub const PENMOUNT_MAX_CONTACTS: usize = 2;
pub const PENMOUNT_TRACKING_ID_MASK: u32 = 0xFFFF;
/// Touch-major value reported for every anonymous contact.
pub const PENMOUNT_TOUCH_MAJOR: i32 = 2;
pub const PENMOUNT_TOUCH_MAJOR_MAX: i32 = 5;
// A full two-contact sweep arrives well inside one USB polling burst; a frame
// still open after this long has lost a contact.
pub const PENMOUNT_FRAME_TIMEOUT_MS: u64 = 100;
/// Events one dispatch can produce: a flushed frame plus a single-touch pair.
pub const DISPATCH_EVENT_CAPACITY: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceConfig {
    pub max_contacts: u8,
    pub protocol: ProtocolMode,
    /// Forced-flush timeout for frames that never complete; `None` waits forever.
    pub frame_timeout_ms: Option<u64>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::single_touch()
    }
}

impl DeviceConfig {
    pub const fn single_touch() -> Self {
        Self {
            max_contacts: 1,
            protocol: ProtocolMode::PersistentSlot,
            frame_timeout_ms: Some(PENMOUNT_FRAME_TIMEOUT_MS),
        }
    }

    pub const fn multi_touch(protocol: ProtocolMode) -> Self {
        Self {
            max_contacts: PENMOUNT_MAX_CONTACTS as u8,
            protocol,
            frame_timeout_ms: Some(PENMOUNT_FRAME_TIMEOUT_MS),
        }
    }

    pub const fn with_frame_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        self.frame_timeout_ms = timeout_ms;
        self
    }

    pub fn is_multi_touch(&self) -> bool {
        self.max_contacts > 1
    }

    pub fn validate(&self) -> Result<(), AttachError> {
        if self.max_contacts == 0 || self.max_contacts as usize > PENMOUNT_MAX_CONTACTS {
            return Err(AttachError::UnsupportedContactCount(self.max_contacts));
        }
        if self.frame_timeout_ms == Some(0) {
            return Err(AttachError::ZeroFrameTimeout);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachError {
    UnsupportedContactCount(u8),
    ZeroFrameTimeout,
}

impl fmt::Display for AttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedContactCount(count) => write!(
                f,
                "unsupported contact count {count} (expected 1..={PENMOUNT_MAX_CONTACTS})"
            ),
            Self::ZeroFrameTimeout => write!(f, "frame timeout must be non-zero"),
        }
    }
}
