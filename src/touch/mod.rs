//! PenMount multi-touch contact tracking.
//!
//! Field updates flow demux -> contact store -> frame detector -> protocol
//! normalizer, with a legacy single-pointer stream derived alongside.

pub mod config;
pub mod counters;
mod demux;
mod emulate;
mod engine;
mod frame;
mod normalize;
pub mod sink;
pub mod store;
pub mod types;
pub mod usage;

pub use config::{AttachError, DeviceConfig};
pub use counters::TouchCounters;
pub use engine::PenMountTouch;
pub use sink::{EventBuffer, EventSink};
pub use store::{ContactStore, TouchContact};
pub use types::{FieldDisposition, FieldKind, FramePhase, InputEvent, ProtocolMode};
