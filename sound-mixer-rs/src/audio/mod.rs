//! Audio module for Windows Core Audio API interactions.
//!
//! Provides endpoint and session enumeration, resolution by opaque
//! identifier, and volume/mute control. The descriptor types and error
//! taxonomy compile on every platform; the COM-backed layers are
//! Windows-only.

pub mod device;
#[cfg(windows)]
pub mod enumerator;
#[cfg(windows)]
pub mod sessions;
#[cfg(windows)]
pub mod volume;

pub use device::{clamp_volume, AudioDevice, AudioError, AudioSession, DataFlow, SessionState};
#[cfg(windows)]
pub use enumerator::{ComGuard, DeviceEnumerator};
#[cfg(windows)]
pub use sessions::SessionEnumerator;
#[cfg(windows)]
pub use volume::{SessionVolumeController, VolumeController};
