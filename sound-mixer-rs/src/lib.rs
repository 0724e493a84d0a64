//! Windows Sound Mixer - Library
//!
//! Endpoint and per-application session volume control on top of the
//! Windows Core Audio APIs.
//!
//! ## Features
//!
//! - Enumerate active render and capture endpoints
//! - Resolve endpoints by opaque device ID or by default data flow
//! - Enumerate per-process audio sessions on an endpoint
//! - Get/set volume (clamped to 0.0..=1.0) and mute per endpoint or session
//!
//! All OS handles are transient: each operation initializes COM, resolves
//! what it needs, performs one get or set, and releases everything before
//! returning. Nothing is cached between calls.

pub mod audio;

pub use audio::{clamp_volume, AudioDevice, AudioError, AudioSession, DataFlow, SessionState};
#[cfg(windows)]
pub use audio::{ComGuard, DeviceEnumerator, SessionEnumerator, SessionVolumeController, VolumeController};
