//! Audio device and session data models.
//!
//! Defines the descriptor types produced by enumeration and the error
//! taxonomy shared by the resolution and control layers.

use thiserror::Error;

/// An audio endpoint device descriptor.
///
/// Value snapshot copied out of the OS device object during enumeration;
/// the `id` is an opaque Windows device ID and must round-trip verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioDevice {
    /// Unique Windows device ID (opaque string from IMMDevice::GetId)
    pub id: String,

    /// Human-readable device name (from device properties)
    pub name: String,

    /// Data-flow direction of the endpoint
    pub flow: DataFlow,
}

/// A per-process audio session descriptor.
///
/// Recomputed on every enumeration call; nothing is cached between calls.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSession {
    /// Session identifier string (opaque, from IAudioSessionControl2)
    pub id: String,

    /// Full path of the owning process executable. The system sounds
    /// session (process id 0) reports `"0"`; an unresolvable process
    /// reports an empty string.
    pub process_path: String,

    /// Session lifecycle state
    pub state: SessionState,
}

/// Data-flow direction of an endpoint (maps to Windows EDataFlow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DataFlow {
    /// Output device (speakers, headphones)
    Render = 0,

    /// Input device (microphones)
    Capture = 1,

    /// Either direction, usable as an enumeration filter
    All = 2,
}

impl DataFlow {
    /// Map a raw data-flow integer to a `DataFlow`.
    ///
    /// `3` is the EDataFlow count sentinel and is rejected along with
    /// everything else out of range.
    pub fn from_raw(value: i32) -> Result<Self, AudioError> {
        match value {
            0 => Ok(DataFlow::Render),
            1 => Ok(DataFlow::Capture),
            2 => Ok(DataFlow::All),
            other => Err(AudioError::InvalidDataFlow(other)),
        }
    }
}

/// Audio session lifecycle state (maps to Windows AudioSessionState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SessionState {
    /// Session exists but is not streaming
    Inactive = 0,

    /// Session is actively streaming audio
    Active = 1,

    /// Owning process has released its streams
    Expired = 2,
}

impl SessionState {
    /// Map a raw AudioSessionState value; unknown values fall back to
    /// `Inactive` rather than failing the enumeration entry.
    pub fn from_raw(value: i32) -> Self {
        match value {
            1 => SessionState::Active,
            2 => SessionState::Expired,
            _ => SessionState::Inactive,
        }
    }
}

/// Clamp a volume scalar to the valid [0.0, 1.0] range.
///
/// Out-of-range input is clamped, not rejected; every set operation
/// applies and returns the clamped value.
pub fn clamp_volume(level: f32) -> f32 {
    level.clamp(0.0, 1.0)
}

/// Audio service error types.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("no default device for the requested data flow")]
    NoDefaultDevice,

    #[error("invalid data flow value: {0}, expected 0 to 3")]
    InvalidDataFlow(i32),

    #[cfg(windows)]
    #[error("COM initialization failed: {0}")]
    ComInitFailed(#[source] windows::core::Error),

    #[cfg(windows)]
    #[error("failed to enumerate audio endpoints: {0}")]
    EnumerationFailed(#[source] windows::core::Error),

    #[error("volume control not available for device")]
    VolumeNotAvailable,

    #[error("volume control not available for session")]
    SessionControlNotAvailable,

    #[cfg(windows)]
    #[error("audio API call failed: {0}")]
    WindowsError(#[source] windows::core::Error),

    #[error("string conversion error: {0}")]
    StringConversion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_volume_limits_range() {
        assert_eq!(clamp_volume(1.5), 1.0);
        assert_eq!(clamp_volume(-0.2), 0.0);
        assert_eq!(clamp_volume(0.5), 0.5);
        assert_eq!(clamp_volume(0.0), 0.0);
        assert_eq!(clamp_volume(1.0), 1.0);
    }

    #[test]
    fn data_flow_accepts_valid_range() {
        assert_eq!(DataFlow::from_raw(0).unwrap(), DataFlow::Render);
        assert_eq!(DataFlow::from_raw(1).unwrap(), DataFlow::Capture);
        assert_eq!(DataFlow::from_raw(2).unwrap(), DataFlow::All);
    }

    #[test]
    fn data_flow_rejects_out_of_range() {
        assert!(matches!(
            DataFlow::from_raw(-1),
            Err(AudioError::InvalidDataFlow(-1))
        ));
        // 3 is the EDataFlow count sentinel, not a resolvable flow
        assert!(matches!(
            DataFlow::from_raw(3),
            Err(AudioError::InvalidDataFlow(3))
        ));
        assert!(matches!(
            DataFlow::from_raw(42),
            Err(AudioError::InvalidDataFlow(42))
        ));
    }

    #[test]
    fn session_state_mapping() {
        assert_eq!(SessionState::from_raw(0), SessionState::Inactive);
        assert_eq!(SessionState::from_raw(1), SessionState::Active);
        assert_eq!(SessionState::from_raw(2), SessionState::Expired);
        assert_eq!(SessionState::from_raw(99), SessionState::Inactive);
    }
}
