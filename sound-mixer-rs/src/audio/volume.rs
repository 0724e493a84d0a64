//! Volume and mute control for endpoints and sessions.
//!
//! Endpoint control goes through IAudioEndpointVolume, session control
//! through ISimpleAudioVolume. Both controllers are transient: acquired
//! from a freshly resolved object, used for one get or set, and released
//! when dropped.

use super::device::{clamp_volume, AudioError};
use windows::core::Interface;
use windows::Win32::Media::Audio::{
    Endpoints::IAudioEndpointVolume, IAudioSessionControl2, IMMDevice, ISimpleAudioVolume,
};
use windows::Win32::System::Com::CLSCTX_ALL;

/// Volume controller for a specific endpoint device.
pub struct VolumeController {
    endpoint_volume: IAudioEndpointVolume,
}

impl VolumeController {
    /// Acquire the endpoint volume interface for the given device.
    ///
    /// Failure here means the device exists but its control interface
    /// could not be acquired, which is distinct from device-not-found.
    pub fn new(device: &IMMDevice) -> Result<Self, AudioError> {
        unsafe {
            let endpoint_volume: IAudioEndpointVolume = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|_| AudioError::VolumeNotAvailable)?;

            Ok(Self { endpoint_volume })
        }
    }

    /// Get the current volume level (0.0 to 1.0).
    pub fn get_volume(&self) -> Result<f32, AudioError> {
        unsafe {
            self.endpoint_volume
                .GetMasterVolumeLevelScalar()
                .map_err(AudioError::WindowsError)
        }
    }

    /// Set the volume level. Out-of-range input is clamped to
    /// [0.0, 1.0]; returns the applied value.
    pub fn set_volume(&self, level: f32) -> Result<f32, AudioError> {
        let level = clamp_volume(level);
        unsafe {
            self.endpoint_volume
                .SetMasterVolumeLevelScalar(level, std::ptr::null())
                .map_err(AudioError::WindowsError)?;
        }
        Ok(level)
    }

    /// Get the current mute state.
    pub fn get_mute(&self) -> Result<bool, AudioError> {
        unsafe {
            let muted = self
                .endpoint_volume
                .GetMute()
                .map_err(AudioError::WindowsError)?;
            Ok(muted.as_bool())
        }
    }

    /// Set the mute state. Returns the applied state.
    pub fn set_mute(&self, muted: bool) -> Result<bool, AudioError> {
        unsafe {
            self.endpoint_volume
                .SetMute(muted, std::ptr::null())
                .map_err(AudioError::WindowsError)?;
        }
        Ok(muted)
    }
}

/// Volume controller for a specific audio session.
pub struct SessionVolumeController {
    session_volume: ISimpleAudioVolume,
}

impl SessionVolumeController {
    /// Acquire the simple volume interface from a resolved session.
    ///
    /// Failure here is `SessionControlNotAvailable`, kept distinct from
    /// the endpoint control acquisition failure.
    pub fn new(session: &IAudioSessionControl2) -> Result<Self, AudioError> {
        let session_volume: ISimpleAudioVolume = session
            .cast()
            .map_err(|_| AudioError::SessionControlNotAvailable)?;

        Ok(Self { session_volume })
    }

    /// Get the current session volume level (0.0 to 1.0).
    pub fn get_volume(&self) -> Result<f32, AudioError> {
        unsafe {
            self.session_volume
                .GetMasterVolume()
                .map_err(AudioError::WindowsError)
        }
    }

    /// Set the session volume level, clamped to [0.0, 1.0]; returns the
    /// applied value.
    pub fn set_volume(&self, level: f32) -> Result<f32, AudioError> {
        let level = clamp_volume(level);
        unsafe {
            self.session_volume
                .SetMasterVolume(level, std::ptr::null())
                .map_err(AudioError::WindowsError)?;
        }
        Ok(level)
    }

    /// Get the current session mute state.
    pub fn get_mute(&self) -> Result<bool, AudioError> {
        unsafe {
            let muted = self
                .session_volume
                .GetMute()
                .map_err(AudioError::WindowsError)?;
            Ok(muted.as_bool())
        }
    }

    /// Set the session mute state. Returns the applied state.
    pub fn set_mute(&self, muted: bool) -> Result<bool, AudioError> {
        unsafe {
            self.session_volume
                .SetMute(muted, std::ptr::null())
                .map_err(AudioError::WindowsError)?;
        }
        Ok(muted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::enumerator::{ComGuard, DeviceEnumerator};
    use crate::audio::DataFlow;

    fn default_render_device() -> Option<(DeviceEnumerator, IMMDevice)> {
        let enumerator = DeviceEnumerator::new().ok()?;
        let default = enumerator.get_default_device(DataFlow::Render).ok()?;
        let device = enumerator.get_device(&default.id).ok()?;
        Some((enumerator, device))
    }

    #[test]
    fn endpoint_volume_round_trip() {
        let _com = ComGuard::new().unwrap();
        let Some((_enumerator, device)) = default_render_device() else {
            return; // no render endpoint on this machine
        };
        let controller = VolumeController::new(&device).unwrap();

        let original = controller.get_volume().unwrap();

        let applied = controller.set_volume(0.5).unwrap();
        assert_eq!(applied, 0.5);
        assert!((controller.get_volume().unwrap() - 0.5).abs() < 1e-3);

        // Out-of-range input is clamped, not rejected
        assert_eq!(controller.set_volume(1.5).unwrap(), 1.0);
        assert_eq!(controller.set_volume(-0.2).unwrap(), 0.0);

        controller.set_volume(original).unwrap();
    }

    #[test]
    fn endpoint_mute_round_trip() {
        let _com = ComGuard::new().unwrap();
        let Some((_enumerator, device)) = default_render_device() else {
            return;
        };
        let controller = VolumeController::new(&device).unwrap();

        let original = controller.get_mute().unwrap();

        assert!(controller.set_mute(true).unwrap());
        assert!(controller.get_mute().unwrap());
        assert!(!controller.set_mute(false).unwrap());
        assert!(!controller.get_mute().unwrap());

        controller.set_mute(original).unwrap();
    }
}
