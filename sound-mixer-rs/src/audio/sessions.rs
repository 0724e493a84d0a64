//! Per-application audio session enumeration and resolution.
//!
//! Sessions are reached through IAudioSessionManager2 activated on a
//! resolved endpoint device. Enumeration is tolerant of individual bad
//! entries: one unresolvable session must not poison the rest of the
//! listing. Control-interface acquisition, in contrast, hard-fails the
//! whole operation.

use super::device::{AudioError, AudioSession, SessionState};
use super::enumerator::take_com_string;
use windows::core::{Interface, PWSTR};
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::Media::Audio::{
    IAudioSessionControl2, IAudioSessionManager2, IMMDevice,
};
use windows::Win32::System::Com::CLSCTX_ALL;
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
    PROCESS_QUERY_LIMITED_INFORMATION,
};

/// Process handle guard that closes the handle on drop.
struct ProcessHandle(HANDLE);

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Resolve the executable path for a process ID.
///
/// Process ID 0 is the system sounds session and reports the literal ID
/// as its "path". A process that cannot be opened or queried degrades to
/// an empty path instead of failing the enumeration entry.
fn process_image_path(process_id: u32) -> String {
    if process_id == 0 {
        return process_id.to_string();
    }

    unsafe {
        let handle = match OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, process_id) {
            Ok(h) => ProcessHandle(h),
            Err(e) => {
                tracing::debug!("could not open process {process_id}: {e}");
                return String::new();
            }
        };

        let mut buffer = [0u16; 1024];
        let mut size = buffer.len() as u32;
        match QueryFullProcessImageNameW(
            handle.0,
            PROCESS_NAME_WIN32,
            PWSTR(buffer.as_mut_ptr()),
            &mut size,
        ) {
            Ok(()) => String::from_utf16_lossy(&buffer[..size as usize]),
            Err(e) => {
                tracing::debug!("could not query image name for process {process_id}: {e}");
                String::new()
            }
        }
    }
}

/// Session enumerator scoped to a single resolved endpoint device.
pub struct SessionEnumerator {
    manager: IAudioSessionManager2,
}

impl SessionEnumerator {
    /// Activate the session manager on the given device.
    pub fn new(device: &IMMDevice) -> Result<Self, AudioError> {
        unsafe {
            let manager: IAudioSessionManager2 = device
                .Activate(CLSCTX_ALL, None)
                .map_err(AudioError::EnumerationFailed)?;

            Ok(Self { manager })
        }
    }

    /// Snapshot all sessions on the device.
    ///
    /// Entries whose COM accessors fail are skipped; entries whose process
    /// query fails are kept with an empty path.
    pub fn get_sessions(&self) -> Result<Vec<AudioSession>, AudioError> {
        unsafe {
            let enumerator = self
                .manager
                .GetSessionEnumerator()
                .map_err(AudioError::EnumerationFailed)?;

            let count = enumerator
                .GetCount()
                .map_err(AudioError::EnumerationFailed)?;

            let mut sessions = Vec::with_capacity(count.max(0) as usize);

            for i in 0..count {
                let control = match enumerator.GetSession(i) {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::warn!("skipping session {i}: {e}");
                        continue;
                    }
                };

                let control2: IAudioSessionControl2 = match control.cast() {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::warn!("skipping session {i}: {e}");
                        continue;
                    }
                };

                // Convert the identifier first so its buffer is freed even
                // when a later accessor fails and the entry is skipped.
                let identifier = match control2.GetSessionIdentifier() {
                    Ok(id) => id,
                    Err(e) => {
                        tracing::warn!("skipping session {i}: {e}");
                        continue;
                    }
                };
                let id = match take_com_string(identifier) {
                    Ok(id) => id,
                    Err(e) => {
                        tracing::warn!("skipping session {i}: {e}");
                        continue;
                    }
                };

                let process_id = match control2.GetProcessId() {
                    Ok(pid) => pid,
                    Err(e) => {
                        tracing::warn!("skipping session {i}: {e}");
                        continue;
                    }
                };
                let state = match control2.GetState() {
                    Ok(state) => state,
                    Err(e) => {
                        tracing::warn!("skipping session {i}: {e}");
                        continue;
                    }
                };

                sessions.push(AudioSession {
                    id,
                    process_path: process_image_path(process_id),
                    state: SessionState::from_raw(state.0),
                });
            }

            Ok(sessions)
        }
    }

    /// Resolve a session on the device by its identifier string.
    ///
    /// An identifier matching no current session is a typed
    /// `SessionNotFound` error, distinct from `DeviceNotFound`.
    pub fn find_session(&self, session_id: &str) -> Result<IAudioSessionControl2, AudioError> {
        unsafe {
            let enumerator = self
                .manager
                .GetSessionEnumerator()
                .map_err(AudioError::EnumerationFailed)?;

            let count = enumerator
                .GetCount()
                .map_err(AudioError::EnumerationFailed)?;

            for i in 0..count {
                let control = match enumerator.GetSession(i) {
                    Ok(c) => c,
                    Err(_) => continue,
                };

                let control2: IAudioSessionControl2 = match control.cast() {
                    Ok(c) => c,
                    Err(_) => continue,
                };

                let identifier = match control2.GetSessionIdentifier() {
                    Ok(id) => id,
                    Err(_) => continue,
                };

                if let Ok(id) = take_com_string(identifier) {
                    if id == session_id {
                        return Ok(control2);
                    }
                }
            }

            Err(AudioError::SessionNotFound {
                session_id: session_id.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::enumerator::{ComGuard, DeviceEnumerator};
    use crate::audio::DataFlow;

    #[test]
    fn system_sounds_session_path_is_literal_id() {
        assert_eq!(process_image_path(0), "0");
    }

    #[test]
    fn unresolvable_process_degrades_to_empty_path() {
        // PID with all bits set cannot be opened; the entry must degrade,
        // not fail.
        assert_eq!(process_image_path(u32::MAX - 2), String::new());
    }

    #[test]
    fn unknown_session_id_is_session_not_found() {
        let _com = ComGuard::new().unwrap();
        let enumerator = DeviceEnumerator::new().unwrap();
        let Ok(default) = enumerator.get_default_device(DataFlow::Render) else {
            return; // no render endpoint on this machine
        };
        let device = enumerator.get_device(&default.id).unwrap();
        let sessions = SessionEnumerator::new(&device).unwrap();
        let err = sessions.find_session("{no.such.session}").unwrap_err();
        assert!(matches!(err, AudioError::SessionNotFound { .. }));
    }

    #[test]
    fn session_snapshot_entries_have_identifiers() {
        let _com = ComGuard::new().unwrap();
        let enumerator = DeviceEnumerator::new().unwrap();
        let Ok(default) = enumerator.get_default_device(DataFlow::Render) else {
            return;
        };
        let device = enumerator.get_device(&default.id).unwrap();
        let sessions = SessionEnumerator::new(&device).unwrap();
        for session in sessions.get_sessions().unwrap() {
            assert!(!session.id.is_empty());
        }
    }
}
