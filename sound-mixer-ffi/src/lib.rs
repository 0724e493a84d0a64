//! C ABI bindings for the Windows sound mixer.
//!
//! Exposes the endpoint/session enumeration and volume control operations
//! to a host runtime. Structured results cross the boundary as JSON
//! strings, scalars as out-parameters with an `i32` error code. All
//! functions use panic::catch_unwind to prevent Rust panics from
//! unwinding across the FFI boundary.
//!
//! Argument validation happens before any OS interaction; a shape
//! mismatch is reported as `InvalidArgument` without touching COM.

use sound_mixer_rs::{AudioDevice, AudioError, AudioSession};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::ffi::{c_char, CStr, CString};
use std::panic;
use std::ptr;

#[cfg(windows)]
use sound_mixer_rs::{
    ComGuard, DataFlow, DeviceEnumerator, SessionEnumerator, SessionVolumeController,
    VolumeController,
};

// ============================================================================
// Error Handling
// ============================================================================

/// Error codes returned by FFI functions.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,
    /// Argument failed shape/type validation before any OS call
    InvalidArgument = -2,
    DeviceNotFound = -3,
    SessionNotFound = -4,
    /// The underlying COM/audio call failed
    ComError = -5,
    /// The device resolved but its endpoint control interface could not
    /// be acquired
    VolumeNotAvailable = -6,
    JsonError = -7,
    /// The session resolved but its volume control interface could not
    /// be acquired
    SessionControlNotAvailable = -8,
    Panic = -99,
}

impl From<&AudioError> for ErrorCode {
    fn from(err: &AudioError) -> Self {
        match err {
            AudioError::DeviceNotFound { .. } | AudioError::NoDefaultDevice => {
                ErrorCode::DeviceNotFound
            }
            AudioError::SessionNotFound { .. } => ErrorCode::SessionNotFound,
            AudioError::InvalidDataFlow(_) => ErrorCode::InvalidArgument,
            AudioError::VolumeNotAvailable => ErrorCode::VolumeNotAvailable,
            AudioError::SessionControlNotAvailable => ErrorCode::SessionControlNotAvailable,
            // Wide-string conversion fails on the COM side, not during
            // JSON marshaling
            AudioError::StringConversion(_) => ErrorCode::ComError,
            #[cfg(windows)]
            AudioError::ComInitFailed(_)
            | AudioError::EnumerationFailed(_)
            | AudioError::WindowsError(_) => ErrorCode::ComError,
        }
    }
}

/// Thread-local storage for the last error.
thread_local! {
    static LAST_ERROR: RefCell<Option<(ErrorCode, String)>> = const { RefCell::new(None) };
}

fn set_last_error(code: ErrorCode, message: impl Into<String>) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = Some((code, message.into()));
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

#[cfg(windows)]
fn record_error(err: &AudioError) -> i32 {
    let code = ErrorCode::from(err);
    set_last_error(code, err.to_string());
    code as i32
}

#[cfg(windows)]
fn invalid_argument(message: &str) -> i32 {
    set_last_error(ErrorCode::InvalidArgument, message);
    ErrorCode::InvalidArgument as i32
}

// ============================================================================
// Data Types for JSON Serialization
// ============================================================================

/// An audio endpoint device.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceDto {
    pub id: String,
    pub name: String,
    /// Data-flow direction: 0 = render, 1 = capture, 2 = all
    #[serde(rename = "type")]
    pub device_type: i32,
}

impl From<AudioDevice> for DeviceDto {
    fn from(device: AudioDevice) -> Self {
        Self {
            id: device.id,
            name: device.name,
            device_type: device.flow as i32,
        }
    }
}

/// A per-process audio session on an endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionDto {
    pub id: String,
    pub path: String,
    /// Session state: 0 = inactive, 1 = active, 2 = expired
    pub state: i32,
}

impl From<AudioSession> for SessionDto {
    fn from(session: AudioSession) -> Self {
        Self {
            id: session.id,
            path: session.process_path,
            state: session.state as i32,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Allocate a C string from a Rust string. Caller must free with
/// sound_mixer_free_string.
fn alloc_c_string(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => {
            // String contained a null byte, replace with empty
            CString::new("").unwrap().into_raw()
        }
    }
}

/// Parse a C string to a Rust string slice.
unsafe fn parse_c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Execute a closure with COM initialized for the current thread.
///
/// COM is initialized at the start of the operation and torn down at its
/// end, never left active across calls.
#[cfg(windows)]
fn with_com<T, F: FnOnce() -> Result<T, AudioError>>(f: F) -> Result<T, AudioError> {
    let _com = ComGuard::new()?;
    f()
}

/// Resolve a device and acquire its endpoint volume control.
#[cfg(windows)]
fn endpoint_controller(device_id: &str) -> Result<VolumeController, AudioError> {
    let enumerator = DeviceEnumerator::new()?;
    let device = enumerator.get_device(device_id)?;
    VolumeController::new(&device)
}

/// Resolve a device, then a session within it, and acquire the session
/// volume control.
#[cfg(windows)]
fn session_controller(
    device_id: &str,
    session_id: &str,
) -> Result<SessionVolumeController, AudioError> {
    let enumerator = DeviceEnumerator::new()?;
    let device = enumerator.get_device(device_id)?;
    let sessions = SessionEnumerator::new(&device)?;
    let session = sessions.find_session(session_id)?;
    SessionVolumeController::new(&session)
}

/// Serialize a response and hand it across the boundary. A
/// serialization failure is recorded as JsonError.
#[cfg(windows)]
fn serialize_response<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => alloc_c_string(&json),
        Err(e) => {
            set_last_error(ErrorCode::JsonError, e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// FFI Functions - Enumeration
// ============================================================================

/// Get all active audio endpoint devices.
///
/// # Returns
/// JSON array of `{id, name, type}` objects. Caller must free with
/// sound_mixer_free_string(). Returns null on failure.
#[cfg(windows)]
#[no_mangle]
pub extern "C" fn sound_mixer_get_devices() -> *mut c_char {
    clear_last_error();

    let result = panic::catch_unwind(|| {
        with_com(|| {
            let enumerator = DeviceEnumerator::new()?;
            let devices = enumerator.get_devices()?;
            tracing::debug!("enumerated {} endpoints", devices.len());

            Ok(devices.into_iter().map(DeviceDto::from).collect::<Vec<_>>())
        })
    });

    match result {
        Ok(Ok(dtos)) => serialize_response(&dtos),
        Ok(Err(e)) => {
            record_error(&e);
            ptr::null_mut()
        }
        Err(_) => {
            set_last_error(ErrorCode::Panic, "panic during device enumeration");
            ptr::null_mut()
        }
    }
}

/// Get the default endpoint for a data-flow direction.
///
/// # Arguments
/// * `data_flow` - 0 = render, 1 = capture, 2 = all
///
/// # Returns
/// JSON `{id, name, type}` object. Caller must free with
/// sound_mixer_free_string(). Returns null on failure.
#[cfg(windows)]
#[no_mangle]
pub extern "C" fn sound_mixer_get_default_device(data_flow: i32) -> *mut c_char {
    clear_last_error();

    let result = panic::catch_unwind(|| {
        // Range check before any COM interaction
        let flow = DataFlow::from_raw(data_flow)?;

        with_com(|| {
            let enumerator = DeviceEnumerator::new()?;
            let device = enumerator.get_default_device(flow)?;
            Ok(DeviceDto::from(device))
        })
    });

    match result {
        Ok(Ok(dto)) => serialize_response(&dto),
        Ok(Err(e)) => {
            record_error(&e);
            ptr::null_mut()
        }
        Err(_) => {
            set_last_error(ErrorCode::Panic, "panic during default device lookup");
            ptr::null_mut()
        }
    }
}

/// Get all audio sessions on a device.
///
/// # Arguments
/// * `device_id` - The device ID (UTF-8 string)
///
/// # Returns
/// JSON array of `{id, path, state}` objects. Caller must free with
/// sound_mixer_free_string(). Returns null on failure.
#[cfg(windows)]
#[no_mangle]
pub extern "C" fn sound_mixer_get_sessions(device_id: *const c_char) -> *mut c_char {
    clear_last_error();

    let result = panic::catch_unwind(|| {
        let device_id = unsafe {
            match parse_c_str(device_id) {
                Some(s) => s,
                None => {
                    set_last_error(ErrorCode::InvalidArgument, "expected device id string");
                    return Ok(None);
                }
            }
        };

        with_com(|| {
            let enumerator = DeviceEnumerator::new()?;
            let device = enumerator.get_device(device_id)?;
            let sessions = SessionEnumerator::new(&device)?.get_sessions()?;
            tracing::debug!("enumerated {} sessions on {device_id}", sessions.len());

            let dtos: Vec<SessionDto> = sessions.into_iter().map(Into::into).collect();
            Ok(Some(dtos))
        })
    });

    match result {
        Ok(Ok(Some(dtos))) => serialize_response(&dtos),
        Ok(Ok(None)) => ptr::null_mut(),
        Ok(Err(e)) => {
            record_error(&e);
            ptr::null_mut()
        }
        Err(_) => {
            set_last_error(ErrorCode::Panic, "panic during session enumeration");
            ptr::null_mut()
        }
    }
}

// ============================================================================
// FFI Functions - Endpoint Volume Control
// ============================================================================

/// Set the volume level for an endpoint device.
///
/// # Arguments
/// * `device_id` - The device ID (UTF-8 string)
/// * `volume` - Requested level; clamped to 0.0..=1.0 before being applied
/// * `applied` - Receives the applied (clamped) level on success
///
/// # Returns
/// 0 on success, negative error code on failure.
#[cfg(windows)]
#[no_mangle]
pub extern "C" fn sound_mixer_set_endpoint_volume(
    device_id: *const c_char,
    volume: f32,
    applied: *mut f32,
) -> i32 {
    clear_last_error();

    let result = panic::catch_unwind(|| {
        let device_id = unsafe {
            match parse_c_str(device_id) {
                Some(s) => s,
                None => return invalid_argument("expected device id string"),
            }
        };
        if applied.is_null() {
            return invalid_argument("null output pointer");
        }

        match with_com(|| endpoint_controller(device_id)?.set_volume(volume)) {
            Ok(value) => {
                unsafe { *applied = value };
                ErrorCode::Success as i32
            }
            Err(e) => record_error(&e),
        }
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error(ErrorCode::Panic, "panic during set endpoint volume");
            ErrorCode::Panic as i32
        }
    }
}

/// Get the volume level of an endpoint device.
///
/// # Returns
/// 0 on success with the level written to `volume`, negative error code
/// on failure.
#[cfg(windows)]
#[no_mangle]
pub extern "C" fn sound_mixer_get_endpoint_volume(
    device_id: *const c_char,
    volume: *mut f32,
) -> i32 {
    clear_last_error();

    let result = panic::catch_unwind(|| {
        let device_id = unsafe {
            match parse_c_str(device_id) {
                Some(s) => s,
                None => return invalid_argument("expected device id string"),
            }
        };
        if volume.is_null() {
            return invalid_argument("null output pointer");
        }

        match with_com(|| endpoint_controller(device_id)?.get_volume()) {
            Ok(value) => {
                unsafe { *volume = value };
                ErrorCode::Success as i32
            }
            Err(e) => record_error(&e),
        }
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error(ErrorCode::Panic, "panic during get endpoint volume");
            ErrorCode::Panic as i32
        }
    }
}

/// Set the mute state of an endpoint device.
///
/// # Arguments
/// * `mute` - 1 = muted, 0 = unmuted
/// * `applied` - Receives the applied state (1/0) on success
///
/// # Returns
/// 0 on success, negative error code on failure.
#[cfg(windows)]
#[no_mangle]
pub extern "C" fn sound_mixer_set_endpoint_mute(
    device_id: *const c_char,
    mute: i32,
    applied: *mut i32,
) -> i32 {
    clear_last_error();

    let result = panic::catch_unwind(|| {
        let device_id = unsafe {
            match parse_c_str(device_id) {
                Some(s) => s,
                None => return invalid_argument("expected device id string"),
            }
        };
        if applied.is_null() {
            return invalid_argument("null output pointer");
        }

        match with_com(|| endpoint_controller(device_id)?.set_mute(mute != 0)) {
            Ok(value) => {
                unsafe { *applied = value as i32 };
                ErrorCode::Success as i32
            }
            Err(e) => record_error(&e),
        }
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error(ErrorCode::Panic, "panic during set endpoint mute");
            ErrorCode::Panic as i32
        }
    }
}

/// Get the mute state of an endpoint device.
///
/// # Returns
/// 0 on success with the state (1/0) written to `mute`, negative error
/// code on failure.
#[cfg(windows)]
#[no_mangle]
pub extern "C" fn sound_mixer_get_endpoint_mute(device_id: *const c_char, mute: *mut i32) -> i32 {
    clear_last_error();

    let result = panic::catch_unwind(|| {
        let device_id = unsafe {
            match parse_c_str(device_id) {
                Some(s) => s,
                None => return invalid_argument("expected device id string"),
            }
        };
        if mute.is_null() {
            return invalid_argument("null output pointer");
        }

        match with_com(|| endpoint_controller(device_id)?.get_mute()) {
            Ok(value) => {
                unsafe { *mute = value as i32 };
                ErrorCode::Success as i32
            }
            Err(e) => record_error(&e),
        }
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error(ErrorCode::Panic, "panic during get endpoint mute");
            ErrorCode::Panic as i32
        }
    }
}

// ============================================================================
// FFI Functions - Session Volume Control
// ============================================================================

/// Set the volume level for an audio session.
///
/// Requires a two-step resolution: the device by ID, then the session
/// within that device. An unknown session on a valid device reports
/// SessionNotFound, not DeviceNotFound.
///
/// # Returns
/// 0 on success with the applied (clamped) level written to `applied`,
/// negative error code on failure.
#[cfg(windows)]
#[no_mangle]
pub extern "C" fn sound_mixer_set_audio_session_volume(
    device_id: *const c_char,
    session_id: *const c_char,
    volume: f32,
    applied: *mut f32,
) -> i32 {
    clear_last_error();

    let result = panic::catch_unwind(|| {
        let (device_id, session_id) = unsafe {
            match (parse_c_str(device_id), parse_c_str(session_id)) {
                (Some(d), Some(s)) => (d, s),
                _ => return invalid_argument("expected device id and session id strings"),
            }
        };
        if applied.is_null() {
            return invalid_argument("null output pointer");
        }

        match with_com(|| session_controller(device_id, session_id)?.set_volume(volume)) {
            Ok(value) => {
                unsafe { *applied = value };
                ErrorCode::Success as i32
            }
            Err(e) => record_error(&e),
        }
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error(ErrorCode::Panic, "panic during set session volume");
            ErrorCode::Panic as i32
        }
    }
}

/// Get the volume level of an audio session.
///
/// # Returns
/// 0 on success with the level written to `volume`, negative error code
/// on failure.
#[cfg(windows)]
#[no_mangle]
pub extern "C" fn sound_mixer_get_audio_session_volume(
    device_id: *const c_char,
    session_id: *const c_char,
    volume: *mut f32,
) -> i32 {
    clear_last_error();

    let result = panic::catch_unwind(|| {
        let (device_id, session_id) = unsafe {
            match (parse_c_str(device_id), parse_c_str(session_id)) {
                (Some(d), Some(s)) => (d, s),
                _ => return invalid_argument("expected device id and session id strings"),
            }
        };
        if volume.is_null() {
            return invalid_argument("null output pointer");
        }

        match with_com(|| session_controller(device_id, session_id)?.get_volume()) {
            Ok(value) => {
                unsafe { *volume = value };
                ErrorCode::Success as i32
            }
            Err(e) => record_error(&e),
        }
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error(ErrorCode::Panic, "panic during get session volume");
            ErrorCode::Panic as i32
        }
    }
}

/// Set the mute state of an audio session.
///
/// # Returns
/// 0 on success with the applied state (1/0) written to `applied`,
/// negative error code on failure.
#[cfg(windows)]
#[no_mangle]
pub extern "C" fn sound_mixer_set_audio_session_mute(
    device_id: *const c_char,
    session_id: *const c_char,
    mute: i32,
    applied: *mut i32,
) -> i32 {
    clear_last_error();

    let result = panic::catch_unwind(|| {
        let (device_id, session_id) = unsafe {
            match (parse_c_str(device_id), parse_c_str(session_id)) {
                (Some(d), Some(s)) => (d, s),
                _ => return invalid_argument("expected device id and session id strings"),
            }
        };
        if applied.is_null() {
            return invalid_argument("null output pointer");
        }

        match with_com(|| session_controller(device_id, session_id)?.set_mute(mute != 0)) {
            Ok(value) => {
                unsafe { *applied = value as i32 };
                ErrorCode::Success as i32
            }
            Err(e) => record_error(&e),
        }
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error(ErrorCode::Panic, "panic during set session mute");
            ErrorCode::Panic as i32
        }
    }
}

/// Get the mute state of an audio session.
///
/// # Returns
/// 0 on success with the state (1/0) written to `mute`, negative error
/// code on failure.
#[cfg(windows)]
#[no_mangle]
pub extern "C" fn sound_mixer_get_audio_session_mute(
    device_id: *const c_char,
    session_id: *const c_char,
    mute: *mut i32,
) -> i32 {
    clear_last_error();

    let result = panic::catch_unwind(|| {
        let (device_id, session_id) = unsafe {
            match (parse_c_str(device_id), parse_c_str(session_id)) {
                (Some(d), Some(s)) => (d, s),
                _ => return invalid_argument("expected device id and session id strings"),
            }
        };
        if mute.is_null() {
            return invalid_argument("null output pointer");
        }

        match with_com(|| session_controller(device_id, session_id)?.get_mute()) {
            Ok(value) => {
                unsafe { *mute = value as i32 };
                ErrorCode::Success as i32
            }
            Err(e) => record_error(&e),
        }
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error(ErrorCode::Panic, "panic during get session mute");
            ErrorCode::Panic as i32
        }
    }
}

// ============================================================================
// FFI Functions - Memory Management
// ============================================================================

/// Free a string allocated by this library.
///
/// # Safety
/// The pointer must have been returned by one of the sound_mixer_*
/// functions. Do not call this on strings from other sources.
#[no_mangle]
pub extern "C" fn sound_mixer_free_string(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }

    let _ = panic::catch_unwind(|| unsafe {
        let _ = CString::from_raw(ptr);
    });
}

// ============================================================================
// FFI Functions - Error Handling
// ============================================================================

/// Get the last error code.
///
/// # Returns
/// The error code from the last failed operation, or 0 if no error.
#[no_mangle]
pub extern "C" fn sound_mixer_last_error_code() -> i32 {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|(code, _)| *code as i32)
            .unwrap_or(0)
    })
}

/// Get the last error message.
///
/// # Returns
/// Error message string. Caller must free with sound_mixer_free_string().
/// Returns null if no error.
#[no_mangle]
pub extern "C" fn sound_mixer_last_error_message() -> *mut c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|(_, msg)| alloc_c_string(msg))
            .unwrap_or(ptr::null_mut())
    })
}

// ============================================================================
// FFI Functions - Utility
// ============================================================================

/// Initialize tracing output, filtered by the SOUND_MIXER_LOG env var.
/// Safe to call more than once; later calls are no-ops.
#[no_mangle]
pub extern "C" fn sound_mixer_init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("SOUND_MIXER_LOG"))
        .try_init();
}

/// Get the library version.
///
/// # Returns
/// Version string. Caller must free with sound_mixer_free_string().
#[no_mangle]
pub extern "C" fn sound_mixer_version() -> *mut c_char {
    alloc_c_string(env!("CARGO_PKG_VERSION"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sound_mixer_rs::{DataFlow, SessionState};

    #[test]
    fn error_code_keeps_kinds_distinguishable() {
        assert_eq!(
            ErrorCode::from(&AudioError::DeviceNotFound {
                device_id: "dev".to_string()
            }),
            ErrorCode::DeviceNotFound
        );
        assert_eq!(
            ErrorCode::from(&AudioError::SessionNotFound {
                session_id: "sess".to_string()
            }),
            ErrorCode::SessionNotFound
        );
        assert_eq!(
            ErrorCode::from(&AudioError::VolumeNotAvailable),
            ErrorCode::VolumeNotAvailable
        );
        assert_eq!(
            ErrorCode::from(&AudioError::SessionControlNotAvailable),
            ErrorCode::SessionControlNotAvailable
        );
        assert_ne!(
            ErrorCode::from(&AudioError::VolumeNotAvailable),
            ErrorCode::from(&AudioError::SessionControlNotAvailable)
        );
        assert_eq!(
            ErrorCode::from(&AudioError::InvalidDataFlow(7)),
            ErrorCode::InvalidArgument
        );
        // Wide-string conversion failures are COM-side, not JSON
        assert_eq!(
            ErrorCode::from(&AudioError::StringConversion("bad utf-16".to_string())),
            ErrorCode::ComError
        );
    }

    #[test]
    fn device_dto_uses_contract_field_names() {
        let dto = DeviceDto::from(AudioDevice {
            id: "{dev}".to_string(),
            name: "Speakers".to_string(),
            flow: DataFlow::Render,
        });
        let json = serde_json::to_string(&dto).unwrap();
        assert_eq!(json, r#"{"id":"{dev}","name":"Speakers","type":0}"#);
    }

    #[test]
    fn session_dto_uses_contract_field_names() {
        let dto = SessionDto::from(AudioSession {
            id: "{sess}".to_string(),
            process_path: "C:\\app.exe".to_string(),
            state: SessionState::Active,
        });
        let json = serde_json::to_string(&dto).unwrap();
        assert_eq!(json, r#"{"id":"{sess}","path":"C:\\app.exe","state":1}"#);
    }

    #[test]
    fn last_error_round_trip() {
        clear_last_error();
        assert_eq!(sound_mixer_last_error_code(), 0);

        set_last_error(ErrorCode::DeviceNotFound, "device not found: dev");
        assert_eq!(
            sound_mixer_last_error_code(),
            ErrorCode::DeviceNotFound as i32
        );

        let msg = sound_mixer_last_error_message();
        assert!(!msg.is_null());
        unsafe {
            let s = CStr::from_ptr(msg).to_str().unwrap();
            assert_eq!(s, "device not found: dev");
        }
        sound_mixer_free_string(msg);

        clear_last_error();
        assert_eq!(sound_mixer_last_error_code(), 0);
    }

    #[test]
    fn free_string_ignores_null() {
        sound_mixer_free_string(ptr::null_mut());
    }

    #[test]
    fn version_is_non_empty() {
        let version = sound_mixer_version();
        assert!(!version.is_null());
        unsafe {
            let s = CStr::from_ptr(version).to_str().unwrap();
            assert!(!s.is_empty());
        }
        sound_mixer_free_string(version);
    }

    #[test]
    fn parse_c_str_rejects_null() {
        unsafe {
            assert!(parse_c_str(ptr::null()).is_none());
        }
    }

    #[cfg(windows)]
    #[test]
    fn default_device_rejects_out_of_range_flow() {
        // 3 is the count sentinel, valid for range checking only
        assert!(sound_mixer_get_default_device(3).is_null());
        assert_eq!(
            sound_mixer_last_error_code(),
            ErrorCode::InvalidArgument as i32
        );

        assert!(sound_mixer_get_default_device(-1).is_null());
        assert_eq!(
            sound_mixer_last_error_code(),
            ErrorCode::InvalidArgument as i32
        );
    }

    #[cfg(windows)]
    #[test]
    fn null_device_id_is_invalid_argument_before_any_os_call() {
        let mut out = 0.0f32;
        let code = sound_mixer_get_endpoint_volume(ptr::null(), &mut out);
        assert_eq!(code, ErrorCode::InvalidArgument as i32);
    }

    #[cfg(windows)]
    #[test]
    fn unknown_device_id_fails_every_control_operation() {
        let id = CString::new("{no.such.device}").unwrap();
        let mut vol = 0.0f32;
        let mut mute = 0i32;

        assert_eq!(
            sound_mixer_get_endpoint_volume(id.as_ptr(), &mut vol),
            ErrorCode::DeviceNotFound as i32
        );
        assert_eq!(
            sound_mixer_set_endpoint_volume(id.as_ptr(), 0.5, &mut vol),
            ErrorCode::DeviceNotFound as i32
        );
        assert_eq!(
            sound_mixer_get_endpoint_mute(id.as_ptr(), &mut mute),
            ErrorCode::DeviceNotFound as i32
        );
        assert_eq!(
            sound_mixer_set_endpoint_mute(id.as_ptr(), 1, &mut mute),
            ErrorCode::DeviceNotFound as i32
        );

        let session = CString::new("{no.such.session}").unwrap();
        assert_eq!(
            sound_mixer_get_audio_session_volume(id.as_ptr(), session.as_ptr(), &mut vol),
            ErrorCode::DeviceNotFound as i32
        );
    }
}
