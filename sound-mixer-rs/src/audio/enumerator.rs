//! Device enumeration and resolution using the Windows MMDevice API.
//!
//! Provides COM initialization and endpoint lookup by ID or by default
//! data-flow direction. Every lookup is a fresh snapshot; no device
//! handles are retained between calls.

use super::device::{AudioDevice, AudioError, DataFlow};
use windows::core::{Interface, PCWSTR, PWSTR};
use windows::Win32::Devices::Properties::DEVPKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::{
    eAll, eCapture, eConsole, eRender, EDataFlow, IMMDevice, IMMDeviceEnumerator, IMMEndpoint,
    MMDeviceEnumerator, DEVICE_STATE_ACTIVE,
};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoTaskMemFree, CoUninitialize, CLSCTX_ALL,
    COINIT_APARTMENTTHREADED, STGM,
};
use windows::Win32::UI::Shell::PropertiesSystem::{IPropertyStore, PROPERTYKEY};

/// COM initialization guard that uninitializes COM on drop.
///
/// Created at the start of each operation and dropped at its end; COM is
/// never assumed already active nor left active afterwards.
pub struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    /// Initialize COM for the current thread.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            // Use apartment-threaded to match the audio service expectations
            CoInitializeEx(None, COINIT_APARTMENTTHREADED)
                .ok()
                .map_err(AudioError::ComInitFailed)?;
        }
        Ok(Self { initialized: true })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe {
                CoUninitialize();
            }
        }
    }
}

/// Convert a CoTaskMemAlloc'd wide string into an owned `String`, freeing
/// the source buffer on every path.
pub(crate) unsafe fn take_com_string(value: PWSTR) -> Result<String, AudioError> {
    let result = value
        .to_string()
        .map_err(|e| AudioError::StringConversion(e.to_string()));
    CoTaskMemFree(Some(value.as_ptr() as *const _));
    result
}

fn to_edataflow(flow: DataFlow) -> EDataFlow {
    match flow {
        DataFlow::Render => eRender,
        DataFlow::Capture => eCapture,
        DataFlow::All => eAll,
    }
}

/// Device enumerator using the Windows MMDevice API.
pub struct DeviceEnumerator {
    enumerator: IMMDeviceEnumerator,
}

impl DeviceEnumerator {
    /// Create a new DeviceEnumerator.
    ///
    /// Note: COM must be initialized before calling this function.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                    .map_err(AudioError::EnumerationFailed)?;

            Ok(Self { enumerator })
        }
    }

    /// Snapshot all active endpoints, render and capture alike.
    ///
    /// Per-entry policy: an endpoint whose collection lookup or descriptor
    /// reads fail is skipped with a warning; one bad endpoint does not
    /// fail the snapshot.
    pub fn get_devices(&self) -> Result<Vec<AudioDevice>, AudioError> {
        unsafe {
            let collection = self
                .enumerator
                .EnumAudioEndpoints(eAll, DEVICE_STATE_ACTIVE)
                .map_err(AudioError::EnumerationFailed)?;

            let count = collection
                .GetCount()
                .map_err(AudioError::EnumerationFailed)?;

            let mut devices = Vec::with_capacity(count as usize);

            for i in 0..count {
                let device = match collection.Item(i) {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("skipping endpoint {i}: {e}");
                        continue;
                    }
                };

                match self.device_to_descriptor(&device) {
                    Ok(desc) => devices.push(desc),
                    Err(e) => {
                        tracing::warn!("skipping endpoint {i}: {e}");
                    }
                }
            }

            Ok(devices)
        }
    }

    /// Resolve a device by its opaque ID.
    ///
    /// An ID that matches no currently-present device is a typed
    /// `DeviceNotFound` error, never a silently substituted default.
    pub fn get_device(&self, device_id: &str) -> Result<IMMDevice, AudioError> {
        unsafe {
            let device_id_wide: Vec<u16> =
                device_id.encode_utf16().chain(std::iter::once(0)).collect();

            self.enumerator
                .GetDevice(PCWSTR::from_raw(device_id_wide.as_ptr()))
                .map_err(|_| AudioError::DeviceNotFound {
                    device_id: device_id.to_string(),
                })
        }
    }

    /// Resolve a device by ID and build its descriptor.
    pub fn get_device_descriptor(&self, device_id: &str) -> Result<AudioDevice, AudioError> {
        let device = self.get_device(device_id)?;
        self.device_to_descriptor(&device)
    }

    /// Get the default endpoint for the given data-flow direction.
    pub fn get_default_device(&self, flow: DataFlow) -> Result<AudioDevice, AudioError> {
        unsafe {
            let device = self
                .enumerator
                .GetDefaultAudioEndpoint(to_edataflow(flow), eConsole)
                .map_err(|_| AudioError::NoDefaultDevice)?;

            self.device_to_descriptor(&device)
        }
    }

    /// Convert an IMMDevice to an AudioDevice descriptor.
    fn device_to_descriptor(&self, device: &IMMDevice) -> Result<AudioDevice, AudioError> {
        unsafe {
            let id = device.GetId().map_err(AudioError::EnumerationFailed)?;
            let id_string = take_com_string(id)?;

            let props: IPropertyStore = device
                .OpenPropertyStore(STGM(0))
                .map_err(AudioError::EnumerationFailed)?;

            let name = self
                .get_device_name(&props)
                .unwrap_or_else(|| "Unknown".to_string());

            // The endpoint interface carries the data-flow direction
            let endpoint: IMMEndpoint = device.cast().map_err(AudioError::EnumerationFailed)?;
            let flow = endpoint
                .GetDataFlow()
                .map_err(AudioError::EnumerationFailed)?;
            let flow = DataFlow::from_raw(flow.0).unwrap_or(DataFlow::All);

            Ok(AudioDevice {
                id: id_string,
                name,
                flow,
            })
        }
    }

    /// Get the friendly name of a device from its property store.
    fn get_device_name(&self, props: &IPropertyStore) -> Option<String> {
        unsafe {
            // Convert DEVPROPKEY to PROPERTYKEY
            let key = PROPERTYKEY {
                fmtid: DEVPKEY_Device_FriendlyName.fmtid,
                pid: DEVPKEY_Device_FriendlyName.pid,
            };

            let prop = match props.GetValue(&key) {
                Ok(p) => p,
                Err(_) => return None,
            };

            let s = prop.to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use windows::Win32::System::Com::CoTaskMemAlloc;

    #[test]
    fn com_string_is_taken_and_freed() {
        unsafe {
            let text: Vec<u16> = "{session.id}".encode_utf16().chain(std::iter::once(0)).collect();
            let buffer = CoTaskMemAlloc(text.len() * std::mem::size_of::<u16>()) as *mut u16;
            assert!(!buffer.is_null());
            std::ptr::copy_nonoverlapping(text.as_ptr(), buffer, text.len());

            let taken = take_com_string(PWSTR(buffer)).unwrap();
            assert_eq!(taken, "{session.id}");
        }
    }

    #[test]
    fn enumerates_active_endpoints() {
        let _com = ComGuard::new().unwrap();
        let enumerator = DeviceEnumerator::new().unwrap();
        let devices = enumerator.get_devices().unwrap();

        // May legitimately be empty on a headless machine, but every
        // returned descriptor must carry a usable ID.
        for device in &devices {
            assert!(!device.id.is_empty());
        }
    }

    #[test]
    fn unknown_device_id_is_not_found() {
        let _com = ComGuard::new().unwrap();
        let enumerator = DeviceEnumerator::new().unwrap();
        let err = enumerator.get_device("{no.such.device}").unwrap_err();
        assert!(matches!(err, AudioError::DeviceNotFound { .. }));
    }

    #[test]
    fn enumerated_device_resolves_by_id() {
        let _com = ComGuard::new().unwrap();
        let enumerator = DeviceEnumerator::new().unwrap();
        for device in enumerator.get_devices().unwrap() {
            let resolved = enumerator.get_device_descriptor(&device.id).unwrap();
            assert_eq!(resolved.id, device.id);
            assert_eq!(resolved.flow, device.flow);
        }
    }
}
