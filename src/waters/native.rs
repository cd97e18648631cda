//! Dynamic binding to the MassLynxRaw shared library.
//!
//! The library is loaded at runtime with `libloading`, so the crate builds without the
//! vendor SDK installed. The location defaults to the platform file name for
//! `MassLynxRaw` (`MassLynxRaw.dll`, `libMassLynxRaw.so`, ...) and can be overridden with
//! the `MASSLYNX_SDK_LIBRARY` environment variable.
//!
//! All SDK calls return a status code, zero on success. Arrays and strings returned by
//! the SDK are owned by it; they are copied into Rust buffers and handed back with
//! `releaseMemory`.

use std::ffi::{c_char, c_float, c_int, c_uint, c_void, CStr, CString, OsString};
use std::path::Path;
use std::rc::Rc;

use libloading::Library;
use log::{debug, info};

use super::sdk::{MassLynxReader, MassLynxSdk, SdkArrays, SdkError};
use crate::license::LicenseKey;

/// Environment variable overriding the SDK library location.
pub const SDK_LIBRARY_ENV: &str = "MASSLYNX_SDK_LIBRARY";

/// Reader kinds accepted by `createRawReaderFromPath`.
const SCAN_READER: c_int = 1;
const INFO_READER: c_int = 2;
const CHROMATOGRAM_READER: c_int = 3;
const ANALOG_READER: c_int = 4;

type RawHandle = *mut c_void;

type SetLicenseKeyFn = unsafe extern "C" fn(*const c_char) -> c_int;
type CreateReaderFn = unsafe extern "C" fn(*const c_char, *mut RawHandle, c_int) -> c_int;
type DestroyReaderFn = unsafe extern "C" fn(RawHandle) -> c_int;
type ErrorMessageFn = unsafe extern "C" fn(c_int, *mut *mut c_char) -> c_int;
type ReleaseMemoryFn = unsafe extern "C" fn(*mut c_void) -> c_int;
type FunctionCountFn = unsafe extern "C" fn(RawHandle, *mut c_uint) -> c_int;
type ScanCountFn = unsafe extern "C" fn(RawHandle, c_int, *mut c_int) -> c_int;
type IonModeFn = unsafe extern "C" fn(RawHandle, c_int, *mut c_int) -> c_int;
type IonModeStringFn = unsafe extern "C" fn(RawHandle, c_int, *mut *mut c_char) -> c_int;
type ChannelCountFn = unsafe extern "C" fn(RawHandle, *mut c_int) -> c_int;
type ChannelDescFn = unsafe extern "C" fn(RawHandle, c_int, *mut *mut c_char) -> c_int;
type ReadChannelFn =
    unsafe extern "C" fn(RawHandle, c_int, *mut *mut c_float, *mut *mut c_float, *mut c_int) -> c_int;
type ReadTicFn =
    unsafe extern "C" fn(RawHandle, c_int, *mut *mut c_float, *mut *mut c_float, *mut c_int) -> c_int;
type ReadScanFn = unsafe extern "C" fn(
    RawHandle,
    c_int,
    c_int,
    *mut *mut c_float,
    *mut *mut c_float,
    *mut c_int,
) -> c_int;

/// Entry points resolved from the loaded library.
///
/// The function pointers are only valid while `_library` is loaded, so the struct is
/// shared behind an `Rc` by every reader created from it.
struct Api {
    set_license_key: SetLicenseKeyFn,
    create_reader: CreateReaderFn,
    destroy_reader: DestroyReaderFn,
    error_message: ErrorMessageFn,
    release_memory: ReleaseMemoryFn,
    function_count: FunctionCountFn,
    scan_count: ScanCountFn,
    ion_mode: IonModeFn,
    ion_mode_string: IonModeStringFn,
    channel_count: ChannelCountFn,
    channel_desc: ChannelDescFn,
    read_channel: ReadChannelFn,
    read_tic: ReadTicFn,
    read_scan: ReadScanFn,
    _library: Library,
}

fn symbol<T: Copy>(library: &Library, name: &str) -> Result<T, SdkError> {
    let mut bytes = name.as_bytes().to_vec();
    bytes.push(0);
    // SAFETY: every type alias above matches the C prototype of the named entry point.
    unsafe { library.get::<T>(&bytes) }
        .map(|sym| *sym)
        .map_err(|e| SdkError::Unavailable(format!("MassLynx SDK symbol '{}' missing: {}", name, e)))
}

impl Api {
    fn load(location: OsString) -> Result<Self, SdkError> {
        // SAFETY: loading runs the library initialisers of the vendor SDK, which has no
        // preconditions beyond being the genuine MassLynxRaw library.
        let library = unsafe { Library::new(&location) }.map_err(|e| {
            SdkError::Unavailable(format!(
                "cannot load MassLynx SDK from {}: {} (set {} to the library path)",
                location.to_string_lossy(),
                e,
                SDK_LIBRARY_ENV
            ))
        })?;
        info!("Loaded MassLynx SDK from {}", location.to_string_lossy());

        Ok(Self {
            set_license_key: symbol(&library, "setLicenseKey")?,
            create_reader: symbol(&library, "createRawReaderFromPath")?,
            destroy_reader: symbol(&library, "destroyRawReader")?,
            error_message: symbol(&library, "getErrorMessage")?,
            release_memory: symbol(&library, "releaseMemory")?,
            function_count: symbol(&library, "getFunctionCount")?,
            scan_count: symbol(&library, "getScanCount")?,
            ion_mode: symbol(&library, "getIonMode")?,
            ion_mode_string: symbol(&library, "getIonModeString")?,
            channel_count: symbol(&library, "getChannelCount")?,
            channel_desc: symbol(&library, "getChannelDesc")?,
            read_channel: symbol(&library, "readChannel")?,
            read_tic: symbol(&library, "readTICChromatogram")?,
            read_scan: symbol(&library, "readScan")?,
            _library: library,
        })
    }

    /// Copy an SDK-owned C string and release it.
    unsafe fn take_string(&self, ptr: *mut c_char) -> String {
        if ptr.is_null() {
            return String::new();
        }
        let value = CStr::from_ptr(ptr).to_string_lossy().into_owned();
        (self.release_memory)(ptr.cast());
        value
    }

    /// Copy a pair of SDK-owned float arrays of length `size` and release them.
    unsafe fn take_arrays(&self, x: *mut c_float, y: *mut c_float, size: c_int) -> SdkArrays {
        let len = usize::try_from(size).unwrap_or(0);
        let copy = |ptr: *mut c_float| {
            if ptr.is_null() || len == 0 {
                Vec::new()
            } else {
                std::slice::from_raw_parts(ptr, len).to_vec()
            }
        };
        let arrays = (copy(x), copy(y));
        for ptr in [x, y] {
            if !ptr.is_null() {
                (self.release_memory)(ptr.cast());
            }
        }
        arrays
    }

    fn message(&self, code: c_int) -> String {
        let mut ptr: *mut c_char = std::ptr::null_mut();
        // SAFETY: getErrorMessage writes an SDK-owned string pointer or leaves it null.
        unsafe {
            if (self.error_message)(code, &mut ptr) != 0 {
                return format!("unknown error {}", code);
            }
            self.take_string(ptr)
        }
    }

    fn check(&self, call: &'static str, code: c_int) -> Result<(), SdkError> {
        if code == 0 {
            return Ok(());
        }
        Err(SdkError::Call {
            call,
            code,
            message: self.message(code),
        })
    }
}

/// The MassLynx SDK loaded from a shared library.
#[derive(Clone)]
pub struct NativeSdk {
    api: Rc<Api>,
}

impl NativeSdk {
    /// Load the SDK from `MASSLYNX_SDK_LIBRARY`, or the platform default file name.
    pub fn load() -> Result<Self, SdkError> {
        let location = std::env::var_os(SDK_LIBRARY_ENV)
            .unwrap_or_else(|| libloading::library_filename("MassLynxRaw"));
        Self::load_from(location)
    }

    /// Load the SDK from an explicit library path.
    pub fn load_from(location: impl Into<OsString>) -> Result<Self, SdkError> {
        Ok(Self {
            api: Rc::new(Api::load(location.into())?),
        })
    }
}

impl std::fmt::Debug for NativeSdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeSdk").finish_non_exhaustive()
    }
}

impl MassLynxSdk for NativeSdk {
    fn open(&self, path: &Path, key: &LicenseKey) -> Result<Box<dyn MassLynxReader>, SdkError> {
        let api = &self.api;

        let c_key = CString::new(key.as_str()).map_err(|_| {
            SdkError::LicenseRejected("license key contains a NUL byte".to_string())
        })?;
        // SAFETY: the key pointer is valid for the duration of the call.
        let code = unsafe { (api.set_license_key)(c_key.as_ptr()) };
        if code != 0 {
            return Err(SdkError::LicenseRejected(api.message(code)));
        }

        let c_path = CString::new(path.to_string_lossy().as_bytes()).map_err(|_| SdkError::Call {
            call: "createRawReaderFromPath",
            code: -1,
            message: format!("path contains a NUL byte: {}", path.display()),
        })?;

        let mut reader = NativeReader {
            api: Rc::clone(api),
            info: std::ptr::null_mut(),
            analog: std::ptr::null_mut(),
            chromatogram: std::ptr::null_mut(),
            scan: std::ptr::null_mut(),
        };
        for (kind, slot) in [
            (INFO_READER, &mut reader.info),
            (ANALOG_READER, &mut reader.analog),
            (CHROMATOGRAM_READER, &mut reader.chromatogram),
            (SCAN_READER, &mut reader.scan),
        ] {
            // SAFETY: the path pointer is valid for the call and the SDK writes a reader
            // handle into `slot`, which `NativeReader::drop` destroys.
            let code = unsafe { (api.create_reader)(c_path.as_ptr(), slot, kind) };
            api.check("createRawReaderFromPath", code)?;
        }
        debug!("Opened MassLynx readers for {}", path.display());

        Ok(Box::new(reader))
    }
}

/// The four SDK readers for one raw directory. Destroyed on drop.
///
/// Holds raw handles and is therefore neither `Send` nor `Sync`.
struct NativeReader {
    api: Rc<Api>,
    info: RawHandle,
    analog: RawHandle,
    chromatogram: RawHandle,
    scan: RawHandle,
}

fn to_c_index(call: &'static str, index: usize) -> Result<c_int, SdkError> {
    c_int::try_from(index).map_err(|_| SdkError::Call {
        call,
        code: -1,
        message: format!("index {} out of range", index),
    })
}

impl NativeReader {
    fn read_arrays(
        &self,
        call: &'static str,
        read: impl FnOnce(*mut *mut c_float, *mut *mut c_float, *mut c_int) -> c_int,
    ) -> Result<SdkArrays, SdkError> {
        let mut x: *mut c_float = std::ptr::null_mut();
        let mut y: *mut c_float = std::ptr::null_mut();
        let mut size: c_int = 0;
        let code = read(&mut x, &mut y, &mut size);
        self.api.check(call, code)?;
        // SAFETY: on success the SDK returned two arrays of `size` floats it owns.
        Ok(unsafe { self.api.take_arrays(x, y, size) })
    }

    fn read_string(
        &self,
        call: &'static str,
        read: impl FnOnce(*mut *mut c_char) -> c_int,
    ) -> Result<String, SdkError> {
        let mut ptr: *mut c_char = std::ptr::null_mut();
        let code = read(&mut ptr);
        self.api.check(call, code)?;
        // SAFETY: on success the SDK returned a NUL-terminated string it owns.
        Ok(unsafe { self.api.take_string(ptr) })
    }
}

impl MassLynxReader for NativeReader {
    fn function_count(&self) -> Result<usize, SdkError> {
        let mut count: c_uint = 0;
        // SAFETY: `info` is a live info reader handle.
        let code = unsafe { (self.api.function_count)(self.info, &mut count) };
        self.api.check("getFunctionCount", code)?;
        Ok(count as usize)
    }

    fn ion_mode(&self, function: usize) -> Result<i32, SdkError> {
        let function = to_c_index("getIonMode", function)?;
        let mut mode: c_int = 0;
        // SAFETY: `info` is a live info reader handle.
        let code = unsafe { (self.api.ion_mode)(self.info, function, &mut mode) };
        self.api.check("getIonMode", code)?;
        Ok(mode)
    }

    fn ion_mode_string(&self, code: i32) -> Result<String, SdkError> {
        let info = self.info;
        let api = &self.api;
        // SAFETY: `info` is a live info reader handle.
        self.read_string("getIonModeString", |out| unsafe {
            (api.ion_mode_string)(info, code, out)
        })
    }

    fn scan_count(&self, function: usize) -> Result<usize, SdkError> {
        let function = to_c_index("getScanCount", function)?;
        let mut count: c_int = 0;
        // SAFETY: `info` is a live info reader handle.
        let code = unsafe { (self.api.scan_count)(self.info, function, &mut count) };
        self.api.check("getScanCount", code)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn analog_channel_count(&self) -> Result<usize, SdkError> {
        let mut count: c_int = 0;
        // SAFETY: `analog` is a live analog reader handle.
        let code = unsafe { (self.api.channel_count)(self.analog, &mut count) };
        self.api.check("getChannelCount", code)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn analog_channel_description(&self, channel: usize) -> Result<String, SdkError> {
        let channel = to_c_index("getChannelDesc", channel)?;
        let analog = self.analog;
        let api = &self.api;
        // SAFETY: `analog` is a live analog reader handle.
        self.read_string("getChannelDesc", |out| unsafe {
            (api.channel_desc)(analog, channel, out)
        })
    }

    fn read_analog_channel(&self, channel: usize) -> Result<SdkArrays, SdkError> {
        let channel = to_c_index("readChannel", channel)?;
        let analog = self.analog;
        let api = &self.api;
        // SAFETY: `analog` is a live analog reader handle.
        self.read_arrays("readChannel", |x, y, size| unsafe {
            (api.read_channel)(analog, channel, x, y, size)
        })
    }

    fn read_tic(&self, function: usize) -> Result<SdkArrays, SdkError> {
        let function = to_c_index("readTICChromatogram", function)?;
        let chromatogram = self.chromatogram;
        let api = &self.api;
        // SAFETY: `chromatogram` is a live chromatogram reader handle.
        self.read_arrays("readTICChromatogram", |x, y, size| unsafe {
            (api.read_tic)(chromatogram, function, x, y, size)
        })
    }

    fn read_scan(&self, function: usize, scan: usize) -> Result<SdkArrays, SdkError> {
        let function = to_c_index("readScan", function)?;
        let scan = to_c_index("readScan", scan)?;
        let reader = self.scan;
        let api = &self.api;
        // SAFETY: `scan` is a live scan reader handle.
        self.read_arrays("readScan", |x, y, size| unsafe {
            (api.read_scan)(reader, function, scan, x, y, size)
        })
    }
}

impl Drop for NativeReader {
    fn drop(&mut self) {
        for handle in [self.scan, self.chromatogram, self.analog, self.info] {
            if handle.is_null() {
                continue;
            }
            // SAFETY: each non-null handle was created by createRawReaderFromPath and is
            // destroyed exactly once.
            let code = unsafe { (self.api.destroy_reader)(handle) };
            if code != 0 {
                log::warn!("destroyRawReader failed with code {}", code);
            }
        }
    }
}
