use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;

use libloading::{Library, Symbol};

use crate::error::ClientError;
use crate::locator::LibraryLocator;

/// Signature of the exported `ProcessImage` function.
///
/// Returns NULL on success or an owned error message to be released with [`FreeFn`].
pub type ProcessFn = unsafe extern "C" fn(*const c_char, *const c_char) -> *mut c_char;

/// Signature of the exported `FreeString` function.
pub type FreeFn = unsafe extern "C" fn(*mut c_char);

/// The pair of entry points the engine exports.
#[derive(Clone, Copy)]
pub struct Exports {
    /// `ProcessImage`.
    pub process: ProcessFn,
    /// `FreeString`.
    pub free: FreeFn,
}

/// Handle on a loaded engine.
pub struct IoCore {
    exports: Exports,
    // Keeps the function pointers in `exports` valid.
    _lib: Option<Library>,
}

impl IoCore {
    /// Loads the engine library at `path` and resolves its exports.
    ///
    /// # SAFETY
    /// The caller must ensure that the library at `path`:
    /// - exports `ProcessImage` and `FreeString` with the exact `ProcessFn` / `FreeFn` ABI,
    /// - returns messages from `ProcessImage` that `FreeString` can release,
    /// - runs no unsound initialisation code when loaded.
    pub unsafe fn load(path: &Path) -> Result<Self, ClientError> {
        let lib = unsafe { Library::new(path)? };
        let exports = {
            let process: Symbol<ProcessFn> = unsafe { lib.get(b"ProcessImage")? };
            let free: Symbol<FreeFn> = unsafe { lib.get(b"FreeString")? };
            Exports {
                process: *process,
                free: *free,
            }
        };

        tracing::debug!(path = %path.display(), "loaded iocore library");
        Ok(Self {
            exports,
            _lib: Some(lib),
        })
    }

    /// Resolves the library through `locator` and loads it.
    ///
    /// # SAFETY
    /// Same contract as [`IoCore::load`] for whichever file the locator finds.
    pub unsafe fn locate(locator: &LibraryLocator) -> Result<Self, ClientError> {
        let path = locator.resolve()?;
        unsafe { Self::load(&path) }
    }

    /// Wraps entry points that are already linked into the process.
    ///
    /// # SAFETY
    /// `exports` must honour the same contract as the symbols of [`IoCore::load`].
    pub unsafe fn from_exports(exports: Exports) -> Self {
        Self { exports, _lib: None }
    }

    /// Processes `input` into `output`.
    ///
    /// Any message returned by the engine is copied and released before this
    /// function returns.
    pub fn process_image(&self, input: &Path, output: &Path) -> Result<(), ClientError> {
        let input_c = to_cstring(input)?;
        let output_c = to_cstring(output)?;

        // SAFETY:
        // - Both arguments are valid NUL-terminated strings alive for the whole call.
        // - `exports.process` follows the contract established when `self` was built.
        let raw = unsafe { (self.exports.process)(input_c.as_ptr(), output_c.as_ptr()) };
        if raw.is_null() {
            return Ok(());
        }

        let message = ForeignMessage {
            ptr: raw,
            free: self.exports.free,
        };
        Err(ClientError::Engine(message.text()))
    }
}

/// Engine-owned message, released through `FreeString` on drop.
struct ForeignMessage {
    ptr: *mut c_char,
    free: FreeFn,
}

impl ForeignMessage {
    fn text(&self) -> String {
        // SAFETY: `ptr` is a non-NULL, NUL-terminated string the engine handed over.
        unsafe { CStr::from_ptr(self.ptr) }
            .to_string_lossy()
            .into_owned()
    }
}

impl Drop for ForeignMessage {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from `ProcessImage` and is released exactly once, here.
        unsafe { (self.free)(self.ptr) };
    }
}

fn to_cstring(path: &Path) -> Result<CString, ClientError> {
    let text = path.to_str().ok_or_else(|| ClientError::InvalidPath {
        path: path.to_path_buf(),
        reason: "not valid UTF-8",
    })?;
    CString::new(text).map_err(|_| ClientError::InvalidPath {
        path: path.to_path_buf(),
        reason: "contains a NUL byte",
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    static FREED: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn fail(_input: *const c_char, _output: *const c_char) -> *mut c_char {
        CString::new("boom").unwrap().into_raw()
    }

    unsafe extern "C" fn succeed(_input: *const c_char, _output: *const c_char) -> *mut c_char {
        std::ptr::null_mut()
    }

    unsafe extern "C" fn counting_free(ptr: *mut c_char) {
        if !ptr.is_null() {
            drop(unsafe { CString::from_raw(ptr) });
            FREED.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn failure_message_is_copied_and_released_once() {
        let core = unsafe {
            IoCore::from_exports(Exports {
                process: fail,
                free: counting_free,
            })
        };
        let before = FREED.load(Ordering::SeqCst);

        let err = core
            .process_image(Path::new("in.png"), Path::new("out.png"))
            .unwrap_err();

        assert!(matches!(err, ClientError::Engine(ref m) if m == "boom"));
        assert_eq!(FREED.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn null_result_is_success() {
        let core = unsafe {
            IoCore::from_exports(Exports {
                process: succeed,
                free: counting_free,
            })
        };
        assert!(core.process_image(Path::new("in.png"), Path::new("out.png")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_path_is_rejected_before_the_call() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"bad\xffname.png"));
        assert!(matches!(
            to_cstring(path),
            Err(ClientError::InvalidPath { reason: "not valid UTF-8", .. })
        ));
    }

    #[test]
    fn missing_library_fails_to_load() {
        let result = unsafe { IoCore::load(Path::new("/nonexistent/libiocore.so")) };
        assert!(matches!(result, Err(ClientError::Load(_))));
    }
}
