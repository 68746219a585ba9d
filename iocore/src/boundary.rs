//! C ABI surface of the engine.
//!
//! Two symbols are exported:
//!
//! - `ProcessImage(input, output)` returns NULL on success or an owned,
//!   NUL-terminated UTF-8 error message on failure.
//! - `FreeString(message)` releases a message returned by `ProcessImage`.
//!   Passing NULL is a no-op; releasing the same message twice is undefined.
//!
//! Every fault, including a panic, is converted into a message before it can
//! reach the caller.

use std::any::Any;
use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use crate::error::JobError;
use crate::executor::Executor;
use crate::job::Job;
use crate::logging;

/// An error message owned by whoever holds this value.
///
/// Crossing the boundary goes through [`ErrorMessage::into_raw`]; the only
/// way back is [`ErrorMessage::from_raw`], which `FreeString` uses to drop it.
#[derive(Debug, PartialEq, Eq)]
pub struct ErrorMessage(CString);

impl ErrorMessage {
    /// Builds a message, replacing interior NUL bytes so it survives the trip.
    pub fn new(text: &str) -> Self {
        let text = text.replace('\0', "\u{FFFD}");
        Self(CString::new(text).unwrap_or_else(|_| c"Unrepresentable error message".to_owned()))
    }

    /// Message text.
    pub fn text(&self) -> Cow<'_, str> {
        self.0.to_string_lossy()
    }

    /// Hands ownership to the caller as a raw C string.
    pub fn into_raw(self) -> *mut c_char {
        self.0.into_raw()
    }

    /// Takes ownership back from a pointer produced by [`ErrorMessage::into_raw`].
    ///
    /// Returns `None` for NULL.
    ///
    /// # Safety
    /// `ptr` must be NULL or come from [`ErrorMessage::into_raw`] and must not
    /// have been reclaimed before.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }
        // SAFETY: guaranteed by the caller; the pointer came from `CString::into_raw`.
        Some(Self(unsafe { CString::from_raw(ptr) }))
    }
}

/// Result of a boundary call: exactly one of success or an owned message.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The job completed.
    Success,
    /// The job failed with this message.
    Failure(ErrorMessage),
}

impl Outcome {
    /// Encodes the outcome for the C ABI: NULL for success, an owned string otherwise.
    pub fn into_raw(self) -> *mut c_char {
        match self {
            Outcome::Success => ptr::null_mut(),
            Outcome::Failure(message) => message.into_raw(),
        }
    }
}

impl From<Result<(), JobError>> for Outcome {
    fn from(result: Result<(), JobError>) -> Self {
        match result {
            Ok(()) => Outcome::Success,
            Err(e) => Outcome::Failure(ErrorMessage::new(&e.to_string())),
        }
    }
}

/// Reads a path argument.
///
/// # Safety
/// `ptr` must be NULL or a valid NUL-terminated string that outlives the call.
unsafe fn read_path<'a>(ptr: *const c_char, which: &'static str) -> Result<&'a str, JobError> {
    if ptr.is_null() {
        return Err(JobError::InvalidPath {
            which,
            reason: "null pointer",
        });
    }
    // SAFETY: checked for NULL above; validity is the caller's contract.
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| JobError::InvalidPath {
            which,
            reason: "not valid UTF-8",
        })
}

/// Runs one job described by two C strings.
///
/// # Safety
/// Both pointers must be NULL or valid NUL-terminated strings for the
/// duration of the call.
pub unsafe fn process(input: *const c_char, output: *const c_char) -> Outcome {
    // SAFETY: forwarded from this function's contract.
    unsafe { process_with(input, output, Executor::from_env) }
}

/// Like [`process`], building the executor with `executor` inside the
/// panic guard.
///
/// # Safety
/// Same contract as [`process`].
pub unsafe fn process_with<F>(input: *const c_char, output: *const c_char, executor: F) -> Outcome
where
    F: FnOnce() -> Result<Executor, JobError>,
{
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: forwarded from this function's contract.
        let source = unsafe { read_path(input, "source") }?;
        let destination = unsafe { read_path(output, "destination") }?;
        let job = Job::new(source, destination)?;
        executor()?.execute(&job)
    }))
    .unwrap_or_else(|payload| Err(JobError::Panicked(panic_message(payload.as_ref()))));

    if let Err(e) = &result {
        tracing::error!(error = %e, kind = ?e.kind(), "image processing failed");
    }
    Outcome::from(result)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Processes `input` into `output`.
///
/// Returns NULL on success. On failure returns an error message the caller
/// owns and must release with `FreeString`.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "C" fn ProcessImage(input: *const c_char, output: *const c_char) -> *mut c_char {
    logging::init_tracing();

    // SAFETY:
    // - FFI contract requires both arguments to be NULL or valid NUL-terminated
    //   strings that remain valid for the duration of this call.
    // - NULL is handled inside `process`.
    unsafe { process(input, output) }.into_raw()
}

/// Releases a message returned by `ProcessImage`. NULL is ignored.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "C" fn FreeString(message: *mut c_char) {
    // SAFETY:
    // - FFI contract requires `message` to be NULL or a pointer returned by
    //   `ProcessImage` that has not been released yet.
    drop(unsafe { ErrorMessage::from_raw(message) });
}
