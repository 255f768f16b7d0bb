//! High-level environment wrappers for JVMTI and JNI.
//!
//! [`Jvmti`] covers the calls test agents make: buffer allocation, class
//! redefinition, capabilities, event notification, thread info, raw
//! monitors, method and class naming, thread-local storage, phase and error
//! names. A function-table slot the VM left empty is reported as
//! `JVMTI_ERROR_NOT_AVAILABLE`.
//!
//! [`JniEnv`] wraps the string calls the harness natives use.
//!
//! ```rust,ignore
//! use jvmti_harness::env::{enable_notification, Jvmti};
//! use jvmti_harness::sys::jvmti;
//!
//! let jvmti = Jvmti::new(vm).map_err(|_| ())?;
//! if !enable_notification(&jvmti, jvmti::JVMTI_EVENT_CLASS_PREPARE, std::ptr::null_mut()) {
//!     jvmti_harness::redefine::agent_failed();
//! }
//! ```

pub use crate::jni_wrapper::JniEnv;
pub use crate::jvmti_wrapper::{disable_notification, enable_notification, Jvmti};
