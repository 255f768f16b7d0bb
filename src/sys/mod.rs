//! Raw FFI declarations for JNI and JVMTI.
//!
//! Only the function-table slots the harness calls are named; everything
//! else is laid out as opaque padding so named slots keep their header offsets.

pub mod jni;
pub mod jvmti;
