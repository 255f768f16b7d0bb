//! Introspection helpers used in event callbacks.

use crate::error::JvmtiError;
use crate::jvmti_wrapper::Jvmti;
use crate::sys::{jni, jvmti};

/// JVMTI execution phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    OnLoad,
    Primordial,
    Start,
    Live,
    Dead,
}

impl Phase {
    pub fn from_raw(raw: jni::jint) -> Option<Self> {
        match raw {
            jvmti::JVMTI_PHASE_ONLOAD => Some(Phase::OnLoad),
            jvmti::JVMTI_PHASE_PRIMORDIAL => Some(Phase::Primordial),
            jvmti::JVMTI_PHASE_START => Some(Phase::Start),
            jvmti::JVMTI_PHASE_LIVE => Some(Phase::Live),
            jvmti::JVMTI_PHASE_DEAD => Some(Phase::Dead),
            _ => None,
        }
    }

    pub fn current(jvmti: &Jvmti) -> Result<Self, JvmtiError> {
        let raw = jvmti.get_phase()?;
        Self::from_raw(raw).ok_or(JvmtiError::INTERNAL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodName {
    pub class_sig: String,
    pub method_name: String,
}

/// Declaring class signature and name of `method`.
pub fn method_name(jvmti: &Jvmti, method: jni::jmethodID) -> Result<MethodName, JvmtiError> {
    let class = jvmti.get_method_declaring_class(method)?;
    let (class_sig, _) = jvmti.get_class_signature(class)?;
    let (method_name, _, _) = jvmti.get_method_name(method)?;
    Ok(MethodName { class_sig, method_name })
}

/// `"<class signature> .<method> :<location>"`, or `"NONE"` if the method
/// cannot be named.
pub fn location_to_string(jvmti: &Jvmti, method: jni::jmethodID, location: jvmti::jlocation) -> String {
    match method_name(jvmti, method) {
        Ok(name) => format!("{} .{} :{}", name.class_sig, name.method_name, location),
        Err(err) => {
            log::debug!("cannot name method for location {}: {}", location, err);
            "NONE".to_string()
        }
    }
}

/// Per-thread agent state kept in JVMTI thread-local storage.
///
/// The first call for a thread installs `T::default()`. The value lives as
/// long as the process.
///
/// # Safety
///
/// Every call for a given thread must use the same `T`, and nothing else may
/// write that thread's local storage.
pub unsafe fn thread_local_state<T: Default>(jvmti: &Jvmti, thread: jni::jthread) -> Result<&'static T, JvmtiError> {
    let existing = jvmti.get_thread_local_storage(thread)?;
    if !existing.is_null() {
        return Ok(&*(existing as *const T));
    }

    let state: &'static mut T = Box::leak(Box::default());
    let ptr = state as *mut T;
    if let Err(err) = jvmti.set_thread_local_storage(thread, ptr as *const _) {
        drop(Box::from_raw(ptr));
        return Err(err);
    }
    Ok(&*ptr)
}
