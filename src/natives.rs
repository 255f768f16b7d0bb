//! JNI natives backing the managed side of the harness
//! (`nsk.share.jvmti.ArgumentHandler` and `nsk.share.jvmti.RedefineAgent`).
//!
//! The functions here hold the logic; [`export_harness_natives!`] emits the
//! `#[no_mangle]` symbols the JVM binds to.

use std::ptr;

use crate::context;
use crate::jni_wrapper::JniEnv;
use crate::redefine;
use crate::sys::jni;

fn to_jboolean(value: bool) -> jni::jboolean {
    if value { jni::JNI_TRUE } else { jni::JNI_FALSE }
}

/// Java string holding the installed option string.
///
/// # Safety
/// `env` must be the JNI environment of the calling thread.
pub unsafe fn agent_options_string(env: *mut jni::JNIEnv) -> jni::jstring {
    let jni = JniEnv::from_raw(env);
    let raw = context::raw_options();
    match jni.new_string_utf(&raw) {
        Some(s) => s,
        None => {
            log::error!("failed to create Java string for agent options");
            ptr::null_mut()
        }
    }
}

pub fn redefine_attempted() -> jni::jboolean {
    to_jboolean(redefine::status().attempted())
}

pub fn is_redefined() -> jni::jboolean {
    to_jboolean(redefine::status().succeeded())
}

/// `JNI_TRUE` until the agent records a failure.
pub fn agent_status() -> jni::jboolean {
    to_jboolean(!redefine::status().agent_failed())
}

/// Emits the harness JNI natives into the agent library.
///
/// ```rust,ignore
/// jvmti_harness::export_agent!(MyAgent);
/// jvmti_harness::export_harness_natives!();
/// ```
#[macro_export]
macro_rules! export_harness_natives {
    () => {
        #[no_mangle]
        pub unsafe extern "system" fn Java_nsk_share_jvmti_ArgumentHandler_getAgentOptionsString(
            env: *mut $crate::sys::jni::JNIEnv,
            _obj: $crate::sys::jni::jobject,
        ) -> $crate::sys::jni::jstring {
            $crate::natives::agent_options_string(env)
        }

        #[no_mangle]
        pub extern "system" fn Java_nsk_share_jvmti_RedefineAgent_redefineAttempted(
            _env: *mut $crate::sys::jni::JNIEnv,
            _obj: $crate::sys::jni::jobject,
        ) -> $crate::sys::jni::jboolean {
            $crate::natives::redefine_attempted()
        }

        #[no_mangle]
        pub extern "system" fn Java_nsk_share_jvmti_RedefineAgent_isRedefined(
            _env: *mut $crate::sys::jni::JNIEnv,
            _obj: $crate::sys::jni::jobject,
        ) -> $crate::sys::jni::jboolean {
            $crate::natives::is_redefined()
        }

        #[no_mangle]
        pub extern "system" fn Java_nsk_share_jvmti_RedefineAgent_agentStatus(
            _env: *mut $crate::sys::jni::JNIEnv,
            _obj: $crate::sys::jni::jobject,
        ) -> $crate::sys::jni::jboolean {
            $crate::natives::agent_status()
        }
    };
}
