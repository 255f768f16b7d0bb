//! Thread filtering for tests that count or track application threads.

use crate::jvmti_wrapper::Jvmti;
use crate::logging;
use crate::sys::jni;

/// VM service threads started by JFR that tests must not account for.
pub const UNEXPECTED_THREAD_NAMES: [&str; 2] = ["VM JFR Buffer Thread", "JFR request timer"];

pub fn is_expected_thread_name(name: &str) -> bool {
    !UNEXPECTED_THREAD_NAMES.contains(&name)
}

/// Whether `thread` belongs to the test rather than to JFR.
///
/// A thread whose name cannot be read is reported as expected.
pub fn is_thread_expected(jvmti: &Jvmti, thread: jni::jthread) -> bool {
    match logging::traced("GetThreadInfo", || jvmti.get_thread_name(thread)) {
        Ok(name) => is_expected_thread_name(&name),
        Err(err) => {
            log::error!("GetThreadInfo failed: {}", err);
            true
        }
    }
}
