use std::ffi::CString;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use jvmti_harness::options::OptionTable;
use jvmti_harness::sys::jni;
use jvmti_harness::{context, load_agent, natives, redefine, Agent};

// Every test here touches the same process-wide state.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

#[test]
fn install_replaces_the_previous_table() {
    let _guard = serial();

    let table = context::install_options(Some("waittime=7 mode=fast")).unwrap();
    assert_eq!(table.count(), 2);
    assert_eq!(context::wait_time(), 7);
    assert_eq!(context::raw_options(), "waittime=7 mode=fast");

    context::install_options(Some("other=1")).unwrap();
    let installed = context::options();
    assert_eq!(installed.count(), 1);
    assert_eq!(installed.find_value("mode").unwrap(), None);
    assert_eq!(installed.wait_time(), 2);
}

#[test]
fn failed_install_leaves_an_empty_table() {
    let _guard = serial();

    context::install_options(Some("waittime=9 a=1")).unwrap();
    assert!(context::install_options(Some("-trace=bogus")).is_err());

    assert_eq!(context::options().count(), 0);
    assert_eq!(context::wait_time(), 2);
    assert_eq!(context::raw_options(), "");
}

#[test]
fn wait_time_can_be_changed_after_install() {
    let _guard = serial();

    context::install_options(None).unwrap();
    context::set_wait_time(15);
    assert_eq!(context::wait_time(), 15);
    assert_eq!(context::with_options(OptionTable::wait_time), 15);

    context::reset();
    assert_eq!(context::wait_time(), 2);
}

#[test]
fn status_natives_follow_the_redefine_status() {
    let _guard = serial();

    redefine::status().reset();
    assert_eq!(natives::redefine_attempted(), jni::JNI_FALSE);
    assert_eq!(natives::is_redefined(), jni::JNI_FALSE);
    assert_eq!(natives::agent_status(), jni::JNI_TRUE);

    redefine::status().mark_attempted();
    assert_eq!(natives::redefine_attempted(), jni::JNI_TRUE);
    assert_eq!(natives::is_redefined(), jni::JNI_FALSE);

    redefine::agent_failed();
    assert_eq!(natives::agent_status(), jni::JNI_FALSE);

    redefine::status().reset();
}

static LOADS: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct CountingAgent;

impl Agent for CountingAgent {
    fn on_load(&self, _vm: *mut jni::JavaVM, _options: &OptionTable) -> jni::jint {
        LOADS.fetch_add(1, Ordering::SeqCst);
        jni::JNI_OK
    }
}

#[test]
fn load_agent_installs_options_first() {
    let _guard = serial();

    // A parse error fails the load before the agent is registered.
    let bad = CString::new("-bogus=1").unwrap();
    let code = unsafe { load_agent(ptr::null_mut(), bad.as_ptr(), Box::new(CountingAgent)) };
    assert_eq!(code, jni::JNI_ERR);
    assert_eq!(LOADS.load(Ordering::SeqCst), 0);
    assert_eq!(context::options().count(), 0);

    let good = CString::new("-verbose~waittime=4~pathToNewByteCode=/x").unwrap();
    let code = unsafe { load_agent(ptr::null_mut(), good.as_ptr(), Box::new(CountingAgent)) };
    assert_eq!(code, jni::JNI_OK);
    assert_eq!(LOADS.load(Ordering::SeqCst), 1);
    assert_eq!(context::wait_time(), 4);
    assert!(context::options().is_verbose());

    // Only one agent per process, and a rejected load keeps the live options.
    let bad = CString::new("-trace=bogus").unwrap();
    let code = unsafe { load_agent(ptr::null_mut(), bad.as_ptr(), Box::new(CountingAgent)) };
    assert_eq!(code, jni::JNI_ERR);
    let code = unsafe { load_agent(ptr::null_mut(), ptr::null(), Box::new(CountingAgent)) };
    assert_eq!(code, jni::JNI_ERR);

    assert_eq!(LOADS.load(Ordering::SeqCst), 1);
    let installed = context::options();
    assert_eq!(installed.count(), 3);
    assert_eq!(installed.wait_time(), 4);
    assert_eq!(installed.find_value("pathToNewByteCode").unwrap(), Some("/x"));
    assert_eq!(context::raw_options(), "-verbose~waittime=4~pathToNewByteCode=/x");
}
