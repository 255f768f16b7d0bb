use std::ffi::CString;
use std::ptr;

use jvmti_harness::options::OptionTable;
use jvmti_harness::sys::jni;
use jvmti_harness::{load_agent, unload_agent, Agent};

#[derive(Default)]
struct PanickingAgent;

impl Agent for PanickingAgent {
    fn on_load(&self, _vm: *mut jni::JavaVM, options: &OptionTable) -> jni::jint {
        panic!("cannot load with {:?}", options.raw());
    }

    fn on_unload(&self) {
        panic!("cannot unload");
    }
}

#[test]
fn panics_do_not_cross_the_ffi_boundary() {
    let options = CString::new("a=1").unwrap();
    let code = unsafe { load_agent(ptr::null_mut(), options.as_ptr(), Box::new(PanickingAgent)) };
    assert_eq!(code, jni::JNI_ERR);

    unload_agent();
}
