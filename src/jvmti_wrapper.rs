use crate::logging;
use crate::redefine::Instrumentation;
use crate::sys::jni;
use crate::sys::jvmti;
use std::ffi::{c_char, c_void, CStr, CString};
use std::ptr;

/// Looks up a function-table slot, bailing out with `NOT_AVAILABLE` when the
/// VM left it empty. Must be used inside an `unsafe` block.
macro_rules! slot {
    ($self:ident . $name:ident) => {
        match (*(*$self.env).functions).$name {
            Some(f) => f,
            None => return Err(jvmti::jvmtiError::NOT_AVAILABLE),
        }
    };
}

/// A safe wrapper around the raw JVMTI Environment pointer.
pub struct Jvmti {
    env: *mut jvmti::jvmtiEnv,
}

impl Jvmti {
    /// Connects to the JVM and retrieves a JVMTI 1.2 environment.
    pub fn new(vm: *mut jni::JavaVM) -> Result<Self, jni::jint> {
        let mut env_ptr: *mut c_void = ptr::null_mut();

        unsafe {
            // vm -> *const JNIInvokeInterface_ -> GetEnv
            let get_env_fn = (**vm).GetEnv;
            let res = get_env_fn(vm, &mut env_ptr, jvmti::JVMTI_VERSION_1_2);
            if res != jni::JNI_OK {
                return Err(res);
            }
        }

        if env_ptr.is_null() {
            return Err(jni::JNI_ERR);
        }
        Ok(Jvmti { env: env_ptr as *mut jvmti::jvmtiEnv })
    }

    /// Create a Jvmti wrapper from a raw jvmtiEnv pointer
    ///
    /// # Safety
    /// The caller must ensure the pointer is valid for the duration of use.
    pub unsafe fn from_raw(env: *mut jvmti::jvmtiEnv) -> Self {
        Jvmti { env }
    }

    /// Get the raw jvmtiEnv pointer
    pub fn raw(&self) -> *mut jvmti::jvmtiEnv {
        self.env
    }

    /// Copies a VM-allocated C string and gives the memory back.
    unsafe fn take_string(&self, p: *mut c_char) -> Result<String, jvmti::jvmtiError> {
        if p.is_null() {
            return Ok(String::new());
        }
        let s = CStr::from_ptr(p).to_string_lossy().into_owned();
        self.deallocate(p as *mut u8)?;
        Ok(s)
    }

    unsafe fn take_optional_string(&self, p: *mut c_char) -> Result<Option<String>, jvmti::jvmtiError> {
        if p.is_null() {
            Ok(None)
        } else {
            self.take_string(p).map(Some)
        }
    }

    pub fn add_capabilities(&self, new_caps: &jvmti::jvmtiCapabilities) -> Result<(), jvmti::jvmtiError> {
        unsafe {
            let add_caps_fn = slot!(self.AddCapabilities);
            add_caps_fn(self.env, new_caps).into_result()
        }
    }

    pub fn set_event_notification_mode(&self, enable: bool, event_type: u32, thread: jni::jthread) -> Result<(), jvmti::jvmtiError> {
        let mode = if enable { jvmti::JVMTI_ENABLE } else { jvmti::JVMTI_DISABLE };
        unsafe {
            let set_mode_fn = slot!(self.SetEventNotificationMode);
            // thread may be null (all threads)
            set_mode_fn(self.env, mode, event_type, thread).into_result()
        }
    }

    pub fn get_thread_info(&self, thread: jni::jthread) -> Result<jvmti::jvmtiThreadInfo, jvmti::jvmtiError> {
        let mut info = jvmti::jvmtiThreadInfo::default();
        unsafe {
            let get_thread_info_fn = slot!(self.GetThreadInfo);
            get_thread_info_fn(self.env, thread, &mut info).into_result()?;
        }
        Ok(info)
    }

    /// Name of `thread`. The name buffer is released before returning.
    pub fn get_thread_name(&self, thread: jni::jthread) -> Result<String, jvmti::jvmtiError> {
        let info = self.get_thread_info(thread)?;
        unsafe { self.take_string(info.name) }
    }

    pub fn allocate(&self, size: jni::jlong) -> Result<*mut u8, jvmti::jvmtiError> {
        let mut mem_ptr: *mut u8 = ptr::null_mut();
        unsafe {
            let allocate_fn = slot!(self.Allocate);
            allocate_fn(self.env, size, &mut mem_ptr).into_result()?;
        }
        Ok(mem_ptr)
    }

    pub fn deallocate(&self, mem: *mut u8) -> Result<(), jvmti::jvmtiError> {
        if mem.is_null() {
            return Ok(());
        }
        unsafe {
            let deallocate_fn = slot!(self.Deallocate);
            deallocate_fn(self.env, mem).into_result()
        }
    }

    /// Returns `(signature, generic)`, e.g. `("Ljava/lang/String;", None)`.
    pub fn get_class_signature(&self, klass: jni::jclass) -> Result<(String, Option<String>), jvmti::jvmtiError> {
        let mut sig_ptr: *mut c_char = ptr::null_mut();
        let mut gen_ptr: *mut c_char = ptr::null_mut();

        unsafe {
            let get_class_sig_fn = slot!(self.GetClassSignature);
            get_class_sig_fn(self.env, klass, &mut sig_ptr, &mut gen_ptr).into_result()?;

            let signature = self.take_string(sig_ptr)?;
            let generic = self.take_optional_string(gen_ptr)?;
            Ok((signature, generic))
        }
    }

    /// Returns `(name, signature, generic)`.
    pub fn get_method_name(&self, method: jni::jmethodID) -> Result<(String, String, Option<String>), jvmti::jvmtiError> {
        let mut name_ptr: *mut c_char = ptr::null_mut();
        let mut sig_ptr: *mut c_char = ptr::null_mut();
        let mut gen_ptr: *mut c_char = ptr::null_mut();

        unsafe {
            let get_method_name_fn = slot!(self.GetMethodName);
            get_method_name_fn(self.env, method, &mut name_ptr, &mut sig_ptr, &mut gen_ptr).into_result()?;

            let name = self.take_string(name_ptr)?;
            let signature = self.take_string(sig_ptr)?;
            let generic = self.take_optional_string(gen_ptr)?;
            Ok((name, signature, generic))
        }
    }

    pub fn get_method_declaring_class(&self, method: jni::jmethodID) -> Result<jni::jclass, jvmti::jvmtiError> {
        let mut klass: jni::jclass = ptr::null_mut();
        unsafe {
            let get_fn = slot!(self.GetMethodDeclaringClass);
            get_fn(self.env, method, &mut klass).into_result()?;
        }
        Ok(klass)
    }

    pub fn redefine_classes(&self, class_definitions: &[jvmti::jvmtiClassDefinition]) -> Result<(), jvmti::jvmtiError> {
        unsafe {
            let redefine_fn = slot!(self.RedefineClasses);
            redefine_fn(self.env, class_definitions.len() as jni::jint, class_definitions.as_ptr()).into_result()
        }
    }

    pub fn create_raw_monitor(&self, name: &str) -> Result<jvmti::jrawMonitorID, jvmti::jvmtiError> {
        let c_name = CString::new(name).map_err(|_| jvmti::jvmtiError::ILLEGAL_ARGUMENT)?;
        let mut monitor: jvmti::jrawMonitorID = ptr::null_mut();
        unsafe {
            let create_fn = slot!(self.CreateRawMonitor);
            create_fn(self.env, c_name.as_ptr(), &mut monitor).into_result()?;
        }
        Ok(monitor)
    }

    pub fn destroy_raw_monitor(&self, monitor: jvmti::jrawMonitorID) -> Result<(), jvmti::jvmtiError> {
        unsafe {
            let destroy_fn = slot!(self.DestroyRawMonitor);
            destroy_fn(self.env, monitor).into_result()
        }
    }

    pub fn raw_monitor_enter(&self, monitor: jvmti::jrawMonitorID) -> Result<(), jvmti::jvmtiError> {
        unsafe {
            let enter_fn = slot!(self.RawMonitorEnter);
            enter_fn(self.env, monitor).into_result()
        }
    }

    pub fn raw_monitor_exit(&self, monitor: jvmti::jrawMonitorID) -> Result<(), jvmti::jvmtiError> {
        unsafe {
            let exit_fn = slot!(self.RawMonitorExit);
            exit_fn(self.env, monitor).into_result()
        }
    }

    pub fn raw_monitor_wait(&self, monitor: jvmti::jrawMonitorID, millis: jni::jlong) -> Result<(), jvmti::jvmtiError> {
        unsafe {
            let wait_fn = slot!(self.RawMonitorWait);
            wait_fn(self.env, monitor, millis).into_result()
        }
    }

    pub fn raw_monitor_notify(&self, monitor: jvmti::jrawMonitorID) -> Result<(), jvmti::jvmtiError> {
        unsafe {
            let notify_fn = slot!(self.RawMonitorNotify);
            notify_fn(self.env, monitor).into_result()
        }
    }

    pub fn raw_monitor_notify_all(&self, monitor: jvmti::jrawMonitorID) -> Result<(), jvmti::jvmtiError> {
        unsafe {
            let notify_all_fn = slot!(self.RawMonitorNotifyAll);
            notify_all_fn(self.env, monitor).into_result()
        }
    }

    pub fn get_thread_local_storage(&self, thread: jni::jthread) -> Result<*mut c_void, jvmti::jvmtiError> {
        let mut data: *mut c_void = ptr::null_mut();
        unsafe {
            let get_fn = slot!(self.GetThreadLocalStorage);
            get_fn(self.env, thread, &mut data).into_result()?;
        }
        Ok(data)
    }

    pub fn set_thread_local_storage(&self, thread: jni::jthread, data: *const c_void) -> Result<(), jvmti::jvmtiError> {
        unsafe {
            let set_fn = slot!(self.SetThreadLocalStorage);
            set_fn(self.env, thread, data).into_result()
        }
    }

    /// Name the VM gives `error`. [`jvmtiError::name`](jvmti::jvmtiError::name)
    /// answers the same question without a VM.
    pub fn get_error_name(&self, error: jvmti::jvmtiError) -> Result<String, jvmti::jvmtiError> {
        let mut name_ptr: *mut c_char = ptr::null_mut();
        unsafe {
            let get_fn = slot!(self.GetErrorName);
            get_fn(self.env, error, &mut name_ptr).into_result()?;
            self.take_string(name_ptr)
        }
    }

    pub fn get_phase(&self) -> Result<jni::jint, jvmti::jvmtiError> {
        let mut phase: jni::jint = 0;
        unsafe {
            let get_fn = slot!(self.GetPhase);
            get_fn(self.env, &mut phase).into_result()?;
        }
        Ok(phase)
    }
}

/// Enables `event` for `thread` (null for all threads). Logs and returns
/// `false` on failure.
pub fn enable_notification(jvmti: &Jvmti, event: u32, thread: jni::jthread) -> bool {
    match logging::traced("SetEventNotificationMode", || jvmti.set_event_notification_mode(true, event, thread)) {
        Ok(()) => true,
        Err(err) => {
            log::error!("failed to enable notification for event {}: {}", event, err);
            false
        }
    }
}

pub fn disable_notification(jvmti: &Jvmti, event: u32, thread: jni::jthread) -> bool {
    match logging::traced("SetEventNotificationMode", || jvmti.set_event_notification_mode(false, event, thread)) {
        Ok(()) => true,
        Err(err) => {
            log::error!("failed to disable notification for event {}: {}", event, err);
            false
        }
    }
}

// SAFETY: JVMTI Allocate hands out `size` writable bytes (null for zero).
unsafe impl Instrumentation for Jvmti {
    fn allocate(&self, size: usize) -> Result<*mut u8, jvmti::jvmtiError> {
        let size = jni::jlong::try_from(size).map_err(|_| jvmti::jvmtiError::ILLEGAL_ARGUMENT)?;
        Jvmti::allocate(self, size)
    }

    unsafe fn deallocate(&self, mem: *mut u8) -> Result<(), jvmti::jvmtiError> {
        Jvmti::deallocate(self, mem)
    }

    fn redefine_class(&self, class: jni::jclass, bytes: &[u8]) -> Result<(), jvmti::jvmtiError> {
        let class_byte_count = jni::jint::try_from(bytes.len()).map_err(|_| jvmti::jvmtiError::ILLEGAL_ARGUMENT)?;
        let definition = jvmti::jvmtiClassDefinition {
            klass: class,
            class_byte_count,
            class_bytes: bytes.as_ptr(),
        };
        self.redefine_classes(&[definition])
    }
}
