//! In-process stand-ins for the JVMTI and JNI environments, used by unit tests.
//!
//! Thread handles are pointers to NUL-terminated names; `GetThreadInfo`
//! reports that name back. Memory handed out by `Allocate` carries a size
//! header so `Deallocate` can free it.

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::collections::HashMap;
use std::ffi::{c_char, c_uchar, c_void, CStr, CString};
use std::ptr;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use crate::jvmti_wrapper::Jvmti;
use crate::sys::jni::{jclass, jint, jlong, jmethodID, jstring, jthread, JNIEnv, JNINativeInterface_};
use crate::sys::jvmti::{
    jrawMonitorID, jvmtiCapabilities, jvmtiClassDefinition, jvmtiEnv, jvmtiError, jvmtiInterface_1_,
    jvmtiThreadInfo, JVMTI_EVENT_SAMPLED_OBJECT_ALLOC, JVMTI_EVENT_VM_INIT, JVMTI_PHASE_LIVE,
};

const HEADER: usize = 16;

fn layout(size: usize) -> Layout {
    Layout::from_size_align(size + HEADER, HEADER).unwrap()
}

pub(crate) fn fake_alloc(size: usize) -> *mut u8 {
    unsafe {
        let base = alloc_zeroed(layout(size));
        assert!(!base.is_null());
        (base as *mut usize).write(size);
        base.add(HEADER)
    }
}

pub(crate) unsafe fn fake_free(mem: *mut u8) {
    let base = mem.sub(HEADER);
    let size = (base as *const usize).read();
    dealloc(base, layout(size));
}

unsafe fn alloc_c_string(s: &str) -> *mut c_char {
    let mem = fake_alloc(s.len() + 1);
    ptr::copy_nonoverlapping(s.as_ptr(), mem, s.len());
    mem as *mut c_char
}

/// Sentinel class handle whose signature lookups fail.
pub(crate) const BAD_CLASS: jclass = 1 as jclass;
/// Sentinel method handle whose name lookups fail.
pub(crate) const BAD_METHOD: jmethodID = 1 as jmethodID;

pub(crate) struct FakeMonitor {
    pub name: String,
    pub depth: AtomicI32,
    pub notified: AtomicUsize,
}

unsafe extern "system" fn allocate(_env: *mut jvmtiEnv, size: jlong, mem_ptr: *mut *mut c_uchar) -> jvmtiError {
    if size < 0 {
        return jvmtiError::ILLEGAL_ARGUMENT;
    }
    if size == 0 {
        *mem_ptr = ptr::null_mut();
        return jvmtiError::NONE;
    }
    *mem_ptr = fake_alloc(size as usize);
    jvmtiError::NONE
}

unsafe extern "system" fn deallocate(_env: *mut jvmtiEnv, mem: *mut c_uchar) -> jvmtiError {
    if !mem.is_null() {
        fake_free(mem);
    }
    jvmtiError::NONE
}

unsafe extern "system" fn get_thread_info(_env: *mut jvmtiEnv, thread: jthread, info: *mut jvmtiThreadInfo) -> jvmtiError {
    if thread.is_null() {
        return jvmtiError::INVALID_THREAD;
    }
    let name = CStr::from_ptr(thread as *const c_char).to_string_lossy();
    (*info).name = alloc_c_string(&name);
    (*info).priority = 5;
    jvmtiError::NONE
}

unsafe extern "system" fn set_event_notification_mode(
    _env: *mut jvmtiEnv,
    _mode: jint,
    event_type: u32,
    _thread: jthread,
) -> jvmtiError {
    if (JVMTI_EVENT_VM_INIT..=JVMTI_EVENT_SAMPLED_OBJECT_ALLOC).contains(&event_type) {
        jvmtiError::NONE
    } else {
        jvmtiError::INVALID_EVENT_TYPE
    }
}

unsafe extern "system" fn create_raw_monitor(_env: *mut jvmtiEnv, name: *const c_char, monitor: *mut jrawMonitorID) -> jvmtiError {
    let fake = Box::new(FakeMonitor {
        name: CStr::from_ptr(name).to_string_lossy().into_owned(),
        depth: AtomicI32::new(0),
        notified: AtomicUsize::new(0),
    });
    *monitor = Box::into_raw(fake) as jrawMonitorID;
    jvmtiError::NONE
}

unsafe extern "system" fn destroy_raw_monitor(_env: *mut jvmtiEnv, monitor: jrawMonitorID) -> jvmtiError {
    drop(Box::from_raw(monitor as *mut FakeMonitor));
    jvmtiError::NONE
}

unsafe extern "system" fn raw_monitor_enter(_env: *mut jvmtiEnv, monitor: jrawMonitorID) -> jvmtiError {
    (*(monitor as *const FakeMonitor)).depth.fetch_add(1, Ordering::SeqCst);
    jvmtiError::NONE
}

unsafe extern "system" fn raw_monitor_exit(_env: *mut jvmtiEnv, monitor: jrawMonitorID) -> jvmtiError {
    let fake = &*(monitor as *const FakeMonitor);
    if fake.depth.load(Ordering::SeqCst) == 0 {
        return jvmtiError::NOT_MONITOR_OWNER;
    }
    fake.depth.fetch_sub(1, Ordering::SeqCst);
    jvmtiError::NONE
}

unsafe extern "system" fn raw_monitor_wait(_env: *mut jvmtiEnv, monitor: jrawMonitorID, millis: jlong) -> jvmtiError {
    if (*(monitor as *const FakeMonitor)).depth.load(Ordering::SeqCst) == 0 {
        return jvmtiError::NOT_MONITOR_OWNER;
    }
    if millis < 0 {
        return jvmtiError::ILLEGAL_ARGUMENT;
    }
    jvmtiError::NONE
}

unsafe extern "system" fn raw_monitor_notify(_env: *mut jvmtiEnv, monitor: jrawMonitorID) -> jvmtiError {
    let fake = &*(monitor as *const FakeMonitor);
    if fake.depth.load(Ordering::SeqCst) == 0 {
        return jvmtiError::NOT_MONITOR_OWNER;
    }
    fake.notified.fetch_add(1, Ordering::SeqCst);
    jvmtiError::NONE
}

unsafe extern "system" fn get_class_signature(
    _env: *mut jvmtiEnv,
    klass: jclass,
    signature: *mut *mut c_char,
    generic: *mut *mut c_char,
) -> jvmtiError {
    if klass.is_null() || klass == BAD_CLASS {
        return jvmtiError::INVALID_CLASS;
    }
    if !signature.is_null() {
        *signature = alloc_c_string("Lnsk/share/Fake;");
    }
    if !generic.is_null() {
        *generic = ptr::null_mut();
    }
    jvmtiError::NONE
}

unsafe extern "system" fn get_method_name(
    _env: *mut jvmtiEnv,
    method: jmethodID,
    name: *mut *mut c_char,
    signature: *mut *mut c_char,
    generic: *mut *mut c_char,
) -> jvmtiError {
    if method.is_null() || method == BAD_METHOD {
        return jvmtiError::INVALID_METHODID;
    }
    if !name.is_null() {
        *name = alloc_c_string("run");
    }
    if !signature.is_null() {
        *signature = alloc_c_string("()V");
    }
    if !generic.is_null() {
        *generic = ptr::null_mut();
    }
    jvmtiError::NONE
}

unsafe extern "system" fn get_method_declaring_class(_env: *mut jvmtiEnv, method: jmethodID, class: *mut jclass) -> jvmtiError {
    if method.is_null() {
        return jvmtiError::INVALID_METHODID;
    }
    // The fake class handle is the method handle itself.
    *class = method as jclass;
    jvmtiError::NONE
}

unsafe extern "system" fn redefine_classes(_env: *mut jvmtiEnv, count: jint, defs: *const jvmtiClassDefinition) -> jvmtiError {
    if count != 1 || defs.is_null() {
        return jvmtiError::ILLEGAL_ARGUMENT;
    }
    let def = &*defs;
    if def.class_byte_count < 4 {
        return jvmtiError::INVALID_CLASS_FORMAT;
    }
    let bytes = std::slice::from_raw_parts(def.class_bytes, def.class_byte_count as usize);
    if bytes[..4] != [0xCA, 0xFE, 0xBA, 0xBE] {
        return jvmtiError::INVALID_CLASS_FORMAT;
    }
    jvmtiError::NONE
}

fn storage() -> &'static Mutex<HashMap<usize, usize>> {
    static STORAGE: OnceLock<Mutex<HashMap<usize, usize>>> = OnceLock::new();
    STORAGE.get_or_init(|| Mutex::new(HashMap::new()))
}

unsafe extern "system" fn get_thread_local_storage(_env: *mut jvmtiEnv, thread: jthread, data: *mut *mut c_void) -> jvmtiError {
    let map = storage().lock().unwrap();
    *data = map.get(&(thread as usize)).copied().unwrap_or(0) as *mut c_void;
    jvmtiError::NONE
}

unsafe extern "system" fn set_thread_local_storage(_env: *mut jvmtiEnv, thread: jthread, data: *const c_void) -> jvmtiError {
    storage().lock().unwrap().insert(thread as usize, data as usize);
    jvmtiError::NONE
}

unsafe extern "system" fn get_error_name(_env: *mut jvmtiEnv, error: jvmtiError, name: *mut *mut c_char) -> jvmtiError {
    *name = alloc_c_string(error.name());
    jvmtiError::NONE
}

unsafe extern "system" fn get_phase(_env: *mut jvmtiEnv, phase: *mut jint) -> jvmtiError {
    *phase = JVMTI_PHASE_LIVE;
    jvmtiError::NONE
}

unsafe extern "system" fn add_capabilities(_env: *mut jvmtiEnv, caps: *const jvmtiCapabilities) -> jvmtiError {
    if (*caps).can_redefine_any_class() && !(*caps).can_redefine_classes() {
        return jvmtiError::NOT_AVAILABLE;
    }
    jvmtiError::NONE
}

/// Owns a fake function table and the environment pointing at it.
pub(crate) struct FakeEnv {
    _table: Box<jvmtiInterface_1_>,
    env: Box<jvmtiEnv>,
}

impl FakeEnv {
    pub(crate) fn new() -> Self {
        Self::with_table(jvmtiInterface_1_ {
            SetEventNotificationMode: Some(set_event_notification_mode),
            GetThreadInfo: Some(get_thread_info),
            CreateRawMonitor: Some(create_raw_monitor),
            DestroyRawMonitor: Some(destroy_raw_monitor),
            RawMonitorEnter: Some(raw_monitor_enter),
            RawMonitorExit: Some(raw_monitor_exit),
            RawMonitorWait: Some(raw_monitor_wait),
            RawMonitorNotify: Some(raw_monitor_notify),
            RawMonitorNotifyAll: Some(raw_monitor_notify),
            Allocate: Some(allocate),
            Deallocate: Some(deallocate),
            GetClassSignature: Some(get_class_signature),
            GetMethodName: Some(get_method_name),
            GetMethodDeclaringClass: Some(get_method_declaring_class),
            RedefineClasses: Some(redefine_classes),
            GetThreadLocalStorage: Some(get_thread_local_storage),
            SetThreadLocalStorage: Some(set_thread_local_storage),
            GetErrorName: Some(get_error_name),
            GetPhase: Some(get_phase),
            AddCapabilities: Some(add_capabilities),
            ..jvmtiInterface_1_::EMPTY
        })
    }

    /// Environment whose every slot is empty.
    pub(crate) fn empty() -> Self {
        Self::with_table(jvmtiInterface_1_::EMPTY)
    }

    fn with_table(table: jvmtiInterface_1_) -> Self {
        let table = Box::new(table);
        let env = Box::new(jvmtiEnv { functions: &*table });
        Self { _table: table, env }
    }

    pub(crate) fn jvmti(&mut self) -> Jvmti {
        unsafe { Jvmti::from_raw(&mut *self.env) }
    }
}

/// A thread handle the fake `GetThreadInfo` resolves to `name`.
pub(crate) fn thread_named(name: &'static CStr) -> jthread {
    name.as_ptr() as jthread
}

unsafe extern "system" fn new_string_utf(_env: *mut JNIEnv, utf: *const c_char) -> jstring {
    Box::into_raw(Box::new(CStr::from_ptr(utf).to_owned())) as jstring
}

/// JNI environment whose `NewStringUTF` hands out boxed `CString`s.
pub(crate) struct FakeJni {
    _table: Box<JNINativeInterface_>,
    env: Box<JNIEnv>,
}

impl FakeJni {
    pub(crate) fn new() -> Self {
        let table = Box::new(JNINativeInterface_ {
            reserved: [ptr::null_mut(); 4],
            unused_4_166: [ptr::null_mut(); 163],
            NewStringUTF: new_string_utf,
        });
        let env = Box::new(&*table as *const JNINativeInterface_);
        Self { _table: table, env }
    }

    pub(crate) fn env(&mut self) -> *mut JNIEnv {
        &mut *self.env
    }
}

/// Reads back, and frees, a string made by the fake `NewStringUTF`.
pub(crate) unsafe fn take_java_string(s: jstring) -> String {
    Box::from_raw(s as *mut CString).into_string().unwrap()
}
