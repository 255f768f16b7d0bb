// jvmti-harness/src/sys/jvmti.rs
//
// JVMTI (JVM Tool Interface) types for the harness.
//
// The function table has 156 slots. The slots the harness calls are named
// and typed; runs of slots it never calls are opaque arrays sized so that
// every named field sits at its jvmti.h position (slot N at offset N-1).
//
// Error codes are a transparent u32 rather than a Rust enum: the VM may hand
// back codes a fixed enum does not list, and those must stay representable.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::os::raw::{c_char, c_uchar, c_void};
use std::ptr;
use crate::sys::jni::{jboolean, jclass, jint, jlong, jmethodID, jobject, jthread};

// --- Constants ---
pub const JVMTI_VERSION_1_0: jint = 0x30010000;
pub const JVMTI_VERSION_1_1: jint = 0x30010100;
pub const JVMTI_VERSION_1_2: jint = 0x30010200;
pub const JVMTI_VERSION_9: jint = 0x30090000;
pub const JVMTI_VERSION_11: jint = 0x300B0000;

pub const JVMTI_EVENT_VM_INIT: u32 = 50;
pub const JVMTI_EVENT_VM_DEATH: u32 = 51;
pub const JVMTI_EVENT_THREAD_START: u32 = 52;
pub const JVMTI_EVENT_THREAD_END: u32 = 53;
pub const JVMTI_EVENT_CLASS_FILE_LOAD_HOOK: u32 = 54;
pub const JVMTI_EVENT_CLASS_LOAD: u32 = 55;
pub const JVMTI_EVENT_CLASS_PREPARE: u32 = 56;
pub const JVMTI_EVENT_VM_START: u32 = 57;
pub const JVMTI_EVENT_EXCEPTION: u32 = 58;
pub const JVMTI_EVENT_EXCEPTION_CATCH: u32 = 59;
pub const JVMTI_EVENT_SINGLE_STEP: u32 = 60;
pub const JVMTI_EVENT_FRAME_POP: u32 = 61;
pub const JVMTI_EVENT_BREAKPOINT: u32 = 62;
pub const JVMTI_EVENT_FIELD_ACCESS: u32 = 63;
pub const JVMTI_EVENT_FIELD_MODIFICATION: u32 = 64;
pub const JVMTI_EVENT_METHOD_ENTRY: u32 = 65;
pub const JVMTI_EVENT_METHOD_EXIT: u32 = 66;
pub const JVMTI_EVENT_NATIVE_METHOD_BIND: u32 = 67;
pub const JVMTI_EVENT_COMPILED_METHOD_LOAD: u32 = 68;
pub const JVMTI_EVENT_COMPILED_METHOD_UNLOAD: u32 = 69;
pub const JVMTI_EVENT_DYNAMIC_CODE_GENERATED: u32 = 70;
pub const JVMTI_EVENT_DATA_DUMP_REQUEST: u32 = 71;
pub const JVMTI_EVENT_MONITOR_WAIT: u32 = 73;
pub const JVMTI_EVENT_MONITOR_WAITED: u32 = 74;
pub const JVMTI_EVENT_MONITOR_CONTENDED_ENTER: u32 = 75;
pub const JVMTI_EVENT_MONITOR_CONTENDED_ENTERED: u32 = 76;
pub const JVMTI_EVENT_RESOURCE_EXHAUSTED: u32 = 80;
pub const JVMTI_EVENT_GARBAGE_COLLECTION_START: u32 = 81;
pub const JVMTI_EVENT_GARBAGE_COLLECTION_FINISH: u32 = 82;
pub const JVMTI_EVENT_OBJECT_FREE: u32 = 83;
pub const JVMTI_EVENT_VM_OBJECT_ALLOC: u32 = 84;
pub const JVMTI_EVENT_SAMPLED_OBJECT_ALLOC: u32 = 86;

// --- Phases ---
pub const JVMTI_PHASE_ONLOAD: jint = 1;
pub const JVMTI_PHASE_PRIMORDIAL: jint = 2;
pub const JVMTI_PHASE_START: jint = 6;
pub const JVMTI_PHASE_LIVE: jint = 4;
pub const JVMTI_PHASE_DEAD: jint = 8;

pub const JVMTI_ENABLE: jint = 1;
pub const JVMTI_DISABLE: jint = 0;

// --- Error Codes ---
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct jvmtiError(pub u32);

impl jvmtiError {
    pub const NONE: Self = Self(0);
    pub const INVALID_THREAD: Self = Self(10);
    pub const INVALID_THREAD_GROUP: Self = Self(11);
    pub const INVALID_PRIORITY: Self = Self(12);
    pub const THREAD_NOT_SUSPENDED: Self = Self(13);
    pub const THREAD_SUSPENDED: Self = Self(14);
    pub const THREAD_NOT_ALIVE: Self = Self(15);
    pub const INVALID_OBJECT: Self = Self(20);
    pub const INVALID_CLASS: Self = Self(21);
    pub const CLASS_NOT_PREPARED: Self = Self(22);
    pub const INVALID_METHODID: Self = Self(23);
    pub const INVALID_LOCATION: Self = Self(24);
    pub const INVALID_FIELDID: Self = Self(25);
    pub const NO_MORE_FRAMES: Self = Self(31);
    pub const OPAQUE_FRAME: Self = Self(32);
    pub const TYPE_MISMATCH: Self = Self(34);
    pub const INVALID_SLOT: Self = Self(35);
    pub const DUPLICATE: Self = Self(40);
    pub const NOT_FOUND: Self = Self(41);
    pub const INVALID_MONITOR: Self = Self(50);
    pub const NOT_MONITOR_OWNER: Self = Self(51);
    pub const INTERRUPT: Self = Self(52);
    pub const INVALID_CLASS_FORMAT: Self = Self(60);
    pub const CIRCULAR_CLASS_DEFINITION: Self = Self(61);
    pub const FAILS_VERIFICATION: Self = Self(62);
    pub const UNSUPPORTED_REDEFINITION_METHOD_ADDED: Self = Self(63);
    pub const UNSUPPORTED_REDEFINITION_SCHEMA_CHANGED: Self = Self(64);
    pub const INVALID_TYPESTATE: Self = Self(65);
    pub const UNSUPPORTED_REDEFINITION_HIERARCHY_CHANGED: Self = Self(66);
    pub const UNSUPPORTED_REDEFINITION_METHOD_DELETED: Self = Self(67);
    pub const UNSUPPORTED_VERSION: Self = Self(68);
    pub const NAMES_DONT_MATCH: Self = Self(69);
    pub const UNSUPPORTED_REDEFINITION_CLASS_MODIFIERS_CHANGED: Self = Self(70);
    pub const UNSUPPORTED_REDEFINITION_METHOD_MODIFIERS_CHANGED: Self = Self(71);
    pub const UNSUPPORTED_REDEFINITION_CLASS_ATTRIBUTE_CHANGED: Self = Self(72);
    pub const UNSUPPORTED_OPERATION: Self = Self(73);
    pub const UNMODIFIABLE_CLASS: Self = Self(79);
    pub const UNMODIFIABLE_MODULE: Self = Self(80);
    pub const NOT_AVAILABLE: Self = Self(98);
    pub const MUST_POSSESS_CAPABILITY: Self = Self(99);
    pub const NULL_POINTER: Self = Self(100);
    pub const ABSENT_INFORMATION: Self = Self(101);
    pub const INVALID_EVENT_TYPE: Self = Self(102);
    pub const ILLEGAL_ARGUMENT: Self = Self(103);
    pub const NATIVE_METHOD: Self = Self(104);
    pub const CLASS_LOADER_UNSUPPORTED: Self = Self(106);
    pub const OUT_OF_MEMORY: Self = Self(110);
    pub const ACCESS_DENIED: Self = Self(111);
    pub const WRONG_PHASE: Self = Self(112);
    pub const INTERNAL: Self = Self(113);
    pub const UNATTACHED_THREAD: Self = Self(115);
    pub const INVALID_ENVIRONMENT: Self = Self(116);
}

pub type jlocation = jlong;
pub type jrawMonitorID = *mut c_void;

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct jvmtiThreadInfo {
    pub name: *mut c_char,
    pub priority: jint,
    pub is_daemon: jboolean,
    pub thread_group: jobject,
    pub context_class_loader: jobject,
}

impl Default for jvmtiThreadInfo {
    fn default() -> Self {
        Self {
            name: ptr::null_mut(),
            priority: 0,
            is_daemon: 0,
            thread_group: ptr::null_mut(),
            context_class_loader: ptr::null_mut(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct jvmtiClassDefinition {
    pub klass: jclass,
    pub class_byte_count: jint,
    pub class_bytes: *const c_uchar,
}

// --- Capabilities ---
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct jvmtiCapabilities {
    bits: [u32; 4],
}

impl jvmtiCapabilities {
    fn set_bit(&mut self, bit_offset: usize, value: bool) {
        let word_index = bit_offset / 32;
        let bit_index = bit_offset % 32;
        if value {
            self.bits[word_index] |= 1 << bit_index;
        } else {
            self.bits[word_index] &= !(1 << bit_index);
        }
    }

    fn get_bit(&self, bit_offset: usize) -> bool {
        (self.bits[bit_offset / 32] & (1 << (bit_offset % 32))) != 0
    }

    // [9]
    pub fn set_can_redefine_classes(&mut self, v: bool) { self.set_bit(9, v); }
    pub fn can_redefine_classes(&self) -> bool { self.get_bit(9) }

    // [21]
    pub fn set_can_redefine_any_class(&mut self, v: bool) { self.set_bit(21, v); }
    pub fn can_redefine_any_class(&self) -> bool { self.get_bit(21) }

    // [26]
    pub fn set_can_generate_all_class_hook_events(&mut self, v: bool) { self.set_bit(26, v); }
    pub fn can_generate_all_class_hook_events(&self) -> bool { self.get_bit(26) }
}

// --- Function Types ---
pub type JvmtiSetEventNotificationModeFn = unsafe extern "system" fn(env: *mut jvmtiEnv, mode: jint, event_type: u32, event_thread: jthread) -> jvmtiError;
pub type JvmtiGetThreadInfoFn = unsafe extern "system" fn(env: *mut jvmtiEnv, thread: jthread, info_ptr: *mut jvmtiThreadInfo) -> jvmtiError;
pub type JvmtiCreateRawMonitorFn = unsafe extern "system" fn(env: *mut jvmtiEnv, name: *const c_char, monitor_ptr: *mut jrawMonitorID) -> jvmtiError;
pub type JvmtiDestroyRawMonitorFn = unsafe extern "system" fn(env: *mut jvmtiEnv, monitor: jrawMonitorID) -> jvmtiError;
pub type JvmtiRawMonitorEnterFn = unsafe extern "system" fn(env: *mut jvmtiEnv, monitor: jrawMonitorID) -> jvmtiError;
pub type JvmtiRawMonitorExitFn = unsafe extern "system" fn(env: *mut jvmtiEnv, monitor: jrawMonitorID) -> jvmtiError;
pub type JvmtiRawMonitorWaitFn = unsafe extern "system" fn(env: *mut jvmtiEnv, monitor: jrawMonitorID, millis: jlong) -> jvmtiError;
pub type JvmtiRawMonitorNotifyFn = unsafe extern "system" fn(env: *mut jvmtiEnv, monitor: jrawMonitorID) -> jvmtiError;
pub type JvmtiRawMonitorNotifyAllFn = unsafe extern "system" fn(env: *mut jvmtiEnv, monitor: jrawMonitorID) -> jvmtiError;
pub type JvmtiAllocateFn = unsafe extern "system" fn(env: *mut jvmtiEnv, size: jlong, mem_ptr: *mut *mut c_uchar) -> jvmtiError;
pub type JvmtiDeallocateFn = unsafe extern "system" fn(env: *mut jvmtiEnv, mem: *mut c_uchar) -> jvmtiError;
pub type JvmtiGetClassSignatureFn = unsafe extern "system" fn(env: *mut jvmtiEnv, klass: jclass, signature_ptr: *mut *mut c_char, generic_ptr: *mut *mut c_char) -> jvmtiError;
pub type JvmtiGetMethodNameFn = unsafe extern "system" fn(env: *mut jvmtiEnv, method: jmethodID, name_ptr: *mut *mut c_char, signature_ptr: *mut *mut c_char, generic_ptr: *mut *mut c_char) -> jvmtiError;
pub type JvmtiGetMethodDeclaringClassFn = unsafe extern "system" fn(env: *mut jvmtiEnv, method: jmethodID, declaring_class_ptr: *mut jclass) -> jvmtiError;
pub type JvmtiRedefineClassesFn = unsafe extern "system" fn(env: *mut jvmtiEnv, class_count: jint, class_definitions: *const jvmtiClassDefinition) -> jvmtiError;
pub type JvmtiGetThreadLocalStorageFn = unsafe extern "system" fn(env: *mut jvmtiEnv, thread: jthread, data_ptr: *mut *mut c_void) -> jvmtiError;
pub type JvmtiSetThreadLocalStorageFn = unsafe extern "system" fn(env: *mut jvmtiEnv, thread: jthread, data: *const c_void) -> jvmtiError;
pub type JvmtiGetErrorNameFn = unsafe extern "system" fn(env: *mut jvmtiEnv, error: jvmtiError, name_ptr: *mut *mut c_char) -> jvmtiError;
pub type JvmtiGetPhaseFn = unsafe extern "system" fn(env: *mut jvmtiEnv, phase_ptr: *mut jint) -> jvmtiError;
pub type JvmtiAddCapabilitiesFn = unsafe extern "system" fn(env: *mut jvmtiEnv, capabilities_ptr: *const jvmtiCapabilities) -> jvmtiError;

// --- Function Table ---
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct jvmtiInterface_1_ {
    /*   1:  RESERVED */
    pub reserved1: *mut c_void,
    /*   2: Set Event Notification Mode */
    pub SetEventNotificationMode: Option<JvmtiSetEventNotificationModeFn>,
    /*   3-8: Get All Modules .. Interrupt Thread */
    pub unused_3_8: [*mut c_void; 6],
    /*   9: Get Thread Info */
    pub GetThreadInfo: Option<JvmtiGetThreadInfoFn>,
    /*  10-30: Get Owned Monitor Info .. Set Local Variable - Double */
    pub unused_10_30: [*mut c_void; 21],
    /*  31: Create Raw Monitor */
    pub CreateRawMonitor: Option<JvmtiCreateRawMonitorFn>,
    /*  32: Destroy Raw Monitor */
    pub DestroyRawMonitor: Option<JvmtiDestroyRawMonitorFn>,
    /*  33: Raw Monitor Enter */
    pub RawMonitorEnter: Option<JvmtiRawMonitorEnterFn>,
    /*  34: Raw Monitor Exit */
    pub RawMonitorExit: Option<JvmtiRawMonitorExitFn>,
    /*  35: Raw Monitor Wait */
    pub RawMonitorWait: Option<JvmtiRawMonitorWaitFn>,
    /*  36: Raw Monitor Notify */
    pub RawMonitorNotify: Option<JvmtiRawMonitorNotifyFn>,
    /*  37: Raw Monitor Notify All */
    pub RawMonitorNotifyAll: Option<JvmtiRawMonitorNotifyAllFn>,
    /*  38-45: Set Breakpoint .. Is Modifiable Class */
    pub unused_38_45: [*mut c_void; 8],
    /*  46: Allocate */
    pub Allocate: Option<JvmtiAllocateFn>,
    /*  47: Deallocate */
    pub Deallocate: Option<JvmtiDeallocateFn>,
    /*  48: Get Class Signature */
    pub GetClassSignature: Option<JvmtiGetClassSignatureFn>,
    /*  49-63: Get Class Status .. Is Field Synthetic */
    pub unused_49_63: [*mut c_void; 15],
    /*  64: Get Method Name (and Signature) */
    pub GetMethodName: Option<JvmtiGetMethodNameFn>,
    /*  65: Get Method Declaring Class */
    pub GetMethodDeclaringClass: Option<JvmtiGetMethodDeclaringClassFn>,
    /*  66-86: Get Method Modifiers .. Force Early Return - Void */
    pub unused_66_86: [*mut c_void; 21],
    /*  87: Redefine Classes */
    pub RedefineClasses: Option<JvmtiRedefineClassesFn>,
    /*  88-101: Get Version Number .. Get Thread List Stack Traces */
    pub unused_88_101: [*mut c_void; 14],
    /* 102: Get Thread Local Storage */
    pub GetThreadLocalStorage: Option<JvmtiGetThreadLocalStorageFn>,
    /* 103: Set Thread Local Storage */
    pub SetThreadLocalStorage: Option<JvmtiSetThreadLocalStorageFn>,
    /* 104-127: Get Stack Trace .. Dispose Environment */
    pub unused_104_127: [*mut c_void; 24],
    /* 128: Get Error Name */
    pub GetErrorName: Option<JvmtiGetErrorNameFn>,
    /* 129-132: Get JLocation Format .. Set System Property */
    pub unused_129_132: [*mut c_void; 4],
    /* 133: Get Phase */
    pub GetPhase: Option<JvmtiGetPhaseFn>,
    /* 134-141: Get Current Thread CPU Timer Information .. RESERVED */
    pub unused_134_141: [*mut c_void; 8],
    /* 142: Add Capabilities */
    pub AddCapabilities: Option<JvmtiAddCapabilitiesFn>,
    /* 143-156: Relinquish Capabilities .. Set Heap Sampling Interval */
    pub unused_143_156: [*mut c_void; 14],
}

impl jvmtiInterface_1_ {
    /// A table with every slot empty. Useful for building stand-in environments.
    pub const EMPTY: Self = Self {
        reserved1: ptr::null_mut(),
        SetEventNotificationMode: None,
        unused_3_8: [ptr::null_mut(); 6],
        GetThreadInfo: None,
        unused_10_30: [ptr::null_mut(); 21],
        CreateRawMonitor: None,
        DestroyRawMonitor: None,
        RawMonitorEnter: None,
        RawMonitorExit: None,
        RawMonitorWait: None,
        RawMonitorNotify: None,
        RawMonitorNotifyAll: None,
        unused_38_45: [ptr::null_mut(); 8],
        Allocate: None,
        Deallocate: None,
        GetClassSignature: None,
        unused_49_63: [ptr::null_mut(); 15],
        GetMethodName: None,
        GetMethodDeclaringClass: None,
        unused_66_86: [ptr::null_mut(); 21],
        RedefineClasses: None,
        unused_88_101: [ptr::null_mut(); 14],
        GetThreadLocalStorage: None,
        SetThreadLocalStorage: None,
        unused_104_127: [ptr::null_mut(); 24],
        GetErrorName: None,
        unused_129_132: [ptr::null_mut(); 4],
        GetPhase: None,
        unused_134_141: [ptr::null_mut(); 8],
        AddCapabilities: None,
        unused_143_156: [ptr::null_mut(); 14],
    };
}

#[repr(C)]
pub struct jvmtiEnv {
    pub functions: *const jvmtiInterface_1_,
}
