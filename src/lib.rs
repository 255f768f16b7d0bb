//! # jvmti-harness
//!
//! Support library for JVM native test agents written in Rust.
//!
//! - [`options`] parses the agent option string (`-agentpath:lib.so=<options>`)
//!   into an [`OptionTable`](options::OptionTable) with typed lookups.
//! - [`redefine`] replaces a loaded class with a `.class` file from disk and
//!   records the outcome for the managed side of the test.
//! - [`env`] wraps the JVMTI and JNI calls test agents need, returning `Result`.
//! - [`monitor`], [`threads`] and [`inspect`] cover raw monitors, JFR thread
//!   filtering and method/location naming.
//! - [`export_agent!`] and [`export_harness_natives!`] emit the FFI entry points.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jvmti_harness::prelude::*;
//!
//! #[derive(Default)]
//! struct HotSwapAgent;
//!
//! impl Agent for HotSwapAgent {
//!     fn on_load(&self, vm: *mut jni::JavaVM, options: &OptionTable) -> jni::jint {
//!         let jvmti = match Jvmti::new(vm) {
//!             Ok(env) => env,
//!             Err(code) => return code,
//!         };
//!
//!         let mut caps = jvmti::jvmtiCapabilities::default();
//!         caps.set_can_redefine_classes(true);
//!         jvmti.add_capabilities(&caps).or_exit();
//!
//!         log::info!("wait time: {} min", options.wait_time());
//!         jni::JNI_OK
//!     }
//! }
//!
//! export_agent!(HotSwapAgent);
//! export_harness_natives!();
//! ```
//!
//! Run with `java -agentpath:./libagent.so=-verbose~pathToNewByteCode=/tmp/classes`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Test Agent Code                       │
//! │         impl Agent for MyAgent { ... }                   │
//! ├─────────────────────────────────────────────────────────┤
//! │          Agent Trait + Macros, process context           │
//! │   export_agent!, export_harness_natives!, context        │
//! ├─────────────────────────────────────────────────────────┤
//! │     options / redefine / monitor / threads / inspect     │
//! ├─────────────────────────────────────────────────────────┤
//! │              High-Level Wrappers (env module)            │
//! │   env::Jvmti, env::JniEnv                                │
//! ├─────────────────────────────────────────────────────────┤
//! │              Raw FFI Bindings (sys module)               │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod sys;
pub mod env;

// Implementation modules (use `env` module for the public API)
#[doc(hidden)]
pub mod jvmti_wrapper;
#[doc(hidden)]
pub mod jni_wrapper;

pub mod context;
pub mod error;
pub mod inspect;
pub mod logging;
pub mod monitor;
pub mod natives;
pub mod options;
pub mod prelude;
pub mod redefine;
pub mod threads;

#[cfg(test)]
mod testing;

use std::ffi::{c_char, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

pub use crate::sys::jni as jni;

use crate::options::OptionTable;

/// The core trait for implementing a test agent.
///
/// Implement this trait and use [`export_agent!`] to create a loadable agent
/// library. The agent must be `Sync + Send`: JVMTI calls back from any thread.
pub trait Agent: Sync + Send {
    /// Called when the agent is loaded into the JVM, after the option string
    /// has been parsed and installed and logging is set up.
    ///
    /// Return `JNI_OK` (0) on success, or `JNI_ERR` (-1) on failure.
    fn on_load(&self, vm: *mut jni::JavaVM, options: &OptionTable) -> jni::jint;

    /// Called when the agent is unloaded (JVM shutdown).
    fn on_unload(&self) {}
}

pub static GLOBAL_AGENT: OnceLock<Box<dyn Agent>> = OnceLock::new();

pub fn set_global_agent(agent: Box<dyn Agent>) -> Result<(), ()> {
    GLOBAL_AGENT.set(agent).map_err(|_| ())
}

/// Body of the generated `Agent_OnLoad`.
///
/// # Safety
/// `options` must be null or a NUL-terminated string.
#[doc(hidden)]
pub unsafe fn load_agent(vm: *mut jni::JavaVM, options: *const c_char, agent: Box<dyn Agent>) -> jni::jint {
    let raw = if options.is_null() {
        None
    } else {
        // Options arrive in the platform encoding, not modified UTF-8.
        Some(CStr::from_ptr(options).to_string_lossy().into_owned())
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        // A second load must not touch the options the running agent reads.
        if GLOBAL_AGENT.get().is_some() {
            log::error!("agent already loaded");
            return jni::JNI_ERR;
        }
        let table = match context::install_options(raw.as_deref()) {
            Ok(table) => table,
            Err(err) => {
                logging::init(&OptionTable::empty());
                log::error!("invalid agent options: {}", err);
                return jni::JNI_ERR;
            }
        };
        logging::init(&table);
        log::debug!("agent options: {:?}", table.raw());

        if set_global_agent(agent).is_err() {
            log::error!("agent already loaded");
            return jni::JNI_ERR;
        }
        match GLOBAL_AGENT.get() {
            Some(agent) => agent.on_load(vm, &table),
            None => jni::JNI_ERR,
        }
    }));

    match result {
        Ok(code) => code,
        Err(_) => {
            log::error!("panic in Agent_OnLoad");
            jni::JNI_ERR
        }
    }
}

/// Body of the generated `Agent_OnUnload`.
#[doc(hidden)]
pub fn unload_agent() {
    let result = panic::catch_unwind(|| {
        if let Some(agent) = GLOBAL_AGENT.get() {
            agent.on_unload();
        }
    });
    if result.is_err() {
        log::warn!("panic in Agent_OnUnload");
    }
}

/// Exports a struct as a JVMTI agent.
///
/// Generates `Agent_OnLoad` and `Agent_OnUnload`. The type must implement
/// [`Agent`] and [`Default`]. On load the option string is parsed and
/// installed into [`context`]; a parse error fails the load with `JNI_ERR`.
/// Panics in the agent never cross into the JVM.
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct MyAgent;
///
/// impl jvmti_harness::Agent for MyAgent {
///     fn on_load(&self, _vm: *mut jni::JavaVM, _options: &OptionTable) -> jni::jint {
///         jni::JNI_OK
///     }
/// }
///
/// jvmti_harness::export_agent!(MyAgent);
/// ```
#[macro_export]
macro_rules! export_agent {
    ($agent_type:ty) => {
        #[no_mangle]
        pub unsafe extern "system" fn Agent_OnLoad(
            vm: *mut $crate::sys::jni::JavaVM,
            options: *mut std::ffi::c_char,
            _reserved: *mut std::ffi::c_void,
        ) -> $crate::sys::jni::jint {
            $crate::load_agent(vm, options, Box::new(<$agent_type>::default()))
        }

        #[no_mangle]
        pub unsafe extern "system" fn Agent_OnUnload(_vm: *mut $crate::sys::jni::JavaVM) {
            $crate::unload_agent();
        }
    };
}
