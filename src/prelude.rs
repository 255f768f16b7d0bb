//! Common imports for building test agents.
//!
//! This prelude is intentionally small. It covers the types and helpers most
//! agents use while avoiding over-broad re-exports.

pub use crate::env::{JniEnv, Jvmti};
pub use crate::error::{JvmtiError, OrExit};
pub use crate::options::OptionTable;
pub use crate::sys::{jni, jvmti};
pub use crate::Agent;
pub use crate::{export_agent, export_harness_natives};
