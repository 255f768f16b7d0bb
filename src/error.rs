//! Error types for option parsing, option lookup and JVMTI calls.
//!
//! - [`ParseError`] aborts a whole parse. No partial table survives it.
//! - [`LookupError`] is reported to the caller; the process carries on.
//! - [`JvmtiError`] is the raw status code returned by the VM. Wrappers hand it
//!   back as a `Result`; agents that want the fail-fast behavior of the classic
//!   harness call [`OrExit::or_exit`].

use std::fmt;

use thiserror::Error;

use crate::logging;
use crate::sys::jvmti::jvmtiError;

/// JVMTI status code. Alias of the FFI type so wrappers and raw calls agree.
pub type JvmtiError = jvmtiError;

/// Problems found while tokenizing or validating an agent option string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A token ended before its `=` (e.g. `pathToNewByteCode` on its own).
    #[error("missing '=' in option: {token}")]
    MissingValueSeparator { token: String },
    /// Token was `-`, `=value` or `-=value`.
    #[error("found empty option")]
    EmptyName,
    /// Boolean flag was given a value (`verbose=yes`).
    #[error("unexpected value in option: {name}={value}")]
    UnexpectedValue { name: String, value: String },
    /// Option needs a value but has none (`trace=`).
    #[error("no value for option: {name}")]
    MissingValue { name: String },
    /// Value is not one the option accepts.
    #[error("unexpected value in option: {name}={value}")]
    InvalidValue { name: String, value: String },
    /// Numeric value below zero.
    #[error("negative value in option: {name}={value}")]
    NegativeValue { name: String, value: String },
    /// Dashed option the harness does not know.
    #[error("unknown option: -{name}")]
    UnknownOption { name: String },
    /// More options than the parser is configured to hold.
    #[error("too many options for parsing (limit {limit})")]
    TooManyOptions { limit: usize },
}

/// Failures of the accessors over a parsed option table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("option name is empty")]
    EmptyName,
    #[error("option index out of bounds: {index} (count {count})")]
    IndexOutOfBounds { index: usize, count: usize },
    #[error("empty value of option: {name}=")]
    ValueEmpty { name: String },
    #[error("not integer value of option: {name}={value}")]
    InvalidValue { name: String, value: String },
}

impl jvmtiError {
    /// Symbolic name as spelled in jvmti.h, e.g. `JVMTI_ERROR_INVALID_CLASS`.
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "JVMTI_ERROR_NONE",
            10 => "JVMTI_ERROR_INVALID_THREAD",
            11 => "JVMTI_ERROR_INVALID_THREAD_GROUP",
            12 => "JVMTI_ERROR_INVALID_PRIORITY",
            13 => "JVMTI_ERROR_THREAD_NOT_SUSPENDED",
            14 => "JVMTI_ERROR_THREAD_SUSPENDED",
            15 => "JVMTI_ERROR_THREAD_NOT_ALIVE",
            20 => "JVMTI_ERROR_INVALID_OBJECT",
            21 => "JVMTI_ERROR_INVALID_CLASS",
            22 => "JVMTI_ERROR_CLASS_NOT_PREPARED",
            23 => "JVMTI_ERROR_INVALID_METHODID",
            24 => "JVMTI_ERROR_INVALID_LOCATION",
            25 => "JVMTI_ERROR_INVALID_FIELDID",
            31 => "JVMTI_ERROR_NO_MORE_FRAMES",
            32 => "JVMTI_ERROR_OPAQUE_FRAME",
            34 => "JVMTI_ERROR_TYPE_MISMATCH",
            35 => "JVMTI_ERROR_INVALID_SLOT",
            40 => "JVMTI_ERROR_DUPLICATE",
            41 => "JVMTI_ERROR_NOT_FOUND",
            50 => "JVMTI_ERROR_INVALID_MONITOR",
            51 => "JVMTI_ERROR_NOT_MONITOR_OWNER",
            52 => "JVMTI_ERROR_INTERRUPT",
            60 => "JVMTI_ERROR_INVALID_CLASS_FORMAT",
            61 => "JVMTI_ERROR_CIRCULAR_CLASS_DEFINITION",
            62 => "JVMTI_ERROR_FAILS_VERIFICATION",
            63 => "JVMTI_ERROR_UNSUPPORTED_REDEFINITION_METHOD_ADDED",
            64 => "JVMTI_ERROR_UNSUPPORTED_REDEFINITION_SCHEMA_CHANGED",
            65 => "JVMTI_ERROR_INVALID_TYPESTATE",
            66 => "JVMTI_ERROR_UNSUPPORTED_REDEFINITION_HIERARCHY_CHANGED",
            67 => "JVMTI_ERROR_UNSUPPORTED_REDEFINITION_METHOD_DELETED",
            68 => "JVMTI_ERROR_UNSUPPORTED_VERSION",
            69 => "JVMTI_ERROR_NAMES_DONT_MATCH",
            70 => "JVMTI_ERROR_UNSUPPORTED_REDEFINITION_CLASS_MODIFIERS_CHANGED",
            71 => "JVMTI_ERROR_UNSUPPORTED_REDEFINITION_METHOD_MODIFIERS_CHANGED",
            72 => "JVMTI_ERROR_UNSUPPORTED_REDEFINITION_CLASS_ATTRIBUTE_CHANGED",
            73 => "JVMTI_ERROR_UNSUPPORTED_OPERATION",
            79 => "JVMTI_ERROR_UNMODIFIABLE_CLASS",
            80 => "JVMTI_ERROR_UNMODIFIABLE_MODULE",
            98 => "JVMTI_ERROR_NOT_AVAILABLE",
            99 => "JVMTI_ERROR_MUST_POSSESS_CAPABILITY",
            100 => "JVMTI_ERROR_NULL_POINTER",
            101 => "JVMTI_ERROR_ABSENT_INFORMATION",
            102 => "JVMTI_ERROR_INVALID_EVENT_TYPE",
            103 => "JVMTI_ERROR_ILLEGAL_ARGUMENT",
            104 => "JVMTI_ERROR_NATIVE_METHOD",
            106 => "JVMTI_ERROR_CLASS_LOADER_UNSUPPORTED",
            110 => "JVMTI_ERROR_OUT_OF_MEMORY",
            111 => "JVMTI_ERROR_ACCESS_DENIED",
            112 => "JVMTI_ERROR_WRONG_PHASE",
            113 => "JVMTI_ERROR_INTERNAL",
            115 => "JVMTI_ERROR_UNATTACHED_THREAD",
            116 => "JVMTI_ERROR_INVALID_ENVIRONMENT",
            _ => "<unknown error>",
        }
    }

    pub fn is_ok(self) -> bool {
        self == jvmtiError::NONE
    }

    /// `Ok(())` for `JVMTI_ERROR_NONE`, otherwise the code itself.
    pub fn into_result(self) -> Result<(), JvmtiError> {
        if self.is_ok() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for jvmtiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "jvmti error: code={}, name={}", self.0, self.name())
    }
}

impl std::error::Error for jvmtiError {}

/// Checks a JVMTI status against the one the caller expected.
///
/// Logs the mismatch and returns `false`; a match returns `true`. This is the
/// non-fatal check test agents use when a particular error code is the point
/// of the test. With `-trace=after` or `-trace=all` every check is traced.
pub fn verify_status(actual: JvmtiError, expected: JvmtiError, what: &str) -> bool {
    if logging::trace_mode().traces_after() {
        log::trace!("<< {}", what);
        if expected != JvmtiError::NONE {
            log::trace!("  {}", actual);
        }
    }
    if actual != expected {
        log::error!("{}: {}", what, actual);
        if expected != JvmtiError::NONE {
            log::error!("{}: error expected: code={}, name={}", what, expected.0, expected.name());
        }
        return false;
    }
    true
}

/// Fail-fast policy for test agents: log the error and end the process.
pub trait OrExit<T> {
    fn or_exit(self) -> T;
}

impl<T> OrExit<T> for Result<T, JvmtiError> {
    fn or_exit(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                log::error!("fatal: {}", err);
                std::process::exit(err.0 as i32)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names_follow_jvmti_h() {
        assert_eq!(JvmtiError::NONE.name(), "JVMTI_ERROR_NONE");
        assert_eq!(JvmtiError::INVALID_CLASS_FORMAT.name(), "JVMTI_ERROR_INVALID_CLASS_FORMAT");
        assert_eq!(JvmtiError::MUST_POSSESS_CAPABILITY.name(), "JVMTI_ERROR_MUST_POSSESS_CAPABILITY");
        assert_eq!(jvmtiError(9999).name(), "<unknown error>");
    }

    #[test]
    fn display_carries_code_and_name() {
        let text = JvmtiError::WRONG_PHASE.to_string();
        assert_eq!(text, "jvmti error: code=112, name=JVMTI_ERROR_WRONG_PHASE");
    }

    #[test]
    fn into_result_maps_none_to_ok() {
        assert_eq!(JvmtiError::NONE.into_result(), Ok(()));
        assert_eq!(JvmtiError::INTERNAL.into_result(), Err(JvmtiError::INTERNAL));
    }

    #[test]
    fn verify_status_accepts_expected_failures() {
        assert!(verify_status(JvmtiError::NONE, JvmtiError::NONE, "call"));
        assert!(verify_status(JvmtiError::INVALID_CLASS, JvmtiError::INVALID_CLASS, "call"));
        assert!(!verify_status(JvmtiError::NONE, JvmtiError::INVALID_CLASS, "call"));
        assert!(!verify_status(JvmtiError::INTERNAL, JvmtiError::NONE, "call"));
    }

    #[test]
    fn parse_error_messages() {
        let err = ParseError::UnknownOption { name: "bogus".into() };
        assert_eq!(err.to_string(), "unknown option: -bogus");
        let err = ParseError::TooManyOptions { limit: 10 };
        assert_eq!(err.to_string(), "too many options for parsing (limit 10)");
    }
}
