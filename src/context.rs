//! Process-wide option state used by the FFI entry points.
//!
//! Agent code normally works with the [`OptionTable`] handed to
//! [`Agent::on_load`](crate::Agent::on_load). The JNI natives called from
//! managed code have no such handle, so the table installed at load time is
//! also kept here.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::ParseError;
use crate::options::{parse_options, OptionTable};

static INSTALLED: RwLock<OptionTable> = RwLock::new(OptionTable::empty());

fn read() -> RwLockReadGuard<'static, OptionTable> {
    INSTALLED.read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, OptionTable> {
    INSTALLED.write().unwrap_or_else(PoisonError::into_inner)
}

/// Parses `raw` and makes it the process-wide table.
///
/// The previous table is replaced either way: on failure the context is left
/// holding an empty table.
pub fn install_options(raw: Option<&str>) -> Result<OptionTable, ParseError> {
    let parsed = parse_options(raw);
    *write() = match &parsed {
        Ok(table) => table.clone(),
        Err(_) => OptionTable::empty(),
    };
    parsed
}

/// Snapshot of the installed table.
pub fn options() -> OptionTable {
    read().clone()
}

/// Runs `f` against the installed table without cloning it.
pub fn with_options<R>(f: impl FnOnce(&OptionTable) -> R) -> R {
    f(&read())
}

pub fn wait_time() -> i32 {
    read().wait_time()
}

pub fn set_wait_time(wait_time: i32) {
    write().set_wait_time(wait_time);
}

pub fn raw_options() -> String {
    read().raw().to_string()
}

/// Drops the installed table.
pub fn reset() {
    *write() = OptionTable::empty();
}
