//! Class redefinition from `.class` files on disk.
//!
//! Hot-swap tests pass `pathToNewByteCode=<dir>` to the agent and keep the
//! replacement class files under it. [`redefine_class_from_file`] loads one of
//! them into a VM-allocated buffer and hands it to `RedefineClasses`.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::context;
use crate::error::JvmtiError;
use crate::jvmti_wrapper::Jvmti;
use crate::logging;
use crate::options::OptionTable;
use crate::sys::jni;

/// Option naming the directory that holds the replacement class files.
pub const OPT_PATH_TO_NEW_BYTE_CODE: &str = "pathToNewByteCode";

const NEW_CLASS_DIR: &str = "newclass";

/// The VM services class redefinition needs.
///
/// # Safety
///
/// `allocate(size)` must return either null (only when `size` is 0) or a
/// pointer valid for `size` bytes of writes until it is passed to
/// `deallocate`.
pub unsafe trait Instrumentation {
    fn allocate(&self, size: usize) -> Result<*mut u8, JvmtiError>;

    /// # Safety
    ///
    /// `mem` must come from `allocate` on the same host and not have been
    /// released already.
    unsafe fn deallocate(&self, mem: *mut u8) -> Result<(), JvmtiError>;

    fn redefine_class(&self, class: jni::jclass, bytes: &[u8]) -> Result<(), JvmtiError>;
}

#[derive(Debug, Error)]
pub enum RedefineError {
    #[error("option pathToNewByteCode is not set")]
    MissingBytecodePath,
    #[error("class file name expected but not found")]
    MissingFileName,
    #[error("error opening file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("cannot stat file {path}: {source}")]
    Metadata { path: PathBuf, source: io::Error },
    #[error("class file {path} is too large: {size} bytes")]
    TooLarge { path: PathBuf, size: u64 },
    #[error("failed to allocate class buffer: {0}")]
    Allocate(JvmtiError),
    #[error("error reading file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to read all the bytes: expected {expected}, got {actual}")]
    ShortRead { expected: usize, actual: usize },
    #[error("error occurred while redefining: {0}")]
    Redefine(JvmtiError),
}

/// Outcome flags of redefinition attempts, readable from managed code.
#[derive(Debug, Default)]
pub struct RedefineStatus {
    attempted: AtomicBool,
    succeeded: AtomicBool,
    agent_failed: AtomicBool,
}

impl RedefineStatus {
    pub const fn new() -> Self {
        Self {
            attempted: AtomicBool::new(false),
            succeeded: AtomicBool::new(false),
            agent_failed: AtomicBool::new(false),
        }
    }

    pub fn attempted(&self) -> bool {
        self.attempted.load(Ordering::SeqCst)
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded.load(Ordering::SeqCst)
    }

    pub fn agent_failed(&self) -> bool {
        self.agent_failed.load(Ordering::SeqCst)
    }

    pub fn mark_attempted(&self) {
        self.attempted.store(true, Ordering::SeqCst);
    }

    pub fn mark_succeeded(&self) {
        self.succeeded.store(true, Ordering::SeqCst);
    }

    pub fn mark_agent_failed(&self) {
        self.agent_failed.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.attempted.store(false, Ordering::SeqCst);
        self.succeeded.store(false, Ordering::SeqCst);
        self.agent_failed.store(false, Ordering::SeqCst);
    }
}

static STATUS: RedefineStatus = RedefineStatus::new();

/// Status shared with the JNI natives.
pub fn status() -> &'static RedefineStatus {
    &STATUS
}

/// Records that the agent failed; `agentStatus()` reports false from now on.
pub fn agent_failed() {
    STATUS.mark_agent_failed();
}

/// VM memory that goes back to the host when dropped.
struct HostBuffer<'a, H: Instrumentation + ?Sized> {
    host: &'a H,
    ptr: *mut u8,
    len: usize,
}

impl<'a, H: Instrumentation + ?Sized> HostBuffer<'a, H> {
    fn allocate(host: &'a H, len: usize) -> Result<Self, JvmtiError> {
        let ptr = host.allocate(len)?;
        Ok(Self { host, ptr, len })
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        if self.ptr.is_null() {
            return &mut [];
        }
        // SAFETY: the Instrumentation contract makes `ptr` valid for `len` bytes.
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }

    fn as_slice(&self) -> &[u8] {
        if self.ptr.is_null() {
            return &[];
        }
        // SAFETY: as above.
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }
}

impl<H: Instrumentation + ?Sized> Drop for HostBuffer<'_, H> {
    fn drop(&mut self) {
        if self.ptr.is_null() {
            return;
        }
        // SAFETY: `ptr` came from `allocate` on this host and is released once.
        if let Err(err) = unsafe { self.host.deallocate(self.ptr) } {
            log::warn!("failed to release class buffer: {}", err);
        }
    }
}

/// Reads until `buf` is full or the reader is exhausted.
fn read_fully(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Redefines `class` with the bytes of `{pathToNewByteCode}/{file_base_name}.class`.
///
/// `status` is marked attempted up front and succeeded only when the VM
/// accepted the new definition.
pub fn redefine_class_from_file<H: Instrumentation + ?Sized>(
    host: &H,
    options: &OptionTable,
    status: &RedefineStatus,
    class: jni::jclass,
    file_base_name: &str,
) -> Result<(), RedefineError> {
    status.mark_attempted();

    // Unset and empty are both misconfiguration; an empty dir would resolve under `/`.
    let dir = match options.find_string_value(OPT_PATH_TO_NEW_BYTE_CODE, "") {
        Ok(dir) if !dir.is_empty() => dir,
        _ => {
            log::error!(
                "hint: missing java -agentlib:<agentlib>={}=<dir>",
                OPT_PATH_TO_NEW_BYTE_CODE
            );
            return Err(RedefineError::MissingBytecodePath);
        }
    };
    if file_base_name.is_empty() {
        return Err(RedefineError::MissingFileName);
    }

    let path = PathBuf::from(format!("{}/{}.class", dir, file_base_name));
    log::info!("class file = {}", path.display());

    let mut file = File::open(&path).map_err(|source| RedefineError::Open { path: path.clone(), source })?;
    let size = file
        .metadata()
        .map_err(|source| RedefineError::Metadata { path: path.clone(), source })?
        .len();
    if size > i32::MAX as u64 {
        return Err(RedefineError::TooLarge { path, size });
    }
    let size = size as usize;
    log::debug!("class file size = {}", size);

    let mut buffer =
        logging::traced("Allocate", || HostBuffer::allocate(host, size)).map_err(RedefineError::Allocate)?;
    let actual = read_fully(&mut file, buffer.as_mut_slice())
        .map_err(|source| RedefineError::Read { path: path.clone(), source })?;
    if actual != size {
        return Err(RedefineError::ShortRead { expected: size, actual });
    }
    drop(file);

    logging::traced("RedefineClasses", || host.redefine_class(class, buffer.as_slice()))
        .map_err(RedefineError::Redefine)?;

    status.mark_succeeded();
    Ok(())
}

/// Redefines `class` using the process-wide options and status.
///
/// Returns whether the redefinition succeeded; failures are logged.
pub fn redefine_class(jvmti: &Jvmti, class: jni::jclass, file_base_name: &str) -> bool {
    // Snapshot: RedefineClasses may re-enter agent callbacks that read the context.
    let options = context::options();
    match redefine_class_from_file(jvmti, &options, status(), class, file_base_name) {
        Ok(()) => true,
        Err(err) => {
            log::error!("redefinition of {} failed: {}", file_base_name, err);
            false
        }
    }
}

/// `newclassNN/<path>`, for tests that redefine the same class repeatedly.
pub fn new_class_file_name(redefine_count: u32, path: &str) -> String {
    format!("{}{:02}/{}", NEW_CLASS_DIR, redefine_count, path)
}
