//! Raw monitors with scope-bound ownership.
//!
//! ```rust,ignore
//! let lock = RawMonitor::create(&jvmti, "agent lock")?;
//! {
//!     let guard = lock.enter()?;
//!     guard.notify_all()?;
//! } // exited here
//! ```

use crate::error::JvmtiError;
use crate::jvmti_wrapper::Jvmti;
use crate::sys::{jni, jvmti};

/// A JVMTI raw monitor, destroyed on drop.
pub struct RawMonitor<'a> {
    jvmti: &'a Jvmti,
    id: jvmti::jrawMonitorID,
    name: String,
}

impl<'a> RawMonitor<'a> {
    pub fn create(jvmti: &'a Jvmti, name: &str) -> Result<Self, JvmtiError> {
        let id = jvmti.create_raw_monitor(name)?;
        log::trace!("created raw monitor {}", name);
        Ok(Self { jvmti, id, name: name.to_string() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw(&self) -> jvmti::jrawMonitorID {
        self.id
    }

    /// Enters the monitor. Ownership ends when the guard is dropped.
    pub fn enter(&self) -> Result<MonitorGuard<'_, 'a>, JvmtiError> {
        self.jvmti.raw_monitor_enter(self.id)?;
        Ok(MonitorGuard { monitor: self })
    }
}

impl Drop for RawMonitor<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.jvmti.destroy_raw_monitor(self.id) {
            log::warn!("failed to destroy raw monitor {}: {}", self.name, err);
        }
    }
}

/// Proof of ownership of a [`RawMonitor`]. Wait and notify need one.
pub struct MonitorGuard<'m, 'a> {
    monitor: &'m RawMonitor<'a>,
}

impl MonitorGuard<'_, '_> {
    /// Waits up to `millis` milliseconds; 0 waits until notified.
    pub fn wait(&self, millis: jni::jlong) -> Result<(), JvmtiError> {
        self.monitor.jvmti.raw_monitor_wait(self.monitor.id, millis)
    }

    pub fn notify(&self) -> Result<(), JvmtiError> {
        self.monitor.jvmti.raw_monitor_notify(self.monitor.id)
    }

    pub fn notify_all(&self) -> Result<(), JvmtiError> {
        self.monitor.jvmti.raw_monitor_notify_all(self.monitor.id)
    }
}

impl Drop for MonitorGuard<'_, '_> {
    fn drop(&mut self) {
        if let Err(err) = self.monitor.jvmti.raw_monitor_exit(self.monitor.id) {
            log::warn!("failed to exit raw monitor {}: {}", self.monitor.name, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEnv, FakeMonitor};
    use std::sync::atomic::Ordering;

    fn fake<'m>(monitor: &'m RawMonitor<'_>) -> &'m FakeMonitor {
        unsafe { &*(monitor.raw() as *const FakeMonitor) }
    }

    #[test]
    fn guard_exits_on_drop() {
        let mut env = FakeEnv::new();
        let jvmti = env.jvmti();
        let lock = RawMonitor::create(&jvmti, "test lock").unwrap();
        assert_eq!(fake(&lock).name, "test lock");

        {
            let _outer = lock.enter().unwrap();
            let _inner = lock.enter().unwrap();
            assert_eq!(fake(&lock).depth.load(Ordering::SeqCst), 2);
        }
        assert_eq!(fake(&lock).depth.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn notify_and_wait_under_the_guard() {
        let mut env = FakeEnv::new();
        let jvmti = env.jvmti();
        let lock = RawMonitor::create(&jvmti, "signal").unwrap();
        let guard = lock.enter().unwrap();
        guard.notify().unwrap();
        guard.notify_all().unwrap();
        guard.wait(10).unwrap();
        assert_eq!(guard.wait(-1), Err(JvmtiError::ILLEGAL_ARGUMENT));
        assert_eq!(fake(&lock).notified.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn names_with_nul_are_rejected() {
        let mut env = FakeEnv::new();
        let jvmti = env.jvmti();
        assert!(matches!(RawMonitor::create(&jvmti, "bad\0name"), Err(JvmtiError::ILLEGAL_ARGUMENT)));
    }
}
