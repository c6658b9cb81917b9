//! Host watchdog suppression for long maintenance operations

use tracing::debug;

/// Something that flags the process as hung when it is busy for too long
pub trait Watchdog {
    fn disable(&self);
    fn enable(&self);
}

/// For hosts without a watchdog
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWatchdog;

impl Watchdog for NoopWatchdog {
    fn disable(&self) {}
    fn enable(&self) {}
}

/// Disables a watchdog until dropped
pub struct WatchdogPause<'a> {
    watchdog: &'a dyn Watchdog,
}

impl<'a> WatchdogPause<'a> {
    pub fn new(watchdog: &'a dyn Watchdog) -> Self {
        debug!("watchdog disabled");
        watchdog.disable();
        Self { watchdog }
    }
}

impl Drop for WatchdogPause<'_> {
    fn drop(&mut self) {
        self.watchdog.enable();
        debug!("watchdog enabled");
    }
}
