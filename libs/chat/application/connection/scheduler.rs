use std::fmt;
use std::time::Duration;

/// Identity of one scheduled reconnect
///
/// A fire whose token is not the pending one is stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

impl TimerToken {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// One-shot deferred callbacks for reconnection
///
/// When the delay elapses the implementation must deliver `token` back to
/// the manager's `on_reconnect_due`.
pub trait ReconnectScheduler: Send {
    fn schedule(&mut self, token: TimerToken, delay: Duration);

    /// Drop a pending fire; unknown tokens are ignored
    fn cancel(&mut self, token: TimerToken);
}
