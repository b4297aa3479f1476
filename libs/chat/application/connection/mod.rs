//! Connection lifecycle: state, reconnect scheduling and the manager that
//! ties them together.

pub mod manager;
pub mod scheduler;
pub mod state;

pub use manager::{ConnectionManager, ManagerSettings, AUTH_REQUIRED_CLOSE_CODE};
pub use scheduler::{ReconnectScheduler, TimerToken};
pub use state::{CloseReason, ConnectionState};
