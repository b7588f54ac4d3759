mod clock_loop;
mod config;
mod errors;
mod poller;

pub use config::{DEFAULT_POLL_INTERVAL, PollerConfig};
pub use errors::PollerError;
pub use poller::{PollWork, Poller, PollerBuilder, TickEvent, WorkError};

pub mod prelude {
    pub use super::{PollWork, Poller, PollerBuilder, PollerConfig, PollerError, TickEvent};
}
