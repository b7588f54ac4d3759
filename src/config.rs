use std::time::Duration;

/// Default polling interval, 30 seconds.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30_000);

#[derive(Clone)]
pub struct PollerConfig {
    interval: Duration,
    name: Option<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            name: None,
        }
    }
}
impl PollerConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    pub fn get_interval(&self) -> Duration {
        self.interval
    }
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
