use std::fmt::Display;

#[derive(Debug)]
pub enum PollerError {
    ZeroInterval,
    Disposed,
    BuildErrorNoWorkSet,
}

impl Display for PollerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollerError::ZeroInterval => {
                write!(f, "Poller : interval must be a positive duration !")
            }
            PollerError::Disposed => {
                write!(f, "Poller : instance already disposed !")
            }
            PollerError::BuildErrorNoWorkSet => {
                write!(f, "Poller : Build error  No work callback set !")
            }
        }
    }
}

impl std::error::Error for PollerError {}
