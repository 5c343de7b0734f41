//! Build and control-submission errors.

use std::error::Error;
use std::fmt;

use bore_core::ConfigError;

/// How a background field build ended without producing a field.
///
/// In every case the staging slot is cleared and the active field, if
/// any, keeps running.
#[derive(Clone, Debug, PartialEq)]
pub enum BuildError {
    /// The configuration was rejected, either when the rebuild was
    /// requested or during classification.
    Config(ConfigError),
    /// The build did not report within the configured timeout and was
    /// abandoned.
    TimedOut {
        /// Time waited before giving up.
        elapsed_ms: u64,
    },
    /// The build thread exited without reporting a result.
    WorkerPanicked,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "field build rejected: {e}"),
            Self::TimedOut { elapsed_ms } => {
                write!(f, "field build abandoned after {elapsed_ms} ms")
            }
            Self::WorkerPanicked => write!(f, "field build thread panicked"),
        }
    }
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for BuildError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Error sending a control message to the tick loop.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The tick loop has shut down.
    Shutdown,
    /// The control channel is full (back-pressure).
    ChannelFull,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => write!(f, "tick loop has shut down"),
            Self::ChannelFull => write!(f, "control channel full"),
        }
    }
}

impl Error for SubmitError {}

impl<T> From<crossbeam_channel::TrySendError<T>> for SubmitError {
    fn from(e: crossbeam_channel::TrySendError<T>) -> Self {
        match e {
            crossbeam_channel::TrySendError::Full(_) => Self::ChannelFull,
            crossbeam_channel::TrySendError::Disconnected(_) => Self::Shutdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_is_the_source() {
        let e = BuildError::from(ConfigError::EmptyLayout);
        assert_eq!(
            e.source().map(|s| s.to_string()),
            Some("layout declares no segments".to_string())
        );
        assert!(BuildError::WorkerPanicked.source().is_none());
    }

    #[test]
    fn timeout_display() {
        let e = BuildError::TimedOut { elapsed_ms: 5000 };
        assert_eq!(e.to_string(), "field build abandoned after 5000 ms");
    }

    #[test]
    fn try_send_errors_map() {
        let (tx, rx) = crossbeam_channel::bounded::<u8>(1);
        tx.try_send(1).unwrap();
        assert_eq!(
            SubmitError::from(tx.try_send(2).unwrap_err()),
            SubmitError::ChannelFull
        );
        drop(rx);
        assert_eq!(
            SubmitError::from(tx.try_send(3).unwrap_err()),
            SubmitError::Shutdown
        );
    }
}
