use std::fmt;

/// Failures raised by the learning machinery itself.
///
/// Environment failures are not part of this taxonomy, they propagate
/// unchanged as [`anyhow::Error`]s from the environment implementation.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainError {
    /// A batch was requested before the buffer held enough transitions.
    ///
    /// Recoverable: the training loop skips the learning step until the
    /// warm-up threshold is reached.
    InsufficientData {
        requested: usize,
        available: usize,
    },
    /// The configured network geometry disagrees with what the
    /// environment declares. Fatal at setup.
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A loss became non-finite after an update. Fatal for the run,
    /// carries enough context to reproduce.
    NumericalDivergence {
        episode: usize,
        step: usize,
        critic_loss: f64,
        actor_loss: f64,
    },
}

impl fmt::Display for TrainError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::InsufficientData { requested, available } => write!(
                f,
                "insufficient data: requested a batch of {requested} but the buffer holds {available}",
            ),
            Self::DimensionMismatch { what, expected, actual } => write!(
                f,
                "dimension mismatch for {what}: expected {expected} but got {actual}",
            ),
            Self::NumericalDivergence { episode, step, critic_loss, actor_loss } => write!(
                f,
                "non-finite loss at episode {episode}, step {step} \
                 (critic loss: {critic_loss}, actor loss: {actor_loss})",
            ),
        }
    }
}

impl std::error::Error for TrainError {}
