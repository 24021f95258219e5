mod ddpg;

pub use ddpg::DDPG;

use {
    crate::components::ReplayBuffer,
    anyhow::Result,
    candle_core::{
        Device,
        Tensor,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    std::{
        fmt::Display,
        ops::RangeInclusive,
        path::Path,
    },
};

/// The execution mode of an agent is either training or testing.
///
/// In `Train` mode actions are perturbed by exploration noise; in
/// `Test` mode the policy output is used as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    Train,
    Test,
}

impl Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Train => write!(f, "Train"),
            RunMode::Test => write!(f, "Test"),
        }
    }
}

/// Loss values produced by one learning step, reported as telemetry and
/// checked for finiteness by the training loop.
#[derive(Debug, Clone, Copy)]
pub struct TrainMetrics {
    pub critic_loss: f64,
    pub actor_loss: f64,
}

pub trait Algorithm {
    type Config;

    fn config(&self) -> &Self::Config;

    /// Build an agent for an environment with the given state and
    /// action dimensionality and per-component action bounds.
    fn from_config(
        device: &Device,
        config: &Self::Config,
        size_state: usize,
        size_action: usize,
        action_domain: &[RangeInclusive<f64>],
    ) -> Result<Box<Self>>;

    /// Select an action for the given state.
    fn actions(
        &mut self,
        state: &Tensor,
    ) -> Result<Tensor>;

    /// Run one learning step.
    ///
    /// Returns `None` when the replay buffer has not yet reached the
    /// warm-up threshold and the step was skipped.
    fn train(&mut self) -> Result<Option<TrainMetrics>>;

    /// Called once at the start of every episode.
    fn reset(&mut self);

    /// Scale down the exploration magnitude, called by the run driver
    /// according to its decay schedule.
    fn decay_exploration(&mut self, _factor: f64) {}

    fn run_mode(&self) -> RunMode;
    fn set_run_mode(&mut self, mode: RunMode);
}

pub trait OffPolicyAlgorithm: Algorithm {
    #[allow(clippy::too_many_arguments)]
    fn remember(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        terminated: &Tensor,
        truncated: &Tensor,
    );

    fn replay_buffer(&self) -> &ReplayBuffer;
}

pub trait SaveableAlgorithm: Algorithm {
    fn save<P: AsRef<Path> + ?Sized>(
        &self,
        path: &P,
        name: &str,
    ) -> Result<()>;

    fn load<P: AsRef<Path> + ?Sized>(
        &mut self,
        path: &P,
        name: &str,
    ) -> Result<()>;
}
