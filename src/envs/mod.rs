mod point_mass;
mod track;

use {
    anyhow::Result,
    candle_core::{
        Device,
        Tensor,
    },
    rand::RngCore,
    std::ops::RangeInclusive,
};

pub use point_mass::{
    PointMassAction,
    PointMassConfig,
    PointMassEnv,
    PointMassObs,
};
pub use track::{
    DriveAction,
    TrackConfig,
    TrackEnv,
    TrackObs,
    Vec2,
};

pub trait TensorConvertible: VectorConvertible {
    fn from_tensor(value: Tensor) -> Self;
    fn to_tensor(
        value: Self,
        device: &Device,
    ) -> candle_core::Result<Tensor>;
}

pub trait VectorConvertible {
    fn from_vec(value: Vec<f64>) -> Self;
    fn to_vec(value: Self) -> Vec<f64>;
}

pub trait Sampleable {
    fn sample(
        rng: &mut dyn RngCore,
        domain: &[RangeInclusive<f64>],
    ) -> Self;
}

/// The result of taking a single step in an environment.
#[derive(Debug)]
pub struct Step<O, A> {
    pub observation: O,
    pub action: A,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
}

/// The environment capability consumed by the training machinery.
///
/// Action and observation spaces and domains are queried once at setup;
/// `reset` starts a fresh episode from the given seed and `step`
/// advances the simulation by one action.
pub trait Environment {
    type Config;
    type Action;
    type Observation;

    fn config(&self) -> &Self::Config;
    fn new(config: Self::Config) -> Result<Box<Self>>;
    fn reset(
        &mut self,
        seed: u64,
    ) -> Result<Self::Observation>;
    fn step(
        &mut self,
        action: Self::Action,
    ) -> Result<Step<Self::Observation, Self::Action>>;
    fn timelimit(&self) -> usize;
    fn action_space(&self) -> Vec<usize>;
    fn action_domain(&self) -> Vec<RangeInclusive<f64>>;
    fn observation_space(&self) -> Vec<usize>;
    fn observation_domain(&self) -> Vec<RangeInclusive<f64>>;
    fn current_observation(&self) -> Self::Observation;
}
