use {
    super::{
        Environment,
        Sampleable,
        Step,
        TensorConvertible,
        VectorConvertible,
    },
    anyhow::Result,
    candle_core::{
        Device,
        Tensor,
    },
    rand::{
        rngs::StdRng,
        Rng,
        RngCore,
        SeedableRng,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    std::ops::RangeInclusive,
};

/// Configuration for the [`PointMassEnv`] environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointMassConfig {
    /// Integration timestep in seconds.
    pub dt: f64,
    /// Magnitude bound on the force action.
    pub max_force: f64,
    /// The mass starts uniformly within `[-start_range, start_range]`.
    pub start_range: f64,
    /// Episode length in steps, the episode is truncated afterwards.
    pub timelimit: usize,
}
impl Default for PointMassConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            max_force: 1.0,
            start_range: 1.0,
            timelimit: 100,
        }
    }
}

/// The observation of the point-mass: its position error relative to
/// the origin and its velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMassObs {
    pub position: f64,
    pub velocity: f64,
}

impl VectorConvertible for PointMassObs {
    fn from_vec(value: Vec<f64>) -> Self {
        assert!(value.len() == 2);
        Self {
            position: value[0],
            velocity: value[1],
        }
    }

    fn to_vec(value: Self) -> Vec<f64> {
        vec![value.position, value.velocity]
    }
}

impl TensorConvertible for PointMassObs {
    fn from_tensor(value: Tensor) -> Self {
        Self::from_vec(value.to_vec1::<f64>().unwrap())
    }

    fn to_tensor(
        value: Self,
        device: &Device,
    ) -> candle_core::Result<Tensor> {
        Tensor::new(Self::to_vec(value), device)
    }
}

/// A bounded force applied to the point-mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMassAction {
    pub force: f64,
}

impl VectorConvertible for PointMassAction {
    fn from_vec(value: Vec<f64>) -> Self {
        assert!(value.len() == 1);
        Self { force: value[0] }
    }

    fn to_vec(value: Self) -> Vec<f64> {
        vec![value.force]
    }
}

impl TensorConvertible for PointMassAction {
    fn from_tensor(value: Tensor) -> Self {
        Self::from_vec(value.to_vec1::<f64>().unwrap())
    }

    fn to_tensor(
        value: Self,
        device: &Device,
    ) -> candle_core::Result<Tensor> {
        Tensor::new(Self::to_vec(value), device)
    }
}

impl Sampleable for PointMassAction {
    fn sample(
        rng: &mut dyn RngCore,
        domain: &[RangeInclusive<f64>],
    ) -> Self {
        assert!(domain.len() == 1);
        Self {
            force: rng.gen_range(domain[0].clone()),
        }
    }
}

/// A deterministic 1-dimensional point-mass.
///
/// The agent applies a bounded force to drive the mass to the origin
/// and keep it there. The reward is the negative squared position
/// error, so the optimal return is close to zero. Episodes never
/// terminate early, they run for a fixed horizon and are then
/// truncated.
pub struct PointMassEnv {
    config: PointMassConfig,
    position: f64,
    velocity: f64,
    timestep: usize,
    rng: StdRng,
}

impl PointMassEnv {
    fn observation(&self) -> PointMassObs {
        PointMassObs {
            position: self.position,
            velocity: self.velocity,
        }
    }
}

impl Environment for PointMassEnv {
    type Config = PointMassConfig;
    type Action = PointMassAction;
    type Observation = PointMassObs;

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn new(config: Self::Config) -> Result<Box<Self>> {
        Ok(Box::new(Self {
            config,
            position: 0.0,
            velocity: 0.0,
            timestep: 0,
            rng: StdRng::seed_from_u64(0),
        }))
    }

    fn reset(
        &mut self,
        seed: u64,
    ) -> Result<Self::Observation> {
        self.rng = StdRng::seed_from_u64(seed);
        self.position = self
            .rng
            .gen_range(-self.config.start_range..=self.config.start_range);
        self.velocity = 0.0;
        self.timestep = 0;
        Ok(self.observation())
    }

    fn step(
        &mut self,
        action: Self::Action,
    ) -> Result<Step<Self::Observation, Self::Action>> {
        let force = action
            .force
            .clamp(-self.config.max_force, self.config.max_force);

        self.velocity += force * self.config.dt;
        self.position += self.velocity * self.config.dt;
        self.timestep += 1;

        Ok(Step {
            observation: self.observation(),
            action,
            reward: -(self.position * self.position),
            terminated: false,
            truncated: self.timestep >= self.config.timelimit,
        })
    }

    fn timelimit(&self) -> usize {
        self.config.timelimit
    }

    fn action_space(&self) -> Vec<usize> {
        vec![1]
    }

    fn action_domain(&self) -> Vec<RangeInclusive<f64>> {
        vec![-self.config.max_force..=self.config.max_force]
    }

    fn observation_space(&self) -> Vec<usize> {
        vec![2]
    }

    fn observation_domain(&self) -> Vec<RangeInclusive<f64>> {
        vec![f64::MIN..=f64::MAX, f64::MIN..=f64::MAX]
    }

    fn current_observation(&self) -> Self::Observation {
        self.observation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_is_deterministic_given_a_seed() {
        let mut env = *PointMassEnv::new(Default::default()).unwrap();
        let a = env.reset(17).unwrap();
        let b = env.reset(17).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.velocity, 0.0);
        assert!(a.position.abs() <= 1.0);
    }

    #[test]
    fn dynamics_integrate_force() {
        let mut env = *PointMassEnv::new(Default::default()).unwrap();
        env.reset(0).unwrap();
        let start = env.current_observation();

        let step = env.step(PointMassAction { force: 1.0 }).unwrap();
        assert_eq!(step.observation.velocity, 0.1);
        assert_eq!(step.observation.position, start.position + 0.1 * 0.1);
        assert_eq!(step.reward, -(step.observation.position.powi(2)));
    }

    #[test]
    fn actions_are_clamped_to_the_force_bound() {
        let mut env = *PointMassEnv::new(Default::default()).unwrap();
        env.reset(0).unwrap();
        let step = env.step(PointMassAction { force: 1e9 }).unwrap();
        assert_eq!(step.observation.velocity, 0.1);
    }

    #[test]
    fn episode_truncates_at_the_timelimit() {
        let mut env = *PointMassEnv::new(PointMassConfig {
            timelimit: 3,
            ..Default::default()
        })
        .unwrap();
        env.reset(0).unwrap();
        for expected in [false, false, true] {
            let step = env.step(PointMassAction { force: 0.0 }).unwrap();
            assert_eq!(step.truncated, expected);
            assert!(!step.terminated);
        }
    }
}
