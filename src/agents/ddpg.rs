use {
    super::{
        Algorithm,
        OffPolicyAlgorithm,
        RunMode,
        SaveableAlgorithm,
        TrainMetrics,
    },
    crate::{
        components::{
            OuNoise,
            ReplayBuffer,
        },
        configs::DDPGConfig,
        error::TrainError,
    },
    anyhow::Result,
    candle_core::{
        DType,
        Device,
        Error,
        Module,
        Tensor,
        Var,
    },
    candle_nn::{
        func,
        linear,
        sequential::seq,
        Activation,
        AdamW,
        Optimizer,
        ParamsAdamW,
        Sequential,
        VarBuilder,
        VarMap,
    },
    rand::{
        rngs::StdRng,
        SeedableRng,
    },
    std::{
        ops::RangeInclusive,
        path::Path,
    },
    tracing::info,
};

/// Blend the target parameters towards the online parameters:
///
/// `theta_target <- tau * theta + (1 - tau) * theta_target`
///
/// With `tau = 1.0` this is a hard copy, which is how the target
/// networks are initialized.
fn track(
    varmap: &mut VarMap,
    vb: &VarBuilder,
    target_prefix: &str,
    network_prefix: &str,
    dims: &[(usize, usize)],
    tau: f64,
) -> candle_core::Result<()> {
    for (i, &(in_dim, out_dim)) in dims.iter().enumerate() {
        let target_w = vb.get((out_dim, in_dim), &format!("{target_prefix}-fc{i}.weight"))?;
        let network_w = vb.get((out_dim, in_dim), &format!("{network_prefix}-fc{i}.weight"))?;
        varmap.set_one(
            format!("{target_prefix}-fc{i}.weight"),
            ((tau * network_w)? + ((1.0 - tau) * target_w)?)?,
        )?;

        let target_b = vb.get(out_dim, &format!("{target_prefix}-fc{i}.bias"))?;
        let network_b = vb.get(out_dim, &format!("{network_prefix}-fc{i}.bias"))?;
        varmap.set_one(
            format!("{target_prefix}-fc{i}.bias"),
            ((tau * network_b)? + ((1.0 - tau) * target_b)?)?,
        )?;
    }
    Ok(())
}

/// The policy network together with its slowly-tracking target copy.
///
/// The raw network output passes through a tanh and is then rescaled
/// per-component into the environment's action bounds, so the actor
/// output is always in bounds regardless of the input magnitude.
#[allow(dead_code)]
struct Actor<'a> {
    varmap: VarMap,
    vb: VarBuilder<'a>,
    network: Sequential,
    target_network: Sequential,
    dims: Vec<(usize, usize)>,
    scale: Tensor,
    offset: Tensor,
}

impl Actor<'_> {
    fn new(
        device: &Device,
        dtype: DType,
        dims: &[(usize, usize)],
        action_domain: &[RangeInclusive<f64>],
    ) -> candle_core::Result<Self> {
        let mut varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, dtype, device);

        let make_network = |prefix: &str| {
            let seq = seq()
                .add(linear(
                    dims[0].0,
                    dims[0].1,
                    vb.pp(format!("{prefix}-fc0")),
                )?)
                .add(Activation::Relu)
                .add(linear(
                    dims[1].0,
                    dims[1].1,
                    vb.pp(format!("{prefix}-fc1")),
                )?)
                .add(Activation::Relu)
                .add(linear(
                    dims[2].0,
                    dims[2].1,
                    vb.pp(format!("{prefix}-fc2")),
                )?)
                .add(func(|xs| xs.tanh()));
            Ok::<Sequential, Error>(seq)
        };

        let network = make_network("actor")?;
        let target_network = make_network("target-actor")?;

        // this sets the two networks to be equal to each other using tau = 1.0
        track(&mut varmap, &vb, "target-actor", "actor", dims, 1.0)?;

        let low: Vec<f64> = action_domain.iter().map(|r| *r.start()).collect();
        let high: Vec<f64> = action_domain.iter().map(|r| *r.end()).collect();
        let scale: Vec<f64> = low.iter().zip(&high).map(|(l, h)| (h - l) / 2.0).collect();
        let offset: Vec<f64> = low.iter().zip(&high).map(|(l, h)| (h + l) / 2.0).collect();

        Ok(Self {
            varmap,
            vb,
            network,
            target_network,
            dims: dims.to_vec(),
            scale: Tensor::new(scale, device)?,
            offset: Tensor::new(offset, device)?,
        })
    }

    fn forward(
        &self,
        state: &Tensor,
    ) -> candle_core::Result<Tensor> {
        self.network
            .forward(state)?
            .broadcast_mul(&self.scale)?
            .broadcast_add(&self.offset)
    }

    fn target_forward(
        &self,
        state: &Tensor,
    ) -> candle_core::Result<Tensor> {
        self.target_network
            .forward(state)?
            .broadcast_mul(&self.scale)?
            .broadcast_add(&self.offset)
    }

    fn track(
        &mut self,
        tau: f64,
    ) -> candle_core::Result<()> {
        track(
            &mut self.varmap,
            &self.vb,
            "target-actor",
            "actor",
            &self.dims,
            tau,
        )
    }
}

/// The value network together with its slowly-tracking target copy.
#[allow(dead_code)]
struct Critic<'a> {
    varmap: VarMap,
    vb: VarBuilder<'a>,
    network: Sequential,
    target_network: Sequential,
    dims: Vec<(usize, usize)>,
}

impl Critic<'_> {
    fn new(
        device: &Device,
        dtype: DType,
        dims: &[(usize, usize)],
    ) -> candle_core::Result<Self> {
        let mut varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, dtype, device);

        let make_network = |prefix: &str| {
            let seq = seq()
                .add(linear(
                    dims[0].0,
                    dims[0].1,
                    vb.pp(format!("{prefix}-fc0")),
                )?)
                .add(Activation::Relu)
                .add(linear(
                    dims[1].0,
                    dims[1].1,
                    vb.pp(format!("{prefix}-fc1")),
                )?)
                .add(Activation::Relu)
                .add(linear(
                    dims[2].0,
                    dims[2].1,
                    vb.pp(format!("{prefix}-fc2")),
                )?);
            Ok::<Sequential, Error>(seq)
        };

        let network = make_network("critic")?;
        let target_network = make_network("target-critic")?;

        // this sets the two networks to be equal to each other using tau = 1.0
        track(&mut varmap, &vb, "target-critic", "critic", dims, 1.0)?;

        Ok(Self {
            varmap,
            vb,
            network,
            target_network,
            dims: dims.to_vec(),
        })
    }

    fn forward(
        &self,
        state: &Tensor,
        action: &Tensor,
    ) -> candle_core::Result<Tensor> {
        let xs = Tensor::cat(&[action, state], 1)?;
        self.network.forward(&xs)
    }

    fn target_forward(
        &self,
        state: &Tensor,
        action: &Tensor,
    ) -> candle_core::Result<Tensor> {
        let xs = Tensor::cat(&[action, state], 1)?;
        self.target_network.forward(&xs)
    }

    fn track(
        &mut self,
        tau: f64,
    ) -> candle_core::Result<()> {
        track(
            &mut self.varmap,
            &self.vb,
            "target-critic",
            "critic",
            &self.dims,
            tau,
        )
    }
}

/// Deep Deterministic Policy Gradient.
///
/// An off-policy actor-critic agent for continuous action spaces. The
/// agent owns all four networks, the replay buffer, and the exploration
/// noise process for the duration of a training run.
#[allow(dead_code)]
#[allow(clippy::upper_case_acronyms)]
pub struct DDPG<'a> {
    actor: Actor<'a>,
    actor_optim: AdamW,
    critic: Critic<'a>,
    critic_optim: AdamW,
    gamma: f64,
    tau: f64,
    replay_buffer: ReplayBuffer,
    batch_size: usize,
    warmup: usize,
    ou_noise: OuNoise,
    action_low: Tensor,
    action_high: Tensor,

    device: Device,
    size_state: usize,
    size_action: usize,
    run_mode: RunMode,
    config: DDPGConfig,
}

impl DDPG<'_> {
    pub fn new(
        device: &Device,
        config: &DDPGConfig,
        size_state: usize,
        size_action: usize,
        action_domain: &[RangeInclusive<f64>],
    ) -> Result<Self> {
        if action_domain.len() != size_action {
            return Err(TrainError::DimensionMismatch {
                what: "action bounds",
                expected: size_action,
                actual: action_domain.len(),
            }
            .into());
        }
        let filter_by_prefix = |varmap: &VarMap, prefix: &str| {
            varmap
                .data()
                .lock()
                .unwrap()
                .iter()
                .filter_map(|(name, var)| name.starts_with(prefix).then_some(var.clone()))
                .collect::<Vec<Var>>()
        };

        let actor = Actor::new(
            device,
            DType::F64,
            &[
                (size_state, config.hidden_1_size),
                (config.hidden_1_size, config.hidden_2_size),
                (config.hidden_2_size, size_action),
            ],
            action_domain,
        )?;
        let actor_optim = AdamW::new(
            filter_by_prefix(&actor.varmap, "actor"),
            ParamsAdamW {
                lr: config.actor_learning_rate,
                ..Default::default()
            },
        )?;

        let critic = Critic::new(
            device,
            DType::F64,
            &[
                (size_state + size_action, config.hidden_1_size),
                (config.hidden_1_size, config.hidden_2_size),
                (config.hidden_2_size, 1),
            ],
        )?;
        let critic_optim = AdamW::new(
            filter_by_prefix(&critic.varmap, "critic"),
            ParamsAdamW {
                lr: config.critic_learning_rate,
                ..Default::default()
            },
        )?;

        let low: Vec<f64> = action_domain.iter().map(|r| *r.start()).collect();
        let high: Vec<f64> = action_domain.iter().map(|r| *r.end()).collect();

        Ok(Self {
            actor,
            actor_optim,
            critic,
            critic_optim,
            gamma: config.gamma,
            tau: config.tau,
            replay_buffer: ReplayBuffer::new(
                config.replay_buffer_capacity,
                StdRng::seed_from_u64(config.seed),
            ),
            batch_size: config.training_batch_size,
            // learning cannot start before a full batch is available
            warmup: config.warmup.max(config.training_batch_size),
            ou_noise: OuNoise::new(
                config.ou_mu,
                config.ou_theta,
                config.ou_sigma,
                size_action,
                StdRng::seed_from_u64(config.seed.wrapping_add(1)),
            )?,
            action_low: Tensor::new(low, device)?,
            action_high: Tensor::new(high, device)?,
            device: device.clone(),
            size_state,
            size_action,
            run_mode: RunMode::Train,
            config: config.clone(),
        })
    }

    /// The bootstrapped regression target for the critic:
    ///
    /// `y = r + gamma * (1 - terminated) * Q'(s', mu'(s'))`
    ///
    /// Targets come from the target networks only and are detached, so
    /// the regression target does not shift within the update itself.
    /// For terminal transitions the future term is zeroed, terminal
    /// states have no continuation value.
    fn critic_targets(
        &self,
        rewards: &Tensor,
        next_states: &Tensor,
        terminateds: &Tensor,
    ) -> candle_core::Result<Tensor> {
        let next_actions = self.actor.target_forward(next_states)?;
        let q_target = self.critic.target_forward(next_states, &next_actions)?;
        let continues = terminateds.affine(-1.0, 1.0)?;
        Ok((rewards + ((self.gamma * q_target)? * continues)?)?.detach())
    }
}

impl Algorithm for DDPG<'_> {
    type Config = DDPGConfig;

    fn config(&self) -> &DDPGConfig {
        &self.config
    }

    fn from_config(
        device: &Device,
        config: &DDPGConfig,
        size_state: usize,
        size_action: usize,
        action_domain: &[RangeInclusive<f64>],
    ) -> Result<Box<Self>> {
        Ok(Box::new(Self::new(
            device,
            config,
            size_state,
            size_action,
            action_domain,
        )?))
    }

    fn actions(
        &mut self,
        state: &Tensor,
    ) -> Result<Tensor> {
        // Candle assumes a batch dimension, so when we don't have one we
        // need to pretend we do by un- and resqueezing the state tensor.
        let actions = self
            .actor
            .forward(&state.detach().unsqueeze(0)?)?
            .squeeze(0)?;
        Ok(if let RunMode::Train = self.run_mode {
            let noise = Tensor::new(self.ou_noise.sample(), &self.device)?;
            (actions + noise)?
                .minimum(&self.action_high)?
                .maximum(&self.action_low)?
        } else {
            actions
        })
    }

    fn train(&mut self) -> Result<Option<TrainMetrics>> {
        if self.replay_buffer.size() < self.warmup {
            return Ok(None);
        }
        let (states, actions, rewards, next_states, terminateds, _truncateds) =
            self.replay_buffer.random_batch(self.batch_size)?;

        let q_target = self.critic_targets(&rewards, &next_states, &terminateds)?;
        let q = self.critic.forward(&states, &actions)?;
        let diff = (q_target - q)?;

        let critic_loss = diff.sqr()?.mean_all()?;
        self.critic_optim.backward_step(&critic_loss)?;

        // gradient ascent on the critic's evaluation of the actor,
        // through the freshly-updated critic
        let actor_loss = self
            .critic
            .forward(&states, &self.actor.forward(&states)?)?
            .mean_all()?
            .neg()?;
        self.actor_optim.backward_step(&actor_loss)?;

        self.critic.track(self.tau)?;
        self.actor.track(self.tau)?;

        Ok(Some(TrainMetrics {
            critic_loss: critic_loss.to_scalar::<f64>()?,
            actor_loss: actor_loss.to_scalar::<f64>()?,
        }))
    }

    fn reset(&mut self) {
        self.ou_noise.reset();
    }

    fn decay_exploration(
        &mut self,
        factor: f64,
    ) {
        self.ou_noise.scale_sigma(factor);
    }

    fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    fn set_run_mode(&mut self, mode: RunMode) {
        self.run_mode = mode;
    }
}

impl OffPolicyAlgorithm for DDPG<'_> {
    fn remember(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        terminated: &Tensor,
        truncated: &Tensor,
    ) {
        info!(
            "pushing to replay buffer: {state:?} {action:?} {reward:?} {next_state:?}",
        );
        self.replay_buffer
            .push(state, action, reward, next_state, terminated, truncated)
    }

    fn replay_buffer(&self) -> &ReplayBuffer {
        &self.replay_buffer
    }
}

impl SaveableAlgorithm for DDPG<'_> {
    /// Write the actor and critic parameter vectors as safetensors
    /// files. The target parameters live in the same varmaps, so a
    /// mid-training state with partially-tracked targets restores
    /// exactly.
    fn save<P: AsRef<Path> + ?Sized>(
        &self,
        path: &P,
        name: &str,
    ) -> Result<()> {
        let dir = path.as_ref();
        self.actor
            .varmap
            .save(dir.join(format!("{name}-actor.safetensors")))?;
        self.critic
            .varmap
            .save(dir.join(format!("{name}-critic.safetensors")))?;
        Ok(())
    }

    fn load<P: AsRef<Path> + ?Sized>(
        &mut self,
        path: &P,
        name: &str,
    ) -> Result<()> {
        let dir = path.as_ref();
        self.actor
            .varmap
            .load(dir.join(format!("{name}-actor.safetensors")))?;
        self.critic
            .varmap
            .load(dir.join(format!("{name}-critic.safetensors")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> DDPGConfig {
        DDPGConfig {
            hidden_1_size: 8,
            hidden_2_size: 8,
            replay_buffer_capacity: 64,
            training_batch_size: 4,
            warmup: 4,
            ..DDPGConfig::point_mass()
        }
    }

    fn var_values(
        varmap: &VarMap,
        name: &str,
    ) -> Vec<f64> {
        varmap
            .data()
            .lock()
            .unwrap()
            .get(name)
            .unwrap_or_else(|| panic!("no var named {name}"))
            .flatten_all()
            .unwrap()
            .to_vec1::<f64>()
            .unwrap()
    }

    #[test]
    fn targets_equal_online_networks_at_construction() {
        let device = Device::Cpu;
        let agent = DDPG::new(&device, &small_config(), 3, 2, &[-1.0..=1.0, -1.0..=1.0]).unwrap();

        for i in 0..3 {
            for part in ["weight", "bias"] {
                assert_eq!(
                    var_values(&agent.actor.varmap, &format!("actor-fc{i}.{part}")),
                    var_values(&agent.actor.varmap, &format!("target-actor-fc{i}.{part}")),
                );
                assert_eq!(
                    var_values(&agent.critic.varmap, &format!("critic-fc{i}.{part}")),
                    var_values(&agent.critic.varmap, &format!("target-critic-fc{i}.{part}")),
                );
            }
        }
    }

    #[test]
    fn soft_update_blends_exactly() {
        let device = Device::Cpu;
        let mut agent =
            DDPG::new(&device, &small_config(), 2, 1, &[-1.0..=1.0]).unwrap();

        // move the online weights away from the (initially equal) targets
        let n = 8 * 2;
        let fresh = Tensor::new(
            (0..n).map(|i| i as f64 * 0.25 - 1.0).collect::<Vec<f64>>(),
            &device,
        )
        .unwrap()
        .reshape((8, 2))
        .unwrap();
        agent
            .actor
            .varmap
            .set_one("actor-fc0.weight", fresh)
            .unwrap();

        for tau in [0.0, 0.001, 0.5, 1.0] {
            let online = var_values(&agent.actor.varmap, "actor-fc0.weight");
            let target = var_values(&agent.actor.varmap, "target-actor-fc0.weight");
            let expected: Vec<f64> = online
                .iter()
                .zip(&target)
                .map(|(w, t)| tau * w + (1.0 - tau) * t)
                .collect();

            agent.actor.track(tau).unwrap();

            assert_eq!(
                var_values(&agent.actor.varmap, "target-actor-fc0.weight"),
                expected,
            );
        }
    }

    #[test]
    fn actions_stay_within_bounds() {
        let device = Device::Cpu;
        let domain = [0.0..=1.0, -2.0..=0.5];
        let mut agent = DDPG::new(&device, &small_config(), 3, 2, &domain).unwrap();

        for magnitude in [0.0, 1.0, 1e3, 1e6] {
            for mode in [RunMode::Test, RunMode::Train] {
                agent.set_run_mode(mode);
                let state =
                    Tensor::new(vec![magnitude, -magnitude, magnitude], &device).unwrap();
                let action = agent.actions(&state).unwrap().to_vec1::<f64>().unwrap();
                for (a, range) in action.iter().zip(&domain) {
                    assert!(
                        range.contains(a),
                        "action {a} outside {range:?} for state magnitude {magnitude}",
                    );
                }
            }
        }
    }

    #[test]
    fn terminal_transitions_bootstrap_to_the_reward_alone() {
        let device = Device::Cpu;
        let agent = DDPG::new(&device, &small_config(), 2, 1, &[-1.0..=1.0]).unwrap();

        let rewards = Tensor::new(vec![3.5, -1.25], &device)
            .unwrap()
            .reshape((2, 1))
            .unwrap();
        let next_states = Tensor::new(vec![0.3, -0.7, 12.0, 4.5], &device)
            .unwrap()
            .reshape((2, 2))
            .unwrap();
        let terminateds = Tensor::new(vec![1.0, 1.0], &device)
            .unwrap()
            .reshape((2, 1))
            .unwrap();

        let targets = agent
            .critic_targets(&rewards, &next_states, &terminateds)
            .unwrap();
        assert_eq!(targets.to_vec2::<f64>().unwrap(), vec![vec![3.5], vec![-1.25]]);
    }

    #[test]
    fn mismatched_action_bounds_fail_fast() {
        let device = Device::Cpu;
        let err = DDPG::new(&device, &small_config(), 3, 2, &[-1.0..=1.0])
            .err()
            .expect("one bound for two action components must be rejected");
        match err.downcast_ref::<TrainError>() {
            Some(TrainError::DimensionMismatch { expected: 2, actual: 1, .. }) => (),
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn train_skips_until_warmup() {
        let device = Device::Cpu;
        let mut agent = DDPG::new(&device, &small_config(), 2, 1, &[-1.0..=1.0]).unwrap();

        assert!(agent.train().unwrap().is_none());

        let state = Tensor::new(vec![0.1, 0.2], &device).unwrap();
        let action = Tensor::new(vec![0.5], &device).unwrap();
        let reward = Tensor::new(vec![1.0], &device).unwrap();
        let flag = Tensor::new(vec![0.0], &device).unwrap();
        for _ in 0..4 {
            agent.remember(&state, &action, &reward, &state, &flag, &flag);
        }

        let metrics = agent.train().unwrap().expect("buffer is warm");
        assert!(metrics.critic_loss.is_finite());
        assert!(metrics.actor_loss.is_finite());
    }
}
