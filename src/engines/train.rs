use {
    crate::{
        agents::{
            Algorithm,
            OffPolicyAlgorithm,
            RunMode,
        },
        configs::TrainConfig,
        envs::{
            Environment,
            Sampleable,
            TensorConvertible,
        },
        error::TrainError,
    },
    anyhow::Result,
    candle_core::{
        Device,
        Tensor,
    },
    rand::{
        rngs::StdRng,
        Rng,
        SeedableRng,
    },
    tracing::{
        info,
        warn,
    },
};

/// Telemetry collected over a single run.
#[derive(Debug, Default)]
pub struct TrainResults {
    /// Cumulative reward per episode.
    pub mc_returns: Vec<f64>,
    /// Whether each episode ran to its horizon without terminating.
    pub successes: Vec<bool>,
    /// Critic loss per learning update.
    pub critic_losses: Vec<f64>,
}

/// Train (or evaluate) a single run on an environment with an
/// off-policy algorithm.
///
/// Per step: select an action (uniformly sampled during the first
/// `initial_random_actions` global steps), step the environment, store
/// the transition, and run one learning update once the buffer is past
/// its warm-up threshold. The critic is always updated before the
/// actor, and the target networks are soft-updated after both; that
/// ordering lives inside [`Algorithm::train`].
///
/// A non-finite loss aborts the run with
/// [`TrainError::NumericalDivergence`] rather than continuing to train
/// on corrupted parameters. Environment errors propagate unchanged.
pub fn training_loop_off_policy<Alg, Env, Obs, Act>(
    env: &mut Env,
    agent: &mut Alg,
    config: &TrainConfig,
    device: &Device,
) -> Result<TrainResults>
where
    Env: Environment<Action = Act, Observation = Obs>,
    Alg: Algorithm + OffPolicyAlgorithm,
    Obs: Clone + TensorConvertible,
    Act: Clone + TensorConvertible + Sampleable,
{
    warn!("action space: {:?}", env.action_space());
    warn!("observation space: {:?}", env.observation_space());

    agent.set_run_mode(config.mode());

    let mut results = TrainResults::default();
    let mut steps_taken = 0;
    let mut rng = StdRng::seed_from_u64(config.seed());

    for episode in 0..config.max_episodes() {
        let mut total_reward = 0.0;
        let mut terminated_early = false;
        env.reset(rng.gen::<u64>())?;
        agent.reset();

        for step in 0..config.max_steps() {
            let state = &<Obs>::to_tensor(env.current_observation(), device)?;

            // select an action, or randomly sample one during warm-up
            let action = &if steps_taken < config.initial_random_actions() {
                <Act>::to_tensor(<Act>::sample(&mut rng, &env.action_domain()), device)?
            } else {
                agent.actions(state)?
            };

            let env_step = env.step(<Act>::from_tensor(action.clone()))?;
            total_reward += env_step.reward;
            steps_taken += 1;

            agent.remember(
                state,
                action,
                &Tensor::new(vec![env_step.reward], device)?,
                &<Obs>::to_tensor(env_step.observation, device)?,
                &Tensor::new(vec![if env_step.terminated { 1.0 } else { 0.0 }], device)?,
                &Tensor::new(vec![if env_step.truncated { 1.0 } else { 0.0 }], device)?,
            );

            if let RunMode::Train = config.mode() {
                if let Some(metrics) = agent.train()? {
                    if !metrics.critic_loss.is_finite() || !metrics.actor_loss.is_finite() {
                        return Err(TrainError::NumericalDivergence {
                            episode,
                            step,
                            critic_loss: metrics.critic_loss,
                            actor_loss: metrics.actor_loss,
                        }
                        .into());
                    }
                    info!(
                        "episode {episode} step {step} critic loss {:.6}",
                        metrics.critic_loss,
                    );
                    results.critic_losses.push(metrics.critic_loss);
                }
            }

            if env_step.terminated || env_step.truncated {
                terminated_early = env_step.terminated;
                break;
            }
        }

        warn!("episode {episode} with total reward of {total_reward}");
        results.mc_returns.push(total_reward);
        results.successes.push(!terminated_early);

        if let RunMode::Train = config.mode() {
            agent.decay_exploration(config.noise_decay());
        }
    }
    Ok(results)
}
