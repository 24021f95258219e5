use serde::{
    Deserialize,
    Serialize,
};

/// Hyperparameters of the [`DDPG`](crate::agents::DDPG) agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DDPGConfig {
    // The learning rates for the Actor and Critic networks
    pub actor_learning_rate: f64,
    pub critic_learning_rate: f64,
    // The impact of the q value of the next state on the current state's q value.
    pub gamma: f64,
    // The weight for updating the target networks.
    pub tau: f64,
    // The number of neurons in the hidden layers of the Actor and Critic networks.
    pub hidden_1_size: usize,
    pub hidden_2_size: usize,
    // The capacity of the replay buffer used for sampling training data.
    pub replay_buffer_capacity: usize,
    // The training batch size for each training iteration.
    pub training_batch_size: usize,
    // The number of transitions to collect before learning starts.
    pub warmup: usize,
    // Ornstein-Uhlenbeck process parameters.
    pub ou_mu: f64,
    pub ou_theta: f64,
    pub ou_sigma: f64,
    // Seed for the replay buffer and noise random sources.
    pub seed: u64,
}
impl DDPGConfig {
    pub fn track() -> Self {
        Self {
            actor_learning_rate: 1e-4,
            critic_learning_rate: 1e-3,
            gamma: 0.99,
            tau: 0.005,
            hidden_1_size: 256,
            hidden_2_size: 256,
            replay_buffer_capacity: 100_000,
            training_batch_size: 64,
            warmup: 1000,
            ou_mu: 0.0,
            ou_theta: 0.15,
            ou_sigma: 0.2,
            seed: 42,
        }
    }

    pub fn point_mass() -> Self {
        Self {
            actor_learning_rate: 1e-4,
            critic_learning_rate: 1e-3,
            gamma: 0.99,
            tau: 0.005,
            hidden_1_size: 64,
            hidden_2_size: 64,
            replay_buffer_capacity: 100_000,
            training_batch_size: 64,
            warmup: 256,
            ou_mu: 0.0,
            ou_theta: 0.15,
            ou_sigma: 0.1,
            seed: 42,
        }
    }
}
