use {
    crate::agents::RunMode,
    serde::{
        Deserialize,
        Serialize,
    },
};

/// Options of the outer run driver, as opposed to the agent's own
/// hyperparameters in [`DDPGConfig`](super::DDPGConfig).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    // The total number of episodes.
    max_episodes: usize,
    // Upper bound on the number of steps per episode, on top of
    // whatever time limit the environment enforces itself.
    max_steps: usize,
    // Number of random actions to take at very beginning of training.
    initial_random_actions: usize,
    // Per-episode decay factor for the exploration noise magnitude
    // (1.0 disables decay).
    noise_decay: f64,
    // Seed for the episode seeds and the random warm-up actions.
    seed: u64,
    mode: RunMode,
}
impl TrainConfig {
    pub fn new(
        max_episodes: usize,
        max_steps: usize,
        initial_random_actions: usize,
        noise_decay: f64,
        seed: u64,
        mode: RunMode,
    ) -> Self {
        Self {
            max_episodes,
            max_steps,
            initial_random_actions,
            noise_decay,
            seed,
            mode,
        }
    }

    pub fn track() -> Self {
        Self {
            max_episodes: 300,
            max_steps: 400,
            initial_random_actions: 1000,
            noise_decay: 1.0,
            seed: 42,
            mode: RunMode::Train,
        }
    }

    pub fn point_mass() -> Self {
        Self {
            max_episodes: 200,
            max_steps: 100,
            initial_random_actions: 256,
            noise_decay: 1.0,
            seed: 42,
            mode: RunMode::Train,
        }
    }

    pub fn max_episodes(&self) -> usize {
        self.max_episodes
    }
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }
    pub fn initial_random_actions(&self) -> usize {
        self.initial_random_actions
    }
    pub fn noise_decay(&self) -> f64 {
        self.noise_decay
    }
    pub fn seed(&self) -> u64 {
        self.seed
    }
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn set_max_episodes(&mut self, max_episodes: usize) {
        self.max_episodes = max_episodes;
    }
    pub fn set_max_steps(&mut self, max_steps: usize) {
        self.max_steps = max_steps;
    }
    pub fn set_initial_random_actions(&mut self, initial_random_actions: usize) {
        self.initial_random_actions = initial_random_actions;
    }
    pub fn set_noise_decay(&mut self, noise_decay: f64) {
        self.noise_decay = noise_decay;
    }
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }
    pub fn set_mode(&mut self, mode: RunMode) {
        self.mode = mode;
    }
}
