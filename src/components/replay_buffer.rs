use {
    crate::error::TrainError,
    anyhow::Result,
    candle_core::Tensor,
    rand::{
        distributions::Uniform,
        rngs::StdRng,
        Rng,
    },
    std::collections::VecDeque,
    unzip_n::unzip_n,
};

unzip_n!(6);

/// A transition in the replay buffer.
///
/// The `terminated` and `truncated` tensors hold a single 0.0 / 1.0
/// value each. Only `terminated` zeroes the bootstrapped target during
/// training; running into a time limit does not end the MDP.
#[derive(Clone)]
pub struct Transition {
    state: Tensor,
    action: Tensor,
    reward: Tensor,
    next_state: Tensor,
    terminated: Tensor,
    truncated: Tensor,
}
impl Transition {
    fn new(
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        terminated: &Tensor,
        truncated: &Tensor,
    ) -> Self {
        Self {
            state: state.clone(),
            action: action.clone(),
            reward: reward.clone(),
            next_state: next_state.clone(),
            terminated: terminated.clone(),
            truncated: truncated.clone(),
        }
    }
}

/// A replay buffer for off-policy algorithms.
///
/// The buffer has a fixed capacity and evicts the oldest transition
/// first once full, so it always holds the most recent `capacity`
/// transitions. Batches are drawn uniformly at random with replacement
/// from the current contents; sampling never removes anything.
///
/// The random source is passed in at construction so that runs are
/// reproducible and tests can seed it.
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
    rng: StdRng,
}
impl ReplayBuffer {
    /// Create a new replay buffer with the given capacity.
    pub fn new(
        capacity: usize,
        rng: StdRng,
    ) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            rng,
        }
    }

    /// The number of transitions currently held.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is full.
    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    /// Push a transition into the buffer.
    ///
    /// If the buffer is full, the oldest transition is removed to make
    /// room for the new transition. Pushing never fails.
    pub fn push(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        terminated: &Tensor,
        truncated: &Tensor,
    ) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(Transition::new(
            state, action, reward, next_state, terminated, truncated,
        ));
    }

    /// Sample a random batch of transitions from the buffer.
    ///
    /// The transitions are stacked along a fresh batch dimension, in the
    /// order `(states, actions, rewards, next_states, terminateds,
    /// truncateds)`.
    ///
    /// Fails with [`TrainError::InsufficientData`] when the buffer holds
    /// fewer than `batch_size` transitions.
    #[allow(clippy::type_complexity)]
    pub fn random_batch(
        &mut self,
        batch_size: usize,
    ) -> Result<(Tensor, Tensor, Tensor, Tensor, Tensor, Tensor)> {
        if self.buffer.len() < batch_size {
            return Err(TrainError::InsufficientData {
                requested: batch_size,
                available: self.buffer.len(),
            }
            .into());
        }

        let transition_to_tuple =
            |t: &Transition| -> candle_core::Result<(Tensor, Tensor, Tensor, Tensor, Tensor, Tensor)> {
                Ok((
                    t.state.unsqueeze(0)?,
                    t.action.unsqueeze(0)?,
                    t.reward.unsqueeze(0)?,
                    t.next_state.unsqueeze(0)?,
                    t.terminated.unsqueeze(0)?,
                    t.truncated.unsqueeze(0)?,
                ))
            };

        let between = Uniform::from(0..self.buffer.len());
        let transitions: Vec<&Transition> = (&mut self.rng)
            .sample_iter(between)
            .take(batch_size)
            .map(|i| &self.buffer[i])
            .collect();

        let (states, actions, rewards, next_states, terminateds, truncateds) = transitions
            .into_iter()
            .map(transition_to_tuple)
            .collect::<candle_core::Result<Vec<_>>>()?
            .into_iter()
            .unzip_n_vec();

        Ok((
            Tensor::cat(&states, 0)?,
            Tensor::cat(&actions, 0)?,
            Tensor::cat(&rewards, 0)?,
            Tensor::cat(&next_states, 0)?,
            Tensor::cat(&terminateds, 0)?,
            Tensor::cat(&truncateds, 0)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        candle_core::Device,
        rand::SeedableRng,
    };

    fn transition_with_reward(reward: f64) -> (Tensor, Tensor, Tensor, Tensor, Tensor, Tensor) {
        let device = Device::Cpu;
        (
            Tensor::new(vec![0.0, 0.0], &device).unwrap(),
            Tensor::new(vec![0.0], &device).unwrap(),
            Tensor::new(vec![reward], &device).unwrap(),
            Tensor::new(vec![0.0, 0.0], &device).unwrap(),
            Tensor::new(vec![0.0], &device).unwrap(),
            Tensor::new(vec![0.0], &device).unwrap(),
        )
    }

    fn rewards_in_buffer(buffer: &ReplayBuffer) -> Vec<f64> {
        buffer
            .buffer
            .iter()
            .map(|t| t.reward.to_vec1::<f64>().unwrap()[0])
            .collect()
    }

    #[test]
    fn eviction_is_fifo() {
        let mut buffer = ReplayBuffer::new(3, StdRng::seed_from_u64(0));
        for reward in 0..5 {
            let (s, a, r, ns, te, tr) = transition_with_reward(reward as f64);
            buffer.push(&s, &a, &r, &ns, &te, &tr);
        }
        assert_eq!(buffer.size(), 3);
        assert!(buffer.is_full());
        assert_eq!(rewards_in_buffer(&buffer), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn size_never_exceeds_capacity() {
        let mut buffer = ReplayBuffer::new(2, StdRng::seed_from_u64(0));
        for reward in 0..10 {
            let (s, a, r, ns, te, tr) = transition_with_reward(reward as f64);
            buffer.push(&s, &a, &r, &ns, &te, &tr);
            assert!(buffer.size() <= 2);
        }
        assert_eq!(rewards_in_buffer(&buffer), vec![8.0, 9.0]);
    }

    #[test]
    fn batch_is_stacked_from_current_contents() {
        let mut buffer = ReplayBuffer::new(8, StdRng::seed_from_u64(42));
        for reward in 0..4 {
            let (s, a, r, ns, te, tr) = transition_with_reward(reward as f64);
            buffer.push(&s, &a, &r, &ns, &te, &tr);
        }
        let (states, actions, rewards, ..) = buffer.random_batch(4).unwrap();
        assert_eq!(states.dims(), &[4, 2]);
        assert_eq!(actions.dims(), &[4, 1]);
        for reward in rewards.squeeze(1).unwrap().to_vec1::<f64>().unwrap() {
            assert!((0.0..4.0).contains(&reward));
        }
        // sampling does not consume
        assert_eq!(buffer.size(), 4);
    }

    #[test]
    fn sampling_too_early_is_insufficient_data() {
        let mut buffer = ReplayBuffer::new(8, StdRng::seed_from_u64(0));
        let (s, a, r, ns, te, tr) = transition_with_reward(1.0);
        buffer.push(&s, &a, &r, &ns, &te, &tr);

        let err = buffer.random_batch(2).unwrap_err();
        match err.downcast_ref::<TrainError>() {
            Some(TrainError::InsufficientData { requested: 2, available: 1 }) => (),
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }
}
