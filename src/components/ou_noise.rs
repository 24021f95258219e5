use {
    anyhow::Result,
    rand::rngs::StdRng,
    rand_distr::{
        Distribution,
        Normal,
    },
};

/// An Ornstein-Uhlenbeck process for exploration.
///
/// The process is mean-reverting, so successive samples are temporally
/// correlated and the perturbed actions trace smooth trajectories
/// instead of jittering around the policy output:
///
/// `x <- x + theta * (mu - x) + sigma * N(0, 1)`
///
/// The random source is passed in at construction so that runs are
/// reproducible. [`OuNoise::reset`] is called once per episode and puts
/// the internal state back at the mean.
pub struct OuNoise {
    mu: f64,
    theta: f64,
    sigma: f64,
    state: Vec<f64>,
    normal: Normal<f64>,
    rng: StdRng,
}
impl OuNoise {
    pub fn new(
        mu: f64,
        theta: f64,
        sigma: f64,
        size_action: usize,
        rng: StdRng,
    ) -> Result<Self> {
        Ok(Self {
            mu,
            theta,
            sigma,
            state: vec![mu; size_action],
            normal: Normal::new(0.0, 1.0)?,
            rng,
        })
    }

    /// Put the process back at its mean.
    pub fn reset(&mut self) {
        self.state.fill(self.mu);
    }

    /// Advance the process by one step and return the new perturbation.
    pub fn sample(&mut self) -> Vec<f64> {
        for x in self.state.iter_mut() {
            let dx = self.theta * (self.mu - *x) + self.sigma * self.normal.sample(&mut self.rng);
            *x += dx;
        }
        self.state.clone()
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Scale the noise magnitude, used to decay exploration over the
    /// course of training. The decay schedule itself is a configuration
    /// concern of the run driver.
    pub fn scale_sigma(
        &mut self,
        factor: f64,
    ) {
        self.sigma *= factor;
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        rand::SeedableRng,
    };

    #[test]
    fn reset_returns_state_to_the_mean() {
        let mut noise = OuNoise::new(0.5, 0.15, 0.2, 3, StdRng::seed_from_u64(0)).unwrap();
        for _ in 0..10 {
            noise.sample();
        }
        noise.reset();
        assert_eq!(noise.state, vec![0.5; 3]);
    }

    #[test]
    fn same_seed_gives_same_sequence() {
        let mut a = OuNoise::new(0.0, 0.15, 0.2, 2, StdRng::seed_from_u64(7)).unwrap();
        let mut b = OuNoise::new(0.0, 0.15, 0.2, 2, StdRng::seed_from_u64(7)).unwrap();
        for _ in 0..5 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn process_reverts_to_the_mean() {
        let mut noise = OuNoise::new(0.0, 0.15, 1.0, 1, StdRng::seed_from_u64(3)).unwrap();
        for _ in 0..20 {
            noise.sample();
        }
        // with sigma scaled to zero only the mean-reverting drift remains
        noise.scale_sigma(0.0);
        let mut prev = noise.state[0].abs();
        for _ in 0..20 {
            let x = noise.sample()[0].abs();
            assert!(x <= prev);
            prev = x;
        }
    }
}
