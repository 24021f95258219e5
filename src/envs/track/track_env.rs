use {
    super::{
        super::{
            Environment,
            Step,
        },
        action::DriveAction,
        config::TrackConfig,
        observation::TrackObs,
        state::Vec2,
    },
    anyhow::Result,
    rand::{
        rngs::StdRng,
        Rng,
        SeedableRng,
    },
    std::{
        f64::consts::PI,
        ops::RangeInclusive,
    },
    tracing::info,
};

/// Wrap an angle into `[-pi, pi]`.
fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

/// A simulated vehicle on a circular track.
///
/// The vehicle follows simple kinematics: the steering action turns the
/// heading, the throttle action changes the speed, and the vehicle
/// moves along its heading each timestep. The lane centerline is a
/// circle driven counter-clockwise; the reward is the arc progress made
/// along the centerline minus a penalty for deviating from it, so lane
/// keeping at speed is optimal. Leaving the lane terminates the
/// episode.
pub struct TrackEnv {
    config: TrackConfig,

    position: Vec2,
    heading: f64,
    speed: f64,

    timestep: usize,
    reset_count: usize,

    rng: StdRng,
}

impl TrackEnv {
    fn observation(&self) -> TrackObs {
        let tangent = wrap_angle(self.position.angle() + PI / 2.0);
        TrackObs {
            cross_track: self.position.magnitude() - self.config.track_radius,
            heading_error: wrap_angle(self.heading - tangent),
            speed: self.speed,
        }
    }
}

impl Environment for TrackEnv {
    type Config = TrackConfig;
    type Action = DriveAction;
    type Observation = TrackObs;

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn new(config: Self::Config) -> Result<Box<Self>> {
        debug_assert!(config.track_radius > config.lane_half_width);
        debug_assert!(config.dt > 0.0 && config.max_speed > 0.0);

        let radius = config.track_radius;
        Ok(Box::new(Self {
            config,
            position: Vec2::from((radius, 0.0)),
            heading: PI / 2.0,
            speed: 0.0,
            timestep: 0,
            reset_count: 0,
            rng: StdRng::seed_from_u64(0),
        }))
    }

    fn reset(
        &mut self,
        seed: u64,
    ) -> Result<Self::Observation> {
        self.rng = StdRng::seed_from_u64(seed);

        // start on the centerline at a random angle, roughly tangent
        let phi = self.rng.gen_range(0.0..2.0 * PI);
        self.position = Vec2::unit(phi) * self.config.track_radius;
        self.heading = wrap_angle(phi + PI / 2.0 + self.rng.gen_range(-0.2..=0.2));
        self.speed = 0.0;
        self.timestep = 0;
        self.reset_count += 1;

        info!(
            "reset {} at angle {phi:.3} with heading {:.3}",
            self.reset_count, self.heading,
        );
        Ok(self.observation())
    }

    fn step(
        &mut self,
        action: Self::Action,
    ) -> Result<Step<Self::Observation, Self::Action>> {
        let restricted = action.restrict();
        let dt = self.config.dt;

        self.heading = wrap_angle(self.heading + restricted.steer * self.config.max_steer * dt);
        self.speed = (self.speed + restricted.throttle * self.config.max_accel * dt)
            .clamp(0.0, self.config.max_speed);
        self.position = self.position + Vec2::unit(self.heading) * (self.speed * dt);
        self.timestep += 1;

        let observation = self.observation();
        let progress = self.speed * dt * observation.heading_error.cos();
        let deviation = observation.cross_track / self.config.lane_half_width;
        let reward = progress - deviation.powi(2) * dt;

        info!(
            "t={} pos=({:.2}, {:.2}) cross={:.3} reward={:.4}",
            self.timestep,
            self.position.x(),
            self.position.y(),
            observation.cross_track,
            reward,
        );

        Ok(Step {
            observation,
            action,
            reward,
            terminated: observation.cross_track.abs() > self.config.lane_half_width,
            truncated: self.timestep >= self.config.timelimit,
        })
    }

    fn timelimit(&self) -> usize {
        self.config.timelimit
    }

    fn action_space(&self) -> Vec<usize> {
        vec![2]
    }

    fn action_domain(&self) -> Vec<RangeInclusive<f64>> {
        vec![-1.0..=1.0, -1.0..=1.0]
    }

    fn observation_space(&self) -> Vec<usize> {
        vec![3]
    }

    fn observation_domain(&self) -> Vec<RangeInclusive<f64>> {
        vec![
            -self.config.lane_half_width..=self.config.lane_half_width,
            -PI..=PI,
            0.0..=self.config.max_speed,
        ]
    }

    fn current_observation(&self) -> Self::Observation {
        self.observation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_starts_on_the_centerline() {
        let mut env = *TrackEnv::new(Default::default()).unwrap();
        for seed in 0..10 {
            let obs = env.reset(seed).unwrap();
            assert!(obs.cross_track.abs() < 1e-9);
            assert!(obs.heading_error.abs() <= 0.2 + 1e-9);
            assert_eq!(obs.speed, 0.0);
        }
    }

    #[test]
    fn driving_tangent_keeps_the_lane() {
        let mut env = *TrackEnv::new(Default::default()).unwrap();
        env.reset(3).unwrap();

        // gentle proportional steering toward the centerline stays in lane
        for _ in 0..100 {
            let obs = env.current_observation();
            // positive steer turns toward the center, so a positive
            // (outward) cross-track error needs a positive correction
            let steer = (-obs.heading_error + 0.5 * obs.cross_track).clamp(-1.0, 1.0);
            let step = env
                .step(DriveAction {
                    steer,
                    throttle: 0.3,
                })
                .unwrap();
            assert!(!step.terminated);
        }
    }

    #[test]
    fn leaving_the_lane_terminates() {
        let mut env = *TrackEnv::new(Default::default()).unwrap();
        env.reset(0).unwrap();

        // full throttle with a hard constant turn drives off the lane
        let mut terminated = false;
        for _ in 0..400 {
            let step = env
                .step(DriveAction {
                    steer: -1.0,
                    throttle: 1.0,
                })
                .unwrap();
            if step.terminated {
                assert!(step.observation.cross_track.abs() > env.config.lane_half_width);
                terminated = true;
                break;
            }
        }
        assert!(terminated);
    }

    #[test]
    fn episode_truncates_at_the_timelimit() {
        let mut env = *TrackEnv::new(TrackConfig {
            timelimit: 5,
            ..Default::default()
        })
        .unwrap();
        env.reset(0).unwrap();
        for step_idx in 1..=5 {
            let step = env
                .step(DriveAction {
                    steer: 0.0,
                    throttle: 0.0,
                })
                .unwrap();
            assert_eq!(step.truncated, step_idx == 5);
        }
    }

    #[test]
    fn out_of_range_actions_are_restricted() {
        let mut env = *TrackEnv::new(Default::default()).unwrap();
        env.reset(0).unwrap();
        let step = env
            .step(DriveAction {
                steer: 100.0,
                throttle: 100.0,
            })
            .unwrap();
        // throttle is clamped to 1.0, so speed rises by at most max_accel * dt
        assert!(step.observation.speed <= env.config.max_accel * env.config.dt + 1e-12);
    }
}
