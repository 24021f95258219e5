use serde::{
    Deserialize,
    Serialize,
};

/// Configuration for the [`TrackEnv`](super::track_env::TrackEnv)
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Radius of the circular lane centerline.
    pub track_radius: f64,
    /// Leaving the lane, i.e. a cross-track error beyond this, ends the
    /// episode.
    pub lane_half_width: f64,
    /// Integration timestep in seconds.
    pub dt: f64,
    /// Maximum steering rate in radians per second at full steer.
    pub max_steer: f64,
    /// Maximum acceleration at full throttle.
    pub max_accel: f64,
    /// Speed is clamped to `[0, max_speed]`.
    pub max_speed: f64,
    /// Episode length in steps, the episode is truncated afterwards.
    pub timelimit: usize,
}
impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            track_radius: 20.0,
            lane_half_width: 2.0,
            dt: 0.1,
            max_steer: 1.0,
            max_accel: 2.0,
            max_speed: 8.0,
            timelimit: 400,
        }
    }
}
