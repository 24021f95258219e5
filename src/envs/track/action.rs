use {
    super::super::{
        Sampleable,
        TensorConvertible,
        VectorConvertible,
    },
    candle_core::{
        Device,
        Tensor,
    },
    rand::{
        Rng,
        RngCore,
    },
    std::ops::RangeInclusive,
};

/// The action type for the [`TrackEnv`](super::track_env::TrackEnv)
/// environment.
///
/// Both components are normalized to `[-1, 1]`: `steer` maps to the
/// maximum steering rate and `throttle` to the maximum acceleration
/// (negative values brake).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveAction {
    pub steer: f64,
    pub throttle: f64,
}
impl DriveAction {
    /// Clamp both components into `[-1, 1]`.
    pub fn restrict(self) -> Self {
        Self {
            steer: self.steer.clamp(-1.0, 1.0),
            throttle: self.throttle.clamp(-1.0, 1.0),
        }
    }
}

impl Sampleable for DriveAction {
    fn sample(
        rng: &mut dyn RngCore,
        domain: &[RangeInclusive<f64>],
    ) -> Self {
        assert!(domain.len() == 2);
        Self {
            steer: rng.gen_range(domain[0].clone()),
            throttle: rng.gen_range(domain[1].clone()),
        }
    }
}

impl VectorConvertible for DriveAction {
    fn from_vec(value: Vec<f64>) -> Self {
        assert!(value.len() == 2);
        Self {
            steer: value[0],
            throttle: value[1],
        }
    }

    fn to_vec(value: Self) -> Vec<f64> {
        vec![value.steer, value.throttle]
    }
}

impl TensorConvertible for DriveAction {
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
