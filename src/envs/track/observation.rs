use {
    super::super::{
        TensorConvertible,
        VectorConvertible,
    },
    candle_core::{
        Device,
        Tensor,
    },
};

/// What the driving agent observes.
///
/// The observation is expressed relative to the lane centerline so the
/// policy does not need to know where it is on the track: the signed
/// cross-track error (positive outside the centerline circle), the
/// heading error relative to the centerline tangent, and the current
/// speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackObs {
    pub cross_track: f64,
    pub heading_error: f64,
    pub speed: f64,
}

impl VectorConvertible for TrackObs {
    fn from_vec(value: Vec<f64>) -> Self {
        assert!(value.len() == 3);
        Self {
            cross_track: value[0],
            heading_error: value[1],
            speed: value[2],
        }
    }

    fn to_vec(value: Self) -> Vec<f64> {
        vec![value.cross_track, value.heading_error, value.speed]
    }
}

impl TensorConvertible for TrackObs {
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
