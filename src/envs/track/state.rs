use {
    auto_ops::impl_op_ex,
    ordered_float::OrderedFloat,
    serde::Serialize,
};

/// A position in the 2-dimensional plane the vehicle drives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Vec2 {
    x: OrderedFloat<f64>,
    y: OrderedFloat<f64>,
}
impl Vec2 {
    pub fn x(&self) -> f64 {
        self.x.into_inner()
    }

    pub fn y(&self) -> f64 {
        self.y.into_inner()
    }

    /// The unit vector pointing in the direction of `angle` radians.
    pub fn unit(angle: f64) -> Self {
        Self::from((angle.cos(), angle.sin()))
    }

    pub fn magnitude(&self) -> f64 {
        self.x().hypot(self.y())
    }

    /// The angle of the vector in radians, in `[-pi, pi]`.
    pub fn angle(&self) -> f64 {
        self.y().atan2(self.x())
    }

    pub fn distance_to(
        &self,
        other: &Self,
    ) -> f64 {
        (self - other).magnitude()
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from(value: (f64, f64)) -> Self {
        Self {
            x: OrderedFloat(value.0),
            y: OrderedFloat(value.1),
        }
    }
}

// Vec2 + Vec2 AND reference types
impl_op_ex!(+ |a: &Vec2, b: &Vec2| -> Vec2 {
    Vec2 {
        x: a.x + b.x,
        y: a.y + b.y,
    }
});
// Vec2 - Vec2 AND reference types
impl_op_ex!(-|a: &Vec2, b: &Vec2| -> Vec2 {
    Vec2 {
        x: a.x - b.x,
        y: a.y - b.y,
    }
});
// Vec2 * f64 AND reference types
impl_op_ex!(*|a: &Vec2, s: &f64| -> Vec2 {
    Vec2 {
        x: a.x * s,
        y: a.y * s,
    }
});
// f64 * Vec2 AND reference types
impl_op_ex!(*|s: &f64, a: &Vec2| -> Vec2 {
    Vec2 {
        x: a.x * s,
        y: a.y * s,
    }
});
