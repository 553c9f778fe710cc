//! Plane vector type and heading helpers.
//!
//! `UV` uses double precision: floor plans are measured in feet or metres
//! with sub-millimetre collision tolerances, and the collision solver divides
//! by small distance differences.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Squared length below which a vector is treated as zero.
const ZERO_LENGTH_SQUARED: f64 = 1e-24;

/// A 2-D vector / point on the floor plane.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UV {
    pub u: f64,
    pub v: f64,
}

impl UV {
    pub const ZERO: UV = UV { u: 0.0, v: 0.0 };

    #[inline]
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    #[inline]
    pub fn dot(self, other: UV) -> f64 {
        self.u * other.u + self.v * other.v
    }

    /// Z component of the 3-D cross product; positive when `other` lies
    /// counter-clockwise of `self`.
    #[inline]
    pub fn cross(self, other: UV) -> f64 {
        self.u * other.v - self.v * other.u
    }

    #[inline]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn scale(self, factor: f64) -> UV {
        UV::new(self.u * factor, self.v * factor)
    }

    #[inline]
    pub fn distance_to(self, other: UV) -> f64 {
        (other - self).length()
    }

    #[inline]
    pub fn distance_squared_to(self, other: UV) -> f64 {
        (other - self).length_squared()
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.length_squared() < ZERO_LENGTH_SQUARED
    }

    /// Normalize in place.
    ///
    /// A zero-length vector is left untouched and `false` is returned; the
    /// caller decides what a missing direction means.
    pub fn unitize(&mut self) -> bool {
        let len_sq = self.length_squared();
        if len_sq < ZERO_LENGTH_SQUARED {
            return false;
        }
        let inv = 1.0 / len_sq.sqrt();
        self.u *= inv;
        self.v *= inv;
        true
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    #[inline]
    pub fn normalized(self) -> Option<UV> {
        let mut out = self;
        out.unitize().then_some(out)
    }

    /// Rotate counter-clockwise by `angle` radians.
    #[inline]
    pub fn rotate(self, angle: f64) -> UV {
        let (sin, cos) = angle.sin_cos();
        UV::new(self.u * cos - self.v * sin, self.u * sin + self.v * cos)
    }

    /// Scale down to `max_length` if longer; shorter vectors are returned
    /// unchanged.
    pub fn clamp_length(self, max_length: f64) -> UV {
        let len_sq = self.length_squared();
        if len_sq > max_length * max_length {
            // unitize-then-scale
            let mut unit = self;
            unit.unitize();
            unit.scale(max_length)
        } else {
            self
        }
    }

    /// Component of `self` along the unit vector `axis`.
    #[inline]
    pub fn project_onto(self, axis: UV) -> UV {
        axis.scale(self.dot(axis))
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.u.is_finite() && self.v.is_finite()
    }
}

impl Add for UV {
    type Output = UV;
    #[inline]
    fn add(self, rhs: UV) -> UV {
        UV::new(self.u + rhs.u, self.v + rhs.v)
    }
}

impl AddAssign for UV {
    #[inline]
    fn add_assign(&mut self, rhs: UV) {
        self.u += rhs.u;
        self.v += rhs.v;
    }
}

impl Sub for UV {
    type Output = UV;
    #[inline]
    fn sub(self, rhs: UV) -> UV {
        UV::new(self.u - rhs.u, self.v - rhs.v)
    }
}

impl SubAssign for UV {
    #[inline]
    fn sub_assign(&mut self, rhs: UV) {
        self.u -= rhs.u;
        self.v -= rhs.v;
    }
}

impl Neg for UV {
    type Output = UV;
    #[inline]
    fn neg(self) -> UV {
        UV::new(-self.u, -self.v)
    }
}

impl Mul<f64> for UV {
    type Output = UV;
    #[inline]
    fn mul(self, rhs: f64) -> UV {
        self.scale(rhs)
    }
}

impl Mul<UV> for f64 {
    type Output = UV;
    #[inline]
    fn mul(self, rhs: UV) -> UV {
        rhs.scale(self)
    }
}

impl From<[f64; 2]> for UV {
    #[inline]
    fn from(p: [f64; 2]) -> UV {
        UV::new(p[0], p[1])
    }
}

impl From<UV> for [f64; 2] {
    #[inline]
    fn from(p: UV) -> [f64; 2] {
        [p.u, p.v]
    }
}

impl fmt::Display for UV {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.u, self.v)
    }
}

/// Turn the unit heading `current` toward `target` by at most `max_step`
/// radians.
///
/// Returns `current` unchanged when `target` has no direction.  The result
/// is re-unitized so repeated small rotations do not drift off unit length.
pub fn rotate_toward(current: UV, target: UV, max_step: f64) -> UV {
    let Some(target) = target.normalized() else {
        return current;
    };
    let angle = current.cross(target).atan2(current.dot(target));
    let step  = angle.clamp(-max_step.abs(), max_step.abs());
    let mut turned = current.rotate(step);
    if turned.unitize() { turned } else { current }
}
