//! Locomotion constants for one simulation run.

use crate::{CoreError, CoreResult};

/// Named numeric parameters read once when an engine is constructed.
///
/// Lengths are in floor units (the unit the floor plan was drawn in), times
/// in seconds, angles in radians.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineParams {
    /// Diameter of the agent's body.  Contact begins at half of it.
    pub body_size: f64,

    /// Hard cap on the speed after every velocity update.
    pub velocity_cap: f64,

    /// Magnitude of the goal-seeking acceleration.
    pub acceleration: f64,

    /// Maximum heading change per second.
    pub angular_velocity: f64,

    /// Coulomb friction coefficient between body and barrier.
    pub barrier_friction: f64,

    /// Fraction of the normal velocity component reflected on contact.
    pub body_elasticity: f64,

    /// Distance at which barrier repulsion fades to zero.
    pub barrier_repulsion_range: f64,

    /// Repulsion magnitude at zero distance; the curve scales from here.
    pub repulsion_change_rate: f64,

    /// Cosine of the half-angle of the field-of-view cone.
    pub visibility_cosine: f64,

    /// Rate of the exponential distribution the decision period is drawn
    /// from (mean period = `1 / decision_rate`).  Zero never re-plans.
    pub decision_rate: f64,

    /// Weight of the heading-alignment term in destination selection.
    pub angle_weight: f64,

    /// Weight of the desirability-cost term in destination selection.
    pub desirability_weight: f64,

    /// Slack used by the collision solver when deciding that a sample
    /// already touches a barrier.
    pub collision_tolerance: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            body_size:               0.5,
            velocity_cap:            1.4,
            acceleration:            2.0,
            angular_velocity:        std::f64::consts::PI,
            barrier_friction:        0.1,
            body_elasticity:         0.2,
            barrier_repulsion_range: 1.0,
            repulsion_change_rate:   5.0,
            visibility_cosine:       (80.0_f64).to_radians().cos(),
            decision_rate:           0.2,
            angle_weight:            1.0,
            desirability_weight:     1.0,
            collision_tolerance:     1e-4,
        }
    }
}

impl EngineParams {
    /// Every name accepted by [`set`](Self::set), in declaration order.
    pub const NAMES: [&'static str; 13] = [
        "body_size",
        "velocity_cap",
        "acceleration",
        "angular_velocity",
        "barrier_friction",
        "body_elasticity",
        "barrier_repulsion_range",
        "repulsion_change_rate",
        "visibility_cosine",
        "decision_rate",
        "angle_weight",
        "desirability_weight",
        "collision_tolerance",
    ];

    /// Half the body size: the distance at which contact handling starts.
    #[inline]
    pub fn contact_radius(&self) -> f64 {
        self.body_size * 0.5
    }

    /// Overwrite a single parameter by name.
    pub fn set(&mut self, name: &str, value: f64) -> CoreResult<()> {
        match name {
            "body_size"               => self.body_size = value,
            "velocity_cap"            => self.velocity_cap = value,
            "acceleration"            => self.acceleration = value,
            "angular_velocity"        => self.angular_velocity = value,
            "barrier_friction"        => self.barrier_friction = value,
            "body_elasticity"         => self.body_elasticity = value,
            "barrier_repulsion_range" => self.barrier_repulsion_range = value,
            "repulsion_change_rate"   => self.repulsion_change_rate = value,
            "visibility_cosine"       => self.visibility_cosine = value,
            "decision_rate"           => self.decision_rate = value,
            "angle_weight"            => self.angle_weight = value,
            "desirability_weight"     => self.desirability_weight = value,
            "collision_tolerance"     => self.collision_tolerance = value,
            other => return Err(CoreError::UnknownParameter(other.to_string())),
        }
        Ok(())
    }

    /// Build from `(name, value)` pairs on top of the defaults, then
    /// validate.  Unknown names are rejected.
    pub fn from_named<'a, I>(pairs: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut params = Self::default();
        for (name, value) in pairs {
            params.set(name, value)?;
        }
        params.validate()?;
        Ok(params)
    }

    /// Check every parameter against its admissible range.
    pub fn validate(&self) -> CoreResult<()> {
        positive("body_size", self.body_size)?;
        positive("velocity_cap", self.velocity_cap)?;
        non_negative("acceleration", self.acceleration)?;
        positive("angular_velocity", self.angular_velocity)?;
        non_negative("barrier_friction", self.barrier_friction)?;
        within("body_elasticity", self.body_elasticity, 0.0, 1.0)?;
        non_negative("barrier_repulsion_range", self.barrier_repulsion_range)?;
        non_negative("repulsion_change_rate", self.repulsion_change_rate)?;
        within("visibility_cosine", self.visibility_cosine, -1.0, 1.0)?;
        non_negative("decision_rate", self.decision_rate)?;
        non_negative("angle_weight", self.angle_weight)?;
        non_negative("desirability_weight", self.desirability_weight)?;
        non_negative("collision_tolerance", self.collision_tolerance)?;
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> CoreResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::OutOfRange { name, requirement: "finite and > 0", value })
    }
}

fn non_negative(name: &'static str, value: f64) -> CoreResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::OutOfRange { name, requirement: "finite and >= 0", value })
    }
}

fn within(name: &'static str, value: f64, lo: f64, hi: f64) -> CoreResult<()> {
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::OutOfRange { name, requirement: "inside its closed range", value })
    }
}
