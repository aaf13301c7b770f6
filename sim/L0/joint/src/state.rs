//! Coordinates and evaluated kinematics of a 3-DOF joint.

use nalgebra::{Isometry3, Matrix6x3, Vector3, Vector6};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Generalized coordinates and velocities of one Euler joint.
///
/// Owned by the caller (the body tree); the joint only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EulerJointState {
    /// Angles `(q0, q1, q2)` in radians.
    pub positions: Vector3<f64>,
    /// Rates `(q̇0, q̇1, q̇2)` in radians per second.
    pub velocities: Vector3<f64>,
}

impl EulerJointState {
    /// Create a state from positions and velocities.
    #[must_use]
    pub const fn new(positions: Vector3<f64>, velocities: Vector3<f64>) -> Self {
        Self {
            positions,
            velocities,
        }
    }

    /// A state at the given positions with zero velocity.
    #[must_use]
    pub fn at_rest(positions: Vector3<f64>) -> Self {
        Self {
            positions,
            velocities: Vector3::zeros(),
        }
    }

    /// Whether every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.positions.iter().chain(self.velocities.iter()).all(|x| x.is_finite())
    }
}

/// Everything a dynamics pass needs from one joint, evaluated together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerJointKinematics {
    /// Parent body frame to child body frame.
    pub transform: Isometry3<f64>,
    /// Maps joint rates to the child's spatial velocity (child body frame).
    pub jacobian: Matrix6x3<f64>,
    /// Time derivative of `jacobian`.
    pub jacobian_deriv: Matrix6x3<f64>,
}

impl EulerJointKinematics {
    /// Spatial velocity of the child relative to the parent, `J · q̇`.
    #[must_use]
    pub fn spatial_velocity(&self, velocities: &Vector3<f64>) -> Vector6<f64> {
        self.jacobian * velocities
    }

    /// Velocity-product (bias) acceleration term `J̇ · q̇`.
    #[must_use]
    pub fn bias_acceleration(&self, velocities: &Vector3<f64>) -> Vector6<f64> {
        self.jacobian_deriv * velocities
    }
}
