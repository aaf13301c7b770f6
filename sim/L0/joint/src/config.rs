//! Configuration for Euler joints.
//!
//! A joint is fully described by its name, axis order, the two fixed
//! offset transforms and its singularity diagnostics settings.

use nalgebra::Isometry3;
use sim_spatial::AxisOrder;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{JointError, Result};

/// Default `det(JᵀJ)` below which a Jacobian is reported ill-conditioned.
pub const DEFAULT_SINGULARITY_THRESHOLD: f64 = 1.0e-5;

/// Configuration for an [`EulerJoint`](crate::EulerJoint).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct EulerJointConfig {
    /// Joint name, used to identify diagnostics.
    pub name: String,
    /// Axis order of the three coordinates.
    pub axis_order: AxisOrder,
    /// Joint frame expressed in the parent body frame.
    pub parent_to_joint: Isometry3<f64>,
    /// Joint frame expressed in the child body frame.
    pub child_to_joint: Isometry3<f64>,
    /// `det(JᵀJ)` threshold for ill-conditioning reports.
    pub singularity_threshold: f64,
    /// Whether to run the conditioning check on each Jacobian evaluation.
    pub check_singularity: bool,
}

impl Default for EulerJointConfig {
    fn default() -> Self {
        Self {
            name: "euler_joint".to_string(),
            axis_order: AxisOrder::default(),
            parent_to_joint: Isometry3::identity(),
            child_to_joint: Isometry3::identity(),
            singularity_threshold: DEFAULT_SINGULARITY_THRESHOLD,
            check_singularity: true,
        }
    }
}

impl EulerJointConfig {
    /// Create a config with the given name and defaults elsewhere.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the axis order.
    #[must_use]
    pub fn axis_order(mut self, axis_order: AxisOrder) -> Self {
        self.axis_order = axis_order;
        self
    }

    /// Set the parent-body-to-joint offset.
    #[must_use]
    pub fn parent_to_joint(mut self, transform: Isometry3<f64>) -> Self {
        self.parent_to_joint = transform;
        self
    }

    /// Set the child-body-to-joint offset.
    #[must_use]
    pub fn child_to_joint(mut self, transform: Isometry3<f64>) -> Self {
        self.child_to_joint = transform;
        self
    }

    /// Set the ill-conditioning threshold.
    #[must_use]
    pub fn singularity_threshold(mut self, threshold: f64) -> Self {
        self.singularity_threshold = threshold;
        self
    }

    /// Skip the conditioning check at runtime.
    #[must_use]
    pub fn without_singularity_check(mut self) -> Self {
        self.check_singularity = false;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(JointError::invalid_config("joint name cannot be empty"));
        }

        if !self.singularity_threshold.is_finite() || self.singularity_threshold < 0.0 {
            return Err(JointError::invalid_config(format!(
                "singularity threshold must be finite and non-negative, got {}",
                self.singularity_threshold
            )));
        }

        for (label, transform) in [
            ("parent_to_joint", &self.parent_to_joint),
            ("child_to_joint", &self.child_to_joint),
        ] {
            if !is_finite(transform) {
                return Err(JointError::invalid_config(format!(
                    "{label} has non-finite components"
                )));
            }
        }

        Ok(())
    }
}

fn is_finite(transform: &Isometry3<f64>) -> bool {
    transform.translation.vector.iter().all(|x| x.is_finite())
        && transform.rotation.coords.iter().all(|x| x.is_finite())
}
