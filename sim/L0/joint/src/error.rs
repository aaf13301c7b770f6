//! Error types for joint kinematics.

use sim_spatial::SpatialError;
use thiserror::Error;

/// Errors that can occur while configuring or querying a joint.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JointError {
    /// Per-axis query with an index outside `0..3`.
    #[error("axis index {index} out of range for a 3-DOF joint")]
    AxisIndexOutOfRange {
        /// The rejected index.
        index: usize,
    },

    /// Rotation or convention error (e.g. unknown axis order name).
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    /// Invalid configuration.
    #[error("invalid joint configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },
}

impl JointError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        match self {
            Self::InvalidConfig { .. } => true,
            Self::Spatial(err) => err.is_config_error(),
            Self::AxisIndexOutOfRange { .. } => false,
        }
    }

    /// Check if this is a caller contract violation.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::AxisIndexOutOfRange { .. })
    }
}
