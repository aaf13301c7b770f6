//! Error types for rotation and convention handling.

use thiserror::Error;

/// Errors that can occur when building rotations or parsing conventions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    /// Axis order name that is not part of the supported set.
    #[error("unknown Euler axis order: {0:?}")]
    UnknownAxisOrder(String),

    /// Matrix is not a proper rotation (orthonormal with determinant +1).
    #[error("matrix is not a rotation: {reason}")]
    NotARotation {
        /// Description of the failed check.
        reason: String,
    },

    /// Rotation axis has zero or non-finite length.
    #[error("degenerate rotation axis with non-zero angle {angle}")]
    DegenerateAxis {
        /// The angle that was requested about the degenerate axis.
        angle: f64,
    },

    /// Rotation angle is NaN or infinite.
    #[error("non-finite rotation angle {angle}")]
    NonFiniteAngle {
        /// The offending angle.
        angle: f64,
    },

    /// Quaternion has zero or non-finite norm.
    #[error("degenerate quaternion (norm {norm})")]
    DegenerateQuaternion {
        /// The offending norm.
        norm: f64,
    },
}

impl SpatialError {
    /// Create a not-a-rotation error.
    #[must_use]
    pub fn not_a_rotation(reason: impl Into<String>) -> Self {
        Self::NotARotation {
            reason: reason.into(),
        }
    }

    /// Check if this error comes from an unrecognized configuration value.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::UnknownAxisOrder(_))
    }
}
