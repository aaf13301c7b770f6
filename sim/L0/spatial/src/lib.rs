//! Rotation group and spatial algebra for articulated joints.
//!
//! This crate provides the math a joint needs to turn generalized
//! coordinates into transforms and velocities:
//!
//! - [`So3`] - A 3D rotation with lossless conversions between matrix,
//!   quaternion, axis-angle, rotation-vector and Euler-angle encodings
//! - [`AxisOrder`] - Euler angle conventions with closed-form rotation,
//!   per-axis derivative and motion-subspace formulas
//! - [`adjoint`] - Re-expression of spatial twists between rigid frames
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. Everything here
//! is pure math over `nalgebra` types with no simulation state.
//!
//! # Example
//!
//! ```
//! use sim_spatial::{AxisOrder, So3};
//! use nalgebra::Vector3;
//!
//! let angles = Vector3::new(0.1, -0.4, 1.2);
//! let r = So3::from_euler(AxisOrder::Zyx, &angles);
//!
//! // Round trip through the rotation vector
//! let back = So3::exp(&r.log());
//! assert!(r.angle_to(&back) < 1e-12);
//! ```

#![doc(html_root_url = "https://docs.rs/sim-spatial/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::many_single_char_names,    // q, r, m, v follow the math
)]

pub mod adjoint;
mod error;
mod euler;
mod so3;

pub use adjoint::{
    SpatialVector, adjoint_matrix, adjoint_transform, inverse_adjoint_transform,
};
pub use error::SpatialError;
pub use euler::{Axis, AxisOrder, EulerFormulas};
pub use so3::{Encoding, EncodingKind, ORTHONORMAL_TOLERANCE, So3, hat, vee};

// Re-export math types for convenience
pub use nalgebra::{Isometry3, Matrix3, Matrix4, Matrix6, UnitQuaternion, Vector3, Vector6};

/// Result type for rotation and convention operations.
pub type Result<T> = std::result::Result<T, SpatialError>;
