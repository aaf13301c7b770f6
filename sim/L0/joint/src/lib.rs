//! Euler joint kinematics.
//!
//! This crate turns the three generalized coordinates of a rotational
//! joint into the quantities a dynamics solver consumes:
//!
//! - [`EulerJoint::local_transform`] - Parent body to child body transform
//! - [`EulerJoint::local_jacobian`] - Joint rates to child spatial velocity
//! - [`EulerJoint::local_jacobian_time_deriv`] - For bias (velocity-product) terms
//! - [`EulerJoint::axis_transform_derivative`] - Per-coordinate partials
//!
//! Coordinates and velocities are plain data owned by the caller and passed
//! in by reference; nothing here integrates or caches them.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**.
//!
//! # Diagnostics
//!
//! Near-singular Jacobians and rejected axis orders are reported as
//! [`KinematicsEvent`]s to a [`DiagnosticSink`] (by default [`TracingSink`]).
//! The `diagnostics` feature (on by default) gates the per-evaluation
//! conditioning check.
//!
//! # Example
//!
//! ```
//! use sim_joint::{EulerJoint, EulerJointState};
//! use sim_spatial::AxisOrder;
//! use nalgebra::Vector3;
//!
//! let joint = EulerJoint::new("hip", AxisOrder::Zyx);
//! let state = EulerJointState::new(Vector3::new(0.1, 0.2, 0.3), Vector3::new(1.0, 0.0, 0.0));
//! let k = joint.evaluate(&state);
//!
//! // Rotating about the first (Z) coordinate only spins the child about Z.
//! let twist = k.spatial_velocity(&state.velocities);
//! assert!(twist.fixed_rows::<3>(3).norm() < 1e-12);
//! ```

#![doc(html_root_url = "https://docs.rs/sim-joint/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod config;
mod diagnostics;
mod error;
mod euler_joint;
mod state;

pub use config::{DEFAULT_SINGULARITY_THRESHOLD, EulerJointConfig};
pub use diagnostics::{
    CollectingSink, DiagnosticSink, KinematicsEvent, NullSink, Severity, SinkHandle, TracingSink,
};
pub use error::JointError;
pub use euler_joint::{EulerJoint, NUM_DOFS};
pub use state::{EulerJointKinematics, EulerJointState};

/// Result type for joint operations.
pub type Result<T> = std::result::Result<T, JointError>;
