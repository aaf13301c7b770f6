//! Three-DOF rotational joint parameterized by Euler angles.
//!
//! The joint connects a parent and a child body through a joint frame.
//! Two fixed offsets place that frame in each body; the coordinates rotate
//! the child side of the joint frame relative to the parent side:
//!
//! ```text
//! T(q) = parent_to_joint · R(q) · child_to_joint⁻¹
//! ```
//!
//! The Jacobian maps joint rates to the child's spatial velocity relative
//! to the parent, in the child body frame. Column `i` is the joint-frame
//! twist `[S(q)ᵢ; 0]` of the axis order's closed-form motion subspace,
//! re-expressed through `Ad(child_to_joint)`.
//!
//! # Singular configurations
//!
//! Both supported orders lose rank when the middle coordinate reaches
//! `±π/2` (gimbal lock, `det S = ±cos q1`). The joint checks `det(JᵀJ)`
//! after each Jacobian evaluation and reports to its diagnostic sink when
//! it drops below the configured threshold. The check is advisory: the
//! degenerate Jacobian is still returned. Build without the `diagnostics`
//! feature to remove it entirely.

use std::sync::Arc;

use nalgebra::{Isometry3, Matrix3, Matrix4, Matrix6x3, Translation3, Vector3};
use sim_spatial::adjoint::spatial_vector;
use sim_spatial::{Axis, AxisOrder, So3, adjoint_transform};

use crate::config::EulerJointConfig;
use crate::diagnostics::{DiagnosticSink, KinematicsEvent, SinkHandle};
use crate::state::{EulerJointKinematics, EulerJointState};
use crate::{JointError, Result};

/// Number of generalized coordinates.
pub const NUM_DOFS: usize = 3;

/// A 3-DOF Euler angle joint.
#[derive(Debug, Clone)]
pub struct EulerJoint {
    name: String,
    axis_order: AxisOrder,
    parent_to_joint: Isometry3<f64>,
    child_to_joint: Isometry3<f64>,
    singularity_threshold: f64,
    check_singularity: bool,
    sink: SinkHandle,
}

impl EulerJoint {
    /// Create a joint with identity offsets and default diagnostics.
    #[must_use]
    pub fn new(name: impl Into<String>, axis_order: AxisOrder) -> Self {
        let config = EulerJointConfig::new(name).axis_order(axis_order);
        Self::from_config_unchecked(config)
    }

    /// Create a joint from a validated configuration.
    pub fn from_config(config: EulerJointConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config_unchecked(config))
    }

    fn from_config_unchecked(config: EulerJointConfig) -> Self {
        Self {
            name: config.name,
            axis_order: config.axis_order,
            parent_to_joint: config.parent_to_joint,
            child_to_joint: config.child_to_joint,
            singularity_threshold: config.singularity_threshold,
            check_singularity: config.check_singularity,
            sink: SinkHandle::default(),
        }
    }

    /// Replace the fixed offsets.
    #[must_use]
    pub fn with_offsets(
        mut self,
        parent_to_joint: Isometry3<f64>,
        child_to_joint: Isometry3<f64>,
    ) -> Self {
        self.parent_to_joint = parent_to_joint;
        self.child_to_joint = child_to_joint;
        self
    }

    /// Route diagnostics to `sink` instead of `tracing`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = SinkHandle::new(sink);
        self
    }

    /// Configuration reproducing this joint.
    #[must_use]
    pub fn config(&self) -> EulerJointConfig {
        EulerJointConfig {
            name: self.name.clone(),
            axis_order: self.axis_order,
            parent_to_joint: self.parent_to_joint,
            child_to_joint: self.child_to_joint,
            singularity_threshold: self.singularity_threshold,
            check_singularity: self.check_singularity,
        }
    }

    /// Joint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Joint frame in the parent body frame.
    #[must_use]
    pub fn parent_to_joint(&self) -> &Isometry3<f64> {
        &self.parent_to_joint
    }

    /// Joint frame in the child body frame.
    #[must_use]
    pub fn child_to_joint(&self) -> &Isometry3<f64> {
        &self.child_to_joint
    }

    /// Current axis order.
    #[must_use]
    pub fn axis_order(&self) -> AxisOrder {
        self.axis_order
    }

    /// Change the axis order.
    pub fn set_axis_order(&mut self, axis_order: AxisOrder) {
        tracing::debug!(
            joint = %self.name,
            from = %self.axis_order,
            to = %axis_order,
            "axis order changed"
        );
        self.axis_order = axis_order;
    }

    /// Change the axis order by name (`"XYZ"`, `"zyx"`, ...).
    ///
    /// An unknown name is reported to the sink and returned as an error;
    /// the joint keeps its previous order.
    pub fn set_axis_order_str(&mut self, name: &str) -> Result<()> {
        match name.parse::<AxisOrder>() {
            Ok(order) => {
                self.set_axis_order(order);
                Ok(())
            }
            Err(err) => {
                self.sink.record(&KinematicsEvent::UnknownAxisOrder {
                    joint: self.name.clone(),
                    requested: name.to_string(),
                });
                Err(err.into())
            }
        }
    }

    // ==================== Transforms ====================

    /// Parent body frame to child body frame at coordinates `q`.
    #[must_use]
    pub fn local_transform(&self, q: &Vector3<f64>) -> Isometry3<f64> {
        let rotation = So3::from_euler(self.axis_order, q);
        self.parent_to_joint * rotation_isometry(&rotation) * self.child_to_joint.inverse()
    }

    /// Elementary rotation of coordinate `index` alone.
    pub fn axis_transform(&self, index: usize, q: &Vector3<f64>) -> Result<Isometry3<f64>> {
        let axis = self.axis(index)?;
        let rotation = So3::from_matrix_unchecked(axis.rotation(q[index]));
        Ok(rotation_isometry(&rotation))
    }

    /// Derivative of [`EulerJoint::axis_transform`] with respect to `q[index]`.
    ///
    /// Only the rotational block is non-zero.
    pub fn axis_transform_derivative(
        &self,
        index: usize,
        q: &Vector3<f64>,
    ) -> Result<Matrix4<f64>> {
        let axis = self.axis(index)?;
        Ok(rotation_block(&axis.rotation_derivative(q[index])))
    }

    /// Partial derivative `∂T/∂q[index]` of the full local transform.
    pub fn local_transform_partial(
        &self,
        index: usize,
        q: &Vector3<f64>,
    ) -> Result<Matrix4<f64>> {
        self.axis(index)?;
        let mut rotation = Matrix3::identity();
        for (k, axis) in self.axis_order.axes().into_iter().enumerate() {
            rotation *= if k == index {
                axis.rotation_derivative(q[k])
            } else {
                axis.rotation(q[k])
            };
        }
        Ok(self.parent_to_joint.to_homogeneous()
            * rotation_block(&rotation)
            * self.child_to_joint.inverse().to_homogeneous())
    }

    // ==================== Jacobians ====================

    /// Jacobian at coordinates `q`, in the child body frame.
    ///
    /// Reports ill-conditioning to the sink; the result is never altered.
    #[must_use]
    pub fn local_jacobian(&self, q: &Vector3<f64>) -> Matrix6x3<f64> {
        let jacobian = self.re_express(&self.axis_order.motion_subspace(q));

        #[cfg(feature = "diagnostics")]
        self.check_conditioning(q, &jacobian);

        jacobian
    }

    /// Time derivative of the Jacobian along velocities `dq`.
    #[must_use]
    pub fn local_jacobian_time_deriv(
        &self,
        q: &Vector3<f64>,
        dq: &Vector3<f64>,
    ) -> Matrix6x3<f64> {
        self.re_express(&self.axis_order.motion_subspace_derivative(q, dq))
    }

    /// `det(JᵀJ)` at coordinates `q`. Zero at gimbal lock.
    #[must_use]
    pub fn jacobian_conditioning(&self, q: &Vector3<f64>) -> f64 {
        conditioning(&self.re_express(&self.axis_order.motion_subspace(q)))
    }

    /// Whether `q` is within the configured threshold of gimbal lock.
    #[must_use]
    pub fn is_near_singular(&self, q: &Vector3<f64>) -> bool {
        self.jacobian_conditioning(q) < self.singularity_threshold
    }

    /// Transform, Jacobian and Jacobian derivative for one state.
    #[must_use]
    pub fn evaluate(&self, state: &EulerJointState) -> EulerJointKinematics {
        EulerJointKinematics {
            transform: self.local_transform(&state.positions),
            jacobian: self.local_jacobian(&state.positions),
            jacobian_deriv: self.local_jacobian_time_deriv(&state.positions, &state.velocities),
        }
    }

    // ==================== Internals ====================

    fn axis(&self, index: usize) -> Result<Axis> {
        debug_assert!(
            index < NUM_DOFS,
            "axis index {index} out of range for joint [{}]",
            self.name
        );
        self.axis_order
            .axis(index)
            .ok_or(JointError::AxisIndexOutOfRange { index })
    }

    /// Column `i` of the result is `Ad(child_to_joint) · [s_i; 0]`.
    fn re_express(&self, subspace: &Matrix3<f64>) -> Matrix6x3<f64> {
        let mut out = Matrix6x3::zeros();
        for (i, column) in subspace.column_iter().enumerate() {
            let twist = spatial_vector(&column.into_owned(), &Vector3::zeros());
            out.set_column(i, &adjoint_transform(&self.child_to_joint, &twist));
        }
        out
    }

    #[cfg(feature = "diagnostics")]
    fn check_conditioning(&self, q: &Vector3<f64>, jacobian: &Matrix6x3<f64>) {
        if !self.check_singularity {
            return;
        }
        let determinant = conditioning(jacobian);
        if determinant < self.singularity_threshold {
            self.sink.record(&KinematicsEvent::IllConditioned {
                joint: self.name.clone(),
                axis_order: self.axis_order,
                positions: [q[0], q[1], q[2]],
                determinant,
            });
        }
    }
}

/// `det(JᵀJ)`, a cheap rank proxy for a 6×3 Jacobian.
fn conditioning(jacobian: &Matrix6x3<f64>) -> f64 {
    (jacobian.transpose() * jacobian).determinant()
}

fn rotation_isometry(rotation: &So3) -> Isometry3<f64> {
    Isometry3::from_parts(Translation3::identity(), rotation.to_quaternion())
}

fn rotation_block(rotation: &Matrix3<f64>) -> Matrix4<f64> {
    let mut m = Matrix4::zeros();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
    m
}
