//! Euler angle conventions with closed-form rotation and rate formulas.
//!
//! An [`AxisOrder`] names the sequence of body-fixed (intrinsic) axes a
//! three-angle parameterization rotates about. For `q = (q0, q1, q2)`:
//!
//! | Order | Rotation                  |
//! |-------|---------------------------|
//! | XYZ   | `Rx(q0) · Ry(q1) · Rz(q2)` |
//! | ZYX   | `Rz(q0) · Ry(q1) · Rx(q2)` |
//!
//! Every order owns one [`EulerFormulas`] table holding the closed-form
//! composed rotation, the joint-frame motion subspace (angular velocity per
//! unit rate of each angle, expressed in the rotated frame), its time
//! derivative and the inverse map from a matrix back to angles.
//! [`AxisOrder::formulas`] is the only place a new order has to be
//! registered.

use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SpatialError;

/// Below this `cos(q1)` the middle angle is treated as locked and the
/// third angle is fixed to zero when extracting angles from a matrix.
const GIMBAL_EPSILON: f64 = 1.0e-8;

/// One of the three principal axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// Component index of this axis (0, 1 or 2).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit vector along this axis.
    #[must_use]
    pub fn unit(self) -> Vector3<f64> {
        Vector3::ith(self.index(), 1.0)
    }

    /// Elementary rotation by `angle` about this axis.
    #[must_use]
    pub fn rotation(self, angle: f64) -> Matrix3<f64> {
        let (s, c) = angle.sin_cos();
        match self {
            Self::X => Matrix3::new(
                1.0, 0.0, 0.0, //
                0.0, c, -s, //
                0.0, s, c,
            ),
            Self::Y => Matrix3::new(
                c, 0.0, s, //
                0.0, 1.0, 0.0, //
                -s, 0.0, c,
            ),
            Self::Z => Matrix3::new(
                c, -s, 0.0, //
                s, c, 0.0, //
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// Derivative of [`Axis::rotation`] with respect to `angle`.
    ///
    /// Depends on `angle` alone, which is what lets the per-coordinate
    /// partials of a composed rotation be assembled factor by factor.
    #[must_use]
    pub fn rotation_derivative(self, angle: f64) -> Matrix3<f64> {
        let (s, c) = angle.sin_cos();
        match self {
            Self::X => Matrix3::new(
                0.0, 0.0, 0.0, //
                0.0, -s, -c, //
                0.0, c, -s,
            ),
            Self::Y => Matrix3::new(
                -s, 0.0, c, //
                0.0, 0.0, 0.0, //
                -c, 0.0, -s,
            ),
            Self::Z => Matrix3::new(
                -s, -c, 0.0, //
                c, -s, 0.0, //
                0.0, 0.0, 0.0,
            ),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Y => write!(f, "Y"),
            Self::Z => write!(f, "Z"),
        }
    }
}

/// Closed-form formula set for one axis order.
#[derive(Debug)]
pub struct EulerFormulas {
    name: &'static str,
    axes: [Axis; 3],
    /// Coordinate whose `|q| = π/2` makes the motion subspace rank deficient.
    singular_coordinate: usize,
    rotation: fn(&Vector3<f64>) -> Matrix3<f64>,
    subspace: fn(&Vector3<f64>) -> Matrix3<f64>,
    subspace_derivative: fn(&Vector3<f64>, &Vector3<f64>) -> Matrix3<f64>,
    angles_from_matrix: fn(&Matrix3<f64>) -> Vector3<f64>,
}

static XYZ: EulerFormulas = EulerFormulas {
    name: "XYZ",
    axes: [Axis::X, Axis::Y, Axis::Z],
    // det S = cos(q1)
    singular_coordinate: 1,
    rotation: xyz_rotation,
    subspace: xyz_subspace,
    subspace_derivative: xyz_subspace_derivative,
    angles_from_matrix: xyz_angles,
};

static ZYX: EulerFormulas = EulerFormulas {
    name: "ZYX",
    axes: [Axis::Z, Axis::Y, Axis::X],
    // det S = -cos(q1)
    singular_coordinate: 1,
    rotation: zyx_rotation,
    subspace: zyx_subspace,
    subspace_derivative: zyx_subspace_derivative,
    angles_from_matrix: zyx_angles,
};

/// Axis order of a three-angle rotation parameterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "UPPERCASE")
)]
pub enum AxisOrder {
    /// `Rx(q0) · Ry(q1) · Rz(q2)`.
    #[default]
    Xyz,
    /// `Rz(q0) · Ry(q1) · Rx(q2)`.
    Zyx,
}

impl AxisOrder {
    /// Every supported order.
    pub const ALL: [Self; 2] = [Self::Xyz, Self::Zyx];

    /// Formula table for this order.
    #[must_use]
    pub fn formulas(self) -> &'static EulerFormulas {
        match self {
            Self::Xyz => &XYZ,
            Self::Zyx => &ZYX,
        }
    }

    /// Conventional name, e.g. `"XYZ"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.formulas().name
    }

    /// Rotation axis of each coordinate, in order.
    #[must_use]
    pub fn axes(self) -> [Axis; 3] {
        self.formulas().axes
    }

    /// Rotation axis of coordinate `index`, or `None` when out of range.
    #[must_use]
    pub fn axis(self, index: usize) -> Option<Axis> {
        self.axes().get(index).copied()
    }

    /// Coordinate tied to the gimbal-lock configuration.
    #[must_use]
    pub fn singular_coordinate(self) -> usize {
        self.formulas().singular_coordinate
    }

    /// Composed rotation matrix for angles `q`.
    #[must_use]
    pub fn rotation(self, q: &Vector3<f64>) -> Matrix3<f64> {
        (self.formulas().rotation)(q)
    }

    /// Elementary rotation of coordinate `index` alone.
    #[must_use]
    pub fn axis_rotation(self, index: usize, angle: f64) -> Option<Matrix3<f64>> {
        self.axis(index).map(|axis| axis.rotation(angle))
    }

    /// Derivative of the elementary rotation of coordinate `index`.
    #[must_use]
    pub fn axis_rotation_derivative(self, index: usize, angle: f64) -> Option<Matrix3<f64>> {
        self.axis(index).map(|axis| axis.rotation_derivative(angle))
    }

    /// Angular motion subspace `S(q)`.
    ///
    /// Column `i` is the angular velocity of the rotated frame, expressed in
    /// that frame, per unit rate of `q[i]`, so that `ω = S(q) · q̇` with
    /// `[ω]× = Rᵀ Ṙ`. Only `q1` and `q2` appear.
    #[must_use]
    pub fn motion_subspace(self, q: &Vector3<f64>) -> Matrix3<f64> {
        (self.formulas().subspace)(q)
    }

    /// Time derivative `Ṡ(q, q̇)` of [`AxisOrder::motion_subspace`].
    #[must_use]
    pub fn motion_subspace_derivative(self, q: &Vector3<f64>, dq: &Vector3<f64>) -> Matrix3<f64> {
        (self.formulas().subspace_derivative)(q, dq)
    }

    /// Angles reproducing rotation matrix `m`.
    ///
    /// The middle angle lies in `[-π/2, π/2]`, the others in `(-π, π]`. At
    /// gimbal lock the third angle is set to zero.
    #[must_use]
    pub fn angles_from_matrix(self, m: &Matrix3<f64>) -> Vector3<f64> {
        (self.formulas().angles_from_matrix)(m)
    }
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AxisOrder {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SpatialError::UnknownAxisOrder(s.to_string()))
    }
}

// ==================== XYZ ====================

fn xyz_rotation(q: &Vector3<f64>) -> Matrix3<f64> {
    let (s0, c0) = q[0].sin_cos();
    let (s1, c1) = q[1].sin_cos();
    let (s2, c2) = q[2].sin_cos();
    Matrix3::new(
        c1 * c2,
        -c1 * s2,
        s1,
        c0 * s2 + s0 * s1 * c2,
        c0 * c2 - s0 * s1 * s2,
        -s0 * c1,
        s0 * s2 - c0 * s1 * c2,
        s0 * c2 + c0 * s1 * s2,
        c0 * c1,
    )
}

fn xyz_subspace(q: &Vector3<f64>) -> Matrix3<f64> {
    let (s1, c1) = q[1].sin_cos();
    let (s2, c2) = q[2].sin_cos();
    Matrix3::from_columns(&[
        Vector3::new(c1 * c2, -(c1 * s2), s1),
        Vector3::new(s2, c2, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
    ])
}

fn xyz_subspace_derivative(q: &Vector3<f64>, dq: &Vector3<f64>) -> Matrix3<f64> {
    let (s1, c1) = q[1].sin_cos();
    let (s2, c2) = q[2].sin_cos();
    let (dq1, dq2) = (dq[1], dq[2]);
    Matrix3::from_columns(&[
        Vector3::new(
            -(dq1 * c2 * s1) - dq2 * c1 * s2,
            -(dq2 * c1 * c2) + dq1 * s1 * s2,
            dq1 * c1,
        ),
        Vector3::new(dq2 * c2, -(dq2 * s2), 0.0),
        Vector3::zeros(),
    ])
}

fn xyz_angles(m: &Matrix3<f64>) -> Vector3<f64> {
    let cos_y = m[(0, 0)].hypot(m[(0, 1)]);
    let y = m[(0, 2)].atan2(cos_y);
    if cos_y > GIMBAL_EPSILON {
        Vector3::new(
            (-m[(1, 2)]).atan2(m[(2, 2)]),
            y,
            (-m[(0, 1)]).atan2(m[(0, 0)]),
        )
    } else {
        Vector3::new(m[(2, 1)].atan2(m[(1, 1)]), y, 0.0)
    }
}

// ==================== ZYX ====================

fn zyx_rotation(q: &Vector3<f64>) -> Matrix3<f64> {
    let (s0, c0) = q[0].sin_cos();
    let (s1, c1) = q[1].sin_cos();
    let (s2, c2) = q[2].sin_cos();
    Matrix3::new(
        c0 * c1,
        c0 * s1 * s2 - s0 * c2,
        c0 * s1 * c2 + s0 * s2,
        s0 * c1,
        s0 * s1 * s2 + c0 * c2,
        s0 * s1 * c2 - c0 * s2,
        -s1,
        c1 * s2,
        c1 * c2,
    )
}

fn zyx_subspace(q: &Vector3<f64>) -> Matrix3<f64> {
    let (s1, c1) = q[1].sin_cos();
    let (s2, c2) = q[2].sin_cos();
    Matrix3::from_columns(&[
        Vector3::new(-s1, s2 * c1, c1 * c2),
        Vector3::new(0.0, c2, -s2),
        Vector3::new(1.0, 0.0, 0.0),
    ])
}

fn zyx_subspace_derivative(q: &Vector3<f64>, dq: &Vector3<f64>) -> Matrix3<f64> {
    let (s1, c1) = q[1].sin_cos();
    let (s2, c2) = q[2].sin_cos();
    let (dq1, dq2) = (dq[1], dq[2]);
    Matrix3::from_columns(&[
        Vector3::new(
            -c1 * dq1,
            c2 * c1 * dq2 - s2 * s1 * dq1,
            -s1 * c2 * dq1 - c1 * s2 * dq2,
        ),
        Vector3::new(0.0, -s2 * dq2, -c2 * dq2),
        Vector3::zeros(),
    ])
}

fn zyx_angles(m: &Matrix3<f64>) -> Vector3<f64> {
    let cos_y = m[(0, 0)].hypot(m[(1, 0)]);
    let y = (-m[(2, 0)]).atan2(cos_y);
    if cos_y > GIMBAL_EPSILON {
        Vector3::new(
            m[(1, 0)].atan2(m[(0, 0)]),
            y,
            m[(2, 1)].atan2(m[(2, 2)]),
        )
    } else {
        Vector3::new((-m[(0, 1)]).atan2(m[(1, 1)]), y, 0.0)
    }
}
