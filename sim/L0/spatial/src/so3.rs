//! The rotation group SO(3).
//!
//! [`So3`] stores a rotation in its canonical form, a proper orthonormal
//! 3×3 matrix, and converts losslessly to and from every other encoding
//! the engine uses:
//!
//! | Encoding        | In                          | Out                       |
//! |-----------------|-----------------------------|---------------------------|
//! | Matrix          | [`So3::from_matrix`]        | [`So3::matrix`]           |
//! | Quaternion      | [`So3::from_quaternion`]    | [`So3::to_quaternion`]    |
//! | Axis-angle      | [`So3::from_axis_angle`]    | [`So3::to_axis_angle`]    |
//! | Rotation vector | [`So3::exp`]                | [`So3::log`]              |
//! | Euler angles    | [`So3::from_euler`]         | [`So3::to_euler`]         |
//!
//! The [`Encoding`] enum wraps all of them for callers that pick the
//! representation at runtime.
//!
//! # Canonical branches
//!
//! Several encodings are not unique. Outputs always pick the same branch:
//!
//! - quaternions lie in the `w >= 0` hemisphere,
//! - rotation vectors have norm in `[0, π]`; at exactly π the axis sign is
//!   chosen so its largest-magnitude component is positive,
//! - the identity has axis-angle `(+X, 0)` and rotation vector `0`.

use std::ops::Mul;

use approx::{AbsDiffEq, RelativeEq};
use nalgebra::{Matrix3, Quaternion, Rotation3, Unit, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{AxisOrder, Result, SpatialError};

/// Tolerance on `‖RᵀR − I‖` accepted by [`So3::from_matrix`].
pub const ORTHONORMAL_TOLERANCE: f64 = 1.0e-8;

/// Below this angle `exp`/`log` switch to Taylor expansions.
const SMALL_ANGLE: f64 = 1.0e-4;

/// `sin θ` below which a near-π rotation uses the canonical axis sign.
const PI_BRANCH_EPSILON: f64 = 1.0e-12;

/// Cross-product matrix `[v]×`, so that `hat(v) * w == v × w`.
#[must_use]
pub fn hat(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y, //
        v.z, 0.0, -v.x, //
        -v.y, v.x, 0.0,
    )
}

/// Inverse of [`hat`]: reads the vector out of a skew-symmetric matrix.
#[must_use]
pub fn vee(m: &Matrix3<f64>) -> Vector3<f64> {
    Vector3::new(m[(2, 1)], m[(0, 2)], m[(1, 0)])
}

/// A 3D rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct So3 {
    rotation: Rotation3<f64>,
}

impl Default for So3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl So3 {
    /// The identity rotation.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: Rotation3::identity(),
        }
    }

    /// Build from a rotation matrix, checking that it is proper orthonormal.
    pub fn from_matrix(m: &Matrix3<f64>) -> Result<Self> {
        if !m.iter().all(|x| x.is_finite()) {
            return Err(SpatialError::not_a_rotation("non-finite entries"));
        }
        let orthonormality = (m.transpose() * m - Matrix3::identity()).norm();
        if orthonormality > ORTHONORMAL_TOLERANCE {
            return Err(SpatialError::not_a_rotation(format!(
                "orthonormality error {orthonormality:.3e}"
            )));
        }
        let det = m.determinant();
        if det < 0.0 {
            return Err(SpatialError::not_a_rotation(format!(
                "improper rotation (determinant {det:.6})"
            )));
        }
        Ok(Self::from_matrix_unchecked(*m))
    }

    /// Build from a matrix the caller guarantees is a rotation.
    #[must_use]
    pub fn from_matrix_unchecked(m: Matrix3<f64>) -> Self {
        Self {
            rotation: Rotation3::from_matrix_unchecked(m),
        }
    }

    /// Build from a nalgebra rotation.
    #[must_use]
    pub const fn from_rotation(rotation: Rotation3<f64>) -> Self {
        Self { rotation }
    }

    /// Build from a quaternion of any non-zero norm.
    pub fn from_quaternion(q: &Quaternion<f64>) -> Result<Self> {
        let norm = q.norm();
        if !norm.is_finite() || norm <= f64::EPSILON {
            return Err(SpatialError::DegenerateQuaternion { norm });
        }
        Ok(Self::from_unit_quaternion(&UnitQuaternion::from_quaternion(*q)))
    }

    /// Build from a unit quaternion.
    #[must_use]
    pub fn from_unit_quaternion(q: &UnitQuaternion<f64>) -> Self {
        Self {
            rotation: q.to_rotation_matrix(),
        }
    }

    /// Build from an axis (any non-zero length) and an angle in radians.
    ///
    /// A zero angle is accepted with any axis. A NaN or infinite angle is
    /// rejected.
    pub fn from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Result<Self> {
        if !angle.is_finite() {
            return Err(SpatialError::NonFiniteAngle { angle });
        }
        if angle == 0.0 {
            return Ok(Self::identity());
        }
        if !axis.iter().all(|x| x.is_finite()) {
            return Err(SpatialError::DegenerateAxis { angle });
        }
        let axis =
            Unit::try_new(*axis, f64::EPSILON).ok_or(SpatialError::DegenerateAxis { angle })?;
        Ok(Self {
            rotation: Rotation3::from_axis_angle(&axis, angle),
        })
    }

    /// Build from a rotation vector (axis scaled by angle). Same as [`So3::exp`].
    #[must_use]
    pub fn from_rotation_vector(v: &Vector3<f64>) -> Self {
        Self::exp(v)
    }

    /// Build from Euler angles in the given order.
    #[must_use]
    pub fn from_euler(order: AxisOrder, angles: &Vector3<f64>) -> Self {
        Self::from_matrix_unchecked(order.rotation(angles))
    }

    /// Build from any [`Encoding`].
    pub fn from_encoding(encoding: &Encoding) -> Result<Self> {
        match encoding {
            Encoding::Matrix(m) => Self::from_matrix(m),
            Encoding::Quaternion(q) => Self::from_quaternion(q),
            Encoding::AxisAngle { axis, angle } => Self::from_axis_angle(axis, *angle),
            Encoding::RotationVector(v) => Ok(Self::exp(v)),
            Encoding::Euler { order, angles } => Ok(Self::from_euler(*order, angles)),
        }
    }

    /// Exponential map: rotation vector to rotation.
    ///
    /// Defined for every finite input.
    #[must_use]
    pub fn exp(v: &Vector3<f64>) -> Self {
        let theta_sq = v.norm_squared();
        let k = hat(v);
        let (a, b) = if theta_sq < SMALL_ANGLE * SMALL_ANGLE {
            (1.0 - theta_sq / 6.0, 0.5 - theta_sq / 24.0)
        } else {
            let theta = theta_sq.sqrt();
            (theta.sin() / theta, (1.0 - theta.cos()) / theta_sq)
        };
        Self::from_matrix_unchecked(Matrix3::identity() + k * a + k * k * b)
    }

    /// Logarithm map: rotation to rotation vector with norm in `[0, π]`.
    ///
    /// Returns zero at the identity. At π the axis comes from the symmetric
    /// part of the matrix and takes the canonical sign.
    #[must_use]
    pub fn log(&self) -> Vector3<f64> {
        let m = self.rotation.matrix();
        let cos_angle = ((m.trace() - 1.0) * 0.5).clamp(-1.0, 1.0);
        // sin(θ) · axis
        let axis_sin = vee(&((m - m.transpose()) * 0.5));
        let sin_angle = axis_sin.norm();
        let angle = sin_angle.atan2(cos_angle);

        if angle < SMALL_ANGLE {
            return axis_sin * (1.0 + angle * angle / 6.0);
        }
        if cos_angle > 0.0 {
            return axis_sin * (angle / sin_angle);
        }

        // (R + Rᵀ)/2 − cos θ · I = (1 − cos θ) n nᵀ
        let b = 1.0 - cos_angle;
        let sym = (m + m.transpose()) * 0.5 - Matrix3::identity() * cos_angle;
        let k = sym.diagonal().imax();
        let mut axis = sym.column(k) / (sym[(k, k)] * b).sqrt();
        if sin_angle > PI_BRANCH_EPSILON && axis.dot(&axis_sin) < 0.0 {
            axis = -axis;
        }
        axis.normalize() * angle
    }

    /// The rotation matrix.
    #[must_use]
    pub fn matrix(&self) -> &Matrix3<f64> {
        self.rotation.matrix()
    }

    /// The nalgebra rotation.
    #[must_use]
    pub const fn to_rotation(&self) -> Rotation3<f64> {
        self.rotation
    }

    /// Unit quaternion in the `w >= 0` hemisphere.
    #[must_use]
    pub fn to_quaternion(&self) -> UnitQuaternion<f64> {
        let q = UnitQuaternion::from_rotation_matrix(&self.rotation);
        if q.w < 0.0 {
            UnitQuaternion::new_unchecked(-q.into_inner())
        } else {
            q
        }
    }

    /// Unit axis and angle in `[0, π]`; the identity maps to `(+X, 0)`.
    #[must_use]
    pub fn to_axis_angle(&self) -> (Unit<Vector3<f64>>, f64) {
        let v = self.log();
        Unit::try_new_and_get(v, 0.0).unwrap_or((Vector3::x_axis(), 0.0))
    }

    /// Rotation vector. Same as [`So3::log`].
    #[must_use]
    pub fn to_rotation_vector(&self) -> Vector3<f64> {
        self.log()
    }

    /// Euler angles in the given order.
    #[must_use]
    pub fn to_euler(&self, order: AxisOrder) -> Vector3<f64> {
        order.angles_from_matrix(self.matrix())
    }

    /// Convert to the requested encoding.
    #[must_use]
    pub fn to_encoding(&self, kind: EncodingKind) -> Encoding {
        match kind {
            EncodingKind::Matrix => Encoding::Matrix(*self.matrix()),
            EncodingKind::Quaternion => Encoding::Quaternion(self.to_quaternion().into_inner()),
            EncodingKind::AxisAngle => {
                let (axis, angle) = self.to_axis_angle();
                Encoding::AxisAngle {
                    axis: axis.into_inner(),
                    angle,
                }
            }
            EncodingKind::RotationVector => Encoding::RotationVector(self.log()),
            EncodingKind::Euler(order) => Encoding::Euler {
                order,
                angles: self.to_euler(order),
            },
        }
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
        }
    }

    /// The inverse rotation.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            rotation: self.rotation.inverse(),
        }
    }

    /// Rotate a vector.
    #[must_use]
    pub fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * v
    }

    /// Rotation angle in `[0, π]`.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.log().norm()
    }

    /// Angle of the relative rotation `self⁻¹ ∘ other`.
    #[must_use]
    pub fn angle_to(&self, other: &Self) -> f64 {
        self.inverse().compose(other).angle()
    }

    /// Whether the rotation is within `tolerance` radians of the identity.
    #[must_use]
    pub fn is_identity(&self, tolerance: f64) -> bool {
        self.angle() <= tolerance
    }
}

impl Mul for So3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.compose(&rhs)
    }
}

impl Mul<Vector3<f64>> for So3 {
    type Output = Vector3<f64>;

    fn mul(self, rhs: Vector3<f64>) -> Vector3<f64> {
        self.rotate(&rhs)
    }
}

impl From<UnitQuaternion<f64>> for So3 {
    fn from(q: UnitQuaternion<f64>) -> Self {
        Self::from_unit_quaternion(&q)
    }
}

impl From<Rotation3<f64>> for So3 {
    fn from(rotation: Rotation3<f64>) -> Self {
        Self::from_rotation(rotation)
    }
}

impl AbsDiffEq for So3 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.rotation.abs_diff_eq(&other.rotation, epsilon)
    }
}

impl RelativeEq for So3 {
    fn default_max_relative() -> f64 {
        f64::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.rotation.relative_eq(&other.rotation, epsilon, max_relative)
    }
}

/// A rotation in one specific encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Encoding {
    /// 3×3 rotation matrix.
    Matrix(Matrix3<f64>),
    /// Quaternion, normalized on input.
    Quaternion(Quaternion<f64>),
    /// Axis (normalized on input) and angle in radians.
    AxisAngle {
        /// Rotation axis.
        axis: Vector3<f64>,
        /// Angle in radians.
        angle: f64,
    },
    /// Axis scaled by angle.
    RotationVector(Vector3<f64>),
    /// Euler angles in a given order.
    Euler {
        /// Axis order of `angles`.
        order: AxisOrder,
        /// The three angles.
        angles: Vector3<f64>,
    },
}

impl Encoding {
    /// Which kind of encoding this is.
    #[must_use]
    pub fn kind(&self) -> EncodingKind {
        match self {
            Self::Matrix(_) => EncodingKind::Matrix,
            Self::Quaternion(_) => EncodingKind::Quaternion,
            Self::AxisAngle { .. } => EncodingKind::AxisAngle,
            Self::RotationVector(_) => EncodingKind::RotationVector,
            Self::Euler { order, .. } => EncodingKind::Euler(*order),
        }
    }
}

/// Encoding selector for [`So3::to_encoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingKind {
    /// 3×3 rotation matrix.
    Matrix,
    /// Unit quaternion.
    Quaternion,
    /// Axis and angle.
    AxisAngle,
    /// Axis scaled by angle.
    RotationVector,
    /// Euler angles in the given order.
    Euler(AxisOrder),
}

impl EncodingKind {
    /// Every kind, with each supported Euler order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut kinds = vec![
            Self::Matrix,
            Self::Quaternion,
            Self::AxisAngle,
            Self::RotationVector,
        ];
        kinds.extend(AxisOrder::ALL.into_iter().map(Self::Euler));
        kinds
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_hat_vee() {
        let v = Vector3::new(1.0, -2.0, 0.5);
        let w = Vector3::new(0.3, 0.1, -4.0);
        assert_relative_eq!(hat(&v) * w, v.cross(&w), epsilon = 1e-15);
        assert_eq!(vee(&hat(&v)), v);
    }

    #[test]
    fn test_identity_log_is_zero() {
        let r = So3::identity();
        assert_eq!(r.log(), Vector3::zeros());
        let (axis, angle) = r.to_axis_angle();
        assert_eq!(angle, 0.0);
        assert_eq!(axis, Vector3::x_axis());
        assert!(r.is_identity(0.0));
    }

    #[test]
    fn test_exp_small_angle() {
        let v = Vector3::new(1e-7, -2e-7, 3e-8);
        let r = So3::exp(&v);
        assert_relative_eq!(r.log(), v, epsilon = 1e-18);
        let x = Vector3::x();
        assert_relative_eq!(r.rotate(&x), x + v.cross(&x), epsilon = 1e-13);
    }

    #[test]
    fn test_exp_matches_axis_angle() {
        let axis = Vector3::new(1.0, 2.0, -1.0).normalize();
        let r = So3::exp(&(axis * 1.3));
        let expected = So3::from_axis_angle(&axis, 1.3).unwrap();
        assert_relative_eq!(r, expected, epsilon = 1e-14);
    }

    #[test]
    fn test_log_at_pi_is_canonical() {
        for axis in [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(-1.0, 2.0, -3.0).normalize(),
        ] {
            let r = So3::from_axis_angle(&axis, PI).unwrap();
            let v = r.log();
            assert_relative_eq!(v.norm(), PI, epsilon = 1e-12);
            let k = v.iamax();
            assert!(v[k] > 0.0, "largest component must be positive: {v}");
            // Both signs describe the same rotation; the result must too.
            assert_relative_eq!(So3::exp(&v), r, epsilon = 1e-12);
            // Negated axis gives the identical canonical output.
            let flipped = So3::from_axis_angle(&-axis, PI).unwrap();
            assert_relative_eq!(flipped.log(), v, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_log_near_pi_keeps_sign() {
        let axis = Vector3::new(0.2, -0.9, 0.4).normalize();
        let angle = PI - 1e-6;
        let r = So3::from_axis_angle(&axis, angle).unwrap();
        assert_relative_eq!(r.log(), axis * angle, epsilon = 1e-9);
        let r = So3::from_axis_angle(&-axis, angle).unwrap();
        assert_relative_eq!(r.log(), -axis * angle, epsilon = 1e-9);
    }

    #[test]
    fn test_from_matrix_rejects_non_rotations() {
        let scaled = Matrix3::identity() * 2.0;
        assert!(matches!(
            So3::from_matrix(&scaled),
            Err(SpatialError::NotARotation { .. })
        ));

        let reflection = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -1.0));
        let err = So3::from_matrix(&reflection).unwrap_err();
        assert!(err.to_string().contains("improper"));

        let mut nan = Matrix3::identity();
        nan[(0, 1)] = f64::NAN;
        assert!(So3::from_matrix(&nan).is_err());

        let rot = *So3::exp(&Vector3::new(0.1, 0.2, 0.3)).matrix();
        assert!(So3::from_matrix(&rot).is_ok());
    }

    #[test]
    fn test_quaternion_hemisphere() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 1.0);
        let negated = Quaternion::new(-q.w, -q.i, -q.j, -q.k);
        let r = So3::from_quaternion(&negated).unwrap();
        let out = r.to_quaternion();
        assert!(out.w >= 0.0);
        assert_relative_eq!(out, q, epsilon = 1e-14);

        // Non-unit quaternions are normalized.
        let r = So3::from_quaternion(&(q.into_inner() * 3.0)).unwrap();
        assert_relative_eq!(r.to_quaternion(), q, epsilon = 1e-14);

        assert!(matches!(
            So3::from_quaternion(&Quaternion::new(0.0, 0.0, 0.0, 0.0)),
            Err(SpatialError::DegenerateQuaternion { .. })
        ));
    }

    #[test]
    fn test_axis_angle_degenerate_axis() {
        assert!(So3::from_axis_angle(&Vector3::zeros(), 0.0).unwrap().is_identity(0.0));
        assert_eq!(
            So3::from_axis_angle(&Vector3::zeros(), 0.5),
            Err(SpatialError::DegenerateAxis { angle: 0.5 })
        );
        assert!(So3::from_axis_angle(&Vector3::new(f64::NAN, 0.0, 0.0), 0.5).is_err());
    }

    #[test]
    fn test_axis_angle_rejects_non_finite_angle() {
        for angle in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = So3::from_axis_angle(&Vector3::x(), angle).unwrap_err();
            assert!(matches!(err, SpatialError::NonFiniteAngle { .. }), "{angle}: {err:?}");
        }
        let encoded = Encoding::AxisAngle {
            axis: Vector3::z(),
            angle: f64::NAN,
        };
        assert!(So3::from_encoding(&encoded).is_err());
    }

    #[test]
    fn test_compose_inverse_is_identity() {
        let r = So3::from_euler(AxisOrder::Zyx, &Vector3::new(0.4, -1.1, 2.2));
        assert!((r * r.inverse()).is_identity(1e-12));
        assert!((r.inverse() * r).is_identity(1e-12));
        assert_relative_eq!(r.angle_to(&r), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compose_order() {
        let a = So3::from_axis_angle(&Vector3::z(), FRAC_PI_2).unwrap();
        let b = So3::from_axis_angle(&Vector3::x(), FRAC_PI_2).unwrap();
        // b first: y → z, then a leaves z alone.
        assert_relative_eq!((a * b) * Vector3::y(), Vector3::z(), epsilon = 1e-15);
        // a first: y → -x, then b leaves x alone.
        assert_relative_eq!((b * a) * Vector3::y(), -Vector3::x(), epsilon = 1e-15);
    }

    #[test]
    fn test_encoding_roundtrip_all_kinds() {
        let r = So3::exp(&Vector3::new(-0.8, 0.3, 1.9));
        for kind in EncodingKind::all() {
            let encoded = r.to_encoding(kind);
            assert_eq!(encoded.kind(), kind);
            let back = So3::from_encoding(&encoded).unwrap();
            assert_relative_eq!(back, r, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_euler_matches_nalgebra_for_zyx() {
        // nalgebra's from_euler_angles(roll, pitch, yaw) is Rz(yaw) Ry(pitch) Rx(roll).
        let (roll, pitch, yaw) = (0.3, -0.4, 1.2);
        let r = So3::from_euler(AxisOrder::Zyx, &Vector3::new(yaw, pitch, roll));
        let expected = Rotation3::from_euler_angles(roll, pitch, yaw);
        assert_relative_eq!(r.to_rotation(), expected, epsilon = 1e-14);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let r = So3::from_euler(AxisOrder::Xyz, &Vector3::new(0.3, -0.8, 1.9));
        let json = serde_json::to_string(&r).unwrap();
        let back: So3 = serde_json::from_str(&json).unwrap();
        assert_relative_eq!(back, r, epsilon = 1e-15);
    }
}
