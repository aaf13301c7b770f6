//! Adjoint re-expression of spatial twists between rigid frames.
//!
//! Twists use the `[angular (3), linear (3)]` layout of the dynamics
//! pipeline. For a transform `T = (R, p)` mapping frame B coordinates into
//! frame A, the adjoint maps a twist written in B to the same motion
//! written in A:
//!
//! ```text
//! Ad_T = [ R      0 ]
//!        [ [p]×R  R ]
//! ```
//!
//! All functions are exact and allocation free.

use nalgebra::{Isometry3, Matrix4, Matrix6, Vector3, Vector6};

use crate::so3::{hat, vee};

/// 6D spatial vector: [angular (3), linear (3)].
pub type SpatialVector = Vector6<f64>;

/// Build a spatial vector from its angular and linear parts.
#[must_use]
pub fn spatial_vector(angular: &Vector3<f64>, linear: &Vector3<f64>) -> SpatialVector {
    SpatialVector::new(
        angular.x, angular.y, angular.z, linear.x, linear.y, linear.z,
    )
}

/// Angular part of a spatial vector.
#[must_use]
pub fn angular(v: &SpatialVector) -> Vector3<f64> {
    Vector3::new(v[0], v[1], v[2])
}

/// Linear part of a spatial vector.
#[must_use]
pub fn linear(v: &SpatialVector) -> Vector3<f64> {
    Vector3::new(v[3], v[4], v[5])
}

/// `Ad_T · v`: re-express twist `v` through transform `t`.
#[allow(clippy::inline_always)] // Called per Jacobian column
#[inline(always)]
#[must_use]
pub fn adjoint_transform(t: &Isometry3<f64>, v: &SpatialVector) -> SpatialVector {
    let w = t.rotation * angular(v);
    let lin = t.translation.vector.cross(&w) + t.rotation * linear(v);
    spatial_vector(&w, &lin)
}

/// `Ad_{T⁻¹} · v` without forming the inverse transform.
#[must_use]
pub fn inverse_adjoint_transform(t: &Isometry3<f64>, v: &SpatialVector) -> SpatialVector {
    let w = angular(v);
    let lin = linear(v) - t.translation.vector.cross(&w);
    let inv = t.rotation.inverse();
    spatial_vector(&(inv * w), &(inv * lin))
}

/// The 6×6 adjoint matrix `Ad_T`.
#[must_use]
pub fn adjoint_matrix(t: &Isometry3<f64>) -> Matrix6<f64> {
    let r = t.rotation.to_rotation_matrix().into_inner();
    let pr = hat(&t.translation.vector) * r;
    let mut ad = Matrix6::zeros();
    ad.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
    ad.fixed_view_mut::<3, 3>(3, 0).copy_from(&pr);
    ad.fixed_view_mut::<3, 3>(3, 3).copy_from(&r);
    ad
}

/// se(3) matrix of a twist: `[[ω]×, v; 0, 0]`.
#[must_use]
pub fn twist_hat(v: &SpatialVector) -> Matrix4<f64> {
    let mut m = Matrix4::zeros();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(&hat(&angular(v)));
    m.fixed_view_mut::<3, 1>(0, 3).copy_from(&linear(v));
    m
}

/// Inverse of [`twist_hat`]. Only the skew and translation blocks are read.
#[must_use]
pub fn twist_vee(m: &Matrix4<f64>) -> SpatialVector {
    let w = vee(&m.fixed_view::<3, 3>(0, 0).into_owned());
    let lin = m.fixed_view::<3, 1>(0, 3).into_owned();
    spatial_vector(&w, &lin)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    fn frame() -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(0.5, -1.2, 2.0),
            UnitQuaternion::from_euler_angles(0.3, -0.6, 1.4),
        )
    }

    fn twist() -> SpatialVector {
        SpatialVector::new(0.2, -0.4, 1.1, 3.0, 0.5, -0.7)
    }

    #[test]
    fn test_matches_matrix_form() {
        let t = frame();
        assert_relative_eq!(
            adjoint_transform(&t, &twist()),
            adjoint_matrix(&t) * twist(),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_inverse_cancels() {
        let t = frame();
        let v = twist();
        assert_relative_eq!(
            inverse_adjoint_transform(&t, &adjoint_transform(&t, &v)),
            v,
            epsilon = 1e-14
        );
        assert_relative_eq!(
            inverse_adjoint_transform(&t, &v),
            adjoint_transform(&t.inverse(), &v),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_conjugation_identity() {
        // T · hat(v) · T⁻¹ = hat(Ad_T v)
        let t = frame();
        let v = twist();
        let h = t.to_homogeneous();
        let conjugated = h * twist_hat(&v) * t.inverse().to_homogeneous();
        assert_relative_eq!(
            twist_hat(&adjoint_transform(&t, &v)),
            conjugated,
            epsilon = 1e-13
        );
    }

    #[test]
    fn test_composition() {
        let a = frame();
        let b = Isometry3::from_parts(
            Translation3::new(-0.1, 0.0, 0.9),
            UnitQuaternion::from_euler_angles(-1.0, 0.2, 0.0),
        );
        let v = twist();
        assert_relative_eq!(
            adjoint_transform(&(a * b), &v),
            adjoint_transform(&a, &adjoint_transform(&b, &v)),
            epsilon = 1e-13
        );
    }

    #[test]
    fn test_pure_rotation_keeps_linear_zero() {
        let t = Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3),
        );
        let out = adjoint_transform(&t, &SpatialVector::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        assert_eq!(linear(&out), Vector3::zeros());
    }

    #[test]
    fn test_hat_vee_roundtrip() {
        assert_eq!(twist_vee(&twist_hat(&twist())), twist());
    }
}
