//! Property-based round trips for the rotation group.
//!
//! Every encoding is pushed through the canonical form and back over
//! random rotations, with dedicated strategies for the near-identity and
//! near-π regions where the branch handling lives.
//!
//! Run with: cargo test -p sim-spatial -- roundtrip

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::f64::consts::PI;

use approx::assert_relative_eq;
use nalgebra::{Quaternion, Vector3};
use proptest::prelude::*;
use sim_spatial::{AxisOrder, EncodingKind, So3};

const TOLERANCE: f64 = 1e-9;

// =============================================================================
// Strategies
// =============================================================================

/// Unit axis drawn from the sphere (rejects the tiny ball around zero).
fn arb_axis() -> impl Strategy<Value = Vector3<f64>> {
    prop::array::uniform3(-1.0..1.0f64)
        .prop_filter("axis too short", |[x, y, z]| x * x + y * y + z * z > 1e-4)
        .prop_map(|[x, y, z]| Vector3::new(x, y, z).normalize())
}

/// Rotation anywhere on the group.
fn arb_rotation() -> impl Strategy<Value = So3> {
    (arb_axis(), 0.0..PI).prop_map(|(axis, angle)| So3::exp(&(axis * angle)))
}

/// Rotation within 1e-6 rad of the identity.
fn arb_near_identity() -> impl Strategy<Value = So3> {
    (arb_axis(), 0.0..1e-6f64).prop_map(|(axis, angle)| So3::exp(&(axis * angle)))
}

/// Rotation within 1e-6 rad of a half turn.
fn arb_near_pi() -> impl Strategy<Value = So3> {
    (arb_axis(), 0.0..1e-6f64).prop_map(|(axis, delta)| So3::exp(&(axis * (PI - delta))))
}

fn any_rotation() -> impl Strategy<Value = So3> {
    prop_oneof![
        6 => arb_rotation(),
        2 => arb_near_identity(),
        2 => arb_near_pi(),
    ]
}

fn same_rotation(a: &So3, b: &So3) -> bool {
    a.angle_to(b) < TOLERANCE
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn roundtrip_every_encoding(r in any_rotation()) {
        for kind in EncodingKind::all() {
            let encoded = r.to_encoding(kind);
            let back = So3::from_encoding(&encoded).unwrap();
            prop_assert!(same_rotation(&r, &back), "{kind:?} lost the rotation");
        }
    }

    #[test]
    fn roundtrip_encoding_pairs(r in any_rotation()) {
        // matrix → quaternion → matrix, quaternion → axis-angle → quaternion, ...
        let kinds = EncodingKind::all();
        for from in &kinds {
            let first = So3::from_encoding(&r.to_encoding(*from)).unwrap();
            for to in &kinds {
                let second = So3::from_encoding(&first.to_encoding(*to)).unwrap();
                prop_assert!(same_rotation(&r, &second), "{from:?} → {to:?}");
            }
        }
    }

    #[test]
    fn roundtrip_matrix_entries(r in any_rotation()) {
        let q = r.to_quaternion();
        let back = So3::from_quaternion(&q.into_inner()).unwrap();
        assert_relative_eq!(*back.matrix(), *r.matrix(), epsilon = TOLERANCE);
    }

    #[test]
    fn roundtrip_log_exp(r in any_rotation()) {
        let v = r.log();
        prop_assert!(v.norm() <= PI + 1e-12);
        prop_assert!(same_rotation(&So3::exp(&v), &r));
    }

    #[test]
    fn roundtrip_exp_log(axis in arb_axis(), angle in 0.0..(PI - 1e-3)) {
        let v = axis * angle;
        assert_relative_eq!(So3::exp(&v).log(), v, epsilon = TOLERANCE);
    }

    #[test]
    fn compose_with_inverse_is_identity(r in any_rotation()) {
        prop_assert!((r * r.inverse()).is_identity(TOLERANCE));
    }

    #[test]
    fn quaternion_is_canonical(r in any_rotation()) {
        prop_assert!(r.to_quaternion().w >= 0.0);
    }

    #[test]
    fn non_unit_quaternion_is_normalized(r in arb_rotation(), scale in 0.1..10.0f64) {
        let q: Quaternion<f64> = r.to_quaternion().into_inner() * scale;
        let back = So3::from_quaternion(&q).unwrap();
        prop_assert!(same_rotation(&r, &back));
    }

    #[test]
    fn euler_angles_in_range(r in any_rotation()) {
        for order in AxisOrder::ALL {
            let angles = r.to_euler(order);
            prop_assert!(angles[1].abs() <= PI / 2.0 + 1e-12);
            prop_assert!(angles[0].abs() <= PI + 1e-12);
            prop_assert!(angles[2].abs() <= PI + 1e-12);
        }
    }
}

#[test]
fn log_is_deterministic_at_half_turn() {
    let axis = Vector3::new(3.0, -4.0, 0.0).normalize();
    let a = So3::from_axis_angle(&axis, PI).unwrap().log();
    let b = So3::from_axis_angle(&-axis, PI).unwrap().log();
    assert_relative_eq!(a, b, epsilon = 1e-12);
    // -4/5 is the largest component; canonical sign makes it positive.
    assert!(a.y > 0.0);
}
