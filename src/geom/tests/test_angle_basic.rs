use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::{not_atan2, not_atan2_f32};

const VALUES: [f64; 14] = [
    f64::NEG_INFINITY,
    -1e9,
    -1e3,
    -1.0,
    -1e-3,
    -1e-9,
    -0.0,
    0.0,
    1e-9,
    1e-3,
    1.0,
    1e3,
    1e9,
    f64::INFINITY,
];

fn both_zero_or_infinite(y: f64, x: f64) -> bool {
    (x.is_infinite() && y.is_infinite()) || (x == 0.0 && y == 0.0)
}

/// Checks that `substitute` orders two inputs like `reference` does. Reference
/// values closer than `tie` may map to equal substitute values.
fn assert_same_order(reference: (f64, f64), substitute: (f64, f64), tie: f64, context: &str) {
    let (orig1, orig2) = reference;
    let (new1, new2) = substitute;
    let consistent = if (orig1 - orig2).abs() < tie {
        if orig1 < orig2 { new1 <= new2 } else { new1 >= new2 }
    } else if orig1 < orig2 {
        new1 < new2
    } else {
        new1 > new2
    };
    assert!(
        consistent,
        "inconsistent order for {context}: substitute ({new1}, {new2}), atan2 ({orig1}, {orig2})"
    );
}

#[test]
fn not_atan2_stays_in_range_for_all_boundary_pairs() {
    for y in VALUES {
        for x in VALUES {
            let value = not_atan2(y, x);
            assert!((-PI..=PI).contains(&value), "not_atan2({y}, {x}) = {value}");
        }
    }
}

#[test]
fn not_atan2_orders_boundary_pairs_like_atan2() {
    let inputs: Vec<(f64, f64)> = VALUES
        .iter()
        .flat_map(|&y| VALUES.iter().map(move |&x| (y, x)))
        .filter(|&(y, x)| !both_zero_or_infinite(y, x))
        .collect();

    for &(y1, x1) in &inputs {
        for &(y2, x2) in &inputs {
            assert_same_order(
                (y1.atan2(x1), y2.atan2(x2)),
                (not_atan2(y1, x1), not_atan2(y2, x2)),
                1e-15,
                &format!("({y1}, {x1}) vs ({y2}, {x2})"),
            );
        }
    }
}

#[test]
#[allow(clippy::cast_possible_truncation)]
fn not_atan2_f32_orders_boundary_pairs_like_atan2() {
    let inputs: Vec<(f32, f32)> = VALUES
        .iter()
        .flat_map(|&y| VALUES.iter().map(move |&x| (y as f32, x as f32)))
        .filter(|&(y, x)| !both_zero_or_infinite(f64::from(y), f64::from(x)))
        .collect();

    for &(y1, x1) in &inputs {
        for &(y2, x2) in &inputs {
            let reference = (
                f64::from(y1).atan2(f64::from(x1)),
                f64::from(y2).atan2(f64::from(x2)),
            );
            let substitute = (
                f64::from(not_atan2_f32(y1, x1)),
                f64::from(not_atan2_f32(y2, x2)),
            );
            assert_same_order(reference, substitute, 1e-5, &format!("({y1}, {x1}) vs ({y2}, {x2})"));
        }
    }
}

#[test]
fn not_atan2_orders_random_pairs_like_atan2() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20_000 {
        let (y1, x1): (f64, f64) = (rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
        let (y2, x2): (f64, f64) = (rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
        assert_same_order(
            (y1.atan2(x1), y2.atan2(x2)),
            (not_atan2(y1, x1), not_atan2(y2, x2)),
            1e-9,
            &format!("({y1}, {x1}) vs ({y2}, {x2})"),
        );
    }
}

#[test]
fn not_atan2_is_antisymmetric_in_y_off_the_negative_axis() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..1_000 {
        let y: f64 = rng.random_range(1e-6..10.0);
        let x: f64 = rng.random_range(-10.0..10.0);
        assert!((not_atan2(y, x) + not_atan2(-y, x)).abs() < 1e-12);
    }
}
