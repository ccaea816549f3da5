#![allow(dead_code)]

use briny_warp::tensors::Ten64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source/flow pair together with its spatial size.
pub struct Fixture {
    pub source: Ten64,
    pub flow: Ten64,
}

fn fixture(h: usize, w: usize, source: Vec<f64>, col: &[f64], row: &[f64]) -> Fixture {
    let mut flow = col.to_vec();
    flow.extend_from_slice(row);
    Fixture {
        source: Ten64::new(vec![1, 1, h, w], source),
        flow: Ten64::new(vec![1, 2, h, w], flow),
    }
}

const B_COL: [f64; 12] = [
    0.6948, 0.0344, 0.7655, 0.4898, 0.3171, 0.4387, 0.7952, 0.4456, -0.0498, -0.6184, -0.8131,
    -0.3537,
];

const B_ROW: [f64; 12] = [
    0.9572, 0.1419, 0.7922, -0.9643, 0.4854, 0.4218, 0.9595, -0.1509, 0.8003, 0.9157, 0.6557,
    -0.0660,
];

/// 4×5 source holding its own flat index.
pub fn fixture_a() -> Fixture {
    let col = [
        -1.0135, -1.0031, 0.5676, -0.8131, 0.1150, 0.8829, 0.3059, 0.7445, 1.2400, 1.4884,
        -0.5664, -0.7111, -0.1484, -1.0429, -1.2655, 0.0856, 0.4622, -1.2485, 0.9775, -0.1720,
    ];
    let row = [
        -1.1800, 0.9519, -0.7204, -0.9545, 1.1079, 1.3857, 1.1061, 0.9002, -0.7086, 0.2391,
        -1.4861, -1.2467, -0.2058, -1.0634, 0.1496, 0.8247, -0.3007, 1.2319, -1.0918, -1.0651,
    ];
    fixture(4, 5, (0..20).map(f64::from).collect(), &col, &row)
}

/// 3×4 source of `i / 100`.
pub fn fixture_b() -> Fixture {
    fixture(3, 4, (0..12).map(|i| f64::from(i) / 100.0).collect(), &B_COL, &B_ROW)
}

/// 3×4 source of `i / 10` displaced along columns only.
pub fn fixture_c() -> Fixture {
    fixture(3, 4, (0..12).map(|i| f64::from(i) / 10.0).collect(), &B_COL, &[0.0; 12])
}

/// 2×2 source of `(i + 5) / 10`.
pub fn fixture_d() -> Fixture {
    fixture(
        2,
        2,
        (0..4).map(|i| f64::from(i + 5) / 10.0).collect(),
        &[0.2, -0.2, 0.2, -0.2],
        &[0.3, 0.3, -0.3, -0.3],
    )
}

/// 2×3 source of `(i + 5) / 10`.
pub fn fixture_e() -> Fixture {
    fixture(
        2,
        3,
        (0..6).map(|i| f64::from(i + 5) / 10.0).collect(),
        &[1.2, 0.2, -0.2, 1.2, 0.2, -0.2],
        &[0.3, 0.3, 0.3, -0.3, -0.3, -0.3],
    )
}

/// 2×2 single bright pixel, flow pointing up and left.
pub fn fixture_f() -> Fixture {
    fixture(
        2,
        2,
        vec![0.5, 0.0, 0.0, 0.0],
        &[-0.2; 4],
        &[-0.3, 0.3, -0.3, -0.3],
    )
}

/// 2×2 all-zero source with the flow of [`fixture_d`].
pub fn fixture_g() -> Fixture {
    fixture(2, 2, vec![0.0; 4], &[0.2, -0.2, 0.2, -0.2], &[0.3, 0.3, -0.3, -0.3])
}

/// All fixtures whose sampling coordinates stay clear of integers.
pub fn smooth_fixtures() -> Vec<(&'static str, Fixture)> {
    vec![
        ("a", fixture_a()),
        ("b", fixture_b()),
        ("d", fixture_d()),
        ("e", fixture_e()),
        ("f", fixture_f()),
        ("g", fixture_g()),
    ]
}

/// Random source and flow of the given shape.
///
/// Displacements lie in `(-1.5, 1.5)` and keep their fractional part at least
/// `margin` away from an integer, so finite differences never straddle a kink.
pub fn random_pair(rng: &mut StdRng, shape: [usize; 4], margin: f64) -> Fixture {
    let [n, c, h, w] = shape;
    let source = (0..n * c * h * w).map(|_| rng.random_range(-1.0..1.0)).collect();
    let flow = (0..n * 2 * h * w)
        .map(|_| loop {
            let d: f64 = rng.random_range(-1.5..1.5);
            let frac = d - d.floor();
            if frac > margin && frac < 1.0 - margin {
                break d;
            }
        })
        .collect();
    Fixture {
        source: Ten64::new(vec![n, c, h, w], source),
        flow: Ten64::new(vec![n, 2, h, w], flow),
    }
}

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() <= tol, "index {i}: got {a}, expected {e} (tol {tol})");
    }
}
