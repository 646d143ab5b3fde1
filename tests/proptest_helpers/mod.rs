#![allow(dead_code)]

use annobox::ImageSize;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Case count is overridable through `PROPTEST_CASES`; failures persist
/// next to the test sources.
pub fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(48),
        failure_persistence: Some(Box::new(FileFailurePersistence::WithSource(
            "proptest-regressions",
        ))),
        ..ProptestConfig::default()
    }
}

/// Tolerance for YOLO roundtrips: lines carry six decimals of normalized
/// coordinates, so the pixel error scales with the larger image dimension.
pub fn eps_yolo(size: ImageSize) -> f64 {
    size.width.max(size.height) as f64 * 1e-6
}

pub fn arb_image_size() -> BoxedStrategy<ImageSize> {
    (2u32..=4096, 2u32..=4096)
        .prop_map(|(width, height)| ImageSize::new(width, height))
        .boxed()
}

/// A non-degenerate integer-pixel LTRB box inside the given image, derived
/// from a single seed so callers can pair it with an independent size.
pub fn arb_pixel_ltrb_seed(size: ImageSize, seed: u32) -> [f64; 4] {
    ltrb_from_seed(
        size,
        seed,
        seed.rotate_left(3),
        seed.rotate_left(7),
        seed.rotate_left(11),
    )
}

/// A non-degenerate normalized LTRB box with coordinates on a fine grid.
pub fn arb_norm_ltrb() -> BoxedStrategy<[f64; 4]> {
    (0u32..999, 0u32..999, 1u32..=1000, 1u32..=1000)
        .prop_map(|(sl, st, sw, sh)| {
            let l = sl as f64 / 1000.0;
            let t = st as f64 / 1000.0;
            let r = l + (sw as f64 / 1000.0) * (1.0 - l);
            let b = t + (sh as f64 / 1000.0) * (1.0 - t);
            [l, t, r.min(1.0), b.min(1.0)]
        })
        .boxed()
}

pub fn assert_close(actual: [f64; 4], expected: [f64; 4], eps: f64) -> Result<(), String> {
    for (a, e) in actual.iter().zip(&expected) {
        if (a - e).abs() > eps {
            return Err(format!(
                "coordinates differ beyond eps={eps}: actual={actual:?} expected={expected:?}"
            ));
        }
    }
    Ok(())
}

fn ltrb_from_seed(size: ImageSize, sx: u32, sy: u32, sw: u32, sh: u32) -> [f64; 4] {
    let xmin = sx % (size.width - 1);
    let ymin = sy % (size.height - 1);
    let xmax = xmin + 1 + (sw % (size.width - xmin));
    let ymax = ymin + 1 + (sh % (size.height - ymin));
    [xmin as f64, ymin as f64, xmax as f64, ymax as f64]
}
