//! End-to-end checks of the transform contracts: the documented inverse
//! pairs, the worked reference example, and axis handling over n-D buffers.

use rxform_dct::{DctOptions, Normalization, axis, dct1, dct2, dct2_along, dct3};
use rxform_runtime::{assert_close, assert_close_slice};

fn ortho() -> DctOptions {
    DctOptions::default().with_normalization(Normalization::Ortho)
}

#[test]
fn worked_example_dct3_of_dct2_over_twenty_recovers_input() {
    // x = [0, 1, ..., 9]; dct3(dct2(x)) / (2 * 10) == x
    let x: Vec<f64> = (0..10).map(f64::from).collect();
    let opts = DctOptions::default();
    let spectrum = dct2(&x, &opts).expect("forward transform");
    let recovered = dct3(&spectrum, &opts).expect("inverse-style transform");
    let scaled: Vec<f64> = recovered.iter().map(|v| v / 20.0).collect();
    assert_close_slice(&scaled, &x, 1e-10, 1e-12);
}

#[test]
fn unnormalized_type2_type3_composition_scales_by_two_n() {
    for n in [1usize, 2, 3, 7, 16, 33] {
        let x: Vec<f64> = (0..n).map(|i| (i as f64) * 0.75 - 3.0).collect();
        let opts = DctOptions::default();
        let spectrum = dct2(&x, &opts).expect("forward transform");
        let recovered = dct3(&spectrum, &opts).expect("inverse-style transform");
        let expected: Vec<f64> = x.iter().map(|v| v * 2.0 * n as f64).collect();
        assert_close_slice(&recovered, &expected, 1e-9, 1e-12);
    }
}

#[test]
fn ortho_type2_type3_composition_is_the_identity() {
    for n in [1usize, 2, 5, 10, 27] {
        let x: Vec<f64> = (0..n).map(|i| ((i * 7) % 5) as f64 - 2.0).collect();
        let spectrum = dct2(&x, &ortho()).expect("forward transform");
        let recovered = dct3(&spectrum, &ortho()).expect("inverse transform");
        assert_close_slice(&recovered, &x, 1e-11, 1e-12);
    }
}

#[test]
fn ortho_type2_preserves_the_l2_norm() {
    let x: Vec<f64> = (0..17).map(|i| (i as f64 * 0.3).sin() * 4.0).collect();
    let spectrum = dct2(&x, &ortho()).expect("forward transform");
    let input_norm: f64 = x.iter().map(|v| v * v).sum::<f64>().sqrt();
    let output_norm: f64 = spectrum.iter().map(|v| v * v).sum::<f64>().sqrt();
    assert_close(output_norm, input_norm, 1e-10, 1e-12);
}

#[test]
fn unnormalized_type1_composition_scales_by_two_n_minus_one() {
    for n in [2usize, 3, 8, 21] {
        let x: Vec<f64> = (0..n).map(|i| (i as f64) * 1.25 - 4.0).collect();
        let opts = DctOptions::default();
        let once = dct1(&x, &opts).expect("first type-1 transform");
        let twice = dct1(&once, &opts).expect("second type-1 transform");
        let expected: Vec<f64> = x.iter().map(|v| v * 2.0 * (n as f64 - 1.0)).collect();
        assert_close_slice(&twice, &expected, 1e-9, 1e-12);
    }
}

#[test]
fn single_precision_roundtrip_holds_at_f32_tolerance() {
    let x: Vec<f32> = (0..12).map(|i| i as f32 * 0.5 - 2.0).collect();
    let spectrum = dct2(&x, &ortho()).expect("forward transform");
    let recovered = dct3(&spectrum, &ortho()).expect("inverse transform");
    let actual: Vec<f64> = recovered.iter().map(|&v| f64::from(v)).collect();
    let expected: Vec<f64> = x.iter().map(|&v| f64::from(v)).collect();
    assert_close_slice(&actual, &expected, 1e-4, 1e-5);
}

#[test]
fn transform_along_axis_zero_equals_swap_compute_swap_by_hand() {
    // shape (2, 3, 4), transform along axis 0
    let shape = [2usize, 3, 4];
    let data: Vec<f64> = (0..24).map(|i| (i as f64 * 0.37).cos() * 5.0).collect();
    let opts = DctOptions::default();

    let via_dispatch = dct2_along(&data, &shape, 0, &opts).expect("axis-0 transform");

    let swapped = axis::swap_axes(&data, &shape, 0, 2);
    let swapped_shape = axis::swapped_shape(&shape, 0, 2);
    let transformed =
        dct2_along(&swapped, &swapped_shape, -1, &opts).expect("last-axis transform");
    let by_hand = axis::swap_axes(&transformed, &swapped_shape, 0, 2);

    assert_close_slice(&via_dispatch, &by_hand, 1e-12, 1e-12);
}

#[test]
fn negative_axis_means_the_last_axis() {
    let shape = [3usize, 5];
    let data: Vec<f64> = (0..15).map(|i| i as f64 - 7.0).collect();
    let opts = DctOptions::default();
    let via_negative = dct2_along(&data, &shape, -1, &opts).expect("axis -1");
    let via_positive = dct2_along(&data, &shape, 1, &opts).expect("axis 1");
    assert_eq!(via_negative, via_positive);
}

#[test]
fn middle_axis_transform_leaves_other_axes_untouched() {
    // Two independent lanes along axis 1 of shape (2, 4): each row of the
    // result must equal the 1-D transform of the corresponding input row.
    let shape = [2usize, 4];
    let lane_a = [1.0, -2.0, 0.5, 3.0];
    let lane_b = [4.0, 4.0, 4.0, 4.0];
    let mut data = Vec::new();
    data.extend_from_slice(&lane_a);
    data.extend_from_slice(&lane_b);

    let opts = DctOptions::default();
    let out = dct2_along(&data, &shape, 1, &opts).expect("axis-1 transform");
    let expected_a = dct2(&lane_a, &opts).expect("lane a");
    let expected_b = dct2(&lane_b, &opts).expect("lane b");

    assert_close_slice(&out[..4], &expected_a, 1e-12, 1e-12);
    assert_close_slice(&out[4..], &expected_b, 1e-12, 1e-12);
}

#[test]
fn input_buffers_are_never_mutated() {
    let x: Vec<f64> = (0..9).map(f64::from).collect();
    let before = x.clone();
    let _ = dct2(&x, &DctOptions::default()).expect("transform");
    assert_eq!(x, before);
}
