use ksim_core::{RngHandle, SimError};
use ksim_mcmc::{
    normalized_posterior_curve, posterior_grid, run_chain, unnormalized_posterior,
    MetropolisHastings,
};
use proptest::prelude::*;

/// Data with `sum x^2 == n`, whose posterior mode is exactly `e`.
fn unit_square_data(n: usize) -> Vec<f64> {
    (0..n).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn samples_never_leave_the_support(
        seed in any::<u64>(),
        iterations in 0usize..400,
        initial in 1.0001f64..20.0,
        points in 0usize..30,
    ) {
        let mut data_rng = RngHandle::from_seed(seed ^ 0xFF);
        let data = ksim_mcmc::generate_dataset(points, &mut data_rng);
        let mut rng = RngHandle::from_seed(seed);
        let samples = run_chain(iterations, initial, &data, &mut rng).unwrap();
        prop_assert_eq!(samples.len(), iterations);
        prop_assert!(samples.iter().all(|&a| a > 1.0));
    }
}

#[test]
fn seeded_chains_are_reproducible() {
    let data = unit_square_data(100);
    let mut rng_a = RngHandle::from_seed(2024);
    let mut rng_b = RngHandle::from_seed(2024);
    let a = run_chain(5_000, 10.0, &data, &mut rng_a).unwrap();
    let b = run_chain(5_000, 10.0, &data, &mut rng_b).unwrap();
    assert_eq!(a, b);

    let mut rng_c = RngHandle::from_seed(2025);
    let c = run_chain(5_000, 10.0, &data, &mut rng_c).unwrap();
    assert_ne!(a, c);
}

#[test]
fn zero_iterations_yield_no_samples() {
    let mut rng = RngHandle::from_seed(1);
    assert!(run_chain(0, 3.0, &[0.5, -0.5], &mut rng).unwrap().is_empty());
}

#[test]
fn initial_value_outside_support_is_rejected() {
    let mut rng = RngHandle::from_seed(1);
    for initial in [1.0, 0.2, -4.0, f64::NAN] {
        let err = run_chain(10, initial, &[0.1], &mut rng).unwrap_err();
        assert!(matches!(err, SimError::InvalidArgument(_)));
        assert_eq!(err.code(), "initial-value-outside-support");
    }
}

#[test]
fn non_finite_data_is_rejected() {
    let mut rng = RngHandle::from_seed(1);
    let err = run_chain(10, 3.0, &[0.1, f64::INFINITY], &mut rng).unwrap_err();
    assert_eq!(err.code(), "data-not-finite");
}

#[test]
fn chain_records_current_value_after_rejections() {
    let sampler = MetropolisHastings::new(&unit_square_data(100)).unwrap();
    let mut rng = RngHandle::from_seed(8);
    let run = sampler.run(3_000, 2.7, &mut rng).unwrap();
    assert!(run.rejected + run.out_of_support > 0);
    // Every non-accepted step repeats the previous sample.
    let repeats = run.samples.windows(2).filter(|pair| pair[0] == pair[1]).count();
    assert!(repeats >= run.rejected + run.out_of_support - 1);
}

#[test]
fn long_chain_agrees_with_the_analytical_posterior() {
    let data = unit_square_data(100);
    let mut rng = RngHandle::from_seed(77);
    let samples = run_chain(20_000, 10.0, &data, &mut rng).unwrap();
    let retained = &samples[1_000..];
    let chain_mean = retained.iter().sum::<f64>() / retained.len() as f64;

    let grid = posterior_grid(1.5, 6.0, 0.001).unwrap();
    let density = normalized_posterior_curve(&grid, &data).unwrap();
    let grid_mean: f64 = grid
        .windows(2)
        .zip(density.windows(2))
        .map(|(a, p)| (a[1] - a[0]) * (a[0] * p[0] + a[1] * p[1]) / 2.0)
        .sum();

    assert!((chain_mean - std::f64::consts::E).abs() < 0.5, "mean {chain_mean}");
    assert!((chain_mean - grid_mean).abs() < 0.1, "chain {chain_mean} grid {grid_mean}");
}

#[test]
fn posterior_curve_is_elementwise() {
    let data = [0.3, -1.2, 0.8];
    let grid = [1.5, 2.0, 2.718, 4.0];
    let curve = ksim_mcmc::posterior_curve(&grid, &data).unwrap();
    let sum_of_squares: f64 = data.iter().map(|x| x * x).sum();
    for (a, value) in grid.iter().zip(&curve) {
        let expected = unnormalized_posterior(*a, sum_of_squares, data.len()).unwrap();
        assert_eq!(*value, expected);
    }
}

#[test]
fn posterior_curve_rejects_points_outside_support() {
    let err = ksim_mcmc::posterior_curve(&[0.5, 2.0], &[1.0]).unwrap_err();
    assert!(matches!(err, SimError::DomainUndefined(_)));
}

#[test]
fn normalized_curve_has_unit_area() {
    let data = unit_square_data(100);
    let grid = posterior_grid(1.5, 6.0, 0.01).unwrap();
    let density = normalized_posterior_curve(&grid, &data).unwrap();
    let area: f64 = grid
        .windows(2)
        .zip(density.windows(2))
        .map(|(a, p)| (a[1] - a[0]) * (p[0] + p[1]) / 2.0)
        .sum();
    assert!((area - 1.0).abs() < 1e-9);

    let peak = grid
        .iter()
        .zip(&density)
        .max_by(|x, y| x.1.total_cmp(y.1))
        .map(|(a, _)| *a)
        .unwrap();
    assert!((peak - std::f64::consts::E).abs() < 0.02);
}

#[test]
fn normalization_requires_ascending_grid() {
    let err = normalized_posterior_curve(&[2.0, 1.9, 3.0], &[1.0]).unwrap_err();
    assert_eq!(err.code(), "grid-not-ascending");
    let err = normalized_posterior_curve(&[2.0], &[1.0]).unwrap_err();
    assert_eq!(err.code(), "grid-too-short");
}
