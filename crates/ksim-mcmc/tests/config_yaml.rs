use std::fs;

use ksim_core::SimError;
use ksim_mcmc::{BinRule, ChainConfig};

#[test]
fn empty_document_uses_defaults() {
    let config = ChainConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, ChainConfig::default());
    assert_eq!(config.iterations, 20_000);
    assert_eq!(config.initial_value, 10.0);
    assert_eq!(config.dataset.points, 100);
    assert_eq!(config.grid.start, 1.5);
    assert_eq!(config.grid.stop, 6.0);
    assert_eq!(config.histogram_bins, BinRule::Auto);
}

#[test]
fn nested_sections_override_defaults() {
    let yaml = r#"
iterations: 5000
burn_in: 500
chains: 4
threads: 2
dataset:
  values: [0.5, -1.0, 2.0]
grid:
  start: 2.0
  stop: 4.0
  step: 0.5
histogram_bins:
  type: fixed
  bins: 25
seed_policy:
  master_seed: 99
  label: nightly
"#;
    let config = ChainConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.iterations, 5_000);
    assert_eq!(config.burn_in, 500);
    assert_eq!(config.chains, 4);
    assert_eq!(config.dataset.values.as_deref(), Some(&[0.5, -1.0, 2.0][..]));
    assert_eq!(config.histogram_bins, BinRule::Fixed { bins: 25 });
    assert_eq!(config.seed_policy.master_seed, 99);
    assert_eq!(config.seed_policy.label.as_deref(), Some("nightly"));
}

#[test]
fn invalid_values_are_reported_with_codes() {
    let cases = [
        ("initial_value: 1.0", "initial-value"),
        ("iterations: 0", "iterations"),
        ("iterations: 10\nburn_in: 10", "burn-in"),
        ("chains: 0", "chains"),
        ("grid: { start: 0.5 }", "grid-start"),
        ("grid: { step: 0.0 }", "grid-step"),
        ("grid: { start: 3.0, stop: 2.0 }", "grid-stop"),
        ("histogram_bins: { type: fixed, bins: 0 }", "histogram-bins"),
        ("histogram_bins: { type: fixed, bins: 100001 }", "histogram-bins"),
        ("grid: { step: 1.0e-300 }", "grid-too-large"),
        ("grid: { start: 1.5, stop: 6.0, step: 1.0e-12 }", "grid-too-large"),
    ];
    for (yaml, code) in cases {
        let err = ChainConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, SimError::Config(_)), "{yaml}");
        assert_eq!(err.code(), code, "{yaml}");
    }
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = ChainConfig::from_yaml_str("iterations: [1, 2").unwrap_err();
    assert_eq!(err.code(), "chain-config-parse");
}

#[test]
fn load_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chain.yaml");
    fs::write(&path, "iterations: 300\nchains: 2\n").unwrap();
    let config = ChainConfig::load(&path).unwrap();
    assert_eq!(config.iterations, 300);
    assert_eq!(config.chains, 2);

    let err = ChainConfig::load(&dir.path().join("missing.yaml")).unwrap_err();
    assert_eq!(err.code(), "chain-config-read");
}

#[test]
fn finest_accepted_grid_runs() {
    let config = ChainConfig::from_yaml_str(
        "iterations: 10\ngrid: { start: 2.0, stop: 3.0, step: 1.0e-5 }",
    )
    .unwrap();
    let ensemble = ksim_mcmc::run(&config).unwrap();
    assert!(ensemble.grid.len() <= ksim_mcmc::MAX_GRID_POINTS);
    assert!(ensemble.grid.len() >= 99_999);
}
