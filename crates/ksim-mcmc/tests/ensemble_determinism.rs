use ksim_core::RngHandle;
use ksim_mcmc::determinism::{chain_seed, dataset_seed};
use ksim_mcmc::manifest::samples_hash;
use ksim_mcmc::{generate_dataset, run, ChainConfig, MetropolisHastings, RunManifest};

fn small_config(threads: usize) -> ChainConfig {
    let mut config = ChainConfig::default();
    config.iterations = 2_000;
    config.burn_in = 200;
    config.chains = 3;
    config.threads = threads;
    config.seed_policy.master_seed = 4_242;
    config
}

#[test]
fn results_do_not_depend_on_thread_count() {
    let serial = run(&small_config(1)).unwrap();
    let parallel = run(&small_config(3)).unwrap();
    assert_eq!(serial, parallel);
}

#[test]
fn chains_follow_their_substreams() {
    let config = small_config(2);
    let ensemble = run(&config).unwrap();

    let mut data_rng = RngHandle::from_seed(dataset_seed(4_242));
    let data = generate_dataset(config.dataset.points, &mut data_rng);
    assert_eq!(ensemble.data, data);

    let sampler = MetropolisHastings::new(&data).unwrap();
    for (index, chain) in ensemble.chains.iter().enumerate() {
        let mut rng = RngHandle::from_seed(chain_seed(4_242, index));
        let expected = sampler.run(config.iterations, config.initial_value, &mut rng).unwrap();
        assert_eq!(chain, &expected);
    }
    assert_ne!(ensemble.chains[0].samples, ensemble.chains[1].samples);
}

#[test]
fn ensemble_outputs_are_consistent() {
    let config = small_config(0);
    let ensemble = run(&config).unwrap();

    assert_eq!(ensemble.summaries.len(), 3);
    let pooled = ensemble.pooled_samples(config.burn_in).unwrap();
    assert_eq!(pooled.len(), 3 * 1_800);
    let mean = pooled.iter().sum::<f64>() / pooled.len() as f64;
    assert!((ensemble.estimate - mean).abs() < 1e-12);
    assert!(ensemble.estimate > 1.0);

    let counted: usize = ensemble.histogram.counts.iter().sum();
    assert_eq!(counted, pooled.len());
    assert_eq!(ensemble.histogram.edges.len(), ensemble.histogram.counts.len() + 1);

    assert_eq!(ensemble.grid.len(), 450);
    assert_eq!(ensemble.posterior.len(), ensemble.grid.len());
    assert_eq!(ensemble.normalized_posterior.len(), ensemble.grid.len());
}

#[test]
fn explicit_values_bypass_generation() {
    let mut config = small_config(1);
    config.dataset.values = Some(vec![1.0, -1.0, 0.5]);
    let ensemble = run(&config).unwrap();
    assert_eq!(ensemble.data, vec![1.0, -1.0, 0.5]);
}

#[test]
fn manifest_round_trips_through_disk() {
    let config = small_config(1);
    let ensemble = run(&config).unwrap();
    let manifest = RunManifest::new(&config, &ensemble, vec!["samples.csv".into()]);
    assert_eq!(manifest.provenance.seed, 4_242);
    assert_eq!(manifest.chain_hashes.len(), 3);
    assert_eq!(manifest.data_hash, samples_hash(&ensemble.data));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("manifest.json");
    manifest.write(&path).unwrap();
    let loaded = RunManifest::load(&path).unwrap();

    assert_eq!(loaded.config, manifest.config);
    assert_eq!(loaded.provenance, manifest.provenance);
    assert_eq!(loaded.chain_hashes, manifest.chain_hashes);
    assert_eq!(loaded.artefacts, manifest.artefacts);
    assert!((loaded.estimate - manifest.estimate).abs() < 1e-12);
}

#[test]
fn missing_manifest_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = RunManifest::load(&dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.code(), "manifest-read");
}
