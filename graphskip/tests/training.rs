mod common;

use graphskip::{load_datasets, EncoderKind, Trainer, TrainConfig};
use graphskip_data::{read_graphfile, Dataset, FeatureType};
use tempfile::TempDir;

fn config(datadir: &std::path::Path, logdir: &std::path::Path, method: EncoderKind) -> TrainConfig {
    TrainConfig {
        datadir: datadir.to_path_buf(),
        dataset: "SHAPES".to_string(),
        feature: FeatureType::Deg,
        lr: 0.01,
        batch_size: 4,
        epochs: 3,
        log_interval: 3,
        hidden_dim: 8,
        embedding_dim: 6,
        neg_sampling_num: 3,
        method,
        eval_folds: 3,
        logdir: Some(logdir.to_path_buf()),
        ..TrainConfig::default()
    }
}

#[test]
fn test_train_from_tu_files() {
    let data = TempDir::new().unwrap();
    common::write_cycles_and_stars(data.path(), "SHAPES", 8);

    for method in [EncoderKind::Base, EncoderKind::BaseSet2Set, EncoderKind::SoftAssign] {
        let logdir = TempDir::new().unwrap();
        let c = config(data.path(), logdir.path(), method);
        let (train, eval) = load_datasets(&c).unwrap();
        assert_eq!(train.len(), 12);
        assert_eq!(eval.num_classes(), 2);

        let mut trainer = Trainer::new(c, train, eval).unwrap();
        let summaries = trainer.train().unwrap();
        assert_eq!(summaries.len(), 1);
        let report = summaries[0].eval.as_ref().expect("evaluation ran");
        assert_eq!(report.fold_accuracies.len(), 3);
        assert!((0.0..=1.0).contains(&report.mean_accuracy));

        let saved = TrainConfig::load(logdir.path().join("config.json")).unwrap();
        assert_eq!(saved.method, method);
        assert!(logdir.path().join("embeddings-epoch3.json").exists());
    }
}

#[test]
fn test_max_num_nodes_filters_and_pads() {
    let data = TempDir::new().unwrap();
    common::write_cycles_and_stars(data.path(), "SHAPES", 8);
    let logdir = TempDir::new().unwrap();
    let mut c = config(data.path(), logdir.path(), EncoderKind::Base);
    c.max_num_nodes = 6;

    let (train, eval) = load_datasets(&c).unwrap();
    assert_eq!(train.len(), 8);
    let trainer = Trainer::new(c, train, eval).unwrap();
    assert_eq!(trainer.featurizer().max_num_nodes(), 6);
}

#[test]
fn test_extend_trains_on_related_datasets() {
    let data = TempDir::new().unwrap();
    let sizes = [("PTC_MR", 8), ("PTC_MM", 4), ("PTC_FR", 6), ("PTC_FM", 3)];
    for (name, n_max) in sizes {
        common::write_cycles_and_stars(data.path(), name, n_max);
    }
    let logdir = TempDir::new().unwrap();
    let mut c = config(data.path(), logdir.path(), EncoderKind::Base);
    c.dataset = "PTC_MR".to_string();
    c.extend = true;

    let (train, eval) = load_datasets(&c).unwrap();
    let main = read_graphfile(data.path(), "PTC_MR", 0).unwrap();
    assert_eq!(eval.graphs(), &main[..]);

    let mut expected = Vec::new();
    for name in ["PTC_MM", "PTC_FR", "PTC_FM", "PTC_MR"] {
        expected.extend(read_graphfile(data.path(), name, 0).unwrap());
    }
    assert_eq!(train.len(), 4 + 8 + 2 + 12);
    assert_eq!(train.graphs(), &expected[..]);

    let mut trainer = Trainer::new(c, train, eval).unwrap();
    assert!(trainer.train_epoch().unwrap().is_finite());
}

#[test]
fn test_extend_without_related_datasets_uses_main_only() {
    let data = TempDir::new().unwrap();
    common::write_cycles_and_stars(data.path(), "SHAPES", 6);
    let logdir = TempDir::new().unwrap();
    let mut c = config(data.path(), logdir.path(), EncoderKind::Base);
    c.extend = true;

    let (train, eval) = load_datasets(&c).unwrap();
    assert_eq!(train.len(), 8);
    assert_eq!(train.graphs(), eval.graphs());
}
