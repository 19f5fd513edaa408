use super::{Trainer, load_datasets};
use crate::config::TrainConfig;
use crate::encoders::EncoderKind;
use crate::testing::toy_graphs;
use graphskip_data::{Dataset, FeatureType, GraphDataset};
use tempfile::TempDir;

fn dataset() -> GraphDataset {
    let mut graphs = toy_graphs();
    graphs.extend(toy_graphs());
    GraphDataset::new(graphs)
}

fn config(method: EncoderKind) -> TrainConfig {
    TrainConfig {
        dataset: "TOY".to_string(),
        feature: FeatureType::Deg,
        lr: 0.01,
        batch_size: 3,
        epochs: 4,
        log_interval: 2,
        hidden_dim: 6,
        embedding_dim: 5,
        neg_sampling_num: 2,
        method,
        assign_ratio: 0.5,
        eval_folds: 2,
        seed: 3,
        ..TrainConfig::default()
    }
}

#[test]
fn test_new_rejects_tiny_training_set() {
    let one = GraphDataset::new(toy_graphs().into_iter().take(1).collect());
    assert!(Trainer::new(config(EncoderKind::Base), one.clone(), one).is_err());
}

#[test]
fn test_train_epoch_reports_finite_loss() {
    for method in [EncoderKind::Base, EncoderKind::BaseSet2Set, EncoderKind::SoftAssign] {
        let data = dataset();
        let mut trainer = Trainer::new(config(method), data.clone(), data).unwrap();
        assert_eq!(trainer.featurizer().max_num_nodes(), 5);
        let loss = trainer.train_epoch().unwrap();
        assert!(loss.is_finite() && loss > 0.0, "{}: loss {}", method, loss);
        assert_eq!(trainer.epoch(), 1);
    }
}

#[test]
fn test_same_seed_same_losses() {
    let run = || {
        let data = dataset();
        let mut trainer = Trainer::new(config(EncoderKind::Base), data.clone(), data).unwrap();
        (0..3).map(|_| trainer.train_epoch().unwrap()).collect::<Vec<f32>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_lr_decay() {
    let mut c = config(EncoderKind::Base);
    c.lr_decay_step = Some(1);
    c.lr_decay_gamma = 0.5;
    let data = dataset();
    let mut trainer = Trainer::new(c, data.clone(), data).unwrap();
    trainer.train_epoch().unwrap();
    trainer.train_epoch().unwrap();
    assert!((trainer.current_lr() - 0.0025).abs() < 1e-7);
}

#[test]
fn test_train_logs_and_writes_embeddings() {
    let logdir = TempDir::new().unwrap();
    let mut c = config(EncoderKind::Base);
    c.epochs = 5;
    c.clip = Some(1.0);
    c.logdir = Some(logdir.path().to_path_buf());
    let data = dataset();
    let mut trainer = Trainer::new(c, data.clone(), data.clone()).unwrap();
    let summaries = trainer.train().unwrap();

    let epochs: Vec<usize> = summaries.iter().map(|s| s.epoch).collect();
    assert_eq!(epochs, vec![2, 4, 5]);
    assert!(summaries.iter().all(|s| s.eval.is_some()));

    assert!(logdir.path().join("config.json").exists());
    let text = std::fs::read_to_string(logdir.path().join("embeddings-epoch5.json")).unwrap();
    let dump: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(dump["epoch"], 5);
    assert_eq!(dump["embeddings"].as_array().unwrap().len(), data.len());
    assert_eq!(dump["embeddings"][0].as_array().unwrap().len(), 5);

    let embeddings = trainer.embeddings().unwrap();
    assert_eq!(embeddings.shape(), vec![data.len(), 5]);
}

#[test]
fn test_load_datasets_missing_directory() {
    let tmp = TempDir::new().unwrap();
    let c = TrainConfig {
        datadir: tmp.path().to_path_buf(),
        ..config(EncoderKind::Base)
    };
    assert!(load_datasets(&c).is_err());
}
