use super::{TrainConfig, CONFIG_FILE};
use crate::encoders::EncoderKind;
use graphskip_data::{FeatureType, NodeInputs};
use tempfile::TempDir;

fn config() -> TrainConfig {
    TrainConfig {
        dataset: "MUTAG".to_string(),
        ..TrainConfig::default()
    }
}

#[test]
fn test_defaults() {
    let c = TrainConfig::default();
    assert_eq!(c.batch_size, 20);
    assert_eq!(c.epochs, 100_000);
    assert_eq!(c.hidden_dim, 50);
    assert_eq!(c.embedding_dim, 100);
    assert_eq!(c.neg_sampling_num, 20);
    assert_eq!(c.method, EncoderKind::Base);
    assert!(c.bn && c.bias && !c.permutate);
    assert!(config().validate().is_ok());
}

#[test]
fn test_validation_rejects_bad_values() {
    assert!(TrainConfig::default().validate().is_err());
    let cases: Vec<Box<dyn Fn(&mut TrainConfig)>> = vec![
        Box::new(|c| c.lr = 0.0),
        Box::new(|c| c.clip = Some(-1.0)),
        Box::new(|c| c.batch_size = 0),
        Box::new(|c| c.neg_sampling_num = 0),
        Box::new(|c| c.num_gc_layers = 1),
        Box::new(|c| c.dropout = 1.5),
        Box::new(|c| c.lr_decay_step = Some(0)),
        Box::new(|c| c.eval_folds = 1),
    ];
    for (i, mutate) in cases.iter().enumerate() {
        let mut c = config();
        mutate(&mut c);
        assert!(c.validate().is_err(), "case {} should fail", i);
    }
}

#[test]
fn test_save_and_load() {
    let tmp = TempDir::new().unwrap();
    let mut c = config();
    c.feature = FeatureType::Deg;
    c.method = EncoderKind::SoftAssign;
    c.clip = Some(2.0);
    let path = c.save(tmp.path().join("run")).unwrap();
    assert!(path.ends_with(CONFIG_FILE));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"feature\": \"deg\""));
    assert!(text.contains("\"method\": \"soft-assign\""));
    assert_eq!(TrainConfig::load(&path).unwrap(), c);
}

#[test]
fn test_missing_fields_take_defaults() {
    let c: TrainConfig = serde_json::from_str(r#"{"dataset": "PTC_MR", "feature": "id"}"#).unwrap();
    assert_eq!(c.dataset, "PTC_MR");
    assert_eq!(c.feature, FeatureType::Id);
    assert_eq!(c.lr, 0.001);
    assert!(serde_json::from_str::<TrainConfig>(r#"{"feature": "color"}"#).is_err());
}

#[test]
fn test_encoder_config_carries_hyperparameters() {
    let mut c = config();
    c.num_gc_layers = 4;
    c.bn = false;
    let e = c.encoder_config(7, 30);
    assert_eq!((e.input_dim, e.max_num_nodes, e.num_layers), (7, 30, 4));
    assert!(!e.bn);
    assert_eq!(e.concat_dim(), 50 * 3 + 100);
}


#[test]
fn test_node_input_switches() {
    let mut c = config();
    assert_eq!(c.node_inputs(), NodeInputs::default());
    c.node_attrs = false;
    let inputs = c.node_inputs();
    assert!(inputs.labels && !inputs.attributes);

    let c: TrainConfig = serde_json::from_str(r#"{"dataset": "MUTAG", "node_labels": false}"#).unwrap();
    assert!(!c.node_labels && c.node_attrs);
}
