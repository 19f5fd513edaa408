mod common;

use common::{cycles_and_stars, toy_dataset_dir};
use graphskip_data::datasets::Dataset;
use graphskip_data::samplers::RandomSampler;
use graphskip_data::{read_graphfile, DataLoader, FeatureType, Graph, GraphDataset, GraphFeaturizer, SkipgramSampler};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_tu_files_to_skipgram_batches() {
    let tmp = toy_dataset_dir("TOY", &cycles_and_stars(7));
    let graphs = read_graphfile(tmp.path(), "TOY", 0).unwrap();
    assert_eq!(graphs.len(), 10);
    assert_eq!(graphs[0].edges.len(), 3);
    assert_eq!(graphs[1].degrees()[0], 2);

    let dataset = GraphDataset::new(graphs);
    let featurizer = GraphFeaturizer::fit(FeatureType::Default, 0, dataset.graphs()).unwrap();
    assert_eq!(featurizer.max_num_nodes(), 7);
    assert_eq!(featurizer.feat_dim(), 2);

    let sampler = SkipgramSampler::new(3, true).unwrap();
    let mut rng = StdRng::seed_from_u64(17);
    let loader = DataLoader::new(dataset.clone(), 4, RandomSampler::seeded(false, None, 17), false, None);
    let mut seen = Vec::new();
    for batch in loader {
        let batch = batch.unwrap();
        let targets: Vec<usize> = batch.iter().map(|(i, _)| *i).collect();
        let sg = sampler.sample(&targets, &dataset, &mut rng).unwrap();

        let u = featurizer.collate(&sg.u).unwrap();
        let v = featurizer.collate(&sg.v).unwrap();
        let neg = featurizer.collate(&sg.negatives).unwrap();
        assert_eq!(u.adj.shape(), vec![targets.len(), 7, 7]);
        assert_eq!(v.num_nodes, u.num_nodes);
        assert_eq!(neg.batch_size(), targets.len() * 3);
        seen.extend(targets);
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..dataset.len()).collect::<Vec<_>>());
}

#[test]
fn test_max_nodes_filter_and_degree_features() {
    let tmp = toy_dataset_dir("TOY", &cycles_and_stars(6));
    let graphs: Vec<Graph> = read_graphfile(tmp.path(), "TOY", 4).unwrap();
    assert_eq!(graphs.len(), 4);
    let featurizer = GraphFeaturizer::fit(FeatureType::Deg, 0, &graphs).unwrap();
    let batch = featurizer.collate(&graphs).unwrap();
    assert_eq!(batch.feats.shape(), vec![4, 4, 11]);
    assert_eq!(batch.labels, vec![0, 1, 0, 1]);
}
