//! graphskip CLI - train skip-gram graph embeddings on TU benchmarks.
//!
//! # Usage
//!
//! ```bash
//! # Train the plain GCN encoder on MUTAG, logging every 10 epochs
//! graphskip train --DS MUTAG --epochs 200 --log-interval 10 --logdir runs/mutag
//!
//! # Hierarchical pooling encoder on degree features
//! graphskip train --DS PROTEINS --method soft-assign --feature deg --max-num-nodes 100
//!
//! # Node and class counts of a dataset
//! graphskip stats --DS MUTAG
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use graphskip::{load_datasets, EncoderKind, Trainer, TrainConfig};
use graphskip_data::{read_graphfile, FeatureType, GraphDataset};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "graphskip")]
#[command(about = "Skip-gram graph embeddings with GCN encoders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an embedding model and evaluate it periodically
    Train(TrainArgs),

    /// Show statistics about a dataset
    Stats {
        /// Directory holding the TU datasets
        #[arg(long, default_value = "data")]
        datadir: PathBuf,

        /// Dataset name
        #[arg(long = "DS")]
        dataset: String,

        /// Drop graphs with more nodes (0 keeps all)
        #[arg(long, default_value_t = 0)]
        max_num_nodes: usize,
    },
}

#[derive(Args)]
struct TrainArgs {
    /// Directory holding the TU datasets
    #[arg(long, default_value = "data")]
    datadir: PathBuf,

    /// Dataset name
    #[arg(long = "DS")]
    dataset: String,

    /// Drop graphs with more nodes and pad batches to this size (0 = dataset maximum)
    #[arg(long, default_value_t = 0)]
    max_num_nodes: usize,

    /// Node features: default, id or deg
    #[arg(long, default_value = "default")]
    feature: FeatureType,

    /// Do not use node labels as default features
    #[arg(long)]
    no_node_labels: bool,

    /// Do not use node attributes as default features
    #[arg(long)]
    no_node_attr: bool,

    #[arg(long, default_value_t = 0.001)]
    lr: f32,

    /// Clip the gradient norm to this value
    #[arg(long)]
    clip: Option<f32>,

    #[arg(long, default_value_t = 20)]
    batch_size: usize,

    #[arg(long, default_value_t = 100_000)]
    epochs: usize,

    /// Epochs between loss reports and evaluations
    #[arg(long, default_value_t = 100)]
    log_interval: usize,

    #[arg(long, default_value_t = 50)]
    hidden_dim: usize,

    #[arg(long, default_value_t = 100)]
    embedding_dim: usize,

    #[arg(long, default_value_t = 3)]
    num_gc_layers: usize,

    /// Disable batch normalization
    #[arg(long)]
    nobn: bool,

    /// Disable the convolution bias
    #[arg(long)]
    nobias: bool,

    #[arg(long, default_value_t = 0.0)]
    dropout: f32,

    /// Encoder: base, base-set2set or soft-assign
    #[arg(long, default_value = "base")]
    method: EncoderKind,

    #[arg(long, default_value_t = 20)]
    neg_sampling_num: usize,

    /// Use a random node permutation of the target as its context
    #[arg(long)]
    permutate: bool,

    /// Also train on the extension datasets of --DS
    #[arg(long)]
    extend: bool,

    /// Where to write config.json and embedding dumps
    #[arg(long)]
    logdir: Option<PathBuf>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Set2Set processing steps
    #[arg(long, default_value_t = 3)]
    s2s_steps: usize,

    /// Soft-assign pooling levels
    #[arg(long, default_value_t = 1)]
    num_pool: usize,

    /// Soft-assign clusters as a fraction of the padded node count
    #[arg(long, default_value_t = 0.25)]
    assign_ratio: f32,

    /// Epochs between learning rate decays
    #[arg(long)]
    lr_decay_step: Option<usize>,

    #[arg(long, default_value_t = 0.1)]
    lr_decay_gamma: f32,
}

impl From<TrainArgs> for TrainConfig {
    fn from(args: TrainArgs) -> Self {
        TrainConfig {
            datadir: args.datadir,
            dataset: args.dataset,
            max_num_nodes: args.max_num_nodes,
            feature: args.feature,
            node_labels: !args.no_node_labels,
            node_attrs: !args.no_node_attr,
            lr: args.lr,
            clip: args.clip,
            batch_size: args.batch_size,
            epochs: args.epochs,
            log_interval: args.log_interval,
            hidden_dim: args.hidden_dim,
            embedding_dim: args.embedding_dim,
            num_gc_layers: args.num_gc_layers,
            bn: !args.nobn,
            bias: !args.nobias,
            dropout: args.dropout,
            method: args.method,
            neg_sampling_num: args.neg_sampling_num,
            permutate: args.permutate,
            extend: args.extend,
            logdir: args.logdir,
            seed: args.seed,
            s2s_steps: args.s2s_steps,
            num_pool: args.num_pool,
            assign_ratio: args.assign_ratio,
            lr_decay_step: args.lr_decay_step,
            lr_decay_gamma: args.lr_decay_gamma,
            ..TrainConfig::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => cmd_train(args.into()),
        Commands::Stats {
            datadir,
            dataset,
            max_num_nodes,
        } => cmd_stats(datadir, &dataset, max_num_nodes),
    }
}

fn cmd_train(config: TrainConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let (train_set, eval_set) = load_datasets(&config)
        .with_context(|| format!("Failed to load {} from {}", config.dataset, config.datadir.display()))?;
    let mut trainer = Trainer::new(config, train_set, eval_set)?;
    let summaries = trainer.train()?;

    let best = summaries
        .iter()
        .filter_map(|s| s.eval.as_ref().map(|e| (s.epoch, e.mean_accuracy)))
        .max_by(|a, b| a.1.total_cmp(&b.1));
    match (summaries.last(), best) {
        (Some(last), Some((epoch, acc))) => println!(
            "Final loss {:.6} after {} epochs; best accuracy {:.4} at epoch {}",
            last.mean_loss, last.epoch, acc, epoch
        ),
        (Some(last), None) => println!("Final loss {:.6} after {} epochs", last.mean_loss, last.epoch),
        _ => {}
    }
    Ok(())
}

fn cmd_stats(datadir: PathBuf, dataset: &str, max_num_nodes: usize) -> Result<()> {
    let graphs = read_graphfile(&datadir, dataset, max_num_nodes)
        .with_context(|| format!("Failed to load {} from {}", dataset, datadir.display()))?;
    let data = GraphDataset::new(graphs);
    info!("Loaded {} graphs", data.graphs().len());

    let nodes: Vec<usize> = data.graphs().iter().map(|g| g.num_nodes).collect();
    let edges: usize = data.graphs().iter().map(|g| g.edges.len()).sum();
    let total_nodes: usize = nodes.iter().sum();
    let count = nodes.len().max(1) as f64;

    println!("Dataset {}", dataset);
    println!("==========================");
    println!("Graphs:        {}", nodes.len());
    println!("Classes:       {}", data.num_classes());
    println!("Avg nodes:     {:.2}", total_nodes as f64 / count);
    println!("Max nodes:     {}", nodes.iter().max().copied().unwrap_or(0));
    println!("Avg edges:     {:.2}", edges as f64 / count);
    let labels = data.labels();
    for class in 0..data.num_classes() {
        let n = labels.iter().filter(|l| **l == class).count();
        println!("  class {:<6} {}", class, n);
    }
    Ok(())
}
