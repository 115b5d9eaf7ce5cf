use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use deptree::graph::DependencyTree;
use deptree_augment::config::ExperimentConfig;
use deptree_augment::engine::Augmenter;
use deptree_conllu::io::{ReadTree, Reader, WriteTree, Writer};

mod downsample;

use crate::downsample::DownsampleArgs;

/// Seed used when the experiment file does not carry one.
const DEFAULT_SEED: u64 = 1704;

#[derive(Parser)]
#[command(name = "deptree", about = "Dependency treebank augmentation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate augmented treebanks from an experiment file.
    Augment {
        /// Experiment configuration in YAML format.
        #[arg(short, long, default_value = "experiments.yaml")]
        config: PathBuf,
    },
    /// Sample a fraction of the sentences of a treebank directory.
    Downsample(DownsampleArgs),
}

/// Top-level experiment file.
#[derive(Debug, Deserialize)]
struct AppConfig {
    /// Treebank to augment.
    input: PathBuf,

    /// Directory that receives one subdirectory per experiment.
    output: PathBuf,

    /// Seed shared by all experiments.
    #[serde(default)]
    seed: Option<u64>,

    /// Experiments to run, keyed by name.
    experiments: BTreeMap<String, ExperimentConfig>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Augment { config } => augment(&config),
        Command::Downsample(args) => downsample::run(&args),
    }
}

fn augment(config_path: &Path) -> anyhow::Result<()> {
    let config = read_config(config_path)?;
    let corpus = read_corpus(&config.input)?;
    info!(
        sentences = corpus.len(),
        tokens = token_count(&corpus),
        input = %config.input.display(),
        "read corpus"
    );

    let augmenter = Augmenter::new(&corpus);
    let seed = config.seed.unwrap_or(DEFAULT_SEED);

    for (name, experiment) in &config.experiments {
        // Experiments run independently from the same seed.
        let mut rng = StdRng::seed_from_u64(seed);

        let experiment_dir = config.output.join(name);
        fs::create_dir_all(&experiment_dir)
            .with_context(|| format!("Cannot create {}", experiment_dir.display()))?;
        let out_path = experiment_dir.join("augmented.conllu");
        let file = File::create(&out_path)
            .with_context(|| format!("Cannot create {}", out_path.display()))?;
        let mut writer = Writer::new(BufWriter::new(file));

        let mut n_variants = 0;
        for tree in &corpus {
            writer.write_tree(tree)?;

            // One malformed sentence should not abort the run.
            let variants = match augmenter.augment(tree, experiment, &mut rng) {
                Ok(variants) => variants,
                Err(err) => {
                    warn!(experiment = name.as_str(), %err, "skipping sentence");
                    continue;
                }
            };
            for variant in &variants {
                writer.write_tree(variant)?;
            }
            n_variants += variants.len();
        }

        info!(
            experiment = name.as_str(),
            variants = n_variants,
            mean = mean_variants(n_variants, corpus.len()),
            output = %out_path.display(),
            "wrote augmented treebank"
        );
    }

    Ok(())
}

/// Number of tokens in a corpus, not counting the anchors.
fn token_count(corpus: &[DependencyTree]) -> usize {
    corpus.iter().map(|tree| tree.len() - 1).sum()
}

/// Mean number of generated variants per input sentence.
fn mean_variants(n_variants: usize, n_sentences: usize) -> f64 {
    if n_sentences == 0 {
        0.0
    } else {
        n_variants as f64 / n_sentences as f64
    }
}

fn read_config(path: &Path) -> anyhow::Result<AppConfig> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    serde_yaml::from_reader(file).with_context(|| format!("Cannot parse {}", path.display()))
}

fn read_corpus(path: &Path) -> anyhow::Result<Vec<DependencyTree>> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let reader = Reader::new(BufReader::new(file));
    let mut corpus = Vec::new();
    for tree in reader.trees() {
        corpus.push(tree?);
    }
    Ok(corpus)
}
