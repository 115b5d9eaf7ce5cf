//! Random subsampling of treebank files.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use tracing::info;

use crate::DEFAULT_SEED;

#[derive(Args)]
pub struct DownsampleArgs {
    /// Directory with `.conllu` files to sample from.
    pub input: PathBuf,

    /// Directory that receives the sampled files.
    pub output: PathBuf,

    /// Fraction of sentences to keep per file.
    #[arg(short, long, default_value_t = 0.5)]
    pub fraction: f64,

    /// Sampling seed.
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

/// Sample every training and development file of a treebank directory.
///
/// Test files are copied through untouched so that evaluation always
/// happens on the full held-out data. Sampled sentence blocks are
/// copied verbatim, `#` comment lines included; the augmentation
/// pipeline by contrast drops comments on read.
pub fn run(args: &DownsampleArgs) -> anyhow::Result<()> {
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Cannot create {}", args.output.display()))?;

    let mut rng = StdRng::seed_from_u64(args.seed);

    for entry in fs::read_dir(&args.input)
        .with_context(|| format!("Cannot read {}", args.input.display()))?
    {
        let path = entry?.path();
        let name = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) if name.ends_with(".conllu") => name.to_owned(),
            _ => continue,
        };
        let target = args.output.join(&name);

        if name.contains("test") {
            fs::copy(&path, &target)
                .with_context(|| format!("Cannot copy {}", path.display()))?;
            info!(file = name.as_str(), "copied test file unchanged");
            continue;
        }

        let kept = sample_file(&path, &target, args.fraction, &mut rng)?;
        info!(file = name.as_str(), sentences = kept, "sampled file");
    }

    Ok(())
}

/// Keep a random `fraction` of the sentence blocks of one file, in
/// their original order.
fn sample_file(
    input: &Path,
    output: &Path,
    fraction: f64,
    rng: &mut StdRng,
) -> anyhow::Result<usize> {
    let text =
        fs::read_to_string(input).with_context(|| format!("Cannot read {}", input.display()))?;
    let blocks = sentence_blocks(&text);

    let n = ((blocks.len() as f64 * fraction).round() as usize).min(blocks.len());
    let mut picked = index::sample(rng, blocks.len(), n).into_vec();
    picked.sort_unstable();

    let file =
        File::create(output).with_context(|| format!("Cannot create {}", output.display()))?;
    let mut write = BufWriter::new(file);
    for &index in &picked {
        writeln!(write, "{}\n", blocks[index].trim_end())?;
    }

    Ok(picked.len())
}

/// Split a CoNLL-U file into its blank-line separated sentence blocks.
fn sentence_blocks(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::sentence_blocks;

    #[test]
    fn blocks_are_blank_line_separated() {
        let text = "1\ta\t_\t_\t_\t_\t0\troot\t_\t_\n\n\n1\tb\t_\t_\t_\t_\t0\troot\t_\t_\n\n";
        let blocks = sentence_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("1\ta"));
        assert!(blocks[1].starts_with("1\tb"));
    }

    #[test]
    fn empty_input_has_no_blocks() {
        assert!(sentence_blocks("\n\n").is_empty());
    }
}
