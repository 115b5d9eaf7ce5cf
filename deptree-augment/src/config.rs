//! Per-experiment configuration surface.

use serde::Deserialize;

/// Rotation settings.
#[derive(Clone, Debug, Deserialize)]
pub struct RotateConfig {
    /// Number of reorderings to keep per sentence.
    #[serde(default = "default_rotate_n")]
    pub n: usize,

    /// Rank candidates by positional plausibility instead of sampling
    /// uniformly.
    #[serde(default)]
    pub informed: bool,

    /// Cap on the candidate pool per sentence.
    #[serde(default = "default_max_rotations")]
    pub max_rotations: usize,

    /// Relation labels whose chunks may move. `None` selects the
    /// built-in flexible set.
    #[serde(default)]
    pub flexible: Option<Vec<String>>,
}

impl Default for RotateConfig {
    fn default() -> Self {
        RotateConfig {
            n: default_rotate_n(),
            informed: false,
            max_rotations: default_max_rotations(),
            flexible: None,
        }
    }
}

/// Crop settings.
#[derive(Clone, Debug, Deserialize)]
pub struct CropConfig {
    /// Only chunks attached with one of these relations are dropped.
    /// `None` allows every non-root chunk.
    #[serde(default)]
    pub relations: Option<Vec<String>>,

    /// Independent deletion probability per eligible chunk.
    #[serde(default = "default_p")]
    pub p: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        CropConfig {
            relations: None,
            p: default_p(),
        }
    }
}

/// Nonce-substitution settings.
#[derive(Clone, Debug, Deserialize)]
pub struct NonceConfig {
    /// Independent substitution probability per chunk.
    #[serde(default = "default_p")]
    pub p: f64,

    /// Restrict the pool to bundles with a matching fine-grained tag.
    #[serde(default)]
    pub strict: bool,
}

impl Default for NonceConfig {
    fn default() -> Self {
        NonceConfig {
            p: default_p(),
            strict: false,
        }
    }
}

/// One experiment. An absent family key disables that family.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default)]
    pub rotate: Option<RotateConfig>,

    #[serde(default)]
    pub crop: Option<CropConfig>,

    #[serde(default)]
    pub nonce: Option<NonceConfig>,
}

fn default_rotate_n() -> usize {
    3
}

fn default_max_rotations() -> usize {
    100
}

fn default_p() -> f64 {
    0.5
}
