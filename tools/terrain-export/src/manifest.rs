//! terrain.toml manifest parsing
//!
//! The manifest is deliberately loose: every recipe field is optional and
//! names are plain strings. Conversion into library types fills in defaults
//! once and falls back (with a warning) on names it does not recognise.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use terrain_gen::confined::ConfinedConfig;
use terrain_gen::{
    BoundarySampling, Direction, NoiseKind, PatchConfig, RecipeKind, Resolution, Section,
    SlopeType, TerrainRecipe, default_catalog,
};

/// terrain.toml manifest structure
#[derive(Debug, Deserialize)]
pub struct TerrainManifest {
    /// Seed for the whole build; fresh entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Noise algorithm: perlin, simplex or white
    #[serde(default = "default_noise")]
    pub noise: String,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default, rename = "terrain")]
    pub terrains: Vec<TerrainEntry>,
}

fn default_noise() -> String {
    "perlin".to_string()
}

/// Output settings
#[derive(Debug, Deserialize)]
pub struct OutputSection {
    /// Directory generated files are written to
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Also write a 16-bit PNG of each height field
    #[serde(default)]
    pub png: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("terrain")
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            png: false,
        }
    }
}

/// One terrain to generate
#[derive(Debug, Clone, Deserialize)]
pub struct TerrainEntry {
    pub name: String,

    /// Recipe fields plus `type`, which may also be `combined`, `patches`,
    /// `confined` or `confined_boxes`
    #[serde(flatten)]
    pub recipe: RecipeSpec,

    /// Physical `(width, length)`
    #[serde(default = "default_size")]
    pub size: [f64; 2],

    /// Centre of the terrain
    #[serde(default)]
    pub position: [f64; 2],

    #[serde(default = "default_resolution")]
    pub resolution: [usize; 2],

    /// Sections for `combined`; the stock four-way split when empty
    #[serde(default)]
    pub sections: Vec<SectionSpec>,

    /// Settings for `patches`
    #[serde(default)]
    pub patches: PatchSpec,

    /// Settings for `confined` and `confined_boxes`
    #[serde(default)]
    pub confined: ConfinedSpec,
}

fn default_size() -> [f64; 2] {
    [10.0, 10.0]
}

fn default_resolution() -> [usize; 2] {
    [100, 100]
}

impl TerrainEntry {
    /// An entry of the given type with every other field defaulted
    pub fn with_type(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            recipe: RecipeSpec::of_type(kind),
            size: default_size(),
            position: [0.0, 0.0],
            resolution: default_resolution(),
            sections: Vec::new(),
            patches: PatchSpec::default(),
            confined: ConfinedSpec::default(),
        }
    }

    /// Lowercased entry type
    pub fn kind(&self) -> String {
        self.recipe.kind.trim().to_ascii_lowercase()
    }
}

/// Loose recipe description; unset fields take the recipe defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub base_height: Option<f64>,
    pub step_height: Option<f64>,
    pub steps: Option<u32>,
    pub height: Option<f64>,
    pub direction: Option<String>,
    pub slope_type: Option<String>,
    pub amplitude: Option<f64>,
    pub scale: Option<f64>,
    pub seed: Option<u64>,
}

impl RecipeSpec {
    pub fn of_type(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Self::default()
        }
    }

    /// Build a recipe, filling unset fields with defaults
    ///
    /// Unknown types fall back to flat ground, unknown directions to x and
    /// unknown slope types to linear.
    pub fn to_recipe(&self) -> TerrainRecipe {
        let kind = RecipeKind::from_name_or_default(&self.kind);

        match TerrainRecipe::with_defaults(kind) {
            TerrainRecipe::Flat { base_height } => {
                TerrainRecipe::flat(self.base_height.unwrap_or(base_height))
            }
            TerrainRecipe::Stairs {
                step_height,
                steps,
                direction,
            } => TerrainRecipe::stairs(
                self.step_height.unwrap_or(step_height),
                self.steps.unwrap_or(steps),
                self.direction_or(direction),
            ),
            TerrainRecipe::Ramp {
                height,
                direction,
                slope_type,
            } => TerrainRecipe::ramp(
                self.height.unwrap_or(height),
                self.direction_or(direction),
                self.slope_type
                    .as_deref()
                    .map(SlopeType::from_name_or_default)
                    .unwrap_or(slope_type),
            ),
            TerrainRecipe::Noise {
                base_height,
                amplitude,
                scale,
                seed,
            } => TerrainRecipe::noise(
                self.base_height.unwrap_or(base_height),
                self.amplitude.unwrap_or(amplitude),
                self.scale.unwrap_or(scale),
                self.seed.or(seed),
            ),
        }
    }

    fn direction_or(&self, fallback: Direction) -> Direction {
        self.direction
            .as_deref()
            .map(Direction::from_name_or_default)
            .unwrap_or(fallback)
    }
}

/// A recipe laid over fractions of the domain
#[derive(Debug, Clone, Deserialize)]
pub struct SectionSpec {
    #[serde(flatten)]
    pub recipe: RecipeSpec,
    /// Fractional `(start, end)` along x
    #[serde(default = "full_span")]
    pub x: [f64; 2],
    /// Fractional `(start, end)` along y
    #[serde(default = "full_span")]
    pub y: [f64; 2],
}

fn full_span() -> [f64; 2] {
    [0.0, 1.0]
}

impl SectionSpec {
    pub fn to_section(&self) -> Section {
        Section::new(
            self.recipe.to_recipe(),
            (self.x[0], self.x[1]),
            (self.y[0], self.y[1]),
        )
    }
}

/// Patch compositor settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchSpec {
    pub num_patches: Option<[usize; 2]>,
    pub padding_ratio: Option<f64>,
    pub transition_smoothness: Option<f64>,
    pub max_height_diff: Option<f64>,
    /// `neighbor` or `mirror`
    pub sampling: Option<String>,
    /// Recipes to draw from; the stock catalog when empty
    #[serde(default)]
    pub catalog: Vec<RecipeSpec>,
}

impl PatchSpec {
    pub fn to_config(&self, noise: NoiseKind) -> PatchConfig {
        let defaults = PatchConfig::default();
        let sampling = match self.sampling.as_deref() {
            Some(name) => BoundarySampling::from_name(name).unwrap_or_else(|| {
                tracing::warn!("Unknown boundary sampling {:?}, using neighbor", name);
                BoundarySampling::Neighbor
            }),
            None => defaults.sampling,
        };
        let catalog = if self.catalog.is_empty() {
            default_catalog()
        } else {
            self.catalog.iter().map(RecipeSpec::to_recipe).collect()
        };

        PatchConfig {
            num_patches: self
                .num_patches
                .map(|[nx, ny]| (nx, ny))
                .unwrap_or(defaults.num_patches),
            catalog,
            padding_ratio: self.padding_ratio.unwrap_or(defaults.padding_ratio),
            transition_smoothness: self
                .transition_smoothness
                .unwrap_or(defaults.transition_smoothness),
            max_height_diff: self.max_height_diff.unwrap_or(defaults.max_height_diff),
            sampling,
            noise,
        }
    }
}

/// Confined terrain settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfinedSpec {
    pub layer_distance: Option<f64>,
    pub ground_height: Option<f64>,
    pub ceiling_height: Option<f64>,
    pub obstacle_count: Option<usize>,
    pub min_obstacle_size: Option<[f64; 3]>,
    pub max_obstacle_size: Option<[f64; 3]>,
}

impl ConfinedSpec {
    pub fn to_config(&self, resolution: Resolution) -> ConfinedConfig {
        let defaults = ConfinedConfig::default();
        ConfinedConfig {
            resolution,
            layer_distance: self.layer_distance.unwrap_or(defaults.layer_distance),
            ground_height: self.ground_height.unwrap_or(defaults.ground_height),
            ceiling_height: self.ceiling_height,
            obstacle_count: self.obstacle_count.unwrap_or(defaults.obstacle_count),
            min_obstacle_size: self
                .min_obstacle_size
                .unwrap_or(defaults.min_obstacle_size),
            max_obstacle_size: self
                .max_obstacle_size
                .unwrap_or(defaults.max_obstacle_size),
        }
    }
}

impl TerrainManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse terrain.toml")
    }

    /// Noise kind, falling back to perlin for unknown names
    pub fn noise_kind(&self) -> NoiseKind {
        NoiseKind::from_name(&self.noise).unwrap_or_else(|| {
            tracing::warn!("Unknown noise kind {:?}, using perlin", self.noise);
            NoiseKind::Perlin
        })
    }
}
