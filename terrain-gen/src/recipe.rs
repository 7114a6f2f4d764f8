//! Terrain recipes: the parameter sets that describe one terrain primitive
//!
//! Recipes are closed enums with every field present. Defaults are applied by
//! the constructors here (or by the manifest layer that builds them), so
//! rendering code never has to guess a missing value.

use rand::Rng;
use rand::seq::IndexedRandom;
use std::ops::Range;

use crate::field::Resolution;

/// Resolved axis a stairs or ramp climbs along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    X,
    Y,
    Diagonal,
}

/// Requested climb direction, possibly left to chance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    X,
    Y,
    Diagonal,
    /// Picked once per patch or section when the recipe is placed
    Random,
}

impl Direction {
    /// Parse `x`, `y`, `diagonal` or `random`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "x" => Some(Direction::X),
            "y" => Some(Direction::Y),
            "diagonal" | "xy" => Some(Direction::Diagonal),
            "random" => Some(Direction::Random),
            _ => None,
        }
    }

    /// Parse a direction, falling back to `X` for unknown names
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!("Unknown direction {:?}, falling back to x", name);
            Direction::X
        })
    }

    /// Resolve for stairs, which climb along X or Y only
    pub fn resolve_stairs<R: Rng + ?Sized>(self, rng: &mut R) -> Orientation {
        self.resolve(&[Orientation::X, Orientation::Y], rng)
    }

    /// Resolve for ramps, which may also climb diagonally
    pub fn resolve_ramp<R: Rng + ?Sized>(self, rng: &mut R) -> Orientation {
        self.resolve(
            &[Orientation::X, Orientation::Y, Orientation::Diagonal],
            rng,
        )
    }

    fn resolve<R: Rng + ?Sized>(self, choices: &[Orientation], rng: &mut R) -> Orientation {
        match self {
            Direction::X => Orientation::X,
            Direction::Y => Orientation::Y,
            Direction::Diagonal => Orientation::Diagonal,
            Direction::Random => *choices.choose(rng).unwrap_or(&Orientation::X),
        }
    }
}

/// Ramp profile along its climb axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlopeType {
    #[default]
    Linear,
    Quadratic,
    /// Half a sine period, flat at both ends
    Sinusoidal,
}

impl SlopeType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linear" => Some(SlopeType::Linear),
            "quadratic" => Some(SlopeType::Quadratic),
            "sinusoidal" | "sine" => Some(SlopeType::Sinusoidal),
            _ => None,
        }
    }

    /// Parse a slope type, falling back to `Linear` for unknown names
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!("Unknown slope type {:?}, falling back to linear", name);
            SlopeType::Linear
        })
    }

    /// Height reached at `progress` in `[0, 1]` for a ramp of `height`
    #[inline]
    pub fn apply(self, progress: f64, height: f64) -> f64 {
        match self {
            SlopeType::Linear => progress * height,
            SlopeType::Quadratic => progress * progress * height,
            SlopeType::Sinusoidal => {
                ((progress * std::f64::consts::PI - std::f64::consts::FRAC_PI_2).sin() + 1.0) / 2.0
                    * height
            }
        }
    }
}

/// Tag of a recipe, as written in manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeKind {
    Flat,
    Stairs,
    Ramp,
    Noise,
}

impl RecipeKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "flat" => Some(RecipeKind::Flat),
            "stairs" => Some(RecipeKind::Stairs),
            "ramp" => Some(RecipeKind::Ramp),
            "noise" | "noisy" => Some(RecipeKind::Noise),
            _ => None,
        }
    }

    /// Parse a recipe tag, falling back to `Flat` for unknown names
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!("Unknown terrain type {:?}, falling back to flat", name);
            RecipeKind::Flat
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            RecipeKind::Flat => "flat",
            RecipeKind::Stairs => "stairs",
            RecipeKind::Ramp => "ramp",
            RecipeKind::Noise => "noise",
        }
    }
}

/// Parameters for one terrain primitive
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainRecipe {
    Flat {
        base_height: f64,
    },
    Stairs {
        step_height: f64,
        steps: u32,
        direction: Direction,
    },
    Ramp {
        height: f64,
        direction: Direction,
        slope_type: SlopeType,
    },
    Noise {
        base_height: f64,
        amplitude: f64,
        scale: f64,
        seed: Option<u64>,
    },
}

impl TerrainRecipe {
    pub const DEFAULT_STEP_HEIGHT: f64 = 0.2;
    pub const DEFAULT_STEPS: u32 = 5;
    pub const DEFAULT_RAMP_HEIGHT: f64 = 1.0;
    pub const DEFAULT_NOISE_AMPLITUDE: f64 = 0.5;
    pub const DEFAULT_NOISE_SCALE: f64 = 0.1;

    /// Flat ground at `base_height`
    pub fn flat(base_height: f64) -> Self {
        TerrainRecipe::Flat { base_height }
    }

    /// Stairs climbing along `direction`
    pub fn stairs(step_height: f64, steps: u32, direction: Direction) -> Self {
        TerrainRecipe::Stairs {
            step_height,
            steps,
            direction,
        }
    }

    /// Ramp rising to `height`
    pub fn ramp(height: f64, direction: Direction, slope_type: SlopeType) -> Self {
        TerrainRecipe::Ramp {
            height,
            direction,
            slope_type,
        }
    }

    /// Noisy ground around `base_height`
    pub fn noise(base_height: f64, amplitude: f64, scale: f64, seed: Option<u64>) -> Self {
        TerrainRecipe::Noise {
            base_height,
            amplitude,
            scale,
            seed,
        }
    }

    /// Recipe of `kind` with every parameter at its default
    pub fn with_defaults(kind: RecipeKind) -> Self {
        match kind {
            RecipeKind::Flat => Self::flat(0.0),
            RecipeKind::Stairs => {
                Self::stairs(Self::DEFAULT_STEP_HEIGHT, Self::DEFAULT_STEPS, Direction::X)
            }
            RecipeKind::Ramp => {
                Self::ramp(Self::DEFAULT_RAMP_HEIGHT, Direction::X, SlopeType::Linear)
            }
            RecipeKind::Noise => Self::noise(
                0.0,
                Self::DEFAULT_NOISE_AMPLITUDE,
                Self::DEFAULT_NOISE_SCALE,
                None,
            ),
        }
    }

    pub fn kind(&self) -> RecipeKind {
        match self {
            TerrainRecipe::Flat { .. } => RecipeKind::Flat,
            TerrainRecipe::Stairs { .. } => RecipeKind::Stairs,
            TerrainRecipe::Ramp { .. } => RecipeKind::Ramp,
            TerrainRecipe::Noise { .. } => RecipeKind::Noise,
        }
    }
}

/// A recipe placed on a fractional sub-rectangle of the terrain
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub recipe: TerrainRecipe,
    pub start_x: f64,
    pub end_x: f64,
    pub start_y: f64,
    pub end_y: f64,
}

impl Section {
    /// Place `recipe` over `x` and `y` fractions of the domain
    pub fn new(recipe: TerrainRecipe, x: (f64, f64), y: (f64, f64)) -> Self {
        Self {
            recipe,
            start_x: x.0,
            end_x: x.1,
            start_y: y.0,
            end_y: y.1,
        }
    }

    /// Absolute index ranges covered at `resolution`, `None` when empty
    pub fn index_ranges(&self, resolution: Resolution) -> Option<(Range<usize>, Range<usize>)> {
        let xs = fraction_range(self.start_x, self.end_x, resolution.x());
        let ys = fraction_range(self.start_y, self.end_y, resolution.y());
        if xs.is_empty() || ys.is_empty() {
            return None;
        }
        Some((xs, ys))
    }

    /// Top-left index and sub-resolution of the section block
    pub fn placement(&self, resolution: Resolution) -> Option<(usize, usize, Resolution)> {
        let (xs, ys) = self.index_ranges(resolution)?;
        let sub = Resolution::new(xs.len(), ys.len()).ok()?;
        Some((xs.start, ys.start, sub))
    }
}

fn fraction_range(start: f64, end: f64, cells: usize) -> Range<usize> {
    let to_index = |f: f64| (f.clamp(0.0, 1.0) * cells as f64).floor() as usize;
    to_index(start)..to_index(end)
}

/// Four equal strips along x: flat, stairs, ramp, then noise
pub fn default_sections() -> Vec<Section> {
    vec![
        Section::new(TerrainRecipe::flat(0.0), (0.0, 0.25), (0.0, 1.0)),
        Section::new(
            TerrainRecipe::stairs(0.2, 5, Direction::X),
            (0.25, 0.5),
            (0.0, 1.0),
        ),
        Section::new(
            TerrainRecipe::ramp(1.0, Direction::X, SlopeType::Linear),
            (0.5, 0.75),
            (0.0, 1.0),
        ),
        Section::new(
            TerrainRecipe::noise(1.0, 0.3, 0.2, None),
            (0.75, 1.0),
            (0.0, 1.0),
        ),
    ]
}

/// Catalog used by the patch compositor when none is configured
pub fn default_catalog() -> Vec<TerrainRecipe> {
    vec![
        TerrainRecipe::flat(0.0),
        TerrainRecipe::stairs(0.15, 3, Direction::Random),
        TerrainRecipe::ramp(0.3, Direction::Random, SlopeType::Linear),
        TerrainRecipe::noise(0.0, 0.2, 0.1, None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn test_unknown_names_fall_back() {
        assert_eq!(Direction::from_name_or_default("sideways"), Direction::X);
        assert_eq!(SlopeType::from_name_or_default("cubic"), SlopeType::Linear);
        assert_eq!(RecipeKind::from_name_or_default("lava"), RecipeKind::Flat);
        assert_eq!(Direction::from_name_or_default("Diagonal"), Direction::Diagonal);
    }

    #[test]
    fn test_random_direction_resolves_to_valid_axes() {
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        for _ in 0..50 {
            let stairs = Direction::Random.resolve_stairs(&mut rng);
            assert!(matches!(stairs, Orientation::X | Orientation::Y));
        }
        let seen_diagonal = (0..200)
            .any(|_| Direction::Random.resolve_ramp(&mut rng) == Orientation::Diagonal);
        assert!(seen_diagonal);
    }

    #[test]
    fn test_fixed_direction_ignores_rng() {
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        assert_eq!(Direction::Y.resolve_ramp(&mut rng), Orientation::Y);
        assert_eq!(Direction::Diagonal.resolve_ramp(&mut rng), Orientation::Diagonal);
    }

    #[test]
    fn test_slope_profiles() {
        assert_eq!(SlopeType::Linear.apply(0.5, 2.0), 1.0);
        assert_eq!(SlopeType::Quadratic.apply(0.5, 2.0), 0.5);
        assert!(SlopeType::Sinusoidal.apply(0.0, 2.0).abs() < 1e-12);
        assert!((SlopeType::Sinusoidal.apply(0.5, 2.0) - 1.0).abs() < 1e-12);
        assert!((SlopeType::Sinusoidal.apply(1.0, 2.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_section_ranges_floor_and_skip_degenerate() {
        let res = Resolution::new(10, 10).unwrap();
        let section = Section::new(TerrainRecipe::flat(0.0), (0.25, 0.75), (0.0, 1.0));
        assert_eq!(section.index_ranges(res), Some((2..7, 0..10)));

        let thin = Section::new(TerrainRecipe::flat(0.0), (0.31, 0.39), (0.0, 1.0));
        assert_eq!(thin.index_ranges(res), None);

        let inverted = Section::new(TerrainRecipe::flat(0.0), (0.8, 0.2), (0.0, 1.0));
        assert_eq!(inverted.index_ranges(res), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_sections().len(), 4);
        let kinds: Vec<_> = default_catalog().iter().map(TerrainRecipe::kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecipeKind::Flat,
                RecipeKind::Stairs,
                RecipeKind::Ramp,
                RecipeKind::Noise
            ]
        );
        assert_eq!(
            TerrainRecipe::with_defaults(RecipeKind::Stairs),
            TerrainRecipe::stairs(0.2, 5, Direction::X)
        );
    }
}
