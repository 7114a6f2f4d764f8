//! Error type shared by every terrain generator

/// Errors raised when a generator is handed parameters it cannot honour
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// Resolution with a zero axis
    #[error("invalid resolution {x}x{y}: both axes must be at least 1")]
    InvalidResolution { x: usize, y: usize },

    /// Nested rows of differing lengths
    #[error("row {row} has {found} samples, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Bound that is empty, inverted, or not finite
    #[error("invalid bound ({xmin}, {xmax}, {ymin}, {ymax}): expected xmin < xmax and ymin < ymax")]
    InvalidBound {
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
    },

    /// Patch counts that leave a patch without any cell
    #[error("cannot split a {resolution_x}x{resolution_y} grid into {patches_x}x{patches_y} patches")]
    InvalidPatchGrid {
        resolution_x: usize,
        resolution_y: usize,
        patches_x: usize,
        patches_y: usize,
    },

    /// Negative or NaN maximum height difference between patches
    #[error("max height difference must be a non-negative number, got {0}")]
    InvalidHeightDiff(f64),

    /// Patch compositor called without any recipe to choose from
    #[error("terrain catalog is empty")]
    EmptyCatalog,

    /// Height field too small to triangulate
    #[error("mesh needs at least 2x2 samples, got {rows}x{cols}")]
    DegenerateMesh { rows: usize, cols: usize },

    /// Obstacle size range with min above max on some axis
    #[error("obstacle size range is inverted on axis {axis}: min {min} > max {max}")]
    InvalidObstacleSize { axis: usize, min: f64, max: f64 },

    /// Failure while writing an export file
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias for terrain operations
pub type Result<T> = std::result::Result<T, TerrainError>;
