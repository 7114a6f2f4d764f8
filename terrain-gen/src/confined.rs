//! Confined terrain: a ground layer and a ceiling layer with obstacles between
//!
//! Two flavours are supported. [`surface_obstacles`] carves obstacles into
//! the surfaces themselves by raising blocks of ground or lowering blocks of
//! ceiling. [`generate_with_boxes`] keeps both surfaces intact and scatters
//! free-standing boxes that rest on the ground or hang from the ceiling.

use glam::Vec3;
use rand::Rng;

use crate::error::{Result, TerrainError};
use crate::field::{Bound, HeightField, Resolution};
use crate::mesh::GridMesh;

/// Settings shared by both confined generators
#[derive(Debug, Clone, PartialEq)]
pub struct ConfinedConfig {
    pub resolution: Resolution,
    /// Gap between ground and ceiling when no explicit ceiling is given
    pub layer_distance: f64,
    pub ground_height: f64,
    pub ceiling_height: Option<f64>,
    pub obstacle_count: usize,
    /// Smallest `(width, length, height)` of an obstacle
    pub min_obstacle_size: [f64; 3],
    /// Largest `(width, length, height)` of an obstacle
    pub max_obstacle_size: [f64; 3],
}

impl Default for ConfinedConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::at_least_one(50, 50),
            layer_distance: 2.0,
            ground_height: 0.0,
            ceiling_height: None,
            obstacle_count: 10,
            min_obstacle_size: [0.5, 0.5, 0.5],
            max_obstacle_size: [2.0, 2.0, 1.5],
        }
    }
}

impl ConfinedConfig {
    /// Ceiling height, defaulting to `ground_height + layer_distance`
    pub fn ceiling(&self) -> f64 {
        self.ceiling_height
            .unwrap_or(self.ground_height + self.layer_distance)
    }

    pub fn validate(&self) -> Result<()> {
        validate_sizes(self.min_obstacle_size, self.max_obstacle_size)
    }
}

fn validate_sizes(min: [f64; 3], max: [f64; 3]) -> Result<()> {
    for axis in 0..3 {
        let (lo, hi) = (min[axis], max[axis]);
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(TerrainError::InvalidObstacleSize {
                axis,
                min: lo,
                max: hi,
            });
        }
    }
    Ok(())
}

/// Which surface an obstacle is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Ground,
    Ceiling,
}

/// An obstacle's extent in world space
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub center: [f64; 3],
    /// `(width, length, height)`
    pub size: [f64; 3],
    pub anchor: Anchor,
}

impl Obstacle {
    pub fn mesh(&self) -> GridMesh {
        let [cx, cy, cz] = self.center;
        let [w, l, h] = self.size;
        GridMesh::cuboid(
            Vec3::new(cx as f32, cy as f32, cz as f32),
            Vec3::new(w as f32, l as f32, h as f32),
        )
    }
}

/// Ground and ceiling surfaces with the obstacles placed between them
#[derive(Debug, Clone)]
pub struct ConfinedTerrain {
    pub ground: HeightField,
    pub ceiling: HeightField,
    pub bound: Bound,
    /// Obstacles carved into the surfaces
    pub obstacles: Vec<Obstacle>,
    /// Free-standing boxes
    pub boxes: Vec<Obstacle>,
}

impl ConfinedTerrain {
    /// One mesh holding the ground, the ceiling and every box
    ///
    /// The ground faces up and the ceiling faces down, so both point into
    /// the space between them.
    pub fn to_mesh(&self) -> Result<GridMesh> {
        let mut mesh = GridMesh::from_heights(&self.ground, &self.bound)?;
        mesh.flip_winding();

        let ceiling = GridMesh::from_heights(&self.ceiling, &self.bound)?;
        mesh.append(&ceiling);

        for obstacle in &self.boxes {
            mesh.append(&obstacle.mesh());
        }
        Ok(mesh)
    }
}

/// Uniform draw on `[lo, hi)`, or the midpoint when the range is empty
fn draw_between<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if lo < hi {
        rng.random_range(lo..hi)
    } else {
        (lo + hi) / 2.0
    }
}

fn draw_size<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    rng.random_range(min..=max)
}

/// Random obstacle centre, inset so the largest obstacle stays inside
fn draw_center<R: Rng + ?Sized>(rng: &mut R, bound: &Bound, max_size: [f64; 3]) -> (f64, f64) {
    let x = draw_between(
        rng,
        bound.xmin + max_size[0] / 2.0,
        bound.xmax - max_size[0] / 2.0,
    );
    let y = draw_between(
        rng,
        bound.ymin + max_size[1] / 2.0,
        bound.ymax - max_size[1] / 2.0,
    );
    (x, y)
}

/// Cell index along one axis for a relative position in `[0, 1]`
#[inline]
fn cell_index(rel: f64, cells: usize) -> usize {
    ((rel.max(0.0) * cells as f64) as usize).min(cells - 1)
}

/// Flat ground and ceiling with obstacles carved into them
///
/// For each obstacle a centre, size and anchor are drawn. A ground obstacle
/// raises every cell of its footprint to `ground_height + height`; a
/// ceiling obstacle lowers its footprint to `ceiling - height`. Footprints
/// are inclusive index blocks at least two cells wide.
pub fn surface_obstacles<R: Rng + ?Sized>(
    bound: Bound,
    config: &ConfinedConfig,
    rng: &mut R,
) -> Result<ConfinedTerrain> {
    config.validate()?;
    let res = config.resolution;
    let ground_height = config.ground_height;
    let ceiling_height = config.ceiling();

    let mut ground = HeightField::filled(res, ground_height);
    let mut ceiling = HeightField::filled(res, ceiling_height);
    let mut obstacles = Vec::with_capacity(config.obstacle_count);

    for _ in 0..config.obstacle_count {
        let (x, y) = draw_center(rng, &bound, config.max_obstacle_size);
        let width = draw_size(rng, config.min_obstacle_size[0], config.max_obstacle_size[0]);
        let length = draw_size(rng, config.min_obstacle_size[1], config.max_obstacle_size[1]);
        let height = draw_size(rng, config.min_obstacle_size[2], config.max_obstacle_size[2]);
        let anchor = if rng.random_bool(0.5) {
            Anchor::Ground
        } else {
            Anchor::Ceiling
        };

        let (i_min, i_max) = footprint(x, width, bound.xmin, bound.width(), res.x());
        let (j_min, j_max) = footprint(y, length, bound.ymin, bound.length(), res.y());

        let (target, value, z) = match anchor {
            Anchor::Ground => (&mut ground, ground_height + height, ground_height + height / 2.0),
            Anchor::Ceiling => (
                &mut ceiling,
                ceiling_height - height,
                ceiling_height - height / 2.0,
            ),
        };
        for i in i_min..=i_max {
            for j in j_min..=j_max {
                target.set(i, j, value);
            }
        }

        obstacles.push(Obstacle {
            center: [x, y, z],
            size: [width, length, height],
            anchor,
        });
    }

    tracing::debug!(
        "Carved {} obstacles into a {}x{} confined terrain",
        obstacles.len(),
        res.x(),
        res.y()
    );

    Ok(ConfinedTerrain {
        ground,
        ceiling,
        bound,
        obstacles,
        boxes: Vec::new(),
    })
}

/// Inclusive cell range covered by `[center - size/2, center + size/2]`
fn footprint(center: f64, size: f64, origin: f64, extent: f64, cells: usize) -> (usize, usize) {
    let lo = cell_index((center - size / 2.0 - origin) / extent, cells);
    let mut hi = cell_index((center + size / 2.0 - origin) / extent, cells);
    if hi <= lo {
        hi = (lo + 1).min(cells - 1);
    }
    (lo, hi)
}

/// Scatter `count` boxes between `ground` and `ceiling`
///
/// Each box rests on the ground or hangs from the ceiling at the surface
/// height found under its centre.
pub fn scatter_boxes<R: Rng + ?Sized>(
    bound: Bound,
    ground: &HeightField,
    ceiling: &HeightField,
    count: usize,
    min_size: [f64; 3],
    max_size: [f64; 3],
    rng: &mut R,
) -> Result<Vec<Obstacle>> {
    validate_sizes(min_size, max_size)?;
    let mut boxes = Vec::with_capacity(count);

    for _ in 0..count {
        let (x, y) = draw_center(rng, &bound, max_size);
        let width = draw_size(rng, min_size[0], max_size[0]);
        let length = draw_size(rng, min_size[1], max_size[1]);
        let on_ground = rng.random_bool(0.5);
        let height = draw_size(rng, min_size[2], max_size[2]);

        let rel_x = (x - bound.xmin) / bound.width();
        let rel_y = (y - bound.ymin) / bound.length();
        let (anchor, z) = if on_ground {
            let surface = sample_surface(ground, rel_x, rel_y);
            (Anchor::Ground, surface + height / 2.0)
        } else {
            let surface = sample_surface(ceiling, rel_x, rel_y);
            (Anchor::Ceiling, surface - height / 2.0)
        };

        boxes.push(Obstacle {
            center: [x, y, z],
            size: [width, length, height],
            anchor,
        });
    }

    Ok(boxes)
}

fn sample_surface(field: &HeightField, rel_x: f64, rel_y: f64) -> f64 {
    field.get(
        cell_index(rel_x, field.rows()),
        cell_index(rel_y, field.cols()),
    )
}

/// Flat ground and ceiling with free-standing boxes between them
pub fn generate_with_boxes<R: Rng + ?Sized>(
    bound: Bound,
    config: &ConfinedConfig,
    rng: &mut R,
) -> Result<ConfinedTerrain> {
    config.validate()?;
    let ground = HeightField::filled(config.resolution, config.ground_height);
    let ceiling = HeightField::filled(config.resolution, config.ceiling());
    let boxes = scatter_boxes(
        bound,
        &ground,
        &ceiling,
        config.obstacle_count,
        config.min_obstacle_size,
        config.max_obstacle_size,
        rng,
    )?;

    Ok(ConfinedTerrain {
        ground,
        ceiling,
        bound,
        obstacles: Vec::new(),
        boxes,
    })
}
