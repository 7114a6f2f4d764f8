//! Turning manifest entries into terrain files

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use terrain_gen::confined::{self, ConfinedConfig, ConfinedTerrain};
use terrain_gen::mesh::{MeshSink, ObjSink};
use terrain_gen::patches::PatchLayout;
use terrain_gen::{
    Bound, NoiseKind, PatchConfig, Resolution, Section, Terrain, TerrainRecipe, combined,
    default_sections, generate_square_terrain_patches, write_heightmap_png,
};

use crate::manifest::{TerrainEntry, TerrainManifest};

/// What to generate for one entry, with every default applied
#[derive(Debug, Clone)]
pub enum TerrainJob {
    Recipe(TerrainRecipe),
    Combined(Vec<Section>),
    Patches(PatchConfig),
    /// Obstacles carved into ground and ceiling
    Confined(ConfinedConfig),
    /// Free-standing boxes between ground and ceiling
    ConfinedBoxes(ConfinedConfig),
}

/// A validated entry ready to generate
#[derive(Debug, Clone)]
pub struct PlannedTerrain {
    pub name: String,
    pub resolution: Resolution,
    pub bound: Bound,
    pub job: TerrainJob,
}

/// Result of generating one entry
#[derive(Debug)]
pub enum Generated {
    Field(Terrain),
    Confined(ConfinedTerrain),
}

/// Resolve an entry against the library's parameter checks
pub fn plan(entry: &TerrainEntry, noise: NoiseKind) -> Result<PlannedTerrain> {
    if entry.name.trim().is_empty() {
        bail!("Terrain entry has an empty name");
    }
    let [rx, ry] = entry.resolution;
    let resolution = Resolution::new(rx, ry)
        .with_context(|| format!("Terrain '{}' has an invalid resolution", entry.name))?;
    // Every entry ends up as a grid mesh, which needs two samples per axis
    if rx < 2 || ry < 2 {
        bail!(
            "Terrain '{}' resolution {}x{} is too small to mesh (need at least 2x2)",
            entry.name,
            rx,
            ry
        );
    }
    let bound = Bound::centered(entry.position, entry.size)
        .with_context(|| format!("Terrain '{}' has an invalid size", entry.name))?;

    let job = match entry.kind().as_str() {
        "combined" => {
            let sections = if entry.sections.is_empty() {
                default_sections()
            } else {
                entry.sections.iter().map(|s| s.to_section()).collect()
            };
            TerrainJob::Combined(sections)
        }
        "patches" => {
            let config = entry.patches.to_config(noise);
            PatchLayout::new(resolution, config.num_patches, config.padding_ratio)
                .with_context(|| format!("Terrain '{}' has an invalid patch grid", entry.name))?;
            if !config.max_height_diff.is_finite() || config.max_height_diff < 0.0 {
                bail!(
                    "Terrain '{}' has an invalid max_height_diff: {}",
                    entry.name,
                    config.max_height_diff
                );
            }
            TerrainJob::Patches(config)
        }
        kind @ ("confined" | "confined_boxes") => {
            let config = entry.confined.to_config(resolution);
            config
                .validate()
                .with_context(|| format!("Terrain '{}' has invalid obstacles", entry.name))?;
            if kind == "confined" {
                TerrainJob::Confined(config)
            } else {
                TerrainJob::ConfinedBoxes(config)
            }
        }
        _ => TerrainJob::Recipe(entry.recipe.to_recipe()),
    };

    Ok(PlannedTerrain {
        name: entry.name.clone(),
        resolution,
        bound,
        job,
    })
}

/// Plan every entry, rejecting duplicate names
pub fn validate(manifest: &TerrainManifest) -> Result<Vec<PlannedTerrain>> {
    let noise = manifest.noise_kind();
    let mut seen = HashSet::new();
    let mut planned = Vec::with_capacity(manifest.terrains.len());

    for entry in &manifest.terrains {
        if !seen.insert(entry.name.as_str()) {
            bail!("Duplicate terrain name '{}'", entry.name);
        }
        planned.push(plan(entry, noise)?);
    }

    Ok(planned)
}

/// Run a planned entry
pub fn generate<R: rand::Rng + ?Sized>(
    planned: &PlannedTerrain,
    noise: NoiseKind,
    rng: &mut R,
) -> Result<Generated> {
    let res = planned.resolution;
    let bound = planned.bound;

    let generated = match &planned.job {
        TerrainJob::Recipe(recipe) => {
            Generated::Field(Terrain::new(recipe.render(res, noise, rng), bound))
        }
        TerrainJob::Combined(sections) => {
            Generated::Field(combined(res, bound, sections, noise, rng))
        }
        TerrainJob::Patches(config) => {
            let out = generate_square_terrain_patches(res, bound, config, rng)?;
            for patch in &out.patches {
                tracing::debug!(
                    "{} patch {:?}: {} base {:.3} max {:.3}",
                    planned.name,
                    patch.index,
                    patch.kind.name(),
                    patch.base_height,
                    patch.max_height
                );
            }
            Generated::Field(out.terrain)
        }
        TerrainJob::Confined(config) => {
            Generated::Confined(confined::surface_obstacles(bound, config, rng)?)
        }
        TerrainJob::ConfinedBoxes(config) => {
            Generated::Confined(confined::generate_with_boxes(bound, config, rng)?)
        }
    };

    Ok(generated)
}

/// Write a generated terrain as `<name>.obj`, plus `<name>.png` when asked
pub fn write(
    name: &str,
    generated: &Generated,
    sink: &mut ObjSink,
    png: bool,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let heights = match generated {
        Generated::Field(terrain) => {
            sink.accept_terrain(name, terrain)
                .with_context(|| format!("Failed to write mesh for '{}'", name))?;
            written.extend(sink.written().last().cloned());
            &terrain.heights
        }
        Generated::Confined(terrain) => {
            let mesh = terrain
                .to_mesh()
                .with_context(|| format!("Failed to mesh '{}'", name))?;
            let path = sink
                .write_mesh(name, &mesh)
                .with_context(|| format!("Failed to write mesh for '{}'", name))?;
            written.push(path);
            &terrain.ground
        }
    };

    if png {
        let path = sink.dir().join(format!("{}.png", name));
        write_heightmap_png(heights, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

/// Generator for a build: explicit seed first, then the manifest seed, then
/// OS entropy
pub fn build_rng(seed: Option<u64>) -> Pcg64Mcg {
    match seed {
        Some(seed) => Pcg64Mcg::seed_from_u64(seed),
        None => Pcg64Mcg::from_os_rng(),
    }
}

/// Generate every terrain in the manifest
///
/// Returns the paths of all files written.
pub fn build_all(
    manifest: &TerrainManifest,
    output_override: Option<&Path>,
    seed_override: Option<u64>,
) -> Result<Vec<PathBuf>> {
    let planned = validate(manifest)?;
    let noise = manifest.noise_kind();
    let output_dir = output_override.unwrap_or(&manifest.output.dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut rng = build_rng(seed_override.or(manifest.seed));
    let mut sink = ObjSink::new(output_dir);
    let mut written = Vec::new();

    for terrain in &planned {
        let generated = generate(terrain, noise, &mut rng)?;
        let files = write(&terrain.name, &generated, &mut sink, manifest.output.png)?;
        for file in &files {
            tracing::info!("Generated {} -> {}", terrain.name, file.display());
        }
        written.extend(files);
    }

    Ok(written)
}

/// Generate a single terrain of `kind` with default settings
pub fn sample(
    kind: &str,
    output: &Path,
    resolution: [usize; 2],
    seed: Option<u64>,
) -> Result<PathBuf> {
    let name = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(kind)
        .to_string();
    let mut entry = TerrainEntry::with_type(&name, kind);
    entry.resolution = resolution;

    let noise = NoiseKind::default();
    let planned = plan(&entry, noise)?;
    let generated = generate(&planned, noise, &mut build_rng(seed))?;

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut sink = ObjSink::new(dir);
    let written = write(&name, &generated, &mut sink, false)?;
    written
        .into_iter()
        .next()
        .context("No mesh was written")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{PatchSpec, TerrainManifest};

    fn manifest(text: &str) -> TerrainManifest {
        TerrainManifest::parse(text).unwrap()
    }

    #[test]
    fn test_plan_resolves_entry_types() {
        let noise = NoiseKind::Perlin;
        let flat = plan(&TerrainEntry::with_type("a", "flat"), noise).unwrap();
        assert!(matches!(flat.job, TerrainJob::Recipe(TerrainRecipe::Flat { .. })));
        assert_eq!(flat.bound, Bound::new(-5.0, 5.0, -5.0, 5.0).unwrap());

        let mixed = plan(&TerrainEntry::with_type("b", "combined"), noise).unwrap();
        assert!(matches!(mixed.job, TerrainJob::Combined(ref s) if s.len() == 4));

        let boxes = plan(&TerrainEntry::with_type("c", "confined_boxes"), noise).unwrap();
        assert!(matches!(boxes.job, TerrainJob::ConfinedBoxes(_)));
    }

    #[test]
    fn test_plan_rejects_bad_entries() {
        let noise = NoiseKind::Perlin;

        let mut tiny = TerrainEntry::with_type("tiny", "patches");
        tiny.resolution = [2, 2];
        assert!(plan(&tiny, noise).is_err());

        let mut steep = TerrainEntry::with_type("steep", "patches");
        steep.patches = PatchSpec {
            max_height_diff: Some(-0.5),
            ..PatchSpec::default()
        };
        assert!(plan(&steep, noise).is_err());

        let mut empty = TerrainEntry::with_type("empty", "flat");
        empty.resolution = [0, 10];
        assert!(plan(&empty, noise).is_err());

        let mut flat_size = TerrainEntry::with_type("flat_size", "flat");
        flat_size.size = [0.0, 1.0];
        assert!(plan(&flat_size, noise).is_err());
    }

    #[test]
    fn test_plan_rejects_unmeshable_resolution() {
        let noise = NoiseKind::Perlin;
        for resolution in [[1, 10], [10, 1]] {
            let mut line = TerrainEntry::with_type("line", "stairs");
            line.resolution = resolution;
            let err = plan(&line, noise).unwrap_err();
            assert!(err.to_string().contains("too small to mesh"));
        }

        let mut smallest = TerrainEntry::with_type("smallest", "flat");
        smallest.resolution = [2, 2];
        assert!(plan(&smallest, noise).is_ok());
    }

    #[test]
    fn test_check_fails_before_build_writes_anything() {
        let m = manifest(
            r#"
[[terrain]]
name = "ok"
type = "flat"

[[terrain]]
name = "line"
type = "stairs"
resolution = [1, 10]
"#,
        );
        assert!(validate(&m).is_err());

        let dir = tempfile::tempdir().unwrap();
        assert!(build_all(&m, Some(dir.path()), Some(1)).is_err());
        assert!(!dir.path().join("ok.obj").exists());
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let m = manifest(
            r#"
[[terrain]]
name = "same"
type = "flat"

[[terrain]]
name = "same"
type = "ramp"
"#,
        );
        let err = validate(&m).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_build_all_writes_meshes_and_previews() {
        let dir = tempfile::tempdir().unwrap();
        let m = manifest(
            r#"
seed = 11

[output]
png = true

[[terrain]]
name = "quilt"
type = "patches"
resolution = [30, 30]

[[terrain]]
name = "cave"
type = "confined"
resolution = [10, 10]
"#,
        );
        let written = build_all(&m, Some(dir.path()), None).unwrap();

        let expected = ["quilt.obj", "quilt.png", "cave.obj", "cave.png"];
        assert_eq!(written.len(), expected.len());
        for (path, name) in written.iter().zip(expected) {
            assert_eq!(path, &dir.path().join(name));
            assert!(path.exists());
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let m = manifest(
            r#"
[[terrain]]
name = "hills"
type = "noise"
resolution = [16, 16]
"#,
        );
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        build_all(&m, Some(a.path()), Some(5)).unwrap();
        build_all(&m, Some(b.path()), Some(5)).unwrap();

        let read = |dir: &Path| std::fs::read(dir.join("hills.obj")).unwrap();
        assert_eq!(read(a.path()), read(b.path()));
    }

    #[test]
    fn test_sample_names_file_after_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("steps.obj");
        let path = sample("stairs", &output, [8, 6], Some(1)).unwrap();
        assert_eq!(path, output);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 48);
        assert!(text.contains("o steps"));
    }
}
