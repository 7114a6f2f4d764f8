//! PNG previews of height fields

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::field::HeightField;

/// Heights rescaled to the full `u16` range, row-major
///
/// The lowest height maps to 0 and the highest to `u16::MAX`. A flat field
/// maps to all zeros.
pub fn normalized_u16(field: &HeightField) -> Vec<u16> {
    let (lo, hi) = (field.min(), field.max());
    let range = hi - lo;
    field
        .data()
        .iter()
        .map(|&h| {
            if range > 0.0 {
                (((h - lo) / range) * u16::MAX as f64).round() as u16
            } else {
                0
            }
        })
        .collect()
}

/// Write a 16-bit grayscale PNG of `field`
///
/// Image rows follow field rows (x) and image columns follow field columns
/// (y).
///
/// # Example
/// ```no_run
/// use terrain_gen::{HeightField, Resolution, write_heightmap_png};
/// use std::path::Path;
///
/// let field = HeightField::from_fn(Resolution::new(64, 64).unwrap(), |i, _| i as f64);
/// write_heightmap_png(&field, Path::new("ramp.png")).unwrap();
/// ```
pub fn write_heightmap_png(field: &HeightField, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let w = BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, field.cols() as u32, field.rows() as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Sixteen);
    encoder.set_compression(png::Compression::Default);

    let mut writer = encoder
        .write_header()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    // PNG samples are big-endian
    let bytes: Vec<u8> = normalized_u16(field)
        .into_iter()
        .flat_map(u16::to_be_bytes)
        .collect();

    writer
        .write_image_data(&bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    Ok(())
}
