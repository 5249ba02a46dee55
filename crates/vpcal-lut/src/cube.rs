//! Resolve/Adobe `.cube` 3D LUT format.
//!
//! # Format
//!
//! ```text
//! # Comment
//! TITLE "LUT Name"
//! LUT_3D_SIZE 33
//! DOMAIN_MIN 0.0 0.0 0.0
//! DOMAIN_MAX 1.0 1.0 1.0
//! 0.0 0.0 0.0
//! ...
//! ```
//!
//! Data rows are ordered with red varying fastest, which matches the
//! in-memory order of [`Lut3D`].

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::{Lut3D, LutError, LutResult};

/// Reads a 3D LUT from a `.cube` file.
pub fn read_3d(path: impl AsRef<Path>) -> LutResult<Lut3D> {
    let file = File::open(path.as_ref())?;
    parse_3d(BufReader::new(file))
}

/// Parses a 3D LUT from a reader.
pub fn parse_3d<R: BufRead>(reader: R) -> LutResult<Lut3D> {
    let mut size: Option<usize> = None;
    let mut domain_min = [0.0_f32; 3];
    let mut domain_max = [1.0_f32; 3];
    let mut data: Vec<[f32; 3]> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with("TITLE") {
            continue;
        }

        if line.starts_with("LUT_3D_SIZE") {
            size = Some(parse_size(line)?);
        } else if line.starts_with("LUT_1D_SIZE") {
            return Err(LutError::ParseError("expected 3D LUT, found 1D".into()));
        } else if line.starts_with("DOMAIN_MIN") {
            domain_min = parse_triplet(line, 1)?;
        } else if line.starts_with("DOMAIN_MAX") {
            domain_max = parse_triplet(line, 1)?;
        } else {
            data.push(parse_triplet(line, 0)?);
        }
    }

    let size = size.ok_or_else(|| LutError::ParseError("missing LUT_3D_SIZE".into()))?;
    Ok(Lut3D::from_data(data, size)?.with_domain(domain_min, domain_max))
}

/// Writes a 3D LUT as a `.cube` file.
pub fn write_3d(path: impl AsRef<Path>, lut: &Lut3D, title: Option<&str>) -> LutResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    if let Some(title) = title {
        writeln!(writer, "TITLE \"{title}\"")?;
    }
    writeln!(writer, "LUT_3D_SIZE {}", lut.size)?;

    let (min, max) = (lut.domain_min, lut.domain_max);
    if min != [0.0; 3] || max != [1.0; 3] {
        writeln!(writer, "DOMAIN_MIN {} {} {}", min[0], min[1], min[2])?;
        writeln!(writer, "DOMAIN_MAX {} {} {}", max[0], max[1], max[2])?;
    }

    for rgb in &lut.data {
        writeln!(writer, "{:.6} {:.6} {:.6}", rgb[0], rgb[1], rgb[2])?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_size(line: &str) -> LutResult<usize> {
    line.split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| LutError::ParseError(format!("invalid size line: {line}")))
}

fn parse_triplet(line: &str, skip: usize) -> LutResult<[f32; 3]> {
    let values: Vec<f32> = line
        .split_whitespace()
        .skip(skip)
        .map(|s| s.parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|_| LutError::ParseError(format!("invalid values: {line}")))?;
    match values.as_slice() {
        [r, g, b] => Ok([*r, *g, *b]),
        _ => Err(LutError::ParseError(format!("expected 3 values: {line}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bake.cube");
        let lut = Lut3D::from_fn(4, |[r, g, b]| [r * 0.5, g, 1.0 - b]).unwrap();
        write_3d(&path, &lut, Some("Wall1 bake")).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("TITLE \"Wall1 bake\"\nLUT_3D_SIZE 4\n"));
        // red fastest
        let rows: Vec<&str> = text.lines().skip(2).take(2).collect();
        assert_eq!(rows, vec!["0.000000 0.000000 1.000000", "0.166667 0.000000 1.000000"]);

        let back = read_3d(&path).unwrap();
        assert_eq!(back.size, 4);
        for (a, b) in back.data.iter().zip(&lut.data) {
            for c in 0..3 {
                assert_relative_eq!(a[c], b[c], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn parse_errors() {
        assert!(parse_3d("0 0 0\n".as_bytes()).is_err());
        assert!(parse_3d("LUT_3D_SIZE 2\n0 0\n".as_bytes()).is_err());
        assert!(parse_3d("LUT_1D_SIZE 2\n".as_bytes()).is_err());
    }

    #[test]
    fn domain_lines() {
        let text = "LUT_3D_SIZE 2\nDOMAIN_MIN 0 0 0\nDOMAIN_MAX 2 2 2\n\
                    0 0 0\n1 0 0\n0 1 0\n1 1 0\n0 0 1\n1 0 1\n0 1 1\n1 1 1\n";
        let lut = parse_3d(text.as_bytes()).unwrap();
        assert_eq!(lut.domain_max, [2.0; 3]);
        assert_relative_eq!(lut.apply([1.0, 1.0, 1.0])[0], 0.5);
    }
}
