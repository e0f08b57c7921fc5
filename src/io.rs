//! Flat binary grid I/O.
//!
//! Grids travel as plain sequences of IEEE-754 f32 values with an explicit
//! byte order; dimensions are never embedded in the file and must be
//! supplied by the caller. Files written with the slow axis fast
//! (`Layout::Axis2Fast`) are transposed on the fly.

use crate::grid::{Grid2D, Sampling};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Byte order of the on-disk f32 values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Which axis varies fastest in the file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Axis 1 fast — matches the in-memory layout of [`Grid2D`].
    #[default]
    Axis1Fast,
    /// Axis 2 fast — transposed relative to memory.
    Axis2Fast,
}

/// On-disk format of a flat grid file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridFormat {
    #[serde(default)]
    pub byte_order: Endianness,
    #[serde(default)]
    pub layout: Layout,
}

/// Read `s1.count * s2.count` floats from `path`.
pub fn read_grid(
    s1: Sampling,
    s2: Sampling,
    format: GridFormat,
    path: &Path,
) -> Result<Grid2D, String> {
    let file =
        File::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut data = vec![0.0f32; s1.count * s2.count];
    let res = match format.byte_order {
        Endianness::Little => reader.read_f32_into::<LittleEndian>(&mut data),
        Endianness::Big => reader.read_f32_into::<BigEndian>(&mut data),
    };
    res.map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    match format.layout {
        Layout::Axis1Fast => Grid2D::from_vec(s1, s2, data)
            .map_err(|e| format!("Bad dimensions for {}: {e}", path.display())),
        Layout::Axis2Fast => Ok(Grid2D::from_fn(s1, s2, |i1, i2| data[i1 * s2.count + i2])),
    }
}

/// Write a grid as flat floats to `path`.
pub fn write_grid(grid: &Grid2D, format: GridFormat, path: &Path) -> Result<(), String> {
    let file =
        File::create(path).map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let ordered: Vec<f32> = match format.layout {
        Layout::Axis1Fast => grid.as_slice().to_vec(),
        Layout::Axis2Fast => {
            let mut out = Vec::with_capacity(grid.data.len());
            for i1 in 0..grid.n1 {
                for i2 in 0..grid.n2 {
                    out.push(grid.get(i1, i2));
                }
            }
            out
        }
    };
    for v in ordered {
        let res = match format.byte_order {
            Endianness::Little => writer.write_f32::<LittleEndian>(v),
            Endianness::Big => writer.write_f32::<BigEndian>(v),
        };
        res.map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid2D;
    use std::env;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(format!("shift_field_io_{name}_{}", std::process::id()))
    }

    #[test]
    fn roundtrip_little_endian() {
        let g = Grid2D::from_fn(Sampling::unit(6), Sampling::unit(4), |i1, i2| {
            i1 as f32 - 0.5 * i2 as f32
        });
        let path = temp_path("le.dat");
        let fmt = GridFormat::default();
        write_grid(&g, fmt, &path).unwrap();
        let back = read_grid(g.s1, g.s2, fmt, &path).unwrap();
        assert_eq!(back.as_slice(), g.as_slice());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn big_endian_bytes_differ_but_roundtrip() {
        let g = Grid2D::zeros(3, 3).map(|_| 1.5);
        let path_le = temp_path("le2.dat");
        let path_be = temp_path("be2.dat");
        write_grid(&g, GridFormat::default(), &path_le).unwrap();
        let be = GridFormat {
            byte_order: Endianness::Big,
            ..Default::default()
        };
        write_grid(&g, be, &path_be).unwrap();
        let a = std::fs::read(&path_le).unwrap();
        let b = std::fs::read(&path_be).unwrap();
        assert_ne!(a, b);
        let back = read_grid(g.s1, g.s2, be, &path_be).unwrap();
        assert_eq!(back.as_slice(), g.as_slice());
        std::fs::remove_file(&path_le).ok();
        std::fs::remove_file(&path_be).ok();
    }

    #[test]
    fn axis2_fast_layout_transposes() {
        let g = Grid2D::from_fn(Sampling::unit(2), Sampling::unit(3), |i1, i2| {
            (10 * i1 + i2) as f32
        });
        let path = temp_path("tr.dat");
        let fmt = GridFormat {
            layout: Layout::Axis2Fast,
            ..Default::default()
        };
        write_grid(&g, fmt, &path).unwrap();
        // on disk: axis 2 fast -> g(0,0), g(0,1), g(0,2), g(1,0), ...
        let raw = read_grid(Sampling::unit(6), Sampling::unit(1), GridFormat::default(), &path)
            .unwrap();
        assert_eq!(raw.as_slice(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        let back = read_grid(g.s1, g.s2, fmt, &path).unwrap();
        assert_eq!(back.as_slice(), g.as_slice());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn short_file_reports_read_error() {
        let g = Grid2D::zeros(2, 2);
        let path = temp_path("short.dat");
        write_grid(&g, GridFormat::default(), &path).unwrap();
        let err = read_grid(Sampling::unit(4), Sampling::unit(4), GridFormat::default(), &path)
            .unwrap_err();
        assert!(err.contains("Failed to read"), "{err}");
        std::fs::remove_file(&path).ok();
    }
}
