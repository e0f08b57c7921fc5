//! Decompose a displacement field relative to a local orientation field.
//!
//! The orientation gives the direction of the locally straight reference
//! feature at each pixel. The feature itself is located by scanning along
//! the orientation normal, within the search radius, for the point where
//! the sampled displacement magnitude is smallest: displacement is modeled
//! as growing away from the feature, so the feature is where it vanishes.
//! The pixel's displacement is then projected onto the orientation (axial)
//! and the normal (tangential); the proportional outputs divide those
//! projections by the pixel-to-anchor distance, giving growth rates.

use crate::error::{ShiftError, ShiftResult};
use crate::grid::{ensure_same_shape, Grid2D};
use nalgebra::Vector2;
use rayon::prelude::*;

const UNIT_NORM_TOL: f32 = 1e-3;
const MIN_NORM: f32 = 1e-6;

/// Per-pixel unit direction of the locally dominant structure.
#[derive(Clone, Debug)]
pub struct OrientationField {
    /// Axis-1 component of the unit vector
    pub t1: Grid2D,
    /// Axis-2 component of the unit vector
    pub t2: Grid2D,
}

impl OrientationField {
    /// Normalize raw components into an orientation field. Vectors whose
    /// norm is below `1e-6` cannot be normalized and are rejected.
    pub fn from_components(c1: Grid2D, c2: Grid2D) -> ShiftResult<Self> {
        ensure_same_shape(&c1, &c2)?;
        let mut t1 = c1;
        let mut t2 = c2;
        for i2 in 0..t1.n2 {
            for i1 in 0..t1.n1 {
                let a = t1.get(i1, i2);
                let b = t2.get(i1, i2);
                let norm = (a * a + b * b).sqrt();
                if norm < MIN_NORM {
                    return Err(ShiftError::DegenerateOrientation { i1, i2 });
                }
                t1.set(i1, i2, a / norm);
                t2.set(i1, i2, b / norm);
            }
        }
        Ok(Self { t1, t2 })
    }

    /// Constant-dip field: direction `(cos a, -sin a)` at every pixel,
    /// with `a` in radians.
    pub fn constant_dip(like: &Grid2D, angle: f32) -> Self {
        let (sin_a, cos_a) = angle.sin_cos();
        Self {
            t1: like.map(|_| cos_a),
            t2: like.map(|_| -sin_a),
        }
    }

    fn check_unit_norm(&self) -> ShiftResult<()> {
        for i2 in 0..self.t1.n2 {
            for i1 in 0..self.t1.n1 {
                let a = self.t1.get(i1, i2);
                let b = self.t2.get(i1, i2);
                let norm = (a * a + b * b).sqrt();
                if (norm - 1.0).abs() > UNIT_NORM_TOL {
                    return Err(ShiftError::DegenerateOrientation { i1, i2 });
                }
            }
        }
        Ok(())
    }
}

/// Axial/tangential split of a displacement field, with the proportional
/// (per-distance) variants.
#[derive(Clone, Debug)]
pub struct Decomposition {
    /// Projection onto the orientation direction
    pub axial: Grid2D,
    /// Projection onto the orientation normal
    pub tangential: Grid2D,
    /// Axial projection divided by the pixel-to-anchor distance
    pub axial_rate: Grid2D,
    /// Tangential projection divided by the pixel-to-anchor distance
    pub tangential_rate: Grid2D,
}

/// Vertex offset of the parabola through three magnitude samples.
#[inline]
fn quad_min_offset(mm: f32, m0: f32, mp: f32) -> f32 {
    let denom = mm - 2.0 * m0 + mp;
    if denom.abs() <= f32::EPSILON {
        return 0.0;
    }
    (0.5 * (mm - mp) / denom).clamp(-1.0, 1.0)
}

/// Decompose `(u1, u2)` against `orientation` within `radius` (physical
/// units). Spacings and origins come from the samplings of `u1`/`u2`
/// (axis 1 of both fields shares `u1.s1`, axis 2 shares `u1.s2`).
pub fn decompose(
    radius: f32,
    u1: &Grid2D,
    u2: &Grid2D,
    orientation: &OrientationField,
) -> ShiftResult<Decomposition> {
    if !(radius > 0.0) {
        return Err(ShiftError::InvalidParameter {
            name: "radius",
            value: radius as f64,
        });
    }
    ensure_same_shape(u1, u2)?;
    ensure_same_shape(u1, &orientation.t1)?;
    orientation.check_unit_norm()?;

    let d1 = u1.s1.delta;
    let d2 = u1.s2.delta;
    let step = d1.min(d2);
    let m = (radius / step).floor() as i32;

    let n1 = u1.n1;
    let n2 = u1.n2;
    let rows: Vec<Vec<[f32; 4]>> = (0..n2)
        .into_par_iter()
        .map(|i2| {
            let mut row = vec![[0.0f32; 4]; n1];
            for (i1, out) in row.iter_mut().enumerate() {
                let t = Vector2::new(
                    orientation.t1.get(i1, i2),
                    orientation.t2.get(i1, i2),
                );
                let normal = Vector2::new(-t.y, t.x);
                let d = Vector2::new(u1.get(i1, i2), u2.get(i1, i2));

                // magnitude^2 of the displacement sampled along the normal
                let mag2 = |k: i32| -> f32 {
                    let s = k as f32 * step;
                    let j1 = i1 as f32 + s * normal.x / d1;
                    let j2 = i2 as f32 + s * normal.y / d2;
                    let v1 = u1.sample_bilinear(j1, j2);
                    let v2 = u2.sample_bilinear(j1, j2);
                    v1 * v1 + v2 * v2
                };

                let mut best = f32::INFINITY;
                let mut best_k = 0i32;
                for k in -m..=m {
                    let v = mag2(k);
                    if v < best || (v == best && k.abs() < best_k.abs()) {
                        best = v;
                        best_k = k;
                    }
                }
                // anchor at the scan boundary: the true anchor lies
                // outside the search radius
                if m == 0 || best_k.abs() == m {
                    continue;
                }
                let offset = quad_min_offset(mag2(best_k - 1), best, mag2(best_k + 1));
                let s_anchor = (best_k as f32 + offset) * step;
                if s_anchor.abs() > radius {
                    continue;
                }

                let axial = d.dot(&t);
                let tangential = d.dot(&normal);
                let dist = s_anchor.abs();
                let (ar, tr) = if dist > 0.0 {
                    (axial / dist, tangential / dist)
                } else {
                    (0.0, 0.0)
                };
                *out = [axial, tangential, ar, tr];
            }
            row
        })
        .collect();

    let mut axial = u1.like();
    let mut tangential = u1.like();
    let mut axial_rate = u1.like();
    let mut tangential_rate = u1.like();
    for (i2, row) in rows.iter().enumerate() {
        for (i1, v) in row.iter().enumerate() {
            axial.set(i1, i2, v[0]);
            tangential.set(i1, i2, v[1]);
            axial_rate.set(i1, i2, v[2]);
            tangential_rate.set(i1, i2, v[3]);
        }
    }
    Ok(Decomposition {
        axial,
        tangential,
        axial_rate,
        tangential_rate,
    })
}
