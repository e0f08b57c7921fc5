//! Local correlation core: per-pixel lag search between two grids.
//!
//! For every candidate integer lag the normalized cross-correlation is
//! evaluated for all pixels at once: form the product grids, smooth them
//! with the Gaussian window, and divide. One smoothing pass per lag —
//! never a per-pixel re-window. The per-pixel argmax is then refined to a
//! fractional lag with a 3-point quadratic fit.
//!
//! Out-of-range samples replicate the border; lags never wrap around.

use crate::error::{ShiftError, ShiftResult};
use crate::gauss;
use crate::grid::{ensure_same_shape, Axis, Grid2D};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How the correlation window is centered relative to the lag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// Both windows centered at the output pixel.
    Simple,
    /// Lag split between the two inputs so the window sits midway.
    Symmetric,
}

/// Gaussian correlation window; immutable once constructed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrelationWindow {
    pub kind: WindowKind,
    pub sigma: f32,
}

impl CorrelationWindow {
    pub fn new(kind: WindowKind, sigma: f32) -> ShiftResult<Self> {
        if !(sigma > 0.0) {
            return Err(ShiftError::InvalidParameter {
                name: "window.sigma",
                value: sigma as f64,
            });
        }
        Ok(Self { kind, sigma })
    }
}

/// Inclusive integer lag search bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LagRange {
    pub min: i32,
    pub max: i32,
}

impl LagRange {
    pub fn new(min: i32, max: i32) -> ShiftResult<Self> {
        if min >= max {
            return Err(ShiftError::InvalidParameter {
                name: "lag.min",
                value: min as f64,
            });
        }
        Ok(Self { min, max })
    }

    /// Symmetric range [-l, l].
    pub fn symmetric(l: i32) -> ShiftResult<Self> {
        Self::new(-l, l)
    }

    #[inline]
    fn len(&self) -> usize {
        (self.max - self.min + 1) as usize
    }
}

/// Copy of `g` shifted by `lag` samples along `axis`, border replicated:
/// `out(x) = g(x + lag)`.
fn shift_grid(g: &Grid2D, axis: Axis, lag: i32) -> Grid2D {
    if lag == 0 {
        return g.clone();
    }
    let mut out = g.like();
    let lag = lag as isize;
    for i2 in 0..g.n2 {
        for i1 in 0..g.n1 {
            let v = match axis {
                Axis::One => g.get_clamped(i1 as isize + lag, i2 as isize),
                Axis::Two => g.get_clamped(i1 as isize, i2 as isize + lag),
            };
            out.set(i1, i2, v);
        }
    }
    out
}

/// Elementwise product of two same-shape grids.
fn product(a: &Grid2D, b: &Grid2D) -> Grid2D {
    let mut out = a.clone();
    for (v, &w) in out.data.iter_mut().zip(b.as_slice()) {
        *v *= w;
    }
    out
}

/// Normalized correlation coefficients for one candidate lag.
fn coeff_plane(
    axis: Axis,
    lag: i32,
    window: &CorrelationWindow,
    fixed: &Grid2D,
    moving: &Grid2D,
    ff_smooth: &Grid2D,
    gg_smooth: &Grid2D,
) -> ShiftResult<Grid2D> {
    // Split the lag for symmetric windows; keep it on `moving` otherwise.
    let (lf, lg) = match window.kind {
        WindowKind::Simple => (0, lag),
        WindowKind::Symmetric => {
            let lf = lag.div_euclid(2);
            (lf, lag - lf)
        }
    };
    let fs = shift_grid(fixed, axis, -lf);
    let gs = shift_grid(moving, axis, lg);
    let num = gauss::smooth_iso(window.sigma, &product(&fs, &gs))?;
    // Shifting commutes with the window away from borders, so the
    // denominators reuse the two pre-smoothed energy grids.
    let ff = shift_grid(ff_smooth, axis, -lf);
    let gg = shift_grid(gg_smooth, axis, lg);
    let mut c = num;
    for ((v, &e1), &e2) in c.data.iter_mut().zip(ff.as_slice()).zip(gg.as_slice()) {
        let den = (e1 * e2).sqrt();
        *v = if den > 0.0 { (*v / den).clamp(-1.0, 1.0) } else { 0.0 };
    }
    Ok(c)
}

/// Fractional peak offset from a 3-point quadratic fit. Falls back to the
/// integer peak when the fit is not clearly concave (flat coefficients
/// along a structure-free direction). The offset is clamped to one sample.
#[inline]
fn quad_peak_offset(cm: f32, c0: f32, cp: f32) -> f32 {
    let denom = cm - 2.0 * c0 + cp;
    if denom >= -1e-4 {
        return 0.0;
    }
    (0.5 * (cm - cp) / denom).clamp(-1.0, 1.0)
}

/// Per-pixel lag (in samples, continuous) that maximizes the windowed
/// normalized correlation between `fixed` and `moving` along `axis`.
pub fn find_lag(
    axis: Axis,
    range: LagRange,
    window: &CorrelationWindow,
    fixed: &Grid2D,
    moving: &Grid2D,
) -> ShiftResult<Grid2D> {
    ensure_same_shape(fixed, moving)?;
    let ff_smooth = gauss::smooth_iso(window.sigma, &product(fixed, fixed))?;
    let gg_smooth = gauss::smooth_iso(window.sigma, &product(moving, moving))?;

    let mut planes = Vec::with_capacity(range.len());
    for lag in range.min..=range.max {
        planes.push(coeff_plane(
            axis, lag, window, fixed, moving, &ff_smooth, &gg_smooth,
        )?);
    }

    let mut out = fixed.like();
    let n1 = out.n1;
    out.data
        .par_chunks_mut(n1)
        .enumerate()
        .for_each(|(i2, dst)| {
            for (i1, d) in dst.iter_mut().enumerate() {
                let idx = i2 * n1 + i1;
                let mut best = f32::NEG_INFINITY;
                let mut best_lag = range.min;
                for (k, plane) in planes.iter().enumerate() {
                    let lag = range.min + k as i32;
                    let c = plane.data[idx];
                    let better = c > best || (c == best && lag.abs() < best_lag.abs());
                    if better {
                        best = c;
                        best_lag = lag;
                    }
                }
                let mut lag = best_lag as f32;
                if best_lag > range.min && best_lag < range.max {
                    let k = (best_lag - range.min) as usize;
                    let cm = planes[k - 1].data[idx];
                    let cp = planes[k + 1].data[idx];
                    lag += quad_peak_offset(cm, best, cp);
                }
                *d = lag;
            }
        });
    Ok(out)
}
