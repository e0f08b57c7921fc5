//! Iterative local displacement estimation across both grid axes.
//!
//! The finder alternates per-axis lag searches with re-warping of the
//! moving grid, accumulating the incremental lags into a running total per
//! axis. Each pass resamples the *original* moving grid with the full
//! running displacement, so only one interpolation separates the warped
//! copy from the raw input at any point. Iteration count is fixed by the
//! caller; there is no internal convergence test.

use crate::error::{ShiftError, ShiftResult};
use crate::grid::{ensure_same_shape, Axis, Grid2D};
use crate::lcc::{find_lag, CorrelationWindow, LagRange, WindowKind};
use log::debug;
use serde::{Deserialize, Serialize};

/// Estimated shift per axis, in physical units after scaling.
#[derive(Clone, Debug)]
pub struct DisplacementField {
    /// Shift along axis 1
    pub u1: Grid2D,
    /// Shift along axis 2
    pub u2: Grid2D,
}

/// Knobs for the displacement estimator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShiftParams {
    /// Correlation window used by every lag search.
    pub window: CorrelationWindow,
    /// Integer lag search bounds, shared by both axes.
    pub lags: LagRange,
    /// Number of alternating-axis passes (>= 1).
    pub iterations: usize,
    /// Axis visiting order within one iteration.
    pub axis_order: Vec<Axis>,
    /// Extra factor applied together with the axis spacing when scaling
    /// lags to physical units (e.g. 1000 for km -> m).
    pub unit_scale: f32,
}

impl Default for ShiftParams {
    fn default() -> Self {
        Self {
            window: CorrelationWindow {
                kind: WindowKind::Simple,
                sigma: 12.0,
            },
            lags: LagRange { min: -3, max: 3 },
            iterations: 3,
            axis_order: vec![Axis::One, Axis::Two],
            unit_scale: 1.0,
        }
    }
}

/// Displacement estimator configured once and reused across grid pairs.
#[derive(Clone, Debug)]
pub struct LocalShiftFinder {
    params: ShiftParams,
}

impl LocalShiftFinder {
    /// Validate the parameter set eagerly; the estimation entry points
    /// assume it is consistent.
    pub fn new(params: ShiftParams) -> ShiftResult<Self> {
        // Window and lag range may come from deserialized configs, so the
        // constructor invariants are re-checked here.
        CorrelationWindow::new(params.window.kind, params.window.sigma)?;
        LagRange::new(params.lags.min, params.lags.max)?;
        if params.iterations == 0 {
            return Err(ShiftError::InvalidParameter {
                name: "iterations",
                value: 0.0,
            });
        }
        if params.axis_order.is_empty() {
            return Err(ShiftError::InvalidParameter {
                name: "axis_order.len",
                value: 0.0,
            });
        }
        if !(params.unit_scale > 0.0) {
            return Err(ShiftError::InvalidParameter {
                name: "unit_scale",
                value: params.unit_scale as f64,
            });
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &ShiftParams {
        &self.params
    }

    /// Estimate the dense 2-D displacement aligning `moving` to `fixed`.
    pub fn estimate(&self, fixed: &Grid2D, moving: &Grid2D) -> ShiftResult<DisplacementField> {
        ensure_same_shape(fixed, moving)?;
        let p = &self.params;
        let mut u1 = fixed.like();
        let mut u2 = fixed.like();
        let mut warped = moving.clone();
        for iter in 0..p.iterations {
            for &axis in &p.axis_order {
                let du = find_lag(axis, p.lags, &p.window, fixed, &warped)?;
                let total = match axis {
                    Axis::One => &mut u1,
                    Axis::Two => &mut u2,
                };
                for (t, &d) in total.data.iter_mut().zip(du.as_slice()) {
                    *t += d;
                }
                warped = warp(moving, &u1, &u2);
                if log::log_enabled!(log::Level::Debug) {
                    let mean_abs =
                        du.as_slice().iter().map(|v| v.abs() as f64).sum::<f64>()
                            / du.data.len() as f64;
                    debug!(
                        "LocalShiftFinder::estimate iter={iter} axis={axis:?} mean|du|={mean_abs:.4}"
                    );
                }
            }
        }
        scale_to_units(&mut u1, p.unit_scale * fixed.s1.delta);
        scale_to_units(&mut u2, p.unit_scale * fixed.s2.delta);
        Ok(DisplacementField { u1, u2 })
    }

    /// One-shot single-axis estimate: no iteration, no warping.
    pub fn estimate_axis(
        &self,
        axis: Axis,
        fixed: &Grid2D,
        moving: &Grid2D,
    ) -> ShiftResult<Grid2D> {
        ensure_same_shape(fixed, moving)?;
        let p = &self.params;
        let mut u = find_lag(axis, p.lags, &p.window, fixed, moving)?;
        let delta = match axis {
            Axis::One => fixed.s1.delta,
            Axis::Two => fixed.s2.delta,
        };
        scale_to_units(&mut u, p.unit_scale * delta);
        Ok(u)
    }
}

/// Resample `moving` at `(i1 + u1, i2 + u2)` with bilinear interpolation.
fn warp(moving: &Grid2D, u1: &Grid2D, u2: &Grid2D) -> Grid2D {
    let mut out = moving.like();
    for i2 in 0..out.n2 {
        for i1 in 0..out.n1 {
            let x1 = i1 as f32 + u1.get(i1, i2);
            let x2 = i2 as f32 + u2.get(i1, i2);
            out.set(i1, i2, moving.sample_bilinear(x1, x2));
        }
    }
    out
}

fn scale_to_units(u: &mut Grid2D, factor: f32) {
    for v in &mut u.data {
        *v *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Sampling;

    #[test]
    fn params_are_validated_eagerly() {
        let ok = LocalShiftFinder::new(ShiftParams::default());
        assert!(ok.is_ok());
        let mut p = ShiftParams::default();
        p.iterations = 0;
        assert!(LocalShiftFinder::new(p).is_err());
        let mut p = ShiftParams::default();
        p.window.sigma = -1.0;
        assert!(LocalShiftFinder::new(p).is_err());
        let mut p = ShiftParams::default();
        p.lags = LagRange { min: 2, max: -2 };
        assert!(LocalShiftFinder::new(p).is_err());
        let mut p = ShiftParams::default();
        p.axis_order.clear();
        assert!(LocalShiftFinder::new(p).is_err());
    }

    #[test]
    fn warp_with_zero_displacement_is_identity() {
        let g = Grid2D::from_fn(Sampling::unit(9), Sampling::unit(7), |i1, i2| {
            (i1 * 3 + i2) as f32
        });
        let z = g.like();
        let w = warp(&g, &z, &z);
        assert_eq!(w.as_slice(), g.as_slice());
    }

    #[test]
    fn warp_applies_constant_integer_shift() {
        let g = Grid2D::from_fn(Sampling::unit(10), Sampling::unit(4), |i1, _| i1 as f32);
        let u1 = g.map(|_| 2.0);
        let u2 = g.like();
        let w = warp(&g, &u1, &u2);
        for i2 in 0..4 {
            for i1 in 0..7 {
                assert_eq!(w.get(i1, i2), (i1 + 2) as f32);
            }
        }
    }

    #[test]
    fn estimate_rejects_shape_mismatch_before_work() {
        let finder = LocalShiftFinder::new(ShiftParams::default()).unwrap();
        let f = Grid2D::zeros(16, 16);
        let g = Grid2D::zeros(16, 17);
        assert!(matches!(
            finder.estimate(&f, &g),
            Err(ShiftError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            finder.estimate_axis(Axis::One, &f, &g),
            Err(ShiftError::ShapeMismatch { .. })
        ));
    }
}
