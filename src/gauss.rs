//! Separable Gaussian smoothing with border replication.
//!
//! Both the spectral whitener and the correlation window reduce to 1-D
//! Gaussian passes over the grid, so the kernel lives here. The kernel is
//! sampled, truncated at four standard deviations and normalized to unit
//! sum; edges clamp to the nearest valid sample.

use crate::error::{ShiftError, ShiftResult};
use crate::grid::Grid2D;

/// Sampled Gaussian kernel of width `sigma`, truncated at `4 sigma`.
pub fn kernel(sigma: f32) -> ShiftResult<Vec<f32>> {
    if !(sigma > 0.0) {
        return Err(ShiftError::InvalidParameter {
            name: "sigma",
            value: sigma as f64,
        });
    }
    let radius = (4.0 * sigma).ceil() as usize;
    let mut w = Vec::with_capacity(2 * radius + 1);
    let inv = -0.5 / (sigma * sigma);
    for k in -(radius as isize)..=(radius as isize) {
        w.push(((k * k) as f32 * inv).exp());
    }
    let sum: f32 = w.iter().sum();
    for v in &mut w {
        *v /= sum;
    }
    Ok(w)
}

/// Smooth along axis 1 (the fast axis).
pub fn smooth1(sigma: f32, input: &Grid2D) -> ShiftResult<Grid2D> {
    let w = kernel(sigma)?;
    let radius = (w.len() / 2) as isize;
    let mut out = input.like();
    for i2 in 0..input.n2 {
        let src = input.row(i2);
        let dst = out.row_mut(i2);
        let n1 = src.len() as isize;
        for i1 in 0..src.len() {
            let mut acc = 0.0;
            for (k, &wk) in w.iter().enumerate() {
                let j = (i1 as isize + k as isize - radius).clamp(0, n1 - 1) as usize;
                acc += wk * src[j];
            }
            dst[i1] = acc;
        }
    }
    Ok(out)
}

/// Smooth along axis 2 (the slow axis).
pub fn smooth2(sigma: f32, input: &Grid2D) -> ShiftResult<Grid2D> {
    let w = kernel(sigma)?;
    let radius = (w.len() / 2) as isize;
    let mut out = input.like();
    let n2 = input.n2 as isize;
    for i2 in 0..input.n2 {
        let dst = out.row_mut(i2);
        for (k, &wk) in w.iter().enumerate() {
            let j2 = (i2 as isize + k as isize - radius).clamp(0, n2 - 1) as usize;
            let src = input.row(j2);
            for (d, &s) in dst.iter_mut().zip(src.iter()) {
                *d += wk * s;
            }
        }
    }
    Ok(out)
}

/// Smooth along both axes with the same width.
pub fn smooth_iso(sigma: f32, input: &Grid2D) -> ShiftResult<Grid2D> {
    let tmp = smooth1(sigma, input)?;
    smooth2(sigma, &tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid2D;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let w = kernel(2.5).unwrap();
        let sum: f32 = w.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        let n = w.len();
        for k in 0..n / 2 {
            assert!((w[k] - w[n - 1 - k]).abs() < 1e-7);
        }
        assert!(kernel(0.0).is_err());
    }

    #[test]
    fn constant_grid_is_invariant() {
        let g = Grid2D::zeros(16, 12).map(|_| 3.5);
        let s = smooth_iso(2.0, &g).unwrap();
        for &v in s.as_slice() {
            assert!((v - 3.5).abs() < 1e-5);
        }
    }

    #[test]
    fn smoothing_preserves_mean_of_interior_impulse() {
        let mut g = Grid2D::zeros(41, 41);
        g.set(20, 20, 1.0);
        let s = smooth_iso(1.5, &g).unwrap();
        let total: f32 = s.as_slice().iter().sum();
        assert!((total - 1.0).abs() < 1e-4, "total = {total}");
        // peak stays at the impulse
        let peak = s.get(20, 20);
        for &v in s.as_slice() {
            assert!(v <= peak + 1e-7);
        }
    }
}
