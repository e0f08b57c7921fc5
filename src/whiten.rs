//! Spectral whitening: flatten the amplitude spectrum before correlation.
//!
//! Large-scale amplitude structure dominates the normalized correlation
//! used by the lag search and washes out its peak. Whitening estimates the
//! local signal energy with a Gaussian lowpass along the fast axis and
//! divides the input by the stabilized square root of that energy, leaving
//! a locally unit-power signal.

use crate::error::ShiftResult;
use crate::gauss;
use crate::grid::Grid2D;

/// Fraction of the mean energy added to the denominator.
const STABILIZER: f32 = 1e-3;

/// Divide `input` by its local RMS amplitude, smoothed with width `sigma`
/// along axis 1. Output has the same shape and samplings as the input.
pub fn whiten(sigma: f32, input: &Grid2D) -> ShiftResult<Grid2D> {
    let energy = gauss::smooth1(sigma, &input.map(|v| v * v))?;
    let n = energy.data.len() as f32;
    let mean = energy.as_slice().iter().sum::<f32>() / n;
    let floor = (STABILIZER * mean).max(f32::MIN_POSITIVE);
    let mut out = input.clone();
    for (v, e) in out.data.iter_mut().zip(energy.as_slice()) {
        *v /= (e + floor).sqrt();
    }
    Ok(out)
}
