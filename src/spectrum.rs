//! Diagnostic amplitude spectra of filter impulse responses.
//!
//! Pads the input up to FFT-friendly (5-smooth) dimensions, runs a complex
//! 2-D DFT, and returns the magnitude with zero frequency recentered to
//! the middle of the grid. Not part of the estimation pipeline; used to
//! validate filter symmetry and notch behavior.

use crate::grid::{Grid2D, Sampling};
use rustfft::{num_complex::Complex, FftPlanner};

/// Smallest `m >= n` whose prime factors are all in {2, 3, 5}.
pub fn next_fast_size(n: usize) -> usize {
    let mut m = n.max(1);
    loop {
        let mut r = m;
        for p in [2usize, 3, 5] {
            while r % p == 0 {
                r /= p;
            }
        }
        if r == 1 {
            return m;
        }
        m += 1;
    }
}

/// Amplitude spectrum of `impulse`, zero frequency at the grid center.
///
/// The output is `next_fast_size(n1) x next_fast_size(n2)` with unit
/// sampling whose origin places zero frequency at coordinate zero.
pub fn frequency_response(impulse: &Grid2D) -> Grid2D {
    let m1 = next_fast_size(impulse.n1);
    let m2 = next_fast_size(impulse.n2);

    // zero-padded complex copy, axis 1 fast
    let mut cx = vec![Complex::new(0.0f32, 0.0); m1 * m2];
    for i2 in 0..impulse.n2 {
        let src = impulse.row(i2);
        for (i1, &v) in src.iter().enumerate() {
            cx[i2 * m1 + i1].re = v;
        }
    }

    let mut planner = FftPlanner::<f32>::new();
    let fft1 = planner.plan_fft_forward(m1);
    for row in cx.chunks_exact_mut(m1) {
        fft1.process(row);
    }
    let fft2 = planner.plan_fft_forward(m2);
    let mut column = vec![Complex::new(0.0f32, 0.0); m2];
    for i1 in 0..m1 {
        for i2 in 0..m2 {
            column[i2] = cx[i2 * m1 + i1];
        }
        fft2.process(&mut column);
        for i2 in 0..m2 {
            cx[i2 * m1 + i1] = column[i2];
        }
    }

    // magnitude with quadrant swap so zero frequency sits at the center
    let h1 = m1 / 2;
    let h2 = m2 / 2;
    let s1 = Sampling {
        count: m1,
        delta: 1.0,
        first: -(h1 as f32),
    };
    let s2 = Sampling {
        count: m2,
        delta: 1.0,
        first: -(h2 as f32),
    };
    let mut out = Grid2D::new(s1, s2);
    for i2 in 0..m2 {
        let j2 = (i2 + h2) % m2;
        for i1 in 0..m1 {
            let j1 = (i1 + h1) % m1;
            out.set(j1, j2, cx[i2 * m1 + i1].norm());
        }
    }
    out
}
