//! Dense 2-D grid of f32 samples with uniform per-axis sampling.
//!
//! Axis 1 is the fast axis: `idx = i2 * n1 + i1`, so a "row" holds all
//! `i1` samples at a fixed `i2`. Grids own their storage; pipeline stages
//! take inputs by shared reference and return fresh grids.

use crate::error::{ShiftError, ShiftResult};
use serde::{Deserialize, Serialize};

/// Grid axis selector; axis 1 is the fast axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    One,
    Two,
}

/// Uniformly sampled axis: `count` samples at `first + i * delta`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sampling {
    /// Number of samples (>= 1)
    pub count: usize,
    /// Sampling interval (> 0)
    pub delta: f32,
    /// Coordinate of the first sample
    pub first: f32,
}

impl Sampling {
    pub fn new(count: usize, delta: f32, first: f32) -> ShiftResult<Self> {
        if count == 0 {
            return Err(ShiftError::InvalidParameter {
                name: "sampling.count",
                value: count as f64,
            });
        }
        if !(delta > 0.0) {
            return Err(ShiftError::InvalidParameter {
                name: "sampling.delta",
                value: delta as f64,
            });
        }
        Ok(Self {
            count,
            delta,
            first,
        })
    }

    /// Unit sampling starting at zero.
    pub fn unit(count: usize) -> Self {
        Self {
            count,
            delta: 1.0,
            first: 0.0,
        }
    }

    /// Coordinate of sample `i`.
    #[inline]
    pub fn value(&self, i: usize) -> f32 {
        self.first + i as f32 * self.delta
    }
}

/// Owned rectangular array of f32 values addressed as `(i1, i2)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2D {
    /// Fast-axis sample count
    pub n1: usize,
    /// Slow-axis sample count
    pub n2: usize,
    /// Fast-axis sampling
    pub s1: Sampling,
    /// Slow-axis sampling
    pub s2: Sampling,
    /// Backing storage, axis 1 fast
    pub data: Vec<f32>,
}

impl Grid2D {
    /// Zero-filled grid with the given samplings.
    pub fn new(s1: Sampling, s2: Sampling) -> Self {
        Self {
            n1: s1.count,
            n2: s2.count,
            s1,
            s2,
            data: vec![0.0; s1.count * s2.count],
        }
    }

    /// Zero-filled grid with unit samplings.
    pub fn zeros(n1: usize, n2: usize) -> Self {
        Self::new(Sampling::unit(n1), Sampling::unit(n2))
    }

    /// Wrap an existing buffer; its length must equal `n1 * n2`.
    pub fn from_vec(s1: Sampling, s2: Sampling, data: Vec<f32>) -> ShiftResult<Self> {
        if data.len() != s1.count * s2.count {
            return Err(ShiftError::ShapeMismatch {
                left: (s1.count, s2.count),
                right: (data.len(), 1),
            });
        }
        Ok(Self {
            n1: s1.count,
            n2: s2.count,
            s1,
            s2,
            data,
        })
    }

    /// Build a grid by evaluating `f(i1, i2)` at every sample.
    pub fn from_fn(s1: Sampling, s2: Sampling, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut g = Self::new(s1, s2);
        for i2 in 0..g.n2 {
            for i1 in 0..g.n1 {
                let v = f(i1, i2);
                g.set(i1, i2, v);
            }
        }
        g
    }

    /// Zero-filled grid with the same shape and samplings as `self`.
    pub fn like(&self) -> Self {
        Self::new(self.s1, self.s2)
    }

    #[inline]
    pub fn idx(&self, i1: usize, i2: usize) -> usize {
        i2 * self.n1 + i1
    }

    #[inline]
    pub fn get(&self, i1: usize, i2: usize) -> f32 {
        self.data[self.idx(i1, i2)]
    }

    #[inline]
    pub fn set(&mut self, i1: usize, i2: usize, v: f32) {
        let i = self.idx(i1, i2);
        self.data[i] = v;
    }

    /// All fast-axis samples at slow index `i2`.
    #[inline]
    pub fn row(&self, i2: usize) -> &[f32] {
        let start = i2 * self.n1;
        &self.data[start..start + self.n1]
    }

    #[inline]
    pub fn row_mut(&mut self, i2: usize) -> &mut [f32] {
        let start = i2 * self.n1;
        let end = start + self.n1;
        &mut self.data[start..end]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn same_shape(&self, other: &Grid2D) -> bool {
        self.n1 == other.n1 && self.n2 == other.n2
    }

    /// New grid with `f` applied to every sample; samplings preserved.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            n1: self.n1,
            n2: self.n2,
            s1: self.s1,
            s2: self.s2,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Clamped-index lookup; out-of-range indices replicate the border.
    #[inline]
    pub fn get_clamped(&self, i1: isize, i2: isize) -> f32 {
        let i1 = i1.clamp(0, self.n1 as isize - 1) as usize;
        let i2 = i2.clamp(0, self.n2 as isize - 1) as usize;
        self.get(i1, i2)
    }

    /// Bilinear sample at fractional indices with border replication.
    pub fn sample_bilinear(&self, x1: f32, x2: f32) -> f32 {
        let j1 = x1.floor();
        let j2 = x2.floor();
        let a1 = x1 - j1;
        let a2 = x2 - j2;
        let j1 = j1 as isize;
        let j2 = j2 as isize;
        let v00 = self.get_clamped(j1, j2);
        let v10 = self.get_clamped(j1 + 1, j2);
        let v01 = self.get_clamped(j1, j2 + 1);
        let v11 = self.get_clamped(j1 + 1, j2 + 1);
        let v0 = v00 + a1 * (v10 - v00);
        let v1 = v01 + a1 * (v11 - v01);
        v0 + a2 * (v1 - v0)
    }
}

/// Check two grids for identical dimensions.
pub fn ensure_same_shape(a: &Grid2D, b: &Grid2D) -> ShiftResult<()> {
    if a.same_shape(b) {
        Ok(())
    } else {
        Err(ShiftError::ShapeMismatch {
            left: (a.n1, a.n2),
            right: (b.n1, b.n2),
        })
    }
}
