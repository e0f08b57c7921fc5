//! Synthetic grids shared by the integration tests.

use shift_field::grid::{Grid2D, Sampling};

/// Concentric-ring target pattern centered on the grid.
pub fn target_grid(n1: usize, n2: usize) -> Grid2D {
    let c1 = n1 as f32 / 2.0;
    let c2 = n2 as f32 / 2.0;
    Grid2D::from_fn(Sampling::unit(n1), Sampling::unit(n2), |i1, i2| {
        let d1 = i1 as f32 - c1;
        let d2 = i2 as f32 - c2;
        10.0 * (0.3 * (d1 * d1 + d2 * d2).sqrt()).sin()
    })
}

/// Plane-wave pattern dipping at `angle` radians.
pub fn plane_grid(n1: usize, n2: usize, angle: f32) -> Grid2D {
    let k = 0.3;
    let (s, c) = angle.sin_cos();
    Grid2D::from_fn(Sampling::unit(n1), Sampling::unit(n2), |i1, i2| {
        10.0 * (k * (c * i1 as f32 + s * i2 as f32)).sin()
    })
}

/// Unit impulse at the grid center.
pub fn impulse_grid(n1: usize, n2: usize) -> Grid2D {
    let mut g = Grid2D::zeros(n1, n2);
    g.set((n1 - 1) / 2, (n2 - 1) / 2, 1.0);
    g
}

/// Band-limited texture with structure along both axes.
pub fn textured_grid(n1: usize, n2: usize) -> Grid2D {
    Grid2D::from_fn(Sampling::unit(n1), Sampling::unit(n2), |i1, i2| {
        (0.9 * i1 as f32).sin() * (0.4 * i2 as f32).cos() + (0.23 * (i1 + 2 * i2) as f32).sin()
    })
}

/// Copy of `g` translated by a constant fractional offset along both
/// axes, `out(x) = g(x - k)`, sampled bilinearly with border replication.
pub fn translated(g: &Grid2D, k1: f32, k2: f32) -> Grid2D {
    Grid2D::from_fn(g.s1, g.s2, |i1, i2| {
        g.sample_bilinear(i1 as f32 - k1, i2 as f32 - k2)
    })
}
