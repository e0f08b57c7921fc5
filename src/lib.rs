#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod decompose;
pub mod error;
pub mod grid;
pub mod shift;
pub mod whiten;

// “Expert” modules – still public, but considered unstable internals.
pub mod config;
pub mod gauss;
pub mod io;
pub mod lcc;
pub mod spectrum;

// --- High-level re-exports -------------------------------------------------

// Main entry points: estimator + decomposer and their data types.
pub use crate::decompose::{decompose, Decomposition, OrientationField};
pub use crate::error::{ShiftError, ShiftResult};
pub use crate::grid::{Axis, Grid2D, Sampling};
pub use crate::shift::{DisplacementField, LocalShiftFinder, ShiftParams};
pub use crate::whiten::whiten;

// Correlation-level building blocks that are generally useful.
pub use crate::lcc::{find_lag, CorrelationWindow, LagRange, WindowKind};

/// Small prelude for quick experiments.
///
/// ```no_run
/// use shift_field::prelude::*;
///
/// # fn main() -> ShiftResult<()> {
/// let f = Grid2D::zeros(128, 96);
/// let g = f.clone();
/// let finder = LocalShiftFinder::new(ShiftParams::default())?;
/// let uv = finder.estimate(&f, &g)?;
/// println!("u1[0] = {}", uv.u1.get(0, 0));
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::decompose::{decompose, OrientationField};
    pub use crate::error::{ShiftError, ShiftResult};
    pub use crate::grid::{Axis, Grid2D, Sampling};
    pub use crate::shift::{DisplacementField, LocalShiftFinder, ShiftParams};
    pub use crate::whiten::whiten;
}
