//! Error type shared by the estimation and decomposition entry points.

/// Reasons why a grid operation may be rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShiftError {
    /// Two grids passed to a binary operation have different dimensions.
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
    /// A configuration value is outside its valid range.
    InvalidParameter {
        name: &'static str,
        value: f64,
    },
    /// An orientation vector could not be normalized.
    DegenerateOrientation {
        i1: usize,
        i2: usize,
    },
}

impl std::fmt::Display for ShiftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftError::ShapeMismatch { left, right } => {
                write!(
                    f,
                    "grid shape mismatch ({}x{} vs {}x{})",
                    left.0, left.1, right.0, right.1
                )
            }
            ShiftError::InvalidParameter { name, value } => {
                write!(f, "invalid parameter {name} = {value}")
            }
            ShiftError::DegenerateOrientation { i1, i2 } => {
                write!(f, "degenerate orientation vector at ({i1}, {i2})")
            }
        }
    }
}

impl std::error::Error for ShiftError {}

pub type ShiftResult<T> = Result<T, ShiftError>;
