//! Fixed-point arithmetic at the ray (1e27) and wad (1e18) scales.

pub mod ray;

pub use ray::{ray, ray_div, ray_mul, ray_to_wad, to_decimal, wad, wad_to_ray};

use thiserror::Error;

/// Fatal arithmetic failures.
///
/// A zero denominator means an asset was never configured; overflow means a
/// malformed on-chain value. Neither is recoverable mid-event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    #[error("integer {0} does not fit in a decimal")]
    DecimalRange(String),
}
