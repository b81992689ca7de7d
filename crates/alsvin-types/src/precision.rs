//! Floating-point precision of statevector amplitudes.

use std::fmt::Debug;

use num_traits::{Float, FloatConst, NumAssign};

/// Discriminant for the two supported precisions.
///
/// Kernels that need to pick a concrete lane layout (the SIMD backends)
/// branch on this rather than on `TypeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrecisionKind {
    /// IEEE-754 binary32.
    F32,
    /// IEEE-754 binary64.
    F64,
}

/// Floating-point type usable as the real/imaginary component of an
/// amplitude.
///
/// Implemented for `f32` and `f64` only. Every kernel in the workspace is
/// generic over this trait; the two monomorphizations are the binary32 and
/// binary64 statevector cores.
pub trait Precision:
    Float + FloatConst + NumAssign + Debug + Send + Sync + 'static
{
    /// Which of the two supported precisions this is.
    const KIND: PrecisionKind;

    /// Lossy conversion from `f64` (exact for `f64` itself).
    fn from_f64(value: f64) -> Self;

    /// Alignment of the scalar type in bytes.
    fn alignment() -> usize {
        std::mem::align_of::<Self>()
    }

    /// Size of the scalar type in bytes.
    fn packed_bytes() -> usize {
        std::mem::size_of::<Self>()
    }
}

impl Precision for f32 {
    const KIND: PrecisionKind = PrecisionKind::F32;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Precision for f64 {
    const KIND: PrecisionKind = PrecisionKind::F64;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_kinds() {
        assert_eq!(<f32 as Precision>::KIND, PrecisionKind::F32);
        assert_eq!(<f64 as Precision>::KIND, PrecisionKind::F64);
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(f32::from_f64(0.5), 0.5f32);
        assert_eq!(f64::from_f64(0.5), 0.5f64);
    }

    #[test]
    fn test_packed_bytes() {
        assert_eq!(<f32 as Precision>::packed_bytes(), 4);
        assert_eq!(<f64 as Precision>::packed_bytes(), 8);
    }
}
