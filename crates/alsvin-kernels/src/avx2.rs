//! AVX2 specializations of PauliX, RZ, and IsingZZ.
//!
//! Two code paths per kernel: an *internal* path when the reverse wire lies
//! within one 256-bit register (the amplitude reindexing becomes a lane
//! permutation), and an *external* path that follows the same parity-mask
//! algebra as the scalar LM kernel but moves a whole register of complex
//! elements per iteration. A register holds 4 `Complex<f32>` or 2
//! `Complex<f64>`; below the per-precision floor the kernels delegate to
//! LM.
//!
//! Availability is detected at runtime; on CPUs without AVX2 every entry
//! point falls back to LM, so calling these directly is always safe.

use std::any::TypeId;
use std::arch::x86_64::*;

use alsvin_gates::{GateOp, GeneratorOp, MatrixOp};
use alsvin_types::{BackendTag, Precision, PrecisionKind};
use num_complex::Complex;

use crate::backend::BackendDescriptor;
use crate::bits::{exp2, rev_wire_parity};
use crate::check::{check_state, check_wires};
use crate::error::KernelResult;
use crate::lm::KernelsLM;

fn simd_alignment(_kind: PrecisionKind) -> usize {
    32
}

fn simd_bytes(_kind: PrecisionKind) -> usize {
    32
}

/// Descriptor of the AVX2 backend.
pub static DESCRIPTOR: BackendDescriptor = BackendDescriptor {
    tag: BackendTag::Avx2,
    name: "AVX2",
    required_alignment: simd_alignment,
    packed_bytes: simd_bytes,
    gates: &[GateOp::PauliX, GateOp::RZ, GateOp::IsingZZ],
    generators: &[] as &[GeneratorOp],
    matrices: &[] as &[MatrixOp],
};

/// Whether the running CPU supports this backend.
pub fn is_available() -> bool {
    is_x86_feature_detected!("avx2")
}

/// Reinterpret the amplitude buffer at its concrete precision.
///
/// Only called from the match arm whose `PrecisionKind` equals `P::KIND`,
/// so source and target are the same type.
#[inline]
fn cast_state_mut<P: Precision, Q: Precision>(state: &mut [Complex<P>]) -> &mut [Complex<Q>] {
    debug_assert_eq!(TypeId::of::<P>(), TypeId::of::<Q>());
    let len = state.len();
    let ptr = state.as_mut_ptr().cast::<Complex<Q>>();
    unsafe { std::slice::from_raw_parts_mut(ptr, len) }
}

#[inline]
fn parity_sign1(index: usize, rev_wire: usize) -> bool {
    (index >> rev_wire) & 1 == 1
}

#[inline]
fn parity_sign2(index: usize, rev_wire0: usize, rev_wire1: usize) -> bool {
    (((index >> rev_wire0) ^ (index >> rev_wire1)) & 1) == 1
}

#[inline]
fn sign_f32(flag: bool) -> f32 {
    if flag {
        -1.0
    } else {
        1.0
    }
}

#[inline]
fn sign_f64(flag: bool) -> f64 {
    if flag {
        -1.0
    } else {
        1.0
    }
}

// =========================================================================
// f32 kernels
// =========================================================================

#[target_feature(enable = "avx2")]
unsafe fn pauli_x_f32_internal0(state: &mut [Complex<f32>]) {
    let ptr = state.as_mut_ptr().cast::<f32>();
    let mut k = 0;
    while k < state.len() {
        let v = _mm256_loadu_ps(ptr.add(2 * k));
        _mm256_storeu_ps(ptr.add(2 * k), _mm256_permute_ps::<0b0100_1110>(v));
        k += 4;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn pauli_x_f32_internal1(state: &mut [Complex<f32>]) {
    let ptr = state.as_mut_ptr().cast::<f32>();
    let mut k = 0;
    while k < state.len() {
        let v = _mm256_loadu_ps(ptr.add(2 * k));
        _mm256_storeu_ps(ptr.add(2 * k), _mm256_permute2f128_ps::<0x01>(v, v));
        k += 4;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn pauli_x_f32_external(state: &mut [Complex<f32>], num_qubits: usize, rev_wire: usize) {
    let rev_wire_shift = 1usize << rev_wire;
    let (parity_high, parity_low) = rev_wire_parity(rev_wire);
    let ptr = state.as_mut_ptr().cast::<f32>();

    let mut k = 0;
    while k < exp2(num_qubits - 1) {
        let i0 = ((k << 1) & parity_high) | (k & parity_low);
        let i1 = i0 | rev_wire_shift;
        let v0 = _mm256_loadu_ps(ptr.add(2 * i0));
        let v1 = _mm256_loadu_ps(ptr.add(2 * i1));
        _mm256_storeu_ps(ptr.add(2 * i0), v1);
        _mm256_storeu_ps(ptr.add(2 * i1), v0);
        k += 4;
    }
}

/// Diagonal phase loop for one reverse wire at f32: multiply each
/// amplitude by `cos(θ/2) ± i·sin(θ/2)`, the sign given per amplitude by
/// the bit at `rev_wire`.
#[target_feature(enable = "avx2")]
unsafe fn diagonal_f32_1(state: &mut [Complex<f32>], half_angle: f32, inverse: bool, rev_wire: usize) {
    let cos_factor = _mm256_set1_ps(half_angle.cos());
    let isin = if inverse {
        half_angle.sin()
    } else {
        -half_angle.sin()
    };
    let sin_factor = _mm256_setr_ps(isin, -isin, isin, -isin, isin, -isin, isin, -isin);
    let ptr = state.as_mut_ptr().cast::<f32>();

    let mut n = 0;
    while n < state.len() {
        let p0 = sign_f32(parity_sign1(n, rev_wire));
        let p1 = sign_f32(parity_sign1(n + 1, rev_wire));
        let p2 = sign_f32(parity_sign1(n + 2, rev_wire));
        let p3 = sign_f32(parity_sign1(n + 3, rev_wire));
        let parity_vec = _mm256_setr_ps(p0, p0, p1, p1, p2, p2, p3, p3);

        let coeffs = _mm256_loadu_ps(ptr.add(2 * n));
        let prod_cos = _mm256_mul_ps(cos_factor, coeffs);
        let prod_sin = _mm256_mul_ps(coeffs, _mm256_mul_ps(sin_factor, parity_vec));
        let prod = _mm256_add_ps(prod_cos, _mm256_permute_ps::<0b1011_0001>(prod_sin));
        _mm256_storeu_ps(ptr.add(2 * n), prod);
        n += 4;
    }
}

/// Two-reverse-wire variant of [`diagonal_f32_1`]; the per-amplitude sign
/// is the XOR of the two wire bits.
#[target_feature(enable = "avx2")]
unsafe fn diagonal_f32_2(
    state: &mut [Complex<f32>],
    half_angle: f32,
    inverse: bool,
    rev_wire0: usize,
    rev_wire1: usize,
) {
    let cos_factor = _mm256_set1_ps(half_angle.cos());
    let isin = if inverse {
        half_angle.sin()
    } else {
        -half_angle.sin()
    };
    let sin_factor = _mm256_setr_ps(isin, -isin, isin, -isin, isin, -isin, isin, -isin);
    let ptr = state.as_mut_ptr().cast::<f32>();

    let mut n = 0;
    while n < state.len() {
        let p0 = sign_f32(parity_sign2(n, rev_wire0, rev_wire1));
        let p1 = sign_f32(parity_sign2(n + 1, rev_wire0, rev_wire1));
        let p2 = sign_f32(parity_sign2(n + 2, rev_wire0, rev_wire1));
        let p3 = sign_f32(parity_sign2(n + 3, rev_wire0, rev_wire1));
        let parity_vec = _mm256_setr_ps(p0, p0, p1, p1, p2, p2, p3, p3);

        let coeffs = _mm256_loadu_ps(ptr.add(2 * n));
        let prod_cos = _mm256_mul_ps(cos_factor, coeffs);
        let prod_sin = _mm256_mul_ps(coeffs, _mm256_mul_ps(sin_factor, parity_vec));
        let prod = _mm256_add_ps(prod_cos, _mm256_permute_ps::<0b1011_0001>(prod_sin));
        _mm256_storeu_ps(ptr.add(2 * n), prod);
        n += 4;
    }
}

// =========================================================================
// f64 kernels
// =========================================================================

#[target_feature(enable = "avx2")]
unsafe fn pauli_x_f64_internal0(state: &mut [Complex<f64>]) {
    let ptr = state.as_mut_ptr().cast::<f64>();
    let mut k = 0;
    while k < state.len() {
        let v = _mm256_loadu_pd(ptr.add(2 * k));
        _mm256_storeu_pd(ptr.add(2 * k), _mm256_permute4x64_pd::<0b0100_1110>(v));
        k += 2;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn pauli_x_f64_external(state: &mut [Complex<f64>], num_qubits: usize, rev_wire: usize) {
    let rev_wire_shift = 1usize << rev_wire;
    let (parity_high, parity_low) = rev_wire_parity(rev_wire);
    let ptr = state.as_mut_ptr().cast::<f64>();

    let mut k = 0;
    while k < exp2(num_qubits - 1) {
        let i0 = ((k << 1) & parity_high) | (k & parity_low);
        let i1 = i0 | rev_wire_shift;
        let v0 = _mm256_loadu_pd(ptr.add(2 * i0));
        let v1 = _mm256_loadu_pd(ptr.add(2 * i1));
        _mm256_storeu_pd(ptr.add(2 * i0), v1);
        _mm256_storeu_pd(ptr.add(2 * i1), v0);
        k += 2;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn diagonal_f64_1(state: &mut [Complex<f64>], half_angle: f64, inverse: bool, rev_wire: usize) {
    let cos_factor = _mm256_set1_pd(half_angle.cos());
    let isin = if inverse {
        half_angle.sin()
    } else {
        -half_angle.sin()
    };
    let sin_factor = _mm256_setr_pd(isin, -isin, isin, -isin);
    let ptr = state.as_mut_ptr().cast::<f64>();

    let mut n = 0;
    while n < state.len() {
        let p0 = sign_f64(parity_sign1(n, rev_wire));
        let p1 = sign_f64(parity_sign1(n + 1, rev_wire));
        let parity_vec = _mm256_setr_pd(p0, p0, p1, p1);

        let coeffs = _mm256_loadu_pd(ptr.add(2 * n));
        let prod_cos = _mm256_mul_pd(cos_factor, coeffs);
        let prod_sin = _mm256_mul_pd(coeffs, _mm256_mul_pd(sin_factor, parity_vec));
        let prod = _mm256_add_pd(prod_cos, _mm256_permute_pd::<0b0101>(prod_sin));
        _mm256_storeu_pd(ptr.add(2 * n), prod);
        n += 2;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn diagonal_f64_2(
    state: &mut [Complex<f64>],
    half_angle: f64,
    inverse: bool,
    rev_wire0: usize,
    rev_wire1: usize,
) {
    let cos_factor = _mm256_set1_pd(half_angle.cos());
    let isin = if inverse {
        half_angle.sin()
    } else {
        -half_angle.sin()
    };
    let sin_factor = _mm256_setr_pd(isin, -isin, isin, -isin);
    let ptr = state.as_mut_ptr().cast::<f64>();

    let mut n = 0;
    while n < state.len() {
        let p0 = sign_f64(parity_sign2(n, rev_wire0, rev_wire1));
        let p1 = sign_f64(parity_sign2(n + 1, rev_wire0, rev_wire1));
        let parity_vec = _mm256_setr_pd(p0, p0, p1, p1);

        let coeffs = _mm256_loadu_pd(ptr.add(2 * n));
        let prod_cos = _mm256_mul_pd(cos_factor, coeffs);
        let prod_sin = _mm256_mul_pd(coeffs, _mm256_mul_pd(sin_factor, parity_vec));
        let prod = _mm256_add_pd(prod_cos, _mm256_permute_pd::<0b0101>(prod_sin));
        _mm256_storeu_pd(ptr.add(2 * n), prod);
        n += 2;
    }
}

/// The AVX2 kernel backend.
pub struct KernelsAvx2;

impl KernelsAvx2 {
    pub fn apply_pauli_x<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        if !is_available() {
            return KernelsLM::apply_pauli_x(state, num_qubits, wires, inverse);
        }
        let rev_wire = num_qubits - wires[0] - 1;

        match P::KIND {
            PrecisionKind::F32 => {
                if num_qubits < 2 {
                    return KernelsLM::apply_pauli_x(state, num_qubits, wires, inverse);
                }
                let state = cast_state_mut::<P, f32>(state);
                unsafe {
                    match rev_wire {
                        0 => pauli_x_f32_internal0(state),
                        1 => pauli_x_f32_internal1(state),
                        _ => pauli_x_f32_external(state, num_qubits, rev_wire),
                    }
                }
            }
            PrecisionKind::F64 => {
                let state = cast_state_mut::<P, f64>(state);
                unsafe {
                    match rev_wire {
                        0 => pauli_x_f64_internal0(state),
                        _ => pauli_x_f64_external(state, num_qubits, rev_wire),
                    }
                }
            }
        }
        Ok(())
    }

    pub fn apply_rz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        if !is_available() {
            return KernelsLM::apply_rz(state, num_qubits, wires, inverse, angle);
        }
        let rev_wire = num_qubits - wires[0] - 1;

        match P::KIND {
            PrecisionKind::F32 => {
                if num_qubits < 2 {
                    return KernelsLM::apply_rz(state, num_qubits, wires, inverse, angle);
                }
                let state = cast_state_mut::<P, f32>(state);
                let half = angle.to_f32().unwrap_or_default() / 2.0;
                unsafe {
                    diagonal_f32_1(state, half, inverse, rev_wire);
                }
            }
            PrecisionKind::F64 => {
                let state = cast_state_mut::<P, f64>(state);
                let half = angle.to_f64().unwrap_or_default() / 2.0;
                unsafe {
                    diagonal_f64_1(state, half, inverse, rev_wire);
                }
            }
        }
        Ok(())
    }

    pub fn apply_ising_zz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        if !is_available() {
            return KernelsLM::apply_ising_zz(state, num_qubits, wires, inverse, angle);
        }
        let rev_wire0 = num_qubits - wires[1] - 1;
        let rev_wire1 = num_qubits - wires[0] - 1;

        match P::KIND {
            PrecisionKind::F32 => {
                let state = cast_state_mut::<P, f32>(state);
                let half = angle.to_f32().unwrap_or_default() / 2.0;
                unsafe {
                    diagonal_f32_2(state, half, inverse, rev_wire0, rev_wire1);
                }
            }
            PrecisionKind::F64 => {
                let state = cast_state_mut::<P, f64>(state);
                let half = angle.to_f64().unwrap_or_default() / 2.0;
                unsafe {
                    diagonal_f64_2(state, half, inverse, rev_wire0, rev_wire1);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn test_state_f64(num_qubits: usize) -> Vec<Complex64> {
        (0..1usize << num_qubits)
            .map(|k| Complex64::new((k as f64 * 0.311).sin(), (k as f64 * 0.717).cos()))
            .collect()
    }

    fn test_state_f32(num_qubits: usize) -> Vec<Complex<f32>> {
        (0..1usize << num_qubits)
            .map(|k| Complex::new((k as f32 * 0.311).sin(), (k as f32 * 0.717).cos()))
            .collect()
    }

    #[test]
    fn test_pauli_x_matches_lm_f64() {
        for num_qubits in 1..=5 {
            for wire in 0..num_qubits {
                let mut simd = test_state_f64(num_qubits);
                let mut scalar = simd.clone();
                KernelsAvx2::apply_pauli_x(&mut simd, num_qubits, &[wire], false).unwrap();
                KernelsLM::apply_pauli_x(&mut scalar, num_qubits, &[wire], false).unwrap();
                for (a, b) in simd.iter().zip(&scalar) {
                    assert!((a - b).norm() < 1e-14);
                }
            }
        }
    }

    #[test]
    fn test_pauli_x_matches_lm_f32() {
        for num_qubits in 1..=5 {
            for wire in 0..num_qubits {
                let mut simd = test_state_f32(num_qubits);
                let mut scalar = simd.clone();
                KernelsAvx2::apply_pauli_x(&mut simd, num_qubits, &[wire], false).unwrap();
                KernelsLM::apply_pauli_x(&mut scalar, num_qubits, &[wire], false).unwrap();
                for (a, b) in simd.iter().zip(&scalar) {
                    assert!((a - b).norm() < 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_rz_matches_lm() {
        let theta = 0.97;
        for num_qubits in 1..=5 {
            for wire in 0..num_qubits {
                let mut simd = test_state_f64(num_qubits);
                let mut scalar = simd.clone();
                KernelsAvx2::apply_rz(&mut simd, num_qubits, &[wire], false, theta).unwrap();
                KernelsLM::apply_rz(&mut scalar, num_qubits, &[wire], false, theta).unwrap();
                for (a, b) in simd.iter().zip(&scalar) {
                    assert!((a - b).norm() < 1e-13);
                }
            }
        }
    }

    #[test]
    fn test_ising_zz_matches_lm() {
        let theta = -0.41;
        for inverse in [false, true] {
            let mut simd = test_state_f64(4);
            let mut scalar = simd.clone();
            KernelsAvx2::apply_ising_zz(&mut simd, 4, &[1, 3], inverse, theta).unwrap();
            KernelsLM::apply_ising_zz(&mut scalar, 4, &[1, 3], inverse, theta).unwrap();
            for (a, b) in simd.iter().zip(&scalar) {
                assert!((a - b).norm() < 1e-13);
            }
        }
    }
}
