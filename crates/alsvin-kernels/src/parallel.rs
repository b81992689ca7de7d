//! Rayon-partitioned ("ParallelLM") gate kernels.
//!
//! The outer amplitude loop of the LM kernels is split across worker
//! threads with a fork/join barrier. Mixing gates partition the buffer into
//! disjoint blocks of `2^(rev_wire+1)` amplitudes, so the closures touch
//! non-overlapping ranges and no locking is needed. Diagonal gates iterate
//! amplitudes independently and parallelize index-wise.
//!
//! Only operations whose index structure maps onto disjoint chunks are
//! implemented here; everything else stays with the scalar LM backend.

use alsvin_gates::{rot_matrix, GateOp, GeneratorOp, MatrixOp};
use alsvin_types::{BackendTag, Precision, PrecisionKind};
use num_complex::Complex;
use rayon::prelude::*;

use crate::backend::{BackendDescriptor, PauliGenerator};
use crate::check::{check_multi_wires, check_state, check_wires};
use crate::error::KernelResult;
use crate::lm::{rz_shifts, wires_parity_mask};

fn scalar_alignment(kind: PrecisionKind) -> usize {
    match kind {
        PrecisionKind::F32 => std::mem::align_of::<f32>(),
        PrecisionKind::F64 => std::mem::align_of::<f64>(),
    }
}

fn scalar_bytes(kind: PrecisionKind) -> usize {
    match kind {
        PrecisionKind::F32 => std::mem::size_of::<f32>(),
        PrecisionKind::F64 => std::mem::size_of::<f64>(),
    }
}

/// Descriptor of the ParallelLM backend.
pub static DESCRIPTOR: BackendDescriptor = BackendDescriptor {
    tag: BackendTag::ParallelLm,
    name: "ParallelLM",
    required_alignment: scalar_alignment,
    packed_bytes: scalar_bytes,
    gates: &[
        GateOp::Identity,
        GateOp::PauliX,
        GateOp::PauliY,
        GateOp::PauliZ,
        GateOp::Hadamard,
        GateOp::S,
        GateOp::T,
        GateOp::RX,
        GateOp::RY,
        GateOp::RZ,
        GateOp::PhaseShift,
        GateOp::Rot,
        GateOp::CZ,
        GateOp::ControlledPhaseShift,
        GateOp::CRZ,
        GateOp::IsingZZ,
        GateOp::MultiRZ,
    ],
    generators: &[
        GeneratorOp::RX,
        GeneratorOp::RY,
        GeneratorOp::RZ,
        GeneratorOp::MultiRZ,
    ],
    matrices: &[MatrixOp::SingleQubitOp],
};

/// Apply `op` to every `(|0>, |1>)` amplitude pair of one wire, partitioned
/// across threads. Each rayon chunk is one block of `2^(rev_wire+1)`
/// amplitudes; the pair partner lives in the upper half of the same block.
fn for_each_pair<P, F>(state: &mut [Complex<P>], rev_wire: usize, op: F)
where
    P: Precision,
    F: Fn(&mut Complex<P>, &mut Complex<P>) + Send + Sync,
{
    let half = 1usize << rev_wire;
    state.par_chunks_mut(half * 2).for_each(|chunk| {
        let (lower, upper) = chunk.split_at_mut(half);
        for (v0, v1) in lower.iter_mut().zip(upper.iter_mut()) {
            op(v0, v1);
        }
    });
}

/// The rayon-partitioned kernel backend.
pub struct KernelsParallelLM;

impl KernelsParallelLM {
    #[inline]
    fn rev_wire1q<P: Precision>(
        state: &[Complex<P>],
        num_qubits: usize,
        wires: &[usize],
    ) -> KernelResult<usize> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        Ok(num_qubits - wires[0] - 1)
    }

    #[inline]
    fn rev_wires2q<P: Precision>(
        state: &[Complex<P>],
        num_qubits: usize,
        wires: &[usize],
    ) -> KernelResult<(usize, usize)> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        Ok((num_qubits - wires[1] - 1, num_qubits - wires[0] - 1))
    }

    pub fn apply_single_qubit_op<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        matrix: &[Complex<P>; 4],
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let m = if inverse {
            [
                matrix[0b00].conj(),
                matrix[0b10].conj(),
                matrix[0b01].conj(),
                matrix[0b11].conj(),
            ]
        } else {
            *matrix
        };

        for_each_pair(state, rev_wire, move |v0, v1| {
            let a = *v0;
            let b = *v1;
            *v0 = m[0] * a + m[1] * b;
            *v1 = m[2] * a + m[3] * b;
        });
        Ok(())
    }

    pub fn apply_identity<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        let _ = Self::rev_wire1q(state, num_qubits, wires)?;
        Ok(())
    }

    pub fn apply_pauli_x<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        for_each_pair(state, rev_wire, |v0, v1| std::mem::swap(v0, v1));
        Ok(())
    }

    pub fn apply_pauli_y<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        for_each_pair(state, rev_wire, |v0, v1| {
            let a = *v0;
            let b = *v1;
            *v0 = Complex::new(b.im, -b.re);
            *v1 = Complex::new(-a.im, a.re);
        });
        Ok(())
    }

    pub fn apply_pauli_z<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let mask = 1usize << rev_wire;
        state.par_iter_mut().enumerate().for_each(|(k, amp)| {
            if k & mask != 0 {
                *amp = -*amp;
            }
        });
        Ok(())
    }

    pub fn apply_hadamard<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let isqrt2 = P::FRAC_1_SQRT_2();
        for_each_pair(state, rev_wire, move |v0, v1| {
            let a = *v0;
            let b = *v1;
            *v0 = (a + b) * isqrt2;
            *v1 = (a - b) * isqrt2;
        });
        Ok(())
    }

    pub fn apply_s<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let mask = 1usize << rev_wire;
        let shift = if inverse {
            -Complex::<P>::i()
        } else {
            Complex::<P>::i()
        };
        state.par_iter_mut().enumerate().for_each(|(k, amp)| {
            if k & mask != 0 {
                *amp *= shift;
            }
        });
        Ok(())
    }

    pub fn apply_t<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let mask = 1usize << rev_wire;
        let isqrt2 = P::FRAC_1_SQRT_2();
        let shift = Complex::new(isqrt2, if inverse { -isqrt2 } else { isqrt2 });
        state.par_iter_mut().enumerate().for_each(|(k, amp)| {
            if k & mask != 0 {
                *amp *= shift;
            }
        });
        Ok(())
    }

    pub fn apply_phase_shift<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let mask = 1usize << rev_wire;
        let angle = if inverse { -angle } else { angle };
        let shift = Complex::from_polar(P::one(), angle);
        state.par_iter_mut().enumerate().for_each(|(k, amp)| {
            if k & mask != 0 {
                *amp *= shift;
            }
        });
        Ok(())
    }

    pub fn apply_rx<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let js = if inverse { half.sin() } else { -half.sin() };
        for_each_pair(state, rev_wire, move |v0, v1| {
            let a = *v0;
            let b = *v1;
            *v0 = a * c + Complex::new(-b.im * js, b.re * js);
            *v1 = Complex::new(-a.im * js, a.re * js) + b * c;
        });
        Ok(())
    }

    pub fn apply_ry<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let s = if inverse { -half.sin() } else { half.sin() };
        for_each_pair(state, rev_wire, move |v0, v1| {
            let a = *v0;
            let b = *v1;
            *v0 = a * c - b * s;
            *v1 = a * s + b * c;
        });
        Ok(())
    }

    pub fn apply_rz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let mask = 1usize << rev_wire;
        let shifts = rz_shifts(angle, inverse);
        state.par_iter_mut().enumerate().for_each(|(k, amp)| {
            *amp *= shifts[usize::from(k & mask != 0)];
        });
        Ok(())
    }

    pub fn apply_rot<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        phi: P,
        theta: P,
        omega: P,
    ) -> KernelResult<()> {
        let matrix = if inverse {
            rot_matrix(-omega, -theta, -phi)
        } else {
            rot_matrix(phi, theta, omega)
        };
        Self::apply_single_qubit_op(state, num_qubits, &matrix, wires, false)
    }

    pub fn apply_cz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let mask = (1usize << rev_wire0) | (1usize << rev_wire1);
        state.par_iter_mut().enumerate().for_each(|(k, amp)| {
            if k & mask == mask {
                *amp = -*amp;
            }
        });
        Ok(())
    }

    pub fn apply_controlled_phase_shift<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let mask = (1usize << rev_wire0) | (1usize << rev_wire1);
        let angle = if inverse { -angle } else { angle };
        let shift = Complex::from_polar(P::one(), angle);
        state.par_iter_mut().enumerate().for_each(|(k, amp)| {
            if k & mask == mask {
                *amp *= shift;
            }
        });
        Ok(())
    }

    pub fn apply_crz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let control = 1usize << rev_wire1;
        let target = 1usize << rev_wire0;
        let shifts = rz_shifts(angle, inverse);
        state.par_iter_mut().enumerate().for_each(|(k, amp)| {
            if k & control != 0 {
                *amp *= shifts[usize::from(k & target != 0)];
            }
        });
        Ok(())
    }

    pub fn apply_ising_zz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let mask0 = 1usize << rev_wire0;
        let mask1 = 1usize << rev_wire1;
        let shifts = rz_shifts(angle, inverse);
        state.par_iter_mut().enumerate().for_each(|(k, amp)| {
            let parity = usize::from(k & mask0 != 0) ^ usize::from(k & mask1 != 0);
            *amp *= shifts[parity];
        });
        Ok(())
    }

    pub fn apply_multi_rz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_multi_wires(num_qubits, wires)?;
        let wires_parity = wires_parity_mask(num_qubits, wires);
        let shifts = rz_shifts(angle, inverse);
        state.par_iter_mut().enumerate().for_each(|(k, amp)| {
            *amp *= shifts[((k & wires_parity).count_ones() % 2) as usize];
        });
        Ok(())
    }

    pub fn apply_generator_multi_rz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        check_state(state, num_qubits)?;
        check_multi_wires(num_qubits, wires)?;
        let wires_parity = wires_parity_mask(num_qubits, wires);
        state.par_iter_mut().enumerate().for_each(|(k, amp)| {
            if (k & wires_parity).count_ones() % 2 == 0 {
                *amp = -*amp;
            }
        });
        Ok(P::from_f64(0.5))
    }
}

impl PauliGenerator for KernelsParallelLM {
    fn pauli_x<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        Self::apply_pauli_x(state, num_qubits, wires, inverse)
    }

    fn pauli_y<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        Self::apply_pauli_y(state, num_qubits, wires, inverse)
    }

    fn pauli_z<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        Self::apply_pauli_z(state, num_qubits, wires, inverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lm::KernelsLM;
    use num_complex::Complex64;

    fn random_like_state(num_qubits: usize) -> Vec<Complex64> {
        // Deterministic pseudo-random amplitudes; normalization is not
        // needed for linearity checks.
        (0..1usize << num_qubits)
            .map(|k| {
                let x = (k as f64 * 0.7321 + 0.131).sin();
                let y = (k as f64 * 1.113 - 0.577).cos();
                Complex64::new(x, y)
            })
            .collect()
    }

    fn assert_states_close(a: &[Complex64], b: &[Complex64]) {
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).norm() < 1e-12, "{x} != {y}");
        }
    }

    #[test]
    fn test_parallel_matches_lm_single_qubit() {
        let theta = 0.83;
        for wire in 0..4 {
            let mut parallel = random_like_state(4);
            let mut scalar = parallel.clone();
            KernelsParallelLM::apply_rx(&mut parallel, 4, &[wire], false, theta).unwrap();
            KernelsLM::apply_rx(&mut scalar, 4, &[wire], false, theta).unwrap();
            assert_states_close(&parallel, &scalar);

            let mut parallel = random_like_state(4);
            let mut scalar = parallel.clone();
            KernelsParallelLM::apply_hadamard(&mut parallel, 4, &[wire], false).unwrap();
            KernelsLM::apply_hadamard(&mut scalar, 4, &[wire], false).unwrap();
            assert_states_close(&parallel, &scalar);
        }
    }

    #[test]
    fn test_parallel_matches_lm_diagonals() {
        let theta = -1.2;
        let mut parallel = random_like_state(5);
        let mut scalar = parallel.clone();
        KernelsParallelLM::apply_ising_zz(&mut parallel, 5, &[1, 3], false, theta).unwrap();
        KernelsLM::apply_ising_zz(&mut scalar, 5, &[1, 3], false, theta).unwrap();
        assert_states_close(&parallel, &scalar);

        let mut parallel = random_like_state(5);
        let mut scalar = parallel.clone();
        KernelsParallelLM::apply_crz(&mut parallel, 5, &[0, 4], false, theta).unwrap();
        KernelsLM::apply_crz(&mut scalar, 5, &[0, 4], false, theta).unwrap();
        assert_states_close(&parallel, &scalar);
    }

    #[test]
    fn test_parallel_multi_rz_matches_lm() {
        let theta = 0.4;
        let mut parallel = random_like_state(5);
        let mut scalar = parallel.clone();
        KernelsParallelLM::apply_multi_rz(&mut parallel, 5, &[0, 2, 4], false, theta).unwrap();
        KernelsLM::apply_multi_rz(&mut scalar, 5, &[0, 2, 4], false, theta).unwrap();
        assert_states_close(&parallel, &scalar);
    }
}
