//! Memoryless ("LM") gate kernels.
//!
//! Every kernel derives the amplitude indices it touches on the fly from
//! reverse-wire parity masks, so no index lists are ever materialized. This
//! keeps the per-gate memory traffic at exactly the amplitudes the gate
//! mixes.

use alsvin_gates::{rot_matrix, GateOp, GeneratorOp, MatrixOp};
use alsvin_types::{BackendTag, Precision, PrecisionKind};
use num_complex::Complex;
use num_traits::Zero;

use crate::backend::{BackendDescriptor, PauliGenerator};
use crate::bits::{bitswap, exp2, rev_wire_parity, rev_wire_parity2};
use crate::check::{check_multi_wires, check_state, check_wires};
use crate::error::{KernelError, KernelResult};

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

/// Descriptor of the LM backend.
pub static DESCRIPTOR: BackendDescriptor = BackendDescriptor {
    tag: BackendTag::Lm,
    name: "LM",
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
        GateOp::CNOT,
        GateOp::CY,
        GateOp::CZ,
        GateOp::SWAP,
        GateOp::ControlledPhaseShift,
        GateOp::CRX,
        GateOp::CRY,
        GateOp::CRZ,
        GateOp::CRot,
        GateOp::IsingXX,
        GateOp::IsingXY,
        GateOp::IsingYY,
        GateOp::IsingZZ,
        GateOp::SingleExcitation,
        GateOp::SingleExcitationMinus,
        GateOp::SingleExcitationPlus,
        GateOp::MultiRZ,
    ],
    generators: &[
        GeneratorOp::RX,
        GeneratorOp::RY,
        GeneratorOp::RZ,
        GeneratorOp::PhaseShift,
        GeneratorOp::CRX,
        GeneratorOp::CRY,
        GeneratorOp::CRZ,
        GeneratorOp::ControlledPhaseShift,
        GeneratorOp::IsingXX,
        GeneratorOp::IsingYY,
        GeneratorOp::IsingZZ,
        GeneratorOp::SingleExcitation,
        GeneratorOp::SingleExcitationMinus,
        GeneratorOp::SingleExcitationPlus,
        GeneratorOp::MultiRZ,
    ],
    matrices: &[
        MatrixOp::SingleQubitOp,
        MatrixOp::TwoQubitOp,
        MatrixOp::MultiQubitOp,
    ],
};

/// The memoryless kernel backend.
pub struct KernelsLM;

impl KernelsLM {
    /// Checked reverse wire of a single-wire gate.
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

    /// Checked reverse wires of a two-wire gate, `(rev_wire0, rev_wire1)`
    /// with `rev_wire0` belonging to `wires[1]` (the less significant
    /// operand qubit) and `rev_wire1` to `wires[0]`.
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

    // =========================================================================
    // Dense matrix kernels
    // =========================================================================

    /// Apply a 2×2 matrix (row-major) to one wire.
    pub fn apply_single_qubit_op<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        matrix: &[Complex<P>; 4],
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let rev_wire_shift = 1usize << rev_wire;
        let (parity_high, parity_low) = rev_wire_parity(rev_wire);

        if inverse {
            for k in 0..exp2(num_qubits - 1) {
                let i0 = ((k << 1) & parity_high) | (k & parity_low);
                let i1 = i0 | rev_wire_shift;
                let v0 = state[i0];
                let v1 = state[i1];
                state[i0] = matrix[0b00].conj() * v0 + matrix[0b10].conj() * v1;
                state[i1] = matrix[0b01].conj() * v0 + matrix[0b11].conj() * v1;
            }
        } else {
            for k in 0..exp2(num_qubits - 1) {
                let i0 = ((k << 1) & parity_high) | (k & parity_low);
                let i1 = i0 | rev_wire_shift;
                let v0 = state[i0];
                let v1 = state[i1];
                state[i0] = matrix[0b00] * v0 + matrix[0b01] * v1;
                state[i1] = matrix[0b10] * v0 + matrix[0b11] * v1;
            }
        }
        Ok(())
    }

    /// Apply a 4×4 matrix (row-major) to two wires.
    pub fn apply_two_qubit_op<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        matrix: &[Complex<P>; 16],
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let indices = [i00, i00 | shift0, i00 | shift1, i00 | shift0 | shift1];
            let v = [
                state[indices[0]],
                state[indices[1]],
                state[indices[2]],
                state[indices[3]],
            ];

            if inverse {
                for (row, &idx) in indices.iter().enumerate() {
                    let mut acc = Complex::zero();
                    for (col, &amp) in v.iter().enumerate() {
                        acc += matrix[col * 4 + row].conj() * amp;
                    }
                    state[idx] = acc;
                }
            } else {
                for (row, &idx) in indices.iter().enumerate() {
                    let mut acc = Complex::zero();
                    for (col, &amp) in v.iter().enumerate() {
                        acc += matrix[row * 4 + col] * amp;
                    }
                    state[idx] = acc;
                }
            }
        }
        Ok(())
    }

    /// Apply a `2^k × 2^k` matrix (row-major) to `k` wires.
    ///
    /// For each outer block the touched amplitudes are gathered through the
    /// bit-swapped index map, multiplied, and scattered back. Under
    /// `inverse` the entry `(i, j)` is read as `conj(matrix[j * dim + i])`.
    pub fn apply_multi_qubit_op<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        matrix: &[Complex<P>],
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_multi_wires(num_qubits, wires)?;

        let n_wires = wires.len();
        let dim = exp2(n_wires);
        if matrix.len() != dim * dim {
            return Err(KernelError::InvalidArgument(format!(
                "matrix has {} entries, expected {} for {} wires",
                matrix.len(),
                dim * dim,
                n_wires
            )));
        }

        let mut indices = vec![0usize; dim];
        let mut coeffs_in = vec![Complex::<P>::zero(); dim];

        for k in (0..exp2(num_qubits)).step_by(dim) {
            for inner in 0..dim {
                let mut idx = k | inner;
                for (pos, &wire) in wires.iter().enumerate() {
                    idx = bitswap(idx, n_wires - pos - 1, num_qubits - wire - 1);
                }
                indices[inner] = idx;
                coeffs_in[inner] = state[idx];
            }

            if inverse {
                for (i, &idx) in indices.iter().enumerate() {
                    let mut acc = Complex::zero();
                    for (j, &coeff) in coeffs_in.iter().enumerate() {
                        acc += matrix[j * dim + i].conj() * coeff;
                    }
                    state[idx] = acc;
                }
            } else {
                for (i, &idx) in indices.iter().enumerate() {
                    let base = i * dim;
                    let mut acc = Complex::zero();
                    for (j, &coeff) in coeffs_in.iter().enumerate() {
                        acc += matrix[base + j] * coeff;
                    }
                    state[idx] = acc;
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

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
        let rev_wire_shift = 1usize << rev_wire;
        let (parity_high, parity_low) = rev_wire_parity(rev_wire);

        for k in 0..exp2(num_qubits - 1) {
            let i0 = ((k << 1) & parity_high) | (k & parity_low);
            let i1 = i0 | rev_wire_shift;
            state.swap(i0, i1);
        }
        Ok(())
    }

    pub fn apply_pauli_y<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let rev_wire_shift = 1usize << rev_wire;
        let (parity_high, parity_low) = rev_wire_parity(rev_wire);

        // The ±i phases reduce to a real/imaginary swap with one sign flip.
        for k in 0..exp2(num_qubits - 1) {
            let i0 = ((k << 1) & parity_high) | (k & parity_low);
            let i1 = i0 | rev_wire_shift;
            let v0 = state[i0];
            let v1 = state[i1];
            state[i0] = Complex::new(v1.im, -v1.re);
            state[i1] = Complex::new(-v0.im, v0.re);
        }
        Ok(())
    }

    pub fn apply_pauli_z<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let rev_wire_shift = 1usize << rev_wire;
        let (parity_high, parity_low) = rev_wire_parity(rev_wire);

        for k in 0..exp2(num_qubits - 1) {
            let i0 = ((k << 1) & parity_high) | (k & parity_low);
            let i1 = i0 | rev_wire_shift;
            state[i1] = -state[i1];
        }
        Ok(())
    }

    pub fn apply_hadamard<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let rev_wire_shift = 1usize << rev_wire;
        let (parity_high, parity_low) = rev_wire_parity(rev_wire);
        let isqrt2 = P::FRAC_1_SQRT_2();

        for k in 0..exp2(num_qubits - 1) {
            let i0 = ((k << 1) & parity_high) | (k & parity_low);
            let i1 = i0 | rev_wire_shift;
            let v0 = state[i0];
            let v1 = state[i1];
            state[i0] = (v0 + v1) * isqrt2;
            state[i1] = (v0 - v1) * isqrt2;
        }
        Ok(())
    }

    pub fn apply_s<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let rev_wire_shift = 1usize << rev_wire;
        let (parity_high, parity_low) = rev_wire_parity(rev_wire);

        let shift = if inverse {
            -Complex::<P>::i()
        } else {
            Complex::<P>::i()
        };

        for k in 0..exp2(num_qubits - 1) {
            let i0 = ((k << 1) & parity_high) | (k & parity_low);
            let i1 = i0 | rev_wire_shift;
            state[i1] *= shift;
        }
        Ok(())
    }

    pub fn apply_t<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let rev_wire_shift = 1usize << rev_wire;
        let (parity_high, parity_low) = rev_wire_parity(rev_wire);

        let isqrt2 = P::FRAC_1_SQRT_2();
        let shift = Complex::new(isqrt2, if inverse { -isqrt2 } else { isqrt2 });

        for k in 0..exp2(num_qubits - 1) {
            let i0 = ((k << 1) & parity_high) | (k & parity_low);
            let i1 = i0 | rev_wire_shift;
            state[i1] *= shift;
        }
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
        let rev_wire_shift = 1usize << rev_wire;
        let (parity_high, parity_low) = rev_wire_parity(rev_wire);

        let angle = if inverse { -angle } else { angle };
        let shift = Complex::from_polar(P::one(), angle);

        for k in 0..exp2(num_qubits - 1) {
            let i0 = ((k << 1) & parity_high) | (k & parity_low);
            let i1 = i0 | rev_wire_shift;
            state[i1] *= shift;
        }
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
        let rev_wire_shift = 1usize << rev_wire;
        let (parity_high, parity_low) = rev_wire_parity(rev_wire);

        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let js = if inverse { half.sin() } else { -half.sin() };

        for k in 0..exp2(num_qubits - 1) {
            let i0 = ((k << 1) & parity_high) | (k & parity_low);
            let i1 = i0 | rev_wire_shift;
            let v0 = state[i0];
            let v1 = state[i1];
            state[i0] = v0 * c + Complex::new(-v1.im * js, v1.re * js);
            state[i1] = Complex::new(-v0.im * js, v0.re * js) + v1 * c;
        }
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
        let rev_wire_shift = 1usize << rev_wire;
        let (parity_high, parity_low) = rev_wire_parity(rev_wire);

        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let s = if inverse { -half.sin() } else { half.sin() };

        for k in 0..exp2(num_qubits - 1) {
            let i0 = ((k << 1) & parity_high) | (k & parity_low);
            let i1 = i0 | rev_wire_shift;
            let v0 = state[i0];
            let v1 = state[i1];
            state[i0] = v0 * c - v1 * s;
            state[i1] = v0 * s + v1 * c;
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
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let rev_wire_shift = 1usize << rev_wire;
        let (parity_high, parity_low) = rev_wire_parity(rev_wire);

        let shifts = rz_shifts(angle, inverse);

        for k in 0..exp2(num_qubits - 1) {
            let i0 = ((k << 1) & parity_high) | (k & parity_low);
            let i1 = i0 | rev_wire_shift;
            state[i0] *= shifts[0];
            state[i1] *= shifts[1];
        }
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

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    pub fn apply_cnot<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        // Only the control-set half moves; enumerating quadruples beats a
        // full-index scan.
        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i10 = i00 | shift1;
            let i11 = i00 | shift1 | shift0;
            state.swap(i10, i11);
        }
        Ok(())
    }

    pub fn apply_cy<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i10 = i00 | shift1;
            let i11 = i00 | shift1 | shift0;
            let v10 = state[i10];
            state[i10] = Complex::new(state[i11].im, -state[i11].re);
            state[i11] = Complex::new(-v10.im, v10.re);
        }
        Ok(())
    }

    pub fn apply_cz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i11 = i00 | shift0 | shift1;
            state[i11] = -state[i11];
        }
        Ok(())
    }

    pub fn apply_swap<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i10 = i00 | shift1;
            let i01 = i00 | shift0;
            state.swap(i10, i01);
        }
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
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        let angle = if inverse { -angle } else { angle };
        let shift = Complex::from_polar(P::one(), angle);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i11 = i00 | shift1 | shift0;
            state[i11] *= shift;
        }
        Ok(())
    }

    pub fn apply_crx<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let js = if inverse { half.sin() } else { -half.sin() };

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i10 = i00 | shift1;
            let i11 = i00 | shift0 | shift1;
            let v10 = state[i10];
            let v11 = state[i11];
            state[i10] = v10 * c + Complex::new(-v11.im * js, v11.re * js);
            state[i11] = Complex::new(-v10.im * js, v10.re * js) + v11 * c;
        }
        Ok(())
    }

    pub fn apply_cry<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let s = if inverse { -half.sin() } else { half.sin() };

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i10 = i00 | shift1;
            let i11 = i00 | shift0 | shift1;
            let v10 = state[i10];
            let v11 = state[i11];
            state[i10] = v10 * c - v11 * s;
            state[i11] = v10 * s + v11 * c;
        }
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
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        let shifts = rz_shifts(angle, inverse);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i10 = i00 | shift1;
            let i11 = i00 | shift0 | shift1;
            state[i10] *= shifts[0];
            state[i11] *= shifts[1];
        }
        Ok(())
    }

    pub fn apply_crot<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        phi: P,
        theta: P,
        omega: P,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        let matrix = if inverse {
            rot_matrix(-omega, -theta, -phi)
        } else {
            rot_matrix(phi, theta, omega)
        };

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i10 = i00 | shift1;
            let i11 = i00 | shift0 | shift1;
            let v0 = state[i10];
            let v1 = state[i11];
            state[i10] = matrix[0] * v0 + matrix[1] * v1;
            state[i11] = matrix[2] * v0 + matrix[3] * v1;
        }
        Ok(())
    }

    pub fn apply_ising_xx<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        let half = angle / P::from_f64(2.0);
        let cr = half.cos();
        let sj = if inverse { -half.sin() } else { half.sin() };

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i10 = i00 | shift1;
            let i01 = i00 | shift0;
            let i11 = i00 | shift0 | shift1;

            let v00 = state[i00];
            let v01 = state[i01];
            let v10 = state[i10];
            let v11 = state[i11];

            state[i00] = Complex::new(cr * v00.re + sj * v11.im, cr * v00.im - sj * v11.re);
            state[i01] = Complex::new(cr * v01.re + sj * v10.im, cr * v01.im - sj * v10.re);
            state[i10] = Complex::new(cr * v10.re + sj * v01.im, cr * v10.im - sj * v01.re);
            state[i11] = Complex::new(cr * v11.re + sj * v00.im, cr * v11.im - sj * v00.re);
        }
        Ok(())
    }

    pub fn apply_ising_xy<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        let half = angle / P::from_f64(2.0);
        let cr = half.cos();
        let sj = if inverse { -half.sin() } else { half.sin() };

        // i00 and i11 are untouched by construction.
        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i10 = i00 | shift1;
            let i01 = i00 | shift0;

            let v01 = state[i01];
            let v10 = state[i10];

            state[i01] = Complex::new(cr * v01.re - sj * v10.im, cr * v01.im + sj * v10.re);
            state[i10] = Complex::new(cr * v10.re - sj * v01.im, cr * v10.im + sj * v01.re);
        }
        Ok(())
    }

    pub fn apply_ising_yy<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        let half = angle / P::from_f64(2.0);
        let cr = half.cos();
        let sj = if inverse { -half.sin() } else { half.sin() };

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i10 = i00 | shift1;
            let i01 = i00 | shift0;
            let i11 = i00 | shift0 | shift1;

            let v00 = state[i00];
            let v01 = state[i01];
            let v10 = state[i10];
            let v11 = state[i11];

            state[i00] = Complex::new(cr * v00.re - sj * v11.im, cr * v00.im + sj * v11.re);
            state[i01] = Complex::new(cr * v01.re + sj * v10.im, cr * v01.im - sj * v10.re);
            state[i10] = Complex::new(cr * v10.re + sj * v01.im, cr * v10.im - sj * v01.re);
            state[i11] = Complex::new(cr * v11.re - sj * v00.im, cr * v11.im + sj * v00.re);
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
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        let shifts = rz_shifts(angle, inverse);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i10 = i00 | shift1;
            let i01 = i00 | shift0;
            let i11 = i00 | shift0 | shift1;

            state[i00] *= shifts[0];
            state[i01] *= shifts[1];
            state[i10] *= shifts[1];
            state[i11] *= shifts[0];
        }
        Ok(())
    }

    pub fn apply_single_excitation<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let s = if inverse { -half.sin() } else { half.sin() };

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i01 = i00 | shift0;
            let i10 = i00 | shift1;

            let v01 = state[i01];
            let v10 = state[i10];

            state[i01] = v01 * c - v10 * s;
            state[i10] = v01 * s + v10 * c;
        }
        Ok(())
    }

    pub fn apply_single_excitation_minus<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        Self::single_excitation_phased(state, num_qubits, wires, inverse, angle, true)
    }

    pub fn apply_single_excitation_plus<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        Self::single_excitation_phased(state, num_qubits, wires, inverse, angle, false)
    }

    /// Shared body of SingleExcitationMinus / SingleExcitationPlus: the
    /// rotation block plus `e^{∓iθ/2}` on the untouched pair.
    fn single_excitation_phased<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
        minus: bool,
    ) -> KernelResult<()> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let s = if inverse { -half.sin() } else { half.sin() };
        let mut phase_angle = if minus { -half } else { half };
        if inverse {
            phase_angle = -phase_angle;
        }
        let phase = Complex::from_polar(P::one(), phase_angle);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i01 = i00 | shift0;
            let i10 = i00 | shift1;
            let i11 = i00 | shift0 | shift1;

            let v01 = state[i01];
            let v10 = state[i10];

            state[i00] *= phase;
            state[i01] = v01 * c - v10 * s;
            state[i10] = v01 * s + v10 * c;
            state[i11] *= phase;
        }
        Ok(())
    }

    // =========================================================================
    // Multi-qubit gates
    // =========================================================================

    pub fn apply_multi_rz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_multi_wires(num_qubits, wires)?;

        let shifts = rz_shifts(angle, inverse);
        let wires_parity = wires_parity_mask(num_qubits, wires);

        for (k, amp) in state.iter_mut().enumerate() {
            *amp *= shifts[((k & wires_parity).count_ones() % 2) as usize];
        }
        Ok(())
    }

    // =========================================================================
    // Generators
    // =========================================================================

    pub fn apply_generator_phase_shift<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        let rev_wire = Self::rev_wire1q(state, num_qubits, wires)?;
        let (parity_high, parity_low) = rev_wire_parity(rev_wire);

        for k in 0..exp2(num_qubits - 1) {
            let i0 = ((k << 1) & parity_high) | (k & parity_low);
            state[i0] = Complex::zero();
        }
        Ok(P::one())
    }

    pub fn apply_generator_controlled_phase_shift<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i01 = i00 | shift0;
            let i10 = i00 | shift1;

            state[i00] = Complex::zero();
            state[i01] = Complex::zero();
            state[i10] = Complex::zero();
        }
        Ok(P::one())
    }

    pub fn apply_generator_crx<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i01 = i00 | shift0;
            let i10 = i00 | shift1;
            let i11 = i00 | shift0 | shift1;

            state[i00] = Complex::zero();
            state[i01] = Complex::zero();
            state.swap(i10, i11);
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_cry<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i01 = i00 | shift0;
            let i10 = i00 | shift1;
            let i11 = i00 | shift0 | shift1;

            state[i00] = Complex::zero();
            state[i01] = Complex::zero();

            let v10 = state[i10];
            state[i10] = Complex::new(state[i11].im, -state[i11].re);
            state[i11] = Complex::new(-v10.im, v10.re);
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_crz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i01 = i00 | shift0;
            let i11 = i00 | shift0 | shift1;

            state[i00] = Complex::zero();
            state[i01] = Complex::zero();
            state[i11] = -state[i11];
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_ising_xx<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i01 = i00 | shift0;
            let i10 = i00 | shift1;
            let i11 = i00 | shift0 | shift1;

            state.swap(i00, i11);
            state.swap(i10, i01);
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_ising_yy<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i01 = i00 | shift0;
            let i10 = i00 | shift1;
            let i11 = i00 | shift0 | shift1;

            let v00 = state[i00];
            state[i00] = -state[i11];
            state[i11] = -v00;
            state.swap(i10, i01);
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_ising_zz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i01 = i00 | shift0;
            let i10 = i00 | shift1;

            state[i10] = -state[i10];
            state[i01] = -state[i01];
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_single_excitation<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i01 = i00 | shift0;
            let i10 = i00 | shift1;
            let i11 = i00 | shift0 | shift1;

            let v01 = state[i01];
            let v10 = state[i10];

            state[i00] = Complex::zero();
            state[i01] = Complex::new(v10.im, -v10.re);
            state[i10] = Complex::new(-v01.im, v01.re);
            state[i11] = Complex::zero();
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_single_excitation_minus<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i01 = i00 | shift0;
            let i10 = i00 | shift1;

            let v01 = state[i01];
            let v10 = state[i10];

            state[i01] = Complex::new(v10.im, -v10.re);
            state[i10] = Complex::new(-v01.im, v01.re);
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_single_excitation_plus<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        let (rev_wire0, rev_wire1) = Self::rev_wires2q(state, num_qubits, wires)?;
        let shift0 = 1usize << rev_wire0;
        let shift1 = 1usize << rev_wire1;
        let (parity_high, parity_middle, parity_low) = rev_wire_parity2(rev_wire0, rev_wire1);

        for k in 0..exp2(num_qubits - 2) {
            let i00 = ((k << 2) & parity_high) | ((k << 1) & parity_middle) | (k & parity_low);
            let i01 = i00 | shift0;
            let i10 = i00 | shift1;
            let i11 = i00 | shift0 | shift1;

            let v01 = state[i01];
            let v10 = state[i10];

            state[i00] = -state[i00];
            state[i01] = Complex::new(v10.im, -v10.re);
            state[i10] = Complex::new(-v01.im, v01.re);
            state[i11] = -state[i11];
        }
        Ok(P::from_f64(-0.5))
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

        for (k, amp) in state.iter_mut().enumerate() {
            if (k & wires_parity).count_ones() % 2 == 0 {
                *amp = -*amp;
            }
        }
        Ok(P::from_f64(0.5))
    }
}

impl PauliGenerator for KernelsLM {
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

/// The two diagonal factors `e^{∓iθ/2}` of RZ-style gates, conjugated under
/// `inverse`.
#[inline]
pub(crate) fn rz_shifts<P: Precision>(angle: P, inverse: bool) -> [Complex<P>; 2] {
    let half = angle / P::from_f64(2.0);
    let first = Complex::new(half.cos(), -half.sin());
    let second = Complex::new(half.cos(), half.sin());
    if inverse {
        [first.conj(), second.conj()]
    } else {
        [first, second]
    }
}

/// Mask with a one at the reverse-wire bit of every listed wire.
#[inline]
pub(crate) fn wires_parity_mask(num_qubits: usize, wires: &[usize]) -> usize {
    let mut mask = 0usize;
    for &wire in wires {
        mask |= 1usize << (num_qubits - wire - 1);
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use std::f64::consts::{FRAC_1_SQRT_2, PI};

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-12
    }

    fn zero_state(num_qubits: usize) -> Vec<Complex64> {
        let mut state = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        state[0] = Complex64::new(1.0, 0.0);
        state
    }

    #[test]
    fn test_hadamard_on_zero() {
        let mut state = zero_state(1);
        KernelsLM::apply_hadamard(&mut state, 1, &[0], false).unwrap();
        assert!(approx_eq(state[0], Complex64::new(FRAC_1_SQRT_2, 0.0)));
        assert!(approx_eq(state[1], Complex64::new(FRAC_1_SQRT_2, 0.0)));
    }

    #[test]
    fn test_pauli_x_flips() {
        let mut state = zero_state(2);
        KernelsLM::apply_pauli_x(&mut state, 2, &[0], false).unwrap();
        // Wire 0 is the most significant bit of the index.
        assert!(approx_eq(state[2], Complex64::new(1.0, 0.0)));
        assert!(approx_eq(state[0], Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn test_pauli_y_phases() {
        let mut state = zero_state(1);
        KernelsLM::apply_pauli_y(&mut state, 1, &[0], false).unwrap();
        assert!(approx_eq(state[0], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(state[1], Complex64::new(0.0, 1.0)));
    }

    #[test]
    fn test_cnot_completes_bell_state() {
        let mut state = vec![
            Complex64::new(FRAC_1_SQRT_2, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(FRAC_1_SQRT_2, 0.0),
            Complex64::new(0.0, 0.0),
        ];
        KernelsLM::apply_cnot(&mut state, 2, &[0, 1], false).unwrap();
        assert!(approx_eq(state[0], Complex64::new(FRAC_1_SQRT_2, 0.0)));
        assert!(approx_eq(state[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(state[2], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(state[3], Complex64::new(FRAC_1_SQRT_2, 0.0)));
    }

    #[test]
    fn test_cz_flips_last_amplitude() {
        let mut state = vec![Complex64::new(0.5, 0.0); 4];
        KernelsLM::apply_cz(&mut state, 2, &[0, 1], false).unwrap();
        assert!(approx_eq(state[0], Complex64::new(0.5, 0.0)));
        assert!(approx_eq(state[1], Complex64::new(0.5, 0.0)));
        assert!(approx_eq(state[2], Complex64::new(0.5, 0.0)));
        assert!(approx_eq(state[3], Complex64::new(-0.5, 0.0)));
    }

    #[test]
    fn test_swap_exchanges_amplitudes() {
        let mut state = zero_state(2);
        KernelsLM::apply_pauli_x(&mut state, 2, &[1], false).unwrap(); // |01>
        KernelsLM::apply_swap(&mut state, 2, &[0, 1], false).unwrap(); // |10>
        assert!(approx_eq(state[2], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_multi_rz_phase_on_zero_state() {
        let mut state = zero_state(2);
        KernelsLM::apply_multi_rz(&mut state, 2, &[0, 1], false, PI).unwrap();
        // Even parity picks up e^{-i pi/2} = -i.
        assert!(approx_eq(state[0], Complex64::new(0.0, -1.0)));
        for amp in &state[1..] {
            assert!(approx_eq(*amp, Complex64::new(0.0, 0.0)));
        }
    }

    #[test]
    fn test_rz_matches_phase_convention() {
        let theta = 0.37;
        let mut state = vec![
            Complex64::new(FRAC_1_SQRT_2, 0.0),
            Complex64::new(FRAC_1_SQRT_2, 0.0),
        ];
        KernelsLM::apply_rz(&mut state, 1, &[0], false, theta).unwrap();
        let expected0 = Complex64::from_polar(FRAC_1_SQRT_2, -theta / 2.0);
        let expected1 = Complex64::from_polar(FRAC_1_SQRT_2, theta / 2.0);
        assert!(approx_eq(state[0], expected0));
        assert!(approx_eq(state[1], expected1));
    }

    #[test]
    fn test_s_then_s_inverse_is_identity() {
        let mut state = vec![
            Complex64::new(0.6, 0.0),
            Complex64::new(0.0, 0.8),
        ];
        let original = state.clone();
        KernelsLM::apply_s(&mut state, 1, &[0], false).unwrap();
        KernelsLM::apply_s(&mut state, 1, &[0], true).unwrap();
        for (a, b) in state.iter().zip(&original) {
            assert!(approx_eq(*a, *b));
        }
    }

    #[test]
    fn test_rot_matches_rz_ry_rz() {
        let (phi, theta, omega) = (0.3, 0.8, -0.2);
        let mut via_rot = vec![
            Complex64::new(0.2, 0.1),
            Complex64::new(-0.4, 0.6),
        ];
        let mut via_chain = via_rot.clone();
        KernelsLM::apply_rot(&mut via_rot, 1, &[0], false, phi, theta, omega).unwrap();
        KernelsLM::apply_rz(&mut via_chain, 1, &[0], false, phi).unwrap();
        KernelsLM::apply_ry(&mut via_chain, 1, &[0], false, theta).unwrap();
        KernelsLM::apply_rz(&mut via_chain, 1, &[0], false, omega).unwrap();
        for (a, b) in via_rot.iter().zip(&via_chain) {
            assert!(approx_eq(*a, *b));
        }
    }

    #[test]
    fn test_single_excitation_rotates_middle_block() {
        let theta = 1.1;
        let mut state = zero_state(2);
        KernelsLM::apply_pauli_x(&mut state, 2, &[1], false).unwrap(); // |01>
        KernelsLM::apply_single_excitation(&mut state, 2, &[0, 1], false, theta).unwrap();
        assert!(approx_eq(state[1], Complex64::new((theta / 2.0).cos(), 0.0)));
        assert!(approx_eq(state[2], Complex64::new((theta / 2.0).sin(), 0.0)));
    }

    #[test]
    fn test_generator_multi_rz_scale() {
        let mut state = vec![Complex64::new(0.5, 0.0); 4];
        let scale: f64 =
            KernelsLM::apply_generator_multi_rz(&mut state, 2, &[0, 1], false).unwrap();
        assert_eq!(scale, 0.5);
        // Even-parity amplitudes are negated.
        assert!(approx_eq(state[0], Complex64::new(-0.5, 0.0)));
        assert!(approx_eq(state[1], Complex64::new(0.5, 0.0)));
        assert!(approx_eq(state[2], Complex64::new(0.5, 0.0)));
        assert!(approx_eq(state[3], Complex64::new(-0.5, 0.0)));
    }

    #[test]
    fn test_wire_validation() {
        let mut state = zero_state(2);
        assert!(KernelsLM::apply_pauli_x(&mut state, 2, &[2], false).is_err());
        assert!(KernelsLM::apply_cnot(&mut state, 2, &[1, 1], false).is_err());
        assert!(KernelsLM::apply_pauli_x(&mut state, 3, &[0], false).is_err());
    }

    #[test]
    fn test_multi_qubit_op_matches_cnot() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        #[rustfmt::skip]
        let cnot = [
            one, zero, zero, zero,
            zero, one, zero, zero,
            zero, zero, zero, one,
            zero, zero, one, zero,
        ];
        let mut via_matrix = zero_state(3);
        via_matrix[5] = Complex64::new(0.3, 0.4);
        via_matrix[0] = Complex64::new((1.0f64 - 0.25).sqrt(), 0.0);
        let mut via_kernel = via_matrix.clone();

        KernelsLM::apply_multi_qubit_op(&mut via_matrix, 3, &cnot, &[0, 2], false).unwrap();
        KernelsLM::apply_cnot(&mut via_kernel, 3, &[0, 2], false).unwrap();
        for (a, b) in via_matrix.iter().zip(&via_kernel) {
            assert!(approx_eq(*a, *b));
        }
    }
}
