//! Precomputed-index ("PI") gate kernels.
//!
//! For each call the 2^k inner indices of the gate's local basis and the
//! 2^(n−k) external block offsets are materialized once by
//! [`gate_indices`], then every block is gathered and updated through those
//! lists. Inner index `p` corresponds to the local basis state whose bits
//! read `wires[0]` as most significant.

use alsvin_gates::{rot_matrix, GateOp, GeneratorOp, MatrixOp};
use alsvin_types::{BackendTag, Precision, PrecisionKind};
use num_complex::Complex;
use num_traits::Zero;

use crate::backend::{BackendDescriptor, PauliGenerator};
use crate::check::{check_multi_wires, check_state, check_wires};
use crate::error::{KernelError, KernelResult};
use crate::lm::rz_shifts;

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

/// Descriptor of the PI backend.
pub static DESCRIPTOR: BackendDescriptor = BackendDescriptor {
    tag: BackendTag::Pi,
    name: "PI",
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
        GateOp::Toffoli,
        GateOp::CSWAP,
        GateOp::DoubleExcitation,
        GateOp::DoubleExcitationMinus,
        GateOp::DoubleExcitationPlus,
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
        GeneratorOp::DoubleExcitation,
        GeneratorOp::DoubleExcitationMinus,
        GeneratorOp::DoubleExcitationPlus,
    ],
    matrices: &[
        MatrixOp::SingleQubitOp,
        MatrixOp::TwoQubitOp,
        MatrixOp::MultiQubitOp,
    ],
};

/// Bit patterns spanned by a set of qubits.
///
/// Entry `p` carries, for each set bit `b` of `p`, the reverse-wire bit of
/// `qubit_indices[len - 1 - b]`; the first listed qubit is the most
/// significant bit of the pattern index.
fn generate_bit_patterns(qubit_indices: &[usize], num_qubits: usize) -> Vec<usize> {
    let mut patterns = Vec::with_capacity(1 << qubit_indices.len());
    patterns.push(0);
    for &qubit in qubit_indices.iter().rev() {
        let value = 1usize << (num_qubits - qubit - 1);
        let current = patterns.len();
        for j in 0..current {
            patterns.push(patterns[j] + value);
        }
    }
    patterns
}

/// Qubit indices not present in `wires`, ascending.
fn indices_after_exclusion(wires: &[usize], num_qubits: usize) -> Vec<usize> {
    (0..num_qubits).filter(|q| !wires.contains(q)).collect()
}

/// Inner indices of the gate's local basis and external block offsets.
///
/// An amplitude is addressed as `state[external + inner]`; the two index
/// sets live in disjoint bit positions.
pub fn gate_indices(wires: &[usize], num_qubits: usize) -> (Vec<usize>, Vec<usize>) {
    let internal = generate_bit_patterns(wires, num_qubits);
    let external = generate_bit_patterns(&indices_after_exclusion(wires, num_qubits), num_qubits);
    (internal, external)
}

/// The precomputed-index kernel backend.
pub struct KernelsPI;

impl KernelsPI {
    // =========================================================================
    // Dense matrix kernels
    // =========================================================================

    pub fn apply_single_qubit_op<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        matrix: &[Complex<P>; 4],
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            let i0 = external + indices[0];
            let i1 = external + indices[1];
            let v0 = state[i0];
            let v1 = state[i1];
            if inverse {
                state[i0] = matrix[0b00].conj() * v0 + matrix[0b10].conj() * v1;
                state[i1] = matrix[0b01].conj() * v0 + matrix[0b11].conj() * v1;
            } else {
                state[i0] = matrix[0b00] * v0 + matrix[0b01] * v1;
                state[i1] = matrix[0b10] * v0 + matrix[0b11] * v1;
            }
        }
        Ok(())
    }

    pub fn apply_two_qubit_op<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        matrix: &[Complex<P>; 16],
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            let v = [
                state[external + indices[0]],
                state[external + indices[1]],
                state[external + indices[2]],
                state[external + indices[3]],
            ];
            for (row, &inner) in indices.iter().enumerate() {
                let mut acc = Complex::zero();
                for (col, &amp) in v.iter().enumerate() {
                    let entry = if inverse {
                        matrix[col * 4 + row].conj()
                    } else {
                        matrix[row * 4 + col]
                    };
                    acc += entry * amp;
                }
                state[external + inner] = acc;
            }
        }
        Ok(())
    }

    pub fn apply_multi_qubit_op<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        matrix: &[Complex<P>],
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_multi_wires(num_qubits, wires)?;

        let dim = 1usize << wires.len();
        if matrix.len() != dim * dim {
            return Err(KernelError::InvalidArgument(format!(
                "matrix has {} entries, expected {} for {} wires",
                matrix.len(),
                dim * dim,
                wires.len()
            )));
        }

        let (indices, externals) = gate_indices(wires, num_qubits);
        let mut gathered = vec![Complex::<P>::zero(); dim];

        for &external in &externals {
            for (pos, &inner) in indices.iter().enumerate() {
                gathered[pos] = state[external + inner];
            }

            if inverse {
                for (i, &inner) in indices.iter().enumerate() {
                    let mut acc = Complex::zero();
                    for (j, &coeff) in gathered.iter().enumerate() {
                        acc += matrix[j * dim + i].conj() * coeff;
                    }
                    state[external + inner] = acc;
                }
            } else {
                for (i, &inner) in indices.iter().enumerate() {
                    let base = i * dim;
                    let mut acc = Complex::zero();
                    for (j, &coeff) in gathered.iter().enumerate() {
                        acc += matrix[base + j] * coeff;
                    }
                    state[external + inner] = acc;
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)
    }

    pub fn apply_pauli_x<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            state.swap(external + indices[0], external + indices[1]);
        }
        Ok(())
    }

    pub fn apply_pauli_y<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            let i0 = external + indices[0];
            let i1 = external + indices[1];
            let v0 = state[i0];
            state[i0] = Complex::new(state[i1].im, -state[i1].re);
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            let i1 = external + indices[1];
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        let (indices, externals) = gate_indices(wires, num_qubits);
        let isqrt2 = P::FRAC_1_SQRT_2();

        for &external in &externals {
            let i0 = external + indices[0];
            let i1 = external + indices[1];
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        let (indices, externals) = gate_indices(wires, num_qubits);
        let shift = if inverse {
            -Complex::<P>::i()
        } else {
            Complex::<P>::i()
        };

        for &external in &externals {
            state[external + indices[1]] *= shift;
        }
        Ok(())
    }

    pub fn apply_t<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        let (indices, externals) = gate_indices(wires, num_qubits);
        let quarter_turn = P::FRAC_PI_4();
        let angle = if inverse { -quarter_turn } else { quarter_turn };
        let shift = Complex::from_polar(P::one(), angle);

        for &external in &externals {
            state[external + indices[1]] *= shift;
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        let (indices, externals) = gate_indices(wires, num_qubits);
        let angle = if inverse { -angle } else { angle };
        let shift = Complex::from_polar(P::one(), angle);

        for &external in &externals {
            state[external + indices[1]] *= shift;
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let js = if inverse { half.sin() } else { -half.sin() };

        for &external in &externals {
            let i0 = external + indices[0];
            let i1 = external + indices[1];
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let s = if inverse { -half.sin() } else { half.sin() };

        for &external in &externals {
            let i0 = external + indices[0];
            let i1 = external + indices[1];
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        let (indices, externals) = gate_indices(wires, num_qubits);
        let shifts = rz_shifts(angle, inverse);

        for &external in &externals {
            state[external + indices[0]] *= shifts[0];
            state[external + indices[1]] *= shifts[1];
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            state.swap(external + indices[2], external + indices[3]);
        }
        Ok(())
    }

    pub fn apply_cy<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            let i2 = external + indices[2];
            let i3 = external + indices[3];
            let v2 = state[i2];
            state[i2] = Complex::new(state[i3].im, -state[i3].re);
            state[i3] = Complex::new(-v2.im, v2.re);
        }
        Ok(())
    }

    pub fn apply_cz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            let i3 = external + indices[3];
            state[i3] = -state[i3];
        }
        Ok(())
    }

    pub fn apply_swap<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            state.swap(external + indices[1], external + indices[2]);
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);
        let angle = if inverse { -angle } else { angle };
        let shift = Complex::from_polar(P::one(), angle);

        for &external in &externals {
            state[external + indices[3]] *= shift;
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let js = if inverse { half.sin() } else { -half.sin() };

        for &external in &externals {
            let i2 = external + indices[2];
            let i3 = external + indices[3];
            let v0 = state[i2];
            let v1 = state[i3];
            state[i2] = v0 * c + Complex::new(-v1.im * js, v1.re * js);
            state[i3] = Complex::new(-v0.im * js, v0.re * js) + v1 * c;
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let s = if inverse { -half.sin() } else { half.sin() };

        for &external in &externals {
            let i2 = external + indices[2];
            let i3 = external + indices[3];
            let v0 = state[i2];
            let v1 = state[i3];
            state[i2] = v0 * c - v1 * s;
            state[i3] = v0 * s + v1 * c;
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);
        let shifts = rz_shifts(angle, inverse);

        for &external in &externals {
            state[external + indices[2]] *= shifts[0];
            state[external + indices[3]] *= shifts[1];
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        let matrix = if inverse {
            rot_matrix(-omega, -theta, -phi)
        } else {
            rot_matrix(phi, theta, omega)
        };

        for &external in &externals {
            let i2 = external + indices[2];
            let i3 = external + indices[3];
            let v0 = state[i2];
            let v1 = state[i3];
            state[i2] = matrix[0] * v0 + matrix[1] * v1;
            state[i3] = matrix[2] * v0 + matrix[3] * v1;
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        let half = angle / P::from_f64(2.0);
        let cr = half.cos();
        let sj = if inverse { -half.sin() } else { half.sin() };

        for &external in &externals {
            let v0 = state[external + indices[0]];
            let v1 = state[external + indices[1]];
            let v2 = state[external + indices[2]];
            let v3 = state[external + indices[3]];

            state[external + indices[0]] =
                Complex::new(cr * v0.re + sj * v3.im, cr * v0.im - sj * v3.re);
            state[external + indices[1]] =
                Complex::new(cr * v1.re + sj * v2.im, cr * v1.im - sj * v2.re);
            state[external + indices[2]] =
                Complex::new(cr * v2.re + sj * v1.im, cr * v2.im - sj * v1.re);
            state[external + indices[3]] =
                Complex::new(cr * v3.re + sj * v0.im, cr * v3.im - sj * v0.re);
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        let half = angle / P::from_f64(2.0);
        let cr = half.cos();
        let sj = if inverse { -half.sin() } else { half.sin() };

        for &external in &externals {
            let v1 = state[external + indices[1]];
            let v2 = state[external + indices[2]];

            state[external + indices[1]] =
                Complex::new(cr * v1.re - sj * v2.im, cr * v1.im + sj * v2.re);
            state[external + indices[2]] =
                Complex::new(cr * v2.re - sj * v1.im, cr * v2.im + sj * v1.re);
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        let half = angle / P::from_f64(2.0);
        let cr = half.cos();
        let sj = if inverse { -half.sin() } else { half.sin() };

        for &external in &externals {
            let v0 = state[external + indices[0]];
            let v1 = state[external + indices[1]];
            let v2 = state[external + indices[2]];
            let v3 = state[external + indices[3]];

            state[external + indices[0]] =
                Complex::new(cr * v0.re - sj * v3.im, cr * v0.im + sj * v3.re);
            state[external + indices[1]] =
                Complex::new(cr * v1.re + sj * v2.im, cr * v1.im - sj * v2.re);
            state[external + indices[2]] =
                Complex::new(cr * v2.re + sj * v1.im, cr * v2.im - sj * v1.re);
            state[external + indices[3]] =
                Complex::new(cr * v3.re - sj * v0.im, cr * v3.im + sj * v0.re);
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
        let (indices, externals) = gate_indices(wires, num_qubits);
        let shifts = rz_shifts(angle, inverse);

        for &external in &externals {
            state[external + indices[0]] *= shifts[0];
            state[external + indices[1]] *= shifts[1];
            state[external + indices[2]] *= shifts[1];
            state[external + indices[3]] *= shifts[0];
        }
        Ok(())
    }

    // =========================================================================
    // Three-qubit gates
    // =========================================================================

    pub fn apply_toffoli<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 3)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        // |110> and |111> of the local basis.
        for &external in &externals {
            state.swap(external + indices[6], external + indices[7]);
        }
        Ok(())
    }

    pub fn apply_cswap<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _inverse: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 3)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        // |101> and |110> of the local basis.
        for &external in &externals {
            state.swap(external + indices[5], external + indices[6]);
        }
        Ok(())
    }

    // =========================================================================
    // Four-qubit gates
    // =========================================================================

    pub fn apply_double_excitation<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 4)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let s = if inverse { -half.sin() } else { half.sin() };

        // Only |0011> and |1100> of the local basis mix.
        for &external in &externals {
            let i3 = external + indices[3];
            let i12 = external + indices[12];
            let v3 = state[i3];
            let v12 = state[i12];
            state[i3] = v3 * c - v12 * s;
            state[i12] = v3 * s + v12 * c;
        }
        Ok(())
    }

    pub fn apply_double_excitation_minus<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        Self::double_excitation_phased(state, num_qubits, wires, inverse, angle, true)
    }

    pub fn apply_double_excitation_plus<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
    ) -> KernelResult<()> {
        Self::double_excitation_phased(state, num_qubits, wires, inverse, angle, false)
    }

    fn double_excitation_phased<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        angle: P,
        minus: bool,
    ) -> KernelResult<()> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 4)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        let half = angle / P::from_f64(2.0);
        let c = half.cos();
        let s = if inverse { -half.sin() } else { half.sin() };
        let mut phase_angle = if minus { -half } else { half };
        if inverse {
            phase_angle = -phase_angle;
        }
        let phase = Complex::from_polar(P::one(), phase_angle);

        for &external in &externals {
            let i3 = external + indices[3];
            let i12 = external + indices[12];
            let v3 = state[i3];
            let v12 = state[i12];

            for (pos, &inner) in indices.iter().enumerate() {
                if pos != 3 && pos != 12 {
                    state[external + inner] *= phase;
                }
            }
            state[i3] = v3 * c - v12 * s;
            state[i12] = v3 * s + v12 * c;
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
        let (indices, externals) = gate_indices(wires, num_qubits);
        let shifts = rz_shifts(angle, inverse);

        for &external in &externals {
            for (pos, &inner) in indices.iter().enumerate() {
                state[external + inner] *= shifts[(pos.count_ones() % 2) as usize];
            }
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
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 1)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            state[external + indices[0]] = Complex::zero();
        }
        Ok(P::one())
    }

    pub fn apply_generator_controlled_phase_shift<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            state[external + indices[0]] = Complex::zero();
            state[external + indices[1]] = Complex::zero();
            state[external + indices[2]] = Complex::zero();
        }
        Ok(P::one())
    }

    pub fn apply_generator_crx<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            state[external + indices[0]] = Complex::zero();
            state[external + indices[1]] = Complex::zero();
            state.swap(external + indices[2], external + indices[3]);
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_cry<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            let i2 = external + indices[2];
            let i3 = external + indices[3];
            let v2 = state[i2];
            state[external + indices[0]] = Complex::zero();
            state[external + indices[1]] = Complex::zero();
            state[i2] = Complex::new(state[i3].im, -state[i3].re);
            state[i3] = Complex::new(-v2.im, v2.re);
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_crz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            let i3 = external + indices[3];
            state[external + indices[0]] = Complex::zero();
            state[external + indices[1]] = Complex::zero();
            state[i3] = -state[i3];
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_ising_xx<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            state.swap(external + indices[0], external + indices[3]);
            state.swap(external + indices[2], external + indices[1]);
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_ising_yy<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            let i0 = external + indices[0];
            let i3 = external + indices[3];
            let v0 = state[i0];
            state[i0] = -state[i3];
            state[i3] = -v0;
            state.swap(external + indices[2], external + indices[1]);
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_ising_zz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 2)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            let i1 = external + indices[1];
            let i2 = external + indices[2];
            state[i1] = -state[i1];
            state[i2] = -state[i2];
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_double_excitation<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 4)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            let i3 = external + indices[3];
            let i12 = external + indices[12];
            let v3 = state[i3];
            let v12 = state[i12];

            for (pos, &inner) in indices.iter().enumerate() {
                if pos != 3 && pos != 12 {
                    state[external + inner] = Complex::zero();
                }
            }
            state[i3] = Complex::new(v12.im, -v12.re);
            state[i12] = Complex::new(-v3.im, v3.re);
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_double_excitation_minus<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 4)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            let i3 = external + indices[3];
            let i12 = external + indices[12];
            let v3 = state[i3];
            let v12 = state[i12];
            state[i3] = Complex::new(v12.im, -v12.re);
            state[i12] = Complex::new(-v3.im, v3.re);
        }
        Ok(P::from_f64(-0.5))
    }

    pub fn apply_generator_double_excitation_plus<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        check_state(state, num_qubits)?;
        check_wires(num_qubits, wires, 4)?;
        let (indices, externals) = gate_indices(wires, num_qubits);

        for &external in &externals {
            let i3 = external + indices[3];
            let i12 = external + indices[12];
            let v3 = state[i3];
            let v12 = state[i12];

            for (pos, &inner) in indices.iter().enumerate() {
                if pos != 3 && pos != 12 {
                    let idx = external + inner;
                    state[idx] = -state[idx];
                }
            }
            state[i3] = Complex::new(v12.im, -v12.re);
            state[i12] = Complex::new(-v3.im, v3.re);
        }
        Ok(P::from_f64(-0.5))
    }
}

impl PauliGenerator for KernelsPI {
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
