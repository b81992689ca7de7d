//! Per-tag kernel invocation.
//!
//! The dispatch registry resolves an operation to a [`BackendTag`]; the
//! functions here turn that tag back into a concrete kernel call. Asking a
//! backend for an operation outside its declared set is an `Unsupported`
//! error rather than a panic, so callers that bypass the registry still get
//! a diagnosable failure.

use alsvin_gates::{GateOp, GeneratorOp, MatrixOp, Operation};
use alsvin_types::{BackendTag, Precision};
use num_complex::Complex;

use crate::backend::PauliGenerator;
use crate::error::{KernelError, KernelResult};
use crate::lm::KernelsLM;
use crate::parallel::KernelsParallelLM;
use crate::pi::KernelsPI;

#[cfg(target_arch = "x86_64")]
use crate::avx2::KernelsAvx2;

fn unsupported(kernel: BackendTag, operation: &'static str) -> KernelError {
    KernelError::Unsupported { kernel, operation }
}

fn expect_params<P: Precision>(op: GateOp, params: &[P]) -> KernelResult<()> {
    if params.len() != op.num_params() {
        return Err(KernelError::InvalidArgument(format!(
            "{} takes {} parameters, got {}",
            op.name(),
            op.num_params(),
            params.len()
        )));
    }
    Ok(())
}

/// Apply a gate through the backend identified by `kernel`.
pub fn apply_gate<P: Precision>(
    kernel: BackendTag,
    op: GateOp,
    state: &mut [Complex<P>],
    num_qubits: usize,
    wires: &[usize],
    inverse: bool,
    params: &[P],
) -> KernelResult<()> {
    expect_params(op, params)?;
    match kernel {
        BackendTag::Lm => apply_gate_lm(op, state, num_qubits, wires, inverse, params),
        BackendTag::Pi => apply_gate_pi(op, state, num_qubits, wires, inverse, params),
        BackendTag::ParallelLm => {
            apply_gate_parallel(op, state, num_qubits, wires, inverse, params)
        }
        BackendTag::Avx2 => apply_gate_avx2(op, state, num_qubits, wires, inverse, params),
        BackendTag::Avx512 => Err(unsupported(kernel, op.name())),
    }
}

fn apply_gate_lm<P: Precision>(
    op: GateOp,
    state: &mut [Complex<P>],
    num_qubits: usize,
    wires: &[usize],
    inverse: bool,
    params: &[P],
) -> KernelResult<()> {
    match op {
        GateOp::Identity => KernelsLM::apply_identity(state, num_qubits, wires, inverse),
        GateOp::PauliX => KernelsLM::apply_pauli_x(state, num_qubits, wires, inverse),
        GateOp::PauliY => KernelsLM::apply_pauli_y(state, num_qubits, wires, inverse),
        GateOp::PauliZ => KernelsLM::apply_pauli_z(state, num_qubits, wires, inverse),
        GateOp::Hadamard => KernelsLM::apply_hadamard(state, num_qubits, wires, inverse),
        GateOp::S => KernelsLM::apply_s(state, num_qubits, wires, inverse),
        GateOp::T => KernelsLM::apply_t(state, num_qubits, wires, inverse),
        GateOp::RX => KernelsLM::apply_rx(state, num_qubits, wires, inverse, params[0]),
        GateOp::RY => KernelsLM::apply_ry(state, num_qubits, wires, inverse, params[0]),
        GateOp::RZ => KernelsLM::apply_rz(state, num_qubits, wires, inverse, params[0]),
        GateOp::PhaseShift => {
            KernelsLM::apply_phase_shift(state, num_qubits, wires, inverse, params[0])
        }
        GateOp::Rot => KernelsLM::apply_rot(
            state, num_qubits, wires, inverse, params[0], params[1], params[2],
        ),
        GateOp::CNOT => KernelsLM::apply_cnot(state, num_qubits, wires, inverse),
        GateOp::CY => KernelsLM::apply_cy(state, num_qubits, wires, inverse),
        GateOp::CZ => KernelsLM::apply_cz(state, num_qubits, wires, inverse),
        GateOp::SWAP => KernelsLM::apply_swap(state, num_qubits, wires, inverse),
        GateOp::ControlledPhaseShift => {
            KernelsLM::apply_controlled_phase_shift(state, num_qubits, wires, inverse, params[0])
        }
        GateOp::CRX => KernelsLM::apply_crx(state, num_qubits, wires, inverse, params[0]),
        GateOp::CRY => KernelsLM::apply_cry(state, num_qubits, wires, inverse, params[0]),
        GateOp::CRZ => KernelsLM::apply_crz(state, num_qubits, wires, inverse, params[0]),
        GateOp::CRot => KernelsLM::apply_crot(
            state, num_qubits, wires, inverse, params[0], params[1], params[2],
        ),
        GateOp::IsingXX => KernelsLM::apply_ising_xx(state, num_qubits, wires, inverse, params[0]),
        GateOp::IsingXY => KernelsLM::apply_ising_xy(state, num_qubits, wires, inverse, params[0]),
        GateOp::IsingYY => KernelsLM::apply_ising_yy(state, num_qubits, wires, inverse, params[0]),
        GateOp::IsingZZ => KernelsLM::apply_ising_zz(state, num_qubits, wires, inverse, params[0]),
        GateOp::SingleExcitation => {
            KernelsLM::apply_single_excitation(state, num_qubits, wires, inverse, params[0])
        }
        GateOp::SingleExcitationMinus => {
            KernelsLM::apply_single_excitation_minus(state, num_qubits, wires, inverse, params[0])
        }
        GateOp::SingleExcitationPlus => {
            KernelsLM::apply_single_excitation_plus(state, num_qubits, wires, inverse, params[0])
        }
        GateOp::MultiRZ => KernelsLM::apply_multi_rz(state, num_qubits, wires, inverse, params[0]),
        _ => Err(unsupported(BackendTag::Lm, op.name())),
    }
}

fn apply_gate_pi<P: Precision>(
    op: GateOp,
    state: &mut [Complex<P>],
    num_qubits: usize,
    wires: &[usize],
    inverse: bool,
    params: &[P],
) -> KernelResult<()> {
    match op {
        GateOp::Identity => KernelsPI::apply_identity(state, num_qubits, wires, inverse),
        GateOp::PauliX => KernelsPI::apply_pauli_x(state, num_qubits, wires, inverse),
        GateOp::PauliY => KernelsPI::apply_pauli_y(state, num_qubits, wires, inverse),
        GateOp::PauliZ => KernelsPI::apply_pauli_z(state, num_qubits, wires, inverse),
        GateOp::Hadamard => KernelsPI::apply_hadamard(state, num_qubits, wires, inverse),
        GateOp::S => KernelsPI::apply_s(state, num_qubits, wires, inverse),
        GateOp::T => KernelsPI::apply_t(state, num_qubits, wires, inverse),
        GateOp::RX => KernelsPI::apply_rx(state, num_qubits, wires, inverse, params[0]),
        GateOp::RY => KernelsPI::apply_ry(state, num_qubits, wires, inverse, params[0]),
        GateOp::RZ => KernelsPI::apply_rz(state, num_qubits, wires, inverse, params[0]),
        GateOp::PhaseShift => {
            KernelsPI::apply_phase_shift(state, num_qubits, wires, inverse, params[0])
        }
        GateOp::Rot => KernelsPI::apply_rot(
            state, num_qubits, wires, inverse, params[0], params[1], params[2],
        ),
        GateOp::CNOT => KernelsPI::apply_cnot(state, num_qubits, wires, inverse),
        GateOp::CY => KernelsPI::apply_cy(state, num_qubits, wires, inverse),
        GateOp::CZ => KernelsPI::apply_cz(state, num_qubits, wires, inverse),
        GateOp::SWAP => KernelsPI::apply_swap(state, num_qubits, wires, inverse),
        GateOp::ControlledPhaseShift => {
            KernelsPI::apply_controlled_phase_shift(state, num_qubits, wires, inverse, params[0])
        }
        GateOp::CRX => KernelsPI::apply_crx(state, num_qubits, wires, inverse, params[0]),
        GateOp::CRY => KernelsPI::apply_cry(state, num_qubits, wires, inverse, params[0]),
        GateOp::CRZ => KernelsPI::apply_crz(state, num_qubits, wires, inverse, params[0]),
        GateOp::CRot => KernelsPI::apply_crot(
            state, num_qubits, wires, inverse, params[0], params[1], params[2],
        ),
        GateOp::IsingXX => KernelsPI::apply_ising_xx(state, num_qubits, wires, inverse, params[0]),
        GateOp::IsingXY => KernelsPI::apply_ising_xy(state, num_qubits, wires, inverse, params[0]),
        GateOp::IsingYY => KernelsPI::apply_ising_yy(state, num_qubits, wires, inverse, params[0]),
        GateOp::IsingZZ => KernelsPI::apply_ising_zz(state, num_qubits, wires, inverse, params[0]),
        GateOp::Toffoli => KernelsPI::apply_toffoli(state, num_qubits, wires, inverse),
        GateOp::CSWAP => KernelsPI::apply_cswap(state, num_qubits, wires, inverse),
        GateOp::DoubleExcitation => {
            KernelsPI::apply_double_excitation(state, num_qubits, wires, inverse, params[0])
        }
        GateOp::DoubleExcitationMinus => {
            KernelsPI::apply_double_excitation_minus(state, num_qubits, wires, inverse, params[0])
        }
        GateOp::DoubleExcitationPlus => {
            KernelsPI::apply_double_excitation_plus(state, num_qubits, wires, inverse, params[0])
        }
        GateOp::MultiRZ => KernelsPI::apply_multi_rz(state, num_qubits, wires, inverse, params[0]),
        _ => Err(unsupported(BackendTag::Pi, op.name())),
    }
}

fn apply_gate_parallel<P: Precision>(
    op: GateOp,
    state: &mut [Complex<P>],
    num_qubits: usize,
    wires: &[usize],
    inverse: bool,
    params: &[P],
) -> KernelResult<()> {
    match op {
        GateOp::Identity => KernelsParallelLM::apply_identity(state, num_qubits, wires, inverse),
        GateOp::PauliX => KernelsParallelLM::apply_pauli_x(state, num_qubits, wires, inverse),
        GateOp::PauliY => KernelsParallelLM::apply_pauli_y(state, num_qubits, wires, inverse),
        GateOp::PauliZ => KernelsParallelLM::apply_pauli_z(state, num_qubits, wires, inverse),
        GateOp::Hadamard => KernelsParallelLM::apply_hadamard(state, num_qubits, wires, inverse),
        GateOp::S => KernelsParallelLM::apply_s(state, num_qubits, wires, inverse),
        GateOp::T => KernelsParallelLM::apply_t(state, num_qubits, wires, inverse),
        GateOp::RX => KernelsParallelLM::apply_rx(state, num_qubits, wires, inverse, params[0]),
        GateOp::RY => KernelsParallelLM::apply_ry(state, num_qubits, wires, inverse, params[0]),
        GateOp::RZ => KernelsParallelLM::apply_rz(state, num_qubits, wires, inverse, params[0]),
        GateOp::PhaseShift => {
            KernelsParallelLM::apply_phase_shift(state, num_qubits, wires, inverse, params[0])
        }
        GateOp::Rot => KernelsParallelLM::apply_rot(
            state, num_qubits, wires, inverse, params[0], params[1], params[2],
        ),
        GateOp::CZ => KernelsParallelLM::apply_cz(state, num_qubits, wires, inverse),
        GateOp::ControlledPhaseShift => KernelsParallelLM::apply_controlled_phase_shift(
            state, num_qubits, wires, inverse, params[0],
        ),
        GateOp::CRZ => KernelsParallelLM::apply_crz(state, num_qubits, wires, inverse, params[0]),
        GateOp::IsingZZ => {
            KernelsParallelLM::apply_ising_zz(state, num_qubits, wires, inverse, params[0])
        }
        GateOp::MultiRZ => {
            KernelsParallelLM::apply_multi_rz(state, num_qubits, wires, inverse, params[0])
        }
        _ => Err(unsupported(BackendTag::ParallelLm, op.name())),
    }
}

#[cfg(target_arch = "x86_64")]
fn apply_gate_avx2<P: Precision>(
    op: GateOp,
    state: &mut [Complex<P>],
    num_qubits: usize,
    wires: &[usize],
    inverse: bool,
    params: &[P],
) -> KernelResult<()> {
    match op {
        GateOp::PauliX => KernelsAvx2::apply_pauli_x(state, num_qubits, wires, inverse),
        GateOp::RZ => KernelsAvx2::apply_rz(state, num_qubits, wires, inverse, params[0]),
        GateOp::IsingZZ => {
            KernelsAvx2::apply_ising_zz(state, num_qubits, wires, inverse, params[0])
        }
        _ => Err(unsupported(BackendTag::Avx2, op.name())),
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn apply_gate_avx2<P: Precision>(
    op: GateOp,
    _state: &mut [Complex<P>],
    _num_qubits: usize,
    _wires: &[usize],
    _inverse: bool,
    _params: &[P],
) -> KernelResult<()> {
    Err(unsupported(BackendTag::Avx2, op.name()))
}

/// Apply a generator through the backend identified by `kernel`; returns
/// the generator's scale factor.
pub fn apply_generator<P: Precision>(
    kernel: BackendTag,
    op: GeneratorOp,
    state: &mut [Complex<P>],
    num_qubits: usize,
    wires: &[usize],
    adjoint: bool,
) -> KernelResult<P> {
    match kernel {
        BackendTag::Lm => apply_generator_lm(op, state, num_qubits, wires, adjoint),
        BackendTag::Pi => apply_generator_pi(op, state, num_qubits, wires, adjoint),
        BackendTag::ParallelLm => apply_generator_parallel(op, state, num_qubits, wires, adjoint),
        BackendTag::Avx2 | BackendTag::Avx512 => Err(unsupported(kernel, op.name())),
    }
}

fn apply_generator_lm<P: Precision>(
    op: GeneratorOp,
    state: &mut [Complex<P>],
    num_qubits: usize,
    wires: &[usize],
    adjoint: bool,
) -> KernelResult<P> {
    match op {
        GeneratorOp::RX => KernelsLM::apply_generator_rx(state, num_qubits, wires, adjoint),
        GeneratorOp::RY => KernelsLM::apply_generator_ry(state, num_qubits, wires, adjoint),
        GeneratorOp::RZ => KernelsLM::apply_generator_rz(state, num_qubits, wires, adjoint),
        GeneratorOp::PhaseShift => {
            KernelsLM::apply_generator_phase_shift(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::CRX => KernelsLM::apply_generator_crx(state, num_qubits, wires, adjoint),
        GeneratorOp::CRY => KernelsLM::apply_generator_cry(state, num_qubits, wires, adjoint),
        GeneratorOp::CRZ => KernelsLM::apply_generator_crz(state, num_qubits, wires, adjoint),
        GeneratorOp::ControlledPhaseShift => {
            KernelsLM::apply_generator_controlled_phase_shift(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::IsingXX => {
            KernelsLM::apply_generator_ising_xx(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::IsingYY => {
            KernelsLM::apply_generator_ising_yy(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::IsingZZ => {
            KernelsLM::apply_generator_ising_zz(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::SingleExcitation => {
            KernelsLM::apply_generator_single_excitation(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::SingleExcitationMinus => {
            KernelsLM::apply_generator_single_excitation_minus(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::SingleExcitationPlus => {
            KernelsLM::apply_generator_single_excitation_plus(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::MultiRZ => {
            KernelsLM::apply_generator_multi_rz(state, num_qubits, wires, adjoint)
        }
        _ => Err(unsupported(BackendTag::Lm, op.name())),
    }
}

fn apply_generator_pi<P: Precision>(
    op: GeneratorOp,
    state: &mut [Complex<P>],
    num_qubits: usize,
    wires: &[usize],
    adjoint: bool,
) -> KernelResult<P> {
    match op {
        GeneratorOp::RX => KernelsPI::apply_generator_rx(state, num_qubits, wires, adjoint),
        GeneratorOp::RY => KernelsPI::apply_generator_ry(state, num_qubits, wires, adjoint),
        GeneratorOp::RZ => KernelsPI::apply_generator_rz(state, num_qubits, wires, adjoint),
        GeneratorOp::PhaseShift => {
            KernelsPI::apply_generator_phase_shift(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::CRX => KernelsPI::apply_generator_crx(state, num_qubits, wires, adjoint),
        GeneratorOp::CRY => KernelsPI::apply_generator_cry(state, num_qubits, wires, adjoint),
        GeneratorOp::CRZ => KernelsPI::apply_generator_crz(state, num_qubits, wires, adjoint),
        GeneratorOp::ControlledPhaseShift => {
            KernelsPI::apply_generator_controlled_phase_shift(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::IsingXX => {
            KernelsPI::apply_generator_ising_xx(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::IsingYY => {
            KernelsPI::apply_generator_ising_yy(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::IsingZZ => {
            KernelsPI::apply_generator_ising_zz(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::DoubleExcitation => {
            KernelsPI::apply_generator_double_excitation(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::DoubleExcitationMinus => {
            KernelsPI::apply_generator_double_excitation_minus(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::DoubleExcitationPlus => {
            KernelsPI::apply_generator_double_excitation_plus(state, num_qubits, wires, adjoint)
        }
        _ => Err(unsupported(BackendTag::Pi, op.name())),
    }
}

fn apply_generator_parallel<P: Precision>(
    op: GeneratorOp,
    state: &mut [Complex<P>],
    num_qubits: usize,
    wires: &[usize],
    adjoint: bool,
) -> KernelResult<P> {
    match op {
        GeneratorOp::RX => {
            KernelsParallelLM::apply_generator_rx(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::RY => {
            KernelsParallelLM::apply_generator_ry(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::RZ => {
            KernelsParallelLM::apply_generator_rz(state, num_qubits, wires, adjoint)
        }
        GeneratorOp::MultiRZ => {
            KernelsParallelLM::apply_generator_multi_rz(state, num_qubits, wires, adjoint)
        }
        _ => Err(unsupported(BackendTag::ParallelLm, op.name())),
    }
}

/// Apply a dense matrix through the backend identified by `kernel`.
pub fn apply_matrix<P: Precision>(
    kernel: BackendTag,
    op: MatrixOp,
    state: &mut [Complex<P>],
    num_qubits: usize,
    matrix: &[Complex<P>],
    wires: &[usize],
    inverse: bool,
) -> KernelResult<()> {
    match op {
        MatrixOp::SingleQubitOp => {
            let matrix: &[Complex<P>; 4] = matrix.try_into().map_err(|_| {
                KernelError::InvalidArgument(format!(
                    "single-qubit matrix needs 4 entries, got {}",
                    matrix.len()
                ))
            })?;
            match kernel {
                BackendTag::Lm => {
                    KernelsLM::apply_single_qubit_op(state, num_qubits, matrix, wires, inverse)
                }
                BackendTag::Pi => {
                    KernelsPI::apply_single_qubit_op(state, num_qubits, matrix, wires, inverse)
                }
                BackendTag::ParallelLm => KernelsParallelLM::apply_single_qubit_op(
                    state, num_qubits, matrix, wires, inverse,
                ),
                _ => Err(unsupported(kernel, op.name())),
            }
        }
        MatrixOp::TwoQubitOp => {
            let matrix: &[Complex<P>; 16] = matrix.try_into().map_err(|_| {
                KernelError::InvalidArgument(format!(
                    "two-qubit matrix needs 16 entries, got {}",
                    matrix.len()
                ))
            })?;
            match kernel {
                BackendTag::Lm => {
                    KernelsLM::apply_two_qubit_op(state, num_qubits, matrix, wires, inverse)
                }
                BackendTag::Pi => {
                    KernelsPI::apply_two_qubit_op(state, num_qubits, matrix, wires, inverse)
                }
                _ => Err(unsupported(kernel, op.name())),
            }
        }
        MatrixOp::MultiQubitOp => match kernel {
            BackendTag::Lm => {
                KernelsLM::apply_multi_qubit_op(state, num_qubits, matrix, wires, inverse)
            }
            BackendTag::Pi => {
                KernelsPI::apply_multi_qubit_op(state, num_qubits, matrix, wires, inverse)
            }
            _ => Err(unsupported(kernel, op.name())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn plus_state(num_qubits: usize) -> Vec<Complex64> {
        let amp = 1.0 / ((1usize << num_qubits) as f64).sqrt();
        vec![Complex64::new(amp, 0.0); 1 << num_qubits]
    }

    #[test]
    fn test_lm_and_pi_agree_through_dispatch() {
        let mut lm = plus_state(3);
        let mut pi = lm.clone();
        apply_gate(
            BackendTag::Lm,
            GateOp::CRY,
            &mut lm,
            3,
            &[0, 2],
            false,
            &[0.63],
        )
        .unwrap();
        apply_gate(
            BackendTag::Pi,
            GateOp::CRY,
            &mut pi,
            3,
            &[0, 2],
            false,
            &[0.63],
        )
        .unwrap();
        for (a, b) in lm.iter().zip(&pi) {
            assert!((a - b).norm() < 1e-13);
        }
    }

    #[test]
    fn test_unsupported_operation_is_reported() {
        let mut state = plus_state(3);
        let result = apply_gate(
            BackendTag::Lm,
            GateOp::Toffoli,
            &mut state,
            3,
            &[0, 1, 2],
            false,
            &[],
        );
        assert!(matches!(result, Err(KernelError::Unsupported { .. })));

        let result = apply_gate(
            BackendTag::Avx512,
            GateOp::PauliX,
            &mut state,
            3,
            &[0],
            false,
            &[],
        );
        assert!(matches!(result, Err(KernelError::Unsupported { .. })));
    }

    #[test]
    fn test_param_count_is_checked() {
        let mut state = plus_state(2);
        let result = apply_gate(BackendTag::Lm, GateOp::RX, &mut state, 2, &[0], false, &[]);
        assert!(matches!(result, Err(KernelError::InvalidArgument(_))));
    }

    #[test]
    fn test_matrix_arity_is_checked() {
        let mut state = plus_state(2);
        let matrix = vec![Complex64::new(1.0, 0.0); 9];
        let result = apply_matrix(
            BackendTag::Lm,
            MatrixOp::SingleQubitOp,
            &mut state,
            2,
            &matrix,
            &[0],
            false,
        );
        assert!(matches!(result, Err(KernelError::InvalidArgument(_))));
    }
}
