//! Shared precondition checks for kernel entry points.

use alsvin_types::Precision;
use num_complex::Complex;

use crate::error::{KernelError, KernelResult};

/// Buffer length must be exactly `2^num_qubits`.
pub(crate) fn check_state<P: Precision>(
    state: &[Complex<P>],
    num_qubits: usize,
) -> KernelResult<()> {
    if num_qubits >= usize::BITS as usize {
        return Err(KernelError::InvalidArgument(format!(
            "{num_qubits} qubits exceed the addressable statevector size"
        )));
    }
    let expected = 1usize << num_qubits;
    if state.len() != expected {
        return Err(KernelError::InvalidArgument(format!(
            "statevector has {} amplitudes, expected 2^{} = {}",
            state.len(),
            num_qubits,
            expected
        )));
    }
    Ok(())
}

/// Fixed-arity wire list: exact length, in range, pairwise distinct.
pub(crate) fn check_wires(num_qubits: usize, wires: &[usize], arity: usize) -> KernelResult<()> {
    if wires.len() != arity {
        return Err(KernelError::InvalidArgument(format!(
            "expected {arity} wires, got {}",
            wires.len()
        )));
    }
    check_wire_values(num_qubits, wires)
}

/// Variable-arity wire list (MultiRZ, MultiQubitOp): non-empty, at most
/// `num_qubits` wires, in range, pairwise distinct.
pub(crate) fn check_multi_wires(num_qubits: usize, wires: &[usize]) -> KernelResult<()> {
    if wires.is_empty() {
        return Err(KernelError::InvalidArgument(
            "wire list must not be empty".into(),
        ));
    }
    if wires.len() > num_qubits {
        return Err(KernelError::InvalidArgument(format!(
            "{} wires exceed the {} qubits of the register",
            wires.len(),
            num_qubits
        )));
    }
    check_wire_values(num_qubits, wires)
}

fn check_wire_values(num_qubits: usize, wires: &[usize]) -> KernelResult<()> {
    for (i, &wire) in wires.iter().enumerate() {
        if wire >= num_qubits {
            return Err(KernelError::InvalidArgument(format!(
                "wire {wire} out of range for {num_qubits} qubits"
            )));
        }
        if wires[..i].contains(&wire) {
            return Err(KernelError::InvalidArgument(format!(
                "duplicate wire {wire}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_state_length() {
        let state = vec![Complex64::new(0.0, 0.0); 8];
        assert!(check_state(&state, 3).is_ok());
        assert!(check_state(&state, 2).is_err());
        assert!(check_state::<f64>(&[], 0).is_err());
    }

    #[test]
    fn test_wire_arity_and_range() {
        assert!(check_wires(3, &[0, 2], 2).is_ok());
        assert!(check_wires(3, &[0], 2).is_err());
        assert!(check_wires(3, &[0, 3], 2).is_err());
        assert!(check_wires(3, &[1, 1], 2).is_err());
    }

    #[test]
    fn test_multi_wires() {
        assert!(check_multi_wires(4, &[0, 1, 2, 3]).is_ok());
        assert!(check_multi_wires(4, &[]).is_err());
        assert!(check_multi_wires(2, &[0, 1, 1]).is_err());
        assert!(check_multi_wires(1, &[0, 1]).is_err());
    }
}
