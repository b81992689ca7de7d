//! Backend descriptors and the shared Pauli-generator mixin.

use alsvin_gates::{GateOp, GeneratorOp, MatrixOp};
use alsvin_types::{BackendTag, Precision, PrecisionKind};
use num_complex::Complex;

use crate::error::KernelResult;

/// Immutable description of one kernel backend.
///
/// Declares the backend's identity, the buffer alignment it requires, and
/// the operations it implements. The dispatch registry consults these sets;
/// requesting an undeclared operation from a backend is an `Unsupported`
/// error.
#[derive(Debug)]
pub struct BackendDescriptor {
    /// Identity tag.
    pub tag: BackendTag,
    /// Human-readable name.
    pub name: &'static str,
    /// Minimal buffer alignment (bytes) required per precision.
    pub required_alignment: fn(PrecisionKind) -> usize,
    /// Preferred packing granularity (bytes) per precision.
    pub packed_bytes: fn(PrecisionKind) -> usize,
    /// Gate operations this backend implements.
    pub gates: &'static [GateOp],
    /// Generator operations this backend implements.
    pub generators: &'static [GeneratorOp],
    /// Matrix operations this backend implements.
    pub matrices: &'static [MatrixOp],
}

impl BackendDescriptor {
    /// Whether the backend implements a gate operation.
    pub fn implements_gate(&self, op: GateOp) -> bool {
        self.gates.contains(&op)
    }

    /// Whether the backend implements a generator operation.
    pub fn implements_generator(&self, op: GeneratorOp) -> bool {
        self.generators.contains(&op)
    }

    /// Whether the backend implements a matrix operation.
    pub fn implements_matrix(&self, op: MatrixOp) -> bool {
        self.matrices.contains(&op)
    }
}

#[cfg(target_arch = "x86_64")]
static ALL_BACKENDS: [&BackendDescriptor; 4] = [
    &crate::lm::DESCRIPTOR,
    &crate::pi::DESCRIPTOR,
    &crate::parallel::DESCRIPTOR,
    &crate::avx2::DESCRIPTOR,
];

#[cfg(not(target_arch = "x86_64"))]
static ALL_BACKENDS: [&BackendDescriptor; 3] = [
    &crate::lm::DESCRIPTOR,
    &crate::pi::DESCRIPTOR,
    &crate::parallel::DESCRIPTOR,
];

/// Descriptors of every backend compiled into this build.
pub fn descriptors() -> &'static [&'static BackendDescriptor] {
    &ALL_BACKENDS
}

/// Descriptor for a backend tag, if that backend is compiled in.
pub fn descriptor_for(tag: BackendTag) -> Option<&'static BackendDescriptor> {
    descriptors().iter().copied().find(|d| d.tag == tag)
}

/// Maximum required alignment across all compiled-in backends.
///
/// A buffer aligned to this value is usable by every backend. All
/// alignments are powers of two, so the maximum is the common multiple.
pub fn common_alignment(kind: PrecisionKind) -> usize {
    descriptors()
        .iter()
        .map(|d| (d.required_alignment)(kind))
        .max()
        .unwrap_or(1)
}

/// Generators for RX, RY, and RZ, derived from a backend's Pauli kernels.
///
/// Every backend whose Pauli kernels are wired in here gets the three
/// rotation generators for free: the generator of `R_P(θ) = exp(−iθP/2)` is
/// the Pauli itself with scale factor −1/2.
pub trait PauliGenerator {
    /// The backend's PauliX kernel.
    fn pauli_x<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()>;

    /// The backend's PauliY kernel.
    fn pauli_y<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()>;

    /// The backend's PauliZ kernel.
    fn pauli_z<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
    ) -> KernelResult<()>;

    /// Generator of RX. Returns the scale factor −1/2.
    fn apply_generator_rx<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        Self::pauli_x(state, num_qubits, wires, false)?;
        Ok(P::from_f64(-0.5))
    }

    /// Generator of RY. Returns the scale factor −1/2.
    fn apply_generator_ry<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        Self::pauli_y(state, num_qubits, wires, false)?;
        Ok(P::from_f64(-0.5))
    }

    /// Generator of RZ. Returns the scale factor −1/2.
    fn apply_generator_rz<P: Precision>(
        state: &mut [Complex<P>],
        num_qubits: usize,
        wires: &[usize],
        _adjoint: bool,
    ) -> KernelResult<P> {
        Self::pauli_z(state, num_qubits, wires, false)?;
        Ok(P::from_f64(-0.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptors_have_unique_tags() {
        let descriptors = descriptors();
        for (i, a) in descriptors.iter().enumerate() {
            for b in &descriptors[i + 1..] {
                assert_ne!(a.tag, b.tag);
            }
        }
    }

    #[test]
    fn test_descriptor_lookup() {
        assert!(descriptor_for(BackendTag::Lm).is_some());
        assert!(descriptor_for(BackendTag::Pi).is_some());
        assert!(descriptor_for(BackendTag::Avx512).is_none());
    }

    #[test]
    fn test_common_alignment_is_power_of_two() {
        for kind in [PrecisionKind::F32, PrecisionKind::F64] {
            let alignment = common_alignment(kind);
            assert!(alignment.is_power_of_two());
            assert!(alignment >= 4);
        }
    }
}
