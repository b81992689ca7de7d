//! Gate, generator, and matrix operation enumerations.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// An operation kind the dispatch registry can resolve kernels for.
///
/// Implemented by [`GateOp`], [`GeneratorOp`], and [`MatrixOp`].
pub trait Operation: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Every value of the enumeration.
    const ALL: &'static [Self];

    /// Stable operation name.
    fn name(&self) -> &'static str;
}

/// Unitary gate operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateOp {
    Identity,
    PauliX,
    PauliY,
    PauliZ,
    Hadamard,
    S,
    T,
    RX,
    RY,
    RZ,
    PhaseShift,
    Rot,
    CNOT,
    CY,
    CZ,
    SWAP,
    ControlledPhaseShift,
    CRX,
    CRY,
    CRZ,
    CRot,
    IsingXX,
    IsingXY,
    IsingYY,
    IsingZZ,
    SingleExcitation,
    SingleExcitationMinus,
    SingleExcitationPlus,
    DoubleExcitation,
    DoubleExcitationMinus,
    DoubleExcitationPlus,
    Toffoli,
    CSWAP,
    MultiRZ,
}

impl GateOp {
    /// Number of wires the gate acts on, or `None` for variable arity.
    pub fn num_wires(&self) -> Option<usize> {
        match self {
            GateOp::Identity
            | GateOp::PauliX
            | GateOp::PauliY
            | GateOp::PauliZ
            | GateOp::Hadamard
            | GateOp::S
            | GateOp::T
            | GateOp::RX
            | GateOp::RY
            | GateOp::RZ
            | GateOp::PhaseShift
            | GateOp::Rot => Some(1),

            GateOp::CNOT
            | GateOp::CY
            | GateOp::CZ
            | GateOp::SWAP
            | GateOp::ControlledPhaseShift
            | GateOp::CRX
            | GateOp::CRY
            | GateOp::CRZ
            | GateOp::CRot
            | GateOp::IsingXX
            | GateOp::IsingXY
            | GateOp::IsingYY
            | GateOp::IsingZZ
            | GateOp::SingleExcitation
            | GateOp::SingleExcitationMinus
            | GateOp::SingleExcitationPlus => Some(2),

            GateOp::Toffoli | GateOp::CSWAP => Some(3),

            GateOp::DoubleExcitation
            | GateOp::DoubleExcitationMinus
            | GateOp::DoubleExcitationPlus => Some(4),

            GateOp::MultiRZ => None,
        }
    }

    /// Number of rotation-angle parameters the gate takes.
    pub fn num_params(&self) -> usize {
        match self {
            GateOp::RX
            | GateOp::RY
            | GateOp::RZ
            | GateOp::PhaseShift
            | GateOp::ControlledPhaseShift
            | GateOp::CRX
            | GateOp::CRY
            | GateOp::CRZ
            | GateOp::IsingXX
            | GateOp::IsingXY
            | GateOp::IsingYY
            | GateOp::IsingZZ
            | GateOp::SingleExcitation
            | GateOp::SingleExcitationMinus
            | GateOp::SingleExcitationPlus
            | GateOp::DoubleExcitation
            | GateOp::DoubleExcitationMinus
            | GateOp::DoubleExcitationPlus
            | GateOp::MultiRZ => 1,

            GateOp::Rot | GateOp::CRot => 3,

            _ => 0,
        }
    }
}

impl Operation for GateOp {
    const ALL: &'static [GateOp] = &[
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
        GateOp::DoubleExcitation,
        GateOp::DoubleExcitationMinus,
        GateOp::DoubleExcitationPlus,
        GateOp::Toffoli,
        GateOp::CSWAP,
        GateOp::MultiRZ,
    ];

    fn name(&self) -> &'static str {
        match self {
            GateOp::Identity => "Identity",
            GateOp::PauliX => "PauliX",
            GateOp::PauliY => "PauliY",
            GateOp::PauliZ => "PauliZ",
            GateOp::Hadamard => "Hadamard",
            GateOp::S => "S",
            GateOp::T => "T",
            GateOp::RX => "RX",
            GateOp::RY => "RY",
            GateOp::RZ => "RZ",
            GateOp::PhaseShift => "PhaseShift",
            GateOp::Rot => "Rot",
            GateOp::CNOT => "CNOT",
            GateOp::CY => "CY",
            GateOp::CZ => "CZ",
            GateOp::SWAP => "SWAP",
            GateOp::ControlledPhaseShift => "ControlledPhaseShift",
            GateOp::CRX => "CRX",
            GateOp::CRY => "CRY",
            GateOp::CRZ => "CRZ",
            GateOp::CRot => "CRot",
            GateOp::IsingXX => "IsingXX",
            GateOp::IsingXY => "IsingXY",
            GateOp::IsingYY => "IsingYY",
            GateOp::IsingZZ => "IsingZZ",
            GateOp::SingleExcitation => "SingleExcitation",
            GateOp::SingleExcitationMinus => "SingleExcitationMinus",
            GateOp::SingleExcitationPlus => "SingleExcitationPlus",
            GateOp::DoubleExcitation => "DoubleExcitation",
            GateOp::DoubleExcitationMinus => "DoubleExcitationMinus",
            GateOp::DoubleExcitationPlus => "DoubleExcitationPlus",
            GateOp::Toffoli => "Toffoli",
            GateOp::CSWAP => "CSWAP",
            GateOp::MultiRZ => "MultiRZ",
        }
    }
}

impl fmt::Display for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gates that expose a generator for parameter-shift and adjoint
/// differentiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratorOp {
    RX,
    RY,
    RZ,
    PhaseShift,
    CRX,
    CRY,
    CRZ,
    ControlledPhaseShift,
    IsingXX,
    IsingYY,
    IsingZZ,
    SingleExcitation,
    SingleExcitationMinus,
    SingleExcitationPlus,
    DoubleExcitation,
    DoubleExcitationMinus,
    DoubleExcitationPlus,
    MultiRZ,
}

impl GeneratorOp {
    /// Number of wires the generator acts on, or `None` for variable arity.
    pub fn num_wires(&self) -> Option<usize> {
        match self {
            GeneratorOp::RX | GeneratorOp::RY | GeneratorOp::RZ | GeneratorOp::PhaseShift => {
                Some(1)
            }

            GeneratorOp::CRX
            | GeneratorOp::CRY
            | GeneratorOp::CRZ
            | GeneratorOp::ControlledPhaseShift
            | GeneratorOp::IsingXX
            | GeneratorOp::IsingYY
            | GeneratorOp::IsingZZ
            | GeneratorOp::SingleExcitation
            | GeneratorOp::SingleExcitationMinus
            | GeneratorOp::SingleExcitationPlus => Some(2),

            GeneratorOp::DoubleExcitation
            | GeneratorOp::DoubleExcitationMinus
            | GeneratorOp::DoubleExcitationPlus => Some(4),

            GeneratorOp::MultiRZ => None,
        }
    }

    /// The gate this operation is the generator of.
    pub fn gate(&self) -> GateOp {
        match self {
            GeneratorOp::RX => GateOp::RX,
            GeneratorOp::RY => GateOp::RY,
            GeneratorOp::RZ => GateOp::RZ,
            GeneratorOp::PhaseShift => GateOp::PhaseShift,
            GeneratorOp::CRX => GateOp::CRX,
            GeneratorOp::CRY => GateOp::CRY,
            GeneratorOp::CRZ => GateOp::CRZ,
            GeneratorOp::ControlledPhaseShift => GateOp::ControlledPhaseShift,
            GeneratorOp::IsingXX => GateOp::IsingXX,
            GeneratorOp::IsingYY => GateOp::IsingYY,
            GeneratorOp::IsingZZ => GateOp::IsingZZ,
            GeneratorOp::SingleExcitation => GateOp::SingleExcitation,
            GeneratorOp::SingleExcitationMinus => GateOp::SingleExcitationMinus,
            GeneratorOp::SingleExcitationPlus => GateOp::SingleExcitationPlus,
            GeneratorOp::DoubleExcitation => GateOp::DoubleExcitation,
            GeneratorOp::DoubleExcitationMinus => GateOp::DoubleExcitationMinus,
            GeneratorOp::DoubleExcitationPlus => GateOp::DoubleExcitationPlus,
            GeneratorOp::MultiRZ => GateOp::MultiRZ,
        }
    }
}

impl Operation for GeneratorOp {
    const ALL: &'static [GeneratorOp] = &[
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
        GeneratorOp::DoubleExcitation,
        GeneratorOp::DoubleExcitationMinus,
        GeneratorOp::DoubleExcitationPlus,
        GeneratorOp::MultiRZ,
    ];

    fn name(&self) -> &'static str {
        match self {
            GeneratorOp::RX => "RX",
            GeneratorOp::RY => "RY",
            GeneratorOp::RZ => "RZ",
            GeneratorOp::PhaseShift => "PhaseShift",
            GeneratorOp::CRX => "CRX",
            GeneratorOp::CRY => "CRY",
            GeneratorOp::CRZ => "CRZ",
            GeneratorOp::ControlledPhaseShift => "ControlledPhaseShift",
            GeneratorOp::IsingXX => "IsingXX",
            GeneratorOp::IsingYY => "IsingYY",
            GeneratorOp::IsingZZ => "IsingZZ",
            GeneratorOp::SingleExcitation => "SingleExcitation",
            GeneratorOp::SingleExcitationMinus => "SingleExcitationMinus",
            GeneratorOp::SingleExcitationPlus => "SingleExcitationPlus",
            GeneratorOp::DoubleExcitation => "DoubleExcitation",
            GeneratorOp::DoubleExcitationMinus => "DoubleExcitationMinus",
            GeneratorOp::DoubleExcitationPlus => "DoubleExcitationPlus",
            GeneratorOp::MultiRZ => "MultiRZ",
        }
    }
}

impl fmt::Display for GeneratorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dense matrix application, tagged by arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatrixOp {
    SingleQubitOp,
    TwoQubitOp,
    MultiQubitOp,
}

impl Operation for MatrixOp {
    const ALL: &'static [MatrixOp] = &[
        MatrixOp::SingleQubitOp,
        MatrixOp::TwoQubitOp,
        MatrixOp::MultiQubitOp,
    ];

    fn name(&self) -> &'static str {
        match self {
            MatrixOp::SingleQubitOp => "SingleQubitOp",
            MatrixOp::TwoQubitOp => "TwoQubitOp",
            MatrixOp::MultiQubitOp => "MultiQubitOp",
        }
    }
}

impl fmt::Display for MatrixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_arity() {
        assert_eq!(GateOp::Hadamard.num_wires(), Some(1));
        assert_eq!(GateOp::CNOT.num_wires(), Some(2));
        assert_eq!(GateOp::Toffoli.num_wires(), Some(3));
        assert_eq!(GateOp::DoubleExcitation.num_wires(), Some(4));
        assert_eq!(GateOp::MultiRZ.num_wires(), None);
    }

    #[test]
    fn test_gate_params() {
        assert_eq!(GateOp::PauliX.num_params(), 0);
        assert_eq!(GateOp::RX.num_params(), 1);
        assert_eq!(GateOp::Rot.num_params(), 3);
        assert_eq!(GateOp::CRot.num_params(), 3);
        assert_eq!(GateOp::MultiRZ.num_params(), 1);
    }

    #[test]
    fn test_every_generator_names_its_gate() {
        for generator in GeneratorOp::ALL {
            assert_eq!(generator.name(), generator.gate().name());
            assert_eq!(generator.num_wires(), generator.gate().num_wires());
        }
    }

    #[test]
    fn test_all_lists_are_exhaustive() {
        assert_eq!(GateOp::ALL.len(), 34);
        assert_eq!(GeneratorOp::ALL.len(), 18);
        assert_eq!(MatrixOp::ALL.len(), 3);
    }
}
