//! Generator kernels against finite differences of their gates.
//!
//! Writing a gate as `U(θ) = exp(iθ·c·A)`, where `A` is the operator the
//! generator kernel applies and `c` the scale factor it returns, the
//! derivative at θ = 0 satisfies `dU/dθ|₀ ψ = i·c·(Aψ)`. The left side is
//! approximated by a central difference of the gate kernel.

use alsvin_gates::{GeneratorOp, Operation};
use alsvin_kernels::dispatch::{apply_gate, apply_generator};
use alsvin_kernels::lm;
use alsvin_types::BackendTag;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const NUM_QUBITS: usize = 4;
const EPSILON: f64 = 1e-5;
const TOLERANCE: f64 = 1e-8;

fn random_state(seed: u64) -> Vec<Complex64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state: Vec<Complex64> = (0..1usize << NUM_QUBITS)
        .map(|_| Complex64::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5))
        .collect();
    let norm: f64 = state.iter().map(|amp| amp.norm_sqr()).sum::<f64>().sqrt();
    for amp in &mut state {
        *amp /= norm;
    }
    state
}

fn wires_for(op: GeneratorOp) -> Vec<usize> {
    match op.num_wires() {
        Some(1) => vec![1],
        Some(2) => vec![0, 2],
        Some(4) => vec![0, 1, 2, 3],
        _ => vec![0, 2, 3],
    }
}

fn backend_for(op: GeneratorOp) -> BackendTag {
    if lm::DESCRIPTOR.implements_generator(op) {
        BackendTag::Lm
    } else {
        BackendTag::Pi
    }
}

#[test]
fn test_generator_matches_finite_difference() {
    for (case_index, &op) in GeneratorOp::ALL.iter().enumerate() {
        let wires = wires_for(op);
        let kernel = backend_for(op);
        let gate = op.gate();
        let psi = random_state(700 + case_index as u64);

        let mut generated = psi.clone();
        let scale: f64 =
            apply_generator(kernel, op, &mut generated, NUM_QUBITS, &wires, false).unwrap();

        let mut plus = psi.clone();
        apply_gate(kernel, gate, &mut plus, NUM_QUBITS, &wires, false, &[EPSILON]).unwrap();
        let mut minus = psi.clone();
        apply_gate(kernel, gate, &mut minus, NUM_QUBITS, &wires, false, &[-EPSILON]).unwrap();

        for i in 0..psi.len() {
            let derivative = (plus[i] - minus[i]) / (2.0 * EPSILON);
            let expected = Complex64::i() * generated[i] * scale;
            assert!(
                (derivative - expected).norm() < TOLERANCE,
                "{op}: amplitude {i}: finite difference {derivative} vs generator {expected}"
            );
        }
    }
}

#[test]
fn test_generator_scale_factors() {
    let expectations = [
        (GeneratorOp::RX, -0.5),
        (GeneratorOp::RY, -0.5),
        (GeneratorOp::RZ, -0.5),
        (GeneratorOp::PhaseShift, 1.0),
        (GeneratorOp::CRX, -0.5),
        (GeneratorOp::CRY, -0.5),
        (GeneratorOp::CRZ, -0.5),
        (GeneratorOp::ControlledPhaseShift, 1.0),
        (GeneratorOp::IsingXX, -0.5),
        (GeneratorOp::IsingYY, -0.5),
        (GeneratorOp::IsingZZ, -0.5),
        (GeneratorOp::SingleExcitation, -0.5),
        (GeneratorOp::SingleExcitationMinus, -0.5),
        (GeneratorOp::SingleExcitationPlus, -0.5),
        (GeneratorOp::DoubleExcitation, -0.5),
        (GeneratorOp::DoubleExcitationMinus, -0.5),
        (GeneratorOp::DoubleExcitationPlus, -0.5),
        (GeneratorOp::MultiRZ, 0.5),
    ];
    assert_eq!(expectations.len(), GeneratorOp::ALL.len());

    for (op, expected) in expectations {
        let wires = wires_for(op);
        let mut state = random_state(800);
        let scale: f64 =
            apply_generator(backend_for(op), op, &mut state, NUM_QUBITS, &wires, false).unwrap();
        assert_eq!(scale, expected, "{op}");
    }
}

#[test]
fn test_lm_and_pi_generators_agree() {
    let shared = [
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
    ];

    for (case_index, op) in shared.into_iter().enumerate() {
        let wires = wires_for(op);
        let mut lm_state = random_state(900 + case_index as u64);
        let mut pi_state = lm_state.clone();

        let lm_scale: f64 =
            apply_generator(BackendTag::Lm, op, &mut lm_state, NUM_QUBITS, &wires, false).unwrap();
        let pi_scale: f64 =
            apply_generator(BackendTag::Pi, op, &mut pi_state, NUM_QUBITS, &wires, false).unwrap();

        assert_eq!(lm_scale, pi_scale, "{op}");
        for (i, (a, b)) in lm_state.iter().zip(&pi_state).enumerate() {
            assert!((a - b).norm() < 1e-13, "{op}: amplitude {i}: {a} vs {b}");
        }
    }
}
