//! Dense matrix for the general single-qubit rotation.

use alsvin_types::Precision;
use num_complex::Complex;

/// Row-major 2×2 matrix of `Rot(φ, θ, ω) = RZ(ω) · RY(θ) · RZ(φ)`.
///
/// The inverse of `Rot(φ, θ, ω)` is `Rot(−ω, −θ, −φ)`; callers applying the
/// adjoint build the matrix with negated, reversed angles rather than
/// conjugate-transposing this one.
pub fn rot_matrix<P: Precision>(phi: P, theta: P, omega: P) -> [Complex<P>; 4] {
    let two = P::from_f64(2.0);
    let c = (theta / two).cos();
    let s = (theta / two).sin();
    let plus = (phi + omega) / two;
    let minus = (phi - omega) / two;

    [
        Complex::from_polar(c, -plus),
        -Complex::from_polar(s, minus),
        Complex::from_polar(s, -minus),
        Complex::from_polar(c, plus),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;
    use std::f64::consts::PI;

    fn approx_eq(a: Complex<f64>, b: Complex<f64>) -> bool {
        (a - b).norm() < 1e-12
    }

    #[test]
    fn test_rot_zero_angles_is_identity() {
        let m = rot_matrix(0.0f64, 0.0, 0.0);
        assert!(approx_eq(m[0], Complex::new(1.0, 0.0)));
        assert!(approx_eq(m[1], Complex::zero()));
        assert!(approx_eq(m[2], Complex::zero()));
        assert!(approx_eq(m[3], Complex::new(1.0, 0.0)));
    }

    #[test]
    fn test_rot_theta_only_is_ry() {
        let theta = 0.7;
        let m = rot_matrix(0.0f64, theta, 0.0);
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        assert!(approx_eq(m[0], Complex::new(c, 0.0)));
        assert!(approx_eq(m[1], Complex::new(-s, 0.0)));
        assert!(approx_eq(m[2], Complex::new(s, 0.0)));
        assert!(approx_eq(m[3], Complex::new(c, 0.0)));
    }

    #[test]
    fn test_rot_is_unitary() {
        let m = rot_matrix(0.3f64, 1.1, -0.4);
        // Columns orthonormal.
        let col0 = m[0].norm_sqr() + m[2].norm_sqr();
        let col1 = m[1].norm_sqr() + m[3].norm_sqr();
        let cross = m[0].conj() * m[1] + m[2].conj() * m[3];
        assert!((col0 - 1.0).abs() < 1e-12);
        assert!((col1 - 1.0).abs() < 1e-12);
        assert!(cross.norm() < 1e-12);
    }

    #[test]
    fn test_rot_inverse_angles() {
        let (phi, theta, omega) = (0.2f64, PI / 3.0, 0.9);
        let m = rot_matrix(phi, theta, omega);
        let inv = rot_matrix(-omega, -theta, -phi);
        // m * inv = identity.
        let e00 = m[0] * inv[0] + m[1] * inv[2];
        let e01 = m[0] * inv[1] + m[1] * inv[3];
        let e10 = m[2] * inv[0] + m[3] * inv[2];
        let e11 = m[2] * inv[1] + m[3] * inv[3];
        assert!(approx_eq(e00, Complex::new(1.0, 0.0)));
        assert!(approx_eq(e01, Complex::zero()));
        assert!(approx_eq(e10, Complex::zero()));
        assert!(approx_eq(e11, Complex::new(1.0, 0.0)));
    }
}
