//! Legendre polynomial evaluation.
//!
//! Series are summed with the Clenshaw recurrence, which stays stable for
//! thousands of terms. Expanding into monomials loses all precision past
//! l ≈ 80 because the coefficients overflow and cancel.

/// Evaluate `Σ_l coeffs[l] · P_l(x)` with the Clenshaw recurrence.
///
/// Returns 0.0 for an empty coefficient slice.
///
/// # Algorithm
///
/// ```text
/// b_{n+1} = b_{n+2} = 0
/// b_k = c_k + α_k(x) b_{k+1} + β_{k+1} b_{k+2}
///   α_k(x) = (2k+1) x / (k+1),  β_k = -k / (k+1)
/// ```
///
/// written in the two-accumulator form that avoids the final β correction.
pub fn legendre_series(x: f64, coeffs: &[f64]) -> f64 {
    let (c0, c1) = match coeffs.len() {
        0 => return 0.0,
        1 => (coeffs[0], 0.0),
        2 => (coeffs[0], coeffs[1]),
        len => {
            let mut nd = len as f64;
            let mut c0 = coeffs[len - 2];
            let mut c1 = coeffs[len - 1];
            for &c in coeffs[..len - 2].iter().rev() {
                let tmp = c0;
                nd -= 1.0;
                c0 = c - (c1 * (nd - 1.0)) / nd;
                c1 = tmp + (c1 * x * (2.0 * nd - 1.0)) / nd;
            }
            (c0, c1)
        }
    };
    c0 + c1 * x
}

/// Value of the single Legendre polynomial `P_l(x)` by forward recurrence.
///
/// `(l+1) P_{l+1} = (2l+1) x P_l − l P_{l−1}`
pub fn legendre_p(l: usize, x: f64) -> f64 {
    if l == 0 {
        return 1.0;
    }
    let (mut p_prev, mut p) = (1.0, x);
    for k in 1..l {
        let k = k as f64;
        let next = ((2.0 * k + 1.0) * x * p - k * p_prev) / (k + 1.0);
        p_prev = p;
        p = next;
    }
    p
}
