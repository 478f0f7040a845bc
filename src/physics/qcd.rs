//! QCD helpers shared with the solver's cross-section plug-in.

use std::f64::consts::PI;

use crate::domain::Representation;

/// Momentum floor (GeV) below which the coupling is frozen.
const Q_MIN: f64 = 1.0;

// MSbar quark masses (GeV) used as flavour thresholds.
const M_CHARM: f64 = 1.28;
const M_BOTTOM: f64 = 4.18;
const M_TOP: f64 = 160.0;

/// Riemann zeta(3).
const ZETA3: f64 = 1.202056903159594;

/// Quadratic Casimir `C2` of the representation.
pub fn casimir2(rep: Representation) -> f64 {
    match rep {
        Representation::Triplet => 4.0 / 3.0,
        Representation::Sextet => 10.0 / 3.0,
        Representation::Octet => 3.0,
    }
}

/// Number of active flavours and the matching `Lambda` (GeV) at scale `q`.
fn flavour_regime(q: f64) -> (f64, f64) {
    if q < M_CHARM {
        (3.0, 0.33348050663724466)
    } else if q < M_BOTTOM {
        (4.0, 0.2913885366061117)
    } else if q < M_TOP {
        (5.0, 0.20953346238097081)
    } else {
        (6.0, 0.08896768177299201)
    }
}

/// Four-loop MSbar running strong coupling at momentum `q` (GeV).
///
/// `Lambda` changes at each flavour threshold; the residual step in the
/// coupling there is below one percent. Scales below 1 GeV are clamped to 1 GeV.
pub fn alpha_strong(q: f64) -> f64 {
    let q = q.max(Q_MIN);
    let (nf, lambda) = flavour_regime(q);

    let t = (q / lambda).powi(2).ln();
    let lt = t.ln();

    let b0 = (33.0 - 2.0 * nf) / (12.0 * PI);
    let b1 = (153.0 - 19.0 * nf) / (24.0 * PI.powi(2));
    let b2 = (2857.0 - 5033.0 / 9.0 * nf + 325.0 / 27.0 * nf.powi(2)) / (128.0 * PI.powi(3));
    let b3 = ((149753.0 / 6.0 + 3564.0 * ZETA3)
        - (1078361.0 / 162.0 + 6508.0 / 27.0 * ZETA3) * nf
        + (50065.0 / 162.0 + 6472.0 / 81.0 * ZETA3) * nf.powi(2)
        + 1093.0 / 729.0 * nf.powi(3))
        / (256.0 * PI.powi(4));

    let two_loop = b1 / b0.powi(2) * lt / t;
    let three_loop = (b1.powi(2) * (lt.powi(2) - lt - 1.0) + b0 * b2) / (b0.powi(4) * t.powi(2));
    let four_loop = (b1.powi(3) * (lt.powi(3) - 2.5 * lt.powi(2) - 2.0 * lt + 0.5)
        + 3.0 * b0 * b1 * b2 * lt
        - 0.5 * b0.powi(2) * b3)
        / (b0.powi(6) * t.powi(3));

    1.0 / (b0 * t) * (1.0 - two_loop + three_loop - four_loop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casimirs() {
        assert!((casimir2(Representation::Triplet) - 4.0 / 3.0).abs() < 1e-15);
        assert!((casimir2(Representation::Sextet) - 10.0 / 3.0).abs() < 1e-15);
        assert_eq!(casimir2(Representation::Octet), 3.0);
    }

    #[test]
    fn alpha_s_at_z_mass_is_close_to_world_average() {
        let a = alpha_strong(91.1876);
        assert!((a - 0.1181).abs() < 1e-3, "alpha_s(mZ) = {a}");
    }

    #[test]
    fn alpha_s_decreases_with_scale() {
        let scales = [2.0, 10.0, 100.0, 1000.0, 10000.0];
        for pair in scales.windows(2) {
            assert!(alpha_strong(pair[0]) > alpha_strong(pair[1]));
        }
    }

    #[test]
    fn alpha_s_is_frozen_below_one_gev() {
        assert_eq!(alpha_strong(0.2), alpha_strong(1.0));
    }

    #[test]
    fn alpha_s_is_nearly_continuous_at_thresholds() {
        for m in [M_CHARM, M_BOTTOM, M_TOP] {
            let below = alpha_strong(m * (1.0 - 1e-9));
            let above = alpha_strong(m);
            assert!((below - above).abs() < 1e-2 * above, "jump at {m}: {below} vs {above}");
        }
    }
}
