//! Weighted fusion of the four risk dimensions into a single composite
//! score, jurisdiction-adjusted, plus the band and decision-recommendation
//! rules layered on top.
//!
//! Every function here is pure and synchronous: no I/O, no clock reads, no
//! shared state. That is deliberate — this is the one place in the
//! orchestrator where behaviour must be exhaustively property-tested rather
//! than exercised only through end-to-end scenarios.

use idv_types::{DecisionOutcome, Jurisdiction, RiskBand, RiskScores};

/// Base dimension weights before any jurisdiction adjustment.
pub const WEIGHT_FRAUD: f64 = 0.35;
pub const WEIGHT_AML: f64 = 0.30;
pub const WEIGHT_CREDIT: f64 = 0.20;
pub const WEIGHT_LIQUIDITY: f64 = 0.15;

/// Apply jurisdiction-specific multipliers to the raw per-dimension scores.
/// Every multiplier saturates at 1.0 — a score is a probability, never
/// allowed to exceed certainty.
pub fn apply_jurisdiction_adjustments(scores: RiskScores, jurisdiction: &Jurisdiction) -> RiskScores {
    let mut adjusted = scores;
    match jurisdiction {
        Jurisdiction::Eu => adjusted.aml = (adjusted.aml * 1.2).min(1.0),
        Jurisdiction::Au => adjusted.credit = (adjusted.credit * 1.15).min(1.0),
        Jurisdiction::Gcc => adjusted.aml = (adjusted.aml * 1.25).min(1.0),
        Jurisdiction::Other(_) => {}
    }
    adjusted
}

/// Fuse the four risk dimensions into a single composite score in `[0, 1]`.
pub fn fuse_scores(scores: RiskScores, jurisdiction: &Jurisdiction) -> f64 {
    let adjusted = apply_jurisdiction_adjustments(scores, jurisdiction);
    let composite = adjusted.fraud * WEIGHT_FRAUD
        + adjusted.aml * WEIGHT_AML
        + adjusted.credit * WEIGHT_CREDIT
        + adjusted.liquidity * WEIGHT_LIQUIDITY;
    composite.clamp(0.0, 1.0)
}

/// Map a composite score onto its risk band. Cutoffs are half-open on the
/// low end: `[0, .4)` low, `[.4, .6)` medium, `[.6, .8)` high, `[.8, 1]`
/// critical.
pub fn band_for(composite: f64) -> RiskBand {
    if composite >= 0.8 {
        RiskBand::Critical
    } else if composite >= 0.6 {
        RiskBand::High
    } else if composite >= 0.4 {
        RiskBand::Medium
    } else {
        RiskBand::Low
    }
}

/// Per-jurisdiction AML threshold used only in the `medium` band to decide
/// between approve and review.
pub fn aml_threshold(jurisdiction: &Jurisdiction) -> f64 {
    match jurisdiction {
        Jurisdiction::Au => 0.55,
        Jurisdiction::Eu => 0.50,
        Jurisdiction::Gcc => 0.45,
        Jurisdiction::Other(_) => 0.60,
    }
}

/// Recommend a decision outcome from the risk band and (jurisdiction-
/// adjusted) AML score. `critical` always declines, `high` always routes to
/// review, `low` always approves; `medium` is the only band where the AML
/// threshold breaks the tie.
pub fn recommend(band: RiskBand, scores: RiskScores, jurisdiction: &Jurisdiction) -> DecisionOutcome {
    match band {
        RiskBand::Critical => DecisionOutcome::Decline,
        RiskBand::High => DecisionOutcome::Review,
        RiskBand::Medium => {
            let adjusted = apply_jurisdiction_adjustments(scores, jurisdiction);
            if adjusted.aml > aml_threshold(jurisdiction) {
                DecisionOutcome::Review
            } else {
                DecisionOutcome::Approve
            }
        }
        RiskBand::Low => DecisionOutcome::Approve,
    }
}

/// Whether a recommended outcome needs a human in the loop.
pub fn requires_human(outcome: DecisionOutcome) -> bool {
    !matches!(outcome, DecisionOutcome::Approve)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(fraud: f64, aml: f64, credit: f64, liquidity: f64) -> RiskScores {
        RiskScores { fraud, aml, credit, liquidity }
    }

    #[test]
    fn fusion_matches_the_documented_weights() {
        let s = scores(1.0, 1.0, 1.0, 1.0);
        let composite = fuse_scores(s, &Jurisdiction::Other("default".into()));
        assert!((composite - 1.0).abs() < 1e-9);

        let s = scores(0.0, 0.0, 0.0, 0.0);
        let composite = fuse_scores(s, &Jurisdiction::Other("default".into()));
        assert!((composite - 0.0).abs() < 1e-9);
    }

    #[test]
    fn eu_boosts_aml_weight_only() {
        let s = scores(0.0, 0.5, 0.0, 0.0);
        let default = fuse_scores(s, &Jurisdiction::Other("default".into()));
        let eu = fuse_scores(s, &Jurisdiction::Eu);
        assert!(eu > default);
        assert!((eu - 0.5 * 1.2 * WEIGHT_AML).abs() < 1e-9);
    }

    #[test]
    fn au_boosts_credit_weight_only() {
        let s = scores(0.0, 0.0, 0.4, 0.0);
        let au = fuse_scores(s, &Jurisdiction::Au);
        assert!((au - 0.4 * 1.15 * WEIGHT_CREDIT).abs() < 1e-9);
    }

    #[test]
    fn gcc_boosts_aml_more_than_eu() {
        let s = scores(0.0, 0.5, 0.0, 0.0);
        let eu = fuse_scores(s, &Jurisdiction::Eu);
        let gcc = fuse_scores(s, &Jurisdiction::Gcc);
        assert!(gcc > eu);
    }

    #[test]
    fn band_cutoffs_are_half_open_on_the_low_end() {
        assert_eq!(band_for(0.0), RiskBand::Low);
        assert_eq!(band_for(0.39999), RiskBand::Low);
        assert_eq!(band_for(0.4), RiskBand::Medium);
        assert_eq!(band_for(0.59999), RiskBand::Medium);
        assert_eq!(band_for(0.6), RiskBand::High);
        assert_eq!(band_for(0.79999), RiskBand::High);
        assert_eq!(band_for(0.8), RiskBand::Critical);
        assert_eq!(band_for(1.0), RiskBand::Critical);
    }

    #[test]
    fn critical_always_declines_and_low_always_approves() {
        let s = scores(0.0, 0.0, 0.0, 0.0);
        assert_eq!(recommend(RiskBand::Critical, s, &Jurisdiction::Au), DecisionOutcome::Decline);
        assert_eq!(recommend(RiskBand::Low, s, &Jurisdiction::Au), DecisionOutcome::Approve);
        assert_eq!(recommend(RiskBand::High, s, &Jurisdiction::Au), DecisionOutcome::Review);
    }

    #[test]
    fn medium_band_breaks_the_tie_on_aml_threshold() {
        let below = scores(0.0, 0.50, 0.0, 0.0);
        let above = scores(0.0, 0.56, 0.0, 0.0);
        assert_eq!(recommend(RiskBand::Medium, below, &Jurisdiction::Au), DecisionOutcome::Approve);
        assert_eq!(recommend(RiskBand::Medium, above, &Jurisdiction::Au), DecisionOutcome::Review);
    }

    #[test]
    fn jurisdiction_thresholds_match_the_documented_table() {
        assert!((aml_threshold(&Jurisdiction::Au) - 0.55).abs() < 1e-9);
        assert!((aml_threshold(&Jurisdiction::Eu) - 0.50).abs() < 1e-9);
        assert!((aml_threshold(&Jurisdiction::Gcc) - 0.45).abs() < 1e-9);
        assert!((aml_threshold(&Jurisdiction::Other("default".into())) - 0.60).abs() < 1e-9);
    }

    proptest::proptest! {
        #[test]
        fn fused_composite_is_always_in_unit_range(
            fraud in 0.0f64..=1.0,
            aml in 0.0f64..=1.0,
            credit in 0.0f64..=1.0,
            liquidity in 0.0f64..=1.0,
        ) {
            for jurisdiction in [Jurisdiction::Au, Jurisdiction::Eu, Jurisdiction::Gcc, Jurisdiction::Other("default".into())] {
                let composite = fuse_scores(scores(fraud, aml, credit, liquidity), &jurisdiction);
                prop_assert!((0.0..=1.0).contains(&composite));
            }
        }

        #[test]
        fn decline_never_issued_outside_the_critical_band(
            fraud in 0.0f64..=1.0,
            aml in 0.0f64..=1.0,
            credit in 0.0f64..=1.0,
            liquidity in 0.0f64..=1.0,
        ) {
            let s = scores(fraud, aml, credit, liquidity);
            let composite = fuse_scores(s, &Jurisdiction::Au);
            let band = band_for(composite);
            let outcome = recommend(band, s, &Jurisdiction::Au);
            if outcome == DecisionOutcome::Decline {
                prop_assert_eq!(band, RiskBand::Critical);
            }
        }
    }
}
