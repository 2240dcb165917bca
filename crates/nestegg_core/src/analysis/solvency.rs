//! Solvency and liquidity diagnosis.
//!
//! Solvency asks whether net worth stays non-negative over the horizon;
//! liquidity asks whether enough cash is on hand in the month it is needed.
//! Both are derived in a single pass that the simulator feeds as the loop
//! runs — nothing here re-runs the projection.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Verdict over a whole projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvencyAnalysis {
    /// Net worth never dropped below zero.
    pub is_solvent: bool,
    /// Magnitude of the deepest negative net worth (zero when solvent).
    pub max_deficit: f64,
    /// First month net worth went negative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_deficit_date: Option<Date>,
    /// Largest single-month cash demand not covered by that month's income.
    pub max_cash_shortfall: f64,
    /// Non-cash liquid assets that had to be sold to bridge the worst
    /// shortfall after cash on hand was exhausted.
    pub required_liquidation: f64,
    /// Whether GIA and ISA holdings at the shortfall month covered the
    /// required liquidation.
    pub can_fix_with_liquidation: bool,
}

impl Default for SolvencyAnalysis {
    fn default() -> Self {
        Self {
            is_solvent: true,
            max_deficit: 0.0,
            first_deficit_date: None,
            max_cash_shortfall: 0.0,
            required_liquidation: 0.0,
            can_fix_with_liquidation: true,
        }
    }
}

/// Incremental fold producing a [`SolvencyAnalysis`].
#[derive(Debug, Clone, Default)]
pub struct SolvencyScan {
    min_net_worth: f64,
    first_deficit_date: Option<Date>,
    max_cash_shortfall: f64,
    required_liquidation: f64,
    sellable_at_shortfall: f64,
}

impl SolvencyScan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe one simulated month.
    ///
    /// `cash_available` and `sellable_available` are the balances *before*
    /// this month's liquidation cascade ran; `cash_flow` is the month's
    /// pre-allocation cash flow.
    pub fn observe(
        &mut self,
        date: Date,
        net_worth: f64,
        cash_flow: f64,
        cash_available: f64,
        sellable_available: f64,
    ) {
        if net_worth < self.min_net_worth {
            self.min_net_worth = net_worth;
        }
        if net_worth < 0.0 && self.first_deficit_date.is_none() {
            self.first_deficit_date = Some(date);
        }

        let shortfall = (-cash_flow).max(0.0);
        if shortfall > self.max_cash_shortfall {
            self.max_cash_shortfall = shortfall;
            self.required_liquidation = (shortfall - cash_available.max(0.0)).max(0.0);
            self.sellable_at_shortfall = sellable_available.max(0.0);
        }
    }

    pub fn finish(self) -> SolvencyAnalysis {
        SolvencyAnalysis {
            is_solvent: self.min_net_worth >= 0.0,
            max_deficit: (-self.min_net_worth).max(0.0),
            first_deficit_date: self.first_deficit_date,
            max_cash_shortfall: self.max_cash_shortfall,
            required_liquidation: self.required_liquidation,
            can_fix_with_liquidation: self.required_liquidation
                <= self.sellable_at_shortfall + 1e-6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solvent_run() {
        let mut scan = SolvencyScan::new();
        for month in 1..=12 {
            scan.observe(
                jiff::civil::date(2025, month, 1),
                10_000.0 + month as f64 * 100.0,
                100.0,
                5_000.0,
                0.0,
            );
        }
        let analysis = scan.finish();
        assert!(analysis.is_solvent);
        assert_eq!(analysis.max_deficit, 0.0);
        assert!(analysis.first_deficit_date.is_none());
        assert_eq!(analysis.max_cash_shortfall, 0.0);
    }

    #[test]
    fn test_first_deficit_date_is_earliest() {
        let mut scan = SolvencyScan::new();
        scan.observe(jiff::civil::date(2025, 1, 1), 500.0, 100.0, 500.0, 0.0);
        scan.observe(jiff::civil::date(2025, 2, 1), -2_000.0, -2_500.0, 500.0, 0.0);
        scan.observe(jiff::civil::date(2025, 3, 1), -5_000.0, -3_000.0, 0.0, 0.0);
        let analysis = scan.finish();
        assert!(!analysis.is_solvent);
        assert!((analysis.max_deficit - 5_000.0).abs() < 1e-9);
        assert_eq!(
            analysis.first_deficit_date,
            Some(jiff::civil::date(2025, 2, 1))
        );
    }

    #[test]
    fn test_shortfall_covered_by_sellable_assets() {
        let mut scan = SolvencyScan::new();
        // £30k demand against £10k cash with £50k in a GIA.
        scan.observe(
            jiff::civil::date(2025, 6, 1),
            30_000.0,
            -30_000.0,
            10_000.0,
            50_000.0,
        );
        let analysis = scan.finish();
        assert!((analysis.max_cash_shortfall - 30_000.0).abs() < 1e-9);
        assert!((analysis.required_liquidation - 20_000.0).abs() < 1e-9);
        assert!(analysis.can_fix_with_liquidation);
    }

    #[test]
    fn test_shortfall_beyond_liquid_assets() {
        let mut scan = SolvencyScan::new();
        scan.observe(
            jiff::civil::date(2025, 6, 1),
            -50_000.0,
            -50_000.0,
            0.0,
            0.0,
        );
        let analysis = scan.finish();
        assert!((analysis.required_liquidation - 50_000.0).abs() < 1e-9);
        assert!(!analysis.can_fix_with_liquidation);
    }
}
