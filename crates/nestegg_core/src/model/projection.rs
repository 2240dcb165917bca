//! Projection output: one point per simulated month, plus the per-period
//! breakdown consumed by charts and the solvency analyser.
//!
//! These are the wire types of the engine — field names serialize in
//! camelCase and map keys use `BTreeMap` so JSON output is stable across
//! runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::SolvencyAnalysis;

use super::asset_class::AssetClass;

/// One asset or debt category row in a period breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub name: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_rate: Option<f64>,
}

/// Per-scenario attribution row for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalBreakdown {
    pub name: String,
    pub scenario_id: String,
    #[serde(rename = "type")]
    pub goal_type: String,
    /// Net cash-flow effect this period (inflows minus outflows).
    pub cash_flow_impact: f64,
    /// Cumulative net-worth effect of direct account movements.
    pub net_worth_impact: f64,
}

/// Business stream figures, present only when a business modifier is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessFigures {
    pub business_revenue: f64,
    pub business_costs: f64,
    pub business_profit: f64,
    pub corporation_tax: f64,
    pub business_net_profit: f64,
}

/// Everything that happened in one simulated month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBreakdown {
    pub total_income: f64,
    pub total_expenses: f64,
    /// Income and expenses the unmodified baseline would have had.
    pub baseline_income: f64,
    pub baseline_expenses: f64,
    /// Portions attributable to scenario modifiers.
    pub scenario_income: f64,
    pub scenario_expenses: f64,
    pub asset_value: f64,
    pub debt_value: f64,
    pub asset_categories: Vec<CategoryRow>,
    pub debt_categories: Vec<CategoryRow>,
    pub income_tax: f64,
    pub national_insurance: f64,
    pub state_pension_income: f64,
    pub private_pension_income: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<BusinessFigures>,
    /// Scheduled contributions actually applied, by account name.
    pub scheduled_contributions: BTreeMap<String, f64>,
    /// Automated surplus allocations, by asset class.
    pub cash_flow_allocations: BTreeMap<AssetClass, f64>,
    /// Amounts raised by the liquidation cascade, by asset class.
    pub cash_flow_liquidations: BTreeMap<AssetClass, f64>,
    /// Amounts raised by the liquidation cascade, by account name.
    pub liquidation_accounts: BTreeMap<String, f64>,
    /// Positive cash flow available to the allocator this period.
    pub surplus_cash: f64,
    /// Interest and growth accrued across all accounts this period (signed:
    /// debt interest counts negative).
    pub compound_growth: f64,
    /// Net deposits minus withdrawals across all accounts this period.
    pub total_contributions_this_period: f64,
    /// Net cash-flow effect of all modifiers this period.
    pub scenario_net_cash_flow: f64,
    /// Net cash-flow impact per scenario attribution key.
    pub goal_impacts: BTreeMap<String, f64>,
    pub goal_breakdowns: Vec<GoalBreakdown>,
}

/// One point of a projection: a zero-based month index (or a year index
/// after annual aggregation), net worth at the end of the period, and the
/// period's cash flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub period: u32,
    pub net_worth: f64,
    pub cash_flow: f64,
    pub breakdown: PeriodBreakdown,
}

/// A full projection run plus its solvency diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionOutcome {
    pub projection: Vec<ProjectionPoint>,
    pub solvency: SolvencyAnalysis,
}

impl ProjectionOutcome {
    pub fn final_net_worth(&self) -> f64 {
        self.projection.last().map(|p| p.net_worth).unwrap_or(0.0)
    }
}
