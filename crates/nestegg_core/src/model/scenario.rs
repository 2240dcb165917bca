//! Baseline specification and the full simulation scenario.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::accounts::BalanceAccount;
use super::asset_class::AssetClass;
use super::modifiers::ScenarioModifier;

/// How monthly surplus is split across asset classes. Percentages are whole
/// numbers; whatever is uncommitted falls through to cash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationConfig {
    pub percentages: BTreeMap<AssetClass, f64>,
}

impl Default for AllocationConfig {
    /// 10% equities, 5% pension, remainder to cash.
    fn default() -> Self {
        Self {
            percentages: BTreeMap::from([
                (AssetClass::Equities, 10.0),
                (AssetClass::Pension, 5.0),
            ]),
        }
    }
}

impl AllocationConfig {
    pub fn new(percentages: BTreeMap<AssetClass, f64>) -> Self {
        Self { percentages }
    }

    /// Route the entire surplus to a single class.
    pub fn all_to(class: AssetClass) -> Self {
        Self {
            percentages: BTreeMap::from([(class, 100.0)]),
        }
    }

    /// Percentage left implicit for cash after the scheduled classes.
    pub fn cash_residual_percent(&self) -> f64 {
        let committed: f64 = self
            .percentages
            .iter()
            .filter(|(class, _)| !class.is_cash_like())
            .map(|(_, pct)| pct)
            .sum();
        (100.0 - committed).max(0.0)
    }

    pub fn total_percent(&self) -> f64 {
        self.percentages.values().sum()
    }
}

/// An allocation-config-change modifier's payload: either "100% to one
/// class" or a partial percentage override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AllocationChange {
    /// `surplusAllocation.assetClass` in the user-facing shape.
    AllTo(AssetClass),
    /// `automatedAllocationPercentages` in the user-facing shape.
    Percentages(BTreeMap<AssetClass, f64>),
}

impl AllocationChange {
    pub fn to_config(&self) -> AllocationConfig {
        match self {
            AllocationChange::AllTo(class) => AllocationConfig::all_to(*class),
            AllocationChange::Percentages(map) => AllocationConfig::new(map.clone()),
        }
    }
}

/// The household's unmodified financial position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    pub accounts: Vec<BalanceAccount>,
    /// Gross monthly employment income.
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub current_age: u8,
    pub retirement_age: u8,
    #[serde(default)]
    pub state_pension_monthly: f64,
    /// Pre-computed monthly deductions; when both are present they are used
    /// as-is instead of running the tax calculator.
    #[serde(default)]
    pub monthly_income_tax: Option<f64>,
    #[serde(default)]
    pub monthly_ni: Option<f64>,
    /// Annual gross salary for tax purposes; falls back to
    /// `monthly_income * 12` when absent.
    #[serde(default)]
    pub gross_annual_salary: Option<f64>,
    #[serde(default)]
    pub allocation_config: Option<AllocationConfig>,
}

impl Baseline {
    /// Gross annual figure the tax calculator runs on.
    pub fn effective_gross_annual(&self) -> f64 {
        self.gross_annual_salary
            .unwrap_or(self.monthly_income * 12.0)
    }
}

/// Everything a projection run needs: the baseline plus scenario modifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationScenario {
    pub baseline: Baseline,
    #[serde(default)]
    pub modifiers: Vec<ScenarioModifier>,
}
