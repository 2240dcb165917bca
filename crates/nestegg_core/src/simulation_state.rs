//! Mutable working state for a single projection run.
//!
//! Everything here is cloned from the caller's scenario before the loop
//! starts, so inputs stay read-only and two runs of the same scenario are
//! element-wise identical.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::calendar::PeriodClock;
use crate::model::{
    AccountState, AllocationConfig, AssetClass, Baseline, BusinessFigures,
};
use crate::pension::{PensionWithdrawalState, initialize_pension_state};

/// Per-run state: accounts, pension state, tax-year trackers, and the live
/// (modifier-adjustable) configuration.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub clock: PeriodClock,
    pub accounts: Vec<AccountState>,
    pub pension: PensionWithdrawalState,
    /// Live allocation policy; replaced by allocation-change modifiers.
    pub allocation: AllocationConfig,
    /// Gross annual salary override from a salary-change modifier.
    pub salary_override: Option<f64>,
    /// ISA contributions so far this tax year (scheduled + automated +
    /// direct).
    pub isa_contributed_this_tax_year: f64,
    /// Pension contributions so far this tax year, for MPAA enforcement.
    pub pension_contributed_this_tax_year: f64,
    current_tax_year: i16,
    /// Account absorbing residual deficits as an overdraft.
    pub primary_cash_idx: usize,
    /// Cumulative net-worth impact per scenario attribution key.
    pub goal_net_worth: FxHashMap<String, f64>,
    name_to_idx: FxHashMap<String, usize>,
}

impl SimulationState {
    pub fn new(baseline: &Baseline, clock: PeriodClock) -> Self {
        let mut accounts: Vec<AccountState> =
            baseline.accounts.iter().map(AccountState::from_spec).collect();

        // Every run needs somewhere for residual cash to live; synthesise an
        // empty cash account when the baseline has none.
        let has_cash = accounts
            .iter()
            .any(|a| !a.is_debt() && a.asset_class().is_cash_like());
        if !has_cash {
            accounts.push(AccountState::from_spec(&crate::model::BalanceAccount {
                name: "Cash".to_string(),
                starting_balance: 0.0,
                contribution: 0.0,
                frequency: crate::model::Frequency::Monthly,
                performance: 0.0,
                is_debt: false,
                contribution_stop_after_periods: None,
                asset_class: Some(AssetClass::Cash),
            }));
        }

        let primary_cash_idx = accounts
            .iter()
            .position(|a| !a.is_debt() && a.asset_class().is_cash_like())
            .unwrap_or(0);

        let name_to_idx = accounts
            .iter()
            .enumerate()
            .map(|(i, a)| (a.name().to_string(), i))
            .collect();

        let pension_pot: f64 = accounts
            .iter()
            .filter(|a| !a.is_debt() && a.asset_class() == AssetClass::Pension)
            .map(|a| a.balance())
            .sum();

        Self {
            clock,
            pension: initialize_pension_state(pension_pot, clock.tax_year(0)),
            allocation: baseline.allocation_config.clone().unwrap_or_default(),
            salary_override: None,
            isa_contributed_this_tax_year: 0.0,
            pension_contributed_this_tax_year: 0.0,
            current_tax_year: clock.tax_year(0),
            primary_cash_idx,
            goal_net_worth: FxHashMap::default(),
            name_to_idx,
            accounts,
        }
    }

    pub fn account_idx(&self, name: &str) -> Option<usize> {
        self.name_to_idx.get(name).copied()
    }

    pub fn first_account_of_class(&self, class: AssetClass) -> Option<usize> {
        self.accounts
            .iter()
            .position(|a| !a.is_debt() && a.asset_class() == class)
    }

    /// Reset the per-tax-year contribution trackers when the April boundary
    /// is crossed.
    pub fn roll_tax_year(&mut self, tax_year: i16) {
        if tax_year != self.current_tax_year {
            self.current_tax_year = tax_year;
            self.isa_contributed_this_tax_year = 0.0;
            self.pension_contributed_this_tax_year = 0.0;
        }
    }

    pub fn net_worth(&self) -> f64 {
        self.accounts.iter().map(|a| a.net_value()).sum()
    }

    /// Positive balances across cash-like accounts.
    pub fn cash_available(&self) -> f64 {
        self.accounts
            .iter()
            .filter(|a| !a.is_debt() && a.asset_class().is_cash_like())
            .map(|a| a.balance().max(0.0))
            .sum()
    }

    /// Positive balances across sellable investments (GIA + ISA).
    pub fn sellable_available(&self) -> f64 {
        self.accounts
            .iter()
            .filter(|a| !a.is_debt() && a.asset_class().is_sellable_investment())
            .map(|a| a.balance().max(0.0))
            .sum()
    }
}

/// Per-scenario attribution accumulator for a single period.
#[derive(Debug, Clone)]
pub struct GoalAccumulator {
    pub name: String,
    pub goal_type: &'static str,
    pub cash_flow_impact: f64,
    /// Net-worth delta from direct account movements this period.
    pub net_worth_delta: f64,
}

/// Everything recorded while simulating one month. Reset at the top of each
/// period and folded into the emitted breakdown at the bottom.
#[derive(Debug, Clone, Default)]
pub struct PeriodLedger {
    pub compound_growth: f64,
    /// Gross amounts deposited into accounts this period (debt repayments
    /// count as deposits toward net worth).
    pub deposits: f64,
    /// Gross amounts withdrawn from accounts this period.
    pub withdrawals: f64,
    pub scheduled_contributions: BTreeMap<String, f64>,
    pub allocations: BTreeMap<AssetClass, f64>,
    pub liquidations: BTreeMap<AssetClass, f64>,
    pub liquidation_accounts: BTreeMap<String, f64>,
    pub income_tax: f64,
    pub national_insurance: f64,
    pub state_pension_income: f64,
    pub private_pension_income: f64,
    pub business: Option<BusinessFigures>,
    pub scenario_income: f64,
    pub scenario_expenses: f64,
    /// Withdrawal proceeds from account-withdrawal modifiers, joining the
    /// period's cash flow.
    pub direct_inflow: f64,
    /// Direct account contributions funded from the period's cash flow.
    pub direct_outflow: f64,
    /// This month's taxable income available to the pension marginal-tax
    /// base; consumed by the first pension withdrawal of the period.
    monthly_other_income: f64,
    other_income_consumed: bool,
    pub goals: FxHashMap<String, GoalAccumulator>,
}

impl PeriodLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_monthly_other_income(&mut self, amount: f64) {
        self.monthly_other_income = amount;
        self.other_income_consumed = false;
    }

    pub fn add_monthly_other_income(&mut self, amount: f64) {
        self.monthly_other_income += amount;
    }

    /// The month's other income, handed to exactly one pension withdrawal
    /// call so the YTD base is never double-counted.
    pub fn take_monthly_other_income(&mut self) -> f64 {
        if self.other_income_consumed {
            0.0
        } else {
            self.other_income_consumed = true;
            self.monthly_other_income
        }
    }

    pub fn goal(&mut self, key: &str, name: &str, goal_type: &'static str) -> &mut GoalAccumulator {
        self.goals
            .entry(key.to_string())
            .or_insert_with(|| GoalAccumulator {
                name: name.to_string(),
                goal_type,
                cash_flow_impact: 0.0,
                net_worth_delta: 0.0,
            })
    }
}
