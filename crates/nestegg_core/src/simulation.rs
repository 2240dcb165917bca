//! The scenario simulator: a deterministic monthly loop over the horizon.
//!
//! Each simulated month runs, in order: configuration modifiers, interest
//! accrual, retirement state, baseline income and deductions, flow
//! modifiers, scheduled contributions, the cash-flow split (allocate a
//! surplus or liquidate for a deficit), and finally emission of a
//! [`ProjectionPoint`]. The loop is pure given its inputs: no clock, no
//! randomness, no I/O. Two runs of the same scenario are element-wise
//! identical.

use rustc_hash::FxHashSet;

use crate::allocation::{allocate_surplus, isa_headroom};
use crate::analysis::SolvencyScan;
use crate::apply::{PeriodContext, apply_config_changes, apply_flow_modifiers};
use crate::calendar::PeriodClock;
use crate::error::{ConfigError, Result};
use crate::liquidation::cover_deficit;
use crate::model::{
    AssetClass, CategoryRow, GoalBreakdown, PeriodBreakdown, ProjectionOutcome, ProjectionPoint,
    ScenarioModifier, SimulationScenario,
};
use crate::pension::STATE_PENSION_AGE;
use crate::simulation_state::{PeriodLedger, SimulationState};
use crate::taxes::{
    calculate_income_tax, calculate_national_insurance,
};

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

const EPSILON: f64 = 1e-9;

/// Runs dual baseline / scenario projections over a fixed horizon.
#[derive(Debug, Clone)]
pub struct Simulator {
    scenario: SimulationScenario,
    years: u32,
    clock: PeriodClock,
}

impl Simulator {
    /// Validate the scenario and build a simulator.
    ///
    /// All category-1 configuration errors surface here, before any loop
    /// runs: unknown account references, negative amounts, inverted date
    /// windows, over-committed allocations, duplicate modifier ids, and an
    /// empty horizon.
    pub fn new(
        scenario: SimulationScenario,
        years: u32,
        start_year: i16,
        start_month: u8,
    ) -> Result<Self> {
        if years == 0 {
            return Err(ConfigError::EmptyHorizon);
        }

        if let Some(config) = &scenario.baseline.allocation_config
            && config.total_percent() > 100.0 + EPSILON
        {
            return Err(ConfigError::AllocationOverCommitted {
                modifier_id: None,
                total: config.total_percent(),
            });
        }

        let account_names: Vec<&str> = scenario
            .baseline
            .accounts
            .iter()
            .map(|a| a.name.as_str())
            .collect();

        let mut seen_ids = FxHashSet::default();
        for modifier in &scenario.modifiers {
            if !seen_ids.insert(modifier.id.as_str()) {
                return Err(ConfigError::DuplicateModifierId {
                    modifier_id: modifier.id.clone(),
                });
            }
            modifier.validate(&account_names)?;
        }

        Ok(Self {
            scenario,
            years,
            clock: PeriodClock::new(start_year, start_month),
        })
    }

    pub fn periods(&self) -> u32 {
        self.years * 12
    }

    pub fn clock(&self) -> PeriodClock {
        self.clock
    }

    /// Project the baseline with no modifiers applied.
    pub fn generate_baseline_projection(&self) -> ProjectionOutcome {
        self.run(&[])
    }

    /// Project the baseline with all scenario modifiers applied.
    pub fn generate_scenario_projection(&self) -> ProjectionOutcome {
        self.run(&self.scenario.modifiers)
    }

    fn run(&self, modifiers: &[ScenarioModifier]) -> ProjectionOutcome {
        let baseline = &self.scenario.baseline;
        let mut state = SimulationState::new(baseline, self.clock);
        let mut scan = SolvencyScan::new();
        let mut projection: Vec<ProjectionPoint> = Vec::with_capacity(self.periods() as usize);

        for p in 0..self.periods() {
            let tax_year = self.clock.tax_year(p);
            state.roll_tax_year(tax_year);
            state.pension.begin_period();
            let mut ledger = PeriodLedger::new();

            // Configuration modifiers first so rate changes shape this
            // month's accrual and salary changes shape this month's tax.
            apply_config_changes(&mut state, modifiers, p);

            for account in &mut state.accounts {
                ledger.compound_growth += account.accrue_interest(p);
            }

            let age = self.clock.age_years(baseline.current_age, p);
            let employed = age < baseline.retirement_age as u32;

            let unmodified_gross_annual = baseline.effective_gross_annual();
            let gross_annual = state.salary_override.unwrap_or(unmodified_gross_annual);

            let (net_employment, gross_monthly) = if employed {
                let gross_monthly = gross_annual / 12.0;
                let (tax, ni) = if state.salary_override.is_none()
                    && let (Some(tax), Some(ni)) =
                        (baseline.monthly_income_tax, baseline.monthly_ni)
                {
                    (tax, ni)
                } else {
                    (
                        calculate_income_tax(gross_annual) / 12.0,
                        calculate_national_insurance(gross_annual) / 12.0,
                    )
                };
                ledger.income_tax += tax;
                ledger.national_insurance += ni;
                (gross_monthly - tax - ni, gross_monthly)
            } else {
                (0.0, 0.0)
            };

            let unmodified_net_employment = if employed {
                if let (Some(tax), Some(ni)) = (baseline.monthly_income_tax, baseline.monthly_ni)
                {
                    unmodified_gross_annual / 12.0 - tax - ni
                } else {
                    (unmodified_gross_annual
                        - calculate_income_tax(unmodified_gross_annual)
                        - calculate_national_insurance(unmodified_gross_annual))
                        / 12.0
                }
            } else {
                0.0
            };

            let state_pension = if age >= STATE_PENSION_AGE {
                baseline.state_pension_monthly
            } else {
                0.0
            };
            ledger.state_pension_income = state_pension;
            ledger.set_monthly_other_income(gross_monthly + state_pension);

            // A salary change is scenario-attributable income: the delta
            // between the modified and unmodified take-home pay.
            let salary_delta = net_employment - unmodified_net_employment;
            if salary_delta.abs() > EPSILON {
                ledger.scenario_income += salary_delta;
                if let Some(modifier) = modifiers
                    .iter()
                    .rev()
                    .find(|m| matches!(m.kind, crate::model::ModifierKind::SalaryChange { .. }))
                {
                    ledger
                        .goal(
                            modifier.attribution_key(),
                            &modifier.name,
                            modifier.archetype_label(),
                        )
                        .cash_flow_impact += salary_delta;
                }
            }

            let ctx = PeriodContext {
                period: p,
                tax_year,
                age_years: age,
                annual_taxable_income: if employed {
                    gross_annual
                } else {
                    state_pension * 12.0
                },
            };
            apply_flow_modifiers(&mut state, &mut ledger, modifiers, ctx);

            // Scheduled account contributions, with ISA allowance consumed
            // ahead of the allocator.
            let mut total_scheduled = 0.0;
            for idx in 0..state.accounts.len() {
                let due = state.accounts[idx].scheduled_due(p);
                if due.periods == 0 {
                    continue;
                }
                let mut amount = due.amount;
                if amount > 0.0
                    && !state.accounts[idx].is_debt()
                    && state.accounts[idx].asset_class() == AssetClass::Equities
                {
                    let allowed = isa_headroom(&state).min(amount);
                    state.isa_contributed_this_tax_year += allowed;
                    amount = allowed;
                }
                if amount > 0.0 && state.accounts[idx].asset_class() == AssetClass::Pension {
                    state.pension_contributed_this_tax_year += amount;
                }
                let name = state.accounts[idx].name().to_string();
                state.accounts[idx].apply_scheduled(amount, due.periods);
                if amount > 0.0 {
                    ledger.deposits += amount;
                    *ledger.scheduled_contributions.entry(name).or_insert(0.0) += amount;
                    total_scheduled += amount;
                }
            }

            let baseline_income = unmodified_net_employment + state_pension;
            let income = baseline_income + ledger.scenario_income;
            let expenses = baseline.monthly_expenses + ledger.scenario_expenses;
            let cash_flow = income + ledger.direct_inflow
                - expenses
                - total_scheduled
                - ledger.direct_outflow;

            // Liquidity picture before the cascade runs, for the solvency
            // scan.
            let cash_available = state.cash_available();
            let sellable_available = state.sellable_available();

            let mut surplus_cash = 0.0;
            if cash_flow > EPSILON {
                allocate_surplus(&mut state, &mut ledger, cash_flow);
                surplus_cash = cash_flow;
            } else if cash_flow < -EPSILON {
                cover_deficit(&mut state, &mut ledger, -cash_flow, age, tax_year);
            }

            let point = self.emit_point(
                p,
                &mut state,
                ledger,
                baseline_income,
                expenses,
                surplus_cash,
                cash_flow,
            );
            scan.observe(
                self.clock.date(p),
                point.net_worth,
                cash_flow,
                cash_available,
                sellable_available,
            );
            projection.push(point);
        }

        ProjectionOutcome {
            projection,
            solvency: scan.finish(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_point(
        &self,
        period: u32,
        state: &mut SimulationState,
        ledger: PeriodLedger,
        baseline_income: f64,
        total_expenses: f64,
        surplus_cash: f64,
        cash_flow: f64,
    ) -> ProjectionPoint {
        let mut asset_categories = Vec::new();
        let mut debt_categories = Vec::new();
        let mut asset_value = 0.0;
        let mut debt_value = 0.0;

        for account in &state.accounts {
            let row = CategoryRow {
                name: account.name().to_string(),
                value: account.balance(),
                annual_rate: Some(account.annual_rate()),
            };
            if account.is_debt() {
                debt_value += account.balance();
                debt_categories.push(row);
            } else {
                asset_value += account.balance();
                asset_categories.push(row);
            }
        }
        let net_worth = asset_value - debt_value;

        // Fan-in: snapshot the per-scenario accumulators, sorted for a
        // stable output order.
        let mut goal_keys: Vec<&String> = ledger.goals.keys().collect();
        goal_keys.sort();
        let mut goal_impacts = std::collections::BTreeMap::new();
        let mut goal_breakdowns = Vec::with_capacity(goal_keys.len());
        for key in goal_keys {
            let goal = &ledger.goals[key];
            let cumulative = state.goal_net_worth.entry(key.clone()).or_insert(0.0);
            *cumulative += goal.net_worth_delta;
            goal_impacts.insert(key.clone(), goal.cash_flow_impact);
            goal_breakdowns.push(GoalBreakdown {
                name: goal.name.clone(),
                scenario_id: key.clone(),
                goal_type: goal.goal_type.to_string(),
                cash_flow_impact: goal.cash_flow_impact,
                net_worth_impact: *cumulative,
            });
        }
        let scenario_net_cash_flow: f64 = goal_impacts.values().sum();

        let breakdown = PeriodBreakdown {
            total_income: baseline_income
                + ledger.scenario_income
                + ledger.private_pension_income,
            total_expenses,
            baseline_income,
            baseline_expenses: self.scenario.baseline.monthly_expenses,
            scenario_income: ledger.scenario_income,
            scenario_expenses: ledger.scenario_expenses,
            asset_value,
            debt_value,
            asset_categories,
            debt_categories,
            income_tax: ledger.income_tax,
            national_insurance: ledger.national_insurance,
            state_pension_income: ledger.state_pension_income,
            private_pension_income: ledger.private_pension_income,
            business: ledger.business,
            scheduled_contributions: ledger.scheduled_contributions,
            cash_flow_allocations: ledger.allocations,
            cash_flow_liquidations: ledger.liquidations,
            liquidation_accounts: ledger.liquidation_accounts,
            surplus_cash,
            compound_growth: ledger.compound_growth,
            total_contributions_this_period: ledger.deposits - ledger.withdrawals,
            scenario_net_cash_flow,
            goal_impacts,
            goal_breakdowns,
        };

        ProjectionPoint {
            period,
            net_worth,
            cash_flow,
            breakdown,
        }
    }
}

/// Project many independent scenarios, one engine instance each.
///
/// Instances share nothing; with the `parallel` feature they fan out over
/// the rayon pool and results come back in input order.
pub fn project_scenarios(
    scenarios: &[SimulationScenario],
    years: u32,
    start_year: i16,
    start_month: u8,
) -> Result<Vec<ProjectionOutcome>> {
    #[cfg(feature = "parallel")]
    {
        scenarios
            .par_iter()
            .map(|scenario| {
                Simulator::new(scenario.clone(), years, start_year, start_month)
                    .map(|sim| sim.generate_scenario_projection())
            })
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        scenarios
            .iter()
            .map(|scenario| {
                Simulator::new(scenario.clone(), years, start_year, start_month)
                    .map(|sim| sim.generate_scenario_projection())
            })
            .collect()
    }
}
