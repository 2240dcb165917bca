//! Per-period modifier evaluation.
//!
//! Each archetype has one evaluator, selected by matching on the modifier
//! kind. Evaluation happens in two passes per period: configuration changes
//! (salary, allocation policy, interest rates) apply before interest accrual
//! and income calculation; flow effects (income, expenses, direct account
//! movements, business streams) apply after baseline income is known.
//! Per-scenario effects fan out into the period ledger's goal accumulators
//! and are snapshotted into the breakdown at period end.

use crate::allocation;
use crate::calendar::PeriodClock;
use crate::model::{AssetClass, BusinessFigures, ModifierKind, ScenarioModifier};
use crate::pension::{calculate_withdrawal_capacity, execute_pension_withdrawal_gross};
use crate::simulation_state::{PeriodLedger, SimulationState};
use crate::taxes::{calculate_corporation_tax, calculate_marginal_income_tax};

/// Lifecycle of a modifier relative to the current period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierPhase {
    Pending,
    Active,
    Completed,
}

/// Where a modifier sits in its lifecycle at `period`.
pub fn modifier_phase(kind: &ModifierKind, period: u32, clock: &PeriodClock) -> ModifierPhase {
    let p = period as i64;
    let window = match kind {
        ModifierKind::OneOffInflow { date, .. }
        | ModifierKind::OneOffExpense { date, .. }
        | ModifierKind::OneOffAccountContribution { date, .. }
        | ModifierKind::OneOffAccountWithdrawal { date, .. } => {
            let at = clock.period_of(*date);
            (at, Some(at))
        }
        ModifierKind::RecurringIncome {
            start_date,
            end_date,
            ..
        }
        | ModifierKind::RecurringExpense {
            start_date,
            end_date,
            ..
        }
        | ModifierKind::RecurringAccountContribution {
            start_date,
            end_date,
            ..
        }
        | ModifierKind::RecurringAccountWithdrawal {
            start_date,
            end_date,
            ..
        }
        | ModifierKind::InterestRateChange {
            start_date,
            end_date,
            ..
        }
        | ModifierKind::BusinessIncome {
            start_date,
            end_date,
            ..
        } => (
            clock.period_of(*start_date),
            end_date.map(|d| clock.period_of(d)),
        ),
        ModifierKind::AllocationConfigChange { start_date, .. }
        | ModifierKind::SalaryChange { start_date, .. } => {
            (clock.period_of(*start_date), None)
        }
    };

    let (start, end) = window;
    if p < start {
        ModifierPhase::Pending
    } else if end.is_some_and(|e| p > e) {
        ModifierPhase::Completed
    } else {
        ModifierPhase::Active
    }
}

fn active(kind: &ModifierKind, period: u32, clock: &PeriodClock) -> bool {
    modifier_phase(kind, period, clock) == ModifierPhase::Active
}

/// Inputs the flow evaluators need from the surrounding period.
#[derive(Debug, Clone, Copy)]
pub struct PeriodContext {
    pub period: u32,
    pub tax_year: i16,
    pub age_years: u32,
    /// Annual taxable income the period already carries, used as the
    /// marginal base for taxable one-off and recurring inflows.
    pub annual_taxable_income: f64,
}

/// First pass: configuration mutations, applied before accrual and income.
pub fn apply_config_changes(
    state: &mut SimulationState,
    modifiers: &[ScenarioModifier],
    period: u32,
) {
    let clock = state.clock;
    for modifier in modifiers {
        match &modifier.kind {
            ModifierKind::SalaryChange {
                gross_annual_salary,
                start_date,
            } => {
                if period as i64 >= clock.period_of(*start_date) {
                    state.salary_override = Some(*gross_annual_salary);
                }
            }
            ModifierKind::AllocationConfigChange {
                start_date,
                allocation,
            } => {
                if period as i64 >= clock.period_of(*start_date) {
                    state.allocation = allocation.to_config();
                }
            }
            ModifierKind::InterestRateChange {
                account,
                annual_rate,
                start_date,
                end_date,
            } => {
                let Some(idx) = state.account_idx(account) else {
                    continue;
                };
                let p = period as i64;
                let start = clock.period_of(*start_date);
                match end_date.map(|d| clock.period_of(d)) {
                    _ if p < start => {}
                    Some(end) if p > end => {
                        // Bounded override: restore the original rate in the
                        // first period after the window.
                        if p == end + 1 {
                            state.accounts[idx].restore_annual_rate();
                        }
                    }
                    _ => state.accounts[idx].set_annual_rate(*annual_rate),
                }
            }
            _ => {}
        }
    }
}

/// Second pass: income, expense, account, and business effects.
pub fn apply_flow_modifiers(
    state: &mut SimulationState,
    ledger: &mut PeriodLedger,
    modifiers: &[ScenarioModifier],
    ctx: PeriodContext,
) {
    let clock = state.clock;
    for modifier in modifiers {
        if !active(&modifier.kind, ctx.period, &clock) {
            continue;
        }
        match &modifier.kind {
            ModifierKind::OneOffInflow {
                amount, taxable, ..
            } => {
                apply_inflow(ledger, modifier, *amount, *taxable, ctx);
            }
            ModifierKind::RecurringIncome {
                monthly_amount,
                taxable,
                ..
            } => {
                apply_inflow(ledger, modifier, *monthly_amount, *taxable, ctx);
            }
            ModifierKind::OneOffExpense { amount, .. } => {
                apply_expense(ledger, modifier, *amount);
            }
            ModifierKind::RecurringExpense { monthly_amount, .. } => {
                apply_expense(ledger, modifier, *monthly_amount);
            }
            ModifierKind::OneOffAccountContribution {
                account, amount, ..
            } => {
                apply_account_contribution(state, ledger, modifier, account, *amount);
            }
            ModifierKind::RecurringAccountContribution {
                account,
                monthly_amount,
                ..
            } => {
                apply_account_contribution(state, ledger, modifier, account, *monthly_amount);
            }
            ModifierKind::OneOffAccountWithdrawal {
                account, amount, ..
            } => {
                apply_account_withdrawal(state, ledger, modifier, account, *amount, ctx);
            }
            ModifierKind::RecurringAccountWithdrawal {
                account,
                monthly_amount,
                ..
            } => {
                apply_account_withdrawal(state, ledger, modifier, account, *monthly_amount, ctx);
            }
            ModifierKind::BusinessIncome {
                monthly_revenue,
                monthly_costs,
                ..
            } => {
                apply_business(ledger, modifier, *monthly_revenue, *monthly_costs);
            }
            ModifierKind::InterestRateChange { .. }
            | ModifierKind::AllocationConfigChange { .. }
            | ModifierKind::SalaryChange { .. } => {}
        }
    }
}

fn apply_inflow(
    ledger: &mut PeriodLedger,
    modifier: &ScenarioModifier,
    amount: f64,
    taxable: bool,
    ctx: PeriodContext,
) {
    let net = if taxable {
        let tax = calculate_marginal_income_tax(amount, ctx.annual_taxable_income);
        ledger.income_tax += tax;
        // Taxable scenario income raises the pension marginal base too.
        ledger.add_monthly_other_income(amount);
        amount - tax
    } else {
        amount
    };
    ledger.scenario_income += net;
    let goal = ledger.goal(
        modifier.attribution_key(),
        &modifier.name,
        modifier.archetype_label(),
    );
    goal.cash_flow_impact += net;
}

fn apply_expense(ledger: &mut PeriodLedger, modifier: &ScenarioModifier, amount: f64) {
    ledger.scenario_expenses += amount;
    let goal = ledger.goal(
        modifier.attribution_key(),
        &modifier.name,
        modifier.archetype_label(),
    );
    goal.cash_flow_impact -= amount;
}

fn apply_account_contribution(
    state: &mut SimulationState,
    ledger: &mut PeriodLedger,
    modifier: &ScenarioModifier,
    account: &str,
    amount: f64,
) {
    let Some(idx) = state.account_idx(account) else {
        return;
    };

    // Direct ISA deposits consume the same annual allowance as scheduled
    // and automated ones; the blocked remainder stays in the cash flow.
    let amount = if state.accounts[idx].asset_class() == AssetClass::Equities {
        let allowed = allocation::isa_headroom(state).min(amount);
        state.isa_contributed_this_tax_year += allowed;
        allowed
    } else {
        amount
    };
    if amount <= 0.0 {
        return;
    }

    state.accounts[idx].deposit(amount);
    ledger.deposits += amount;
    ledger.direct_outflow += amount;
    let goal = ledger.goal(
        modifier.attribution_key(),
        &modifier.name,
        modifier.archetype_label(),
    );
    goal.cash_flow_impact -= amount;
    goal.net_worth_delta += amount;
}

fn apply_account_withdrawal(
    state: &mut SimulationState,
    ledger: &mut PeriodLedger,
    modifier: &ScenarioModifier,
    account: &str,
    amount: f64,
    ctx: PeriodContext,
) {
    let Some(idx) = state.account_idx(account) else {
        return;
    };

    let (gross, net) = if state.accounts[idx].asset_class() == AssetClass::Pension {
        let balance = state.accounts[idx].balance();
        let capacity = calculate_withdrawal_capacity(ctx.age_years, balance, &state.pension);
        let other_income = ledger.take_monthly_other_income();
        let withdrawal = execute_pension_withdrawal_gross(
            amount,
            capacity,
            &mut state.pension,
            other_income,
            ctx.tax_year,
        );
        if withdrawal.gross <= 0.0 {
            return;
        }
        state.accounts[idx].withdraw(withdrawal.gross);
        ledger.income_tax += withdrawal.tax;
        ledger.private_pension_income += withdrawal.net;
        (withdrawal.gross, withdrawal.net)
    } else {
        let taken = state.accounts[idx].withdraw(amount);
        if taken <= 0.0 {
            return;
        }
        (taken, taken)
    };

    ledger.withdrawals += gross;
    ledger.direct_inflow += net;
    let goal = ledger.goal(
        modifier.attribution_key(),
        &modifier.name,
        modifier.archetype_label(),
    );
    goal.cash_flow_impact += net;
    goal.net_worth_delta -= gross;
}

fn apply_business(
    ledger: &mut PeriodLedger,
    modifier: &ScenarioModifier,
    monthly_revenue: f64,
    monthly_costs: f64,
) {
    let profit = monthly_revenue - monthly_costs;
    // Corporation tax bands are annual: annualise the stream for banding,
    // charge one twelfth per month.
    let corporation_tax = if profit > 0.0 {
        calculate_corporation_tax(profit * 12.0).tax / 12.0
    } else {
        0.0
    };
    let net = profit - corporation_tax;

    let figures = ledger.business.get_or_insert_with(BusinessFigures::default);
    figures.business_revenue += monthly_revenue;
    figures.business_costs += monthly_costs;
    figures.business_profit += profit;
    figures.corporation_tax += corporation_tax;
    figures.business_net_profit += net;

    if net >= 0.0 {
        ledger.scenario_income += net;
    } else {
        ledger.scenario_expenses += -net;
    }
    let goal = ledger.goal(
        modifier.attribution_key(),
        &modifier.name,
        modifier.archetype_label(),
    );
    goal.cash_flow_impact += net;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::PeriodClock;

    #[test]
    fn test_one_off_phase_transitions() {
        let clock = PeriodClock::new(2025, 0);
        let kind = ModifierKind::OneOffExpense {
            amount: 1_000.0,
            date: jiff::civil::date(2025, 4, 1),
        };
        assert_eq!(modifier_phase(&kind, 2, &clock), ModifierPhase::Pending);
        assert_eq!(modifier_phase(&kind, 3, &clock), ModifierPhase::Active);
        assert_eq!(modifier_phase(&kind, 4, &clock), ModifierPhase::Completed);
    }

    #[test]
    fn test_recurring_window_phases() {
        let clock = PeriodClock::new(2025, 0);
        let kind = ModifierKind::RecurringExpense {
            monthly_amount: 100.0,
            start_date: jiff::civil::date(2025, 3, 1),
            end_date: Some(jiff::civil::date(2025, 8, 1)),
        };
        assert_eq!(modifier_phase(&kind, 1, &clock), ModifierPhase::Pending);
        assert_eq!(modifier_phase(&kind, 2, &clock), ModifierPhase::Active);
        assert_eq!(modifier_phase(&kind, 7, &clock), ModifierPhase::Active);
        assert_eq!(modifier_phase(&kind, 8, &clock), ModifierPhase::Completed);
    }

    #[test]
    fn test_open_ended_recurring_never_completes() {
        let clock = PeriodClock::new(2025, 0);
        let kind = ModifierKind::RecurringIncome {
            monthly_amount: 100.0,
            start_date: jiff::civil::date(2025, 1, 1),
            end_date: None,
            taxable: true,
        };
        assert_eq!(modifier_phase(&kind, 479, &clock), ModifierPhase::Active);
    }

    #[test]
    fn test_streams_started_before_the_horizon_are_active() {
        let clock = PeriodClock::new(2025, 0);
        let kind = ModifierKind::RecurringExpense {
            monthly_amount: 100.0,
            start_date: jiff::civil::date(2020, 1, 1),
            end_date: None,
        };
        assert_eq!(modifier_phase(&kind, 0, &clock), ModifierPhase::Active);
    }
}
