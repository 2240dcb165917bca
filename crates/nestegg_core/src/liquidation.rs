//! Liquidation cascade for months with negative cash flow.
//!
//! Sources are drained in priority order, liquid first and tax-advantaged
//! last. Pension sources route through the pension rules engine by net
//! deficit: the gross leaves the pot, the tax is charged to the period, and
//! only the net reduces the outstanding need. Any residue the cascade cannot
//! cover is absorbed by the primary cash account as an overdraft, which is
//! what drives net worth negative in an insolvent month.

use crate::model::AssetClass;
use crate::pension::{calculate_withdrawal_capacity, execute_pension_withdrawal};
use crate::simulation_state::{PeriodLedger, SimulationState};

/// Cover `needed` by liquidating accounts in priority order. Returns the
/// uncovered residue (zero when the cascade succeeded).
pub fn cover_deficit(
    state: &mut SimulationState,
    ledger: &mut PeriodLedger,
    needed: f64,
    age_years: u32,
    tax_year: i16,
) -> f64 {
    let mut needed = needed;

    for class in AssetClass::LIQUIDATION_ORDER {
        if needed <= 1e-9 {
            break;
        }

        let indices: Vec<usize> = state
            .accounts
            .iter()
            .enumerate()
            .filter(|(_, a)| !a.is_debt() && a.asset_class() == class)
            .map(|(i, _)| i)
            .collect();

        for idx in indices {
            if needed <= 1e-9 {
                break;
            }

            if class == AssetClass::Pension {
                let balance = state.accounts[idx].balance();
                let capacity = calculate_withdrawal_capacity(age_years, balance, &state.pension);
                if capacity <= 0.0 {
                    // Below minimum pension age: the deficit persists.
                    continue;
                }
                let other_income = ledger.take_monthly_other_income();
                let request = needed;
                let withdrawal = execute_pension_withdrawal(
                    needed,
                    capacity,
                    &mut state.pension,
                    other_income,
                    tax_year,
                );
                if withdrawal.gross <= 0.0 {
                    continue;
                }
                state.accounts[idx].withdraw(withdrawal.gross);
                ledger.withdrawals += withdrawal.gross;
                ledger.income_tax += withdrawal.tax;
                ledger.private_pension_income += withdrawal.net;
                record(ledger, class, state.accounts[idx].name(), withdrawal.gross);
                needed -= withdrawal.net;
                // The gross-up accepts within 1% of the requested net; a
                // satisfied request is covered, not an overdraft.
                if needed <= 0.011 * request {
                    needed = 0.0;
                }
            } else {
                let taken = state.accounts[idx].withdraw(needed);
                if taken <= 0.0 {
                    continue;
                }
                ledger.withdrawals += taken;
                record(ledger, class, state.accounts[idx].name(), taken);
                needed -= taken;
            }
        }
    }

    let residual = needed.max(0.0);
    if residual > 1e-9 {
        // Insolvent month: the primary cash account goes into overdraft.
        state.accounts[state.primary_cash_idx].overdraw(residual);
        ledger.withdrawals += residual;
    }
    residual
}

fn record(ledger: &mut PeriodLedger, class: AssetClass, account: &str, amount: f64) {
    *ledger.liquidations.entry(class).or_insert(0.0) += amount;
    *ledger
        .liquidation_accounts
        .entry(account.to_string())
        .or_insert(0.0) += amount;
}
