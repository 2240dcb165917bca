//! Automated surplus allocation.
//!
//! A positive monthly cash flow is split across asset classes per the live
//! allocation policy. ISA contributions are capped per UK tax year with
//! overflow routed to a GIA (or default savings) in the same month; pension
//! contributions are capped by the MPAA once triggered. Whatever is left
//! lands in the primary cash account.

use crate::model::AssetClass;
use crate::pension::MPAA_ANNUAL_ALLOWANCE;
use crate::simulation_state::{PeriodLedger, SimulationState};

/// Annual ISA contribution cap per UK tax year.
pub const ISA_ANNUAL_CAP: f64 = 20_000.0;

/// Allocate a positive surplus across the configured asset classes.
pub fn allocate_surplus(state: &mut SimulationState, ledger: &mut PeriodLedger, surplus: f64) {
    if surplus <= 0.0 {
        return;
    }

    let mut residual = surplus;
    let percentages: Vec<(AssetClass, f64)> = state
        .allocation
        .percentages
        .iter()
        .filter(|(class, pct)| !class.is_cash_like() && **pct > 0.0)
        .map(|(class, pct)| (*class, *pct))
        .collect();

    for (class, pct) in percentages {
        let amount = surplus * pct / 100.0;
        if amount <= 0.0 {
            continue;
        }

        let Some(idx) = state.first_account_of_class(class) else {
            // No destination account for this class; the share falls back to
            // cash with the residual.
            continue;
        };

        let placed = match class {
            AssetClass::Equities => {
                let allowed = isa_headroom(state).min(amount);
                let overflow = amount - allowed;
                if allowed > 0.0 {
                    deposit(state, ledger, idx, AssetClass::Equities, allowed);
                    state.isa_contributed_this_tax_year += allowed;
                }
                if overflow > 0.0 {
                    allowed + route_isa_overflow(state, ledger, overflow)
                } else {
                    allowed
                }
            }
            AssetClass::Pension => {
                let allowed = if state.pension.mpaa_triggered {
                    (MPAA_ANNUAL_ALLOWANCE - state.pension_contributed_this_tax_year)
                        .max(0.0)
                        .min(amount)
                } else {
                    amount
                };
                if allowed > 0.0 {
                    deposit(state, ledger, idx, AssetClass::Pension, allowed);
                    state.pension_contributed_this_tax_year += allowed;
                }
                allowed
            }
            _ => {
                deposit(state, ledger, idx, class, amount);
                amount
            }
        };

        residual -= placed;
    }

    // Remainder to cash.
    if residual > 0.0 {
        let idx = state.primary_cash_idx;
        let class = state.accounts[idx].asset_class();
        deposit(state, ledger, idx, class, residual);
    }
}

/// ISA allowance left in the current tax year.
pub fn isa_headroom(state: &SimulationState) -> f64 {
    (ISA_ANNUAL_CAP - state.isa_contributed_this_tax_year).max(0.0)
}

/// Route ISA overflow: GIA if present, else default savings, else it stays
/// with the cash residual. Returns the amount actually placed.
fn route_isa_overflow(
    state: &mut SimulationState,
    ledger: &mut PeriodLedger,
    overflow: f64,
) -> f64 {
    for class in [AssetClass::GeneralInvestment, AssetClass::DefaultSavings] {
        if let Some(idx) = state.first_account_of_class(class) {
            deposit(state, ledger, idx, class, overflow);
            return overflow;
        }
    }
    0.0
}

fn deposit(
    state: &mut SimulationState,
    ledger: &mut PeriodLedger,
    idx: usize,
    class: AssetClass,
    amount: f64,
) {
    state.accounts[idx].deposit(amount);
    ledger.deposits += amount;
    *ledger.allocations.entry(class).or_insert(0.0) += amount;
}
