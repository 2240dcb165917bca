//! UK defined-contribution pension access rules.
//!
//! Withdrawals crystallise funds: 25% of each crystallised amount is tax-free
//! up to the lifetime lump-sum cap, the remainder is taxable income in the
//! tax year of withdrawal. Flexible drawdown of any taxable portion triggers
//! the MPAA permanently. All year-to-date figures live in
//! [`PensionWithdrawalState`], a small value object threaded through the
//! monthly loop — there is no global state.

use serde::{Deserialize, Serialize};

use crate::taxes::calculate_marginal_income_tax;

/// Minimum age for accessing a private pension.
pub const MINIMUM_PENSION_AGE: u32 = 55;
/// Age at which the state pension starts.
pub const STATE_PENSION_AGE: u32 = 67;
/// Fraction of each crystallised amount paid tax-free.
pub const TAX_FREE_FRACTION: f64 = 0.25;
/// Lifetime cap on total tax-free lump sums.
pub const TAX_FREE_LUMP_SUM_CAP: f64 = 268_275.0;
/// Money Purchase Annual Allowance: contribution cap per tax year once
/// flexible drawdown has been triggered.
pub const MPAA_ANNUAL_ALLOWANCE: f64 = 10_000.0;

const GROSS_UP_MAX_ITERATIONS: u32 = 10;
const GROSS_UP_OVERSHOOT: f64 = 1.3;
const GROSS_UP_ACCEPTANCE: f64 = 0.99;

/// Per-tax-year pension withdrawal state, threaded through the loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PensionWithdrawalState {
    /// Remaining headroom under the lifetime tax-free lump-sum cap.
    /// Monotonically non-increasing.
    pub tax_free_lump_sum_remaining: f64,
    /// Total amount ever crystallised.
    pub total_crystallized: f64,
    /// Total tax-free cash ever taken.
    pub total_tax_free_withdrawn: f64,
    /// Set permanently by flexible drawdown of any taxable portion.
    pub mpaa_triggered: bool,
    /// Gross withdrawn in the current period; reset by [`Self::begin_period`].
    pub total_withdrawn_this_period: f64,
    /// Taxable pension income received so far this tax year.
    pub year_to_date_taxable_income: f64,
    /// Non-pension income received so far this tax year.
    pub year_to_date_other_income: f64,
    /// Tax year the YTD figures belong to (year containing its 6 April).
    pub current_tax_year: i16,
}

/// Outcome of a single pension withdrawal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PensionWithdrawal {
    pub gross: f64,
    pub tax_free: f64,
    pub taxable: f64,
    pub tax: f64,
    pub net: f64,
}

/// Build the initial state for a pot. The tax-free headroom is fixed at
/// `min(25% of the pot, lifetime cap)` at initialisation.
pub fn initialize_pension_state(total_pot: f64, start_tax_year: i16) -> PensionWithdrawalState {
    PensionWithdrawalState {
        tax_free_lump_sum_remaining: (total_pot.max(0.0) * TAX_FREE_FRACTION)
            .min(TAX_FREE_LUMP_SUM_CAP),
        total_crystallized: 0.0,
        total_tax_free_withdrawn: 0.0,
        mpaa_triggered: false,
        total_withdrawn_this_period: 0.0,
        year_to_date_taxable_income: 0.0,
        year_to_date_other_income: 0.0,
        current_tax_year: start_tax_year,
    }
}

/// Gross amount available for withdrawal: zero below the minimum pension
/// age, otherwise the full balance.
pub fn calculate_withdrawal_capacity(
    age_years: u32,
    balance: f64,
    _state: &PensionWithdrawalState,
) -> f64 {
    if age_years < MINIMUM_PENSION_AGE {
        0.0
    } else {
        balance.max(0.0)
    }
}

impl PensionWithdrawalState {
    /// Reset the per-period withdrawal counter. Called by the simulator at
    /// the top of each month.
    pub fn begin_period(&mut self) {
        self.total_withdrawn_this_period = 0.0;
    }

    /// Roll YTD figures when the tax year changes, then register this
    /// month's non-pension income. Both happen inside the same call that
    /// performs a withdrawal so the marginal tax base is always current.
    fn roll_tax_year(&mut self, tax_year: i16, monthly_other_income: f64) {
        if tax_year != self.current_tax_year {
            self.current_tax_year = tax_year;
            self.year_to_date_taxable_income = 0.0;
            self.year_to_date_other_income = 0.0;
        }
        self.year_to_date_other_income += monthly_other_income.max(0.0);
    }

    fn ytd_income(&self) -> f64 {
        self.year_to_date_taxable_income + self.year_to_date_other_income
    }

    /// Split a gross withdrawal into its tax-free and taxable portions and
    /// price the taxable portion at the marginal rate, without mutating
    /// anything.
    fn price_gross(&self, gross: f64) -> PensionWithdrawal {
        let tax_free = (gross * TAX_FREE_FRACTION).min(self.tax_free_lump_sum_remaining);
        let taxable = gross - tax_free;
        let tax = calculate_marginal_income_tax(taxable, self.ytd_income());
        PensionWithdrawal {
            gross,
            tax_free,
            taxable,
            tax,
            net: gross - tax,
        }
    }

    fn commit(&mut self, withdrawal: &PensionWithdrawal) {
        self.total_crystallized += withdrawal.gross;
        self.tax_free_lump_sum_remaining -= withdrawal.tax_free;
        self.total_tax_free_withdrawn += withdrawal.tax_free;
        if withdrawal.taxable > 0.0 {
            self.mpaa_triggered = true;
            self.year_to_date_taxable_income += withdrawal.taxable;
        }
        self.total_withdrawn_this_period += withdrawal.gross;
    }
}

/// Withdraw enough gross to cover `net_deficit` after tax.
///
/// The gross amount is found iteratively: each round prices the candidate,
/// and if the net falls short the shortfall is added back with a 30%
/// overshoot to jump the next tax band. Accepts once the net covers 99% of
/// the deficit or the capacity is exhausted; converges within ten rounds.
pub fn execute_pension_withdrawal(
    net_deficit: f64,
    capacity: f64,
    state: &mut PensionWithdrawalState,
    monthly_other_income: f64,
    tax_year: i16,
) -> PensionWithdrawal {
    state.roll_tax_year(tax_year, monthly_other_income);

    if net_deficit <= 0.0 || capacity <= 0.0 {
        return PensionWithdrawal::default();
    }

    let mut gross = net_deficit.min(capacity);
    let mut withdrawal = state.price_gross(gross);

    for _ in 0..GROSS_UP_MAX_ITERATIONS {
        if withdrawal.net >= GROSS_UP_ACCEPTANCE * net_deficit || gross >= capacity {
            break;
        }
        let shortfall = net_deficit - withdrawal.net;
        gross = (gross + shortfall * GROSS_UP_OVERSHOOT).min(capacity);
        withdrawal = state.price_gross(gross);
    }

    state.commit(&withdrawal);
    withdrawal
}

/// Withdraw a caller-specified gross amount (capped at capacity). Same
/// tax-free/taxable split and marginal tax as the net-deficit entry point,
/// with no iteration.
pub fn execute_pension_withdrawal_gross(
    gross: f64,
    capacity: f64,
    state: &mut PensionWithdrawalState,
    monthly_other_income: f64,
    tax_year: i16,
) -> PensionWithdrawal {
    state.roll_tax_year(tax_year, monthly_other_income);

    let gross = gross.min(capacity);
    if gross <= 0.0 {
        return PensionWithdrawal::default();
    }

    let withdrawal = state.price_gross(gross);
    state.commit(&withdrawal);
    withdrawal
}
