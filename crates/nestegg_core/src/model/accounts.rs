//! Balance accounts: the per-account state the monthly loop advances.
//!
//! Assets hold a positive balance that contributions increase; debts hold the
//! *owed* amount as a positive balance that scheduled payments reduce.
//! Interest accrues on positive balances only — an overdrawn cash account
//! does not grow.

use serde::{Deserialize, Serialize};

use super::asset_class::{AssetClass, classify_account_name};

/// How often an account's scheduled contribution lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Frequency {
    Weekly,
    Fortnightly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Weekly => 52,
            Frequency::Fortnightly => 26,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Yearly => 1,
        }
    }

    /// Whole periods of this frequency that fall in simulation month `p`.
    ///
    /// Computed as `⌊(p+1)·k/12⌋ − ⌊p·k/12⌋` for `k` periods per year, so a
    /// weekly account applies 4 or 5 periods a month summing to exactly 52 a
    /// year, a quarterly account aligns every third month, and a yearly
    /// account on every twelfth.
    #[inline]
    pub fn periods_due(&self, period: u32) -> u32 {
        let k = self.periods_per_year() as u64;
        let p = period as u64;
        (((p + 1) * k / 12) - (p * k / 12)) as u32
    }
}

/// Caller-facing account specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAccount {
    pub name: String,
    pub starting_balance: f64,
    /// Scheduled contribution per period of `frequency`. For debts this is
    /// the scheduled repayment.
    #[serde(default)]
    pub contribution: f64,
    #[serde(default = "default_frequency")]
    pub frequency: Frequency,
    /// Annual growth or interest rate as a whole percentage (`7` = 7%).
    #[serde(default)]
    pub performance: f64,
    #[serde(default)]
    pub is_debt: bool,
    /// Stop scheduled contributions after this many periods of `frequency`.
    #[serde(default)]
    pub contribution_stop_after_periods: Option<u32>,
    /// Explicit wrapper tag; when absent the class is inferred from the name.
    #[serde(default)]
    pub asset_class: Option<AssetClass>,
}

fn default_frequency() -> Frequency {
    Frequency::Monthly
}

impl BalanceAccount {
    pub fn resolved_class(&self) -> AssetClass {
        self.asset_class
            .unwrap_or_else(|| classify_account_name(&self.name))
    }
}

/// Scheduled contribution due for one simulation month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScheduledDue {
    /// Amount to move this month (already truncated for debts).
    pub amount: f64,
    /// Whole periods of the account's frequency consumed.
    pub periods: u32,
}

/// Mutable per-run account state. Cloned from the baseline spec before each
/// projection so the caller's objects are never touched.
#[derive(Debug, Clone)]
pub struct AccountState {
    name: String,
    asset_class: AssetClass,
    balance: f64,
    contribution: f64,
    frequency: Frequency,
    /// Current annual rate (whole percent); may be overridden by a rate
    /// change modifier.
    performance: f64,
    base_performance: f64,
    is_debt: bool,
    contribution_stop_after_periods: Option<u32>,
    periods_applied: u32,
}

impl AccountState {
    pub fn from_spec(spec: &BalanceAccount) -> Self {
        Self {
            name: spec.name.clone(),
            asset_class: spec.resolved_class(),
            balance: spec.starting_balance,
            contribution: spec.contribution,
            frequency: spec.frequency,
            performance: spec.performance,
            base_performance: spec.performance,
            is_debt: spec.is_debt,
            contribution_stop_after_periods: spec.contribution_stop_after_periods,
            periods_applied: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn is_debt(&self) -> bool {
        self.is_debt
    }

    /// Annual rate as a whole percentage.
    pub fn annual_rate(&self) -> f64 {
        self.performance
    }

    pub fn rate_per_period(&self) -> f64 {
        self.performance / 100.0 / self.frequency.periods_per_year() as f64
    }

    /// Signed contribution of this account to net worth.
    pub fn net_value(&self) -> f64 {
        if self.is_debt { -self.balance } else { self.balance }
    }

    /// Override the annual rate (rate-change modifier).
    pub fn set_annual_rate(&mut self, performance: f64) {
        self.performance = performance;
    }

    /// Restore the original annual rate after a bounded rate change ends.
    pub fn restore_annual_rate(&mut self) {
        self.performance = self.base_performance;
    }

    /// Accrue interest for one simulation month and return the signed
    /// net-worth growth: positive for asset interest, negative for interest
    /// accruing on an outstanding debt.
    pub fn accrue_interest(&mut self, period: u32) -> f64 {
        let n = self.frequency.periods_due(period);
        if n == 0 || self.balance <= 0.0 || self.performance == 0.0 {
            return 0.0;
        }
        let rate = self.rate_per_period();
        let interest = self.balance * ((1.0 + rate).powi(n as i32) - 1.0);
        self.balance += interest;
        if self.is_debt { -interest } else { interest }
    }

    /// The scheduled contribution due this month, honouring the stop cap and
    /// truncating debt repayments to the outstanding balance. Does not move
    /// money; callers apply the (possibly ISA-capped) amount via
    /// [`Self::apply_scheduled`].
    pub fn scheduled_due(&self, period: u32) -> ScheduledDue {
        let mut n = self.frequency.periods_due(period);
        if let Some(cap) = self.contribution_stop_after_periods {
            n = n.min(cap.saturating_sub(self.periods_applied));
        }
        if n == 0 || self.contribution <= 0.0 {
            return ScheduledDue {
                amount: 0.0,
                periods: n,
            };
        }
        let mut amount = self.contribution * n as f64;
        if self.is_debt {
            amount = amount.min(self.balance.max(0.0));
        }
        ScheduledDue { amount, periods: n }
    }

    /// Move a scheduled amount and advance the stop-cap counter. For debts
    /// the amount reduces the outstanding balance, clamped at zero.
    pub fn apply_scheduled(&mut self, amount: f64, periods: u32) {
        self.periods_applied += periods;
        if amount <= 0.0 {
            return;
        }
        if self.is_debt {
            self.balance = (self.balance - amount).max(0.0);
        } else {
            self.balance += amount;
        }
    }

    /// External deposit (allocator, one-off contribution modifiers).
    pub fn deposit(&mut self, amount: f64) {
        if amount > 0.0 {
            if self.is_debt {
                self.balance = (self.balance - amount).max(0.0);
            } else {
                self.balance += amount;
            }
        }
    }

    /// Withdraw up to `amount`, returning what was actually available.
    pub fn withdraw(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 || self.is_debt {
            return 0.0;
        }
        let taken = amount.min(self.balance.max(0.0));
        self.balance -= taken;
        taken
    }

    /// Withdraw `amount` even past zero. Only the primary cash account takes
    /// this path, absorbing an uncovered deficit as an overdraft.
    pub fn overdraw(&mut self, amount: f64) {
        self.balance -= amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(balance: f64, contribution: f64, performance: f64) -> AccountState {
        AccountState::from_spec(&BalanceAccount {
            name: "Savings".to_string(),
            starting_balance: balance,
            contribution,
            frequency: Frequency::Monthly,
            performance,
            is_debt: false,
            contribution_stop_after_periods: None,
            asset_class: None,
        })
    }

    #[test]
    fn test_periods_due_sums_to_periods_per_year() {
        for freq in [
            Frequency::Weekly,
            Frequency::Fortnightly,
            Frequency::Monthly,
            Frequency::Quarterly,
            Frequency::Yearly,
        ] {
            let total: u32 = (0..12).map(|p| freq.periods_due(p)).sum();
            assert_eq!(total, freq.periods_per_year(), "{:?}", freq);
            // And again for the second simulated year.
            let total: u32 = (12..24).map(|p| freq.periods_due(p)).sum();
            assert_eq!(total, freq.periods_per_year(), "{:?}", freq);
        }
    }

    #[test]
    fn test_quarterly_aligns_every_third_month() {
        let due: Vec<u32> = (0..12).map(|p| Frequency::Quarterly.periods_due(p)).collect();
        assert_eq!(due, vec![0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1]);
    }

    #[test]
    fn test_asset_interest_compounds_monthly() {
        let mut acct = asset(1_000.0, 0.0, 12.0);
        let growth = acct.accrue_interest(0);
        assert!((growth - 10.0).abs() < 0.01, "got {}", growth);
        assert!((acct.balance() - 1_010.0).abs() < 0.01);
    }

    #[test]
    fn test_debt_interest_reduces_net_worth() {
        let mut debt = AccountState::from_spec(&BalanceAccount {
            name: "Mortgage".to_string(),
            starting_balance: 100_000.0,
            contribution: 0.0,
            frequency: Frequency::Monthly,
            performance: 6.0,
            is_debt: true,
            contribution_stop_after_periods: None,
            asset_class: Some(AssetClass::Cash),
        });
        let growth = debt.accrue_interest(0);
        assert!(growth < 0.0);
        assert!((debt.balance() - 100_500.0).abs() < 0.01);
        assert!((debt.net_value() + 100_500.0).abs() < 0.01);
    }

    #[test]
    fn test_debt_payment_clamps_at_zero() {
        let mut debt = AccountState::from_spec(&BalanceAccount {
            name: "Loan".to_string(),
            starting_balance: 150.0,
            contribution: 100.0,
            frequency: Frequency::Monthly,
            performance: 0.0,
            is_debt: true,
            contribution_stop_after_periods: None,
            asset_class: Some(AssetClass::Cash),
        });

        let due = debt.scheduled_due(0);
        assert!((due.amount - 100.0).abs() < 0.01);
        debt.apply_scheduled(due.amount, due.periods);
        assert!((debt.balance() - 50.0).abs() < 0.01);

        // Final payment is truncated to the outstanding balance.
        let due = debt.scheduled_due(1);
        assert!((due.amount - 50.0).abs() < 0.01, "got {}", due.amount);
        debt.apply_scheduled(due.amount, due.periods);
        assert_eq!(debt.balance(), 0.0);

        // Once cleared, nothing more is due.
        let due = debt.scheduled_due(2);
        assert_eq!(due.amount, 0.0);
    }

    #[test]
    fn test_contribution_stop_cap() {
        let mut acct = AccountState::from_spec(&BalanceAccount {
            name: "Savings".to_string(),
            starting_balance: 0.0,
            contribution: 100.0,
            frequency: Frequency::Monthly,
            performance: 0.0,
            is_debt: false,
            contribution_stop_after_periods: Some(3),
            asset_class: None,
        });
        for p in 0..6 {
            let due = acct.scheduled_due(p);
            acct.apply_scheduled(due.amount, due.periods);
        }
        assert!((acct.balance() - 300.0).abs() < 0.01, "got {}", acct.balance());
    }

    #[test]
    fn test_withdraw_returns_available() {
        let mut acct = asset(80.0, 0.0, 0.0);
        let taken = acct.withdraw(100.0);
        assert!((taken - 80.0).abs() < 1e-9);
        assert_eq!(acct.balance(), 0.0);
        assert_eq!(acct.withdraw(10.0), 0.0);
    }

    #[test]
    fn test_no_interest_on_overdraft() {
        let mut acct = asset(0.0, 0.0, 12.0);
        acct.overdraw(500.0);
        assert_eq!(acct.accrue_interest(0), 0.0);
        assert!((acct.balance() + 500.0).abs() < 1e-9);
    }
}
