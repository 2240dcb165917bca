//! Fluent builder for balance accounts, with presets for the common UK
//! account shapes.

use crate::model::{AssetClass, BalanceAccount, Frequency};

pub struct AccountBuilder {
    account: BalanceAccount,
}

impl AccountBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            account: BalanceAccount {
                name: name.to_string(),
                starting_balance: 0.0,
                contribution: 0.0,
                frequency: Frequency::Monthly,
                performance: 0.0,
                is_debt: false,
                contribution_stop_after_periods: None,
                asset_class: None,
            },
        }
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// Zero-interest cash.
    pub fn cash(name: &str) -> Self {
        Self::new(name).class(AssetClass::Cash)
    }

    pub fn current_account(name: &str) -> Self {
        Self::new(name).class(AssetClass::CurrentAccount)
    }

    pub fn savings(name: &str) -> Self {
        Self::new(name).class(AssetClass::DefaultSavings)
    }

    pub fn hysa(name: &str) -> Self {
        Self::new(name).class(AssetClass::Hysa).growth(4.0)
    }

    /// Stocks-and-shares ISA with a typical equity growth assumption.
    pub fn isa(name: &str) -> Self {
        Self::new(name).class(AssetClass::Equities).growth(6.0)
    }

    pub fn gia(name: &str) -> Self {
        Self::new(name)
            .class(AssetClass::GeneralInvestment)
            .growth(5.0)
    }

    pub fn pension(name: &str) -> Self {
        Self::new(name).class(AssetClass::Pension).growth(5.0)
    }

    /// A debt: the balance is the amount owed, contributions repay it and
    /// `growth` is the interest charged on the outstanding amount.
    pub fn debt(name: &str) -> Self {
        let mut builder = Self::new(name);
        builder.account.is_debt = true;
        builder
    }

    // =========================================================================
    // Fields
    // =========================================================================

    #[must_use]
    pub fn balance(mut self, starting_balance: f64) -> Self {
        self.account.starting_balance = starting_balance;
        self
    }

    /// Scheduled contribution per period of the account's frequency.
    #[must_use]
    pub fn contribution(mut self, contribution: f64) -> Self {
        self.account.contribution = contribution;
        self
    }

    #[must_use]
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.account.frequency = frequency;
        self
    }

    /// Annual rate as a whole percentage (`7` = 7%).
    #[must_use]
    pub fn growth(mut self, performance: f64) -> Self {
        self.account.performance = performance;
        self
    }

    #[must_use]
    pub fn stop_after(mut self, periods: u32) -> Self {
        self.account.contribution_stop_after_periods = Some(periods);
        self
    }

    #[must_use]
    pub fn class(mut self, class: AssetClass) -> Self {
        self.account.asset_class = Some(class);
        self
    }

    pub fn build(self) -> BalanceAccount {
        self.account
    }
}
