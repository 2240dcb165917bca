//! Top-level scenario builder.

use crate::model::{AllocationConfig, Baseline, SimulationScenario};

use super::account_builder::AccountBuilder;
use super::modifier_builder::ModifierBuilder;

pub struct ScenarioBuilder {
    baseline: Baseline,
    modifiers: Vec<ModifierBuilder>,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            baseline: Baseline {
                accounts: Vec::new(),
                monthly_income: 0.0,
                monthly_expenses: 0.0,
                current_age: 40,
                retirement_age: 67,
                state_pension_monthly: 0.0,
                monthly_income_tax: None,
                monthly_ni: None,
                gross_annual_salary: None,
                allocation_config: None,
            },
            modifiers: Vec::new(),
        }
    }

    /// Gross monthly employment income.
    #[must_use]
    pub fn monthly_income(mut self, amount: f64) -> Self {
        self.baseline.monthly_income = amount;
        self
    }

    #[must_use]
    pub fn monthly_expenses(mut self, amount: f64) -> Self {
        self.baseline.monthly_expenses = amount;
        self
    }

    #[must_use]
    pub fn ages(mut self, current_age: u8, retirement_age: u8) -> Self {
        self.baseline.current_age = current_age;
        self.baseline.retirement_age = retirement_age;
        self
    }

    #[must_use]
    pub fn state_pension_monthly(mut self, amount: f64) -> Self {
        self.baseline.state_pension_monthly = amount;
        self
    }

    /// Pre-computed monthly income tax and NI, bypassing the calculator.
    #[must_use]
    pub fn monthly_deductions(mut self, income_tax: f64, ni: f64) -> Self {
        self.baseline.monthly_income_tax = Some(income_tax);
        self.baseline.monthly_ni = Some(ni);
        self
    }

    #[must_use]
    pub fn gross_annual_salary(mut self, amount: f64) -> Self {
        self.baseline.gross_annual_salary = Some(amount);
        self
    }

    #[must_use]
    pub fn allocation(mut self, config: AllocationConfig) -> Self {
        self.baseline.allocation_config = Some(config);
        self
    }

    #[must_use]
    pub fn account(mut self, builder: AccountBuilder) -> Self {
        self.baseline.accounts.push(builder.build());
        self
    }

    #[must_use]
    pub fn modifier(mut self, builder: ModifierBuilder) -> Self {
        self.modifiers.push(builder);
        self
    }

    pub fn build(self) -> SimulationScenario {
        SimulationScenario {
            baseline: self.baseline,
            modifiers: self.modifiers.into_iter().map(ModifierBuilder::build).collect(),
        }
    }
}
