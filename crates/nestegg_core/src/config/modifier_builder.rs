//! Fluent builder for scenario modifiers.
//!
//! One constructor per archetype, plus chainable refinements (`id`,
//! `scenario_id`, `tax_free`, `until`, `duration_months`). The builder
//! translates user-facing shapes like "duration in months" into the
//! canonical start/end window.

use std::collections::BTreeMap;

use jiff::civil::Date;

use crate::model::{AllocationChange, AssetClass, ModifierKind, ScenarioModifier};

pub struct ModifierBuilder {
    id: Option<String>,
    name: String,
    scenario_id: Option<String>,
    kind: ModifierKind,
}

/// Calendar month arithmetic, clamping the day to the target month's length.
fn add_months(date: Date, months: i32) -> Date {
    let total = date.year() as i32 * 12 + date.month() as i32 - 1 + months;
    let year = total.div_euclid(12) as i16;
    let month = (total.rem_euclid(12) + 1) as i8;
    let max_day = jiff::civil::date(year, month, 1).days_in_month();
    jiff::civil::date(year, month, date.day().min(max_day))
}

impl ModifierBuilder {
    fn new(name: &str, kind: ModifierKind) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            scenario_id: None,
            kind,
        }
    }

    // =========================================================================
    // Archetype constructors
    // =========================================================================

    pub fn one_off_inflow(name: &str, amount: f64, date: Date) -> Self {
        Self::new(
            name,
            ModifierKind::OneOffInflow {
                amount,
                date,
                taxable: true,
            },
        )
    }

    pub fn one_off_expense(name: &str, amount: f64, date: Date) -> Self {
        Self::new(name, ModifierKind::OneOffExpense { amount, date })
    }

    pub fn one_off_account_contribution(
        name: &str,
        account: &str,
        amount: f64,
        date: Date,
    ) -> Self {
        Self::new(
            name,
            ModifierKind::OneOffAccountContribution {
                account: account.to_string(),
                amount,
                date,
            },
        )
    }

    pub fn one_off_account_withdrawal(name: &str, account: &str, amount: f64, date: Date) -> Self {
        Self::new(
            name,
            ModifierKind::OneOffAccountWithdrawal {
                account: account.to_string(),
                amount,
                date,
            },
        )
    }

    pub fn recurring_income(name: &str, monthly_amount: f64, start_date: Date) -> Self {
        Self::new(
            name,
            ModifierKind::RecurringIncome {
                monthly_amount,
                start_date,
                end_date: None,
                taxable: true,
            },
        )
    }

    pub fn recurring_expense(name: &str, monthly_amount: f64, start_date: Date) -> Self {
        Self::new(
            name,
            ModifierKind::RecurringExpense {
                monthly_amount,
                start_date,
                end_date: None,
            },
        )
    }

    pub fn recurring_account_contribution(
        name: &str,
        account: &str,
        monthly_amount: f64,
        start_date: Date,
    ) -> Self {
        Self::new(
            name,
            ModifierKind::RecurringAccountContribution {
                account: account.to_string(),
                monthly_amount,
                start_date,
                end_date: None,
            },
        )
    }

    pub fn recurring_account_withdrawal(
        name: &str,
        account: &str,
        monthly_amount: f64,
        start_date: Date,
    ) -> Self {
        Self::new(
            name,
            ModifierKind::RecurringAccountWithdrawal {
                account: account.to_string(),
                monthly_amount,
                start_date,
                end_date: None,
            },
        )
    }

    pub fn interest_rate_change(
        name: &str,
        account: &str,
        annual_rate: f64,
        start_date: Date,
    ) -> Self {
        Self::new(
            name,
            ModifierKind::InterestRateChange {
                account: account.to_string(),
                annual_rate,
                start_date,
                end_date: None,
            },
        )
    }

    /// Route the whole surplus to one class from `start_date`.
    pub fn allocation_all_to(name: &str, class: AssetClass, start_date: Date) -> Self {
        Self::new(
            name,
            ModifierKind::AllocationConfigChange {
                start_date,
                allocation: AllocationChange::AllTo(class),
            },
        )
    }

    pub fn allocation_percentages(
        name: &str,
        percentages: BTreeMap<AssetClass, f64>,
        start_date: Date,
    ) -> Self {
        Self::new(
            name,
            ModifierKind::AllocationConfigChange {
                start_date,
                allocation: AllocationChange::Percentages(percentages),
            },
        )
    }

    pub fn salary_change(name: &str, gross_annual_salary: f64, start_date: Date) -> Self {
        Self::new(
            name,
            ModifierKind::SalaryChange {
                gross_annual_salary,
                start_date,
            },
        )
    }

    pub fn business_income(
        name: &str,
        monthly_revenue: f64,
        monthly_costs: f64,
        start_date: Date,
    ) -> Self {
        Self::new(
            name,
            ModifierKind::BusinessIncome {
                monthly_revenue,
                monthly_costs,
                start_date,
                end_date: None,
            },
        )
    }

    // =========================================================================
    // Refinements
    // =========================================================================

    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn scenario_id(mut self, scenario_id: &str) -> Self {
        self.scenario_id = Some(scenario_id.to_string());
        self
    }

    /// Mark an inflow as tax-free (gifts, inheritances).
    #[must_use]
    pub fn tax_free(mut self) -> Self {
        match &mut self.kind {
            ModifierKind::OneOffInflow { taxable, .. }
            | ModifierKind::RecurringIncome { taxable, .. } => *taxable = false,
            _ => {}
        }
        self
    }

    /// Inclusive end date for a recurring window.
    #[must_use]
    pub fn until(mut self, date: Date) -> Self {
        self.set_end(Some(date));
        self
    }

    /// Run for exactly `months` monthly applications; zero means ongoing.
    #[must_use]
    pub fn duration_months(mut self, months: u32) -> Self {
        let end = if months == 0 {
            None
        } else {
            self.start().map(|start| add_months(start, months as i32 - 1))
        };
        self.set_end(end);
        self
    }

    fn start(&self) -> Option<Date> {
        match &self.kind {
            ModifierKind::RecurringIncome { start_date, .. }
            | ModifierKind::RecurringExpense { start_date, .. }
            | ModifierKind::RecurringAccountContribution { start_date, .. }
            | ModifierKind::RecurringAccountWithdrawal { start_date, .. }
            | ModifierKind::InterestRateChange { start_date, .. }
            | ModifierKind::BusinessIncome { start_date, .. } => Some(*start_date),
            _ => None,
        }
    }

    fn set_end(&mut self, end: Option<Date>) {
        match &mut self.kind {
            ModifierKind::RecurringIncome { end_date, .. }
            | ModifierKind::RecurringExpense { end_date, .. }
            | ModifierKind::RecurringAccountContribution { end_date, .. }
            | ModifierKind::RecurringAccountWithdrawal { end_date, .. }
            | ModifierKind::InterestRateChange { end_date, .. }
            | ModifierKind::BusinessIncome { end_date, .. } => *end_date = end,
            _ => {}
        }
    }

    pub fn build(self) -> ScenarioModifier {
        let id = self
            .id
            .unwrap_or_else(|| self.name.to_lowercase().replace(' ', "-"));
        ScenarioModifier {
            id,
            name: self.name,
            scenario_id: self.scenario_id,
            kind: self.kind,
        }
    }
}
