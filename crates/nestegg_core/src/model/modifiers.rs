//! Scenario modifiers: declarative changes layered on the baseline.
//!
//! Each modifier carries exactly one archetype from a closed set; the
//! simulator selects the evaluator by matching on the variant. Multi-part
//! scenarios ("start a business" = revenue + costs + tax) share a
//! `scenario_id` so per-scenario attribution is deterministic.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::scenario::AllocationChange;

/// The closed archetype set. The serialized form is tagged by `archetype`,
/// so a payload without one fails to deserialize — there is no such thing as
/// an archetype-less modifier in the canonical model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "archetype", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all_fields = "camelCase")]
pub enum ModifierKind {
    /// Lump sum received in the period containing `date`.
    OneOffInflow {
        amount: f64,
        date: Date,
        #[serde(default = "default_true")]
        taxable: bool,
    },
    /// Lump sum spent in the period containing `date`, before the
    /// allocator/liquidator run.
    OneOffExpense { amount: f64, date: Date },
    /// One-shot deposit straight into a named account, bypassing the
    /// allocator. Funded from that month's cash flow.
    OneOffAccountContribution {
        account: String,
        amount: f64,
        date: Date,
    },
    /// One-shot withdrawal from a named account; proceeds join that month's
    /// cash flow. Pension accounts route through the pension rules.
    OneOffAccountWithdrawal {
        account: String,
        amount: f64,
        date: Date,
    },
    /// Extra income every month while active.
    RecurringIncome {
        monthly_amount: f64,
        start_date: Date,
        /// Inclusive end; `None` runs to the horizon.
        #[serde(default)]
        end_date: Option<Date>,
        #[serde(default = "default_true")]
        taxable: bool,
    },
    /// Extra expense every month while active.
    RecurringExpense {
        monthly_amount: f64,
        start_date: Date,
        #[serde(default)]
        end_date: Option<Date>,
    },
    /// Monthly deposit into a named account while active.
    RecurringAccountContribution {
        account: String,
        monthly_amount: f64,
        start_date: Date,
        #[serde(default)]
        end_date: Option<Date>,
    },
    /// Monthly withdrawal from a named account while active.
    RecurringAccountWithdrawal {
        account: String,
        monthly_amount: f64,
        start_date: Date,
        #[serde(default)]
        end_date: Option<Date>,
    },
    /// Override an account's annual rate from `start_date`; the original
    /// rate is restored after `end_date` when one is given.
    InterestRateChange {
        account: String,
        annual_rate: f64,
        start_date: Date,
        #[serde(default)]
        end_date: Option<Date>,
    },
    /// Replace the surplus allocation policy from `start_date`.
    AllocationConfigChange {
        start_date: Date,
        allocation: AllocationChange,
    },
    /// Replace the gross annual salary from `start_date`; tax and NI are
    /// recomputed from the new figure.
    SalaryChange {
        gross_annual_salary: f64,
        start_date: Date,
    },
    /// Business revenue and cost streams; corporation tax applies and the
    /// net profit joins scenario cash flow.
    BusinessIncome {
        monthly_revenue: f64,
        monthly_costs: f64,
        start_date: Date,
        #[serde(default)]
        end_date: Option<Date>,
    },
}

fn default_true() -> bool {
    true
}

/// Suffix marking a setup-cost sub-modifier that the annual aggregator
/// merges into its parent scenario's row.
pub const SETUP_ID_SUFFIX: &str = "-setup";

/// A single declarative change to the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioModifier {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,
    #[serde(flatten)]
    pub kind: ModifierKind,
}

impl ScenarioModifier {
    /// Key used to group per-period effects for attribution: the shared
    /// scenario id when present, otherwise the modifier's own name.
    /// Setup-cost sub-modifiers fold into their parent scenario.
    pub fn attribution_key(&self) -> &str {
        match &self.scenario_id {
            Some(id) => id.strip_suffix(SETUP_ID_SUFFIX).unwrap_or(id),
            None => &self.name,
        }
    }

    /// Archetype label used in goal breakdown rows.
    pub fn archetype_label(&self) -> &'static str {
        match &self.kind {
            ModifierKind::OneOffInflow { .. } => "ONE_OFF_INFLOW",
            ModifierKind::OneOffExpense { .. } => "ONE_OFF_EXPENSE",
            ModifierKind::OneOffAccountContribution { .. } => "ONE_OFF_ACCOUNT_CONTRIBUTION",
            ModifierKind::OneOffAccountWithdrawal { .. } => "ONE_OFF_ACCOUNT_WITHDRAWAL",
            ModifierKind::RecurringIncome { .. } => "RECURRING_INCOME",
            ModifierKind::RecurringExpense { .. } => "RECURRING_EXPENSE",
            ModifierKind::RecurringAccountContribution { .. } => {
                "RECURRING_ACCOUNT_CONTRIBUTION"
            }
            ModifierKind::RecurringAccountWithdrawal { .. } => "RECURRING_ACCOUNT_WITHDRAWAL",
            ModifierKind::InterestRateChange { .. } => "INTEREST_RATE_CHANGE",
            ModifierKind::AllocationConfigChange { .. } => "ALLOCATION_CONFIG_CHANGE",
            ModifierKind::SalaryChange { .. } => "SALARY_CHANGE",
            ModifierKind::BusinessIncome { .. } => "BUSINESS_INCOME",
        }
    }

    /// Account name this modifier targets, if any.
    pub fn target_account(&self) -> Option<&str> {
        match &self.kind {
            ModifierKind::OneOffAccountContribution { account, .. }
            | ModifierKind::OneOffAccountWithdrawal { account, .. }
            | ModifierKind::RecurringAccountContribution { account, .. }
            | ModifierKind::RecurringAccountWithdrawal { account, .. }
            | ModifierKind::InterestRateChange { account, .. } => Some(account),
            _ => None,
        }
    }

    /// Validate the category-1 configuration rules: non-negative amounts,
    /// known accounts, ordered date windows, allocation totals within 100%.
    pub fn validate(&self, account_names: &[&str]) -> Result<(), ConfigError> {
        let amount = match &self.kind {
            ModifierKind::OneOffInflow { amount, .. }
            | ModifierKind::OneOffExpense { amount, .. }
            | ModifierKind::OneOffAccountContribution { amount, .. }
            | ModifierKind::OneOffAccountWithdrawal { amount, .. } => Some(*amount),
            ModifierKind::RecurringIncome { monthly_amount, .. }
            | ModifierKind::RecurringExpense { monthly_amount, .. }
            | ModifierKind::RecurringAccountContribution { monthly_amount, .. }
            | ModifierKind::RecurringAccountWithdrawal { monthly_amount, .. } => {
                Some(*monthly_amount)
            }
            ModifierKind::SalaryChange {
                gross_annual_salary, ..
            } => Some(*gross_annual_salary),
            ModifierKind::BusinessIncome {
                monthly_revenue,
                monthly_costs,
                ..
            } => Some(monthly_revenue.min(*monthly_costs)),
            ModifierKind::InterestRateChange { .. }
            | ModifierKind::AllocationConfigChange { .. } => None,
        };
        if let Some(amount) = amount
            && amount < 0.0
        {
            return Err(ConfigError::NegativeAmount {
                modifier_id: self.id.clone(),
                amount,
            });
        }

        if let Some(account) = self.target_account()
            && !account_names.contains(&account)
        {
            return Err(ConfigError::UnknownAccount {
                modifier_id: self.id.clone(),
                account: account.to_string(),
            });
        }

        let window = match &self.kind {
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
            } => Some((start_date, end_date)),
            _ => None,
        };
        if let Some((start, Some(end))) = window
            && end < start
        {
            return Err(ConfigError::StartAfterEnd {
                modifier_id: self.id.clone(),
            });
        }

        if let ModifierKind::AllocationConfigChange { allocation, .. } = &self.kind
            && let AllocationChange::Percentages(percentages) = allocation
        {
            let total: f64 = percentages.values().sum();
            if total > 100.0 + 1e-9 {
                return Err(ConfigError::AllocationOverCommitted {
                    modifier_id: Some(self.id.clone()),
                    total,
                });
            }
        }

        Ok(())
    }
}
