//! Monthly-to-annual aggregation for charting.
//!
//! One output row per simulated year (twelve months from the simulation
//! start month). Balances are point-in-time and take the year's last month;
//! flows are summed across the year's months. Per-scenario rows group by
//! scenario id, with setup-cost sub-modifiers folded into their parent.

use std::collections::BTreeMap;

use crate::model::{
    BusinessFigures, GoalBreakdown, PeriodBreakdown, ProjectionPoint, SETUP_ID_SUFFIX,
};

/// Reduce a monthly projection to one row per year. The `period` of each
/// output point is the zero-based year index.
pub fn aggregate_to_yearly(monthly: &[ProjectionPoint]) -> Vec<ProjectionPoint> {
    monthly
        .chunks(12)
        .enumerate()
        .map(|(year, months)| aggregate_year(year as u32, months))
        .collect()
}

fn aggregate_year(year: u32, months: &[ProjectionPoint]) -> ProjectionPoint {
    // chunks() never yields an empty slice, but stay total anyway.
    let Some(last) = months.last() else {
        return ProjectionPoint {
            period: year,
            ..ProjectionPoint::default()
        };
    };

    let mut breakdown = PeriodBreakdown {
        // Balances: point-in-time, from the year's final month.
        asset_value: last.breakdown.asset_value,
        debt_value: last.breakdown.debt_value,
        asset_categories: last.breakdown.asset_categories.clone(),
        debt_categories: last.breakdown.debt_categories.clone(),
        ..PeriodBreakdown::default()
    };

    let mut business_any = false;
    let mut business = BusinessFigures::default();
    let mut goals: BTreeMap<String, GoalBreakdown> = BTreeMap::new();

    for point in months {
        let b = &point.breakdown;
        breakdown.total_income += b.total_income;
        breakdown.total_expenses += b.total_expenses;
        breakdown.baseline_income += b.baseline_income;
        breakdown.baseline_expenses += b.baseline_expenses;
        breakdown.scenario_income += b.scenario_income;
        breakdown.scenario_expenses += b.scenario_expenses;
        breakdown.income_tax += b.income_tax;
        breakdown.national_insurance += b.national_insurance;
        breakdown.state_pension_income += b.state_pension_income;
        breakdown.private_pension_income += b.private_pension_income;
        breakdown.surplus_cash += b.surplus_cash;
        breakdown.compound_growth += b.compound_growth;
        breakdown.total_contributions_this_period += b.total_contributions_this_period;
        breakdown.scenario_net_cash_flow += b.scenario_net_cash_flow;

        for (name, amount) in &b.scheduled_contributions {
            *breakdown
                .scheduled_contributions
                .entry(name.clone())
                .or_insert(0.0) += amount;
        }
        for (class, amount) in &b.cash_flow_allocations {
            *breakdown.cash_flow_allocations.entry(*class).or_insert(0.0) += amount;
        }
        for (class, amount) in &b.cash_flow_liquidations {
            *breakdown
                .cash_flow_liquidations
                .entry(*class)
                .or_insert(0.0) += amount;
        }
        for (name, amount) in &b.liquidation_accounts {
            *breakdown
                .liquidation_accounts
                .entry(name.clone())
                .or_insert(0.0) += amount;
        }

        if let Some(figures) = &b.business {
            business_any = true;
            business.business_revenue += figures.business_revenue;
            business.business_costs += figures.business_costs;
            business.business_profit += figures.business_profit;
            business.corporation_tax += figures.corporation_tax;
            business.business_net_profit += figures.business_net_profit;
        }

        for row in &b.goal_breakdowns {
            let key = row
                .scenario_id
                .strip_suffix(SETUP_ID_SUFFIX)
                .unwrap_or(&row.scenario_id)
                .to_string();
            let entry = goals.entry(key.clone()).or_insert_with(|| GoalBreakdown {
                name: row.name.clone(),
                scenario_id: key,
                goal_type: row.goal_type.clone(),
                cash_flow_impact: 0.0,
                net_worth_impact: 0.0,
            });
            // Cash flow sums across months; net worth is a balance and
            // takes the latest value seen in the year.
            entry.cash_flow_impact += row.cash_flow_impact;
            entry.net_worth_impact = row.net_worth_impact;
        }
    }

    breakdown.business = business_any.then_some(business);
    for (key, goal) in &goals {
        breakdown
            .goal_impacts
            .insert(key.clone(), goal.cash_flow_impact);
    }
    breakdown.goal_breakdowns = goals.into_values().collect();

    ProjectionPoint {
        period: year,
        net_worth: last.net_worth,
        cash_flow: months.iter().map(|p| p.cash_flow).sum(),
        breakdown,
    }
}
