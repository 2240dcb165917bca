//! Archetype behaviour observed through full projections.

use std::collections::BTreeMap;

use crate::config::{AccountBuilder, ModifierBuilder, ScenarioBuilder};
use crate::model::{AllocationConfig, AssetClass};
use crate::simulation::Simulator;
use crate::taxes::{calculate_income_tax, calculate_national_insurance};

fn base_builder() -> ScenarioBuilder {
    ScenarioBuilder::new()
        .monthly_income(3_000.0)
        .monthly_expenses(2_000.0)
        .monthly_deductions(0.0, 0.0)
        .allocation(AllocationConfig::new(BTreeMap::new()))
        .ages(40, 67)
        .account(AccountBuilder::current_account("Current Account").balance(5_000.0))
}

/// Salary change: tax and NI jump to the new annual figures from the start
/// month and stay there.
#[test]
fn test_salary_change_reprices_tax_and_ni() {
    let scenario = ScenarioBuilder::new()
        .monthly_income(5_000.0)
        .gross_annual_salary(60_000.0)
        .monthly_expenses(2_000.0)
        .ages(40, 67)
        .account(AccountBuilder::current_account("Current Account").balance(5_000.0))
        .modifier(ModifierBuilder::salary_change(
            "Promotion",
            90_000.0,
            jiff::civil::date(2025, 7, 1),
        ))
        .build();

    let simulator = Simulator::new(scenario, 2, 2025, 0).unwrap();
    let outcome = simulator.generate_scenario_projection();

    let old_monthly =
        (calculate_income_tax(60_000.0) + calculate_national_insurance(60_000.0)) / 12.0;
    let new_monthly =
        (calculate_income_tax(90_000.0) + calculate_national_insurance(90_000.0)) / 12.0;

    for point in &outcome.projection {
        let charged = point.breakdown.income_tax + point.breakdown.national_insurance;
        let expected = if point.period < 6 { old_monthly } else { new_monthly };
        assert!(
            (charged - expected).abs() < 0.01,
            "period {}: charged {}, expected {}",
            point.period,
            charged,
            expected
        );
    }

    // The take-home delta is attributed to the scenario, not the baseline.
    let after = &outcome.projection[8];
    let delta_net = (90_000.0 - 60_000.0) / 12.0 - (new_monthly - old_monthly);
    assert!(
        (after.breakdown.scenario_income - delta_net).abs() < 0.01,
        "got {}",
        after.breakdown.scenario_income
    );
    assert!(
        (after.breakdown.baseline_income - (5_000.0 - old_monthly)).abs() < 0.01,
        "baseline income must stay on the old salary"
    );
}

/// Recurring expenses honour their start and inclusive end window.
#[test]
fn test_recurring_expense_window() {
    let scenario = base_builder()
        .modifier(
            ModifierBuilder::recurring_expense(
                "Nursery",
                800.0,
                jiff::civil::date(2025, 4, 1),
            )
            .duration_months(6),
        )
        .build();

    let simulator = Simulator::new(scenario, 2, 2025, 0).unwrap();
    let outcome = simulator.generate_scenario_projection();

    for point in &outcome.projection {
        let expected = if (3..9).contains(&point.period) { 800.0 } else { 0.0 };
        assert!(
            (point.breakdown.scenario_expenses - expected).abs() < 1e-9,
            "period {}: {}",
            point.period,
            point.breakdown.scenario_expenses
        );
    }
}

/// Taxable one-off inflows arrive net of marginal tax; tax-free ones arrive
/// whole.
#[test]
fn test_one_off_inflow_taxation() {
    let taxable = base_builder()
        .modifier(ModifierBuilder::one_off_inflow(
            "Bonus",
            10_000.0,
            jiff::civil::date(2025, 6, 1),
        ))
        .build();
    let tax_free = base_builder()
        .modifier(
            ModifierBuilder::one_off_inflow(
                "Inheritance",
                10_000.0,
                jiff::civil::date(2025, 6, 1),
            )
            .tax_free(),
        )
        .build();

    let taxed_point = Simulator::new(taxable, 1, 2025, 0)
        .unwrap()
        .generate_scenario_projection()
        .projection[5]
        .clone();
    let free_point = Simulator::new(tax_free, 1, 2025, 0)
        .unwrap()
        .generate_scenario_projection()
        .projection[5]
        .clone();

    // Marginal tax on £10k on top of £36k is basic rate: £2,000.
    assert!(
        (taxed_point.breakdown.scenario_income - 8_000.0).abs() < 0.01,
        "got {}",
        taxed_point.breakdown.scenario_income
    );
    assert!(
        (free_point.breakdown.scenario_income - 10_000.0).abs() < 0.01,
        "got {}",
        free_point.breakdown.scenario_income
    );
    assert!(taxed_point.breakdown.income_tax > free_point.breakdown.income_tax);
}

/// Interest-rate changes override accrual within their window and restore
/// the original rate afterwards.
#[test]
fn test_interest_rate_change_window() {
    let scenario = ScenarioBuilder::new()
        .monthly_income(2_000.0)
        .monthly_expenses(2_000.0)
        .monthly_deductions(0.0, 0.0)
        .ages(40, 67)
        .account(AccountBuilder::savings("Savings").balance(10_000.0).growth(0.0))
        .modifier(
            ModifierBuilder::interest_rate_change(
                "Promo rate",
                "Savings",
                12.0,
                jiff::civil::date(2025, 4, 1),
            )
            .duration_months(6),
        )
        .build();

    let simulator = Simulator::new(scenario, 2, 2025, 0).unwrap();
    let outcome = simulator.generate_scenario_projection();

    // No growth before the window.
    assert!((outcome.projection[2].breakdown.compound_growth - 0.0).abs() < 1e-9);
    // 1% per month inside the window.
    let inside = &outcome.projection[3];
    assert!(
        (inside.breakdown.compound_growth - 100.0).abs() < 0.5,
        "got {}",
        inside.breakdown.compound_growth
    );
    // Restored to zero growth after the window.
    let after = &outcome.projection[10];
    assert!(
        (after.breakdown.compound_growth - 0.0).abs() < 1e-9,
        "got {}",
        after.breakdown.compound_growth
    );
    // Balance reflects exactly six months of 1%.
    let final_balance = outcome
        .projection
        .last()
        .unwrap()
        .breakdown
        .asset_categories
        .iter()
        .find(|r| r.name == "Savings")
        .unwrap()
        .value;
    let expected = 10_000.0 * 1.01_f64.powi(6);
    assert!(
        (final_balance - expected).abs() < 1.0,
        "expected {}, got {}",
        expected,
        final_balance
    );
}

/// Allocation changes redirect the surplus from their start month.
#[test]
fn test_allocation_change_redirects_surplus() {
    let scenario = ScenarioBuilder::new()
        .monthly_income(3_000.0)
        .monthly_expenses(2_000.0)
        .monthly_deductions(0.0, 0.0)
        .allocation(AllocationConfig::new(BTreeMap::new()))
        .ages(40, 67)
        .account(AccountBuilder::current_account("Current Account").balance(1_000.0))
        .account(AccountBuilder::isa("Stocks ISA").growth(0.0))
        .modifier(ModifierBuilder::allocation_all_to(
            "Invest everything",
            AssetClass::Equities,
            jiff::civil::date(2025, 7, 1),
        ))
        .build();

    let simulator = Simulator::new(scenario, 1, 2025, 0).unwrap();
    let outcome = simulator.generate_scenario_projection();

    for point in &outcome.projection {
        let equities = point
            .breakdown
            .cash_flow_allocations
            .get(&AssetClass::Equities)
            .copied()
            .unwrap_or(0.0);
        if point.period < 6 {
            assert_eq!(equities, 0.0, "period {}", point.period);
        } else {
            assert!(
                (equities - 1_000.0).abs() < 0.01,
                "period {}: {}",
                point.period,
                equities
            );
        }
    }
}

/// Business income: corporation tax is charged monthly on the annualised
/// profit and the net enters the scenario cash flow.
#[test]
fn test_business_income_pays_corporation_tax() {
    let scenario = base_builder()
        .modifier(
            ModifierBuilder::business_income(
                "Consultancy",
                10_000.0,
                4_000.0,
                jiff::civil::date(2025, 1, 1),
            )
            .scenario_id("consultancy"),
        )
        .build();

    let simulator = Simulator::new(scenario, 1, 2025, 0).unwrap();
    let outcome = simulator.generate_scenario_projection();

    let point = &outcome.projection[0];
    let business = point.breakdown.business.expect("business figures missing");
    assert!((business.business_profit - 6_000.0).abs() < 0.01);
    // £72k annualised: 18,000 - 178,000 * 0.015 = 15,330 a year.
    assert!(
        (business.corporation_tax - 15_330.0 / 12.0).abs() < 0.01,
        "got {}",
        business.corporation_tax
    );
    assert!(
        (business.business_net_profit - (6_000.0 - 15_330.0 / 12.0)).abs() < 0.01
    );
    assert!(
        (point.breakdown.goal_impacts["consultancy"] - business.business_net_profit).abs()
            < 0.01
    );
}

/// Direct account contributions move cash into the account and show up in
/// the scenario's net-worth attribution, not as income or expense.
#[test]
fn test_one_off_account_contribution() {
    let scenario = base_builder()
        .account(AccountBuilder::gia("GIA").growth(0.0))
        .modifier(
            ModifierBuilder::one_off_account_contribution(
                "Seed the GIA",
                "GIA",
                2_000.0,
                jiff::civil::date(2025, 3, 1),
            )
            .id("seed"),
        )
        .build();

    let simulator = Simulator::new(scenario, 1, 2025, 0).unwrap();
    let outcome = simulator.generate_scenario_projection();

    let point = &outcome.projection[2];
    assert_eq!(point.breakdown.scenario_income, 0.0);
    assert_eq!(point.breakdown.scenario_expenses, 0.0);
    // Cash flow drops by the deposit that month.
    assert!((point.cash_flow - (1_000.0 - 2_000.0)).abs() < 0.01);
    let goal = &point.breakdown.goal_breakdowns[0];
    assert!((goal.cash_flow_impact + 2_000.0).abs() < 0.01);
    assert!((goal.net_worth_impact - 2_000.0).abs() < 0.01);

    let gia = point
        .breakdown
        .asset_categories
        .iter()
        .find(|r| r.name == "GIA")
        .unwrap();
    assert!((gia.value - 2_000.0).abs() < 0.01);
}

/// Multi-part scenarios share one attribution row per scenario id.
#[test]
fn test_scenario_id_groups_goal_impacts() {
    let scenario = base_builder()
        .modifier(
            ModifierBuilder::recurring_income(
                "Side gig revenue",
                1_000.0,
                jiff::civil::date(2025, 1, 1),
            )
            .id("gig-rev")
            .scenario_id("side-gig")
            .tax_free(),
        )
        .modifier(
            ModifierBuilder::recurring_expense(
                "Side gig costs",
                400.0,
                jiff::civil::date(2025, 1, 1),
            )
            .id("gig-costs")
            .scenario_id("side-gig"),
        )
        .build();

    let simulator = Simulator::new(scenario, 1, 2025, 0).unwrap();
    let outcome = simulator.generate_scenario_projection();

    let point = &outcome.projection[0];
    assert_eq!(point.breakdown.goal_breakdowns.len(), 1);
    assert!(
        (point.breakdown.goal_impacts["side-gig"] - 600.0).abs() < 0.01,
        "got {:?}",
        point.breakdown.goal_impacts
    );
}
