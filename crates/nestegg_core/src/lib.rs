//! Deterministic UK household financial projection engine.
//!
//! Given a baseline financial position (accounts, income, expenses, ages)
//! and a set of scenario modifiers (goals, actions, events), the engine
//! produces a month-by-month projection over a multi-decade horizon:
//! net worth, cash flows, per-account contributions and withdrawals, income
//! tax and National Insurance, pension crystallisation state, and a
//! solvency/liquidity diagnosis comparing the baseline against the
//! "with scenarios" run. It supports:
//! - UK income tax, employee NI, and corporation tax with marginal relief
//! - Pension access rules: age gating, 25% tax-free cash, MPAA, marginal
//!   tax on drawdown with per-tax-year tracking
//! - Automated surplus allocation with ISA annual-cap enforcement
//! - Liquidation cascades when monthly cash flow turns negative
//! - Annual aggregation of monthly points for charting
//!
//! # Builder DSL
//!
//! Use the fluent builder API for ergonomic scenario setup:
//!
//! ```ignore
//! use nestegg_core::{AccountBuilder, ModifierBuilder, ScenarioBuilder, Simulator};
//!
//! let scenario = ScenarioBuilder::new()
//!     .monthly_income(4_000.0)
//!     .monthly_expenses(2_500.0)
//!     .ages(40, 67)
//!     .account(AccountBuilder::current_account("Current Account").balance(5_000.0))
//!     .account(AccountBuilder::isa("Stocks ISA").balance(20_000.0).growth(6.0))
//!     .modifier(ModifierBuilder::one_off_expense(
//!         "Wedding",
//!         25_000.0,
//!         jiff::civil::date(2027, 6, 1),
//!     ))
//!     .build();
//!
//! let simulator = Simulator::new(scenario, 30, 2025, 0)?;
//! let outcome = simulator.generate_scenario_projection();
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod aggregate;
pub mod allocation;
pub mod analysis;
pub mod apply;
pub mod calendar;
pub mod error;
pub mod liquidation;
pub mod pension;
pub mod simulation;
pub mod simulation_state;
pub mod taxes;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use aggregate::aggregate_to_yearly;
pub use analysis::SolvencyAnalysis;
pub use config::{AccountBuilder, ModifierBuilder, ScenarioBuilder};
pub use model::{ProjectionOutcome, ProjectionPoint, SimulationScenario};
pub use simulation::{Simulator, project_scenarios};
