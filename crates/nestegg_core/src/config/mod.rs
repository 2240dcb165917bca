//! Builder DSL for constructing scenarios.
//!
//! The builders are a pure adapter from ergonomic call sites to the
//! canonical model — they perform no validation. `Simulator::new` validates
//! the finished scenario and rejects bad configuration before the loop
//! starts.
//!
//! ```ignore
//! use nestegg_core::config::{AccountBuilder, ModifierBuilder, ScenarioBuilder};
//!
//! let scenario = ScenarioBuilder::new()
//!     .monthly_income(4_000.0)
//!     .monthly_expenses(2_500.0)
//!     .ages(40, 67)
//!     .state_pension_monthly(950.0)
//!     .account(AccountBuilder::current_account("Current Account").balance(5_000.0))
//!     .account(AccountBuilder::isa("Stocks ISA").balance(20_000.0).growth(6.0))
//!     .modifier(
//!         ModifierBuilder::one_off_expense("Wedding", 25_000.0, jiff::civil::date(2027, 6, 1)),
//!     )
//!     .build();
//! ```

pub mod account_builder;
pub mod builder;
pub mod modifier_builder;

pub use account_builder::AccountBuilder;
pub use builder::ScenarioBuilder;
pub use modifier_builder::ModifierBuilder;
