mod accounts;
mod asset_class;
mod modifiers;
mod projection;
mod scenario;

pub use accounts::{AccountState, BalanceAccount, Frequency, ScheduledDue};
pub use asset_class::{AssetClass, classify_account_name};
pub use modifiers::{ModifierKind, SETUP_ID_SUFFIX, ScenarioModifier};
pub use projection::{
    BusinessFigures, CategoryRow, GoalBreakdown, PeriodBreakdown, ProjectionOutcome,
    ProjectionPoint,
};
pub use scenario::{AllocationChange, AllocationConfig, Baseline, SimulationScenario};
