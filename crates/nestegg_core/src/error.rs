pub type Result<T> = std::result::Result<T, ConfigError>;

/// Fatal configuration problems detected before the monthly loop starts.
///
/// Runtime conditions (insufficient cash, pension access before minimum age,
/// ISA cap overflow) are never errors; they are handled inside the loop and
/// surfaced as data on the projection points and the solvency analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A modifier references an account name that does not exist in the
    /// baseline.
    UnknownAccount { modifier_id: String, account: String },
    /// A modifier carries a negative amount.
    NegativeAmount { modifier_id: String, amount: f64 },
    /// A modifier's end date falls before its start date.
    StartAfterEnd { modifier_id: String },
    /// An allocation config change sums to more than 100%.
    AllocationOverCommitted { modifier_id: Option<String>, total: f64 },
    /// The projection horizon is zero years.
    EmptyHorizon,
    /// Two modifiers share the same id.
    DuplicateModifierId { modifier_id: String },
}
