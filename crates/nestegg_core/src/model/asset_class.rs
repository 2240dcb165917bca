//! Asset classes used by the surplus allocator and the liquidation planner.

use serde::{Deserialize, Serialize};

/// Closed set of asset classes an account can belong to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum AssetClass {
    Cash,
    CurrentAccount,
    DefaultSavings,
    Hysa,
    /// ISA-wrapped stocks and shares.
    Equities,
    GeneralInvestment,
    Pension,
}

impl AssetClass {
    /// Default liquidation priority: liquid first, tax-advantaged last.
    pub const LIQUIDATION_ORDER: [AssetClass; 7] = [
        AssetClass::CurrentAccount,
        AssetClass::Cash,
        AssetClass::DefaultSavings,
        AssetClass::Hysa,
        AssetClass::GeneralInvestment,
        AssetClass::Equities,
        AssetClass::Pension,
    ];

    /// Classes whose balances count as cash for liquidity analysis.
    pub fn is_cash_like(&self) -> bool {
        matches!(
            self,
            AssetClass::Cash | AssetClass::CurrentAccount | AssetClass::DefaultSavings
        )
    }

    /// Non-cash holdings that can be sold to raise cash (GIA and ISA).
    pub fn is_sellable_investment(&self) -> bool {
        matches!(self, AssetClass::GeneralInvestment | AssetClass::Equities)
    }
}

/// Infer an asset class from an account name.
///
/// An explicit wrapper tag on the account always wins; this is the fallback
/// for baselines that only carry names. ISA detection is a case-insensitive
/// substring match.
pub fn classify_account_name(name: &str) -> AssetClass {
    let lower = name.to_lowercase();

    if lower.contains("isa") {
        return AssetClass::Equities;
    }
    if lower.contains("pension") || lower.contains("sipp") || lower.contains("workplace") {
        return AssetClass::Pension;
    }
    if lower.contains("hysa") || lower.contains("high yield") || lower.contains("goal") {
        return AssetClass::Hysa;
    }
    if lower.contains("gia") || lower.contains("general") || lower.contains("brokerage") {
        return AssetClass::GeneralInvestment;
    }
    if lower.contains("current") || lower.contains("checking") {
        return AssetClass::CurrentAccount;
    }
    if lower.contains("saving") {
        return AssetClass::DefaultSavings;
    }
    AssetClass::Cash
}
