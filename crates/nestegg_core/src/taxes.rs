//! UK tax and National Insurance calculations (2024/25 rates).
//!
//! Pure functions over annual gross figures. Monetary results are rounded to
//! two decimal places at the surface only; marginal calculations run on the
//! unrounded totals so that band-crossing differences stay exact.

use serde::{Deserialize, Serialize};

/// Standard personal allowance before tapering.
pub const PERSONAL_ALLOWANCE: f64 = 12_570.0;
/// Adjusted net income above which the personal allowance tapers away.
pub const ALLOWANCE_TAPER_THRESHOLD: f64 = 100_000.0;
/// Upper bound of the basic-rate band.
pub const BASIC_RATE_LIMIT: f64 = 50_270.0;
/// Upper bound of the higher-rate band (also where the allowance hits zero).
pub const HIGHER_RATE_LIMIT: f64 = 125_140.0;

pub const BASIC_RATE: f64 = 0.20;
pub const HIGHER_RATE: f64 = 0.40;
pub const ADDITIONAL_RATE: f64 = 0.45;

/// Employee class 1 NI: nothing below the primary threshold, 8% to the upper
/// earnings limit, 2% above.
pub const NI_PRIMARY_THRESHOLD: f64 = 12_570.0;
pub const NI_UPPER_EARNINGS_LIMIT: f64 = 50_270.0;
pub const NI_MAIN_RATE: f64 = 0.08;
pub const NI_UPPER_RATE: f64 = 0.02;

/// Corporation tax: small-profits rate to £50k, main rate from £250k, with
/// standard-fraction marginal relief in between.
pub const CT_SMALL_PROFITS_LIMIT: f64 = 50_000.0;
pub const CT_MAIN_RATE_LIMIT: f64 = 250_000.0;
pub const CT_SMALL_PROFITS_RATE: f64 = 0.19;
pub const CT_MAIN_RATE: f64 = 0.25;
pub const CT_MARGINAL_RELIEF_FRACTION: f64 = 0.015;

/// Round to two decimal places, half away from zero.
#[inline]
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Personal allowance after tapering: £1 withdrawn per £2 of income above
/// £100,000, reaching zero at £125,140.
pub fn personal_allowance(gross_annual: f64) -> f64 {
    if gross_annual <= ALLOWANCE_TAPER_THRESHOLD {
        return PERSONAL_ALLOWANCE;
    }
    let taper = (gross_annual - ALLOWANCE_TAPER_THRESHOLD) / 2.0;
    (PERSONAL_ALLOWANCE - taper).max(0.0)
}

fn income_tax_unrounded(gross_annual: f64) -> f64 {
    if gross_annual <= 0.0 {
        return 0.0;
    }

    let allowance = personal_allowance(gross_annual);
    let bands = [
        (allowance, BASIC_RATE),
        (BASIC_RATE_LIMIT, HIGHER_RATE),
        (HIGHER_RATE_LIMIT, ADDITIONAL_RATE),
    ];

    let mut tax = 0.0;
    for (i, (lower, rate)) in bands.iter().enumerate() {
        let upper = bands.get(i + 1).map(|b| b.0).unwrap_or(f64::INFINITY);
        if gross_annual <= *lower {
            break;
        }
        tax += (gross_annual.min(upper) - lower).max(0.0) * rate;
    }
    tax
}

/// Annual income tax on gross income, banded with the tapered allowance.
pub fn calculate_income_tax(gross_annual: f64) -> f64 {
    round_currency(income_tax_unrounded(gross_annual))
}

/// Annual employee National Insurance on gross income.
pub fn calculate_national_insurance(gross_annual: f64) -> f64 {
    if gross_annual <= NI_PRIMARY_THRESHOLD {
        return 0.0;
    }
    let main_band =
        (gross_annual.min(NI_UPPER_EARNINGS_LIMIT) - NI_PRIMARY_THRESHOLD) * NI_MAIN_RATE;
    let upper_band = (gross_annual - NI_UPPER_EARNINGS_LIMIT).max(0.0) * NI_UPPER_RATE;
    round_currency(main_band + upper_band)
}

/// Annual net income after income tax and employee NI.
pub fn calculate_net_annual_income(gross_annual: f64) -> f64 {
    round_currency(
        gross_annual - income_tax_unrounded(gross_annual)
            - calculate_national_insurance(gross_annual),
    )
}

/// Tax on `additional` income received on top of `existing` income.
///
/// Computed as the difference of the total liability at the two income
/// levels — never by applying a single flat band — so withdrawals that
/// straddle a threshold are taxed correctly on each side of it.
pub fn calculate_marginal_income_tax(additional: f64, existing: f64) -> f64 {
    if additional <= 0.0 {
        return 0.0;
    }
    let existing = existing.max(0.0);
    round_currency(income_tax_unrounded(existing + additional) - income_tax_unrounded(existing))
}

/// Corporation tax breakdown for an annual profit figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporationTaxResult {
    pub tax: f64,
    pub net_profit: f64,
    pub effective_rate: f64,
}

/// Corporation tax with standard-fraction marginal relief.
///
/// 19% up to £50,000 and 25% from £250,000; between the limits the charge is
/// `0.25 * profit - (250,000 - profit) * 0.015`.
pub fn calculate_corporation_tax(annual_profit: f64) -> CorporationTaxResult {
    if annual_profit <= 0.0 {
        return CorporationTaxResult {
            tax: 0.0,
            net_profit: round_currency(annual_profit),
            effective_rate: 0.0,
        };
    }

    let tax = if annual_profit <= CT_SMALL_PROFITS_LIMIT {
        annual_profit * CT_SMALL_PROFITS_RATE
    } else if annual_profit >= CT_MAIN_RATE_LIMIT {
        annual_profit * CT_MAIN_RATE
    } else {
        annual_profit * CT_MAIN_RATE
            - (CT_MAIN_RATE_LIMIT - annual_profit) * CT_MARGINAL_RELIEF_FRACTION
    };

    let tax = round_currency(tax);
    CorporationTaxResult {
        tax,
        net_profit: round_currency(annual_profit - tax),
        effective_rate: tax / annual_profit,
    }
}
