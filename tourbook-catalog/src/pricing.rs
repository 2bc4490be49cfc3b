/// Converts a currency amount to minor units, rounding half up.
///
/// Both sides of the price comparison go through this one function so that
/// float representation error cannot produce a spurious mismatch.
pub fn to_cents(amount: f64) -> u64 {
    (amount * 100.0 + 0.5) as u64
}

/// Formats minor units for display, e.g. `2714` -> `$27.14`.
pub fn display_cents(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Parses a client-quoted total such as `"$13.57"`, `"13.57"` or `"1,013.57"`.
pub fn parse_quoted_total(raw: &str) -> Result<f64, PricingError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let value: f64 = cleaned
        .trim()
        .parse()
        .map_err(|_| PricingError::InvalidQuote(raw.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(PricingError::InvalidQuote(raw.to_string()));
    }
    Ok(value)
}

/// Outcome of a successful price check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedTotal {
    /// Authoritative total; this is the amount persisted and charged.
    pub actual_cents: u64,
}

impl PricedTotal {
    pub fn display(&self) -> String {
        display_cents(self.actual_cents)
    }
}

/// Recomputes the authoritative price and holds the client to it.
pub struct PricingValidator;

impl PricingValidator {
    pub fn validate(
        price_per_rider: f64,
        rider_count: i64,
        quoted_total: f64,
    ) -> Result<PricedTotal, PricingError> {
        let actual_cents = to_cents(rider_count as f64 * price_per_rider);
        let quoted_cents = to_cents(quoted_total);

        if actual_cents != quoted_cents {
            return Err(PricingError::Mismatch {
                quoted_cents,
                actual_cents,
            });
        }

        Ok(PricedTotal { actual_cents })
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Invalid quoted total: {0:?}")]
    InvalidQuote(String),

    #[error("Pricing mismatch: quoted={quoted_cents}, actual={actual_cents}")]
    Mismatch {
        quoted_cents: u64,
        actual_cents: u64,
    },
}
