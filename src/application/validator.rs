use crate::domain::values::price::coerce_decimal;
use rust_decimal::Decimal;
use std::fmt;

/// A price candidate after catalog resolution, before storage. Ids are
/// optional because resolution against the active maps may have missed.
#[derive(Debug, Clone)]
pub struct PriceCandidate {
    pub symbol_id: Option<i64>,
    pub data_source_id: Option<i64>,
    pub price: String,
    pub change_percent: Option<String>,
}

/// Validated, coerced row ready for the insert batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPrice {
    pub symbol_id: i64,
    pub data_source_id: i64,
    pub price: Decimal,
    pub change_percent: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Symbol name not in the active catalog (catalog drift)
    MissingSymbol,
    /// Source name not in the active catalog (catalog drift)
    MissingSource,
    /// Price did not coerce to a decimal
    BadPrice,
    /// change_percent present but not a number
    BadChangePercent,
}

impl Rejection {
    /// Drift rejections are catalog staleness, not bad feed data.
    pub fn is_drift(&self) -> bool {
        matches!(self, Rejection::MissingSymbol | Rejection::MissingSource)
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingSymbol => write!(f, "symbol not in active catalog"),
            Rejection::MissingSource => write!(f, "source not in active catalog"),
            Rejection::BadPrice => write!(f, "price is not a finite number"),
            Rejection::BadChangePercent => write!(f, "change_percent is not a finite number"),
        }
    }
}

/// Pure check of one candidate. Never performs I/O and never panics; the
/// same input always yields the same decision.
pub fn validate(candidate: &PriceCandidate) -> Result<ValidatedPrice, Rejection> {
    let symbol_id = candidate.symbol_id.ok_or(Rejection::MissingSymbol)?;
    let data_source_id = candidate.data_source_id.ok_or(Rejection::MissingSource)?;

    let price = coerce_decimal(&candidate.price).ok_or(Rejection::BadPrice)?;

    // Absent change_percent is valid (stored NULL); present but unparsable rejects.
    let change_percent = match &candidate.change_percent {
        None => None,
        Some(raw) => Some(coerce_decimal(raw).ok_or(Rejection::BadChangePercent)?),
    };

    Ok(ValidatedPrice {
        symbol_id,
        data_source_id,
        price,
        change_percent,
    })
}
