use rust_decimal::Decimal;
use std::str::FromStr;

/// Coerce a feed-supplied price string to a decimal.
///
/// Feeds deliver prices as JSON numbers or as formatted strings with
/// thousands separators ("1,234.50"). Separators and surrounding whitespace
/// are stripped before parsing; anything that still fails to parse is not a
/// number.
pub fn coerce_decimal(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
