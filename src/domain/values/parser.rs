use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payload shape of a data source, resolved from source configuration so the
/// normalizer never has to type-sniff a response at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceParser {
    /// `data.data` maps each category key to an array of per-symbol objects.
    #[default]
    CategoryArrays,
    /// `data.data` is one object carrying a single implicit symbol (the
    /// "silver" shape); the symbol takes the source's category name.
    SingleQuote,
}

impl fmt::Display for SourceParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CategoryArrays => write!(f, "category_arrays"),
            Self::SingleQuote => write!(f, "single_quote"),
        }
    }
}

impl FromStr for SourceParser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "category_arrays" => Ok(Self::CategoryArrays),
            "single_quote" => Ok(Self::SingleQuote),
            _ => Err(format!(
                "Unknown parser: '{s}'. Use 'category_arrays' or 'single_quote'"
            )),
        }
    }
}
