use crate::domain::entities::catalog::DataSource;
use crate::domain::entities::raw_item::{RawItem, DEFAULT_UNIT};
use crate::domain::ports::source_fetcher::FetchError;
use crate::domain::values::parser::SourceParser;
use serde_json::Value;
use std::collections::HashMap;

/// Normalize a raw feed body into per-category item lists.
///
/// The top-level invariant for every source is `data.data` being a JSON
/// object; a body without it is a failure for this source. Shape variants
/// below that are resolved by the source's configured parser, never by
/// sniffing the payload.
pub fn normalize(
    source: &DataSource,
    body: &Value,
) -> Result<HashMap<String, Vec<RawItem>>, FetchError> {
    let inner = body
        .get("data")
        .and_then(|d| d.get("data"))
        .and_then(|d| d.as_object())
        .ok_or_else(|| {
            FetchError::Parse(format!("{}: response missing data.data object", source.name))
        })?;

    let mut out: HashMap<String, Vec<RawItem>> = HashMap::new();
    match source.parser {
        SourceParser::CategoryArrays => {
            for (category, value) in inner {
                let arr = value.as_array().ok_or_else(|| {
                    FetchError::Parse(format!(
                        "{}: category '{category}' is not an array",
                        source.name
                    ))
                })?;
                let mut items = Vec::with_capacity(arr.len());
                for element in arr {
                    let obj = element.as_object().ok_or_else(|| {
                        FetchError::Parse(format!(
                            "{}: non-object item in category '{category}'",
                            source.name
                        ))
                    })?;
                    items.push(item_from_object(source, category, obj));
                }
                out.insert(category.clone(), items);
            }
        }
        SourceParser::SingleQuote => {
            // The whole object is one implicit symbol named after the
            // source's category (the "silver" shape).
            let item = RawItem {
                symbol: source.category.clone(),
                category: source.category.clone(),
                name: field_string(inner, "name").unwrap_or_else(|| source.category.clone()),
                source: source.name.clone(),
                price: field_string(inner, "price").unwrap_or_default(),
                change_percent: field_string(inner, "change_percent"),
                unit: field_string(inner, "unit").unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            };
            out.insert(source.category.clone(), vec![item]);
        }
    }
    Ok(out)
}

fn item_from_object(
    source: &DataSource,
    category: &str,
    obj: &serde_json::Map<String, Value>,
) -> RawItem {
    let symbol = field_string(obj, "symbol").unwrap_or_default();
    RawItem {
        name: field_string(obj, "name").unwrap_or_else(|| symbol.clone()),
        symbol,
        category: category.to_string(),
        source: source.name.clone(),
        // A missing or malformed price becomes an empty string and is
        // rejected per-row at validation, not here.
        price: field_string(obj, "price").unwrap_or_default(),
        change_percent: field_string(obj, "change_percent"),
        unit: field_string(obj, "unit").unwrap_or_else(|| DEFAULT_UNIT.to_string()),
    }
}

fn field_string(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
